// ==========================================
// Façade d'import - Tests de bout en bout
// ==========================================
// Déroulé complet au travers de l'API : imports,
// historique, purge, modèles de fichiers
// ==========================================


use orientation_console::api::{ApiError, ImportApi};
use orientation_console::config::ConfigManager;
use orientation_console::domain::types::ImportKind;
use orientation_console::{i18n, logging};
use test_helpers::{count_rows, create_test_db, write_csv};

#[tokio::test]
async fn test_full_flow_companies_then_visits() {
    logging::init_test();
    // La locale est un état global : on la fixe avant de vérifier les messages
    i18n::set_locale("fr");
    println!("\n=== Façade : entreprises puis visites sur la même base ===\n");

    // Étape 1 : base de test
    let (_db_file, db_path) = create_test_db().expect("création de la base de test");
    let api = ImportApi::new(&db_path).expect("construction de la façade");
    println!("✓ étape 1 : base prête ({db_path})");

    // Étape 2 : import du fichier entreprises
    let (_companies_file, companies_path) = write_csv(
        "Nom de l'entreprise;Secteur d'activité;Ville;Intérêt\n\
         Acme;Informatique;Lyon;fort\n\
         Globex;Logistique;Vénissieux;moyen\n",
    )
    .expect("écriture du fichier entreprises");

    let companies = api
        .import_companies(&companies_path, Some("cio.martin"))
        .await
        .expect("import entreprises en échec");
    println!("✓ étape 2 : {}", companies.message);

    assert_eq!(companies.kind, ImportKind::Companies);
    assert_eq!(companies.total_rows, 2);
    assert_eq!(companies.imported, 2);
    assert_eq!(companies.created_entities, 2);
    assert!(!companies.aborted);
    assert!(companies.message.contains("Import terminé"));

    // Étape 3 : import de visites, Acme connue, Initech nouvelle
    let (_visits_file, visits_path) = write_csv(
        "Entreprise;Date;Secteur;Intervenant\n\
         ACME;2025-03-14;;Mme Durand\n\
         Initech;14/03/2025;Conseil;M. Lopez\n",
    )
    .expect("écriture du fichier visites");

    let visits = api
        .import_visits(&visits_path, Some("cio.martin"))
        .await
        .expect("import visites en échec");
    println!("✓ étape 3 : {}", visits.message);

    assert_eq!(visits.kind, ImportKind::Visits);
    assert_eq!(visits.imported, 2);
    // 1 secteur (Conseil) + 1 entreprise (Initech)
    assert_eq!(visits.created_entities, 2);

    assert_eq!(count_rows(&db_path, "entreprise"), 3);
    assert_eq!(count_rows(&db_path, "visite_entreprise"), 2);

    // Étape 4 : historique, du plus récent au plus ancien
    let batches = api
        .list_recent_batches(10)
        .await
        .expect("lecture de l'historique");
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0].kind, ImportKind::Visits);
    assert_eq!(batches[1].kind, ImportKind::Companies);
    assert_eq!(batches[1].imported_by.as_deref(), Some("cio.martin"));
    assert!(batches[0].report_json.is_some());
    println!("✓ étape 4 : historique en place");

    // Étape 5 : purge (rétention par défaut, rien à supprimer)
    let purged = api.purge_old_batches().await.expect("purge de l'historique");
    assert_eq!(purged, 0);
    assert_eq!(count_rows(&db_path, "import_batch"), 2);
    println!("✓ étape 5 : purge sans effet sur des traces récentes");
}

#[tokio::test]
async fn test_header_abort_is_reported_not_errored() {
    logging::init_test();
    i18n::set_locale("fr");
    println!("\n=== Façade : entête incomplète rapportée à l'appelant ===\n");

    let (_db_file, db_path) = create_test_db().expect("création de la base de test");
    let api = ImportApi::new(&db_path).expect("construction de la façade");

    let (_csv_file, csv_path) =
        write_csv("Ville;Secteur\nLyon;Industrie\n").expect("écriture du fichier de test");

    let response = api
        .import_companies(&csv_path, None)
        .await
        .expect("l'interruption reste une réponse, pas une erreur");

    assert!(response.aborted);
    assert!(response.message.contains("Import interrompu"));
    assert_eq!(response.imported, 0);
    assert_eq!(count_rows(&db_path, "import_batch"), 1);
}

#[tokio::test]
async fn test_missing_file_maps_to_not_found() {
    logging::init_test();

    let (_db_file, db_path) = create_test_db().expect("création de la base de test");
    let api = ImportApi::new(&db_path).expect("construction de la façade");

    let result = api
        .import_companies("/tmp/orientation-nexiste-pas.csv", None)
        .await;

    match result {
        Err(ApiError::NotFound(message)) => {
            assert!(message.contains("orientation-nexiste-pas"), "motif : {message}");
        }
        other => panic!("NotFound attendu, obtenu : {other:?}"),
    }
}

#[tokio::test]
async fn test_operator_falls_back_to_configured_default() {
    logging::init_test();
    println!("\n=== Façade : opérateur par défaut lu dans la configuration ===\n");

    let (_db_file, db_path) = create_test_db().expect("création de la base de test");

    let config = ConfigManager::new(&db_path).expect("ouverture de la configuration");
    config
        .set_global_config_value("import_default_operator", "mme.durand")
        .expect("écriture de l'opérateur par défaut");

    let api = ImportApi::new(&db_path).expect("construction de la façade");
    let (_csv_file, csv_path) =
        write_csv("Nom;Secteur\nAcme;Industrie\n").expect("écriture du fichier de test");

    // Pas d'opérateur à l'appel : celui de la configuration signe le job
    api.import_companies(&csv_path, None)
        .await
        .expect("import en échec");

    let batches = api
        .list_recent_batches(1)
        .await
        .expect("lecture de l'historique");
    assert_eq!(batches[0].imported_by.as_deref(), Some("mme.durand"));
}

#[tokio::test]
async fn test_import_many_keeps_one_verdict_per_file() {
    logging::init_test();
    println!("\n=== Façade : lot de fichiers, un verdict chacun ===\n");

    let (_db_file, db_path) = create_test_db().expect("création de la base de test");
    let api = ImportApi::new(&db_path).expect("construction de la façade");

    let (_good_file, good_path) =
        write_csv("Nom;Secteur\nAcme;Industrie\n").expect("écriture du premier fichier");
    let (_bad_file, bad_path) =
        write_csv("Ville\nLyon\n").expect("écriture du second fichier");

    let results = api
        .import_many(
            ImportKind::Companies,
            &[good_path.clone(), bad_path.clone()],
            Some("cio.martin"),
        )
        .await;

    assert_eq!(results.len(), 2);
    let first = results[0].as_ref().expect("premier fichier accepté");
    assert_eq!(first.imported, 1);
    let second = results[1].as_ref().expect("entête incomplète : réponse interrompue");
    assert!(second.aborted);

    // Chaque job laisse sa trace
    assert_eq!(count_rows(&db_path, "import_batch"), 2);
}

#[tokio::test]
async fn test_template_export_round_trips_through_the_mapper() {
    logging::init_test();
    println!("\n=== Façade : modèles de fichiers exportés ===\n");

    let (_db_file, db_path) = create_test_db().expect("création de la base de test");
    let api = ImportApi::new(&db_path).expect("construction de la façade");
    let dir = tempfile::tempdir().expect("dossier temporaire");
    let dir_path = dir.path().to_str().expect("chemin UTF-8");

    let companies = api
        .export_template(ImportKind::Companies, dir_path)
        .expect("export du modèle entreprises");
    assert!(companies.template_path.ends_with("modele_entreprises.csv"));
    assert!(companies.values_path.ends_with("modele_entreprises_valeurs.csv"));

    let template = std::fs::read_to_string(&companies.template_path)
        .expect("relecture du modèle entreprises");
    let header = template.lines().next().expect("ligne d'entête");
    for label in ["Nom", "Secteur", "Ville", "Intérêt"] {
        assert!(header.contains(label), "entête sans « {label} » : {header}");
    }

    let values = std::fs::read_to_string(&companies.values_path)
        .expect("relecture de la notice de valeurs");
    assert!(values.contains("moyen"), "la notice cite l'intérêt de repli : {values}");

    let visits = api
        .export_template(ImportKind::Visits, dir_path)
        .expect("export du modèle visites");
    let visits_header = std::fs::read_to_string(&visits.template_path)
        .expect("relecture du modèle visites");
    assert!(visits_header.lines().next().unwrap_or("").contains("Date"));
}
