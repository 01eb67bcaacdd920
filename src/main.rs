// ==========================================
// Console Orientation - Entrée en ligne de commande
// ==========================================
// Commandes :
//   entreprises <fichier>... [--operateur <nom>]
//   visites <fichier>...     [--operateur <nom>]
//   modele <entreprises|visites> [dossier]
//   historique [n]
//   purge
// ==========================================

use orientation_console::api::{ApiError, ImportApi, ImportApiResponse};
use orientation_console::db;
use orientation_console::domain::types::ImportKind;
use orientation_console::i18n::{self, t};
use orientation_console::logging;
use std::process::ExitCode;
use tracing::{error, info};

const USAGE: &str = "\
Console Orientation - imports en masse

Usage :
  orientation-console entreprises <fichier>... [--operateur <nom>]
  orientation-console visites <fichier>...     [--operateur <nom>]
  orientation-console modele <entreprises|visites> [dossier]
  orientation-console historique [n]
  orientation-console purge

Variables :
  ORIENTATION_DB   chemin du fichier SQLite (sinon répertoire de données)
  RUST_LOG         niveau de journalisation (info par défaut)
";

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();
    // Console francophone : messages de synthèse en français
    i18n::set_locale("fr");

    info!("==================================================");
    info!(
        "{} - v{}",
        orientation_console::APP_NAME,
        orientation_console::VERSION
    );
    info!("==================================================");

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(erreur = %e, "commande en échec");
            eprintln!("Erreur : {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &[String]) -> Result<(), ApiError> {
    let Some(command) = args.first() else {
        print!("{USAGE}");
        return Ok(());
    };

    if matches!(command.as_str(), "-h" | "--help" | "aide") {
        print!("{USAGE}");
        return Ok(());
    }

    let db_path = db::default_db_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    info!(base = %db_path.display(), "magasin SQLite");
    let api = ImportApi::new(&db_path.to_string_lossy())?;

    match command.as_str() {
        "entreprises" => import_files(&api, ImportKind::Companies, &args[1..]).await,
        "visites" => import_files(&api, ImportKind::Visits, &args[1..]).await,
        "modele" => export_template(&api, &args[1..]),
        "historique" => show_history(&api, &args[1..]).await,
        "purge" => purge(&api).await,
        other => {
            print!("{USAGE}");
            Err(ApiError::InvalidInput(format!("commande inconnue : {other}")))
        }
    }
}

/// Sépare les fichiers de l'option `--operateur`
fn split_import_args(rest: &[String]) -> Result<(Vec<String>, Option<String>), ApiError> {
    let mut files = Vec::new();
    let mut operator = None;
    let mut iter = rest.iter();
    while let Some(arg) = iter.next() {
        if arg == "--operateur" {
            let name = iter.next().ok_or_else(|| {
                ApiError::InvalidInput("--operateur attend un nom".to_string())
            })?;
            operator = Some(name.clone());
        } else {
            files.push(arg.clone());
        }
    }
    Ok((files, operator))
}

async fn import_files(api: &ImportApi, kind: ImportKind, rest: &[String]) -> Result<(), ApiError> {
    let (files, operator) = split_import_args(rest)?;
    if files.is_empty() {
        return Err(ApiError::InvalidInput(
            "aucun fichier à importer".to_string(),
        ));
    }

    // Fichier unique : erreur typée remontée telle quelle
    if let [file] = files.as_slice() {
        let response = match kind {
            ImportKind::Companies => api.import_companies(file, operator.as_deref()).await?,
            ImportKind::Visits => api.import_visits(file, operator.as_deref()).await?,
        };
        print_response(&response);
        return Ok(());
    }

    // Plusieurs fichiers : chaque job rend son propre verdict
    let results = api.import_many(kind, &files, operator.as_deref()).await;
    for (file, result) in files.iter().zip(results) {
        println!();
        println!("=== {file} ===");
        match result {
            Ok(response) => print_response(&response),
            Err(message) => println!("Erreur : {message}"),
        }
    }
    Ok(())
}

fn print_response(response: &ImportApiResponse) {
    println!("{}", response.message);
    println!("  lot             : {}", response.batch_id);
    println!("  lignes lues     : {}", response.total_rows);
    println!("  importées       : {}", response.imported);
    println!("  ignorées        : {}", response.skipped);
    println!("  en échec        : {}", response.failed);
    println!("  entités créées  : {}", response.created_entities);

    if !response.report.errors.is_empty() {
        println!("  erreurs :");
        for err in &response.report.errors {
            println!("    ligne {} : {}", err.row_number, err.message);
        }
    }
    if !response.report.warnings.is_empty() {
        println!("  avertissements :");
        for warning in &response.report.warnings {
            println!("    ligne {} : {}", warning.row_number, warning.message);
        }
    }
}

fn export_template(api: &ImportApi, rest: &[String]) -> Result<(), ApiError> {
    let kind = match rest.first().map(String::as_str) {
        Some("entreprises") => ImportKind::Companies,
        Some("visites") => ImportKind::Visits,
        other => {
            return Err(ApiError::InvalidInput(format!(
                "type de modèle attendu : entreprises ou visites (reçu : {})",
                other.unwrap_or("rien")
            )))
        }
    };
    let dir = rest.get(1).map(String::as_str).unwrap_or(".");

    let response = api.export_template(kind, dir)?;
    println!("Modèle écrit  : {}", response.template_path);
    println!("Notice écrite : {}", response.values_path);
    Ok(())
}

async fn show_history(api: &ImportApi, rest: &[String]) -> Result<(), ApiError> {
    let limit = rest
        .first()
        .and_then(|raw| raw.parse::<usize>().ok())
        .unwrap_or(10);

    let batches = api.list_recent_batches(limit).await?;
    if batches.is_empty() {
        println!("{}", t("import.history_empty"));
        return Ok(());
    }

    for batch in batches {
        println!(
            "{}  {:<11}  {:<28}  lignes {:>4}  importées {:>4}  ignorées {:>3}  échecs {:>3}  créées {:>3}  par {}",
            batch.imported_at.format("%Y-%m-%d %H:%M"),
            batch.kind.to_string(),
            batch.file.as_deref().unwrap_or("-"),
            batch.total_rows,
            batch.imported,
            batch.skipped,
            batch.failed,
            batch.created_entities,
            batch.imported_by.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}

async fn purge(api: &ImportApi) -> Result<(), ApiError> {
    let purged = api.purge_old_batches().await?;
    println!("Traces d'import supprimées : {purged}");
    Ok(())
}
