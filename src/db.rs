// ==========================================
// Console Orientation - Connexion SQLite
// ==========================================
// Objectifs :
// - uniformiser les PRAGMA de toutes les connexions (foreign_keys,
//   busy_timeout) pour éviter les comportements divergents entre modules
// - créer le schéma à l'ouverture (CREATE TABLE IF NOT EXISTS) ;
//   il s'agit d'une initialisation, pas d'une migration
// ==========================================

use rusqlite::Connection;
use std::path::PathBuf;
use std::time::Duration;

/// busy_timeout par défaut (millisecondes)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Nom du fichier de base par défaut
pub const DEFAULT_DB_FILE: &str = "orientation.db";

/// Applique les PRAGMA uniformes à une connexion SQLite
///
/// Note :
/// - foreign_keys doit être activé connexion par connexion
/// - busy_timeout se configure connexion par connexion
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// Ouvre une connexion SQLite et lui applique la configuration uniforme
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// Chemin de base par défaut : `$ORIENTATION_DB` sinon le répertoire de
/// données utilisateur (`~/.local/share/orientation-console/orientation.db`)
pub fn default_db_path() -> PathBuf {
    if let Ok(path) = std::env::var("ORIENTATION_DB") {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    let mut dir = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    dir.push("orientation-console");
    dir.push(DEFAULT_DB_FILE);
    dir
}

/// Crée les tables si elles n'existent pas encore
///
/// Remarque : aucune contrainte UNIQUE sur `secteur.libelle` ni sur
/// `entreprise.nom` — le magasin ne dédoublonne pas côté serveur, c'est
/// le pipeline d'import qui porte cette garantie.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS secteur (
            secteur_id   INTEGER PRIMARY KEY AUTOINCREMENT,
            libelle      TEXT NOT NULL,
            created_at   TEXT NOT NULL,
            updated_at   TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS entreprise (
            entreprise_id   INTEGER PRIMARY KEY AUTOINCREMENT,
            nom             TEXT NOT NULL,
            secteur_id      INTEGER REFERENCES secteur(secteur_id),
            adresse         TEXT,
            ville           TEXT,
            contact         TEXT,
            telephone       TEXT,
            email           TEXT,
            effectif        INTEGER,
            niveau_interet  TEXT NOT NULL DEFAULT 'MOYEN',
            commentaire     TEXT,
            created_at      TEXT NOT NULL,
            updated_at      TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS visite_entreprise (
            visite_id       INTEGER PRIMARY KEY AUTOINCREMENT,
            entreprise_id   INTEGER NOT NULL REFERENCES entreprise(entreprise_id),
            date_visite     TEXT NOT NULL,
            intervenant     TEXT,
            nb_participants INTEGER,
            niveau_interet  TEXT NOT NULL DEFAULT 'MOYEN',
            compte_rendu    TEXT,
            created_at      TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS import_batch (
            batch_id         TEXT PRIMARY KEY,
            type_import      TEXT NOT NULL,
            fichier          TEXT,
            lignes_total     INTEGER NOT NULL DEFAULT 0,
            lignes_importees INTEGER NOT NULL DEFAULT 0,
            lignes_ignorees  INTEGER NOT NULL DEFAULT 0,
            lignes_echec     INTEGER NOT NULL DEFAULT 0,
            entites_creees   INTEGER NOT NULL DEFAULT 0,
            rapport_json     TEXT,
            importe_par      TEXT,
            importe_le       TEXT NOT NULL,
            duree_ms         INTEGER
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id  TEXT NOT NULL,
            key       TEXT NOT NULL,
            value     TEXT NOT NULL,
            PRIMARY KEY (scope_id, key)
        );",
    )
}

/// Ouvre une connexion et initialise le schéma dans la foulée
pub fn open_and_init(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = open_sqlite_connection(db_path)?;
    init_schema(&conn)?;
    Ok(conn)
}
