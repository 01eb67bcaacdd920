// ==========================================
// Initialisation de la journalisation
// ==========================================
// S'appuie sur tracing et tracing-subscriber
// Niveau configurable par variable d'environnement
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// Initialise la journalisation
///
/// # Variables d'environnement
/// - RUST_LOG : filtre de niveau (défaut : info)
///   ex. RUST_LOG=debug ou RUST_LOG=orientation_console=trace
///
/// # Exemple
/// ```no_run
/// use orientation_console::logging;
/// logging::init();
/// ```
pub fn init() {
    // Niveau lu dans l'environnement, info par défaut
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}

/// Initialise la journalisation pour les tests
///
/// Niveau détaillé et sortie capturée par le harnais de test
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
