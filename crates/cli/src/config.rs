//! CLI configuration utilities

use crate::console::{ConsoleNavigator, ConsoleNotifier};
use anyhow::{Context, Result};
use roombook_core::{ClientSettings, FileStore, Session};
use roombook_http::{ApiClient, ApiClientBuilder, NavigationController};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Load client settings, letting `--data-dir` override the configured one
pub fn load_settings(path: Option<&Path>, data_dir: Option<PathBuf>) -> Result<ClientSettings> {
    let mut settings =
        ClientSettings::load_from(path).context("Failed to load roombook configuration")?;
    if data_dir.is_some() {
        settings.data_dir = data_dir;
    }
    Ok(settings)
}

/// Session persisted in the data directory
pub fn open_session(settings: &ClientSettings) -> Result<Session> {
    let path = settings.credentials_file();
    let store = FileStore::open(&path)
        .with_context(|| format!("Failed to open credential store {}", path.display()))?;
    Ok(Session::new(Arc::new(store)))
}

/// Client wired to the console notifier and navigator
pub fn build_client(settings: &ClientSettings) -> Result<ApiClient> {
    let session = open_session(settings)?;
    let navigation = Arc::new(
        NavigationController::new(Arc::new(ConsoleNavigator)).with_session(session.clone()),
    );

    let client = ApiClientBuilder::from_settings(settings)
        .session(session)
        .notifier(Arc::new(ConsoleNotifier))
        .navigation(navigation)
        .build()?;
    Ok(client)
}
