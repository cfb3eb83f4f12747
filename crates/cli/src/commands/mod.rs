//! Command implementations, one module per resource.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod jobs;
pub mod orders;

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use madina_client::{ApiConfig, FileSessionStore, MadinaClient};
use madina_core::{Action, Role};

/// Result type shared by all commands.
pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Build the API client from the environment.
///
/// Session state persists in `MADINA_SESSION_FILE` when set, otherwise in
/// `~/.madina/session.json`.
pub fn build_client() -> Result<MadinaClient, Box<dyn std::error::Error>> {
    let config = ApiConfig::from_env()?;
    let path = config
        .session_file
        .clone()
        .unwrap_or_else(default_session_file);

    let store = Arc::new(FileSessionStore::new(path));
    Ok(MadinaClient::new(&config, store)?)
}

fn default_session_file() -> PathBuf {
    std::env::var_os("HOME").map_or_else(
        || PathBuf::from(".madina-session.json"),
        |home| PathBuf::from(home).join(".madina").join("session.json"),
    )
}

/// Check the stored role against the single authorization decision function.
///
/// Anonymous callers count as customers, which grants only the public
/// actions; everything else fails before a request is issued.
pub async fn require(client: &MadinaClient, action: Action) -> CommandResult {
    let role = client
        .auth()
        .current_user()
        .await?
        .map_or(Role::Customer, |profile| profile.role);

    if role.can(action) {
        Ok(())
    } else {
        Err(format!("the {role} role is not allowed to do this").into())
    }
}

/// Read a value interactively when it was not passed as a flag.
pub fn prompt(label: &str) -> Result<String, std::io::Error> {
    let mut stdout = std::io::stdout();
    write!(stdout, "{label}: ")?;
    stdout.flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}

/// Resolve a flag-or-prompt value.
pub fn flag_or_prompt(value: Option<String>, label: &str) -> Result<String, std::io::Error> {
    match value {
        Some(v) => Ok(v),
        None => prompt(label),
    }
}
