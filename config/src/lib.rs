//! Configuration for shuttle: XDG `config.toml` and project `.env` are merged into the process
//! environment with priority **existing env > .env > XDG**, then [`ModelSettings`] reads the
//! model connection from the environment.

mod dotenv;
mod settings;
mod xdg;

pub use settings::{
    parse_temperature, parse_timeout, ModelSettings, Provider, SettingsError,
    DEFAULT_GEMINI_MODEL, DEFAULT_OPENAI_MODEL,
};
pub use xdg::{config_path, ModelTable};

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("xdg config path: {0}")]
    XdgPath(String),
    #[error("read xdg config: {0}")]
    XdgRead(std::io::Error),
    #[error("parse xdg toml: {0}")]
    XdgParse(#[from] toml::de::Error),
    #[error("read .env: {0}")]
    DotenvRead(std::io::Error),
}

/// Variables to set: for each key in either source that `is_set` rejects, the `.env` value,
/// else the XDG value. Sorted by key.
fn pending_vars<F>(
    dotenv: &HashMap<String, String>,
    xdg: &HashMap<String, String>,
    is_set: F,
) -> Vec<(String, String)>
where
    F: Fn(&str) -> bool,
{
    let mut out: Vec<(String, String)> = xdg
        .iter()
        .filter(|(k, _)| !dotenv.contains_key(*k))
        .chain(dotenv.iter())
        .filter(|(k, _)| !is_set(k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    out.sort();
    out
}

/// Loads `$XDG_CONFIG_HOME/<app_name>/config.toml` and `.env` (from `override_dir`, else the
/// current directory) and sets every variable that is not already set in the process.
///
/// Returns the names of the variables that were set.
pub fn load_and_apply(app_name: &str, override_dir: Option<&Path>) -> Result<Vec<String>, LoadError> {
    let xdg_vars = xdg::load_file(&xdg::config_path(app_name)?)?;
    let dotenv_vars = dotenv::load(override_dir).map_err(LoadError::DotenvRead)?;

    let pending = pending_vars(&dotenv_vars, &xdg_vars, |k| std::env::var_os(k).is_some());
    let mut applied = Vec::with_capacity(pending.len());
    for (key, value) in pending {
        std::env::set_var(&key, value);
        applied.push(key);
    }
    Ok(applied)
}
