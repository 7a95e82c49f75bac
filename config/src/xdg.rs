//! `$XDG_CONFIG_HOME/<app>/config.toml`: an `[env]` table of raw variables and a typed
//! `[model]` table.
//!
//! ```toml
//! [env]
//! OPENAI_API_KEY = "sk-..."
//!
//! [model]
//! name = "gpt-4o-mini"
//! base_url = "https://api.openai.com/v1"
//! temperature = 0.2
//! timeout_secs = 60
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::LoadError;

/// `[model]` table. Each field maps onto the variable `ModelSettings` reads.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ModelTable {
    pub name: Option<String>,
    pub base_url: Option<String>,
    pub temperature: Option<f32>,
    pub timeout_secs: Option<u64>,
}

impl ModelTable {
    fn into_env(self) -> impl Iterator<Item = (String, String)> {
        [
            ("MODEL", self.name),
            ("OPENAI_BASE_URL", self.base_url),
            ("SHUTTLE_TEMPERATURE", self.temperature.map(|t| t.to_string())),
            ("SHUTTLE_MODEL_TIMEOUT_SECS", self.timeout_secs.map(|t| t.to_string())),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k.to_string(), v)))
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    env: HashMap<String, String>,
    #[serde(default)]
    model: ModelTable,
}

/// Base config directory: `XDG_CONFIG_HOME` when set, else the platform default.
fn config_home() -> Result<PathBuf, LoadError> {
    match std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        Some(dir) => Ok(PathBuf::from(dir)),
        None => dirs::config_dir()
            .ok_or_else(|| LoadError::XdgPath("no config directory for this platform".into())),
    }
}

/// Path of the app's `config.toml` (which may not exist).
pub fn config_path(app_name: &str) -> Result<PathBuf, LoadError> {
    Ok(config_home()?.join(app_name).join("config.toml"))
}

/// Variables from the file at `path`: the `[model]` table first, then `[env]` entries, which
/// win on conflicts. A missing file is an empty map.
pub(crate) fn load_file(path: &Path) -> Result<HashMap<String, String>, LoadError> {
    if !path.is_file() {
        return Ok(HashMap::new());
    }
    let content = std::fs::read_to_string(path).map_err(LoadError::XdgRead)?;
    let file: ConfigFile = toml::from_str(&content)?;
    let mut vars: HashMap<String, String> = file.model.into_env().collect();
    vars.extend(file.env);
    Ok(vars)
}
