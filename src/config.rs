use serde::{Deserialize, Serialize};

use std::{
    env, fs,
    path::{Path, PathBuf},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database file, created on first start
    pub db_path: PathBuf,
    pub port: u16,
    /// Frontend bundle served for every path outside the API
    pub static_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./notetime.db"),
            port: 8080,
            static_dir: PathBuf::from("./frontend/build"),
        }
    }
}

fn load_from_file(path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    let contents = fs::read_to_string(path)?;
    serde_yaml::from_str(&contents).map_err(Into::into)
}

// Reads DB_PATH, PORT and STATIC_DIR; unset variables keep their defaults.
fn load_from_env() -> Result<Config, Box<dyn std::error::Error>> {
    envy::from_env::<Config>().map_err(Into::into)
}

pub fn load_config() -> Result<Config, Box<dyn std::error::Error>> {
    // Retrieve env variable
    let config_path = env::var("NOTETIME_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());

    // Try env path
    if Path::new(&config_path).exists() {
        tracing::info!("Loading configuration from '{}'", config_path);
        return load_from_file(Path::new(&config_path));
    }

    // Fallback to config.yaml
    if Path::new("config.yaml").exists() {
        tracing::warn!(
            "Config file '{}' not found, falling back to 'config.yaml'",
            config_path
        );
        return load_from_file(Path::new("config.yaml"));
    }

    // Fallback to environment variables
    tracing::info!("No config file found, loading configuration from environment variables");
    load_from_env().map_err(|e| {
        format!(
            "Config file not found and environment variables are invalid. \
             Tried: '{config_path}', 'config.yaml', and environment variables. Error: {e}"
        )
        .into()
    })
}
