use anyhow::{anyhow, Result};
use config::Config;
use std::collections::HashMap;
use std::path::Path;

/// Process-wide configuration for the data-access layer.
pub struct QuarryConfig {
    /// Path to the SQLite database file (the database endpoint).
    pub db_path: String,

    /// File the log sink appends to.
    pub log_path: String,

    /// Recipient for ALERT-and-above mail records.
    pub admin_email: String,

    /// Channel name stamped on every log line.
    pub channel: String,
}

const EMPTY_CONFIG: &str = r#"### quarry configuration file

### path to the SQLite database file
# db_path = "~/.quarry/quarry.sqlite3"

### file the log sink appends to
# log_path = "~/.quarry/quarry.log"

### recipient for ALERT-and-above mail records
# admin_email = "ops@example.com"

### channel name stamped on every log line
# channel = "quarry"
"#;

const DEFAULT_ADMIN_EMAIL: &str = "root@localhost";
const DEFAULT_CHANNEL: &str = "quarry";

impl Default for QuarryConfig {
    fn default() -> Self {
        let home_dir = dirs::home_dir()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|| ".".to_string());

        Self {
            db_path: format!("{}/.quarry/quarry.sqlite3", home_dir),
            log_path: format!("{}/.quarry/quarry.log", home_dir),
            admin_email: DEFAULT_ADMIN_EMAIL.to_string(),
            channel: DEFAULT_CHANNEL.to_string(),
        }
    }
}

impl QuarryConfig {
    /// Function to create and initialize a new configuration
    pub fn new(path: &Option<String>) -> Result<QuarryConfig> {
        // load `.env` first so the environment source below sees it
        dotenvy::dotenv().ok();

        let mut builder = Config::builder();

        // By default use $HOME/.quarry/quarry.toml as the configuration file path
        let home_dir = dirs::home_dir()
            .ok_or_else(|| anyhow!("Could not find home directory"))?
            .to_str()
            .ok_or_else(|| anyhow!("Could not convert home directory path to string"))?
            .to_owned();

        // Config dir
        let quarry_dir = format!("{}/.quarry", home_dir.as_str());

        // Add in toml configuration file
        match path {
            Some(p) => {
                let path = Path::new(p.as_str());
                if path.exists() {
                    let path_str = path
                        .to_str()
                        .ok_or_else(|| anyhow!("Could not convert path to string"))?;
                    builder = builder.add_source(config::File::with_name(path_str));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG)
                        .map_err(|e| anyhow!("Unable to create config file: {}", e))?;
                }
            }
            None => {
                std::fs::create_dir_all(quarry_dir.as_str())
                    .map_err(|e| anyhow!("Unable to create quarry directory: {}", e))?;
                let p = format!("{}/quarry.toml", quarry_dir.as_str());
                if Path::new(p.as_str()).exists() {
                    builder = builder.add_source(config::File::with_name(p.as_str()));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG).map_err(|e| {
                        anyhow!("Unable to create config file {}: {}", p.as_str(), e)
                    })?;
                }
            }
        }

        // Add in settings from the environment (with a prefix of QUARRY)
        // E.g., `QUARRY_DB_PATH=/tmp/app.sqlite3` would set the database path
        builder = builder.add_source(config::Environment::with_prefix("QUARRY"));

        let settings = builder
            .build()
            .map_err(|e| anyhow!("Failed to build configuration: {}", e))?;

        let config = settings
            .try_deserialize::<HashMap<String, String>>()
            .map_err(|e| anyhow!("Failed to deserialize configuration: {}", e))?;

        let db_path = config
            .get("db_path")
            .cloned()
            .unwrap_or_else(|| format!("{}/quarry.sqlite3", quarry_dir.as_str()));

        let log_path = config
            .get("log_path")
            .cloned()
            .unwrap_or_else(|| format!("{}/quarry.log", quarry_dir.as_str()));

        let admin_email = config
            .get("admin_email")
            .cloned()
            .unwrap_or_else(|| DEFAULT_ADMIN_EMAIL.to_string());

        let channel = config
            .get("channel")
            .cloned()
            .unwrap_or_else(|| DEFAULT_CHANNEL.to_string());

        Ok(QuarryConfig {
            db_path,
            log_path,
            admin_email,
            channel,
        })
    }

    /// Get the config file path
    pub fn config_file_path() -> String {
        let home_dir = dirs::home_dir()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|| "~".to_string());
        format!("{}/.quarry/quarry.toml", home_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = QuarryConfig::default();
        assert!(config.db_path.ends_with(".quarry/quarry.sqlite3"));
        assert!(config.log_path.ends_with(".quarry/quarry.log"));
        assert_eq!(config.admin_email, "root@localhost");
        assert_eq!(config.channel, "quarry");
    }

    #[test]
    fn test_explicit_paths() {
        let config = QuarryConfig {
            db_path: "/srv/app/app.sqlite3".to_string(),
            log_path: "/var/log/app.log".to_string(),
            admin_email: "ops@example.com".to_string(),
            channel: "app".to_string(),
        };

        assert_eq!(config.db_path, "/srv/app/app.sqlite3");
        assert_eq!(config.log_path, "/var/log/app.log");
    }

    #[test]
    fn test_config_file_path() {
        assert!(QuarryConfig::config_file_path().ends_with(".quarry/quarry.toml"));
    }
}
