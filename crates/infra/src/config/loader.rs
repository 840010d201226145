//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file (JSON or TOML)
//!
//! ## Environment Variables
//! - `SLATED_DB_PATH`: Database file path
//! - `SLATED_DB_POOL_SIZE`: Connection pool size (default 4)
//! - `SLATED_ENCRYPTION_KEY`: 32-byte token encryption key (required)
//! - `SLATED_APP_KEY`: shared secret for inbound request signatures
//! - `SLATED_GOOGLE_CLIENT_ID` / `SLATED_GOOGLE_CLIENT_SECRET` /
//!   `SLATED_GOOGLE_REDIRECT_URI`: OAuth client
//! - `SLATED_EXTRACTOR_API_KEY`: extractor API key
//! - `SLATED_EXTRACTOR_API_URL`, `SLATED_EXTRACTOR_MODEL`: optional overrides
//! - `SLATED_PORT`: HTTP port (default 3000)
//! - `SLATED_WORK_HOURS`: work window, "HH:MM-HH:MM" (default 09:00-18:00)

use std::path::{Path, PathBuf};

use slated_domain::{
    Config, DatabaseConfig, ExtractorConfig, GoogleConfig, Result, SecurityConfig, ServerConfig,
    SlatedError, WorkWindow,
};

/// Load configuration with automatic fallback strategy.
///
/// # Errors
/// Returns `SlatedError::Config` if configuration cannot be loaded from
/// either source, or fails validation.
pub fn load() -> Result<Config> {
    let config = match load_from_env() {
        Ok(config) => {
            tracing::info!("configuration loaded from environment variables");
            config
        }
        Err(e) => {
            tracing::debug!(error = ?e, "environment incomplete, trying config file");
            load_from_file(None)?
        }
    };
    validate(&config)?;
    Ok(config)
}

/// Load configuration from environment variables. All required variables must
/// be present.
pub fn load_from_env() -> Result<Config> {
    Ok(Config {
        database: DatabaseConfig {
            path: env_var("SLATED_DB_PATH")?,
            pool_size: env_parse("SLATED_DB_POOL_SIZE", 4)?,
        },
        security: SecurityConfig {
            encryption_key: env_var("SLATED_ENCRYPTION_KEY")?,
            app_key: env_var("SLATED_APP_KEY")?,
        },
        google: GoogleConfig {
            client_id: env_var("SLATED_GOOGLE_CLIENT_ID")?,
            client_secret: env_var("SLATED_GOOGLE_CLIENT_SECRET")?,
            redirect_uri: env_var("SLATED_GOOGLE_REDIRECT_URI")?,
        },
        extractor: ExtractorConfig {
            api_key: env_var("SLATED_EXTRACTOR_API_KEY")?,
            api_url: std::env::var("SLATED_EXTRACTOR_API_URL")
                .unwrap_or_else(|_| "https://api.perplexity.ai/chat/completions".to_string()),
            model: std::env::var("SLATED_EXTRACTOR_MODEL")
                .unwrap_or_else(|_| "sonar".to_string()),
        },
        server: ServerConfig {
            port: env_parse("SLATED_PORT", 3000)?,
            work_hours: std::env::var("SLATED_WORK_HOURS")
                .unwrap_or_else(|_| "09:00-18:00".to_string()),
        },
    })
}

/// Load configuration from a JSON or TOML file (detected by extension).
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(SlatedError::Config(format!(
                    "config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            SlatedError::Config("no config file found in any standard location".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| SlatedError::Config(format!("failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| SlatedError::Config(format!("invalid TOML config: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| SlatedError::Config(format!("invalid JSON config: {e}"))),
        _ => Err(SlatedError::Config(format!("unsupported config format: {extension}"))),
    }
}

fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend([
            cwd.join("config.json"),
            cwd.join("config.toml"),
            cwd.join("slated.json"),
            cwd.join("slated.toml"),
        ]);
    }
    candidates.into_iter().find(|path| path.exists())
}

/// Startup validation. A wrong-length encryption key or unparseable work
/// window must fail here, not at first use.
fn validate(config: &Config) -> Result<()> {
    if config.security.encryption_key.len() != 32 {
        return Err(SlatedError::Config(format!(
            "SLATED_ENCRYPTION_KEY must be exactly 32 bytes, got {}",
            config.security.encryption_key.len()
        )));
    }
    if config.security.app_key.is_empty() {
        return Err(SlatedError::Config("SLATED_APP_KEY must not be empty".into()));
    }
    WorkWindow::parse(&config.server.work_hours)?;
    Ok(())
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| SlatedError::Config(format!("missing required environment variable: {key}")))
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| SlatedError::Config(format!("invalid value for {key}: {raw:?}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ALL_VARS: &[&str] = &[
        "SLATED_DB_PATH",
        "SLATED_DB_POOL_SIZE",
        "SLATED_ENCRYPTION_KEY",
        "SLATED_APP_KEY",
        "SLATED_GOOGLE_CLIENT_ID",
        "SLATED_GOOGLE_CLIENT_SECRET",
        "SLATED_GOOGLE_REDIRECT_URI",
        "SLATED_EXTRACTOR_API_KEY",
        "SLATED_PORT",
        "SLATED_WORK_HOURS",
    ];

    fn clear_env() {
        for var in ALL_VARS {
            std::env::remove_var(var);
        }
    }

    fn set_required_env() {
        std::env::set_var("SLATED_DB_PATH", "/tmp/slated-test.db");
        std::env::set_var("SLATED_ENCRYPTION_KEY", "0123456789abcdef0123456789abcdef");
        std::env::set_var("SLATED_APP_KEY", "cliq-shared-secret");
        std::env::set_var("SLATED_GOOGLE_CLIENT_ID", "client-id");
        std::env::set_var("SLATED_GOOGLE_CLIENT_SECRET", "client-secret");
        std::env::set_var("SLATED_GOOGLE_REDIRECT_URI", "http://localhost:3000/oauth/callback");
        std::env::set_var("SLATED_EXTRACTOR_API_KEY", "pplx-key");
    }

    #[test]
    fn loads_from_env_with_defaults() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        set_required_env();

        let config = load_from_env().unwrap();
        assert_eq!(config.database.pool_size, 4);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.work_hours, "09:00-18:00");
        assert_eq!(config.extractor.model, "sonar");
        validate(&config).unwrap();

        clear_env();
    }

    #[test]
    fn missing_required_var_is_a_config_error() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();

        let err = load_from_env().unwrap_err();
        assert!(matches!(err, SlatedError::Config(_)));
    }

    #[test]
    fn short_encryption_key_fails_validation() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        set_required_env();
        std::env::set_var("SLATED_ENCRYPTION_KEY", "too-short");

        let config = load_from_env().unwrap();
        let err = validate(&config).unwrap_err();
        assert!(matches!(err, SlatedError::Config(_)));

        clear_env();
    }

    #[test]
    fn loads_from_toml_file() {
        let toml_content = r#"
[database]
path = "slated.db"
pool_size = 2

[security]
encryption_key = "0123456789abcdef0123456789abcdef"
app_key = "secret"

[google]
client_id = "id"
client_secret = "secret"
redirect_uri = "http://localhost:3000/oauth/callback"

[extractor]
api_key = "key"

[server]
port = 8080
"#;
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        let path = temp_file.path().with_extension("toml");
        std::fs::copy(temp_file.path(), &path).unwrap();

        let config = load_from_file(Some(path.clone())).unwrap();
        assert_eq!(config.database.pool_size, 2);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.work_hours, "09:00-18:00");

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/config.json")));
        assert!(matches!(result, Err(SlatedError::Config(_))));
    }
}
