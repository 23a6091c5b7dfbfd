//! Note Keeper
//!
//! A small notes web application with:
//! - Per-user ownership: authors see and change only their own notes
//! - Slug-addressed notes, with slugs transliterated from the title on demand
//! - Cookie sessions carrying signed JWTs
//! - SQLite storage behind the `NoteStore` trait

pub mod auth;
pub mod notes;
pub mod store;
pub mod users;
pub mod web;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use store::{NoteStore, SqliteStore};
use uuid::Uuid;

/// Value of `database.path` that selects a private in-memory database.
pub const IN_MEMORY_DATABASE: &str = ":memory:";

// ============================================================================
// YAML config structs (deserialization targets)
// ============================================================================

/// Top-level YAML configuration file structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: ServerYamlConfig,
    pub database: DatabaseYamlConfig,
    pub auth: AuthYamlConfig,
}

/// Server configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerYamlConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerYamlConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8000,
        }
    }
}

/// Database configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseYamlConfig {
    /// SQLite file, or `:memory:`
    pub path: String,
}

impl Default for DatabaseYamlConfig {
    fn default() -> Self {
        Self {
            path: "notes.db".into(),
        }
    }
}

/// Auth configuration section.
///
/// Every field is optional; a missing `jwt_secret` is replaced by a random
/// per-process secret, which logs everybody out on restart.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthYamlConfig {
    pub jwt_secret: Option<String>,
    /// Session lifetime in seconds (default: 1209600 = 2 weeks)
    pub session_expiry_secs: u64,
    pub cookie_name: String,
    /// Mark the session cookie `Secure` (serve over TLS only)
    pub secure_cookies: bool,
    /// Allow new accounts via `users:signup` (default: true)
    pub allow_registration: bool,
    pub bcrypt_cost: u32,
}

impl Default for AuthYamlConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            session_expiry_secs: 1_209_600,
            cookie_name: "sessionid".into(),
            secure_cookies: false,
            allow_registration: true,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

// ============================================================================
// Runtime config (what the application actually uses)
// ============================================================================

/// Session and account settings.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HS256 signing secret for session tokens
    pub jwt_secret: String,
    pub session_expiry_secs: u64,
    pub cookie_name: String,
    pub secure_cookies: bool,
    pub allow_registration: bool,
    pub bcrypt_cost: u32,
}

impl AuthConfig {
    fn resolve(yaml: AuthYamlConfig, env_secret: Option<String>) -> Self {
        let jwt_secret = match env_secret.or(yaml.jwt_secret).filter(|s| !s.is_empty()) {
            Some(secret) => {
                if secret.len() < 32 {
                    tracing::warn!("jwt_secret is shorter than 32 characters");
                }
                secret
            }
            None => {
                tracing::warn!(
                    "No jwt_secret configured; generated a random one. Sessions will not survive a restart."
                );
                format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
            }
        };

        Self {
            jwt_secret,
            session_expiry_secs: yaml.session_expiry_secs,
            cookie_name: yaml.cookie_name,
            secure_cookies: yaml.secure_cookies,
            allow_registration: yaml.allow_registration,
            bcrypt_cost: yaml.bcrypt_cost,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_path: String,
    pub auth: AuthConfig,
}

impl Default for Config {
    /// Built-in defaults only; no file and no environment.
    fn default() -> Self {
        Self::from_yaml(YamlConfig::default(), None)
    }
}

impl Config {
    /// Load configuration from environment variables only.
    /// Equivalent to from_yaml_and_env(None).
    pub fn from_env() -> Result<Self> {
        Self::from_yaml_and_env(None)
    }

    /// Load configuration from an optional YAML file, then override with env vars.
    ///
    /// Priority: env var > YAML > default
    ///
    /// If `yaml_path` is None, tries "config.yaml" in CWD. A missing file
    /// means pure env var / defaults; a file that fails to parse is an error.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        let mut yaml = Self::load_yaml(yaml_path)?;

        if let Ok(host) = std::env::var("SERVER_HOST") {
            yaml.server.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            yaml.server.port = port;
        }
        if let Ok(path) = std::env::var("DATABASE_PATH") {
            yaml.database.path = path;
        }
        if let Ok(secure) = std::env::var("SESSION_COOKIE_SECURE") {
            yaml.auth.secure_cookies = matches!(secure.as_str(), "1" | "true" | "yes");
        }

        Ok(Self::from_yaml(yaml, std::env::var("JWT_SECRET").ok()))
    }

    fn from_yaml(yaml: YamlConfig, env_secret: Option<String>) -> Self {
        Self {
            server_host: yaml.server.host,
            server_port: yaml.server.port,
            database_path: yaml.database.path,
            auth: AuthConfig::resolve(yaml.auth, env_secret),
        }
    }

    fn load_yaml(yaml_path: Option<&Path>) -> Result<YamlConfig> {
        let default_path = Path::new("config.yaml");
        let path = yaml_path.unwrap_or(default_path);

        match std::fs::read_to_string(path) {
            Ok(contents) => {
                let config = serde_yaml::from_str(&contents)
                    .with_context(|| format!("Failed to parse {}", path.display()))?;
                tracing::info!("Loaded config from {}", path.display());
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(
                    "No config file at {}, using env vars / defaults",
                    path.display()
                );
                Ok(YamlConfig::default())
            }
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }
}

/// Open the configured database, creating the schema if needed.
pub fn open_store(config: &Config) -> Result<SqliteStore> {
    let store = if config.database_path == IN_MEMORY_DATABASE {
        SqliteStore::in_memory()
    } else {
        SqliteStore::open(&config.database_path)
    };
    store.with_context(|| format!("Failed to open database {}", config.database_path))
}

/// Open the store, build the router and serve until Ctrl-C.
pub async fn start_server(config: Config) -> Result<()> {
    let store: Arc<dyn NoteStore> = Arc::new(open_store(&config)?);
    let addr = format!("{}:{}", config.server_host, config.server_port);

    let state = web::ServerState::new(store, config);
    let app = web::create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Notes server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod config_tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_yaml_config_loading() {
        let yaml = r#"
server:
  host: 0.0.0.0
  port: 9090

database:
  path: /var/lib/notes/notes.db

auth:
  jwt_secret: "super-secret-key-min-32-characters!"
  session_expiry_secs: 3600
  cookie_name: notes_session
  secure_cookies: true
  allow_registration: false
"#;

        let yaml: YamlConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(yaml.server.host, "0.0.0.0");
        assert_eq!(yaml.server.port, 9090);
        assert_eq!(yaml.database.path, "/var/lib/notes/notes.db");
        assert_eq!(yaml.auth.session_expiry_secs, 3600);
        // Not given: default
        assert_eq!(yaml.auth.bcrypt_cost, bcrypt::DEFAULT_COST);

        let config = Config::from_yaml(yaml, None);
        assert_eq!(config.auth.jwt_secret, "super-secret-key-min-32-characters!");
        assert_eq!(config.auth.cookie_name, "notes_session");
        assert!(config.auth.secure_cookies);
        assert!(!config.auth.allow_registration);
    }

    #[test]
    fn test_yaml_defaults() {
        let config = YamlConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.database.path, "notes.db");
        assert_eq!(config.auth.cookie_name, "sessionid");
        assert!(config.auth.allow_registration);
        assert!(!config.auth.secure_cookies);
        assert!(config.auth.jwt_secret.is_none());
    }

    #[test]
    fn test_missing_secret_is_generated() {
        let a = Config::default();
        let b = Config::default();
        assert_eq!(a.auth.jwt_secret.len(), 64);
        assert_ne!(a.auth.jwt_secret, b.auth.jwt_secret);
    }

    #[test]
    fn test_env_secret_beats_yaml_secret() {
        let mut yaml = YamlConfig::default();
        yaml.auth.jwt_secret = Some("from-yaml".into());
        let config = Config::from_yaml(yaml, Some("from-env".into()));
        assert_eq!(config.auth.jwt_secret, "from-env");
    }

    #[test]
    fn test_open_store_in_memory() {
        let config = Config {
            database_path: IN_MEMORY_DATABASE.into(),
            ..Config::default()
        };
        assert!(open_store(&config).is_ok());
    }

    /// Full lifecycle test for YAML + env var configuration.
    /// Runs as a single test to avoid parallel env var race conditions.
    #[test]
    fn test_yaml_and_env_lifecycle() {
        fn clear_env() {
            for var in &[
                "SERVER_HOST",
                "SERVER_PORT",
                "DATABASE_PATH",
                "JWT_SECRET",
                "SESSION_COOKIE_SECURE",
            ] {
                std::env::remove_var(var);
            }
        }

        // --- Phase 1: YAML values loaded correctly ---
        let yaml = r#"
server:
  port: 9999
database:
  path: yaml.db
auth:
  jwt_secret: yaml-secret-yaml-secret-yaml-secret
"#;
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("config.yaml");
        let mut file = std::fs::File::create(&file_path).unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        clear_env();

        let config = Config::from_yaml_and_env(Some(&file_path)).unwrap();
        assert_eq!(config.server_port, 9999);
        assert_eq!(config.server_host, "127.0.0.1");
        assert_eq!(config.database_path, "yaml.db");
        assert_eq!(config.auth.jwt_secret, "yaml-secret-yaml-secret-yaml-secret");

        // --- Phase 2: Env vars override YAML ---
        std::env::set_var("SERVER_PORT", "7777");
        std::env::set_var("DATABASE_PATH", "env.db");
        std::env::set_var("SESSION_COOKIE_SECURE", "true");

        let config = Config::from_yaml_and_env(Some(&file_path)).unwrap();
        assert_eq!(config.server_port, 7777);
        assert_eq!(config.database_path, "env.db");
        assert!(config.auth.secure_cookies);
        // YAML value still used where no env override
        assert_eq!(config.auth.jwt_secret, "yaml-secret-yaml-secret-yaml-secret");

        clear_env();

        // --- Phase 3: No YAML file → defaults ---
        let nonexistent = dir.path().join("missing.yaml");
        let config = Config::from_yaml_and_env(Some(&nonexistent)).unwrap();
        assert_eq!(config.server_port, 8000);
        assert_eq!(config.database_path, "notes.db");

        // --- Phase 4: Broken YAML is an error, not silent defaults ---
        let broken = dir.path().join("broken.yaml");
        std::fs::write(&broken, "server: [unterminated").unwrap();
        assert!(Config::from_yaml_and_env(Some(&broken)).is_err());

        // --- Phase 5: An unreadable path is an error too ---
        let err = Config::from_yaml_and_env(Some(dir.path())).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read"));
    }
}
