use serde::Deserialize;

static CONFIG: OnceCell<Config> = OnceCell::const_new();

mod config_dir;
pub use config_dir::{find_config_file, read_config};

mod error;
pub use error::{ConfigError, ConfigResult};
use tokio::sync::OnceCell;

/// Overrides `database.uri` when set.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Deserialize)]
pub struct Config {
    database: Database,
}

#[derive(Debug, Deserialize)]
pub struct Database {
    uri: String,
    #[serde(default = "default_max_connections")]
    max_connections: u32,
}

fn default_max_connections() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

impl Config {
    #[tracing::instrument]
    pub async fn get_or_init(use_local: bool) -> ConfigResult<&'static Config> {
        CONFIG
            .get_or_try_init(|| async {
                let mut config = match read_config(use_local) {
                    Ok(bytes) => Self::from_slice(&bytes)?,
                    Err(ConfigError::ConfigNotFound { path }) => match std::env::var(DATABASE_URL_ENV) {
                        Ok(uri) => {
                            tracing::debug!("no config at {}, using {DATABASE_URL_ENV}", path.display());
                            Self::with_uri(uri)
                        }
                        Err(_) => return Err(ConfigError::ConfigNotFound { path }),
                    },
                    Err(e) => return Err(e),
                };
                config.apply_env();
                Ok::<_, ConfigError>(config)
            })
            .await
    }

    /// Config with only a database uri, every other setting at its default.
    pub fn with_uri(uri: impl Into<String>) -> Self {
        Self {
            database: Database {
                uri: uri.into(),
                max_connections: DEFAULT_MAX_CONNECTIONS,
            },
        }
    }

    pub fn from_slice(bytes: &[u8]) -> ConfigResult<Self> {
        let config: Self = toml::from_slice(bytes)?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(uri) = std::env::var(DATABASE_URL_ENV) {
            tracing::debug!("database uri taken from {DATABASE_URL_ENV}");
            self.database.uri = uri;
        }
    }

    #[inline]
    pub fn database(&self) -> &Database {
        &self.database
    }
}

impl Database {
    #[inline]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    #[inline]
    pub fn max_connections(&self) -> u32 {
        self.max_connections
    }
}
