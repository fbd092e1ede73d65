use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
            worker_threads: Some(4),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Redis,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_store_port")]
    pub port: u16,
    #[serde(default = "default_tls")]
    pub tls: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Redis,
            host: String::new(),
            password: String::new(),
            port: default_store_port(),
            tls: default_tls(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    5555
}

fn default_static_dir() -> String {
    "frontend".into()
}

fn default_store_port() -> u16 {
    6379
}

fn default_tls() -> bool {
    true
}

/// Load `config.toml` (or `CONFIG_PATH`), overlay the process environment and validate.
/// A missing file is not an error; every value can come from the environment.
pub fn load() -> Result<AppConfig, ConfigError> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    let mut cfg = match std::fs::read_to_string(&path) {
        Ok(content) => parse(&path, &content)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => AppConfig::default(),
        Err(source) => return Err(ConfigError::Io { path, source }),
    };
    cfg.apply_env(|key| std::env::var(key).ok())?;
    cfg.validate()?;
    Ok(cfg)
}

fn parse(path: &str, content: &str) -> Result<AppConfig, ConfigError> {
    toml::from_str(content).map_err(|source| ConfigError::Parse {
        path: path.to_string(),
        source,
    })
}

fn parse_var<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
        key,
        reason: format!("{raw:?}: {e}"),
    })
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid { key, reason: format!("{raw:?} is not a boolean") }),
    }
}

impl AppConfig {
    /// Environment values win over file values. `env` is injectable for tests.
    pub fn apply_env<F>(&mut self, env: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = env("SERVER_HOST") {
            self.server.host = v;
        }
        if let Some(v) = env("PORT") {
            self.server.port = parse_var("PORT", &v)?;
        }
        if let Some(v) = env("STATIC_DIR") {
            self.server.static_dir = v;
        }
        if let Some(v) = env("TOKIO_WORKER_THREADS") {
            self.server.worker_threads = Some(parse_var("TOKIO_WORKER_THREADS", &v)?);
        }

        if let Some(v) = env("STORE_BACKEND") {
            self.store.backend = match v.trim().to_ascii_lowercase().as_str() {
                "redis" => StoreBackend::Redis,
                "memory" => StoreBackend::Memory,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "STORE_BACKEND",
                        reason: format!("{v:?} is not one of redis, memory"),
                    })
                }
            };
        }
        if let Some(v) = env("REDIS_HOST") {
            self.store.host = v;
        }
        if let Some(v) = env("REDIS_PASSWORD") {
            self.store.password = v;
        }
        if let Some(v) = env("REDIS_PORT") {
            self.store.port = parse_var("REDIS_PORT", &v)?;
        }
        if let Some(v) = env("REDIS_TLS") {
            self.store.tls = parse_bool("REDIS_TLS", &v)?;
        }
        Ok(())
    }

    pub fn validate(&mut self) -> Result<(), ConfigError> {
        self.server.normalize()?;
        self.store.validate()
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(ConfigError::Invalid { key: "server.port", reason: "must be in 1..=65535".into() });
        }
        if self.static_dir.trim().is_empty() {
            self.static_dir = default_static_dir();
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl StoreConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend == StoreBackend::Memory {
            return Ok(());
        }
        if self.host.trim().is_empty() {
            return Err(ConfigError::Missing("REDIS_HOST"));
        }
        if self.password.is_empty() {
            return Err(ConfigError::Missing("REDIS_PASSWORD"));
        }
        if self.port == 0 {
            return Err(ConfigError::Invalid { key: "REDIS_PORT", reason: "must be in 1..=65535".into() });
        }
        Ok(())
    }
}
