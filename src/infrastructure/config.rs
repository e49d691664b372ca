use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_pool_max")]
    pub max_connections: u32,
    #[serde(default = "default_fetch_size")]
    pub fetch_size: usize,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AuthConfig {
    #[serde(default)]
    pub api_token: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            uri: String::new(),
            username: String::new(),
            password: String::new(),
            max_connections: default_pool_max(),
            fetch_size: default_fetch_size(),
        }
    }
}

impl DatabaseConfig {
    pub fn is_memory(&self) -> bool {
        self.provider == "memory"
    }
}

impl Config {
    /// Loads `config.*` (optional) and `GRAPH_API__*` variables, then fills
    /// blank required settings from `DB_URI`, `DB_USERNAME`, `DB_PASSWORD`
    /// and `API_TOKEN`. Every setting still missing is reported at once.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("GRAPH_API").separator("__"));
        let cfg = builder.build()?;
        let mut config: Config = cfg.try_deserialize()?;

        let mut missing = Vec::new();
        if !config.database.is_memory() {
            fill_required(&mut config.database.uri, "DB_URI", &mut missing);
            fill_required(&mut config.database.username, "DB_USERNAME", &mut missing);
            fill_required(&mut config.database.password, "DB_PASSWORD", &mut missing);
        }
        fill_required(&mut config.auth.api_token, "API_TOKEN", &mut missing);

        if !missing.is_empty() {
            return Err(config::ConfigError::Message(format!(
                "Missing required settings: {}",
                missing.join(", ")
            )));
        }

        Ok(config)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.app.host, self.app.port)
    }
}

fn fill_required(slot: &mut String, fallback: &'static str, missing: &mut Vec<&'static str>) {
    if !slot.trim().is_empty() {
        return;
    }
    match env::var(fallback) {
        Ok(value) if !value.trim().is_empty() => *slot = value,
        _ => missing.push(fallback),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_provider() -> String {
    "neo4j".to_string()
}

fn default_pool_max() -> u32 {
    16
}

fn default_fetch_size() -> usize {
    256
}
