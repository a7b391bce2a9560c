use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

/// Default TOML file merged over the built-in defaults, if present.
pub const CONFIG_FILE_PATH: &str = "config.toml";

/// Env var overriding [`CONFIG_FILE_PATH`].
pub const CONFIG_PATH_ENV: &str = "CODEGATE_CONFIG";

/// Prefix shared by every environment override.
pub const ENV_PREFIX: &str = "CODEGATE_";

/// Which of the demo services the process serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    /// Fixed status routes behind the API-key gate.
    #[default]
    Codes,
    /// `/users` list/insert plus `/okCode`, behind the API-key gate.
    Users,
    /// Fixed status routes with no gate at all.
    Swagger,
}

impl ServiceKind {
    pub fn is_gated(self) -> bool {
        !matches!(self, ServiceKind::Swagger)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ServiceKind::Codes => "codes",
            ServiceKind::Users => "users",
            ServiceKind::Swagger => "swagger",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceKind,
    pub listen_addr: String,
    pub loglevel: String,
    /// Expected `X-API-Key` value.
    pub api_key: Option<String>,
    /// Database connection string, e.g. `sqlite:users.db`.
    pub default_connection: Option<String>,
    /// Create the `users` table at startup when missing.
    pub init_schema: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceKind::default(),
            listen_addr: "0.0.0.0:8080".to_string(),
            loglevel: "info".to_string(),
            api_key: None,
            default_connection: None,
            init_schema: false,
        }
    }
}

impl Config {
    /// Defaults, then the TOML file, then `CODEGATE_*` env vars.
    pub fn figment() -> Figment {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| CONFIG_FILE_PATH.to_string());
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).ignore(&["CONFIG"]))
    }

    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract::<Config>().map(Config::normalized)
    }

    /// Blank secrets are the same as unset ones.
    fn normalized(mut self) -> Self {
        self.api_key = self.api_key.filter(|k| !k.trim().is_empty());
        self.default_connection = self.default_connection.filter(|c| !c.trim().is_empty());
        self
    }
}
