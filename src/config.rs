use serde::Deserialize;
use std::time::Duration;

/// Config, from a TOML file named as the first CLI argument.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// <address>:<port> to serve the board on
    pub listen_address: String,

    /// <address>:<port> to serve metrics on
    pub metrics_address: String,

    /// By default, output JSON logs. Only if this flag is set to true, output colourful human-friendly logs
    pub human_logs: bool,

    /// Max form body size the board accepts
    #[serde(default = "max_form_size")]
    pub max_form_size: usize,

    /// DSN to connect to the database.
    pub db_dsn: String,

    /// maximum number of connections maintained by PostgresStore
    pub db_pool_size: u32,

    /// maximum seconds waiting for a database connection
    pub db_connection_timeout: u64,

    /// How long to wait after a delete before redirecting back to the listing, so an
    /// eventually-consistent store has settled by the time the listing re-runs.
    #[serde(default = "delete_settle_ms")]
    pub delete_settle_ms: u64,

    /// Author name given to posts submitted without one.
    #[serde(default = "anonymous_author")]
    pub anonymous_author: String,

    /// Whether to credit posts to whatever name the form claims instead of verifying ID tokens.
    /// This should only be true in test environments.
    pub disable_auth: bool,

    /// Identity service endpoints. Required unless `disable_auth` is set.
    pub identity: Option<IdentityConfig>,
}

/// Which identity service to verify ID tokens against.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    /// Expected `iss` claim of submitted tokens.
    pub issuer: String,

    /// Expected `aud` claim of submitted tokens.
    pub audience: String,

    /// URL of the JWKS document listing the service's current signing keys.
    pub keys_url: String,

    /// Base URL for profile lookups. The subject id gets appended as a path segment.
    pub accounts_url: String,

    /// Timeout for each request to the identity service.
    #[serde(default = "http_timeout_ms")]
    pub http_timeout_ms: u64,
}

impl Config {
    /// Will crash if file isn't found or config is invalid.
    pub fn from_file(filepath: &str) -> Self {
        let contents = std::fs::read_to_string(filepath).expect("Couldn't read from config file");
        toml::from_str(&contents).expect("couldn't parse config file")
    }

    pub fn delete_settle(&self) -> Duration {
        Duration::from_millis(self.delete_settle_ms)
    }
}

impl IdentityConfig {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }
}

fn max_form_size() -> usize {
    65536
}

fn delete_settle_ms() -> u64 {
    100
}

fn anonymous_author() -> String {
    "Anonymous Crab".to_owned()
}

fn http_timeout_ms() -> u64 {
    5000
}
