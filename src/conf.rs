use config::{Config, ConfigError, Environment};
use lazy_static::lazy_static;
use serde::Deserialize;

fn default_service_name() -> String {
    "jobboard".into()
}

fn default_listen_port() -> String {
    "8000".into()
}

fn default_pool_max_connections() -> u32 {
    5
}

fn default_session_ttl() -> i64 {
    60 * 24
}

fn default_remember_ttl() -> i64 {
    60 * 24 * 30
}

#[derive(Deserialize, Debug)]
pub struct Settings {
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_listen_port")]
    pub listen_port: String,
    pub database_url: String,
    #[serde(default = "default_pool_max_connections")]
    pub database_pool_max_connections: u32,
    //session lifetimes, in minutes
    #[serde(default = "default_session_ttl")]
    pub session_ttl_minutes: i64,
    #[serde(default = "default_remember_ttl")]
    pub remember_ttl_minutes: i64,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let conf = Config::builder()
            .add_source(Environment::default())
            .build()?;
        conf.try_deserialize()
    }
}

lazy_static! {
    pub static ref settings: Settings = Settings::new().expect("improperly configured");
}
