pub mod logger;

use crate::{bindings, config::logger::LoggerConfig, credential, gate, http};
use envconfig::Envconfig;

#[derive(Envconfig, Debug, Clone)]
pub struct Config {
    #[envconfig(nested)]
    pub http: http::config::Config,
    #[envconfig(nested)]
    pub credential: credential::config::Config,
    #[envconfig(nested)]
    pub gate: gate::config::Config,
    #[envconfig(nested)]
    pub bindings: bindings::config::Config,
    #[envconfig(nested)]
    pub logger: LoggerConfig,
}

pub fn load() -> Result<Config, envconfig::Error> {
    Config::init_from_env()
}
