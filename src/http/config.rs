use envconfig::Envconfig;

#[derive(Envconfig, Debug, Clone)]
pub struct Config {
    #[envconfig(from = "API_URL", default = "http://localhost:3000")]
    pub api_url: String,
    #[envconfig(from = "API_TIMEOUT_MS", default = "10000")]
    pub timeout_ms: u64,
}
