use envconfig::Envconfig;

#[derive(Envconfig, Debug, Clone)]
pub struct Config {
    /// Falls back to the per-user config directory when unset.
    #[envconfig(from = "CREDENTIAL_PATH")]
    pub path: Option<String>,
}
