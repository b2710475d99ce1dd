use std::sync::Arc;

use short_url_admin::{
    bindings::{card::Bindings, clipboard::SystemClipboard, qr::PngQrEncoder},
    config::{
        self,
        logger::{LogFormat, LoggerConfig},
    },
    console::app::Console,
    credential::{storage::FileStorage, store::CredentialStore},
    http::client::Client,
    usecase::query::ResourceQuery,
};
use tracing_subscriber::{EnvFilter, fmt::time::ChronoLocal};

fn build_logger(config: &LoggerConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_timer(ChronoLocal::rfc_3339())
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match config.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = match config::load() {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("Failed to load configuration: {}", err);
            std::process::exit(1);
        }
    };
    build_logger(&cfg.logger);
    tracing::debug!(config = ?cfg, "Configuration loaded successfully");

    let storage = FileStorage::from_config(&cfg.credential)?;
    tracing::debug!(path = %storage.path().display(), "Using credential file");
    let credentials = Arc::new(CredentialStore::load(storage)?);

    let client = Client::new(&cfg.http)?;
    let query = ResourceQuery::spawn(client, credentials);
    let bindings = Bindings::new(
        &cfg.bindings,
        cfg.gate.clone(),
        Arc::new(SystemClipboard::new()),
        Arc::new(PngQrEncoder),
    )?;

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    Console::new(query, bindings)
        .run(stdin, tokio::io::stdout())
        .await
}
