use std::path::PathBuf;

use anyhow::Context;
use hornodb::{AppConfig, DataAccessFacade, Record};
use tokio::sync::oneshot;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

const CONFIG_ENV: &str = "HORNODB_CONFIG";

fn config_path() -> PathBuf {
    std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let path = config_path();
    let config = AppConfig::load(&path).context("cannot start without database configuration")?;
    let facade = DataAccessFacade::from_config(&config)?;

    let reading = Record::new().set("value", 72.5).set("sensor", "oven1");
    let (tx, rx) = oneshot::channel();
    facade.save_record("temps", reading, move |result| {
        let _ = tx.send(result);
    });
    let id = rx.await.context("save callback dropped")??;
    info!(id, "reading saved");

    let (tx, rx) = oneshot::channel();
    facade.get_last_value("temps", "value", move |result| {
        let _ = tx.send(result);
    });
    let value = rx.await.context("fetch callback dropped")??;
    info!(?value, "latest reading");

    facade.shutdown().await?;
    Ok(())
}
