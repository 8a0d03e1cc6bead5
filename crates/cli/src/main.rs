use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;

use tallyscan_cli::{Driver, spawn_stdin_reader};
use tallyscan_core::{Clock, SystemClock};
use tallyscan_gs1::Gs1Decoder;
use tallyscan_infra::{AppConfig, JsonLinesExporter, SqliteLineStore};
use tallyscan_inventory::{InMemoryLineStore, Ledger, LineStore, StoreError};
use tallyscan_scanner::{Classifier, CommandVocabulary};
use tallyscan_session::Session;

const INPUT_QUEUE: usize = 64;
const STORAGE_UNAVAILABLE: u8 = 3;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tallyscan_observability::init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = exit_code_for(&err);
            if code == STORAGE_UNAVAILABLE {
                tracing::error!(error = %format!("{err:#}"), "storage unavailable");
                eprintln!("storage unavailable, nothing can be recorded: {err:#}");
            } else {
                tracing::error!(error = %format!("{err:#}"), "tallyscan failed");
                eprintln!("error: {err:#}");
            }
            ExitCode::from(code)
        }
    }
}

/// Process exit status for a failed run.
fn exit_code_for(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<StoreError>() {
        Some(StoreError::Initialization(_)) => STORAGE_UNAVAILABLE,
        _ => 1,
    }
}

async fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let store: Arc<dyn LineStore> = match &config.db_path {
        Some(path) => Arc::new(SqliteLineStore::open(path).await?),
        None => {
            tracing::warn!("TALLYSCAN_DB not set; lines are kept in memory only");
            InMemoryLineStore::arc()
        }
    };

    let classifier = Classifier::new(CommandVocabulary::default(), config.demo_marker.as_deref());
    let ledger = Ledger::new(store, clock.clone());
    let session = Session::with_parts(ledger, classifier, Gs1Decoder::default());
    let mut driver = Driver::new(
        session,
        config.idle_timeouts,
        config.key_map(),
        clock,
        std::io::stderr(),
    );

    let (tx, rx) = mpsc::channel(INPUT_QUEUE);
    let reader = spawn_stdin_reader(tx);
    tracing::info!("ready; scan a location");

    let mut exporter = JsonLinesExporter::new(std::io::stdout().lock());
    driver.run(rx, &mut exporter).await?;
    reader.await.context("stdin reader panicked")?;
    Ok(())
}
