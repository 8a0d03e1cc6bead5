//! Event loop tying keystrokes, idle deadlines and the session together.

use std::future;
use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;
use tokio::time::sleep_until;
use tracing::{debug, error, info};

use tallyscan_core::Clock;
use tallyscan_inventory::{LineStore, RowExporter};
use tallyscan_scanner::{IdleTimeouts, KeyMap, ScanAssembler, ScanEvent, TimerId};
use tallyscan_session::{Notice, Session};

use crate::scheduler::DeadlineScheduler;

enum Wake {
    Input(Option<String>),
    Idle(TimerId),
}

pub struct Driver<S, N> {
    session: Session<S>,
    assembler: ScanAssembler<DeadlineScheduler>,
    key_map: KeyMap,
    notices: N,
}

impl<S: LineStore, N: Write> Driver<S, N> {
    pub fn new(
        session: Session<S>,
        timeouts: IdleTimeouts,
        key_map: KeyMap,
        clock: Arc<dyn Clock>,
        notices: N,
    ) -> Self {
        Self {
            session,
            assembler: ScanAssembler::new(timeouts, DeadlineScheduler::new(), clock),
            key_map,
            notices,
        }
    }

    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    /// Runs until `input` closes, then flushes the pending buffer and exports
    /// every line.
    pub async fn run(
        &mut self,
        mut input: mpsc::Receiver<String>,
        exporter: &mut dyn RowExporter,
    ) -> anyhow::Result<()> {
        loop {
            let deadline = self.assembler.scheduler().next_deadline();
            let wake = tokio::select! {
                chunk = input.recv() => Wake::Input(chunk),
                id = async {
                    match deadline {
                        Some((id, at)) => {
                            sleep_until(at).await;
                            id
                        }
                        None => future::pending().await,
                    }
                } => Wake::Idle(id),
            };

            match wake {
                Wake::Input(Some(chunk)) => self.feed(&chunk).await?,
                Wake::Input(None) => break,
                Wake::Idle(id) => {
                    self.assembler.scheduler_mut().expire(id);
                    if let Some(event) = self.assembler.on_idle_timeout(id) {
                        self.dispatch(event).await?;
                    }
                }
            }
        }

        debug!("input closed");
        if let Some(event) = self.assembler.flush() {
            self.dispatch(event).await?;
        }
        let result = self.session.export(exporter).await;
        match &result {
            Ok(outcome) => self.notify(&outcome.into())?,
            Err(err) => {
                error!(error = %err, "export failed");
                self.notify(&err.into())?;
            }
        }
        result.map(|_| ()).context("export failed")
    }

    async fn feed(&mut self, chunk: &str) -> anyhow::Result<()> {
        for c in chunk.chars() {
            let key = self.key_map.classify(c);
            if let Some(event) = self.assembler.on_key(key, self.session.state()) {
                self.dispatch(event).await?;
            }
        }
        Ok(())
    }

    async fn dispatch(&mut self, event: ScanEvent) -> anyhow::Result<()> {
        let result = self.session.handle_event(event).await;
        if let Err(err) = &result {
            info!(error = %err, "scan not recorded");
        }
        if let Some(notice) = Notice::for_scan(&result) {
            self.notify(&notice)?;
        }
        Ok(())
    }

    fn notify(&mut self, notice: &Notice) -> anyhow::Result<()> {
        writeln!(self.notices, "[{}] {}", notice.level, notice.message)
            .context("failed to write notice")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tallyscan_core::SystemClock;
    use tallyscan_inventory::{ExportError, ExportRow, InMemoryLineStore};

    #[derive(Default)]
    struct Rows(Vec<ExportRow>);

    impl RowExporter for Rows {
        fn export_rows(&mut self, rows: &[ExportRow]) -> Result<(), ExportError> {
            self.0.extend_from_slice(rows);
            Ok(())
        }
    }

    fn driver() -> Driver<Arc<InMemoryLineStore>, Vec<u8>> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Driver::new(
            Session::new(InMemoryLineStore::arc(), clock.clone()),
            IdleTimeouts::default(),
            KeyMap::default(),
            clock,
            Vec::new(),
        )
    }

    fn notices(driver: &Driver<Arc<InMemoryLineStore>, Vec<u8>>) -> Vec<String> {
        String::from_utf8(driver.notices.clone())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn idle_gap_ends_a_scan_without_terminator() {
        let (tx, rx) = mpsc::channel(8);
        tokio::spawn(async move {
            tx.send("A1".to_string()).await.unwrap();
            tokio::time::sleep(Duration::from_millis(400)).await;
            tx.send("REF\r".to_string()).await.unwrap();
            tx.send("REF\t".to_string()).await.unwrap();
        });

        let mut d = driver();
        let mut rows = Rows::default();
        d.run(rx, &mut rows).await.unwrap();

        assert_eq!(rows.0.len(), 1);
        assert_eq!(rows.0[0].location, "A1");
        assert_eq!(rows.0[0].reference, "REF");
        assert_eq!(rows.0[0].quantity, 2);
        let notices = notices(&d);
        assert_eq!(notices[0], "[ok] location A1; scan items");
        assert_eq!(notices.last().map(String::as_str), Some("[ok] exported 1 rows"));
    }

    #[tokio::test(start_paused = true)]
    async fn pending_buffer_is_flushed_at_end_of_input() {
        let (tx, rx) = mpsc::channel(8);
        tx.send("A1\nPLAIN".to_string()).await.unwrap();
        drop(tx);

        let mut d = driver();
        let mut rows = Rows::default();
        d.run(rx, &mut rows).await.unwrap();
        assert_eq!(rows.0[0].reference, "PLAIN");
    }

    #[tokio::test(start_paused = true)]
    async fn empty_session_warns_nothing_to_export() {
        let (tx, rx) = mpsc::channel::<String>(1);
        drop(tx);

        let mut d = driver();
        let mut rows = Rows::default();
        d.run(rx, &mut rows).await.unwrap();
        assert!(rows.0.is_empty());
        assert_eq!(notices(&d), vec!["[warn] nothing to export".to_string()]);
    }
}
