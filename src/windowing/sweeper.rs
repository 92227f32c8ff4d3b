use crate::windowing::CSPARQLWindow;
use crossbeam_channel::{Sender, bounded, select, tick};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};

/// Background ticker that periodically re-admits a window's buffered late
/// elements.
///
/// Each tick takes the same lock as ingestion, so a sweep never interleaves
/// with `add`. `stop` (or dropping the handle) joins the thread; once it
/// returns no further sweep runs.
pub struct LateElementSweeper {
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl LateElementSweeper {
    pub fn spawn(window: Arc<Mutex<CSPARQLWindow>>, interval: Duration) -> Self {
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let name = window.lock().name.clone();

        let handle = thread::spawn(move || {
            let ticker = tick(interval);
            debug!(window = %name, interval_ms = interval.as_millis() as u64, "late element sweeper started");
            loop {
                let keep_running = select! {
                    recv(stop_rx) -> _ => false,
                    recv(ticker) -> _ => {
                        let mut window = window.lock();
                        window.process_late_elements();
                        !window.is_stopped()
                    }
                };
                if !keep_running {
                    break;
                }
            }
            debug!(window = %name, "late element sweeper stopped");
        });

        Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        }
    }

    /// Spawn a sweeper at the window's configured interval.
    pub fn for_window(window: Arc<Mutex<CSPARQLWindow>>) -> Self {
        let interval = window.lock().late_sweep_interval();
        Self::spawn(window, interval)
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            // The thread may already have exited on its own.
            let _ = stop_tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("late element sweeper panicked");
            }
        }
    }
}

impl Drop for LateElementSweeper {
    fn drop(&mut self) {
        self.stop();
    }
}
