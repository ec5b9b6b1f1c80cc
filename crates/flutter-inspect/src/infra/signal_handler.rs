//! Ctrl+C handling for watch mode.

use std::io;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::thread::JoinHandle;
use std::time::Duration;
use std::time::Instant;

use crate::infra::vm_service::AbortHandle;

const SLEEP_SLICE: Duration = Duration::from_millis(100);

#[derive(Clone, Default)]
struct StopState {
    stop: Arc<AtomicBool>,
    abort: Arc<Mutex<Option<AbortHandle>>>,
}

impl StopState {
    fn trigger(&self) {
        self.stop.store(true, Ordering::SeqCst);
        let slot = self.abort.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = slot.as_ref() {
            handle.abort();
        }
    }
}

/// Owns the SIGINT/SIGTERM listener. A signal raises the stop flag and
/// aborts whichever connection is currently armed.
pub struct SignalHandler {
    state: StopState,
    _handle: Option<JoinHandle<()>>,
}

impl SignalHandler {
    #[cfg(unix)]
    pub fn install() -> io::Result<Self> {
        use signal_hook::consts::SIGINT;
        use signal_hook::consts::SIGTERM;
        use signal_hook::iterator::Signals;
        use tracing::info;

        let mut signals = Signals::new([SIGINT, SIGTERM])?;
        let state = StopState::default();
        let thread_state = state.clone();
        let handle = std::thread::Builder::new()
            .name("signal-handler".to_string())
            .spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    info!(signal = sig, "Received signal, stopping watch");
                    thread_state.trigger();
                }
            })?;
        Ok(Self {
            state,
            _handle: Some(handle),
        })
    }

    #[cfg(not(unix))]
    pub fn install() -> io::Result<Self> {
        Ok(Self::detached())
    }

    /// A handler with no OS listener; only `request_stop` raises the flag.
    pub fn detached() -> Self {
        Self {
            state: StopState::default(),
            _handle: None,
        }
    }

    pub fn request_stop(&self) {
        self.state.trigger();
    }

    pub fn stop_requested(&self) -> bool {
        self.state.stop.load(Ordering::SeqCst)
    }

    /// Replaces the connection a signal will abort.
    pub fn arm(&self, handle: Option<AbortHandle>) {
        let mut slot = self.state.abort.lock().unwrap_or_else(|e| e.into_inner());
        *slot = handle;
    }

    /// Sleeps in short slices. Returns `false` if a stop was requested.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        loop {
            if self.stop_requested() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            std::thread::sleep(SLEEP_SLICE.min(deadline - now));
        }
    }
}
