use std::io;
use std::thread::{self, JoinHandle};

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::{Handle, Signals};
use thiserror::Error;
use tracing::info;

use super::PROCESS_TARGET;
use crate::controller::CloseHandle;

/// Abstraction over shutdown notification mechanisms.
pub(crate) trait ShutdownSignal {
    /// Closes `handles` once shutdown is requested. The returned watch stops
    /// listening when dropped or stopped.
    fn watch(&self, handles: Vec<CloseHandle>) -> Result<ShutdownWatch, ShutdownError>;
}

/// Errors reported by shutdown signal listeners.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// Installing signal handlers failed.
    #[error("failed to install signal handlers: {source}")]
    Install {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Listener closing the service on SIGTERM, SIGINT, SIGQUIT, or SIGHUP.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct SystemShutdownSignal;

impl ShutdownSignal for SystemShutdownSignal {
    fn watch(&self, handles: Vec<CloseHandle>) -> Result<ShutdownWatch, ShutdownError> {
        let mut signals = Signals::new([SIGTERM, SIGINT, SIGQUIT, SIGHUP])
            .map_err(|source| ShutdownError::Install { source })?;
        let handle = signals.handle();
        let worker = thread::Builder::new()
            .name("courier-shutdown".to_owned())
            .spawn(move || {
                if let Some(signal) = signals.forever().next() {
                    info!(
                        target: PROCESS_TARGET,
                        signal,
                        controllers = handles.len(),
                        "shutdown signal received"
                    );
                    handles.iter().for_each(CloseHandle::close);
                }
            })
            .map_err(|source| ShutdownError::Install { source })?;
        Ok(ShutdownWatch {
            handle: Some(handle),
            worker: Some(worker),
        })
    }
}

/// Running signal listener.
#[derive(Default)]
pub(crate) struct ShutdownWatch {
    handle: Option<Handle>,
    worker: Option<JoinHandle<()>>,
}

impl ShutdownWatch {
    /// A watch with nothing to stop.
    pub(crate) fn inert() -> Self {
        Self::default()
    }

    /// Stops listening and waits for the listener thread.
    pub(crate) fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.close();
        }
        if let Some(worker) = self.worker.take() {
            worker.join().ok();
        }
    }
}

impl std::fmt::Debug for ShutdownWatch {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ShutdownWatch")
            .field("listening", &self.worker.is_some())
            .finish()
    }
}

impl Drop for ShutdownWatch {
    fn drop(&mut self) {
        self.stop();
    }
}
