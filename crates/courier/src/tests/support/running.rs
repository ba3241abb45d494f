//! Background runners for controllers and proxies.

use std::thread::{self, JoinHandle};

use crate::controller::{CloseHandle, Controller, ControllerError};
use crate::proxy::{Proxy, ProxyError};

/// A controller serving on its own thread.
pub struct RunningController {
    close: CloseHandle,
    worker: JoinHandle<Result<Controller, ControllerError>>,
}

impl RunningController {
    /// Starts `controller` on a background thread.
    #[must_use]
    pub fn start(mut controller: Controller) -> Self {
        let close = controller.close_handle();
        let worker = thread::spawn(move || controller.run().map(|()| controller));
        Self { close, worker }
    }

    /// Closes the controller and waits for it to stop.
    pub fn stop(self) -> Result<Controller, ControllerError> {
        self.close.close();
        self.worker.join().expect("controller thread panicked")
    }
}

/// A proxy serving on its own thread.
pub struct RunningProxy {
    handles: Vec<CloseHandle>,
    worker: JoinHandle<Result<(), ProxyError>>,
}

impl RunningProxy {
    /// Starts an already prepared `proxy` on a background thread.
    #[must_use]
    pub fn start(mut proxy: Proxy) -> Self {
        let handles = proxy.close_handles();
        let worker = thread::spawn(move || proxy.run());
        Self { handles, worker }
    }

    /// Closes every controller of the proxy and waits for it to stop.
    pub fn stop(self) -> Result<(), ProxyError> {
        self.handles.iter().for_each(CloseHandle::close);
        self.worker.join().expect("proxy thread panicked")
    }
}
