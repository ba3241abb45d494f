use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError, mpsc};

use once_cell::sync::Lazy;

use super::{Delivery, TransportError};

/// Queues of one in-process binding.
#[derive(Debug, Clone)]
pub(crate) struct Mailbox {
    pub(crate) deliveries: mpsc::Sender<Delivery>,
    pub(crate) failures: mpsc::Sender<TransportError>,
}

static REGISTRY: Lazy<Mutex<HashMap<String, Mailbox>>> = Lazy::new(|| Mutex::new(HashMap::new()));

fn registry() -> MutexGuard<'static, HashMap<String, Mailbox>> {
    REGISTRY.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Publishes `mailbox` under `name` for in-process clients.
pub(crate) fn register(name: &str, mailbox: Mailbox) -> Result<(), TransportError> {
    let mut entries = registry();
    if entries.contains_key(name) {
        return Err(TransportError::AddressInUse {
            name: name.to_owned(),
        });
    }
    entries.insert(name.to_owned(), mailbox);
    Ok(())
}

pub(crate) fn unregister(name: &str) {
    registry().remove(name);
}

/// Returns the queue bound under `name`, if any.
pub(crate) fn lookup(name: &str) -> Option<mpsc::Sender<Delivery>> {
    registry()
        .get(name)
        .map(|mailbox| mailbox.deliveries.clone())
}

/// Reports a socket failure to whoever bound `name`. Returns `false` when
/// nothing is bound there.
#[cfg(test)]
pub(crate) fn fail(name: &str, error: TransportError) -> bool {
    registry()
        .get(name)
        .is_some_and(|mailbox| mailbox.failures.send(error).is_ok())
}
