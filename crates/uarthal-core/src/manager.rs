use std::sync::Arc;

use log::debug;
use parking_lot::RwLock;

use crate::backend::UartBackend;
use crate::interface::{Uart, UartId, UART_COUNT};

/// Owns the one [`Uart`] per physical instance and hands out shared
/// handles to them.
///
/// Interfaces are constructed lazily on first request and live as long as
/// the manager; they model persistent hardware and are never torn down.
pub struct UartManager {
    backend: Arc<dyn UartBackend>,
    interfaces: RwLock<[Option<Arc<Uart>>; UART_COUNT]>,
}

impl UartManager {
    pub fn new(backend: Arc<dyn UartBackend>) -> Self {
        Self {
            backend,
            interfaces: RwLock::new(Default::default()),
        }
    }

    /// The singleton interface for `id`, constructing it on first access.
    ///
    /// Safe under concurrent first access: double-checked against the
    /// registry lock, so racing callers observe exactly one construction.
    /// The write lock is held only around construction; steady-state
    /// lookups take the read path.
    pub fn interface(&self, id: UartId) -> Arc<Uart> {
        if let Some(uart) = &self.interfaces.read()[id.index()] {
            return Arc::clone(uart);
        }
        let mut slots = self.interfaces.write();
        // Another caller may have won the race between our two locks.
        if let Some(uart) = &slots[id.index()] {
            return Arc::clone(uart);
        }
        let uart = Arc::new(Uart::new(id, Arc::clone(&self.backend)));
        slots[id.index()] = Some(Arc::clone(&uart));
        debug!("uart {}: interface created", id);
        uart
    }
}
