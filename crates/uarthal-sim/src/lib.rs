//! Simulated platform backend: in-memory peripheral state, scripted
//! failures, and an event stream of the operations the "hardware" saw.

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::trace;
use parking_lot::Mutex;
use uarthal_core::{BackendError, BackendResult, Direction, PlatformStatus, UartBackend, UartId, UART_COUNT};

/// Detailed status a successful simulated operation reports.
pub const STATUS_OK: PlatformStatus = 0;

/// One backend operation as accepted by the simulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimEvent {
    Configured { id: UartId, baud_rate: u32 },
    DirectionChanged { id: UartId, direction: Direction, enabled: bool },
    Transmitted { id: UartId, bytes: Vec<u8> },
}

/// How many times each backend operation has been invoked, counting
/// rejected ones too. Tests use this to prove an operation never reached
/// the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub configure: usize,
    pub set_direction: usize,
    pub transmit: usize,
}

#[derive(Debug, Default)]
struct Peripheral {
    baud_rate: Option<u32>,
    rx_enabled: bool,
    tx_enabled: bool,
    tx_log: Vec<u8>,
    // One-shot armed failures, consumed when they fire.
    fail_configure: Option<PlatformStatus>,
    fail_rx: Option<PlatformStatus>,
    fail_tx: Option<PlatformStatus>,
    fail_transmit: Option<PlatformStatus>,
}

pub struct SimBackend {
    peripherals: Mutex<[Peripheral; UART_COUNT]>,
    counts: Mutex<CallCounts>,
    tx_evt: Sender<SimEvent>,
    rx_evt: Receiver<SimEvent>,
}

impl SimBackend {
    pub fn new() -> Self {
        let (tx_evt, rx_evt) = unbounded();
        Self {
            peripherals: Mutex::new(Default::default()),
            counts: Mutex::new(CallCounts::default()),
            tx_evt,
            rx_evt,
        }
    }

    /// Stream of operations the simulator accepted, in order.
    pub fn events(&self) -> &Receiver<SimEvent> {
        &self.rx_evt
    }

    pub fn calls(&self) -> CallCounts {
        *self.counts.lock()
    }

    /// All bytes transmitted on `id` so far, across calls.
    pub fn transmitted(&self, id: UartId) -> Vec<u8> {
        self.peripherals.lock()[id.index()].tx_log.clone()
    }

    pub fn baud_rate(&self, id: UartId) -> Option<u32> {
        self.peripherals.lock()[id.index()].baud_rate
    }

    pub fn is_direction_enabled(&self, id: UartId, direction: Direction) -> bool {
        let peripherals = self.peripherals.lock();
        match direction {
            Direction::Rx => peripherals[id.index()].rx_enabled,
            Direction::Tx => peripherals[id.index()].tx_enabled,
        }
    }

    /// Arm the next `configure` on `id` to fail with `status`.
    pub fn fail_configure(&self, id: UartId, status: PlatformStatus) {
        self.peripherals.lock()[id.index()].fail_configure = Some(status);
    }

    /// Arm the next enable/disable of `direction` on `id` to fail.
    pub fn fail_direction(&self, id: UartId, direction: Direction, status: PlatformStatus) {
        let mut peripherals = self.peripherals.lock();
        match direction {
            Direction::Rx => peripherals[id.index()].fail_rx = Some(status),
            Direction::Tx => peripherals[id.index()].fail_tx = Some(status),
        }
    }

    /// Arm the next `transmit` on `id` to fail with `status`.
    pub fn fail_transmit(&self, id: UartId, status: PlatformStatus) {
        self.peripherals.lock()[id.index()].fail_transmit = Some(status);
    }
}

impl Default for SimBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl UartBackend for SimBackend {
    fn configure(&self, id: UartId, baud_rate: u32) -> BackendResult {
        self.counts.lock().configure += 1;
        let mut peripherals = self.peripherals.lock();
        let p = &mut peripherals[id.index()];
        if let Some(status) = p.fail_configure.take() {
            return Err(BackendError { status });
        }
        p.baud_rate = Some(baud_rate);
        // Reconfiguration holds the module in reset, dropping the enables.
        p.rx_enabled = false;
        p.tx_enabled = false;
        trace!("sim uart {}: configured at {} baud", id, baud_rate);
        let _ = self.tx_evt.send(SimEvent::Configured { id, baud_rate });
        Ok(STATUS_OK)
    }

    fn set_direction_enabled(
        &self,
        id: UartId,
        direction: Direction,
        enabled: bool,
    ) -> BackendResult {
        self.counts.lock().set_direction += 1;
        let mut peripherals = self.peripherals.lock();
        let p = &mut peripherals[id.index()];
        let armed = match direction {
            Direction::Rx => p.fail_rx.take(),
            Direction::Tx => p.fail_tx.take(),
        };
        if let Some(status) = armed {
            return Err(BackendError { status });
        }
        match direction {
            Direction::Rx => p.rx_enabled = enabled,
            Direction::Tx => p.tx_enabled = enabled,
        }
        trace!("sim uart {}: {:?} enabled={}", id, direction, enabled);
        let _ = self.tx_evt.send(SimEvent::DirectionChanged { id, direction, enabled });
        Ok(STATUS_OK)
    }

    fn transmit(&self, id: UartId, bytes: &[u8]) -> BackendResult {
        self.counts.lock().transmit += 1;
        let mut peripherals = self.peripherals.lock();
        let p = &mut peripherals[id.index()];
        if let Some(status) = p.fail_transmit.take() {
            return Err(BackendError { status });
        }
        p.tx_log.extend_from_slice(bytes);
        trace!("sim uart {}: accepted {} bytes", id, bytes.len());
        let _ = self.tx_evt.send(SimEvent::Transmitted {
            id,
            bytes: bytes.to_vec(),
        });
        Ok(STATUS_OK)
    }
}
