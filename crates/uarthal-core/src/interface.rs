use std::fmt;
use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;

use crate::backend::{Direction, PlatformStatus, UartBackend};
use crate::error::UartError;

/// Number of physical UART instances on the platform (eUSCI_A0..A3).
pub const UART_COUNT: usize = 4;

/// Identifier of one physical UART instance.
///
/// Construction validates against the supported set, so a `UartId` in hand
/// is always a real peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UartId(u8);

impl UartId {
    pub const A0: UartId = UartId(0);
    pub const A1: UartId = UartId(1);
    pub const A2: UartId = UartId(2);
    pub const A3: UartId = UartId(3);

    pub fn new(raw: u8) -> Result<Self, UartError> {
        if (raw as usize) < UART_COUNT {
            Ok(UartId(raw))
        } else {
            Err(UartError::InvalidInterfaceId(raw))
        }
    }

    pub fn raw(self) -> u8 {
        self.0
    }

    /// Dense index into per-instance tables, 0..UART_COUNT.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for UartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A{}", self.0)
    }
}

#[derive(Debug, Default)]
struct State {
    initialized: bool,
    rx_enabled: bool,
    tx_enabled: bool,
}

/// One logical UART interface bound to a physical instance.
///
/// Tracks the init/enable state machine and validates every operation
/// before it reaches the backend. Instances come from
/// [`UartManager::interface`](crate::manager::UartManager::interface);
/// there is at most one per id.
///
/// The state lives behind a per-interface mutex held across the backend
/// delegation, so concurrent operations on the same id serialize while
/// different ids never contend.
pub struct Uart {
    id: UartId,
    backend: Arc<dyn UartBackend>,
    state: Mutex<State>,
}

impl Uart {
    pub(crate) fn new(id: UartId, backend: Arc<dyn UartBackend>) -> Self {
        Self {
            id,
            backend,
            state: Mutex::new(State::default()),
        }
    }

    pub fn id(&self) -> UartId {
        self.id
    }

    /// Program the baud rate and mark the interface initialized.
    ///
    /// A zero baud rate is rejected locally; any further validity is the
    /// backend's call. Re-init of an already-initialized interface is
    /// allowed: the baud is re-programmed and both direction enables reset
    /// to false, since reconfiguration holds the module in software reset.
    pub fn init(&self, baud_rate: u32) -> Result<PlatformStatus, UartError> {
        if baud_rate == 0 {
            return Err(UartError::InvalidBaudRate(baud_rate));
        }
        let mut state = self.state.lock();
        let status = self.backend.configure(self.id, baud_rate)?;
        if state.initialized {
            state.rx_enabled = false;
            state.tx_enabled = false;
        }
        state.initialized = true;
        debug!("uart {}: configured at {} baud", self.id, baud_rate);
        Ok(status)
    }

    pub fn is_initialized(&self) -> bool {
        self.state.lock().initialized
    }

    pub fn is_rx_enabled(&self) -> bool {
        self.state.lock().rx_enabled
    }

    pub fn is_tx_enabled(&self) -> bool {
        self.state.lock().tx_enabled
    }

    pub fn enable_rx(&self) -> Result<PlatformStatus, UartError> {
        let mut state = self.state.lock();
        if !state.initialized {
            return Err(UartError::NotInitialized(self.id));
        }
        self.apply_direction(&mut state, Direction::Rx, true)
    }

    pub fn enable_tx(&self) -> Result<PlatformStatus, UartError> {
        let mut state = self.state.lock();
        if !state.initialized {
            return Err(UartError::NotInitialized(self.id));
        }
        self.apply_direction(&mut state, Direction::Tx, true)
    }

    /// Enable both directions.
    ///
    /// Both halves are always attempted; a half that succeeds stays
    /// enabled even when the other fails, and the first failure is the
    /// one reported.
    pub fn enable_rx_tx(&self) -> Result<PlatformStatus, UartError> {
        let mut state = self.state.lock();
        if !state.initialized {
            return Err(UartError::NotInitialized(self.id));
        }
        self.apply_both(&mut state, true)
    }

    /// Disable rx. No init precondition: the request is delegated as-is
    /// and the backend's verdict reported.
    pub fn disable_rx(&self) -> Result<PlatformStatus, UartError> {
        let mut state = self.state.lock();
        self.apply_direction(&mut state, Direction::Rx, false)
    }

    pub fn disable_tx(&self) -> Result<PlatformStatus, UartError> {
        let mut state = self.state.lock();
        self.apply_direction(&mut state, Direction::Tx, false)
    }

    /// Disable both directions, with the same partial-outcome policy as
    /// [`enable_rx_tx`](Self::enable_rx_tx).
    pub fn disable_rx_tx(&self) -> Result<PlatformStatus, UartError> {
        let mut state = self.state.lock();
        self.apply_both(&mut state, false)
    }

    /// Hand bytes to the backend transmit path.
    ///
    /// Requires init and an enabled tx direction; violations are rejected
    /// before the backend sees anything. An empty slice is a valid no-op
    /// that skips the backend entirely. Success means the bytes were
    /// accepted for (possibly asynchronous) transmission, all-or-nothing.
    /// Never mutates interface state.
    pub fn transmit(&self, bytes: &[u8]) -> Result<PlatformStatus, UartError> {
        let state = self.state.lock();
        if !state.initialized {
            return Err(UartError::NotInitialized(self.id));
        }
        if !state.tx_enabled {
            return Err(UartError::TxNotEnabled(self.id));
        }
        if bytes.is_empty() {
            return Ok(0);
        }
        let status = self.backend.transmit(self.id, bytes)?;
        debug!("uart {}: queued {} bytes", self.id, bytes.len());
        Ok(status)
    }

    fn apply_direction(
        &self,
        state: &mut State,
        direction: Direction,
        enabled: bool,
    ) -> Result<PlatformStatus, UartError> {
        let status = self.backend.set_direction_enabled(self.id, direction, enabled)?;
        match direction {
            Direction::Rx => state.rx_enabled = enabled,
            Direction::Tx => state.tx_enabled = enabled,
        }
        debug!(
            "uart {}: {:?} {}",
            self.id,
            direction,
            if enabled { "enabled" } else { "disabled" }
        );
        Ok(status)
    }

    fn apply_both(&self, state: &mut State, enabled: bool) -> Result<PlatformStatus, UartError> {
        let rx = self.apply_direction(state, Direction::Rx, enabled);
        let tx = self.apply_direction(state, Direction::Tx, enabled);
        match (rx, tx) {
            (Ok(_), Ok(status)) => Ok(status),
            (Err(e), _) => Err(e),
            (_, Err(e)) => Err(e),
        }
    }
}
