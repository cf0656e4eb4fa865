use thiserror::Error;

use crate::interface::UartId;

/// Opaque platform-defined diagnostic code. The core passes it through
/// unmodified; its meaning belongs to the backend.
pub type PlatformStatus = u32;

/// One UART data direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Rx,
    Tx,
}

/// A failed backend operation, carrying the detailed platform status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("platform status {status:#010x}")]
pub struct BackendError {
    pub status: PlatformStatus,
}

pub type BackendResult = Result<PlatformStatus, BackendError>;

/// Register-level operations a platform family must provide.
///
/// The core never touches hardware itself; every validated operation is
/// delegated through this trait. Implementations exist per silicon family
/// (and as a simulator for host-side tests).
pub trait UartBackend: Send + Sync {
    /// Program the baud-rate generator and peripheral configuration.
    fn configure(&self, id: UartId, baud_rate: u32) -> BackendResult;

    /// Enable or disable one data direction.
    ///
    /// Both-direction operations are issued by the core as two separate
    /// calls so that a partial failure is attributable to its half.
    fn set_direction_enabled(&self, id: UartId, direction: Direction, enabled: bool)
        -> BackendResult;

    /// Queue bytes into the transmit path. Accepting the bytes is a
    /// buffered hand-off, not a wire-completion guarantee.
    fn transmit(&self, id: UartId, bytes: &[u8]) -> BackendResult;
}
