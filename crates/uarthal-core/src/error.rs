use thiserror::Error;

use crate::backend::{BackendError, PlatformStatus};
use crate::interface::UartId;

/// Abstract outcome of a UART operation. Callers branch on the variant;
/// the embedded platform status is diagnostic only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UartError {
    #[error("interface id {0} is not a supported uart instance")]
    InvalidInterfaceId(u8),

    #[error("baud rate {0} is not usable")]
    InvalidBaudRate(u32),

    #[error("uart {0} is not initialized")]
    NotInitialized(UartId),

    #[error("uart {0} tx direction is not enabled")]
    TxNotEnabled(UartId),

    #[error("uart {0} rx direction is not enabled")]
    RxNotEnabled(UartId),

    #[error("platform backend failed with status {status:#010x}")]
    Backend { status: PlatformStatus },
}

impl From<BackendError> for UartError {
    fn from(e: BackendError) -> Self {
        UartError::Backend { status: e.status }
    }
}
