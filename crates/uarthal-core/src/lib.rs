//! UART HAL core: interface identity, init/enable state machine, transmit
//! contract, over a pluggable platform backend.

pub mod backend;
pub mod error;
pub mod interface;
pub mod manager;

pub use backend::{BackendError, BackendResult, Direction, PlatformStatus, UartBackend};
pub use error::UartError;
pub use interface::{Uart, UartId, UART_COUNT};
pub use manager::UartManager;
