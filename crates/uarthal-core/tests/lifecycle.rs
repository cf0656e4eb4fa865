//! Full lifecycle tests over the simulated platform backend.

use std::sync::{Arc, Barrier};
use std::thread;

use uarthal_core::{Direction, UartError, UartId, UartManager};
use uarthal_sim::{CallCounts, SimBackend, STATUS_OK};

fn setup() -> (Arc<SimBackend>, UartManager) {
    let backend = Arc::new(SimBackend::new());
    let manager = UartManager::new(backend.clone());
    (backend, manager)
}

#[test]
fn repeated_lookups_return_the_same_instance() {
    let (_, manager) = setup();
    let a = manager.interface(UartId::A1);
    let b = manager.interface(UartId::A1);
    assert!(Arc::ptr_eq(&a, &b));

    let other = manager.interface(UartId::A2);
    assert!(!Arc::ptr_eq(&a, &other));
    assert_eq!(other.id(), UartId::A2);
}

#[test]
fn concurrent_first_access_constructs_once() {
    let (backend, manager) = setup();
    let manager = Arc::new(manager);
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let manager = Arc::clone(&manager);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                manager.interface(UartId::A3)
            })
        })
        .collect();

    let instances: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for pair in instances.windows(2) {
        assert!(Arc::ptr_eq(&pair[0], &pair[1]));
    }
    // Construction itself touches no hardware.
    assert_eq!(backend.calls(), CallCounts::default());
}

#[test]
fn uninitialized_interface_rejects_without_backend_calls() {
    let (backend, manager) = setup();
    let uart = manager.interface(UartId::A0);

    assert!(!uart.is_initialized());
    assert_eq!(uart.enable_rx(), Err(UartError::NotInitialized(UartId::A0)));
    assert_eq!(
        uart.transmit(b"boot"),
        Err(UartError::NotInitialized(UartId::A0))
    );
    assert_eq!(backend.calls(), CallCounts::default());
}

#[test]
fn init_marks_initialized_and_programs_baud() {
    let (backend, manager) = setup();
    let uart = manager.interface(UartId::A0);

    assert_eq!(uart.init(9600), Ok(STATUS_OK));
    assert!(uart.is_initialized());
    assert_eq!(backend.baud_rate(UartId::A0), Some(9600));
}

#[test]
fn failed_init_leaves_interface_uninitialized() {
    let (backend, manager) = setup();
    let uart = manager.interface(UartId::A0);

    backend.fail_configure(UartId::A0, 0x0501);
    assert_eq!(uart.init(9600), Err(UartError::Backend { status: 0x0501 }));
    assert!(!uart.is_initialized());
    assert_eq!(uart.enable_tx(), Err(UartError::NotInitialized(UartId::A0)));
}

#[test]
fn transmit_after_enable_reaches_the_wire() {
    let (backend, manager) = setup();
    let uart = manager.interface(UartId::A1);

    uart.init(115_200).unwrap();
    uart.enable_tx().unwrap();
    assert!(uart.is_tx_enabled());

    assert_eq!(uart.transmit(b"hello uart"), Ok(STATUS_OK));
    assert_eq!(backend.transmitted(UartId::A1), b"hello uart");

    // Transmit never mutates interface state.
    assert!(uart.is_initialized());
    assert!(uart.is_tx_enabled());
    assert!(!uart.is_rx_enabled());
}

#[test]
fn disable_tx_blocks_further_transmits() {
    let (backend, manager) = setup();
    let uart = manager.interface(UartId::A0);

    uart.init(9600).unwrap();
    uart.enable_tx().unwrap();
    assert_eq!(uart.disable_tx(), Ok(STATUS_OK));
    assert!(!uart.is_tx_enabled());

    let before = backend.calls().transmit;
    assert_eq!(uart.transmit(b"x"), Err(UartError::TxNotEnabled(UartId::A0)));
    assert_eq!(backend.calls().transmit, before);
}

#[test]
fn enable_both_with_failing_rx_half_keeps_tx() {
    let (backend, manager) = setup();
    let uart = manager.interface(UartId::A2);

    uart.init(9600).unwrap();
    backend.fail_direction(UartId::A2, Direction::Rx, 0x31);

    assert_eq!(
        uart.enable_rx_tx(),
        Err(UartError::Backend { status: 0x31 })
    );
    assert!(!uart.is_rx_enabled());
    assert!(uart.is_tx_enabled());
    assert!(!backend.is_direction_enabled(UartId::A2, Direction::Rx));
    assert!(backend.is_direction_enabled(UartId::A2, Direction::Tx));
}

#[test]
fn enable_both_happy_path_sets_both_flags() {
    let (backend, manager) = setup();
    let uart = manager.interface(UartId::A0);

    uart.init(9600).unwrap();
    assert_eq!(uart.enable_rx_tx(), Ok(STATUS_OK));
    assert!(uart.is_rx_enabled());
    assert!(uart.is_tx_enabled());
    assert!(backend.is_direction_enabled(UartId::A0, Direction::Rx));
    assert!(backend.is_direction_enabled(UartId::A0, Direction::Tx));
}

#[test]
fn disable_both_mirrors_enable() {
    let (_, manager) = setup();
    let uart = manager.interface(UartId::A0);

    uart.init(9600).unwrap();
    uart.enable_rx_tx().unwrap();
    assert_eq!(uart.disable_rx_tx(), Ok(STATUS_OK));
    assert!(!uart.is_rx_enabled());
    assert!(!uart.is_tx_enabled());
}

#[test]
fn disabling_uninitialized_interface_delegates_to_backend() {
    let (backend, manager) = setup();
    let uart = manager.interface(UartId::A3);

    assert_eq!(uart.disable_rx(), Ok(STATUS_OK));
    assert_eq!(backend.calls().set_direction, 1);
}

#[test]
fn reinit_reprograms_baud_and_resets_directions() {
    let (backend, manager) = setup();
    let uart = manager.interface(UartId::A0);

    uart.init(9600).unwrap();
    uart.enable_rx_tx().unwrap();

    assert_eq!(uart.init(19_200), Ok(STATUS_OK));
    assert!(uart.is_initialized());
    assert!(!uart.is_rx_enabled());
    assert!(!uart.is_tx_enabled());
    assert_eq!(backend.baud_rate(UartId::A0), Some(19_200));
}

#[test]
fn failed_reinit_keeps_previous_state() {
    let (backend, manager) = setup();
    let uart = manager.interface(UartId::A0);

    uart.init(9600).unwrap();
    uart.enable_tx().unwrap();

    backend.fail_configure(UartId::A0, 0x77);
    assert_eq!(uart.init(19_200), Err(UartError::Backend { status: 0x77 }));
    // Still initialized from the first init; flags untouched by the
    // rejected reconfiguration.
    assert!(uart.is_initialized());
    assert!(uart.is_tx_enabled());
}

#[test]
fn backend_status_passes_through_unmodified() {
    let (backend, manager) = setup();
    let uart = manager.interface(UartId::A1);

    uart.init(9600).unwrap();
    uart.enable_tx().unwrap();

    backend.fail_transmit(UartId::A1, 0xDEAD_BEEF);
    assert_eq!(
        uart.transmit(b"payload"),
        Err(UartError::Backend { status: 0xDEAD_BEEF })
    );
    // Rejected bytes never reach the transmit log.
    assert!(backend.transmitted(UartId::A1).is_empty());
}

#[test]
fn operations_on_distinct_ids_are_independent() {
    let (_, manager) = setup();
    let a0 = manager.interface(UartId::A0);
    let a1 = manager.interface(UartId::A1);

    a0.init(9600).unwrap();
    a0.enable_tx().unwrap();

    assert!(!a1.is_initialized());
    assert_eq!(a1.transmit(b"x"), Err(UartError::NotInitialized(UartId::A1)));
    assert!(a0.is_tx_enabled());
}
