use anyhow::Result;
use clap::Parser;
use log::info;
use std::sync::Arc;
use uarthal_core::{UartId, UartManager};
use uarthal_sim::{SimBackend, SimEvent};

/// UART HAL demo over the simulated platform backend
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// physical interface index (eUSCI_A0..A3)
    #[arg(short, long, default_value_t = 0)]
    interface: u8,

    /// baud rate to program
    #[arg(short, long, default_value_t = 115_200)]
    baud: u32,

    /// interpret MESSAGE as hex bytes instead of text
    #[arg(long)]
    hex: bool,

    /// enable debug messages
    #[arg(short, long)]
    verbose: bool,

    /// payload to transmit
    message: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut builder = env_logger::Builder::from_default_env();
    if args.verbose {
        builder.filter(None, log::LevelFilter::Debug);
    } else {
        builder.filter(None, log::LevelFilter::Info);
    }
    builder.init();

    let payload = if args.hex {
        hex::decode(args.message.replace(' ', ""))?
    } else {
        args.message.clone().into_bytes()
    };

    let backend = Arc::new(SimBackend::new());
    let manager = UartManager::new(backend.clone());

    let id = UartId::new(args.interface)?;
    let uart = manager.interface(id);

    uart.init(args.baud)?;
    uart.enable_tx()?;
    uart.transmit(&payload)?;
    info!("queued {} bytes on uart {}", payload.len(), id);

    // Replay what the simulated hardware saw.
    while let Ok(event) = backend.events().try_recv() {
        match event {
            SimEvent::Configured { id, baud_rate } => {
                println!("{id}: configured at {baud_rate} baud");
            }
            SimEvent::DirectionChanged { id, direction, enabled } => {
                println!(
                    "{id}: {direction:?} {}",
                    if enabled { "enabled" } else { "disabled" }
                );
            }
            SimEvent::Transmitted { id, bytes } => {
                println!("{id}: transmitted {}", hex::encode_upper(&bytes));
            }
        }
    }

    Ok(())
}
