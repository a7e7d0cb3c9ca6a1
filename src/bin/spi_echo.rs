//! SPI echo test
//! Clocks every byte value through the loopback firmware and checks the complemented echo

use muxi_rs::bus::{MuxClient, SpidevBus};
use muxi_rs::{logging, MuxConfig};
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init("info");

    let args: Vec<String> = env::args().collect();
    let config = match args.len() {
        1 => MuxConfig::default(),
        3 if args[1] == "--config" => MuxConfig::load(&args[2])?,
        _ => {
            eprintln!("Usage: {} [--config <file.json>]", args[0]);
            std::process::exit(1);
        }
    };

    tracing::info!("Opening {}...", config.spi.device);
    let bus = SpidevBus::open(config.spi.clone())?;
    let mut client = MuxClient::new(bus, config);

    client.echo_check()?;
    println!("Echo OK");

    Ok(())
}
