//! MUX query utility
//! Sends one command through the MUX, reads the response and prints the decoded messages

use muxi_rs::bitwise::Bitstream;
use muxi_rs::bus::{MuxClient, SpidevBus};
use muxi_rs::{logging, save_capture, Command, MuxConfig};
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init("info");

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut config_path = None;
    let mut save_path = None;
    let mut positional = Vec::new();

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                config_path = Some(
                    iter.next()
                        .ok_or_else(|| anyhow::anyhow!("--config needs a file name"))?
                        .clone(),
                )
            }
            "--save" => {
                save_path = Some(
                    iter.next()
                        .ok_or_else(|| anyhow::anyhow!("--save needs a file name"))?
                        .clone(),
                )
            }
            _ => positional.push(arg.clone()),
        }
    }

    if positional.len() != 2 {
        eprintln!(
            "Usage: {} [--config <file.json>] [--save <capture.txt>] <address> <payload>",
            args[0]
        );
        eprintln!("Example: {} 0 0b1", args[0]);
        eprintln!("\n<address> is 0-3, <payload> is a byte (decimal, 0x.. or 0b..)");
        std::process::exit(1);
    }

    let config = match &config_path {
        Some(path) => MuxConfig::load(path)?,
        None => MuxConfig::default(),
    };

    let address = parse_number(&positional[0])?;
    let payload = u8::try_from(parse_number(&positional[1])?)
        .map_err(|_| anyhow::anyhow!("Payload {} does not fit in a byte", positional[1]))?;
    let command = Command::new(address, payload)?;

    tracing::info!("Device: {}", config.spi.device);
    tracing::info!(
        "Command: address {} payload {:#010b} -> wire {:02X?}",
        command.address(),
        command.payload(),
        command.encode()
    );

    let bus = SpidevBus::open(config.spi.clone())?;
    let mut client = MuxClient::new(bus, config);

    let response = client.query_raw(&command).await?;
    let report = client.decode_response(&response);

    if let Some(path) = &save_path {
        save_capture(path, &response)?;
        tracing::info!("Saved response to: {}", path);
    }

    // Print summary
    let stream = Bitstream::from_bytes(&response, client.config().bit_order);
    println!("\n=== Response ({} bytes) ===", response.len());
    println!("{}", stream);
    println!("\n=== Messages ===");
    if report.messages.is_empty() {
        println!("(none)");
    }
    for (i, message) in report.messages.iter().enumerate() {
        println!("#{:<3} {}", i, message);
    }
    if let Some(truncated) = report.discarded {
        println!(
            "\nResponse ended inside a frame starting at bit {} ({:?})",
            truncated.marker, truncated.field
        );
    }

    Ok(())
}

fn parse_number(text: &str) -> anyhow::Result<u32> {
    let lower = text.to_ascii_lowercase();
    let parsed = if let Some(hex) = lower.strip_prefix("0x") {
        u32::from_str_radix(hex, 16)
    } else if let Some(bin) = lower.strip_prefix("0b") {
        u32::from_str_radix(bin, 2)
    } else {
        lower.parse()
    };
    parsed.map_err(|e| anyhow::anyhow!("Invalid number {:?}: {}", text, e))
}
