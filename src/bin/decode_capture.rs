//! Offline decoder for saved MUX responses
//! Reads a capture file and prints the messages it contains

use muxi_rs::bitwise::{BitOrder, Bitstream};
use muxi_rs::protocol::{decode_report, FrameSplitter};
use muxi_rs::{load_capture, logging};
use std::env;

fn main() -> anyhow::Result<()> {
    logging::init("warn");

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut path = None;
    let mut order = BitOrder::Reversed;
    let mut aligned = false;
    let mut json = false;

    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--natural" => order = BitOrder::Natural,
            "--aligned" => aligned = true,
            "--json" => json = true,
            other if other.starts_with("--") => anyhow::bail!("Unknown option: {}", other),
            other => path = Some(other.to_string()),
        }
    }

    let Some(path) = path else {
        eprintln!("Usage: {} <capture> [--natural] [--aligned] [--json]", args[0]);
        eprintln!("\nExamples:");
        eprintln!("  {} response.txt            # Bitstream frames", args[0]);
        eprintln!("  {} response.txt --natural  # Bytes already in read order", args[0]);
        eprintln!("  {} poll.bin --aligned      # Byte-aligned frames", args[0]);
        std::process::exit(1);
    };

    let data = load_capture(&path)?;
    tracing::info!("Loaded {} bytes from {}", data.len(), path);

    if aligned {
        let mut splitter = FrameSplitter::new();
        splitter.push(&data);
        let mut messages = Vec::new();
        for frame in splitter.messages() {
            match frame {
                Ok(message) => messages.push(message),
                Err(e) => tracing::warn!("Skipping aligned frame: {}", e),
            }
        }

        if json {
            println!("{}", serde_json::to_string_pretty(&messages)?);
        } else {
            for message in &messages {
                println!("{}", message);
            }
            if splitter.pending() > 0 {
                println!("({} trailing bytes without a complete frame)", splitter.pending());
            }
        }
        return Ok(());
    }

    let stream = Bitstream::from_bytes(&data, order);
    let report = decode_report(&stream);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", stream);
    println!("\nFound {} message(s)\n", report.messages.len());
    for message in &report.messages {
        println!("{}", message);
    }
    if let Some(truncated) = report.discarded {
        println!(
            "\nDropped a truncated frame at bit {} ({:?})",
            truncated.marker, truncated.field
        );
    }

    Ok(())
}
