//! Saved bus captures
//!
//! Responses can be kept as raw `.bin` files or as text in the shapes the
//! debug tools print: decimal lists (`[188, 237, 6]`), hex bytes (`bc ed 06`,
//! `0xbc`), or binary (`0b10111100`, `10111100`, or one long run of bits
//! whose length is a multiple of 8).

use regex::Regex;
use std::fs;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Capture contains no bytes")]
    Empty,
}

pub type Result<T> = std::result::Result<T, CaptureError>;

lazy_static::lazy_static! {
    /// Candidate byte tokens: prefixed hex, prefixed binary, or bare digits
    static ref TOKEN: Regex = Regex::new(r"(?i)\b(?:0x[0-9a-f]+|0b[01]+|[0-9a-f]+)\b").unwrap();
}

/// Load a capture file; `.bin` files are read verbatim, anything else as text
pub fn load_capture(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let is_binary = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("bin"))
        .unwrap_or(false);

    let bytes = if is_binary {
        fs::read(path)?
    } else {
        parse_capture_text(&fs::read_to_string(path)?)
    };

    if bytes.is_empty() {
        return Err(CaptureError::Empty);
    }
    Ok(bytes)
}

/// Extract bytes from a text capture; lines starting with '#' are comments
pub fn parse_capture_text(text: &str) -> Vec<u8> {
    let decimal = text.contains('[') || text.contains(',');
    let mut bytes = Vec::new();

    for (line_num, line) in text.lines().enumerate() {
        if line.trim_start().starts_with('#') {
            continue;
        }
        for token in TOKEN.find_iter(line) {
            match parse_token(token.as_str(), decimal) {
                Some(parsed) => bytes.extend(parsed),
                None => tracing::warn!(
                    "Skipping token {:?} on line {}",
                    token.as_str(),
                    line_num + 1
                ),
            }
        }
    }

    bytes
}

fn parse_token(token: &str, decimal: bool) -> Option<Vec<u8>> {
    let lower = token.to_ascii_lowercase();

    // "0b" alone is the hex byte 0x0b
    if let Some(hex) = lower.strip_prefix("0x").filter(|s| !s.is_empty()) {
        return u8::from_str_radix(hex, 16).ok().map(|b| vec![b]);
    }
    if let Some(bin) = lower.strip_prefix("0b").filter(|s| !s.is_empty()) {
        return u8::from_str_radix(bin, 2).ok().map(|b| vec![b]);
    }
    if lower.len() % 8 == 0 && lower.chars().all(|c| c == '0' || c == '1') {
        return lower
            .as_bytes()
            .chunks(8)
            .map(|chunk| {
                std::str::from_utf8(chunk)
                    .ok()
                    .and_then(|s| u8::from_str_radix(s, 2).ok())
            })
            .collect();
    }
    if decimal {
        return lower.parse::<u8>().ok().map(|b| vec![b]);
    }
    if lower.len() == 2 {
        return u8::from_str_radix(&lower, 16).ok().map(|b| vec![b]);
    }
    None
}

/// Save bytes as a text capture, 16 hex bytes per line
pub fn save_capture(path: impl AsRef<Path>, bytes: &[u8]) -> Result<()> {
    let mut file = fs::File::create(path)?;
    writeln!(file, "# {} bytes", bytes.len())?;
    for chunk in bytes.chunks(16) {
        let line: Vec<String> = chunk.iter().map(|b| format!("{:02x}", b)).collect();
        writeln!(file, "{}", line.join(" "))?;
    }
    Ok(())
}
