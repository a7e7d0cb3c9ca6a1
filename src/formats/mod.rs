// File format handlers
pub mod capture;

pub use capture::{load_capture, parse_capture_text, save_capture, CaptureError};
