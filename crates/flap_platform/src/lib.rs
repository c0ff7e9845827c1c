pub mod serial;
pub mod window;

pub use serial::{normalize_port_name, LineReader, ReadOutcome, SerialDevice};
pub use window::{create_window, PlatformConfig};
