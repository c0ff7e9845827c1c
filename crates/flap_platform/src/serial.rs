//! Line-oriented channel to the external board.
//!
//! The board prints one token per line (`JUMP\r\n`). Every poll performs a
//! single bounded read; partial lines are kept until their newline arrives.
//! Nothing here panics or returns a hard error after the port is open: a
//! timeout, a garbled line or a dead port all mean "no input this tick".

use std::io::{self, Read};
use std::time::Duration;

use flap_core::input::LineSource;

/// Bytes without a newline beyond this are treated as line noise and dropped.
pub const MAX_LINE_BYTES: usize = 1024;

const READ_CHUNK: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Line(String),
    Idle,
    Undecodable,
    Failed(String),
}

/// Turns whatever the user typed into a port name the OS understands.
///
/// `"5"` and `"com5"` become `"COM5"`; device paths are passed through.
pub fn normalize_port_name(raw: &str) -> Option<String> {
    let name = raw.trim();
    if name.is_empty() {
        return None;
    }
    if name.starts_with("/dev/") {
        return Some(name.to_string());
    }
    if name.bytes().all(|b| b.is_ascii_digit()) {
        return Some(format!("COM{name}"));
    }
    if let (Some(prefix), Some(digits)) = (name.get(..3), name.get(3..)) {
        if prefix.eq_ignore_ascii_case("com")
            && !digits.is_empty()
            && digits.bytes().all(|b| b.is_ascii_digit())
        {
            return Some(format!("COM{digits}"));
        }
    }
    Some(name.to_string())
}

pub struct LineReader<R: Read> {
    inner: R,
    pending: Vec<u8>,
    reported_failure: bool,
}

impl<R: Read> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            pending: Vec::new(),
            reported_failure: false,
        }
    }

    pub fn buffered_len(&self) -> usize {
        self.pending.len()
    }

    /// At most one `read` on the underlying channel.
    pub fn read_line(&mut self) -> ReadOutcome {
        if let Some(line) = self.take_line() {
            return line;
        }

        let mut chunk = [0u8; READ_CHUNK];
        match self.inner.read(&mut chunk) {
            Ok(0) => ReadOutcome::Idle,
            Ok(n) => {
                self.pending.extend_from_slice(&chunk[..n]);
                if let Some(line) = self.take_line() {
                    return line;
                }
                if self.pending.len() > MAX_LINE_BYTES {
                    self.pending.clear();
                    return ReadOutcome::Undecodable;
                }
                ReadOutcome::Idle
            }
            Err(e) => match e.kind() {
                io::ErrorKind::TimedOut
                | io::ErrorKind::WouldBlock
                | io::ErrorKind::Interrupted => ReadOutcome::Idle,
                _ => ReadOutcome::Failed(e.to_string()),
            },
        }
    }

    fn take_line(&mut self) -> Option<ReadOutcome> {
        let newline = self.pending.iter().position(|&b| b == b'\n')?;
        let mut line: Vec<u8> = self.pending.drain(..=newline).collect();
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(match String::from_utf8(line) {
            Ok(text) => ReadOutcome::Line(text),
            Err(_) => ReadOutcome::Undecodable,
        })
    }
}

impl<R: Read> LineSource for LineReader<R> {
    fn poll_line(&mut self) -> Option<String> {
        match self.read_line() {
            ReadOutcome::Line(line) => Some(line),
            ReadOutcome::Idle => None,
            ReadOutcome::Undecodable => {
                log::trace!("Dropped undecodable device line");
                None
            }
            ReadOutcome::Failed(reason) => {
                if !self.reported_failure {
                    self.reported_failure = true;
                    log::debug!("Device read failed: {reason}");
                } else {
                    log::trace!("Device read failed: {reason}");
                }
                None
            }
        }
    }
}

pub struct SerialDevice {
    port_name: String,
    reader: Option<LineReader<Box<dyn serialport::SerialPort>>>,
}

impl SerialDevice {
    pub fn open(port_name: &str, baud_rate: u32, timeout_ms: u64) -> Result<Self, String> {
        let port = serialport::new(port_name, baud_rate)
            .timeout(Duration::from_millis(timeout_ms))
            .open()
            .map_err(|e| format!("Failed to open device {port_name}: {e}"))?;
        log::info!("Device {port_name} opened at {baud_rate} baud");
        Ok(Self {
            port_name: port_name.to_string(),
            reader: Some(LineReader::new(port)),
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    pub fn close(&mut self) {
        if self.reader.take().is_some() {
            log::info!("Device {} closed", self.port_name);
        }
    }
}

impl LineSource for SerialDevice {
    fn poll_line(&mut self) -> Option<String> {
        self.reader.as_mut()?.poll_line()
    }
}

impl Drop for SerialDevice {
    fn drop(&mut self) {
        self.close();
    }
}
