use flap_core::config::DeviceConfig;
use flap_platform::serial::{normalize_port_name, SerialDevice};

use crate::cli::Args;

/// `--no-device` wins, then `--device`, then the config file.
pub fn requested_port(args: &Args, config: &DeviceConfig) -> Option<String> {
    if args.no_device {
        return None;
    }
    args.device
        .as_deref()
        .or(config.port.as_deref())
        .and_then(normalize_port_name)
}

/// A board that cannot be opened is not fatal; the game runs keyboard-only.
pub fn open_device(port: Option<String>, config: &DeviceConfig) -> Option<SerialDevice> {
    let Some(port) = port else {
        log::info!("No device configured, keyboard only");
        return None;
    };
    match SerialDevice::open(&port, config.baud_rate, config.read_timeout_ms) {
        Ok(device) => Some(device),
        Err(e) => {
            log::warn!("{e}; continuing with keyboard only");
            None
        }
    }
}

pub fn device_label(device: Option<&SerialDevice>) -> String {
    match device {
        Some(device) => device.port_name().to_string(),
        None => "keyboard only".to_string(),
    }
}
