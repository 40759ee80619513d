//! Serial port discovery for the EMG device
//!
//! Runs once per connection attempt, not per sample. Selection is
//! deliberately conservative: several equally plausible candidates are
//! an error, never a guess.

use bridge_core::{BridgeError, BridgeResult, SerialSettings};
use tokio_serial::{SerialPortInfo, SerialPortType};
use tracing::info;

/// Description substrings of the usual USB-to-serial bridge chips
const KNOWN_BRIDGE_SIGNATURES: &[&str] = &["FTDI", "CH340", "CP210", "Arduino", "USB Serial"];

/// Pick the serial port connected to the EMG device.
///
/// Honors an explicit override; otherwise enumerates the OS port list
/// and applies [`select_candidate`].
pub fn resolve(settings: &SerialSettings) -> BridgeResult<String> {
    if let Some(port) = &settings.port_override {
        return Ok(port.clone());
    }

    let ports = tokio_serial::available_ports().map_err(|e| BridgeError::ConnectionError {
        port: "<port enumeration>".to_string(),
        reason: e.to_string(),
    })?;

    for port in &ports {
        info!(port = %port.port_name, "available serial port");
    }

    select_candidate(&ports)
}

/// Select the EMG device from an enumerated port list.
///
/// Preference order: a unique port carrying a known USB-serial bridge
/// signature, then a unique USB port, then a unique port of any kind.
pub fn select_candidate(ports: &[SerialPortInfo]) -> BridgeResult<String> {
    if ports.is_empty() {
        return Err(BridgeError::NoDeviceFound);
    }

    let usb: Vec<&SerialPortInfo> = ports
        .iter()
        .filter(|p| matches!(p.port_type, SerialPortType::UsbPort(_)))
        .collect();

    let signed: Vec<&SerialPortInfo> = usb
        .iter()
        .copied()
        .filter(|p| has_bridge_signature(p))
        .collect();

    match signed.as_slice() {
        [only] => return Ok(only.port_name.clone()),
        [] => {}
        many => {
            return Err(BridgeError::AmbiguousDevice {
                candidates: many.iter().map(|p| p.port_name.clone()).collect(),
            });
        }
    }

    if let [only] = usb.as_slice() {
        return Ok(only.port_name.clone());
    }

    if let [only] = ports {
        return Ok(only.port_name.clone());
    }

    Err(BridgeError::AmbiguousDevice {
        candidates: ports.iter().map(|p| p.port_name.clone()).collect(),
    })
}

fn has_bridge_signature(port: &SerialPortInfo) -> bool {
    let SerialPortType::UsbPort(info) = &port.port_type else {
        return false;
    };
    [info.product.as_deref(), info.manufacturer.as_deref()]
        .iter()
        .flatten()
        .any(|text| KNOWN_BRIDGE_SIGNATURES.iter().any(|sig| text.contains(sig)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_serial::UsbPortInfo;

    fn usb_port(name: &str, product: Option<&str>) -> SerialPortInfo {
        SerialPortInfo {
            port_name: name.to_string(),
            port_type: SerialPortType::UsbPort(UsbPortInfo {
                vid: 0x0403,
                pid: 0x6001,
                serial_number: None,
                manufacturer: None,
                product: product.map(str::to_string),
            }),
        }
    }

    fn bare_port(name: &str) -> SerialPortInfo {
        SerialPortInfo {
            port_name: name.to_string(),
            port_type: SerialPortType::Unknown,
        }
    }

    #[test]
    fn test_no_ports_is_no_device() {
        assert_eq!(select_candidate(&[]), Err(BridgeError::NoDeviceFound));
    }

    #[test]
    fn test_signature_match_wins_over_other_ports() {
        let ports = vec![
            bare_port("/dev/ttyS0"),
            usb_port("/dev/ttyUSB0", Some("CH340 serial converter")),
            usb_port("/dev/ttyACM3", None),
        ];
        assert_eq!(select_candidate(&ports).unwrap(), "/dev/ttyUSB0");
    }

    #[test]
    fn test_two_signature_matches_are_ambiguous() {
        let ports = vec![
            usb_port("/dev/ttyUSB0", Some("FT232R USB UART")),
            usb_port("/dev/ttyUSB1", Some("CP2102 USB to UART")),
        ];
        match select_candidate(&ports) {
            Err(BridgeError::AmbiguousDevice { candidates }) => {
                assert_eq!(candidates, vec!["/dev/ttyUSB0", "/dev/ttyUSB1"]);
            }
            other => panic!("expected AmbiguousDevice, got {:?}", other),
        }
    }

    #[test]
    fn test_single_unsigned_usb_port_wins() {
        let ports = vec![bare_port("/dev/ttyS0"), usb_port("/dev/ttyACM0", None)];
        assert_eq!(select_candidate(&ports).unwrap(), "/dev/ttyACM0");
    }

    #[test]
    fn test_single_port_of_any_kind_wins() {
        let ports = vec![bare_port("/dev/ttyS0")];
        assert_eq!(select_candidate(&ports).unwrap(), "/dev/ttyS0");
    }

    #[test]
    fn test_multiple_unremarkable_ports_are_ambiguous() {
        let ports = vec![bare_port("/dev/ttyS0"), bare_port("/dev/ttyS1")];
        assert!(matches!(
            select_candidate(&ports),
            Err(BridgeError::AmbiguousDevice { .. })
        ));
    }

    #[test]
    fn test_override_bypasses_discovery() {
        let settings = SerialSettings {
            port_override: Some("/dev/ttyUSB7".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve(&settings).unwrap(), "/dev/ttyUSB7");
    }
}
