use serde_json::Value;

use crate::error::TransportError;

/// Parse an effect or palette list. The position of a name is its device id.
pub fn parse(url: &str, value: Value) -> Result<Vec<String>, TransportError> {
    serde_json::from_value(value).map_err(|source| TransportError::Decode {
        url: url.to_string(),
        source,
    })
}

/// Index of the first entry equal to `name`, ignoring case.
pub fn find_index(names: &[String], name: &str) -> Option<usize> {
    let name = name.to_lowercase();
    names.iter().position(|n| n.to_lowercase() == name)
}

/// Brightness accepted by the device, never fully dark.
pub fn clamp_brightness(brightness: i64) -> u8 {
    brightness.clamp(1, 255) as u8
}
