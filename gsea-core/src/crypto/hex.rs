use crate::error::{GseaError, Result};

/// Decodes a hex string into raw key bytes. Whitespace around the value is
/// ignored; an empty decode is rejected.
pub fn parse_hex_bytes(hex_str: &str) -> Result<Vec<u8>> {
    let bytes = hex::decode(hex_str.trim()).map_err(|e| GseaError::config(format!("invalid hex: {e}")))?;
    if bytes.is_empty() {
        return Err(GseaError::config("expected at least 1 byte of hex key"));
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_and_validates() {
        assert_eq!(parse_hex_bytes(" 00ff10 ").unwrap(), vec![0x00, 0xff, 0x10]);
        assert!(parse_hex_bytes("abc").is_err());
        assert!(parse_hex_bytes("zz").is_err());
        assert!(parse_hex_bytes("").is_err());
    }
}
