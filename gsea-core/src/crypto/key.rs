use crate::error::{GseaError, Result};
use std::fmt;

/// Derivation contexts (domain separation for blake3::derive_key).
pub enum Purpose {
    BlockKey,
    BlockIv,
    BlockMac,
}

impl Purpose {
    fn context(&self) -> &'static str {
        match self {
            Purpose::BlockKey => "gsea 2024 block cipher key",
            Purpose::BlockIv => "gsea 2024 block cipher iv",
            Purpose::BlockMac => "gsea 2024 block cipher mac",
        }
    }
}

/// User-supplied cipher key. Stream ciphers use the bytes as-is; the block
/// cipher derives its subkeys from them.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyMaterial(Vec<u8>);

impl KeyMaterial {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        if bytes.is_empty() {
            return Err(GseaError::config("key must not be empty"));
        }
        Ok(Self(bytes))
    }

    pub fn from_passphrase(passphrase: &str) -> Result<Self> {
        Self::from_bytes(passphrase.as_bytes().to_vec())
    }

    pub fn from_hex(hex_str: &str) -> Result<Self> {
        Self::from_bytes(super::hex::parse_hex_bytes(hex_str)?)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// 32 bytes of subkey material bound to `purpose`.
    pub fn derive(&self, purpose: Purpose) -> [u8; 32] {
        blake3::derive_key(purpose.context(), &self.0)
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyMaterial({} bytes)", self.0.len())
    }
}
