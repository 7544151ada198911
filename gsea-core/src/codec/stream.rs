//! Repeating-key stream ciphers. The key position always starts at zero for
//! each call, so every file is enciphered independently.

use super::Codec;
use crate::action::Algorithm;
use crate::crypto::key::KeyMaterial;
use crate::error::CodecError;

fn keystream(key: &[u8]) -> impl Iterator<Item = u8> + '_ {
    key.iter().copied().cycle()
}

/// Byte-wise addition modulo 256 with the repeating key.
pub struct Vigenere {
    key: Vec<u8>,
}

impl Vigenere {
    pub fn new(key: &KeyMaterial) -> Self {
        Self {
            key: key.as_bytes().to_vec(),
        }
    }
}

impl Codec for Vigenere {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Vigenere
    }

    fn encode(&self, input: &[u8]) -> Result<Vec<u8>, CodecError> {
        Ok(input
            .iter()
            .zip(keystream(&self.key))
            .map(|(&b, k)| b.wrapping_add(k))
            .collect())
    }

    fn decode(&self, input: &[u8]) -> Result<Vec<u8>, CodecError> {
        Ok(input
            .iter()
            .zip(keystream(&self.key))
            .map(|(&b, k)| b.wrapping_sub(k))
            .collect())
    }
}

/// Byte-wise XOR with the repeating key; its own inverse.
pub struct Xor {
    key: Vec<u8>,
}

impl Xor {
    pub fn new(key: &KeyMaterial) -> Self {
        Self {
            key: key.as_bytes().to_vec(),
        }
    }
}

impl Codec for Xor {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Xor
    }

    fn encode(&self, input: &[u8]) -> Result<Vec<u8>, CodecError> {
        Ok(input.iter().zip(keystream(&self.key)).map(|(&b, k)| b ^ k).collect())
    }

    fn decode(&self, input: &[u8]) -> Result<Vec<u8>, CodecError> {
        self.encode(input)
    }
}
