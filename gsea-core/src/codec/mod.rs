use crate::action::{Action, Algorithm, Category};
use crate::crypto::key::KeyMaterial;
use crate::error::{CodecError, GseaError, Result};

/// A reversible byte transform. Implementations keep no state between calls;
/// ciphers carry their key, bound when the codec is resolved.
pub trait Codec: Send + Sync {
    fn algorithm(&self) -> Algorithm;
    fn encode(&self, input: &[u8]) -> std::result::Result<Vec<u8>, CodecError>;
    fn decode(&self, input: &[u8]) -> std::result::Result<Vec<u8>, CodecError>;

    /// Runs the direction selected by `action`.
    fn apply(&self, action: Action, input: &[u8]) -> std::result::Result<Vec<u8>, CodecError> {
        if action.is_forward() {
            self.encode(input)
        } else {
            self.decode(input)
        }
    }
}

pub mod aes;
pub mod huffman;
pub mod io;
pub mod rle;
pub mod stream;
pub mod zstdc;

pub use io::{FileStats, transform_file};

/// Resolves an algorithm for `action` into a concrete codec.
///
/// Fails with a configuration error when the algorithm belongs to the other
/// category, or when a cipher is requested without usable key material.
pub fn resolve(action: Action, algorithm: Algorithm, key: Option<&KeyMaterial>) -> Result<Box<dyn Codec>> {
    if algorithm.category() != action.category() {
        return Err(GseaError::config(format!(
            "algorithm {algorithm} cannot be used to {action}"
        )));
    }

    let codec: Box<dyn Codec> = match algorithm {
        Algorithm::Huffman => Box::new(huffman::Huffman),
        Algorithm::Rle => Box::new(rle::RunLength),
        Algorithm::Zstd => Box::new(zstdc::ZstdCodec::default()),
        Algorithm::Aes | Algorithm::Vigenere | Algorithm::Xor => {
            debug_assert_eq!(algorithm.category(), Category::Encryption);
            let key = key.ok_or_else(|| GseaError::config(format!("{algorithm} requires a key")))?;
            match algorithm {
                Algorithm::Aes => Box::new(aes::BlockCipher::new(key)),
                Algorithm::Vigenere => Box::new(stream::Vigenere::new(key)),
                _ => Box::new(stream::Xor::new(key)),
            }
        }
    };
    Ok(codec)
}
