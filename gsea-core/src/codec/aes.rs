//! AES-128-CBC with PKCS#7 padding and a blake3 keyed tag.
//!
//! Layout: `u64 LE plaintext length | 32-byte tag | ciphertext`. The tag
//! covers the length field and the ciphertext, so a wrong key is reported as
//! [`CodecError::KeyMismatch`] instead of producing garbage. The IV is derived
//! from the key, which keeps the codec a pure function of (input, key).

use super::Codec;
use crate::action::Algorithm;
use crate::crypto::key::{KeyMaterial, Purpose};
use crate::error::CodecError;
use aes::Aes128;
use aes::Block;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};

pub const BLOCK_LEN: usize = 16;
const LEN_FIELD: usize = 8;
const TAG_LEN: usize = 32;
const HEADER_LEN: usize = LEN_FIELD + TAG_LEN;

pub struct BlockCipher {
    cipher: Aes128,
    iv: [u8; BLOCK_LEN],
    mac_key: [u8; 32],
}

impl BlockCipher {
    pub fn new(key: &KeyMaterial) -> Self {
        let enc = key.derive(Purpose::BlockKey);
        let mut aes_key = [0u8; BLOCK_LEN];
        aes_key.copy_from_slice(&enc[..BLOCK_LEN]);
        let mut iv = [0u8; BLOCK_LEN];
        iv.copy_from_slice(&key.derive(Purpose::BlockIv)[..BLOCK_LEN]);
        Self {
            cipher: Aes128::new(&aes_key.into()),
            iv,
            mac_key: key.derive(Purpose::BlockMac),
        }
    }

    fn tag(&self, len_field: &[u8], ciphertext: &[u8]) -> blake3::Hash {
        let mut h = blake3::Hasher::new_keyed(&self.mac_key);
        h.update(len_field);
        h.update(ciphertext);
        h.finalize()
    }
}

fn xor_into(block: &mut [u8], other: &[u8]) {
    for (b, o) in block.iter_mut().zip(other) {
        *b ^= o;
    }
}

impl Codec for BlockCipher {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Aes
    }

    fn encode(&self, input: &[u8]) -> Result<Vec<u8>, CodecError> {
        let pad = BLOCK_LEN - input.len() % BLOCK_LEN;
        let mut padded = Vec::with_capacity(input.len() + pad);
        padded.extend_from_slice(input);
        padded.resize(input.len() + pad, pad as u8);

        let mut ciphertext = Vec::with_capacity(padded.len());
        let mut prev = self.iv;
        for chunk in padded.chunks_exact(BLOCK_LEN) {
            let mut block = Block::clone_from_slice(chunk);
            xor_into(&mut block, &prev);
            self.cipher.encrypt_block(&mut block);
            prev.copy_from_slice(&block);
            ciphertext.extend_from_slice(&block);
        }

        let len_field = (input.len() as u64).to_le_bytes();
        let tag = self.tag(&len_field, &ciphertext);

        let mut out = Vec::with_capacity(HEADER_LEN + ciphertext.len());
        out.extend_from_slice(&len_field);
        out.extend_from_slice(tag.as_bytes());
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    fn decode(&self, input: &[u8]) -> Result<Vec<u8>, CodecError> {
        if input.len() < HEADER_LEN + BLOCK_LEN {
            return Err(CodecError::Truncated("block cipher header"));
        }
        let (len_field, rest) = input.split_at(LEN_FIELD);
        let (tag, ciphertext) = rest.split_at(TAG_LEN);
        if ciphertext.len() % BLOCK_LEN != 0 {
            return Err(CodecError::Corrupt(format!(
                "ciphertext length {} is not a multiple of {BLOCK_LEN}",
                ciphertext.len()
            )));
        }

        let mut expected = [0u8; TAG_LEN];
        expected.copy_from_slice(tag);
        // blake3::Hash equality is constant-time.
        if self.tag(len_field, ciphertext) != blake3::Hash::from(expected) {
            return Err(CodecError::KeyMismatch);
        }

        let mut plain = Vec::with_capacity(ciphertext.len());
        let mut prev = self.iv;
        for chunk in ciphertext.chunks_exact(BLOCK_LEN) {
            let mut block = Block::clone_from_slice(chunk);
            self.cipher.decrypt_block(&mut block);
            xor_into(&mut block, &prev);
            prev.copy_from_slice(chunk);
            plain.extend_from_slice(&block);
        }

        let pad = plain.last().copied().unwrap_or(0) as usize;
        if pad == 0 || pad > BLOCK_LEN || plain[plain.len() - pad..].iter().any(|&b| b as usize != pad) {
            return Err(CodecError::Corrupt("bad padding".into()));
        }
        plain.truncate(plain.len() - pad);

        let mut len_bytes = [0u8; LEN_FIELD];
        len_bytes.copy_from_slice(len_field);
        if plain.len() as u64 != u64::from_le_bytes(len_bytes) {
            return Err(CodecError::Corrupt("plaintext length mismatch".into()));
        }
        Ok(plain)
    }
}
