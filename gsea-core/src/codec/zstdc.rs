use super::Codec;
use crate::action::Algorithm;
use crate::error::CodecError;
use std::io::Write;

pub struct ZstdCodec {
    level: i32,
    /// zstd worker threads per frame; 0 compresses on the calling thread.
    workers: u32,
}

impl Default for ZstdCodec {
    fn default() -> Self {
        Self { level: 3, workers: 0 }
    }
}

impl ZstdCodec {
    pub fn with_level(level: i32) -> Self {
        Self {
            level: level.max(1),
            ..Self::default()
        }
    }

    pub fn with_workers(mut self, workers: u32) -> Self {
        self.workers = workers;
        self
    }
}

fn backend(e: std::io::Error) -> CodecError {
    CodecError::Backend(e.to_string())
}

impl Codec for ZstdCodec {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Zstd
    }

    fn encode(&self, input: &[u8]) -> Result<Vec<u8>, CodecError> {
        let mut enc = zstd::stream::Encoder::new(Vec::with_capacity(input.len() / 2), self.level).map_err(backend)?;
        // Multithreading only when compiled with the "zstdmt" feature.
        #[cfg(feature = "zstdmt")]
        {
            if self.workers > 0 {
                enc.multithread(self.workers).map_err(backend)?;
            }
        }
        enc.write_all(input).map_err(backend)?;
        enc.finish().map_err(backend)
    }

    fn decode(&self, input: &[u8]) -> Result<Vec<u8>, CodecError> {
        zstd::stream::decode_all(input).map_err(|e| CodecError::Corrupt(e.to_string()))
    }
}
