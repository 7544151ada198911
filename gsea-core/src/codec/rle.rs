//! Run-length coding as `(count, byte)` pairs, count in `1..=255`.

use super::Codec;
use crate::action::Algorithm;
use crate::error::CodecError;

const MAX_RUN: usize = u8::MAX as usize;

pub struct RunLength;

impl Codec for RunLength {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Rle
    }

    fn encode(&self, input: &[u8]) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::with_capacity(input.len() / 2 + 2);
        let mut i = 0;
        while i < input.len() {
            let byte = input[i];
            let run = input[i..]
                .iter()
                .take(MAX_RUN)
                .take_while(|&&b| b == byte)
                .count();
            out.push(run as u8);
            out.push(byte);
            i += run;
        }
        Ok(out)
    }

    fn decode(&self, input: &[u8]) -> Result<Vec<u8>, CodecError> {
        if input.len() % 2 != 0 {
            return Err(CodecError::Corrupt(format!(
                "run-length stream has odd length {}",
                input.len()
            )));
        }
        let total: usize = input.chunks_exact(2).map(|p| p[0] as usize).sum();
        let mut out = Vec::with_capacity(total);
        for (n, pair) in input.chunks_exact(2).enumerate() {
            let (count, byte) = (pair[0], pair[1]);
            if count == 0 {
                return Err(CodecError::Corrupt(format!("zero-length run at pair {n}")));
            }
            out.resize(out.len() + count as usize, byte);
        }
        Ok(out)
    }
}
