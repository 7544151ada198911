use crate::error::{GseaError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The single operation a run performs. Built once from the command-line
/// flags and passed by value down every recursive call.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Compress,
    Decompress,
    Encrypt,
    Decrypt,
}

/// Compression and encryption selectors live in disjoint spaces.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Category {
    Compression,
    Encryption,
}

impl Action {
    /// Validates a raw flag set: exactly one flag must be raised.
    pub fn from_flags(compress: bool, decompress: bool, encrypt: bool, decrypt: bool) -> Result<Self> {
        let raised: Vec<Action> = [
            (compress, Action::Compress),
            (decompress, Action::Decompress),
            (encrypt, Action::Encrypt),
            (decrypt, Action::Decrypt),
        ]
        .into_iter()
        .filter_map(|(on, a)| on.then_some(a))
        .collect();

        match raised.as_slice() {
            [one] => Ok(*one),
            [] => Err(GseaError::config(
                "one of compress, decompress, encrypt or decrypt is required",
            )),
            many => Err(GseaError::config(format!(
                "conflicting actions requested: {}",
                many.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(", ")
            ))),
        }
    }

    pub fn category(self) -> Category {
        match self {
            Action::Compress | Action::Decompress => Category::Compression,
            Action::Encrypt | Action::Decrypt => Category::Encryption,
        }
    }

    /// True when the codec runs in its forward (encode) direction.
    pub fn is_forward(self) -> bool {
        matches!(self, Action::Compress | Action::Encrypt)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Compress => "compress",
            Action::Decompress => "decompress",
            Action::Encrypt => "encrypt",
            Action::Decrypt => "decrypt",
        };
        f.write_str(s)
    }
}

/// Identifies a concrete codec. Resolved once per run.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Huffman,
    Rle,
    Zstd,
    Aes,
    Vigenere,
    Xor,
}

impl Algorithm {
    pub fn category(self) -> Category {
        match self {
            Algorithm::Huffman | Algorithm::Rle | Algorithm::Zstd => Category::Compression,
            Algorithm::Aes | Algorithm::Vigenere | Algorithm::Xor => Category::Encryption,
        }
    }

    /// Algorithm used when the caller does not pick one.
    pub fn default_for(action: Action) -> Self {
        match action.category() {
            Category::Compression => Algorithm::Huffman,
            Category::Encryption => Algorithm::Aes,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Huffman => "huffman",
            Algorithm::Rle => "rle",
            Algorithm::Zstd => "zstd",
            Algorithm::Aes => "aes",
            Algorithm::Vigenere => "vigenere",
            Algorithm::Xor => "xor",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = GseaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "huffman" | "entropy-coder" => Ok(Algorithm::Huffman),
            "rle" | "run-length" => Ok(Algorithm::Rle),
            "zstd" => Ok(Algorithm::Zstd),
            "aes" | "block-cipher" => Ok(Algorithm::Aes),
            "vigenere" | "stream-cipher" => Ok(Algorithm::Vigenere),
            "xor" => Ok(Algorithm::Xor),
            other => Err(GseaError::config(format!("unknown algorithm: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_flag_is_accepted() {
        assert_eq!(Action::from_flags(true, false, false, false).unwrap(), Action::Compress);
        assert_eq!(Action::from_flags(false, false, false, true).unwrap(), Action::Decrypt);
    }

    #[test]
    fn missing_or_conflicting_flags_are_config_errors() {
        assert!(matches!(
            Action::from_flags(false, false, false, false),
            Err(GseaError::Config(_))
        ));
        assert!(matches!(
            Action::from_flags(true, false, true, false),
            Err(GseaError::Config(_))
        ));
    }

    #[test]
    fn aliases_resolve() {
        assert_eq!("entropy-coder".parse::<Algorithm>().unwrap(), Algorithm::Huffman);
        assert_eq!("Run-Length".parse::<Algorithm>().unwrap(), Algorithm::Rle);
        assert_eq!("block-cipher".parse::<Algorithm>().unwrap(), Algorithm::Aes);
        assert!("lzma".parse::<Algorithm>().is_err());
    }

    #[test]
    fn defaults_follow_category() {
        assert_eq!(Algorithm::default_for(Action::Decompress), Algorithm::Huffman);
        assert_eq!(Algorithm::default_for(Action::Encrypt), Algorithm::Aes);
    }
}
