use clap::{ArgAction, ArgGroup, Parser};
use gsea_core::options::DEFAULT_MAX_IN_FLIGHT;
use gsea_core::{Algorithm, Category};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Compress, decompress, encrypt or decrypt every file in a directory tree",
    long_about = None
)]
#[command(group(
    ArgGroup::new("action")
        .required(true)
        .args(["compress", "decompress", "encrypt", "decrypt"])
))]
pub struct Cli {
    /// Compress the input
    #[arg(short = 'c', long)]
    pub compress: bool,

    /// Decompress the input
    #[arg(short = 'd', long)]
    pub decompress: bool,

    /// Encrypt the input
    #[arg(short = 'e', long)]
    pub encrypt: bool,

    /// Decrypt the input
    #[arg(short = 'u', long)]
    pub decrypt: bool,

    /// File or directory to transform
    #[arg(short = 'i', long, value_name = "PATH")]
    pub input: PathBuf,

    /// Output file name for a single file, or the tag appended to every
    /// directory name for a tree (`docs` becomes `docs_<NAME>`)
    #[arg(short = 'o', long, value_name = "NAME")]
    pub output: String,

    /// Compression algorithm [huffman, rle, zstd; default huffman]
    #[arg(
        long,
        value_name = "ALG",
        value_parser = compression_algorithm,
        conflicts_with_all = ["encrypt", "decrypt"]
    )]
    pub comp_alg: Option<Algorithm>,

    /// Encryption algorithm [aes, vigenere, xor; default aes]
    #[arg(
        long,
        value_name = "ALG",
        value_parser = encryption_algorithm,
        conflicts_with_all = ["compress", "decompress"]
    )]
    pub enc_alg: Option<Algorithm>,

    /// Passphrase used as the cipher key
    #[arg(short = 'k', long = "key", env = "GSEA_KEY", hide_env_values = true)]
    pub key: Option<String>,

    /// Raw cipher key as hex; takes precedence over --key
    #[arg(long = "key-hex", value_name = "HEX")]
    pub key_hex: Option<String>,

    /// Worker threads (0 = one per core)
    #[arg(long, env = "GSEA_THREADS", default_value_t = 0)]
    pub threads: usize,

    /// Workers allowed in flight before entries run inline
    #[arg(long, env = "GSEA_MAX_IN_FLIGHT", default_value_t = DEFAULT_MAX_IN_FLIGHT)]
    pub max_in_flight: usize,

    /// Reuse existing output directories and replace existing output files
    #[arg(long)]
    pub overwrite: bool,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

fn algorithm_in(s: &str, category: Category) -> Result<Algorithm, String> {
    let alg: Algorithm = s.parse().map_err(|e: gsea_core::GseaError| e.to_string())?;
    if alg.category() != category {
        return Err(format!("{alg} is not a {category:?} algorithm").to_lowercase());
    }
    Ok(alg)
}

fn compression_algorithm(s: &str) -> Result<Algorithm, String> {
    algorithm_in(s, Category::Compression)
}

fn encryption_algorithm(s: &str) -> Result<Algorithm, String> {
    algorithm_in(s, Category::Encryption)
}
