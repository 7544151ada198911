#![forbid(unsafe_code)]

pub mod action;
pub mod classify;
pub mod error;
pub mod naming;
pub mod options;
pub mod report;
pub mod runner;
pub mod walk;

pub mod codec;

pub mod crypto {
    pub mod hex;
    pub mod key;
}

// Re-exports: stable API surface
pub use action::{Action, Algorithm, Category};
pub use crypto::key::KeyMaterial;
pub use error::{CodecError, GseaError, Result};
pub use options::TransformOptions;
pub use report::{Outcome, RunReport, TreeReport};
pub use runner::{RunRequest, run};
