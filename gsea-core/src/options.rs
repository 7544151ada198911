use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_IN_FLIGHT: usize = 256;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformOptions {
    /// Worker threads in the pool; 0 lets rayon pick one per core.
    pub threads: usize,
    /// Spawned-but-unfinished workers allowed at once. Past this bound a
    /// work item runs inline in the directory that produced it.
    pub max_in_flight: usize,
    /// Reuse existing output directories and replace existing output files.
    pub overwrite: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            threads: 0,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            overwrite: false,
        }
    }
}
