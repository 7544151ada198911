pub mod handlers;

use crate::presentation::cli::Cli;
use gsea_core::error::Result;

/// Runs the parsed command. `Ok(false)` means the run completed but at least
/// one entry failed.
pub fn run(cli: Cli) -> Result<bool> {
    let action = gsea_core::Action::from_flags(cli.compress, cli.decompress, cli.encrypt, cli.decrypt)?;
    handlers::handle_transform(action, cli)
}
