//! # lookalike CLI
//!
//! Command-line interface for the duplicate image sweeper.
//!
//! ## Usage
//! ```bash
//! lookalike scan ~/Pictures --threshold 10
//! lookalike sweep ~/Pictures --yes
//! ```

mod cli;

use lookalike::Result;

fn main() -> Result<()> {
    lookalike::init_tracing();
    cli::run()
}
