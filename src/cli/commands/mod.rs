//! Command implementations for the Sparkify loader CLI
//!
//! Each command lives in its own module:
//! - `init`: create (or recreate) the star schema
//! - `load`: song phase, then log phase, with a final report

pub mod init;
pub mod load;
pub mod shared;

use crate::cli::args::{Args, Commands};

/// Main command runner: sets up logging and dispatches to the subcommand
pub async fn run(args: Args) -> anyhow::Result<()> {
    shared::setup_logging(&args)?;

    match &args.command {
        Commands::Init(init_args) => init::run_init(init_args, &args.database_url).await,
        Commands::Load(load_args) => {
            load::run_load(load_args, &args.database_url, args.show_progress()).await?;
            Ok(())
        }
    }
}
