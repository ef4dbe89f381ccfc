// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use anyhow::Result;
use ta_cli::{Cli, Commands, Parser};
use tracing::error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.logging.init("ta-cli")?;

    let settings = cli.settings().inspect_err(|err| {
        error!(error = %err, "configuration could not be resolved");
    })?;

    match cli.command {
        Commands::Query(args) => args.run(settings).await,
        Commands::Types => {
            ta_cli::types_command::run(&settings);
            Ok(())
        }
        Commands::Config { subcommand } => subcommand.run(&settings),
    }
}
