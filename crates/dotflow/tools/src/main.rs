// Dotlanth
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! dotflow CLI
//!
//! Entry point for analysing and scheduling BPDF graph descriptions.

use anyhow::Result;
use clap::{Parser, Subcommand};
use dotflow_tools::ToolsConfig;
use dotflow_tools::cli::analyse::{AnalyseArgs, run_analyse};
use dotflow_tools::cli::schedule::{ScheduleArgs, run_schedule};
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(name = "dotflow")]
#[command(about = "dotflow - Boolean Parametric Dataflow analyzer and scheduler")]
#[command(version)]
struct Cli {
    /// Configuration file, defaults to $DOTFLOW_CONFIG
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check consistency, liveness and period safety of a graph
    Analyse(AnalyseArgs),
    /// Run a verified graph under the constraint scheduler
    Schedule(ScheduleArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ToolsConfig::resolve_config(cli.config)?;
    let level = if cli.verbose { Level::DEBUG } else { config.level()? };

    tracing_subscriber::fmt().with_max_level(level).with_writer(std::io::stderr).init();

    let output = match cli.command {
        Commands::Analyse(args) => run_analyse(&args)?,
        Commands::Schedule(args) => run_schedule(&args, &config)?,
    };
    print!("{output}");
    Ok(())
}
