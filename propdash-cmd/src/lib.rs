//! Command implementations for the propdash CLI.
//!
//! Every command loads the same three sources (transactions, district
//! geometry, optional planning-area lookup), drives a
//! `DashboardController` through one filter change and reports the result.

use clap::Subcommand;

pub mod export;
pub mod filters;
pub mod load;

use filters::FilterArgs;
use load::SourceArgs;

#[derive(Subcommand)]
pub enum Command {
    /// Print the load report and the headline figures for the filtered data
    Summary {
        #[command(flatten)]
        sources: SourceArgs,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Write every chart's data for the filtered state as JSON
    Export {
        #[command(flatten)]
        sources: SourceArgs,

        #[command(flatten)]
        filters: FilterArgs,

        /// Output path; stdout when omitted
        #[arg(short = 'o', long)]
        output: Option<String>,

        /// Also include the geometry annotated with district averages
        #[arg(long)]
        with_geometry: bool,
    },
}

pub async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Summary { sources, filters } => export::run_summary(&sources, &filters).await,
        Command::Export {
            sources,
            filters,
            output,
            with_geometry,
        } => export::run_export(&sources, &filters, output.as_deref(), with_geometry).await,
    }
}
