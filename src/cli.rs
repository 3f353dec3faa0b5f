use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)] // requires `derive` feature
#[command(name = "org-chart")]
#[command(about = "Build reporting-hierarchy charts from HR spreadsheets", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Args)]
pub struct FileArgs {
    /// File name, or part of one, in the data directory
    pub file: Option<String>,
    /// Pass "yes" to confirm the file suggested for this session
    #[arg(long)]
    pub proceed: Option<String>,
    /// Session the file suggestion is remembered under
    #[arg(long, short)]
    pub session: Option<String>,
    /// Accept a suggested file without asking
    #[arg(long, short)]
    pub yes: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build an org chart from a data file
    BuildChart {
        #[command(flatten)]
        file: FileArgs,
        /// Equality filters, e.g. "Cost Center Name=Woodland,Job Title=Manager"
        #[arg(long, short)]
        filter: Option<String>,
    },
    /// List the values of the grouping column
    ListGroups {
        #[command(flatten)]
        file: FileArgs,
    },
    /// List candidate files in the data directory
    ListFiles,
    /// Print configuration values
    PrintConfig,
}
