use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use amber_restart::io::Version;

#[derive(Parser)]
#[command(
    name = "ncrst",
    about = "Inspect and rewrite Amber NetCDF restart files",
    version,
    author,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase log verbosity (-v for info, -vv for debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only report errors (for scripting)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Summarize a NetCDF container and check the restart convention
    #[command(visible_alias = "i")]
    Inspect(InspectArgs),

    /// Print the frame stored in a restart file
    #[command(visible_alias = "s")]
    Show(ShowArgs),

    /// Rewrite a restart with a fresh schema and unscaled values
    #[command(visible_alias = "n")]
    Normalize(NormalizeArgs),
}

#[derive(Args)]
pub struct InspectArgs {
    /// NetCDF file to inspect
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Restart file to read
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Number of atoms to list (0 lists none)
    #[arg(short = 'n', long, value_name = "N", default_value_t = 10)]
    pub atoms: usize,
}

#[derive(Args)]
pub struct NormalizeArgs {
    /// Restart file to read
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Restart file to create (overwritten if it exists)
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// On-disk container version of the output
    #[arg(long, value_name = "VERSION", default_value = "offset64")]
    pub container: ContainerVersion,

    /// Leave velocities out of the output
    #[arg(long)]
    pub no_velocities: bool,

    /// Value of the `program` attribute of the output
    #[arg(long, value_name = "NAME")]
    pub program: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ContainerVersion {
    /// CDF-1, 32-bit offsets
    Classic,
    /// CDF-2, 64-bit offsets
    Offset64,
}

impl From<ContainerVersion> for Version {
    fn from(value: ContainerVersion) -> Self {
        match value {
            ContainerVersion::Classic => Version::Classic,
            ContainerVersion::Offset64 => Version::Offset64,
        }
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}
