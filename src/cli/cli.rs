use std::path::PathBuf;

use clap::Parser;

use crate::application::data::LogLevel;

#[derive(Parser, Debug, Clone)]
#[command(version, about = "A CLI tool for running slang files")]
pub struct Cli {
    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,

    /// Directory searched for contracts in addition to the embedded ones
    #[clap(long, short)]
    pub root: Option<PathBuf>,

    /// Config file, defaults to fouter.yaml inside the root directory
    #[clap(long, short)]
    pub config: Option<PathBuf>,

    /// Extension of contract files
    #[clap(long, short)]
    pub extension: Option<String>,

    /// Command the contract content is piped to
    #[clap(long)]
    pub executor: Option<String>,

    /// Entry point inside the embedded contracts
    #[clap(long)]
    pub embedded_path: Option<String>,

    /// Print the discovered route tree and exit
    #[clap(long)]
    pub list: bool,

    /// Print the selected contract instead of running it
    #[clap(long, short)]
    pub print: bool,

    /// Route to a contract, one segment per directory, e.g. `contracts hello`
    pub route: Vec<String>,
}
