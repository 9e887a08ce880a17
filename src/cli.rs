use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "dost")]
#[command(version)]
#[command(about = "Drive a dynamic order-statistics tree from a line-oriented command script", long_about = None)]
pub struct Cli {
    /// Command script to read (default: stdin)
    #[arg(long, short, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    pub loglevel: String,

    /// Validate the whole tree after every mutating command
    #[arg(long)]
    pub check_invariants: bool,
}
