use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// User-specified command line parameters
#[derive(Debug, Parser)]
#[clap(name = "xluac", about)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Decrypts and normalises a chunk, or a whole tree of them.
    Decrypt {
        /// Input file or directory. Accepts `.luac` and `.lua.bytes`.
        input: PathBuf,

        /// Output file or directory. Directory mode mirrors the input tree.
        output: PathBuf,

        #[clap(long, default_value = "tmp")]
        /// Where the original bytes of a failed input are copied for analysis.
        scratch_dir: PathBuf,
    },
}
