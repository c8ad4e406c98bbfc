use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "ledgerdrive")]
#[command(about = "Upload and manage files on a LedgerDrive backend", long_about = None)]
pub struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend URL, overriding the config file
    #[arg(long, global = true)]
    pub backend_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Upload files and directories
    Upload {
        /// Files are uploaded flat, directories recursively under their own name
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Directory to upload into
        #[arg(long)]
        parent: Option<u64>,
    },
    /// List assets
    Ls {
        #[arg(long)]
        parent: Option<u64>,
    },
    /// Create a directory
    Mkdir {
        name: String,
        #[arg(long)]
        parent: Option<u64>,
    },
    /// Delete a file, or a directory with `--dir`
    Rm {
        id: u64,
        #[arg(long)]
        dir: bool,
    },
    /// Rename a file, or a directory with `--dir`
    ///
    /// File names keep their stored extension.
    Rename {
        id: u64,
        name: String,
        #[arg(long)]
        dir: bool,
    },
    /// Show backend usage statistics
    Stats,
    /// Write the effective configuration to the config file
    InitConfig,
}
