pub mod scan;
pub mod scrub;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::Config;
use crate::logging::level_from_verbosity;

pub const MAX_CHUNK_SIZE: u64 = 16 * 1024 * 1024;

#[derive(Parser, Debug)]
#[command(name = "logscrub")]
#[command(about = "Scrub known secrets out of text streams", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase diagnostic verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Silence diagnostics entirely
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Config file (default: ./.logscrub.yml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Append diagnostics to this file as well as stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Emit diagnostics as JSON lines
    #[arg(long, global = true)]
    pub structured: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Copy input to output with every secret replaced by *******
    Scrub {
        /// Input file (default: stdin)
        input: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Bytes read per write into the redacting writer (max 16 MiB)
        #[arg(
            long,
            default_value_t = 8192,
            value_parser = clap::value_parser!(u64).range(1..=MAX_CHUNK_SIZE)
        )]
        chunk_size: u64,

        #[command(flatten)]
        secrets: SecretArgs,
    },

    /// Report lines that contain a secret; exits 1 if any are found
    Scan {
        /// Files or directories to scan
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[command(flatten)]
        secrets: SecretArgs,
    },
}

/// Secrets given on the command line, on top of the config file.
#[derive(Args, Debug, Default, Clone)]
pub struct SecretArgs {
    /// Literal secret to scrub (repeatable)
    #[arg(short = 's', long = "secret")]
    pub values: Vec<String>,

    /// Environment variable holding a secret (repeatable)
    #[arg(long = "secret-env")]
    pub env: Vec<String>,

    /// File with one secret per line (repeatable)
    #[arg(long = "secrets-file")]
    pub files: Vec<PathBuf>,
}

impl Commands {
    pub fn secret_args(&self) -> &SecretArgs {
        match self {
            Commands::Scrub { secrets, .. } | Commands::Scan { secrets, .. } => secrets,
        }
    }
}

impl Cli {
    /// Fold command-line flags into the loaded config.
    pub fn apply_to(&self, config: &mut Config) {
        if self.quiet || self.verbose > 0 {
            config.log.level = level_from_verbosity(self.quiet, self.verbose);
        }
        if let Some(path) = &self.log_file {
            config.log.file = Some(path.clone());
        }
        if self.structured {
            config.log.structured = true;
        }

        let args = self.command.secret_args();
        config.secrets.values.extend(args.values.iter().cloned());
        config.secrets.env.extend(args.env.iter().cloned());
        config.secrets.files.extend(args.files.iter().cloned());
    }
}
