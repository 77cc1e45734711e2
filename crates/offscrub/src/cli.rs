use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use offscrub_detect::ProductId;

use crate::config::Overrides;

#[derive(Debug, Parser)]
#[command(name = "offscrub", version = env!("CARGO_PKG_VERSION"), about, long_about = None, propagate_version = true)]
pub struct App {
    #[command(subcommand)]
    pub cmd: Commands,

    /// Configuration file. Defaults to `offscrub.toml` in the working directory.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Answer detection from a TOML host snapshot instead of the live system.
    #[arg(long, global = true, value_name = "FILE")]
    pub snapshot: Option<PathBuf>,

    /// Script bundle (zip or tar.gz).
    #[arg(long, global = true, value_name = "FILE")]
    pub bundle: Option<PathBuf>,

    /// Script host used to run the removal scripts.
    #[arg(long, global = true)]
    pub interpreter: Option<String>,

    /// Base log level (error, warn, info, debug, trace).
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Raise log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Report the operating system and installed Office product.
    #[command(alias = "d")]
    Detect(DetectArgs),
    /// Show the scripts a removal would run.
    #[command(alias = "p")]
    Plan(ProductArgs),
    /// Remove the installed or named Office product.
    #[command(alias = "rm")]
    Uninstall(ProductArgs),
}

#[derive(Debug, Args)]
pub struct DetectArgs {
    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ProductArgs {
    /// Product name, e.g. "Microsoft Office 2016". Detected when omitted.
    #[arg(long, short)]
    pub product: Option<ProductId>,
}

impl App {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            interpreter: self.interpreter.clone(),
            bundle: self.bundle.clone(),
            log_level: self.log_level.clone(),
        }
    }
}
