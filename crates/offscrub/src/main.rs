mod cli;
mod config;
mod logging;
mod report;

use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::Parser;
use offscrub_detect::{Detector, ProductId};
use offscrub_platform::{MemoryPlatform, Platform};
use offscrub_uninstall::{ScriptPlan, Uninstaller};
use tracing::debug;

use crate::cli::{App, Commands};
use crate::config::Settings;

fn main() -> Result<()> {
    let app = App::parse();

    if let Some(path) = &app.config {
        if !path.is_file() {
            bail!("configuration file {} does not exist", path.display());
        }
    }
    let settings = Settings::load(app.config.as_deref(), &app.overrides())
        .context("failed to load configuration")?;
    logging::init(&settings.log_level, app.verbose);
    debug!(?settings, "loaded settings");

    match app.cmd {
        Commands::Detect(args) => {
            let platform = platform(app.snapshot.as_deref())?;
            let report = Detector::new(&*platform)
                .detect()
                .context("detection failed")?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report::detection_table(&report));
            }
        }
        Commands::Plan(args) => {
            let product = product(args.product, app.snapshot.as_deref())?;
            println!("{}", report::plan_table(&ScriptPlan::for_product(product)));
        }
        Commands::Uninstall(args) => {
            let product = product(args.product, app.snapshot.as_deref())?;
            let mut uninstaller = Uninstaller::new(settings.bundle.clone())
                .interpreter(settings.interpreter.clone());
            if let Some(root) = &settings.scratch_root {
                uninstaller = uninstaller.scratch_root(root);
            }
            let log = uninstaller
                .run_product(product)
                .with_context(|| format!("failed to remove {product}"))?;
            println!("{log}");
        }
    }
    Ok(())
}

fn platform(snapshot: Option<&Path>) -> Result<Box<dyn Platform>> {
    match snapshot {
        Some(path) => {
            let platform = MemoryPlatform::load(path)
                .with_context(|| format!("failed to load snapshot {}", path.display()))?;
            Ok(Box::new(platform))
        }
        None => offscrub_platform::native().context("failed to open the live platform"),
    }
}

/// The named product, or the one installed on the platform.
fn product(named: Option<ProductId>, snapshot: Option<&Path>) -> Result<ProductId> {
    if let Some(product) = named {
        return Ok(product);
    }
    let platform = platform(snapshot)?;
    Detector::new(&*platform)
        .office_name()
        .context("no removable Office product detected")
}
