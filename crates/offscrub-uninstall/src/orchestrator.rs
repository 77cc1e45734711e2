use std::path::PathBuf;

use offscrub_archive::BundleSource;
use offscrub_detect::{Detector, ProductId};
use offscrub_platform::Platform;
use tracing::{debug, info};

use crate::Result;
use crate::job::UninstallJob;
use crate::plan::ScriptPlan;
use crate::runner::{ProcessRunner, ScriptRunner};
use crate::scratch::ScratchDir;

pub const DEFAULT_INTERPRETER: &str = "cscript";

/// Extracts the script bundle into a private scratch directory and runs the
/// removal scripts for one product.
#[derive(Debug, Clone)]
pub struct Uninstaller<R = ProcessRunner> {
    bundle: BundleSource,
    interpreter: String,
    scratch_root: Option<PathBuf>,
    runner: R,
}

impl Uninstaller<ProcessRunner> {
    pub fn new(bundle: impl Into<BundleSource>) -> Self {
        Self {
            bundle: bundle.into(),
            interpreter: DEFAULT_INTERPRETER.to_string(),
            scratch_root: None,
            runner: ProcessRunner,
        }
    }

    /// Scripts that would run for `product`, without touching the disk.
    pub fn plan(product: &str) -> Result<ScriptPlan> {
        let product: ProductId = product.parse()?;
        Ok(ScriptPlan::for_product(product))
    }
}

impl<R: ScriptRunner> Uninstaller<R> {
    pub fn with_runner<T: ScriptRunner>(self, runner: T) -> Uninstaller<T> {
        Uninstaller {
            bundle: self.bundle,
            interpreter: self.interpreter,
            scratch_root: self.scratch_root,
            runner,
        }
    }

    pub fn interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    /// Parent for scratch directories. Defaults to the system temp dir.
    pub fn scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Remove the product named by `product` and return the job log.
    ///
    /// The bundle is extracted before the name is checked. The scratch
    /// directory is removed on every path out of this function.
    pub fn run(&self, product: &str) -> Result<String> {
        let scratch = self.prepare()?;
        let product: ProductId = product.parse()?;
        Ok(self.execute(scratch, product))
    }

    pub fn run_product(&self, product: ProductId) -> Result<String> {
        let scratch = self.prepare()?;
        Ok(self.execute(scratch, product))
    }

    /// Resolve the installed product on `platform` and remove it.
    pub fn run_detected<P: Platform + ?Sized>(&self, platform: &P) -> Result<String> {
        let product = Detector::new(platform).office_name()?;
        info!(%product, "detected installed product");
        self.run_product(product)
    }

    fn prepare(&self) -> Result<ScratchDir> {
        let scratch = ScratchDir::create(self.scratch_root.as_deref())?;
        let report = self.bundle.extract_to(scratch.path())?;
        debug!(
            files = report.file_count(),
            bytes = report.total_bytes,
            dest = %scratch.path().display(),
            "extracted script bundle"
        );
        Ok(scratch)
    }

    fn execute(&self, scratch: ScratchDir, product: ProductId) -> String {
        let plan = ScriptPlan::for_product(product);
        info!(%product, steps = plan.steps.len(), "starting removal");
        UninstallJob::new(scratch, plan).execute(&self.runner, &self.interpreter)
    }
}
