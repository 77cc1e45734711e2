//! Which scripts remove which product.

use std::fmt;

use offscrub_detect::ProductId;
use serde::Serialize;

const MSI_ARGS: &str = "All /DELETEUSERSETTINGS /FORCE /NOCANCEL /OSE";
const MSI_FULL_ARGS: &str =
    "All /DELETEUSERSETTINGS /FORCE /NOCANCEL /NOREBOOT /OSE /REMOVELYNC /REMOVEOSPP";
const C2R_ARGS: &str = "ALL /NOCANCEL /OSE";

/// One script invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScriptStep {
    pub script: &'static str,
    pub args: &'static str,
    pub title: &'static str,
}

impl ScriptStep {
    const fn new(script: &'static str, args: &'static str, title: &'static str) -> Self {
        Self {
            script,
            args,
            title,
        }
    }

    pub fn arguments(&self) -> Vec<&'static str> {
        self.args.split_whitespace().collect()
    }
}

impl fmt::Display for ScriptStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.script, self.args)
    }
}

const OFFICE_2003: ScriptStep = ScriptStep::new(
    "OffScrub03.vbs",
    MSI_ARGS,
    "Running Microsoft Office 2003 MSI Uninstall Script",
);
const OFFICE_2007: ScriptStep = ScriptStep::new(
    "OffScrub07.vbs",
    MSI_ARGS,
    "Running Microsoft Office 2007 MSI Uninstall Script",
);
const OFFICE_2010: ScriptStep = ScriptStep::new(
    "OffScrub10.vbs",
    MSI_ARGS,
    "Running Microsoft Office 2010 MSI Uninstall Script",
);
const OFFICE_2013_MSI: ScriptStep = ScriptStep::new(
    "OffScrub15msi.vbs",
    MSI_FULL_ARGS,
    "Running Microsoft Office 2013 MSI Uninstall Script",
);
const OFFICE_2013_C2R: ScriptStep = ScriptStep::new(
    "OffScrubC2R.vbs",
    C2R_ARGS,
    "Running Microsoft Office 2013 Click To Run Uninstall Script",
);
const OFFICE_2016_MSI: ScriptStep = ScriptStep::new(
    "OffScrub16msi.vbs",
    MSI_FULL_ARGS,
    "Running Microsoft Office 2016 MSI Uninstall Script",
);
const OFFICE_2016_C2R: ScriptStep = ScriptStep::new(
    "OffScrubC2R.vbs",
    C2R_ARGS,
    "Running Microsoft Office 2016-2021 Click To Run Uninstall Script",
);

/// Ordered scripts for one product. Steps run in sequence and a failing
/// step never stops the ones after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptPlan {
    pub product: ProductId,
    pub steps: Vec<ScriptStep>,
}

impl ScriptPlan {
    pub fn for_product(product: ProductId) -> Self {
        let steps = match product.generation() {
            11 => vec![OFFICE_2003],
            12 => vec![OFFICE_2007],
            14 => vec![OFFICE_2010],
            15 => vec![OFFICE_2013_MSI, OFFICE_2013_C2R],
            _ => vec![OFFICE_2016_MSI, OFFICE_2016_C2R],
        };
        Self { product, steps }
    }
}
