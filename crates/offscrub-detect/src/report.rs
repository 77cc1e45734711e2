use offscrub_platform::Platform;
use serde::Serialize;
use tracing::info;

use crate::arch::ArchitectureTag;
use crate::office::{InstallMechanism, InstallationRecord};
use crate::os::OsInfo;
use crate::{Detector, Result};

/// Everything one detection pass learned about the machine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionReport {
    pub os: OsInfo,
    pub os_architecture: ArchitectureTag,
    pub office: Option<OfficeReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfficeReport {
    #[serde(flatten)]
    pub installation: InstallationRecord,
    pub generation: u8,
    pub mechanism: InstallMechanism,
    pub is_supported: bool,
    pub uses_system_licensing_service: bool,
}

impl<P: Platform + ?Sized> Detector<'_, P> {
    /// Resolve OS facts and, when present, the Office installation. When no
    /// product, architecture or install path can be resolved the report keeps
    /// the OS facts and carries `office: None`. Probe failures still abort.
    pub fn detect(&self) -> Result<DetectionReport> {
        let os = self.os_info()?;
        let os_architecture = self.os_architecture();

        let office = match self.installation() {
            Ok(installation) => {
                let product = installation.product;
                Some(OfficeReport {
                    generation: product.generation(),
                    mechanism: product.mechanism(),
                    is_supported: (14..=16).contains(&product.generation()),
                    uses_system_licensing_service: product.generation() >= 15
                        && os.windows_number >= 6.2,
                    installation,
                })
            }
            Err(fault) if fault.is_unsupported() => {
                info!(%fault, "no removable Office installation");
                None
            }
            Err(fault) => return Err(fault),
        };

        Ok(DetectionReport {
            os,
            os_architecture,
            office,
        })
    }
}
