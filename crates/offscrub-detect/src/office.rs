//! Office product identity, generation and install path.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use offscrub_platform::{Hive, Platform, View};
use serde::{Serialize, Serializer};
use tracing::{debug, info};

use crate::arch::ArchitectureTag;
use crate::candidate::{Candidate, Probe, first_match};
use crate::{DetectionFault, Detector, Result, UnknownProduct, keys};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum InstallMechanism {
    /// Per-machine MSI install.
    Traditional,
    /// Click-to-Run streamed install.
    Virtualized,
}

impl InstallMechanism {
    pub fn is_virtualized(self) -> bool {
        self == Self::Virtualized
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductId {
    Office2003,
    Office2007,
    Office2010,
    Office2013,
    OfficeC2R2013,
    OfficeC2R2016,
    Office2016,
    Office2019,
    Office2021,
}

impl ProductId {
    pub const ALL: [Self; 9] = [
        Self::Office2003,
        Self::Office2007,
        Self::Office2010,
        Self::Office2013,
        Self::OfficeC2R2013,
        Self::OfficeC2R2016,
        Self::Office2016,
        Self::Office2019,
        Self::Office2021,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Office2003 => "Microsoft Office 2003",
            Self::Office2007 => "Microsoft Office 2007",
            Self::Office2010 => "Microsoft Office 2010",
            Self::Office2013 => "Microsoft Office 2013",
            Self::OfficeC2R2013 => "Microsoft Office 2013 C2R",
            Self::OfficeC2R2016 => "Microsoft Office 2016 C2R",
            Self::Office2016 => "Microsoft Office 2016",
            Self::Office2019 => "Microsoft Office 2019",
            Self::Office2021 => "Microsoft Office 2021",
        }
    }

    pub fn generation(self) -> u8 {
        match self {
            Self::Office2003 => 11,
            Self::Office2007 => 12,
            Self::Office2010 => 14,
            Self::Office2013 | Self::OfficeC2R2013 => 15,
            Self::OfficeC2R2016 | Self::Office2016 | Self::Office2019 | Self::Office2021 => 16,
        }
    }

    pub fn mechanism(self) -> InstallMechanism {
        match self {
            Self::OfficeC2R2013 | Self::OfficeC2R2016 | Self::Office2019 | Self::Office2021 => {
                InstallMechanism::Virtualized
            }
            _ => InstallMechanism::Traditional,
        }
    }

    /// Product of a traditional install reporting the given generation.
    pub fn traditional(generation: u8) -> Option<Self> {
        match generation {
            11 => Some(Self::Office2003),
            12 => Some(Self::Office2007),
            14 => Some(Self::Office2010),
            15 => Some(Self::Office2013),
            16 => Some(Self::Office2016),
            _ => None,
        }
    }

    /// Map the Click-to-Run `ProductReleaseIds` list to a release.
    pub fn from_release_ids(ids: &str) -> Self {
        if ids.contains("2021") {
            Self::Office2021
        } else if ids.contains("2019") {
            Self::Office2019
        } else {
            Self::OfficeC2R2016
        }
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProductId {
    type Err = UnknownProduct;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownProduct(s.to_string()))
    }
}

impl Serialize for ProductId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// A located Office installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallationRecord {
    pub product: ProductId,
    pub install_path: PathBuf,
    pub architecture: ArchitectureTag,
}

#[derive(Debug, Clone, Copy)]
enum ReleaseNode {
    ReleaseIds,
    Culture,
}

impl<P: Platform + ?Sized> Detector<'_, P> {
    /// Click-to-Run is in use when one of its services is registered and a
    /// package id is recorded.
    pub fn is_office_virtualized(&self) -> Result<bool> {
        let mut registered = false;
        for service in keys::CLICK_TO_RUN_SERVICES {
            if self.platform.is_service_registered(service)? {
                registered = true;
                break;
            }
        }
        if !registered {
            debug!("no Click-to-Run service registered");
            return Ok(false);
        }

        let candidates = [
            Candidate::new(Probe::new(View::Registry64, keys::CLICK_TO_RUN, "PackageGUID"), ()),
            Candidate::new(Probe::new(View::Registry32, keys::CLICK_TO_RUN, "PackageGUID"), ()),
            Candidate::new(Probe::new(View::Registry64, keys::CLICK_TO_RUN_15, "PackageGUID"), ()),
            Candidate::new(Probe::new(View::Registry32, keys::CLICK_TO_RUN_15, "PackageGUID"), ()),
        ];
        let found = first_match(self.platform, &candidates, |_, _| Some(()))?;
        Ok(found.is_some())
    }

    pub fn office_name(&self) -> Result<ProductId> {
        let virtualized = self.is_office_virtualized()?;
        let product = if virtualized {
            self.virtualized_name()?
        } else {
            self.traditional_name()?
        };
        let product = product.ok_or(DetectionFault::UnsupportedProduct)?;
        debug!(%product, virtualized, "resolved Office product");
        Ok(product)
    }

    fn traditional_name(&self) -> Result<Option<ProductId>> {
        let candidates: Vec<_> = keys::TRADITIONAL_GENERATIONS
            .into_iter()
            .filter_map(|generation| Some((generation, ProductId::traditional(generation)?)))
            .flat_map(|(generation, product)| {
                let root = keys::install_root(generation);
                [
                    Candidate::new(Probe::new(View::Registry64, root.clone(), "Path"), product),
                    Candidate::new(Probe::new(View::Registry32, root, "Path"), product),
                ]
            })
            .collect();
        first_match(self.platform, &candidates, |product, _| Some(*product))
    }

    fn virtualized_name(&self) -> Result<Option<ProductId>> {
        let candidates: Vec<_> = [View::Registry64, View::Registry32]
            .into_iter()
            .flat_map(|view| {
                [
                    Candidate::new(
                        Probe::new(view, keys::CLICK_TO_RUN_CONFIGURATION, "ProductReleaseIds"),
                        ReleaseNode::ReleaseIds,
                    ),
                    Candidate::new(
                        Probe::new(view, keys::CLICK_TO_RUN_15_CULTURE, "x-none"),
                        ReleaseNode::Culture,
                    ),
                ]
            })
            .collect();
        first_match(self.platform, &candidates, |node, value| match node {
            ReleaseNode::ReleaseIds => Some(ProductId::from_release_ids(value)),
            ReleaseNode::Culture => Some(ProductId::OfficeC2R2013),
        })
    }

    pub fn office_number(&self) -> Result<u8> {
        Ok(self.office_name()?.generation())
    }

    pub fn installation_path(&self) -> Result<PathBuf> {
        let product = self.office_name()?;
        self.installation_path_for(product)
    }

    fn installation_path_for(&self, product: ProductId) -> Result<PathBuf> {
        match product.mechanism() {
            InstallMechanism::Traditional => {
                let view = match self.office_architecture_for(product)? {
                    ArchitectureTag::Native32 | ArchitectureTag::Native64 => View::Registry64,
                    ArchitectureTag::EmulatedWOW64 => View::Registry32,
                    _ => return Err(DetectionFault::InstallPathNotFound),
                };
                let probe = Probe::new(view, keys::install_root(product.generation()), "Path");
                if let Some(path) = probe.read(self.platform)? {
                    return Ok(PathBuf::from(path));
                }
            }
            InstallMechanism::Virtualized => {
                let candidates = [
                    Candidate::new(Probe::new(View::Registry64, keys::CLICK_TO_RUN, "InstallPath"), ()),
                    Candidate::new(Probe::new(View::Registry32, keys::CLICK_TO_RUN, "InstallPath"), ()),
                ];
                if let Some(root) = first_match(self.platform, &candidates, |_, v| Some(v.to_string()))? {
                    return Ok(PathBuf::from(format!(r"{}\Office16\", root.trim_end_matches('\\'))));
                }

                if self
                    .platform
                    .key_exists(Hive::LocalMachine, View::Registry64, keys::CLICK_TO_RUN_15)?
                {
                    let program_files = match self.office_architecture_for(product)? {
                        ArchitectureTag::Native32 | ArchitectureTag::Native64 => "Program Files",
                        ArchitectureTag::EmulatedWOW64 => "Program Files (x86)",
                        _ => return Err(DetectionFault::InstallPathNotFound),
                    };
                    let drive = self.platform.env_var("SystemDrive").unwrap_or_default();
                    return Ok(PathBuf::from(format!(
                        r"{drive}\{program_files}\Microsoft Office\Office15\"
                    )));
                }
            }
        }
        Err(DetectionFault::InstallPathNotFound)
    }

    /// Identity, architecture and path of the installed product.
    pub fn installation(&self) -> Result<InstallationRecord> {
        let product = self.office_name()?;
        let record = InstallationRecord {
            product,
            architecture: self.office_architecture_for(product)?,
            install_path: self.installation_path_for(product)?,
        };
        info!(
            product = %record.product,
            architecture = %record.architecture,
            path = %record.install_path.display(),
            "resolved Office installation"
        );
        Ok(record)
    }

    /// Generations 14 through 16 are supported. No product reads as
    /// unsupported rather than failing.
    pub fn is_office_supported(&self) -> Result<bool> {
        match self.office_number() {
            Ok(generation) => Ok((14..=16).contains(&generation)),
            Err(DetectionFault::UnsupportedProduct) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Whether Office activates through the OS licensing service rather than
    /// its own protection service.
    pub fn uses_system_licensing_service(&self) -> Result<bool> {
        let generation = match self.office_number() {
            Ok(generation) => generation,
            Err(DetectionFault::UnsupportedProduct) => return Ok(false),
            Err(e) => return Err(e),
        };
        Ok(generation >= 15 && self.windows_number()? >= 6.2)
    }
}
