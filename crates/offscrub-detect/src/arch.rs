//! OS and Office processor architecture.

use std::fmt;
use std::str::FromStr;

use offscrub_platform::{Platform, View};
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::candidate::{Candidate, Probe, first_match};
use crate::office::{InstallMechanism, ProductId};
use crate::{DetectionFault, Detector, Result, UnknownArchitecture, keys};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchitectureTag {
    Native32,
    Native64,
    /// 32-bit code on a 64-bit x64 OS.
    EmulatedWOW64,
    NativeARM64,
    /// x86 code under translation on ARM64.
    HybridARM64on32,
    /// x64 code under translation on ARM64.
    HybridARM64on64,
}

impl ArchitectureTag {
    pub const ALL: [Self; 6] = [
        Self::Native32,
        Self::Native64,
        Self::EmulatedWOW64,
        Self::NativeARM64,
        Self::HybridARM64on32,
        Self::HybridARM64on64,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Native32 => "x86",
            Self::Native64 => "x64",
            Self::EmulatedWOW64 => "x86-64",
            Self::NativeARM64 => "ARM64",
            Self::HybridARM64on32 => "x86-ARM64",
            Self::HybridARM64on64 => "x64-ARM64",
        }
    }
}

impl fmt::Display for ArchitectureTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ArchitectureTag {
    type Err = UnknownArchitecture;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tag| tag.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownArchitecture(s.to_string()))
    }
}

impl Serialize for ArchitectureTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[derive(Debug, Clone, Copy)]
enum PlatformNode {
    Current,
    Legacy15,
}

impl<P: Platform + ?Sized> Detector<'_, P> {
    fn is_arm(&self) -> bool {
        self.platform.arm_marker_present()
    }

    pub fn os_architecture(&self) -> ArchitectureTag {
        let tag = match (self.platform.is_64bit_os(), self.is_arm()) {
            (_, true) => ArchitectureTag::NativeARM64,
            (false, false) => ArchitectureTag::Native32,
            (true, false) => ArchitectureTag::Native64,
        };
        debug!(%tag, "OS architecture");
        tag
    }

    pub fn office_architecture(&self) -> Result<ArchitectureTag> {
        if !self.platform.is_64bit_os() {
            return Ok(self.office_architecture_32bit_os());
        }
        let tag = if self.is_office_virtualized()? {
            self.virtualized_architecture()?
        } else {
            self.traditional_architecture(self.office_name()?)?
        };
        debug!(?tag, "Office architecture");
        tag.ok_or(DetectionFault::UnsupportedArchitecture)
    }

    fn office_architecture_32bit_os(&self) -> ArchitectureTag {
        if self.is_arm() {
            ArchitectureTag::HybridARM64on32
        } else {
            ArchitectureTag::Native32
        }
    }

    /// Architecture of an already identified product.
    pub(crate) fn office_architecture_for(&self, product: ProductId) -> Result<ArchitectureTag> {
        if !self.platform.is_64bit_os() {
            return Ok(self.office_architecture_32bit_os());
        }

        let tag = match product.mechanism() {
            InstallMechanism::Traditional => self.traditional_architecture(product)?,
            InstallMechanism::Virtualized => self.virtualized_architecture()?,
        };
        debug!(%product, ?tag, "Office architecture");
        tag.ok_or(DetectionFault::UnsupportedArchitecture)
    }

    fn traditional_architecture(&self, product: ProductId) -> Result<Option<ArchitectureTag>> {
        let generation = product.generation();
        if matches!(generation, 11 | 12) {
            // These releases never shipped a 64-bit build.
            return Ok(Some(ArchitectureTag::EmulatedWOW64));
        }

        let root = keys::install_root(generation);
        let candidates = [
            Candidate::new(Probe::new(View::Registry32, root.clone(), "Path"), ArchitectureTag::EmulatedWOW64),
            Candidate::new(Probe::new(View::Registry64, root, "Path"), ArchitectureTag::Native64),
        ];
        first_match(self.platform, &candidates, |tag, _| Some(*tag))
    }

    fn virtualized_architecture(&self) -> Result<Option<ArchitectureTag>> {
        let arm = self.is_arm();
        let candidates = [
            Candidate::new(
                Probe::new(View::Registry32, keys::CLICK_TO_RUN_CONFIGURATION, "Platform"),
                PlatformNode::Current,
            ),
            Candidate::new(
                Probe::new(View::Registry64, keys::CLICK_TO_RUN_CONFIGURATION, "Platform"),
                PlatformNode::Current,
            ),
            Candidate::new(
                Probe::new(View::Registry32, keys::CLICK_TO_RUN_15_CONFIGURATION, "Platform"),
                PlatformNode::Legacy15,
            ),
            Candidate::new(
                Probe::new(View::Registry64, keys::CLICK_TO_RUN_15_CONFIGURATION, "Platform"),
                PlatformNode::Legacy15,
            ),
        ];

        first_match(self.platform, &candidates, |node, platform| {
            let platform = platform.trim().to_ascii_lowercase();
            match (node, platform.as_str(), arm) {
                (PlatformNode::Current, "x86", false) => Some(ArchitectureTag::EmulatedWOW64),
                (PlatformNode::Current, "x86", true) => Some(ArchitectureTag::HybridARM64on32),
                (PlatformNode::Current, "x64", false) => Some(ArchitectureTag::Native64),
                (PlatformNode::Current, "x64", true) => Some(ArchitectureTag::HybridARM64on64),
                (PlatformNode::Current, _, _) => None,
                (PlatformNode::Legacy15, "x86", _) => Some(ArchitectureTag::EmulatedWOW64),
                (PlatformNode::Legacy15, _, _) => Some(ArchitectureTag::Native64),
            }
        })
    }
}
