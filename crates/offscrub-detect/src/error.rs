use thiserror::Error;

pub type Result<T> = std::result::Result<T, DetectionFault>;

#[derive(Debug, Error)]
pub enum DetectionFault {
    /// No checked location reported a known Office product.
    #[error("unsupported Microsoft Office edition")]
    UnsupportedProduct,

    #[error("unsupported Microsoft Office architecture")]
    UnsupportedArchitecture,

    #[error("failed to get Microsoft Office installation path")]
    InstallPathNotFound,

    #[error("licensing service returned no version: {query}")]
    LicensingServiceUnavailable { query: &'static str },

    #[error(transparent)]
    Platform(#[from] offscrub_platform::Error),
}

impl DetectionFault {
    /// Faults raised because nothing matched, as opposed to probe failures.
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedProduct | Self::UnsupportedArchitecture | Self::InstallPathNotFound
        )
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognized Office product: {0}")]
pub struct UnknownProduct(pub String);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognized architecture label: {0}")]
pub struct UnknownArchitecture(pub String);
