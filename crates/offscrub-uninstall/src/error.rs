use std::io;
use std::path::PathBuf;

use offscrub_detect::{DetectionFault, UnknownProduct};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    UnsupportedProduct(#[from] UnknownProduct),

    #[error("script bundle: {0}")]
    Bundle(#[from] offscrub_archive::Error),

    #[error("failed to create scratch directory under {root}: {source}")]
    Scratch { root: PathBuf, source: io::Error },

    #[error(transparent)]
    Detection(#[from] DetectionFault),
}
