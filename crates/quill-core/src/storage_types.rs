use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Remote image store backends
///
/// Defined in core because configuration selects it before any store exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageStoreBackend {
    Cloudinary,
    Local,
}

impl FromStr for ImageStoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cloudinary" => Ok(ImageStoreBackend::Cloudinary),
            "local" => Ok(ImageStoreBackend::Local),
            _ => Err(anyhow::anyhow!("Invalid image store backend: {}", s)),
        }
    }
}

impl Display for ImageStoreBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ImageStoreBackend::Cloudinary => write!(f, "cloudinary"),
            ImageStoreBackend::Local => write!(f, "local"),
        }
    }
}
