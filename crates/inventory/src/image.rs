//! Image store port: raw bytes in, opaque reference out.

use thiserror::Error;

use crate::record::ImageRef;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("invalid image file name: {0:?}")]
    InvalidName(String),

    #[error("image store unavailable: {0}")]
    Unavailable(String),
}

/// A photo attached to a registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }
}

/// Receives image bytes and returns a reference the ledger stores verbatim.
pub trait ImageStore {
    /// Store `bytes` under a reference no earlier upload holds.
    fn store(&mut self, file_name: &str, bytes: &[u8]) -> Result<ImageRef, ImageError>;

    /// Remove an image whose registration never reached the backend.
    fn discard(&mut self, image: &ImageRef) -> Result<(), ImageError>;
}

impl<S> ImageStore for Box<S>
where
    S: ImageStore + ?Sized,
{
    fn store(&mut self, file_name: &str, bytes: &[u8]) -> Result<ImageRef, ImageError> {
        (**self).store(file_name, bytes)
    }

    fn discard(&mut self, image: &ImageRef) -> Result<(), ImageError> {
        (**self).discard(image)
    }
}
