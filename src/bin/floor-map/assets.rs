//! Plan image decoding.

use floor_map::ApiError;
use floor_map::controller::ImageGeometry;
use thiserror::Error;

/// Errors that can occur when fetching and decoding a plan image.
#[derive(Error, Debug)]
pub enum ImageLoadError {
    #[error("failed to fetch plan: {0}")]
    Fetch(#[from] ApiError),
    #[error("failed to decode plan image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("decoder task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Decoded image data ready for texture creation.
pub struct DecodedImage {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl DecodedImage {
    pub fn geometry(&self) -> ImageGeometry {
        ImageGeometry::new(self.width, self.height)
    }
}

/// Decodes PNG/JPEG bytes into RGBA pixels.
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, ImageLoadError> {
    let img = image::load_from_memory(bytes)?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(DecodedImage {
        pixels: rgba.into_raw(),
        width,
        height,
    })
}
