use image::{imageops::FilterType, DynamicImage, ImageReader};
use ndarray::{Array, Ix4};
use std::io::Cursor;
use thiserror::Error;

pub const DEFAULT_IMAGE_SIZE: u32 = 256;

#[derive(Error, Debug)]
pub enum PreprocessError {
    #[error("empty image payload")]
    Empty,
    #[error("failed to read image: {0}")]
    Read(#[from] std::io::Error),
    #[error("error decoding image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("invalid tensor shape: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

/// Decodes an uploaded image into a `(1, size, size, 3)` NHWC tensor of raw
/// 0..255 pixel values.
///
/// The image is converted to RGB and stretched to `size x size` without
/// preserving aspect ratio. The resized image is returned alongside the
/// tensor.
pub fn preprocess(
    image_data: &[u8],
    size: u32,
) -> Result<(Array<f32, Ix4>, DynamicImage), PreprocessError> {
    if image_data.is_empty() {
        return Err(PreprocessError::Empty);
    }

    let original_img = ImageReader::new(Cursor::new(image_data))
        .with_guessed_format()?
        .decode()?;

    let rgb = DynamicImage::ImageRgb8(original_img.to_rgb8());
    let resized = rgb.resize_exact(size, size, FilterType::CatmullRom).to_rgb8();

    let side = size as usize;
    let pixels: Vec<f32> = resized.as_raw().iter().map(|&v| f32::from(v)).collect();
    let input = Array::from_shape_vec((1, side, side, 3), pixels)?;

    Ok((input, DynamicImage::ImageRgb8(resized)))
}
