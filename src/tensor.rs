//! Turning an uploaded image into the fixed-shape float tensor the remote
//! model expects

use crate::config::INPUT_SIDE;
use anyhow::{Context, Result};
use image::imageops::FilterType;

/// A rank-4 NHWC float tensor with shape `(1, 224, 224, 3)`, values in [0, 1],
/// stored flattened row-major
#[derive(Debug, Clone)]
pub struct ImageTensor {
    data: Vec<f32>,
}

impl ImageTensor {
    /// The fixed shape every tensor produced here carries
    pub fn shape() -> [usize; 4] {
        [1, INPUT_SIDE as usize, INPUT_SIDE as usize, 3]
    }

    /// Flattened row-major element view
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Decode an uploaded image and normalize it into an [`ImageTensor`].
///
/// Resizes to exactly 224x224 with no aspect-ratio preservation, folds the
/// pixels to RGB8 (grayscale and alpha inputs included), and scales each
/// channel linearly from [0, 255] to [0, 1].
pub fn preprocess(bytes: &[u8]) -> Result<ImageTensor> {
    let img = image::load_from_memory(bytes).context("could not decode uploaded image")?;
    let rgb = img
        .resize_exact(INPUT_SIDE, INPUT_SIDE, FilterType::Triangle)
        .to_rgb8();

    let data = rgb.as_raw().iter().map(|&v| v as f32 / 255.0).collect();
    Ok(ImageTensor { data })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn encode_png(img: DynamicImage) -> Vec<u8> {
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageOutputFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn test_tensor_shape_and_range() {
        let mut img = RgbImage::new(64, 48);
        for (x, y, px) in img.enumerate_pixels_mut() {
            *px = Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8]);
        }
        let bytes = encode_png(DynamicImage::ImageRgb8(img));

        let tensor = preprocess(&bytes).unwrap();
        assert_eq!(tensor.len(), ImageTensor::shape().iter().product::<usize>());
        assert_eq!(tensor.len(), 1 * 224 * 224 * 3);
        assert!(tensor.data().iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_solid_gray_normalizes_exactly() {
        let img = RgbImage::from_pixel(100, 100, Rgb([128, 128, 128]));
        let bytes = encode_png(DynamicImage::ImageRgb8(img));

        let tensor = preprocess(&bytes).unwrap();
        assert!(tensor.data().iter().all(|&v| v == 128.0 / 255.0));
    }

    #[test]
    fn test_grayscale_input_still_yields_three_channels() {
        let img = image::GrayImage::from_pixel(50, 50, image::Luma([200]));
        let bytes = encode_png(DynamicImage::ImageLuma8(img));

        let tensor = preprocess(&bytes).unwrap();
        assert_eq!(tensor.len(), 1 * 224 * 224 * 3);
    }

    #[test]
    fn test_non_image_bytes_fail_to_decode() {
        assert!(preprocess(b"definitely not an image").is_err());
    }
}
