use crate::error::HashError;
use image::{DynamicImage, GrayImage};

/// Single-channel 8-bit frame handed to the fingerprint computer.
#[derive(Debug, Clone)]
pub struct Raster {
    pixels: GrayImage,
}

impl Raster {
    pub fn new(pixels: GrayImage) -> Result<Self, HashError> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(HashError::EmptyRaster);
        }
        Ok(Self { pixels })
    }

    /// Build a raster from row-major samples.
    pub fn from_samples(width: u32, height: u32, samples: Vec<u8>) -> Result<Self, HashError> {
        let len = samples.len();
        let pixels = GrayImage::from_raw(width, height, samples).ok_or(HashError::BufferSize {
            width,
            height,
            len,
        })?;
        Self::new(pixels)
    }

    /// Convert any decoded image to luma.
    pub fn from_image(image: DynamicImage) -> Result<Self, HashError> {
        Self::new(image.into_luma8())
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn sample(&self, x: u32, y: u32) -> u8 {
        self.pixels.get_pixel(x, y)[0]
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_samples_row_major() {
        let raster = Raster::from_samples(3, 2, vec![0, 1, 2, 10, 11, 12]).unwrap();
        assert_eq!(raster.width(), 3);
        assert_eq!(raster.height(), 2);
        assert_eq!(raster.sample(2, 0), 2);
        assert_eq!(raster.sample(0, 1), 10);
    }

    #[test]
    fn test_rejects_bad_buffers() {
        assert_eq!(
            Raster::from_samples(0, 4, Vec::new()).unwrap_err(),
            HashError::EmptyRaster
        );
        assert!(matches!(
            Raster::from_samples(4, 4, vec![0; 3]),
            Err(HashError::BufferSize { len: 3, .. })
        ));
    }

    #[test]
    fn test_from_rgb_image_is_grayscale() {
        let rgb = image::RgbImage::from_pixel(4, 4, image::Rgb([200, 200, 200]));
        let raster = Raster::from_image(DynamicImage::ImageRgb8(rgb)).unwrap();
        assert_eq!(raster.sample(1, 1), 200);
    }
}
