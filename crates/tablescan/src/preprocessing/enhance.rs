use super::Preprocessor;
use crate::core::config::PreprocessingConfig;
use crate::{Result, TablescanError};
use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageFormat};
use imageproc::contrast::{self, ThresholdType};
use imageproc::filter;
use std::io::Cursor;

/// Radius of the median window used for denoising (3x3).
const DENOISE_RADIUS: u32 = 1;

/// [`Preprocessor`] driven by a [`PreprocessingConfig`].
///
/// Every step after upscaling operates on luminance, so enabling any of
/// them implies grayscale. Steps run in a fixed order: contrast, denoise,
/// sharpen, binarize.
#[derive(Debug, Clone, Default)]
pub struct ImagePreprocessor {
    config: PreprocessingConfig,
}

impl ImagePreprocessor {
    pub fn new(config: PreprocessingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PreprocessingConfig {
        &self.config
    }

    fn needs_luminance(&self) -> bool {
        let config = &self.config;
        config.grayscale
            || config.contrast_stretch
            || config.equalize
            || config.denoise
            || config.sharpen
            || config.binarize
    }

    /// Apply the configured steps to a decoded image.
    pub fn enhance(&self, image: DynamicImage) -> DynamicImage {
        let image = upscale(image, self.config.min_width, self.config.target_width);

        if !self.needs_luminance() {
            return image;
        }

        let mut gray = image.to_luma8();
        if self.config.contrast_stretch {
            gray = stretch_contrast(&gray);
        }
        if self.config.equalize {
            gray = contrast::equalize_histogram(&gray);
        }
        if self.config.denoise {
            gray = filter::median_filter(&gray, DENOISE_RADIUS, DENOISE_RADIUS);
        }
        if self.config.sharpen {
            gray = filter::sharpen3x3(&gray);
        }
        if self.config.binarize {
            gray = binarize(&gray);
        }

        DynamicImage::ImageLuma8(gray)
    }
}

impl Preprocessor for ImagePreprocessor {
    fn preprocess(&self, image_bytes: &[u8]) -> Result<Vec<u8>> {
        let image = image::load_from_memory(image_bytes)
            .map_err(|e| TablescanError::image_processing_with_source("Failed to decode image", e))?;
        let (width, height) = (image.width(), image.height());

        let enhanced = self.enhance(image);
        tracing::debug!(
            width,
            height,
            out_width = enhanced.width(),
            out_height = enhanced.height(),
            "Preprocessed image"
        );

        let mut buffer = Vec::new();
        enhanced.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;
        Ok(buffer)
    }
}

/// Upscale images narrower than `min_width` to `target_width`, keeping aspect ratio.
fn upscale(image: DynamicImage, min_width: u32, target_width: u32) -> DynamicImage {
    let (width, height) = (image.width(), image.height());
    if width == 0 || width >= min_width || target_width <= width {
        return image;
    }

    let scale = f64::from(target_width) / f64::from(width);
    let new_height = ((f64::from(height) * scale).round() as u32).max(1);
    image.resize_exact(target_width, new_height, FilterType::CatmullRom)
}

/// Map the darkest pixel to 0 and the brightest to 255. Flat images are returned as is.
fn stretch_contrast(gray: &GrayImage) -> GrayImage {
    let (min, max) = gray
        .pixels()
        .fold((u8::MAX, u8::MIN), |(lo, hi), pixel| (lo.min(pixel[0]), hi.max(pixel[0])));

    if max <= min {
        return gray.clone();
    }
    contrast::stretch_contrast(gray, min, max, u8::MIN, u8::MAX)
}

/// Otsu binarization: pixels above the level become white, the rest black.
fn binarize(gray: &GrayImage) -> GrayImage {
    let level = contrast::otsu_level(gray);
    tracing::trace!(level, "Binarizing with Otsu level");
    contrast::threshold(gray, level, ThresholdType::Binary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage};

    fn encode_png(image: DynamicImage) -> Vec<u8> {
        let mut buffer = Vec::new();
        image.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png).unwrap();
        buffer
    }

    #[test]
    fn test_upscale_narrow_image() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(500, 200));
        let upscaled = upscale(image, 1000, 1500);
        assert_eq!((upscaled.width(), upscaled.height()), (1500, 600));
    }

    #[test]
    fn test_wide_image_untouched() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(1200, 300));
        let same = upscale(image, 1000, 1500);
        assert_eq!((same.width(), same.height()), (1200, 300));
    }

    fn only(step: impl FnOnce(&mut PreprocessingConfig)) -> ImagePreprocessor {
        let mut config = PreprocessingConfig {
            min_width: 0,
            grayscale: false,
            contrast_stretch: false,
            equalize: false,
            denoise: false,
            sharpen: false,
            binarize: false,
            ..Default::default()
        };
        step(&mut config);
        ImagePreprocessor::new(config)
    }

    fn enhance_gray(preprocessor: &ImagePreprocessor, gray: GrayImage) -> GrayImage {
        preprocessor.enhance(DynamicImage::ImageLuma8(gray)).to_luma8()
    }

    #[test]
    fn test_stretch_contrast() {
        let gray = GrayImage::from_raw(3, 1, vec![100, 150, 200]).unwrap();
        let stretched = stretch_contrast(&gray).into_raw();
        assert_eq!(stretched[0], 0);
        assert!((127..=128).contains(&stretched[1]));
        assert_eq!(stretched[2], 255);
    }

    #[test]
    fn test_stretch_contrast_flat_image() {
        let gray = GrayImage::from_pixel(2, 2, Luma([90]));
        assert!(stretch_contrast(&gray).pixels().all(|p| p[0] == 90));
    }

    #[test]
    fn test_equalize_spreads_narrow_histogram() {
        let mut pixels = vec![100u8; 8];
        pixels.extend(vec![110u8; 8]);
        let gray = GrayImage::from_raw(4, 4, pixels).unwrap();

        let equalized = enhance_gray(&only(|c| c.equalize = true), gray);
        let low = equalized.get_pixel(0, 0)[0];
        let high = equalized.get_pixel(3, 3)[0];
        assert_eq!(high, 255);
        assert!(high - low > 10, "expected wider spread, got {low}..{high}");
    }

    #[test]
    fn test_denoise_removes_speck() {
        let mut gray = GrayImage::from_pixel(5, 5, Luma([0]));
        gray.put_pixel(2, 2, Luma([255]));

        let denoised = enhance_gray(&only(|c| c.denoise = true), gray);
        assert!(denoised.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_sharpen_deepens_edge() {
        let gray = GrayImage::from_fn(3, 3, |x, _| if x == 2 { Luma([200]) } else { Luma([100]) });

        let sharpened = enhance_gray(&only(|c| c.sharpen = true), gray);
        assert!(sharpened.get_pixel(1, 1)[0] < 100);
        assert_eq!(sharpened.get_pixel(2, 1)[0], 255);
    }

    #[test]
    fn test_otsu_splits_bimodal_image() {
        let mut pixels = vec![30u8; 50];
        pixels.extend(vec![220u8; 50]);
        let gray = GrayImage::from_raw(10, 10, pixels).unwrap();

        let binary = enhance_gray(&only(|c| c.binarize = true), gray);
        assert_eq!(binary.get_pixel(0, 0)[0], 0);
        assert_eq!(binary.get_pixel(9, 9)[0], 255);
        assert!(binary.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }

    #[test]
    fn test_preprocess_outputs_binary_png() {
        let mut rgb = RgbImage::from_pixel(100, 40, Rgb([240, 240, 240]));
        for x in 10..30 {
            for y in 10..30 {
                rgb.put_pixel(x, y, Rgb([20, 20, 20]));
            }
        }
        let bytes = encode_png(DynamicImage::ImageRgb8(rgb));

        let preprocessor = ImagePreprocessor::new(PreprocessingConfig {
            min_width: 200,
            target_width: 300,
            ..Default::default()
        });
        let output = preprocessor.preprocess(&bytes).unwrap();

        let decoded = image::load_from_memory(&output).unwrap().to_luma8();
        assert_eq!(decoded.dimensions(), (300, 120));
        assert!(decoded.pixels().all(|p| p[0] == 0 || p[0] == 255));
        assert_eq!(decoded.get_pixel(60, 60)[0], 0);
        assert_eq!(decoded.get_pixel(250, 100)[0], 255);
    }

    #[test]
    fn test_all_steps_disabled_keeps_color() {
        let preprocessor = only(|_| {});
        let image = DynamicImage::ImageRgb8(RgbImage::new(1200, 10));
        assert!(matches!(preprocessor.enhance(image), DynamicImage::ImageRgb8(_)));
    }

    #[test]
    fn test_undecodable_bytes() {
        let result = ImagePreprocessor::default().preprocess(b"not an image");
        assert!(matches!(result, Err(TablescanError::ImageProcessing { .. })));
    }
}
