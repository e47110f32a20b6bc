//! Turns uploaded image bytes into the tensor the classifier expects.
//!
//! The image is decoded, converted to RGB, stretched to 224x224 (no crop,
//! no padding), scaled to `[0, 1]` and given a leading batch axis. Layout is
//! NHWC: `[1, height, width, channel]`.

use image::imageops::{self, FilterType};
use ndarray::Array4;

use crate::error::DecodeError;

pub const IMG_WIDTH: u32 = 224;
pub const IMG_HEIGHT: u32 = 224;
pub const CHANNELS: usize = 3;

// Bicubic, matching the resampling the training pipeline used.
const RESIZE_FILTER: FilterType = FilterType::CatmullRom;

pub fn preprocess_image(image_bytes: &[u8]) -> Result<Array4<f32>, DecodeError> {
    // 8-bit RGB first, so alpha is dropped and deep images are quantized
    // before resampling
    let rgb = image::load_from_memory(image_bytes)?.to_rgb8();
    let rgb = imageops::resize(&rgb, IMG_WIDTH, IMG_HEIGHT, RESIZE_FILTER);

    let shape = (1, IMG_HEIGHT as usize, IMG_WIDTH as usize, CHANNELS);
    let tensor = Array4::from_shape_fn(shape, |(_, y, x, c)| {
        rgb.get_pixel(x as u32, y as u32)[c] as f32 / 255.0
    });

    Ok(tensor)
}
