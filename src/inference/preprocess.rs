//! Image preprocessing
//!
//! Converts an arbitrary decoded image into the fixed tensor the model
//! expects: resize to a square (aspect-ratio distortion, no cropping),
//! RGB conversion, scale to [0, 1], then per-channel ImageNet
//! normalization in CHW layout.

use burn::tensor::{backend::Backend, Tensor};
use image::{imageops::FilterType, DynamicImage};

/// ImageNet normalization mean values (RGB)
pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
/// ImageNet normalization std values (RGB)
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Resize an image to the target dimensions, distorting aspect ratio if needed
pub fn resize_image(image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    image.resize_exact(width, height, FilterType::Triangle)
}

/// Normalize an image to a flat vector with ImageNet normalization.
/// Forces RGB conversion (drops alpha, widens grayscale).
/// Returns CHW layout: [C, H, W] flattened
pub fn normalize_image(image: &DynamicImage) -> Vec<f32> {
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();
    let num_pixels = (width * height) as usize;

    // Pre-allocate for CHW layout
    let mut normalized = vec![0.0f32; 3 * num_pixels];

    for (i, pixel) in rgb.pixels().enumerate() {
        let r = (pixel[0] as f32 / 255.0 - IMAGENET_MEAN[0]) / IMAGENET_STD[0];
        let g = (pixel[1] as f32 / 255.0 - IMAGENET_MEAN[1]) / IMAGENET_STD[1];
        let b = (pixel[2] as f32 / 255.0 - IMAGENET_MEAN[2]) / IMAGENET_STD[2];

        // CHW layout: all R values, then all G values, then all B values
        normalized[i] = r;
        normalized[num_pixels + i] = g;
        normalized[2 * num_pixels + i] = b;
    }

    normalized
}

/// Preprocess an image into a batched model input tensor [1, 3, size, size]
pub fn to_model_input<B: Backend>(
    image: &DynamicImage,
    size: usize,
    device: &B::Device,
) -> Tensor<B, 4> {
    let resized = resize_image(image, size as u32, size as u32);
    let data = normalize_image(&resized);

    Tensor::<B, 1>::from_floats(data.as_slice(), device).reshape([1, 3, size, size])
}
