//! Resize and thumbnail transforms.

use image::imageops::FilterType;
use image::DynamicImage;

use crate::request::ResizeMode;

/// Resampling kernel shared by both modes so variants look alike.
pub const RESAMPLE_FILTER: FilterType = FilterType::CatmullRom;

/// Apply a resize in the given mode. A zero axis is unconstrained.
///
/// - `FitWithin` scales proportionally so the whole image fits inside the box.
/// - `CoverCrop` scales proportionally to cover the box and crops the overflow
///   around the center, giving exactly `width × height`. With an unconstrained
///   axis there is nothing to crop against and it behaves like `FitWithin`.
pub fn apply(image: &DynamicImage, width: u32, height: u32, mode: ResizeMode) -> DynamicImage {
    match mode {
        ResizeMode::CoverCrop if width > 0 && height > 0 => {
            image.resize_to_fill(width, height, RESAMPLE_FILTER)
        }
        _ => fit_within(image, width, height),
    }
}

fn fit_within(image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    let source = (image.width(), image.height());
    let target = fit_dimensions(source.0, source.1, width, height);

    if target == source {
        return image.clone();
    }
    image.resize_exact(target.0, target.1, RESAMPLE_FILTER)
}

/// Pixel count of the largest buffer `apply` allocates for this request.
///
/// For `FitWithin` that is the output itself. `CoverCrop` first scales the
/// source to cover the box and crops afterwards, so a very thin source can
/// need far more pixels than the final `width × height`.
pub fn working_pixels(src_w: u32, src_h: u32, width: u32, height: u32, mode: ResizeMode) -> u64 {
    match mode {
        ResizeMode::CoverCrop if width > 0 && height > 0 => {
            if src_w == 0 || src_h == 0 {
                return u64::from(width) * u64::from(height);
            }
            let ratio = (width as f64 / src_w as f64).max(height as f64 / src_h as f64);
            let cover = |len: u32, min: u32| ((len as f64 * ratio).ceil() as u64).max(u64::from(min));
            cover(src_w, width).saturating_mul(cover(src_h, height))
        }
        _ => {
            let (w, h) = fit_dimensions(src_w, src_h, width, height);
            u64::from(w) * u64::from(h)
        }
    }
}

/// Dimensions of `src_w × src_h` scaled proportionally into `width × height`.
///
/// A zero bound leaves that axis free; both zero keeps the source size.
/// Results are rounded to the nearest pixel and never drop below 1.
pub fn fit_dimensions(src_w: u32, src_h: u32, width: u32, height: u32) -> (u32, u32) {
    if src_w == 0 || src_h == 0 || (width == 0 && height == 0) {
        return (src_w, src_h);
    }

    let scale = |len: u32, ratio: f64| ((len as f64 * ratio).round() as u32).max(1);

    match (width, height) {
        (0, h) => (scale(src_w, h as f64 / src_h as f64), h),
        (w, 0) => (w, scale(src_h, w as f64 / src_w as f64)),
        (w, h) => {
            let ratio = (w as f64 / src_w as f64).min(h as f64 / src_h as f64);
            (scale(src_w, ratio).min(w), scale(src_h, ratio).min(h))
        }
    }
}
