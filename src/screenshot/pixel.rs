use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};

use crate::error::Result;
use crate::page::Rect;

/// Pixels in the diff image that match are the target pixel dimmed to this factor.
const MATCH_DIM: f32 = 0.3;

/// How strongly a channel difference is amplified in the diff image.
const DIFF_GAIN: u16 = 3;

#[derive(Debug, Clone)]
pub struct PixelDiff {
    pub width: u32,
    pub height: u32,
    pub total_pixels: u64,
    pub diff_pixels: u64,
    /// Percentage of differing pixels, rounded to two decimals.
    pub diff_percent: f64,
    pub image: RgbaImage,
}

impl PixelDiff {
    pub fn size(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

pub fn decode_png(bytes: &[u8]) -> Result<RgbaImage> {
    let img = image::load_from_memory_with_format(bytes, ImageFormat::Png)?;
    Ok(img.to_rgba8())
}

pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

/// Copies a `width` x `height` window starting at the rect's top-left corner.
/// Source pixels outside the screenshot come out as transparent black.
pub fn crop(source: &RgbaImage, rect: &Rect, width: u32, height: u32) -> RgbaImage {
    let left = rect.left.round() as i64;
    let top = rect.top.round() as i64;
    RgbaImage::from_fn(width, height, |x, y| {
        let sx = left + i64::from(x);
        let sy = top + i64::from(y);
        let inside = sx >= 0
            && sy >= 0
            && sx < i64::from(source.width())
            && sy < i64::from(source.height());
        if inside {
            *source.get_pixel(sx as u32, sy as u32)
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

/// Exact per-pixel comparison of two equally sized images. Any RGB channel
/// difference counts; alpha is ignored.
pub fn diff_images(reference: &RgbaImage, target: &RgbaImage) -> PixelDiff {
    let width = reference.width().min(target.width());
    let height = reference.height().min(target.height());
    let mut diff_pixels = 0u64;
    let image = RgbaImage::from_fn(width, height, |x, y| {
        let a = reference.get_pixel(x, y);
        let d = target.get_pixel(x, y);
        let delta = (0..3)
            .map(|c| a[c].abs_diff(d[c]))
            .max()
            .unwrap_or(0);
        if delta > 0 {
            diff_pixels += 1;
            let intensity = (u16::from(delta) * DIFF_GAIN).min(255) as u8;
            Rgba([intensity, 0, 0, 255])
        } else {
            let dim = |v: u8| (f32::from(v) * MATCH_DIM).round() as u8;
            Rgba([dim(d[0]), dim(d[1]), dim(d[2]), 255])
        }
    });

    let total_pixels = u64::from(width) * u64::from(height);
    let diff_percent = if total_pixels == 0 {
        0.0
    } else {
        (diff_pixels as f64 / total_pixels as f64 * 10000.0).round() / 100.0
    };
    PixelDiff {
        width,
        height,
        total_pixels,
        diff_pixels,
        diff_percent,
        image,
    }
}

/// Crops both screenshots to their regions (the smaller of the two sizes) and
/// diffs the crops. `None` when the common area is empty.
pub fn diff_regions(
    reference: &RgbaImage,
    target: &RgbaImage,
    reference_rect: &Rect,
    target_rect: &Rect,
) -> Option<(PixelDiff, RgbaImage, RgbaImage)> {
    let width = reference_rect.width.min(target_rect.width).round();
    let height = reference_rect.height.min(target_rect.height).round();
    if width <= 0.0 || height <= 0.0 {
        return None;
    }
    let (w, h) = (width as u32, height as u32);
    let a = crop(reference, reference_rect, w, h);
    let d = crop(target, target_rect, w, h);
    let diff = diff_images(&a, &d);
    Some((diff, a, d))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(color))
    }

    #[test]
    fn single_pixel_difference_is_one_percent() {
        let mut a = solid(10, 10, [100, 100, 100, 255]);
        let mut d = a.clone();
        a.put_pixel(3, 4, Rgba([255, 0, 0, 255]));
        d.put_pixel(3, 4, Rgba([0, 0, 255, 255]));

        let diff = diff_images(&a, &d);
        assert_eq!(diff.diff_pixels, 1);
        assert_eq!(diff.total_pixels, 100);
        assert!((diff.diff_percent - 1.0).abs() < f64::EPSILON);
        assert_eq!(diff.image.get_pixel(3, 4), &Rgba([255, 0, 0, 255]));
        assert_eq!(diff.image.get_pixel(0, 0), &Rgba([30, 30, 30, 255]));
        assert_eq!(diff.size(), "10x10");
    }

    #[test]
    fn identical_images_have_no_difference() {
        let a = solid(8, 6, [12, 34, 56, 255]);
        let diff = diff_images(&a, &a.clone());
        assert_eq!(diff.diff_pixels, 0);
        assert_eq!(diff.diff_percent, 0.0);
    }

    #[test]
    fn small_deltas_are_amplified() {
        let a = solid(1, 1, [100, 100, 100, 255]);
        let d = solid(1, 1, [100, 110, 100, 255]);
        let diff = diff_images(&a, &d);
        assert_eq!(diff.image.get_pixel(0, 0), &Rgba([30, 0, 0, 255]));
    }

    #[test]
    fn crop_pads_outside_the_source_with_transparent_black() {
        let source = solid(4, 4, [200, 200, 200, 255]);
        let out = crop(&source, &Rect::new(2.0, 2.0, 4.0, 4.0), 4, 4);
        assert_eq!(out.get_pixel(1, 1), &Rgba([200, 200, 200, 255]));
        assert_eq!(out.get_pixel(2, 2), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn region_diff_uses_the_smaller_size() {
        let a = solid(20, 20, [0, 0, 0, 255]);
        let d = solid(20, 20, [0, 0, 0, 255]);
        let (diff, ca, cd) = diff_regions(
            &a,
            &d,
            &Rect::new(0.0, 0.0, 12.0, 5.0),
            &Rect::new(4.0, 4.0, 10.0, 8.0),
        )
        .expect("non-empty region");
        assert_eq!((diff.width, diff.height), (10, 5));
        assert_eq!(ca.dimensions(), cd.dimensions());
        let empty = Rect::new(0.0, 0.0, 0.0, 5.0);
        assert!(diff_regions(&a, &d, &empty, &Rect::new(0.0, 0.0, 5.0, 5.0)).is_none());
    }

    #[test]
    fn png_round_trip_keeps_dimensions() {
        let img = solid(3, 2, [1, 2, 3, 255]);
        let bytes = encode_png(&img).expect("encode");
        let back = decode_png(&bytes).expect("decode");
        assert_eq!(back.dimensions(), (3, 2));
    }
}
