use image::{Rgba, RgbaImage};
use theme_audit_lib::page::Rect;
use theme_audit_lib::screenshot::pixel::{decode_png, diff_images, diff_regions, encode_png};

const BACKGROUND: Rgba<u8> = Rgba([250, 250, 250, 255]);
const BRAND: Rgba<u8> = Rgba([22, 163, 74, 255]);

/// A 60x40 page with a 20x10 brand-colored bar at (`left`, `top`).
fn page_with_bar(left: u32, top: u32) -> RgbaImage {
    RgbaImage::from_fn(60, 40, |x, y| {
        let inside = (left..left + 20).contains(&x) && (top..top + 10).contains(&y);
        if inside {
            BRAND
        } else {
            BACKGROUND
        }
    })
}

#[test]
fn shifted_regions_compare_equal_once_cropped() {
    let reference = page_with_bar(0, 0);
    let target = page_with_bar(12, 7);

    let whole = diff_images(&reference, &target);
    assert!(whole.diff_pixels > 0);

    let (diff, ref_crop, target_crop) = diff_regions(
        &reference,
        &target,
        &Rect::new(0.0, 0.0, 20.0, 10.0),
        &Rect::new(12.0, 7.0, 20.0, 10.0),
    )
    .expect("non-empty region");
    assert_eq!(diff.size(), "20x10");
    assert_eq!(diff.diff_pixels, 0);
    assert_eq!(diff.diff_percent, 0.0);
    assert_eq!(ref_crop, target_crop);
}

#[test]
fn narrower_target_region_is_compared_over_the_common_width() {
    let reference = page_with_bar(0, 0);
    let target = page_with_bar(0, 0);

    let (diff, _, _) = diff_regions(
        &reference,
        &target,
        &Rect::new(0.0, 0.0, 30.0, 10.0),
        &Rect::new(0.0, 0.0, 24.6, 10.0),
    )
    .expect("non-empty region");
    assert_eq!((diff.width, diff.height), (25, 10));
    assert_eq!(diff.total_pixels, 250);
    assert_eq!(diff.diff_pixels, 0);
}

#[test]
fn recolored_bar_reports_its_share_of_the_page() {
    let reference = page_with_bar(0, 0);
    let mut target = page_with_bar(0, 0);
    for y in 0..10 {
        for x in 0..20 {
            target.put_pixel(x, y, Rgba([37, 99, 235, 255]));
        }
    }

    let bytes = encode_png(&target).expect("encode");
    let decoded = decode_png(&bytes).expect("decode");
    let diff = diff_images(&reference, &decoded);

    assert_eq!(diff.diff_pixels, 200);
    assert_eq!(diff.total_pixels, 2400);
    assert_eq!(diff.diff_percent, 8.33);
    assert_eq!(*diff.image.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
    assert_eq!(*diff.image.get_pixel(59, 39), Rgba([75, 75, 75, 255]));
}
