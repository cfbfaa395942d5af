//! Geometric compositor: places an app icon inside the drive icon's slot.
//!
//! Three steps, all in a top-left-origin pixel space:
//!
//! 1. [`perspective_warp`] pulls the top edge of the app icon inward (to 8%
//!    and 92% of its width) so it appears tilted away from the viewer.
//! 2. [`resize_for_template`] squeezes the warped icon to
//!    `template / (1.58, 1.82)`, deliberately not preserving aspect ratio.
//! 3. [`overlay_centered`] alpha-blends it over the template, centered and
//!    raised by 6.3% of the template height.

use super::error::{IconError, Result};
use super::tag::IconTag;
use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

/// Horizontal inset of the top-left corner, as a fraction of the width.
pub const TOP_LEFT_INSET: f64 = 0.08;

/// Horizontal position of the top-right corner, as a fraction of the width.
pub const TOP_RIGHT_INSET: f64 = 0.92;

/// Template width divided by this gives the overlay width.
pub const WIDTH_DIVISOR: f64 = 1.58;

/// Template height divided by this gives the overlay height.
pub const HEIGHT_DIVISOR: f64 = 1.82;

/// Upward shift of the overlay, as a fraction of the template height.
pub const VERTICAL_OFFSET_FACTOR: f64 = 0.063;

/// Composites an encoded app icon raster onto an encoded template raster.
///
/// Returns the composed raster with the template's dimensions. Either input
/// failing to decode yields [`IconError::InvalidImage`] for `tag`.
pub fn composite(tag: IconTag, source: &[u8], template: &[u8]) -> Result<RgbaImage> {
    let source = decode_raster(tag, source)?;
    let template = decode_raster(tag, template)?;
    Ok(composite_rasters(&source, &template))
}

/// Pure raster form of [`composite`].
pub fn composite_rasters(source: &RgbaImage, template: &RgbaImage) -> RgbaImage {
    let warped = perspective_warp(source);
    let resized = resize_for_template(&warped, template.width(), template.height());
    overlay_centered(template, &resized)
}

/// Composes one tag and encodes the result as PNG.
pub fn composite_encoded(tag: IconTag, source: &[u8], template: &[u8]) -> Result<Vec<u8>> {
    let raster = composite(tag, source, template)?;
    encode_png(tag, &raster)
}

/// Decodes a PNG (or any format the `image` crate reads) into RGBA.
pub fn decode_raster(tag: IconTag, bytes: &[u8]) -> Result<RgbaImage> {
    image::load_from_memory(bytes)
        .map(|img| img.to_rgba8())
        .map_err(|e| IconError::InvalidImage {
            tag,
            reason: e.to_string(),
        })
}

/// Encodes a raster as PNG.
pub fn encode_png(tag: IconTag, raster: &RgbaImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    raster
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| IconError::InvalidImage {
            tag,
            reason: format!("encoding PNG: {e}"),
        })?;
    Ok(buffer.into_inner())
}

/// Maps the source rectangle onto a trapezoid whose top edge runs from
/// `0.08 * W` to `0.92 * W`; the bottom corners stay put.
///
/// The canvas keeps the source dimensions and uncovered pixels are fully
/// transparent. Sampling is bilinear on premultiplied alpha.
pub fn perspective_warp(source: &RgbaImage) -> RgbaImage {
    let (width, height) = source.dimensions();
    let w = width as f64;
    let h = height as f64;

    // Unit square corners in order: top-left, top-right, bottom-right, bottom-left.
    let quad = [
        (w * TOP_LEFT_INSET, 0.0),
        (w * TOP_RIGHT_INSET, 0.0),
        (w, h),
        (0.0, h),
    ];
    let to_unit = Homography::square_to_quad(quad).inverse();

    RgbaImage::from_fn(width, height, |x, y| {
        let (u, v) = to_unit.apply(x as f64 + 0.5, y as f64 + 0.5);
        if !(0.0..=1.0).contains(&u) || !(0.0..=1.0).contains(&v) {
            return Rgba([0, 0, 0, 0]);
        }
        sample_bilinear(source, u * w, v * h)
    })
}

/// Resizes to `(template_width / 1.58, template_height / 1.82)`, rounded.
pub fn resize_for_template(
    warped: &RgbaImage,
    template_width: u32,
    template_height: u32,
) -> RgbaImage {
    let width = ((template_width as f64 / WIDTH_DIVISOR).round() as u32).max(1);
    let height = ((template_height as f64 / HEIGHT_DIVISOR).round() as u32).max(1);
    imageops::resize(warped, width, height, FilterType::CatmullRom)
}

/// Top-left position of the overlay: centered on both axes, then raised by
/// `template_height * 0.063`.
pub fn overlay_origin(template: (u32, u32), overlay: (u32, u32)) -> (i64, i64) {
    let (tw, th) = (template.0 as f64, template.1 as f64);
    let (ow, oh) = (overlay.0 as f64, overlay.1 as f64);
    let x = ((tw - ow) / 2.0).round();
    let y = ((th - oh) / 2.0 - th * VERTICAL_OFFSET_FACTOR).round();
    (x as i64, y as i64)
}

/// Alpha-blends `overlay` over a copy of `template` at [`overlay_origin`].
pub fn overlay_centered(template: &RgbaImage, overlay: &RgbaImage) -> RgbaImage {
    let mut canvas = template.clone();
    let (x, y) = overlay_origin(template.dimensions(), overlay.dimensions());
    imageops::overlay(&mut canvas, overlay, x, y);
    canvas
}

/// Samples at a continuous position (pixel centers sit at `n + 0.5`).
/// Taps are clamped to the image; callers reject positions outside it.
fn sample_bilinear(image: &RgbaImage, x: f64, y: f64) -> Rgba<u8> {
    let fx = x - 0.5;
    let fy = y - 0.5;
    let x0 = fx.floor();
    let y0 = fy.floor();
    let tx = fx - x0;
    let ty = fy - y0;

    let taps = [
        (x0, y0, (1.0 - tx) * (1.0 - ty)),
        (x0 + 1.0, y0, tx * (1.0 - ty)),
        (x0, y0 + 1.0, (1.0 - tx) * ty),
        (x0 + 1.0, y0 + 1.0, tx * ty),
    ];

    let mut acc = [0.0f64; 4];
    for (px, py, weight) in taps {
        if weight == 0.0 {
            continue;
        }
        let pixel = premultiplied(image, px, py);
        for (a, p) in acc.iter_mut().zip(pixel) {
            *a += p * weight;
        }
    }

    let alpha = acc[3];
    if alpha <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let unpremultiply = |c: f64| (c / alpha * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgba([
        unpremultiply(acc[0]),
        unpremultiply(acc[1]),
        unpremultiply(acc[2]),
        (alpha * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}

fn premultiplied(image: &RgbaImage, x: f64, y: f64) -> [f64; 4] {
    let x = x.clamp(0.0, (image.width() - 1) as f64) as u32;
    let y = y.clamp(0.0, (image.height() - 1) as f64) as u32;
    let Rgba([r, g, b, a]) = *image.get_pixel(x, y);
    let alpha = a as f64 / 255.0;
    [
        r as f64 / 255.0 * alpha,
        g as f64 / 255.0 * alpha,
        b as f64 / 255.0 * alpha,
        alpha,
    ]
}

/// Projective transform as a row-major 3x3 matrix acting on `(x, y, 1)`.
#[derive(Clone, Copy, Debug)]
struct Homography([[f64; 3]; 3]);

impl Homography {
    /// Maps the unit square `(0,0) (1,0) (1,1) (0,1)` onto `quad`
    /// (Heckbert's closed form).
    fn square_to_quad(quad: [(f64, f64); 4]) -> Self {
        let [(x0, y0), (x1, y1), (x2, y2), (x3, y3)] = quad;
        let sx = x0 - x1 + x2 - x3;
        let sy = y0 - y1 + y2 - y3;

        if sx.abs() < f64::EPSILON && sy.abs() < f64::EPSILON {
            return Self([
                [x1 - x0, x2 - x1, x0],
                [y1 - y0, y2 - y1, y0],
                [0.0, 0.0, 1.0],
            ]);
        }

        let dx1 = x1 - x2;
        let dx2 = x3 - x2;
        let dy1 = y1 - y2;
        let dy2 = y3 - y2;
        let det = dx1 * dy2 - dx2 * dy1;
        let g = (sx * dy2 - dx2 * sy) / det;
        let h = (dx1 * sy - sx * dy1) / det;

        Self([
            [x1 - x0 + g * x1, x3 - x0 + h * x3, x0],
            [y1 - y0 + g * y1, y3 - y0 + h * y3, y0],
            [g, h, 1.0],
        ])
    }

    /// Inverse up to scale (adjugate), which is all a projective map needs.
    fn inverse(&self) -> Self {
        let [[a, b, c], [d, e, f], [g, h, i]] = self.0;
        Self([
            [e * i - f * h, c * h - b * i, b * f - c * e],
            [f * g - d * i, a * i - c * g, c * d - a * f],
            [d * h - e * g, b * g - a * h, a * e - b * d],
        ])
    }

    fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let m = &self.0;
        let w = m[2][0] * x + m[2][1] * y + m[2][2];
        (
            (m[0][0] * x + m[0][1] * y + m[0][2]) / w,
            (m[1][0] * x + m[1][1] * y + m[1][2]) / w,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, pixel: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(pixel))
    }

    fn png(image: &RgbaImage) -> Vec<u8> {
        encode_png(IconTag::BIGGEST, image).unwrap()
    }

    #[test]
    fn homography_maps_corners() {
        let quad = [(8.0, 0.0), (92.0, 0.0), (100.0, 100.0), (0.0, 100.0)];
        let forward = Homography::square_to_quad(quad);
        let corners = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];

        for ((u, v), (qx, qy)) in corners.into_iter().zip(quad) {
            let (x, y) = forward.apply(u, v);
            assert!((x - qx).abs() < 1e-9 && (y - qy).abs() < 1e-9);

            let (bu, bv) = forward.inverse().apply(qx, qy);
            assert!((bu - u).abs() < 1e-9 && (bv - v).abs() < 1e-9);
        }
    }

    #[test]
    fn warp_clears_top_corners_and_keeps_bottom_row() {
        let warped = perspective_warp(&solid(100, 100, [255, 0, 0, 255]));

        assert_eq!(warped.dimensions(), (100, 100));
        // Top edge is inset by 8 px on each side.
        assert_eq!(warped.get_pixel(2, 0)[3], 0);
        assert_eq!(warped.get_pixel(97, 0)[3], 0);
        assert_eq!(warped.get_pixel(50, 0)[3], 255);
        // Bottom row is still fully covered.
        assert_eq!(warped.get_pixel(0, 99)[3], 255);
        assert_eq!(warped.get_pixel(99, 99)[3], 255);
        assert_eq!(*warped.get_pixel(50, 50), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn resize_uses_fixed_divisors() {
        let resized = resize_for_template(&solid(10, 10, [0, 0, 0, 255]), 512, 512);
        assert_eq!(resized.dimensions(), (324, 281));

        let tiny = resize_for_template(&solid(10, 10, [0, 0, 0, 255]), 1, 1);
        assert_eq!(tiny.dimensions(), (1, 1));
    }

    #[test]
    fn overlay_origin_raises_by_template_fraction() {
        assert_eq!(overlay_origin((1000, 1000), (0, 0)), (500, 437));
        assert_eq!(overlay_origin((512, 512), (324, 281)), (94, 83));
    }

    #[test]
    fn single_pixel_overlay_lands_above_center() {
        let size = 1001;
        let template = solid(size, size, [0, 0, 0, 0]);
        let overlay = solid(1, 1, [255, 255, 255, 255]);

        let out = overlay_centered(&template, &overlay);

        let (mut sum_x, mut sum_y, mut total) = (0.0, 0.0, 0.0);
        for (x, y, pixel) in out.enumerate_pixels() {
            let a = pixel[3] as f64;
            sum_x += (x as f64 + 0.5) * a;
            sum_y += (y as f64 + 0.5) * a;
            total += a;
        }
        let (cx, cy) = (sum_x / total, sum_y / total);
        let h = size as f64;

        assert!((cx - h / 2.0).abs() <= 0.5, "cx = {cx}");
        assert!((cy - (h / 2.0 - VERTICAL_OFFSET_FACTOR * h)).abs() <= 0.5, "cy = {cy}");
    }

    #[test]
    fn composite_keeps_template_dimensions_and_background() {
        let template = solid(128, 96, [10, 20, 30, 255]);
        let source = solid(64, 64, [200, 100, 0, 255]);

        let out = composite_rasters(&source, &template);

        assert_eq!(out.dimensions(), (128, 96));
        assert_eq!(*out.get_pixel(0, 0), Rgba([10, 20, 30, 255]));
        // Just above the template center lies inside the overlay.
        assert_eq!(*out.get_pixel(64, 42), Rgba([200, 100, 0, 255]));
    }

    #[test]
    fn composite_is_deterministic() {
        let template = png(&solid(64, 64, [0, 0, 255, 128]));
        let source = png(&RgbaImage::from_fn(32, 32, |x, y| {
            Rgba([(x * 8) as u8, (y * 8) as u8, 77, 255])
        }));

        let first = composite_encoded(IconTag::BIGGEST, &source, &template).unwrap();
        let second = composite_encoded(IconTag::BIGGEST, &source, &template).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn undecodable_input_is_invalid_image() {
        let template = png(&solid(16, 16, [0, 0, 0, 255]));
        let tag: IconTag = "ic07".parse().unwrap();

        let err = composite(tag, b"not a png", &template).unwrap_err();
        assert!(matches!(err, IconError::InvalidImage { tag: t, .. } if t == tag));

        let err = composite(tag, &template, b"").unwrap_err();
        assert!(matches!(err, IconError::InvalidImage { .. }));
    }
}
