//! Pixel algebra for embedding custom art into sprite templates.
//!
//! The embed flow runs in three steps:
//! 1. 64x64 art is upscaled to 128x128 with nearest-neighbour sampling.
//! 2. The mask template is reduced to luminance and used as a per-pixel weight:
//!    `out = src * L / 255` against a fully transparent canvas.
//! 3. The weighted art is pasted onto each template, blending every channel
//!    by the art's own alpha: `out = dst * (255 - a) / 255 + src * a / 255`.
//!
//! All divisions by 255 round to nearest.

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Luma, Pixel, Rgba, RgbaImage};

/// Art with exactly this size is upscaled before compositing.
pub const SMALL_ART_SIZE: (u32, u32) = (64, 64);

/// Size small art is upscaled to.
pub const UPSCALED_ART_SIZE: (u32, u32) = (128, 128);

/// Divide by 255 with rounding, exact for `v <= 255 * 255`.
#[inline]
fn div255(v: u32) -> u8 {
    let tmp = v + 128;
    u8::try_from(((tmp >> 8) + tmp) >> 8).unwrap_or(u8::MAX)
}

/// Upscale 64x64 art to 128x128; any other size is returned unchanged.
#[must_use]
pub fn upscale_if_small(art: RgbaImage) -> RgbaImage {
    if art.dimensions() == SMALL_ART_SIZE {
        imageops::resize(
            &art,
            UPSCALED_ART_SIZE.0,
            UPSCALED_ART_SIZE.1,
            FilterType::Nearest,
        )
    } else {
        art
    }
}

/// Convert an image to single-channel luminance.
///
/// Uses the ITU-R 601-2 weights in 16-bit fixed point:
/// `L = (19595*R + 38470*G + 7471*B + 32768) >> 16`. Alpha is ignored.
#[must_use]
pub fn luminance(img: &DynamicImage) -> GrayImage {
    let rgb = img.to_rgb8();
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let px = rgb.get_pixel(x, y);
        let l = 19595 * u32::from(px[0]) + 38470 * u32::from(px[1]) + 7471 * u32::from(px[2]);
        Luma([u8::try_from((l + 32768) >> 16).unwrap_or(u8::MAX)])
    })
}

/// Weight every channel of `art` by `weights`, blending against a transparent canvas.
///
/// `weights` is resized to the art's dimensions with nearest-neighbour sampling
/// when the sizes differ. A weight of 255 keeps the art pixel, 0 yields
/// `(0, 0, 0, 0)`, and values between scale all four channels proportionally.
#[must_use]
pub fn apply_weight_mask(art: &RgbaImage, weights: &GrayImage) -> RgbaImage {
    let resized;
    let weights = if weights.dimensions() == art.dimensions() {
        weights
    } else {
        resized = imageops::resize(weights, art.width(), art.height(), FilterType::Nearest);
        &resized
    };

    let mut out = art.clone();
    for (px, w) in out.pixels_mut().zip(weights.pixels()) {
        let m = u32::from(w[0]);
        for ch in px.channels_mut() {
            *ch = div255(u32::from(*ch) * m);
        }
    }
    out
}

/// Prepare user art for pasting: coerce to RGBA, upscale if small, apply the mask.
#[must_use]
pub fn prepare_overlay(art: &DynamicImage, mask_source: &DynamicImage) -> RgbaImage {
    let art = upscale_if_small(art.to_rgba8());
    apply_weight_mask(&art, &luminance(mask_source))
}

/// Paste `overlay` onto `base` at `(x, y)`, using the overlay's alpha as the paste mask.
///
/// Each channel, alpha included, becomes `dst * (255 - a) / 255 + src * a / 255`.
/// Overlay pixels with alpha 0 leave the base untouched. The overlay is clipped
/// to the base bounds.
pub fn paste_with_alpha(base: &mut RgbaImage, overlay: &RgbaImage, x: u32, y: u32) {
    let x2 = x.saturating_add(overlay.width()).min(base.width());
    let y2 = y.saturating_add(overlay.height()).min(base.height());

    if x >= x2 || y >= y2 {
        return;
    }

    for dy in 0..(y2 - y) {
        for dx in 0..(x2 - x) {
            let src: &Rgba<u8> = overlay.get_pixel(dx, dy);
            let a = u32::from(src[3]);
            if a == 0 {
                continue;
            }

            let dst = base.get_pixel_mut(x + dx, y + dy);
            for ch in 0..4 {
                dst[ch] = div255(u32::from(dst[ch]) * (255 - a) + u32::from(src[ch]) * a);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn div255_rounds_to_nearest() {
        assert_eq!(div255(0), 0);
        assert_eq!(div255(255 * 255), 255);
        assert_eq!(div255(255 * 128), 128);
        assert_eq!(div255(127), 0);
        assert_eq!(div255(128), 1);
        for v in 0..=255 * 255 {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let expected = (f64::from(v) / 255.0).round() as u8;
            assert_eq!(div255(v), expected, "v = {v}");
        }
    }

    #[test]
    #[allow(clippy::cast_possible_truncation)]
    fn small_art_is_upscaled_by_pixel_doubling() {
        let art = RgbaImage::from_fn(64, 64, |x, y| Rgba([x as u8, y as u8, 0, 255]));
        let up = upscale_if_small(art);

        assert_eq!(up.dimensions(), (128, 128));
        assert_eq!(*up.get_pixel(0, 0), Rgba([0, 0, 0, 255]));
        assert_eq!(*up.get_pixel(1, 1), Rgba([0, 0, 0, 255]));
        assert_eq!(*up.get_pixel(2, 3), Rgba([1, 1, 0, 255]));
        assert_eq!(*up.get_pixel(127, 126), Rgba([63, 63, 0, 255]));
    }

    #[test]
    fn other_sizes_pass_through() {
        for (w, h) in [(32, 32), (64, 32), (128, 128), (65, 64)] {
            let art = RgbaImage::new(w, h);
            assert_eq!(upscale_if_small(art).dimensions(), (w, h));
        }
    }

    #[test]
    fn luminance_matches_fixed_point_weights() {
        let rgb = image::RgbImage::from_fn(4, 1, |x, _| match x {
            0 => image::Rgb([255, 255, 255]),
            1 => image::Rgb([255, 0, 0]),
            2 => image::Rgb([0, 255, 0]),
            _ => image::Rgb([0, 0, 255]),
        });
        let l = luminance(&DynamicImage::ImageRgb8(rgb));
        assert_eq!(l.get_pixel(0, 0)[0], 255);
        assert_eq!(l.get_pixel(1, 0)[0], 76);
        assert_eq!(l.get_pixel(2, 0)[0], 150);
        assert_eq!(l.get_pixel(3, 0)[0], 29);
    }

    #[test]
    fn weight_mask_blends_proportionally() {
        let art = RgbaImage::from_pixel(3, 1, Rgba([200, 100, 50, 255]));
        let weights = GrayImage::from_fn(3, 1, |x, _| match x {
            0 => Luma([0]),
            1 => Luma([255]),
            _ => Luma([128]),
        });
        let out = apply_weight_mask(&art, &weights);

        assert_eq!(*out.get_pixel(0, 0), Rgba([0, 0, 0, 0]));
        assert_eq!(*out.get_pixel(1, 0), Rgba([200, 100, 50, 255]));
        assert_eq!(*out.get_pixel(2, 0), Rgba([100, 50, 25, 128]));
    }

    #[test]
    fn weight_mask_is_resized_to_art() {
        let art = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 255]));
        let mut weights = GrayImage::from_pixel(2, 2, Luma([255]));
        weights.put_pixel(1, 1, Luma([0]));
        let out = apply_weight_mask(&art, &weights);

        assert_eq!(out.dimensions(), (4, 4));
        assert_eq!(*out.get_pixel(0, 0), Rgba([10, 20, 30, 255]));
        assert_eq!(*out.get_pixel(3, 3), Rgba([0, 0, 0, 0]));
        assert_eq!(*out.get_pixel(2, 2), Rgba([0, 0, 0, 0]));
        assert_eq!(*out.get_pixel(1, 2), Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn paste_skips_transparent_and_replaces_opaque() {
        let mut base = RgbaImage::from_pixel(2, 1, Rgba([9, 9, 9, 255]));
        let mut overlay = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 0, 0]));
        overlay.put_pixel(1, 0, Rgba([200, 150, 100, 255]));
        paste_with_alpha(&mut base, &overlay, 0, 0);

        assert_eq!(*base.get_pixel(0, 0), Rgba([9, 9, 9, 255]));
        assert_eq!(*base.get_pixel(1, 0), Rgba([200, 150, 100, 255]));
    }

    #[test]
    fn paste_blends_every_channel_by_alpha() {
        let mut base = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 0]));
        let overlay = RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 128]));
        paste_with_alpha(&mut base, &overlay, 0, 0);
        assert_eq!(*base.get_pixel(0, 0), Rgba([128, 128, 128, 64]));
    }

    #[test]
    fn paste_clips_to_base_bounds() {
        let mut small = RgbaImage::from_pixel(2, 2, Rgba([1, 1, 1, 255]));
        let big = RgbaImage::from_pixel(8, 8, Rgba([7, 7, 7, 255]));
        paste_with_alpha(&mut small, &big, 0, 0);
        assert!(small.pixels().all(|p| *p == Rgba([7, 7, 7, 255])));

        let mut large = RgbaImage::from_pixel(8, 8, Rgba([1, 1, 1, 255]));
        let tiny = RgbaImage::from_pixel(2, 2, Rgba([7, 7, 7, 255]));
        paste_with_alpha(&mut large, &tiny, 0, 0);
        assert_eq!(*large.get_pixel(1, 1), Rgba([7, 7, 7, 255]));
        assert_eq!(*large.get_pixel(2, 2), Rgba([1, 1, 1, 255]));

        paste_with_alpha(&mut large, &tiny, 8, 8);
    }

    #[test]
    fn prepare_overlay_upscales_then_masks() {
        let art = DynamicImage::ImageRgba8(RgbaImage::from_pixel(64, 64, Rgba([50, 60, 70, 255])));
        let mut mask = image::RgbImage::from_pixel(128, 128, image::Rgb([255, 255, 255]));
        mask.put_pixel(0, 0, image::Rgb([0, 0, 0]));
        let overlay = prepare_overlay(&art, &DynamicImage::ImageRgb8(mask));

        assert_eq!(overlay.dimensions(), (128, 128));
        assert_eq!(*overlay.get_pixel(0, 0), Rgba([0, 0, 0, 0]));
        assert_eq!(*overlay.get_pixel(5, 5), Rgba([50, 60, 70, 255]));
    }
}
