//! Body heatmap compositing.
//!
//! The base body image and all 13 × 4 overlays are decoded once when the
//! compositor is built. Rendering copies the base, pastes one overlay per
//! group masked by the overlay's own alpha channel, and encodes the result
//! as PNG. Each overlay only covers its own region, so paste order does not
//! change the output.
//!
//! # Masked paste
//!
//! Every channel of the covered base pixel, alpha included, is blended as
//! `base * (255 - m) / 255 + overlay * m / 255` where `m` is the overlay
//! pixel's alpha, rounded to nearest. This is a mask paste, not alpha
//! compositing: a half-transparent overlay also lowers the alpha of an opaque
//! base.

use std::io::Cursor;
use std::path::Path;

use bytes::Bytes;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageReader, RgbaImage};
use tracing::{debug, info};

use super::groups::MuscleGroup;
use super::weights::WeightVector;
use crate::error::HeatmapError;

/// Asset file name of the full-body base image.
pub const BASE_ASSET: &str = "전체.png";

/// Number of intensity tiers per muscle group.
pub const BUCKET_COUNT: u8 = 4;

/// Map a weight to an intensity tier in `0..=3`.
///
/// Halves the weight, divides by 100 with integer division, and clamps the
/// result, so 0..=199 is tier 0, 200..=399 tier 1, and anything from 600 up
/// is tier 3. Negative weights are tier 0.
pub fn bucket(weight: i64) -> u8 {
    ((weight / 2) / 100).clamp(0, i64::from(BUCKET_COUNT - 1)) as u8
}

/// Renders heatmaps from preloaded image layers.
#[derive(Debug, Clone)]
pub struct HeatmapCompositor {
    base: RgbaImage,
    /// Indexed by `group.index() * BUCKET_COUNT + bucket`
    overlays: Vec<RgbaImage>,
}

impl HeatmapCompositor {
    /// Load the base image and every overlay from `dir`.
    ///
    /// Fails on the first missing or undecodable asset; an incomplete asset
    /// set is a configuration error, not something to discover per request.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, HeatmapError> {
        let dir = dir.as_ref();
        let base = load_asset(dir, BASE_ASSET)?;
        let compositor = Self::from_layers(base, |group, bucket| {
            load_asset(dir, &group.asset_name(bucket))
        })?;

        info!(
            dir = %dir.display(),
            width = compositor.base.width(),
            height = compositor.base.height(),
            "Loaded heatmap assets"
        );
        Ok(compositor)
    }

    /// Build a compositor from in-memory layers.
    ///
    /// `overlay` is called once for every `(group, bucket)` pair.
    pub fn from_layers<F>(base: RgbaImage, mut overlay: F) -> Result<Self, HeatmapError>
    where
        F: FnMut(MuscleGroup, u8) -> Result<RgbaImage, HeatmapError>,
    {
        let mut overlays = Vec::with_capacity(MuscleGroup::ALL.len() * BUCKET_COUNT as usize);
        for group in MuscleGroup::ALL {
            for tier in 0..BUCKET_COUNT {
                overlays.push(overlay(group, tier)?);
            }
        }
        Ok(Self { base, overlays })
    }

    /// Dimensions of the base image.
    pub fn dimensions(&self) -> (u32, u32) {
        self.base.dimensions()
    }

    /// Composite all overlays for `weights` onto a copy of the base image.
    pub fn compose(&self, weights: &WeightVector) -> RgbaImage {
        let mut canvas = self.base.clone();
        for (group, weight) in weights.iter() {
            let tier = bucket(weight);
            let (x, y) = group.origin();
            debug!(group = %group, weight, tier, "Pasting overlay");
            paste_masked(&mut canvas, self.overlay(group, tier), x, y);
        }
        canvas
    }

    /// Composite and encode as PNG.
    pub fn render(&self, weights: &WeightVector) -> Result<Bytes, HeatmapError> {
        let canvas = self.compose(weights);
        let mut output = Vec::new();
        PngEncoder::new(&mut output)
            .write_image(
                canvas.as_raw(),
                canvas.width(),
                canvas.height(),
                ExtendedColorType::Rgba8,
            )
            .map_err(|e| HeatmapError::Encode(e.to_string()))?;
        Ok(Bytes::from(output))
    }

    fn overlay(&self, group: MuscleGroup, tier: u8) -> &RgbaImage {
        &self.overlays[group.index() * BUCKET_COUNT as usize + tier as usize]
    }
}

/// Paste `overlay` onto `canvas` with its top-left corner at `(x, y)`, using
/// the overlay's alpha channel as the mask. Pixels outside the canvas are
/// clipped.
pub fn paste_masked(canvas: &mut RgbaImage, overlay: &RgbaImage, x: i64, y: i64) {
    let (canvas_w, canvas_h) = (i64::from(canvas.width()), i64::from(canvas.height()));

    for (ox, oy, pixel) in overlay.enumerate_pixels() {
        let cx = x + i64::from(ox);
        let cy = y + i64::from(oy);
        if cx < 0 || cy < 0 || cx >= canvas_w || cy >= canvas_h {
            continue;
        }

        let mask = pixel.0[3];
        let target = canvas.get_pixel_mut(cx as u32, cy as u32);
        for (dst, src) in target.0.iter_mut().zip(pixel.0) {
            *dst = blend(*dst, src, mask);
        }
    }
}

/// `(base * (255 - mask) + over * mask) / 255`, rounded to nearest.
fn blend(base: u8, over: u8, mask: u8) -> u8 {
    let (base, over, mask) = (u32::from(base), u32::from(over), u32::from(mask));
    let tmp = base * (255 - mask) + over * mask + 128;
    (((tmp >> 8) + tmp) >> 8) as u8
}

fn load_asset(dir: &Path, name: &str) -> Result<RgbaImage, HeatmapError> {
    let path = dir.join(name);
    if !path.is_file() {
        return Err(HeatmapError::MissingAsset(name.to_string()));
    }

    let decode_error = |message: String| HeatmapError::DecodeAsset {
        name: name.to_string(),
        message,
    };
    let image = ImageReader::open(&path)
        .map_err(|e| decode_error(e.to_string()))?
        .with_guessed_format()
        .map_err(|e| decode_error(e.to_string()))?
        .decode()
        .map_err(|e| decode_error(e.to_string()))?;

    Ok(image.into_rgba8())
}

/// Decode a PNG produced by [`HeatmapCompositor::render`].
///
/// Used by tests to read back rendered output.
pub fn decode_png(data: &[u8]) -> Result<RgbaImage, HeatmapError> {
    let image = ImageReader::with_format(Cursor::new(data), image::ImageFormat::Png)
        .decode()
        .map_err(|e| HeatmapError::DecodeAsset {
            name: "<rendered>".to_string(),
            message: e.to_string(),
        })?;
    Ok(image.into_rgba8())
}
