//! Crop engine: rasterize a displayed-coordinate region at native resolution.
//!
//! A crop region is expressed in the coordinate space of the *displayed*
//! (possibly scaled-down) image. The engine maps it into natural space with
//! `scale = natural / displayed` per axis and crops exactly that rectangle,
//! so the output keeps full source resolution for the selected region.

use std::io::Cursor;

use image::{GenericImageView, ImageFormat};

use crate::error::BlendError;
use crate::inline::{decode_inline, encode_to_inline, UploadedImage};

/// Coordinate unit of a [`CropRegion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropUnit {
    /// Percentages of the displayed width/height.
    Percent,
    /// Displayed-space pixels.
    Pixels,
}

/// A user-selected rectangle in displayed coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRegion {
    /// Unit of the coordinates below.
    pub unit: CropUnit,
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Region width.
    pub width: f64,
    /// Region height.
    pub height: f64,
}

/// The default selection on image load: a centered square covering 90% of
/// the shorter displayed dimension.
#[must_use]
pub fn default_region(display_w: f64, display_h: f64) -> CropRegion {
    let side = display_w.min(display_h) * 0.9;
    CropRegion {
        unit: CropUnit::Pixels,
        x: (display_w - side) / 2.0,
        y: (display_h - side) / 2.0,
        width: side,
        height: side,
    }
}

/// Natural (source) dimensions of an uploaded image.
///
/// # Errors
///
/// Returns [`BlendError::RasterizationUnavailable`] if the bytes cannot be
/// decoded.
pub fn dimensions(source: &UploadedImage) -> Result<(u32, u32), BlendError> {
    let img = image::load_from_memory(&source.data)
        .map_err(|e| BlendError::RasterizationUnavailable(format!("failed to decode image: {e}")))?;
    Ok(img.dimensions())
}

/// Crop `source` to `region`, producing a new standalone PNG file that
/// reuses the original file name.
///
/// `display_w`/`display_h` are the dimensions the region was selected
/// against; pass the natural dimensions for an unscaled selection.
///
/// # Errors
///
/// Returns [`BlendError::EmptySelection`] if the region has zero width or
/// height, [`BlendError::InvalidArgument`] if it falls outside the displayed
/// bounds, and [`BlendError::RasterizationUnavailable`] if the source cannot
/// be decoded or the crop cannot be encoded.
pub fn crop_to_region(
    source: &UploadedImage,
    region: &CropRegion,
    display_w: f64,
    display_h: f64,
) -> Result<UploadedImage, BlendError> {
    let (x, y, w, h) = match region.unit {
        CropUnit::Pixels => (region.x, region.y, region.width, region.height),
        CropUnit::Percent => (
            region.x / 100.0 * display_w,
            region.y / 100.0 * display_h,
            region.width / 100.0 * display_w,
            region.height / 100.0 * display_h,
        ),
    };

    if w <= 0.0 || h <= 0.0 {
        return Err(BlendError::EmptySelection);
    }
    // Half-pixel tolerance absorbs rounding from percent conversions.
    if x < -0.5 || y < -0.5 || x + w > display_w + 0.5 || y + h > display_h + 0.5 {
        return Err(BlendError::InvalidArgument(format!(
            "crop region {x:.0},{y:.0} {w:.0}x{h:.0} exceeds displayed bounds {display_w:.0}x{display_h:.0}"
        )));
    }

    let img = image::load_from_memory(&source.data)
        .map_err(|e| BlendError::RasterizationUnavailable(format!("failed to decode image: {e}")))?;
    let (natural_w, natural_h) = img.dimensions();

    let scale_x = f64::from(natural_w) / display_w;
    let scale_y = f64::from(natural_h) / display_h;

    let nx = clamp_u32((x.max(0.0) * scale_x).round(), natural_w.saturating_sub(1));
    let ny = clamp_u32((y.max(0.0) * scale_y).round(), natural_h.saturating_sub(1));
    let nw = clamp_u32((w * scale_x).round(), natural_w - nx).max(1);
    let nh = clamp_u32((h * scale_y).round(), natural_h - ny).max(1);

    let cropped = img.crop_imm(nx, ny, nw, nh);

    let mut buf = Vec::new();
    cropped
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| BlendError::RasterizationUnavailable(format!("failed to encode crop: {e}")))?;

    // Round-trip through the inline codec so the output is a standalone
    // file with the original name, exactly like any other upload.
    let inline = encode_to_inline(&buf, "image/png")?;
    decode_inline(&inline, &source.file_name)
}

/// Parse a crop spec of the form `x,y,WxH` (displayed pixels) or
/// `x%,y%,W%xH%` (percent of the displayed image).
///
/// # Errors
///
/// Returns [`BlendError::InvalidArgument`] if the spec does not match either
/// form.
pub fn parse_crop_spec(spec: &str) -> Result<CropRegion, BlendError> {
    let unit = if spec.contains('%') { CropUnit::Percent } else { CropUnit::Pixels };
    let cleaned = spec.replace('%', "");

    let bad = || BlendError::InvalidArgument(format!("crop spec '{spec}': expected x,y,WxH"));

    let mut fields = cleaned.split(',');
    let x = parse_coord(fields.next()).ok_or_else(bad)?;
    let y = parse_coord(fields.next()).ok_or_else(bad)?;
    let size = fields.next().ok_or_else(bad)?;
    if fields.next().is_some() {
        return Err(bad());
    }

    let (w, h) = size.split_once('x').ok_or_else(bad)?;
    let width = parse_coord(Some(w)).ok_or_else(bad)?;
    let height = parse_coord(Some(h)).ok_or_else(bad)?;

    Ok(CropRegion { unit, x, y, width, height })
}

/// Parse a displayed-size spec of the form `WxH`.
///
/// # Errors
///
/// Returns [`BlendError::InvalidArgument`] if the spec does not match or a
/// dimension is not positive.
pub fn parse_display_spec(spec: &str) -> Result<(f64, f64), BlendError> {
    let bad = || BlendError::InvalidArgument(format!("display spec '{spec}': expected WxH"));
    let (w, h) = spec.split_once('x').ok_or_else(bad)?;
    let w = parse_coord(Some(w)).ok_or_else(bad)?;
    let h = parse_coord(Some(h)).ok_or_else(bad)?;
    if w <= 0.0 || h <= 0.0 {
        return Err(bad());
    }
    Ok((w, h))
}

fn parse_coord(field: Option<&str>) -> Option<f64> {
    field.and_then(|f| f.trim().parse::<f64>().ok()).filter(|v| v.is_finite())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_u32(value: f64, max: u32) -> u32 {
    (value.max(0.0) as u32).min(max)
}
