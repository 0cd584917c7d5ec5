//! Resolution-independent text placement.
//!
//! The layout editor positions the text box on a fixed-size preview canvas,
//! but certificates render against the template's native resolution, which
//! the preview almost never matches. The durable representation is therefore
//! a pair of anchor fractions plus a font size pre-scaled to the native
//! height:
//!
//! - the *save direction* ([`to_relative`]) converts absolute preview-pixel
//!   coordinates into that representation, and
//! - the *render direction* ([`to_absolute`]) converts it back into absolute
//!   pixel coordinates against whatever native resolution the current
//!   template has.
//!
//! Swapping the template for one with different native dimensions moves the
//! absolute pixel position but keeps the same relative placement, which is
//! the whole point of storing fractions instead of pixels.

/// The persisted, preview-independent form of a text placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelativeAnchor {
    /// Anchor center X as a fraction (0-1) of the template width.
    pub x_percent: f64,
    /// Anchor center Y as a fraction (0-1) of the template height.
    pub y_percent: f64,
    /// Font size scaled to the template's native resolution.
    pub font_size_absolute: f64,
}

/// Save direction: preview-pixel center plus display font size to the
/// resolution-independent form.
///
/// `(cx, cy)` is the center of the placed text box inside a
/// `preview_w x preview_h` canvas; `native_h` is the template's native
/// height, used to back-scale the display font size. Zero-area dimensions
/// are a configuration error, not a divide-by-zero.
pub fn to_relative(
    cx: f64,
    cy: f64,
    preview_w: u32,
    preview_h: u32,
    native_h: u32,
    font_size_display: f64,
) -> Result<RelativeAnchor, String> {
    if preview_w == 0 || preview_h == 0 {
        return Err("preview dimensions must be non-zero".to_string());
    }
    if native_h == 0 {
        return Err("native template dimensions must be non-zero".to_string());
    }
    Ok(RelativeAnchor {
        x_percent: cx / f64::from(preview_w),
        y_percent: cy / f64::from(preview_h),
        font_size_absolute: font_size_display * f64::from(native_h) / f64::from(preview_h),
    })
}

/// Render direction: anchor fractions to an absolute pixel center against
/// the given native dimensions. The stored font size needs no further
/// scaling and is used as-is by the renderer.
pub fn to_absolute(
    x_percent: f64,
    y_percent: f64,
    native_w: u32,
    native_h: u32,
) -> Result<(f64, f64), String> {
    if native_w == 0 || native_h == 0 {
        return Err("native template dimensions must be non-zero".to_string());
    }
    Ok((
        x_percent * f64::from(native_w),
        y_percent * f64::from(native_h),
    ))
}
