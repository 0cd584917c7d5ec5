//! Certificate rasterization.
//!
//! `fonts` builds the process-wide font registry at startup; `render` draws
//! one recipient's name onto a copy of the template image and encodes the
//! result as a PNG named after the recipient id.

pub mod fonts;
pub mod render;
