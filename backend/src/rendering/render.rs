//! Draws one recipient's name onto the certificate template.
//!
//! The template image and layout settings are expensive to load and identical
//! for every recipient, so a [`BatchContext`] is constructed once per batch
//! and reused for each render. Text is shaped with Parley against the font
//! resolved from the startup registry and rasterized with `vello_cpu` glyph
//! runs over a copy of the template pixels; the anchor is always the text's
//! geometric center, which is what the stored percentages encode.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use common::model::layout::LayoutSettings;
use common::model::placement;
use common::model::recipient::Recipient;
use image::RgbaImage;
use log::warn;

use super::fonts::FontRegistry;

/// Underline offset below the text, as a fraction of the font size.
const UNDERLINE_GAP_FRACTION: f64 = 0.08;
/// Underline stroke width, as a fraction of the font size.
const UNDERLINE_THICKNESS_FRACTION: f64 = 0.05;

/// RGBA8 brush color carried through the Parley layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BrushRgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Everything shared by every render within one generation batch: the decoded
/// template, the resolved font, and the Parley contexts.
pub struct BatchContext {
    settings: LayoutSettings,
    width: u32,
    height: u32,
    template_pixels: Vec<vello_cpu::peniko::color::PremulRgba8>,
    template_has_opacities: bool,
    font_data: vello_cpu::peniko::FontData,
    family_name: String,
    color: BrushRgba8,
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<BrushRgba8>,
}

impl BatchContext {
    /// Load the template referenced by `settings` and resolve its font.
    ///
    /// Any failure here is structural: the caller must abort the batch
    /// before touching a single recipient.
    pub fn new(settings: LayoutSettings, fonts: &FontRegistry) -> Result<Self, String> {
        let template = image::open(Path::new(&settings.template_ref))
            .map_err(|e| format!("Template image '{}' could not be read: {}", settings.template_ref, e))?
            .to_rgba8();
        let (width, height) = template.dimensions();
        if u16::try_from(width).is_err() || u16::try_from(height).is_err() {
            return Err(format!(
                "Template dimensions {}x{} exceed the renderer limit",
                width, height
            ));
        }
        if let (Some(w), Some(h)) = (settings.native_width, settings.native_height) {
            if w != width || h != height {
                // A swapped template renders at the same relative placement;
                // the cached dimensions are only the editor's restoration aid.
                warn!(
                    "Template is {}x{} but layout was saved against {}x{}",
                    width, height, w, h
                );
            }
        }

        let font_bytes = fonts
            .resolve(&settings.font_family, settings.is_bold(), settings.is_italic())
            .ok_or_else(|| format!("Font family '{}' is not registered", settings.font_family))?;

        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.as_ref().clone()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| format!("Font for '{}' registered no families", settings.font_family))?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| "Registered font family has no name".to_string())?
            .to_string();

        let font_data = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(font_bytes.as_ref().clone()),
            0,
        );
        let color = parse_hex_color(&settings.color)?;
        let (template_pixels, template_has_opacities) = premultiply_pixels(&template);

        Ok(Self {
            settings,
            width,
            height,
            template_pixels,
            template_has_opacities,
            font_data,
            family_name,
            color,
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
        })
    }

    /// Render one certificate into `out_dir`, creating it on first use.
    ///
    /// The output name is derived from the recipient id, so regenerating an
    /// unchanged roster overwrites in place instead of accumulating files.
    pub fn render(&mut self, recipient: &Recipient, out_dir: &Path) -> Result<PathBuf, String> {
        let text = recipient.name.trim();
        if text.is_empty() {
            return Err("Recipient has no name to draw".to_string());
        }

        let (px, py) = placement::to_absolute(
            self.settings.anchor_x_percent,
            self.settings.anchor_y_percent,
            self.width,
            self.height,
        )?;

        let layout = self.layout_text(text);
        let text_w = f64::from(layout.width());
        let text_h = f64::from(layout.height());
        // Center/middle anchor: the layout's origin is its top-left corner.
        let origin_x = px - text_w / 2.0;
        let origin_y = py - text_h / 2.0;

        let mut pixmap = vello_cpu::Pixmap::from_parts_with_opacity(
            self.template_pixels.clone(),
            self.width as u16,
            self.height as u16,
            self.template_has_opacities,
        );
        let mut ctx = vello_cpu::RenderContext::new(self.width as u16, self.height as u16);
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((origin_x, origin_y)));
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            self.color.r,
            self.color.g,
            self.color.b,
            self.color.a,
        ));

        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&self.font_data)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }

        if self.settings.underline {
            let (y0, y1) = underline_span(text_h, self.settings.font_size_absolute);
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, y0, text_w, y1));
        }

        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        let data = unpremultiply(pixmap.data_as_u8_slice());
        let img = RgbaImage::from_raw(self.width, self.height, data)
            .ok_or_else(|| "Rendered pixel buffer has the wrong size".to_string())?;

        std::fs::create_dir_all(out_dir).map_err(|e| e.to_string())?;
        let path = out_dir.join(artifact_filename(&recipient.id));
        img.save(&path).map_err(|e| e.to_string())?;
        Ok(path)
    }

    fn layout_text(&mut self, text: &str) -> parley::Layout<BrushRgba8> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(
            self.settings.font_size_absolute as f32,
        ));
        builder.push_default(parley::style::StyleProperty::Brush(self.color));
        if let Some(spacing) = self.settings.letter_spacing {
            builder.push_default(parley::style::StyleProperty::LetterSpacing(spacing as f32));
        }
        let mut layout = builder.build(text);
        layout.break_all_lines(None);
        layout
    }
}

/// Deterministic artifact name for a recipient.
pub fn artifact_filename(id: &str) -> String {
    format!("certificate_{}.png", id)
}

/// Vertical extent of the manually drawn underline, relative to the text
/// box's top edge. Offset and stroke width both scale with the font size.
fn underline_span(text_h: f64, font_size: f64) -> (f64, f64) {
    let y0 = text_h + font_size * UNDERLINE_GAP_FRACTION;
    let thickness = (font_size * UNDERLINE_THICKNESS_FRACTION).max(1.0);
    (y0, y0 + thickness)
}

/// Parse `#rgb` or `#rrggbb` into an opaque brush color.
pub(crate) fn parse_hex_color(s: &str) -> Result<BrushRgba8, String> {
    let hex = s.trim().trim_start_matches('#');
    // Length is checked in bytes; slicing below needs ASCII to be safe.
    if !hex.is_ascii() {
        return Err(format!("Invalid color '{}': expected #rgb or #rrggbb", s));
    }
    let channel = |h: &str| u8::from_str_radix(h, 16).map_err(|e| format!("Invalid color '{}': {}", s, e));
    match hex.len() {
        6 => Ok(BrushRgba8 {
            r: channel(&hex[0..2])?,
            g: channel(&hex[2..4])?,
            b: channel(&hex[4..6])?,
            a: 255,
        }),
        3 => {
            let expand = |h: &str| channel(h).map(|c| c * 17);
            Ok(BrushRgba8 {
                r: expand(&hex[0..1])?,
                g: expand(&hex[1..2])?,
                b: expand(&hex[2..3])?,
                a: 255,
            })
        }
        _ => Err(format!("Invalid color '{}': expected #rgb or #rrggbb", s)),
    }
}

fn premultiply_pixels(img: &RgbaImage) -> (Vec<vello_cpu::peniko::color::PremulRgba8>, bool) {
    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(img.width() as usize * img.height() as usize);
    for px in img.as_raw().chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        let af = u16::from(a) + 1;
        let premul = |c: u8| ((u16::from(c) * af) >> 8) as u8;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: premul(px[0]),
            g: premul(px[1]),
            b: premul(px[2]),
            a,
        });
    }
    (pixels, may_have_opacities)
}

fn unpremultiply(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    for px in data.chunks_exact(4) {
        let a = px[3];
        if a == 0 || a == 255 {
            out.extend_from_slice(px);
        } else {
            let a16 = u16::from(a);
            let un = |c: u8| ((u16::from(c) * 255 + a16 / 2) / a16).min(255) as u8;
            out.extend_from_slice(&[un(px[0]), un(px[1]), un(px[2]), a]);
        }
    }
    out
}
