use serde::{Deserialize, Serialize};

/// The singleton layout record describing where and how the recipient name is
/// drawn on the certificate template.
///
/// Produced by the layout editor, persisted by the backend with
/// upsert-to-singleton semantics, and read once per generation batch. The
/// anchor is stored as a fraction of the template's native width/height so
/// the same record renders correctly regardless of the editor's preview
/// resolution; see `model::placement` for the conversion in both directions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSettings {
    /// Path of the template raster asset.
    pub template_ref: String,
    /// Center of the text anchor as a fraction (0-1) of the native width.
    pub anchor_x_percent: f64,
    /// Center of the text anchor as a fraction (0-1) of the native height.
    pub anchor_y_percent: f64,
    /// Font size already scaled to the template's native resolution.
    pub font_size_absolute: f64,
    pub font_family: String,
    /// CSS-like weight: `normal`, `bold`, or a numeric value such as `700`.
    #[serde(default = "default_weight")]
    pub font_weight: String,
    /// `normal` or `italic`.
    #[serde(default = "default_style")]
    pub font_style: String,
    #[serde(default)]
    pub underline: bool,
    /// Hex color such as `#1a2b3c`.
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    // Dimensions at the time of save. Denormalized: the percentages above are
    // authoritative, these let the editor restore absolute pixel coordinates
    // without re-deriving them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_height: Option<u32>,
}

fn default_weight() -> String {
    "normal".to_string()
}

fn default_style() -> String {
    "normal".to_string()
}

fn default_color() -> String {
    "#000000".to_string()
}

impl LayoutSettings {
    pub fn is_bold(&self) -> bool {
        let w = self.font_weight.trim();
        w.eq_ignore_ascii_case("bold")
            || w.parse::<u32>().map(|n| n >= 600).unwrap_or(false)
    }

    pub fn is_italic(&self) -> bool {
        self.font_style.trim().eq_ignore_ascii_case("italic")
    }

    /// Basic sanity checks applied before the record is persisted.
    pub fn validate(&self) -> Result<(), String> {
        if self.template_ref.trim().is_empty() {
            return Err("templateRef must not be empty".to_string());
        }
        if !(0.0..=1.0).contains(&self.anchor_x_percent)
            || !(0.0..=1.0).contains(&self.anchor_y_percent)
        {
            return Err("anchor percentages must be within 0 and 1".to_string());
        }
        if !self.font_size_absolute.is_finite() || self.font_size_absolute <= 0.0 {
            return Err("fontSizeAbsolute must be a positive number".to_string());
        }
        if self.font_family.trim().is_empty() {
            return Err("fontFamily must not be empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::LayoutSettings;

    fn settings() -> LayoutSettings {
        LayoutSettings {
            template_ref: "templates/certificate.png".to_string(),
            anchor_x_percent: 0.5,
            anchor_y_percent: 0.42,
            font_size_absolute: 96.0,
            font_family: "GreatVibes".to_string(),
            font_weight: "normal".to_string(),
            font_style: "normal".to_string(),
            underline: false,
            color: "#1a1a1a".to_string(),
            letter_spacing: None,
            line_height: None,
            preview_width: Some(800),
            preview_height: Some(566),
            native_width: Some(2000),
            native_height: Some(1414),
        }
    }

    #[test]
    fn weight_accepts_keyword_and_numeric_forms() {
        let mut s = settings();
        assert!(!s.is_bold());
        s.font_weight = "Bold".to_string();
        assert!(s.is_bold());
        s.font_weight = "700".to_string();
        assert!(s.is_bold());
        s.font_weight = "400".to_string();
        assert!(!s.is_bold());
    }

    #[test]
    fn validate_rejects_out_of_range_anchor() {
        let mut s = settings();
        s.anchor_x_percent = 1.2;
        assert!(s.validate().is_err());
        s.anchor_x_percent = 0.5;
        s.font_size_absolute = 0.0;
        assert!(s.validate().is_err());
    }

    #[test]
    fn wire_format_is_camel_case() {
        let json = serde_json::to_value(settings()).unwrap();
        assert!(json.get("anchorXPercent").is_some());
        assert!(json.get("fontSizeAbsolute").is_some());
        assert!(json.get("templateRef").is_some());
    }
}
