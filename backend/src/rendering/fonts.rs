//! Startup font registration.
//!
//! The registry is built exactly once during process startup by scanning the
//! configured font directory. Family and variant are derived from the
//! filename convention `Family-Variant.ttf` (e.g. `Roboto-BoldItalic.ttf`);
//! files that do not register as a usable font are skipped with a warning so
//! one stray file never prevents the portal from starting.

use log::warn;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Typeface variant derived from the font filename suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontVariant {
    pub bold: bool,
    pub italic: bool,
}

/// Raw font files keyed by lowercased family name and variant.
pub struct FontRegistry {
    fonts: HashMap<(String, FontVariant), Arc<Vec<u8>>>,
}

impl FontRegistry {
    /// Scan `dir` for `.ttf`/`.otf` files. A missing or unreadable directory
    /// yields an empty registry; generation then fails per batch with a
    /// structural error rather than at startup.
    pub fn scan(dir: &Path) -> Self {
        let mut fonts = HashMap::new();
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Font directory {:?} is not readable: {}", dir, e);
                return Self { fonts };
            }
        };

        // Throwaway context used only to reject files that are not fonts.
        let mut font_ctx = parley::FontContext::default();

        for entry in entries.flatten() {
            let path = entry.path();
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_ascii_lowercase());
            if !matches!(ext.as_deref(), Some("ttf") | Some("otf")) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let bytes = match std::fs::read(&path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("Skipping unreadable font file {:?}: {}", path, e);
                    continue;
                }
            };
            let families = font_ctx
                .collection
                .register_fonts(parley::fontique::Blob::from(bytes.clone()), None);
            if families.is_empty() {
                warn!("Skipping malformed font file {:?}", path);
                continue;
            }
            let (family, variant) = parse_font_stem(stem);
            fonts.insert((family, variant), Arc::new(bytes));
        }
        Self { fonts }
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Resolve a family/variant to font bytes, relaxing the variant step by
    /// step before giving up on the family entirely.
    pub fn resolve(&self, family: &str, bold: bool, italic: bool) -> Option<Arc<Vec<u8>>> {
        let family = family.trim().to_ascii_lowercase();
        let candidates = [
            FontVariant { bold, italic },
            FontVariant {
                bold,
                italic: false,
            },
            FontVariant {
                bold: false,
                italic,
            },
            FontVariant {
                bold: false,
                italic: false,
            },
        ];
        for variant in candidates {
            if let Some(bytes) = self.fonts.get(&(family.clone(), variant)) {
                return Some(bytes.clone());
            }
        }
        // Last resort: any variant of the requested family.
        self.fonts
            .iter()
            .find(|((f, _), _)| *f == family)
            .map(|(_, bytes)| bytes.clone())
    }

    #[cfg(test)]
    fn insert_raw(&mut self, family: &str, variant: FontVariant, bytes: Vec<u8>) {
        self.fonts
            .insert((family.to_string(), variant), Arc::new(bytes));
    }

    #[cfg(test)]
    fn empty() -> Self {
        Self {
            fonts: HashMap::new(),
        }
    }
}

/// Split a file stem into family and variant: `GreatVibes-Regular` and
/// `GreatVibes` are the plain face, `Roboto-BoldItalic` is bold+italic. A
/// suffix that names no known variant is treated as part of the family name.
fn parse_font_stem(stem: &str) -> (String, FontVariant) {
    let (family, suffix) = match stem.rsplit_once('-') {
        Some((family, suffix)) => (family, suffix),
        None => (stem, ""),
    };
    let suffix_lc = suffix.to_ascii_lowercase();
    let bold = suffix_lc.contains("bold");
    let italic = suffix_lc.contains("italic") || suffix_lc.contains("oblique");
    let family = if bold || italic || suffix_lc == "regular" {
        family
    } else {
        stem
    };
    (
        family.trim().to_ascii_lowercase(),
        FontVariant { bold, italic },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_convention_maps_to_family_and_variant() {
        assert_eq!(
            parse_font_stem("Roboto-BoldItalic"),
            (
                "roboto".to_string(),
                FontVariant {
                    bold: true,
                    italic: true
                }
            )
        );
        assert_eq!(
            parse_font_stem("GreatVibes-Regular"),
            (
                "greatvibes".to_string(),
                FontVariant {
                    bold: false,
                    italic: false
                }
            )
        );
        assert_eq!(
            parse_font_stem("GreatVibes"),
            (
                "greatvibes".to_string(),
                FontVariant {
                    bold: false,
                    italic: false
                }
            )
        );
        // Hyphenated family with no variant suffix keeps the full stem.
        assert_eq!(
            parse_font_stem("Source-Serif"),
            (
                "source-serif".to_string(),
                FontVariant {
                    bold: false,
                    italic: false
                }
            )
        );
    }

    #[test]
    fn resolve_relaxes_the_variant_before_giving_up() {
        let mut registry = FontRegistry::empty();
        registry.insert_raw(
            "roboto",
            FontVariant {
                bold: false,
                italic: false,
            },
            vec![1],
        );
        registry.insert_raw(
            "roboto",
            FontVariant {
                bold: true,
                italic: false,
            },
            vec![2],
        );

        // Exact match.
        assert_eq!(*registry.resolve("Roboto", true, false).unwrap(), vec![2]);
        // BoldItalic missing: falls back to Bold.
        assert_eq!(*registry.resolve("roboto", true, true).unwrap(), vec![2]);
        // Italic missing: falls back to Regular.
        assert_eq!(*registry.resolve("roboto", false, true).unwrap(), vec![1]);
        // Unknown family.
        assert!(registry.resolve("papyrus", false, false).is_none());
    }

    #[test]
    fn scan_of_a_missing_directory_yields_an_empty_registry() {
        let registry = FontRegistry::scan(Path::new("definitely/not/here"));
        assert!(registry.is_empty());
    }
}
