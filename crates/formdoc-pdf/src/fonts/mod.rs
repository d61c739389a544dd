//! Font resolution and metrics
//!
//! Fonts are resolved by name once per generation run. Standard PDF font
//! names map to the built-in fonts, names found in the custom font map are
//! embedded, and anything else falls back to the configured default font
//! (Helvetica when none is configured).

mod standard;
mod truetype;

pub use standard::{win_ansi_byte, StandardFont};
pub use truetype::EmbeddedFont;

use std::collections::HashMap;

use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};

use crate::config::{FontSource, GenerateOptions};
use crate::error::GenerateError;

#[derive(Debug, Clone)]
pub enum FontKind {
    Standard(StandardFont),
    Embedded(EmbeddedFont),
}

/// A font registered in the output document
#[derive(Debug, Clone)]
pub struct PdfFont {
    /// Name under which pages and forms reference the font
    pub resource_name: String,
    pub object_id: ObjectId,
    pub kind: FontKind,
}

impl PdfFont {
    pub fn base_font_name(&self) -> &str {
        match &self.kind {
            FontKind::Standard(f) => f.name(),
            FontKind::Embedded(f) => f.postscript_name(),
        }
    }

    pub fn can_encode(&self, c: char) -> bool {
        match &self.kind {
            FontKind::Standard(f) => f.can_encode(c),
            FontKind::Embedded(f) => f.can_encode(c),
        }
    }

    /// Replaces every character the font cannot render with `?`
    pub fn filter_charset(&self, text: &str) -> String {
        text.chars()
            .map(|c| {
                let private_use = ('\u{E000}'..='\u{F8FF}').contains(&c);
                if !private_use && self.can_encode(c) {
                    c
                } else {
                    '?'
                }
            })
            .collect()
    }

    pub fn width_of_text_at_size(&self, text: &str, size: f64) -> f64 {
        let units: u32 = text
            .chars()
            .map(|c| match &self.kind {
                FontKind::Standard(f) => f.char_width(c) as u32,
                FontKind::Embedded(f) => f.char_width(c) as u32,
            })
            .sum();
        units as f64 * size / 1000.0
    }

    /// Ascender-to-descender height
    pub fn height_at_size(&self, size: f64) -> f64 {
        let (ascent, descent) = self.vertical_metrics();
        (ascent - descent) as f64 * size / 1000.0
    }

    pub fn ascent_at_size(&self, size: f64) -> f64 {
        self.vertical_metrics().0 as f64 * size / 1000.0
    }

    fn vertical_metrics(&self) -> (i32, i32) {
        match &self.kind {
            FontKind::Standard(f) => f.vertical_metrics(),
            FontKind::Embedded(f) => f.vertical_metrics(),
        }
    }

    /// String operand for `Tj`. Embedded fonts remember the glyphs used.
    pub fn encode_text(&mut self, text: &str) -> Object {
        match &mut self.kind {
            FontKind::Standard(f) => Object::String(f.encode(text), StringFormat::Literal),
            FontKind::Embedded(f) => Object::String(f.encode(text), StringFormat::Hexadecimal),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontHandle(usize);

pub struct FontRegistry {
    custom: HashMap<String, FontSource>,
    default_font: Option<String>,
    by_name: HashMap<String, FontHandle>,
    fonts: Vec<PdfFont>,
}

impl FontRegistry {
    pub fn new(options: &GenerateOptions) -> Self {
        if !options.custom_font_map.is_empty() {
            tracing::debug!(
                count = options.custom_font_map.len(),
                "Registered custom font table"
            );
        }
        Self {
            custom: options.custom_font_map.clone(),
            default_font: options.default_font.clone(),
            by_name: HashMap::new(),
            fonts: Vec::new(),
        }
    }

    /// The font to use when an element names none
    pub fn default_font_name(&self) -> &str {
        self.default_font
            .as_deref()
            .unwrap_or(StandardFont::Helvetica.name())
    }

    /// Resolve `name` to an embedded font, embedding it on first use
    pub fn resolve(&mut self, doc: &mut Document, name: &str) -> Result<FontHandle, GenerateError> {
        if let Some(handle) = self.by_name.get(name) {
            return Ok(*handle);
        }

        let kind = if let Some(standard) = StandardFont::from_name(name) {
            Some(FontKind::Standard(standard))
        } else if let Some(source) = self.custom.get(name) {
            Some(FontKind::Embedded(EmbeddedFont::parse(source.load()?)?))
        } else {
            None
        };

        let handle = match kind {
            Some(kind) => self.register(doc, name, kind),
            None => {
                let fallback = match &self.default_font {
                    Some(default) if default != name => default.clone(),
                    _ => StandardFont::Helvetica.name().to_string(),
                };
                tracing::warn!(font = %name, fallback = %fallback, "Unknown font, using fallback");
                self.resolve(doc, &fallback)?
            }
        };
        self.by_name.insert(name.to_string(), handle);
        Ok(handle)
    }

    fn register(&mut self, doc: &mut Document, name: &str, kind: FontKind) -> FontHandle {
        let object_id = match &kind {
            FontKind::Standard(standard) => {
                let mut dict = Dictionary::new();
                dict.set("Type", Object::Name(b"Font".to_vec()));
                dict.set("Subtype", Object::Name(b"Type1".to_vec()));
                dict.set("BaseFont", Object::Name(standard.name().as_bytes().to_vec()));
                if !standard.is_symbolic() {
                    dict.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
                }
                doc.add_object(dict)
            }
            // Written by `finalize` once the used glyphs are known
            FontKind::Embedded(_) => doc.new_object_id(),
        };
        let handle = FontHandle(self.fonts.len());
        let font = PdfFont {
            resource_name: format!("FdF{}", handle.0),
            object_id,
            kind,
        };
        tracing::info!(font = %name, base_font = %font.base_font_name(), "Embedded font");
        self.fonts.push(font);
        handle
    }

    pub fn get(&self, handle: FontHandle) -> &PdfFont {
        &self.fonts[handle.0]
    }

    pub fn get_mut(&mut self, handle: FontHandle) -> &mut PdfFont {
        &mut self.fonts[handle.0]
    }

    pub fn fonts(&self) -> &[PdfFont] {
        &self.fonts
    }

    /// Write the objects of embedded custom fonts. Must run before saving.
    pub fn finalize(&self, doc: &mut Document) -> Result<(), GenerateError> {
        for font in &self.fonts {
            if let FontKind::Embedded(embedded) = &font.kind {
                embedded.write_objects(doc, font.object_id)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(default_font: Option<&str>) -> FontRegistry {
        let mut options = GenerateOptions::new();
        options.default_font = default_font.map(String::from);
        FontRegistry::new(&options)
    }

    #[test]
    fn test_standard_fonts_are_memoized() {
        let mut doc = Document::with_version("1.7");
        let mut fonts = registry(None);
        let a = fonts.resolve(&mut doc, "Times-Roman").unwrap();
        let b = fonts.resolve(&mut doc, "Times-Roman").unwrap();
        assert_eq!(a, b);
        assert_eq!(fonts.fonts().len(), 1);
        assert_eq!(fonts.get(a).base_font_name(), "Times-Roman");
    }

    #[test]
    fn test_unknown_font_falls_back_to_default() {
        let mut doc = Document::with_version("1.7");
        let mut fonts = registry(Some("Courier"));
        let handle = fonts.resolve(&mut doc, "Comic Sans").unwrap();
        assert_eq!(fonts.get(handle).base_font_name(), "Courier");
    }

    #[test]
    fn test_unknown_default_falls_back_to_helvetica() {
        let mut doc = Document::with_version("1.7");
        let mut fonts = registry(Some("Nope"));
        let handle = fonts.resolve(&mut doc, "AlsoNope").unwrap();
        assert_eq!(fonts.get(handle).base_font_name(), "Helvetica");
    }

    #[test]
    fn test_filter_charset() {
        let mut doc = Document::with_version("1.7");
        let mut fonts = registry(None);
        let handle = fonts.resolve(&mut doc, "Helvetica").unwrap();
        let font = fonts.get(handle);
        assert_eq!(font.filter_charset("abc ฿ é\u{E001}"), "abc ? é?");
    }

    #[test]
    fn test_text_metrics() {
        let mut doc = Document::with_version("1.7");
        let mut fonts = registry(None);
        let handle = fonts.resolve(&mut doc, "Helvetica").unwrap();
        let font = fonts.get(handle);
        // 'W' is 944 units
        assert!((font.width_of_text_at_size("W", 10.0) - 9.44).abs() < 1e-9);
        assert!((font.height_at_size(10.0) - 9.25).abs() < 1e-9);
    }
}
