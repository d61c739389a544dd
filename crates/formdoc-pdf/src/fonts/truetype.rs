//! Custom TrueType/OpenType fonts
//!
//! Custom fonts are embedded as Type 0 composite fonts with Identity-H
//! encoding, so glyph ids double as character codes. A ToUnicode CMap maps
//! them back so text stays searchable.

use std::collections::{BTreeMap, HashMap};

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use ttf_parser::{Face, GlyphId};

use crate::error::GenerateError;
use crate::stream::flate_stream;

#[derive(Debug, Clone)]
pub struct EmbeddedFont {
    data: Vec<u8>,
    postscript_name: String,
    units_per_em: u16,
    ascender: i16,
    descender: i16,
    cap_height: i16,
    italic_angle: f32,
    bbox: (i16, i16, i16, i16),
    flags: u32,
    bold: bool,
    cmap: HashMap<char, u16>,
    /// Glyph advances in 1/1000 em, indexed by glyph id
    advances: Vec<u16>,
    /// Glyphs referenced by encoded text, with the character they render
    used: BTreeMap<u16, char>,
}

impl EmbeddedFont {
    pub fn parse(data: Vec<u8>) -> Result<Self, GenerateError> {
        if data.is_empty() {
            return Err(GenerateError::Font("font program is empty".into()));
        }
        let face = Face::parse(&data, 0).map_err(|e| GenerateError::Font(e.to_string()))?;
        let units_per_em = face.units_per_em().max(1);

        let mut cmap = HashMap::new();
        for cp in 0..=0xFFFF_u32 {
            if let Some(c) = char::from_u32(cp) {
                if let Some(gid) = face.glyph_index(c) {
                    cmap.insert(c, gid.0);
                }
            }
        }

        let advances = (0..face.number_of_glyphs())
            .map(|gid| {
                let advance = face.glyph_hor_advance(GlyphId(gid)).unwrap_or(0) as u32;
                (advance * 1000 / units_per_em as u32) as u16
            })
            .collect();

        let postscript_name = face
            .names()
            .into_iter()
            .find(|n| n.name_id == ttf_parser::name_id::POST_SCRIPT_NAME)
            .and_then(|n| n.to_string())
            .map(|n| n.chars().filter(|c| c.is_ascii_graphic()).collect::<String>())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "CustomFont".to_string());

        let mut flags = 1 << 5; // Nonsymbolic
        if face.is_monospaced() {
            flags |= 1;
        }
        if face.is_italic() {
            flags |= 1 << 6;
        }

        let bbox = face.global_bounding_box();
        Ok(Self {
            postscript_name,
            units_per_em,
            ascender: face.ascender(),
            descender: face.descender(),
            cap_height: face.capital_height().unwrap_or_else(|| face.ascender()),
            italic_angle: face.italic_angle().unwrap_or(0.0),
            bbox: (bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max),
            flags,
            bold: face.is_bold(),
            cmap,
            advances,
            used: BTreeMap::new(),
            data,
        })
    }

    pub fn postscript_name(&self) -> &str {
        &self.postscript_name
    }

    fn to_pdf_units(&self, v: i16) -> i32 {
        v as i32 * 1000 / self.units_per_em as i32
    }

    pub fn vertical_metrics(&self) -> (i32, i32) {
        (self.to_pdf_units(self.ascender), self.to_pdf_units(self.descender))
    }

    pub fn can_encode(&self, c: char) -> bool {
        self.cmap.get(&c).is_some_and(|gid| *gid != 0)
    }

    pub fn char_width(&self, c: char) -> u16 {
        self.cmap
            .get(&c)
            .and_then(|gid| self.advances.get(*gid as usize))
            .copied()
            .unwrap_or(500)
    }

    /// Two-byte glyph ids for a `Tj` operand; records the glyphs as used
    pub fn encode(&mut self, text: &str) -> Vec<u8> {
        let mut out = Vec::with_capacity(text.len() * 2);
        for c in text.chars() {
            let gid = self.cmap.get(&c).copied().unwrap_or(0);
            self.used.entry(gid).or_insert(c);
            out.extend_from_slice(&gid.to_be_bytes());
        }
        out
    }

    fn widths_array(&self) -> Object {
        let mut array = Vec::new();
        let mut iter = self.used.keys().copied().peekable();
        while let Some(start) = iter.next() {
            let mut run = vec![Object::Integer(self.advance(start) as i64)];
            let mut last = start;
            while let Some(&next) = iter.peek() {
                if next != last + 1 {
                    break;
                }
                run.push(Object::Integer(self.advance(next) as i64));
                last = next;
                iter.next();
            }
            array.push(Object::Integer(start as i64));
            array.push(Object::Array(run));
        }
        Object::Array(array)
    }

    fn advance(&self, gid: u16) -> u16 {
        self.advances.get(gid as usize).copied().unwrap_or(0)
    }

    fn to_unicode_cmap(&self) -> String {
        let mut cmap = String::from(
            "/CIDInit /ProcSet findresource begin\n\
             12 dict begin\n\
             begincmap\n\
             /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
             /CMapName /Adobe-Identity-UCS def\n\
             /CMapType 2 def\n\
             1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n",
        );
        let mappings: Vec<(u16, char)> = self
            .used
            .iter()
            .filter(|(gid, _)| **gid != 0)
            .map(|(gid, c)| (*gid, *c))
            .collect();
        for chunk in mappings.chunks(100) {
            cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
            for (gid, c) in chunk {
                let mut units = [0u16; 2];
                let hex: String = c
                    .encode_utf16(&mut units)
                    .iter()
                    .map(|u| format!("{u:04X}"))
                    .collect();
                cmap.push_str(&format!("<{gid:04X}> <{hex}>\n"));
            }
            cmap.push_str("endbfchar\n");
        }
        cmap.push_str("endcmap\nCMapName currentdict /CMap defineresource pop\nend\nend\n");
        cmap
    }

    /// Writes the font program, descriptor, CID font and ToUnicode map, and
    /// stores the Type 0 font dictionary under `font_id`
    pub fn write_objects(&self, doc: &mut Document, font_id: ObjectId) -> Result<(), GenerateError> {
        let mut file_dict = Dictionary::new();
        file_dict.set("Length1", Object::Integer(self.data.len() as i64));
        let file_id = doc.add_object(flate_stream(file_dict, &self.data)?);

        let (llx, lly, urx, ury) = self.bbox;
        let (ascent, descent) = self.vertical_metrics();
        let mut descriptor = Dictionary::new();
        descriptor.set("Type", Object::Name(b"FontDescriptor".to_vec()));
        descriptor.set("FontName", Object::Name(self.postscript_name.as_bytes().to_vec()));
        descriptor.set("Flags", Object::Integer(self.flags as i64));
        descriptor.set(
            "FontBBox",
            Object::Array(vec![
                Object::Integer(self.to_pdf_units(llx) as i64),
                Object::Integer(self.to_pdf_units(lly) as i64),
                Object::Integer(self.to_pdf_units(urx) as i64),
                Object::Integer(self.to_pdf_units(ury) as i64),
            ]),
        );
        descriptor.set("ItalicAngle", Object::Real(self.italic_angle));
        descriptor.set("Ascent", Object::Integer(ascent as i64));
        descriptor.set("Descent", Object::Integer(descent as i64));
        descriptor.set("CapHeight", Object::Integer(self.to_pdf_units(self.cap_height) as i64));
        descriptor.set("StemV", Object::Integer(if self.bold { 140 } else { 80 }));
        descriptor.set("FontFile2", Object::Reference(file_id));
        let descriptor_id = doc.add_object(descriptor);

        let mut system_info = Dictionary::new();
        system_info.set("Registry", Object::String(b"Adobe".to_vec(), StringFormat::Literal));
        system_info.set("Ordering", Object::String(b"Identity".to_vec(), StringFormat::Literal));
        system_info.set("Supplement", Object::Integer(0));

        let mut cid_font = Dictionary::new();
        cid_font.set("Type", Object::Name(b"Font".to_vec()));
        cid_font.set("Subtype", Object::Name(b"CIDFontType2".to_vec()));
        cid_font.set("BaseFont", Object::Name(self.postscript_name.as_bytes().to_vec()));
        cid_font.set("CIDSystemInfo", Object::Dictionary(system_info));
        cid_font.set("FontDescriptor", Object::Reference(descriptor_id));
        cid_font.set("CIDToGIDMap", Object::Name(b"Identity".to_vec()));
        cid_font.set("DW", Object::Integer(1000));
        cid_font.set("W", self.widths_array());
        let cid_font_id = doc.add_object(cid_font);

        let to_unicode_id = doc.add_object(Stream::new(
            Dictionary::new(),
            self.to_unicode_cmap().into_bytes(),
        ));

        let mut font = Dictionary::new();
        font.set("Type", Object::Name(b"Font".to_vec()));
        font.set("Subtype", Object::Name(b"Type0".to_vec()));
        font.set("BaseFont", Object::Name(self.postscript_name.as_bytes().to_vec()));
        font.set("Encoding", Object::Name(b"Identity-H".to_vec()));
        font.set("DescendantFonts", Object::Array(vec![Object::Reference(cid_font_id)]));
        font.set("ToUnicode", Object::Reference(to_unicode_id));
        doc.objects.insert(font_id, Object::Dictionary(font));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_program() {
        assert!(matches!(
            EmbeddedFont::parse(Vec::new()),
            Err(GenerateError::Font(_))
        ));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            EmbeddedFont::parse(b"definitely not a font".to_vec()),
            Err(GenerateError::Font(_))
        ));
    }
}
