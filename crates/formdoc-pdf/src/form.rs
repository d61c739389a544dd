//! Interactive form (AcroForm) construction
//!
//! Field names are hierarchical: `customer.address.city` creates the
//! non-terminal fields `customer` and `customer.address` and the terminal
//! field `city` below them. Terminal fields and their single widget share
//! one dictionary; radio groups keep one widget per option under `Kids`.

use std::collections::{BTreeMap, HashMap, HashSet};

use bitflags::bitflags;
use formdoc_model::{FieldBase, Rgb};
use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};

use crate::canvas::{real, rect_array, rgb_array};
use crate::error::GenerateError;
use crate::fonts::PdfFont;
use crate::layout::{rotated_bounds, Rect};

bitflags! {
    /// Field flags (`/Ff`)
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FieldFlags: u32 {
        const READ_ONLY = 1 << 0;
        const REQUIRED = 1 << 1;
        const NO_EXPORT = 1 << 2;
        const MULTILINE = 1 << 12;
        const PASSWORD = 1 << 13;
        const NO_TOGGLE_TO_OFF = 1 << 14;
        const RADIO = 1 << 15;
        const PUSHBUTTON = 1 << 16;
        const COMBO = 1 << 17;
        const EDIT = 1 << 18;
        const SORT = 1 << 19;
        const FILE_SELECT = 1 << 20;
        const MULTI_SELECT = 1 << 21;
        const DO_NOT_SPELL_CHECK = 1 << 22;
        const DO_NOT_SCROLL = 1 << 23;
        const COMB = 1 << 24;
        const RICH_TEXT = 1 << 25;
        const COMMIT_ON_SEL_CHANGE = 1 << 26;
    }
}

impl FieldFlags {
    /// Apply a tri-state option: `None` leaves the flag as it is
    pub fn apply(&mut self, flag: FieldFlags, value: Option<bool>) {
        if let Some(enabled) = value {
            self.set(flag, enabled);
        }
    }

    /// `exported`, `readOnly` and `required` of a field
    pub fn apply_common(&mut self, field: &FieldBase) {
        self.apply(FieldFlags::NO_EXPORT, field.exported.map(|e| !e));
        self.apply(FieldFlags::READ_ONLY, field.read_only);
        self.apply(FieldFlags::REQUIRED, field.required);
    }
}

/// Annotation flag: print the widget
const ANNOT_PRINT: i64 = 1 << 2;
/// Annotation flag: do not display the widget
const ANNOT_HIDDEN: i64 = 1 << 1;

pub(crate) fn annotation_flags(hidden: Option<bool>) -> Object {
    let mut flags = ANNOT_PRINT;
    if hidden == Some(true) {
        flags |= ANNOT_HIDDEN;
    }
    Object::Integer(flags)
}

/// Placement and frame of one widget annotation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Widget {
    pub page: ObjectId,
    /// Unrotated field rectangle; rotation turns it around `(x, y)`
    pub rect: Rect,
    pub rotate: f64,
    pub background: Option<Rgb>,
    pub border: Option<Rgb>,
    pub border_width: f64,
    pub hidden: Option<bool>,
}

impl Widget {
    /// Write the annotation entries into `dict`
    pub fn annotate(&self, dict: &mut Dictionary) {
        dict.set("Type", Object::Name(b"Annot".to_vec()));
        dict.set("Subtype", Object::Name(b"Widget".to_vec()));
        let bounds = rotated_bounds(self.rect, self.rotate);
        dict.set("Rect", rect_array(bounds.x, bounds.y, bounds.width, bounds.height));
        dict.set("P", Object::Reference(self.page));
        dict.set("F", annotation_flags(self.hidden));

        let mut mk = match dict.remove(b"MK") {
            Some(Object::Dictionary(mk)) => mk,
            _ => Dictionary::new(),
        };
        if let Some(bg) = self.background {
            mk.set("BG", rgb_array(bg));
        }
        if let Some(bc) = self.border {
            mk.set("BC", rgb_array(bc));
        }
        dict.set("MK", Object::Dictionary(mk));

        let mut bs = Dictionary::new();
        bs.set("W", real(self.border_width));
        dict.set("BS", Object::Dictionary(bs));
    }
}

/// Default appearance string selecting `font` at `size` in `color`
pub fn default_appearance(font: &PdfFont, size: f64, color: Rgb) -> Object {
    let [r, g, b] = color.components();
    let da = format!("/{} {} Tf {} {} {} rg", font.resource_name, size, r, g, b);
    Object::String(da.into_bytes(), StringFormat::Literal)
}

/// Text string: PDFDocEncoding-compatible ASCII as a literal, anything
/// else as UTF-16BE with a byte order mark
pub fn pdf_text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::String(text.as_bytes().to_vec(), StringFormat::Literal);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Split a fully qualified field name into its non-terminal parts and the
/// terminal part
pub fn split_field_name(name: &str) -> Result<(Vec<&str>, &str), GenerateError> {
    if name.is_empty() {
        return Err(GenerateError::EmptyFieldName);
    }
    let mut parts: Vec<&str> = name.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        return Err(GenerateError::MalformedFieldName(name.to_string()));
    }
    let terminal = parts.pop().unwrap_or(name);
    Ok((parts, terminal))
}

struct NonTerminal {
    id: ObjectId,
    partial: String,
    parent: Option<ObjectId>,
    kids: Vec<ObjectId>,
}

/// A reserved slot for a terminal field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSlot {
    pub id: ObjectId,
    pub parent: Option<ObjectId>,
}

#[derive(Default)]
pub struct FormBuilder {
    terminals: HashSet<String>,
    non_terminals: BTreeMap<String, NonTerminal>,
    roots: Vec<ObjectId>,
    fonts: HashMap<String, ObjectId>,
}

impl FormBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Reserve an object id for the terminal field `name`, creating its
    /// non-terminal ancestors on the way
    pub fn reserve(&mut self, doc: &mut Document, name: &str) -> Result<(FieldSlot, String), GenerateError> {
        let (ancestors, terminal) = split_field_name(name)?;
        if self.terminals.contains(name) || self.non_terminals.contains_key(name) {
            return Err(GenerateError::DuplicateFieldName(name.to_string()));
        }

        let mut parent: Option<ObjectId> = None;
        let mut qualified = String::new();
        for part in ancestors {
            if !qualified.is_empty() {
                qualified.push('.');
            }
            qualified.push_str(part);
            if self.terminals.contains(&qualified) {
                return Err(GenerateError::DuplicateFieldName(qualified));
            }
            let id = match self.non_terminals.get(&qualified) {
                Some(node) => node.id,
                None => {
                    let id = doc.new_object_id();
                    self.attach(parent, id);
                    self.non_terminals.insert(
                        qualified.clone(),
                        NonTerminal {
                            id,
                            partial: part.to_string(),
                            parent,
                            kids: Vec::new(),
                        },
                    );
                    id
                }
            };
            parent = Some(id);
        }

        let id = doc.new_object_id();
        self.attach(parent, id);
        self.terminals.insert(name.to_string());
        Ok((FieldSlot { id, parent }, terminal.to_string()))
    }

    fn attach(&mut self, parent: Option<ObjectId>, kid: ObjectId) {
        match parent.and_then(|p| self.non_terminals.values_mut().find(|n| n.id == p)) {
            Some(node) => node.kids.push(kid),
            None => self.roots.push(kid),
        }
    }

    /// Remember a font used by a field's default appearance
    pub fn use_font(&mut self, font: &PdfFont) {
        self.fonts
            .insert(font.resource_name.clone(), font.object_id);
    }

    /// Write non-terminal fields and the AcroForm dictionary. Does nothing
    /// when no field was created.
    pub fn finish(self, doc: &mut Document, default_font: Option<&PdfFont>) -> Result<(), GenerateError> {
        if self.roots.is_empty() {
            return Ok(());
        }

        for node in self.non_terminals.values() {
            let mut dict = Dictionary::new();
            dict.set("T", pdf_text_string(&node.partial));
            dict.set(
                "Kids",
                Object::Array(node.kids.iter().copied().map(Object::Reference).collect()),
            );
            if let Some(parent) = node.parent {
                dict.set("Parent", Object::Reference(parent));
            }
            doc.objects.insert(node.id, Object::Dictionary(dict));
        }

        let mut fonts = Dictionary::new();
        for (name, id) in &self.fonts {
            fonts.set(name.as_bytes().to_vec(), Object::Reference(*id));
        }
        if let Some(font) = default_font {
            fonts.set(font.resource_name.as_bytes().to_vec(), Object::Reference(font.object_id));
        }
        let mut resources = Dictionary::new();
        resources.set("Font", Object::Dictionary(fonts));

        let mut acroform = Dictionary::new();
        acroform.set(
            "Fields",
            Object::Array(self.roots.iter().copied().map(Object::Reference).collect()),
        );
        acroform.set("DR", Object::Dictionary(resources));
        if let Some(font) = default_font {
            let da = format!("/{} 0 Tf 0 g", font.resource_name);
            acroform.set("DA", Object::String(da.into_bytes(), StringFormat::Literal));
        }
        acroform.set("NeedAppearances", Object::Boolean(false));
        let acroform_id = doc.add_object(acroform);

        let catalog = doc.catalog_mut()?;
        catalog.set("AcroForm", Object::Reference(acroform_id));
        tracing::debug!(fields = self.terminals.len(), "Wrote AcroForm");
        Ok(())
    }
}

/// Push `annot_id` onto the page's `/Annots`
pub fn add_annotation_to_page(
    doc: &mut Document,
    page_id: ObjectId,
    annot_id: ObjectId,
) -> Result<(), GenerateError> {
    let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
    if let Ok(Object::Array(ref mut arr)) = page.get_mut(b"Annots") {
        arr.push(Object::Reference(annot_id));
    } else {
        page.set("Annots", Object::Array(vec![Object::Reference(annot_id)]));
    }
    Ok(())
}
