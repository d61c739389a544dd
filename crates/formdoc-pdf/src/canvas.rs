//! Content stream builder
//!
//! A [`Canvas`] collects content operations together with the resources
//! they name, for either a page or a form XObject (widget appearances).

use std::collections::BTreeMap;

use formdoc_model::element::BlendMode;
use formdoc_model::Rgb;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Object, ObjectId, Stream};

use crate::error::GenerateError;
use crate::fonts::PdfFont;

pub(crate) fn real(v: f64) -> Object {
    Object::Real(v as f32)
}

pub(crate) fn rect_array(x: f64, y: f64, width: f64, height: f64) -> Object {
    Object::Array(vec![real(x), real(y), real(x + width), real(y + height)])
}

pub(crate) fn rgb_array(color: Rgb) -> Object {
    Object::Array(color.components().into_iter().map(real).collect())
}

/// Affine matrix `[a b c d e f]`
pub(crate) type Matrix = [f64; 6];

pub(crate) fn translate(x: f64, y: f64) -> Matrix {
    [1.0, 0.0, 0.0, 1.0, x, y]
}

pub(crate) fn rotate_degrees(degrees: f64) -> Matrix {
    let (sin, cos) = degrees.to_radians().sin_cos();
    [cos, sin, -sin, cos, 0.0, 0.0]
}

pub(crate) fn skew_degrees(x_skew: f64, y_skew: f64) -> Matrix {
    [1.0, x_skew.to_radians().tan(), y_skew.to_radians().tan(), 1.0, 0.0, 0.0]
}

pub(crate) fn scale(sx: f64, sy: f64) -> Matrix {
    [sx, 0.0, 0.0, sy, 0.0, 0.0]
}

/// Text matrix combining rotation, skew and position
pub(crate) fn text_matrix(rotate: f64, x_skew: f64, y_skew: f64, x: f64, y: f64) -> Matrix {
    let (sin, cos) = rotate.to_radians().sin_cos();
    [
        cos,
        sin + x_skew.to_radians().tan(),
        -sin + y_skew.to_radians().tan(),
        cos,
        x,
        y,
    ]
}

/// Bezier control distance for a quarter circle of radius 1
const KAPPA: f64 = 0.552_284_749_8;

#[derive(Debug, Default)]
pub struct Canvas {
    ops: Vec<Operation>,
    fonts: BTreeMap<String, ObjectId>,
    xobjects: BTreeMap<String, ObjectId>,
    ext_gstates: BTreeMap<String, Dictionary>,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn op(&mut self, operator: &str, operands: Vec<Object>) -> &mut Self {
        self.ops.push(Operation::new(operator, operands));
        self
    }

    pub fn save(&mut self) -> &mut Self {
        self.op("q", vec![])
    }

    pub fn restore(&mut self) -> &mut Self {
        self.op("Q", vec![])
    }

    pub fn concat(&mut self, m: Matrix) -> &mut Self {
        self.op("cm", m.into_iter().map(real).collect())
    }

    pub fn fill_color(&mut self, color: Rgb) -> &mut Self {
        self.op("rg", color.components().into_iter().map(real).collect())
    }

    pub fn stroke_color(&mut self, color: Rgb) -> &mut Self {
        self.op("RG", color.components().into_iter().map(real).collect())
    }

    pub fn line_width(&mut self, width: f64) -> &mut Self {
        self.op("w", vec![real(width)])
    }

    pub fn line_cap(&mut self, cap: i64) -> &mut Self {
        self.op("J", vec![Object::Integer(cap)])
    }

    pub fn dash(&mut self, array: &[f64], phase: f64) -> &mut Self {
        self.op(
            "d",
            vec![
                Object::Array(array.iter().copied().map(real).collect()),
                real(phase),
            ],
        )
    }

    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        self.op("re", vec![real(x), real(y), real(width), real(height)])
    }

    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.op("m", vec![real(x), real(y)])
    }

    pub fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.op("l", vec![real(x), real(y)])
    }

    /// Closed ellipse path centred on `(cx, cy)`
    pub fn ellipse(&mut self, cx: f64, cy: f64, rx: f64, ry: f64) -> &mut Self {
        let ox = rx * KAPPA;
        let oy = ry * KAPPA;
        let curve = |c: &mut Self, pts: [f64; 6]| {
            c.op("c", pts.into_iter().map(real).collect());
        };
        self.move_to(cx - rx, cy);
        curve(self, [cx - rx, cy + oy, cx - ox, cy + ry, cx, cy + ry]);
        curve(self, [cx + ox, cy + ry, cx + rx, cy + oy, cx + rx, cy]);
        curve(self, [cx + rx, cy - oy, cx + ox, cy - ry, cx, cy - ry]);
        curve(self, [cx - ox, cy - ry, cx - rx, cy - oy, cx - rx, cy]);
        self.op("h", vec![])
    }

    /// Paint the current path. Ends the path without painting when neither
    /// fill nor stroke is requested.
    pub fn paint(&mut self, fill: bool, stroke: bool) -> &mut Self {
        let operator = match (fill, stroke) {
            (true, true) => "B",
            (true, false) => "f",
            (false, true) => "S",
            (false, false) => "n",
        };
        self.op(operator, vec![])
    }

    /// Register `font` and select it at `size`
    pub fn set_font(&mut self, font: &PdfFont, size: f64) -> &mut Self {
        self.fonts
            .insert(font.resource_name.clone(), font.object_id);
        self.op(
            "Tf",
            vec![
                Object::Name(font.resource_name.as_bytes().to_vec()),
                real(size),
            ],
        )
    }

    /// One line of text at `(x, y)` in the current coordinate space
    pub fn show_text_at(&mut self, font: &mut PdfFont, size: f64, x: f64, y: f64, text: &str) -> &mut Self {
        let operand = font.encode_text(text);
        self.op("BT", vec![]);
        self.set_font(font, size);
        self.op("Td", vec![real(x), real(y)]);
        self.op("Tj", vec![operand]);
        self.op("ET", vec![])
    }

    /// Graphics state for opacity and blend mode; `None` when all defaults
    pub fn ext_gstate(
        &mut self,
        fill_opacity: Option<f64>,
        stroke_opacity: Option<f64>,
        blend_mode: Option<BlendMode>,
    ) -> Option<&mut Self> {
        if fill_opacity.is_none() && stroke_opacity.is_none() && blend_mode.is_none() {
            return None;
        }
        let mut gs = Dictionary::new();
        gs.set("Type", Object::Name(b"ExtGState".to_vec()));
        if let Some(ca) = fill_opacity {
            gs.set("ca", real(ca.clamp(0.0, 1.0)));
        }
        if let Some(ca) = stroke_opacity {
            gs.set("CA", real(ca.clamp(0.0, 1.0)));
        }
        if let Some(mode) = blend_mode {
            gs.set("BM", Object::Name(mode.pdf_name().as_bytes().to_vec()));
        }
        let name = format!("FdGS{}", self.ext_gstates.len());
        self.ext_gstates.insert(name.clone(), gs);
        Some(self.op("gs", vec![Object::Name(name.into_bytes())]))
    }

    /// Paint an XObject (image or form) in the current coordinate space
    pub fn draw_xobject(&mut self, id: ObjectId) -> &mut Self {
        let name = match self.xobjects.iter().find(|(_, v)| **v == id) {
            Some((name, _)) => name.clone(),
            None => {
                let name = format!("FdIm{}", self.xobjects.len());
                self.xobjects.insert(name.clone(), id);
                name
            }
        };
        self.op("Do", vec![Object::Name(name.into_bytes())])
    }

    /// Resource dictionary for the names used so far
    pub fn resources(&self) -> Dictionary {
        let mut resources = Dictionary::new();
        let refs = |map: &BTreeMap<String, ObjectId>| {
            let mut dict = Dictionary::new();
            for (name, id) in map {
                dict.set(name.as_bytes().to_vec(), Object::Reference(*id));
            }
            dict
        };
        if !self.fonts.is_empty() {
            resources.set("Font", Object::Dictionary(refs(&self.fonts)));
        }
        if !self.xobjects.is_empty() {
            resources.set("XObject", Object::Dictionary(refs(&self.xobjects)));
        }
        if !self.ext_gstates.is_empty() {
            let mut dict = Dictionary::new();
            for (name, gs) in &self.ext_gstates {
                dict.set(name.as_bytes().to_vec(), Object::Dictionary(gs.clone()));
            }
            resources.set("ExtGState", Object::Dictionary(dict));
        }
        resources
    }

    pub fn encode(&self) -> Result<Vec<u8>, GenerateError> {
        let content = Content {
            operations: self.ops.clone(),
        };
        Ok(content.encode()?)
    }

    /// Form XObject with `[0 0 width height]` as its bounding box
    pub fn into_form_xobject(self, width: f64, height: f64) -> Result<Stream, GenerateError> {
        let mut dict = Dictionary::new();
        dict.set("Type", Object::Name(b"XObject".to_vec()));
        dict.set("Subtype", Object::Name(b"Form".to_vec()));
        dict.set("FormType", Object::Integer(1));
        dict.set(
            "BBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                real(width),
                real(height),
            ]),
        );
        dict.set(
            "Matrix",
            Object::Array([1, 0, 0, 1, 0, 0].into_iter().map(Object::Integer).collect()),
        );
        dict.set("Resources", Object::Dictionary(self.resources()));
        Ok(Stream::new(dict, self.encode()?))
    }
}
