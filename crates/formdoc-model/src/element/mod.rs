//! Page elements
//!
//! Elements form a closed sum type discriminated by the `elemType` JSON key.
//! Tags this crate does not know are kept as raw JSON in
//! [`Element::Unknown`] so newer documents survive a load/save cycle;
//! every consumer skips them.

mod drawing;
mod fields;
mod signature;

pub use drawing::{
    BlendMode, Circle, Drawable, Ellipse, Image, Line, LineCap, Rectangle, ShapeStroke, Square,
    SvgPath, Text,
};
pub use fields::{
    Button, CheckBox, DateInput, Dropdown, ImageAlignment, NumberFormat, NumberStyle, OptionList,
    RadioGroup, RadioOption, TextAlignment, TextField,
};
pub use signature::{
    AnchorHorizontalAlignment, AnchorUnits, DateStampProperties, Signature, SignatureTab, Stamp,
    StampFormat, StampImageType, StampType, TabStatus, TabType,
};

use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Discriminant of the known element kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Text,
    Image,
    Rectangle,
    Square,
    Circle,
    Ellipse,
    Line,
    SvgPath,
    TextField,
    DateInput,
    CheckBox,
    Dropdown,
    OptionList,
    RadioGroup,
    Button,
    Signature,
}

impl ElementType {
    /// Canonical `elemType` tag
    pub fn tag(&self) -> &'static str {
        match self {
            ElementType::Text => "text",
            ElementType::Image => "image",
            ElementType::Rectangle => "rectangle",
            ElementType::Square => "square",
            ElementType::Circle => "circle",
            ElementType::Ellipse => "ellipse",
            ElementType::Line => "line",
            ElementType::SvgPath => "svgpath",
            ElementType::TextField => "textfield",
            ElementType::DateInput => "dateinput",
            ElementType::CheckBox => "checkbox",
            ElementType::Dropdown => "dropdown",
            ElementType::OptionList => "optionlist",
            ElementType::RadioGroup => "radiogroup",
            ElementType::Button => "button",
            ElementType::Signature => "signature",
        }
    }

    /// Parse a tag, accepting the historical aliases `oval` and `buton`
    pub fn from_tag(tag: &str) -> Option<Self> {
        let kind = match tag {
            "text" => ElementType::Text,
            "image" => ElementType::Image,
            "rectangle" => ElementType::Rectangle,
            "square" => ElementType::Square,
            "circle" => ElementType::Circle,
            "ellipse" | "oval" => ElementType::Ellipse,
            "line" => ElementType::Line,
            "svgpath" => ElementType::SvgPath,
            "textfield" => ElementType::TextField,
            "dateinput" => ElementType::DateInput,
            "checkbox" => ElementType::CheckBox,
            "dropdown" => ElementType::Dropdown,
            "optionlist" => ElementType::OptionList,
            "radiogroup" => ElementType::RadioGroup,
            "button" | "buton" => ElementType::Button,
            "signature" => ElementType::Signature,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_field(&self) -> bool {
        matches!(
            self,
            ElementType::TextField
                | ElementType::DateInput
                | ElementType::CheckBox
                | ElementType::Dropdown
                | ElementType::OptionList
                | ElementType::RadioGroup
                | ElementType::Button
                | ElementType::Signature
        )
    }
}

pub fn new_element_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Geometry shared by every element. Rotation is in degrees,
/// counter-clockwise around (x, y); absent values use toolkit defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementBase {
    #[serde(default = "new_element_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotate: Option<f64>,
}

impl Default for ElementBase {
    fn default() -> Self {
        Self {
            id: new_element_id(),
            x: None,
            y: None,
            width: None,
            height: None,
            rotate: None,
        }
    }
}

impl ElementBase {
    pub fn at(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            width: Some(width),
            height: Some(height),
            ..Self::default()
        }
    }
}

/// Form-field identity and tri-state flags. `None` leaves the toolkit
/// default untouched; it never means "disable".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldBase {
    /// Fully qualified, dot-separated field name
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

impl FieldBase {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Visual attributes of fields (and radio options)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Text(Text),
    Image(Image),
    Rectangle(Rectangle),
    Square(Square),
    Circle(Circle),
    Ellipse(Ellipse),
    Line(Line),
    SvgPath(SvgPath),
    TextField(TextField),
    DateInput(DateInput),
    CheckBox(CheckBox),
    Dropdown(Dropdown),
    OptionList(OptionList),
    RadioGroup(RadioGroup),
    Button(Button),
    Signature(Signature),
    /// Element with a tag this version does not understand, kept verbatim
    Unknown(Value),
}

impl Element {
    /// `None` for [`Element::Unknown`]
    pub fn elem_type(&self) -> Option<ElementType> {
        let kind = match self {
            Element::Text(_) => ElementType::Text,
            Element::Image(_) => ElementType::Image,
            Element::Rectangle(_) => ElementType::Rectangle,
            Element::Square(_) => ElementType::Square,
            Element::Circle(_) => ElementType::Circle,
            Element::Ellipse(_) => ElementType::Ellipse,
            Element::Line(_) => ElementType::Line,
            Element::SvgPath(_) => ElementType::SvgPath,
            Element::TextField(_) => ElementType::TextField,
            Element::DateInput(_) => ElementType::DateInput,
            Element::CheckBox(_) => ElementType::CheckBox,
            Element::Dropdown(_) => ElementType::Dropdown,
            Element::OptionList(_) => ElementType::OptionList,
            Element::RadioGroup(_) => ElementType::RadioGroup,
            Element::Button(_) => ElementType::Button,
            Element::Signature(_) => ElementType::Signature,
            Element::Unknown(_) => return None,
        };
        Some(kind)
    }

    /// The raw `elemType` tag, including unknown ones
    pub fn tag(&self) -> &str {
        match (self.elem_type(), self) {
            (Some(kind), _) => kind.tag(),
            (None, Element::Unknown(raw)) => raw
                .get("elemType")
                .and_then(Value::as_str)
                .unwrap_or_default(),
            (None, _) => "",
        }
    }

    pub fn base(&self) -> Option<&ElementBase> {
        Some(match self {
            Element::Text(e) => &e.base,
            Element::Image(e) => &e.base,
            Element::Rectangle(e) => &e.base,
            Element::Square(e) => &e.base,
            Element::Circle(e) => &e.base,
            Element::Ellipse(e) => &e.base,
            Element::Line(e) => &e.base,
            Element::SvgPath(e) => &e.base,
            Element::TextField(e) => &e.base,
            Element::DateInput(e) => &e.base,
            Element::CheckBox(e) => &e.base,
            Element::Dropdown(e) => &e.base,
            Element::OptionList(e) => &e.base,
            Element::RadioGroup(e) => &e.base,
            Element::Button(e) => &e.base,
            Element::Signature(e) => &e.base,
            Element::Unknown(_) => return None,
        })
    }

    pub fn id(&self) -> Option<&str> {
        self.base().map(|b| b.id.as_str())
    }

    /// Field identity for field kinds
    pub fn field(&self) -> Option<&FieldBase> {
        Some(match self {
            Element::TextField(e) => &e.field,
            Element::DateInput(e) => &e.field,
            Element::CheckBox(e) => &e.field,
            Element::Dropdown(e) => &e.field,
            Element::OptionList(e) => &e.field,
            Element::RadioGroup(e) => &e.field,
            Element::Button(e) => &e.field,
            Element::Signature(e) => &e.field,
            _ => return None,
        })
    }

    pub fn field_style(&self) -> Option<&FieldStyle> {
        Some(match self {
            Element::TextField(e) => &e.style,
            Element::DateInput(e) => &e.style,
            Element::CheckBox(e) => &e.style,
            Element::Dropdown(e) => &e.style,
            Element::OptionList(e) => &e.style,
            Element::RadioGroup(e) => &e.style,
            Element::Button(e) => &e.style,
            Element::Signature(e) => &e.style,
            _ => return None,
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.field().map(|f| f.name.as_str())
    }

    pub fn as_signature(&self) -> Option<&Signature> {
        match self {
            Element::Signature(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_signature_mut(&mut self) -> Option<&mut Signature> {
        match self {
            Element::Signature(s) => Some(s),
            _ => None,
        }
    }

    fn payload_value(&self) -> Result<Value, serde_json::Error> {
        match self {
            Element::Text(e) => serde_json::to_value(e),
            Element::Image(e) => serde_json::to_value(e),
            Element::Rectangle(e) => serde_json::to_value(e),
            Element::Square(e) => serde_json::to_value(e),
            Element::Circle(e) => serde_json::to_value(e),
            Element::Ellipse(e) => serde_json::to_value(e),
            Element::Line(e) => serde_json::to_value(e),
            Element::SvgPath(e) => serde_json::to_value(e),
            Element::TextField(e) => serde_json::to_value(e),
            Element::DateInput(e) => serde_json::to_value(e),
            Element::CheckBox(e) => serde_json::to_value(e),
            Element::Dropdown(e) => serde_json::to_value(e),
            Element::OptionList(e) => serde_json::to_value(e),
            Element::RadioGroup(e) => serde_json::to_value(e),
            Element::Button(e) => serde_json::to_value(e),
            Element::Signature(e) => serde_json::to_value(e),
            Element::Unknown(raw) => Ok(raw.clone()),
        }
    }
}

impl Serialize for Element {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut value = self.payload_value().map_err(S::Error::custom)?;
        if let (Some(kind), Value::Object(map)) = (self.elem_type(), &mut value) {
            map.insert("elemType".to_string(), Value::from(kind.tag()));
        }
        value.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Element {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        let kind = raw
            .get("elemType")
            .and_then(Value::as_str)
            .and_then(ElementType::from_tag);
        let Some(kind) = kind else {
            return Ok(Element::Unknown(raw));
        };
        let parsed = match kind {
            ElementType::Text => serde_json::from_value(raw).map(Element::Text),
            ElementType::Image => serde_json::from_value(raw).map(Element::Image),
            ElementType::Rectangle => serde_json::from_value(raw).map(Element::Rectangle),
            ElementType::Square => serde_json::from_value(raw).map(Element::Square),
            ElementType::Circle => serde_json::from_value(raw).map(Element::Circle),
            ElementType::Ellipse => serde_json::from_value(raw).map(Element::Ellipse),
            ElementType::Line => serde_json::from_value(raw).map(Element::Line),
            ElementType::SvgPath => serde_json::from_value(raw).map(Element::SvgPath),
            ElementType::TextField => serde_json::from_value(raw).map(Element::TextField),
            ElementType::DateInput => serde_json::from_value(raw).map(Element::DateInput),
            ElementType::CheckBox => serde_json::from_value(raw).map(Element::CheckBox),
            ElementType::Dropdown => serde_json::from_value(raw).map(Element::Dropdown),
            ElementType::OptionList => serde_json::from_value(raw).map(Element::OptionList),
            ElementType::RadioGroup => serde_json::from_value(raw).map(Element::RadioGroup),
            ElementType::Button => serde_json::from_value(raw).map(Element::Button),
            ElementType::Signature => serde_json::from_value(raw).map(Element::Signature),
        };
        parsed.map_err(D::Error::custom)
    }
}

macro_rules! impl_from_variant {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Element {
                fn from(e: $variant) -> Self {
                    Element::$variant(e)
                }
            }
        )*
    };
}

impl_from_variant!(
    Text, Image, Rectangle, Square, Circle, Ellipse, Line, SvgPath, TextField, DateInput,
    CheckBox, Dropdown, OptionList, RadioGroup, Button, Signature,
);

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_tag_aliases() {
        assert_eq!(ElementType::from_tag("oval"), Some(ElementType::Ellipse));
        assert_eq!(ElementType::from_tag("buton"), Some(ElementType::Button));
        assert_eq!(ElementType::from_tag("hologram"), None);
    }

    #[test]
    fn test_known_element_round_trip_keeps_tag() {
        let raw = json!({
            "elemType": "checkbox",
            "id": "cb-1",
            "name": "agree",
            "x": 10,
            "y": 20,
            "checked": true
        });
        let elem: Element = serde_json::from_value(raw).unwrap();
        assert_eq!(elem.elem_type(), Some(ElementType::CheckBox));
        assert_eq!(elem.name(), Some("agree"));
        assert_eq!(elem.id(), Some("cb-1"));

        let back = serde_json::to_value(&elem).unwrap();
        assert_eq!(back["elemType"], "checkbox");
        assert_eq!(back["checked"], true);
        assert_eq!(back["x"], 10.0);
    }

    #[test]
    fn test_alias_serializes_canonical_tag() {
        let elem: Element =
            serde_json::from_value(json!({"elemType": "buton", "name": "b", "text": "Go"}))
                .unwrap();
        let back = serde_json::to_value(&elem).unwrap();
        assert_eq!(back["elemType"], "button");
    }

    #[test]
    fn test_unknown_element_is_preserved() {
        let raw = json!({"elemType": "hologram", "depth": 3});
        let elem: Element = serde_json::from_value(raw.clone()).unwrap();
        assert!(matches!(elem, Element::Unknown(_)));
        assert_eq!(elem.tag(), "hologram");
        assert_eq!(elem.elem_type(), None);
        assert_eq!(serde_json::to_value(&elem).unwrap(), raw);
    }

    #[test]
    fn test_missing_id_is_generated() {
        let elem: Element = serde_json::from_value(json!({"elemType": "text", "value": "hi"}))
            .unwrap();
        assert_eq!(elem.id().map(str::len), Some(36));
    }

    #[test]
    fn test_malformed_known_element_is_an_error() {
        let result: Result<Element, _> =
            serde_json::from_value(json!({"elemType": "checkbox", "checked": "maybe"}));
        assert!(result.is_err());
    }
}
