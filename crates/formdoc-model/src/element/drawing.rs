//! Non-field elements: text runs, images and vector shapes

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::ElementBase;
use crate::geometry::Point;
use crate::source::BinarySource;

/// PDF blend modes, spelled the way PDF names them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlendMode {
    Normal,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
}

impl BlendMode {
    pub fn pdf_name(&self) -> &'static str {
        match self {
            BlendMode::Normal => "Normal",
            BlendMode::Multiply => "Multiply",
            BlendMode::Screen => "Screen",
            BlendMode::Overlay => "Overlay",
            BlendMode::Darken => "Darken",
            BlendMode::Lighten => "Lighten",
            BlendMode::ColorDodge => "ColorDodge",
            BlendMode::ColorBurn => "ColorBurn",
            BlendMode::HardLight => "HardLight",
            BlendMode::SoftLight => "SoftLight",
            BlendMode::Difference => "Difference",
            BlendMode::Exclusion => "Exclusion",
        }
    }
}

/// Stroke end style. Serialized as the PDF operand (0, 1, 2); the names
/// `butt`, `round` and `projecting` are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineCap {
    Butt,
    Round,
    Projecting,
}

impl LineCap {
    pub fn operand(&self) -> i64 {
        match self {
            LineCap::Butt => 0,
            LineCap::Round => 1,
            LineCap::Projecting => 2,
        }
    }
}

impl Serialize for LineCap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.operand())
    }
}

impl<'de> Deserialize<'de> for LineCap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(i64),
            Name(String),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Num(0) => Ok(LineCap::Butt),
            Raw::Num(1) => Ok(LineCap::Round),
            Raw::Num(2) => Ok(LineCap::Projecting),
            Raw::Name(name) => match name.to_ascii_lowercase().as_str() {
                "butt" => Ok(LineCap::Butt),
                "round" => Ok(LineCap::Round),
                "projecting" | "square" => Ok(LineCap::Projecting),
                other => Err(serde::de::Error::custom(format!("unknown line cap '{other}'"))),
            },
            Raw::Num(other) => Err(serde::de::Error::custom(format!(
                "line cap out of range: {other}"
            ))),
        }
    }
}

/// Attributes shared by drawable elements. Skews are in degrees.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drawable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blend_mode: Option<BlendMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_skew: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_skew: Option<f64>,
}

/// Border and fill of closed shapes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeStroke {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_dash_array: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_dash_phase: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_line_cap: Option<LineCap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f64>,
    /// Fill color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Text {
    #[serde(flatten)]
    pub base: ElementBase,
    #[serde(flatten)]
    pub drawable: Drawable,
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_breaks: Option<Vec<String>>,
}

impl Text {
    pub fn new(value: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            base: ElementBase {
                x: Some(x),
                y: Some(y),
                ..ElementBase::default()
            },
            value: value.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    #[serde(flatten)]
    pub base: ElementBase,
    #[serde(flatten)]
    pub drawable: Drawable,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<BinarySource>,
    #[serde(default)]
    pub mime_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    #[serde(flatten)]
    pub base: ElementBase,
    #[serde(flatten)]
    pub drawable: Drawable,
    #[serde(flatten)]
    pub stroke: ShapeStroke,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Square {
    #[serde(flatten)]
    pub base: ElementBase,
    #[serde(flatten)]
    pub drawable: Drawable,
    #[serde(flatten)]
    pub stroke: ShapeStroke,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    #[serde(flatten)]
    pub base: ElementBase,
    #[serde(flatten)]
    pub drawable: Drawable,
    #[serde(flatten)]
    pub stroke: ShapeStroke,
    /// Radius
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ellipse {
    #[serde(flatten)]
    pub base: ElementBase,
    #[serde(flatten)]
    pub drawable: Drawable,
    #[serde(flatten)]
    pub stroke: ShapeStroke,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_scale: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_scale: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    #[serde(flatten)]
    pub base: ElementBase,
    #[serde(flatten)]
    pub drawable: Drawable,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dash_array: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dash_phase: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_cap: Option<LineCap>,
}

/// Polyline drawn through `points`. Point coordinates grow downwards from
/// the origin (`x`, `y`), which defaults to the top-left corner of the page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SvgPath {
    #[serde(flatten)]
    pub base: ElementBase,
    #[serde(flatten)]
    pub drawable: Drawable,
    #[serde(flatten)]
    pub stroke: ShapeStroke,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub points: Vec<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
}

impl SvgPath {
    /// `M x,y L x,y ...` rendering of the polyline
    pub fn path_data(&self) -> String {
        self.points
            .iter()
            .enumerate()
            .map(|(idx, pt)| {
                let op = if idx == 0 { 'M' } else { 'L' };
                format!("{op} {},{}", pt.x, pt.y)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_line_cap_accepts_numbers_and_names() {
        let cap: LineCap = serde_json::from_value(json!(1)).unwrap();
        assert_eq!(cap, LineCap::Round);
        let cap: LineCap = serde_json::from_value(json!("Projecting")).unwrap();
        assert_eq!(cap, LineCap::Projecting);
        assert!(serde_json::from_value::<LineCap>(json!(7)).is_err());
        assert_eq!(serde_json::to_value(LineCap::Butt).unwrap(), json!(0));
    }

    #[test]
    fn test_svg_path_data() {
        let path = SvgPath {
            points: vec![Point::new(0.0, 0.0), Point::new(10.0, 5.5)],
            ..SvgPath::default()
        };
        assert_eq!(path.path_data(), "M 0,0 L 10,5.5");
    }

    #[test]
    fn test_shape_flattened_keys() {
        let square: Square = serde_json::from_value(json!({
            "x": 1, "y": 2, "size": 30, "borderWidth": 2, "color": "#FF0000", "opacity": 0.5
        }))
        .unwrap();
        assert_eq!(square.size, Some(30.0));
        assert_eq!(square.stroke.border_width, Some(2.0));
        assert_eq!(square.stroke.color.as_deref(), Some("#FF0000"));
        assert_eq!(square.drawable.opacity, Some(0.5));
    }
}
