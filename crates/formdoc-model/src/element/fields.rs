//! Interactive form field elements

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{ElementBase, FieldBase, FieldStyle, Image};

/// Horizontal text placement inside a widget. Serialized as the PDF
/// quadding value (0, 1, 2); names are accepted on input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextAlignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Placement of a button image, same encoding as [`TextAlignment`]
pub type ImageAlignment = TextAlignment;

impl TextAlignment {
    pub fn quadding(&self) -> i64 {
        match self {
            TextAlignment::Left => 0,
            TextAlignment::Center => 1,
            TextAlignment::Right => 2,
        }
    }
}

impl Serialize for TextAlignment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.quadding())
    }
}

impl<'de> Deserialize<'de> for TextAlignment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(i64),
            Name(String),
        }
        let alignment = match Raw::deserialize(deserializer)? {
            Raw::Num(0) => TextAlignment::Left,
            Raw::Num(1) => TextAlignment::Center,
            Raw::Num(2) => TextAlignment::Right,
            Raw::Name(name) => match name.to_ascii_lowercase().as_str() {
                "left" => TextAlignment::Left,
                "center" | "centre" => TextAlignment::Center,
                "right" => TextAlignment::Right,
                other => {
                    return Err(serde::de::Error::custom(format!(
                        "unknown alignment '{other}'"
                    )))
                }
            },
            Raw::Num(other) => {
                return Err(serde::de::Error::custom(format!(
                    "alignment out of range: {other}"
                )))
            }
        };
        Ok(alignment)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberStyle {
    Decimal,
    Currency,
    Percent,
}

/// Locale-aware display format for numeric text field values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberFormat {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<NumberStyle>,
    /// ISO 4217 code, used with [`NumberStyle::Currency`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_fraction_digits: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_fraction_digits: Option<u8>,
}

impl NumberFormat {
    pub fn is_set(&self) -> bool {
        self.locale.is_some() || self.style.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextField {
    #[serde(flatten)]
    pub base: ElementBase,
    #[serde(flatten)]
    pub field: FieldBase,
    #[serde(flatten)]
    pub style: FieldStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combing: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_selection: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiline: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rich_formatting: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scrolling: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spell_checking: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<TextAlignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fit_width: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fit_height: Option<bool>,
    #[serde(flatten)]
    pub number_format: NumberFormat,
}

impl TextField {
    pub fn new(name: impl Into<String>, base: ElementBase) -> Self {
        Self {
            base,
            field: FieldBase::named(name),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateInput {
    #[serde(flatten)]
    pub base: ElementBase,
    #[serde(flatten)]
    pub field: FieldBase,
    #[serde(flatten)]
    pub style: FieldStyle,
    #[serde(
        default,
        deserialize_with = "crate::value::deserialize_opt_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<DateTime<Utc>>,
    /// Moment-style pattern such as `YYYY/MM/DD HH:mm:ss`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// IANA zone name, UTC when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combing: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiline: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scrolling: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<TextAlignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fit_width: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fit_height: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckBox {
    #[serde(flatten)]
    pub base: ElementBase,
    #[serde(flatten)]
    pub field: FieldBase,
    #[serde(flatten)]
    pub style: FieldStyle,
    #[serde(default)]
    pub checked: bool,
}

impl CheckBox {
    pub fn new(name: impl Into<String>, base: ElementBase) -> Self {
        Self {
            base,
            field: FieldBase::named(name),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dropdown {
    #[serde(flatten)]
    pub base: ElementBase,
    #[serde(flatten)]
    pub field: FieldBase,
    #[serde(flatten)]
    pub style: FieldStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub selected_options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiselect: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select_on_click: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sorted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spell_checked: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionList {
    #[serde(flatten)]
    pub base: ElementBase,
    #[serde(flatten)]
    pub field: FieldBase,
    #[serde(flatten)]
    pub style: FieldStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub selected_options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiselect: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select_on_click: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sorted: Option<bool>,
}

/// One selectable widget of a radio group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RadioOption {
    #[serde(flatten)]
    pub base: ElementBase,
    #[serde(flatten)]
    pub style: FieldStyle,
    pub option: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadioGroup {
    #[serde(flatten)]
    pub base: ElementBase,
    #[serde(flatten)]
    pub field: FieldBase,
    #[serde(flatten)]
    pub style: FieldStyle,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<RadioOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_option: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Button {
    #[serde(flatten)]
    pub base: ElementBase,
    #[serde(flatten)]
    pub field: FieldBase,
    #[serde(flatten)]
    pub style: FieldStyle,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Box<Image>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_alignment: Option<ImageAlignment>,
}
