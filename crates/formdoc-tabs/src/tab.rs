//! Provider tab records
//!
//! The provider takes booleans and numbers as strings, so every scalar on a
//! [`Tab`] is rendered through [`formdoc_model::numfmt`].

use formdoc_model::element::{
    AnchorHorizontalAlignment, AnchorUnits, DateStampProperties, Signature, Stamp, StampFormat,
    StampImageType, StampType, TabStatus, TabType,
};
use formdoc_model::numfmt::{bool_string, fixed_string, integer_string};
use formdoc_model::{Document, Element, Page};
use serde::{Deserialize, Serialize};

use crate::options::{AnchorPolicy, ExportOptions, FontColorChoice};
use crate::style::{is_bold_font, is_italic_font, ProviderColor, ProviderFont, ProviderFontSize};

const MIN_SCALE: f64 = 0.5;
const MAX_SCALE: f64 = 2.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_allow_white_space_in_characters: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_case_sensitive: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_horizontal_alignment: Option<AnchorHorizontalAlignment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_ignore_if_not_present: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_match_whole_word: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_units: Option<AnchorUnits>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_x_offset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_y_offset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<ProviderFont>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_color: Option<ProviderColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<ProviderFontSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_seal_sign_tab: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optional: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stamp: Option<TabStamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stamp_type: Option<StampType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TabStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab_group_labels: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab_order: Option<String>,
    pub tab_type: TabType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_position: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabStamp {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_stamp_properties: Option<TabDateStamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disallow_user_resize_stamp: Option<String>,
    #[serde(rename = "externalID", skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_type: Option<StampImageType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phonetic_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stamp_format: Option<StampFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stamp_image_uri: Option<String>,
    #[serde(rename = "stampSizeMM", skip_serializing_if = "Option::is_none")]
    pub stamp_size_mm: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabDateStamp {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_area_height: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_area_width: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_area_x: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_area_y: Option<String>,
}

impl From<&DateStampProperties> for TabDateStamp {
    fn from(props: &DateStampProperties) -> Self {
        Self {
            date_area_height: integer_string(props.date_area_height),
            date_area_width: integer_string(props.date_area_width),
            date_area_x: integer_string(props.date_area_x),
            date_area_y: integer_string(props.date_area_y),
        }
    }
}

impl From<&Stamp> for TabStamp {
    fn from(stamp: &Stamp) -> Self {
        Self {
            custom_field: stamp.custom_field.clone(),
            date_stamp_properties: stamp
                .date_stamp_properties
                .as_ref()
                .filter(|p| !p.is_empty())
                .map(TabDateStamp::from),
            disallow_user_resize_stamp: bool_string(stamp.disallow_user_resize_stamp),
            external_id: stamp.external_id.clone(),
            image_base64: stamp.image_base64.clone(),
            image_type: stamp.image_type,
            phonetic_name: stamp.phonetic_name.clone(),
            signature_name: stamp.signature_name.clone(),
            stamp_format: stamp.stamp_format,
            stamp_image_uri: stamp.stamp_image_uri.clone(),
            stamp_size_mm: integer_string(stamp.stamp_size_mm),
        }
    }
}

/// Text styling of a signature after page and document defaults
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabStyle {
    pub font: Option<String>,
    pub font_size: Option<f64>,
    pub text_color: Option<String>,
}

impl TabStyle {
    pub fn resolve(document: &Document, page: &Page, element: &Element) -> Self {
        Self {
            font: page
                .font_for(element)
                .or(document.default_font.as_deref())
                .map(str::to_string),
            font_size: page.font_size_for(element).or(document.default_font_size),
            text_color: page.text_color_for(element).map(str::to_string),
        }
    }
}

fn anchor_for(signature: &Signature, policy: AnchorPolicy) -> String {
    let configured = signature
        .effective_tab()
        .anchor_string
        .filter(|s| !s.is_empty());
    match (configured, policy) {
        (Some(anchor), _) => anchor,
        (None, AnchorPolicy::Name) if !signature.field.name.is_empty() => signature.field.name.clone(),
        (None, _) => signature.anchor_string(),
    }
}

fn font_color(style: &TabStyle, choice: FontColorChoice) -> ProviderColor {
    let hex = style.text_color.as_deref();
    match choice {
        FontColorChoice::Auto => ProviderColor::from_hex(hex),
        FontColorChoice::BlackOrWhite => ProviderColor::black_or_white(hex),
        FontColorChoice::Fixed(color) => color,
    }
}

/// Build the provider tab for one signature element
pub fn create_tab(signature: &Signature, style: &TabStyle, options: &ExportOptions) -> Tab {
    let attrs = signature.effective_tab();
    let tab_type = attrs.tab_type.unwrap_or_default();
    let base = &signature.base;

    let mut tab = Tab {
        anchor_allow_white_space_in_characters: bool_string(attrs.anchor_allow_white_space_in_characters),
        anchor_case_sensitive: bool_string(attrs.anchor_case_sensitive),
        anchor_horizontal_alignment: attrs.anchor_horizontal_alignment,
        anchor_ignore_if_not_present: bool_string(attrs.anchor_ignore_if_not_present),
        anchor_match_whole_word: bool_string(attrs.anchor_match_whole_word),
        anchor_string: Some(anchor_for(signature, options.anchor_policy)),
        anchor_units: attrs.anchor_units,
        anchor_x_offset: integer_string(attrs.anchor_x_offset),
        anchor_y_offset: integer_string(attrs.anchor_y_offset),
        caption: attrs.caption,
        document_id: options.document_id.clone(),
        optional: (signature.field.required != Some(true)).then(|| "true".to_string()),
        recipient_id: attrs.recipient_id,
        scale_value: fixed_string(attrs.scale_value.map(|v| v.clamp(MIN_SCALE, MAX_SCALE)), Some(2)),
        status: attrs.status,
        tab_group_labels: attrs.tab_group_labels,
        tab_id: attrs.tab_id,
        tab_label: attrs.tab_label,
        tab_order: integer_string(attrs.tab_order),
        tab_type,
        tooltip: attrs.tooltip,
        ..Tab::default()
    };

    if tab_type.is_signing() {
        tab.is_seal_sign_tab = bool_string(attrs.is_seal_sign_tab);
        tab.stamp_type = attrs.stamp_type;
        tab.stamp = attrs.stamp.as_ref().filter(|s| !s.is_empty()).map(TabStamp::from);
    }

    if tab_type.renders_text() {
        let font = options.font.as_deref().or(style.font.as_deref());
        tab.font = Some(ProviderFont::from_font_name(font));
        tab.font_size = Some(ProviderFontSize::from_font_size(options.font_size.or(style.font_size)));
        tab.font_color = Some(font_color(style, options.font_color));
        tab.bold = bool_string(Some(options.bold.unwrap_or_else(|| is_bold_font(font))));
        tab.italic = bool_string(Some(options.italic.unwrap_or_else(|| is_italic_font(font))));
    }

    if options.use_element_size && tab_type != TabType::SignHere {
        tab.width = integer_string(base.width);
        tab.height = integer_string(base.height);
    }

    if options.use_element_position {
        tab.x_position = integer_string(base.x);
        tab.y_position = integer_string(base.y);
    }

    tab
}
