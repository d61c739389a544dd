//! Signature placeholders and their e-signature tab metadata

use serde::{Deserialize, Serialize};

use super::{ElementBase, FieldBase, FieldStyle};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TabType {
    #[default]
    SignHere,
    InitialHere,
    DateSigned,
    FullName,
    FirstName,
    LastName,
    EmailAddress,
    PhoneNumber,
    Approve,
    Checkbox,
    RadioGroup,
    Company,
    Text,
    Title,
    Number,
    Numerical,
}

impl TabType {
    pub const ALL: [TabType; 16] = [
        TabType::SignHere,
        TabType::InitialHere,
        TabType::DateSigned,
        TabType::FullName,
        TabType::FirstName,
        TabType::LastName,
        TabType::EmailAddress,
        TabType::PhoneNumber,
        TabType::Approve,
        TabType::Checkbox,
        TabType::RadioGroup,
        TabType::Company,
        TabType::Text,
        TabType::Title,
        TabType::Number,
        TabType::Numerical,
    ];

    /// Tabs the provider renders as text, and which therefore carry font hints
    pub fn renders_text(&self) -> bool {
        matches!(
            self,
            TabType::DateSigned
                | TabType::FullName
                | TabType::FirstName
                | TabType::LastName
                | TabType::EmailAddress
                | TabType::PhoneNumber
                | TabType::Company
                | TabType::Text
                | TabType::Title
                | TabType::Number
                | TabType::Numerical
        )
    }

    /// Signing tabs (`signHere`, `initialHere`) accept stamp settings
    pub fn is_signing(&self) -> bool {
        matches!(self, TabType::SignHere | TabType::InitialHere)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorUnits {
    Pixels,
    Inches,
    Mms,
    Cms,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorHorizontalAlignment {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabStatus {
    Active,
    Signed,
    Declined,
    Na,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StampType {
    Signature,
    Stamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StampImageType {
    StampImage,
    SignatureImage,
    InitialsImage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StampFormat {
    NameHanko,
    NameDateHanko,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateStampProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_area_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_area_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_area_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_area_y: Option<f64>,
}

impl DateStampProperties {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stamp {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_stamp_properties: Option<DateStampProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disallow_user_resize_stamp: Option<bool>,
    #[serde(rename = "externalID", default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_type: Option<StampImageType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phonetic_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stamp_format: Option<StampFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stamp_image_uri: Option<String>,
    #[serde(rename = "stampSizeMM", default, skip_serializing_if = "Option::is_none")]
    pub stamp_size_mm: Option<f64>,
}

impl Stamp {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Provider tab attributes carried by a signature element.
///
/// A signature holds these twice: flattened onto the element (legacy
/// documents) and as a nested `tab` object. See
/// [`Signature::effective_tab`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureTab {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_type: Option<TabType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_allow_white_space_in_characters: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_case_sensitive: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_horizontal_alignment: Option<AnchorHorizontalAlignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_ignore_if_not_present: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_match_whole_word: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_units: Option<AnchorUnits>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_x_offset: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_y_offset: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_seal_sign_tab: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<String>,
    /// 0.5 to 2.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stamp: Option<Stamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stamp_type: Option<StampType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TabStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_group_labels: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_order: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
}

impl SignatureTab {
    /// Attributes set on `self`, falling back to `base` for the rest
    pub fn overlay(&self, base: &SignatureTab) -> SignatureTab {
        SignatureTab {
            tab_type: self.tab_type.or(base.tab_type),
            anchor_string: self
                .anchor_string
                .clone()
                .or_else(|| base.anchor_string.clone()),
            anchor_allow_white_space_in_characters: self
                .anchor_allow_white_space_in_characters
                .or(base.anchor_allow_white_space_in_characters),
            anchor_case_sensitive: self.anchor_case_sensitive.or(base.anchor_case_sensitive),
            anchor_horizontal_alignment: self
                .anchor_horizontal_alignment
                .or(base.anchor_horizontal_alignment),
            anchor_ignore_if_not_present: self
                .anchor_ignore_if_not_present
                .or(base.anchor_ignore_if_not_present),
            anchor_match_whole_word: self
                .anchor_match_whole_word
                .or(base.anchor_match_whole_word),
            anchor_units: self.anchor_units.or(base.anchor_units),
            anchor_x_offset: self.anchor_x_offset.or(base.anchor_x_offset),
            anchor_y_offset: self.anchor_y_offset.or(base.anchor_y_offset),
            caption: self.caption.clone().or_else(|| base.caption.clone()),
            is_seal_sign_tab: self.is_seal_sign_tab.or(base.is_seal_sign_tab),
            recipient_id: self
                .recipient_id
                .clone()
                .or_else(|| base.recipient_id.clone()),
            scale_value: self.scale_value.or(base.scale_value),
            stamp: self.stamp.clone().or_else(|| base.stamp.clone()),
            stamp_type: self.stamp_type.or(base.stamp_type),
            status: self.status.or(base.status),
            tab_group_labels: self
                .tab_group_labels
                .clone()
                .or_else(|| base.tab_group_labels.clone()),
            tab_id: self.tab_id.clone().or_else(|| base.tab_id.clone()),
            tab_label: self.tab_label.clone().or_else(|| base.tab_label.clone()),
            tab_order: self.tab_order.or(base.tab_order),
            tooltip: self.tooltip.clone().or_else(|| base.tooltip.clone()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    #[serde(flatten)]
    pub base: ElementBase,
    #[serde(flatten)]
    pub field: FieldBase,
    #[serde(flatten)]
    pub style: FieldStyle,
    #[serde(flatten)]
    pub legacy: SignatureTab,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab: Option<SignatureTab>,
}

impl Signature {
    pub fn new(name: impl Into<String>, base: ElementBase, tab: SignatureTab) -> Self {
        Self {
            base,
            field: FieldBase::named(name),
            tab: Some(tab),
            ..Self::default()
        }
    }

    /// Nested tab attributes win over the legacy flat ones, field by field
    pub fn effective_tab(&self) -> SignatureTab {
        match &self.tab {
            Some(tab) => tab.overlay(&self.legacy),
            None => self.legacy.clone(),
        }
    }

    pub fn tab_type(&self) -> TabType {
        self.effective_tab().tab_type.unwrap_or_default()
    }

    pub fn recipient_id(&self) -> Option<String> {
        self.effective_tab().recipient_id
    }

    /// The configured anchor, or the element id when none is set
    pub fn anchor_string(&self) -> String {
        self.effective_tab()
            .anchor_string
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.base.id.clone())
    }

    /// Writes to the nested tab when present so the new value wins
    pub fn set_anchor_string(&mut self, anchor: impl Into<String>) {
        let anchor = Some(anchor.into());
        match self.tab.as_mut() {
            Some(tab) => tab.anchor_string = anchor,
            None => self.legacy.anchor_string = anchor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_anchor_defaults_to_id() {
        let sig: Signature = serde_json::from_value(json!({"id": "sig-7", "name": "s"})).unwrap();
        assert_eq!(sig.anchor_string(), "sig-7");
        assert_eq!(sig.tab_type(), TabType::SignHere);
    }

    #[test]
    fn test_nested_tab_wins_per_field() {
        let sig: Signature = serde_json::from_value(json!({
            "name": "s",
            "anchorString": "legacy-anchor",
            "recipientId": "R1",
            "tab": {"anchorString": "nested-anchor", "tabType": "dateSigned"}
        }))
        .unwrap();
        let tab = sig.effective_tab();
        assert_eq!(tab.anchor_string.as_deref(), Some("nested-anchor"));
        assert_eq!(tab.recipient_id.as_deref(), Some("R1"));
        assert_eq!(tab.tab_type, Some(TabType::DateSigned));
    }

    #[test]
    fn test_set_anchor_targets_nested_tab() {
        let mut sig = Signature::new("s", ElementBase::default(), SignatureTab::default());
        sig.legacy.anchor_string = Some("old".to_string());
        sig.set_anchor_string("new");
        assert_eq!(sig.anchor_string(), "new");
        assert_eq!(sig.legacy.anchor_string.as_deref(), Some("old"));
    }

    #[test]
    fn test_stamp_keys() {
        let stamp: Stamp = serde_json::from_value(json!({
            "externalID": "ext",
            "stampSizeMM": 12.4,
            "imageType": "signature_image",
            "stampFormat": "NameDateHanko"
        }))
        .unwrap();
        assert_eq!(stamp.external_id.as_deref(), Some("ext"));
        assert_eq!(stamp.image_type, Some(StampImageType::SignatureImage));
        assert!(!stamp.is_empty());
        assert!(Stamp::default().is_empty());
    }

    #[test]
    fn test_tab_type_categories() {
        assert!(TabType::DateSigned.renders_text());
        assert!(TabType::Numerical.renders_text());
        assert!(!TabType::SignHere.renders_text());
        assert!(!TabType::Approve.renders_text());
        assert!(TabType::InitialHere.is_signing());
        assert_eq!(TabType::ALL.len(), 16);
    }
}
