//! Export options for tab extraction

use serde::{Deserialize, Serialize};

use crate::style::ProviderColor;

/// How the exported font color of text tabs is chosen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FontColorChoice {
    /// Nearest named color by hue
    #[default]
    Auto,
    /// White for light text, black otherwise
    BlackOrWhite,
    Fixed(ProviderColor),
}

/// What a signature without an anchor string is anchored on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnchorPolicy {
    /// The element id, which is also what the generator writes into the PDF
    #[default]
    Id,
    /// The field name, falling back to the id for unnamed fields
    Name,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportOptions {
    pub document_id: Option<String>,
    pub use_element_position: bool,
    pub use_element_size: bool,
    /// Overrides the element font for every text tab
    pub font: Option<String>,
    pub font_color: FontColorChoice,
    pub font_size: Option<f64>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub anchor_policy: AnchorPolicy,
    /// Only export signatures assigned to these recipients (all when empty)
    pub recipient_ids: Vec<String>,
    /// Only export signatures with these field names (all when empty)
    pub field_names: Vec<String>,
}

impl ExportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document_id(mut self, id: impl Into<String>) -> Self {
        self.document_id = Some(id.into());
        self
    }

    pub fn with_element_geometry(mut self, position: bool, size: bool) -> Self {
        self.use_element_position = position;
        self.use_element_size = size;
        self
    }

    pub(crate) fn accepts(&self, recipient_id: Option<&str>, name: &str) -> bool {
        let recipient_ok = self.recipient_ids.is_empty()
            || recipient_id.is_some_and(|r| self.recipient_ids.iter().any(|id| id == r));
        let name_ok = self.field_names.is_empty() || self.field_names.iter().any(|n| n == name);
        recipient_ok && name_ok
    }
}
