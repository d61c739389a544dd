//! A page: ordered elements plus per-page style defaults

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::element::{Element, ElementType};
use crate::geometry::Size;
use crate::value::apply_field_value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Source document this page is transcluded from
    #[serde(
        default,
        alias = "refFileID",
        skip_serializing_if = "Option::is_none"
    )]
    pub ref_file_id: Option<String>,
    /// Page index inside the source; kept signed so bad input survives
    /// loading and is reported at generation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_page_index: Option<i64>,
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<Size>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
}

impl Page {
    pub fn new(size: Size) -> Self {
        Self {
            page_size: Some(size),
            ..Self::default()
        }
    }

    /// A page whose content is copied from page `index` of file reference `ref_id`
    pub fn transcluded(ref_id: impl Into<String>, index: usize, size: Size) -> Self {
        Self {
            ref_file_id: Some(ref_id.into()),
            ref_page_index: Some(index as i64),
            page_size: Some(size),
            ..Self::default()
        }
    }

    pub fn is_transcluded(&self) -> bool {
        self.ref_file_id.is_some()
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn element(&self, idx: usize) -> Option<&Element> {
        self.elements.get(idx)
    }

    pub fn element_mut(&mut self, idx: usize) -> Option<&mut Element> {
        self.elements.get_mut(idx)
    }

    pub fn add_element(&mut self, element: impl Into<Element>) {
        self.elements.push(element.into());
    }

    /// Inserts at `idx`, appending when `idx` is past the end
    pub fn insert_element(&mut self, idx: usize, element: impl Into<Element>) {
        let idx = idx.min(self.elements.len());
        self.elements.insert(idx, element.into());
    }

    pub fn delete_element(&mut self, idx: usize) -> Option<Element> {
        (idx < self.elements.len()).then(|| self.elements.remove(idx))
    }

    /// Every field element named `name`
    pub fn find_fields_by_name(&self, name: &str) -> Vec<&Element> {
        self.elements
            .iter()
            .filter(|e| e.name() == Some(name))
            .collect()
    }

    pub fn find_elements_by_type(&self, kind: ElementType) -> Vec<&Element> {
        self.elements
            .iter()
            .filter(|e| e.elem_type() == Some(kind))
            .collect()
    }

    /// Apply `value` to every field named `name`; returns how many changed
    pub fn set_field_value(&mut self, name: &str, value: &Value) -> usize {
        self.elements
            .iter_mut()
            .filter(|e| e.name() == Some(name))
            .map(|e| apply_field_value(e, value))
            .filter(|changed| *changed)
            .count()
    }

    /// Element font, else the page default
    pub fn font_for<'a>(&'a self, element: &'a Element) -> Option<&'a str> {
        let own = match element {
            Element::Text(t) => t.font.as_deref(),
            other => other.field_style().and_then(|s| s.font.as_deref()),
        };
        own.or(self.font.as_deref())
    }

    pub fn font_size_for(&self, element: &Element) -> Option<f64> {
        let own = match element {
            Element::Text(t) => t.size,
            other => other.field_style().and_then(|s| s.font_size),
        };
        own.or(self.font_size)
    }

    pub fn text_color_for<'a>(&'a self, element: &'a Element) -> Option<&'a str> {
        let own = match element {
            Element::Text(t) => t.color.as_deref(),
            other => other.field_style().and_then(|s| s.text_color.as_deref()),
        };
        own.or(self.text_color.as_deref())
    }
}
