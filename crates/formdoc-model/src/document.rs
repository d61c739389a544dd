//! The document: ordered pages plus a table of external source files

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::element::{Element, ElementType};
use crate::error::ModelError;
use crate::geometry::Size;
use crate::page::Page;
use crate::source::BinarySource;

/// An externally supplied source document, addressed by `ref_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReference {
    pub ref_id: String,
    pub src: BinarySource,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub pages: Vec<Page>,
    #[serde(default)]
    pub file_references: Vec<FileReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_page_size: Option<Size>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_font: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_font_size: Option<f64>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_page_size(size: Size) -> Self {
        Self {
            default_page_size: Some(size),
            ..Self::default()
        }
    }

    // ------------------------------------------------------------------
    // Pages
    // ------------------------------------------------------------------

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page(&self, idx: usize) -> Option<&Page> {
        self.pages.get(idx)
    }

    pub fn page_mut(&mut self, idx: usize) -> Option<&mut Page> {
        self.pages.get_mut(idx)
    }

    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Inserts before `idx`; an index past the end appends
    pub fn insert_page(&mut self, idx: usize, page: Page) {
        let idx = idx.min(self.pages.len());
        self.pages.insert(idx, page);
    }

    pub fn delete_page(&mut self, idx: usize) -> Option<Page> {
        (idx < self.pages.len()).then(|| self.pages.remove(idx))
    }

    /// Moves the page at `from` so it ends up at `to` (clamped). Does
    /// nothing when `from` is out of range.
    pub fn reorder_page(&mut self, from: usize, to: usize) {
        if from >= self.pages.len() {
            return;
        }
        let page = self.pages.remove(from);
        let to = to.min(self.pages.len());
        self.pages.insert(to, page);
    }

    pub fn set_pages(&mut self, pages: Vec<Page>) {
        self.pages = pages;
    }

    // ------------------------------------------------------------------
    // File references
    // ------------------------------------------------------------------

    pub fn file_references(&self) -> &[FileReference] {
        &self.file_references
    }

    pub fn file_reference(&self, ref_id: &str) -> Option<&FileReference> {
        self.file_references.iter().find(|r| r.ref_id == ref_id)
    }

    /// Registers a source file and returns its id.
    ///
    /// Content already registered is not stored twice; the existing id is
    /// returned instead. Without an explicit id the SHA-256 fingerprint of
    /// the content is used.
    pub fn add_file_reference(
        &mut self,
        src: impl Into<BinarySource>,
        ref_id: Option<String>,
    ) -> Result<String, ModelError> {
        let src = src.into();
        let fingerprint = src.fingerprint();
        if let Some(existing) = self
            .file_references
            .iter()
            .find(|r| r.src.fingerprint() == fingerprint)
        {
            tracing::debug!(ref_id = %existing.ref_id, "File reference already registered");
            return Ok(existing.ref_id.clone());
        }

        let ref_id = ref_id.unwrap_or(fingerprint);
        if self.file_reference(&ref_id).is_some() {
            return Err(ModelError::FileReferenceIdInUse(ref_id));
        }
        self.file_references.push(FileReference {
            ref_id: ref_id.clone(),
            src,
        });
        Ok(ref_id)
    }

    /// Renames a file reference and repoints every page that used the old id
    pub fn change_file_reference_id(&mut self, old: &str, new: &str) -> Result<(), ModelError> {
        if old == new {
            return Ok(());
        }
        if self.file_reference(new).is_some() {
            return Err(ModelError::FileReferenceIdInUse(new.to_string()));
        }
        let entry = self
            .file_references
            .iter_mut()
            .find(|r| r.ref_id == old)
            .ok_or_else(|| ModelError::FileReferenceNotFound(old.to_string()))?;
        entry.ref_id = new.to_string();

        for page in self
            .pages
            .iter_mut()
            .filter(|p| p.ref_file_id.as_deref() == Some(old))
        {
            page.ref_file_id = Some(new.to_string());
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Fields
    // ------------------------------------------------------------------

    pub fn find_fields_by_name(&self, name: &str) -> Vec<&Element> {
        self.pages
            .iter()
            .flat_map(|p| p.find_fields_by_name(name))
            .collect()
    }

    pub fn find_elements_by_type(&self, kind: ElementType) -> Vec<&Element> {
        self.pages
            .iter()
            .flat_map(|p| p.find_elements_by_type(kind))
            .collect()
    }

    /// Broadcasts to every page; returns the number of elements changed
    pub fn set_field_value(&mut self, name: &str, value: &Value) -> usize {
        self.pages
            .iter_mut()
            .map(|p| p.set_field_value(name, value))
            .sum()
    }

    // ------------------------------------------------------------------
    // Serialization
    // ------------------------------------------------------------------

    pub fn to_value(&self) -> Result<Value, ModelError> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn to_json(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_value(value: Value) -> Result<Self, ModelError> {
        Ok(serde_json::from_value(value)?)
    }
}
