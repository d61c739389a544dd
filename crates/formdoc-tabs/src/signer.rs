//! Grouping of tabs into provider signers

use formdoc_model::element::TabType;
use formdoc_model::{Document, Element};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::options::ExportOptions;
use crate::tab::{create_tab, Tab, TabStyle};

/// Key of the per-type tab list on a signer, e.g. `signHereTabs`
pub fn bucket_name(tab_type: TabType) -> &'static str {
    match tab_type {
        TabType::SignHere => "signHereTabs",
        TabType::InitialHere => "initialHereTabs",
        TabType::DateSigned => "dateSignedTabs",
        TabType::FullName => "fullNameTabs",
        TabType::FirstName => "firstNameTabs",
        TabType::LastName => "lastNameTabs",
        TabType::EmailAddress => "emailAddressTabs",
        TabType::PhoneNumber => "phoneNumberTabs",
        TabType::Approve => "approveTabs",
        TabType::Checkbox => "checkboxTabs",
        TabType::RadioGroup => "radioGroupTabs",
        TabType::Company => "companyTabs",
        TabType::Text => "textTabs",
        TabType::Title => "titleTabs",
        TabType::Number => "numberTabs",
        TabType::Numerical => "numericalTabs",
    }
}

/// Signer record: either a known recipient or a placeholder keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub tabs: IndexMap<String, Vec<Tab>>,
}

impl Signer {
    fn push(&mut self, tab: Tab) {
        self.tabs
            .entry(bucket_name(tab.tab_type).to_string())
            .or_default()
            .push(tab);
    }

    /// Tabs of one type, in document order
    pub fn tabs_of(&self, tab_type: TabType) -> &[Tab] {
        self.tabs
            .get(bucket_name(tab_type))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn tab_count(&self) -> usize {
        self.tabs.values().map(Vec::len).sum()
    }
}

/// Collect every signature in `document` into signers.
///
/// Recipient signers come first in order of first appearance, followed by
/// the signers of unassigned signatures grouped by field name.
pub fn extract_signers(document: &Document, options: &ExportOptions) -> Vec<Signer> {
    let mut by_recipient: IndexMap<String, Signer> = IndexMap::new();
    let mut by_name: IndexMap<String, Signer> = IndexMap::new();

    for page in document.pages() {
        for element in page.elements() {
            let Element::Signature(signature) = element else {
                continue;
            };
            let recipient = signature.recipient_id();
            if !options.accepts(recipient.as_deref(), &signature.field.name) {
                continue;
            }

            let style = TabStyle::resolve(document, page, element);
            let tab = create_tab(signature, &style, options);
            let signer = match recipient {
                Some(id) => by_recipient.entry(id.clone()).or_insert_with(|| Signer {
                    recipient_id: Some(id),
                    ..Signer::default()
                }),
                None => {
                    let name = signature.field.name.clone();
                    by_name.entry(name.clone()).or_insert_with(|| Signer {
                        name: Some(name),
                        ..Signer::default()
                    })
                }
            };
            signer.push(tab);
        }
    }

    debug!(
        recipients = by_recipient.len(),
        unassigned = by_name.len(),
        "Extracted signers"
    );
    by_recipient.into_values().chain(by_name.into_values()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_bucket_names_are_distinct() {
        let names: HashSet<_> = TabType::ALL.iter().map(|t| bucket_name(*t)).collect();
        assert_eq!(names.len(), TabType::ALL.len());
    }

    #[test]
    fn test_bucket_name_matches_tab_type_tag() {
        for tab_type in TabType::ALL {
            let tag = serde_json::to_value(tab_type).unwrap();
            assert_eq!(bucket_name(tab_type), format!("{}Tabs", tag.as_str().unwrap()));
        }
    }

    #[test]
    fn test_missing_bucket_is_empty() {
        let signer = Signer::default();
        assert!(signer.tabs_of(TabType::Text).is_empty());
        assert_eq!(signer.tab_count(), 0);
    }
}
