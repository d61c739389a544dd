//! E-signature tab export
//!
//! Every signature element of a document becomes a provider tab, anchored on
//! the text the PDF generator draws for it. Tabs are grouped into signers by
//! recipient id, or by field name for unassigned signatures.

pub mod options;
pub mod signer;
pub mod style;
pub mod tab;

pub use options::{AnchorPolicy, ExportOptions, FontColorChoice};
pub use signer::{bucket_name, extract_signers, Signer};
pub use style::{ProviderColor, ProviderFont, ProviderFontSize};
pub use tab::{create_tab, Tab, TabDateStamp, TabStamp, TabStyle};

use formdoc_model::Document;

/// Signers as the provider's JSON array
pub fn export_signers_json(
    document: &Document,
    options: &ExportOptions,
) -> Result<serde_json::Value, serde_json::Error> {
    serde_json::to_value(extract_signers(document, options))
}
