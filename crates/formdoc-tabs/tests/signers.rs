//! Signer extraction over whole documents

use formdoc_model::element::TabType;
use formdoc_model::Document;
use formdoc_tabs::{
    export_signers_json, extract_signers, ExportOptions, ProviderColor, ProviderFont, ProviderFontSize,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn document() -> Document {
    Document::from_value(json!({
        "defaultFont": "Times New Roman",
        "defaultFontSize": 12,
        "pages": [
            {
                "pageSize": {"width": 612, "height": 792},
                "textColor": "#FF0000",
                "elements": [
                    {"elemType": "signature", "id": "s1", "name": "sig1", "recipientId": "R1"},
                    {"elemType": "text", "id": "t1", "value": "hello"},
                    {
                        "elemType": "signature", "id": "s2", "name": "date1",
                        "tab": {"recipientId": "R1", "tabType": "dateSigned"}
                    }
                ]
            },
            {
                "pageSize": {"width": 612, "height": 792},
                "elements": [
                    {"elemType": "signature", "id": "s3", "name": "sig3"},
                    {"elemType": "signature", "id": "s4", "name": "sig4", "recipientId": "R2"}
                ]
            }
        ]
    }))
    .unwrap()
}

// ============================================================
// Grouping
// ============================================================

#[test]
fn test_groups_by_recipient_then_name() {
    let signers = extract_signers(&document(), &ExportOptions::new());
    assert_eq!(signers.len(), 3);

    let r1 = &signers[0];
    assert_eq!(r1.recipient_id.as_deref(), Some("R1"));
    assert_eq!(r1.name, None);
    assert_eq!(r1.tabs_of(TabType::SignHere).len(), 1);
    assert_eq!(r1.tabs_of(TabType::DateSigned).len(), 1);
    assert_eq!(r1.tab_count(), 2);

    assert_eq!(signers[1].recipient_id.as_deref(), Some("R2"));

    let sig3 = &signers[2];
    assert_eq!(sig3.recipient_id, None);
    assert_eq!(sig3.name.as_deref(), Some("sig3"));
    assert_eq!(sig3.tabs_of(TabType::SignHere)[0].anchor_string.as_deref(), Some("s3"));
}

#[test]
fn test_same_type_tabs_keep_document_order() {
    let doc = Document::from_value(json!({
        "pages": [{
            "elements": [
                {"elemType": "signature", "id": "a", "name": "a", "recipientId": "R1"},
                {"elemType": "signature", "id": "b", "name": "b", "recipientId": "R1"}
            ]
        }]
    }))
    .unwrap();
    let signers = extract_signers(&doc, &ExportOptions::new());
    let anchors: Vec<_> = signers[0]
        .tabs_of(TabType::SignHere)
        .iter()
        .map(|t| t.anchor_string.clone().unwrap_or_default())
        .collect();
    assert_eq!(anchors, vec!["a".to_string(), "b".to_string()]);
}

// ============================================================
// Filters
// ============================================================

#[test]
fn test_recipient_filter() {
    let options = ExportOptions {
        recipient_ids: vec!["R2".to_string()],
        ..ExportOptions::default()
    };
    let signers = extract_signers(&document(), &options);
    assert_eq!(signers.len(), 1);
    assert_eq!(signers[0].recipient_id.as_deref(), Some("R2"));
}

#[test]
fn test_field_name_filter() {
    let options = ExportOptions {
        field_names: vec!["date1".to_string(), "sig3".to_string()],
        ..ExportOptions::default()
    };
    let signers = extract_signers(&document(), &options);
    assert_eq!(signers.len(), 2);
    assert_eq!(signers[0].tabs_of(TabType::SignHere).len(), 0);
    assert_eq!(signers[0].tabs_of(TabType::DateSigned).len(), 1);
    assert_eq!(signers[1].name.as_deref(), Some("sig3"));
}

#[test]
fn test_document_without_signatures() {
    let doc = Document::from_value(json!({"pages": [{"elements": []}]})).unwrap();
    assert!(extract_signers(&doc, &ExportOptions::new()).is_empty());
}

// ============================================================
// Style inheritance
// ============================================================

#[test]
fn test_text_tab_inherits_page_and_document_style() {
    let signers = extract_signers(&document(), &ExportOptions::new());
    let date = &signers[0].tabs_of(TabType::DateSigned)[0];
    assert_eq!(date.font, Some(ProviderFont::TimesNewRoman));
    assert_eq!(date.font_size, Some(ProviderFontSize::Size12));
    assert_eq!(date.font_color, Some(ProviderColor::BrightRed));
    assert_eq!(date.bold.as_deref(), Some("false"));
}

// ============================================================
// JSON shape
// ============================================================

#[test]
fn test_export_json_shape() {
    let options = ExportOptions::new().with_document_id("1");
    let value = export_signers_json(&document(), &options).unwrap();
    assert_eq!(
        value[0],
        json!({
            "recipientId": "R1",
            "tabs": {
                "signHereTabs": [{
                    "anchorString": "s1",
                    "documentId": "1",
                    "optional": "true",
                    "recipientId": "R1",
                    "tabType": "signHere"
                }],
                "dateSignedTabs": [{
                    "anchorString": "s2",
                    "bold": "false",
                    "documentId": "1",
                    "font": "TimesNewRoman",
                    "fontColor": "BrightRed",
                    "fontSize": "Size12",
                    "italic": "false",
                    "optional": "true",
                    "recipientId": "R1",
                    "tabType": "dateSigned"
                }]
            }
        })
    );
    assert_eq!(value[2]["name"], json!("sig3"));
    assert!(value[2].get("recipientId").is_none());
}
