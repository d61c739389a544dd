//! Document JSON round-trip tests
//!
//! A document loaded from JSON and written back must serialize to the same
//! JSON again, including elements whose tag is unknown to this crate.

use formdoc_model::element::{
    CheckBox, DateInput, Dropdown, RadioGroup, RadioOption, Rectangle, Signature, SignatureTab,
    TabType, Text, TextField,
};
use formdoc_model::{page_sizes, Document, Element, ElementBase, FieldBase, Page, Size};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;

// ============================================================================
// Fixtures
// ============================================================================

fn sample_document() -> Document {
    let mut doc = Document::with_default_page_size(page_sizes::A4);
    doc.default_font = Some("Helvetica".to_string());

    let mut page = Page::new(page_sizes::LETTER);
    page.font_size = Some(12.0);
    page.add_element(Text::new("Hello", 50.0, 700.0));
    page.add_element(TextField::new("customer.name", ElementBase::at(50.0, 650.0, 200.0, 20.0)));
    page.add_element(CheckBox::new("agree", ElementBase::at(50.0, 600.0, 12.0, 12.0)));
    page.add_element(Signature::new(
        "sig1",
        ElementBase::at(50.0, 500.0, 120.0, 30.0),
        SignatureTab {
            tab_type: Some(TabType::SignHere),
            recipient_id: Some("R1".to_string()),
            ..SignatureTab::default()
        },
    ));
    page.add_element(Element::Unknown(json!({"elemType": "hologram", "depth": 3})));
    doc.add_page(page);

    let src = doc.add_file_reference(vec![0x25u8, 0x50, 0x44, 0x46], None).unwrap();
    doc.add_page(Page::transcluded(src, 0, page_sizes::A4));
    doc
}

fn reserialize(value: &serde_json::Value) -> serde_json::Value {
    let doc = Document::from_value(value.clone()).unwrap();
    doc.to_value().unwrap()
}

// ============================================================================
// Round trips
// ============================================================================

#[test]
fn test_sample_document_round_trip_is_idempotent() {
    let first = sample_document().to_value().unwrap();
    let second = reserialize(&first);
    assert_eq!(first, second);
    assert_eq!(reserialize(&second), second);
}

#[test]
fn test_json_string_round_trip() {
    let doc = sample_document();
    let json = doc.to_json().unwrap();
    let back = Document::from_json(&json).unwrap();
    assert_eq!(doc, back);
}

#[test]
fn test_dates_are_normalized_to_iso_strings() {
    let raw = json!({
        "pages": [{
            "elements": [{"elemType": "dateinput", "id": "d1", "name": "when", "date": 1_700_000_000_000i64}]
        }],
        "fileReferences": []
    });
    let once = reserialize(&raw);
    assert_eq!(once["pages"][0]["elements"][0]["date"], "2023-11-14T22:13:20Z");
    assert_eq!(reserialize(&once), once);
}

#[test]
fn test_unknown_elements_survive_and_are_skipped() {
    let mut doc = sample_document();
    let before = doc.to_value().unwrap();
    assert_eq!(doc.set_field_value("hologram", &json!("x")), 0);
    assert_eq!(doc.to_value().unwrap(), before);
}

#[test]
fn test_field_value_coercions_per_kind() {
    let mut page = Page::new(Size::new(300.0, 300.0));
    page.add_element(Dropdown {
        field: FieldBase::named("pick"),
        options: Some(vec!["a".into(), "b".into(), "c".into()]),
        ..Dropdown::default()
    });
    page.add_element(RadioGroup {
        field: FieldBase::named("radio"),
        options: vec![RadioOption {
            option: "on".into(),
            ..RadioOption::default()
        }],
        ..RadioGroup::default()
    });
    page.add_element(DateInput {
        field: FieldBase::named("when"),
        ..DateInput::default()
    });
    page.add_element(Signature::new("sig", ElementBase::default(), SignatureTab::default()));
    page.add_element(Rectangle::default());

    page.set_field_value("pick", &json!("a, c"));
    page.set_field_value("radio", &json!("on"));
    page.set_field_value("when", &json!("2024-05-06T07:08:09Z"));
    page.set_field_value("sig", &json!(42));

    let out = serde_json::to_value(&page).unwrap();
    assert_eq!(out["elements"][0]["selectedOptions"], json!(["a", "c"]));
    assert_eq!(out["elements"][1]["selectedOption"], "on");
    assert_eq!(out["elements"][2]["date"], "2024-05-06T07:08:09Z");
    assert_eq!(out["elements"][3]["tab"]["anchorString"], "42");
}

// ============================================================================
// Property tests
// ============================================================================

fn element_strategy() -> impl Strategy<Value = Element> {
    let coord = -1000.0f64..1000.0;
    let name = "[a-z]{1,8}(\\.[a-z]{1,8}){0,2}";
    prop_oneof![
        ("[ -~]{0,20}", coord.clone(), coord.clone())
            .prop_map(|(v, x, y)| Element::from(Text::new(v, x, y))),
        (name, any::<bool>()).prop_map(|(n, checked)| {
            let mut cb = CheckBox::new(n, ElementBase::default());
            cb.checked = checked;
            Element::from(cb)
        }),
        (name, proptest::option::of("[ -~]{0,12}")).prop_map(|(n, text)| {
            let mut tf = TextField::new(n, ElementBase::at(1.0, 2.0, 3.0, 4.0));
            tf.text = text;
            Element::from(tf)
        }),
        (name, proptest::option::of("[A-Za-z0-9]{1,10}")).prop_map(|(n, anchor)| {
            Element::from(Signature::new(
                n,
                ElementBase::default(),
                SignatureTab {
                    anchor_string: anchor,
                    ..SignatureTab::default()
                },
            ))
        }),
        (coord, 0.0f64..1.0).prop_map(|(x, opacity)| {
            let mut rect = Rectangle::default();
            rect.base.x = Some(x);
            rect.drawable.opacity = Some(opacity);
            Element::from(rect)
        }),
        "[a-z]{3,10}".prop_filter_map("known tag", |tag| {
            formdoc_model::ElementType::from_tag(&tag)
                .is_none()
                .then(|| Element::Unknown(json!({"elemType": tag, "payload": [1, 2]})))
        }),
    ]
}

fn document_strategy() -> impl Strategy<Value = Document> {
    prop::collection::vec(prop::collection::vec(element_strategy(), 0..6), 0..4).prop_map(
        |pages| {
            let mut doc = Document::new();
            for elements in pages {
                let mut page = Page::new(page_sizes::A4);
                page.elements = elements;
                doc.add_page(page);
            }
            doc
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Serialize, load, serialize again: same JSON
    #[test]
    fn prop_serialization_is_idempotent(doc in document_strategy()) {
        let first = doc.to_value().unwrap();
        let second = reserialize(&first);
        prop_assert_eq!(first, second);
    }

    /// Reordering keeps the page multiset intact
    #[test]
    fn prop_reorder_keeps_page_count(n in 1usize..8, from in 0usize..10, to in 0usize..10) {
        let mut doc = Document::new();
        for _ in 0..n {
            doc.add_page(Page::new(page_sizes::A4));
        }
        doc.reorder_page(from, to);
        prop_assert_eq!(doc.page_count(), n);
    }
}
