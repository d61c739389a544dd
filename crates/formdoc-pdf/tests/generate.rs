//! End-to-end generation tests
//!
//! Documents are generated to bytes and loaded back with lopdf to inspect
//! the page tree, the page content and the AcroForm.

use formdoc_model::element::{
    CheckBox, Dropdown, Image, RadioGroup, RadioOption, Rectangle, Signature, SignatureTab,
    TabType, Text, TextField,
};
use formdoc_model::{page_sizes, BinarySource, Document, Element, ElementBase, Page, Size};
use formdoc_pdf::{generate_pdf_file, GenerateError, GenerateOptions, GeneratePdf};
use lopdf::{dictionary, Dictionary, Object, Stream};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

// ============================================================================
// Fixtures
// ============================================================================

/// Two-page source whose pages print "first" and "second"
fn source_pdf() -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let mut kids = Vec::new();
    for label in ["first", "second"] {
        let content = format!("BT /F1 12 Tf 50 700 Td ({label}) Tj ET");
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
        });
        kids.push(Object::Reference(page_id));
    }
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => 2,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

fn generate(document: &Document) -> lopdf::Document {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let bytes = generate_pdf_file(document, &GenerateOptions::new()).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
    lopdf::Document::load_mem(&bytes).unwrap()
}

fn single_page(elements: Vec<Element>) -> Document {
    let mut document = Document::new();
    let mut page = Page::new(page_sizes::A4);
    for element in elements {
        page.add_element(element);
    }
    document.add_page(page);
    document
}

fn page_text(doc: &lopdf::Document, page_no: u32) -> String {
    let pages = doc.get_pages();
    let content = doc.get_page_content(pages[&page_no]).unwrap();
    String::from_utf8_lossy(&content).into_owned()
}

fn number(obj: &Object) -> f64 {
    match obj {
        Object::Integer(i) => *i as f64,
        Object::Real(r) => *r as f64,
        other => panic!("not a number: {other:?}"),
    }
}

fn acroform(doc: &lopdf::Document) -> Option<&Dictionary> {
    let id = doc.catalog().ok()?.get(b"AcroForm").ok()?.as_reference().ok()?;
    doc.get_object(id).ok()?.as_dict().ok()
}

/// Terminal or non-terminal field dictionary with partial name `partial`
fn field<'a>(doc: &'a lopdf::Document, partial: &str) -> &'a Dictionary {
    doc.objects
        .values()
        .filter_map(|obj| obj.as_dict().ok())
        .find(|dict| matches!(dict.get(b"T"), Ok(Object::String(t, _)) if t == partial.as_bytes()))
        .unwrap_or_else(|| panic!("no field named {partial}"))
}

fn normal_appearance(doc: &lopdf::Document, dict: &Dictionary) -> String {
    let ap = dict.get(b"AP").unwrap().as_dict().unwrap();
    let id = ap.get(b"N").unwrap().as_reference().unwrap();
    let stream = doc.get_object(id).unwrap().as_stream().unwrap();
    let content = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());
    String::from_utf8_lossy(&content).into_owned()
}

fn rect_width(dict: &Dictionary) -> f64 {
    let rect = dict.get(b"Rect").unwrap().as_array().unwrap();
    number(&rect[2]) - number(&rect[0])
}

// ============================================================================
// Pages
// ============================================================================

#[test]
fn test_blank_page_uses_page_size() {
    let mut document = Document::new();
    document.add_page(Page::new(page_sizes::LETTER));
    let doc = generate(&document);

    let pages = doc.get_pages();
    assert_eq!(pages.len(), 1);
    let page = doc.get_object(pages[&1]).unwrap().as_dict().unwrap();
    let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
    assert_eq!(number(&media_box[2]), 612.0);
    assert_eq!(number(&media_box[3]), 792.0);
    assert!(acroform(&doc).is_none());
}

#[test]
fn test_page_without_size_falls_back_to_document_default() {
    let mut document = Document::with_default_page_size(page_sizes::LEGAL);
    document.add_page(Page::default());
    let doc = generate(&document);

    let pages = doc.get_pages();
    let page = doc.get_object(pages[&1]).unwrap().as_dict().unwrap();
    let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
    assert_eq!(number(&media_box[3]), 1008.0);
}

#[test]
fn test_transcluded_page_keeps_source_content() {
    let mut document = Document::new();
    let ref_id = document.add_file_reference(source_pdf(), None).unwrap();
    document.add_page(Page::transcluded(ref_id, 1, page_sizes::LETTER));
    let doc = generate(&document);

    assert_eq!(doc.get_pages().len(), 1);
    let content = page_text(&doc, 1);
    assert!(content.contains("(second)"));
    assert!(!content.contains("(first)"));
    assert!(acroform(&doc).is_none());
}

#[test]
fn test_elements_are_drawn_over_transcluded_content() {
    let mut document = Document::new();
    let ref_id = document.add_file_reference(source_pdf(), None).unwrap();
    let mut page = Page::transcluded(ref_id, 0, page_sizes::LETTER);
    page.add_element(Text::new("Overlay", 50.0, 600.0));
    document.add_page(page);
    let doc = generate(&document);

    let content = page_text(&doc, 1);
    let source = content.find("(first)").unwrap();
    let overlay = content.find("(Overlay)").unwrap();
    assert!(source < overlay);
}

#[test]
fn test_same_source_page_can_be_used_twice() {
    let mut document = Document::new();
    let ref_id = document.add_file_reference(source_pdf(), None).unwrap();
    document.add_page(Page::transcluded(ref_id.clone(), 0, page_sizes::LETTER));
    document.add_page(Page::transcluded(ref_id, 0, page_sizes::LETTER));
    let doc = generate(&document);

    assert_eq!(doc.get_pages().len(), 2);
    assert!(page_text(&doc, 1).contains("(first)"));
    assert!(page_text(&doc, 2).contains("(first)"));
}

#[test]
fn test_import_then_generate() {
    let mut document = Document::new();
    let added = formdoc_pdf::import_source(&mut document, source_pdf()).unwrap();
    assert_eq!(added, vec![0, 1]);
    assert_eq!(document.page(0).unwrap().page_size, Some(Size::new(612.0, 792.0)));

    let doc = generate(&document);
    assert_eq!(doc.get_pages().len(), 2);
}

// ============================================================================
// Transclusion errors
// ============================================================================

fn transclusion_error(page: Page, with_source: bool) -> GenerateError {
    let mut document = Document::new();
    if with_source {
        document
            .add_file_reference(source_pdf(), Some("src".to_string()))
            .unwrap();
    }
    document.add_page(page);
    document.generate_pdf_file(&GenerateOptions::new()).unwrap_err()
}

#[test]
fn test_missing_reference_page_index() {
    let page = Page {
        ref_file_id: Some("src".to_string()),
        ..Page::default()
    };
    assert!(matches!(
        transclusion_error(page, true),
        GenerateError::MissingReferencePageIndex { page: 0 }
    ));
}

#[test]
fn test_negative_reference_page_index() {
    let page = Page {
        ref_file_id: Some("src".to_string()),
        ref_page_index: Some(-1),
        ..Page::default()
    };
    assert!(matches!(
        transclusion_error(page, true),
        GenerateError::NegativeReferencePageIndex { page: 0, index: -1 }
    ));
}

#[test]
fn test_unknown_file_reference() {
    let page = Page::transcluded("nowhere", 0, page_sizes::A4);
    assert!(matches!(
        transclusion_error(page, true),
        GenerateError::FileReferenceNotFound { page: 0, .. }
    ));
}

#[test]
fn test_source_page_out_of_range() {
    let page = Page::transcluded("src", 2, page_sizes::A4);
    assert!(matches!(
        transclusion_error(page, true),
        GenerateError::ReferencePageOutOfRange { index: 2, count: 2, .. }
    ));
}

// ============================================================================
// Drawing
// ============================================================================

#[test]
fn test_text_and_shapes_reach_the_page() {
    let document = single_page(vec![
        Text::new("Hello", 72.0, 720.0).into(),
        Rectangle {
            base: ElementBase::at(72.0, 600.0, 100.0, 50.0),
            ..Rectangle::default()
        }
        .into(),
    ]);
    let doc = generate(&document);
    let content = page_text(&doc, 1);
    assert!(content.contains("(Hello) Tj"));
    assert!(content.lines().any(|l| l.trim() == "f"));
}

#[test]
fn test_unsupported_image_type_aborts() {
    let image = Image {
        base: ElementBase::at(0.0, 0.0, 10.0, 10.0),
        src: Some(BinarySource::Bytes(b"GIF89a".to_vec())),
        mime_type: "image/gif".to_string(),
        ..Image::default()
    };
    let err = generate_pdf_file(&single_page(vec![image.into()]), &GenerateOptions::new()).unwrap_err();
    assert!(matches!(err, GenerateError::UnsupportedMimeType(mime) if mime == "image/gif"));
}

#[test]
fn test_unknown_elements_are_skipped() {
    let document = single_page(vec![Element::Unknown(serde_json::json!({"elemType": "hologram"}))]);
    let doc = generate(&document);
    assert_eq!(doc.get_pages().len(), 1);
}

// ============================================================================
// Fields
// ============================================================================

#[test]
fn test_hierarchical_field_names() {
    let mut city = TextField::new("customer.address.city", ElementBase::at(50.0, 700.0, 200.0, 20.0));
    city.text = Some("Lisbon".to_string());
    let zip = TextField::new("customer.address.zip", ElementBase::at(50.0, 650.0, 200.0, 20.0));
    let doc = generate(&single_page(vec![city.into(), zip.into()]));

    let form = acroform(&doc).unwrap();
    assert_eq!(form.get(b"Fields").unwrap().as_array().unwrap().len(), 1);

    let address = field(&doc, "address");
    assert_eq!(address.get(b"Kids").unwrap().as_array().unwrap().len(), 2);

    let city = field(&doc, "city");
    assert!(matches!(city.get(b"V"), Ok(Object::String(v, _)) if v == b"Lisbon"));
    assert!(normal_appearance(&doc, city).contains("(Lisbon) Tj"));
}

#[test]
fn test_duplicate_field_name_aborts() {
    let a = TextField::new("dup", ElementBase::at(0.0, 0.0, 10.0, 10.0));
    let b = CheckBox::new("dup", ElementBase::at(0.0, 20.0, 10.0, 10.0));
    let err = generate_pdf_file(&single_page(vec![a.into(), b.into()]), &GenerateOptions::new()).unwrap_err();
    assert!(matches!(err, GenerateError::DuplicateFieldName(name) if name == "dup"));
}

#[test]
fn test_malformed_field_names_abort() {
    for (name, empty) in [("", true), ("a..b", false), (".a", false)] {
        let field = TextField::new(name, ElementBase::at(0.0, 0.0, 10.0, 10.0));
        let err = generate_pdf_file(&single_page(vec![field.into()]), &GenerateOptions::new()).unwrap_err();
        if empty {
            assert!(matches!(err, GenerateError::EmptyFieldName));
        } else {
            assert!(matches!(err, GenerateError::MalformedFieldName(_)), "{name}");
        }
    }
}

#[test]
fn test_checkbox_state() {
    let mut agree = CheckBox::new("agree", ElementBase::at(50.0, 50.0, 12.0, 12.0));
    agree.checked = true;
    let doc = generate(&single_page(vec![agree.into()]));

    let dict = field(&doc, "agree");
    assert!(matches!(dict.get(b"V"), Ok(Object::Name(n)) if n == b"Yes"));
    assert!(matches!(dict.get(b"AS"), Ok(Object::Name(n)) if n == b"Yes"));
    let states = dict.get(b"AP").unwrap().as_dict().unwrap().get(b"N").unwrap().as_dict().unwrap();
    assert!(states.has(b"Yes") && states.has(b"Off"));
}

#[test]
fn test_radio_group_kids() {
    let group = RadioGroup {
        field: formdoc_model::FieldBase::named("color"),
        options: ["red", "blue"]
            .iter()
            .enumerate()
            .map(|(i, name)| RadioOption {
                base: ElementBase::at(50.0 + 60.0 * i as f64, 50.0, 20.0, 20.0),
                option: name.to_string(),
                ..RadioOption::default()
            })
            .collect(),
        selected_option: Some("blue".to_string()),
        ..RadioGroup::default()
    };
    let doc = generate(&single_page(vec![group.into()]));

    let dict = field(&doc, "color");
    assert!(matches!(dict.get(b"V"), Ok(Object::Name(n)) if n == b"blue"));
    assert_eq!(dict.get(b"Kids").unwrap().as_array().unwrap().len(), 2);

    let pages = doc.get_pages();
    let page = doc.get_object(pages[&1]).unwrap().as_dict().unwrap();
    assert_eq!(page.get(b"Annots").unwrap().as_array().unwrap().len(), 2);
}

#[test]
fn test_dropdown_custom_value_enables_edit() {
    let dropdown = Dropdown {
        base: ElementBase::at(50.0, 50.0, 150.0, 20.0),
        field: formdoc_model::FieldBase::named("pick"),
        options: Some(vec!["a".to_string(), "b".to_string()]),
        selected_options: vec!["other".to_string()],
        ..Dropdown::default()
    };
    let doc = generate(&single_page(vec![dropdown.into()]));

    let dict = field(&doc, "pick");
    let flags = match dict.get(b"Ff") {
        Ok(Object::Integer(v)) => *v,
        other => panic!("unexpected flags {other:?}"),
    };
    let combo = 1 << 17;
    let edit = 1 << 18;
    assert_eq!(flags & (combo | edit), combo | edit);
}

#[test]
fn test_signature_anchor_is_searchable() {
    let signature = Signature::new(
        "sig1",
        ElementBase::at(50.0, 100.0, 150.0, 40.0),
        SignatureTab {
            tab_type: Some(TabType::SignHere),
            anchor_string: Some("ANCHOR-1".to_string()),
            ..SignatureTab::default()
        },
    );
    let doc = generate(&single_page(vec![signature.into()]));

    let dict = field(&doc, "sig1");
    assert!(matches!(dict.get(b"FT"), Ok(Object::Name(n)) if n == b"Tx"));
    assert!(matches!(dict.get(b"V"), Ok(Object::String(v, _)) if v == b"ANCHOR-1"));
    let read_only = match dict.get(b"Ff") {
        Ok(Object::Integer(v)) => v & 1 == 1,
        _ => false,
    };
    assert!(read_only);
    assert!(normal_appearance(&doc, dict).contains("(ANCHOR-1) Tj"));
}

#[test]
fn test_signature_without_anchor_uses_element_id() {
    let mut signature = Signature::new("sig2", ElementBase::at(0.0, 0.0, 100.0, 30.0), SignatureTab::default());
    signature.base.id = "element-42".to_string();
    let doc = generate(&single_page(vec![signature.into()]));
    let dict = field(&doc, "sig2");
    assert!(matches!(dict.get(b"V"), Ok(Object::String(v, _)) if v == b"element-42"));
}

// ============================================================================
// Auto-fit
// ============================================================================

fn fitted_width(font_size: f64) -> f64 {
    let mut text = TextField::new("amount", ElementBase::at(100.0, 100.0, 80.0, 20.0));
    text.text = Some("1234.5".to_string());
    text.fit_width = Some(true);
    text.style.font_size = Some(font_size);
    let doc = generate(&single_page(vec![text.into()]));
    rect_width(field(&doc, "amount"))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_fit_width_grows_with_font_size(size in 6.0f64..40.0, step in 1.0f64..20.0) {
        prop_assert!(fitted_width(size) < fitted_width(size + step));
    }
}
