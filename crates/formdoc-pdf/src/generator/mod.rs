//! Document to PDF generation
//!
//! The generator walks the pages of a [`Document`] in order. Each page is
//! either copied from a file reference or created blank, then every element
//! is drawn onto the page content or added to the interactive form. Any
//! error aborts the run before a single byte is serialized.

mod draw;
mod fields;

use formdoc_model::{page_sizes, Document, Element, Page, Rgb, Size};
use lopdf::{Dictionary, Object, ObjectId, Stream};

use crate::canvas::{real, Canvas};
use crate::config::GenerateOptions;
use crate::error::GenerateError;
use crate::fonts::{FontHandle, FontRegistry};
use crate::form::FormBuilder;
use crate::images::ImageCache;
use crate::transclude::SourceCache;

/// Font size when neither the element, its page nor the document sets one
pub const DEFAULT_FONT_SIZE: f64 = 16.0;

/// The page being generated
pub(crate) struct PageTarget {
    pub id: ObjectId,
    pub index: usize,
    pub size: Size,
    pub canvas: Canvas,
}

/// Font, size and color an element resolves to
#[derive(Debug, Clone, Copy)]
pub(crate) struct ResolvedStyle {
    pub font: FontHandle,
    pub size: f64,
    pub color: Rgb,
}

pub struct PdfFileGenerator<'a> {
    document: &'a Document,
    out: lopdf::Document,
    fonts: FontRegistry,
    images: ImageCache,
    sources: SourceCache<'a>,
    form: FormBuilder,
    pages_id: ObjectId,
    page_ids: Vec<ObjectId>,
}

impl<'a> PdfFileGenerator<'a> {
    pub fn new(document: &'a Document, options: &GenerateOptions) -> Self {
        let mut out = lopdf::Document::with_version("1.7");
        let pages_id = out.new_object_id();
        Self {
            document,
            out,
            fonts: FontRegistry::new(options),
            images: ImageCache::new(),
            sources: SourceCache::new(document.file_references()),
            form: FormBuilder::new(),
            pages_id,
            page_ids: Vec::new(),
        }
    }

    /// Generate the whole document and serialize it
    pub fn generate(mut self) -> Result<Vec<u8>, GenerateError> {
        let document = self.document;
        for (index, page) in document.pages().iter().enumerate() {
            self.generate_page(index, page)?;
        }
        self.finish()
    }

    fn generate_page(&mut self, index: usize, page: &Page) -> Result<(), GenerateError> {
        let (id, size) = self.materialize_page(index, page)?;
        tracing::debug!(
            page = index,
            width = size.width,
            height = size.height,
            transcluded = page.is_transcluded(),
            "Generating page"
        );

        let mut target = PageTarget {
            id,
            index,
            size,
            canvas: Canvas::new(),
        };
        for element in page.elements() {
            self.generate_element(&mut target, page, element)?;
        }

        self.write_page_content(target.id, &target.canvas)?;
        self.page_ids.push(id);
        Ok(())
    }

    /// Copy the referenced page or create a blank one
    fn materialize_page(&mut self, index: usize, page: &Page) -> Result<(ObjectId, Size), GenerateError> {
        if let Some(ref_id) = &page.ref_file_id {
            let ref_index = page
                .ref_page_index
                .ok_or(GenerateError::MissingReferencePageIndex { page: index })?;
            let ref_index = usize::try_from(ref_index).map_err(|_| {
                GenerateError::NegativeReferencePageIndex {
                    page: index,
                    index: ref_index,
                }
            })?;
            return self
                .sources
                .copy_page(&mut self.out, index, ref_id, ref_index, self.pages_id);
        }

        let size = page
            .page_size
            .or(self.document.default_page_size)
            .unwrap_or(page_sizes::A4);
        let mut dict = Dictionary::new();
        dict.set("Type", Object::Name(b"Page".to_vec()));
        dict.set("Parent", Object::Reference(self.pages_id));
        dict.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                real(size.width),
                real(size.height),
            ]),
        );
        dict.set("Resources", Object::Dictionary(Dictionary::new()));
        Ok((self.out.add_object(dict), size))
    }

    fn generate_element(
        &mut self,
        target: &mut PageTarget,
        page: &Page,
        element: &Element,
    ) -> Result<(), GenerateError> {
        tracing::debug!(page = target.index, kind = element.tag(), "Generating element");
        match element {
            Element::Text(text) => self.draw_text(target, page, element, text),
            Element::Image(image) => self.draw_image(target, image),
            Element::Rectangle(rect) => self.draw_rectangle(target, rect),
            Element::Square(square) => self.draw_square(target, square),
            Element::Circle(circle) => self.draw_circle(target, circle),
            Element::Ellipse(ellipse) => self.draw_ellipse(target, ellipse),
            Element::Line(line) => self.draw_line(target, line),
            Element::SvgPath(path) => self.draw_svg_path(target, path),
            Element::TextField(field) => self.add_text_field(target, page, element, field),
            Element::DateInput(field) => self.add_date_input(target, page, element, field),
            Element::CheckBox(field) => self.add_checkbox(target, page, element, field),
            Element::Dropdown(field) => self.add_dropdown(target, page, element, field),
            Element::OptionList(field) => self.add_option_list(target, page, element, field),
            Element::RadioGroup(field) => self.add_radio_group(target, page, element, field),
            Element::Button(field) => self.add_button(target, page, element, field),
            Element::Signature(field) => self.add_signature(target, page, element, field),
            Element::Unknown(_) => {
                tracing::warn!(
                    page = target.index,
                    kind = element.tag(),
                    "Skipping unknown element type"
                );
                Ok(())
            }
        }
    }

    /// Resolve font, size and color along element, page and document
    /// defaults
    pub(crate) fn style_for(
        &mut self,
        page: &Page,
        element: &Element,
        default_size: f64,
    ) -> Result<ResolvedStyle, GenerateError> {
        let name = page
            .font_for(element)
            .or(self.document.default_font.as_deref())
            .unwrap_or(self.fonts.default_font_name())
            .to_string();
        let font = self.fonts.resolve(&mut self.out, &name)?;
        let size = page
            .font_size_for(element)
            .or(self.document.default_font_size)
            .unwrap_or(default_size);
        let color = parse_color(page.text_color_for(element)).unwrap_or(Rgb::BLACK);
        Ok(ResolvedStyle { font, size, color })
    }

    /// Append `canvas` to the page content, merging its resources
    fn write_page_content(&mut self, page_id: ObjectId, canvas: &Canvas) -> Result<(), GenerateError> {
        if canvas.is_empty() {
            return Ok(());
        }

        let page = self.out.get_object(page_id)?.as_dict()?.clone();
        let mut content = canvas.encode()?;
        let contents = match page.get(b"Contents") {
            Ok(existing) => {
                // Isolate the existing content's graphics state from ours
                let open = self.out.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
                let mut parts = vec![Object::Reference(open)];
                match existing {
                    Object::Array(items) => parts.extend(items.iter().cloned()),
                    other => parts.push(other.clone()),
                }
                let mut closed = b"Q\n".to_vec();
                closed.append(&mut content);
                parts.push(Object::Reference(
                    self.out.add_object(Stream::new(Dictionary::new(), closed)),
                ));
                Object::Array(parts)
            }
            Err(_) => Object::Reference(self.out.add_object(Stream::new(Dictionary::new(), content))),
        };

        let mut resources = match page.get(b"Resources") {
            Ok(obj) => self.resolve_dict(obj),
            Err(_) => Dictionary::new(),
        };
        for (category, entries) in canvas.resources().iter() {
            let mut merged = resources
                .get(category)
                .map(|obj| self.resolve_dict(obj))
                .unwrap_or_else(|_| Dictionary::new());
            if let Object::Dictionary(entries) = entries {
                for (name, value) in entries.iter() {
                    merged.set(name.clone(), value.clone());
                }
            }
            resources.set(category.clone(), Object::Dictionary(merged));
        }

        let page = self.out.get_object_mut(page_id)?.as_dict_mut()?;
        page.set("Contents", contents);
        page.set("Resources", Object::Dictionary(resources));
        Ok(())
    }

    /// Inline copy of a dictionary that may sit behind a reference
    fn resolve_dict(&self, obj: &Object) -> Dictionary {
        match obj {
            Object::Dictionary(dict) => dict.clone(),
            Object::Reference(id) => self
                .out
                .get_object(*id)
                .and_then(Object::as_dict)
                .cloned()
                .unwrap_or_else(|_| Dictionary::new()),
            _ => Dictionary::new(),
        }
    }

    fn finish(mut self) -> Result<Vec<u8>, GenerateError> {
        let mut pages = Dictionary::new();
        pages.set("Type", Object::Name(b"Pages".to_vec()));
        pages.set(
            "Kids",
            Object::Array(self.page_ids.iter().copied().map(Object::Reference).collect()),
        );
        pages.set("Count", Object::Integer(self.page_ids.len() as i64));
        self.out.objects.insert(self.pages_id, Object::Dictionary(pages));

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(self.pages_id));
        let catalog_id = self.out.add_object(catalog);
        self.out.trailer.set("Root", Object::Reference(catalog_id));

        let form_font = if self.form.is_empty() {
            None
        } else {
            let name = self
                .document
                .default_font
                .clone()
                .unwrap_or_else(|| self.fonts.default_font_name().to_string());
            let handle = self.fonts.resolve(&mut self.out, &name)?;
            Some(self.fonts.get(handle).clone())
        };
        self.form.finish(&mut self.out, form_font.as_ref())?;
        self.fonts.finalize(&mut self.out)?;

        self.out.compress();
        let mut buffer = Vec::new();
        self.out.save_to(&mut buffer)?;
        tracing::info!(
            pages = self.page_ids.len(),
            fonts = self.fonts.fonts().len(),
            sources = self.sources.loaded_count(),
            bytes = buffer.len(),
            "Generated PDF"
        );
        Ok(buffer)
    }
}

/// `#RRGGBB` or `#RRGGBBAA` to a color; alpha is ignored
pub(crate) fn parse_color(hex: Option<&str>) -> Option<Rgb> {
    let hex = hex?;
    let color = Rgb::from_hex(hex);
    if color.is_none() {
        tracing::warn!(color = %hex, "Ignoring malformed color");
    }
    color
}
