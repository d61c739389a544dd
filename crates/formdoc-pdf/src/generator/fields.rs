//! Interactive form fields
//!
//! Every field reserves its name first so that duplicates fail before
//! anything is written. Terminal fields and their widget share one
//! dictionary; radio groups get one kid widget per option.

use formdoc_model::element::{
    Button, CheckBox, DateInput, Dropdown, OptionList, RadioGroup, Signature, TextAlignment,
    TextField,
};
use formdoc_model::{Element, ElementBase, FieldStyle, Page, Rgb};
use lopdf::{Dictionary, Object, ObjectId};

use super::{parse_color, PageTarget, PdfFileGenerator, ResolvedStyle, DEFAULT_FONT_SIZE};
use crate::appearance::{self, TextOptions, WidgetLook};
use crate::canvas::{real, rotate_degrees, Canvas};
use crate::error::GenerateError;
use crate::fonts::FontHandle;
use crate::form::{add_annotation_to_page, default_appearance, pdf_text_string, FieldFlags, FieldSlot, Widget};
use crate::format::{format_date, format_number_text};
use crate::layout::{fit_to_content, Rect, TextExtent};

const TEXT_FIELD_SIZE: (f64, f64) = (200.0, 50.0);
const OPTION_LIST_SIZE: (f64, f64) = (200.0, 100.0);
const TOGGLE_SIZE: (f64, f64) = (50.0, 50.0);
const BUTTON_SIZE: (f64, f64) = (100.0, 50.0);
const SIGNATURE_SIZE: (f64, f64) = (150.0, 100.0);

/// Anchor text size when the signature sets none
const SIGNATURE_FONT_SIZE: f64 = 6.0;

const ON_STATE: &[u8] = b"Yes";
const OFF_STATE: &[u8] = b"Off";

/// Field rectangle with per-kind default size
fn field_rect(base: &ElementBase, default: (f64, f64)) -> Rect {
    Rect::new(
        base.x.unwrap_or(0.0),
        base.y.unwrap_or(0.0),
        base.width.unwrap_or(default.0),
        base.height.unwrap_or(default.1),
    )
}

fn widget_for(page: ObjectId, rect: Rect, base: &ElementBase, style: &FieldStyle) -> Widget {
    Widget {
        page,
        rect,
        rotate: base.rotate.unwrap_or(0.0),
        background: parse_color(style.background_color.as_deref()),
        border: parse_color(style.border_color.as_deref()),
        border_width: style.border_width.unwrap_or(0.0),
        hidden: style.hidden,
    }
}

fn look_for(widget: &Widget, text_color: Rgb) -> WidgetLook {
    WidgetLook {
        width: widget.rect.width,
        height: widget.rect.height,
        background: widget.background,
        border: widget.border,
        border_width: widget.border_width,
        text_color,
    }
}

/// `/V` of a choice field: one string, an array, or nothing
fn selection_value(selected: &[String]) -> Option<Object> {
    match selected {
        [] => None,
        [one] => Some(pdf_text_string(one)),
        many => Some(Object::Array(many.iter().map(|s| pdf_text_string(s)).collect())),
    }
}

fn field_dict(ft: &[u8], partial: &str, slot: FieldSlot, flags: FieldFlags) -> Dictionary {
    let mut dict = Dictionary::new();
    dict.set("FT", Object::Name(ft.to_vec()));
    dict.set("T", pdf_text_string(partial));
    if let Some(parent) = slot.parent {
        dict.set("Parent", Object::Reference(parent));
    }
    dict.set("Ff", Object::Integer(flags.bits() as i64));
    dict
}

/// Content of a text field or date input widget
struct TextWidget<'t> {
    ft: &'static [u8],
    flags: FieldFlags,
    text: &'t str,
    value: Option<Object>,
    alignment: TextAlignment,
    max_length: Option<u32>,
}

impl PdfFileGenerator<'_> {
    /// Register an appearance canvas as a form XObject. Rotated widgets
    /// rotate the appearance through its `/Matrix`.
    fn appearance_stream(&mut self, canvas: Canvas, widget: &Widget) -> Result<ObjectId, GenerateError> {
        let mut stream = canvas.into_form_xobject(widget.rect.width, widget.rect.height)?;
        if widget.rotate != 0.0 {
            stream.dict.set(
                "Matrix",
                Object::Array(rotate_degrees(widget.rotate).into_iter().map(real).collect()),
            );
        }
        Ok(self.out.add_object(stream))
    }

    /// Write the merged field/widget dictionary and attach it to the page
    fn commit_widget(
        &mut self,
        target: &PageTarget,
        id: ObjectId,
        mut dict: Dictionary,
        widget: &Widget,
        normal: Object,
        font: Option<FontHandle>,
    ) -> Result<(), GenerateError> {
        widget.annotate(&mut dict);
        let mut ap = Dictionary::new();
        ap.set("N", normal);
        dict.set("AP", Object::Dictionary(ap));
        self.out.objects.insert(id, Object::Dictionary(dict));
        add_annotation_to_page(&mut self.out, target.id, id)?;
        if let Some(handle) = font {
            self.form.use_font(self.fonts.get(handle));
        }
        Ok(())
    }

    /// Field rectangle, resized to the display text when the element opts in
    fn fitted_rect(
        &self,
        base: &ElementBase,
        field_style: &FieldStyle,
        style: ResolvedStyle,
        text: &str,
        alignment: TextAlignment,
        fit: (Option<bool>, Option<bool>),
    ) -> Rect {
        let rect = field_rect(base, TEXT_FIELD_SIZE);
        let (fit_width, fit_height) = (fit.0.unwrap_or(false), fit.1.unwrap_or(false));
        if !fit_width && !fit_height {
            return rect;
        }
        let font = self.fonts.get(style.font);
        let extent = TextExtent {
            width: font.width_of_text_at_size(text, style.size),
            font_height: font.height_at_size(style.size),
            font_size: style.size,
        };
        fit_to_content(
            rect,
            extent,
            field_style.border_width.unwrap_or(0.0),
            alignment,
            fit_width,
            fit_height,
        )
    }

    fn add_text_widget(
        &mut self,
        target: &PageTarget,
        slot: FieldSlot,
        partial: &str,
        widget: &Widget,
        style: ResolvedStyle,
        content: TextWidget<'_>,
    ) -> Result<(), GenerateError> {
        let mut dict = field_dict(content.ft, partial, slot, content.flags);
        let font = self.fonts.get_mut(style.font);
        dict.set("DA", default_appearance(font, style.size, style.color));
        dict.set("Q", Object::Integer(content.alignment.quadding()));
        if let Some(value) = content.value {
            dict.set("V", value);
        }
        if let Some(max) = content.max_length {
            dict.set("MaxLen", Object::Integer(max as i64));
        }

        let comb = if content.flags.contains(FieldFlags::COMB) {
            if content.max_length.is_none() {
                tracing::warn!(field = %partial, "Comb field without max length is drawn as plain text");
            }
            content.max_length
        } else {
            None
        };
        let canvas = appearance::text_field(
            &look_for(widget, style.color),
            font,
            &TextOptions {
                text: content.text,
                size: style.size,
                alignment: content.alignment,
                multiline: content.flags.contains(FieldFlags::MULTILINE),
                comb,
                password: content.flags.contains(FieldFlags::PASSWORD),
            },
        );
        let ap = self.appearance_stream(canvas, widget)?;
        self.commit_widget(target, slot.id, dict, widget, Object::Reference(ap), Some(style.font))
    }

    pub(super) fn add_text_field(
        &mut self,
        target: &mut PageTarget,
        page: &Page,
        element: &Element,
        field: &TextField,
    ) -> Result<(), GenerateError> {
        let (slot, partial) = self.form.reserve(&mut self.out, &field.field.name)?;
        let style = self.style_for(page, element, DEFAULT_FONT_SIZE)?;

        let raw = field.text.as_deref().unwrap_or_default();
        let formatted = if field.number_format.is_set() {
            format_number_text(raw, &field.number_format)
        } else {
            raw.to_string()
        };
        let text = self.fonts.get(style.font).filter_charset(&formatted);
        let alignment = field.alignment.unwrap_or(TextAlignment::Left);
        let rect = self.fitted_rect(
            &field.base,
            &field.style,
            style,
            &text,
            alignment,
            (field.fit_width, field.fit_height),
        );

        let mut flags = FieldFlags::empty();
        flags.apply_common(&field.field);
        flags.apply(FieldFlags::COMB, field.combing);
        flags.apply(FieldFlags::FILE_SELECT, field.file_selection);
        flags.apply(FieldFlags::MULTILINE, field.multiline);
        flags.apply(FieldFlags::PASSWORD, field.password);
        flags.apply(FieldFlags::RICH_TEXT, field.rich_formatting);
        flags.apply(FieldFlags::DO_NOT_SCROLL, field.scrolling.map(|s| !s));
        flags.apply(FieldFlags::DO_NOT_SPELL_CHECK, field.spell_checking.map(|s| !s));

        let widget = widget_for(target.id, rect, &field.base, &field.style);
        let value = (!text.is_empty()).then(|| pdf_text_string(&text));
        self.add_text_widget(
            target,
            slot,
            &partial,
            &widget,
            style,
            TextWidget {
                ft: b"Tx",
                flags,
                text: &text,
                value,
                alignment,
                max_length: field.max_length,
            },
        )
    }

    pub(super) fn add_date_input(
        &mut self,
        target: &mut PageTarget,
        page: &Page,
        element: &Element,
        field: &DateInput,
    ) -> Result<(), GenerateError> {
        let (slot, partial) = self.form.reserve(&mut self.out, &field.field.name)?;
        let style = self.style_for(page, element, DEFAULT_FONT_SIZE)?;

        let formatted = field
            .date
            .map(|date| format_date(date, field.format.as_deref(), field.timezone.as_deref()))
            .unwrap_or_default();
        let text = self.fonts.get(style.font).filter_charset(&formatted);
        let alignment = field.alignment.unwrap_or(TextAlignment::Left);
        let rect = self.fitted_rect(
            &field.base,
            &field.style,
            style,
            &text,
            alignment,
            (field.fit_width, field.fit_height),
        );

        // Dates are plain, spell-check free text
        let mut flags = FieldFlags::DO_NOT_SPELL_CHECK;
        flags.apply_common(&field.field);
        flags.apply(FieldFlags::COMB, field.combing);
        flags.apply(FieldFlags::MULTILINE, field.multiline);
        flags.apply(FieldFlags::DO_NOT_SCROLL, field.scrolling.map(|s| !s));

        let widget = widget_for(target.id, rect, &field.base, &field.style);
        let value = (!text.is_empty()).then(|| pdf_text_string(&text));
        self.add_text_widget(
            target,
            slot,
            &partial,
            &widget,
            style,
            TextWidget {
                ft: b"Tx",
                flags,
                text: &text,
                value,
                alignment,
                max_length: field.max_length,
            },
        )
    }

    pub(super) fn add_checkbox(
        &mut self,
        target: &mut PageTarget,
        page: &Page,
        element: &Element,
        field: &CheckBox,
    ) -> Result<(), GenerateError> {
        let (slot, partial) = self.form.reserve(&mut self.out, &field.field.name)?;
        let color = parse_color(page.text_color_for(element)).unwrap_or(Rgb::BLACK);

        let mut flags = FieldFlags::empty();
        flags.apply_common(&field.field);
        let mut dict = field_dict(b"Btn", &partial, slot, flags);
        let state = if field.checked { ON_STATE } else { OFF_STATE };
        dict.set("V", Object::Name(state.to_vec()));
        dict.set("AS", Object::Name(state.to_vec()));

        let widget = widget_for(target.id, field_rect(&field.base, TOGGLE_SIZE), &field.base, &field.style);
        let look = look_for(&widget, color);
        let on = self.appearance_stream(appearance::checkbox(&look, true), &widget)?;
        let off = self.appearance_stream(appearance::checkbox(&look, false), &widget)?;
        let mut states = Dictionary::new();
        states.set(ON_STATE.to_vec(), Object::Reference(on));
        states.set(OFF_STATE.to_vec(), Object::Reference(off));
        self.commit_widget(target, slot.id, dict, &widget, Object::Dictionary(states), None)
    }

    pub(super) fn add_dropdown(
        &mut self,
        target: &mut PageTarget,
        page: &Page,
        element: &Element,
        field: &Dropdown,
    ) -> Result<(), GenerateError> {
        let (slot, partial) = self.form.reserve(&mut self.out, &field.field.name)?;
        let style = self.style_for(page, element, DEFAULT_FONT_SIZE)?;
        let options = field.options.as_deref().unwrap_or_default();

        let mut flags = FieldFlags::COMBO;
        flags.apply_common(&field.field);
        flags.apply(FieldFlags::EDIT, field.editable);
        flags.apply(FieldFlags::MULTI_SELECT, field.multiselect);
        flags.apply(FieldFlags::COMMIT_ON_SEL_CHANGE, field.select_on_click);
        flags.apply(FieldFlags::SORT, field.sorted);
        flags.apply(FieldFlags::DO_NOT_SPELL_CHECK, field.spell_checked.map(|s| !s));
        // Custom values need an editable combo box
        if field.selected_options.iter().any(|s| !options.contains(s)) {
            tracing::debug!(field = %field.field.name, "Dropdown selection outside its options, enabling edit");
            flags.insert(FieldFlags::EDIT);
        }

        let text = self
            .fonts
            .get(style.font)
            .filter_charset(field.selected_options.first().map(String::as_str).unwrap_or_default());
        let widget = widget_for(target.id, field_rect(&field.base, TEXT_FIELD_SIZE), &field.base, &field.style);
        let mut dict = field_dict(b"Ch", &partial, slot, flags);
        dict.set("Opt", Object::Array(options.iter().map(|o| pdf_text_string(o)).collect()));

        let font = self.fonts.get_mut(style.font);
        dict.set("DA", default_appearance(font, style.size, style.color));
        if let Some(value) = selection_value(&field.selected_options) {
            dict.set("V", value);
        }
        let canvas = appearance::text_field(
            &look_for(&widget, style.color),
            font,
            &TextOptions {
                text: &text,
                size: style.size,
                alignment: TextAlignment::Left,
                multiline: false,
                comb: None,
                password: false,
            },
        );
        let ap = self.appearance_stream(canvas, &widget)?;
        self.commit_widget(target, slot.id, dict, &widget, Object::Reference(ap), Some(style.font))
    }

    pub(super) fn add_option_list(
        &mut self,
        target: &mut PageTarget,
        page: &Page,
        element: &Element,
        field: &OptionList,
    ) -> Result<(), GenerateError> {
        let (slot, partial) = self.form.reserve(&mut self.out, &field.field.name)?;
        let style = self.style_for(page, element, DEFAULT_FONT_SIZE)?;
        let options = field.options.as_deref().unwrap_or_default();

        let mut flags = FieldFlags::empty();
        flags.apply_common(&field.field);
        flags.apply(FieldFlags::MULTI_SELECT, field.multiselect);
        flags.apply(FieldFlags::COMMIT_ON_SEL_CHANGE, field.select_on_click);
        flags.apply(FieldFlags::SORT, field.sorted);

        let selected: Vec<String> = field
            .selected_options
            .iter()
            .filter(|s| {
                let known = options.contains(*s);
                if !known {
                    tracing::warn!(field = %field.field.name, option = %s, "Ignoring selection outside the option list");
                }
                known
            })
            .cloned()
            .collect();

        let widget = widget_for(target.id, field_rect(&field.base, OPTION_LIST_SIZE), &field.base, &field.style);
        let mut dict = field_dict(b"Ch", &partial, slot, flags);
        dict.set("Opt", Object::Array(options.iter().map(|o| pdf_text_string(o)).collect()));
        if let Some(value) = selection_value(&selected) {
            dict.set("V", value);
        }

        let font = self.fonts.get_mut(style.font);
        dict.set("DA", default_appearance(font, style.size, style.color));
        let shown: Vec<String> = options.iter().map(|o| font.filter_charset(o)).collect();
        let highlighted: Vec<String> = selected.iter().map(|o| font.filter_charset(o)).collect();
        let canvas = appearance::option_list(&look_for(&widget, style.color), font, style.size, &shown, &highlighted);
        let ap = self.appearance_stream(canvas, &widget)?;
        self.commit_widget(target, slot.id, dict, &widget, Object::Reference(ap), Some(style.font))
    }

    pub(super) fn add_radio_group(
        &mut self,
        target: &mut PageTarget,
        page: &Page,
        element: &Element,
        field: &RadioGroup,
    ) -> Result<(), GenerateError> {
        let (slot, partial) = self.form.reserve(&mut self.out, &field.field.name)?;
        let group_color = parse_color(page.text_color_for(element)).unwrap_or(Rgb::BLACK);

        let mut flags = FieldFlags::RADIO | FieldFlags::NO_TOGGLE_TO_OFF;
        flags.apply_common(&field.field);
        let mut group = field_dict(b"Btn", &partial, slot, flags);

        let selected = field
            .selected_option
            .as_deref()
            .filter(|s| field.options.iter().any(|o| o.option == *s));
        if selected.is_none() && field.selected_option.is_some() {
            tracing::warn!(field = %field.field.name, "Ignoring selection outside the radio options");
        }
        group.set(
            "V",
            Object::Name(selected.map_or(OFF_STATE.to_vec(), |s| s.as_bytes().to_vec())),
        );

        let mut kids = Vec::with_capacity(field.options.len());
        for option in &field.options {
            let kid_id = self.out.new_object_id();
            let color = parse_color(option.style.text_color.as_deref()).unwrap_or(group_color);
            let widget = widget_for(
                target.id,
                field_rect(&option.base, TOGGLE_SIZE),
                &option.base,
                &option.style,
            );
            let look = look_for(&widget, color);
            let on = self.appearance_stream(appearance::radio(&look, true), &widget)?;
            let off = self.appearance_stream(appearance::radio(&look, false), &widget)?;

            let on_state = option.option.as_bytes().to_vec();
            let mut states = Dictionary::new();
            states.set(on_state.clone(), Object::Reference(on));
            states.set(OFF_STATE.to_vec(), Object::Reference(off));

            let mut dict = Dictionary::new();
            dict.set("Parent", Object::Reference(slot.id));
            let state = if selected == Some(option.option.as_str()) {
                on_state
            } else {
                OFF_STATE.to_vec()
            };
            dict.set("AS", Object::Name(state));
            self.commit_widget(target, kid_id, dict, &widget, Object::Dictionary(states), None)?;
            kids.push(Object::Reference(kid_id));
        }

        group.set("Kids", Object::Array(kids));
        self.out.objects.insert(slot.id, Object::Dictionary(group));
        Ok(())
    }

    pub(super) fn add_button(
        &mut self,
        target: &mut PageTarget,
        page: &Page,
        element: &Element,
        field: &Button,
    ) -> Result<(), GenerateError> {
        let (slot, partial) = self.form.reserve(&mut self.out, &field.field.name)?;
        let style = self.style_for(page, element, DEFAULT_FONT_SIZE)?;

        let image = match &field.image {
            Some(image) => {
                let embedded = self.images.embed(&mut self.out, image)?;
                Some((embedded, field.image_alignment.unwrap_or(TextAlignment::Center)))
            }
            None => None,
        };

        let mut flags = FieldFlags::PUSHBUTTON;
        flags.apply_common(&field.field);
        let mut dict = field_dict(b"Btn", &partial, slot, flags);
        let font = self.fonts.get_mut(style.font);
        let caption = font.filter_charset(&field.text);
        dict.set("DA", default_appearance(font, style.size, style.color));
        let mut mk = Dictionary::new();
        mk.set("CA", pdf_text_string(&caption));
        dict.set("MK", Object::Dictionary(mk));

        let widget = widget_for(target.id, field_rect(&field.base, BUTTON_SIZE), &field.base, &field.style);
        let canvas = appearance::button(&look_for(&widget, style.color), font, style.size, &caption, image);
        let ap = self.appearance_stream(canvas, &widget)?;
        self.commit_widget(target, slot.id, dict, &widget, Object::Reference(ap), Some(style.font))
    }

    /// Signatures become read-only text fields holding the anchor string,
    /// drawn in the background color so only text search finds them
    pub(super) fn add_signature(
        &mut self,
        target: &mut PageTarget,
        page: &Page,
        element: &Element,
        field: &Signature,
    ) -> Result<(), GenerateError> {
        let (slot, partial) = self.form.reserve(&mut self.out, &field.field.name)?;
        let mut style = self.style_for(page, element, SIGNATURE_FONT_SIZE)?;
        style.size = field.style.font_size.unwrap_or(SIGNATURE_FONT_SIZE);
        style.color = parse_color(field.style.background_color.as_deref()).unwrap_or(Rgb::WHITE);

        let mut flags = FieldFlags::empty();
        flags.apply_common(&field.field);
        flags.insert(FieldFlags::READ_ONLY | FieldFlags::DO_NOT_SPELL_CHECK);

        let font = self.fonts.get_mut(style.font);
        let anchor = font.filter_charset(&field.anchor_string());
        let mut dict = field_dict(b"Tx", &partial, slot, flags);
        dict.set("DA", default_appearance(font, style.size, style.color));
        dict.set("V", pdf_text_string(&anchor));

        let widget = widget_for(target.id, field_rect(&field.base, SIGNATURE_SIZE), &field.base, &field.style);
        let canvas = appearance::signature(&look_for(&widget, style.color), font, style.size, &anchor);
        let ap = self.appearance_stream(canvas, &widget)?;
        tracing::debug!(field = %field.field.name, anchor = %anchor, "Added signature anchor field");
        self.commit_widget(target, slot.id, dict, &widget, Object::Reference(ap), Some(style.font))
    }
}
