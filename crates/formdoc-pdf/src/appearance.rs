//! Widget appearance streams
//!
//! Every builder returns a [`Canvas`] in the widget's own coordinate space,
//! `(0, 0)` to `(width, height)`, ready to become the `/AP /N` form XObject.

use formdoc_model::element::TextAlignment;
use formdoc_model::Rgb;

use crate::canvas::Canvas;
use crate::fonts::PdfFont;
use crate::images::EmbeddedImage;
use crate::layout::{wrap_text, FIELD_PADDING};

/// Selected rows of option lists
const HIGHLIGHT: Rgb = Rgb::new(153.0 / 255.0, 193.0 / 255.0, 218.0 / 255.0);

/// Frame of a widget: size, fill and border
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WidgetLook {
    pub width: f64,
    pub height: f64,
    pub background: Option<Rgb>,
    pub border: Option<Rgb>,
    pub border_width: f64,
    pub text_color: Rgb,
}

impl WidgetLook {
    fn inset(&self) -> f64 {
        self.border_width + FIELD_PADDING
    }

    /// Background fill and border stroke. Each is drawn only when set.
    fn frame(&self, canvas: &mut Canvas) {
        if let Some(bg) = self.background {
            canvas.fill_color(bg).rect(0.0, 0.0, self.width, self.height).paint(true, false);
        }
        if let Some(border) = self.border {
            if self.border_width > 0.0 {
                let half = self.border_width / 2.0;
                canvas
                    .stroke_color(border)
                    .line_width(self.border_width)
                    .rect(half, half, self.width - self.border_width, self.height - self.border_width)
                    .paint(false, true);
            }
        }
    }

    /// Clip to the area inside the border
    fn clip_inner(&self, canvas: &mut Canvas) {
        let inset = self.border_width;
        canvas
            .rect(inset, inset, self.width - 2.0 * inset, self.height - 2.0 * inset)
            .op("W", vec![])
            .paint(false, false);
    }
}

/// Baseline that centres one line of text vertically in `height`
fn centred_baseline(font: &PdfFont, size: f64, height: f64) -> f64 {
    let font_height = font.height_at_size(size);
    let descent = font_height - font.ascent_at_size(size);
    (height - font_height) / 2.0 + descent
}

fn aligned_x(alignment: TextAlignment, text_width: f64, width: f64, inset: f64) -> f64 {
    match alignment {
        TextAlignment::Left => inset,
        TextAlignment::Center => (width - text_width) / 2.0,
        TextAlignment::Right => width - inset - text_width,
    }
}

pub struct TextOptions<'t> {
    pub text: &'t str,
    pub size: f64,
    pub alignment: TextAlignment,
    pub multiline: bool,
    /// Cell count for comb fields
    pub comb: Option<u32>,
    pub password: bool,
}

/// Text field, date input, dropdown and signature appearance
pub fn text_field(look: &WidgetLook, font: &mut PdfFont, opts: &TextOptions<'_>) -> Canvas {
    let mut canvas = Canvas::new();
    look.frame(&mut canvas);

    let masked;
    let text = if opts.password {
        masked = "*".repeat(opts.text.chars().count());
        masked.as_str()
    } else {
        opts.text
    };

    canvas.op("BMC", vec![lopdf::Object::Name(b"Tx".to_vec())]);
    canvas.save();
    look.clip_inner(&mut canvas);
    canvas.fill_color(look.text_color);

    let inset = look.inset();
    match opts.comb {
        Some(cells) if cells > 0 && !opts.multiline => {
            let cell = look.width / cells as f64;
            let y = centred_baseline(font, opts.size, look.height);
            for (idx, ch) in text.chars().take(cells as usize).enumerate() {
                let glyph = ch.to_string();
                let w = font.width_of_text_at_size(&glyph, opts.size);
                let x = cell * idx as f64 + (cell - w) / 2.0;
                canvas.show_text_at(font, opts.size, x, y, &glyph);
            }
        }
        _ if opts.multiline => {
            let line_height = font.height_at_size(opts.size);
            let max_width = look.width - 2.0 * inset;
            let lines = wrap_text(text, &[], Some(max_width), |s| {
                font.width_of_text_at_size(s, opts.size)
            });
            let mut y = look.height - inset - font.ascent_at_size(opts.size);
            for line in lines {
                let w = font.width_of_text_at_size(&line, opts.size);
                let x = aligned_x(opts.alignment, w, look.width, inset);
                canvas.show_text_at(font, opts.size, x, y, &line);
                y -= line_height;
            }
        }
        _ => {
            if !text.is_empty() {
                let w = font.width_of_text_at_size(text, opts.size);
                let x = aligned_x(opts.alignment, w, look.width, inset);
                let y = centred_baseline(font, opts.size, look.height);
                canvas.show_text_at(font, opts.size, x, y, text);
            }
        }
    }

    canvas.restore();
    canvas.op("EMC", vec![]);
    canvas
}

/// Checkbox appearance for the on (`checked`) or off state
pub fn checkbox(look: &WidgetLook, checked: bool) -> Canvas {
    let mut canvas = Canvas::new();
    look.frame(&mut canvas);
    if checked {
        let (w, h) = (look.width, look.height);
        canvas
            .save()
            .stroke_color(look.text_color)
            .line_width((w.min(h) / 12.0).max(1.0))
            .move_to(w * 0.2, h * 0.5)
            .line_to(w * 0.4, h * 0.3)
            .line_to(w * 0.8, h * 0.8)
            .paint(false, true)
            .restore();
    }
    canvas
}

/// Radio option appearance: an inscribed circle with a dot when selected
pub fn radio(look: &WidgetLook, selected: bool) -> Canvas {
    let mut canvas = Canvas::new();
    let (cx, cy) = (look.width / 2.0, look.height / 2.0);
    let r = cx.min(cy);
    if let Some(bg) = look.background {
        canvas.fill_color(bg).ellipse(cx, cy, r, r).paint(true, false);
    }
    if let (Some(border), true) = (look.border, look.border_width > 0.0) {
        let rb = r - look.border_width / 2.0;
        canvas
            .stroke_color(border)
            .line_width(look.border_width)
            .ellipse(cx, cy, rb, rb)
            .paint(false, true);
    }
    if selected {
        let dot = (r - look.border_width) * 0.45;
        canvas.fill_color(look.text_color).ellipse(cx, cy, dot, dot).paint(true, false);
    }
    canvas
}

/// Option list: one row per option, selected rows highlighted
pub fn option_list(
    look: &WidgetLook,
    font: &mut PdfFont,
    size: f64,
    options: &[String],
    selected: &[String],
) -> Canvas {
    let mut canvas = Canvas::new();
    look.frame(&mut canvas);

    let inset = look.inset();
    let row = font.height_at_size(size) + FIELD_PADDING * 2.0;
    let descent = font.height_at_size(size) - font.ascent_at_size(size);

    canvas.op("BMC", vec![lopdf::Object::Name(b"Tx".to_vec())]);
    canvas.save();
    look.clip_inner(&mut canvas);
    let mut top = look.height - look.border_width;
    for option in options {
        if top <= look.border_width {
            break;
        }
        if selected.contains(option) {
            canvas
                .fill_color(HIGHLIGHT)
                .rect(look.border_width, top - row, look.width - 2.0 * look.border_width, row)
                .paint(true, false);
        }
        canvas.fill_color(look.text_color);
        canvas.show_text_at(font, size, inset, top - row + FIELD_PADDING + descent, option);
        top -= row;
    }
    canvas.restore();
    canvas.op("EMC", vec![]);
    canvas
}

/// Push button: optional image fitted into the field plus a centred caption
pub fn button(
    look: &WidgetLook,
    font: &mut PdfFont,
    size: f64,
    caption: &str,
    image: Option<(EmbeddedImage, TextAlignment)>,
) -> Canvas {
    let mut canvas = Canvas::new();
    look.frame(&mut canvas);

    let inset = look.inset();
    if let Some((img, alignment)) = image {
        let avail_w = (look.width - 2.0 * inset).max(0.0);
        let avail_h = (look.height - 2.0 * inset).max(0.0);
        let scale = img.fit_scale(avail_w, avail_h);
        let (w, h) = (img.width as f64 * scale, img.height as f64 * scale);
        let x = match alignment {
            TextAlignment::Left => inset,
            TextAlignment::Center => (look.width - w) / 2.0,
            TextAlignment::Right => look.width - inset - w,
        };
        let y = (look.height - h) / 2.0;
        canvas
            .save()
            .concat([w, 0.0, 0.0, h, x, y])
            .draw_xobject(img.id)
            .restore();
    }

    if !caption.is_empty() {
        let w = font.width_of_text_at_size(caption, size);
        let x = (look.width - w) / 2.0;
        let y = centred_baseline(font, size, look.height);
        canvas.fill_color(look.text_color);
        canvas.show_text_at(font, size, x, y, caption);
    }
    canvas
}

/// Signature placeholder: the anchor string, wrapped and top-aligned, drawn
/// in the text color over the background
pub fn signature(look: &WidgetLook, font: &mut PdfFont, size: f64, anchor: &str) -> Canvas {
    let mut canvas = Canvas::new();
    look.frame(&mut canvas);

    let line_height = font.height_at_size(size);
    let lines = wrap_text(anchor, &[], Some(look.width), |s| {
        font.width_of_text_at_size(s, size)
    });
    canvas.fill_color(look.text_color);
    let mut y = look.height - line_height;
    for line in lines {
        canvas.show_text_at(font, size, 0.0, y, &line);
        y -= line_height;
    }
    canvas
}
