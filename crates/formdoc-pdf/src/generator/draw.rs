//! Non-field elements, drawn straight into the page content

use formdoc_model::element::{
    Circle, Drawable, Ellipse, Image, Line, Rectangle, ShapeStroke, Square, SvgPath, Text,
};
use formdoc_model::{Element, ElementBase, Page, Rgb};
use super::{parse_color, PageTarget, PdfFileGenerator, DEFAULT_FONT_SIZE};
use crate::canvas::{real, rotate_degrees, scale, skew_degrees, text_matrix, translate, Canvas};
use crate::error::GenerateError;
use crate::layout::wrap_text;

/// Line height as a multiple of the font size when the element sets none
const LINE_HEIGHT_FACTOR: f64 = 1.2;

const RECTANGLE_WIDTH: f64 = 150.0;
const RECTANGLE_HEIGHT: f64 = 100.0;
const SHAPE_SIZE: f64 = 100.0;

/// Opacity and blend mode of a drawable element
fn apply_drawable(canvas: &mut Canvas, drawable: &Drawable, border_opacity: Option<f64>) {
    canvas.ext_gstate(drawable.opacity, border_opacity, drawable.blend_mode);
}

/// Translate to the element origin, then rotate and skew around it
fn place(canvas: &mut Canvas, base: &ElementBase, drawable: &Drawable) {
    canvas.concat(translate(base.x.unwrap_or(0.0), base.y.unwrap_or(0.0)));
    if let Some(degrees) = base.rotate.filter(|r| *r != 0.0) {
        canvas.concat(rotate_degrees(degrees));
    }
    let (xs, ys) = (drawable.x_skew.unwrap_or(0.0), drawable.y_skew.unwrap_or(0.0));
    if xs != 0.0 || ys != 0.0 {
        canvas.concat(skew_degrees(xs, ys));
    }
}

/// Set up fill and stroke state for a shape and report what to paint.
///
/// Without any color a shape gets `default_fill`, or a stroke in
/// `default_border` when no fill default applies.
fn shape_paint(
    canvas: &mut Canvas,
    stroke: &ShapeStroke,
    default_fill: Option<Rgb>,
    default_border: Option<Rgb>,
) -> (bool, bool) {
    let mut fill = parse_color(stroke.color.as_deref());
    let mut border = parse_color(stroke.border_color.as_deref());
    if fill.is_none() && border.is_none() {
        fill = default_fill;
        border = default_border;
    }

    if let Some(color) = fill {
        canvas.fill_color(color);
    }
    let mut paint_stroke = false;
    if let Some(color) = border {
        if stroke.border_width.map_or(true, |w| w > 0.0) {
            paint_stroke = true;
            canvas.stroke_color(color);
            if let Some(width) = stroke.border_width {
                canvas.line_width(width);
            }
            if let Some(cap) = stroke.border_line_cap {
                canvas.line_cap(cap.operand());
            }
            if let Some(dash) = &stroke.border_dash_array {
                canvas.dash(dash, stroke.border_dash_phase.unwrap_or(0.0));
            }
        }
    }
    (fill.is_some(), paint_stroke)
}

impl PdfFileGenerator<'_> {
    pub(super) fn draw_text(
        &mut self,
        target: &mut PageTarget,
        page: &Page,
        element: &Element,
        text: &Text,
    ) -> Result<(), GenerateError> {
        if text.value.is_empty() {
            return Ok(());
        }
        let style = self.style_for(page, element, DEFAULT_FONT_SIZE)?;
        let font = self.fonts.get_mut(style.font);
        let value = font.filter_charset(&text.value);
        let line_height = text.line_height.unwrap_or(style.size * LINE_HEIGHT_FACTOR);
        let breaks = text.word_breaks.as_deref().unwrap_or_default();
        let lines = wrap_text(&value, breaks, text.max_width, |s| {
            font.width_of_text_at_size(s, style.size)
        });

        let canvas = &mut target.canvas;
        canvas.save();
        apply_drawable(canvas, &text.drawable, None);
        canvas.op("BT", vec![]);
        canvas.fill_color(style.color);
        canvas.set_font(font, style.size);
        canvas.op("TL", vec![real(line_height)]);
        let matrix = text_matrix(
            text.base.rotate.unwrap_or(0.0),
            text.drawable.x_skew.unwrap_or(0.0),
            text.drawable.y_skew.unwrap_or(0.0),
            text.base.x.unwrap_or(0.0),
            text.base.y.unwrap_or(0.0),
        );
        canvas.op("Tm", matrix.into_iter().map(real).collect());
        for (idx, line) in lines.iter().enumerate() {
            if idx > 0 {
                canvas.op("T*", vec![]);
            }
            let operand = font.encode_text(line);
            canvas.op("Tj", vec![operand]);
        }
        canvas.op("ET", vec![]);
        canvas.restore();
        Ok(())
    }

    pub(super) fn draw_image(&mut self, target: &mut PageTarget, image: &Image) -> Result<(), GenerateError> {
        let embedded = self.images.embed(&mut self.out, image)?;
        let width = image.base.width.unwrap_or(embedded.width as f64);
        let height = image.base.height.unwrap_or(embedded.height as f64);

        let canvas = &mut target.canvas;
        canvas.save();
        apply_drawable(canvas, &image.drawable, None);
        place(canvas, &image.base, &image.drawable);
        canvas.concat(scale(width, height));
        canvas.draw_xobject(embedded.id);
        canvas.restore();
        Ok(())
    }

    pub(super) fn draw_rectangle(
        &mut self,
        target: &mut PageTarget,
        rect: &Rectangle,
    ) -> Result<(), GenerateError> {
        let width = rect.base.width.unwrap_or(RECTANGLE_WIDTH);
        let height = rect.base.height.unwrap_or(RECTANGLE_HEIGHT);
        draw_box(&mut target.canvas, &rect.base, &rect.drawable, &rect.stroke, width, height);
        Ok(())
    }

    pub(super) fn draw_square(&mut self, target: &mut PageTarget, square: &Square) -> Result<(), GenerateError> {
        let size = square.size.unwrap_or(SHAPE_SIZE);
        draw_box(&mut target.canvas, &square.base, &square.drawable, &square.stroke, size, size);
        Ok(())
    }

    pub(super) fn draw_circle(&mut self, target: &mut PageTarget, circle: &Circle) -> Result<(), GenerateError> {
        let radius = circle.size.unwrap_or(SHAPE_SIZE);
        draw_oval(&mut target.canvas, &circle.base, &circle.drawable, &circle.stroke, radius, radius);
        Ok(())
    }

    pub(super) fn draw_ellipse(
        &mut self,
        target: &mut PageTarget,
        ellipse: &Ellipse,
    ) -> Result<(), GenerateError> {
        draw_oval(
            &mut target.canvas,
            &ellipse.base,
            &ellipse.drawable,
            &ellipse.stroke,
            ellipse.x_scale.unwrap_or(SHAPE_SIZE),
            ellipse.y_scale.unwrap_or(SHAPE_SIZE),
        );
        Ok(())
    }

    pub(super) fn draw_line(&mut self, target: &mut PageTarget, line: &Line) -> Result<(), GenerateError> {
        let (Some(start), Some(end)) = (line.start, line.end) else {
            tracing::warn!(id = %line.base.id, "Skipping line without start or end");
            return Ok(());
        };
        let color = parse_color(line.color.as_deref()).unwrap_or(Rgb::BLACK);

        let canvas = &mut target.canvas;
        canvas.save();
        apply_drawable(canvas, &line.drawable, line.drawable.opacity);
        canvas.stroke_color(color);
        canvas.line_width(line.thickness.unwrap_or(1.0));
        if let Some(cap) = line.line_cap {
            canvas.line_cap(cap.operand());
        }
        if let Some(dash) = &line.dash_array {
            canvas.dash(dash, line.dash_phase.unwrap_or(0.0));
        }
        canvas.move_to(start.x, start.y).line_to(end.x, end.y).paint(false, true);
        canvas.restore();
        Ok(())
    }

    /// Polyline whose points grow downwards from the origin, which defaults
    /// to the top-left corner of the page
    pub(super) fn draw_svg_path(&mut self, target: &mut PageTarget, path: &SvgPath) -> Result<(), GenerateError> {
        let Some((first, rest)) = path.points.split_first() else {
            return Ok(());
        };
        let x = path.base.x.unwrap_or(0.0);
        let y = path.base.y.unwrap_or(target.size.height);
        let factor = path.scale.unwrap_or(1.0);

        let canvas = &mut target.canvas;
        canvas.save();
        apply_drawable(canvas, &path.drawable, path.stroke.border_opacity);
        canvas.concat(translate(x, y));
        if let Some(degrees) = path.base.rotate.filter(|r| *r != 0.0) {
            canvas.concat(rotate_degrees(degrees));
        }
        canvas.concat(scale(factor, -factor));
        let (fill, stroke) = shape_paint(canvas, &path.stroke, None, Some(Rgb::BLACK));
        canvas.move_to(first.x, first.y);
        for pt in rest {
            canvas.line_to(pt.x, pt.y);
        }
        canvas.paint(fill, stroke);
        canvas.restore();
        Ok(())
    }
}

fn draw_box(
    canvas: &mut Canvas,
    base: &ElementBase,
    drawable: &Drawable,
    stroke: &ShapeStroke,
    width: f64,
    height: f64,
) {
    canvas.save();
    apply_drawable(canvas, drawable, stroke.border_opacity);
    place(canvas, base, drawable);
    let (fill, paint_stroke) = shape_paint(canvas, stroke, Some(Rgb::BLACK), None);
    canvas.rect(0.0, 0.0, width, height).paint(fill, paint_stroke);
    canvas.restore();
}

/// Ellipse centred on the element origin
fn draw_oval(
    canvas: &mut Canvas,
    base: &ElementBase,
    drawable: &Drawable,
    stroke: &ShapeStroke,
    rx: f64,
    ry: f64,
) {
    canvas.save();
    apply_drawable(canvas, drawable, stroke.border_opacity);
    place(canvas, base, drawable);
    let (fill, paint_stroke) = shape_paint(canvas, stroke, Some(Rgb::BLACK), None);
    canvas.ellipse(0.0, 0.0, rx, ry).paint(fill, paint_stroke);
    canvas.restore();
}
