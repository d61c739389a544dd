//! Field geometry and text line breaking

use formdoc_model::element::TextAlignment;

/// Padding between a field's border and its text, on each side
pub const FIELD_PADDING: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Bounding box of `rect` rotated by `degrees` around its origin corner
pub fn rotated_bounds(rect: Rect, degrees: f64) -> Rect {
    if degrees == 0.0 {
        return rect;
    }
    let (sin, cos) = degrees.to_radians().sin_cos();
    let corners = [
        (0.0, 0.0),
        (rect.width, 0.0),
        (rect.width, rect.height),
        (0.0, rect.height),
    ]
    .map(|(x, y)| (rect.x + x * cos - y * sin, rect.y + x * sin + y * cos));
    let min_x = corners.iter().map(|c| c.0).fold(f64::INFINITY, f64::min);
    let max_x = corners.iter().map(|c| c.0).fold(f64::NEG_INFINITY, f64::max);
    let min_y = corners.iter().map(|c| c.1).fold(f64::INFINITY, f64::min);
    let max_y = corners.iter().map(|c| c.1).fold(f64::NEG_INFINITY, f64::max);
    Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
}

/// Measured display text of a field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextExtent {
    pub width: f64,
    /// Ascender-to-descender height at the font size
    pub font_height: f64,
    pub font_size: f64,
}

/// Resize `rect` to its content when the element opts in.
///
/// The width grows or shrinks around the edge the alignment anchors to:
/// left-aligned fields keep `x`, right-aligned fields keep `x + width`,
/// centred fields keep their centre. `y` is kept when the height changes.
pub fn fit_to_content(
    rect: Rect,
    extent: TextExtent,
    border_width: f64,
    alignment: TextAlignment,
    fit_width: bool,
    fit_height: bool,
) -> Rect {
    let mut out = rect;
    let inset = 2.0 * (border_width + FIELD_PADDING);
    if fit_width {
        out.width = extent.width + inset;
        out.x = match alignment {
            TextAlignment::Left => rect.x,
            TextAlignment::Center => rect.x + (rect.width - out.width) / 2.0,
            TextAlignment::Right => rect.x + rect.width - out.width,
        };
    }
    if fit_height {
        out.height = extent.font_height.max(extent.font_size) + inset;
    }
    out
}

/// Split `text` into lines no wider than `max_width`.
///
/// Hard newlines always break. Within a line, breaks happen after any of
/// `word_breaks` (a space when empty); a single word wider than
/// `max_width` stays on its own line.
pub fn wrap_text<F>(text: &str, word_breaks: &[String], max_width: Option<f64>, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f64,
{
    let paragraphs = text.split("\r\n").flat_map(|p| p.split(['\n', '\r']));
    let Some(max_width) = max_width else {
        return paragraphs.map(String::from).collect();
    };

    let default_breaks = [" ".to_string()];
    let breaks: &[String] = if word_breaks.is_empty() {
        &default_breaks
    } else {
        word_breaks
    };

    let mut lines = Vec::new();
    for paragraph in paragraphs {
        let mut line = String::new();
        for word in split_after_breaks(paragraph, breaks) {
            let candidate = format!("{line}{word}");
            if !line.is_empty() && measure(candidate.trim_end()) > max_width {
                lines.push(line.trim_end().to_string());
                line = word.to_string();
            } else {
                line = candidate;
            }
        }
        lines.push(line.trim_end().to_string());
    }
    lines
}

/// Pieces of `text`, each ending right after a break sequence
fn split_after_breaks<'a>(text: &'a str, breaks: &[String]) -> Vec<&'a str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut idx = 0;
    while idx < text.len() {
        let matched = breaks
            .iter()
            .filter(|b| !b.is_empty())
            .find(|b| text[idx..].starts_with(b.as_str()));
        match matched {
            Some(b) => {
                idx += b.len();
                pieces.push(&text[start..idx]);
                start = idx;
            }
            None => {
                idx += text[idx..].chars().next().map_or(1, char::len_utf8);
            }
        }
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn extent(width: f64, size: f64) -> TextExtent {
        TextExtent {
            width,
            font_height: size * 0.925,
            font_size: size,
        }
    }

    #[test]
    fn test_fit_width_keeps_alignment_edge() {
        let rect = Rect::new(100.0, 50.0, 200.0, 20.0);
        let left = fit_to_content(rect, extent(50.0, 10.0), 1.0, TextAlignment::Left, true, false);
        assert_eq!(left, Rect::new(100.0, 50.0, 54.0, 20.0));

        let right = fit_to_content(rect, extent(50.0, 10.0), 1.0, TextAlignment::Right, true, false);
        assert_eq!(right.x + right.width, 300.0);

        let center = fit_to_content(rect, extent(50.0, 10.0), 1.0, TextAlignment::Center, true, false);
        assert_eq!(center.x + center.width / 2.0, 200.0);
    }

    #[test]
    fn test_fit_height_uses_larger_of_font_height_and_size() {
        let rect = Rect::new(0.0, 10.0, 100.0, 100.0);
        let fitted = fit_to_content(rect, extent(10.0, 20.0), 0.0, TextAlignment::Left, false, true);
        assert_eq!(fitted.height, 22.0);
        assert_eq!(fitted.y, 10.0);
        assert_eq!(fitted.width, 100.0);
    }

    #[test]
    fn test_no_fit_is_identity() {
        let rect = Rect::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(
            fit_to_content(rect, extent(99.0, 9.0), 2.0, TextAlignment::Center, false, false),
            rect
        );
    }

    #[test]
    fn test_rotated_bounds_quarter_turn() {
        let rect = Rect::new(10.0, 10.0, 40.0, 20.0);
        assert_eq!(rotated_bounds(rect, 0.0), rect);
        let turned = rotated_bounds(rect, 90.0);
        assert!((turned.x - -10.0).abs() < 1e-9);
        assert!((turned.y - 10.0).abs() < 1e-9);
        assert!((turned.width - 20.0).abs() < 1e-9);
        assert!((turned.height - 40.0).abs() < 1e-9);
    }

    fn char_count(s: &str) -> f64 {
        s.chars().count() as f64
    }

    #[test]
    fn test_wrap_on_spaces() {
        let lines = wrap_text("aaa bbb ccc", &[], Some(7.0), char_count);
        assert_eq!(lines, vec!["aaa bbb", "ccc"]);
    }

    #[test]
    fn test_wrap_keeps_newlines_without_max_width() {
        let lines = wrap_text("one\ntwo\r\nthree", &[], None, char_count);
        assert_eq!(lines, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_wrap_custom_breaks() {
        let lines = wrap_text("a-b-c", &["-".to_string()], Some(2.0), char_count);
        assert_eq!(lines, vec!["a-", "b-", "c"]);
    }

    #[test]
    fn test_overlong_word_gets_own_line() {
        let lines = wrap_text("hi supercalifragilistic yo", &[], Some(5.0), char_count);
        assert_eq!(lines, vec!["hi", "supercalifragilistic", "yo"]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Wrapping drops only break whitespace
        #[test]
        fn prop_wrap_preserves_words(words in prop::collection::vec("[a-z]{1,8}", 1..12), max in 3.0f64..40.0) {
            let text = words.join(" ");
            let lines = wrap_text(&text, &[], Some(max), char_count);
            let rejoined: Vec<String> = lines
                .iter()
                .flat_map(|l| l.split(' ').map(String::from))
                .collect();
            prop_assert_eq!(rejoined, words);
        }
    }
}
