//! Font and color hints for text-rendering tabs
//!
//! The provider only knows a fixed set of fonts, size buckets and named
//! colors, so element styling is mapped onto the closest one.

use formdoc_model::{Hsv, Rgb};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderFont {
    Default,
    ArialNarrow,
    Arial,
    Calibri,
    CourierNew,
    Garamond,
    Georgia,
    Helvetica,
    LucidaConsole,
    #[serde(rename = "MSGothic")]
    MsGothic,
    #[serde(rename = "MSMincho")]
    MsMincho,
    #[serde(rename = "OCR-A")]
    OcrA,
    Tahoma,
    TimesNewRoman,
    Trebuchet,
    Verdana,
}

impl ProviderFont {
    /// Match order: the first font whose name occurs in the element font wins
    pub const ALL: [ProviderFont; 16] = [
        ProviderFont::Default,
        ProviderFont::ArialNarrow,
        ProviderFont::Arial,
        ProviderFont::Calibri,
        ProviderFont::CourierNew,
        ProviderFont::Garamond,
        ProviderFont::Georgia,
        ProviderFont::Helvetica,
        ProviderFont::LucidaConsole,
        ProviderFont::MsGothic,
        ProviderFont::MsMincho,
        ProviderFont::OcrA,
        ProviderFont::Tahoma,
        ProviderFont::TimesNewRoman,
        ProviderFont::Trebuchet,
        ProviderFont::Verdana,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ProviderFont::Default => "Default",
            ProviderFont::ArialNarrow => "ArialNarrow",
            ProviderFont::Arial => "Arial",
            ProviderFont::Calibri => "Calibri",
            ProviderFont::CourierNew => "CourierNew",
            ProviderFont::Garamond => "Garamond",
            ProviderFont::Georgia => "Georgia",
            ProviderFont::Helvetica => "Helvetica",
            ProviderFont::LucidaConsole => "LucidaConsole",
            ProviderFont::MsGothic => "MSGothic",
            ProviderFont::MsMincho => "MSMincho",
            ProviderFont::OcrA => "OCR-A",
            ProviderFont::Tahoma => "Tahoma",
            ProviderFont::TimesNewRoman => "TimesNewRoman",
            ProviderFont::Trebuchet => "Trebuchet",
            ProviderFont::Verdana => "Verdana",
        }
    }

    /// Case-insensitive substring match ignoring whitespace, `Default` when
    /// nothing matches
    pub fn from_font_name(font: Option<&str>) -> Self {
        let Some(font) = font else {
            return ProviderFont::Default;
        };
        let normalized: String = font
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();
        Self::ALL
            .into_iter()
            .find(|f| normalized.contains(&f.name().to_lowercase()))
            .unwrap_or(ProviderFont::Default)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProviderFontSize {
    Size7,
    Size8,
    Size9,
    Size10,
    Size11,
    Size12,
    Size14,
    Size16,
    Size18,
    Size20,
    Size22,
    Size24,
    Size26,
    Size28,
    Size36,
    Size48,
    Size72,
}

/// Upper bounds (exclusive) of each bucket below the last
const SIZE_BANDS: [(f64, ProviderFontSize); 16] = [
    (7.5, ProviderFontSize::Size7),
    (8.5, ProviderFontSize::Size8),
    (9.5, ProviderFontSize::Size9),
    (10.5, ProviderFontSize::Size10),
    (11.5, ProviderFontSize::Size11),
    (13.0, ProviderFontSize::Size12),
    (15.0, ProviderFontSize::Size14),
    (17.0, ProviderFontSize::Size16),
    (19.0, ProviderFontSize::Size18),
    (21.0, ProviderFontSize::Size20),
    (23.0, ProviderFontSize::Size22),
    (25.0, ProviderFontSize::Size24),
    (27.0, ProviderFontSize::Size26),
    (32.0, ProviderFontSize::Size28),
    (42.0, ProviderFontSize::Size36),
    (60.0, ProviderFontSize::Size48),
];

impl ProviderFontSize {
    /// Band a font size into the provider's buckets. No size means 14.
    pub fn from_font_size(size: Option<f64>) -> Self {
        let Some(size) = size else {
            return ProviderFontSize::Size14;
        };
        SIZE_BANDS
            .iter()
            .find(|(bound, _)| size < *bound)
            .map_or(ProviderFontSize::Size72, |(_, bucket)| *bucket)
    }

    pub fn points(&self) -> u32 {
        match self {
            ProviderFontSize::Size7 => 7,
            ProviderFontSize::Size8 => 8,
            ProviderFontSize::Size9 => 9,
            ProviderFontSize::Size10 => 10,
            ProviderFontSize::Size11 => 11,
            ProviderFontSize::Size12 => 12,
            ProviderFontSize::Size14 => 14,
            ProviderFontSize::Size16 => 16,
            ProviderFontSize::Size18 => 18,
            ProviderFontSize::Size20 => 20,
            ProviderFontSize::Size22 => 22,
            ProviderFontSize::Size24 => 24,
            ProviderFontSize::Size26 => 26,
            ProviderFontSize::Size28 => 28,
            ProviderFontSize::Size36 => 36,
            ProviderFontSize::Size48 => 48,
            ProviderFontSize::Size72 => 72,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderColor {
    Black,
    BrightBlue,
    BrightRed,
    DarkGreen,
    DarkRed,
    Gold,
    Green,
    NavyBlue,
    Purple,
    White,
}

impl ProviderColor {
    /// Nearest named color by hue sector, bright or dark by value.
    /// Unparseable or missing colors are black.
    pub fn from_hex(hex: Option<&str>) -> Self {
        match hex.and_then(Hsv::from_hex) {
            Some(hsv) => Self::from_hsv(hsv),
            None => ProviderColor::Black,
        }
    }

    pub fn from_hsv(hsv: Hsv) -> Self {
        let bright = hsv.value > 50.0;
        let pick = |light, dark| if bright { light } else { dark };
        let h = hsv.hue;
        if hsv.saturation < 10.0 {
            pick(ProviderColor::White, ProviderColor::Black)
        } else if h <= 30.0 || h > 330.0 {
            pick(ProviderColor::BrightRed, ProviderColor::DarkRed)
        } else if h <= 90.0 {
            ProviderColor::Gold
        } else if h <= 180.0 {
            pick(ProviderColor::Green, ProviderColor::DarkGreen)
        } else if h <= 270.0 {
            pick(ProviderColor::BrightBlue, ProviderColor::NavyBlue)
        } else {
            ProviderColor::Purple
        }
    }

    /// White for light colors, black for dark or missing ones
    pub fn black_or_white(hex: Option<&str>) -> Self {
        match hex.and_then(Rgb::from_hex) {
            Some(rgb) if rgb.r.max(rgb.g).max(rgb.b) > 0.5 => ProviderColor::White,
            _ => ProviderColor::Black,
        }
    }
}

pub fn is_bold_font(font: Option<&str>) -> bool {
    font.is_some_and(|f| f.to_lowercase().contains("bold"))
}

pub fn is_italic_font(font: Option<&str>) -> bool {
    font.is_some_and(|f| {
        let f = f.to_lowercase();
        f.contains("italic") || f.contains("oblique")
    })
}
