//! Display formatting of field values
//!
//! Text fields with a number format show their value the way a browser's
//! `Intl.NumberFormat` would for the common locales. Date inputs are
//! rendered with moment-style format tokens in the requested IANA zone.

use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc};
use chrono_tz::Tz;
use formdoc_model::element::{NumberFormat, NumberStyle};

pub const DEFAULT_DATE_FORMAT: &str = "YYYY/MM/DD HH:mm:ss";

struct LocaleSymbols {
    group: &'static str,
    decimal: &'static str,
    /// Currency symbol after the number, separated by a space
    currency_after: bool,
    /// Space between currency symbol and number when it comes first
    currency_space: bool,
    /// Space before the percent sign
    percent_space: bool,
}

const NBSP: &str = "\u{a0}";
const NNBSP: &str = "\u{202f}";

fn locale_symbols(locale: &str) -> LocaleSymbols {
    let lang = locale
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    let symbols = |group, decimal, currency_after, currency_space, percent_space| LocaleSymbols {
        group,
        decimal,
        currency_after,
        currency_space,
        percent_space,
    };
    match lang.as_str() {
        "de" | "es" => symbols(".", ",", true, false, true),
        "it" => symbols(".", ",", true, false, false),
        "pt" => symbols(".", ",", false, true, false),
        "fr" => symbols(NNBSP, ",", true, false, true),
        "ru" => symbols(NBSP, ",", true, false, true),
        _ => symbols(",", ".", false, false, false),
    }
}

fn currency_symbol(code: &str) -> String {
    let symbol = match code.to_ascii_uppercase().as_str() {
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "JPY" | "CNY" => "¥",
        "THB" => "฿",
        "KRW" => "₩",
        "INR" => "₹",
        "BRL" => "R$",
        "RUB" => "₽",
        other => return other.to_string(),
    };
    symbol.to_string()
}

fn currency_digits(code: &str) -> u8 {
    match code.to_ascii_uppercase().as_str() {
        "JPY" | "KRW" => 0,
        _ => 2,
    }
}

/// Format `text` per `format` when it holds a number. Anything else is
/// returned unchanged.
pub fn format_number_text(text: &str, format: &NumberFormat) -> String {
    if !format.is_set() {
        return text.to_string();
    }
    match text.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => format_number(value, format),
        _ => text.to_string(),
    }
}

pub fn format_number(value: f64, format: &NumberFormat) -> String {
    let locale = locale_symbols(format.locale.as_deref().unwrap_or("en-US"));
    let style = format.style.unwrap_or(NumberStyle::Decimal);
    let currency = format.currency.as_deref().unwrap_or("USD");

    let (default_min, default_max) = match style {
        NumberStyle::Decimal => (0, 3),
        NumberStyle::Currency => {
            let digits = currency_digits(currency);
            (digits, digits)
        }
        NumberStyle::Percent => (0, 0),
    };
    let (min, max) = match (format.minimum_fraction_digits, format.maximum_fraction_digits) {
        (Some(min), Some(max)) => (min.min(max), max),
        (Some(min), None) => (min, default_max.max(min)),
        (None, Some(max)) => (default_min.min(max), max),
        (None, None) => (default_min, default_max),
    };

    let scaled = if style == NumberStyle::Percent {
        value * 100.0
    } else {
        value
    };
    let digits = fixed_digits(scaled.abs(), min as usize, max as usize);
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (digits, None),
    };

    let mut number = group_thousands(&int_part, locale.group);
    if let Some(frac) = frac_part {
        number.push_str(locale.decimal);
        number.push_str(&frac);
    }
    let negative = scaled < 0.0 && number.chars().any(|c| c.is_ascii_digit() && c != '0');
    let sign = if negative { "-" } else { "" };

    match style {
        NumberStyle::Decimal => format!("{sign}{number}"),
        NumberStyle::Percent => {
            let space = if locale.percent_space { NBSP } else { "" };
            format!("{sign}{number}{space}%")
        }
        NumberStyle::Currency => {
            let symbol = currency_symbol(currency);
            if locale.currency_after {
                format!("{sign}{number}{NBSP}{symbol}")
            } else if locale.currency_space || symbol.chars().all(|c| c.is_ascii_uppercase()) {
                format!("{sign}{symbol}{NBSP}{number}")
            } else {
                format!("{sign}{symbol}{number}")
            }
        }
    }
}

/// Round half away from zero to `max` decimals, then drop trailing zeros
/// down to `min` decimals. Works on the shortest decimal rendering of
/// `value` so that 2.345 rounds to 2.35.
fn fixed_digits(value: f64, min: usize, max: usize) -> String {
    let repr = format!("{value}");
    let (int_part, frac_part) = repr.split_once('.').unwrap_or((repr.as_str(), ""));
    let mut digits: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().take(max))
        .map(|b| b - b'0')
        .collect();
    let mut frac_len = frac_part.len().min(max);

    if frac_part.as_bytes().get(max).is_some_and(|d| *d >= b'5') {
        let mut idx = digits.len();
        loop {
            if idx == 0 {
                digits.insert(0, 1);
                break;
            }
            idx -= 1;
            if digits[idx] == 9 {
                digits[idx] = 0;
            } else {
                digits[idx] += 1;
                break;
            }
        }
    }
    while frac_len > min && digits.last() == Some(&0) {
        digits.pop();
        frac_len -= 1;
    }

    let split = digits.len() - frac_len;
    let render = |ds: &[u8]| ds.iter().map(|d| char::from(b'0' + d)).collect::<String>();
    let mut out = render(&digits[..split]);
    if frac_len > 0 || min > 0 {
        out.push('.');
        out.push_str(&render(&digits[split..]));
        for _ in frac_len..min {
            out.push('0');
        }
    }
    out
}

fn group_thousands(digits: &str, separator: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3 * separator.len());
    for (idx, c) in digits.chars().enumerate() {
        if idx > 0 && (len - idx) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(c);
    }
    out
}

/// Convert `date` into `timezone` (UTC when absent or unknown)
pub fn zoned(date: DateTime<Utc>, timezone: Option<&str>) -> DateTime<FixedOffset> {
    match timezone.map(str::trim).filter(|tz| !tz.is_empty()) {
        Some(name) => match name.parse::<Tz>() {
            Ok(tz) => date.with_timezone(&tz).fixed_offset(),
            Err(_) => {
                tracing::warn!(timezone = %name, "Unknown timezone, formatting date in UTC");
                date.fixed_offset()
            }
        },
        None => date.fixed_offset(),
    }
}

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Longest tokens first so `MMMM` wins over `MM`
const TOKENS: [&str; 25] = [
    "YYYY", "MMMM", "dddd", "MMM", "ddd", "SSS", "YY", "MM", "Do", "DD", "HH", "hh", "mm", "ss",
    "ZZ", "M", "D", "H", "h", "m", "s", "A", "a", "Z", "X",
];

fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

fn offset_string(dt: &DateTime<FixedOffset>, colon: bool) -> String {
    let secs = dt.offset().local_minus_utc();
    let sign = if secs < 0 { '-' } else { '+' };
    let (hours, minutes) = (secs.abs() / 3600, secs.abs() % 3600 / 60);
    if colon {
        format!("{sign}{hours:02}:{minutes:02}")
    } else {
        format!("{sign}{hours:02}{minutes:02}")
    }
}

fn render_token(token: &str, dt: &DateTime<FixedOffset>) -> String {
    let hour12 = match dt.hour() % 12 {
        0 => 12,
        h => h,
    };
    match token {
        "YYYY" => format!("{:04}", dt.year()),
        "YY" => format!("{:02}", dt.year().rem_euclid(100)),
        "MMMM" => MONTHS[dt.month0() as usize].to_string(),
        "MMM" => MONTHS[dt.month0() as usize][..3].to_string(),
        "MM" => format!("{:02}", dt.month()),
        "M" => dt.month().to_string(),
        "Do" => ordinal(dt.day()),
        "DD" => format!("{:02}", dt.day()),
        "D" => dt.day().to_string(),
        "dddd" => WEEKDAYS[dt.weekday().num_days_from_monday() as usize].to_string(),
        "ddd" => WEEKDAYS[dt.weekday().num_days_from_monday() as usize][..3].to_string(),
        "HH" => format!("{:02}", dt.hour()),
        "H" => dt.hour().to_string(),
        "hh" => format!("{hour12:02}"),
        "h" => hour12.to_string(),
        "mm" => format!("{:02}", dt.minute()),
        "m" => dt.minute().to_string(),
        "ss" => format!("{:02}", dt.second()),
        "s" => dt.second().to_string(),
        "SSS" => format!("{:03}", dt.timestamp_subsec_millis()),
        "A" => if dt.hour() < 12 { "AM" } else { "PM" }.to_string(),
        "a" => if dt.hour() < 12 { "am" } else { "pm" }.to_string(),
        "Z" => offset_string(dt, true),
        "ZZ" => offset_string(dt, false),
        "X" => dt.timestamp().to_string(),
        other => other.to_string(),
    }
}

/// Render `date` with moment-style `format` tokens. Text inside `[...]`
/// is copied verbatim.
pub fn format_date(date: DateTime<Utc>, format: Option<&str>, timezone: Option<&str>) -> String {
    let dt = zoned(date, timezone);
    let format = format.unwrap_or(DEFAULT_DATE_FORMAT);

    let mut out = String::new();
    let mut rest = format;
    while !rest.is_empty() {
        if let Some(literal) = rest.strip_prefix('[') {
            match literal.find(']') {
                Some(end) => {
                    out.push_str(&literal[..end]);
                    rest = &literal[end + 1..];
                }
                None => {
                    out.push_str(literal);
                    rest = "";
                }
            }
            continue;
        }
        if let Some(token) = TOKENS.iter().find(|t| rest.starts_with(**t)) {
            out.push_str(&render_token(token, &dt));
            rest = &rest[token.len()..];
            continue;
        }
        let c = rest.chars().next().unwrap_or_default();
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }
    out
}
