//! String renderings of numbers and booleans for provider-facing payloads

/// `true`/`false` as the provider's string literals
pub fn bool_string(v: Option<bool>) -> Option<String> {
    v.map(|b| if b { "true" } else { "false" }.to_string())
}

/// Round half away from zero and print without a fractional part
pub fn integer_string(v: Option<f64>) -> Option<String> {
    v.filter(|n| n.is_finite())
        .map(|n| format!("{}", round_half_up(n) as i64))
}

/// Fixed-point rendering with `dp` decimals (two when unspecified)
pub fn fixed_string(v: Option<f64>, dp: Option<usize>) -> Option<String> {
    v.filter(|n| n.is_finite())
        .map(|n| format!("{:.*}", dp.unwrap_or(2), n))
}

/// Rounds .5 towards positive infinity, the way the provider's examples do
fn round_half_up(n: f64) -> f64 {
    (n + 0.5).floor()
}

/// Compact number rendering: integral values lose the trailing `.0`
pub fn compact(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
