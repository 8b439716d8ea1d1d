//! Conversion between stored fractions and displayed percentages.
//!
//! Fractions are persisted as decimals (`0.02`) and shown to people as
//! percentages (`"2.0000"`). Both directions return fixed-precision strings
//! so that a value survives a display/edit/save cycle without picking up
//! binary floating-point noise.
//!
//! An empty string is the "no value" sentinel everywhere in this module.
//! Zero is a value and never formats as empty.

/// Precision used when showing a percentage.
pub const DISPLAY_DECIMALS: usize = 4;

/// Precision used when turning an edited percentage back into a stored fraction.
pub const STORAGE_DECIMALS: usize = 6;

/// Placeholder shown instead of an empty percentage.
pub const EMPTY_PLACEHOLDER: &str = "—";

/// Anything that may carry a numeric fraction: numbers, optional numbers,
/// and text as it comes out of forms or text columns.
pub trait FractionInput {
    /// Returns the finite value, or `None` when absent, blank or unparseable.
    fn to_fraction(&self) -> Option<f64>;
}

impl FractionInput for f64 {
    fn to_fraction(&self) -> Option<f64> {
        self.is_finite().then_some(*self)
    }
}

impl FractionInput for str {
    fn to_fraction(&self) -> Option<f64> {
        parse_number(self)
    }
}

impl FractionInput for String {
    fn to_fraction(&self) -> Option<f64> {
        parse_number(self)
    }
}

impl<T: FractionInput + ?Sized> FractionInput for &T {
    fn to_fraction(&self) -> Option<f64> {
        (**self).to_fraction()
    }
}

impl<T: FractionInput> FractionInput for Option<T> {
    fn to_fraction(&self) -> Option<f64> {
        self.as_ref().and_then(FractionInput::to_fraction)
    }
}

/// Parses user-entered numeric text. Surrounding whitespace is ignored.
fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Fixed-point rendering; never produces a signed zero.
fn fixed(value: f64, decimals: usize) -> String {
    let rendered = format!("{:.*}", decimals, value);
    match rendered.strip_prefix('-') {
        Some(rest) if rest.chars().all(|c| c == '0' || c == '.') => rest.to_string(),
        _ => rendered,
    }
}

/// Renders a stored fraction as a percentage with `decimals` digits.
///
/// ```
/// use perfume_formulary::domain::percent::fraction_to_percent;
///
/// assert_eq!(fraction_to_percent(0.02, 4), "2.0000");
/// assert_eq!(fraction_to_percent(None::<f64>, 4), "");
/// assert_eq!(fraction_to_percent("0.5", 2), "50.00");
/// ```
pub fn fraction_to_percent(fraction: impl FractionInput, decimals: usize) -> String {
    match fraction.to_fraction() {
        Some(value) => fixed(value * 100.0, decimals),
        None => String::new(),
    }
}

/// Turns an edited percentage back into a fraction string with `decimals` digits.
///
/// ```
/// use perfume_formulary::domain::percent::percent_to_fraction;
///
/// assert_eq!(percent_to_fraction("2", 6), "0.020000");
/// assert_eq!(percent_to_fraction("", 6), "");
/// ```
pub fn percent_to_fraction(percent: &str, decimals: usize) -> String {
    match parse_number(percent) {
        Some(value) => fixed(value / 100.0, decimals),
        None => String::new(),
    }
}

/// Percentage for display: `"2.0000%"`, or an em-dash when there is no value.
pub fn format_percent_display(fraction: impl FractionInput, decimals: usize) -> String {
    let percent = fraction_to_percent(fraction, decimals);
    if percent.is_empty() {
        EMPTY_PLACEHOLDER.to_string()
    } else {
        format!("{percent}%")
    }
}

/// Canonical fraction string used for comparisons.
pub fn normalize_fraction(fraction: impl FractionInput, decimals: usize) -> String {
    match fraction.to_fraction() {
        Some(value) => fixed(value, decimals),
        None => String::new(),
    }
}

/// Reports whether an edited percentage differs from the stored fraction.
///
/// Both sides are normalized to `decimals` fraction digits first, so `"2"`
/// against a stored `0.0200000004` is not a change.
pub fn fraction_changed(original: impl FractionInput, edited_percent: &str, decimals: usize) -> bool {
    let edited = percent_to_fraction(edited_percent, decimals);
    normalize_fraction(original, decimals) != normalize_fraction(edited.as_str(), decimals)
}
