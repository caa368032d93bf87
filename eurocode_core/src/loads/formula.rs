//! Formula rendering
//!
//! Turns the [`Term`] list of a combination into text. Terms are joined with
//! `" + "`, factors with `"×"`, and each factor is printed with at most a fixed
//! number of significant digits when that loses nothing. The formula therefore
//! re-evaluates to exactly the result it is shown with.
//!
//! Two styles are available:
//!
//! - [`FormulaStyle::Symbolic`] names each load: `1.35×Poids propre + 1.5×Neige`
//! - [`FormulaStyle::Numeric`] uses the load values: `1.35×25 + 1.5×15`
//!
//! Load names are free user text. Control characters and whitespace runs are
//! collapsed to a single space so a name never breaks the one-line layout, and
//! a blank name is replaced by the load symbol (G1, Q2, ...).

use serde::{Deserialize, Serialize};

use super::combinations::{Combination, Term};

/// How loads appear in a rendered formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormulaStyle {
    /// Loads by name
    #[default]
    Symbolic,
    /// Loads by characteristic value
    Numeric,
}

/// Format a coefficient with `significant_digits` significant digits,
/// dropping trailing zeros.
///
/// Rounding is only applied when it is exact. A value that needs more digits
/// (a custom ψ of 0.33333, or 1234.5 at 3 digits) is printed in its shortest
/// round-trip form instead, since the combination result is computed from the
/// unrounded value.
///
/// # Example
/// ```
/// use eurocode_core::loads::format_coefficient;
///
/// assert_eq!(format_coefficient(1.35, 3), "1.35");
/// assert_eq!(format_coefficient(1.5, 3), "1.5");
/// assert_eq!(format_coefficient(0.7, 3), "0.7");
/// assert_eq!(format_coefficient(0.125, 2), "0.125");
/// assert_eq!(format_coefficient(0.0, 3), "0");
/// ```
pub fn format_coefficient(value: f64, significant_digits: usize) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return value.to_string();
    }
    let magnitude = value.abs().log10().floor() as i64;
    let decimals = (significant_digits.max(1) as i64 - 1 - magnitude).max(0) as usize;
    let text = format!("{:.*}", decimals, value);
    if text.parse::<f64>() != Ok(value) {
        return value.to_string();
    }
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}

/// Clean a user-supplied load name for single-line display
pub fn sanitize_name(name: &str, fallback: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        fallback.to_string()
    } else {
        collapsed
    }
}

fn format_value(value: f64) -> String {
    if value < 0.0 {
        format!("({})", value)
    } else {
        value.to_string()
    }
}

/// Render a single term
pub fn format_term(term: &Term, style: FormulaStyle, significant_digits: usize) -> String {
    let mut out = String::new();
    for factor in &term.factors {
        out.push_str(&format_coefficient(factor.value, significant_digits));
        out.push('×');
    }
    match style {
        FormulaStyle::Symbolic => out.push_str(&sanitize_name(&term.load_name, &term.symbol)),
        FormulaStyle::Numeric => out.push_str(&format_value(term.load_value)),
    }
    out
}

/// Render a full formula from its terms
pub fn format_formula(terms: &[Term], style: FormulaStyle, significant_digits: usize) -> String {
    if terms.is_empty() {
        return "0".to_string();
    }
    terms
        .iter()
        .map(|term| format_term(term, style, significant_digits))
        .collect::<Vec<_>>()
        .join(" + ")
}

/// One-line display string: `<name> : <formula> = <result>`
///
/// The result is printed with two decimals.
pub fn display_string(combination: &Combination, style: FormulaStyle, significant_digits: usize) -> String {
    format!(
        "{} : {} = {:.2}",
        combination.name,
        format_formula(&combination.terms, style, significant_digits),
        combination.result
    )
}
