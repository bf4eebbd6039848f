//! Tolerance-based comparison of computed style values.

pub mod color;
pub mod rules;

use serde::{Deserialize, Serialize};

pub use color::{colors_close, Rgba};
pub use rules::compare_values;

/// Allowed drift between the two sites before a property counts as different.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerance {
    /// Absolute difference for `px` lengths.
    pub px: f64,
    /// Per-channel difference for colors (0-255).
    pub color: f64,
    /// Alpha difference for colors (0-1).
    pub alpha: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            px: 1.0,
            color: 3.0,
            alpha: 0.03,
        }
    }
}

impl Tolerance {
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [("px", self.px), ("color", self.color), ("alpha", self.alpha)] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!(
                    "tolerance.{name} must be a non-negative number (got {value})"
                ));
            }
        }
        Ok(())
    }
}

/// Each site's brand color. A property painted with the reference primary on
/// one side and the target primary on the other is treated as equal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrandPalette {
    pub reference_primary: [u8; 3],
    pub target_primary: [u8; 3],
    pub channel_epsilon: f64,
    pub alpha_epsilon: f64,
    /// Alphas below this count as a translucent tint of the primary.
    pub translucent_below: f64,
}

impl Default for BrandPalette {
    fn default() -> Self {
        Self {
            reference_primary: [0, 150, 137],
            target_primary: [22, 110, 63],
            channel_epsilon: 5.0,
            alpha_epsilon: 0.02,
            translucent_below: 0.95,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    #[serde(rename = "match")]
    pub matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ComparisonResult {
    pub fn exact() -> Self {
        Self {
            matched: true,
            note: None,
            reason: None,
        }
    }

    pub fn noted(note: impl Into<String>) -> Self {
        Self {
            matched: true,
            note: Some(note.into()),
            reason: None,
        }
    }

    pub fn mismatch(reason: impl Into<String>) -> Self {
        Self {
            matched: false,
            note: None,
            reason: Some(reason.into()),
        }
    }
}

/// Parses the longest numeric prefix of `raw` the way browsers read CSS
/// lengths out of computed styles: `"10px"` is 10, `"-0.5em"` is -0.5,
/// `"auto"` has no number.
pub fn leading_number(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start || digits > 0 {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }
    s[..end].parse().ok()
}
