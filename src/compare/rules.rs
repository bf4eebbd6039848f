use std::collections::BTreeMap;

use super::{leading_number, BrandPalette, ComparisonResult, Rgba, Tolerance};
use crate::style::normalize;

fn is_color_property(property: &str) -> bool {
    property.to_ascii_lowercase().contains("color")
}

fn width_of(styles: &BTreeMap<String, String>, key: &str) -> f64 {
    styles
        .get(key)
        .and_then(|v| leading_number(v))
        .unwrap_or(0.0)
}

fn border_style_irrelevant(
    property: &str,
    reference: &BTreeMap<String, String>,
    target: &BTreeMap<String, String>,
) -> bool {
    let side = match property {
        "borderTopStyle" => "borderTopWidth",
        "borderRightStyle" => "borderRightWidth",
        "borderBottomStyle" => "borderBottomWidth",
        "borderLeftStyle" => "borderLeftWidth",
        _ => return false,
    };
    width_of(reference, side) == 0.0 && width_of(target, side) == 0.0
}

fn outline_irrelevant(
    property: &str,
    reference: &BTreeMap<String, String>,
    target: &BTreeMap<String, String>,
) -> bool {
    if property != "outlineColor" && property != "outline" {
        return false;
    }
    let none = |s: &BTreeMap<String, String>| {
        s.get("outlineStyle").map(String::as_str) == Some("none")
    };
    (none(reference) && none(target))
        || (width_of(reference, "outlineWidth") == 0.0 && width_of(target, "outlineWidth") == 0.0)
}

/// Decides whether one property matches across the two sites.
///
/// The rules are tried in order and the first one that matches wins; the
/// snapshots supply the sibling width/style values the border and outline
/// rules depend on.
pub fn compare_values(
    property: &str,
    reference: Option<&str>,
    target: Option<&str>,
    tolerance: &Tolerance,
    palette: &BrandPalette,
    reference_styles: &BTreeMap<String, String>,
    target_styles: &BTreeMap<String, String>,
) -> ComparisonResult {
    let a = normalize(property, reference);
    let b = normalize(property, target);

    if a == b {
        return ComparisonResult::exact();
    }

    if border_style_irrelevant(property, reference_styles, target_styles) {
        return ComparisonResult::noted("border-style irrelevant (width is 0)");
    }

    if outline_irrelevant(property, reference_styles, target_styles) {
        return ComparisonResult::noted("outline irrelevant (style is none)");
    }

    let color_bearing = is_color_property(property);
    let parsed = (Rgba::parse(&a), Rgba::parse(&b));

    if color_bearing {
        if let (Some(ca), Some(cb)) = parsed {
            let eps = palette.channel_epsilon;
            if ca.is_near_rgb(palette.reference_primary, eps)
                && cb.is_near_rgb(palette.target_primary, eps)
            {
                let translucent = ca.is_transparent(palette.translucent_below)
                    && cb.is_transparent(palette.translucent_below);
                if translucent && (ca.a - cb.a).abs() <= palette.alpha_epsilon {
                    return ComparisonResult::noted("both are primary color with same alpha");
                }
                return ComparisonResult::noted("both are primary color");
            }
        }
    }

    if color_bearing || property == "boxShadow" {
        if let (Some(ca), Some(cb)) = parsed {
            if ca.channel_distance(&cb) <= tolerance.color && (ca.a - cb.a).abs() <= tolerance.alpha
            {
                return ComparisonResult::noted("color within tolerance");
            }
        }
    }

    if a.ends_with("px") && b.ends_with("px") {
        if let (Some(na), Some(nb)) = (leading_number(&a), leading_number(&b)) {
            if (na - nb).abs() <= tolerance.px {
                return ComparisonResult::noted(format!("within {}px tolerance", tolerance.px));
            }
        }
    }

    ComparisonResult::mismatch(format!("\"{a}\" vs \"{b}\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn styles(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn cmp(property: &str, a: &str, b: &str) -> ComparisonResult {
        compare_values(
            property,
            Some(a),
            Some(b),
            &Tolerance::default(),
            &BrandPalette::default(),
            &BTreeMap::new(),
            &BTreeMap::new(),
        )
    }

    #[test]
    fn every_value_matches_itself() {
        for (prop, value) in [
            ("color", "rgb(1, 2, 3)"),
            ("display", "flex"),
            ("paddingTop", "12px"),
            ("fontFamily", "Inter"),
            ("boxShadow", "none"),
        ] {
            let result = cmp(prop, value, value);
            assert!(result.matched, "{prop} should match itself");
            assert!(result.note.is_none());
        }
    }

    #[test]
    fn border_style_ignored_when_both_widths_are_zero() {
        let zero = styles(&[("borderTopWidth", "0px")]);
        let result = compare_values(
            "borderTopStyle",
            Some("solid"),
            Some("none"),
            &Tolerance::default(),
            &BrandPalette::default(),
            &zero,
            &zero,
        );
        assert_eq!(
            result,
            ComparisonResult::noted("border-style irrelevant (width is 0)")
        );

        let wide = styles(&[("borderTopWidth", "1px")]);
        let result = compare_values(
            "borderTopStyle",
            Some("solid"),
            Some("none"),
            &Tolerance::default(),
            &BrandPalette::default(),
            &wide,
            &zero,
        );
        assert!(!result.matched);
    }

    #[test]
    fn outline_color_ignored_when_outline_is_none() {
        let none = styles(&[("outlineStyle", "none"), ("outlineWidth", "3px")]);
        let result = compare_values(
            "outlineColor",
            Some("rgb(0, 0, 0)"),
            Some("rgb(255, 0, 0)"),
            &Tolerance::default(),
            &BrandPalette::default(),
            &none,
            &none,
        );
        assert_eq!(
            result,
            ComparisonResult::noted("outline irrelevant (style is none)")
        );
    }

    #[test]
    fn brand_primaries_are_equivalent() {
        let result = cmp("color", "rgb(0, 150, 137)", "rgb(22, 110, 63)");
        assert_eq!(result, ComparisonResult::noted("both are primary color"));

        let result = cmp(
            "backgroundColor",
            "rgba(0, 150, 137, 0.1)",
            "rgba(22, 110, 63, 0.11)",
        );
        assert_eq!(
            result,
            ComparisonResult::noted("both are primary color with same alpha")
        );

        let swapped = cmp("color", "rgb(22, 110, 63)", "rgb(0, 150, 137)");
        assert!(!swapped.matched);
    }

    #[test]
    fn colors_within_tolerance_match() {
        let result = cmp("color", "rgb(10, 10, 10)", "rgb(13, 8, 10)");
        assert_eq!(result, ComparisonResult::noted("color within tolerance"));

        let result = cmp("color", "rgb(10, 10, 10)", "rgb(14, 10, 10)");
        assert!(!result.matched);

        let result = cmp(
            "boxShadow",
            "rgba(0, 0, 0, 0.1) 0px 1px 2px 0px",
            "rgba(0, 0, 0, 0.12) 0px 1px 3px 0px",
        );
        assert_eq!(result, ComparisonResult::noted("color within tolerance"));
    }

    #[test]
    fn px_values_use_inclusive_tolerance() {
        let result = cmp("paddingTop", "10px", "11px");
        assert_eq!(result, ComparisonResult::noted("within 1px tolerance"));

        let result = cmp("paddingTop", "10px", "11.5px");
        assert_eq!(result, ComparisonResult::mismatch("\"10px\" vs \"11.5px\""));
    }

    #[test]
    fn non_px_values_need_exact_match() {
        let result = cmp("lineHeight", "1.5", "1.6");
        assert_eq!(result, ComparisonResult::mismatch("\"1.5\" vs \"1.6\""));
        let result = cmp("display", "block", "flex");
        assert!(!result.matched);
    }
}
