/// Computed-style keys read from every audited element, grouped loosely by concern.
pub const ALL_PROPERTIES: &[&str] = &[
    // typography
    "fontSize",
    "fontWeight",
    "fontFamily",
    "fontStyle",
    "fontVariant",
    "lineHeight",
    "letterSpacing",
    "textTransform",
    "textDecoration",
    "textAlign",
    "textOverflow",
    "textIndent",
    "textShadow",
    "whiteSpace",
    "wordBreak",
    "overflowWrap",
    "wordSpacing",
    "color",
    // box model
    "display",
    "boxSizing",
    "width",
    "height",
    "maxWidth",
    "minWidth",
    "maxHeight",
    "minHeight",
    "paddingTop",
    "paddingRight",
    "paddingBottom",
    "paddingLeft",
    "marginTop",
    "marginRight",
    "marginBottom",
    "marginLeft",
    // background and borders
    "backgroundColor",
    "backgroundImage",
    "backgroundSize",
    "backgroundPosition",
    "backgroundRepeat",
    "borderTopWidth",
    "borderRightWidth",
    "borderBottomWidth",
    "borderLeftWidth",
    "borderTopStyle",
    "borderRightStyle",
    "borderBottomStyle",
    "borderLeftStyle",
    "borderTopColor",
    "borderRightColor",
    "borderBottomColor",
    "borderLeftColor",
    "borderTopLeftRadius",
    "borderTopRightRadius",
    "borderBottomLeftRadius",
    "borderBottomRightRadius",
    "boxShadow",
    "outline",
    "outlineWidth",
    "outlineStyle",
    "outlineColor",
    // positioning
    "position",
    "top",
    "right",
    "bottom",
    "left",
    "float",
    "clear",
    "verticalAlign",
    "zIndex",
    // flex
    "flexDirection",
    "flexWrap",
    "flexGrow",
    "flexShrink",
    "flexBasis",
    "justifyContent",
    "alignItems",
    "alignSelf",
    "alignContent",
    "gap",
    "columnGap",
    "rowGap",
    "order",
    // grid
    "gridTemplateColumns",
    "gridTemplateRows",
    "gridGap",
    "gridColumn",
    "gridRow",
    // overflow
    "overflow",
    "overflowX",
    "overflowY",
    "scrollBehavior",
    "scrollMarginTop",
    // visual
    "opacity",
    "visibility",
    "cursor",
    "pointerEvents",
    "transform",
    "transformOrigin",
    "transition",
    "transitionProperty",
    "transitionDuration",
    "transitionTimingFunction",
    "transitionDelay",
    // lists and tables
    "listStyleType",
    "listStylePosition",
    "borderCollapse",
    "borderSpacing",
    "tableLayout",
    // misc
    "content",
    "resize",
    "userSelect",
    "WebkitFontSmoothing",
];

/// Never compared: the two sites ship different typefaces.
pub const GLOBAL_SKIP: &[&str] = &["fontFamily"];

/// Animation-only properties with no effect on the settled rendering.
pub const TRANSITION_PROPERTIES: &[&str] = &[
    "transition",
    "transitionProperty",
    "transitionDuration",
    "transitionTimingFunction",
    "transitionDelay",
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn property_list_has_no_duplicates() {
        let unique: HashSet<_> = ALL_PROPERTIES.iter().collect();
        assert_eq!(unique.len(), ALL_PROPERTIES.len());
        assert!(ALL_PROPERTIES.contains(&"WebkitFontSmoothing"));
        for p in GLOBAL_SKIP.iter().chain(TRANSITION_PROPERTIES) {
            assert!(ALL_PROPERTIES.contains(p), "{p} missing from list");
        }
    }
}
