//! The elements compared by the CSS suite and how each site exposes them.

use crate::locator::Locator;
use crate::style::GLOBAL_SKIP;

const RADIUS_CORNERS: [&str; 4] = [
    "borderTopLeftRadius",
    "borderTopRightRadius",
    "borderBottomLeftRadius",
    "borderBottomRightRadius",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub reference: Locator,
    pub target: Locator,
    /// Properties that cannot match between the sites for this element.
    pub skip: Vec<&'static str>,
    /// Properties whose mismatch fails the element.
    pub focus: Vec<&'static str>,
}

impl ElementSpec {
    fn new(
        name: &'static str,
        description: &'static str,
        reference: Locator,
        target: Locator,
        focus: &[&'static str],
    ) -> Self {
        // Computed styles only expose the radius longhands.
        let focus = focus
            .iter()
            .flat_map(|p| match *p {
                "borderRadius" => RADIUS_CORNERS.to_vec(),
                other => vec![other],
            })
            .collect();
        Self {
            name,
            description,
            reference,
            target,
            skip: GLOBAL_SKIP.to_vec(),
            focus,
        }
    }

    pub fn skips(&self, property: &str) -> bool {
        self.skip.contains(&property)
    }

    pub fn is_focus(&self, property: &str) -> bool {
        self.focus.contains(&property)
    }
}

fn css(selector: &str) -> Locator {
    Locator::css(selector)
}

fn script(expression: &str) -> Locator {
    Locator::script(expression)
}

const PADDING: [&str; 4] = ["paddingTop", "paddingRight", "paddingBottom", "paddingLeft"];

fn with_padding(head: &[&'static str], tail: &[&'static str]) -> Vec<&'static str> {
    head.iter()
        .chain(PADDING.iter())
        .chain(tail.iter())
        .copied()
        .collect()
}

/// Every compared element, in report order.
pub fn registry() -> Vec<ElementSpec> {
    let sidebar_link_focus = with_padding(
        &["fontSize", "lineHeight", "fontWeight", "color", "backgroundColor", "borderRadius"],
        &[],
    );

    vec![
        // page layout
        ElementSpec::new(
            "page-background",
            "Background area behind the content panel",
            css(".almond-layout"),
            css("[class*=\"docsWrapper\"]"),
            &["backgroundColor", "paddingLeft", "paddingRight", "paddingBottom"],
        ),
        ElementSpec::new(
            "content-panel",
            "White card containing content + TOC",
            css("#content-container"),
            css(".mintysaurus-panel"),
            &[
                "backgroundColor",
                "borderRadius",
                "borderTopWidth",
                "borderRightWidth",
                "borderBottomWidth",
                "borderLeftWidth",
                "borderTopColor",
                "borderRightColor",
                "borderBottomColor",
                "borderLeftColor",
                "paddingTop",
                "paddingRight",
                "paddingLeft",
                "overflowY",
                "boxShadow",
            ],
        ),
        ElementSpec::new(
            "content-row",
            "Flex row containing article + TOC",
            script("document.querySelector('#content-container > div')"),
            css(".mintysaurus-content-row"),
            &[
                "display",
                "flexDirection",
                "gap",
                "columnGap",
                "paddingLeft",
                "justifyContent",
                "maxWidth",
                "marginLeft",
                "marginRight",
            ],
        ),
        ElementSpec::new(
            "content-area",
            "Article content column",
            css("#content-area"),
            css(".mintysaurus-article"),
            &["maxWidth", "width", "overflowX"],
        ),
        // sidebar
        ElementSpec::new(
            "sidebar",
            "Left sidebar container",
            css("#sidebar-content"),
            css(".theme-doc-sidebar-container"),
            &["width", "minWidth", "backgroundColor", "borderRightWidth", "overflowY"],
        ),
        ElementSpec::new(
            "sidebar-link",
            "Normal sidebar link (inactive)",
            script(
                r#"(function() {
  var links = document.querySelectorAll('.sidebar-group a');
  for (var i = 0; i < links.length; i++) {
    if (getComputedStyle(links[i]).backgroundColor === 'rgba(0, 0, 0, 0)') return links[i];
  }
  return links[0] || null;
})()"#,
            ),
            css("ul.menu__list .menu__link:not(.menu__link--active):not(.menu__link--sublist):not(.menu__link--sublist-caret)"),
            &sidebar_link_focus,
        ),
        ElementSpec::new(
            "sidebar-link-active",
            "Active sidebar link",
            script(
                r#"(function() {
  var links = document.querySelectorAll('.sidebar-group a');
  for (var i = 0; i < links.length; i++) {
    if (getComputedStyle(links[i]).backgroundColor !== 'rgba(0, 0, 0, 0)') return links[i];
  }
  return null;
})()"#,
            ),
            script(
                r#"(function() {
  var links = document.querySelectorAll('.menu__link--active:not(.menu__link--sublist)');
  for (var i = 0; i < links.length; i++) {
    if (getComputedStyle(links[i]).pointerEvents !== 'none') return links[i];
  }
  return null;
})()"#,
            ),
            &sidebar_link_focus,
        ),
        ElementSpec::new(
            "sidebar-group-header",
            "Sidebar group header (e.g. \"Essentials\")",
            css(".sidebar-group-header"),
            css(".theme-doc-sidebar-item-category-level-1 > .menu__list-item-collapsible > .menu__link"),
            &[
                "fontSize",
                "fontWeight",
                "color",
                "lineHeight",
                "paddingLeft",
                "backgroundColor",
                "textTransform",
                "letterSpacing",
            ],
        ),
        // typography
        ElementSpec::new(
            "eyebrow",
            "Category label above page title",
            script(
                r#"(function() {
  var h = document.querySelector('#header');
  if (!h) return null;
  var d = h.querySelector('div');
  return d ? (d.children[0] || null) : null;
})()"#,
            ),
            css(".mintlify-eyebrow"),
            &["fontSize", "fontWeight", "color", "lineHeight", "marginBottom"],
        ),
        ElementSpec::new(
            "h1",
            "Page title (h1)",
            css("#header h1"),
            css(".theme-doc-markdown h1"),
            &[
                "fontSize",
                "fontWeight",
                "lineHeight",
                "letterSpacing",
                "color",
                "marginBottom",
                "marginTop",
            ],
        ),
        ElementSpec::new(
            "description",
            "Page subtitle/description below h1",
            css("#header .prose"),
            css(".mintlify-description"),
            &["fontSize", "lineHeight", "color", "fontWeight", "marginTop", "marginBottom"],
        ),
        ElementSpec::new(
            "h2",
            "Section heading (h2)",
            css("#content h2"),
            css(".theme-doc-markdown h2"),
            &[
                "fontSize",
                "fontWeight",
                "lineHeight",
                "letterSpacing",
                "color",
                "marginTop",
                "marginBottom",
                "paddingBottom",
                "borderBottomWidth",
            ],
        ),
        ElementSpec::new(
            "h3",
            "Subsection heading (h3)",
            css("#content h3"),
            css(".theme-doc-markdown h3"),
            &[
                "fontSize",
                "fontWeight",
                "lineHeight",
                "letterSpacing",
                "color",
                "marginTop",
                "marginBottom",
            ],
        ),
        ElementSpec::new(
            "body-paragraph",
            "Body text paragraph",
            script(
                r#"(function() {
  var spans = document.querySelectorAll('#content > span');
  for (var i = 0; i < spans.length; i++) {
    if (spans[i].textContent.trim().length > 20) return spans[i];
  }
  return spans[0] || null;
})()"#,
            ),
            script(
                r#"(function() {
  var ps = document.querySelectorAll('.theme-doc-markdown p');
  for (var i = 0; i < ps.length; i++) {
    if (!ps[i].classList.contains('mintlify-eyebrow') && !ps[i].classList.contains('mintlify-description')) return ps[i];
  }
  return null;
})()"#,
            ),
            &["fontSize", "lineHeight", "color", "fontWeight", "marginBottom"],
        ),
        ElementSpec::new(
            "body-link",
            "Inline link in body text",
            css("#content a:not([class])"),
            css(".theme-doc-markdown p a"),
            &["color", "fontWeight", "textDecoration"],
        ),
        ElementSpec::new(
            "unordered-list",
            "Unordered list (ul)",
            css("#content ul"),
            css(".theme-doc-markdown ul"),
            &["fontSize", "lineHeight", "color", "paddingLeft", "listStyleType", "marginBottom"],
        ),
        ElementSpec::new(
            "ordered-list",
            "Ordered list (ol)",
            css("#content ol"),
            css(".theme-doc-markdown ol"),
            &["fontSize", "lineHeight", "color", "paddingLeft", "listStyleType", "marginBottom"],
        ),
        ElementSpec::new(
            "list-item",
            "List item (li)",
            css("#content li"),
            css(".theme-doc-markdown li"),
            &["fontSize", "lineHeight", "marginBottom"],
        ),
        // table of contents
        ElementSpec::new(
            "toc-container",
            "Table of contents container",
            css("#table-of-contents"),
            css(".mintysaurus-toc"),
            &["fontSize", "paddingTop"],
        ),
        ElementSpec::new(
            "toc-heading",
            "\"On this page\" heading above TOC",
            script(
                r#"(function() {
  var toc = document.querySelector('#table-of-contents');
  if (!toc) return null;
  for (var i = 0; i < toc.children.length; i++) {
    if (toc.children[i].textContent.trim().toLowerCase().includes('on this page')) return toc.children[i];
  }
  return null;
})()"#,
            ),
            css(".toc-heading"),
            &["fontSize", "fontWeight", "color", "marginBottom", "lineHeight"],
        ),
        ElementSpec::new(
            "toc-link-h2",
            "TOC link for h2 heading (inactive, top-level)",
            script(
                r#"(function() {
  var links = document.querySelectorAll('#table-of-contents a');
  for (var i = 0; i < links.length; i++) {
    var cs = getComputedStyle(links[i]);
    if (cs.fontWeight === '500' && cs.borderLeftColor !== 'rgb(0, 150, 137)' && cs.paddingLeft === '16px') return links[i];
  }
  return links[2] || links[1] || null;
})()"#,
            ),
            script(
                r#"(function() {
  var links = document.querySelectorAll('.table-of-contents__link:not(.table-of-contents__link--active)');
  for (var i = 0; i < links.length; i++) {
    var li = links[i].closest('li');
    if (li && !li.classList.contains('toc-h3')) return links[i];
  }
  return links[0] || null;
})()"#,
            ),
            &[
                "fontSize",
                "fontWeight",
                "lineHeight",
                "color",
                "paddingTop",
                "paddingBottom",
                "paddingLeft",
                "borderLeftWidth",
                "borderLeftColor",
                "borderLeftStyle",
            ],
        ),
        ElementSpec::new(
            "toc-link-h3",
            "TOC link for h3 heading (indented)",
            script(
                r#"(function() {
  var links = document.querySelectorAll('#table-of-contents a');
  for (var i = 0; i < links.length; i++) {
    if (getComputedStyle(links[i]).fontWeight === '400') return links[i];
  }
  return null;
})()"#,
            ),
            script(
                r#"(function() {
  var li = document.querySelector('.table-of-contents li.toc-h3');
  return li ? li.querySelector('a') : null;
})()"#,
            ),
            &["fontSize", "fontWeight", "lineHeight", "color", "paddingLeft", "borderLeftWidth"],
        ),
        ElementSpec::new(
            "toc-link-active",
            "Active TOC link",
            script(
                r#"(function() {
  var links = document.querySelectorAll('#table-of-contents a');
  for (var i = 0; i < links.length; i++) {
    if (getComputedStyle(links[i]).borderLeftColor === 'rgb(0, 150, 137)') return links[i];
  }
  return null;
})()"#,
            ),
            css(".table-of-contents__link--active"),
            &[
                "fontSize",
                "fontWeight",
                "color",
                "borderLeftWidth",
                "borderLeftColor",
                "borderLeftStyle",
                "paddingLeft",
            ],
        ),
        // code
        ElementSpec::new(
            "code-block",
            "Fenced code block container",
            css(".code-block"),
            css("div[class*=\"codeBlockContainer\"]"),
            &[
                "borderRadius",
                "borderTopWidth",
                "borderTopColor",
                "borderRightWidth",
                "borderRightColor",
                "borderBottomWidth",
                "borderBottomColor",
                "borderLeftWidth",
                "borderLeftColor",
                "backgroundColor",
                "boxShadow",
                "marginBottom",
                "marginTop",
                "overflow",
            ],
        ),
        ElementSpec::new(
            "code-block-pre",
            "Code block pre/code element",
            script("document.querySelector('.code-block pre') || document.querySelector('.code-block code')"),
            css(".prism-code"),
            &with_padding(&["fontSize", "lineHeight"], &["borderRadius"]),
        ),
        ElementSpec::new(
            "inline-code",
            "Inline code element",
            script(
                r#"(function() {
  var codes = document.querySelectorAll('#content code');
  for (var i = 0; i < codes.length; i++) {
    if (!codes[i].closest('pre') && !codes[i].closest('.code-block')) return codes[i];
  }
  return null;
})()"#,
            ),
            script(
                r#"(function() {
  var codes = document.querySelectorAll('.theme-doc-markdown code');
  for (var i = 0; i < codes.length; i++) {
    if (!codes[i].closest('pre')) return codes[i];
  }
  return null;
})()"#,
            ),
            &with_padding(
                &["fontSize", "fontWeight", "color", "backgroundColor", "borderRadius"],
                &[],
            ),
        ),
        // pagination
        ElementSpec::new(
            "pagination",
            "Pagination nav container",
            css("#pagination"),
            css(".pagination-nav"),
            &["display", "gridTemplateColumns", "gap", "marginTop"],
        ),
        ElementSpec::new(
            "pagination-link",
            "Pagination link card",
            css("#pagination a"),
            css(".pagination-nav__link"),
            &with_padding(
                &["borderRadius", "borderTopWidth", "borderTopColor"],
                &["display", "flexDirection"],
            ),
        ),
        ElementSpec::new(
            "pagination-title",
            "Pagination link title text",
            script(
                r#"(function() {
  var a = document.querySelector('#pagination a');
  if (!a) return null;
  var els = a.querySelectorAll('span, div, p');
  for (var i = 0; i < els.length; i++) {
    if (parseFloat(getComputedStyle(els[i]).fontWeight) >= 500) return els[i];
  }
  return null;
})()"#,
            ),
            css(".pagination-nav__label"),
            &["fontSize", "fontWeight", "color"],
        ),
        ElementSpec::new(
            "pagination-sublabel",
            "Pagination \"Previous\"/\"Next\" sublabel",
            script(
                r#"(function() {
  var a = document.querySelector('#pagination a');
  if (!a) return null;
  var els = a.querySelectorAll('span, div, p');
  for (var i = 0; i < els.length; i++) {
    if (parseFloat(getComputedStyle(els[i]).fontWeight) < 500 && els[i].textContent.trim().length < 20) return els[i];
  }
  return null;
})()"#,
            ),
            css(".pagination-nav__sublabel"),
            &["fontSize", "fontWeight", "color", "textTransform", "letterSpacing"],
        ),
        // tables
        ElementSpec::new(
            "table",
            "Table element",
            css("table"),
            css(".theme-doc-markdown table"),
            &["fontSize", "borderCollapse"],
        ),
        ElementSpec::new(
            "table-header",
            "Table header cell (th)",
            css("th"),
            css(".theme-doc-markdown th"),
            &with_padding(
                &["fontSize", "fontWeight", "textTransform", "letterSpacing"],
                &["borderBottomWidth", "borderBottomColor"],
            ),
        ),
        ElementSpec::new(
            "table-cell",
            "Table data cell (td)",
            css("td"),
            css(".theme-doc-markdown td"),
            &with_padding(&["fontSize"], &["borderBottomWidth", "borderBottomColor"]),
        ),
        ElementSpec::new(
            "blockquote",
            "Blockquote element",
            css("blockquote"),
            css(".theme-doc-markdown blockquote"),
            &[
                "borderLeftWidth",
                "borderLeftColor",
                "borderLeftStyle",
                "paddingLeft",
                "paddingTop",
                "paddingBottom",
                "marginLeft",
                "marginTop",
                "marginBottom",
                "backgroundColor",
                "borderRadius",
                "color",
            ],
        ),
        ElementSpec::new(
            "admonition",
            "Admonition/callout box",
            css(".callout"),
            css(".theme-admonition"),
            &with_padding(&["borderRadius", "borderLeftWidth", "fontSize"], &[]),
        ),
        ElementSpec::new(
            "horizontal-rule",
            "Horizontal rule (hr)",
            css("#content hr"),
            css(".theme-doc-markdown hr"),
            &["borderTopWidth", "borderTopColor", "marginTop", "marginBottom"],
        ),
        ElementSpec::new(
            "code-block-title",
            "Code block title bar (e.g. filename)",
            script(
                r#"(function() {
  var blocks = document.querySelectorAll('.code-block');
  for (var i = 0; i < blocks.length; i++) {
    var title = blocks[i].querySelector('[class*="title"], [class*="filename"]');
    if (title && title.textContent.trim().length > 0) return title;
  }
  return null;
})()"#,
            ),
            css("[class*=\"codeBlockTitle\"]"),
            &with_padding(
                &["fontSize", "fontWeight", "color", "backgroundColor"],
                &["borderBottomWidth", "borderBottomColor"],
            ),
        ),
        ElementSpec::new(
            "h4",
            "Sub-subsection heading (h4)",
            css("#content h4"),
            css(".theme-doc-markdown h4"),
            &["fontSize", "fontWeight", "lineHeight", "color", "marginTop", "marginBottom"],
        ),
        ElementSpec::new(
            "navbar",
            "Top navigation bar",
            css("#navbar"),
            css(".navbar"),
            &[
                "height",
                "position",
                "backgroundColor",
                "borderBottomWidth",
                "boxShadow",
                "zIndex",
                "paddingLeft",
                "paddingRight",
            ],
        ),
    ]
}

/// Looks up one element by name.
pub fn find(name: &str) -> Option<ElementSpec> {
    registry().into_iter().find(|spec| spec.name == name)
}
