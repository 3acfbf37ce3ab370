//! Static HTML page document.
//!
//! Parses a fetched page with the `scraper` crate and answers the
//! [`PageDocument`] queries without a layout engine. Computed styles come
//! from a simplified cascade: bare type selectors and `*`, inline `style`
//! attributes, inheritance from `body` and the root, then initial values.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use crate::css::{flatten_style_rules, parse_declarations, split_rules, substitute_vars, CssRule};
use crate::document::{
    ComputedStyle, PageDocument, SheetAccessError, StyleSheet, CAPTURED_PROPERTIES, TARGET_ELEMENTS,
};

/// Properties that inherit from the parent when not declared.
const INHERITED_PROPERTIES: &[&str] = &[
    "color",
    "font-family",
    "font-size",
    "font-weight",
    "line-height",
    "letter-spacing",
];

fn initial_value(prop: &str) -> &'static str {
    match prop {
        "color" | "border-color" => "rgb(0, 0, 0)",
        "background-color" => "rgba(0, 0, 0, 0)",
        "font-family" => "serif",
        "font-size" => "16px",
        "font-weight" => "400",
        "line-height" | "letter-spacing" => "normal",
        "border-radius" | "padding" | "margin" | "border-width" => "0px",
        "box-shadow" | "border-style" | "text-decoration" => "none",
        "opacity" => "1",
        _ => "",
    }
}

/// A page parsed from static HTML.
#[derive(Debug, Clone)]
pub struct HtmlDocument {
    url: String,
    title: String,
    sheets: Vec<StyleSheet>,
    /// Style rules of each accessible sheet, parallel to `sheets`.
    style_rules: Vec<Vec<CssRule>>,
    /// Linked stylesheet hrefs not yet loaded.
    pending: BTreeSet<String>,
    root_inline: Vec<(String, String)>,
    /// Inline declarations of the first element of each sampled tag present.
    elements: HashMap<String, Vec<(String, String)>>,
}

impl HtmlDocument {
    /// Parse a page. Linked stylesheets start out pending until
    /// [`attach_stylesheet`](Self::attach_stylesheet) supplies them.
    pub fn parse(url: &str, html: &str) -> Self {
        let doc = Html::parse_document(html);

        let title = select_first(&doc, "title")
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        let mut sheets = Vec::new();
        let mut style_rules = Vec::new();
        let mut pending = BTreeSet::new();

        if let Ok(selector) = Selector::parse("style, link") {
            for el in doc.select(&selector) {
                match el.value().name() {
                    "style" => {
                        let rules = split_rules(&el.text().collect::<String>());
                        sheets.push(StyleSheet::inline(rules.iter().map(CssRule::css_text).collect()));
                        style_rules.push(flatten_style_rules(&rules));
                    }
                    _ if is_stylesheet_link(el) => {
                        let Some(href) = el.value().attr("href") else {
                            continue;
                        };
                        let href = resolve_href(url, href);
                        sheets.push(StyleSheet::inaccessible(
                            href.clone(),
                            SheetAccessError::Unavailable {
                                href: href.clone(),
                                reason: "not loaded".into(),
                            },
                        ));
                        style_rules.push(Vec::new());
                        pending.insert(href);
                    }
                    _ => {}
                }
            }
        }

        let root_inline = select_first(&doc, "html")
            .and_then(|el| el.value().attr("style"))
            .map(parse_declarations)
            .unwrap_or_default();

        let mut elements = HashMap::new();
        for tag in TARGET_ELEMENTS {
            if let Some(el) = select_first(&doc, tag) {
                let inline = el.value().attr("style").map(parse_declarations).unwrap_or_default();
                elements.insert(tag.to_string(), inline);
            }
        }

        debug!(
            "Parsed {}: {} stylesheets ({} pending), {} sampled elements",
            url,
            sheets.len(),
            pending.len(),
            elements.len()
        );

        Self {
            url: url.to_string(),
            title,
            sheets,
            style_rules,
            pending,
            root_inline,
            elements,
        }
    }

    /// Absolute hrefs of linked stylesheets still waiting for content.
    pub fn pending_stylesheets(&self) -> Vec<String> {
        self.pending.iter().cloned().collect()
    }

    /// Supply the content of a linked stylesheet, or the reason it is unreadable.
    pub fn attach_stylesheet(&mut self, href: &str, content: Result<String, SheetAccessError>) {
        if !self.pending.remove(href) {
            return;
        }
        for (sheet, rules) in self.sheets.iter_mut().zip(self.style_rules.iter_mut()) {
            if sheet.href.as_deref() != Some(href) {
                continue;
            }
            match &content {
                Ok(text) => {
                    let parsed = split_rules(text);
                    *sheet = StyleSheet::linked(href, parsed.iter().map(CssRule::css_text).collect());
                    *rules = flatten_style_rules(&parsed);
                }
                Err(e) => {
                    *sheet = StyleSheet::inaccessible(href, e.clone());
                    rules.clear();
                }
            }
        }
    }

    fn all_style_rules(&self) -> impl Iterator<Item = &CssRule> {
        self.style_rules.iter().flatten()
    }

    fn root_declarations(&self) -> Vec<(String, String)> {
        let mut decls = Vec::new();
        for rule in self.all_style_rules() {
            if rule.selectors().iter().any(|s| is_root_selector(s)) {
                decls.extend(parse_declarations(rule.block.as_deref().unwrap_or_default()));
            }
        }
        decls.extend(self.root_inline.iter().cloned());
        decls
    }

    fn root_variables(&self) -> BTreeMap<String, String> {
        self.root_declarations()
            .into_iter()
            .filter(|(prop, _)| prop.starts_with("--"))
            .collect()
    }

    /// Declarations applying to `tag` in cascade order, shorthands expanded.
    fn declared_for(&self, tag: &str) -> Vec<(String, String)> {
        let mut decls = Vec::new();
        for rule in self.all_style_rules() {
            if rule
                .selectors()
                .iter()
                .any(|s| s == "*" || s.eq_ignore_ascii_case(tag))
            {
                for (prop, value) in parse_declarations(rule.block.as_deref().unwrap_or_default()) {
                    decls.extend(expand_shorthand(prop, value));
                }
            }
        }
        if let Some(inline) = self.elements.get(tag) {
            for (prop, value) in inline.iter().cloned() {
                decls.extend(expand_shorthand(prop, value));
            }
        }
        decls
    }
}

impl PageDocument for HtmlDocument {
    fn location(&self) -> &str {
        &self.url
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn style_sheets(&self) -> &[StyleSheet] {
        &self.sheets
    }

    fn root_computed_style(&self) -> ComputedStyle {
        let vars = self.root_variables();
        ComputedStyle::new(
            self.root_declarations()
                .into_iter()
                .map(|(prop, value)| {
                    let value = substitute_vars(&value, &vars);
                    (prop, value)
                })
                .collect(),
        )
    }

    fn computed_style_of(&self, tag: &str) -> Option<ComputedStyle> {
        if !self.elements.contains_key(tag) {
            return None;
        }

        let vars = self.root_variables();
        let own = self.declared_for(tag);
        let body = if tag == "body" {
            Vec::new()
        } else {
            self.declared_for("body")
        };
        let root = self.root_declarations();

        let mut properties = Vec::with_capacity(CAPTURED_PROPERTIES.len() + vars.len());
        for prop in CAPTURED_PROPERTIES {
            let inherited = || {
                INHERITED_PROPERTIES
                    .contains(&prop)
                    .then(|| last_value(&body, prop).or_else(|| last_value(&root, prop)))
                    .flatten()
            };
            let value = last_value(&own, prop)
                .or_else(inherited)
                .unwrap_or(initial_value(prop));
            properties.push((prop.to_string(), substitute_vars(value, &vars)));
        }
        // Custom properties inherit from the root.
        properties.extend(vars.into_iter());

        Some(ComputedStyle::new(properties))
    }
}

/// Whether `href` shares the page's origin.
pub fn is_same_origin(page_url: &str, href: &str) -> bool {
    match (Url::parse(page_url), Url::parse(href)) {
        (Ok(page), Ok(sheet)) => page.origin() == sheet.origin(),
        _ => false,
    }
}

fn select_first<'a>(doc: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    doc.select(&selector).next()
}

fn is_stylesheet_link(el: ElementRef<'_>) -> bool {
    el.value()
        .attr("rel")
        .map(|rel| {
            rel.split_ascii_whitespace()
                .any(|token| token.eq_ignore_ascii_case("stylesheet"))
        })
        .unwrap_or(false)
}

fn resolve_href(page_url: &str, href: &str) -> String {
    Url::parse(page_url)
        .and_then(|base| base.join(href))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

fn is_root_selector(selector: &str) -> bool {
    selector == "*" || selector.eq_ignore_ascii_case(":root") || selector.eq_ignore_ascii_case("html")
}

fn last_value<'a>(decls: &'a [(String, String)], prop: &str) -> Option<&'a str> {
    decls
        .iter()
        .rev()
        .find(|(p, _)| p == prop)
        .map(|(_, v)| v.as_str())
}

/// Expand the shorthands that feed sampled longhands.
fn expand_shorthand(prop: String, value: String) -> Vec<(String, String)> {
    match prop.as_str() {
        "background" if (!value.contains(' ') && !value.contains('(')) || is_color(&value) => {
            vec![("background-color".to_string(), value)]
        }
        "border" => {
            let mut out = Vec::new();
            for token in value.split_whitespace() {
                let longhand = if is_border_style(token) {
                    "border-style"
                } else if token.starts_with(|c: char| c.is_ascii_digit() || c == '.')
                    || matches!(token, "thin" | "medium" | "thick")
                {
                    "border-width"
                } else {
                    "border-color"
                };
                out.push((longhand.to_string(), token.to_string()));
            }
            out
        }
        _ => vec![(prop, value)],
    }
}

fn is_color(value: &str) -> bool {
    let v = value.trim();
    v.starts_with('#')
        || v.starts_with("rgb")
        || v.starts_with("hsl")
        || v.starts_with("oklch")
        || v.starts_with("var(")
}

fn is_border_style(token: &str) -> bool {
    matches!(
        token,
        "none" | "hidden" | "dotted" | "dashed" | "solid" | "double" | "groove" | "ridge" | "inset" | "outset"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract_css;

    const PAGE: &str = r#"<!doctype html>
<html style="--density: compact">
<head>
  <title> Acme Docs </title>
  <link rel="stylesheet" href="/site.css">
  <link rel="stylesheet" href="https://cdn.example.net/fonts.css">
  <style>
    :root { --brand: #ff5c8a; --radius: 12px; }
    body { color: #111; font-family: Inter, sans-serif; background: #fafafa; }
    h1, h2 { font-weight: 700; }
    button { border-radius: var(--radius); border: 1px solid var(--brand); }
  </style>
</head>
<body>
  <h1 style="color: var(--brand)">Hello</h1>
  <p>Body copy</p>
  <button>Go</button>
</body>
</html>"#;

    fn parsed() -> HtmlDocument {
        HtmlDocument::parse("https://docs.example.com/start", PAGE)
    }

    #[test]
    fn test_title_and_sheets() {
        let doc = parsed();
        assert_eq!(doc.title(), "Acme Docs");
        assert_eq!(doc.style_sheets().len(), 3);
        assert_eq!(
            doc.pending_stylesheets(),
            vec![
                "https://cdn.example.net/fonts.css".to_string(),
                "https://docs.example.com/site.css".to_string(),
            ]
        );
    }

    #[test]
    fn test_attach_linked_sheet() {
        let mut doc = parsed();
        doc.attach_stylesheet(
            "https://docs.example.com/site.css",
            Ok("p { line-height: 1.6 }".into()),
        );
        doc.attach_stylesheet(
            "https://cdn.example.net/fonts.css",
            Err(SheetAccessError::CrossOrigin("https://cdn.example.net/fonts.css".into())),
        );
        assert!(doc.pending_stylesheets().is_empty());

        let snapshot = extract_css(&doc);
        assert_eq!(snapshot.stylesheet_rules[0], "p { line-height: 1.6; }");
        assert_eq!(snapshot.stylesheet_rules.len(), 5);
        assert_eq!(snapshot.computed_styles["p"]["line-height"], "1.6");
    }

    #[test]
    fn test_root_variables() {
        let snapshot = extract_css(&parsed());
        assert_eq!(snapshot.css_variables["--brand"], "#ff5c8a");
        assert_eq!(snapshot.css_variables["--radius"], "12px");
        assert_eq!(snapshot.css_variables["--density"], "compact");
    }

    #[test]
    fn test_cascade_and_inheritance() {
        let snapshot = extract_css(&parsed());

        let h1 = &snapshot.computed_styles["h1"];
        assert_eq!(h1["color"], "#ff5c8a");
        assert_eq!(h1["font-weight"], "700");
        assert_eq!(h1["font-family"], "Inter, sans-serif");

        let body = &snapshot.computed_styles["body"];
        assert_eq!(body["background-color"], "#fafafa");
        assert_eq!(body["margin"], "0px");

        let button = &snapshot.computed_styles["button"];
        assert_eq!(button["border-radius"], "12px");
        assert_eq!(button["border-style"], "solid");
        assert_eq!(button["border-width"], "1px");
        assert_eq!(button["border-color"], "#ff5c8a");
    }

    #[test]
    fn test_absent_elements() {
        let snapshot = extract_css(&parsed());
        assert!(!snapshot.computed_styles.contains_key("h3"));
        assert!(!snapshot.computed_styles.contains_key("input"));
        assert!(!snapshot.computed_styles.contains_key("a"));
    }

    #[test]
    fn test_same_origin() {
        assert!(is_same_origin("https://a.com/x", "https://a.com/y.css"));
        assert!(!is_same_origin("https://a.com/x", "https://cdn.a.com/y.css"));
        assert!(!is_same_origin("https://a.com/x", "http://a.com/y.css"));
    }
}
