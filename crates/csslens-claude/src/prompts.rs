//! System instructions and user prompt formatting.

use serde::Serialize;

use csslens_scrape::CssSnapshot;

/// Rules beyond this many are left out of the structure prompt.
pub const MAX_PROMPT_RULES: usize = 200;

pub const TOKENS_SYSTEM_PROMPT: &str = r#"You are a design system expert. Analyze the provided CSS data and extract the core design tokens.

Return ONLY valid JSON matching this exact schema, with no explanation or markdown:
{
  "colors": {
    "primary": "",
    "background": "",
    "surface": "",
    "text": "",
    "border": ""
  },
  "typography": {
    "fontFamily": "",
    "fontSize": "",
    "fontWeight": "",
    "lineHeight": ""
  },
  "radius": "",
  "shadow": "",
  "spacing": ""
}

Rules:
- Use actual CSS values (hex, rgb, rem, px, etc.)
- primary: the main brand/accent color used for buttons and links
- background: the page background color
- surface: card/panel background color (use background value if no distinct surface exists)
- text: the main body text color
- border: the default border/divider color
- typography fields describe body/paragraph text
- radius: the most common border-radius value
- shadow: the most common box-shadow value
- spacing: the base spacing unit (e.g. 4px, 8px, 1rem)
- If a value cannot be determined, use null"#;

pub const STRUCTURE_SYSTEM_PROMPT: &str = r#"You are a CSS architecture expert. Analyze the provided CSS data and return a structural analysis of the website.

Return ONLY valid JSON matching this exact schema, with no explanation or markdown:
{
  "components": [],
  "layout": "",
  "cssArchitecture": "",
  "colorMode": "",
  "complexity": ""
}

Rules:
- components: array of UI component types detected — e.g. ["button", "card", "navbar", "modal", "form", "badge", "table", "input", "dropdown"]
- layout: primary layout method — "flexbox", "grid", "table", or "mixed"
- cssArchitecture: the CSS methodology detected from class naming patterns —
    "utility-first" (Tailwind-style: bg-blue-500, flex, mt-4),
    "BEM" (.block__element--modifier),
    "CSS-in-JS" (hashed class names like css-1a2b3c),
    "SMACSS" (.l-header, .is-active),
    "plain" (semantic selectors, no methodology),
    or "mixed"
- colorMode: how theming works —
    "light-only", "dark-only",
    "light-default" (has dark mode via class/media query),
    "dark-default" (has light mode via class/media query),
    or "system" (follows prefers-color-scheme only)
- complexity: overall CSS complexity — "simple", "moderate", or "complex"
- If a value cannot be determined, use null"#;

/// User message for design-token extraction.
pub fn build_tokens_prompt(snapshot: &CssSnapshot) -> String {
    let mut parts = vec![format!("URL: {}", snapshot.url)];

    if snapshot.has_variables() {
        parts.push(format!("CSS Custom Properties:\n{}", pretty(&snapshot.css_variables)));
    }
    parts.push(format!("Computed Styles:\n{}", pretty(&snapshot.computed_styles)));

    parts.join("\n\n")
}

/// User message for structure analysis.
pub fn build_structure_prompt(snapshot: &CssSnapshot) -> String {
    let mut parts = vec![format!("URL: {}", snapshot.url)];

    let rules = &snapshot.stylesheet_rules;
    if !rules.is_empty() {
        let sample = &rules[..rules.len().min(MAX_PROMPT_RULES)];
        parts.push(format!(
            "CSS Rules ({} total, showing first {}):\n{}",
            rules.len(),
            sample.len(),
            sample.join("\n")
        ));
    }

    if snapshot.has_variables() {
        parts.push(format!("CSS Custom Properties:\n{}", pretty(&snapshot.css_variables)));
    }

    parts.join("\n\n")
}

fn pretty<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use csslens_scrape::{extract_css, HtmlDocument, PropertyMap};

    fn snapshot() -> CssSnapshot {
        let mut body = PropertyMap::new();
        body.insert("color".to_string(), "rgb(17, 17, 17)".to_string());
        let mut snapshot = CssSnapshot {
            url: "https://example.com/".into(),
            title: "Example".into(),
            ..Default::default()
        };
        snapshot.computed_styles.insert("body".into(), body);
        snapshot
    }

    #[test]
    fn test_tokens_prompt_omits_empty_variables() {
        let prompt = build_tokens_prompt(&snapshot());
        assert!(prompt.starts_with("URL: https://example.com/\n\nComputed Styles:\n"));
        assert!(!prompt.contains("CSS Custom Properties"));
        assert!(prompt.contains("\"color\": \"rgb(17, 17, 17)\""));
    }

    #[test]
    fn test_tokens_prompt_with_variables() {
        let mut snap = snapshot();
        snap.css_variables.insert("--brand".into(), "#ff5c8a".into());
        let prompt = build_tokens_prompt(&snap);

        let vars_at = prompt.find("CSS Custom Properties:\n{\n  \"--brand\": \"#ff5c8a\"\n}").unwrap();
        let styles_at = prompt.find("Computed Styles:").unwrap();
        assert!(vars_at < styles_at);
    }

    #[test]
    fn test_tokens_prompt_keeps_page_order() {
        let page = HtmlDocument::parse(
            "https://example.com/",
            r#"<html><head><style>a { color: #2563eb; } button { border-radius: 6px; }</style></head>
<body><h1>Title</h1><a href="/">Link</a><button>Go</button></body></html>"#,
        );
        let prompt = build_tokens_prompt(&extract_css(&page));

        let positions: Vec<usize> = ["\"body\": {", "\"h1\": {", "\"a\": {", "\"button\": {"]
            .iter()
            .map(|key| prompt.find(key).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));

        let anchor = prompt.find("\"a\": {").unwrap();
        let first_prop = prompt[anchor..].lines().nth(1).unwrap().trim();
        assert_eq!(first_prop, "\"color\": \"#2563eb\",");
    }

    #[test]
    fn test_structure_prompt_caps_rules() {
        let mut snap = snapshot();
        snap.stylesheet_rules = (0..450).map(|i| format!(".r{} {{ margin: {}px; }}", i, i)).collect();
        let prompt = build_structure_prompt(&snap);

        assert!(prompt.contains("CSS Rules (450 total, showing first 200):\n"));
        assert!(prompt.contains(".r199 { margin: 199px; }"));
        assert!(!prompt.contains(".r200 {"));
        assert_eq!(prompt.matches("margin:").count(), MAX_PROMPT_RULES);
    }

    #[test]
    fn test_structure_prompt_small_and_empty() {
        let mut snap = snapshot();
        assert_eq!(build_structure_prompt(&snap), "URL: https://example.com/");

        snap.stylesheet_rules = vec!["a { color: red; }".into(), "p { margin: 0px; }".into()];
        let prompt = build_structure_prompt(&snap);
        assert!(prompt.contains("CSS Rules (2 total, showing first 2):\na { color: red; }\np { margin: 0px; }"));
        assert!(!prompt.contains("CSS Custom Properties"));
    }
}
