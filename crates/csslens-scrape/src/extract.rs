//! Snapshot extraction over a [`PageDocument`].

use tracing::debug;

use crate::document::{PageDocument, CAPTURED_PROPERTIES, TARGET_ELEMENTS};
use crate::snapshot::{CssSnapshot, PropertyMap};

/// Capture the raw CSS of the current document.
///
/// Sheets that refuse rule access are skipped without error. Every access
/// failure is treated this way, not only cross-origin ones.
pub fn extract_css(document: &dyn PageDocument) -> CssSnapshot {
    let mut snapshot = CssSnapshot {
        url: document.location().to_string(),
        title: document.title().to_string(),
        ..Default::default()
    };

    // 1. Stylesheet rules
    for sheet in document.style_sheets() {
        match sheet.css_rules() {
            Ok(rules) => snapshot.stylesheet_rules.extend(rules.iter().cloned()),
            Err(e) => debug!("Skipping stylesheet: {}", e),
        }
    }

    // 2. Custom properties on the root element
    let root_style = document.root_computed_style();
    for prop in root_style.property_names() {
        if prop.starts_with("--") {
            snapshot.css_variables.insert(
                prop.to_string(),
                root_style.get_property_value(prop).trim().to_string(),
            );
        }
    }

    // 3. Computed styles of key semantic elements
    for tag in TARGET_ELEMENTS {
        let Some(computed) = document.computed_style_of(tag) else {
            continue;
        };
        let values: PropertyMap = CAPTURED_PROPERTIES
            .iter()
            .map(|prop| (prop.to_string(), computed.get_property_value(prop).to_string()))
            .collect();
        snapshot.computed_styles.insert(tag.to_string(), values);
    }

    debug!(
        "Extracted {}: {} rules, {} variables, {} elements",
        snapshot.url,
        snapshot.stylesheet_rules.len(),
        snapshot.css_variables.len(),
        snapshot.computed_styles.len()
    );

    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ComputedStyle, SheetAccessError, StyleSheet};

    struct FakeDocument {
        sheets: Vec<StyleSheet>,
        present: Vec<&'static str>,
    }

    impl PageDocument for FakeDocument {
        fn location(&self) -> &str {
            "https://example.com/"
        }

        fn title(&self) -> &str {
            "Example"
        }

        fn style_sheets(&self) -> &[StyleSheet] {
            &self.sheets
        }

        fn root_computed_style(&self) -> ComputedStyle {
            ComputedStyle::new(vec![
                ("color".into(), "rgb(0, 0, 0)".into()),
                ("--brand".into(), "  #ff5c8a ".into()),
                ("--space".into(), "8px".into()),
            ])
        }

        fn computed_style_of(&self, tag: &str) -> Option<ComputedStyle> {
            self.present
                .contains(&tag)
                .then(|| ComputedStyle::new(vec![("color".into(), format!("{}-color", tag))]))
        }
    }

    fn fake(present: Vec<&'static str>) -> FakeDocument {
        FakeDocument {
            sheets: vec![
                StyleSheet::inline(vec!["body { margin: 0px; }".into()]),
                StyleSheet::inaccessible(
                    "https://cdn.example.net/x.css",
                    SheetAccessError::CrossOrigin("https://cdn.example.net/x.css".into()),
                ),
                StyleSheet::linked("https://example.com/site.css", vec!["h1 { color: red; }".into()]),
            ],
            present,
        }
    }

    #[test]
    fn test_skips_inaccessible_sheets() {
        let snapshot = extract_css(&fake(vec!["body"]));
        assert_eq!(
            snapshot.stylesheet_rules,
            vec!["body { margin: 0px; }", "h1 { color: red; }"]
        );
    }

    #[test]
    fn test_collects_only_custom_properties() {
        let snapshot = extract_css(&fake(vec!["body"]));
        assert_eq!(snapshot.css_variables.len(), 2);
        assert_eq!(snapshot.css_variables["--brand"], "#ff5c8a");
        assert!(!snapshot.css_variables.contains_key("color"));
    }

    #[test]
    fn test_absent_elements_skipped() {
        let snapshot = extract_css(&fake(vec!["body", "h1", "button"]));
        assert_eq!(snapshot.computed_styles.len(), 3);
        assert!(!snapshot.computed_styles.contains_key("input"));

        let h1 = &snapshot.computed_styles["h1"];
        assert_eq!(h1.len(), CAPTURED_PROPERTIES.len());
        assert_eq!(h1["color"], "h1-color");
        assert_eq!(h1["opacity"], "");
    }

    #[test]
    fn test_sampling_order_kept() {
        let snapshot = extract_css(&fake(vec!["button", "h1", "body"]));
        let tags: Vec<&str> = snapshot.computed_styles.keys().map(String::as_str).collect();
        assert_eq!(tags, vec!["body", "h1", "button"]);

        let props: Vec<&str> = snapshot.computed_styles["h1"]
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(props, CAPTURED_PROPERTIES.to_vec());
    }
}
