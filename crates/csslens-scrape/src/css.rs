//! Minimal CSS text handling: rule splitting, serialization, declarations.
//!
//! This is not a conforming CSS parser. It understands enough structure
//! (blocks, strings, comments) to split a stylesheet into top-level rules
//! and read declaration blocks.

use std::collections::BTreeMap;

/// At-rules whose block contains rules rather than declarations.
const GROUPING_AT_RULES: &[&str] = &["media", "supports", "layer", "container", "document", "scope"];

/// Cycles like `--a: var(--a)` stop expanding here.
const MAX_VAR_DEPTH: usize = 8;

/// One top-level rule.
#[derive(Debug, Clone, PartialEq)]
pub struct CssRule {
    /// Selector list or at-rule prelude, whitespace collapsed.
    pub prelude: String,
    /// Block contents; `None` for statement at-rules like `@import`.
    pub block: Option<String>,
}

impl CssRule {
    fn at_rule_name(&self) -> Option<String> {
        let rest = self.prelude.strip_prefix('@')?;
        let name: String = rest
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
            .collect();
        Some(name.to_ascii_lowercase())
    }

    /// Whether the block holds nested rules (`@media`, `@supports`, ...).
    pub fn is_grouping(&self) -> bool {
        self.at_rule_name()
            .map(|name| GROUPING_AT_RULES.contains(&name.as_str()))
            .unwrap_or(false)
    }

    /// Serialized text in the shape browsers report as `cssText`.
    pub fn css_text(&self) -> String {
        match &self.block {
            None => format!("{};", self.prelude),
            Some(block) if self.is_grouping() => {
                let inner: Vec<String> = split_rules(block).iter().map(CssRule::css_text).collect();
                if inner.is_empty() {
                    format!("{} {{ }}", self.prelude)
                } else {
                    format!("{} {{ {} }}", self.prelude, inner.join(" "))
                }
            }
            Some(block) => {
                let decls: Vec<String> = parse_declarations(block)
                    .into_iter()
                    .map(|(prop, value)| format!("{}: {};", prop, value))
                    .collect();
                if decls.is_empty() {
                    format!("{} {{ }}", self.prelude)
                } else {
                    format!("{} {{ {} }}", self.prelude, decls.join(" "))
                }
            }
        }
    }

    /// Selector list of a style rule, split on top-level commas.
    pub fn selectors(&self) -> Vec<String> {
        if self.prelude.starts_with('@') {
            return Vec::new();
        }
        split_top_level(&self.prelude, ',')
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Split stylesheet text into top-level rules. Comments are dropped.
pub fn split_rules(text: &str) -> Vec<CssRule> {
    let text = strip_comments(text);
    let mut rules = Vec::new();
    let mut prelude = String::new();
    let mut block = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in text.chars() {
        if let Some(q) = quote {
            if depth == 0 {
                prelude.push(c);
            } else {
                block.push(c);
            }
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '"' | '\'' => {
                quote = Some(c);
                if depth == 0 {
                    prelude.push(c);
                } else {
                    block.push(c);
                }
            }
            '{' => {
                if depth > 0 {
                    block.push(c);
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    let head = collapse_whitespace(&prelude);
                    if !head.is_empty() {
                        rules.push(CssRule {
                            prelude: head,
                            block: Some(block.trim().to_string()),
                        });
                    }
                    prelude.clear();
                    block.clear();
                } else {
                    block.push(c);
                }
            }
            ';' if depth == 0 => {
                let head = collapse_whitespace(&prelude);
                if head.starts_with('@') {
                    rules.push(CssRule {
                        prelude: head,
                        block: None,
                    });
                }
                prelude.clear();
            }
            _ => {
                if depth == 0 {
                    prelude.push(c);
                } else {
                    block.push(c);
                }
            }
        }
    }

    // Unclosed blocks are closed at end of input.
    if depth > 0 {
        let head = collapse_whitespace(&prelude);
        if !head.is_empty() {
            rules.push(CssRule {
                prelude: head,
                block: Some(block.trim().to_string()),
            });
        }
    }

    rules
}

/// Style rules at any grouping depth, in source order.
pub fn flatten_style_rules(rules: &[CssRule]) -> Vec<CssRule> {
    let mut out = Vec::new();
    for rule in rules {
        match &rule.block {
            Some(block) if rule.is_grouping() => out.extend(flatten_style_rules(&split_rules(block))),
            Some(_) if !rule.prelude.starts_with('@') => out.push(rule.clone()),
            _ => {}
        }
    }
    out
}

/// Parse a declaration block into `(property, value)` pairs in source order.
///
/// Standard property names are lowercased; custom property names keep their case.
pub fn parse_declarations(block: &str) -> Vec<(String, String)> {
    split_top_level(block, ';')
        .into_iter()
        .filter_map(|decl| {
            let (prop, value) = decl.split_once(':')?;
            let prop = prop.trim();
            let value = collapse_whitespace(value);
            if prop.is_empty() || value.is_empty() {
                return None;
            }
            let prop = if prop.starts_with("--") {
                prop.to_string()
            } else {
                prop.to_ascii_lowercase()
            };
            Some((prop, value))
        })
        .collect()
}

/// Substitute `var(--name[, fallback])` references from `vars`.
///
/// Unknown names without a fallback are left untouched.
pub fn substitute_vars(value: &str, vars: &BTreeMap<String, String>) -> String {
    substitute_nested(value, vars, 0)
}

fn substitute_nested(value: &str, vars: &BTreeMap<String, String>, depth: usize) -> String {
    if depth > MAX_VAR_DEPTH {
        return value.to_string();
    }
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("var(") {
        out.push_str(&rest[..start]);
        let args_start = start + 4;
        let Some(len) = matching_paren(&rest[args_start..]) else {
            out.push_str(&rest[start..]);
            return out;
        };
        let args = &rest[args_start..args_start + len];
        let (name, fallback) = match args.split_once(',') {
            Some((name, fallback)) => (name.trim(), Some(fallback.trim())),
            None => (args.trim(), None),
        };

        match (vars.get(name), fallback) {
            (Some(v), _) => out.push_str(&substitute_nested(v, vars, depth + 1)),
            (None, Some(fb)) => out.push_str(&substitute_nested(fb, vars, depth + 1)),
            (None, None) => out.push_str(&rest[start..args_start + len + 1]),
        }
        rest = &rest[args_start + len + 1..];
    }

    out.push_str(rest);
    out
}

/// Byte length up to (not including) the `)` closing an already-open paren.
fn matching_paren(s: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split on `sep` outside of parentheses, brackets and strings.
fn split_top_level(s: &str, sep: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in s.chars() {
        if let Some(q) = quote {
            current.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => {
                quote = Some(c);
                current.push(c);
            }
            '(' | '[' => {
                depth += 1;
                current.push(c);
            }
            ')' | ']' => {
                depth -= 1;
                current.push(c);
            }
            c if c == sep && depth == 0 => parts.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        parts.push(current);
    }
    parts
}

fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
