use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Substitution values for one rendered message. Recipient-scoped values
/// (the guest name) are layered on top of session-scoped ones (company,
/// period, link, notes) by the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateVars(HashMap<String, String>);

impl TemplateVars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

/// An ordered pool of interchangeable message bodies. Variants rotate
/// across recipients so consecutive sends do not repeat identical text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplatePool {
    variants: Vec<String>,
}

impl TemplatePool {
    pub fn new(variants: Vec<String>) -> Self {
        Self { variants }
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Round-robin variant keyed by the recipient's position in the
    /// dispatch order.
    pub fn variant(&self, index: usize) -> &str {
        if self.variants.is_empty() {
            return "";
        }
        &self.variants[index % self.variants.len()]
    }

    /// Resolve the variant for `index` against `vars`. Every `{ident}`
    /// occurrence is replaced; an identifier with no value resolves to the
    /// empty string, so no placeholder survives into the sent text.
    pub fn render(&self, index: usize, vars: &TemplateVars) -> String {
        substitute(self.variant(index), vars)
    }
}

fn substitute(template: &str, vars: &TemplateVars) -> String {
    let mut out = String::with_capacity(template.len());
    let mut pos = 0;
    while let Some(offset) = template[pos..].find('{') {
        let open = pos + offset;
        out.push_str(&template[pos..open]);
        match template[open + 1..].find('}') {
            Some(rel) => {
                let close = open + 1 + rel;
                let token = &template[open + 1..close];
                if is_placeholder(token) {
                    if let Some(value) = vars.get(token) {
                        out.push_str(value);
                    }
                    pos = close + 1;
                } else {
                    // Not a placeholder, keep the brace literally
                    out.push('{');
                    pos = open + 1;
                }
            }
            None => {
                out.push('{');
                pos = open + 1;
            }
        }
    }
    out.push_str(&template[pos..]);
    out
}

fn is_placeholder(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotates_variants_by_recipient_position() {
        let pool = TemplatePool::new(vec!["a".into(), "b".into(), "c".into()]);
        let used: Vec<&str> = (0..5).map(|i| pool.variant(i)).collect();
        assert_eq!(used, vec!["a", "b", "c", "a", "b"]);
    }

    #[test]
    fn single_variant_pool_repeats() {
        let pool = TemplatePool::new(vec!["only".into()]);
        assert_eq!(pool.variant(0), "only");
        assert_eq!(pool.variant(7), "only");
    }

    #[test]
    fn replaces_every_occurrence() {
        let pool = TemplatePool::new(vec!["{name}, sim, {name}!".into()]);
        let vars = TemplateVars::new().with("name", "Ana");
        assert_eq!(pool.render(0, &vars), "Ana, sim, Ana!");
    }

    #[test]
    fn undefined_placeholder_resolves_to_empty() {
        let pool = TemplatePool::new(vec!["Oi {name}{missing}, veja {link}".into()]);
        let vars = TemplateVars::new().with("name", "Beto").with("link", "https://x.test");
        let text = pool.render(0, &vars);
        assert_eq!(text, "Oi Beto, veja https://x.test");
        assert!(!text.contains('{'));
    }

    #[test]
    fn non_identifier_braces_stay_literal() {
        let pool = TemplatePool::new(vec!["intervalo {5, 30} com {name}".into()]);
        let vars = TemplateVars::new().with("name", "Caio");
        assert_eq!(pool.render(0, &vars), "intervalo {5, 30} com Caio");
    }

    #[test]
    fn empty_pool_renders_nothing() {
        let pool = TemplatePool::new(vec![]);
        assert_eq!(pool.render(3, &TemplateVars::new()), "");
    }
}
