//! Literal placeholder substitution
//!
//! Tokens such as `{{TASKS}}` or `{{START_DATE + 3}}` are matched as exact
//! strings. A token that has no entry is left in the output as-is.

use tracing::debug;

/// Ordered mapping of literal token to replacement text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placeholders {
    entries: Vec<(String, String)>,
}

impl Placeholders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the `{{NAME}}` token for a placeholder name
    pub fn token(name: &str) -> String {
        format!("{{{{{}}}}}", name)
    }

    /// Set a replacement for a literal token, overwriting any previous value
    pub fn insert(&mut self, token: impl Into<String>, value: impl Into<String>) {
        let token = token.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(t, _)| *t == token) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((token, value)),
        }
    }

    /// Builder-style `insert`
    pub fn with(mut self, token: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(token, value);
        self
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries.iter().find(|(t, _)| t == token).map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Substitute every token occurrence in `template`
    ///
    /// Single left-to-right pass: inserted values are never scanned again, so
    /// the result does not depend on entry order. When two tokens start at the
    /// same offset the longer one wins.
    pub fn apply(&self, template: &str) -> String {
        debug!(template_len = template.len(), token_count = self.entries.len(), "Placeholders::apply: called");
        let tokens: Vec<&(String, String)> = self.entries.iter().filter(|(token, _)| !token.is_empty()).collect();
        // Next hit per token; a token is searched again only once the cursor has moved past its hit
        let mut hits: Vec<Option<usize>> = tokens.iter().map(|(token, _)| template.find(token.as_str())).collect();
        let mut out = String::with_capacity(template.len());
        let mut pos = 0;

        loop {
            for (hit, (token, _)) in hits.iter_mut().zip(&tokens) {
                if let Some(at) = *hit
                    && at < pos
                {
                    *hit = template[pos..].find(token.as_str()).map(|idx| pos + idx);
                }
            }

            let next = hits
                .iter()
                .zip(&tokens)
                .filter_map(|(hit, (token, value))| hit.map(|at| (at, token, value)))
                .min_by(|a, b| a.0.cmp(&b.0).then(b.1.len().cmp(&a.1.len())));

            match next {
                Some((at, token, value)) => {
                    out.push_str(&template[pos..at]);
                    out.push_str(value);
                    pos = at + token.len();
                }
                None => {
                    out.push_str(&template[pos..]);
                    break;
                }
            }
        }

        out
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Placeholders {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut placeholders = Placeholders::new();
        for (k, v) in iter {
            placeholders.insert(k, v);
        }
        placeholders
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_token() {
        assert_eq!(Placeholders::token("TASKS"), "{{TASKS}}");
        assert_eq!(Placeholders::token("START_DATE + 2"), "{{START_DATE + 2}}");
    }

    #[test]
    fn test_apply_replaces_every_occurrence() {
        let p = Placeholders::new().with("{{TASKS}}", "a, 1");
        assert_eq!(p.apply("{{TASKS}} then {{TASKS}}"), "a, 1 then a, 1");
    }

    #[test]
    fn test_apply_leaves_unknown_tokens() {
        let p = Placeholders::new().with("{{TASKS}}", "x");
        assert_eq!(p.apply("{{TASKS}} by {{END_DATE}}"), "x by {{END_DATE}}");
    }

    #[test]
    fn test_apply_does_not_rescan_values() {
        let p = Placeholders::new()
            .with("{{TASKS}}", "see {{END_DATE}}")
            .with("{{END_DATE}}", "Friday");
        assert_eq!(p.apply("{{TASKS}} / {{END_DATE}}"), "see {{END_DATE}} / Friday");

        let reversed = Placeholders::new()
            .with("{{END_DATE}}", "Friday")
            .with("{{TASKS}}", "see {{END_DATE}}");
        assert_eq!(reversed.apply("{{TASKS}} / {{END_DATE}}"), "see {{END_DATE}} / Friday");
    }

    #[test]
    fn test_start_date_offsets_are_distinct_from_start_date() {
        let p = Placeholders::new()
            .with("{{START_DATE}}", "Mon")
            .with("{{START_DATE + 1}}", "Tue")
            .with("{{START_DATE + 10}}", "Fri");
        assert_eq!(
            p.apply("{{START_DATE}} {{START_DATE + 1}} {{START_DATE + 10}} {{START_DATE + 2}}"),
            "Mon Tue Fri {{START_DATE + 2}}"
        );
    }

    #[test]
    fn test_longer_token_wins_at_same_offset() {
        let p = Placeholders::new().with("{{A", "short").with("{{AB}}", "long");
        assert_eq!(p.apply("{{AB}}"), "long");
    }

    #[test]
    fn test_hit_inside_replaced_span_is_searched_again() {
        let p = Placeholders::new().with("{{AB}}", "X").with("AB}}", "Y");
        assert_eq!(p.apply("{{AB}} AB}} {{AB}}"), "X Y X");
    }

    #[test]
    fn test_apply_long_template_with_sparse_tokens() {
        let p = Placeholders::new()
            .with("{{TASKS}}", "t")
            .with("{{END_DATE}}", "e")
            .with("{{NEVER}}", "n");
        let template = "{{TASKS}} ".repeat(2_000) + "{{END_DATE}}";
        let out = p.apply(&template);
        assert_eq!(out.matches("t ").count(), 2_000);
        assert!(out.ends_with("t e"));
    }

    #[test]
    fn test_insert_overwrites() {
        let mut p = Placeholders::new();
        p.insert("{{TASKS}}", "old");
        p.insert("{{TASKS}}", "new");
        assert_eq!(p.len(), 1);
        assert_eq!(p.get("{{TASKS}}"), Some("new"));
    }

    #[test]
    fn test_empty_mapping_is_identity() {
        let text = "Plan {{TASKS}} from {{START_DATE}}";
        assert_eq!(Placeholders::new().apply(text), text);
    }

    #[test]
    fn test_apply_handles_multibyte_text() {
        let p = Placeholders::new().with("{{TASKS}}", "Überprüfung");
        assert_eq!(p.apply("📋 {{TASKS}} ✅"), "📋 Überprüfung ✅");
    }

    #[derive(Debug, Clone)]
    enum Piece {
        Text(String),
        Token(usize),
    }

    fn piece(token_count: usize) -> impl Strategy<Value = Piece> {
        prop_oneof![
            "[a-zA-Z0-9 ,.\n]{0,12}".prop_map(Piece::Text),
            (0..token_count).prop_map(Piece::Token),
        ]
    }

    proptest! {
        #[test]
        fn prop_apply_substitutes_tokens_and_preserves_text(
            names in prop::collection::hash_set("[A-Z_]{1,8}", 1..5),
            values in prop::collection::vec("[a-z0-9 ,\n]{0,10}", 5),
            seed_pieces in prop::collection::vec(piece(5), 0..20),
        ) {
            let names: Vec<String> = names.into_iter().collect();
            let placeholders: Placeholders = names
                .iter()
                .zip(values.iter())
                .map(|(n, v)| (Placeholders::token(n), v.clone()))
                .collect();

            let mut template = String::new();
            let mut expected = String::new();
            for p in &seed_pieces {
                match p {
                    Piece::Text(t) => {
                        template.push_str(t);
                        expected.push_str(t);
                    }
                    Piece::Token(i) => {
                        let i = i % names.len();
                        template.push_str(&Placeholders::token(&names[i]));
                        expected.push_str(&values[i]);
                    }
                }
            }

            let rendered = placeholders.apply(&template);
            prop_assert_eq!(&rendered, &expected);
            for name in &names {
                prop_assert!(!rendered.contains(&Placeholders::token(name)));
            }
        }
    }
}
