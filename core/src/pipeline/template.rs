use std::collections::BTreeSet;
use std::fmt;

use crate::error::TemplateError;

use super::context::Variables;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Slot(String),
}

/// Prompt text with `{name}` slots, parsed once at construction.
///
/// `{{` and `}}` produce literal braces. A brace that does not enclose an
/// identifier (`[A-Za-z_][A-Za-z0-9_]*`) is kept as literal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl PromptTemplate {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let segments = parse_segments(&source);
        Self { source, segments }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Distinct slot names, sorted.
    pub fn slots(&self) -> BTreeSet<&str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Slot(name) => Some(name.as_str()),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// Fails on the first slot (in sorted order) with no binding.
    pub fn check(&self, vars: &Variables, location: &str) -> Result<(), TemplateError> {
        match self.slots().into_iter().find(|name| !vars.contains(name)) {
            Some(name) => Err(TemplateError::UnboundPlaceholder {
                name: name.to_string(),
                location: location.to_string(),
            }),
            None => Ok(()),
        }
    }

    pub fn render(&self, vars: &Variables, location: &str) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Slot(name) => match vars.get(name) {
                    Some(value) => out.push_str(value),
                    None => {
                        return Err(TemplateError::UnboundPlaceholder {
                            name: name.clone(),
                            location: location.to_string(),
                        })
                    }
                },
            }
        }
        Ok(out)
    }
}

impl From<&str> for PromptTemplate {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PromptTemplate {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for PromptTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn parse_segments(source: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = source;

    while let Some(c) = rest.chars().next() {
        match c {
            '{' if rest.starts_with("{{") => {
                literal.push('{');
                rest = &rest[2..];
            }
            '}' if rest.starts_with("}}") => {
                literal.push('}');
                rest = &rest[2..];
            }
            '{' => match slot_name(&rest[1..]) {
                Some(name) => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    rest = &rest[name.len() + 2..];
                    segments.push(Segment::Slot(name.to_string()));
                }
                None => {
                    literal.push('{');
                    rest = &rest[1..];
                }
            },
            other => {
                literal.push(other);
                rest = &rest[other.len_utf8()..];
            }
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    segments
}

/// Identifier followed by `}` at the start of `s`.
fn slot_name(s: &str) -> Option<&str> {
    let end = s.find('}')?;
    let name = &s[..end];
    let mut chars = name.chars();
    let first = chars.next()?;
    if !(first.is_ascii_alphabetic() || first == '_') {
        return None;
    }
    chars
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
        .then_some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn vars(pairs: &[(&str, &str)]) -> Variables {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_slots_are_collected_once() {
        let t = PromptTemplate::new("Analyse {sector} in {region}; focus on {sector}.");
        assert_eq!(t.slots().into_iter().collect::<Vec<_>>(), vec!["region", "sector"]);
    }

    #[test]
    fn test_render_substitutes_values() {
        let t = PromptTemplate::new("Analyse {sector} in {region}.");
        let out = t
            .render(&vars(&[("sector", "fintech"), ("region", "Brazil")]), "test")
            .unwrap();
        assert_eq!(out, "Analyse fintech in Brazil.");
    }

    #[test]
    fn test_escaped_and_non_identifier_braces_are_literal() {
        let t = PromptTemplate::new("Use {{sector}} literally, keep {not a slot} and {1x} and } alone.");
        assert!(t.slots().is_empty());
        assert_eq!(
            t.render(&Variables::default(), "test").unwrap(),
            "Use {sector} literally, keep {not a slot} and {1x} and } alone."
        );
    }

    #[test]
    fn test_unbound_slot_is_reported() {
        let t = PromptTemplate::new("Report on {company} in {sector}");
        let err = t.check(&vars(&[("company", "Acme")]), "goal").unwrap_err();
        assert_eq!(
            err,
            TemplateError::UnboundPlaceholder {
                name: "sector".into(),
                location: "goal".into()
            }
        );
        assert!(t.render(&vars(&[("company", "Acme")]), "goal").is_err());
    }

    #[test]
    fn test_multibyte_text_survives() {
        let t = PromptTemplate::new("Relatório de {setor}: análise");
        let out = t.render(&vars(&[("setor", "energia")]), "t").unwrap();
        assert_eq!(out, "Relatório de energia: análise");
    }
}
