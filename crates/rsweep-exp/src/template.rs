use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;
use rsweep_core::errors::{ErrorInfo, LaunchError};
use serde::{Deserialize, Serialize};

use crate::grid::GridPoint;

/// Returns true for names of the form `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

/// Source of values for template placeholders.
pub trait Bindings {
    /// Value bound to `name`, if any.
    fn lookup(&self, name: &str) -> Option<&str>;
}

impl Bindings for IndexMap<String, String> {
    fn lookup(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl Bindings for BTreeMap<String, String> {
    fn lookup(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl Bindings for GridPoint {
    fn lookup(&self, name: &str) -> Option<&str> {
        self.get(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// String with `{name}` placeholders.
///
/// The placeholder syntax is the one GNU parallel uses for `--header`
/// replacement strings, so a partially rendered template can be handed to the
/// runner unchanged. Braces that do not enclose an identifier are literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TemplateSource", into = "String")]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parses `source`. Parsing is total.
    pub fn parse(source: impl Into<String>) -> Self {
        let source = source.into();
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = source.as_str();
        while let Some(open) = rest.find('{') {
            literal.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            match after.find('}') {
                Some(close) if is_identifier(&after[..close]) => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(after[..close].to_string()));
                    rest = &after[close + 1..];
                }
                _ => {
                    literal.push('{');
                    rest = after;
                }
            }
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Self { source, segments }
    }

    /// Template text as written.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Placeholder names in order of first appearance.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for segment in &self.segments {
            if let Segment::Placeholder(name) = segment {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Renders every placeholder, failing on the first unbound name.
    pub fn render(&self, bindings: &dyn Bindings) -> Result<String, LaunchError> {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(name) => match bindings.lookup(name) {
                    Some(value) => out.push_str(value),
                    None => {
                        return Err(LaunchError::Template(
                            ErrorInfo::new("template-unbound", "placeholder has no value")
                                .with_context("placeholder", name.clone())
                                .with_context("template", self.source.clone()),
                        ))
                    }
                },
            }
        }
        Ok(out)
    }

    /// Substitutes the names `bindings` knows and keeps the others as `{name}`.
    pub fn render_partial(&self, bindings: &dyn Bindings) -> Template {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(name) => match bindings.lookup(name) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                },
            }
        }
        Template::parse(out)
    }

    /// Fails when a placeholder is not in `known`.
    pub fn check_bound(&self, known: &[String]) -> Result<(), LaunchError> {
        for name in self.placeholders() {
            if !known.iter().any(|candidate| candidate == name) {
                return Err(LaunchError::Template(
                    ErrorInfo::new("template-unknown-placeholder", "placeholder is never bound")
                        .with_context("placeholder", name)
                        .with_context("template", self.source.clone())
                        .with_hint(format!("known names: {}", known.join(", "))),
                ));
            }
        }
        Ok(())
    }
}

/// Plan files may write plain scalars (`total_timesteps: 1000`) as templates.
#[derive(Deserialize)]
#[serde(untagged)]
enum TemplateSource {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl From<TemplateSource> for Template {
    fn from(source: TemplateSource) -> Self {
        match source {
            TemplateSource::Text(text) => Template::parse(text),
            TemplateSource::Int(value) => Template::parse(value.to_string()),
            TemplateSource::Float(value) => Template::parse(value.to_string()),
            TemplateSource::Bool(value) => Template::parse(value.to_string()),
        }
    }
}

impl From<String> for Template {
    fn from(source: String) -> Self {
        Template::parse(source)
    }
}

impl From<&str> for Template {
    fn from(source: &str) -> Self {
        Template::parse(source)
    }
}

impl From<Template> for String {
    fn from(template: Template) -> Self {
        template.source
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
