//! Compiled representation of a format string.
//!
//! A [`Template`] is an ordered list of [`Segment`]s. Field segments carry their own nested
//! [`Template`] for the format spec, so a compiled template is a tree whose depth is bounded by
//! the compiler's nesting ceiling.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Segment {
    /// Text emitted verbatim, braces already unescaped.
    Literal(String),
    Field(Field),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub path: FieldPath,
    pub conversion: Option<Conversion>,
    pub spec: Template,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPath {
    pub root: FieldRoot,
    pub accessors: Vec<Accessor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldRoot {
    /// Positional argument, either numbered explicitly or assigned automatically.
    Index(usize),
    /// Keyword argument.
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Accessor {
    /// `.name`
    Attribute(String),
    /// `[key]`
    Index(IndexKey),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexKey {
    Int(i64),
    Str(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Conversion {
    /// `!s`: canonical string form.
    Str,
    /// `!r`: debug representation.
    Repr,
}

impl Template {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Iterates over the top-level fields, not descending into nested specs.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Field(field) => Some(field),
            Segment::Literal(_) => None,
        })
    }

    /// The keyword names referenced anywhere in the template, nested specs included.
    pub fn keyword_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_keyword_names(&mut names);
        names
    }

    fn collect_keyword_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        for field in self.fields() {
            if let FieldRoot::Name(name) = &field.path.root {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
            field.spec.collect_keyword_names(names);
        }
    }
}

impl IndexKey {
    /// Integer keys win whenever the text parses as one.
    pub fn parse(key: &str) -> Self {
        match key.parse::<i64>() {
            Ok(index) => IndexKey::Int(index),
            Err(_) => IndexKey::Str(key.to_string()),
        }
    }
}

impl Display for IndexKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexKey::Int(index) => write!(formatter, "{index}"),
            IndexKey::Str(key) => write!(formatter, "{key:?}"),
        }
    }
}

impl Display for FieldRoot {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldRoot::Index(index) => write!(formatter, "{index}"),
            FieldRoot::Name(name) => formatter.write_str(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_key_prefers_integers() {
        assert_eq!(IndexKey::parse("12"), IndexKey::Int(12));
        assert_eq!(IndexKey::parse("-1"), IndexKey::Int(-1));
        assert_eq!(IndexKey::parse("foo bar"), IndexKey::Str("foo bar".to_string()));
        assert_eq!(IndexKey::parse(""), IndexKey::Str(String::new()));
    }

    #[test]
    fn test_keyword_names_descend_into_specs() {
        let template = Template::new(vec![Segment::Field(Field {
            path: FieldPath {
                root: FieldRoot::Name("value".to_string()),
                accessors: vec![],
            },
            conversion: None,
            spec: Template::new(vec![Segment::Field(Field {
                path: FieldPath {
                    root: FieldRoot::Name("width".to_string()),
                    accessors: vec![],
                },
                conversion: None,
                spec: Template::default(),
            })]),
        })]);

        assert_eq!(template.keyword_names(), vec!["value", "width"]);
    }
}
