use std::borrow::Cow;

use super::ast::{Conversion, Field, FieldPath, FieldRoot, Segment, Template};
use super::error::RenderError;
use super::spec::{format_text, format_value};
use super::value::{Args, Value};

impl Template {
    /// Renders the template against `args`. Either the whole output is produced or an error is.
    pub fn render(&self, args: &Args) -> Result<String, RenderError> {
        let mut output = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => output.push_str(text),
                Segment::Field(field) => output.push_str(&field.render(args)?),
            }
        }
        Ok(output)
    }
}

impl Field {
    pub fn render(&self, args: &Args) -> Result<String, RenderError> {
        let value = self.path.resolve(args)?;
        let spec = self.spec.render(args)?;

        match self.conversion {
            Some(Conversion::Str) => format_text(&value.to_string(), &spec),
            Some(Conversion::Repr) => format_text(&value.repr(), &spec),
            None => format_with_capability(&value, &spec),
        }
    }
}

impl FieldPath {
    /// Looks up the root argument, then applies each accessor in order.
    pub fn resolve<'a>(&self, args: &'a Args) -> Result<Cow<'a, Value>, RenderError> {
        let mut current = match &self.root {
            FieldRoot::Index(index) => args
                .positional()
                .get(*index)
                .map(Cow::Borrowed)
                .ok_or(RenderError::IndexOutOfRange {
                    index: *index,
                    count: args.positional().len(),
                })?,
            FieldRoot::Name(name) => args
                .keyword()
                .get(name)
                .map(Cow::Borrowed)
                .ok_or_else(|| RenderError::KeyNotFound { key: name.clone() })?,
        };

        for accessor in &self.accessors {
            current = match current {
                Cow::Borrowed(value) => value.lookup(accessor)?,
                Cow::Owned(value) => Cow::Owned(value.lookup(accessor)?.into_owned()),
            };
        }

        Ok(current)
    }
}

fn format_with_capability(value: &Value, spec: &str) -> Result<String, RenderError> {
    if let Value::Object(object) = value {
        if let Some(formattable) = object.as_formattable() {
            return formattable.format(spec);
        }
    }
    format_value(value, spec)
}
