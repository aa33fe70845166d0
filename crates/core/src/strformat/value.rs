//! Values that can be passed to a template, and the capabilities caller types can opt into.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

use indexmap::IndexMap;
use itertools::Itertools;

use super::ast::{Accessor, IndexKey};
use super::error::RenderError;
use super::spec::shortest_repr;

/// A caller-supplied value taking part in formatting.
///
/// `Display` is the canonical form used by `!s` and by the fallback formatter, `Debug` the
/// representation used by `!r`. Attribute and item lookups are opt-in.
pub trait Object: Display + Debug + Send + Sync {
    fn type_name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Looks up `.name`; `None` means the attribute does not exist.
    fn attribute(&self, _name: &str) -> Option<Value> {
        None
    }

    /// Looks up `[key]`; `None` means the item does not exist.
    fn item(&self, _key: &IndexKey) -> Option<Value> {
        None
    }

    /// Exposes the custom formatting capability, when the type has one.
    fn as_formattable(&self) -> Option<&dyn Formattable> {
        None
    }
}

/// Custom interpretation of a field's format spec.
///
/// The format spec arrives already rendered, so nested fields have been substituted.
pub trait Formattable {
    fn format(&self, spec: &str) -> Result<String, RenderError>;
}

#[derive(Clone)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
    Object(Arc<dyn Object>),
}

impl Value {
    pub fn object(object: impl Object + 'static) -> Self {
        Value::Object(Arc::new(object))
    }

    pub fn type_name(&self) -> &str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Object(object) => object.type_name(),
        }
    }

    /// The debug representation, as produced by `!r`.
    pub fn repr(&self) -> String {
        match self {
            Value::Str(text) => format!("{text:?}"),
            Value::Object(object) => format!("{object:?}"),
            other => other.to_string(),
        }
    }

    /// Applies one accessor, borrowing from `self` whenever the result already exists in it.
    pub fn lookup(&self, accessor: &Accessor) -> Result<Cow<'_, Value>, RenderError> {
        match accessor {
            Accessor::Attribute(name) => self.attribute(name).map(Cow::Owned),
            Accessor::Index(key) => self.item(key),
        }
    }

    fn attribute(&self, name: &str) -> Result<Value, RenderError> {
        let found = match self {
            Value::Object(object) => object.attribute(name),
            _ => None,
        };

        found.ok_or_else(|| RenderError::AttributeNotFound {
            type_name: self.type_name().to_string(),
            attribute: name.to_string(),
        })
    }

    fn item(&self, key: &IndexKey) -> Result<Cow<'_, Value>, RenderError> {
        let found = match (self, key) {
            (Value::List(items), IndexKey::Int(index)) => {
                resolve_position(*index, items.len()).map(|i| Cow::Borrowed(&items[i]))
            }
            (Value::Map(entries), IndexKey::Str(name)) => entries.get(name).map(Cow::Borrowed),
            (Value::Map(entries), IndexKey::Int(index)) => {
                entries.get(&index.to_string()).map(Cow::Borrowed)
            }
            (Value::Str(text), IndexKey::Int(index)) => {
                let count = text.chars().count();
                resolve_position(*index, count)
                    .and_then(|i| text.chars().nth(i))
                    .map(|c| Cow::Owned(Value::Str(c.to_string())))
            }
            (Value::Object(object), key) => object.item(key).map(Cow::Owned),
            _ => None,
        };

        found.ok_or_else(|| RenderError::IndexNotFound {
            type_name: self.type_name().to_string(),
            key: key.to_string(),
        })
    }
}

/// Maps a possibly negative index onto `0..len`.
fn resolve_position(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let position = if index < 0 { len + index } else { index };
    if (0..len).contains(&position) {
        usize::try_from(position).ok()
    } else {
        None
    }
}

impl Display for Value {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(value) => write!(formatter, "{value}"),
            Value::Int(value) => write!(formatter, "{value}"),
            Value::Float(value) => formatter.write_str(&shortest_repr(*value)),
            Value::Str(value) => formatter.write_str(value),
            Value::List(items) => {
                write!(formatter, "[{}]", items.iter().map(Value::repr).join(", "))
            }
            Value::Map(entries) => write!(
                formatter,
                "{{{}}}",
                entries
                    .iter()
                    .map(|(key, value)| format!("{key:?}: {}", value.repr()))
                    .join(", ")
            ),
            Value::Object(object) => write!(formatter, "{object}"),
        }
    }
}

impl Debug for Value {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(&self.repr())
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

macro_rules! impl_from_int {
    ($($int:ty),*) => {
        $(
            impl From<$int> for Value {
                fn from(value: $int) -> Self {
                    Value::Int(i64::from(value))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(f64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::Str(value.clone())
    }
}

impl From<char> for Value {
    fn from(value: char) -> Self {
        Value::Str(value.to_string())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<IndexMap<String, T>> for Value {
    fn from(entries: IndexMap<String, T>) -> Self {
        Value::Map(entries.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl From<Arc<dyn Object>> for Value {
    fn from(object: Arc<dyn Object>) -> Self {
        Value::Object(object)
    }
}

/// Positional and keyword arguments for one render.
///
/// ```
/// use promptline_core::strformat::{fmt, Args};
///
/// let args = Args::new().arg("Fred").kwarg("age", 42);
/// assert_eq!(fmt("{0} is {age}", &args)?, "Fred is 42");
/// # Ok::<(), promptline_core::error::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Args {
    positional: Vec<Value>,
    keyword: HashMap<String, Value>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    #[must_use]
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keyword.insert(name.into(), value.into());
        self
    }

    pub fn push(&mut self, value: impl Into<Value>) {
        self.positional.push(value.into());
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.keyword.insert(name.into(), value.into());
    }

    /// Puts `value` in front of the existing positional arguments.
    pub fn prepend(&mut self, value: impl Into<Value>) {
        self.positional.insert(0, value.into());
    }

    pub fn contains_keyword(&self, name: &str) -> bool {
        self.keyword.contains_key(name)
    }

    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    pub fn keyword(&self) -> &HashMap<String, Value> {
        &self.keyword
    }
}

impl<T: Into<Value>> FromIterator<T> for Args {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            positional: iter.into_iter().map(Into::into).collect(),
            keyword: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Point {
        x: i64,
    }

    impl Display for Point {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            write!(f, "Point({})", self.x)
        }
    }

    impl Object for Point {
        fn type_name(&self) -> &str {
            "Point"
        }

        fn attribute(&self, name: &str) -> Option<Value> {
            (name == "x").then(|| Value::Int(self.x))
        }
    }

    #[test]
    fn test_display_of_collections_uses_reprs() {
        let list = Value::from(vec![Value::from("abc"), Value::from(1), Value::from(true)]);
        assert_eq!(list.to_string(), r#"["abc", 1, true]"#);

        let mut entries = IndexMap::new();
        entries.insert("b".to_string(), 2);
        entries.insert("a".to_string(), 1);
        assert_eq!(Value::from(entries).to_string(), r#"{"b": 2, "a": 1}"#);
        assert_eq!(Value::List(vec![]).to_string(), "[]");
    }

    #[test]
    fn test_float_display_keeps_decimal_point() {
        assert_eq!(Value::from(1.0).to_string(), "1.0");
        assert_eq!(Value::from(2.5).to_string(), "2.5");
        assert_eq!(Value::from(1e16).to_string(), "1e+16");
    }

    #[test]
    fn test_repr_quotes_strings() {
        assert_eq!(Value::from("Hello").repr(), "\"Hello\"");
        assert_eq!(Value::from(-15).repr(), "-15");
    }

    #[test]
    fn test_list_lookup_supports_negative_positions() {
        let list = Value::from(vec![10, 20, 30]);
        let key = |i| Accessor::Index(IndexKey::Int(i));
        assert_eq!(*list.lookup(&key(0)).unwrap(), Value::Int(10));
        assert_eq!(*list.lookup(&key(-1)).unwrap(), Value::Int(30));
        assert!(matches!(
            list.lookup(&key(3)),
            Err(RenderError::IndexNotFound { .. })
        ));
        assert!(list.lookup(&key(-4)).is_err());
    }

    #[test]
    fn test_string_items_are_characters() {
        let text = Value::from("héllo");
        let item = text.lookup(&Accessor::Index(IndexKey::Int(1))).unwrap();
        assert_eq!(*item, Value::from("é"));
    }

    #[test]
    fn test_map_lookup_by_integer_key_uses_its_text() {
        let mut entries = IndexMap::new();
        entries.insert("0".to_string(), "zero");
        let map = Value::from(entries);
        let item = map.lookup(&Accessor::Index(IndexKey::Int(0))).unwrap();
        assert_eq!(*item, Value::from("zero"));
    }

    #[test]
    fn test_object_attributes() {
        let point = Value::object(Point { x: 3 });
        let x = point.lookup(&Accessor::Attribute("x".to_string())).unwrap();
        assert_eq!(*x, Value::Int(3));

        let missing = point.lookup(&Accessor::Attribute("y".to_string()));
        assert_eq!(
            missing.unwrap_err(),
            RenderError::AttributeNotFound {
                type_name: "Point".to_string(),
                attribute: "y".to_string()
            }
        );
    }

    #[test]
    fn test_builtin_values_have_no_attributes() {
        let seven = Value::from(7);
        let result = seven.lookup(&Accessor::Attribute("real".to_string()));
        assert!(matches!(result, Err(RenderError::AttributeNotFound { .. })));
    }

    #[test]
    fn test_args_builder() {
        let mut args = Args::new().arg(1).kwarg("name", "Fred");
        args.prepend("first");
        args.push(2.5);
        assert_eq!(
            args.positional(),
            &[Value::from("first"), Value::from(1), Value::from(2.5)]
        );
        assert!(args.contains_keyword("name"));

        let collected: Args = ["a", "b"].into_iter().collect();
        assert_eq!(collected.positional().len(), 2);
    }
}
