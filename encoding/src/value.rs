use core::mem;

use crate::error::SchemaError;

/// A single field value of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    Uint(u64),
    Bytes(Vec<u8>),
    Text(String),
    Record(Record),
    List(Vec<Value>),
}

impl Value {
    /// A human-readable name of the kind of this value, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "boolean",
            Value::Uint(_) => "unsigned integer",
            Value::Bytes(_) => "byte string",
            Value::Text(_) => "text string",
            Value::Record(_) => "record",
            Value::List(_) => "list",
        }
    }

    /// Returns whether this is the zero value of its kind. A record is zero if all of its fields are, recursively.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Bool(b) => !b,
            Value::Uint(n) => *n == 0,
            Value::Bytes(bytes) => bytes.is_empty(),
            Value::Text(text) => text.is_empty(),
            Value::Record(record) => record.is_zero(),
            Value::List(elements) => elements.is_empty(),
        }
    }

    fn same_kind(&self, other: &Value) -> bool {
        mem::discriminant(self) == mem::discriminant(other)
    }

    fn zero_like(&self) -> Value {
        match self {
            Value::Bool(_) => Value::Bool(false),
            Value::Uint(_) => Value::Uint(0),
            Value::Bytes(_) => Value::Bytes(Vec::new()),
            Value::Text(_) => Value::Text(String::new()),
            Value::Record(_) => Value::Record(Record::new()),
            Value::List(_) => Value::List(Vec::new()),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Uint(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Bytes(value.to_vec())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Value::Record(value)
    }
}

impl From<Vec<u64>> for Value {
    fn from(value: Vec<u64>) -> Self {
        Value::List(value.into_iter().map(Value::Uint).collect())
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Value::List(value.into_iter().map(Value::Text).collect())
    }
}

impl From<Vec<Vec<u8>>> for Value {
    fn from(value: Vec<Vec<u8>>) -> Self {
        Value::List(value.into_iter().map(Value::Bytes).collect())
    }
}

impl From<Vec<Record>> for Value {
    fn from(value: Vec<Record>) -> Self {
        Value::List(value.into_iter().map(Value::Record).collect())
    }
}

/// Conversion out of a [`Value`], used by [`Record::take`].
pub trait FromValue: Sized {
    /// Name of the kind of value this type is converted from.
    const KIND: &'static str;

    /// Converts the value, or hands it back if it is of the wrong kind.
    fn from_value(value: Value) -> Result<Self, Value>;
}

impl FromValue for Value {
    const KIND: &'static str = "value";

    fn from_value(value: Value) -> Result<Self, Value> {
        Ok(value)
    }
}

impl FromValue for bool {
    const KIND: &'static str = "boolean";

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(other),
        }
    }
}

impl FromValue for u64 {
    const KIND: &'static str = "unsigned integer";

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Uint(n) => Ok(n),
            other => Err(other),
        }
    }
}

impl FromValue for Vec<u8> {
    const KIND: &'static str = "byte string";

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Bytes(bytes) => Ok(bytes),
            other => Err(other),
        }
    }
}

impl FromValue for String {
    const KIND: &'static str = "text string";

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Text(text) => Ok(text),
            other => Err(other),
        }
    }
}

impl FromValue for Record {
    const KIND: &'static str = "record";

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Record(record) => Ok(record),
            other => Err(other),
        }
    }
}

/// Converts every element of a list, handing back the untouched list if any element is of the wrong kind.
fn list_from_value<T, F>(value: Value, convert: F) -> Result<Vec<T>, Value>
where
    F: Fn(&Value) -> Option<T>,
{
    match value {
        Value::List(elements) => {
            let converted: Option<Vec<T>> = elements.iter().map(&convert).collect();
            converted.ok_or(Value::List(elements))
        }
        other => Err(other),
    }
}

impl FromValue for Vec<u64> {
    const KIND: &'static str = "list of unsigned integers";

    fn from_value(value: Value) -> Result<Self, Value> {
        list_from_value(value, |element| match element {
            Value::Uint(n) => Some(*n),
            _ => None,
        })
    }
}

impl FromValue for Vec<String> {
    const KIND: &'static str = "list of text strings";

    fn from_value(value: Value) -> Result<Self, Value> {
        list_from_value(value, |element| match element {
            Value::Text(text) => Some(text.clone()),
            _ => None,
        })
    }
}

impl FromValue for Vec<Vec<u8>> {
    const KIND: &'static str = "list of byte strings";

    fn from_value(value: Value) -> Result<Self, Value> {
        list_from_value(value, |element| match element {
            Value::Bytes(bytes) => Some(bytes.clone()),
            _ => None,
        })
    }
}

impl FromValue for Vec<Record> {
    const KIND: &'static str = "list of records";

    fn from_value(value: Value) -> Result<Self, Value> {
        list_from_value(value, |element| match element {
            Value::Record(record) => Some(record.clone()),
            _ => None,
        })
    }
}

/// One field of a [`Record`]: its wire tag, whether it is optional, and its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub tag: u64,
    pub optional: bool,
    pub value: Value,
}

impl Field {
    /// A field that is always encoded.
    pub fn required(name: impl Into<String>, tag: u64, value: impl Into<Value>) -> Self {
        Field {
            name: name.into(),
            tag,
            optional: false,
            value: value.into(),
        }
    }

    /// A field that is left out of the encoding when it holds its zero value.
    pub fn optional(name: impl Into<String>, tag: u64, value: impl Into<Value>) -> Self {
        Field {
            name: name.into(),
            tag,
            optional: true,
            value: value.into(),
        }
    }
}

/// An ordered list of fields.
///
/// Records are usually created with [`Schema::zeroed`](crate::Schema::zeroed) and then filled with [`Record::set`], or produced by decoding.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    fields: Vec<Field>,
}

impl Record {
    pub fn new() -> Self {
        Record { fields: Vec::new() }
    }

    /// Appends a field, builder style.
    pub fn with(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Appends a field.
    pub fn push(&mut self, field: Field) {
        self.fields.push(field);
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub(crate) fn fields_mut(&mut self) -> &mut [Field] {
        &mut self.fields
    }

    pub fn into_fields(self) -> Vec<Field> {
        self.fields
    }

    /// Returns the value of the field of the given name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| &field.value)
    }

    /// Replaces the value of the field of the given name, which must be of the same kind as the current value.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), SchemaError> {
        let value = value.into();
        let field = self.field_mut(name)?;

        if !field.value.same_kind(&value) {
            return Err(SchemaError::KindMismatch {
                field: name.to_string(),
                expected: field.value.kind_name(),
                found: value.kind_name(),
            });
        }

        field.value = value;
        Ok(())
    }

    /// Moves the value of the field of the given name out of the record, leaving a zero value of the same kind behind.
    pub fn take<T: FromValue>(&mut self, name: &str) -> Result<T, SchemaError> {
        let field = self.field_mut(name)?;
        let zero = field.value.zero_like();
        let value = mem::replace(&mut field.value, zero);

        match T::from_value(value) {
            Ok(converted) => Ok(converted),
            Err(value) => {
                let found = value.kind_name();
                field.value = value;
                Err(SchemaError::KindMismatch {
                    field: name.to_string(),
                    expected: T::KIND,
                    found,
                })
            }
        }
    }

    /// Returns whether every field holds its zero value, recursively.
    pub fn is_zero(&self) -> bool {
        self.fields.iter().all(|field| field.value.is_zero())
    }

    fn field_mut(&mut self, name: &str) -> Result<&mut Field, SchemaError> {
        self.fields
            .iter_mut()
            .find(|field| field.name == name)
            .ok_or_else(|| SchemaError::UnknownField {
                field: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_values() {
        assert!(Value::Bool(false).is_zero());
        assert!(!Value::Bool(true).is_zero());
        assert!(Value::Uint(0).is_zero());
        assert!(!Value::Uint(1).is_zero());
        assert!(Value::Bytes(vec![]).is_zero());
        assert!(Value::Text(String::new()).is_zero());
        assert!(Value::List(vec![]).is_zero());
        assert!(!Value::List(vec![Value::Uint(0)]).is_zero());
    }

    #[test]
    fn nested_zero_is_recursive() {
        let deep = Record::new().with(Field::optional("x", 1, 0_u64));
        let middle = Record::new()
            .with(Field::required("deep", 2, deep.clone()))
            .with(Field::required("name", 3, ""));
        let outer = Record::new().with(Field::optional("middle", 4, middle.clone()));

        assert!(Value::Record(outer.clone()).is_zero());

        let mut touched = deep;
        touched.set("x", 5_u64).unwrap();
        let middle = Record::new().with(Field::required("deep", 2, touched));
        assert!(!Value::Record(middle).is_zero());
    }

    #[test]
    fn set_and_take() {
        let mut record = Record::new()
            .with(Field::required("num", 1, Vec::<u64>::new()))
            .with(Field::optional("name", 2, ""));

        record.set("num", vec![1_u64, 2, 3]).unwrap();
        record.set("name", "hello").unwrap();

        assert_eq!(
            record.set("name", 4_u64),
            Err(SchemaError::KindMismatch {
                field: "name".to_string(),
                expected: "text string",
                found: "unsigned integer",
            })
        );
        assert_eq!(
            record.set("missing", true),
            Err(SchemaError::UnknownField {
                field: "missing".to_string()
            })
        );

        assert!(record.take::<u64>("name").is_err());
        // A failed take leaves the value in place.
        assert_eq!(record.get("name"), Some(&Value::Text("hello".to_string())));

        assert_eq!(record.take::<Vec<u64>>("num").unwrap(), vec![1, 2, 3]);
        assert_eq!(record.take::<String>("name").unwrap(), "hello");
        assert!(record.is_zero());
    }
}
