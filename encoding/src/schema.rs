use crate::error::SchemaError;
use crate::value::{Field, Record, Value};

/// Suffix of a field declaration marking the field as optional.
const OPTIONAL_SUFFIX: &str = ",-";

/// The kind of value a field holds. The wire does not carry kinds, so both sides must agree on them through their schemas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    /// Presence of the entry means `true`.
    Bool,
    /// An unsigned 64-bit integer.
    Uint,
    /// A byte string, carried in a single entry.
    Bytes,
    /// A UTF-8 string.
    Text,
    /// A nested record of the given schema.
    Record(Schema),
    /// Zero or more consecutive entries sharing the field's tag.
    List(Box<Kind>),
}

impl Kind {
    /// A list of elements of the given kind.
    pub fn list(element: Kind) -> Kind {
        Kind::List(Box::new(element))
    }

    /// A human-readable name of this kind, for error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Kind::Bool => "boolean",
            Kind::Uint => "unsigned integer",
            Kind::Bytes => "byte string",
            Kind::Text => "text string",
            Kind::Record(_) => "record",
            Kind::List(_) => "list",
        }
    }

    /// The zero value of this kind: the value of a field that is absent from the wire.
    pub fn zero_value(&self) -> Value {
        match self {
            Kind::Bool => Value::Bool(false),
            Kind::Uint => Value::Uint(0),
            Kind::Bytes => Value::Bytes(Vec::new()),
            Kind::Text => Value::Text(String::new()),
            Kind::Record(schema) => Value::Record(schema.zeroed()),
            Kind::List(_) => Value::List(Vec::new()),
        }
    }

    fn check(&self, field: &str) -> Result<(), SchemaError> {
        match self {
            Kind::List(element) => match element.as_ref() {
                Kind::List(_) => Err(SchemaError::UnsupportedKind {
                    field: field.to_string(),
                    kind: "list of lists",
                }),
                // A `false` element would have no entry, so the list could not be restored.
                Kind::Bool => Err(SchemaError::UnsupportedKind {
                    field: field.to_string(),
                    kind: "list of booleans",
                }),
                element => element.check(field),
            },
            _ => Ok(()),
        }
    }
}

/// The declaration of a single field of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub tag: u64,
    pub kind: Kind,
    /// Whether the field is left out of the encoding when it holds its zero value.
    pub optional: bool,
}

impl FieldSpec {
    /// A field that is always encoded.
    pub fn required(name: impl Into<String>, tag: u64, kind: Kind) -> Self {
        FieldSpec {
            name: name.into(),
            tag,
            kind,
            optional: false,
        }
    }

    /// A field that is left out of the encoding when it holds its zero value.
    pub fn optional(name: impl Into<String>, tag: u64, kind: Kind) -> Self {
        FieldSpec {
            name: name.into(),
            tag,
            kind,
            optional: true,
        }
    }

    /// Parses a field from a declaration string: the decimal tag, followed by `,-` if the field is optional.
    ///
    /// ```
    /// use tlv_encoding::{FieldSpec, Kind};
    ///
    /// let field = FieldSpec::parse("name", Kind::Text, "65535,-").unwrap();
    /// assert_eq!(field.tag, 65535);
    /// assert!(field.optional);
    ///
    /// assert!(FieldSpec::parse("name", Kind::Text, "").is_err());
    /// ```
    pub fn parse(
        name: impl Into<String>,
        kind: Kind,
        declaration: &str,
    ) -> Result<Self, SchemaError> {
        let name = name.into();

        let (tag, optional) = match declaration.strip_suffix(OPTIONAL_SUFFIX) {
            Some(tag) => (tag, true),
            None => (declaration, false),
        };

        if tag.is_empty() {
            return Err(SchemaError::MissingTag { field: name });
        }

        let tag = tag.parse::<u64>().map_err(|_| SchemaError::InvalidTag {
            field: name.clone(),
            declaration: declaration.to_string(),
        })?;

        Ok(FieldSpec {
            name,
            tag,
            kind,
            optional,
        })
    }
}

/// The ordered field declarations of a record type.
///
/// Fields are encoded and decoded strictly in this order. Tags should be unique among the fields of one schema; this is not checked.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    fields: Vec<FieldSpec>,
}

impl Schema {
    /// Creates a schema, rejecting kinds that have no unambiguous wire representation.
    pub fn new(fields: Vec<FieldSpec>) -> Result<Self, SchemaError> {
        for field in fields.iter() {
            field.kind.check(&field.name)?;
        }

        Ok(Schema { fields })
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Returns the declaration of the field of the given name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Returns whether any field of this schema uses the given tag.
    pub fn declares(&self, tag: u64) -> bool {
        self.fields.iter().any(|field| field.tag == tag)
    }

    /// Returns a record of this schema with every field at its zero value.
    pub fn zeroed(&self) -> Record {
        let mut record = Record::new();

        for field in self.fields.iter() {
            record.push(Field {
                name: field.name.clone(),
                tag: field.tag,
                optional: field.optional,
                value: field.kind.zero_value(),
            });
        }

        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_declarations() {
        let field = FieldSpec::parse("num", Kind::list(Kind::Uint), "255").unwrap();
        assert_eq!(field.tag, 255);
        assert!(!field.optional);

        let field = FieldSpec::parse("flag", Kind::Bool, "18446744073709551615,-").unwrap();
        assert_eq!(field.tag, u64::MAX);
        assert!(field.optional);

        assert_eq!(
            FieldSpec::parse("flag", Kind::Bool, ",-"),
            Err(SchemaError::MissingTag {
                field: "flag".to_string()
            })
        );
        assert_eq!(
            FieldSpec::parse("flag", Kind::Bool, "seven"),
            Err(SchemaError::InvalidTag {
                field: "flag".to_string(),
                declaration: "seven".to_string(),
            })
        );
        assert!(FieldSpec::parse("flag", Kind::Bool, "18446744073709551616").is_err());
    }

    #[test]
    fn rejects_unsupported_kinds() {
        assert_eq!(
            Schema::new(vec![FieldSpec::required(
                "matrix",
                1,
                Kind::list(Kind::list(Kind::Uint))
            )]),
            Err(SchemaError::UnsupportedKind {
                field: "matrix".to_string(),
                kind: "list of lists",
            })
        );
        assert!(Schema::new(vec![FieldSpec::required(
            "flags",
            1,
            Kind::list(Kind::Bool)
        )])
        .is_err());
        assert!(Schema::new(vec![FieldSpec::required(
            "blobs",
            1,
            Kind::list(Kind::Bytes)
        )])
        .is_ok());
    }

    #[test]
    fn zeroed_record_is_zero() {
        let inner = Schema::new(vec![
            FieldSpec::required("a", 1, Kind::Uint),
            FieldSpec::optional("b", 2, Kind::Text),
        ])
        .unwrap();
        let outer = Schema::new(vec![
            FieldSpec::required("inner", 7, Kind::Record(inner)),
            FieldSpec::required("list", 8, Kind::list(Kind::Bytes)),
        ])
        .unwrap();

        let record = outer.zeroed();
        assert!(record.is_zero());
        assert_eq!(record.fields().len(), 2);
        assert!(outer.declares(8));
        assert!(!outer.declares(1));
    }
}
