use libfuzzer_sys::arbitrary::{self, Arbitrary};
use tlv_encoding::{FieldSpec, Kind, Record, Schema, SchemaError, TlvRecord};

/// A small record that is nested inside [`Sample`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Arbitrary)]
pub struct Inner {
    pub id: u64,
    pub names: Vec<String>,
    pub ready: bool,
}

impl TlvRecord for Inner {
    fn schema() -> Schema {
        Schema::new(vec![
            FieldSpec::required("id", 1, Kind::Uint),
            FieldSpec::optional("names", 2, Kind::list(Kind::Text)),
            FieldSpec::required("ready", 3, Kind::Bool),
        ])
        .unwrap()
    }

    fn to_record(&self) -> Result<Record, SchemaError> {
        let mut record = Self::schema().zeroed();
        record.set("id", self.id)?;
        record.set("names", self.names.clone())?;
        record.set("ready", self.ready)?;
        Ok(record)
    }

    fn from_record(mut record: Record) -> Result<Self, SchemaError> {
        Ok(Inner {
            id: record.take("id")?,
            names: record.take("names")?,
            ready: record.take("ready")?,
        })
    }
}

/// A record using every kind of field, with tags of every compact width.
#[derive(Debug, Clone, PartialEq, Eq, Default, Arbitrary)]
pub struct Sample {
    pub count: u64,
    pub label: String,
    pub payload: Vec<u8>,
    pub flag: bool,
    pub readings: Vec<u64>,
    pub inner: Inner,
    pub children: Vec<Inner>,
    pub blobs: Vec<Vec<u8>>,
}

impl TlvRecord for Sample {
    fn schema() -> Schema {
        Schema::new(vec![
            FieldSpec::required("count", 0, Kind::Uint),
            FieldSpec::optional("label", 2, Kind::Text),
            FieldSpec::optional("payload", 3, Kind::Bytes),
            FieldSpec::optional("flag", 252, Kind::Bool),
            FieldSpec::optional("readings", 253, Kind::list(Kind::Uint)),
            FieldSpec::required("inner", 300, Kind::Record(Inner::schema())),
            FieldSpec::optional("children", 70_000, Kind::list(Kind::Record(Inner::schema()))),
            FieldSpec::optional("blobs", u64::MAX, Kind::list(Kind::Bytes)),
        ])
        .unwrap()
    }

    fn to_record(&self) -> Result<Record, SchemaError> {
        let children = self
            .children
            .iter()
            .map(Inner::to_record)
            .collect::<Result<Vec<_>, _>>()?;

        let mut record = Self::schema().zeroed();
        record.set("count", self.count)?;
        record.set("label", self.label.clone())?;
        record.set("payload", self.payload.clone())?;
        record.set("flag", self.flag)?;
        record.set("readings", self.readings.clone())?;
        record.set("inner", self.inner.to_record()?)?;
        record.set("children", children)?;
        record.set("blobs", self.blobs.clone())?;
        Ok(record)
    }

    fn from_record(mut record: Record) -> Result<Self, SchemaError> {
        let children: Vec<Record> = record.take("children")?;

        Ok(Sample {
            count: record.take("count")?,
            label: record.take("label")?,
            payload: record.take("payload")?,
            flag: record.take("flag")?,
            readings: record.take("readings")?,
            inner: Inner::from_record(record.take("inner")?)?,
            children: children
                .into_iter()
                .map(Inner::from_record)
                .collect::<Result<Vec<_>, _>>()?,
            blobs: record.take("blobs")?,
        })
    }
}
