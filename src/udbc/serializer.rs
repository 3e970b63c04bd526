use crate::udbc::value::{Record, Value};
use serde::Serialize;
use serde::ser::*;

#[derive(Debug)]
pub enum Error {
    Custom(String),
    /// A column value was a sequence, map or struct.
    Nested(&'static str),
    /// The top-level value was not a struct or map.
    NotARecord(&'static str),
}

impl serde::ser::Error for Error {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Custom(s) => write!(f, "{}", s),
            Error::Nested(kind) => write!(f, "column values cannot be a {}", kind),
            Error::NotARecord(kind) => write!(f, "expected a struct or map, got {}", kind),
        }
    }
}

impl std::error::Error for Error {}

/// Serializes a single column value.
pub struct ValueSerializer;

impl Serializer for ValueSerializer {
    type Ok = Value;
    type Error = Error;
    type SerializeSeq = Impossible<Value, Error>;
    type SerializeTuple = Impossible<Value, Error>;
    type SerializeTupleStruct = Impossible<Value, Error>;
    type SerializeTupleVariant = Impossible<Value, Error>;
    type SerializeMap = Impossible<Value, Error>;
    type SerializeStruct = Impossible<Value, Error>;
    type SerializeStructVariant = Impossible<Value, Error>;

    fn serialize_bool(self, v: bool) -> Result<Self::Ok, Self::Error> {
        Ok(Value::Bool(v))
    }
    fn serialize_i8(self, v: i8) -> Result<Self::Ok, Self::Error> {
        Ok(Value::I16(v as i16))
    }
    fn serialize_i16(self, v: i16) -> Result<Self::Ok, Self::Error> {
        Ok(Value::I16(v))
    }
    fn serialize_i32(self, v: i32) -> Result<Self::Ok, Self::Error> {
        Ok(Value::I32(v))
    }
    fn serialize_i64(self, v: i64) -> Result<Self::Ok, Self::Error> {
        Ok(Value::I64(v))
    }
    fn serialize_u8(self, v: u8) -> Result<Self::Ok, Self::Error> {
        Ok(Value::U8(v))
    }
    fn serialize_u16(self, v: u16) -> Result<Self::Ok, Self::Error> {
        Ok(Value::I64(v as i64))
    }
    fn serialize_u32(self, v: u32) -> Result<Self::Ok, Self::Error> {
        Ok(Value::I64(v as i64))
    }
    fn serialize_u64(self, v: u64) -> Result<Self::Ok, Self::Error> {
        Ok(Value::U64(v))
    }
    fn serialize_f32(self, v: f32) -> Result<Self::Ok, Self::Error> {
        Ok(Value::F64(v as f64))
    }
    fn serialize_f64(self, v: f64) -> Result<Self::Ok, Self::Error> {
        Ok(Value::F64(v))
    }
    fn serialize_char(self, v: char) -> Result<Self::Ok, Self::Error> {
        Ok(Value::Str(v.to_string()))
    }
    fn serialize_str(self, v: &str) -> Result<Self::Ok, Self::Error> {
        Ok(Value::Str(v.to_string()))
    }
    fn serialize_bytes(self, v: &[u8]) -> Result<Self::Ok, Self::Error> {
        Ok(Value::Bytes(v.to_vec()))
    }
    fn serialize_none(self) -> Result<Self::Ok, Self::Error> {
        Ok(Value::Null)
    }
    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Self::Ok, Self::Error> {
        value.serialize(self)
    }
    fn serialize_unit(self) -> Result<Self::Ok, Self::Error> {
        Ok(Value::Null)
    }
    fn serialize_unit_struct(self, _: &'static str) -> Result<Self::Ok, Self::Error> {
        Ok(Value::Null)
    }
    fn serialize_unit_variant(
        self,
        _: &'static str,
        _: u32,
        variant: &'static str,
    ) -> Result<Self::Ok, Self::Error> {
        Ok(Value::Str(variant.to_string()))
    }
    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error> {
        value.serialize(self)
    }
    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error> {
        value.serialize(self)
    }
    fn serialize_seq(self, _: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        Err(Error::Nested("sequence"))
    }
    fn serialize_tuple(self, _: usize) -> Result<Self::SerializeTuple, Self::Error> {
        Err(Error::Nested("tuple"))
    }
    fn serialize_tuple_struct(
        self,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        Err(Error::Nested("tuple struct"))
    }
    fn serialize_tuple_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        Err(Error::Nested("tuple variant"))
    }
    fn serialize_map(self, _: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        Err(Error::Nested("map"))
    }
    fn serialize_struct(
        self,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        Err(Error::Nested("struct"))
    }
    fn serialize_struct_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        Err(Error::Nested("struct variant"))
    }
}

/// Serializes a struct or map into an ordered [`Record`].
pub struct RecordSerializer;

pub struct RecordBuilder {
    record: Record,
    key: Option<String>,
}

impl RecordBuilder {
    fn new() -> Self {
        Self {
            record: Record::new(),
            key: None,
        }
    }
}

impl Serializer for RecordSerializer {
    type Ok = Record;
    type Error = Error;
    type SerializeSeq = Impossible<Record, Error>;
    type SerializeTuple = Impossible<Record, Error>;
    type SerializeTupleStruct = Impossible<Record, Error>;
    type SerializeTupleVariant = Impossible<Record, Error>;
    type SerializeMap = RecordBuilder;
    type SerializeStruct = RecordBuilder;
    type SerializeStructVariant = Impossible<Record, Error>;

    fn serialize_bool(self, _: bool) -> Result<Record, Error> {
        Err(Error::NotARecord("bool"))
    }
    fn serialize_i8(self, _: i8) -> Result<Record, Error> {
        Err(Error::NotARecord("integer"))
    }
    fn serialize_i16(self, _: i16) -> Result<Record, Error> {
        Err(Error::NotARecord("integer"))
    }
    fn serialize_i32(self, _: i32) -> Result<Record, Error> {
        Err(Error::NotARecord("integer"))
    }
    fn serialize_i64(self, _: i64) -> Result<Record, Error> {
        Err(Error::NotARecord("integer"))
    }
    fn serialize_u8(self, _: u8) -> Result<Record, Error> {
        Err(Error::NotARecord("integer"))
    }
    fn serialize_u16(self, _: u16) -> Result<Record, Error> {
        Err(Error::NotARecord("integer"))
    }
    fn serialize_u32(self, _: u32) -> Result<Record, Error> {
        Err(Error::NotARecord("integer"))
    }
    fn serialize_u64(self, _: u64) -> Result<Record, Error> {
        Err(Error::NotARecord("integer"))
    }
    fn serialize_f32(self, _: f32) -> Result<Record, Error> {
        Err(Error::NotARecord("float"))
    }
    fn serialize_f64(self, _: f64) -> Result<Record, Error> {
        Err(Error::NotARecord("float"))
    }
    fn serialize_char(self, _: char) -> Result<Record, Error> {
        Err(Error::NotARecord("char"))
    }
    fn serialize_str(self, _: &str) -> Result<Record, Error> {
        Err(Error::NotARecord("string"))
    }
    fn serialize_bytes(self, _: &[u8]) -> Result<Record, Error> {
        Err(Error::NotARecord("bytes"))
    }
    fn serialize_none(self) -> Result<Record, Error> {
        Err(Error::NotARecord("none"))
    }
    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Record, Error> {
        value.serialize(self)
    }
    fn serialize_unit(self) -> Result<Record, Error> {
        Ok(Record::new())
    }
    fn serialize_unit_struct(self, _: &'static str) -> Result<Record, Error> {
        Ok(Record::new())
    }
    fn serialize_unit_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
    ) -> Result<Record, Error> {
        Err(Error::NotARecord("enum variant"))
    }
    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _: &'static str,
        value: &T,
    ) -> Result<Record, Error> {
        value.serialize(self)
    }
    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: &T,
    ) -> Result<Record, Error> {
        Err(Error::NotARecord("enum variant"))
    }
    fn serialize_seq(self, _: Option<usize>) -> Result<Self::SerializeSeq, Error> {
        Err(Error::NotARecord("sequence"))
    }
    fn serialize_tuple(self, _: usize) -> Result<Self::SerializeTuple, Error> {
        Err(Error::NotARecord("tuple"))
    }
    fn serialize_tuple_struct(
        self,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeTupleStruct, Error> {
        Err(Error::NotARecord("tuple struct"))
    }
    fn serialize_tuple_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeTupleVariant, Error> {
        Err(Error::NotARecord("tuple variant"))
    }
    fn serialize_map(self, _: Option<usize>) -> Result<Self::SerializeMap, Error> {
        Ok(RecordBuilder::new())
    }
    fn serialize_struct(self, _: &'static str, _: usize) -> Result<Self::SerializeStruct, Error> {
        Ok(RecordBuilder::new())
    }
    fn serialize_struct_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeStructVariant, Error> {
        Err(Error::NotARecord("struct variant"))
    }
}

impl SerializeMap for RecordBuilder {
    type Ok = Record;
    type Error = Error;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), Self::Error> {
        if let Value::Str(s) = key.serialize(ValueSerializer)? {
            self.key = Some(s);
            Ok(())
        } else {
            Err(Error::Custom("Map key must be string".into()))
        }
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        let v = value.serialize(ValueSerializer)?;
        let key = self
            .key
            .take()
            .ok_or(Error::Custom("Missing key for value".into()))?;
        self.record.insert(key, v);
        Ok(())
    }

    fn end(self) -> Result<Record, Error> {
        Ok(self.record)
    }
}

impl SerializeStruct for RecordBuilder {
    type Ok = Record;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        let v = value.serialize(ValueSerializer)?;
        self.record.insert(key, v);
        Ok(())
    }

    fn end(self) -> Result<Record, Error> {
        Ok(self.record)
    }
}

pub fn to_value<T: Serialize + ?Sized>(t: &T) -> Result<Value, Error> {
    t.serialize(ValueSerializer)
}

pub fn to_record<T: Serialize + ?Sized>(t: &T) -> Result<Record, Error> {
    t.serialize(RecordSerializer)
}
