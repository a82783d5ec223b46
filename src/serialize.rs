//! Compact JSON writer with fixed-precision floats.
//!
//! Finite floats are written with exactly `precision` decimals; `NaN`,
//! `Infinity` and `-Infinity` are written as bare tokens, the way JavaScript
//! object literals accept them. Precision is passed per call.

use crate::error::{ExportError, Result};
use serde::Serialize;
use serde::ser::{self, SerializeMap as _};
use std::fmt::Display;

/// Digits after the decimal point when callers do not choose.
pub const DEFAULT_FLOAT_PRECISION: usize = 6;

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct SerializeError(String);

impl ser::Error for SerializeError {
    fn custom<T: Display>(msg: T) -> Self {
        SerializeError(msg.to_string())
    }
}

impl From<SerializeError> for ExportError {
    fn from(e: SerializeError) -> Self {
        ExportError::Serialize(e.0)
    }
}

type WriteResult = std::result::Result<(), SerializeError>;

/// Scalar float rule used for every float in the output.
pub fn format_float(v: f64, precision: usize) -> String {
    if v.is_nan() {
        "NaN".into()
    } else if v == f64::INFINITY {
        "Infinity".into()
    } else if v == f64::NEG_INFINITY {
        "-Infinity".into()
    } else {
        format!("{v:.precision$}")
    }
}

/// Serialize `value` to compact JSON text with `precision` float digits.
pub fn to_string<T: Serialize + ?Sized>(value: &T, precision: usize) -> Result<String> {
    let mut writer = JsonWriter::new(precision);
    value.serialize(&mut writer)?;
    Ok(writer.into_string())
}

pub struct JsonWriter {
    out: String,
    precision: usize,
}

impl JsonWriter {
    pub fn new(precision: usize) -> Self {
        Self {
            out: String::new(),
            precision,
        }
    }

    pub fn into_string(self) -> String {
        self.out
    }

    fn push_json_str(&mut self, s: &str) -> WriteResult {
        let quoted = serde_json::to_string(s).map_err(|e| SerializeError(e.to_string()))?;
        self.out.push_str(&quoted);
        Ok(())
    }

    fn push_display(&mut self, v: impl Display) -> WriteResult {
        self.out.push_str(&v.to_string());
        Ok(())
    }
}

pub struct Compound<'a> {
    ser: &'a mut JsonWriter,
    first: bool,
    close: &'static str,
}

impl Compound<'_> {
    fn comma(&mut self) {
        if !self.first {
            self.ser.out.push(',');
        }
        self.first = false;
    }

    fn field<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> WriteResult {
        self.comma();
        self.ser.push_json_str(key)?;
        self.ser.out.push(':');
        value.serialize(&mut *self.ser)
    }

    fn element<T: Serialize + ?Sized>(&mut self, value: &T) -> WriteResult {
        self.comma();
        value.serialize(&mut *self.ser)
    }

    fn finish(self) -> WriteResult {
        self.ser.out.push_str(self.close);
        Ok(())
    }
}

impl<'a> ser::Serializer for &'a mut JsonWriter {
    type Ok = ();
    type Error = SerializeError;
    type SerializeSeq = Compound<'a>;
    type SerializeTuple = Compound<'a>;
    type SerializeTupleStruct = Compound<'a>;
    type SerializeTupleVariant = Compound<'a>;
    type SerializeMap = Compound<'a>;
    type SerializeStruct = Compound<'a>;
    type SerializeStructVariant = Compound<'a>;

    fn serialize_bool(self, v: bool) -> WriteResult {
        self.out.push_str(if v { "true" } else { "false" });
        Ok(())
    }

    fn serialize_i8(self, v: i8) -> WriteResult {
        self.push_display(v)
    }

    fn serialize_i16(self, v: i16) -> WriteResult {
        self.push_display(v)
    }

    fn serialize_i32(self, v: i32) -> WriteResult {
        self.push_display(v)
    }

    fn serialize_i64(self, v: i64) -> WriteResult {
        self.push_display(v)
    }

    fn serialize_i128(self, v: i128) -> WriteResult {
        self.push_display(v)
    }

    fn serialize_u8(self, v: u8) -> WriteResult {
        self.push_display(v)
    }

    fn serialize_u16(self, v: u16) -> WriteResult {
        self.push_display(v)
    }

    fn serialize_u32(self, v: u32) -> WriteResult {
        self.push_display(v)
    }

    fn serialize_u64(self, v: u64) -> WriteResult {
        self.push_display(v)
    }

    fn serialize_u128(self, v: u128) -> WriteResult {
        self.push_display(v)
    }

    fn serialize_f32(self, v: f32) -> WriteResult {
        self.serialize_f64(v as f64)
    }

    fn serialize_f64(self, v: f64) -> WriteResult {
        let text = format_float(v, self.precision);
        self.out.push_str(&text);
        Ok(())
    }

    fn serialize_char(self, v: char) -> WriteResult {
        self.push_json_str(v.encode_utf8(&mut [0; 4]))
    }

    fn serialize_str(self, v: &str) -> WriteResult {
        self.push_json_str(v)
    }

    fn serialize_bytes(self, v: &[u8]) -> WriteResult {
        let mut seq = self.serialize_seq(Some(v.len()))?;
        for b in v {
            ser::SerializeSeq::serialize_element(&mut seq, b)?;
        }
        ser::SerializeSeq::end(seq)
    }

    fn serialize_none(self) -> WriteResult {
        self.out.push_str("null");
        Ok(())
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> WriteResult {
        value.serialize(self)
    }

    fn serialize_unit(self) -> WriteResult {
        self.serialize_none()
    }

    fn serialize_unit_struct(self, _name: &'static str) -> WriteResult {
        self.serialize_none()
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> WriteResult {
        self.push_json_str(variant)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> WriteResult {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        value: &T,
    ) -> WriteResult {
        let mut map = self.serialize_map(Some(1))?;
        map.serialize_entry(variant, value)?;
        ser::SerializeMap::end(map)
    }

    fn serialize_seq(self, _len: Option<usize>) -> std::result::Result<Compound<'a>, SerializeError> {
        self.out.push('[');
        Ok(Compound {
            ser: self,
            first: true,
            close: "]",
        })
    }

    fn serialize_tuple(self, len: usize) -> std::result::Result<Compound<'a>, SerializeError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> std::result::Result<Compound<'a>, SerializeError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        _len: usize,
    ) -> std::result::Result<Compound<'a>, SerializeError> {
        self.out.push('{');
        self.push_json_str(variant)?;
        self.out.push_str(":[");
        Ok(Compound {
            ser: self,
            first: true,
            close: "]}",
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> std::result::Result<Compound<'a>, SerializeError> {
        self.out.push('{');
        Ok(Compound {
            ser: self,
            first: true,
            close: "}",
        })
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> std::result::Result<Compound<'a>, SerializeError> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        _len: usize,
    ) -> std::result::Result<Compound<'a>, SerializeError> {
        self.out.push('{');
        self.push_json_str(variant)?;
        self.out.push_str(":{");
        Ok(Compound {
            ser: self,
            first: true,
            close: "}}",
        })
    }
}

impl ser::SerializeSeq for Compound<'_> {
    type Ok = ();
    type Error = SerializeError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> WriteResult {
        self.element(value)
    }

    fn end(self) -> WriteResult {
        self.finish()
    }
}

impl ser::SerializeTuple for Compound<'_> {
    type Ok = ();
    type Error = SerializeError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> WriteResult {
        self.element(value)
    }

    fn end(self) -> WriteResult {
        self.finish()
    }
}

impl ser::SerializeTupleStruct for Compound<'_> {
    type Ok = ();
    type Error = SerializeError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> WriteResult {
        self.element(value)
    }

    fn end(self) -> WriteResult {
        self.finish()
    }
}

impl ser::SerializeTupleVariant for Compound<'_> {
    type Ok = ();
    type Error = SerializeError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> WriteResult {
        self.element(value)
    }

    fn end(self) -> WriteResult {
        self.finish()
    }
}

impl ser::SerializeMap for Compound<'_> {
    type Ok = ();
    type Error = SerializeError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> WriteResult {
        self.comma();
        // JSON keys must be strings; numeric keys get quoted.
        let mut k = JsonWriter::new(self.ser.precision);
        key.serialize(&mut k)?;
        if k.out.starts_with('"') {
            self.ser.out.push_str(&k.out);
        } else {
            self.ser.push_json_str(&k.out)?;
        }
        self.ser.out.push(':');
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> WriteResult {
        value.serialize(&mut *self.ser)
    }

    fn end(self) -> WriteResult {
        self.finish()
    }
}

impl ser::SerializeStruct for Compound<'_> {
    type Ok = ();
    type Error = SerializeError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, key: &'static str, value: &T) -> WriteResult {
        self.field(key, value)
    }

    fn end(self) -> WriteResult {
        self.finish()
    }
}

impl ser::SerializeStructVariant for Compound<'_> {
    type Ok = ();
    type Error = SerializeError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, key: &'static str, value: &T) -> WriteResult {
        self.field(key, value)
    }

    fn end(self) -> WriteResult {
        self.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    struct Sample {
        name: &'static str,
        value: f64,
        count: u32,
        tags: Vec<&'static str>,
        missing: Option<f64>,
    }

    #[derive(Serialize)]
    enum Shape {
        Dot,
        Pair(f64, f64),
        Box { w: f64 },
    }

    #[test]
    fn floats_use_fixed_precision() {
        assert_eq!(format_float(3.14159265, 2), "3.14");
        assert_eq!(format_float(1e21, 1), "1000000000000000000000.0");
        assert_eq!(format_float(-2.75, 1), "-2.8");
        assert_eq!(to_string(&2.0_f64, 3).unwrap(), "2.000");
    }

    #[test]
    fn non_finite_tokens() {
        assert_eq!(format_float(f64::NAN, 4), "NaN");
        assert_eq!(format_float(f64::INFINITY, 4), "Infinity");
        assert_eq!(format_float(f64::NEG_INFINITY, 4), "-Infinity");
        assert_eq!(
            to_string(&vec![f64::NAN, 1.0], 1).unwrap(),
            "[NaN,1.0]"
        );
    }

    #[test]
    fn structs_and_collections() {
        let s = Sample {
            name: "a\"b",
            value: 0.126,
            count: 7,
            tags: vec!["x", "y"],
            missing: None,
        };
        assert_eq!(
            to_string(&s, 2).unwrap(),
            r#"{"name":"a\"b","value":0.13,"count":7,"tags":["x","y"],"missing":null}"#
        );
    }

    #[test]
    fn enum_representations() {
        assert_eq!(to_string(&Shape::Dot, 1).unwrap(), r#""Dot""#);
        assert_eq!(to_string(&Shape::Pair(1.0, 2.0), 1).unwrap(), r#"{"Pair":[1.0,2.0]}"#);
        assert_eq!(to_string(&Shape::Box { w: 1.0 }, 1).unwrap(), r#"{"Box":{"w":1.0}}"#);
    }

    #[test]
    fn numeric_map_keys_are_quoted() {
        let mut m = BTreeMap::new();
        m.insert(1, "one");
        m.insert(2, "two");
        assert_eq!(to_string(&m, 0).unwrap(), r#"{"1":"one","2":"two"}"#);
    }

    #[test]
    fn precision_is_per_call() {
        let v = [1.0_f64 / 3.0];
        assert_eq!(to_string(&v, 2).unwrap(), "[0.33]");
        assert_eq!(to_string(&v, 4).unwrap(), "[0.3333]");
    }
}
