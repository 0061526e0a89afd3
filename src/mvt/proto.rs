// vector_tile protobuf schema messages (proto2, schema 2.1).
//
// Hand-maintained quick-protobuf bindings: the schema is small and frozen,
// so the messages are written out rather than generated. Fields are written
// in schema declaration order (a layer writes version first), and reads
// skip unknown fields. `name`, `version`, `extent`, and feature `type` are
// always written; optional scalars only when present; packed fields only
// when non-empty.

use std::borrow::Cow;

use quick_protobuf::sizeofs::*;
use quick_protobuf::{BytesReader, MessageRead, MessageWrite, Result, Writer, WriterBackend};

use super::geometry::GeomType;

// ---------------------------------------------------------------------------
// Tile (top-level message)
// ---------------------------------------------------------------------------

/// `message Tile { repeated Layer layers = 3; }`
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Tile<'a> {
    pub layers: Vec<Layer<'a>>,
}

impl MessageWrite for Tile<'_> {
    fn get_size(&self) -> usize {
        self.layers
            .iter()
            .map(|l| 1 + sizeof_len(l.get_size()))
            .sum()
    }

    fn write_message<W: WriterBackend>(&self, w: &mut Writer<W>) -> Result<()> {
        for layer in &self.layers {
            w.write_with_tag(26, |w| w.write_message(layer))?;
        }
        Ok(())
    }
}

impl<'a> MessageRead<'a> for Tile<'a> {
    fn from_reader(r: &mut BytesReader, bytes: &'a [u8]) -> Result<Self> {
        let mut msg = Self::default();
        while !r.is_eof() {
            match r.next_tag(bytes) {
                Ok(26) => msg.layers.push(r.read_message::<Layer>(bytes)?),
                Ok(t) => {
                    r.read_unknown(bytes, t)?;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(msg)
    }
}

// ---------------------------------------------------------------------------
// Layer
// ---------------------------------------------------------------------------

/// A named layer with its feature list and key/value dictionaries.
///
/// Schema fields: `version = 15`, `name = 1`, `features = 2`, `keys = 3`,
/// `values = 4`, `extent = 5`. Defaults mirror the schema (`version = 1`,
/// `extent = 4096`) so absent fields read back as their declared values.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer<'a> {
    pub version: u32,
    pub name: Cow<'a, str>,
    pub features: Vec<Feature<'a>>,
    pub keys: Vec<Cow<'a, str>>,
    pub values: Vec<Value<'a>>,
    pub extent: u32,
}

impl Default for Layer<'_> {
    fn default() -> Self {
        Self {
            version: 1,
            name: Cow::Borrowed(""),
            features: Vec::new(),
            keys: Vec::new(),
            values: Vec::new(),
            extent: 4096,
        }
    }
}

impl MessageWrite for Layer<'_> {
    fn get_size(&self) -> usize {
        1 + sizeof_varint(u64::from(self.version))
            + 1
            + sizeof_len(self.name.len())
            + self
                .features
                .iter()
                .map(|f| 1 + sizeof_len(f.get_size()))
                .sum::<usize>()
            + self
                .keys
                .iter()
                .map(|k| 1 + sizeof_len(k.len()))
                .sum::<usize>()
            + self
                .values
                .iter()
                .map(|v| 1 + sizeof_len(v.get_size()))
                .sum::<usize>()
            + 1
            + sizeof_varint(u64::from(self.extent))
    }

    fn write_message<W: WriterBackend>(&self, w: &mut Writer<W>) -> Result<()> {
        w.write_with_tag(120, |w| w.write_uint32(self.version))?;
        w.write_with_tag(10, |w| w.write_string(&self.name))?;
        for feature in &self.features {
            w.write_with_tag(18, |w| w.write_message(feature))?;
        }
        for key in &self.keys {
            w.write_with_tag(26, |w| w.write_string(key))?;
        }
        for value in &self.values {
            w.write_with_tag(34, |w| w.write_message(value))?;
        }
        w.write_with_tag(40, |w| w.write_uint32(self.extent))?;
        Ok(())
    }
}

impl<'a> MessageRead<'a> for Layer<'a> {
    fn from_reader(r: &mut BytesReader, bytes: &'a [u8]) -> Result<Self> {
        let mut msg = Self::default();
        while !r.is_eof() {
            match r.next_tag(bytes) {
                Ok(120) => msg.version = r.read_uint32(bytes)?,
                Ok(10) => msg.name = Cow::Borrowed(r.read_string(bytes)?),
                Ok(18) => msg.features.push(r.read_message::<Feature>(bytes)?),
                Ok(26) => msg.keys.push(Cow::Borrowed(r.read_string(bytes)?)),
                Ok(34) => msg.values.push(r.read_message::<Value>(bytes)?),
                Ok(40) => msg.extent = r.read_uint32(bytes)?,
                Ok(t) => {
                    r.read_unknown(bytes, t)?;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(msg)
    }
}

// ---------------------------------------------------------------------------
// Feature
// ---------------------------------------------------------------------------

/// Schema fields: `id = 1`, `tags = 2` (packed), `type = 3`,
/// `geometry = 4` (packed).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Feature<'a> {
    pub id: Option<u64>,
    pub tags: Cow<'a, [u32]>,
    pub geom_type: GeomType,
    pub geometry: Cow<'a, [u32]>,
}

impl MessageWrite for Feature<'_> {
    fn get_size(&self) -> usize {
        self.id.map_or(0, |id| 1 + sizeof_varint(id))
            + packed_varint_size(&self.tags)
            + 1
            + sizeof_varint(self.geom_type as u64)
            + packed_varint_size(&self.geometry)
    }

    fn write_message<W: WriterBackend>(&self, w: &mut Writer<W>) -> Result<()> {
        if let Some(id) = self.id {
            w.write_with_tag(8, |w| w.write_uint64(id))?;
        }
        w.write_packed_with_tag(
            18,
            &self.tags,
            |w, v| w.write_uint32(*v),
            &|v| sizeof_varint(u64::from(*v)),
        )?;
        w.write_with_tag(24, |w| w.write_enum(self.geom_type as i32))?;
        w.write_packed_with_tag(
            34,
            &self.geometry,
            |w, v| w.write_uint32(*v),
            &|v| sizeof_varint(u64::from(*v)),
        )?;
        Ok(())
    }
}

impl<'a> MessageRead<'a> for Feature<'a> {
    fn from_reader(r: &mut BytesReader, bytes: &'a [u8]) -> Result<Self> {
        let mut msg = Self::default();
        while !r.is_eof() {
            match r.next_tag(bytes) {
                Ok(8) => msg.id = Some(r.read_uint64(bytes)?),
                Ok(18) => msg.tags = Cow::Owned(r.read_packed(bytes, |r, b| r.read_uint32(b))?),
                Ok(24) => msg.geom_type = r.read_enum(bytes)?,
                Ok(34) => {
                    msg.geometry = Cow::Owned(r.read_packed(bytes, |r, b| r.read_uint32(b))?)
                }
                Ok(t) => {
                    r.read_unknown(bytes, t)?;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(msg)
    }
}

/// Tag byte plus length-prefixed varint payload; nothing when empty.
fn packed_varint_size(values: &[u32]) -> usize {
    if values.is_empty() {
        0
    } else {
        let payload: usize = values.iter().map(|&v| sizeof_varint(u64::from(v))).sum();
        1 + sizeof_len(payload)
    }
}

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

/// A dictionary value; exactly one field is set in practice. Schema fields:
/// `string_value = 1`, `float_value = 2`, `double_value = 3`,
/// `int_value = 4`, `uint_value = 5`, `sint_value = 6`, `bool_value = 7`.
/// The encoder never produces `float_value` or `int_value`; both are read
/// for interop with other writers.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Value<'a> {
    pub string_value: Option<Cow<'a, str>>,
    pub float_value: Option<f32>,
    pub double_value: Option<f64>,
    pub int_value: Option<i64>,
    pub uint_value: Option<u64>,
    pub sint_value: Option<i64>,
    pub bool_value: Option<bool>,
}

impl MessageWrite for Value<'_> {
    fn get_size(&self) -> usize {
        self.string_value
            .as_ref()
            .map_or(0, |s| 1 + sizeof_len(s.len()))
            + self.float_value.map_or(0, |_| 1 + 4)
            + self.double_value.map_or(0, |_| 1 + 8)
            + self.int_value.map_or(0, |v| 1 + sizeof_varint(v as u64))
            + self.uint_value.map_or(0, |v| 1 + sizeof_varint(v))
            + self.sint_value.map_or(0, |v| 1 + sizeof_sint64(v))
            + self.bool_value.map_or(0, |v| 1 + sizeof_varint(u64::from(v)))
    }

    fn write_message<W: WriterBackend>(&self, w: &mut Writer<W>) -> Result<()> {
        if let Some(ref s) = self.string_value {
            w.write_with_tag(10, |w| w.write_string(s))?;
        }
        if let Some(v) = self.float_value {
            w.write_with_tag(21, |w| w.write_float(v))?;
        }
        if let Some(v) = self.double_value {
            w.write_with_tag(25, |w| w.write_double(v))?;
        }
        if let Some(v) = self.int_value {
            w.write_with_tag(32, |w| w.write_int64(v))?;
        }
        if let Some(v) = self.uint_value {
            w.write_with_tag(40, |w| w.write_uint64(v))?;
        }
        if let Some(v) = self.sint_value {
            w.write_with_tag(48, |w| w.write_sint64(v))?;
        }
        if let Some(v) = self.bool_value {
            w.write_with_tag(56, |w| w.write_bool(v))?;
        }
        Ok(())
    }
}

impl<'a> MessageRead<'a> for Value<'a> {
    fn from_reader(r: &mut BytesReader, bytes: &'a [u8]) -> Result<Self> {
        let mut msg = Self::default();
        while !r.is_eof() {
            match r.next_tag(bytes) {
                Ok(10) => msg.string_value = Some(Cow::Borrowed(r.read_string(bytes)?)),
                Ok(21) => msg.float_value = Some(r.read_float(bytes)?),
                Ok(25) => msg.double_value = Some(r.read_double(bytes)?),
                Ok(32) => msg.int_value = Some(r.read_int64(bytes)?),
                Ok(40) => msg.uint_value = Some(r.read_uint64(bytes)?),
                Ok(48) => msg.sint_value = Some(r.read_sint64(bytes)?),
                Ok(56) => msg.bool_value = Some(r.read_bool(bytes)?),
                Ok(t) => {
                    r.read_unknown(bytes, t)?;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(msg)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
