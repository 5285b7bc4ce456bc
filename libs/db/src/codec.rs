//! In-place binary codecs for property values, properties, label sets, and
//! node headers.
//!
//! All integers are fixed-width big-endian. Values are tag-prefixed:
//!
//! | tag | kind   | payload                          |
//! |-----|--------|----------------------------------|
//! | 0   | i64    | u64 BE (two's-complement bits)   |
//! | 1   | f64    | IEEE-754 bits as u64 BE          |
//! | 2   | bool   | 1 byte (0/1)                     |
//! | 3   | textId | u32 BE into the text dictionary  |
//! | 4   | bytes  | u32 BE length, then raw bytes    |
//! | 5   | null   | empty                            |
//!
//! New tags may only be appended at the end of the tag space; the layouts
//! above are the on-disk format and must not change.

use crate::error::{Error, Result};
use crate::{LabelId, NodeId, PropKeyId, TextId};

const TAG_I64: u8 = 0;
const TAG_F64: u8 = 1;
const TAG_BOOL: u8 = 2;
const TAG_TEXT_ID: u8 = 3;
const TAG_BYTES: u8 = 4;
const TAG_NULL: u8 = 5;

/// A property value. Pure data: text interning is a policy applied by
/// adapters, not by this type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    I64(i64),
    F64(f64),
    Bool(bool),
    TextId(TextId),
    Bytes(Vec<u8>),
    Null,
}

/// A keyed property value. The key is an interned property-key id.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub key_id: PropKeyId,
    pub value: Value,
}

/// Node header row: identity, sorted unique label ids, and the small set
/// of hot properties stored inline.
///
/// Cold properties and vectors are deliberately not part of this struct;
/// they live in sibling column families keyed by node id.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeHeader {
    pub id: NodeId,
    pub labels: Vec<LabelId>,
    pub hot_props: Vec<Property>,
}

// ============================================================================
// Encoding
// ============================================================================

pub fn encode_value(out: &mut Vec<u8>, value: &Value) {
    match value {
        Value::I64(x) => {
            out.push(TAG_I64);
            out.extend_from_slice(&(*x as u64).to_be_bytes());
        }
        Value::F64(x) => {
            out.push(TAG_F64);
            out.extend_from_slice(&x.to_bits().to_be_bytes());
        }
        Value::Bool(x) => {
            out.push(TAG_BOOL);
            out.push(u8::from(*x));
        }
        Value::TextId(id) => {
            out.push(TAG_TEXT_ID);
            out.extend_from_slice(&id.to_be_bytes());
        }
        Value::Bytes(bytes) => {
            out.push(TAG_BYTES);
            out.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
            out.extend_from_slice(bytes);
        }
        Value::Null => out.push(TAG_NULL),
    }
}

/// Encode a value into a fresh buffer. Convenience for single-value rows.
pub fn encode_value_to_vec(value: &Value) -> Vec<u8> {
    let mut out = Vec::with_capacity(16);
    encode_value(&mut out, value);
    out
}

pub fn encode_property(out: &mut Vec<u8>, prop: &Property) {
    out.extend_from_slice(&prop.key_id.to_be_bytes());
    encode_value(out, &prop.value);
}

pub fn encode_label_set(out: &mut Vec<u8>, labels: &[LabelId]) {
    out.extend_from_slice(&(labels.len() as u32).to_be_bytes());
    for id in labels {
        out.extend_from_slice(&id.to_be_bytes());
    }
}

pub fn encode_node_header(header: &NodeHeader) -> Vec<u8> {
    let mut out =
        Vec::with_capacity(8 + 4 + header.labels.len() * 4 + 4 + header.hot_props.len() * 16);
    out.extend_from_slice(&header.id.to_be_bytes());
    encode_label_set(&mut out, &header.labels);
    out.extend_from_slice(&(header.hot_props.len() as u32).to_be_bytes());
    for prop in &header.hot_props {
        encode_property(&mut out, prop);
    }
    out
}

// ============================================================================
// Decoding
// ============================================================================

/// Byte cursor over an encoded buffer. Every read is bounds-checked and
/// fails with [`Error::CorruptEncoding`] on truncation.
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize, what: &'static str) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(Error::CorruptEncoding(what));
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn u8(&mut self, what: &'static str) -> Result<u8> {
        Ok(self.take(1, what)?[0])
    }

    fn u32_be(&mut self, what: &'static str) -> Result<u32> {
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(self.take(4, what)?);
        Ok(u32::from_be_bytes(bytes))
    }

    fn u64_be(&mut self, what: &'static str) -> Result<u64> {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(self.take(8, what)?);
        Ok(u64::from_be_bytes(bytes))
    }
}

fn decode_value_from(r: &mut Reader<'_>) -> Result<Value> {
    let tag = r.u8("value tag")?;
    match tag {
        TAG_I64 => Ok(Value::I64(r.u64_be("i64 payload")? as i64)),
        TAG_F64 => Ok(Value::F64(f64::from_bits(r.u64_be("f64 payload")?))),
        TAG_BOOL => Ok(Value::Bool(r.u8("bool payload")? != 0)),
        TAG_TEXT_ID => Ok(Value::TextId(r.u32_be("textId payload")?)),
        TAG_BYTES => {
            let len = r.u32_be("bytes length")? as usize;
            Ok(Value::Bytes(r.take(len, "bytes payload")?.to_vec()))
        }
        TAG_NULL => Ok(Value::Null),
        _ => Err(Error::CorruptEncoding("unknown value tag")),
    }
}

/// Decode a single value row. Trailing bytes after the value are rejected.
pub fn decode_value(bytes: &[u8]) -> Result<Value> {
    let mut r = Reader::new(bytes);
    let value = decode_value_from(&mut r)?;
    if r.remaining() != 0 {
        return Err(Error::CorruptEncoding("trailing bytes after value"));
    }
    Ok(value)
}

fn decode_property_from(r: &mut Reader<'_>) -> Result<Property> {
    let key_id = r.u32_be("property keyId")?;
    let value = decode_value_from(r)?;
    Ok(Property { key_id, value })
}

pub fn decode_property(bytes: &[u8]) -> Result<Property> {
    let mut r = Reader::new(bytes);
    let prop = decode_property_from(&mut r)?;
    if r.remaining() != 0 {
        return Err(Error::CorruptEncoding("trailing bytes after property"));
    }
    Ok(prop)
}

fn decode_label_set_from(r: &mut Reader<'_>) -> Result<Vec<LabelId>> {
    let count = r.u32_be("label count")? as usize;
    let mut labels = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        labels.push(r.u32_be("label id")?);
    }
    Ok(labels)
}

pub fn decode_label_set(bytes: &[u8]) -> Result<Vec<LabelId>> {
    let mut r = Reader::new(bytes);
    let labels = decode_label_set_from(&mut r)?;
    if r.remaining() != 0 {
        return Err(Error::CorruptEncoding("trailing bytes after label set"));
    }
    Ok(labels)
}

pub fn decode_node_header(bytes: &[u8]) -> Result<NodeHeader> {
    let mut r = Reader::new(bytes);
    let id = r.u64_be("node header id")?;
    let labels = decode_label_set_from(&mut r)?;
    let count = r.u32_be("hot prop count")? as usize;
    let mut hot_props = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        hot_props.push(decode_property_from(&mut r)?);
    }
    if r.remaining() != 0 {
        return Err(Error::CorruptEncoding("trailing bytes in node header"));
    }
    Ok(NodeHeader {
        id,
        labels,
        hot_props,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip_value(value: Value) {
        let bytes = encode_value_to_vec(&value);
        assert_eq!(decode_value(&bytes).unwrap(), value);
    }

    #[test]
    fn value_roundtrip_all_variants() {
        roundtrip_value(Value::I64(42));
        roundtrip_value(Value::I64(-1));
        roundtrip_value(Value::I64(i64::MIN));
        roundtrip_value(Value::F64(3.14));
        roundtrip_value(Value::F64(-0.0));
        roundtrip_value(Value::Bool(true));
        roundtrip_value(Value::Bool(false));
        roundtrip_value(Value::TextId(7));
        roundtrip_value(Value::Bytes(b"hello".to_vec()));
        roundtrip_value(Value::Bytes(Vec::new()));
        roundtrip_value(Value::Null);
    }

    #[test]
    fn value_tag_bytes_are_stable() {
        assert_eq!(encode_value_to_vec(&Value::I64(0))[0], 0);
        assert_eq!(encode_value_to_vec(&Value::F64(0.0))[0], 1);
        assert_eq!(encode_value_to_vec(&Value::Bool(false))[0], 2);
        assert_eq!(encode_value_to_vec(&Value::TextId(0))[0], 3);
        assert_eq!(encode_value_to_vec(&Value::Bytes(Vec::new()))[0], 4);
        assert_eq!(encode_value_to_vec(&Value::Null)[0], 5);
    }

    #[test]
    fn i64_encodes_twos_complement_be() {
        let bytes = encode_value_to_vec(&Value::I64(-1));
        assert_eq!(&bytes[1..], &[0xff; 8]);
    }

    #[test]
    fn property_roundtrip() {
        let prop = Property {
            key_id: 9,
            value: Value::Bytes(b"payload".to_vec()),
        };
        let mut bytes = Vec::new();
        encode_property(&mut bytes, &prop);
        assert_eq!(decode_property(&bytes).unwrap(), prop);
    }

    #[test]
    fn label_set_roundtrip() {
        for labels in [vec![], vec![1], vec![1, 2, 7, 900]] {
            let mut bytes = Vec::new();
            encode_label_set(&mut bytes, &labels);
            assert_eq!(decode_label_set(&bytes).unwrap(), labels);
        }
    }

    #[test]
    fn node_header_roundtrip() {
        let header = NodeHeader {
            id: 17,
            labels: vec![1, 4, 9],
            hot_props: vec![
                Property {
                    key_id: 1,
                    value: Value::I64(42),
                },
                Property {
                    key_id: 2,
                    value: Value::Bool(true),
                },
                Property {
                    key_id: 3,
                    value: Value::Null,
                },
            ],
        };
        let bytes = encode_node_header(&header);
        assert_eq!(decode_node_header(&bytes).unwrap(), header);
    }

    #[test]
    fn decode_rejects_truncation() {
        let header = NodeHeader {
            id: 1,
            labels: vec![2],
            hot_props: vec![Property {
                key_id: 1,
                value: Value::I64(5),
            }],
        };
        let bytes = encode_node_header(&header);
        for len in 0..bytes.len() {
            assert!(
                matches!(
                    decode_node_header(&bytes[..len]),
                    Err(Error::CorruptEncoding(_))
                ),
                "truncation to {} bytes must fail",
                len
            );
        }
    }

    #[test]
    fn decode_rejects_unknown_tag() {
        let bytes = [6u8];
        assert!(matches!(
            decode_value(&bytes),
            Err(Error::CorruptEncoding("unknown value tag"))
        ));
    }

    #[test]
    fn decode_rejects_trailing_bytes() {
        let header = NodeHeader {
            id: 1,
            labels: vec![],
            hot_props: vec![],
        };
        let mut bytes = encode_node_header(&header);
        bytes.push(0);
        assert!(matches!(
            decode_node_header(&bytes),
            Err(Error::CorruptEncoding("trailing bytes in node header"))
        ));
    }
}
