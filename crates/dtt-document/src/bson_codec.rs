//! BSON tree documents.

use bson::spec::BinarySubtype;
use bson::{Binary, Bson, Document, doc};
use dtt_dictionary::Dictionary;
use dtt_model::{Dataset, Item, Tag, Value, Vr};

use crate::codec::TreeCodec;
use crate::error::{DocumentError, Result};
use crate::keys::{decode_key, encode_key, finish_decoded, resolve_vr};
use crate::options::DocumentOptions;

/// Dataset to and from BSON documents.
///
/// Only private and ambiguous tags carry a `{vr, val}` wrapper; every other
/// value is stored bare under its keyword.
#[derive(Debug, Clone, Copy)]
pub struct BsonCodec<'a> {
    dict: &'a Dictionary,
    options: DocumentOptions,
}

impl<'a> BsonCodec<'a> {
    pub fn new(dict: &'a Dictionary, options: DocumentOptions) -> Self {
        Self { dict, options }
    }

    /// Encode straight to BSON bytes.
    pub fn to_bytes(&self, dataset: &Dataset) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.encode(dataset)?.to_writer(&mut bytes)?;
        Ok(bytes)
    }

    /// Decode from BSON bytes.
    pub fn from_bytes(&self, bytes: &[u8]) -> Result<Dataset> {
        let mut reader = bytes;
        let document = Document::from_reader(&mut reader)?;
        self.decode(&document)
    }

    fn encode_level(&self, dataset: &Dataset) -> Result<Document> {
        let mut document = Document::new();
        for item in dataset {
            if item.tag().is_group_length() {
                tracing::trace!(tag = %item.tag(), "Skipping group length");
                continue;
            }
            let key = encode_key(self.dict, dataset, item)?;
            let code = item.vr().code();
            let node = match item.value() {
                Value::BulkDataUri(uri) => Bson::Document(doc! { "vr": code, "uri": uri.as_str() }),
                _ => {
                    let value = self.encode_value(&key.key, item)?;
                    if key.wrap {
                        Bson::Document(doc! { "vr": code, "val": value })
                    } else {
                        value
                    }
                }
            };
            document.insert(key.key, node);
        }
        Ok(document)
    }

    fn encode_value(&self, key: &str, item: &Item) -> Result<Bson> {
        let value = match item.value() {
            Value::Empty | Value::BulkDataUri(_) => Bson::Null,
            Value::Text(text) => Bson::String(text.clone()),
            Value::Tags(tags) => many(tags.iter().map(|tag| Bson::String(tag.hex()))),
            Value::I16(v) => many(v.iter().map(|x| Bson::Int32(i32::from(*x)))),
            Value::U16(v) => many(v.iter().map(|x| Bson::Int32(i32::from(*x)))),
            Value::I32(v) => many(v.iter().map(|x| Bson::Int32(*x))),
            Value::U32(v) => many(v.iter().map(|x| Bson::Int64(i64::from(*x)))),
            Value::I64(v) => many(v.iter().map(|x| Bson::Int64(*x))),
            // stored as the same 64 bits
            Value::U64(v) => many(v.iter().map(|x| Bson::Int64(*x as i64))),
            Value::F32(v) => many(v.iter().map(|x| Bson::Double(f64::from(*x)))),
            Value::F64(v) => many(v.iter().map(|x| Bson::Double(*x))),
            Value::Bytes(bytes) if bytes.is_empty() => Bson::Null,
            Value::Bytes(bytes) if self.options.embed_binary => Bson::Binary(Binary {
                subtype: BinarySubtype::Generic,
                bytes: bytes.clone(),
            }),
            Value::Bytes(bytes) => {
                tracing::debug!(key = %key, len = bytes.len(), "Omitting binary value");
                Bson::Null
            }
            Value::Sequence(items) if items.is_empty() => Bson::Null,
            Value::Sequence(items) => Bson::Array(
                items
                    .iter()
                    .map(|nested| self.encode_level(nested).map(Bson::Document))
                    .collect::<Result<_>>()?,
            ),
        };
        Ok(value)
    }

    fn decode_level(&self, document: &Document) -> Result<Dataset> {
        let mut dataset = Dataset::new();
        for (key, node) in document {
            let tag = decode_key(self.dict, key)?;
            let item = match node {
                Bson::Document(wrapper) if wrapper.contains_key("vr") => {
                    let code = wrapper
                        .get_str("vr")
                        .map_err(|_| DocumentError::shape(key, "a string vr"))?;
                    let vr = resolve_vr(self.dict, key, &tag, Some(code))?;
                    if let Some(uri) = wrapper.get("uri") {
                        let uri = uri
                            .as_str()
                            .ok_or_else(|| DocumentError::shape(key, "a string uri"))?;
                        Item::new(tag, vr, Value::BulkDataUri(uri.to_string()))?
                    } else {
                        let value = wrapper.get("val").unwrap_or(&Bson::Null);
                        Item::new(tag, vr, self.decode_value(key, vr, value)?)?
                    }
                }
                bare => {
                    let vr = resolve_vr(self.dict, key, &tag, None)?;
                    Item::new(tag, vr, self.decode_value(key, vr, bare)?)?
                }
            };
            dataset.insert(item);
        }
        Ok(dataset)
    }

    fn decode_value(&self, key: &str, vr: Vr, node: &Bson) -> Result<Value> {
        if matches!(node, Bson::Null) {
            return Ok(Value::Empty);
        }
        let bad = |node: &Bson| DocumentError::format(key, vr, node.to_string());

        if vr.is_string() {
            let parts = elements(node)
                .into_iter()
                .map(|n| n.as_str().ok_or_else(|| bad(n)))
                .collect::<Result<Vec<_>>>()?;
            return Ok(Value::Text(parts.join("\\")));
        }

        let value = match vr {
            Vr::AT => Value::Tags(
                elements(node)
                    .into_iter()
                    .map(|n| n.as_str().and_then(|s| s.parse::<Tag>().ok()).ok_or_else(|| bad(n)))
                    .collect::<Result<_>>()?,
            ),
            Vr::SS => Value::I16(integers(node, |v| i16::try_from(v).ok()).map_err(bad)?),
            Vr::US => Value::U16(integers(node, |v| u16::try_from(v).ok()).map_err(bad)?),
            Vr::SL => Value::I32(integers(node, |v| i32::try_from(v).ok()).map_err(bad)?),
            Vr::UL => Value::U32(integers(node, |v| u32::try_from(v).ok()).map_err(bad)?),
            Vr::SV => Value::I64(integers(node, Some).map_err(bad)?),
            Vr::UV => Value::U64(integers(node, |v| Some(v as u64)).map_err(bad)?),
            #[allow(clippy::cast_possible_truncation)]
            Vr::FL => Value::F32(
                doubles(node)
                    .map_err(bad)?
                    .into_iter()
                    .map(|v| v as f32)
                    .collect(),
            ),
            Vr::FD => Value::F64(doubles(node).map_err(bad)?),
            Vr::SQ => match node {
                Bson::Array(items) => Value::Sequence(
                    items
                        .iter()
                        .map(|item| match item {
                            Bson::Document(nested) => self.decode_level(nested),
                            other => Err(bad(other)),
                        })
                        .collect::<Result<_>>()?,
                ),
                other => return Err(bad(other)),
            },
            // binary representations
            _ => match node {
                Bson::Binary(binary) => Value::Bytes(binary.bytes.clone()),
                other => return Err(bad(other)),
            },
        };
        Ok(value)
    }
}

impl TreeCodec for BsonCodec<'_> {
    type Tree = Document;

    fn encode(&self, dataset: &Dataset) -> Result<Document> {
        self.encode_level(dataset)
    }

    fn decode(&self, tree: &Document) -> Result<Dataset> {
        let mut dataset = self.decode_level(tree)?;
        finish_decoded(self.dict, &mut dataset)?;
        Ok(dataset)
    }
}

/// Null for no values, the value itself for one, an array for more.
fn many(values: impl Iterator<Item = Bson>) -> Bson {
    let mut values: Vec<Bson> = values.collect();
    match values.len() {
        0 => Bson::Null,
        1 => values.pop().unwrap_or(Bson::Null),
        _ => Bson::Array(values),
    }
}

fn elements(node: &Bson) -> Vec<&Bson> {
    match node {
        Bson::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}

/// Integer elements converted with `convert`; the first failing node is
/// returned as the error.
fn integers<T>(node: &Bson, convert: impl Fn(i64) -> Option<T>) -> std::result::Result<Vec<T>, &Bson> {
    elements(node)
        .into_iter()
        .map(|n| {
            let value = match n {
                Bson::Int32(v) => Some(i64::from(*v)),
                Bson::Int64(v) => Some(*v),
                _ => None,
            };
            value.and_then(&convert).ok_or(n)
        })
        .collect()
}

fn doubles(node: &Bson) -> std::result::Result<Vec<f64>, &Bson> {
    elements(node)
        .into_iter()
        .map(|n| match n {
            Bson::Double(v) => Ok(*v),
            #[allow(clippy::cast_precision_loss)]
            Bson::Int64(v) => Ok(*v as f64),
            Bson::Int32(v) => Ok(f64::from(*v)),
            other => Err(other),
        })
        .collect()
}
