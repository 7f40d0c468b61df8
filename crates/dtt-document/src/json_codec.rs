//! JSON tree documents.
//!
//! Every attribute is written as a `{ "vr": ..., "val": ... }` wrapper so the
//! representation survives a round trip without the dictionary. Decoding
//! accepts bare values too, falling back to the dictionary for the
//! representation.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use dtt_dictionary::Dictionary;
use dtt_model::{Dataset, Item, Tag, Value, Vr};
use serde_json::{Map, Number, Value as Json};

use crate::codec::TreeCodec;
use crate::error::{DocumentError, Result};
use crate::keys::{decode_key, encode_key, finish_decoded, resolve_vr};
use crate::numeric::json_number;
use crate::options::DocumentOptions;

/// Dataset to and from JSON objects.
#[derive(Debug, Clone, Copy)]
pub struct JsonCodec<'a> {
    dict: &'a Dictionary,
    options: DocumentOptions,
}

impl<'a> JsonCodec<'a> {
    pub fn new(dict: &'a Dictionary, options: DocumentOptions) -> Self {
        Self { dict, options }
    }

    /// Encode to pretty-printed JSON text.
    pub fn to_text(&self, dataset: &Dataset) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.encode(dataset)?)?)
    }

    /// Decode from JSON text.
    pub fn from_text(&self, text: &str) -> Result<Dataset> {
        let tree: Json = serde_json::from_str(text)?;
        self.decode(&tree)
    }

    fn encode_level(&self, dataset: &Dataset) -> Result<Map<String, Json>> {
        let mut object = Map::new();
        for item in dataset {
            if item.tag().is_group_length() {
                tracing::trace!(tag = %item.tag(), "Skipping group length");
                continue;
            }
            let key = encode_key(self.dict, dataset, item)?.key;
            // payload first so insertion order and sorted order agree
            let mut wrapper = Map::new();
            if let Value::BulkDataUri(uri) = item.value() {
                wrapper.insert("uri".to_string(), Json::from(uri.as_str()));
            } else if let Some(value) = self.encode_value(&key, item)? {
                wrapper.insert("val".to_string(), value);
            }
            wrapper.insert("vr".to_string(), Json::from(item.vr().code()));
            object.insert(key, Json::Object(wrapper));
        }
        Ok(object)
    }

    /// The `val` of an item, or `None` when it is omitted.
    fn encode_value(&self, key: &str, item: &Item) -> Result<Option<Json>> {
        let vr = item.vr();
        let value = match item.value() {
            Value::Empty | Value::BulkDataUri(_) => None,
            Value::Text(text) if vr.is_numeric_string() => self.numeric_strings(key, vr, text)?,
            Value::Text(text) => Some(Json::from(text.as_str())),
            Value::Tags(tags) => many(tags.iter().map(|tag| Json::from(tag.hex()))),
            Value::I16(v) => many(v.iter().map(|x| Json::from(*x))),
            Value::U16(v) => many(v.iter().map(|x| Json::from(*x))),
            Value::I32(v) => many(v.iter().map(|x| Json::from(*x))),
            Value::U32(v) => many(v.iter().map(|x| Json::from(*x))),
            Value::I64(v) => many(v.iter().map(|x| Json::from(*x))),
            Value::U64(v) => many(v.iter().map(|x| Json::from(*x))),
            Value::F32(v) => many(v.iter().map(|x| float(f64::from(*x)))),
            Value::F64(v) => many(v.iter().map(|x| float(*x))),
            Value::Bytes(bytes) if bytes.is_empty() => None,
            Value::Bytes(bytes) if self.options.embed_binary => Some(Json::from(STANDARD.encode(bytes))),
            Value::Bytes(bytes) => {
                tracing::debug!(key = %key, len = bytes.len(), "Omitting binary value");
                None
            }
            Value::Sequence(items) if items.is_empty() => None,
            Value::Sequence(items) => Some(Json::Array(
                items
                    .iter()
                    .map(|nested| self.encode_level(nested).map(Json::Object))
                    .collect::<Result<_>>()?,
            )),
        };
        Ok(value)
    }

    /// DS and IS text as numbers, with null for blank components.
    fn numeric_strings(&self, key: &str, vr: Vr, text: &str) -> Result<Option<Json>> {
        let numbers = text
            .split('\\')
            .map(|part| json_number(key, vr, part, self.options.json_mode))
            .collect::<Result<Vec<_>>>()?;
        let value = match numbers.as_slice() {
            [] | [None] => None,
            [Some(number)] => Some(Json::Number(number.clone())),
            _ => Some(Json::Array(
                numbers
                    .into_iter()
                    .map(|n| n.map_or(Json::Null, Json::Number))
                    .collect(),
            )),
        };
        Ok(value)
    }

    fn decode_level(&self, object: &Map<String, Json>) -> Result<Dataset> {
        let mut dataset = Dataset::new();
        for (key, node) in object {
            let tag = decode_key(self.dict, key)?;
            let item = match node {
                Json::Object(wrapper) if wrapper.contains_key("vr") => {
                    let code = wrapper["vr"]
                        .as_str()
                        .ok_or_else(|| DocumentError::shape(key, "a string vr"))?;
                    let vr = resolve_vr(self.dict, key, &tag, Some(code))?;
                    match (wrapper.get("uri"), wrapper.get("val")) {
                        (Some(uri), _) => {
                            let uri = uri
                                .as_str()
                                .ok_or_else(|| DocumentError::shape(key, "a string uri"))?;
                            Item::new(tag, vr, Value::BulkDataUri(uri.to_string()))?
                        }
                        (None, Some(value)) => Item::new(tag, vr, self.decode_value(key, vr, value)?)?,
                        (None, None) => Item::empty(tag, vr),
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

    fn decode_value(&self, key: &str, vr: Vr, node: &Json) -> Result<Value> {
        if node.is_null() {
            return Ok(Value::Empty);
        }
        let bad = |node: &Json| DocumentError::format(key, vr, node.to_string());

        if vr.is_numeric_string() {
            let parts = elements(node)
                .into_iter()
                .map(|n| match n {
                    Json::Number(number) => Ok(number.to_string()),
                    Json::String(text) => Ok(text.clone()),
                    Json::Null => Ok(String::new()),
                    other => Err(bad(other)),
                })
                .collect::<Result<Vec<_>>>()?;
            return Ok(Value::Text(parts.join("\\")));
        }
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
            Vr::SS => Value::I16(signed(node, |v| i16::try_from(v).ok()).map_err(bad)?),
            Vr::SL => Value::I32(signed(node, |v| i32::try_from(v).ok()).map_err(bad)?),
            Vr::SV => Value::I64(signed(node, Some).map_err(bad)?),
            Vr::US => Value::U16(unsigned(node, |v| u16::try_from(v).ok()).map_err(bad)?),
            Vr::UL => Value::U32(unsigned(node, |v| u32::try_from(v).ok()).map_err(bad)?),
            Vr::UV => Value::U64(unsigned(node, Some).map_err(bad)?),
            #[allow(clippy::cast_possible_truncation)]
            Vr::FL => Value::F32(floats(node).map_err(bad)?.into_iter().map(|v| v as f32).collect()),
            Vr::FD => Value::F64(floats(node).map_err(bad)?),
            Vr::SQ => match node {
                Json::Array(items) => Value::Sequence(
                    items
                        .iter()
                        .map(|item| match item {
                            Json::Object(nested) => self.decode_level(nested),
                            other => Err(bad(other)),
                        })
                        .collect::<Result<_>>()?,
                ),
                other => return Err(bad(other)),
            },
            _ => match node {
                Json::String(text) => Value::Bytes(STANDARD.decode(text).map_err(|_| bad(node))?),
                other => return Err(bad(other)),
            },
        };
        Ok(value)
    }
}

impl TreeCodec for JsonCodec<'_> {
    type Tree = Json;

    fn encode(&self, dataset: &Dataset) -> Result<Json> {
        self.encode_level(dataset).map(Json::Object)
    }

    fn decode(&self, tree: &Json) -> Result<Dataset> {
        let object = tree
            .as_object()
            .ok_or_else(|| DocumentError::shape("<root>", "an object"))?;
        let mut dataset = self.decode_level(object)?;
        finish_decoded(self.dict, &mut dataset)?;
        Ok(dataset)
    }
}

fn float(value: f64) -> Json {
    if value.is_nan() {
        Json::from("NaN")
    } else if value.is_infinite() {
        Json::from(if value > 0.0 { "Infinity" } else { "-Infinity" })
    } else {
        Number::from_f64(value).map_or(Json::Null, Json::Number)
    }
}

fn many(values: impl Iterator<Item = Json>) -> Option<Json> {
    let mut values: Vec<Json> = values.collect();
    match values.len() {
        0 => None,
        1 => values.pop(),
        _ => Some(Json::Array(values)),
    }
}

fn elements(node: &Json) -> Vec<&Json> {
    match node {
        Json::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}

fn signed<T>(node: &Json, convert: impl Fn(i64) -> Option<T>) -> std::result::Result<Vec<T>, &Json> {
    elements(node)
        .into_iter()
        .map(|n| n.as_i64().and_then(&convert).ok_or(n))
        .collect()
}

fn unsigned<T>(node: &Json, convert: impl Fn(u64) -> Option<T>) -> std::result::Result<Vec<T>, &Json> {
    elements(node)
        .into_iter()
        .map(|n| n.as_u64().and_then(&convert).ok_or(n))
        .collect()
}

fn floats(node: &Json) -> std::result::Result<Vec<f64>, &Json> {
    elements(node)
        .into_iter()
        .map(|n| match n {
            Json::Number(number) => number.as_f64().ok_or(n),
            Json::String(text) => match text.as_str() {
                "NaN" => Ok(f64::NAN),
                "Infinity" => Ok(f64::INFINITY),
                "-Infinity" => Ok(f64::NEG_INFINITY),
                _ => Err(n),
            },
            other => Err(other),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::JsonMode;
    use serde_json::json;

    fn codec() -> JsonCodec<'static> {
        JsonCodec::new(Dictionary::standard(), DocumentOptions::new())
    }

    fn text_item(group: u16, element: u16, vr: Vr, text: &str) -> Item {
        Item::text(Tag::new(group, element), vr, text).unwrap()
    }

    #[test]
    fn test_always_wrapped() {
        let dataset: Dataset = [text_item(0x0010, 0x0010, Vr::PN, "Doe^John")].into_iter().collect();
        assert_eq!(
            codec().encode(&dataset).unwrap(),
            json!({ "PatientName": { "vr": "PN", "val": "Doe^John" } })
        );
    }

    #[test]
    fn test_decimal_fixups_on_write() {
        let dataset: Dataset = [text_item(0x0018, 0x0050, Vr::DS, " 0000012.")].into_iter().collect();
        let text = codec().to_text(&dataset).unwrap();
        assert!(text.contains("\"val\": 12.0"), "{text}");
    }

    #[test]
    fn test_blank_numeric_omits_val() {
        let dataset: Dataset = [text_item(0x0018, 0x0050, Vr::DS, "  ")].into_iter().collect();
        assert_eq!(
            codec().encode(&dataset).unwrap(),
            json!({ "SliceThickness": { "vr": "DS" } })
        );
    }

    #[test]
    fn test_multi_valued_decimal_keeps_blanks() {
        let tag = Tag::new(0x0072, 0x0072);
        let dataset: Dataset = [Item::text(tag, Vr::DS, "1.5\\\\.25").unwrap()].into_iter().collect();
        let tree = codec().encode(&dataset).unwrap();
        assert_eq!(tree["SelectorDSValue"]["val"], json!([1.5, null, 0.25]));
        let back = codec().decode(&tree).unwrap();
        let text = back.get(&Tag::new(0x0072, 0x0072)).unwrap().value().clone();
        assert_eq!(text, Value::Text("1.5\\\\0.25".into()));
    }

    #[test]
    fn test_strict_integer_range() {
        let dataset: Dataset = [text_item(0x0072, 0x0064, Vr::IS, "3000000000")].into_iter().collect();
        assert!(codec().encode(&dataset).is_ok());
        let strict = JsonCodec::new(Dictionary::standard(), DocumentOptions::new().with_json_mode(JsonMode::Strict));
        assert!(matches!(strict.encode(&dataset), Err(DocumentError::Format { vr: Vr::IS, .. })));
    }

    #[test]
    fn test_non_finite_floats() {
        let tag = Tag::new(0x0018, 0x9087);
        let dataset: Dataset = [Item::new(tag.clone(), Vr::FD, Value::F64(vec![f64::INFINITY, 1.5])).unwrap()]
            .into_iter()
            .collect();
        let tree = codec().encode(&dataset).unwrap();
        assert_eq!(tree["DiffusionBValue"]["val"], json!(["Infinity", 1.5]));
        let back = codec().decode(&tree).unwrap();
        assert_eq!(back.get(&tag).unwrap().value(), &Value::F64(vec![f64::INFINITY, 1.5]));
    }

    #[test]
    fn test_bare_values_decode() {
        let tree = json!({ "PatientID": "12345", "Rows": 512 });
        let dataset = codec().decode(&tree).unwrap();
        assert_eq!(dataset.get(&Tag::new(0x0028, 0x0010)).unwrap().value(), &Value::U16(vec![512]));
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn test_root_must_be_object() {
        let err = codec().decode(&json!([1, 2])).unwrap_err();
        assert!(matches!(err, DocumentError::Shape { .. }));
    }
}
