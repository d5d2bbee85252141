//! Untyped mirror of the simulator's shared-memory layout

use serde::{Deserialize, Serialize};

/// A primitive value read out of the shared-memory layout.
///
/// Non-finite floats are written as `"NaN"`, `"inf"` or `"-inf"` so that
/// recordings keep them; a `null` scalar reads back as NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ScalarRepr", into = "ScalarRepr")]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
}

/// Wire form of [`Scalar`].
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ScalarRepr {
    Bool(bool),
    Int(i64),
    Float(f64),
    NonFinite(String),
    Null(()),
}

impl From<Scalar> for ScalarRepr {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Bool(value) => ScalarRepr::Bool(value),
            Scalar::Int(value) => ScalarRepr::Int(value),
            Scalar::Float(value) if value.is_nan() => ScalarRepr::NonFinite("NaN".into()),
            Scalar::Float(value) if value.is_infinite() => {
                ScalarRepr::NonFinite(if value > 0.0 { "inf" } else { "-inf" }.into())
            }
            Scalar::Float(value) => ScalarRepr::Float(value),
        }
    }
}

impl TryFrom<ScalarRepr> for Scalar {
    type Error = String;

    fn try_from(repr: ScalarRepr) -> Result<Self, Self::Error> {
        match repr {
            ScalarRepr::Bool(value) => Ok(Scalar::Bool(value)),
            ScalarRepr::Int(value) => Ok(Scalar::Int(value)),
            ScalarRepr::Float(value) => Ok(Scalar::Float(value)),
            ScalarRepr::Null(()) => Ok(Scalar::Float(f64::NAN)),
            ScalarRepr::NonFinite(text) => match text.as_str() {
                "NaN" => Ok(Scalar::Float(f64::NAN)),
                "inf" => Ok(Scalar::Float(f64::INFINITY)),
                "-inf" => Ok(Scalar::Float(f64::NEG_INFINITY)),
                other => Err(format!("invalid scalar '{other}'")),
            },
        }
    }
}

/// One node of the structure handed over by the shared-memory reader.
///
/// The closed set of shapes mirrors what a C layout can contain: primitives,
/// fixed-size arrays, pointers, `char[N]` buffers and structs or unions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RawNode {
    Scalar(Scalar),
    Array(Vec<RawNode>),
    /// `None` is a null pointer.
    Pointer(Option<Box<RawNode>>),
    Bytes(Vec<u8>),
    Record(RawRecord),
}

/// A struct or union with its declared field order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub fields: Vec<(String, RawNode)>,
    /// Fields whose children are flattened into this record.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub anonymous: Vec<String>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a named field.
    pub fn with(mut self, name: impl Into<String>, node: RawNode) -> Self {
        self.fields.push((name.into(), node));
        self
    }

    /// Appends a field whose children belong to this record's namespace.
    pub fn with_anonymous(mut self, name: impl Into<String>, node: RawNode) -> Self {
        let name = name.into();
        self.anonymous.push(name.clone());
        self.fields.push((name, node));
        self
    }

    pub fn is_anonymous(&self, name: &str) -> bool {
        self.anonymous.iter().any(|anon| anon == name)
    }

    /// Looks a field up by name, searching through anonymous members.
    pub fn field(&self, name: &str) -> Option<&RawNode> {
        self.fields.iter().find_map(|(field, node)| {
            if field == name {
                return Some(node);
            }
            if self.is_anonymous(field) {
                if let RawNode::Record(inner) = node {
                    return inner.field(name);
                }
            }
            None
        })
    }
}

impl RawNode {
    pub fn int(value: i64) -> Self {
        RawNode::Scalar(Scalar::Int(value))
    }

    pub fn float(value: f64) -> Self {
        RawNode::Scalar(Scalar::Float(value))
    }

    pub fn bool(value: bool) -> Self {
        RawNode::Scalar(Scalar::Bool(value))
    }

    /// A zero-padded `char[len]` buffer holding `text`.
    pub fn text(text: &str, len: usize) -> Self {
        let mut bytes = text.as_bytes().to_vec();
        bytes.resize(len.max(bytes.len()), 0);
        RawNode::Bytes(bytes)
    }

    /// Looks up a field when this node is a record.
    pub fn field(&self, name: &str) -> Option<&RawNode> {
        match self {
            RawNode::Record(record) => record.field(name),
            _ => None,
        }
    }

    /// Reads an unsigned 32-bit counter such as `mVersionUpdateBegin`.
    pub fn counter(&self, name: &str) -> Option<u32> {
        match self.field(name)? {
            RawNode::Scalar(Scalar::Int(value)) => u32::try_from(*value).ok(),
            _ => None,
        }
    }
}

impl From<RawRecord> for RawNode {
    fn from(record: RawRecord) -> Self {
        RawNode::Record(record)
    }
}
