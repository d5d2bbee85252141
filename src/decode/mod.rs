//! Generic decoding of the raw shared-memory structure into JSON values.
//!
//! The decoder is a total walk over the five [`RawNode`] shapes:
//!
//! | Raw shape | Decoded as |
//! |-----------|------------|
//! | array     | JSON array, element-wise |
//! | pointer   | `null`, or the decoded target |
//! | scalar    | bool / integer / float (non-finite floats become `null`) |
//! | bytes     | text via [`recover_text`] |
//! | record    | JSON object |
//!
//! Records skip fields starting with [`PRIVATE_PREFIX`] and merge the decoded
//! children of anonymous members straight into the parent object, depth-first,
//! so nested anonymous members leave no trace of their own names.

pub mod text;

use serde_json::{Map, Value};
use tracing::trace;

use crate::types::{RawNode, RawRecord, Scalar};

pub use text::recover_text;

/// Field name prefix marking padding and private members of the layout.
pub const PRIVATE_PREFIX: char = '_';

/// Decode a raw node into a JSON-compatible value.
pub fn decode(node: &RawNode) -> Value {
    match node {
        RawNode::Array(items) => Value::Array(items.iter().map(decode).collect()),
        RawNode::Pointer(target) => target.as_deref().map_or(Value::Null, decode),
        RawNode::Scalar(scalar) => decode_scalar(*scalar),
        RawNode::Bytes(bytes) => Value::String(recover_text(bytes)),
        RawNode::Record(record) => Value::Object(decode_record(record)),
    }
}

fn decode_scalar(scalar: Scalar) -> Value {
    match scalar {
        Scalar::Bool(value) => Value::Bool(value),
        Scalar::Int(value) => Value::from(value),
        Scalar::Float(value) => Value::from(value),
    }
}

fn decode_record(record: &RawRecord) -> Map<String, Value> {
    let mut object = Map::with_capacity(record.fields.len());

    for (name, node) in &record.fields {
        if name.starts_with(PRIVATE_PREFIX) {
            continue;
        }

        let value = decode(node);
        if record.is_anonymous(name) {
            match value {
                Value::Object(children) => object.extend(children),
                other => {
                    trace!(field = %name, "Anonymous member is not a record, keeping it by name");
                    object.insert(name.clone(), other);
                }
            }
        } else {
            object.insert(name.clone(), value);
        }
    }

    object
}
