//! Deterministic fingerprints of property trees.

use crate::{
    predicate::{ComparePredicate, Predicate},
    property::PropertyType,
    value::Value,
};
use sha2::{Digest, Sha256};

///
/// ProjectionFingerprint
///
/// Stable identity of `(root type, property tree)`. Two requests selecting
/// the same members with the same filters share a fingerprint.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ProjectionFingerprint([u8; 32]);

impl ProjectionFingerprint {
    #[must_use]
    pub fn of(root: &str, properties: &[PropertyType]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"projfp:v1");
        write_str(&mut hasher, root);
        hash_properties(&mut hasher, properties);

        let digest = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        Self(out)
    }

    #[must_use]
    pub fn as_hex(&self) -> String {
        let mut out = String::with_capacity(64);
        for byte in self.0 {
            use std::fmt::Write as _;
            let _ = write!(out, "{byte:02x}");
        }
        out
    }
}

impl std::fmt::Display for ProjectionFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_hex())
    }
}

fn hash_properties(hasher: &mut Sha256, properties: &[PropertyType]) {
    write_len(hasher, properties.len());
    for property in properties {
        match property {
            PropertyType::Scalar { member } => {
                write_tag(hasher, 0x01);
                write_str(hasher, member);
            }
            PropertyType::List {
                member,
                element_type,
                properties,
                filter,
            } => {
                write_tag(hasher, 0x02);
                write_str(hasher, member);
                write_str(hasher, element_type);
                match filter {
                    Some(filter) => {
                        write_tag(hasher, 0x01);
                        hash_predicate(hasher, filter);
                    }
                    None => write_tag(hasher, 0x00),
                }
                hash_properties(hasher, properties);
            }
        }
    }
}

fn hash_predicate(hasher: &mut Sha256, predicate: &Predicate) {
    match predicate {
        Predicate::True => write_tag(hasher, 0x21),
        Predicate::False => write_tag(hasher, 0x22),
        Predicate::And(children) => {
            write_tag(hasher, 0x23);
            write_len(hasher, children.len());
            for child in children {
                hash_predicate(hasher, child);
            }
        }
        Predicate::Or(children) => {
            write_tag(hasher, 0x24);
            write_len(hasher, children.len());
            for child in children {
                hash_predicate(hasher, child);
            }
        }
        Predicate::Not(inner) => {
            write_tag(hasher, 0x25);
            hash_predicate(hasher, inner);
        }
        Predicate::Compare(ComparePredicate { field, op, value }) => {
            write_tag(hasher, 0x26);
            write_str(hasher, field);
            write_tag(hasher, op.tag());
            write_value(hasher, value);
        }
        Predicate::IsNull { field } => {
            write_tag(hasher, 0x27);
            write_str(hasher, field);
        }
    }
}

fn write_value(hasher: &mut Sha256, value: &Value) {
    match value {
        Value::Null => write_tag(hasher, 0x40),
        Value::Bool(b) => {
            write_tag(hasher, 0x41);
            write_tag(hasher, u8::from(*b));
        }
        Value::Int(v) => {
            write_tag(hasher, 0x42);
            hasher.update(v.to_be_bytes());
        }
        Value::Uint(v) => {
            write_tag(hasher, 0x43);
            hasher.update(v.to_be_bytes());
        }
        Value::Float64(v) => {
            write_tag(hasher, 0x44);
            hasher.update(v.to_bits().to_be_bytes());
        }
        Value::Text(s) => {
            write_tag(hasher, 0x45);
            write_str(hasher, s);
        }
        Value::Enum(s) => {
            write_tag(hasher, 0x46);
            write_str(hasher, s);
        }
        Value::List(items) => {
            write_tag(hasher, 0x47);
            write_len(hasher, items.len());
            for item in items {
                write_value(hasher, item);
            }
        }
        Value::Object(record) => {
            write_tag(hasher, 0x48);
            write_len(hasher, record.len());
            for (member, item) in record {
                write_str(hasher, member);
                write_value(hasher, item);
            }
        }
    }
}

fn write_str(hasher: &mut Sha256, value: &str) {
    write_len(hasher, value.len());
    hasher.update(value.as_bytes());
}

// Lengths past u32::MAX saturate; no tree or literal gets near that.
fn write_len(hasher: &mut Sha256, len: usize) {
    let len = u32::try_from(len).unwrap_or(u32::MAX);
    hasher.update(len.to_be_bytes());
}

fn write_tag(hasher: &mut Sha256, tag: u8) {
    hasher.update([tag]);
}
