//! Field schema and typed field values
//!
//! Every entity declares its fields once as a static slice of [`FieldDef`].
//! The same schema drives equality, hashing, difference reporting and link
//! resolution, with values read back by index as [`FieldValue`]s.

use chrono::{Datelike, NaiveDate};
use std::fmt;

/// Multiplier of the rolling hash over equality fields
pub const HASH_PRIME: i32 = 19;

/// The kind of data held by a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Text,
    Flag,
    Money,
    Date,
    Bytes,
    /// Reference to an item of the named item type
    Link(&'static str),
}

/// Declaration of one field of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Whether the field participates in item equality and hashing
    pub equality: bool,
}

impl FieldDef {
    /// A field that participates in equality
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            equality: true,
        }
    }

    /// A field ignored by equality and hashing
    pub const fn ignored(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            equality: false,
        }
    }

    /// The target item type if this is a link field
    pub fn link_target(&self) -> Option<&'static str> {
        match self.kind {
            FieldKind::Link(target) => Some(target),
            _ => None,
        }
    }
}

/// Index of a named field within a schema
pub fn field_index(fields: &[FieldDef], name: &str) -> Option<usize> {
    fields.iter().position(|f| f.name == name)
}

/// A single field value read from an entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    None,
    Integer(i64),
    Text(String),
    Flag(bool),
    /// Amount in cents
    Money(i64),
    Date(NaiveDate),
    Bytes(Vec<u8>),
    /// Id of the linked item
    Link(u32),
}

impl FieldValue {
    /// Build a link value, treating id 0 as no link
    pub fn link(id: u32) -> Self {
        if id == 0 {
            Self::None
        } else {
            Self::Link(id)
        }
    }

    /// Build a text value, treating `None` as no value
    pub fn text(value: Option<&str>) -> Self {
        value.map_or(Self::None, |s| Self::Text(s.to_string()))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// The linked id if this is a link value
    pub fn as_link(&self) -> Option<u32> {
        match self {
            Self::Link(id) => Some(*id),
            _ => None,
        }
    }

    /// Deterministic 32-bit hash of the value
    pub fn field_hash(&self) -> i32 {
        match self {
            Self::None => 0,
            Self::Integer(v) | Self::Money(v) => fold_i64(*v),
            Self::Text(s) => bytes_hash(s.as_bytes()),
            Self::Flag(b) => i32::from(*b),
            Self::Date(d) => d.num_days_from_ce(),
            Self::Bytes(b) => bytes_hash(b),
            Self::Link(id) => *id as i32,
        }
    }
}

fn fold_i64(v: i64) -> i32 {
    (v ^ (v >> 32)) as i32
}

fn bytes_hash(bytes: &[u8]) -> i32 {
    bytes
        .iter()
        .fold(0i32, |acc, b| acc.wrapping_mul(31).wrapping_add(i32::from(*b)))
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "null"),
            Self::Integer(v) => write!(f, "{}", v),
            Self::Text(s) => write!(f, "\"{}\"", s),
            Self::Flag(b) => write!(f, "{}", b),
            Self::Money(cents) => {
                let sign = if *cents < 0 { "-" } else { "" };
                write!(f, "{}{}.{:02}", sign, (cents / 100).abs(), (cents % 100).abs())
            }
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Bytes(b) => write!(f, "[{} bytes]", b.len()),
            Self::Link(id) => write!(f, "#{}", id),
        }
    }
}
