use std::{collections::BTreeSet, fmt};

use indexmap::IndexMap;
use serde::{
    de::{self, SeqAccess, Visitor},
    Deserialize, Deserializer,
};

/// The serialized, index-based description of a schema.
///
/// ```json
/// {
///   "scalars": [0, 1],
///   "types": {
///     "Int": {},
///     "String": {},
///     "Query": { "Media": [3, { "id": [0], "ids": [0, "[Int]"] }] },
///     "Media": { "id": [0], "title": [1] }
///   }
/// }
/// ```
///
/// Integer references point at the position of a type among the keys of `types`,
/// so key order is significant and is preserved on deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompactSchema {
    #[serde(default)]
    pub scalars: BTreeSet<usize>,
    #[serde(default)]
    pub types: IndexMap<String, IndexMap<String, CompactField>>,
}

impl CompactSchema {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(untagged)]
pub enum TypeRef {
    Index(usize),
    /// A type that is not declared as a key, such as `"[Int]"`.
    Named(String),
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Index(index) => write!(f, "#{}", index),
            TypeRef::Named(name) => write!(f, "{}", name),
        }
    }
}

/// `[]`, `[typeRef]`, `[typeRef, argsMap]` or `[typeRef, "TypeString"]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompactField {
    /// `None` for `[]`. Such fields are dropped while linking.
    pub type_ref: Option<TypeRef>,
    pub args: IndexMap<String, CompactArgument>,
    pub type_string: Option<String>,
}

/// `[typeRef]` or `[typeRef, "ExplicitTypeString"]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompactArgument {
    pub type_ref: TypeRef,
    pub type_string: Option<String>,
}

impl CompactArgument {
    pub fn is_required(&self) -> bool {
        self.type_string
            .as_deref()
            .is_some_and(|type_string| type_string.ends_with('!'))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FieldExtra {
    Args(IndexMap<String, CompactArgument>),
    TypeString(String),
}

struct CompactFieldVisitor;

impl<'de> Visitor<'de> for CompactFieldVisitor {
    type Value = CompactField;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a field definition array of at most 2 elements")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let Some(type_ref) = seq.next_element::<TypeRef>()? else {
            return Ok(CompactField::default());
        };

        let mut field = CompactField {
            type_ref: Some(type_ref),
            ..Default::default()
        };

        match seq.next_element::<FieldExtra>()? {
            Some(FieldExtra::Args(args)) => field.args = args,
            Some(FieldExtra::TypeString(type_string)) => field.type_string = Some(type_string),
            None => return Ok(field),
        }

        if seq.next_element::<de::IgnoredAny>()?.is_some() {
            return Err(de::Error::invalid_length(3, &self));
        }

        Ok(field)
    }
}

impl<'de> Deserialize<'de> for CompactField {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(CompactFieldVisitor)
    }
}

struct CompactArgumentVisitor;

impl<'de> Visitor<'de> for CompactArgumentVisitor {
    type Value = CompactArgument;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an argument definition array of 1 or 2 elements")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let type_ref = seq
            .next_element::<TypeRef>()?
            .ok_or_else(|| de::Error::invalid_length(0, &self))?;
        let type_string = seq.next_element::<String>()?;

        if seq.next_element::<de::IgnoredAny>()?.is_some() {
            return Err(de::Error::invalid_length(3, &self));
        }

        Ok(CompactArgument {
            type_ref,
            type_string,
        })
    }
}

impl<'de> Deserialize<'de> for CompactArgument {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(CompactArgumentVisitor)
    }
}
