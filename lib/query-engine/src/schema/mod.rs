pub mod compact;
pub mod linker;

use std::{
    collections::HashMap,
    fmt::{self, Display},
};

use indexmap::IndexMap;

use crate::schema::compact::CompactSchema;

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Failed to parse compact schema: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
    pub(crate) fn new(index: usize) -> Self {
        TypeId(index as u32)
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
pub struct TypeNode {
    pub name: String,
    /// Fields selected by the `__scalar` shorthand.
    pub scalar_fields: Vec<String>,
    pub fields: IndexMap<String, FieldNode>,
    /// Referenced by name only, never declared in the compact table.
    pub is_stub: bool,
}

impl TypeNode {
    fn stub(name: String) -> Self {
        TypeNode {
            name,
            scalar_fields: Vec::new(),
            fields: IndexMap::new(),
            is_stub: true,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldNode> {
        self.fields.get(name)
    }

    /// Targets of the `on_<Type>` fields, in declaration order.
    pub fn fragment_targets(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.fields
            .iter()
            .filter(|(name, _)| name.starts_with(crate::FRAGMENT_PREFIX))
            .filter_map(|(_, field)| field.ty)
    }
}

#[derive(Debug, Clone)]
pub struct FieldNode {
    /// `None` when the compact table pointed at an index out of bounds.
    pub ty: Option<TypeId>,
    pub args: IndexMap<String, ArgumentNode>,
    pub type_string: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ArgumentNode {
    pub ty: TypeId,
    /// GraphQL type annotation used when declaring the variable, e.g. `[Int]` or `Int!`.
    pub type_string: String,
}

/// The linked schema graph. Built once, then shared read-only.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    types: Vec<TypeNode>,
    by_name: HashMap<String, TypeId>,
}

impl Schema {
    pub fn link(compact: &CompactSchema) -> Schema {
        linker::link(compact)
    }

    pub fn from_json(raw: &str) -> Result<Schema, SchemaError> {
        let compact = CompactSchema::from_json(raw)?;
        Ok(Schema::link(&compact))
    }

    pub fn get(&self, id: TypeId) -> &TypeNode {
        &self.types[id.index()]
    }

    pub fn type_id(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    pub fn type_by_name(&self, name: &str) -> Option<&TypeNode> {
        self.type_id(name).map(|id| self.get(id))
    }

    pub fn types(&self) -> impl Iterator<Item = (TypeId, &TypeNode)> {
        self.types
            .iter()
            .enumerate()
            .map(|(index, node)| (TypeId::new(index), node))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    fn type_name(&self, id: Option<TypeId>) -> &str {
        match id {
            Some(id) => &self.get(id).name,
            None => "<unresolved>",
        }
    }
}

impl Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (_, node) in self.types().filter(|(_, node)| !node.is_stub) {
            if node.fields.is_empty() {
                writeln!(f, "{}", node.name)?;
                continue;
            }

            writeln!(f, "{} {{", node.name)?;
            for (field_name, field) in &node.fields {
                write!(f, "  {}", field_name)?;
                if !field.args.is_empty() {
                    let args = field
                        .args
                        .iter()
                        .map(|(arg_name, arg)| format!("{}: {}", arg_name, arg.type_string))
                        .collect::<Vec<_>>()
                        .join(", ");
                    write!(f, "({})", args)?;
                }
                write!(f, ": {}", field.type_string.as_deref().unwrap_or(self.type_name(field.ty)))?;
                if node.scalar_fields.iter().any(|name| name == field_name) {
                    write!(f, " [scalar]")?;
                }
                writeln!(f)?;
            }
            writeln!(f, "}}")?;
        }

        Ok(())
    }
}
