use std::collections::HashMap;

use indexmap::IndexMap;
use tracing::{debug, instrument, warn};

use crate::schema::{
    compact::{CompactArgument, CompactField, CompactSchema, TypeRef},
    ArgumentNode, FieldNode, Schema, TypeId, TypeNode,
};

/// Expands a compact schema table into a linked graph.
///
/// Every type identity is declared before any field is filled in, so forward and
/// cyclic references resolve with a flat pass and no recursion. Types that are only
/// referenced by a literal name (e.g. `"[Int]"`) become stub nodes.
///
/// An integer reference outside the table does not fail linking: the field keeps an
/// unresolved type and the failure surfaces once a request walks through it.
#[instrument(level = "debug", skip_all, fields(declared_types = compact.types.len()))]
pub fn link(compact: &CompactSchema) -> Schema {
    let index_to_name: Vec<&str> = compact.types.keys().map(String::as_str).collect();
    let mut linker = Linker {
        index_to_name,
        types: Vec::with_capacity(compact.types.len()),
        by_name: HashMap::with_capacity(compact.types.len()),
    };

    for name in compact.types.keys() {
        linker.declare(name, false);
    }

    for fields in compact.types.values() {
        for field in fields.values() {
            if let Some(TypeRef::Named(name)) = &field.type_ref {
                linker.declare(name, true);
            }
            for arg in field.args.values() {
                let name = linker.argument_type_name(arg);
                linker.declare(&name, true);
            }
        }
    }

    for (index, (type_name, fields)) in compact.types.iter().enumerate() {
        let scalar_fields = fields
            .iter()
            .filter(|(_, field)| is_scalar_field(compact, field))
            .map(|(name, _)| name.clone())
            .collect();

        let linked_fields = fields
            .iter()
            .filter_map(|(field_name, field)| {
                let type_ref = field.type_ref.as_ref()?;
                let ty = linker.resolve(type_ref);
                if ty.is_none() {
                    warn!(
                        "Field \"{}.{}\" references unknown type {}",
                        type_name, field_name, type_ref
                    );
                }

                Some((field_name.clone(), linker.link_field(field, ty)))
            })
            .collect();

        let node = &mut linker.types[index];
        node.scalar_fields = scalar_fields;
        node.fields = linked_fields;
    }

    let stubs = linker.types.iter().filter(|node| node.is_stub).count();
    debug!(total_types = linker.types.len(), stubs, "schema linked");

    Schema {
        types: linker.types,
        by_name: linker.by_name,
    }
}

/// A field is eligible for the `__scalar` shorthand when it returns a declared scalar
/// and takes no required arguments, since the shorthand supplies no argument values.
fn is_scalar_field(compact: &CompactSchema, field: &CompactField) -> bool {
    match &field.type_ref {
        Some(TypeRef::Index(index)) => {
            compact.scalars.contains(index) && !field.args.values().any(CompactArgument::is_required)
        }
        _ => false,
    }
}

struct Linker<'a> {
    index_to_name: Vec<&'a str>,
    types: Vec<TypeNode>,
    by_name: HashMap<String, TypeId>,
}

impl Linker<'_> {
    fn declare(&mut self, name: &str, stub: bool) -> TypeId {
        if let Some(id) = self.by_name.get(name) {
            return *id;
        }

        let id = TypeId::new(self.types.len());
        let mut node = TypeNode::stub(name.to_string());
        node.is_stub = stub;
        self.types.push(node);
        self.by_name.insert(name.to_string(), id);
        id
    }

    fn name_of<'r>(&'r self, type_ref: &'r TypeRef) -> Option<&'r str> {
        match type_ref {
            TypeRef::Index(index) => self.index_to_name.get(*index).copied(),
            TypeRef::Named(name) => Some(name),
        }
    }

    fn resolve(&self, type_ref: &TypeRef) -> Option<TypeId> {
        self.name_of(type_ref)
            .and_then(|name| self.by_name.get(name).copied())
    }

    fn argument_type_name(&self, arg: &CompactArgument) -> String {
        match (self.name_of(&arg.type_ref), &arg.type_ref) {
            (Some(name), _) => name.to_string(),
            (None, TypeRef::Index(index)) => arg
                .type_string
                .clone()
                .unwrap_or_else(|| format!("?{}", index)),
            (None, TypeRef::Named(name)) => name.clone(),
        }
    }

    fn link_field(&self, field: &CompactField, ty: Option<TypeId>) -> FieldNode {
        let args: IndexMap<String, ArgumentNode> = field
            .args
            .iter()
            .map(|(arg_name, arg)| {
                let resolved_name = self.argument_type_name(arg);
                // declared in the first pass, so the lookup cannot miss
                let ty = self.by_name[&resolved_name];
                let type_string = arg.type_string.clone().unwrap_or(resolved_name);

                (arg_name.clone(), ArgumentNode { ty, type_string })
            })
            .collect();

        FieldNode {
            ty,
            args,
            type_string: field.type_string.clone(),
        }
    }
}
