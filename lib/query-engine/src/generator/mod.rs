pub mod context;
pub mod error;

use std::{collections::HashSet, fmt};

use tracing::{instrument, trace};

use crate::{
    generator::{
        context::{OperationContext, VariableTyping},
        error::GenerateError,
    },
    graphql::GraphQLRequest,
    request::{RequestNode, Selection, FRAGMENT_PREFIX},
    schema::{FieldNode, Schema, TypeId},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Query => "query",
            OperationKind::Mutation => "mutation",
        }
    }

    pub fn default_root_type(&self) -> &'static str {
        match self {
            OperationKind::Query => "Query",
            OperationKind::Mutation => "Mutation",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds GraphQL operation text from request trees, validating every field and
/// argument against a linked [`Schema`].
pub struct QueryGenerator<'s> {
    schema: &'s Schema,
}

impl<'s> QueryGenerator<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        QueryGenerator { schema }
    }

    pub fn generate_query(&self, request: &RequestNode) -> Result<GraphQLRequest, GenerateError> {
        let kind = OperationKind::Query;
        self.generate(kind, kind.default_root_type(), request)
    }

    pub fn generate_mutation(
        &self,
        request: &RequestNode,
    ) -> Result<GraphQLRequest, GenerateError> {
        let kind = OperationKind::Mutation;
        self.generate(kind, kind.default_root_type(), request)
    }

    /// Generates `<kind>[ <name>][(<declarations>)]{...}` followed by every fragment the
    /// request needed, all joined with `,`.
    #[instrument(level = "trace", skip_all, fields(kind = %kind, root_type = %root_type))]
    pub fn generate(
        &self,
        kind: OperationKind,
        root_type: &str,
        request: &RequestNode,
    ) -> Result<GraphQLRequest, GenerateError> {
        let root = self
            .schema
            .type_id(root_type)
            .ok_or_else(|| GenerateError::MissingRootType(root_type.to_string()))?;
        let RequestNode::Selection(selection) = request else {
            return Err(GenerateError::RootMustBeSelection);
        };
        if selection.has_arguments() {
            return Err(GenerateError::ArgumentsWithoutField {
                path: display_path(&[]),
            });
        }

        let mut walker = Walker {
            schema: self.schema,
            root,
            context: OperationContext::default(),
        };
        let body = walker.select(&mut Vec::new(), selection)?;

        let mut head = kind.as_str().to_string();
        let operation_name = selection.name.clone().filter(|name| !name.is_empty());
        if let Some(name) = &operation_name {
            head.push(' ');
            head.push_str(name);
        }
        if !walker.context.variables().is_empty() {
            head.push('(');
            head.push_str(&walker.context.variable_declarations());
            head.push(')');
        }
        head.push_str(&body);

        let (variables, fragments) = walker.context.into_parts();
        let query = std::iter::once(head)
            .chain(fragments)
            .collect::<Vec<_>>()
            .join(",");
        trace!(query = %query, "operation generated");

        Ok(GraphQLRequest {
            query,
            variables,
            operation_name,
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum Segment<'r> {
    Field(&'r str),
    Fragment(&'r str),
}

impl fmt::Display for Segment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Field(name) => f.write_str(name),
            Segment::Fragment(type_name) => write!(f, "{}{}", FRAGMENT_PREFIX, type_name),
        }
    }
}

fn display_path(path: &[Segment]) -> String {
    if path.is_empty() {
        return "<root>".to_string();
    }

    path.iter()
        .map(|segment| segment.to_string())
        .collect::<Vec<_>>()
        .join(".")
}

struct Walker<'s> {
    schema: &'s Schema,
    root: TypeId,
    context: OperationContext,
}

impl<'s> Walker<'s> {
    /// Expands the sub-selection of the field (or fragment) at `path`, including its
    /// argument list.
    fn expand<'r>(
        &mut self,
        path: &mut Vec<Segment<'r>>,
        selection: &'r Selection,
    ) -> Result<String, GenerateError> {
        let args = match &selection.args {
            Some(args) if !args.is_empty() => args,
            _ => return self.select(path, selection),
        };

        let field = self.field_at(path)?;
        let mut rendered = Vec::with_capacity(args.len());
        for (arg_name, value) in args {
            let argument =
                field
                    .args
                    .get(arg_name)
                    .ok_or_else(|| GenerateError::UnknownArgument {
                        argument: arg_name.clone(),
                        field: path.last().map(|s| s.to_string()).unwrap_or_default(),
                        path: display_path(path),
                    })?;
            let variable = self.context.add_variable(
                value.clone(),
                VariableTyping {
                    ty: argument.ty,
                    type_string: argument.type_string.clone(),
                },
            );
            rendered.push(format!("{}:${}", arg_name, variable));
        }

        let sub_selection = if selection.is_arguments_only() {
            String::new()
        } else {
            self.select(path, selection)?
        };

        Ok(format!("({}){}", rendered.join(","), sub_selection))
    }

    /// Renders `{...}` for the type at `path`. Fails when nothing ends up selected.
    fn select<'r>(
        &mut self,
        path: &mut Vec<Segment<'r>>,
        selection: &'r Selection,
    ) -> Result<String, GenerateError> {
        let current = self.type_at(path)?;
        let mut items: Vec<String> = Vec::new();

        if selection.scalar {
            let excluded: HashSet<&str> = selection
                .fields
                .iter()
                .filter(|(_, node)| !node.is_selected())
                .map(|(name, _)| name.as_str())
                .collect();
            let schema = self.schema;
            let node = schema.get(current);
            let scalars = node
                .scalar_fields
                .iter()
                .filter(|name| !excluded.contains(name.as_str()))
                .map(String::as_str)
                .collect::<Vec<_>>();

            if !scalars.is_empty() {
                let name = self.context.next_fragment_name();
                let body = format!("{{{}}}", scalars.join(","));
                self.context.push_fragment(&name, &node.name, &body);
                items.push(format!("...{}", name));
            }
        }

        for (key, child) in &selection.fields {
            match child {
                RequestNode::Leaf(false) => {}
                RequestNode::Leaf(true) => {
                    self.find_field(current, key, path)?;
                    items.push(key.clone());
                }
                RequestNode::Selection(sub) => {
                    path.push(Segment::Field(key));
                    let rendered = self.expand(path, sub);
                    path.pop();
                    items.push(format!("{}{}", key, rendered?));
                }
                RequestNode::InlineFragment {
                    type_name,
                    selection: sub,
                } => {
                    path.push(Segment::Fragment(type_name));
                    let rendered = self.fragment(path, sub);
                    path.pop();
                    items.push(format!("...{}", rendered?));
                }
            }
        }

        if items.is_empty() {
            return Err(GenerateError::EmptySelection {
                path: display_path(path),
            });
        }

        Ok(format!("{{{}}}", items.join(",")))
    }

    /// Emits a named fragment for the `on_<Type>` segment at the end of `path` and
    /// returns its name.
    fn fragment<'r>(
        &mut self,
        path: &mut Vec<Segment<'r>>,
        selection: &'r Selection,
    ) -> Result<String, GenerateError> {
        let target = self.type_at(path)?;
        let name = self.context.next_fragment_name();
        let body = self.expand(path, selection)?;
        let schema = self.schema;
        self.context
            .push_fragment(&name, &schema.get(target).name, &body);

        Ok(name)
    }

    fn type_at(&self, path: &[Segment]) -> Result<TypeId, GenerateError> {
        let mut current = self.root;
        for (index, segment) in path.iter().enumerate() {
            current = self.step(current, *segment, &path[..=index])?;
        }

        Ok(current)
    }

    fn step(
        &self,
        current: TypeId,
        segment: Segment,
        path: &[Segment],
    ) -> Result<TypeId, GenerateError> {
        match segment {
            Segment::Field(name) => {
                let field = self.find_field(current, name, path)?;
                self.field_type(current, name, field)
            }
            Segment::Fragment(type_name) => {
                let key = format!("{}{}", FRAGMENT_PREFIX, type_name);
                if let Some(field) = self.candidate_field(current, &key) {
                    return self.field_type(current, &key, field);
                }

                // without an `on_<Type>` field, only the current type itself may be spread
                let current_name = &self.schema.get(current).name;
                match self.schema.type_id(type_name) {
                    None => Err(GenerateError::UnknownType(type_name.to_string())),
                    Some(_) if current_name == type_name => Ok(current),
                    Some(_) => Err(GenerateError::UnknownField {
                        field: key,
                        type_name: current_name.clone(),
                        path: display_path(path),
                    }),
                }
            }
        }
    }

    fn field_type(
        &self,
        owner: TypeId,
        name: &str,
        field: &FieldNode,
    ) -> Result<TypeId, GenerateError> {
        field
            .ty
            .ok_or_else(|| GenerateError::DanglingTypeReference {
                type_name: self.schema.get(owner).name.clone(),
                field: name.to_string(),
            })
    }

    /// The field the last segment of `path` names, i.e. the one that owns arguments.
    fn field_at(&self, path: &[Segment]) -> Result<&'s FieldNode, GenerateError> {
        let Some((Segment::Field(name), parent)) = path.split_last() else {
            return Err(GenerateError::ArgumentsWithoutField {
                path: display_path(path),
            });
        };

        let owner = self.type_at(parent)?;
        self.find_field(owner, name, path)
    }

    fn find_field(
        &self,
        current: TypeId,
        name: &str,
        path: &[Segment],
    ) -> Result<&'s FieldNode, GenerateError> {
        self.candidate_field(current, name)
            .ok_or_else(|| GenerateError::UnknownField {
                field: name.to_string(),
                type_name: self.schema.get(current).name.clone(),
                path: display_path(path),
            })
    }

    /// Looks `name` up on `current`, then on every type reachable through its
    /// `on_<Type>` fields, in declaration order. The first match wins.
    fn candidate_field(&self, current: TypeId, name: &str) -> Option<&'s FieldNode> {
        let schema: &'s Schema = self.schema;
        let node = schema.get(current);

        node.field(name).or_else(|| {
            node.fragment_targets()
                .find_map(|target| schema.get(target).field(name))
        })
    }
}
