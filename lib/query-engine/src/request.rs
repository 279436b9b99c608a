use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};

pub const ARGS_KEY: &str = "__args";
pub const SCALAR_KEY: &str = "__scalar";
pub const NAME_KEY: &str = "__name";
pub const FRAGMENT_PREFIX: &str = "on_";

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum RequestParseError {
    #[error("Failed to parse request as JSON: {0}")]
    InvalidJson(String),
    #[error("Request must be an object, got {0}")]
    NotAnObject(&'static str),
    #[error("\"__args\" must be an object, got {0}")]
    InvalidArguments(&'static str),
    #[error("\"__name\" must be a string, got {0}")]
    InvalidOperationName(&'static str),
    #[error("\"__scalar\" must be a boolean, got {0}")]
    InvalidScalarFlag(&'static str),
    #[error("Inline fragment key \"{0}\" is missing a type name")]
    MalformedFragmentKey(String),
    #[error("Inline fragment \"{0}\" must select fields")]
    FragmentWithoutSelection(String),
    #[error("Field \"{field}\" must be a boolean or an object, got {kind}")]
    InvalidFieldValue { field: String, kind: &'static str },
}

/// A caller-supplied description of what to select.
///
/// The JSON form uses the conventions `__args` (arguments of the enclosing field),
/// `__scalar` (select every scalar field of the current type), `__name` (operation
/// name, root only) and `on_<Type>` (fields selected when the runtime type is `<Type>`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub enum RequestNode {
    Leaf(bool),
    Selection(Selection),
    InlineFragment {
        type_name: String,
        selection: Selection,
    },
}

impl RequestNode {
    pub fn is_selected(&self) -> bool {
        match self {
            RequestNode::Leaf(selected) => *selected,
            RequestNode::Selection(_) | RequestNode::InlineFragment { .. } => true,
        }
    }

    pub fn from_json(raw: &str) -> Result<RequestNode, RequestParseError> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|err| RequestParseError::InvalidJson(err.to_string()))?;
        RequestNode::try_from(value)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Selection {
    pub name: Option<String>,
    pub args: Option<Map<String, Value>>,
    pub scalar: bool,
    /// Includes fields set to `false`; those only matter to `__scalar`.
    pub fields: IndexMap<String, RequestNode>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args
            .get_or_insert_with(Map::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn scalars(mut self) -> Self {
        self.scalar = true;
        self
    }

    pub fn select(self, field: impl Into<String>) -> Self {
        self.field(field, true)
    }

    pub fn exclude(self, field: impl Into<String>) -> Self {
        self.field(field, false)
    }

    pub fn field(mut self, field: impl Into<String>, node: impl Into<RequestNode>) -> Self {
        self.fields.insert(field.into(), node.into());
        self
    }

    pub fn on(mut self, type_name: impl Into<String>, selection: Selection) -> Self {
        let type_name = type_name.into();
        self.fields.insert(
            format!("{}{}", FRAGMENT_PREFIX, type_name),
            RequestNode::InlineFragment {
                type_name,
                selection,
            },
        );
        self
    }

    pub(crate) fn has_arguments(&self) -> bool {
        self.args.as_ref().is_some_and(|args| !args.is_empty())
    }

    /// Nothing besides `__args`: the field is a leaf that takes arguments.
    pub(crate) fn is_arguments_only(&self) -> bool {
        self.fields.is_empty() && !self.scalar && self.name.is_none()
    }
}

impl From<bool> for RequestNode {
    fn from(selected: bool) -> Self {
        RequestNode::Leaf(selected)
    }
}

impl From<Selection> for RequestNode {
    fn from(selection: Selection) -> Self {
        RequestNode::Selection(selection)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl TryFrom<Value> for RequestNode {
    type Error = RequestParseError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Bool(selected) => Ok(RequestNode::Leaf(selected)),
            Value::Object(object) => Ok(RequestNode::Selection(Selection::try_from(object)?)),
            other => Err(RequestParseError::NotAnObject(kind_of(&other))),
        }
    }
}

impl TryFrom<Map<String, Value>> for Selection {
    type Error = RequestParseError;

    fn try_from(object: Map<String, Value>) -> Result<Self, Self::Error> {
        let mut selection = Selection::default();

        for (key, value) in object {
            match key.as_str() {
                ARGS_KEY => match value {
                    Value::Object(args) => selection.args = Some(args),
                    other => return Err(RequestParseError::InvalidArguments(kind_of(&other))),
                },
                SCALAR_KEY => match value {
                    Value::Bool(flag) => selection.scalar = flag,
                    other => return Err(RequestParseError::InvalidScalarFlag(kind_of(&other))),
                },
                NAME_KEY => match value {
                    Value::String(name) => selection.name = Some(name),
                    other => {
                        return Err(RequestParseError::InvalidOperationName(kind_of(&other)))
                    }
                },
                _ => {
                    let node = parse_field(&key, value)?;
                    selection.fields.insert(key, node);
                }
            }
        }

        Ok(selection)
    }
}

fn parse_field(key: &str, value: Value) -> Result<RequestNode, RequestParseError> {
    if let Some(type_name) = key.strip_prefix(FRAGMENT_PREFIX) {
        if type_name.is_empty() {
            return Err(RequestParseError::MalformedFragmentKey(key.to_string()));
        }

        return match value {
            Value::Bool(false) => Ok(RequestNode::Leaf(false)),
            Value::Object(object) => Ok(RequestNode::InlineFragment {
                type_name: type_name.to_string(),
                selection: Selection::try_from(object)?,
            }),
            Value::Bool(true) => Err(RequestParseError::FragmentWithoutSelection(key.to_string())),
            other => Err(RequestParseError::InvalidFieldValue {
                field: key.to_string(),
                kind: kind_of(&other),
            }),
        };
    }

    match value {
        Value::Bool(selected) => Ok(RequestNode::Leaf(selected)),
        Value::Object(object) => Ok(RequestNode::Selection(Selection::try_from(object)?)),
        other => Err(RequestParseError::InvalidFieldValue {
            field: key.to_string(),
            kind: kind_of(&other),
        }),
    }
}
