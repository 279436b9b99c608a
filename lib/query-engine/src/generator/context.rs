use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::schema::TypeId;

#[derive(Debug, Clone, PartialEq)]
pub struct VariableTyping {
    pub ty: TypeId,
    pub type_string: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableSlot {
    pub value: Value,
    pub typing: VariableTyping,
}

/// State of a single generation call. Counters restart at zero for every operation.
#[derive(Debug, Default)]
pub struct OperationContext {
    variable_counter: usize,
    fragment_counter: usize,
    variables: IndexMap<String, VariableSlot>,
    fragments: Vec<String>,
}

impl OperationContext {
    pub fn add_variable(&mut self, value: Value, typing: VariableTyping) -> String {
        let name = format!("v{}", self.variable_counter);
        self.variable_counter += 1;
        self.variables
            .insert(name.clone(), VariableSlot { value, typing });
        name
    }

    pub fn next_fragment_name(&mut self) -> String {
        let name = format!("f{}", self.fragment_counter);
        self.fragment_counter += 1;
        name
    }

    pub fn push_fragment(&mut self, name: &str, type_name: &str, body: &str) {
        self.fragments
            .push(format!("fragment {} on {}{}", name, type_name, body));
    }

    pub fn variables(&self) -> &IndexMap<String, VariableSlot> {
        &self.variables
    }

    /// `$v0:Int,$v1:[Int]`
    pub fn variable_declarations(&self) -> String {
        self.variables
            .iter()
            .map(|(name, slot)| format!("${}:{}", name, slot.typing.type_string))
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn into_parts(self) -> (Option<Map<String, Value>>, Vec<String>) {
        let variables = if self.variables.is_empty() {
            None
        } else {
            Some(
                self.variables
                    .into_iter()
                    .map(|(name, slot)| (name, slot.value))
                    .collect(),
            )
        };

        (variables, self.fragments)
    }
}
