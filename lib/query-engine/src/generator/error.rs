#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum GenerateError {
    #[error("Root type \"{0}\" does not exist in the schema")]
    MissingRootType(String),
    #[error("The root of a request must be a field selection")]
    RootMustBeSelection,
    #[error("Field selection should not be empty (at \"{path}\")")]
    EmptySelection { path: String },
    #[error("Field \"{field}\" does not exist on type \"{type_name}\" (at \"{path}\")")]
    UnknownField {
        field: String,
        type_name: String,
        path: String,
    },
    #[error("Type \"{0}\" used in an inline fragment does not exist in the schema")]
    UnknownType(String),
    #[error("Argument \"{argument}\" is not declared on field \"{field}\" (at \"{path}\")")]
    UnknownArgument {
        argument: String,
        field: String,
        path: String,
    },
    #[error("Arguments must belong to a field (at \"{path}\")")]
    ArgumentsWithoutField { path: String },
    #[error("Field \"{field}\" on type \"{type_name}\" references a type missing from the schema")]
    DanglingTypeReference { type_name: String, field: String },
}
