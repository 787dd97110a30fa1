use goml_ids::ObjectID;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObjectError {
    #[error("object {0} does not exist")]
    Missing(ObjectID),

    #[error("cannot attach object {0} to itself")]
    SelfParent(ObjectID),

    #[error("attaching {child} under {parent} would create a cycle")]
    Cycle { parent: ObjectID, child: ObjectID },
}

#[derive(Debug, Error, PartialEq)]
pub enum FactoryError {
    #[error("descriptor must be a type name or an object with a \"type\" key, got {0}")]
    InvalidDescriptor(String),

    #[error("unknown {category} type \"{name}\"")]
    UnknownType {
        category: &'static str,
        name: String,
    },
}

pub type Result<T> = std::result::Result<T, ObjectError>;
