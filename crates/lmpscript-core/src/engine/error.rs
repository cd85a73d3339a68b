use crate::core::models::criteria::CriteriaError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GroupError {
    #[error("Group name '{name}' is already in use")]
    NameInUse { name: String },

    #[error("Group not found: '{name}'")]
    NotFound { name: String },

    #[error("Index {index} is out of range for a registry of {len} group(s)")]
    IndexOutOfRange { index: isize, len: usize },

    #[error("Cannot rename group '{name}' to its current name")]
    SameName { name: String },

    #[error("Invalid criteria for group '{name}': {source}")]
    InvalidCriteria {
        name: String,
        #[source]
        source: CriteriaError,
    },

    #[error("Operation '{name}' is not finalized and cannot be registered directly")]
    Unfinalized { name: String },
}
