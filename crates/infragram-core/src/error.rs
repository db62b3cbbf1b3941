//! Schema-level error types.

use thiserror::Error;

use crate::identifier::Id;

/// A malformed Schema, detected lazily the first time it is indexed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    #[error("duplicate entity id `{0}`; ids must be unique across the whole schema")]
    DuplicateId(Id),

    #[error("entity with empty id (label `{label}`)")]
    EmptyId { label: String },

    #[error("connection #{index} `{source_id}` -> `{target_id}` references unknown id `{missing}`")]
    DanglingConnection {
        index: usize,
        source_id: Id,
        target_id: Id,
        missing: Id,
    },
}
