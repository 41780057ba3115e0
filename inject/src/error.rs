use std::fmt;

use thiserror::Error;

use crate::quantity::QuantityFormatError;

pub type Result<T, E = InjectError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum InjectError {
    #[error("invalid {field} quantity `{value}`: {source}")]
    InvalidQuantity {
        field: ResourceField,
        value: String,
        source: QuantityFormatError,
    },
}

/// Which of the four resource knobs failed validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceField {
    CpuRequest,
    MemoryRequest,
    CpuLimit,
    MemoryLimit,
}

impl fmt::Display for ResourceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceField::CpuRequest => "cpu request",
            ResourceField::MemoryRequest => "memory request",
            ResourceField::CpuLimit => "cpu limit",
            ResourceField::MemoryLimit => "memory limit",
        };

        f.write_str(name)
    }
}
