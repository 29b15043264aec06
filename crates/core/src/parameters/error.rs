//! Parameter error types

/// Errors from parameter store operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterError {
    /// Name too long or parameter not registered
    UnknownParameter,
    /// Store is full
    StoreFull,
    /// Read-only parameter cannot be modified
    ReadOnly,
    /// Value type does not match the registered type
    TypeMismatch,
}

impl ParameterError {
    /// Variant name as a static string (usable with defmt on embedded)
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterError::UnknownParameter => "unknown parameter",
            ParameterError::StoreFull => "parameter store full",
            ParameterError::ReadOnly => "parameter is read-only",
            ParameterError::TypeMismatch => "parameter type mismatch",
        }
    }
}

impl core::fmt::Display for ParameterError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
