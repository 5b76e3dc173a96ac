//! Configuration options for the Quill engine.

/// Configuration options for program execution.
///
/// These options control resource limits during interpretation. Exceeding
/// either limit ends the run with
/// [`ResourceExceededError`](crate::vm::ResourceExceededError).
///
/// # Example
///
/// ```
/// use quill_core::api::ExecutionOptions;
///
/// let options = ExecutionOptions {
///     max_stack_size: 500,
///     max_steps: Some(10_000),
/// };
/// ```
#[derive(Debug, Clone)]
pub struct ExecutionOptions {
    /// Maximum operand stack depth (for recursion protection).
    ///
    /// Default: 10 000
    pub max_stack_size: usize,

    /// Maximum number of executed instructions (if Some).
    ///
    /// Set to `None` for unlimited execution (be careful with untrusted code!).
    ///
    /// Default: None
    pub max_steps: Option<usize>,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            max_stack_size: 10_000,
            max_steps: None,
        }
    }
}

/// Configuration options for the Quill engine.
///
/// These set the defaults for execution, which can be overridden on a
/// per-run basis.
///
/// # Example
///
/// ```
/// use quill_core::api::{EngineOptions, ExecutionOptions};
///
/// let options = EngineOptions {
///     default_execution_options: ExecutionOptions {
///         max_stack_size: 500,
///         max_steps: Some(10_000),
///     },
/// };
/// ```
#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    /// Default execution options for programs compiled by this engine.
    pub default_execution_options: ExecutionOptions,
}

impl ExecutionOptions {
    /// Returns these options with any set fields from `other` taking precedence.
    pub fn override_with(&self, other: &ExecutionOptionsOverride) -> Self {
        Self {
            max_stack_size: other.max_stack_size.unwrap_or(self.max_stack_size),
            max_steps: other.max_steps.or(self.max_steps),
        }
    }
}

/// Per-run overrides for [`ExecutionOptions`]. Unset fields keep the engine
/// default.
#[derive(Debug, Clone, Default)]
pub struct ExecutionOptionsOverride {
    pub max_stack_size: Option<usize>,
    pub max_steps: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_keeps_unset_fields() {
        let base = ExecutionOptions::default();
        let merged = base.override_with(&ExecutionOptionsOverride {
            max_steps: Some(50),
            ..Default::default()
        });
        assert_eq!(merged.max_stack_size, 10_000);
        assert_eq!(merged.max_steps, Some(50));
    }
}
