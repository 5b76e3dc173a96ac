//! The RPN instruction set and the stack machine that runs it.

mod code;
mod error;
mod instruction_set;
mod operators;
mod runtime;
mod stack;

pub use code::{Code, LambdaEntry};
pub use error::{ExecutionError, ExecutionErrorKind, ResourceExceededError, RuntimeError};
pub use instruction_set::{BinaryOp, Instruction, StoreMode, UnaryOp};
pub use runtime::Machine;

pub(crate) use stack::Stack;
