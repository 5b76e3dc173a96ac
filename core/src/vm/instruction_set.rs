//! RPN instruction set.
//!
//! Instructions live in a flat array and are addressed by index. Each one,
//! executed at position `p`, yields the position of the next instruction:
//! `p + 1` for value-producing instructions, an arbitrary label target for
//! control instructions.
//!
//! # Stack Discipline
//!
//! Stack effect notation: `[..., operand1, operand2] -> [..., result]`

use core::fmt;

use crate::values::{Label, Value};

/// Binary operators.
///
/// `Index` is both `a[i]` and the field sugar `a.name`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Shl,
    Shr,
    Lt,
    Gt,
    Eq,
    In,
    Has,
    Holds,
    Cast,
    CanCast,
    And,
    Or,
    Index,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Eq => "==",
            BinaryOp::In => "in",
            BinaryOp::Has => "has",
            BinaryOp::Holds => "holds",
            BinaryOp::Cast => ":",
            BinaryOp::CanCast => "?",
            BinaryOp::And => "&",
            BinaryOp::Or => "|",
            BinaryOp::Index => "[]",
        }
    }

    /// Operators that accept the `!` negation prefix.
    pub fn negatable(self) -> bool {
        matches!(
            self,
            BinaryOp::Lt
                | BinaryOp::Gt
                | BinaryOp::Eq
                | BinaryOp::And
                | BinaryOp::Or
                | BinaryOp::In
                | BinaryOp::Has
                | BinaryOp::Holds
        )
    }

    /// Operators that can be fused into an assignment (`x += 1`).
    pub fn compoundable(self) -> bool {
        !matches!(
            self,
            BinaryOp::In | BinaryOp::Has | BinaryOp::Holds | BinaryOp::Index
        )
    }
}

impl fmt::Debug for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `-x`
    Neg,
    /// `!x`, by truthiness.
    Not,
    /// `$x`, read a variable.
    Deref,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
            UnaryOp::Deref => "$",
        }
    }
}

impl fmt::Debug for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// How an assignment or insert stores its value.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreMode {
    /// Fused operator: the stored value is `current op value`.
    pub compound: Option<BinaryOp>,
    /// Store the value as-is instead of loading a Variable operand.
    pub by_ref: bool,
}

impl fmt::Debug for StoreMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(op) = self.compound {
            parts.push(op.symbol());
        }
        if self.by_ref {
            parts.push("ref");
        }
        write!(f, "{}", parts.join(" "))
    }
}

#[derive(Clone)]
pub enum Instruction {
    /// Stack: [...] -> [..., value]
    Push(Value),

    /// Stack: [..., a, b] -> [..., a op b]
    Binary { op: BinaryOp, negated: bool },

    /// Stack: [..., a] -> [..., op a]
    Unary(UnaryOp),

    /// `target = value`
    /// Stack: [..., target, value] -> [..., stored]
    Assign(StoreMode),

    /// `value -> target`
    /// Stack: [..., value, target] -> [..., stored]
    Insert(StoreMode),

    /// Stack: [..., a] -> [...]
    Ignore,

    /// Stack: [..., label] -> [...], continues at the label.
    Goto,

    /// Jumps when the condition is false.
    /// Stack: [..., label, cond] -> [...]
    IfGoto,

    /// Returns to the caller's landing pad.
    /// Stack: [..., return_label, value] -> [..., value]
    Return,

    /// Calls a BuiltIn or Func with `argc` arguments. A Func returns to `ret`.
    /// Stack: [..., callee, arg1, ..., argN] -> [..., result]
    Eval { argc: usize, ret: Label },

    Nop,

    /// Halts the program: yields its own position.
    End,
}

impl Instruction {
    /// Net change of the operand stack depth, as seen by the code that
    /// follows the instruction.
    pub fn stack_effect(&self) -> isize {
        match self {
            Instruction::Push(_) => 1,
            Instruction::Binary { .. } => -1,
            Instruction::Unary(_) => 0,
            Instruction::Assign(_) | Instruction::Insert(_) => -1,
            Instruction::Ignore => -1,
            Instruction::Goto => -1,
            Instruction::IfGoto => -2,
            Instruction::Return => -1,
            Instruction::Eval { argc, .. } => -(*argc as isize),
            Instruction::Nop | Instruction::End => 0,
        }
    }
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Push(value) => write!(f, "Push({:?})", value),
            Self::Binary { op, negated: true } => write!(f, "Binary(!{:?})", op),
            Self::Binary { op, negated: false } => write!(f, "Binary({:?})", op),
            Self::Unary(op) => write!(f, "Unary({:?})", op),
            Self::Assign(mode) if *mode == StoreMode::default() => write!(f, "Assign"),
            Self::Assign(mode) => write!(f, "Assign({:?})", mode),
            Self::Insert(mode) if *mode == StoreMode::default() => write!(f, "Insert"),
            Self::Insert(mode) => write!(f, "Insert({:?})", mode),
            Self::Ignore => write!(f, "Ignore"),
            Self::Goto => write!(f, "Goto"),
            Self::IfGoto => write!(f, "IfGoto"),
            Self::Return => write!(f, "Return"),
            Self::Eval { argc, ret } => write!(f, "Eval({}, {:?})", argc, ret),
            Self::Nop => write!(f, "Nop"),
            Self::End => write!(f, "End"),
        }
    }
}
