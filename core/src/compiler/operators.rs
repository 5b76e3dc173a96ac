//! Operator table: token to operator mapping and priorities.

use crate::scanner::Token;
use crate::vm::{BinaryOp, Instruction, StoreMode, UnaryOp};

/// Priority of indexing and calls. Tails are emitted eagerly, so nothing
/// pending ever outranks them.
pub(crate) const INDEX_PRIORITY: u16 = 1000;

/// An operator waiting on the expression stack for its right operand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PendingOp {
    Binary { op: BinaryOp, negated: bool },
    Prefix(UnaryOp),
    Assign(StoreMode),
    Insert(StoreMode),
}

impl PendingOp {
    pub(crate) fn priority(self) -> u16 {
        match self {
            PendingOp::Binary { op, .. } => binary_priority(op),
            PendingOp::Prefix(UnaryOp::Deref) => 999,
            PendingOp::Prefix(UnaryOp::Neg | UnaryOp::Not) => 900,
            PendingOp::Assign(_) | PendingOp::Insert(_) => 200,
        }
    }

    pub(crate) fn is_store(self) -> bool {
        matches!(self, PendingOp::Assign(_) | PendingOp::Insert(_))
    }

    pub(crate) fn is_prefix(self) -> bool {
        matches!(self, PendingOp::Prefix(_))
    }

    /// Whether `self`, already pending, is emitted before `incoming` is
    /// pushed.
    ///
    /// Equal priorities flush, which makes binary operators left
    /// associative. A store never flushes another store (right
    /// associative chains) and a prefix operator never flushes anything,
    /// since it has no operand yet.
    pub(crate) fn flushes_before(self, incoming: PendingOp) -> bool {
        if incoming.is_prefix() {
            return false;
        }
        if incoming.is_store() && self.is_store() {
            return false;
        }
        self.priority() >= incoming.priority()
    }

    pub(crate) fn instruction(self) -> Instruction {
        match self {
            PendingOp::Binary { op, negated } => Instruction::Binary { op, negated },
            PendingOp::Prefix(op) => Instruction::Unary(op),
            PendingOp::Assign(mode) => Instruction::Assign(mode),
            PendingOp::Insert(mode) => Instruction::Insert(mode),
        }
    }
}

pub(crate) fn binary_priority(op: BinaryOp) -> u16 {
    match op {
        BinaryOp::Index => INDEX_PRIORITY,
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 600,
        BinaryOp::Add | BinaryOp::Sub => 500,
        BinaryOp::Shl | BinaryOp::Shr => 450,
        BinaryOp::Lt
        | BinaryOp::Gt
        | BinaryOp::Eq
        | BinaryOp::In
        | BinaryOp::Has
        | BinaryOp::Holds => 400,
        BinaryOp::Cast | BinaryOp::CanCast => 300,
        BinaryOp::And | BinaryOp::Or => 250,
    }
}

/// Binary operator spelled by `token`, if any. `=` and `->` are store
/// operators, see [`store_op`].
pub(crate) fn binary_op(token: &Token) -> Option<BinaryOp> {
    if token.kind != crate::scanner::TokenKind::Separator {
        return None;
    }
    let op = match token.text.as_str() {
        "+" => BinaryOp::Add,
        "-" => BinaryOp::Sub,
        "*" => BinaryOp::Mul,
        "/" => BinaryOp::Div,
        "%" => BinaryOp::Mod,
        "<<" => BinaryOp::Shl,
        ">>" => BinaryOp::Shr,
        "<" => BinaryOp::Lt,
        ">" => BinaryOp::Gt,
        "==" => BinaryOp::Eq,
        "in" => BinaryOp::In,
        "has" => BinaryOp::Has,
        "holds" => BinaryOp::Holds,
        ":" => BinaryOp::Cast,
        "?" => BinaryOp::CanCast,
        "&" => BinaryOp::And,
        "|" => BinaryOp::Or,
        _ => return None,
    };
    Some(op)
}

/// Store operator spelled by `token`, with the given fused operator.
pub(crate) fn store_op(token: &Token, compound: Option<BinaryOp>) -> Option<PendingOp> {
    let mode = StoreMode {
        compound,
        by_ref: false,
    };
    if token.is("=") {
        Some(PendingOp::Assign(mode))
    } else if token.is("->") {
        Some(PendingOp::Insert(mode))
    } else {
        None
    }
}

pub(crate) fn prefix_op(token: &Token) -> Option<UnaryOp> {
    if token.is("-") {
        Some(UnaryOp::Neg)
    } else if token.is("!") {
        Some(UnaryOp::Not)
    } else if token.is("$") {
        Some(UnaryOp::Deref)
    } else {
        None
    }
}
