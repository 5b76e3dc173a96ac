//! Instruction emission for the parser.
//!
//! The creator owns everything the parser builds as a side effect:
//! the instruction stream, labels, the lambda table, the operator
//! expression stack and the loop/lambda contexts. It tracks the operand
//! stack depth of the code it emits so that jumps can unwind precisely.

use ecow::EcoString;
use hashbrown::{HashMap, HashSet};

use crate::{
    compiler::{
        error::{StructureError, StructureErrorKind},
        operators::PendingOp,
    },
    scanner::{Location, Position},
    values::{Interner, Label, Name, Symbol, Value},
    vm::{Code, Instruction, LambdaEntry, StoreMode},
};

/// A lambda parameter: its name and whether it binds by reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Param {
    pub name: EcoString,
    pub by_ref: bool,
}

/// Jump targets and stack base of the innermost loop.
#[derive(Clone, Copy, Debug)]
pub(crate) struct LoopContext {
    pub top: Label,
    pub end: Label,
    /// Depth before the loop pushed its value slot.
    pub base: usize,
}

struct Pending {
    op: PendingOp,
    location: Location,
}

struct LambdaScope {
    symbol: Symbol,
    locals: HashSet<EcoString>,
    entry: usize,
    params: usize,
    skip: Label,
    outer_depth: usize,
}

/// Operand stack depth inside a lambda once its parameters are bound:
/// only the return label remains.
const LAMBDA_BASE: usize = 1;

pub(crate) struct Creator {
    instructions: Vec<Instruction>,
    locations: Vec<Location>,
    labels: Vec<Option<usize>>,
    lambdas: HashMap<Symbol, LambdaEntry>,
    interner: Interner,
    location: Location,

    /// Operand stack depth at the current emission point.
    depth: usize,
    max_depth: usize,

    /// Operators waiting for their right operand. `None` opens a bracket
    /// scope that flushing never crosses.
    pending: Vec<Option<Pending>>,
    /// Innermost last. A lambda pushes `None` so loops never leak into it.
    loops: Vec<Option<LoopContext>>,
    scopes: Vec<LambdaScope>,
    lambda_count: usize,
}

impl Creator {
    pub(crate) fn new() -> Self {
        Self {
            instructions: Vec::new(),
            locations: Vec::new(),
            labels: Vec::new(),
            lambdas: HashMap::new(),
            interner: Interner::new(),
            location: Location::default(),
            depth: 0,
            max_depth: 0,
            pending: Vec::new(),
            loops: Vec::new(),
            scopes: Vec::new(),
            lambda_count: 0,
        }
    }

    /// Location attached to instructions emitted from now on.
    pub(crate) fn set_location(&mut self, location: Location) {
        self.location = location;
    }

    // === Instruction Emission ===

    pub(crate) fn emit(&mut self, instruction: Instruction) {
        let location = self.location.clone();
        self.emit_at(instruction, location);
    }

    fn emit_at(&mut self, instruction: Instruction, location: Location) {
        let depth = self.depth as isize + instruction.stack_effect();
        self.set_depth(depth.max(0) as usize);
        self.instructions.push(instruction);
        self.locations.push(location);
    }

    pub(crate) fn push(&mut self, value: Value) {
        self.emit(Instruction::Push(value));
    }

    pub(crate) fn push_label(&mut self, label: Label) {
        self.push(Value::Label(label));
    }

    /// `Push(label) Goto`.
    pub(crate) fn goto(&mut self, label: Label) {
        self.push_label(label);
        self.emit(Instruction::Goto);
    }

    // === Stack Depth ===

    pub(crate) fn depth(&self) -> usize {
        self.depth
    }

    /// Reset the tracked depth, for code reached only by a jump.
    pub(crate) fn set_depth(&mut self, depth: usize) {
        self.depth = depth;
        self.max_depth = self.max_depth.max(depth);
    }

    // === Labels ===

    pub(crate) fn new_label(&mut self) -> Label {
        let label = Label(self.labels.len() as u32);
        self.labels.push(None);
        label
    }

    /// Bind `label` to the next instruction emitted.
    pub(crate) fn place(&mut self, label: Label) {
        self.labels[label.index()] = Some(self.instructions.len());
    }

    // === Expression Stack ===

    pub(crate) fn open_bracket(&mut self) {
        self.pending.push(None);
    }

    /// Flush every operator pending in the innermost bracket scope, then
    /// close it.
    pub(crate) fn close_bracket(&mut self) -> Result<(), StructureErrorKind> {
        loop {
            match self.pending.pop() {
                Some(Some(pending)) => {
                    self.emit_at(pending.op.instruction(), pending.location);
                }
                Some(None) => return Ok(()),
                None => return Err(StructureErrorKind::UnbalancedBracket),
            }
        }
    }

    /// Queue `op`, first emitting the pending operators it does not bind
    /// tighter than.
    pub(crate) fn push_op(&mut self, op: PendingOp, location: Location) {
        while let Some(Some(top)) = self.pending.last() {
            if !top.op.flushes_before(op) {
                break;
            }
            if let Some(Some(pending)) = self.pending.pop() {
                self.emit_at(pending.op.instruction(), pending.location);
            }
        }
        self.pending.push(Some(Pending { op, location }));
    }

    // === Names ===

    pub(crate) fn global(&mut self, name: &str) -> Name {
        Name::plain(self.interner.intern(name))
    }

    /// The innermost lambda local called `name`, else the global.
    pub(crate) fn resolve(&mut self, name: &str) -> Name {
        let owner = self
            .scopes
            .iter()
            .rev()
            .find(|scope| scope.locals.contains(name))
            .map(|scope| scope.symbol.clone());
        match owner {
            Some(symbol) => self.local(&symbol, name),
            None => self.global(name),
        }
    }

    /// Declare `name` in the innermost lambda; at top level this is the
    /// global itself.
    pub(crate) fn declare(&mut self, name: &str) -> Name {
        match self.scopes.last_mut() {
            Some(scope) => {
                scope.locals.insert(name.into());
                let symbol = scope.symbol.clone();
                self.local(&symbol, name)
            }
            None => self.global(name),
        }
    }

    fn local(&mut self, lambda: &Symbol, name: &str) -> Name {
        let qualified = ecow::eco_format!("{}.{}", lambda.as_str(), name);
        Name::plain(self.interner.intern(&qualified))
    }

    // === Loops ===

    /// Emit the loop prologue: the value slot and the `top` landing.
    pub(crate) fn begin_loop(&mut self) -> LoopContext {
        let base = self.depth;
        self.push(Value::None);
        let top = self.new_label();
        let end = self.new_label();
        self.place(top);
        let context = LoopContext { top, end, base };
        self.loops.push(Some(context));
        context
    }

    pub(crate) fn end_loop(&mut self) -> Result<(), StructureErrorKind> {
        let context = self
            .loops
            .pop()
            .flatten()
            .ok_or(StructureErrorKind::UnclosedContext { what: "loop" })?;
        self.place(context.end);
        self.set_depth(context.base + 1);
        Ok(())
    }

    pub(crate) fn current_loop(&self) -> Option<LoopContext> {
        self.loops.last().copied().flatten()
    }

    // === Jumps ===

    /// Drop operands until the stack is `base` deep.
    pub(crate) fn unwind(&mut self, base: usize) {
        while self.depth > base {
            self.emit(Instruction::Ignore);
        }
    }

    /// Depth after a jump written at `before`: the code that follows is
    /// only reachable as if the jump expression had left one value.
    pub(crate) fn settle(&mut self, before: usize) {
        self.set_depth(before + 1);
    }

    /// Stack base `return` unwinds to, if inside a lambda.
    pub(crate) fn lambda_base(&self) -> Option<usize> {
        (!self.scopes.is_empty()).then_some(LAMBDA_BASE)
    }

    // === Lambdas ===

    /// Emit the jump over the body and the parameter bindings; the body
    /// follows.
    pub(crate) fn begin_lambda(&mut self, params: &[Param]) {
        let skip = self.new_label();
        self.goto(skip);

        let symbol = self
            .interner
            .intern(&ecow::eco_format!("<lambda{}>", self.lambda_count));
        self.lambda_count += 1;

        self.scopes.push(LambdaScope {
            symbol,
            locals: params.iter().map(|param| param.name.clone()).collect(),
            entry: self.instructions.len(),
            params: params.len(),
            skip,
            outer_depth: self.depth,
        });
        self.loops.push(None);

        // Stack on entry: [return label, argN, ..., arg1]
        self.set_depth(LAMBDA_BASE + params.len());
        for param in params {
            let name = self.resolve(&param.name);
            self.push(Value::Variable(name));
            self.emit(Instruction::Insert(StoreMode {
                compound: None,
                by_ref: param.by_ref,
            }));
            self.emit(Instruction::Ignore);
        }
    }

    /// Close the body with `Return` and push the lambda's Func value.
    pub(crate) fn end_lambda(&mut self) -> Result<(), StructureErrorKind> {
        self.emit(Instruction::Return);
        let scope = self
            .scopes
            .pop()
            .ok_or(StructureErrorKind::UnclosedContext { what: "lambda" })?;
        match self.loops.pop() {
            Some(None) => {}
            _ => return Err(StructureErrorKind::UnclosedContext { what: "loop" }),
        }

        self.lambdas.insert(
            scope.symbol.clone(),
            LambdaEntry {
                entry: scope.entry,
                params: scope.params,
            },
        );
        self.place(scope.skip);
        self.set_depth(scope.outer_depth);
        self.push(Value::Func(scope.symbol));
        Ok(())
    }

    // === Finalization ===

    /// Append `End`, check that every context closed and every label was
    /// placed, and hand out the program.
    pub(crate) fn finish(mut self, position: Position) -> Result<Code, StructureError> {
        let fail = |kind| StructureError { kind, position };

        if !self.pending.is_empty() {
            return Err(fail(StructureErrorKind::UnbalancedBracket));
        }
        if !self.loops.is_empty() {
            return Err(fail(StructureErrorKind::UnclosedContext { what: "loop" }));
        }
        if !self.scopes.is_empty() {
            return Err(fail(StructureErrorKind::UnclosedContext { what: "lambda" }));
        }

        self.emit(Instruction::End);

        let labels = self
            .labels
            .iter()
            .enumerate()
            .map(|(label, target)| {
                target.ok_or_else(|| {
                    fail(StructureErrorKind::UnplacedLabel {
                        label: label as u32,
                    })
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Code {
            instructions: self.instructions,
            locations: self.locations,
            labels,
            lambdas: self.lambdas,
            max_stack_size: self.max_depth,
        })
    }
}
