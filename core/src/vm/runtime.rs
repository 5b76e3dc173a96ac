use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::{
    api::ExecutionOptions,
    stdlib::{BuiltinContext, Console, Registry},
    values::{Label, Store, TypeMask, Value},
    vm::{
        Code, ExecutionError, ExecutionErrorKind, Instruction, ResourceExceededError,
        RuntimeError, Stack, StoreMode,
        operators::{binary, load, truthy, unary},
    },
};

/// The stack machine.
///
/// Runs one [`Code`] against one [`Store`]. The store must already hold the
/// built-in bindings (see [`Registry::seed`]).
pub struct Machine<'a> {
    code: &'a Code,
    registry: &'a Registry,
    store: &'a mut Store,
    console: &'a mut dyn Console,
    stack: Stack<Value>,
    max_steps: Option<usize>,
    steps: usize,
}

impl<'a> Machine<'a> {
    pub fn new(
        code: &'a Code,
        registry: &'a Registry,
        store: &'a mut Store,
        console: &'a mut dyn Console,
        options: &ExecutionOptions,
    ) -> Self {
        Machine {
            code,
            registry,
            store,
            console,
            stack: Stack::new(options.max_stack_size),
            max_steps: options.max_steps,
            steps: 0,
        }
    }

    /// Execute from the first instruction until the program halts.
    ///
    /// Returns the value left on top of the stack, or `None` if the stack is
    /// empty.
    pub fn run(&mut self) -> Result<Option<Value>, ExecutionError> {
        let mut position = 0;
        while position < self.code.len() {
            if let Some(max_steps) = self.max_steps {
                if self.steps >= max_steps {
                    return Err(self.fail(ResourceExceededError::StepLimit { max_steps }, position));
                }
            }
            self.steps += 1;

            let next = self
                .execute(position)
                .map_err(|kind| self.fail(kind, position))?;
            match next {
                Some(next) if next != position => position = next,
                _ => break,
            }
        }
        debug!(steps = self.steps, depth = self.stack.len(), "halted");
        Ok(self.stack.pop())
    }

    fn fail(&self, kind: impl Into<ExecutionErrorKind>, position: usize) -> ExecutionError {
        let error = ExecutionError::new(kind, &self.code.location(position));
        debug!(position, %error, "execution failed");
        error
    }

    /// Number of instructions executed so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Run the instruction at `position`; returns the next position.
    fn execute(&mut self, position: usize) -> Result<Option<usize>, ExecutionErrorKind> {
        let code = self.code;
        let instruction = &code.instructions[position];
        trace!(position, ?instruction, depth = self.stack.len(), "step");

        let next = position + 1;
        match instruction {
            Instruction::Push(value) => self.push(value.clone())?,
            Instruction::Binary { op, negated } => {
                let right = self.pop()?;
                let left = self.pop()?;
                let result = binary(self.store, *op, *negated, left, right)?;
                self.push(result)?;
            }
            Instruction::Unary(op) => {
                let operand = self.pop()?;
                let result = unary(self.store, *op, operand)?;
                self.push(result)?;
            }
            Instruction::Assign(mode) => {
                let value = self.pop()?;
                let target = self.pop()?;
                self.store_value("=", target, value, *mode)?;
            }
            Instruction::Insert(mode) => {
                let target = self.pop()?;
                let value = self.pop()?;
                self.store_value("->", target, value, *mode)?;
            }
            Instruction::Ignore => {
                self.pop()?;
            }
            Instruction::Goto => {
                let label = self.pop()?;
                return Ok(Some(self.jump_target(&label)?));
            }
            Instruction::IfGoto => {
                let condition = self.pop()?;
                let label = self.pop()?;
                if !truthy(self.store, &condition, "if")? {
                    return Ok(Some(self.jump_target(&label)?));
                }
            }
            Instruction::Return => {
                let value = self.pop()?;
                let label = self.pop()?;
                let target = self.jump_target(&label)?;
                self.push(value)?;
                return Ok(Some(target));
            }
            Instruction::Eval { argc, ret } => return self.eval(*argc, *ret, next).map(Some),
            Instruction::Nop => {}
            Instruction::End => return Ok(Some(position)),
        }
        Ok(Some(next))
    }

    #[inline]
    fn push(&mut self, value: Value) -> Result<(), ResourceExceededError> {
        self.stack.push(value)
    }

    #[inline]
    fn pop(&mut self) -> Result<Value, RuntimeError> {
        self.stack.pop().ok_or(RuntimeError::StackUnderflow)
    }

    fn jump_target(&self, label: &Value) -> Result<usize, RuntimeError> {
        let label = label
            .as_label()
            .ok_or(RuntimeError::NotALabel { found: label.ty() })?;
        self.code.label_target(label)
    }

    /// Shared body of `=` and `->`: store into the target Variable and leave
    /// the stored value on the stack.
    fn store_value(
        &mut self,
        op: &'static str,
        target: Value,
        value: Value,
        mode: StoreMode,
    ) -> Result<(), ExecutionErrorKind> {
        let name = match target {
            Value::Variable(name) => name,
            other => {
                return Err(RuntimeError::NotAVariable {
                    op,
                    found: other.ty(),
                }
                .into());
            }
        };

        let value = match mode.compound {
            Some(inner) => binary(self.store, inner, false, Value::Variable(name.clone()), value)?,
            None if mode.by_ref => value,
            None => load(self.store, value)?,
        };
        if value.is_none() {
            return Err(RuntimeError::NoneOperand { op }.into());
        }

        trace!(%name, ?value, "store");
        self.store.set(name, value.clone());
        self.push(value)?;
        Ok(())
    }

    /// Call protocol.
    ///
    /// Stack: [..., callee, arg1, ..., argN] -> [..., result] for built-ins.
    /// A Func call instead leaves [..., ret, argN, ..., arg1] and jumps to
    /// the lambda entry; its `Return` lands on `ret`.
    fn eval(
        &mut self,
        argc: usize,
        ret: Label,
        next: usize,
    ) -> Result<usize, ExecutionErrorKind> {
        let mut args: SmallVec<[Value; 4]> = SmallVec::with_capacity(argc);
        for _ in 0..argc {
            args.push(self.pop()?);
        }
        args.reverse();

        let callee = match self.pop()? {
            variable @ Value::Variable(_) => load(self.store, variable)?,
            other => other,
        };

        match callee {
            Value::BuiltIn(symbol) => {
                let registry = self.registry;
                let builtin = registry.get(symbol.as_str()).ok_or_else(|| {
                    RuntimeError::UnknownBuiltin {
                        name: symbol.to_string(),
                    }
                })?;
                if builtin.arity() != argc {
                    return Err(RuntimeError::ArityMismatch {
                        name: builtin.name.to_string(),
                        expected: builtin.arity(),
                        found: argc,
                    }
                    .into());
                }
                for (i, (arg, mask)) in args.iter_mut().zip(builtin.params).enumerate() {
                    if !mask.contains(TypeMask::VARIABLE) {
                        *arg = load(self.store, core::mem::replace(arg, Value::None))?;
                    }
                    if !mask.accepts(arg.ty()) {
                        return Err(RuntimeError::ArgumentType {
                            name: builtin.name.to_string(),
                            position: i + 1,
                            expected: *mask,
                            found: arg.ty(),
                        }
                        .into());
                    }
                }

                debug!(builtin = builtin.name, argc, "call");
                let mut ctx = BuiltinContext {
                    store: &mut *self.store,
                    console: &mut *self.console,
                };
                let result = (builtin.func)(&mut ctx, &args)?;
                self.push(result)?;
                Ok(next)
            }
            Value::Func(symbol) => {
                let entry =
                    self.code
                        .lambda(&symbol)
                        .ok_or_else(|| RuntimeError::UnknownFunction {
                            name: symbol.to_string(),
                        })?;
                if entry.params != argc {
                    return Err(RuntimeError::ArityMismatch {
                        name: symbol.to_string(),
                        expected: entry.params,
                        found: argc,
                    }
                    .into());
                }

                debug!(lambda = %symbol, argc, entry = entry.entry, "call");
                self.push(Value::Label(ret))?;
                for arg in args.into_iter().rev() {
                    self.push(arg)?;
                }
                Ok(entry.entry)
            }
            other => Err(RuntimeError::NotCallable { found: other.ty() }.into()),
        }
    }
}
