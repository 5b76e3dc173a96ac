//! The Quill compilation and execution engine.

use std::rc::Rc;

use tracing::debug;

use super::{EngineOptions, Error, ExecutionOptions, ExecutionOptionsOverride};
use crate::compiler::{self, ParseTracer};
use crate::scanner::{self, Location};
use crate::stdlib::{Console, Registry, StdConsole, register_stdlib};
use crate::values::{Store, Value};
use crate::vm::{Code, ExecutionError, Machine};

/// The Quill compilation and execution engine.
///
/// The engine holds:
/// - The built-in registry, shared by every program it compiles
/// - Runtime configuration (EngineOptions)
///
/// # Example
///
/// ```
/// use quill_core::api::{Engine, EngineOptions};
///
/// let engine = Engine::with_stdlib(EngineOptions::default()).unwrap();
/// let program = engine.compile("loc x = 40; x + 2").unwrap();
/// let outcome = program.execute(&mut quill_core::stdlib::BufferConsole::new()).unwrap();
/// assert_eq!(outcome.render().unwrap(), "42");
/// ```
pub struct Engine {
    registry: Rc<Registry>,
    options: EngineOptions,
}

impl Engine {
    /// Create a new engine whose built-ins are registered by `init`.
    ///
    /// # Example
    ///
    /// ```
    /// use quill_core::api::{Engine, EngineOptions};
    /// use quill_core::stdlib::register_math_package;
    ///
    /// let engine = Engine::new(EngineOptions::default(), register_math_package).unwrap();
    /// assert!(engine.registry().contains("math.sqrt"));
    /// assert!(!engine.registry().contains("print"));
    /// ```
    pub fn new(
        options: EngineOptions,
        init: impl FnOnce(&mut Registry) -> Result<(), Error>,
    ) -> Result<Self, Error> {
        let mut registry = Registry::new();
        init(&mut registry)?;
        debug!(builtins = registry.len(), "engine ready");
        Ok(Self {
            registry: Rc::new(registry),
            options,
        })
    }

    /// Create an engine with the full standard library.
    pub fn with_stdlib(options: EngineOptions) -> Result<Self, Error> {
        Self::new(options, register_stdlib)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Access the engine options.
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Scan and compile a program.
    pub fn compile(&self, source: &str) -> Result<Program, Error> {
        let tokens = scanner::scan(source)?;
        let code = compiler::compile(&tokens)?;
        Ok(self.program(code))
    }

    /// Like [`compile`](Self::compile), reporting the parse to `tracer`.
    pub fn compile_traced(
        &self,
        source: &str,
        tracer: &mut dyn ParseTracer,
    ) -> Result<Program, Error> {
        let tokens = scanner::scan(source)?;
        let code = compiler::compile_traced(&tokens, tracer)?;
        Ok(self.program(code))
    }

    fn program(&self, code: Code) -> Program {
        Program {
            code,
            registry: Rc::clone(&self.registry),
            options: self.options.default_execution_options.clone(),
        }
    }
}

/// A compiled program, ready to run any number of times.
///
/// Every run starts from a fresh store holding only the built-in bindings.
pub struct Program {
    code: Code,
    registry: Rc<Registry>,
    options: ExecutionOptions,
}

impl Program {
    /// The compiled instructions.
    pub fn code(&self) -> &Code {
        &self.code
    }

    /// Run with the engine's default execution options.
    pub fn execute(&self, console: &mut dyn Console) -> Result<Outcome, Error> {
        self.execute_with(console, &ExecutionOptionsOverride::default())
    }

    /// Run with per-run overrides of the execution options.
    pub fn execute_with(
        &self,
        console: &mut dyn Console,
        overrides: &ExecutionOptionsOverride,
    ) -> Result<Outcome, Error> {
        let options = self.options.override_with(overrides);
        let mut store = Store::new();
        self.registry.seed(&mut store);

        let (value, steps) = {
            let mut machine =
                Machine::new(&self.code, &self.registry, &mut store, console, &options);
            let value = machine.run()?;
            (value, machine.steps())
        };

        Ok(Outcome {
            value,
            store,
            steps,
            end: self.code.location(self.code.len().saturating_sub(1)),
        })
    }

    /// Run against the process console and render the result.
    pub fn run(&self) -> Result<String, Error> {
        self.execute(&mut StdConsole)?.render()
    }
}

/// What a finished run left behind.
#[derive(Debug)]
pub struct Outcome {
    /// The value on top of the stack, or `None` if the stack was empty.
    pub value: Option<Value>,
    /// The store after the run.
    pub store: Store,
    /// Number of instructions executed.
    pub steps: usize,
    end: Location,
}

impl Outcome {
    /// The program's textual result: empty for an empty stack; a value that
    /// cannot be displayed is an interpretation error.
    pub fn render(&self) -> Result<String, Error> {
        match &self.value {
            None => Ok(String::new()),
            Some(value) => value
                .render()
                .map_err(|err| ExecutionError::new(err, &self.end).into()),
        }
    }

    /// Current value of the global variable `name`.
    pub fn global(&self, name: &str) -> Option<&Value> {
        self.store.lookup(name)
    }
}
