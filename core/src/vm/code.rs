use hashbrown::HashMap;

use crate::{
    scanner::Location,
    values::{Label, Symbol, Value},
    vm::{Instruction, RuntimeError},
};

/// First instruction and declared parameter count of a compiled lambda.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LambdaEntry {
    pub entry: usize,
    pub params: usize,
}

/// A compiled program: the instruction stream plus its jump tables.
pub struct Code {
    pub instructions: Vec<Instruction>,
    /// Source location of each instruction, parallel to `instructions`.
    pub locations: Vec<Location>,
    /// Resolved label positions, indexed by [`Label::index`].
    pub labels: Vec<usize>,
    pub lambdas: HashMap<Symbol, LambdaEntry>,
    /// Deepest operand stack seen by the generator within one context.
    pub max_stack_size: usize,
}

impl Code {
    pub fn label_target(&self, label: Label) -> Result<usize, RuntimeError> {
        self.labels
            .get(label.index())
            .copied()
            .ok_or(RuntimeError::UnresolvedLabel { label: label.0 })
    }

    pub fn lambda(&self, symbol: &Symbol) -> Option<LambdaEntry> {
        self.lambdas.get(symbol).copied()
    }

    pub fn location(&self, position: usize) -> Location {
        self.locations.get(position).cloned().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

impl core::fmt::Debug for Code {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "Code {{")?;
        writeln!(f, "  max_stack_size: {}", self.max_stack_size)?;

        if self.lambdas.is_empty() {
            writeln!(f, "  lambdas: []")?;
        } else {
            let mut lambdas: Vec<_> = self.lambdas.iter().collect();
            lambdas.sort_by_key(|(_, entry)| entry.entry);
            writeln!(f, "  lambdas: [")?;
            for (symbol, entry) in lambdas {
                writeln!(
                    f,
                    "    {} = @{} ({} params)",
                    symbol, entry.entry, entry.params
                )?;
            }
            writeln!(f, "  ]")?;
        }

        // Several labels may resolve to the same address.
        let mut names: HashMap<usize, Vec<String>> = HashMap::new();
        for (index, &target) in self.labels.iter().enumerate() {
            names.entry(target).or_default().push(format!("L{}", index));
        }

        writeln!(f, "  instructions:")?;
        for (addr, instr) in self.instructions.iter().enumerate() {
            let label_prefix = names
                .get(&addr)
                .map(|labels| format!("{}:", labels.join(",")))
                .unwrap_or_default();
            let position = self
                .locations
                .get(addr)
                .map(|location| location.position.to_string())
                .unwrap_or_default();

            match instr {
                Instruction::Push(Value::Label(label)) => {
                    let target = self
                        .labels
                        .get(label.index())
                        .map(|target| format!("@{}", target))
                        .unwrap_or_else(|| String::from("@?"));
                    writeln!(
                        f,
                        "    {:4} {:>8}  {:?} (to {})  ; {}",
                        addr, label_prefix, instr, target, position
                    )?;
                }
                _ => writeln!(
                    f,
                    "    {:4} {:>8}  {:?}  ; {}",
                    addr, label_prefix, instr, position
                )?,
            }
        }

        write!(f, "}}")
    }
}
