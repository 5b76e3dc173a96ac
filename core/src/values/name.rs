//! Entity names: the single key type for variables, built-ins and lambdas.
//!
//! A [`Symbol`] is an interned string. Equality and hashing are by string
//! value, so two symbols produced by different interners still compare equal.
//!
//! A [`Name`] is either a plain symbol or a derived (indexed) name built from a
//! base name and an [`IndexKey`]. Derived names emulate arrays and records on
//! top of the flat store. Their display form is the encoded key
//! `base#<tag>#<index>`, e.g. `a#I#0` or `file#S#read`.

use core::fmt;
use std::rc::Rc;

use ecow::EcoString;
use hashbrown::HashSet;

use crate::values::format_float;

/// An interned string handle.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(Rc<str>);

impl Symbol {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A symbol outside any interner, for one-off lookups.
    pub(crate) fn detached(s: &str) -> Self {
        Symbol(Rc::from(s))
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// String interner for deduplicating symbols.
#[derive(Clone, Debug, Default)]
pub struct Interner {
    symbols: HashSet<Rc<str>>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string, returning its symbol.
    pub fn intern(&mut self, s: &str) -> Symbol {
        if let Some(existing) = self.symbols.get(s) {
            return Symbol(Rc::clone(existing));
        }
        let rc: Rc<str> = Rc::from(s);
        self.symbols.insert(Rc::clone(&rc));
        Symbol(rc)
    }

}

/// The index half of a derived name.
///
/// Floats are keyed by their bit pattern so the key is `Eq + Hash`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum IndexKey {
    Integer(i64),
    Float(u64),
    String(EcoString),
}

impl IndexKey {
    /// Single-character type tag used in the encoded form.
    pub fn tag(&self) -> char {
        match self {
            IndexKey::Integer(_) => 'I',
            IndexKey::Float(_) => 'F',
            IndexKey::String(_) => 'S',
        }
    }

    pub fn float(value: f64) -> Self {
        // -0.0 and 0.0 address the same slot.
        let value = if value == 0.0 { 0.0 } else { value };
        IndexKey::Float(value.to_bits())
    }
}

impl fmt::Display for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKey::Integer(i) => write!(f, "{}", i),
            IndexKey::Float(bits) => f.write_str(&format_float(f64::from_bits(*bits))),
            IndexKey::String(s) => f.write_str(s),
        }
    }
}

impl fmt::Debug for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.tag(), self)
    }
}

/// A storage slot name.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Name {
    Plain(Symbol),
    Indexed(Rc<(Name, IndexKey)>),
}

impl Name {
    pub fn plain(symbol: Symbol) -> Self {
        Name::Plain(symbol)
    }

    /// Derive the name of element `key` of `self`.
    pub fn index(&self, key: IndexKey) -> Self {
        Name::Indexed(Rc::new((self.clone(), key)))
    }

    /// The base this name was derived from, if any.
    pub fn parent(&self) -> Option<&Name> {
        match self {
            Name::Plain(_) => None,
            Name::Indexed(inner) => Some(&inner.0),
        }
    }

    /// True if `self` was derived (directly or transitively) from `base`.
    ///
    /// This is the structured equivalent of "the encoded key starts with
    /// `base#`".
    pub fn is_within(&self, base: &Name) -> bool {
        let mut current = self.parent();
        while let Some(name) = current {
            if name == base {
                return true;
            }
            current = name.parent();
        }
        false
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Name::Plain(symbol) => f.write_str(symbol.as_str()),
            Name::Indexed(inner) => {
                let (base, key) = inner.as_ref();
                write!(f, "{}#{}#{}", base, key.tag(), key)
            }
        }
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
