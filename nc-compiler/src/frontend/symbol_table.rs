use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Array,
    Prototype,
    Function,
}

/// Names known to the parser.
///
/// Variables and arrays are scoped to the function being parsed and are
/// cleared by [`SymbolTable::enter_function`]. Prototypes and functions live
/// for the whole translation unit and record their arity.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    variables: HashSet<String>,
    arrays: HashSet<String>,
    prototypes: HashMap<String, usize>,
    functions: HashMap<String, usize>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with the runtime builtins `printnum(i)` and `inputnum()` registered.
    pub fn with_builtins() -> Self {
        let mut table = Self::new();
        for (name, params) in BUILTINS {
            table.prototypes.insert(name.to_string(), params.len());
        }
        table
    }

    /// Forget the locals of the previous function.
    pub fn enter_function(&mut self) {
        self.variables.clear();
        self.arrays.clear();
    }

    /// Declare a local name. Fails with the kind of the clashing local.
    pub fn declare_variable(&mut self, name: &str) -> Result<(), SymbolKind> {
        self.check_local(name)?;
        self.variables.insert(name.to_string());
        Ok(())
    }

    pub fn declare_array(&mut self, name: &str) -> Result<(), SymbolKind> {
        self.check_local(name)?;
        self.arrays.insert(name.to_string());
        Ok(())
    }

    fn check_local(&self, name: &str) -> Result<(), SymbolKind> {
        if self.variables.contains(name) {
            return Err(SymbolKind::Variable);
        }
        if self.arrays.contains(name) {
            return Err(SymbolKind::Array);
        }
        Ok(())
    }

    /// Register a prototype. Rejected when the name is already a prototype,
    /// or a function of a different arity.
    pub fn declare_prototype(&mut self, name: &str, arity: usize) -> Result<(), SymbolKind> {
        if self.prototypes.contains_key(name) {
            return Err(SymbolKind::Prototype);
        }
        if matches!(self.functions.get(name), Some(&n) if n != arity) {
            return Err(SymbolKind::Function);
        }
        self.prototypes.insert(name.to_string(), arity);
        Ok(())
    }

    /// Check that a definition header agrees with earlier declarations.
    /// Same-arity repeats are accepted here.
    pub fn check_definition(&self, name: &str, arity: usize) -> Result<(), SymbolKind> {
        if matches!(self.prototypes.get(name), Some(&n) if n != arity) {
            return Err(SymbolKind::Prototype);
        }
        if matches!(self.functions.get(name), Some(&n) if n != arity) {
            return Err(SymbolKind::Function);
        }
        Ok(())
    }

    pub fn define_function(&mut self, name: &str, arity: usize) {
        self.functions.insert(name.to_string(), arity);
    }

    pub fn is_variable(&self, name: &str) -> bool {
        self.variables.contains(name)
    }

    pub fn is_array(&self, name: &str) -> bool {
        self.arrays.contains(name)
    }

    /// Arity of a callable name, preferring the prototype table.
    pub fn callable_arity(&self, name: &str) -> Option<usize> {
        self.prototypes
            .get(name)
            .or_else(|| self.functions.get(name))
            .copied()
    }
}

/// Runtime-provided functions and their parameter names.
pub const BUILTINS: &[(&str, &[&str])] = &[("printnum", &["i"]), ("inputnum", &[])];
