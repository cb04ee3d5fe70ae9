use std::collections::HashSet;

use crate::ir::Function;

/// Hands out result names that are unique within one function.
///
/// A taken stem gets a numeric suffix: `add_tmp`, `add_tmp1`, `add_tmp2`, ...
#[derive(Debug, Clone, Default)]
pub struct Namer {
    taken: HashSet<String>,
}

impl Namer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Namer that already knows every parameter and result name of `func`.
    pub fn from_function(func: &Function) -> Self {
        let mut namer = Self::new();
        for p in &func.params {
            namer.taken.insert(p.name.clone());
        }
        for r in func.instrs().filter_map(|i| i.result.as_ref()) {
            namer.taken.insert(r.clone());
        }
        namer
    }

    /// Claim `name` exactly. Returns false if it was already taken.
    pub fn reserve(&mut self, name: &str) -> bool {
        self.taken.insert(name.to_string())
    }

    pub fn fresh(&mut self, stem: &str) -> String {
        if self.reserve(stem) {
            return stem.to_string();
        }
        let mut n = 1usize;
        loop {
            let candidate = format!("{stem}{n}");
            if self.reserve(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}
