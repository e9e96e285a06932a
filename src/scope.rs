use std::collections::HashMap;

use tracing::trace;

use crate::{token::Span, types::Type, util::intern::Interned};

/// A name bound in some scope.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Binding {
    pub ty: Type,
    /// Where the name was declared.
    pub span: Span,
}

/// A stack of lexical scopes. The innermost scope is the last one.
///
/// Lookups walk the stack innermost-first; definitions always go to the
/// innermost scope.
#[derive(Debug, Default)]
pub struct Scopes {
    stack: Vec<HashMap<Interned<str>, Binding>>,
    entered: usize,
    exited: usize,
}

impl Scopes {
    pub fn new() -> Scopes {
        Scopes::default()
    }

    pub fn enter(&mut self) {
        self.stack.push(HashMap::new());
        self.entered += 1;
        trace!(depth = self.depth(), "entered scope");
    }

    /// Exits the innermost scope, dropping all of its bindings.
    ///
    /// Panics if there is no scope to exit.
    pub fn exit(&mut self) {
        let scope = self.stack.pop().expect("exited more scopes than entered");
        self.exited += 1;
        trace!(depth = self.depth(), dropped = scope.len(), "exited scope");
    }

    /// Number of currently open scopes.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Returns `(entered, exited)`, counted since creation.
    pub fn balance(&self) -> (usize, usize) {
        (self.entered, self.exited)
    }

    /// Binds `name` in the innermost scope.
    ///
    /// If the innermost scope already binds `name`, nothing is changed and
    /// the existing binding is returned. Outer bindings may be shadowed.
    pub fn define(&mut self, name: Interned<str>, binding: Binding) -> Result<(), Binding> {
        let scope = self
            .stack
            .last_mut()
            .expect("must define inside of a scope");
        if let Some(existing) = scope.get(&name) {
            return Err(*existing);
        }
        scope.insert(name, binding);
        Ok(())
    }

    /// Binds `name` in the innermost scope, replacing any previous binding of
    /// that scope.
    pub fn redefine(&mut self, name: Interned<str>, binding: Binding) {
        self.stack
            .last_mut()
            .expect("must define inside of a scope")
            .insert(name, binding);
    }

    /// Finds the innermost binding of `name`.
    pub fn lookup(&self, name: Interned<str>) -> Option<Binding> {
        self.stack
            .iter()
            .rev()
            .find_map(|scope| scope.get(&name))
            .copied()
    }

    /// Finds the binding of `name` in the innermost scope only.
    pub fn lookup_current(&self, name: Interned<str>) -> Option<Binding> {
        self.stack.last()?.get(&name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::intern::Interner;

    fn binding(ty: Type, lo: u32) -> Binding {
        Binding {
            ty,
            span: Span::new_of_length(lo, 1),
        }
    }

    #[test]
    fn shadowing_and_exit() {
        let mut i = Interner::<str>::with_capacity(2);
        let x = i.intern("x");
        let y = i.intern("y");

        let mut scopes = Scopes::new();
        scopes.enter();
        scopes.define(x, binding(Type::Int, 0)).unwrap();

        scopes.enter();
        assert_eq!(scopes.lookup(x), Some(binding(Type::Int, 0)));
        assert_eq!(scopes.lookup_current(x), None);
        scopes.define(x, binding(Type::String, 5)).unwrap();
        scopes.define(y, binding(Type::Int, 7)).unwrap();
        assert_eq!(scopes.lookup(x), Some(binding(Type::String, 5)));
        scopes.exit();

        assert_eq!(scopes.lookup(x), Some(binding(Type::Int, 0)));
        assert_eq!(scopes.lookup(y), None);
        scopes.exit();

        assert_eq!(scopes.depth(), 0);
        assert_eq!(scopes.balance(), (2, 2));
    }

    #[test]
    fn define_rejects_duplicate_in_current_scope() {
        let mut i = Interner::<str>::with_capacity(1);
        let x = i.intern("x");

        let mut scopes = Scopes::new();
        scopes.enter();
        scopes.define(x, binding(Type::Int, 0)).unwrap();
        assert_eq!(
            scopes.define(x, binding(Type::String, 3)),
            Err(binding(Type::Int, 0))
        );

        scopes.redefine(x, binding(Type::String, 3));
        assert_eq!(scopes.lookup(x), Some(binding(Type::String, 3)));
    }

    #[test]
    #[should_panic = "exited more scopes than entered"]
    fn unbalanced_exit_panics() {
        Scopes::new().exit();
    }
}
