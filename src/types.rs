use std::fmt;

use crate::token::TokenKind;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    String,
    /// The type of a `var` binding whose type is not (yet) known. Unifies with
    /// every other type.
    Untyped,
    /// Sentinel for expressions which already produced a diagnostic. Consuming
    /// it never reports a new one.
    Error,
}

impl Type {
    /// Maps a type keyword into its type.
    pub fn from_keyword(kind: TokenKind) -> Option<Type> {
        match kind {
            TokenKind::IntType => Some(Type::Int),
            TokenKind::StringType => Some(Type::String),
            TokenKind::Var => Some(Type::Untyped),
            _ => None,
        }
    }

    pub fn is_concrete(self) -> bool {
        matches!(self, Type::Int | Type::String)
    }

    pub fn name(self) -> &'static str {
        match self {
            Type::Int => "int",
            Type::String => "string",
            Type::Untyped => "var",
            Type::Error => "<error>",
        }
    }

    /// Finds the common type of two operands.
    ///
    /// An [`Type::Error`] operand yields the other side's type, and so does an
    /// [`Type::Untyped`] one. Fails only if both sides are concrete and
    /// distinct.
    pub fn unify(self, other: Type) -> Result<Type, ()> {
        match (self, other) {
            (Type::Error, other) | (other, Type::Error) => Ok(other),
            (Type::Untyped, other) | (other, Type::Untyped) => Ok(other),
            (a, b) if a == b => Ok(a),
            _ => Err(()),
        }
    }

    /// Whether a value of type `actual` may flow where `self` is expected,
    /// without reporting a diagnostic.
    pub fn accepts(self, actual: Type) -> bool {
        !self.is_concrete() || !actual.is_concrete() || self == actual
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unify() {
        use Type::*;

        assert_eq!(Int.unify(Int), Ok(Int));
        assert_eq!(String.unify(String), Ok(String));
        assert_eq!(Int.unify(String), Err(()));
        assert_eq!(String.unify(Int), Err(()));

        assert_eq!(Error.unify(Int), Ok(Int));
        assert_eq!(String.unify(Error), Ok(String));
        assert_eq!(Error.unify(Error), Ok(Error));

        assert_eq!(Untyped.unify(Int), Ok(Int));
        assert_eq!(String.unify(Untyped), Ok(String));
        assert_eq!(Untyped.unify(Untyped), Ok(Untyped));
        assert_eq!(Untyped.unify(Error), Ok(Untyped));
    }

    #[test]
    fn accepts() {
        use Type::*;

        assert!(Int.accepts(Int));
        assert!(!Int.accepts(String));
        assert!(Int.accepts(Untyped));
        assert!(Int.accepts(Error));
        assert!(Untyped.accepts(String));
        assert!(Error.accepts(Int));
    }
}
