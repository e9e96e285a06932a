/// The lexer takes the source input, mapping it into a sequence of tokens.
pub mod lexer;

/// The parser takes a sequence of tokens, mapping it into an AST.
pub mod parser;

/// The semantic analyzer resolves names and checks the types of an AST,
/// reporting every problem it finds.
pub mod semantic;

/// Lexical scopes used by the semantic analyzer.
pub mod scope;

/// The high-level intermediate representation, a flat three-address
/// instruction list per function.
pub mod hir;

pub mod ast;
pub mod token;
pub mod types;

pub mod util {
    pub mod fmt;
    pub mod intern;
    #[cfg(test)]
    pub(crate) mod test_utils;
}
