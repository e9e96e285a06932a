use crate::{
    parser, semantic,
    token::{Spanned, TokenKind},
    util::fmt::Show,
};

impl Show for Spanned<semantic::Error> {
    fn show(&self, f: &mut std::fmt::Formatter<'_>, ctx: &super::Context<'_>) -> std::fmt::Result {
        let i = ctx.ident_interner;
        let Spanned { span, inner: error } = self;

        if f.alternate() {
            write!(f, "{span}: ")?;
        }

        use semantic::Error::*;
        match error {
            DuplicateFunction {
                name,
                other_definition_span,
            } => {
                let name = i.get(name);
                write!(f, "function {name} already defined at {other_definition_span}")
            }
            DuplicateParameter {
                name,
                other_definition_span,
            } => {
                let name = i.get(name);
                write!(f, "parameter {name} already defined at {other_definition_span}")
            }
            DuplicateVariable {
                name,
                other_definition_span,
            } => {
                let name = i.get(name);
                write!(f, "variable {name} already defined at {other_definition_span}")
            }
            UndefinedVariable(name) => {
                let name = i.get(name);
                write!(f, "variable {name} is not defined")
            }
            UndefinedFunction(name) => {
                let name = i.get(name);
                write!(f, "function {name} is not defined")
            }
            Mismatch { expected, actual } => {
                write!(f, "type mismatch: expected {expected}, but got {actual}")
            }
            WrongConversion { lhs, rhs } => {
                write!(f, "wrong type conversion between {lhs} and {rhs}")
            }
            ReturnMismatch { expected, actual } => {
                write!(f, "return type mismatch: expected {expected}, but got {actual}")
            }
            MissingReturnValue { expected } => {
                write!(f, "missing return value of type {expected}")
            }
            TooManyArguments {
                name,
                expected,
                actual,
            } => {
                let name = i.get(name);
                write!(
                    f,
                    "too many arguments to function {name}: expected {expected}, but got {actual}"
                )
            }
            TooFewArguments {
                name,
                expected,
                actual,
            } => {
                let name = i.get(name);
                write!(
                    f,
                    "too few arguments to function {name}: expected {expected}, but got {actual}"
                )
            }
            ArgumentMismatch {
                position,
                expected,
                actual,
            } => write!(
                f,
                "argument {position} type mismatch: expected {expected}, but got {actual}"
            ),
            InvalidUnaryOperand { op, actual } => {
                let symbol = op.symbol();
                write!(f, "invalid operand of type {actual} to unary {symbol}")
            }
            NotAssignable => write!(f, "expression is not assignable"),
            RvalueModification => write!(f, "cannot modify rvalue"),
            UnreachableCode => write!(f, "unreachable statement"),
        }
    }
}

impl Show for Spanned<parser::Error> {
    fn show(&self, f: &mut std::fmt::Formatter<'_>, _: &super::Context<'_>) -> std::fmt::Result {
        let Spanned { span, inner: error } = self;

        if f.alternate() {
            write!(f, "{span}: ")?;
        }

        use parser::Error::*;
        match error {
            InvalidAssignmentTarget => write!(f, "invalid assignment target"),
            InvalidCallTarget => write!(f, "invalid call target"),
            UnexpectedTokenInExpr { token } => {
                write!(f, "unexpected token {token:?} in expression")
            }
            Unexpected { actual, expected } => {
                write!(f, "expected token {expected:?}, but got {actual:?}")
            }
            UnexpectedAny { actual, expected } => {
                write!(f, "expected one of {expected:?}, but got {actual:?}")
            }
            ExpectedType { actual } => write!(f, "expected type, but got {actual:?}"),
            ParseInt => write!(f, "parse int error, out of bounds"),
            Lexer(TokenKind::ErrorUnexpectedChar) => write!(f, "unexpected character"),
            Lexer(TokenKind::ErrorUnclosedComment) => write!(f, "unclosed comment"),
            Lexer(TokenKind::ErrorUnclosedString) => write!(f, "unclosed string"),
            Lexer(TokenKind::ErrorUnescapedLineBreak) => write!(f, "unescaped line break"),
            Lexer(_) => unreachable!("not error token"),
        }
    }
}
