// declaration ::= function | var_decl ';'
// function ::= 'fn' ID '(' [type ID (',' type ID)*] ')' [':' type] block
// var_decl ::= type ID ['=' expr]
// type ::= 'int' | 'string' | 'var'
// block ::= '{' stmt* '}'
// stmt ::= 'return' [expr] ';'
//        | 'if' '(' expr ')' block ['else' (block | if)]
//        | 'while' '(' expr ')' block
//        | 'for' '(' [var_decl | expr] ';' [expr] ';' [expr] ')' block
//        | var_decl ';'
//        | expr ';'
// expr ::= ID '=' expr
//        | expr ('==' | '!=' | '<' | '<=' | '>' | '>=') expr
//        | expr ('+' | '-' | '*' | '/') expr
//        | ('-' | '!' | '++' | '--') expr
//        | expr ('++' | '--')
//        | ID '(' [expr (',' expr)*] ')'
//        | '(' expr ')'
//        | ID
//        | integer
//        | string

// Precedence
//
// ++ -- (postfix) call
// - ! ++ -- (prefix)
// * /
// + -
// < <= > >=
// == !=
// =

use crate::{token::Span, types::Type, util::intern::Interned};

#[derive(Debug, PartialEq)]
pub enum Declaration {
    Function(Function),
    Variable(Variable),
}

impl Declaration {
    pub fn span(&self) -> Span {
        match self {
            Declaration::Function(function) => function.span,
            Declaration::Variable(variable) => variable.span,
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct Function {
    pub name: Ident,
    /// [`Type::Untyped`] if the function doesn't declare one.
    pub return_ty: Type,
    pub params: Vec<TypedIdent>,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, PartialEq)]
pub struct Variable {
    pub ident: TypedIdent,
    pub initializer: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, PartialEq)]
pub struct TypedIdent {
    pub name: Ident,
    pub ty: Type,
}

#[derive(Debug, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, PartialEq)]
pub enum StmtKind {
    Expr(Expr),
    Return(Option<Expr>),
    Decl(Variable),
    If {
        condition: Expr,
        then_block: Block,
        /// An `else if` is stored as an else block holding a single `if`.
        else_block: Option<Block>,
    },
    While {
        condition: Expr,
        body: Block,
    },
    For {
        init: Option<ForInit>,
        condition: Option<Expr>,
        increment: Option<Expr>,
        body: Block,
    },
}

#[derive(Debug, PartialEq)]
pub enum ForInit {
    Decl(Variable),
    Expr(Expr),
}

#[derive(Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, PartialEq)]
pub enum ExprKind {
    Int(i64),
    String(Box<str>),
    Var(Ident),
    Binary {
        op: BinaryOperator,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnaryOperator,
        operand: Box<Expr>,
    },
    Assign {
        target: Ident,
        value: Box<Expr>,
    },
    Call {
        callee: Ident,
        args: Vec<Expr>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
    Ne,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnaryOperator {
    Negate,
    Not,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

impl UnaryOperator {
    /// Whether the operator writes back into its operand.
    pub fn is_mutating(self) -> bool {
        !matches!(self, UnaryOperator::Negate | UnaryOperator::Not)
    }

    pub fn is_postfix(self) -> bool {
        matches!(self, UnaryOperator::PostInc | UnaryOperator::PostDec)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOperator::Negate => "-",
            UnaryOperator::Not => "!",
            UnaryOperator::PreInc | UnaryOperator::PostInc => "++",
            UnaryOperator::PreDec | UnaryOperator::PostDec => "--",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Ident {
    pub name: Interned<str>,
    pub span: Span,
}

impl From<Ident> for Interned<str> {
    fn from(value: Ident) -> Self {
        value.name
    }
}

impl From<&Ident> for Interned<str> {
    fn from(value: &Ident) -> Self {
        value.name
    }
}
