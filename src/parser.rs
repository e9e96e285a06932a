use tracing::debug;

use crate::{
    ast::{
        BinaryOperator, Block, Declaration, Expr, ExprKind, ForInit, Function, Ident, Stmt,
        StmtKind, TypedIdent, UnaryOperator, Variable,
    },
    lexer::{self, extract},
    token::{Spanned, Token, TokenKind},
    types::Type,
    util::intern::Interner,
};

type Result<T, E = ()> = std::result::Result<T, E>;

/// On failure, holds whatever was successfully parsed before the error.
pub type ParseResult<T> = Result<T, (T, Vec<Spanned<Error>>)>;

/// Lexes and parses a whole program.
///
/// Parsing stops at the first declaration that fails, since the cursor is not
/// resynchronized after an error. The declarations parsed up to that point are
/// returned along with the (single) error.
pub fn parse_program(
    src: &str,
    tokens: &mut Vec<Token>,
    ident_interner: &mut Interner<str>,
) -> ParseResult<Vec<Declaration>> {
    assert!(tokens.is_empty());
    lexer::lex(src, tokens);

    let mut p = Parser::new(src, tokens, 0, ident_interner);
    let mut declarations = Vec::with_capacity(8);
    while p.except([]) {
        match p.parse_declaration() {
            Ok(declaration) => declarations.push(declaration),
            Err(()) => break,
        }
    }
    debug!(
        declarations = declarations.len(),
        tokens = tokens.len(),
        idents = p.ident_interner.len(),
        failed = p.error.is_some(),
        "parsed program"
    );

    match p.error.take() {
        None => Ok(declarations),
        Some(error) => Err((declarations, vec![error])),
    }
}

/// Parses one declaration starting at `cursor`, which is advanced past every
/// consumed token.
///
/// After a failure the cursor position is unspecified.
pub fn parse_declaration(
    src: &str,
    tokens: &[Token],
    cursor: &mut usize,
    ident_interner: &mut Interner<str>,
) -> Result<Declaration, Spanned<Error>> {
    let mut p = Parser::new(src, tokens, *cursor, ident_interner);
    let result = p.parse_declaration();
    *cursor = p.cursor;
    result.map_err(|()| p.take_error())
}

pub fn parse_statement(
    src: &str,
    tokens: &mut Vec<Token>,
    ident_interner: &mut Interner<str>,
) -> Result<Stmt, Spanned<Error>> {
    parse_single(src, tokens, ident_interner, |p| p.parse_stmt())
}

pub fn parse_expr(
    src: &str,
    tokens: &mut Vec<Token>,
    ident_interner: &mut Interner<str>,
) -> Result<Expr, Spanned<Error>> {
    parse_single(src, tokens, ident_interner, |p| p.parse_expr())
}

fn parse_single<T>(
    src: &str,
    tokens: &mut Vec<Token>,
    ident_interner: &mut Interner<str>,
    f: impl FnOnce(&mut Parser<'_, '_, '_>) -> Result<T>,
) -> Result<T, Spanned<Error>> {
    assert!(tokens.is_empty());
    lexer::lex(src, tokens);
    let mut p = Parser::new(src, tokens, 0, ident_interner);
    f(&mut p).map_err(|()| p.take_error())
}

const DECLARATION_START: &[TokenKind] = &[
    TokenKind::Fn,
    TokenKind::IntType,
    TokenKind::StringType,
    TokenKind::Var,
];

/// Binding power of the prefix operators (`-`, `!`, `++` and `--`).
const PREFIX_BP: u8 = 11;

struct Parser<'src, 'tok, 'ident> {
    src: &'src str,
    tokens: &'tok [Token],
    ident_interner: &'ident mut Interner<str>,
    cursor: usize,
    error: Option<Spanned<Error>>,
}

impl Parser<'_, '_, '_> {
    fn parse_declaration(&mut self) -> Result<Declaration> {
        match self.peek().kind {
            TokenKind::Fn => self.parse_function().map(Declaration::Function),
            TokenKind::IntType | TokenKind::StringType | TokenKind::Var => {
                let variable = self.parse_variable()?;
                self.consume(TokenKind::Semicolon)?;
                Ok(Declaration::Variable(variable))
            }
            _ => {
                self.error_at_current(|actual| Error::UnexpectedAny {
                    actual,
                    expected: Box::from(DECLARATION_START),
                });
                Err(())
            }
        }
    }

    fn parse_function(&mut self) -> Result<Function> {
        let start = self.consume(TokenKind::Fn)?;
        let name = self.parse_ident()?;

        self.consume(TokenKind::LParen)?;
        let params = self.parse_list(TokenKind::RParen, TokenKind::Comma, Parser::parse_param)?;
        self.consume(TokenKind::RParen)?;

        let return_ty = if self.take(TokenKind::Colon) {
            self.parse_type()?.0
        } else {
            Type::Untyped
        };

        let body = self.parse_block()?;
        Ok(Function {
            name,
            return_ty,
            params,
            span: start.span().to(body.span),
            body,
        })
    }

    fn parse_param(&mut self) -> Result<TypedIdent> {
        let (ty, _) = self.parse_type()?;
        let name = self.parse_ident()?;
        Ok(TypedIdent { name, ty })
    }

    /// Parses `type ID ['=' expr]`, without the trailing semicolon.
    fn parse_variable(&mut self) -> Result<Variable> {
        let (ty, start) = self.parse_type()?;
        let name = self.parse_ident()?;
        let initializer = if self.take(TokenKind::Assign) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        let end = initializer.as_ref().map_or(name.span, |init| init.span);
        Ok(Variable {
            ident: TypedIdent { name, ty },
            initializer,
            span: start.span().to(end),
        })
    }

    fn parse_type(&mut self) -> Result<(Type, Token)> {
        let c = self.peek();
        if let Some(ty) = Type::from_keyword(c.kind) {
            self.advance();
            Ok((ty, c))
        } else {
            self.error_at_current(|actual| Error::ExpectedType { actual });
            Err(())
        }
    }

    fn parse_ident(&mut self) -> Result<Ident> {
        let token = self.consume(TokenKind::Identifier)?;
        Ok(self.intern_ident(token))
    }

    fn parse_block(&mut self) -> Result<Block> {
        let start = self.consume(TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        while self.except([TokenKind::RBrace]) {
            stmts.push(self.parse_stmt()?);
        }
        let end = self.consume(TokenKind::RBrace)?;
        Ok(Block {
            stmts,
            span: start.span().to(end.span()),
        })
    }

    fn parse_stmt(&mut self) -> Result<Stmt> {
        let c = self.peek();
        let (kind, span) = match c.kind {
            TokenKind::Return => {
                self.advance();
                let value = if self.is(TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                let end = self.consume(TokenKind::Semicolon)?;
                (StmtKind::Return(value), c.span().to(end.span()))
            }
            TokenKind::If => return self.parse_if(),
            TokenKind::While => {
                self.advance();
                let condition = self.parse_condition()?;
                let body = self.parse_block()?;
                let span = c.span().to(body.span);
                (StmtKind::While { condition, body }, span)
            }
            TokenKind::For => return self.parse_for(),
            TokenKind::IntType | TokenKind::StringType | TokenKind::Var => {
                let variable = self.parse_variable()?;
                let end = self.consume(TokenKind::Semicolon)?;
                let span = variable.span.to(end.span());
                (StmtKind::Decl(variable), span)
            }
            _ => {
                let expr = self.parse_expr()?;
                let end = self.consume(TokenKind::Semicolon)?;
                let span = expr.span.to(end.span());
                (StmtKind::Expr(expr), span)
            }
        };
        Ok(Stmt { kind, span })
    }

    /// Parses `'(' expr ')'`.
    fn parse_condition(&mut self) -> Result<Expr> {
        self.consume(TokenKind::LParen)?;
        let condition = self.parse_expr()?;
        self.consume(TokenKind::RParen)?;
        Ok(condition)
    }

    fn parse_if(&mut self) -> Result<Stmt> {
        let start = self.consume(TokenKind::If)?;
        let condition = self.parse_condition()?;
        let then_block = self.parse_block()?;

        let else_block = if !self.take(TokenKind::Else) {
            None
        } else if self.is(TokenKind::If) {
            let nested = self.parse_if()?;
            Some(Block {
                span: nested.span,
                stmts: vec![nested],
            })
        } else {
            Some(self.parse_block()?)
        };

        let end = else_block.as_ref().unwrap_or(&then_block).span;
        let kind = StmtKind::If {
            condition,
            then_block,
            else_block,
        };
        Ok(Stmt {
            kind,
            span: start.span().to(end),
        })
    }

    fn parse_for(&mut self) -> Result<Stmt> {
        let start = self.consume(TokenKind::For)?;
        self.consume(TokenKind::LParen)?;

        let init = match self.peek().kind {
            TokenKind::Semicolon => None,
            TokenKind::IntType | TokenKind::StringType | TokenKind::Var => {
                Some(ForInit::Decl(self.parse_variable()?))
            }
            _ => Some(ForInit::Expr(self.parse_expr()?)),
        };
        self.consume(TokenKind::Semicolon)?;

        let condition = self.parse_optional_expr(TokenKind::Semicolon)?;
        self.consume(TokenKind::Semicolon)?;

        let increment = self.parse_optional_expr(TokenKind::RParen)?;
        self.consume(TokenKind::RParen)?;

        let body = self.parse_block()?;
        let span = start.span().to(body.span);
        let kind = StmtKind::For {
            init,
            condition,
            increment,
            body,
        };
        Ok(Stmt { kind, span })
    }

    /// Parses an expression unless the current token is `terminator`.
    fn parse_optional_expr(&mut self, terminator: TokenKind) -> Result<Option<Expr>> {
        if self.is(terminator) {
            Ok(None)
        } else {
            self.parse_expr().map(Some)
        }
    }

    fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_expr_bp(0)
    }

    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr> {
        let lhs_token = self.advance();
        let mut lhs = self.parse_nud(lhs_token)?;

        loop {
            let op_token = self.peek();

            if let Some(lbp) = Self::postfix_binding_power(op_token.kind) {
                if lbp < min_bp {
                    break;
                }
                self.advance(); // Operator
                lhs = Self::parse_postfix(op_token, lhs);
                continue;
            }

            let Some((lbp, rbp)) = Self::infix_binding_power(op_token.kind) else {
                // Not an operator, the expression ends here.
                break;
            };
            if lbp < min_bp {
                // Operator binds less tightly than the minimum required
                break;
            }
            self.advance(); // Operator
            lhs = self.parse_led(op_token, lhs, rbp)?;
        }

        Ok(lhs)
    }

    /// nud: Parses tokens that start an expression
    /// (prefix operators, literals, grouping)
    fn parse_nud(&mut self, token: Token) -> Result<Expr> {
        let (kind, span) = match token.kind {
            TokenKind::Identifier => (ExprKind::Var(self.intern_ident(token)), token.span()),
            TokenKind::Number => {
                let Ok(parsed) = extract::int(token, self.src) else {
                    self.error(token.span().wrap(Error::ParseInt));
                    return Err(());
                };
                (ExprKind::Int(parsed), token.span())
            }
            TokenKind::String => (
                ExprKind::String(extract::string(token, self.src)),
                token.span(),
            ),
            TokenKind::EscapedString => (
                ExprKind::String(extract::escaped_string(token, self.src)),
                token.span(),
            ),

            // Grouping: ( expr ). Produces no node of its own.
            TokenKind::LParen => {
                let expr = self.parse_expr()?;
                self.consume(TokenKind::RParen)?;
                return Ok(expr);
            }

            kind @ (TokenKind::Minus
            | TokenKind::Bang
            | TokenKind::PlusPlus
            | TokenKind::MinusMinus) => {
                let op = match kind {
                    TokenKind::Minus => UnaryOperator::Negate,
                    TokenKind::Bang => UnaryOperator::Not,
                    TokenKind::PlusPlus => UnaryOperator::PreInc,
                    TokenKind::MinusMinus => UnaryOperator::PreDec,
                    _ => unreachable!(),
                };
                let operand = self.parse_expr_bp(PREFIX_BP)?;
                let span = token.span().to(operand.span);
                let unary = ExprKind::Unary {
                    op,
                    operand: Box::new(operand),
                };
                (unary, span)
            }

            _ => {
                self.error_at(token, |token| Error::UnexpectedTokenInExpr { token });
                return Err(());
            }
        };

        Ok(Expr { kind, span })
    }

    /// led: Parses tokens that follow a left-hand-side expression
    /// (infix operators, assignment and calls)
    fn parse_led(&mut self, op_token: Token, lhs: Expr, rbp: u8) -> Result<Expr> {
        let (kind, span) = match op_token.kind {
            kind @ (TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Star
            | TokenKind::Slash
            | TokenKind::Greater
            | TokenKind::GreaterEq
            | TokenKind::Less
            | TokenKind::LessEq
            | TokenKind::EqEq
            | TokenKind::BangEq) => {
                let op = match kind {
                    TokenKind::Plus => BinaryOperator::Add,
                    TokenKind::Minus => BinaryOperator::Sub,
                    TokenKind::Star => BinaryOperator::Mul,
                    TokenKind::Slash => BinaryOperator::Div,
                    TokenKind::Greater => BinaryOperator::Gt,
                    TokenKind::GreaterEq => BinaryOperator::Ge,
                    TokenKind::Less => BinaryOperator::Lt,
                    TokenKind::LessEq => BinaryOperator::Le,
                    TokenKind::EqEq => BinaryOperator::Eq,
                    TokenKind::BangEq => BinaryOperator::Ne,
                    _ => unreachable!(),
                };
                let rhs = self.parse_expr_bp(rbp)?;

                let span = lhs.span.to(rhs.span);
                let binary = ExprKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                };
                (binary, span)
            }

            // Assignment: ID = expr
            TokenKind::Assign => {
                let ExprKind::Var(target) = lhs.kind else {
                    self.error(lhs.span.wrap(Error::InvalidAssignmentTarget));
                    return Err(());
                };

                let value = self.parse_expr_bp(rbp)?;
                let span = lhs.span.to(value.span);
                let assign = ExprKind::Assign {
                    target,
                    value: Box::new(value),
                };
                (assign, span)
            }

            // Call: ID ( [expr [, expr]*] )
            TokenKind::LParen => {
                let ExprKind::Var(callee) = lhs.kind else {
                    self.error(lhs.span.wrap(Error::InvalidCallTarget));
                    return Err(());
                };

                // LParen was already consumed by the caller.
                let args = self.parse_list(TokenKind::RParen, TokenKind::Comma, Parser::parse_expr)?;
                let end = self.consume(TokenKind::RParen)?;

                let call = ExprKind::Call { callee, args };
                (call, lhs.span.to(end.span()))
            }

            _ => unreachable!("not an infix operator"),
        };

        Ok(Expr { kind, span })
    }

    fn parse_postfix(op_token: Token, operand: Expr) -> Expr {
        let op = match op_token.kind {
            TokenKind::PlusPlus => UnaryOperator::PostInc,
            TokenKind::MinusMinus => UnaryOperator::PostDec,
            _ => unreachable!("not a postfix operator"),
        };
        let span = operand.span.to(op_token.span());
        Expr {
            kind: ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        }
    }

    /// Parses `item (separator item)*` until `end_delim` is found. Does **NOT**
    /// consume the end delimiter.
    fn parse_list<T>(
        &mut self,
        end_delim: TokenKind,
        separator: TokenKind,
        parse_item: impl Fn(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        debug_assert_ne!(end_delim, separator);

        let mut items = Vec::new();
        if self.is(end_delim) {
            return Ok(items);
        }
        loop {
            items.push(parse_item(self)?);
            if self.take(separator) {
                continue;
            }
            if self.is(end_delim) {
                break;
            }
            self.error_at_current(|actual| Error::UnexpectedAny {
                actual,
                expected: Box::from([separator, end_delim]),
            });
            return Err(());
        }
        Ok(items)
    }

    fn infix_binding_power(kind: TokenKind) -> Option<(u8, u8)> {
        let bp = match kind {
            // Assignment (right-associative)
            TokenKind::Assign => (2, 1),

            // Equality (left-associative)
            TokenKind::EqEq | TokenKind::BangEq => (3, 4),

            // Comparisons (left-associative)
            TokenKind::Less | TokenKind::LessEq | TokenKind::Greater | TokenKind::GreaterEq => {
                (5, 6)
            }

            // Addition/Subtraction (left-associative)
            TokenKind::Plus | TokenKind::Minus => (7, 8),

            // Multiplication/Division (left-associative)
            TokenKind::Star | TokenKind::Slash => (9, 10),

            // Call, binds tighter than any prefix operator
            TokenKind::LParen => (13, 14),

            _ => return None,
        };
        Some(bp)
    }

    fn postfix_binding_power(kind: TokenKind) -> Option<u8> {
        match kind {
            TokenKind::PlusPlus | TokenKind::MinusMinus => Some(13),
            _ => None,
        }
    }
}

impl<'src, 'tok, 'ident> Parser<'src, 'tok, 'ident> {
    fn new(
        src: &'src str,
        tokens: &'tok [Token],
        cursor: usize,
        ident_interner: &'ident mut Interner<str>,
    ) -> Parser<'src, 'tok, 'ident> {
        let mut p = Parser {
            src,
            tokens,
            ident_interner,
            cursor,
            error: None,
        };
        p.setup();
        p
    }
}

impl Parser<'_, '_, '_> {
    /// Records the error of the current parse. A failing parse reports
    /// exactly one error.
    fn error(&mut self, error: Spanned<Error>) {
        debug_assert!(self.error.is_none(), "parse error already reported");
        self.error.get_or_insert(error);
    }

    /// Records an error at the provided token. Lexical error tokens take
    /// precedence over the error the caller would report.
    fn error_at(&mut self, token: Token, error: impl FnOnce(TokenKind) -> Error) {
        let error = if token.kind.is_error() {
            Error::Lexer(token.kind)
        } else {
            error(token.kind)
        };
        self.error(token.span().wrap(error));
    }

    fn error_at_current(&mut self, error: impl FnOnce(TokenKind) -> Error) {
        self.error_at(self.peek(), error);
    }

    fn take_error(&mut self) -> Spanned<Error> {
        self.error
            .take()
            .expect("failed parse must have reported an error")
    }

    /// Setups the parser, skipping any trivia if necessary.
    fn setup(&mut self) {
        while self.peek().kind.is_trivia() {
            self.cursor += 1;
        }
    }

    /// Returns the current token.
    #[inline]
    fn peek(&self) -> Token {
        match self.tokens.get(self.cursor) {
            Some(token) => *token,
            None => Token::eof_for(self.src),
        }
    }

    /// Returns the current token and advances. Skips any trivia.
    fn advance(&mut self) -> Token {
        let c = self.peek(); // Before any advancement
        while {
            self.cursor += 1;
            self.peek().kind.is_trivia()
        } {}
        c
    }

    /// Checks whether the current token matches the given one.
    fn is(&self, expect: TokenKind) -> bool {
        self.peek().kind == expect
    }

    /// Advances if the current token matches the provided one, returning true.
    /// If not, returns false and doesn't advance.
    fn take(&mut self, expect: TokenKind) -> bool {
        if self.is(expect) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Advances if the current token matches the provided one. If not, records
    /// an error.
    fn consume(&mut self, expect: TokenKind) -> Result<Token> {
        if self.is(expect) {
            Ok(self.advance())
        } else {
            self.error_at_current(|actual| Error::Unexpected {
                actual,
                expected: expect,
            });
            Err(())
        }
    }

    /// Returns true while the current token does *not* match one of the
    /// provided ones. [`TokenKind::Eof`] is implicitly included in the list.
    ///
    /// This won't advance the cursor.
    fn except(&self, except: impl IntoIterator<Item = TokenKind>) -> bool {
        let c = self.peek();
        if c.kind == TokenKind::Eof {
            return false;
        }
        except.into_iter().all(|e| c.kind != e)
    }

    fn intern_ident(&mut self, token: Token) -> Ident {
        Ident {
            name: self.ident_interner.intern(extract::ident(token, self.src)),
            span: token.span(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    Unexpected {
        actual: TokenKind,
        expected: TokenKind,
    },
    UnexpectedAny {
        actual: TokenKind,
        expected: Box<[TokenKind]>,
    },
    UnexpectedTokenInExpr {
        token: TokenKind,
    },
    ExpectedType {
        actual: TokenKind,
    },
    InvalidAssignmentTarget,
    InvalidCallTarget,
    ParseInt,
    /// A token kind which holds the [`TokenKind::is_error`] property.
    Lexer(TokenKind),
}
