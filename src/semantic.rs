use std::collections::HashMap;

use tracing::debug;

use crate::{
    ast::{
        Declaration, Expr, ExprKind, ForInit, Function, Ident, Stmt, StmtKind, UnaryOperator,
        Variable,
    },
    scope::{Binding, Scopes},
    token::{Span, Spanned},
    types::Type,
    util::{
        fmt::report::Severity,
        intern::{Interned, Interner},
    },
};

/// Maps a function name to its signature.
pub type FunctionTable = HashMap<Interned<str>, FunctionSymbol>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionSymbol {
    pub name: Interned<str>,
    pub return_ty: Type,
    pub params: Vec<Param>,
    /// Span of the function's name in its definition.
    pub span: Span,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Param {
    pub name: Interned<str>,
    pub ty: Type,
}

#[derive(Debug)]
pub struct Analysis {
    pub functions: FunctionTable,
    /// Number of error diagnostics. Warnings are not counted.
    pub error_count: usize,
    pub warning_count: usize,
}

impl Analysis {
    pub fn is_ok(&self) -> bool {
        self.error_count == 0
    }
}

/// Runs both analysis passes over the program and flushes every diagnostic,
/// in the order it was found, into `sink`.
pub fn analyze(
    ident_interner: &Interner<str>,
    declarations: &[Declaration],
    sink: &mut impl Extend<Spanned<Error>>,
) -> Analysis {
    let (functions, diagnostics) = Checker::new(ident_interner).check(declarations);

    let error_count = diagnostics
        .iter()
        .filter(|d| d.inner.severity() == Severity::Error)
        .count();
    let warning_count = diagnostics.len() - error_count;
    debug!(
        functions = functions.len(),
        error_count, warning_count, "analyzed program"
    );

    sink.extend(diagnostics);
    Analysis {
        functions,
        error_count,
        warning_count,
    }
}

pub struct Checker<'ident> {
    ident_interner: &'ident Interner<str>,
    functions: FunctionTable,
    scopes: Scopes,
    errors: Vec<Spanned<Error>>,
    /// Declared return type of the function being checked.
    return_ty: Type,
}

impl<'ident> Checker<'ident> {
    pub fn new(ident_interner: &'ident Interner<str>) -> Checker<'ident> {
        Checker {
            ident_interner,
            functions: HashMap::with_capacity(16),
            scopes: Scopes::new(),
            errors: Vec::with_capacity(8),
            return_ty: Type::Untyped,
        }
    }

    pub fn check(mut self, declarations: &[Declaration]) -> (FunctionTable, Vec<Spanned<Error>>) {
        self.collect_functions(declarations);
        self.check_declarations(declarations);
        debug_assert_eq!(self.scopes.depth(), 0);
        (self.functions, self.errors)
    }

    /// Records the signature of every function in the `functions` table.
    fn collect_functions(&mut self, declarations: &[Declaration]) {
        for declaration in declarations {
            let Declaration::Function(function) = declaration else {
                continue;
            };
            let name = function.name.name;

            let previous = self.functions.get(&name).map(|previous| previous.span);
            if let Some(other_definition_span) = previous {
                let error = Error::DuplicateFunction {
                    name,
                    other_definition_span,
                };
                self.errors.push(function.name.span.wrap(error));
            }

            let mut seen: HashMap<Interned<str>, Span> = HashMap::with_capacity(function.params.len());
            for param in &function.params {
                if let Some(other_span) = seen.insert(param.name.name, param.name.span) {
                    let error = Error::DuplicateParameter {
                        name: param.name.name,
                        other_definition_span: other_span,
                    };
                    self.errors.push(param.name.span.wrap(error));
                }
            }
            // Only the first definition is recorded.
            if previous.is_some() {
                continue;
            }

            let params = function
                .params
                .iter()
                .map(|param| Param {
                    name: param.name.name,
                    ty: param.ty,
                })
                .collect();
            let symbol = FunctionSymbol {
                name,
                return_ty: function.return_ty,
                params,
                span: function.name.span,
            };
            self.functions.insert(name, symbol);
        }
    }

    /// Checks every declaration in source order. Global variables live in the
    /// root scope, so each function sees the globals declared before it.
    fn check_declarations(&mut self, declarations: &[Declaration]) {
        self.scoped(|c| {
            for declaration in declarations {
                match declaration {
                    Declaration::Function(function) => c.check_function(function),
                    Declaration::Variable(variable) => c.check_variable(variable),
                }
            }
        });
    }

    fn check_function(&mut self, function: &Function) {
        debug!(
            name = self.ident_interner.get(function.name),
            params = function.params.len(),
            "checking function"
        );
        self.return_ty = function.return_ty;

        // Parameters share the scope of the body's top-level statements.
        self.scoped(|c| {
            for param in &function.params {
                let binding = Binding {
                    ty: param.ty,
                    span: param.name.span,
                };
                // Duplicates were reported while collecting functions.
                c.scopes.redefine(param.name.name, binding);
            }
            c.check_stmts(&function.body.stmts);
        });
    }

    /// Checks a block inside of a new child scope.
    fn check_block(&mut self, stmts: &[Stmt]) {
        self.scoped(|c| c.check_stmts(stmts));
    }

    fn check_stmts(&mut self, stmts: &[Stmt]) {
        let first_unreachable = stmts
            .iter()
            .position(|stmt| matches!(stmt.kind, StmtKind::Return(_)))
            .map(|i| i + 1);

        for (i, stmt) in stmts.iter().enumerate() {
            if first_unreachable == Some(i) {
                self.errors.push(stmt.span.wrap(Error::UnreachableCode));
            }
            self.check_stmt(stmt);
        }
    }

    fn check_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Expr(expr) => {
                self.check_expr(expr);
            }
            StmtKind::Decl(variable) => self.check_variable(variable),
            StmtKind::Return(value) => self.check_return(stmt.span, value.as_ref()),
            StmtKind::If {
                condition,
                then_block,
                else_block,
            } => {
                self.check_expr(condition);
                self.check_block(&then_block.stmts);
                if let Some(else_block) = else_block {
                    self.check_block(&else_block.stmts);
                }
            }
            StmtKind::While { condition, body } => {
                self.check_expr(condition);
                self.check_block(&body.stmts);
            }
            StmtKind::For {
                init,
                condition,
                increment,
                body,
            } => self.scoped(|c| {
                match init {
                    Some(ForInit::Decl(variable)) => c.check_variable(variable),
                    Some(ForInit::Expr(expr)) => {
                        c.check_expr(expr);
                    }
                    None => {}
                }
                if let Some(condition) = condition {
                    c.check_expr(condition);
                }
                if let Some(increment) = increment {
                    c.check_expr(increment);
                }
                c.check_block(&body.stmts);
            }),
        }
    }

    fn check_variable(&mut self, variable: &Variable) {
        let Ident { name, span } = variable.ident.name;

        if let Some(existing) = self.scopes.lookup_current(name) {
            let error = Error::DuplicateVariable {
                name,
                other_definition_span: existing.span,
            };
            self.errors.push(span.wrap(error));
            return;
        }

        let declared = variable.ident.ty;
        let ty = match &variable.initializer {
            None => declared,
            Some(initializer) => {
                let actual = self.check_expr(initializer);
                if declared == Type::Untyped {
                    actual
                } else if declared.accepts(actual) {
                    declared
                } else {
                    let error = Error::Mismatch {
                        expected: declared,
                        actual,
                    };
                    self.errors.push(initializer.span.wrap(error));
                    Type::Error
                }
            }
        };

        let defined = self.scopes.define(name, Binding { ty, span });
        debug_assert!(defined.is_ok(), "checked above");
    }

    fn check_return(&mut self, span: Span, value: Option<&Expr>) {
        let expected = self.return_ty;
        match value {
            None => {
                if expected.is_concrete() {
                    let error = Error::MissingReturnValue { expected };
                    self.errors.push(span.wrap(error));
                }
            }
            Some(value) => {
                let actual = self.check_expr(value);
                if !expected.accepts(actual) {
                    let error = Error::ReturnMismatch { expected, actual };
                    self.errors.push(value.span.wrap(error));
                }
            }
        }
    }

    fn check_expr(&mut self, expr: &Expr) -> Type {
        match &expr.kind {
            ExprKind::Int(_) => Type::Int,
            ExprKind::String(_) => Type::String,
            ExprKind::Var(ident) => self.lookup_var(*ident),
            ExprKind::Binary { lhs, rhs, .. } => {
                let lhs = self.check_expr(lhs);
                let rhs = self.check_expr(rhs);
                lhs.unify(rhs).unwrap_or_else(|()| {
                    let error = Error::WrongConversion { lhs, rhs };
                    self.errors.push(expr.span.wrap(error));
                    Type::Error
                })
            }
            ExprKind::Assign { target, value } => {
                let expected = self.lookup_var(*target);
                let actual = self.check_expr(value);
                // An untyped target adopts the value's type for this
                // expression only; its binding is left as is.
                expected.unify(actual).unwrap_or_else(|()| {
                    let error = Error::Mismatch { expected, actual };
                    self.errors.push(value.span.wrap(error));
                    Type::Error
                })
            }
            ExprKind::Unary { op, operand } => self.check_unary(*op, operand),
            ExprKind::Call { callee, args } => self.check_call(expr.span, *callee, args),
        }
    }

    fn check_unary(&mut self, op: UnaryOperator, operand: &Expr) -> Type {
        let ty = self.check_expr(operand);

        if op.is_mutating() && !is_assignable(operand) {
            let error = if op.is_postfix() {
                Error::RvalueModification
            } else {
                Error::NotAssignable
            };
            self.errors.push(operand.span.wrap(error));
            return Type::Error;
        }

        match ty {
            Type::Int | Type::Untyped => Type::Int,
            Type::Error => Type::Error,
            Type::String => {
                let error = Error::InvalidUnaryOperand { op, actual: ty };
                self.errors.push(operand.span.wrap(error));
                Type::Error
            }
        }
    }

    fn check_call(&mut self, span: Span, callee: Ident, args: &[Expr]) -> Type {
        // Arguments are checked even if the call itself is invalid.
        let arg_types: Vec<_> = args.iter().map(|arg| self.check_expr(arg)).collect();

        let Some(symbol) = self.functions.get(&callee.name) else {
            let error = Error::UndefinedFunction(callee.name);
            self.errors.push(callee.span.wrap(error));
            return Type::Error;
        };

        let expected = symbol.params.len();
        let actual = args.len();
        if actual != expected {
            let error = if actual > expected {
                Error::TooManyArguments {
                    name: callee.name,
                    expected,
                    actual,
                }
            } else {
                Error::TooFewArguments {
                    name: callee.name,
                    expected,
                    actual,
                }
            };
            self.errors.push(span.wrap(error));
            return symbol.return_ty;
        }

        let mismatches = symbol
            .params
            .iter()
            .zip(args.iter().zip(arg_types))
            .enumerate()
            .filter(|(_, (param, (_, actual)))| !param.ty.accepts(*actual))
            .map(|(i, (param, (arg, actual)))| {
                let error = Error::ArgumentMismatch {
                    position: i + 1,
                    expected: param.ty,
                    actual,
                };
                arg.span.wrap(error)
            });
        self.errors.extend(mismatches);

        symbol.return_ty
    }

    fn lookup_var(&mut self, ident: Ident) -> Type {
        match self.scopes.lookup(ident.name) {
            Some(binding) => binding.ty,
            None => {
                let error = Error::UndefinedVariable(ident.name);
                self.errors.push(ident.span.wrap(error));
                Type::Error
            }
        }
    }

    /// Runs `f` inside of a new scope, which is always exited before
    /// returning.
    fn scoped<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.scopes.enter();
        let result = f(self);
        self.scopes.exit();
        result
    }
}

/// Whether the expression may be the operand of an increment or decrement.
fn is_assignable(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Var(_) => true,
        ExprKind::Unary { op, operand } => {
            op.is_postfix() && matches!(operand.kind, ExprKind::Var(_))
        }
        _ => false,
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    DuplicateFunction {
        name: Interned<str>,
        other_definition_span: Span,
    },
    DuplicateParameter {
        name: Interned<str>,
        other_definition_span: Span,
    },
    DuplicateVariable {
        name: Interned<str>,
        other_definition_span: Span,
    },
    UndefinedVariable(Interned<str>),
    UndefinedFunction(Interned<str>),
    Mismatch {
        expected: Type,
        actual: Type,
    },
    WrongConversion {
        lhs: Type,
        rhs: Type,
    },
    ReturnMismatch {
        expected: Type,
        actual: Type,
    },
    MissingReturnValue {
        expected: Type,
    },
    TooManyArguments {
        name: Interned<str>,
        expected: usize,
        actual: usize,
    },
    TooFewArguments {
        name: Interned<str>,
        expected: usize,
        actual: usize,
    },
    /// `position` is 1-based.
    ArgumentMismatch {
        position: usize,
        expected: Type,
        actual: Type,
    },
    InvalidUnaryOperand {
        op: UnaryOperator,
        actual: Type,
    },
    NotAssignable,
    RvalueModification,
    UnreachableCode,
}

impl Error {
    pub fn severity(&self) -> Severity {
        match self {
            Error::UnreachableCode => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// The location of a previous definition this error refers to, if any.
    pub fn related_span(&self) -> Option<Span> {
        match self {
            Error::DuplicateFunction {
                other_definition_span,
                ..
            }
            | Error::DuplicateParameter {
                other_definition_span,
                ..
            }
            | Error::DuplicateVariable {
                other_definition_span,
                ..
            } => Some(*other_definition_span),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{parser::test_utils::parse_program, util::test_utils::tree_tests};

    fn check(src: &str) -> (Interner<str>, FunctionTable, Vec<Spanned<Error>>) {
        let (i, prog) = parse_program(src);
        let (functions, errors) = Checker::new(&i).check(&prog);
        (i, functions, errors)
    }

    #[test]
    fn test_function_table() {
        let (i, functions, errors) = check("fn main(int a, string b): int { return a; }");
        assert!(errors.is_empty());

        let main = &functions[&i.lookup("main").unwrap()];
        assert_eq!(main.return_ty, Type::Int);
        let params: Vec<_> = main.params.iter().map(|p| (i.get(p.name), p.ty)).collect();
        assert_eq!(params, [("a", Type::Int), ("b", Type::String)]);
    }

    #[test]
    fn test_duplicate_parameter_is_still_recorded() {
        let (i, functions, errors) = check("fn f(int a, string a) { }");
        assert_eq!(errors.len(), 1);
        let f = &functions[&i.lookup("f").unwrap()];
        assert_eq!(f.params.len(), 2);
    }

    #[test]
    fn test_duplicate_function_keeps_first_definition() {
        let (i, functions, errors) = check("fn f(): int { return 1; } fn f() { }");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].inner.related_span(), Some(Span::new_of_bounds(3..4)));
        let f = &functions[&i.lookup("f").unwrap()];
        assert_eq!(f.return_ty, Type::Int);
    }

    #[test]
    fn test_scopes_are_balanced() {
        let (i, prog) = parse_program(
            "
            int g = 1;
            fn f(int n) {
                if (n) { int a = 1; } else { int a = 2; }
                while (n) { n--; }
                for (int k = 0; k < n; k++) { int b = k; }
            }
            fn h() { }
            ",
        );
        let mut checker = Checker::new(&i);
        checker.collect_functions(&prog);
        checker.check_declarations(&prog);
        assert!(checker.errors.is_empty());

        // global + 2 functions + then + else + while + for (loop + body)
        assert_eq!(checker.scopes.balance(), (8, 8));
        assert_eq!(checker.scopes.depth(), 0);
    }

    #[test]
    fn test_analyze_counts_and_flushes() {
        let (i, prog) = parse_program("fn f(): int { return x; return 1; }");
        let mut sink = Vec::new();
        let analysis = analyze(&i, &prog, &mut sink);

        assert_eq!(analysis.error_count, 1);
        assert_eq!(analysis.warning_count, 1);
        assert!(!analysis.is_ok());
        assert_eq!(sink[0].inner.severity(), Severity::Error);
        assert_eq!(sink[1].inner, Error::UnreachableCode);
    }

    tree_tests!(
        use checker;

        fn test_fn_def_simple() {
            let program = "fn main() {}";
            let tree_ok = "function main()";
        }

        fn test_fn_def_with_params() {
            let program = "fn main(int a, string b) {}";
            let tree_ok = "function main(a: int, b: string)";
        }

        fn test_fn_def_with_return_type() {
            let program = "fn main(): int { return 0; }";
            let tree_ok = "function main(): int";
        }

        fn test_multiple_functions() {
            let program = "fn a(): int { return 1; } fn b(): string { return \"b\"; } fn c() { a(); b(); }";
            let tree_ok = "
                function a(): int
                function b(): string
                function c()
            ";
        }

        fn test_fn_duplicate_definition() {
            let program = "fn main() {} fn main() {}";
            let expected_errors = &["16..20: function main already defined at 3..7"];
        }

        fn test_fn_duplicate_params() {
            let program = "fn main(int a, int a) {}";
            let expected_errors = &["19..20: parameter a already defined at 12..13"];
        }

        fn test_fn_duplicate_definition_still_checks_params() {
            let program = "fn f() {} fn f(int a, int a) {}";
            let expected_errors = &[
                "13..14: function f already defined at 3..4",
                "26..27: parameter a already defined at 19..20",
            ];
            let tree_error = "function f()";
        }

        fn test_var_decl_typed() {
            let program = "fn main() { int a = 5; string s = \"x\"; }";
            let expected_errors = &[];
        }

        fn test_var_decl_untyped() {
            let program = "fn main() { var a = 5; var b; int c = a; }";
            let expected_errors = &[];
        }

        fn test_var_redefinition() {
            let program = "fn main() { int a = 5; int a = 10; }";
            let expected_errors = &["27..28: variable a already defined at 16..17"];
        }

        fn test_var_redefinition_initializer_is_not_checked() {
            let program = "fn main() { int a = 5; int a = undefined; }";
            let expected_errors = &["27..28: variable a already defined at 16..17"];
        }

        fn test_var_undefined_use() {
            let program = "fn main() { int a = b; }";
            let expected_errors = &["20..21: variable b is not defined"];
        }

        fn test_var_typed_mismatch() {
            let program = "fn main() { int a = \"str\"; }";
            let expected_errors = &["20..25: type mismatch: expected int, but got string"];
        }

        fn test_binary_wrong_type() {
            let program = "fn main() { var a = 1 + \"test\"; }";
            let expected_errors = &["20..30: wrong type conversion between int and string"];
        }

        fn test_nested_binary_wrong_type() {
            let program = "fn main() { int a = 1 + 2 * (3 - \"x\"); }";
            let expected_errors = &["29..36: wrong type conversion between int and string"];
        }

        fn test_error_type_expression_usage() {
            let program = "fn main() { int a = \"x\"; int b = a + 1; string c = a; }";
            let expected_errors = &["20..23: type mismatch: expected int, but got string"];
        }

        fn test_return_correct_type() {
            let program = "fn main(): int { return 5; }";
            let expected_errors = &[];
        }

        fn test_return_wrong_type_int_string() {
            let program = "fn main(): string { return 5; }";
            let expected_errors = &["27..28: return type mismatch: expected string, but got int"];
        }

        fn test_return_wrong_type_string_int() {
            let program = "fn main(): int { return \"x\"; }";
            let expected_errors = &["24..27: return type mismatch: expected int, but got string"];
        }

        fn test_return_string_correct() {
            let program = "fn main(): string { return \"ok\"; }";
            let expected_errors = &[];
        }

        fn test_return_missing_value() {
            let program = "fn main(): int { return; }";
            let expected_errors = &["17..24: missing return value of type int"];
        }

        fn test_return_untyped_function_accepts_anything() {
            let program = "fn main() { return \"x\"; }";
            let expected_errors = &[];
        }

        fn test_scope_if_statement() {
            let program = "fn main(int n) { if (n > 0) { int a = n; } }";
            let expected_errors = &[];
        }

        fn test_scope_if_else() {
            let program = "fn main(int n) { if (n) { int a = 1; } else { int a = 2; } }";
            let expected_errors = &[];
        }

        fn test_scope_does_not_leak() {
            let program = "fn main(int n) { if (n) { int a = 1; } n = a; }";
            let expected_errors = &["43..44: variable a is not defined"];
        }

        fn test_scope_while_statement() {
            let program = "fn main() { int i = 0; while (i < 10) { int j = i; i++; } }";
            let expected_errors = &[];
        }

        fn test_scope_for_statement() {
            let program = "fn main() { for (int i = 0; i < 10; i++) { int j = i; } }";
            let expected_errors = &[];
        }

        fn test_scope_for_var_in_init() {
            let program = "fn main() { int s = 0; for (var i = 0; i < 3; ++i) { s = s + i; } }";
            let expected_errors = &[];
        }

        fn test_scope_for_var_not_visible_after_loop() {
            let program = "fn main() { for (int i = 0; ; ) { } i = 1; }";
            let expected_errors = &["36..37: variable i is not defined"];
        }

        fn test_shadowing_outer_scope_is_allowed() {
            let program = "fn main() { int a = 1; if (a) { string a = \"x\"; } }";
            let expected_errors = &[];
        }

        fn test_param_in_function_body() {
            let program = "fn main(int a): int { return a + 1; }";
            let expected_errors = &[];
        }

        fn test_param_redefinition_in_body() {
            let program = "fn main(int a) { int a = 1; }";
            let expected_errors = &["21..22: variable a already defined at 12..13"];
        }

        fn test_assign_expression() {
            let program = "fn main() { int a = 1; a = 2; var b; b = \"x\"; }";
            let expected_errors = &[];
        }

        fn test_assign_expression_type_mismatch() {
            let program = "fn main() { int a = 1; a = \"x\"; }";
            let expected_errors = &["27..30: type mismatch: expected int, but got string"];
        }

        fn test_assign_untyped_is_not_rebound() {
            let program = "fn main() { var a; a = 1; a = \"x\"; }";
            let expected_errors = &[];
        }

        fn test_global_variables() {
            let program = "int limit = 10; fn main(): int { return limit; }";
            let expected_errors = &[];
        }

        fn test_global_declared_after_function_is_not_visible() {
            let program = "fn main(): int { return later; } int later = 1;";
            let expected_errors = &["24..29: variable later is not defined"];
        }

        fn test_unary_operand_must_be_int() {
            let program = "fn main() { string s = \"x\"; var a = -s; }";
            let expected_errors = &["37..38: invalid operand of type string to unary -"];
        }

        fn test_unary_prefix_not_assignable() {
            let program = "fn main() { ++5; }";
            let expected_errors = &["14..15: expression is not assignable"];
        }

        fn test_unary_postfix_rvalue() {
            let program = "fn main() { int a = 1; (a + 1)++; }";
            let expected_errors = &["24..29: cannot modify rvalue"];
        }

        fn test_unary_on_postfix_lvalue() {
            let program = "fn main() { int a = 1; ++a++; }";
            let expected_errors = &[];
        }

        fn test_unary_error_operand_is_silent() {
            let program = "fn main() { var a = -missing; }";
            let expected_errors = &["21..28: variable missing is not defined"];
        }

        fn test_call_undefined_function() {
            let program = "fn main() { undefined(x); }";
            let expected_errors = &[
                "22..23: variable x is not defined",
                "12..21: function undefined is not defined",
            ];
        }

        fn test_call_too_many_arguments() {
            let program = "fn f(int a) { } fn main() { f(1, 2); }";
            let expected_errors = &["28..35: too many arguments to function f: expected 1, but got 2"];
        }

        fn test_call_too_few_arguments() {
            let program = "fn f(int a, int b) { } fn main() { f(1); }";
            let expected_errors = &["35..39: too few arguments to function f: expected 2, but got 1"];
        }

        fn test_call_argument_mismatch() {
            let program = "fn f(int a, string b) { } fn main() { f(1, 2); }";
            let expected_errors = &["43..44: argument 2 type mismatch: expected string, but got int"];
        }

        fn test_call_untyped_argument_and_parameter() {
            let program = "fn f(var a, int b) { } fn main() { var x; f(\"s\", x); }";
            let expected_errors = &[];
        }

        fn test_call_before_definition() {
            let program = "fn main(): int { return later(); } fn later(): int { return 1; }";
            let expected_errors = &[];
        }

        fn test_call_result_type() {
            let program = "fn s(): string { return \"s\"; } fn main() { int a = s(); }";
            let expected_errors = &["51..54: type mismatch: expected int, but got string"];
        }

        fn test_unreachable_code_warning() {
            let program = "fn main(): int { return 1; int a = 2; a = 3; }";
            let expected_errors = &["warning: 27..37: unreachable statement"];
        }
    );
}
