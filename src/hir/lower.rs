use std::collections::HashMap;

use tracing::debug;

use super::{BinaryOp, HirFunction, Instruction, Label, TempId, UnaryOp};
use crate::{
    ast::{
        Declaration, Expr, ExprKind, ForInit, Function, Ident, Stmt, StmtKind, UnaryOperator,
        Variable,
    },
    token::Span,
    util::intern::{Interned, Interner},
};

type Result<T, E = Error> = std::result::Result<T, E>;

/// Faults found while lowering. Programs which passed analysis never produce
/// these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("declaration at {0} is not a function")]
    NotAFunction(Span),
    #[error("expression at {0} is not assignable")]
    NotAssignable(Span),
    #[error("function {function} ran out of temporaries")]
    TemporariesExhausted { function: Box<str> },
}

/// Lowers every function of the program, in source order. Global variables
/// are skipped.
pub fn lower_program(
    ident_interner: &Interner<str>,
    declarations: &[Declaration],
) -> Result<Vec<HirFunction>> {
    let globals: Vec<Interned<str>> = declarations
        .iter()
        .filter_map(|declaration| match declaration {
            Declaration::Variable(variable) => Some(variable.ident.name.name),
            Declaration::Function(_) => None,
        })
        .collect();
    declarations
        .iter()
        .filter(|declaration| matches!(declaration, Declaration::Function(_)))
        .map(|declaration| lower_declaration(ident_interner, &globals, declaration))
        .collect()
}

/// Lowers a single analyzed function, as if the program declared no globals.
pub fn lower_function(
    ident_interner: &Interner<str>,
    declaration: &Declaration,
) -> Result<HirFunction> {
    lower_declaration(ident_interner, &[], declaration)
}

/// Locals named after one of `globals` are renamed, so they never share a HIR
/// name with the global.
fn lower_declaration(
    ident_interner: &Interner<str>,
    globals: &[Interned<str>],
    declaration: &Declaration,
) -> Result<HirFunction> {
    let Declaration::Function(function) = declaration else {
        return Err(Error::NotAFunction(declaration.span()));
    };
    Lowerer::new(ident_interner, globals, function).lower(function)
}

struct Lowerer<'ident> {
    ident_interner: &'ident Interner<str>,
    name: Box<str>,
    instructions: Vec<Instruction>,
    next_temp: u32,
    next_label: u32,
    /// HIR names of the visible local bindings; the innermost scope is last.
    scopes: Vec<HashMap<Interned<str>, Box<str>>>,
    /// How many times each name was declared so far, globals included.
    declared: HashMap<Interned<str>, u32>,
}

impl<'ident> Lowerer<'ident> {
    fn new(
        ident_interner: &'ident Interner<str>,
        globals: &[Interned<str>],
        function: &Function,
    ) -> Lowerer<'ident> {
        Lowerer {
            ident_interner,
            name: ident_interner.get(function.name).into(),
            instructions: Vec::with_capacity(32),
            next_temp: 0,
            next_label: 0,
            scopes: Vec::with_capacity(4),
            // A global owns the bare name.
            declared: globals.iter().map(|&name| (name, 1)).collect(),
        }
    }

    fn lower(mut self, function: &Function) -> Result<HirFunction> {
        let params = self.scoped(|l| {
            let params: Vec<_> = function
                .params
                .iter()
                .map(|param| (l.declare(param.name.name), param.ty))
                .collect();
            l.lower_stmts(&function.body.stmts)?;
            Ok(params)
        })?;

        debug!(
            function = &*self.name,
            instructions = self.instructions.len(),
            temps = self.next_temp,
            "lowered function"
        );
        Ok(HirFunction {
            name: self.name,
            return_ty: function.return_ty,
            params,
            instructions: self.instructions,
            temp_count: self.next_temp,
        })
    }

    fn lower_stmts(&mut self, stmts: &[Stmt]) -> Result<()> {
        stmts.iter().try_for_each(|stmt| self.lower_stmt(stmt))
    }

    /// Lowers a block inside of a new scope.
    fn lower_block(&mut self, stmts: &[Stmt]) -> Result<()> {
        self.scoped(|l| l.lower_stmts(stmts))
    }

    fn lower_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match &stmt.kind {
            StmtKind::Expr(expr) => {
                self.lower_expr(expr)?;
            }
            StmtKind::Decl(variable) => self.lower_variable(variable)?,
            StmtKind::Return(value) => {
                let value = value.as_ref().map(|v| self.lower_expr(v)).transpose()?;
                self.emit(Instruction::Return(value));
            }
            StmtKind::If {
                condition,
                then_block,
                else_block: None,
            } => {
                let condition = self.lower_expr(condition)?;
                let end = self.label();
                self.emit(Instruction::JumpIfFalse {
                    condition,
                    target: end,
                });
                self.lower_block(&then_block.stmts)?;
                self.emit(Instruction::Label(end));
            }
            StmtKind::If {
                condition,
                then_block,
                else_block: Some(else_block),
            } => {
                let condition = self.lower_expr(condition)?;
                let otherwise = self.label();
                let end = self.label();
                self.emit(Instruction::JumpIfFalse {
                    condition,
                    target: otherwise,
                });
                self.lower_block(&then_block.stmts)?;
                self.emit(Instruction::Jump(end));
                self.emit(Instruction::Label(otherwise));
                self.lower_block(&else_block.stmts)?;
                self.emit(Instruction::Label(end));
            }
            StmtKind::While { condition, body } => {
                self.lower_loop(Some(condition), None, &body.stmts)?;
            }
            StmtKind::For {
                init,
                condition,
                increment,
                body,
            } => self.scoped(|l| {
                match init {
                    Some(ForInit::Decl(variable)) => l.lower_variable(variable)?,
                    Some(ForInit::Expr(expr)) => {
                        l.lower_expr(expr)?;
                    }
                    None => {}
                }
                l.lower_loop(condition.as_ref(), increment.as_ref(), &body.stmts)
            })?,
        }
        Ok(())
    }

    /// Emits `start: [condition; JUMP_IF_FALSE end] body [increment] JUMP start; end:`.
    fn lower_loop(
        &mut self,
        condition: Option<&Expr>,
        increment: Option<&Expr>,
        body: &[Stmt],
    ) -> Result<()> {
        let start = self.label();
        let end = self.label();

        self.emit(Instruction::Label(start));
        if let Some(condition) = condition {
            let condition = self.lower_expr(condition)?;
            self.emit(Instruction::JumpIfFalse {
                condition,
                target: end,
            });
        }
        self.lower_block(body)?;
        if let Some(increment) = increment {
            self.lower_expr(increment)?;
        }
        self.emit(Instruction::Jump(start));
        self.emit(Instruction::Label(end));
        Ok(())
    }

    fn lower_variable(&mut self, variable: &Variable) -> Result<()> {
        // The initializer can't see the variable it initializes.
        let value = variable
            .initializer
            .as_ref()
            .map(|init| self.lower_expr(init))
            .transpose()?;
        let var = self.declare(variable.ident.name.name);
        if let Some(src) = value {
            self.emit(Instruction::StoreVar { var, src });
        }
        Ok(())
    }

    fn lower_expr(&mut self, expr: &Expr) -> Result<TempId> {
        match &expr.kind {
            ExprKind::Int(value) => {
                let value = *value;
                self.emit_with_dest(|dest| Instruction::IntConst { dest, value })
            }
            ExprKind::String(value) => {
                let value = value.clone();
                self.emit_with_dest(|dest| Instruction::StringConst { dest, value })
            }
            ExprKind::Var(ident) => {
                let var = self.resolve(ident.name);
                self.emit_with_dest(|dest| Instruction::LoadVar { dest, var })
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let lhs = self.lower_expr(lhs)?;
                let rhs = self.lower_expr(rhs)?;
                let op = BinaryOp::from(*op);
                self.emit_with_dest(|dest| Instruction::Binary { dest, op, lhs, rhs })
            }
            ExprKind::Assign { target, value } => {
                let src = self.lower_expr(value)?;
                let var = self.resolve(target.name);
                self.emit(Instruction::StoreVar { var, src });
                Ok(src)
            }
            ExprKind::Unary { op, operand } => self.lower_unary(*op, operand),
            ExprKind::Call { callee, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.lower_expr(arg))
                    .collect::<Result<Vec<_>>>()?;
                let callee: Box<str> = self.ident_interner.get(callee).into();
                self.emit_with_dest(|dest| Instruction::Call { dest, callee, args })
            }
        }
    }

    fn lower_unary(&mut self, op: UnaryOperator, operand: &Expr) -> Result<TempId> {
        let step = match op {
            UnaryOperator::Negate | UnaryOperator::Not => {
                let operand = self.lower_expr(operand)?;
                let op = match op {
                    UnaryOperator::Negate => UnaryOp::Neg,
                    _ => UnaryOp::Not,
                };
                return self.emit_with_dest(|dest| Instruction::Unary { dest, op, operand });
            }
            UnaryOperator::PreInc | UnaryOperator::PostInc => BinaryOp::Add,
            UnaryOperator::PreDec | UnaryOperator::PostDec => BinaryOp::Sub,
        };

        // x++ => old = LOAD_VAR x; one = INT_CONST 1; new = ADD old one; STORE_VAR x new
        let target = self.assignable_target(operand)?;
        let var = self.resolve(target.name);
        let old = self.emit_with_dest(|dest| Instruction::LoadVar {
            dest,
            var: var.clone(),
        })?;
        let one = self.emit_with_dest(|dest| Instruction::IntConst { dest, value: 1 })?;
        let new = self.emit_with_dest(|dest| Instruction::Binary {
            dest,
            op: step,
            lhs: old,
            rhs: one,
        })?;
        self.emit(Instruction::StoreVar { var, src: new });

        Ok(if op.is_postfix() { old } else { new })
    }

    /// Returns the variable updated by an increment or decrement of `operand`.
    /// A postfix operand is lowered first, so its own update happens before.
    fn assignable_target(&mut self, operand: &Expr) -> Result<Ident> {
        match &operand.kind {
            ExprKind::Var(ident) => Ok(*ident),
            ExprKind::Unary { op, operand: inner } if op.is_postfix() => {
                let ExprKind::Var(ident) = inner.kind else {
                    return Err(Error::NotAssignable(operand.span));
                };
                self.lower_expr(operand)?;
                Ok(ident)
            }
            _ => Err(Error::NotAssignable(operand.span)),
        }
    }

    /// Binds `name` in the innermost scope, returning its unique HIR name.
    /// The first local declaration of a name keeps it unless a global took it;
    /// later ones get a `.N` suffix.
    fn declare(&mut self, name: Interned<str>) -> Box<str> {
        let count = self.declared.entry(name).or_insert(0);
        let source_name = self.ident_interner.get(name);
        let hir_name: Box<str> = if *count == 0 {
            source_name.into()
        } else {
            format!("{source_name}.{count}").into()
        };
        *count += 1;

        self.scopes
            .last_mut()
            .expect("must declare inside of a scope")
            .insert(name, hir_name.clone());
        hir_name
    }

    /// Names not bound locally refer to globals, which keep their source name.
    fn resolve(&self, name: Interned<str>) -> Box<str> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(&name))
            .cloned()
            .unwrap_or_else(|| self.ident_interner.get(name).into())
    }

    fn scoped<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.scopes.push(HashMap::new());
        let result = f(self);
        self.scopes.pop();
        result
    }

    fn emit(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    fn emit_with_dest(&mut self, f: impl FnOnce(TempId) -> Instruction) -> Result<TempId> {
        let dest = self.temp()?;
        self.emit(f(dest));
        Ok(dest)
    }

    fn temp(&mut self) -> Result<TempId> {
        let id = self.next_temp;
        self.next_temp = id
            .checked_add(1)
            .ok_or_else(|| Error::TemporariesExhausted {
                function: self.name.clone(),
            })?;
        Ok(TempId(id))
    }

    fn label(&mut self) -> Label {
        let label = Label(self.next_label);
        self.next_label += 1;
        label
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{parser::test_utils::parse_program, types::Type, util::test_utils::tree_tests};

    #[test]
    fn test_lowering_a_variable_fails() {
        let (i, prog) = parse_program("int x = 1;");
        assert_eq!(
            lower_function(&i, &prog[0]),
            Err(Error::NotAFunction(Span::new_of_bounds(0..9)))
        );
    }

    #[test]
    fn test_temps_are_increasing_and_unique() {
        let (i, prog) = parse_program(
            "fn f(int n): int { int s = 0; for (int k = 0; k < n; k++) { s = s + k * 2; } return s; }",
        );
        let f = lower_function(&i, &prog[0]).unwrap();

        let dests: Vec<u32> = f
            .instructions
            .iter()
            .filter_map(Instruction::dest)
            .map(|t| t.0)
            .collect();
        let expected: Vec<u32> = (0..f.temp_count).collect();
        assert_eq!(dests, expected);
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let (i, prog) = parse_program("fn f(int a): int { if (a) { return -a; } return a--; }");
        let f = lower_function(&i, &prog[0]).unwrap();
        assert_eq!(f.to_string(), f.to_string());
    }

    #[test]
    fn test_params_are_recorded() {
        let (i, prog) = parse_program("fn f(int a, string b): int { return a; }");
        let f = lower_function(&i, &prog[0]).unwrap();
        let expected: Vec<(Box<str>, Type)> = vec![("a".into(), Type::Int), ("b".into(), Type::String)];
        assert_eq!(f.params, expected);
    }

    tree_tests!(
        use hir;

        fn test_empty_function() {
            let program = "fn main() {}";
            let tree_ok = "Function main";
        }

        fn test_return_binary() {
            let program = "fn f(): int { return 1 + 2; }";
            let tree_ok = "
                Function f
                t0 = INT_CONST 1
                t1 = INT_CONST 2
                t2 = ADD t0 t1
                RETURN t2
            ";
        }

        fn test_precedence_order() {
            let program = "fn f(): int { return 1 + 2 * 3; }";
            let tree_ok = "
                Function f
                t0 = INT_CONST 1
                t1 = INT_CONST 2
                t2 = INT_CONST 3
                t3 = MUL t1 t2
                t4 = ADD t0 t3
                RETURN t4
            ";
        }

        fn test_variables() {
            let program = "fn f(int a): int { int b = a * 2; b = b + 1; return b; }";
            let tree_ok = "
                Function f
                t0 = LOAD_VAR a
                t1 = INT_CONST 2
                t2 = MUL t0 t1
                STORE_VAR b t2
                t3 = LOAD_VAR b
                t4 = INT_CONST 1
                t5 = ADD t3 t4
                STORE_VAR b t5
                t6 = LOAD_VAR b
                RETURN t6
            ";
        }

        fn test_increment_and_decrement() {
            let program = "fn f() { int i = 0; int j = i++; j = --i; }";
            let tree_ok = "
                Function f
                t0 = INT_CONST 0
                STORE_VAR i t0
                t1 = LOAD_VAR i
                t2 = INT_CONST 1
                t3 = ADD t1 t2
                STORE_VAR i t3
                STORE_VAR j t1
                t4 = LOAD_VAR i
                t5 = INT_CONST 1
                t6 = SUB t4 t5
                STORE_VAR i t6
                STORE_VAR j t6
            ";
        }

        fn test_negate_and_not() {
            let program = "fn f(int a): int { return -a + !a; }";
            let tree_ok = "
                Function f
                t0 = LOAD_VAR a
                t1 = NEG t0
                t2 = LOAD_VAR a
                t3 = NOT t2
                t4 = ADD t1 t3
                RETURN t4
            ";
        }

        fn test_if_else() {
            let program = "fn f(int a) { if (a > 0) { a = 1; } else { a = 2; } }";
            let tree_ok = "
                Function f
                t0 = LOAD_VAR a
                t1 = INT_CONST 0
                t2 = GT t0 t1
                JUMP_IF_FALSE t2 L0
                t3 = INT_CONST 1
                STORE_VAR a t3
                JUMP L1
                L0:
                t4 = INT_CONST 2
                STORE_VAR a t4
                L1:
            ";
        }

        fn test_if_without_else() {
            let program = "fn f(int a) { if (a) { return; } }";
            let tree_ok = "
                Function f
                t0 = LOAD_VAR a
                JUMP_IF_FALSE t0 L0
                RETURN
                L0:
            ";
        }

        fn test_while() {
            let program = "fn f(int n) { while (n > 0) { n--; } }";
            let tree_ok = "
                Function f
                L0:
                t0 = LOAD_VAR n
                t1 = INT_CONST 0
                t2 = GT t0 t1
                JUMP_IF_FALSE t2 L1
                t3 = LOAD_VAR n
                t4 = INT_CONST 1
                t5 = SUB t3 t4
                STORE_VAR n t5
                JUMP L0
                L1:
            ";
        }

        fn test_for() {
            let program = "fn f(): int { int s = 0; for (int i = 0; i < 3; i++) { s = s + i; } return s; }";
            let tree_ok = "
                Function f
                t0 = INT_CONST 0
                STORE_VAR s t0
                t1 = INT_CONST 0
                STORE_VAR i t1
                L0:
                t2 = LOAD_VAR i
                t3 = INT_CONST 3
                t4 = LT t2 t3
                JUMP_IF_FALSE t4 L1
                t5 = LOAD_VAR s
                t6 = LOAD_VAR i
                t7 = ADD t5 t6
                STORE_VAR s t7
                t8 = LOAD_VAR i
                t9 = INT_CONST 1
                t10 = ADD t8 t9
                STORE_VAR i t10
                JUMP L0
                L1:
                t11 = LOAD_VAR s
                RETURN t11
            ";
        }

        fn test_for_without_clauses() {
            let program = "fn f() { for (;;) { return; } }";
            let tree_ok = "
                Function f
                L0:
                RETURN
                JUMP L0
                L1:
            ";
        }

        fn test_calls_and_strings() {
            let program = r#"fn g(int a, string b): int { return a; } fn f() { g(1, "x"); }"#;
            let tree_ok = r#"
                Function g
                t0 = LOAD_VAR a
                RETURN t0
                Function f
                t0 = INT_CONST 1
                t1 = STRING_CONST "x"
                t2 = CALL g(t0, t1)
            "#;
        }

        fn test_shadowed_names_are_unique() {
            let program = "fn f() { int x = 1; if (x) { int x = 2; x = 3; } x = 4; }";
            let tree_ok = "
                Function f
                t0 = INT_CONST 1
                STORE_VAR x t0
                t1 = LOAD_VAR x
                JUMP_IF_FALSE t1 L0
                t2 = INT_CONST 2
                STORE_VAR x.1 t2
                t3 = INT_CONST 3
                STORE_VAR x.1 t3
                L0:
                t4 = INT_CONST 4
                STORE_VAR x t4
            ";
        }

        fn test_globals_and_uninitialized_locals() {
            let program = "int g = 1; fn f() { var x; x = g; }";
            let tree_ok = "
                Function f
                t0 = LOAD_VAR g
                STORE_VAR x t0
            ";
        }

        fn test_local_shadowing_global_is_renamed() {
            let program = "int g = 1; fn f(): int { g = 2; int g = 3; g = 4; return g; }";
            let tree_ok = "
                Function f
                t0 = INT_CONST 2
                STORE_VAR g t0
                t1 = INT_CONST 3
                STORE_VAR g.1 t1
                t2 = INT_CONST 4
                STORE_VAR g.1 t2
                t3 = LOAD_VAR g.1
                RETURN t3
            ";
        }

        fn test_param_shadowing_global_is_renamed() {
            let program = "fn f(int g): int { return g; } int g = 1; fn h(): int { return g; }";
            let tree_ok = "
                Function f
                t0 = LOAD_VAR g.1
                RETURN t0
                Function h
                t0 = LOAD_VAR g
                RETURN t0
            ";
        }

        fn test_analysis_errors_skip_lowering() {
            let program = "fn f() { return x; }";
            let expected_errors = &["16..17: variable x is not defined"];
        }
    );
}
