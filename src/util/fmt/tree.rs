use std::io::Write;

use crate::{
    ast::*,
    semantic::{FunctionSymbol, FunctionTable},
    types::Type,
    util::intern::{Interned, Interner},
};

const INDENT_WIDTH: usize = 2;

pub fn print_program_string(idents: &Interner<str>, program: &[Declaration]) -> String {
    let mut buf = Vec::with_capacity(1024);
    print_program(&mut buf, idents, program).unwrap();
    String::from_utf8(buf).unwrap()
}

pub fn print_stmt_string(idents: &Interner<str>, stmt: &Stmt) -> String {
    let mut buf = Vec::with_capacity(512);
    print_stmt(&mut buf, idents, 0, stmt).unwrap();
    String::from_utf8(buf).unwrap()
}

pub fn print_expr_string(idents: &Interner<str>, expr: &Expr) -> String {
    let mut buf = Vec::with_capacity(512);
    print_expr(&mut buf, idents, 0, expr).unwrap();
    String::from_utf8(buf).unwrap()
}

pub fn print_functions_string(idents: &Interner<str>, functions: &FunctionTable) -> String {
    let mut buf = Vec::with_capacity(512);
    print_functions(&mut buf, idents, functions).unwrap();
    String::from_utf8(buf).unwrap()
}

pub fn print_program(
    w: &mut impl Write,
    idents: &Interner<str>,
    program: &[Declaration],
) -> std::io::Result<()> {
    for declaration in program {
        match declaration {
            Declaration::Function(function) => print_function(w, idents, 0, function)?,
            Declaration::Variable(variable) => {
                sp(w, 0)?;
                write!(w, "variable ")?;
                print_variable(w, idents, 0, variable)?;
            }
        }
    }
    Ok(())
}

/// Prints each function signature, in definition order.
pub fn print_functions(
    w: &mut impl Write,
    idents: &Interner<str>,
    functions: &FunctionTable,
) -> std::io::Result<()> {
    let mut symbols: Vec<&FunctionSymbol> = functions.values().collect();
    symbols.sort_by_key(|symbol| symbol.span.lo);
    for symbol in symbols {
        let params = symbol.params.iter().map(|param| (param.name, param.ty));
        print_signature(w, idents, symbol.name, params, symbol.return_ty)?;
        writeln!(w)?;
    }
    Ok(())
}

fn print_function(
    w: &mut impl Write,
    idents: &Interner<str>,
    i: usize,
    function: &Function,
) -> std::io::Result<()> {
    sp(w, i)?;
    let params = function.params.iter().map(|param| (param.name.name, param.ty));
    print_signature(w, idents, function.name.name, params, function.return_ty)?;
    writeln!(w)?;
    print_stmts(w, idents, i + 1, &function.body.stmts)
}

fn print_signature(
    w: &mut impl Write,
    idents: &Interner<str>,
    name: Interned<str>,
    params: impl Iterator<Item = (Interned<str>, Type)>,
    return_ty: Type,
) -> std::io::Result<()> {
    write!(w, "function {}(", idents.get(name))?;
    for (idx, (param, ty)) in params.enumerate() {
        if idx > 0 {
            write!(w, ", ")?;
        }
        write!(w, "{}: {ty}", idents.get(param))?;
    }
    write!(w, ")")?;
    if return_ty != Type::Untyped {
        write!(w, ": {return_ty}")?;
    }
    Ok(())
}

fn print_variable(
    w: &mut impl Write,
    idents: &Interner<str>,
    i: usize,
    variable: &Variable,
) -> std::io::Result<()> {
    let TypedIdent { name, ty } = &variable.ident;
    write!(w, "{}: {ty}", idents.get(name))?;
    if let Some(ref initializer) = variable.initializer {
        write!(w, " (initialized)")?;
        writeln!(w)?;
        print_expr(w, idents, i + 1, initializer)?;
    } else {
        writeln!(w)?;
    }
    Ok(())
}

fn print_stmts(
    w: &mut impl Write,
    idents: &Interner<str>,
    i: usize,
    stmts: &[Stmt],
) -> std::io::Result<()> {
    for stmt in stmts {
        print_stmt(w, idents, i, stmt)?;
    }
    Ok(())
}

/// Prints a labeled block, such as `then` or `do`.
fn print_block(
    w: &mut impl Write,
    idents: &Interner<str>,
    i: usize,
    label: &str,
    block: &Block,
) -> std::io::Result<()> {
    sp(w, i)?;
    writeln!(w, "{label}")?;
    print_stmts(w, idents, i + 1, &block.stmts)
}

pub fn print_stmt(
    w: &mut impl Write,
    idents: &Interner<str>,
    i: usize,
    stmt: &Stmt,
) -> std::io::Result<()> {
    match &stmt.kind {
        StmtKind::Expr(expr) => print_expr(w, idents, i, expr)?,
        StmtKind::Decl(variable) => {
            sp(w, i)?;
            write!(w, "decl ")?;
            print_variable(w, idents, i, variable)?;
        }
        StmtKind::Return(value) => {
            sp(w, i)?;
            writeln!(w, "return")?;
            if let Some(value) = value {
                print_expr(w, idents, i + 1, value)?;
            }
        }
        StmtKind::If {
            condition,
            then_block,
            else_block,
        } => {
            sp(w, i)?;
            writeln!(w, "if")?;
            print_expr(w, idents, i + 1, condition)?;
            print_block(w, idents, i + 1, "then", then_block)?;
            if let Some(else_block) = else_block {
                print_block(w, idents, i + 1, "else", else_block)?;
            }
        }
        StmtKind::While { condition, body } => {
            sp(w, i)?;
            writeln!(w, "while")?;
            print_expr(w, idents, i + 1, condition)?;
            print_block(w, idents, i + 1, "do", body)?;
        }
        StmtKind::For {
            init,
            condition,
            increment,
            body,
        } => {
            sp(w, i)?;
            writeln!(w, "for")?;
            if let Some(init) = init {
                sp(w, i + 1)?;
                writeln!(w, "init")?;
                match init {
                    ForInit::Decl(variable) => {
                        sp(w, i + 2)?;
                        write!(w, "decl ")?;
                        print_variable(w, idents, i + 2, variable)?;
                    }
                    ForInit::Expr(expr) => print_expr(w, idents, i + 2, expr)?,
                }
            }
            if let Some(condition) = condition {
                sp(w, i + 1)?;
                writeln!(w, "condition")?;
                print_expr(w, idents, i + 2, condition)?;
            }
            if let Some(increment) = increment {
                sp(w, i + 1)?;
                writeln!(w, "increment")?;
                print_expr(w, idents, i + 2, increment)?;
            }
            print_block(w, idents, i + 1, "do", body)?;
        }
    }
    Ok(())
}

pub fn print_expr(
    w: &mut impl Write,
    idents: &Interner<str>,
    i: usize,
    expr: &Expr,
) -> std::io::Result<()> {
    sp(w, i)?;
    let span = expr.span;
    match &expr.kind {
        ExprKind::Int(int) => writeln!(w, "int {int} ({span})")?,
        ExprKind::String(string) => writeln!(w, "string {string:?} ({span})")?,
        ExprKind::Var(ident) => writeln!(w, "ident {} ({span})", idents.get(ident))?,
        ExprKind::Binary { op, lhs, rhs } => {
            writeln!(w, "binary {op:?} ({span})")?;
            print_expr(w, idents, i + 1, lhs)?;
            print_expr(w, idents, i + 1, rhs)?;
        }
        ExprKind::Unary { op, operand } => {
            writeln!(w, "unary {op:?} ({span})")?;
            print_expr(w, idents, i + 1, operand)?;
        }
        ExprKind::Assign { target, value } => {
            writeln!(w, "assign {} ({span})", idents.get(target))?;
            print_expr(w, idents, i + 1, value)?;
        }
        ExprKind::Call { callee, args } => {
            writeln!(w, "call {} ({span})", idents.get(callee))?;
            for arg in args {
                print_expr(w, idents, i + 1, arg)?;
            }
        }
    }
    Ok(())
}

fn sp(w: &mut impl Write, i: usize) -> std::io::Result<()> {
    write!(w, "{:i$}", "", i = i * INDENT_WIDTH)
}
