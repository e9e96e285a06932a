//! High-level intermediate representation: a linear list of three-address
//! instructions over numbered temporaries, one list per function.

use std::fmt;

use crate::{ast, types::Type};

mod lower;

pub use lower::{lower_function, lower_program, Error};

/// A write-once virtual register.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TempId(pub u32);

impl fmt::Display for TempId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Label(pub u32);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinaryOp {
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

impl BinaryOp {
    pub fn mnemonic(self) -> &'static str {
        match self {
            BinaryOp::Add => "ADD",
            BinaryOp::Sub => "SUB",
            BinaryOp::Mul => "MUL",
            BinaryOp::Div => "DIV",
            BinaryOp::Gt => "GT",
            BinaryOp::Ge => "GE",
            BinaryOp::Lt => "LT",
            BinaryOp::Le => "LE",
            BinaryOp::Eq => "EQ",
            BinaryOp::Ne => "NE",
        }
    }
}

impl From<ast::BinaryOperator> for BinaryOp {
    fn from(op: ast::BinaryOperator) -> Self {
        use ast::BinaryOperator as B;
        match op {
            B::Add => BinaryOp::Add,
            B::Sub => BinaryOp::Sub,
            B::Mul => BinaryOp::Mul,
            B::Div => BinaryOp::Div,
            B::Gt => BinaryOp::Gt,
            B::Ge => BinaryOp::Ge,
            B::Lt => BinaryOp::Lt,
            B::Le => BinaryOp::Le,
            B::Eq => BinaryOp::Eq,
            B::Ne => BinaryOp::Ne,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl UnaryOp {
    pub fn mnemonic(self) -> &'static str {
        match self {
            UnaryOp::Neg => "NEG",
            UnaryOp::Not => "NOT",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    IntConst {
        dest: TempId,
        value: i64,
    },
    StringConst {
        dest: TempId,
        value: Box<str>,
    },
    Binary {
        dest: TempId,
        op: BinaryOp,
        lhs: TempId,
        rhs: TempId,
    },
    Unary {
        dest: TempId,
        op: UnaryOp,
        operand: TempId,
    },
    LoadVar {
        dest: TempId,
        var: Box<str>,
    },
    StoreVar {
        var: Box<str>,
        src: TempId,
    },
    Call {
        dest: TempId,
        callee: Box<str>,
        args: Vec<TempId>,
    },
    Label(Label),
    Jump(Label),
    JumpIfFalse {
        condition: TempId,
        target: Label,
    },
    Return(Option<TempId>),
}

impl Instruction {
    /// The temporary written by this instruction, if any.
    pub fn dest(&self) -> Option<TempId> {
        match self {
            Instruction::IntConst { dest, .. }
            | Instruction::StringConst { dest, .. }
            | Instruction::Binary { dest, .. }
            | Instruction::Unary { dest, .. }
            | Instruction::LoadVar { dest, .. }
            | Instruction::Call { dest, .. } => Some(*dest),
            Instruction::StoreVar { .. }
            | Instruction::Label(_)
            | Instruction::Jump(_)
            | Instruction::JumpIfFalse { .. }
            | Instruction::Return(_) => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::IntConst { dest, value } => write!(f, "{dest} = INT_CONST {value}"),
            Instruction::StringConst { dest, value } => {
                write!(f, "{dest} = STRING_CONST {value:?}")
            }
            Instruction::Binary { dest, op, lhs, rhs } => {
                write!(f, "{dest} = {} {lhs} {rhs}", op.mnemonic())
            }
            Instruction::Unary { dest, op, operand } => {
                write!(f, "{dest} = {} {operand}", op.mnemonic())
            }
            Instruction::LoadVar { dest, var } => write!(f, "{dest} = LOAD_VAR {var}"),
            Instruction::StoreVar { var, src } => write!(f, "STORE_VAR {var} {src}"),
            Instruction::Call { dest, callee, args } => {
                write!(f, "{dest} = CALL {callee}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
            Instruction::Label(label) => write!(f, "{label}:"),
            Instruction::Jump(target) => write!(f, "JUMP {target}"),
            Instruction::JumpIfFalse { condition, target } => {
                write!(f, "JUMP_IF_FALSE {condition} {target}")
            }
            Instruction::Return(Some(value)) => write!(f, "RETURN {value}"),
            Instruction::Return(None) => f.write_str("RETURN"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HirFunction {
    pub name: Box<str>,
    pub return_ty: Type,
    /// Parameter names, as referenced by `LOAD_VAR`/`STORE_VAR`.
    pub params: Vec<(Box<str>, Type)>,
    pub instructions: Vec<Instruction>,
    /// Number of temporaries allocated, which are `t0` up to (excluding) this.
    pub temp_count: u32,
}

impl fmt::Display for HirFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Function {}", self.name)?;
        for instruction in &self.instructions {
            writeln!(f, "{instruction}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn instruction_rendering() {
        let t = TempId;
        let cases = [
            (Instruction::IntConst { dest: t(0), value: -3 }, "t0 = INT_CONST -3"),
            (
                Instruction::StringConst {
                    dest: t(1),
                    value: "a\"b\n".into(),
                },
                r#"t1 = STRING_CONST "a\"b\n""#,
            ),
            (
                Instruction::Binary {
                    dest: t(2),
                    op: BinaryOp::Ge,
                    lhs: t(0),
                    rhs: t(1),
                },
                "t2 = GE t0 t1",
            ),
            (
                Instruction::Unary {
                    dest: t(3),
                    op: UnaryOp::Not,
                    operand: t(2),
                },
                "t3 = NOT t2",
            ),
            (
                Instruction::LoadVar {
                    dest: t(4),
                    var: "x.1".into(),
                },
                "t4 = LOAD_VAR x.1",
            ),
            (
                Instruction::StoreVar {
                    var: "x".into(),
                    src: t(4),
                },
                "STORE_VAR x t4",
            ),
            (
                Instruction::Call {
                    dest: t(5),
                    callee: "f".into(),
                    args: vec![],
                },
                "t5 = CALL f()",
            ),
            (
                Instruction::Call {
                    dest: t(6),
                    callee: "g".into(),
                    args: vec![t(0), t(5)],
                },
                "t6 = CALL g(t0, t5)",
            ),
            (Instruction::Label(Label(2)), "L2:"),
            (Instruction::Jump(Label(2)), "JUMP L2"),
            (
                Instruction::JumpIfFalse {
                    condition: t(6),
                    target: Label(0),
                },
                "JUMP_IF_FALSE t6 L0",
            ),
            (Instruction::Return(Some(t(6))), "RETURN t6"),
            (Instruction::Return(None), "RETURN"),
        ];
        for (instruction, expected) in cases {
            assert_eq!(instruction.to_string(), expected);
        }
    }

    #[test]
    fn dest_of_instructions() {
        let load = Instruction::LoadVar {
            dest: TempId(7),
            var: "a".into(),
        };
        assert_eq!(load.dest(), Some(TempId(7)));
        assert_eq!(Instruction::Jump(Label(0)).dest(), None);
        assert_eq!(Instruction::Return(Some(TempId(1))).dest(), None);
    }
}
