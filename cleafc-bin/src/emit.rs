/// The representation printed once compilation succeeds.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
#[clap(rename_all = "snake_case")]
pub enum Emit {
    /// The lexed tokens, trivia included.
    Tokens,
    /// The parsed syntax tree.
    Ast,
    /// The lowered instructions of every function.
    #[default]
    Hir,
}

impl std::fmt::Display for Emit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Emit::Tokens => "tokens",
            Emit::Ast => "ast",
            Emit::Hir => "hir",
        })
    }
}

impl Emit {
    /// Whether the program must be analyzed before emitting.
    pub const fn needs_analysis(self) -> bool {
        matches!(self, Emit::Hir)
    }
}
