use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use anyhow::Context as _;
use clap::Parser;
use tracing::{debug, Level};

use cleaf::{
    hir, lexer, parser, semantic,
    util::{
        fmt::{report::Reporter, tree, Context},
        intern::Interner,
    },
};

mod emit;

use emit::Emit;

#[derive(Debug, Parser)]
#[command(version, about = "Compiles Cleaf programs into HIR")]
struct Args {
    /// The source file.
    input: PathBuf,

    #[arg(long, default_value_t = Emit::default())]
    emit: Emit,

    /// Logs compiler phases to stderr; repeat for more detail.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.verbose);

    let src = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read `{}`", args.input.display()))?;
    let file_name = args.input.display().to_string();
    let reporter = Reporter::new(&file_name, &src);

    let stdout = &mut io::stdout().lock();
    let stderr = &mut io::stderr().lock();

    if args.emit == Emit::Tokens {
        for token in lexer::lex_in_new(&src) {
            writeln!(stdout, "{token:?}")?;
        }
        return Ok(ExitCode::SUCCESS);
    }

    let mut tokens = Vec::with_capacity(lexer::SUGGESTED_TOKENS_CAPACITY);
    let mut idents = Interner::with_capacity(256);

    let declarations = match parser::parse_program(&src, &mut tokens, &mut idents) {
        Ok(declarations) => declarations,
        Err((_, errors)) => {
            let ctx = Context { ident_interner: &idents };
            for error in &errors {
                reporter.emit(stderr, &ctx, error)?;
            }
            return Ok(ExitCode::FAILURE);
        }
    };

    if !args.emit.needs_analysis() {
        tree::print_program(stdout, &idents, &declarations)?;
        return Ok(ExitCode::SUCCESS);
    }

    let mut diagnostics = Vec::new();
    let analysis = semantic::analyze(&idents, &declarations, &mut diagnostics);
    let ctx = Context { ident_interner: &idents };
    for diagnostic in &diagnostics {
        reporter.emit(stderr, &ctx, diagnostic)?;
    }
    if !analysis.is_ok() {
        writeln!(
            stderr,
            "{}: {} error(s), {} warning(s)",
            file_name, analysis.error_count, analysis.warning_count
        )?;
        return Ok(ExitCode::FAILURE);
    }

    let functions = hir::lower_program(&idents, &declarations)
        .with_context(|| format!("failed to lower `{file_name}`"))?;
    debug!(functions = functions.len(), "lowered program");
    for function in &functions {
        write!(stdout, "{function}")?;
    }

    Ok(ExitCode::SUCCESS)
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_target(false)
        .with_max_level(level)
        .init();
}
