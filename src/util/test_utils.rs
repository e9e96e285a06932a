use crate::{
    hir, parser, semantic,
    token::Spanned,
    util::{
        self,
        fmt::{report::Severity, tree, Show},
        intern::Interner,
    },
};

pub fn format_errors<E>(i: &Interner<str>, e: &[Spanned<E>]) -> Vec<String>
where
    Spanned<E>: Show,
{
    let ctx = util::fmt::Context { ident_interner: i };
    e.iter().map(|e| format!("{:#}", e.display(&ctx))).collect()
}

/// Like [`format_errors`], but marks warnings.
pub fn format_diagnostics(i: &Interner<str>, e: &[Spanned<semantic::Error>]) -> Vec<String> {
    let ctx = util::fmt::Context { ident_interner: i };
    e.iter()
        .map(|e| match e.inner.severity() {
            Severity::Warning => format!("warning: {:#}", e.display(&ctx)),
            _ => format!("{:#}", e.display(&ctx)),
        })
        .collect()
}

/// Each variant contains the input.
pub enum Test {
    ParserProgram(&'static str),
    ParserStmt(&'static str),
    ParserExpr(&'static str),
    /// The tree is the function table.
    CheckerProgram(&'static str),
    /// The tree is the rendered HIR of every function. Lowering only happens
    /// if the analysis found no errors.
    HirProgram(&'static str),
}

pub enum Assertion {
    TreeOk(&'static str),
    TreeError(&'static str),
    ExpectedErrors(&'static [&'static str]),
}

#[track_caller]
pub fn run_pipeline(test: Test) -> (String, Vec<String>) {
    let tokens_buf = &mut Vec::with_capacity(1024);
    let interner = &mut Interner::with_capacity(128);

    match test {
        Test::ParserProgram(input) => {
            let (prog, errors) = match parser::parse_program(input, tokens_buf, interner) {
                Ok(prog) => (prog, vec![]),
                Err((prog, errors)) => (prog, errors),
            };
            let tree = tree::print_program_string(interner, &prog);
            let errors = format_errors(interner, &errors);
            (tree, errors)
        }
        Test::ParserStmt(input) => match parser::parse_statement(input, tokens_buf, interner) {
            Ok(stmt) => (tree::print_stmt_string(interner, &stmt), vec![]),
            Err(error) => (String::new(), format_errors(interner, &[error])),
        },
        Test::ParserExpr(input) => match parser::parse_expr(input, tokens_buf, interner) {
            Ok(expr) => (tree::print_expr_string(interner, &expr), vec![]),
            Err(error) => (String::new(), format_errors(interner, &[error])),
        },
        Test::CheckerProgram(input) => {
            let (prog, errors) = match parser::parse_program(input, tokens_buf, interner) {
                Ok(prog) => (prog, vec![]),
                Err((prog, errors)) => (prog, errors),
            };
            let mut fmt_errors = format_errors(interner, &errors);

            let mut diagnostics = Vec::new();
            let analysis = semantic::analyze(interner, &prog, &mut diagnostics);
            let tree = tree::print_functions_string(interner, &analysis.functions);
            fmt_errors.extend(format_diagnostics(interner, &diagnostics));

            (tree, fmt_errors)
        }
        Test::HirProgram(input) => {
            let (prog, errors) = match parser::parse_program(input, tokens_buf, interner) {
                Ok(prog) => (prog, vec![]),
                Err((prog, errors)) => (prog, errors),
            };
            let mut fmt_errors = format_errors(interner, &errors);

            let mut diagnostics = Vec::new();
            let analysis = semantic::analyze(interner, &prog, &mut diagnostics);
            fmt_errors.extend(format_diagnostics(interner, &diagnostics));
            if !errors.is_empty() || !analysis.is_ok() {
                return (String::new(), fmt_errors);
            }

            let tree = match hir::lower_program(interner, &prog) {
                Ok(functions) => functions.iter().map(ToString::to_string).collect(),
                Err(error) => {
                    fmt_errors.push(error.to_string());
                    String::new()
                }
            };
            (tree, fmt_errors)
        }
    }
}

#[track_caller]
pub fn run_assertion(
    assertion: Assertion,
    formatted_actual_tree: &str,
    formatted_actual_errors: &[String],
) {
    match assertion {
        Assertion::TreeOk(expected_tree) => {
            let expected_errors: &[&str] = &[];
            ::pretty_assertions::assert_eq!(formatted_actual_errors, expected_errors);
            ::pretty_assertions::assert_eq!(formatted_actual_tree.trim(), expected_tree.trim());
        }
        Assertion::TreeError(expected_tree) => {
            ::pretty_assertions::assert_eq!(formatted_actual_tree.trim(), expected_tree.trim())
        }
        Assertion::ExpectedErrors(expected_errors) => {
            ::pretty_assertions::assert_eq!(formatted_actual_errors, expected_errors)
        }
    }
}

macro_rules! tree_tests {
    (
        use $test_kind:ident;

        $(
            fn $test_name:ident() {
                let $source_kind:ident = $source:expr;
                $($assertions_tt:tt)*
            }
        )*
    ) => {
        $(
            #[test]
            fn $test_name() {
                let test: crate::util::test_utils::Test =
                    tree_tests!(@@get_test($test_kind, $source_kind), $source);
                let (formatted_actual_tree, formatted_actual_errors) =
                    crate::util::test_utils::run_pipeline(test);
                let ctx = (&formatted_actual_tree, &formatted_actual_errors);
                tree_tests!(@@expand_assertions, ctx, [$($assertions_tt)*]);
            }
        )*
    };

    (@@expand_assertions, $ctx:expr, []) => {};
    (@@expand_assertions, $ctx:expr, [
        let $assertion:ident = $assertion_expected:expr;
        $($rest_assertions_tt:tt)*
    ]) => {
        crate::util::test_utils::run_assertion(
            tree_tests!(@@assertion, $assertion, $assertion_expected),
            $ctx.0,
            $ctx.1,
        );
        tree_tests!(@@expand_assertions, $ctx, [$($rest_assertions_tt)*]);
    };

    (@@assertion, tree_ok, $expected:expr) => {
        crate::util::test_utils::Assertion::TreeOk(::indoc::indoc! { $expected })
    };
    (@@assertion, tree_error, $expected:expr) => {
        crate::util::test_utils::Assertion::TreeError(::indoc::indoc! { $expected })
    };
    (@@assertion, expected_errors, $expected:expr) => {
        crate::util::test_utils::Assertion::ExpectedErrors($expected)
    };

    (@@get_test(parser, program), $source:expr) => {
        crate::util::test_utils::Test::ParserProgram($source)
    };
    (@@get_test(parser, stmt), $source:expr) => {
        crate::util::test_utils::Test::ParserStmt($source)
    };
    (@@get_test(parser, expr), $source:expr) => {
        crate::util::test_utils::Test::ParserExpr($source)
    };
    (@@get_test(checker, program), $source:expr) => {
        crate::util::test_utils::Test::CheckerProgram($source)
    };
    (@@get_test(hir, program), $source:expr) => {
        crate::util::test_utils::Test::HirProgram($source)
    };
}
pub(crate) use tree_tests;
