use std::fmt::Write;

/// Builds a program with `functions` functions exercising every statement form.
pub fn generate_program(functions: usize) -> String {
    let mut src = String::with_capacity(functions * 256);
    src.push_str("int counter = 0;\nstring greeting = \"hello\\n\";\n\n");
    for n in 0..functions {
        writeln!(
            src,
            "fn f{n}(int a, int b): int {{\n\
            \x20 var total = a * {n} + b;\n\
            \x20 for (int i = 0; i < b; i++) {{\n\
            \x20   if (i == a) {{ total = total - i; }} else if (i != b) {{ total++; }}\n\
            \x20 }}\n\
            \x20 while (total > 100) {{ total = total / 2; }}\n\
            \x20 // keep the counter in sync\n\
            \x20 counter = counter + 1;\n\
            \x20 return -total;\n\
            }}\n"
        )
        .unwrap();
    }
    src
}
