use bench::generate_program;
use cleaf::{
    lexer::SUGGESTED_TOKENS_CAPACITY, parser::parse_program, token::Token,
    util::intern::Interner,
};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

fn parser(input: &str, tokens: &mut Vec<Token>, idents: &mut Interner<str>) {
    let program = parse_program(input, tokens, idents).unwrap();
    _ = black_box(program);
}

fn criterion_benchmark(c: &mut Criterion) {
    let input = generate_program(2_000);
    let mut tokens = Vec::with_capacity(SUGGESTED_TOKENS_CAPACITY * 16);
    let mut idents = Interner::with_capacity(4_096);

    c.bench_function("parser", |b| {
        b.iter(|| {
            tokens.clear();
            parser(black_box(&input), &mut tokens, &mut idents);
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
