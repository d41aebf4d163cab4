use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use draftxml_engine::parsing::strip::strip_text;
use draftxml_engine::{ParserOptions, RenderOptions, parse_draft, render_xml};
mod common;

fn bench_strip(c: &mut Criterion) {
    let mut group = c.benchmark_group("strip");
    let opts = ParserOptions::default();
    for sections in [10, 100] {
        let text = common::generate_draft(sections);
        group.bench_with_input(BenchmarkId::from_parameter(sections), &text, |b, text| {
            b.iter(|| strip_text(std::hint::black_box(text), &opts));
        });
    }
    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing");
    group.sample_size(10);
    for sections in [10, 100] {
        let text = common::generate_draft(sections);
        group.bench_with_input(BenchmarkId::from_parameter(sections), &text, |b, text| {
            b.iter(|| parse_draft("draft-smith-bench-generated-00.txt", std::hint::black_box(text)));
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let text = common::generate_draft(100);
    let Ok(parsed) = parse_draft("draft-smith-bench-generated-00.txt", &text) else {
        return;
    };
    let opts = RenderOptions::default();
    c.bench_function("render_xml", |b| {
        b.iter(|| render_xml(std::hint::black_box(&parsed.document), &opts));
    });
}

criterion_group!(benches, bench_strip, bench_parse, bench_render);
criterion_main!(benches);
