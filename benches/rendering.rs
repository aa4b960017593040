use criterion::{criterion_group, criterion_main, Criterion};
use std::path::Path;

use woof::config::RenderConfig;
use woof::parser::mime::MimeParser;
use woof::render::message::render_message;

fn fixture_bytes(name: &str) -> Vec<u8> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read(path).unwrap()
}

fn bench_parse_alternative(c: &mut Criterion) {
    let raw = fixture_bytes("alternative.eml");
    let parser = MimeParser::new("Archived-At".to_string());

    c.bench_function("parse_alternative", |b| b.iter(|| parser.parse(&raw)));
}

fn bench_render_fixtures(c: &mut Criterion) {
    let config = RenderConfig::default();
    let parser = MimeParser::new(config.archive_header.clone());
    let messages: Vec<_> = [
        "plain.eml",
        "alternative.eml",
        "mixed_attachment.eml",
        "latin1.eml",
        "forwarded.eml",
    ]
    .iter()
    .map(|name| parser.parse(&fixture_bytes(name)))
    .collect();

    c.bench_function("render_fixture_messages", |b| {
        b.iter(|| {
            messages
                .iter()
                .map(|m| render_message(m, &config).len())
                .sum::<usize>()
        })
    });
}

criterion_group!(benches, bench_parse_alternative, bench_render_fixtures);
criterion_main!(benches);
