use std::path::Path;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use examkit_core::model::Exam;
use examkit_core::parser::{parse_exam_str, validate_exam};

const SMALL: &str = r#"
[exam]
id = "small"
title = "Small"
duration_minutes = 10

[[sections]]
name = "Only"
negative_marking = 0.25

[[sections.questions]]
text = "2 + 2?"
options = ["3", "4", "5"]
correct_answer = 1
"#;

fn large_exam_toml(sections: usize, per_section: usize) -> String {
    let mut s = String::from(
        "[exam]\nid = \"large\"\ntitle = \"Large\"\nduration_minutes = 180\ndefault_weightage = 2.0\n",
    );
    for sec in 0..sections {
        s.push_str(&format!(
            "\n[[sections]]\nname = \"Section {sec}\"\nnegative_marking = 0.5\n"
        ));
        for q in 0..per_section {
            s.push_str(&format!(
                "\n[[sections.questions]]\nid = \"s{sec}q{q}\"\ntext = \"Question {q}\"\noptions = [\"a\", \"b\", \"c\", \"d\"]\ncorrect_answer = {}\n",
                q % 4
            ));
        }
    }
    s
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_exam");
    let path = Path::new("bench.toml");
    let large = large_exam_toml(4, 50);

    group.bench_function("small_toml", |b| {
        b.iter(|| parse_exam_str(black_box(SMALL), path))
    });

    group.bench_function("4x50_toml", |b| {
        b.iter(|| parse_exam_str(black_box(&large), path))
    });

    let exam = parse_exam_str(&large, path).unwrap();
    let json = serde_json::to_string(&exam).unwrap();
    group.bench_function("4x50_json", |b| {
        b.iter(|| serde_json::from_str::<Exam>(black_box(&json)))
    });

    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let exam = parse_exam_str(&large_exam_toml(10, 100), Path::new("bench.toml")).unwrap();
    c.bench_function("validate_10x100", |b| b.iter(|| validate_exam(black_box(&exam))));
}

criterion_group!(benches, bench_parse, bench_validate);
criterion_main!(benches);
