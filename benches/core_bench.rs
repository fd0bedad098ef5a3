//! Benchmarks for postforge core operations.
//!
//! Run with: cargo bench
//!
//! Results include 95% confidence intervals via Criterion.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use postforge::core::geometry::{Frame, Vec3};
use postforge::core::model::Instruction;
use postforge::core::orchestrator::{generate, GenerationRequest};
use postforge::core::parser::parse_job;
use postforge::core::pose::PoseResolver;
use postforge::core::splitter::{plan, LoadSchedule, SizeLimits};
use postforge::core::types::{Manufacturer, ProgramItem, Target};
use postforge::emitters::target::NativeFormatter;
use postforge::emitters::EmitOptions;
use postforge::provenance::hasher;

fn instructions(n: usize) -> Vec<Instruction> {
    (0..n)
        .map(|i| Instruction::new(format!("MoveL p{i}, v100, z5, tool0;"), Manufacturer::Abb))
        .collect()
}

fn bench_split_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("split_plan");
    for n in [4_999, 20_000, 100_000] {
        let input = instructions(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &input, |b, input| {
            b.iter(|| {
                let p = plan(black_box(input.clone()), &SizeLimits::default(), false);
                black_box(p);
            });
        });
    }
    group.finish();
}

fn bench_load_schedule(c: &mut Criterion) {
    let mut group = c.benchmark_group("load_schedule");
    for m in [2, 20, 200] {
        group.bench_with_input(BenchmarkId::from_parameter(m), &m, |b, &m| {
            b.iter(|| black_box(LoadSchedule::build(black_box(m))));
        });
    }
    group.finish();
}

fn bench_pose_resolve(c: &mut Criterion) {
    let resolver = PoseResolver::default();
    let frames: Vec<Frame> = (0..1000)
        .map(|i| {
            let t = f64::from(i) * 0.01;
            Frame::new(
                Vec3::new(t * 10.0, t * 5.0, 20.0),
                Vec3::new(t.cos(), t.sin(), 0.0),
                Vec3::new(-t.sin(), t.cos(), 0.0),
            )
        })
        .collect();

    c.bench_function("pose_resolve_path_1000", |b| {
        b.iter(|| black_box(resolver.resolve_path(black_box(&frames))));
    });
}

fn bench_generate_rapid(c: &mut Criterion) {
    let mut job = parse_job(
        r#"
version: "1.0"
name: bench
options:
  manufacturer: abb
"#,
    )
    .unwrap();
    job.program = (0..6_000)
        .map(|i| {
            ProgramItem::Target(Target {
                frame: Frame::world_xy(Vec3::new(f64::from(i), 0.0, 400.0)),
                ..Target::default()
            })
        })
        .collect();
    let opts = EmitOptions::at("2026-10-19T00:00:00Z");

    c.bench_function("generate_rapid_6000", |b| {
        b.iter(|| {
            let request = GenerationRequest::from_job(black_box(&job));
            black_box(generate(&request, &NativeFormatter, &opts).unwrap());
        });
    });
}

fn bench_stable_hash(c: &mut Criterion) {
    let lines: Vec<String> = (0..10_000).map(|i| format!("  MoveL p{i};")).collect();
    c.bench_function("stable_hash_10k_lines", |b| {
        b.iter(|| black_box(hasher::stable_hash(black_box(&lines))));
    });
}

fn bench_yaml_parse(c: &mut Criterion) {
    let yaml = r#"
version: "1.0"
name: bench-job
options:
  manufacturer: kuka
  module_name: Weld01
declarations:
  - "DECL E6POS pStart"
program:
  - comment: approach
  - target:
      motion: joint
      frame: { origin: [500, 0, 400] }
      speed: { tcp: 200 }
      zone: { distance: 10 }
  - target:
      frame:
        origin: [500, 100, 400]
        x_axis: [0, 1, 0]
        y_axis: [-1, 0, 0]
  - target:
      motion: absolute_joint
      joints: [0, -90, 90, 0, 0, 0]
"#;

    c.bench_function("yaml_parse_job", |b| {
        b.iter(|| black_box(parse_job(black_box(yaml)).unwrap()));
    });
}

criterion_group!(
    benches,
    bench_split_plan,
    bench_load_schedule,
    bench_pose_resolve,
    bench_generate_rapid,
    bench_stable_hash,
    bench_yaml_parse
);
criterion_main!(benches);
