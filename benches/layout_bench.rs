//! Benchmarks for the placement search.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use site_planner::{plan, EngineConfig, ParcelInput, PlanRequest, Setbacks, StructureKind, StructureSpec};

fn request(grid_resolution: f64) -> PlanRequest {
    PlanRequest {
        parcel: ParcelInput::rectangle(40.0, 30.0, 40.0),
        setbacks: Setbacks::uniform(3.0),
        structures: vec![
            StructureSpec::from_template("home", StructureKind::Home),
            StructureSpec::from_template("garage", StructureKind::Garage),
            StructureSpec::from_template("shed", StructureKind::Shed),
        ],
        config: EngineConfig {
            grid_resolution,
            ..EngineConfig::default()
        },
    }
}

fn layout_benchmark(c: &mut Criterion) {
    let sample = PlanRequest::from_toml_str(include_str!("../data/requests/suburban_lot.toml"))
        .unwrap();
    c.bench_function("suburban_lot", |b| b.iter(|| plan(black_box(&sample)).unwrap()));

    let mut group = c.benchmark_group("grid_resolution");
    for resolution in [2.0, 1.0, 0.5] {
        let request = request(resolution);
        group.bench_with_input(BenchmarkId::from_parameter(resolution), &request, |b, r| {
            b.iter(|| plan(black_box(r)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, layout_benchmark);
criterion_main!(benches);
