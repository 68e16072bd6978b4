//! Benchmarks for the bridge preservation pass.
//!
//! Measures the sequential and the parallel pass over a synthetic platform of bridged types
//! with a consumer assembly subclassing them, plus graph construction on its own.

extern crate nsmark;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use nsmark::prelude::*;
use std::hint::black_box;

/// Build a platform of `views` bridged view types, each with a handle constructor and a few
/// exported virtuals, and a consumer assembly overriding every other exported method.
fn build_graph(views: usize) -> TypeGraph {
    let platform = AssemblyIdentity::parse("Xamarin.iOS").unwrap();
    let app = AssemblyIdentity::parse("App").unwrap();

    let mut builder = TypeGraphBuilder::new();
    let export = builder
        .add_type(&platform, TypeBuilder::new("Foundation", "ExportAttribute"))
        .unwrap();
    let native_object = builder
        .add_type(&platform, TypeBuilder::new("ObjCRuntime", "INativeObject"))
        .unwrap();
    let nsobject = builder
        .add_type(
            &platform,
            TypeBuilder::new("Foundation", "NSObject").implements(native_object),
        )
        .unwrap();

    let outer = builder
        .add_type(&app, TypeBuilder::new("App", "Controllers"))
        .unwrap();

    for i in 0..views {
        let view = builder
            .add_type(
                &platform,
                TypeBuilder::new("UIKit", format!("View{i}")).extends(nsobject),
            )
            .unwrap();
        builder
            .add_method(view, MethodBuilder::constructor())
            .unwrap();
        builder
            .add_method(view, MethodBuilder::constructor().param(ParamType::I))
            .unwrap();

        let mut exported = Vec::new();
        for slot in 0..4 {
            exported.push(
                builder
                    .add_method(
                        view,
                        MethodBuilder::new(format!("Slot{slot}"))
                            .virtual_()
                            .attribute(export),
                    )
                    .unwrap(),
            );
        }

        let custom = builder
            .add_type(
                &app,
                TypeBuilder::new("", format!("Custom{i}"))
                    .extends(view)
                    .nested_in(outer),
            )
            .unwrap();
        for base in exported.iter().step_by(2) {
            builder
                .add_method(
                    custom,
                    MethodBuilder::new("Override").virtual_().overrides(*base),
                )
                .unwrap();
        }

        builder
            .add_type(&app, TypeBuilder::new("App", format!("Model{i}")))
            .unwrap();
    }

    builder.build().unwrap()
}

/// Benchmark graph construction, including override indexing and export marker resolution.
fn bench_build_graph(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_build");
    group.throughput(Throughput::Elements(1000));
    group.bench_function("1000_views", |b| {
        b.iter(|| black_box(build_graph(black_box(1000))));
    });
    group.finish();
}

/// Benchmark the sequential pass.
fn bench_run_sequential(c: &mut Criterion) {
    let graph = build_graph(5000);
    let config = MarkerConfig::ios();

    let mut group = c.benchmark_group("marker_sequential");
    group.throughput(Throughput::Elements(graph.len() as u64));
    group.bench_function("run", |b| {
        b.iter(|| {
            let annotations = AnnotationStore::new();
            let stats = PreservationMarker::new(&graph, &config, &annotations)
                .run()
                .unwrap();
            black_box((stats, annotations))
        });
    });
    group.finish();
}

/// Benchmark the parallel pass on the rayon pool.
fn bench_run_parallel(c: &mut Criterion) {
    let graph = build_graph(5000);
    let config = MarkerConfig::ios();

    let mut group = c.benchmark_group("marker_parallel");
    group.throughput(Throughput::Elements(graph.len() as u64));
    group.bench_function("run_parallel", |b| {
        b.iter(|| {
            let annotations = AnnotationStore::new();
            let stats = PreservationMarker::new(&graph, &config, &annotations)
                .run_parallel()
                .unwrap();
            black_box((stats, annotations))
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_build_graph,
    bench_run_sequential,
    bench_run_parallel,
);
criterion_main!(benches);
