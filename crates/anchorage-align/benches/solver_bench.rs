//! Benchmarks for the alignment solver and session.
//!
//! Run with: cargo bench -p anchorage-align

use anchorage_align::{
    AlignRequest, Aligner, Direction, ElementMetrics, FlipCache, LayoutSnapshot, OverflowStyle,
    PlacementRegistry, Regions, SolverInput, ViewportMetrics, collect_regions,
    collect_shared_scrollers, solve,
};
use anchorage_core::{Rect, Region};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn input(target: Rect, placement: &str, registry: &PlacementRegistry) -> SolverInput {
    let popup = Rect::new(0.0, 0.0, 120.0, 60.0);
    let viewport = Region::new(0.0, 0.0, 800.0, 600.0);
    SolverInput {
        target,
        popup,
        popup_css_size: popup.size(),
        popup_mirror: Rect::new(680.0, 540.0, 120.0, 60.0),
        placement: registry.resolve(placement, None),
        regions: Regions {
            visible: viewport,
            scroll: viewport,
        },
        direction: Direction::Ltr,
    }
}

fn bench_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("align/solve");
    let registry = PlacementRegistry::builtin();

    let cases = [
        ("fits", Rect::new(300.0, 200.0, 40.0, 20.0)),
        ("flip_y", Rect::new(300.0, 560.0, 40.0, 20.0)),
        ("flip_xy", Rect::new(760.0, 560.0, 40.0, 20.0)),
        ("shift_x", Rect::new(5.0, 200.0, 40.0, 20.0)),
    ];
    for (name, target) in cases {
        let pass = input(target, "bottomLeft", &registry);
        group.bench_with_input(BenchmarkId::new("bottomLeft", name), &pass, |b, pass| {
            b.iter(|| {
                let mut flips = FlipCache::new();
                black_box(solve(pass, &mut flips))
            })
        });
    }

    group.finish();
}

/// A chain of `depth` nested scrollers with the target at the bottom.
fn nested_scrollers(depth: usize) -> (LayoutSnapshot, anchorage_align::NodeId, anchorage_align::NodeId) {
    let mut host = LayoutSnapshot::new(ViewportMetrics::new(1280.0, 800.0));
    let body = host.add(None, ElementMetrics::new(Rect::new(0.0, 0.0, 1280.0, 800.0)).root());
    let mut parent = body;
    for i in 0..depth {
        let inset = i as f64 * 4.0;
        let metrics = ElementMetrics::new(Rect::new(inset, inset, 1000.0 - inset, 700.0 - inset))
            .overflow(OverflowStyle::Auto)
            .scrollbars(12.0, 12.0);
        parent = host.add(Some(parent), metrics);
    }
    let target = host.add(Some(parent), ElementMetrics::new(Rect::new(400.0, 300.0, 40.0, 20.0)));
    let popup = host.add(Some(body), ElementMetrics::new(Rect::new(0.0, 0.0, 120.0, 60.0)));
    (host, target, popup)
}

fn bench_regions(c: &mut Criterion) {
    let mut group = c.benchmark_group("align/regions");

    for depth in [1, 4, 16, 64] {
        let (host, target, popup) = nested_scrollers(depth);
        group.bench_with_input(BenchmarkId::new("collect", depth), &depth, |b, _| {
            b.iter(|| {
                let scrollers = collect_shared_scrollers(&host, Some(target), popup);
                black_box(collect_regions(&host, &scrollers))
            })
        });
    }

    group.finish();
}

fn bench_session(c: &mut Criterion) {
    let mut group = c.benchmark_group("align/session");
    let registry = PlacementRegistry::builtin();

    for depth in [1, 16] {
        let (host, target, popup) = nested_scrollers(depth);
        let request = AlignRequest::new(target, popup, "bottom", &registry);
        let mut aligner = Aligner::new();
        aligner.align(&host, true, &request);
        group.bench_with_input(BenchmarkId::new("realign_cached", depth), &depth, |b, _| {
            b.iter(|| black_box(aligner.align(&host, true, &request).offset_y))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_solve, bench_regions, bench_session);
criterion_main!(benches);
