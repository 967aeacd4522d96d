//! Index Rebuild Benchmarks
//!
//! Every sidebar event produces a new index, so rebuild cost bounds how
//! fast a burst of sync events can be applied.
//!
//! Run with: `cargo bench --bench index_rebuild`

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::time::Duration;

use doc_annotations::events::reduce;
use doc_annotations::metadata::DocMeta;
use doc_annotations::{AnnotationEvent, AnnotationKind, DocAnnotation, DocAnnotationIndex, Position};

/// Spread annotations over pages like a heavily annotated book
fn create_annotations(count: usize) -> Vec<DocAnnotation> {
    (0..count)
        .map(|i| {
            let page = (i / 20) as u32 + 1;
            let position = Position::new((i % 7) as f64 * 60.0, (i % 20) as f64 * 35.0);
            DocAnnotation::new(format!("annotation-{:05}", i), AnnotationKind::TextHighlight, page, position)
        })
        .collect()
}

fn bench_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_rebuild");
    group.measurement_time(Duration::from_secs(10));

    for size in [100usize, 1_000, 5_000] {
        let index = DocAnnotationIndex::from_annotations(create_annotations(size));
        let update = DocAnnotation::new("annotation-00001", AnnotationKind::TextHighlight, 1, Position::new(1.0, 1.0));

        group.bench_function(format!("put_one_into_{}", size), |b| {
            b.iter(|| black_box(index.rebuild([update.clone()])))
        });

        group.bench_function(format!("delete_one_from_{}", size), |b| {
            b.iter(|| black_box(index.without(["annotation-00001"])))
        });
    }

    group.finish();
}

fn bench_reduce(c: &mut Criterion) {
    let mut group = c.benchmark_group("reduce");
    group.sample_size(50);

    let doc_meta = DocMeta::new("bench");
    let index = DocAnnotationIndex::from_annotations(create_annotations(1_000));
    let value = serde_json::json!({
        "id": "new-highlight",
        "created": "2021-01-01T00:00:00Z",
        "rects": { "0": { "left": 10.0, "top": 20.0, "width": 100.0, "height": 12.0 } }
    });
    let event = AnnotationEvent::created("new-highlight", AnnotationKind::TextHighlight, 3, value);

    group.bench_function("text_highlight_create_1000", |b| {
        b.iter(|| black_box(reduce(&index, &doc_meta, &event)))
    });

    group.finish();
}

criterion_group!(benches, bench_rebuild, bench_reduce);
criterion_main!(benches);
