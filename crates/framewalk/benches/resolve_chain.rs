use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use framewalk::geom::point;
use framewalk::{NodeId, NodeKind, OffsetBox, Position, Resolver, SnapshotDocument, Viewport};
use std::hint::black_box;
use std::time::Duration;

/// A chain of `depth` positioned, rotated frames with the target at the bottom.
fn build_html_chain(depth: usize) -> (SnapshotDocument, NodeId) {
    let mut doc = SnapshotDocument::new(Viewport {
        width: 1280.0,
        height: 720.0,
        ..Default::default()
    });
    let mut parent = doc.body_id();
    for i in 0..depth {
        let node = doc
            .append(parent, &format!("frame_{i}"), NodeKind::Html)
            .expect("fresh id");
        let rec = doc.node_mut(node);
        rec.style.position = Position::Relative;
        rec.style.transform = format!("rotate({}) scale(1.01)", (i * 7) % 360);
        rec.style.transform_origin = point(50.0, 50.0);
        rec.offset = Some(OffsetBox {
            left: 4.0,
            top: 6.0,
            width: 100.0,
            height: 100.0,
        });
        parent = node;
    }
    (doc, parent)
}

/// The same chain with an `<svg>` in the middle, so half of it goes through the solver.
fn build_mixed_chain(depth: usize) -> (SnapshotDocument, NodeId) {
    let (mut doc, mid) = build_html_chain(depth / 2);
    let svg = doc.append(mid, "canvas", NodeKind::Svg).expect("fresh id");
    {
        let rec = doc.node_mut(svg);
        rec.client.width = 300.0;
        rec.client.height = 150.0;
        rec.rect = framewalk::ClientRect::new(40.0, 40.0, 300.0, 150.0);
    }
    let mut parent = svg;
    for i in 0..depth - depth / 2 {
        let node = doc
            .append(parent, &format!("group_{i}"), NodeKind::SvgGroup)
            .expect("fresh id");
        doc.node_mut(node).style.transform = format!("translate({i} {i}) rotate(3)");
        parent = node;
    }
    let shape = doc
        .append(parent, "shape", NodeKind::SvgGraphics)
        .expect("fresh id");
    {
        let rec = doc.node_mut(shape);
        rec.bbox = Some(framewalk::ClientRect::new(10.0, 10.0, 40.0, 20.0));
        rec.rect = framewalk::ClientRect::new(80.0, 70.0, 45.0, 28.0);
    }
    (doc, shape)
}

fn bench_element_info(c: &mut Criterion) {
    let mut group = c.benchmark_group("element_info");
    group.measurement_time(Duration::from_secs(5));

    for depth in [2usize, 8, 32] {
        let (doc, target) = build_html_chain(depth);
        group.bench_with_input(BenchmarkId::new("html", depth), &depth, |b, _| {
            let resolver = Resolver::new(&doc);
            b.iter(|| {
                let info = resolver
                    .element_info(Some(black_box(target)), None, None)
                    .expect("resolves");
                black_box(info.rotation);
            })
        });

        let (doc, target) = build_mixed_chain(depth);
        group.bench_with_input(BenchmarkId::new("mixed_svg", depth), &depth, |b, _| {
            let resolver = Resolver::new(&doc);
            b.iter(|| {
                let info = resolver
                    .element_info(Some(black_box(target)), None, None)
                    .expect("resolves");
                black_box(info.projected.left);
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_element_info);
criterion_main!(benches);
