use canopy::DomainNode;
use canopy::render::{RenderOptions, SvgSurface, TreeRenderer};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

/// `fanout^0 + fanout^1 + ... + fanout^depth` nodes; the deepest level is leaves.
fn balanced_taxonomy(fanout: usize, depth: usize) -> DomainNode {
    fn build(prefix: &str, fanout: usize, depth: usize) -> DomainNode {
        if depth == 0 {
            return DomainNode::leaf(prefix, Some("https://example.org"));
        }
        let children = (0..fanout)
            .map(|i| build(&format!("{prefix}.{i}"), fanout, depth - 1))
            .collect();
        DomainNode::branch(prefix, children)
    }
    build("root", fanout, depth)
}

fn expand_all(renderer: &mut TreeRenderer<SvgSurface>, node: &DomainNode) {
    renderer.expand_node(&node.name);
    for child in &node.children {
        if !child.is_leaf() {
            expand_all(renderer, child);
        }
    }
}

fn bench_layout_stress(c: &mut Criterion) {
    // 6^0 + ... + 6^4 = 1555 nodes.
    let taxonomy = balanced_taxonomy(6, 4);

    let mut group = c.benchmark_group("layout_stress");
    group.sample_size(30);

    group.bench_function("balanced_tree_full_render", |b| {
        b.iter(|| {
            let mut renderer =
                TreeRenderer::new(SvgSurface::new(), RenderOptions::default()).expect("surface");
            expand_all(&mut renderer, &taxonomy);
            let stats = renderer.render(black_box(&taxonomy)).expect("render");
            black_box(stats.entered);
        });
    });

    // Toggling one subtree on a fully expanded tree: layout + diff of the whole scene.
    let mut renderer =
        TreeRenderer::new(SvgSurface::new(), RenderOptions::default()).expect("surface");
    expand_all(&mut renderer, &taxonomy);
    renderer.render(&taxonomy).expect("render");
    let target = renderer
        .tree()
        .and_then(|t| t.find_by_name("root.0").next().map(|i| t.node(i).identity))
        .expect("subtree");
    group.bench_function("balanced_tree_toggle_x2", move |b| {
        b.iter(|| {
            renderer.toggle(black_box(target)).expect("collapse");
            renderer.toggle(black_box(target)).expect("expand");
        });
    });

    group.finish();
}

criterion_group!(benches, bench_layout_stress);
criterion_main!(benches);
