use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lazytree_core::{adjust_counter, ancestor_chain, combine, merge_at, replace, Node, NodePatch, Tree};

const SIZES: &[usize] = &[100, 1_000, 10_000];

/// `width` roots, each holding `width` loaded children.
fn wide_tree(width: usize) -> Tree {
    Tree::new(
        (0..width)
            .map(|r| {
                Node::new(format!("r{r}"), format!("root {r}"), true)
                    .with_counter("count", 0)
                    .with_children(
                        (0..width)
                            .map(|c| {
                                Node::new(format!("r{r}-c{c}"), format!("child {c}"), false)
                                    .with_counter("count", 0)
                            })
                            .collect(),
                    )
            })
            .collect(),
    )
}

fn bench_combine(c: &mut Criterion) {
    let mut group = c.benchmark_group("combine");
    for &count in SIZES {
        let existing = Tree::new((0..count).map(|i| Node::new(format!("n{i}"), "n", true)).collect());
        let fresh: Vec<Node> = (0..count)
            .rev()
            .map(|i| Node::new(format!("n{}", i * 2), "n", i % 2 == 0))
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| combine(black_box(existing.roots()), fresh.clone()))
        });
    }
    group.finish();
}

fn bench_tree_rewrites(c: &mut Criterion) {
    let mut group = c.benchmark_group("rewrite");
    for &count in SIZES {
        let width = (count as f64).sqrt() as usize;
        let tree = wide_tree(width);
        let last = format!("r{0}-c{0}", width - 1);
        let chain = ancestor_chain(&format!("r{}/{last}", width - 1), '/');
        let fresh: Vec<Node> = (0..width)
            .map(|c| Node::new(format!("r0-c{c}"), "child", false))
            .collect();

        group.bench_with_input(BenchmarkId::new("replace", count), &count, |b, _| {
            b.iter(|| replace(black_box(&tree), &last.as_str().into(), &NodePatch::rename("renamed")))
        });
        group.bench_with_input(BenchmarkId::new("adjust_counter", count), &count, |b, _| {
            b.iter(|| adjust_counter(black_box(&tree), &chain, "count", 1))
        });
        group.bench_with_input(BenchmarkId::new("merge_at", count), &count, |b, _| {
            b.iter(|| merge_at(black_box(&tree), Some(&"r0".into()), fresh.clone()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_combine, bench_tree_rewrites);
criterion_main!(benches);
