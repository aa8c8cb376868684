use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use linkedquad::{PrefixMap, QuadTreeBuilder};

/// Concise quads spread across `n_graphs` graphs, mixing IRIs, blank nodes
/// and the three literal forms as objects.
fn generate_quads(n_graphs: usize, quads_per_graph: usize) -> Vec<[String; 4]> {
    let mut quads = Vec::with_capacity(n_graphs * quads_per_graph);
    for g in 0..n_graphs {
        let graph = if g == 0 {
            "*".to_string()
        } else {
            format!("ex:graph{g}")
        };
        for t in 0..quads_per_graph {
            let subject = if t % 5 == 0 {
                format!("_:b{g}_{t}")
            } else {
                format!("ex:s{}", t / 10)
            };
            let predicate = format!("ex:p{}", t % 20);
            let object = match t % 4 {
                0 => format!("ex:o{}", t % 50),
                1 => format!("\"value {t}"),
                2 => format!("^xsd:integer\"{t}"),
                _ => format!("@en\"hello {}", t % 30),
            };
            quads.push([graph.clone(), subject, predicate, object]);
        }
    }
    quads
}

fn prefixes() -> PrefixMap {
    PrefixMap::new()
        .with("ex", "http://example.org/")
        .with("xsd", "http://www.w3.org/2001/XMLSchema#")
}

fn build(quads: &[[String; 4]]) -> QuadTreeBuilder {
    let mut builder = QuadTreeBuilder::new(prefixes());
    for [g, s, p, o] in quads {
        builder.add_quad_key(g, s, p, o);
    }
    builder
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    for n in [100, 1_000, 10_000] {
        let quads = generate_quads(4, n / 4);
        group.throughput(Throughput::Elements(quads.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &quads, |b, quads| {
            b.iter(|| build(quads));
        });
    }
    group.finish();
}

fn bench_delete(c: &mut Criterion) {
    let mut group = c.benchmark_group("delete");
    for n in [100, 1_000, 10_000] {
        let quads = generate_quads(4, n / 4);
        let builder = build(&quads);
        group.throughput(Throughput::Elements(quads.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &quads, |b, quads| {
            b.iter_batched(
                || builder.clone(),
                |mut builder| {
                    for [g, s, p, o] in quads {
                        builder.delete_quad_key(g, s, p, o);
                    }
                    builder
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_iterate(c: &mut Criterion) {
    let mut group = c.benchmark_group("iterate");
    for n in [1_000, 10_000] {
        let tree = build(&generate_quads(4, n / 4)).deliver();
        group.throughput(Throughput::Elements(tree.len() as u64));
        group.bench_with_input(BenchmarkId::new("concise", n), &tree, |b, tree| {
            b.iter(|| tree.concise_quads().count());
        });
        group.bench_with_input(BenchmarkId::new("decoded", n), &tree, |b, tree| {
            b.iter(|| tree.iter().filter(Result::is_ok).count());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_insert, bench_delete, bench_iterate);
criterion_main!(benches);
