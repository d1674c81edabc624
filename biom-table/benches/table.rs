use biom_table::{AxisEntry, Biom, BiomInit, Data, Element, MatrixType};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn random_table(rows: usize, cols: usize, density: f64, seed: u64) -> Biom {
    let mut state = seed;
    let mut triplets = Vec::new();
    for r in 0..rows {
        for c in 0..cols {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            let x = (state >> 11) as f64 / (1u64 << 53) as f64;
            if x < density {
                triplets.push((r, c, Element::Int((state >> 40) as i64 % 100 + 1)));
            }
        }
    }
    Biom::new(BiomInit {
        rows: (0..rows).map(|i| AxisEntry::new(format!("otu{i}"))).collect(),
        columns: (0..cols).map(|i| AxisEntry::new(format!("s{i}"))).collect(),
        data: Some(Data::Sparse(triplets)),
        ..Default::default()
    })
    .unwrap()
}

fn bench_convert(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert");

    let sparse = random_table(1000, 100, 0.05, 42);
    let mut dense = sparse.clone();
    dense.set_matrix_type(MatrixType::Dense);

    group.bench_function("sparse_to_dense_1000x100", |b| {
        b.iter(|| black_box(sparse.data()).convert(MatrixType::Dense))
    });
    group.bench_function("dense_to_sparse_1000x100", |b| {
        b.iter(|| black_box(dense.data()).convert(MatrixType::Sparse))
    });

    group.finish();
}

fn bench_rekey(c: &mut Criterion) {
    let mut group = c.benchmark_group("rekey");

    let table = random_table(1000, 100, 0.05, 7);
    let rows: Vec<AxisEntry> = (500..1500)
        .rev()
        .map(|i| AxisEntry::new(format!("otu{i}")))
        .collect();

    group.bench_function("set_rows_1000_half_overlap", |b| {
        b.iter(|| {
            let mut t = table.clone();
            t.set_rows(black_box(rows.clone())).unwrap();
            t
        })
    });

    group.finish();
}

fn bench_json(c: &mut Criterion) {
    let mut group = c.benchmark_group("json");

    let table = random_table(1000, 100, 0.05, 11);
    let text = table.to_json_string().unwrap();

    group.bench_function("serialize_1000x100", |b| {
        b.iter(|| black_box(&table).to_json_string().unwrap())
    });
    group.bench_function("parse_1000x100", |b| {
        b.iter(|| Biom::from_json_str(black_box(&text)).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_convert, bench_rekey, bench_json);
criterion_main!(benches);
