use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use pgrecord::{FieldMap, RecordShape, Row, StatementBuilder, Value, map_row};
use pgrecord::value::Kind;
use std::sync::Arc;

/// `n` fields, every third one absent (zero) so normalization has work to do.
fn field_map(n: usize) -> FieldMap {
    (0..n)
        .map(|i| {
            let value = if i % 3 == 0 {
                Value::Int(0)
            } else {
                Value::Text(format!("value{i}"))
            };
            (format!("col{i}"), value)
        })
        .collect()
}

fn bench_insert(c: &mut Criterion) {
    let builder = StatementBuilder::new("bench_table").unwrap();
    let mut group = c.benchmark_group("statement_builder/insert");

    for n in [1, 5, 10, 50, 100] {
        let data = field_map(n + 1);
        group.bench_with_input(BenchmarkId::from_parameter(n), &data, |b, data| {
            b.iter(|| black_box(builder.insert(data).unwrap()));
        });
    }

    group.finish();
}

fn bench_filter(c: &mut Criterion) {
    let builder = StatementBuilder::new("bench_table").unwrap();
    let mut group = c.benchmark_group("statement_builder/select_by_filter");

    for n in [1, 5, 10, 50, 100] {
        let filter = field_map(n + 1);
        group.bench_with_input(BenchmarkId::from_parameter(n), &filter, |b, filter| {
            b.iter(|| black_box(builder.select_by_filter(filter).unwrap()));
        });
    }

    group.finish();
}

fn bench_map_row(c: &mut Criterion) {
    let mut group = c.benchmark_group("mapper/map_row");

    for n in [5, 20, 100] {
        let columns: Arc<[String]> = (0..n).map(|i| format!("col{i}")).collect();
        let values = (0..n).map(|i| Value::Int(i as i64)).collect();
        let row = Row::new(columns, values);
        let shape = (0..n)
            .step_by(2)
            .fold(RecordShape::new("Bench"), |shape, i| {
                shape.field(format!("col{i}"), Kind::Int)
            });

        group.bench_with_input(BenchmarkId::from_parameter(n), &row, |b, row| {
            b.iter(|| black_box(map_row(row, &shape).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_insert, bench_filter, bench_map_row);
criterion_main!(benches);
