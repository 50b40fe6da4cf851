// Library-level checks of ordering, alignment, and row-boundary behavior.
use chunkline::api::{
    ColumnArray, ColumnType, Decimal, PipelineConfig, RowBoundary, Table, Value, load_reader,
    parse_chunk,
};

const SCHEMA: [ColumnType; 3] = [ColumnType::Int, ColumnType::Decimal, ColumnType::Text];

fn rows(count: usize) -> Vec<u8> {
    let mut out = b"id,price,label\n".to_vec();
    for i in 0..count {
        out.extend_from_slice(format!("{i},-{}.{},label-{i}\n", i / 2, i % 10).as_bytes());
    }
    out
}

fn config(buffer_size: usize, workers: usize, boundary: RowBoundary) -> PipelineConfig {
    PipelineConfig::new()
        .with_buffer_size(buffer_size)
        .with_depth(8)
        .with_workers(workers)
        .with_boundary(boundary)
}

fn assert_aligned(table: &Table) {
    let chunks = table.num_chunks();
    for column in table.columns() {
        assert_eq!(column.num_chunks(), chunks);
    }
    for chunk in 0..chunks {
        let expected = table.columns()[0].chunks()[chunk].len();
        for column in table.columns() {
            assert_eq!(column.chunks()[chunk].len(), expected);
        }
    }
}

#[test]
fn single_buffer_counts_every_data_row() {
    let data = rows(64);
    let (table, report) =
        load_reader(&data[..], &SCHEMA, &config(data.len() + 1, 2, RowBoundary::Drop))
            .expect("load");
    assert_eq!(report.rows, 64);
    assert_eq!(table.num_chunks(), 1);
}

#[test]
fn carry_counts_every_data_row_for_any_buffer_size() {
    let data = rows(300);
    for buffer_size in [1, 13, 64, 1000] {
        let (table, report) =
            load_reader(&data[..], &SCHEMA, &config(buffer_size, 4, RowBoundary::Carry))
                .expect("load");
        assert_eq!(report.rows, 300, "buffer size {buffer_size}");
        assert_aligned(&table);
        let labels: Vec<String> = table.columns()[2].iter().map(|v| v.to_string()).collect();
        let expected: Vec<String> = (0..300).map(|i| format!("label-{i}")).collect();
        assert_eq!(labels, expected);
    }
}

#[test]
fn drop_policy_stays_aligned_and_ordered() {
    let data = rows(300);
    let (table, _) =
        load_reader(&data[..], &SCHEMA, &config(50, 4, RowBoundary::Drop)).expect("load");
    assert_aligned(&table);
    let ids: Vec<i64> = table.columns()[0]
        .iter()
        .map(|v| match v {
            Value::Int(id) => id,
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert!(ids.windows(2).all(|w| w[0] < w[1]), "ids out of order: {ids:?}");
}

#[test]
fn concurrency_does_not_change_contents() {
    let data = rows(2000);
    for boundary in [RowBoundary::Drop, RowBoundary::Carry] {
        let (serial, _) =
            load_reader(&data[..], &SCHEMA, &config(211, 1, boundary)).expect("serial");
        let (parallel, _) =
            load_reader(&data[..], &SCHEMA, &config(211, 8, boundary)).expect("parallel");
        assert_eq!(serial, parallel);
    }
}

#[test]
fn truncated_row_leaks_nothing() {
    let columns = parse_chunk(&SCHEMA, b"h\n1,1.5,a\n2,2.5,b\n3,3.5", true);
    for column in &columns {
        assert_eq!(column.len(), 2);
    }
    assert_eq!(
        columns[1],
        ColumnArray::Decimal(vec![Decimal::new(1, 5, false), Decimal::new(2, 5, false)])
    );
}

#[test]
fn short_buffer_yields_no_rows() {
    let columns = parse_chunk(&SCHEMA, b"header\n42,1", true);
    assert!(columns.iter().all(ColumnArray::is_empty));
}
