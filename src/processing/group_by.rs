//! Group-by aggregation.

use std::cmp::Ordering;

use indexmap::IndexMap;

use crate::result::{AnalysisResult, GroupByResult};
use crate::types::{DataSet, Record, Value};

use super::aggregate::{Aggregation, RECORD_COUNT};

/// Partition `dataset` by `group_column` and aggregate each partition.
///
/// - Rows whose group value is null (or missing) are dropped.
/// - Each output row holds the group value, one key per aggregation (see
///   [`Aggregation::output_key`]), and `RECORD_COUNT`.
/// - Rows are sorted descending by the first aggregation's key (`RECORD_COUNT` when there are
///   none); ties keep first-seen group order.
/// - At most `limit` rows are kept; `total_groups` reports the pre-truncation count.
pub fn group_by(
    dataset: &DataSet,
    group_column: &str,
    aggregations: &[Aggregation],
    limit: usize,
) -> AnalysisResult {
    let group_idx = dataset.schema.index_of(group_column);
    if group_idx.is_none() {
        tracing::warn!(group_column, "group column not present in dataset");
    }

    let mut partitions: IndexMap<String, (Value, Vec<&[Value]>)> = IndexMap::new();
    for row in &dataset.rows {
        let key = DataSet::cell(row, group_idx);
        if key.is_null() {
            continue;
        }
        partitions
            .entry(key.to_string())
            .or_insert_with(|| (key.clone(), Vec::new()))
            .1
            .push(row.as_slice());
    }

    let agg_idxs: Vec<Option<usize>> = aggregations
        .iter()
        .map(|a| dataset.schema.index_of(&a.column))
        .collect();

    let mut rows: Vec<Record> = partitions
        .into_values()
        .map(|(key, members)| {
            let mut out = Record::new();
            out.insert(group_column.to_string(), key);
            for (agg, idx) in aggregations.iter().zip(&agg_idxs) {
                out.insert(agg.output_key(), agg.apply(&members, *idx));
            }
            out.entry(RECORD_COUNT.to_string())
                .or_insert(Value::Int64(members.len() as i64));
            out
        })
        .collect();

    let sort_key = aggregations
        .first()
        .map(Aggregation::output_key)
        .unwrap_or_else(|| RECORD_COUNT.to_string());
    rows.sort_by(|a, b| {
        let av = a.get(&sort_key).map_or(0.0, Value::number_or_zero);
        let bv = b.get(&sort_key).map_or(0.0, Value::number_or_zero);
        bv.partial_cmp(&av).unwrap_or(Ordering::Equal)
    });

    let total_groups = rows.len();
    rows.truncate(limit);

    AnalysisResult::GroupBy(GroupByResult {
        group_column: group_column.to_string(),
        aggregations: aggregations.to_vec(),
        data: rows,
        total_groups,
    })
}
