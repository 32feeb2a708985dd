//! Multi-key stable sorting.

use std::cmp::Ordering;

use super::execution_error;
use crate::error::Result;
use crate::input::Value;
use crate::schema::SortOrder;
use crate::spec::SortClause;

/// A sort clause resolved to a column position.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SortKey {
    index: usize,
    order: SortOrder,
}

/// Resolve sort clauses against the columns of the rows being sorted.
pub(crate) fn resolve_keys<S: AsRef<str>>(clauses: &[SortClause], columns: &[S]) -> Result<Vec<SortKey>> {
    clauses
        .iter()
        .map(|clause| {
            columns
                .iter()
                .position(|c| c.as_ref() == clause.by)
                .map(|index| SortKey {
                    index,
                    order: clause.order,
                })
                .ok_or_else(|| {
                    execution_error(format!("cannot sort by '{}': column is not in the result", clause.by))
                })
        })
        .collect()
}

/// Sort rows in place. Nulls go last in either direction; ties keep input order.
pub(crate) fn sort_rows<R: AsRef<[Value]>>(rows: &mut [R], keys: &[SortKey]) {
    if keys.is_empty() {
        return;
    }
    rows.sort_by(|a, b| {
        let (a, b) = (a.as_ref(), b.as_ref());
        keys.iter()
            .map(|key| compare_cells(&a[key.index], &b[key.index], key.order))
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
}

fn compare_cells(a: &Value, b: &Value, order: SortOrder) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ord = a.total_cmp(b);
            match order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        }
    }
}
