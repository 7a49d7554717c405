use std::cmp::Ordering;

use crate::query::filter::Filter;
use crate::query::page::{FetchPlan, Page, SortField, Sortable};

/// Identity and visibility of a loaded entity.
pub trait Record {
    fn id(&self) -> i32;

    /// Whether the record may show up in listings. Not overridable by
    /// callers; the executor always applies it.
    fn is_visible(&self) -> bool {
        true
    }
}

/// Runs `filter` over `records` and returns the page `plan` asks for.
///
/// The total count covers every visible, matching record before
/// pagination is applied.
pub fn execute<T, F>(records: Vec<T>, filter: &Filter<T>, plan: &FetchPlan<F>) -> Page<T>
where
    T: Sortable<F>,
    F: SortField,
{
    let mut matching: Vec<T> = records
        .into_iter()
        .filter(|record| record.is_visible() && filter.matches(record))
        .collect();
    let total = matching.len() as u64;

    matching.sort_by(|a, b| plan.compare(a, b));

    let offset = usize::try_from(plan.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(plan.limit()).unwrap_or(usize::MAX);
    let content = matching.into_iter().skip(offset).take(limit).collect();

    Page::new(content, plan.page, plan.size, total)
}

/// The first `limit` visible, matching records under a fixed ordering.
pub fn top<T, C>(records: Vec<T>, filter: &Filter<T>, limit: usize, mut compare: C) -> Vec<T>
where
    T: Record,
    C: FnMut(&T, &T) -> Ordering,
{
    let mut matching: Vec<T> = records
        .into_iter()
        .filter(|record| record.is_visible() && filter.matches(record))
        .collect();
    matching.sort_by(|a, b| compare(a, b).then_with(|| a.id().cmp(&b.id())));
    matching.truncate(limit);
    matching
}
