use std::collections::BTreeMap;

use crate::model::TopEntry;

/// Recompute the top-5 shortlist from a full frequency map. The maps are
/// bounded by the number of distinct regions/ministries/sessions, so a full
/// re-sort per update is fine; ties keep map iteration order.
pub fn top5(counts: &BTreeMap<String, i64>) -> Vec<TopEntry> {
    let mut entries: Vec<TopEntry> = counts
        .iter()
        .map(|(name, count)| TopEntry {
            name: name.to_owned(),
            count: *count,
        })
        .collect();

    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries.truncate(5);
    entries
}
