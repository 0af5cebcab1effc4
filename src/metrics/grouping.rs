//! Key → count tallies with a stable, caller-controlled ordering.

use std::collections::HashMap;
use std::hash::Hash;

use serde::Serialize;

/// One key of a grouped tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCount {
    pub key: String,
    pub count: u64,
}

/// Ordered tally. Canonical keys come first in the order given (present even
/// at 0); keys outside that set follow in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GroupedCounts(Vec<GroupCount>);

impl GroupedCounts {
    pub fn tally<'a, T: 'a>(
        rows: impl IntoIterator<Item = &'a T>,
        key: impl Fn(&T) -> Option<&str>,
        canonical: &[&str],
    ) -> Self {
        let mut groups: Vec<GroupCount> = canonical
            .iter()
            .map(|k| GroupCount {
                key: (*k).to_string(),
                count: 0,
            })
            .collect();
        let mut index: HashMap<String, usize> = groups
            .iter()
            .enumerate()
            .map(|(i, g)| (g.key.clone(), i))
            .collect();

        for row in rows {
            let Some(k) = key(row) else { continue };
            match index.get(k) {
                Some(&i) => groups[i].count += 1,
                None => {
                    index.insert(k.to_string(), groups.len());
                    groups.push(GroupCount {
                        key: k.to_string(),
                        count: 1,
                    });
                }
            }
        }

        GroupedCounts(groups)
    }

    /// Count for `key`, 0 when absent.
    pub fn get(&self, key: &str) -> u64 {
        self.0
            .iter()
            .find(|g| g.key == key)
            .map_or(0, |g| g.count)
    }

    pub fn total(&self) -> u64 {
        self.0.iter().map(|g| g.count).sum()
    }

    /// Descending by count; ties keep their current order.
    pub fn sorted_desc(mut self) -> Self {
        self.0.sort_by(|a, b| b.count.cmp(&a.count));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &GroupCount> {
        self.0.iter()
    }

    pub fn keys(&self) -> Vec<&str> {
        self.0.iter().map(|g| g.key.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Count rows per id, e.g. rounds per user. Rows without an id are skipped.
pub fn tally_by_id<'a, T: 'a, K: Eq + Hash>(
    rows: impl IntoIterator<Item = &'a T>,
    id: impl Fn(&T) -> Option<K>,
) -> HashMap<K, u64> {
    let mut counts = HashMap::new();
    for row in rows {
        if let Some(k) = id(row) {
            *counts.entry(k).or_insert(0) += 1;
        }
    }
    counts
}
