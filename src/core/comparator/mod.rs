//! # Comparator Module
//!
//! Groups fingerprinted images into similarity clusters and decides which
//! member of each cluster to keep.
//!
//! ## How It Works
//! 1. A single deterministic pass claims records into clusters around the
//!    first unclaimed record (the seed) - see [`clusterer`]
//! 2. Each cluster of two or more members gets a sequential group id
//! 3. The resolver orders every cluster and marks one keeper, the rest
//!    removable - see [`resolver`]
//!
//! Clusters of one are dropped: a lone image is not a duplicate of anything.

mod clusterer;
mod resolver;

use crate::core::record::{ImageRecord, Role};

/// Group a list of records into duplicate clusters and annotate the members.
///
/// Input order is the discovery order from the scan and is load-bearing:
/// cluster membership is decided by proximity to the first-encountered seed,
/// and group ids count up in the order clusters are found. The same list and
/// threshold always produce the same assignments.
///
/// Returns only records belonging to an emitted (two-or-more member) group,
/// annotated with `group_id` and `role`, ordered clusters-first by discovery,
/// keeper leading its group followed by removables in keeper-ranking order.
/// Singletons never appear in the output.
pub fn find_duplicates(records: Vec<ImageRecord>, threshold: u32) -> Vec<ImageRecord> {
    let clusters = clusterer::cluster_indices(&records, threshold);
    let ranked: Vec<Vec<usize>> = clusters
        .iter()
        .map(|members| resolver::rank_members(&records, members))
        .collect();

    let mut slots: Vec<Option<ImageRecord>> = records.into_iter().map(Some).collect();
    let mut annotated = Vec::new();

    for (ordinal, members) in ranked.iter().enumerate() {
        let group_id = ordinal as u32 + 1;
        for (position, &index) in members.iter().enumerate() {
            // Clusters are disjoint by construction, so every slot is
            // still occupied.
            if let Some(mut record) = slots[index].take() {
                record.group_id = Some(group_id);
                if position == 0 {
                    record.role = Role::Keeper;
                    record.selected = false;
                } else {
                    record.role = Role::Removable;
                    record.selected = true;
                }
                annotated.push(record);
            }
        }
    }

    annotated
}
