//! Single-pass seed clustering.
//!
//! Every cluster is linked to its *seed* - the first record, in list order,
//! that no earlier cluster claimed. Membership is proximity to the seed
//! alone, not to other members, so the result is not transitive closure:
//! a record within threshold of two mutually-distant seeds belongs to
//! whichever seed reaches it first. Replicating this exactly is what makes
//! group assignments reproducible run over run.

use crate::core::record::ImageRecord;

/// Partition records into clusters of indices, discovery order preserved.
///
/// Only clusters with at least two members are returned; a seed that claims
/// nobody stays unclustered and contributes nothing. Records carrying an
/// empty fingerprint are skipped outright so unhashable files can never
/// cluster with each other.
pub(super) fn cluster_indices(records: &[ImageRecord], threshold: u32) -> Vec<Vec<usize>> {
    let mut claimed = vec![false; records.len()];
    let mut clusters = Vec::new();

    for i in 0..records.len() {
        if claimed[i] || records[i].fingerprint().is_empty() {
            continue;
        }

        let seed = records[i].fingerprint();
        claimed[i] = true;
        let mut members = vec![i];

        for j in (i + 1)..records.len() {
            if claimed[j] || records[j].fingerprint().is_empty() {
                continue;
            }
            if seed.distance_saturating(records[j].fingerprint()) <= threshold {
                claimed[j] = true;
                members.push(j);
            }
        }

        if members.len() >= 2 {
            clusters.push(members);
        }
        // A cluster of one is dropped; the seed stays claimed so it is not
        // reconsidered, matching the single left-to-right pass.
    }

    clusters
}
