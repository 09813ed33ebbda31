//! Greedy leader clustering over Hamming distance.
//!
//! Entries are scanned in input order. Each entry not yet claimed becomes a
//! leader and claims every later unclaimed entry within `threshold` of the
//! leader's own fingerprint. Members are never compared with each other, so
//! the result depends on input order and two members of one group may be
//! further apart than `threshold`.

use super::fingerprint::Fingerprint;
use crate::error::ClusterError;

/// Identifiers judged similar, leader first.
pub type Group<I> = Vec<I>;

pub fn cluster<I: Clone>(
    entries: &[(I, Fingerprint)],
    threshold: u32,
) -> Result<Vec<Group<I>>, ClusterError> {
    let Some((_, first)) = entries.first() else {
        return Ok(Vec::new());
    };
    let expected = first.len();
    if let Some((index, (_, fp))) = entries
        .iter()
        .enumerate()
        .find(|(_, (_, fp))| fp.len() != expected)
    {
        return Err(ClusterError::LengthMismatch {
            index,
            expected,
            found: fp.len(),
        });
    }

    let mut used = vec![false; entries.len()];
    let mut groups = Vec::new();

    for (leader, (leader_id, leader_fp)) in entries.iter().enumerate() {
        if used[leader] {
            continue;
        }
        used[leader] = true;
        let mut group = vec![leader_id.clone()];

        for (candidate, (id, fp)) in entries.iter().enumerate().skip(leader + 1) {
            if used[candidate] {
                continue;
            }
            // Lengths were checked above.
            let distance = leader_fp
                .hamming_distance(fp)
                .map_err(|_| ClusterError::LengthMismatch {
                    index: candidate,
                    expected,
                    found: fp.len(),
                })?;
            if distance <= threshold {
                group.push(id.clone());
                used[candidate] = true;
            }
        }

        if group.len() > 1 {
            groups.push(group);
        }
    }

    Ok(groups)
}
