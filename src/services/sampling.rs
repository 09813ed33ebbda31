use std::collections::BTreeSet;

/// Evenly spaced frame indices from the first to the last frame, inclusive.
///
/// `sample_count` positions are spread linearly over `[0, total_frames - 1]`
/// and truncated to whole frames, so short clips yield fewer distinct
/// indices than requested.
pub fn frame_indices(total_frames: usize, sample_count: usize) -> BTreeSet<usize> {
    if total_frames == 0 || sample_count == 0 {
        return BTreeSet::new();
    }
    let last = total_frames - 1;
    if sample_count == 1 {
        return BTreeSet::from([0]);
    }

    let step = last as f64 / (sample_count - 1) as f64;
    (0..sample_count)
        .map(|i| {
            if i == sample_count - 1 {
                last
            } else {
                ((i as f64 * step) as usize).min(last)
            }
        })
        .collect()
}
