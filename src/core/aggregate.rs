use super::fingerprint::Fingerprint;
use crate::error::AggregateError;

/// Collapse per-frame fingerprints into one by per-bit strict majority.
/// A bit is set only when more than half the frames set it; ties clear it.
pub fn majority_vote(frames: &[Fingerprint]) -> Result<Fingerprint, AggregateError> {
    let first = frames.first().ok_or(AggregateError::Empty)?;
    let len = first.len();

    let mut counts = vec![0usize; len];
    for (index, frame) in frames.iter().enumerate() {
        if frame.len() != len {
            return Err(AggregateError::LengthMismatch {
                index,
                expected: len,
                found: frame.len(),
            });
        }
        for (count, bit) in counts.iter_mut().zip(frame.bits()) {
            *count += usize::from(bit);
        }
    }

    Ok(Fingerprint::from_bits(
        counts.into_iter().map(|count| 2 * count > frames.len()),
    ))
}
