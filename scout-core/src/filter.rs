//! Audience threshold filtering.

use crate::size::parse_size;
use crate::types::{Measured, RawCandidate};

/// Keep candidates whose parsed audience is at least `threshold`.
///
/// Input order is preserved and the output is always a subsequence of the
/// input. Candidates whose size label cannot be parsed are treated as
/// "unknown" and dropped without error. Each survivor carries its parsed
/// count so later stages do not reparse.
pub fn filter_by_size(candidates: Vec<RawCandidate>, threshold: u64) -> Vec<Measured<RawCandidate>> {
    candidates
        .into_iter()
        .filter_map(|candidate| match parse_size(&candidate.size_label) {
            Ok(audience) if audience >= threshold => Some(Measured {
                item: candidate,
                audience,
            }),
            Ok(audience) => {
                tracing::trace!(
                    name = %candidate.display_name,
                    audience,
                    threshold,
                    "below threshold"
                );
                None
            }
            Err(failure) => {
                tracing::trace!(
                    name = %candidate.display_name,
                    label = %candidate.size_label,
                    %failure,
                    "unparseable size label"
                );
                None
            }
        })
        .collect()
}
