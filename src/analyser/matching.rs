//! Cross-capture packet correlation by identifier.
use std::collections::{BTreeSet, HashMap};

use super::containers::{MatchResult, PacketId, TimestampMicros};

/// Correlates two identifier mappings.
///
/// `first` is the reference capture. Each matched id gets a delay of
/// `second[id] - first[id]`; negative values mean the second capture saw the
/// packet earlier and are reported as-is. A delay that does not fit in an
/// `i64` is left out of `delays`; the id stays matched.
pub fn match_ids(first: &HashMap<PacketId, TimestampMicros>, second: &HashMap<PacketId, TimestampMicros>) -> MatchResult {
    log::info!("Matching {} against {} identified packets.", first.len(), second.len());

    let first_keys: BTreeSet<PacketId> = first.keys().copied().collect();
    let second_keys: BTreeSet<PacketId> = second.keys().copied().collect();

    let matched: BTreeSet<PacketId> = first_keys.intersection(&second_keys).copied().collect();
    let only_in_first: BTreeSet<PacketId> = first_keys.difference(&second_keys).copied().collect();
    let only_in_second: BTreeSet<PacketId> = second_keys.difference(&first_keys).copied().collect();
    let unmatched = only_in_first.union(&only_in_second).copied().collect();

    let delays = matched
        .iter()
        .filter_map(|id| match second[id].checked_sub(first[id]) {
            Some(delay) => Some((*id, delay)),
            None => {
                log::warn!("Delay for id {id} overflows, skipping ({} - {})", second[id], first[id]);
                None
            }
        })
        .collect();

    MatchResult {
        matched,
        unmatched,
        only_in_first,
        only_in_second,
        delays,
    }
}
