// crates/core/src/merge.rs
//! Journey merge semantics: how incoming events fold into stored state.
//!
//! Pure functions over [`Journey`] so the dedup and recompute rules are
//! testable without a database. The db layer wraps these in the
//! read-merge-write retry loop.

use crate::section::Section;
use crate::types::{ActionRecord, Journey, SectionImpression};

/// A validated section event, ready to merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventInput {
    pub section: Section,
    pub interaction_id: Option<String>,
    /// Cumulative seconds in view as reported by the client.
    pub duration_secs: i64,
    /// Scroll depth 0-100.
    pub scroll_depth: i64,
    /// Interactions since the client's last report (a delta, not a total).
    pub interactions: i64,
}

/// Merge one section event into the journey.
///
/// Dedup key: the interaction id when present, otherwise the section among
/// impressions that also lack an id. Id-less events never merge into
/// id-keyed impressions, so a generic "viewed projects" ping cannot
/// silently absorb a tracked widget interaction.
///
/// Merge rules on a hit: duration takes the incoming value (the client
/// reports cumulative time), scroll depth keeps the maximum, and the
/// interaction count accumulates.
pub fn apply_event(journey: &mut Journey, input: &EventInput, now: i64) {
    let existing = journey.events.iter_mut().find(|imp| match &input.interaction_id {
        Some(id) => imp.interaction_id.as_deref() == Some(id.as_str()),
        None => imp.interaction_id.is_none() && imp.section == input.section,
    });

    match existing {
        Some(imp) => {
            imp.duration_secs = input.duration_secs;
            imp.scroll_depth = imp.scroll_depth.max(input.scroll_depth);
            imp.interaction_count += input.interactions;
        }
        None => journey.events.push(SectionImpression {
            section: input.section,
            interaction_id: input.interaction_id.clone(),
            viewed_at: now,
            duration_secs: input.duration_secs,
            scroll_depth: input.scroll_depth,
            interaction_count: input.interactions,
        }),
    }

    touch(journey, now);
}

/// Append a discrete action and advance the journey clock.
pub fn apply_action(journey: &mut Journey, record: ActionRecord) {
    let at = record.at;
    journey.actions.push(record);
    touch(journey, at);
}

/// Advance `ended_at` and recompute the total duration from the start
/// timestamp. Never accumulates: per-section durations overlap, so summing
/// them would overcount.
fn touch(journey: &mut Journey, now: i64) {
    journey.ended_at = Some(now);
    journey.total_duration_secs = (now - journey.started_at).max(0);
}
