/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Per-run booking state for teachers and rooms.
//!
//! One [`AvailabilityState`] is created for teachers and one for rooms at the
//! start of a generation run, threaded by `&mut` through every allocation,
//! and dropped when the run ends.  Persisted meetings are the source of
//! truth afterwards.
//!
//! The state is only written by [`AvailabilityState::record`], which the
//! allocator calls after a section has been fully committed.

use std::collections::BTreeMap;

use crate::conflict::conflicts_with_any;
use crate::model::{DayOfWeek, Meeting};

/// Booked meetings for one entity, per day.
///
/// `BTreeMap` so iteration runs Monday → Friday.
type DaySlots = BTreeMap<DayOfWeek, Vec<Meeting>>;

/// entity id → day → booked meetings.
#[derive(Debug, Clone, Default)]
pub struct AvailabilityState {
    booked: BTreeMap<u32, DaySlots>,
}

impl AvailabilityState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Meetings already recorded for `entity` on `day` (empty if none).
    pub fn booked(&self, entity: u32, day: DayOfWeek) -> &[Meeting] {
        self.booked
            .get(&entity)
            .and_then(|days| days.get(&day))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Sum of the durations already recorded for `entity` on `day`.
    pub fn booked_hours(&self, entity: u32, day: DayOfWeek) -> u32 {
        self.booked(entity, day).iter().map(Meeting::duration).sum()
    }

    /// Would `candidate` overlap anything recorded for `entity` on its day?
    pub fn conflicts_with(&self, entity: u32, candidate: &Meeting) -> bool {
        conflicts_with_any(candidate, self.booked(entity, candidate.day))
    }

    /// Append `meeting` to `entity`'s bookings for the meeting's day.
    pub fn record(&mut self, entity: u32, meeting: Meeting) {
        self.booked
            .entry(entity)
            .or_default()
            .entry(meeting.day)
            .or_default()
            .push(meeting);
    }

    /// Total booked hours for `entity` across the week.
    #[cfg(test)]
    pub(crate) fn weekly_hours(&self, entity: u32) -> u32 {
        self.booked
            .get(&entity)
            .map(|days| days.values().flatten().map(Meeting::duration).sum())
            .unwrap_or(0)
    }

    /// Returns `true` if nothing has been recorded.
    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.booked.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use DayOfWeek::*;

    #[test]
    fn unknown_entity_has_nothing_booked() {
        let state = AvailabilityState::new();
        assert!(state.is_empty());
        assert!(state.booked(42, Monday).is_empty());
        assert_eq!(state.booked_hours(42, Monday), 0);
        assert!(!state.conflicts_with(42, &Meeting::new(Monday, 9, 10)));
    }

    #[test]
    fn record_accumulates_hours_per_day() {
        let mut state = AvailabilityState::new();
        state.record(1, Meeting::new(Monday, 9, 11));
        state.record(1, Meeting::new(Monday, 13, 14));
        state.record(1, Meeting::new(Tuesday, 9, 10));

        assert_eq!(state.booked_hours(1, Monday), 3);
        assert_eq!(state.booked_hours(1, Tuesday), 1);
        assert_eq!(state.booked_hours(1, Wednesday), 0);
        assert_eq!(state.weekly_hours(1), 4);
        assert_eq!(state.weekly_hours(2), 0);
    }

    #[test]
    fn conflicts_are_scoped_to_entity_and_day() {
        let mut state = AvailabilityState::new();
        state.record(1, Meeting::new(Monday, 9, 11));

        assert!(state.conflicts_with(1, &Meeting::new(Monday, 10, 11)));
        assert!(!state.conflicts_with(1, &Meeting::new(Monday, 11, 12)));
        assert!(!state.conflicts_with(1, &Meeting::new(Tuesday, 9, 11)));
        assert!(!state.conflicts_with(2, &Meeting::new(Monday, 9, 11)));
    }
}
