/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Time conflict detection.
//!
//! A single primitive shared by the section allocator (teacher / room
//! double-booking) and the enrollment validator (student double-booking).
//!
//! Two meetings conflict when they fall on the same day and their half-open
//! hour intervals intersect:
//!
//! ```text
//! [start1, end1) ∩ [start2, end2) ≠ ∅   ⇔   ¬(end1 ≤ start2 ∨ end2 ≤ start1)
//! ```
//!
//! Back-to-back meetings (`09:00-10:00` then `10:00-11:00`) do **not**
//! conflict.

use crate::model::{DayOfWeek, Meeting};

// ── Public API ────────────────────────────────────────────────────────────────

/// Do `[start1, end1)` on `day1` and `[start2, end2)` on `day2` overlap?
///
/// Returns `false` immediately when the days differ.  Symmetric in its two
/// operands.
pub fn overlaps(
    day1: DayOfWeek,
    start1: u8,
    end1: u8,
    day2: DayOfWeek,
    start2: u8,
    end2: u8,
) -> bool {
    if day1 != day2 {
        return false;
    }
    !(end1 <= start2 || end2 <= start1)
}

/// [`overlaps`] applied to two [`Meeting`]s.
pub fn meetings_overlap(a: &Meeting, b: &Meeting) -> bool {
    overlaps(
        a.day,
        a.start_hour,
        a.end_hour,
        b.day,
        b.start_hour,
        b.end_hour,
    )
}

/// Does `candidate` overlap any meeting in `existing`?
pub fn conflicts_with_any(candidate: &Meeting, existing: &[Meeting]) -> bool {
    existing.iter().any(|m| meetings_overlap(candidate, m))
}

/// `true` iff some meeting in `a` overlaps some meeting in `b`.
///
/// Either slice being empty yields `false`.
pub fn has_time_conflict(a: &[Meeting], b: &[Meeting]) -> bool {
    a.iter().any(|m| conflicts_with_any(m, b))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use DayOfWeek::*;

    fn m(day: DayOfWeek, start: u8, end: u8) -> Meeting {
        Meeting::new(day, start, end)
    }

    #[test]
    fn partial_overlap_conflicts() {
        // Meetings are hour-granular, so a staggered start is expressed as
        // 9-11 against 10-12.
        assert!(meetings_overlap(&m(Monday, 9, 10), &m(Monday, 9, 11)));
        assert!(overlaps(Monday, 9, 11, Monday, 10, 12));
    }

    #[test]
    fn adjacent_meetings_do_not_conflict() {
        assert!(!meetings_overlap(&m(Monday, 9, 10), &m(Monday, 10, 11)));
        assert!(!meetings_overlap(&m(Monday, 10, 11), &m(Monday, 9, 10)));
    }

    #[test]
    fn different_days_never_conflict() {
        assert!(!meetings_overlap(&m(Monday, 9, 10), &m(Tuesday, 9, 10)));
        assert!(!overlaps(Monday, 9, 17, Friday, 9, 17));
    }

    #[test]
    fn identical_meetings_conflict() {
        let a = m(Wednesday, 14, 16);
        assert!(meetings_overlap(&a, &a));
    }

    #[test]
    fn containment_conflicts() {
        assert!(meetings_overlap(&m(Thursday, 9, 12), &m(Thursday, 10, 11)));
        assert!(meetings_overlap(&m(Thursday, 10, 11), &m(Thursday, 9, 12)));
    }

    #[test]
    fn overlap_is_symmetric_over_all_hour_pairs() {
        for s1 in 9..17u8 {
            for e1 in (s1 + 1)..=17 {
                for s2 in 9..17u8 {
                    for e2 in (s2 + 1)..=17 {
                        assert_eq!(
                            overlaps(Monday, s1, e1, Monday, s2, e2),
                            overlaps(Monday, s2, e2, Monday, s1, e1),
                            "asymmetric for [{s1},{e1}) vs [{s2},{e2})"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn set_conflict_detects_any_pair() {
        let enrolled = vec![m(Monday, 9, 10), m(Wednesday, 13, 15)];
        let clash = vec![m(Tuesday, 9, 10), m(Wednesday, 14, 15)];
        let free = vec![m(Tuesday, 9, 10), m(Wednesday, 15, 16)];
        assert!(has_time_conflict(&clash, &enrolled));
        assert!(!has_time_conflict(&free, &enrolled));
    }

    #[test]
    fn empty_sets_never_conflict() {
        let some = vec![m(Monday, 9, 10)];
        assert!(!has_time_conflict(&[], &some));
        assert!(!has_time_conflict(&some, &[]));
        assert!(!has_time_conflict(&[], &[]));
    }
}
