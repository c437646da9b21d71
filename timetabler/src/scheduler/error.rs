/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error types for timetable generation.
//!
//! Two layers, matching how failures propagate:
//!
//! * [`InfeasibleReason`]: why one course could not be placed.  Local and
//!   non-fatal: the course is reported as unassigned and generation goes on.
//! * [`SchedulerError`]: aborts the whole call (unknown semester, store
//!   failure).  The generation transaction is rolled back.
//!
//! [`AllocationError`] is what a single allocator call returns; the
//! orchestrator splits it into the two layers above.

use serde::Serialize;
use thiserror::Error;

use crate::model::{RoomTypeId, SemesterId, SpecializationId};
use crate::store::StoreError;

// ── Infeasibility ─────────────────────────────────────────────────────────────

/// Why the allocator could not produce a section for a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InfeasibleReason {
    /// No teacher holds the course's specialization.
    NoQualifiedTeacher { specialization: SpecializationId },

    /// The course references a specialization the catalogue does not know.
    SpecializationNotFound { specialization: SpecializationId },

    /// No classroom of the required room type exists.
    NoRoomOfType { room_type: RoomTypeId },

    /// Every teacher × room pair was tried and none could cover the weekly
    /// hours within the week.
    NoTimeSlots { hours_needed: u32, pairs_tried: usize },

    /// The course requires zero weekly hours, so no meeting can be produced.
    NoWeeklyHours,
}

impl std::fmt::Display for InfeasibleReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InfeasibleReason::NoQualifiedTeacher { specialization } => write!(
                f,
                "no teacher found for specialization {}",
                specialization
            ),

            InfeasibleReason::SpecializationNotFound { specialization } => {
                write!(f, "specialization {} not found", specialization)
            }

            InfeasibleReason::NoRoomOfType { room_type } => {
                write!(f, "no classroom of room type {}", room_type)
            }

            InfeasibleReason::NoTimeSlots {
                hours_needed,
                pairs_tried,
            } => write!(
                f,
                "no time slots covering {}h/week across {} teacher/room pair(s)",
                hours_needed, pairs_tried
            ),

            InfeasibleReason::NoWeeklyHours => write!(f, "course has no weekly hours"),
        }
    }
}

// ── Allocation ────────────────────────────────────────────────────────────────

/// Failure of a single [`SectionAllocator::allocate`] call.
///
/// [`SectionAllocator::allocate`]: super::allocator::SectionAllocator::allocate
#[derive(Debug, Error)]
pub enum AllocationError {
    #[error("course '{course}' cannot be placed: {reason}")]
    Infeasible {
        course: String,
        reason: InfeasibleReason,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

// ── Top-level scheduler errors ────────────────────────────────────────────────

/// Error returned by [`ScheduleGenerator`](super::ScheduleGenerator)
/// operations.
///
/// | Variant | Caller sees |
/// |---|---|
/// | `SemesterNotFound` | not found, nothing was touched |
/// | `Store` | infrastructure failure, transaction rolled back |
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("semester {0} not found")]
    SemesterNotFound(SemesterId),

    #[error("storage failure during scheduling: {0}")]
    Store(#[from] StoreError),
}
