/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! First-fit section allocation for a single course.
//!
//! For one course the allocator walks qualified teachers × rooms of the
//! required type (both ascending by id) and, for each pair, tries to lay the
//! course's weekly hours out over Monday → Friday.  The first pair that
//! covers every hour is committed:
//!
//! 1. the section and its meetings are persisted, then
//! 2. every meeting is recorded in the teacher and room availability state.
//!
//! A pair that covers only part of the hours leaves no trace: the search
//! reads the availability state but never writes it.
//!
//! # Slot search
//! Per day at most one meeting is placed.  Its length is capped by the hours
//! still needed, the teacher's remaining daily allowance and the maximum
//! session length.  Start hours are tried earliest first; for each start,
//! the longest allowed duration first.  A shorter meeting at an earlier hour
//! therefore wins over a longer one later in the day.
//!
//! This is greedy: no earlier commitment is ever revisited to make room for
//! a later course.

use tracing::{debug, info, warn};

use super::error::{AllocationError, InfeasibleReason};
use crate::availability::AvailabilityState;
use crate::config::SchoolConfig;
use crate::conflict::conflicts_with_any;
use crate::model::{
    ClassroomId, Course, CourseSection, DayOfWeek, Meeting, NewSection, Semester, TeacherId,
};
use crate::store::{CatalogStore, ScheduleStore};

/// Allocates sections for courses under the constraints of a
/// [`SchoolConfig`].
#[derive(Debug, Clone, Copy)]
pub struct SectionAllocator<'a> {
    config: &'a SchoolConfig,
}

impl<'a> SectionAllocator<'a> {
    pub fn new(config: &'a SchoolConfig) -> Self {
        Self { config }
    }

    /// Create one section of `course` in `semester`.
    ///
    /// On success the section is persisted and both availability states
    /// include its meetings.  On failure neither the store nor the
    /// availability states have changed.
    ///
    /// # Errors
    /// [`AllocationError::Infeasible`] when no teacher, room, or time-slot
    /// combination works; [`AllocationError::Store`] on storage failure.
    pub fn allocate<S>(
        &self,
        store: &mut S,
        course: &Course,
        semester: &Semester,
        teacher_avail: &mut AvailabilityState,
        room_avail: &mut AvailabilityState,
    ) -> Result<CourseSection, AllocationError>
    where
        S: CatalogStore + ScheduleStore + ?Sized,
    {
        let infeasible = |reason: InfeasibleReason| AllocationError::Infeasible {
            course: course.code.clone(),
            reason,
        };

        if course.hours_per_week == 0 {
            warn!(course = %course.code, "course has no weekly hours");
            return Err(infeasible(InfeasibleReason::NoWeeklyHours));
        }

        // ── Candidate teachers ────────────────────────────────────────────────
        let mut teachers = store.teachers_by_specialization(course.specialization_id)?;
        if teachers.is_empty() {
            warn!(
                course = %course.code,
                specialization = course.specialization_id,
                "no teachers found for specialization"
            );
            return Err(infeasible(InfeasibleReason::NoQualifiedTeacher {
                specialization: course.specialization_id,
            }));
        }
        teachers.sort_by_key(|t| t.id);

        // ── Candidate rooms ───────────────────────────────────────────────────
        let Some(specialization) = store.specialization(course.specialization_id)? else {
            warn!(
                course = %course.code,
                specialization = course.specialization_id,
                "specialization not found"
            );
            return Err(infeasible(InfeasibleReason::SpecializationNotFound {
                specialization: course.specialization_id,
            }));
        };

        let room_type = match specialization.room_type_id {
            Some(id) => id,
            None => {
                debug!(
                    specialization = %specialization.name,
                    default_room_type = self.config.default_room_type_id,
                    "specialization has no room type, using default"
                );
                self.config.default_room_type_id
            }
        };

        let mut rooms = store.classrooms_by_room_type(room_type)?;
        if rooms.is_empty() {
            warn!(
                course = %course.code,
                room_type = room_type,
                specialization = %specialization.name,
                "no rooms found for room type"
            );
            return Err(infeasible(InfeasibleReason::NoRoomOfType { room_type }));
        }
        rooms.sort_by_key(|r| r.id);

        debug!(
            course = %course.code,
            hours_per_week = course.hours_per_week,
            teachers = teachers.len(),
            rooms = rooms.len(),
            "searching teacher × room pairs"
        );

        // ── Teacher × room search ─────────────────────────────────────────────
        for teacher in &teachers {
            for room in &rooms {
                let Some(meetings) = self.find_full_week_assignment(
                    course.hours_per_week,
                    teacher.id,
                    room.id,
                    teacher_avail,
                    room_avail,
                ) else {
                    continue;
                };

                // Persist first, then book: availability only ever reflects
                // committed sections.
                let section = store.create_section(NewSection {
                    course_id: course.id,
                    teacher_id: teacher.id,
                    classroom_id: room.id,
                    semester_id: semester.id,
                    capacity: room.capacity,
                    meetings,
                })?;

                for meeting in &section.meetings {
                    teacher_avail.record(teacher.id, *meeting);
                    room_avail.record(room.id, *meeting);
                }

                info!(
                    course  = %course.code,
                    section = section.id,
                    teacher = teacher.id,
                    room    = room.id,
                    meetings = section.meetings.len(),
                    "✓ section allocated"
                );
                return Ok(section);
            }
        }

        warn!(
            course = %course.code,
            hours_per_week = course.hours_per_week,
            "✗ no available time slots for any teacher/room pair"
        );
        Err(infeasible(InfeasibleReason::NoTimeSlots {
            hours_needed: course.hours_per_week,
            pairs_tried: teachers.len() * rooms.len(),
        }))
    }

    /// Lay `hours_needed` hours out over the week for one teacher/room pair.
    ///
    /// Returns the meetings (at most one per day) only if they cover every
    /// hour; `None` otherwise.  Never mutates the availability states.
    pub fn find_full_week_assignment(
        &self,
        hours_needed: u32,
        teacher: TeacherId,
        room: ClassroomId,
        teacher_avail: &AvailabilityState,
        room_avail: &AvailabilityState,
    ) -> Option<Vec<Meeting>> {
        let cap = self.config.max_daily_teacher_hours;
        let max_session = u32::from(self.config.max_session_hours);

        let mut remaining = hours_needed;
        let mut meetings = Vec::new();

        for day in DayOfWeek::ALL {
            if remaining == 0 {
                break;
            }

            let booked = teacher_avail.booked_hours(teacher, day);
            if booked >= cap {
                continue;
            }

            // ≤ max_session_hours, so it fits in a u8
            let length = remaining.min(cap - booked).min(max_session) as u8;

            if let Some(slot) = self.find_slot(
                day,
                length,
                teacher_avail.booked(teacher, day),
                room_avail.booked(room, day),
            ) {
                remaining -= slot.duration();
                meetings.push(slot);
            }
        }

        if remaining > 0 || meetings.is_empty() {
            debug!(
                teacher,
                room,
                hours_needed,
                remaining,
                "could not cover weekly hours"
            );
            return None;
        }
        Some(meetings)
    }

    /// Earliest free slot on `day`, at most `max_len` hours long and at least
    /// `min_session_hours`.
    ///
    /// A slot must lie inside school hours, stay clear of lunch, and not
    /// overlap either `teacher_booked` or `room_booked`.
    pub fn find_slot(
        &self,
        day: DayOfWeek,
        max_len: u8,
        teacher_booked: &[Meeting],
        room_booked: &[Meeting],
    ) -> Option<Meeting> {
        let cfg = self.config;

        for start in cfg.school_start_hour..cfg.school_end_hour {
            if start >= cfg.lunch_start_hour && start < cfg.lunch_end_hour {
                continue;
            }

            for duration in (cfg.min_session_hours..=max_len).rev() {
                let Some(end) = start.checked_add(duration) else {
                    continue;
                };
                if !cfg.within_school_hours(start, end) || cfg.overlaps_lunch(start, end) {
                    continue;
                }

                let candidate = Meeting::new(day, start, end);
                if !conflicts_with_any(&candidate, teacher_booked)
                    && !conflicts_with_any(&candidate, room_booked)
                {
                    return Some(candidate);
                }
            }
        }
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
