/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Core data structures for the timetable engine.
//!
//! Catalogue records (courses, teachers, classrooms, …) are plain value
//! objects handed to the engine fully materialised by the store ports.
//! Two types are produced by the engine itself:
//!
//! ```text
//! Course ──(SectionAllocator)──►  NewSection  ──(ScheduleStore)──►  CourseSection
//!                                   ↑ no id yet                       ↑ persisted, id assigned
//! ```
//!
//! # Ownership model
//! A generation run borrows catalogue records from the store and owns its
//! per-run availability state.  Sections only come into existence through
//! [`ScheduleStore::create_section`](crate::store::ScheduleStore::create_section).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Identifiers ───────────────────────────────────────────────────────────────

pub type CourseId = u32;
pub type TeacherId = u32;
pub type ClassroomId = u32;
pub type RoomTypeId = u32;
pub type SpecializationId = u32;
pub type SemesterId = u32;
pub type StudentId = u32;
pub type SectionId = u32;
pub type EnrollmentId = u32;

// ── Day of week ───────────────────────────────────────────────────────────────

/// A teaching day.  Weekends are not representable.
///
/// `Ord` follows calendar order so `BTreeMap<DayOfWeek, _>` iterates
/// Monday → Friday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl DayOfWeek {
    /// All teaching days in allocation order.
    pub const ALL: [DayOfWeek; 5] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DayOfWeek::Monday => "MONDAY",
            DayOfWeek::Tuesday => "TUESDAY",
            DayOfWeek::Wednesday => "WEDNESDAY",
            DayOfWeek::Thursday => "THURSDAY",
            DayOfWeek::Friday => "FRIDAY",
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Meeting ───────────────────────────────────────────────────────────────────

/// A single weekly recurring block belonging to a section.
///
/// Times are whole clock hours (`start_hour = 9` means `09:00`).  The
/// interval is half-open: `[start_hour, end_hour)`.  Deserialisation
/// rejects a meeting that does not end after it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "MeetingEntry")]
pub struct Meeting {
    pub day: DayOfWeek,
    pub start_hour: u8,
    pub end_hour: u8,
}

impl Meeting {
    pub fn new(day: DayOfWeek, start_hour: u8, end_hour: u8) -> Self {
        debug_assert!(
            end_hour > start_hour,
            "meeting must end after it starts ({start_hour}..{end_hour})"
        );
        Self {
            day,
            start_hour,
            end_hour,
        }
    }

    /// Length of the meeting in hours.
    pub fn duration(&self) -> u32 {
        u32::from(self.end_hour.saturating_sub(self.start_hour))
    }

    /// Same-day half-open interval intersection.  See [`crate::conflict`].
    pub fn overlaps(&self, other: &Meeting) -> bool {
        crate::conflict::meetings_overlap(self, other)
    }

    /// `HH:00` rendering of the start time.
    pub fn start_time(&self) -> String {
        format!("{:02}:00", self.start_hour)
    }

    /// `HH:00` rendering of the end time.
    pub fn end_time(&self) -> String {
        format!("{:02}:00", self.end_hour)
    }
}

#[derive(Deserialize)]
struct MeetingEntry {
    day: DayOfWeek,
    start_hour: u8,
    end_hour: u8,
}

impl TryFrom<MeetingEntry> for Meeting {
    type Error = String;

    fn try_from(entry: MeetingEntry) -> Result<Self, Self::Error> {
        if entry.end_hour <= entry.start_hour {
            return Err(format!(
                "meeting on {} must end after it starts ({}..{})",
                entry.day, entry.start_hour, entry.end_hour
            ));
        }
        Ok(Self::new(entry.day, entry.start_hour, entry.end_hour))
    }
}

impl fmt::Display for Meeting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}-{}", self.day, self.start_time(), self.end_time())
    }
}

// ── Catalogue ─────────────────────────────────────────────────────────────────

/// Course classification.  Core courses are allocated before everything else.
///
/// Any type string other than `core` deserialises to [`CourseType::Elective`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseType {
    Core,
    #[default]
    #[serde(other)]
    Elective,
}

impl CourseType {
    pub fn is_core(self) -> bool {
        matches!(self, CourseType::Core)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub course_type: CourseType,
    pub hours_per_week: u32,
    pub specialization_id: SpecializationId,
    #[serde(default)]
    pub prerequisite_id: Option<CourseId>,
    /// Position of the semester (within an academic year) this course runs in.
    pub semester_order: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Teacher {
    pub id: TeacherId,
    #[serde(default)]
    pub name: String,
    pub specialization_id: SpecializationId,
    /// Carried for completeness; the allocator applies
    /// [`SchoolConfig::max_daily_teacher_hours`](crate::config::SchoolConfig::max_daily_teacher_hours).
    #[serde(default)]
    pub max_daily_hours: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Classroom {
    pub id: ClassroomId,
    #[serde(default)]
    pub name: String,
    pub room_type_id: RoomTypeId,
    pub capacity: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Specialization {
    pub id: SpecializationId,
    #[serde(default)]
    pub name: String,
    /// Room type courses of this specialization must be taught in.  `None`
    /// falls back to the configured default room type.
    #[serde(default)]
    pub room_type_id: Option<RoomTypeId>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Semester {
    pub id: SemesterId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub year: i32,
    pub order_in_year: u32,
}

impl Semester {
    /// `"Fall 2024"` style label.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.name, self.year)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryStatus {
    Passed,
    Failed,
}

/// One completed (passed or failed) course attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub student_id: StudentId,
    pub course_id: CourseId,
    pub semester_id: SemesterId,
    pub status: HistoryStatus,
}

// ── Generated schedule ────────────────────────────────────────────────────────

/// A section the allocator wants persisted.  Becomes a [`CourseSection`]
/// once the store assigns it an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSection {
    pub course_id: CourseId,
    pub teacher_id: TeacherId,
    pub classroom_id: ClassroomId,
    pub semester_id: SemesterId,
    pub capacity: u32,
    pub meetings: Vec<Meeting>,
}

/// One scheduled offering of a course: teacher + room + weekly meetings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseSection {
    pub id: SectionId,
    pub course_id: CourseId,
    pub teacher_id: TeacherId,
    pub classroom_id: ClassroomId,
    pub semester_id: SemesterId,
    /// Copied from the classroom at allocation time.
    pub capacity: u32,
    pub meetings: Vec<Meeting>,
}

impl CourseSection {
    pub fn from_new(id: SectionId, new: NewSection) -> Self {
        Self {
            id,
            course_id: new.course_id,
            teacher_id: new.teacher_id,
            classroom_id: new.classroom_id,
            semester_id: new.semester_id,
            capacity: new.capacity,
            meetings: new.meetings,
        }
    }

    /// Sum of meeting durations.
    pub fn weekly_hours(&self) -> u32 {
        self.meetings.iter().map(Meeting::duration).sum()
    }
}

// ── Enrollment ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct NewEnrollment {
    pub student_id: StudentId,
    pub section_id: SectionId,
    pub enrolled_at: DateTime<Utc>,
}

/// A student's seat in a section.  Unique per `(student_id, section_id)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub student_id: StudentId,
    pub section_id: SectionId,
    pub enrolled_at: DateTime<Utc>,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
