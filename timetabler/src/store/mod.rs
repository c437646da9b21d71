/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Persistence ports.
//!
//! The engine never reaches for storage directly: the scheduler and the
//! enrollment validator are generic over these traits and receive a store
//! explicitly from whoever assembles them.  Every lookup returns fully
//! materialised records.
//!
//! | Trait | Used by |
//! |---|---|
//! | [`CatalogStore`] | allocator, orchestrator, validator (read-only) |
//! | [`ScheduleStore`] | orchestrator (bulk delete), allocator (create), validator (read) |
//! | [`EnrollmentStore`] | validator |
//! | [`Transactional`] | orchestrator and validator entry points |
//!
//! [`MemoryStore`] is the in-process implementation.

pub mod dataset;
pub mod memory;

pub use dataset::Dataset;
pub use memory::MemoryStore;

use thiserror::Error;
use tracing::warn;

use crate::model::{
    Classroom, ClassroomId, Course, CourseId, CourseSection, Enrollment, HistoryRecord, Meeting,
    NewEnrollment, NewSection, RoomTypeId, SectionId, Semester, SemesterId, Specialization,
    SpecializationId, Student, StudentId, Teacher, TeacherId,
};

// ── Errors ────────────────────────────────────────────────────────────────────

/// Infrastructure-level failure reported by a store.
///
/// Any of these aborts the current operation; the caller's transaction is
/// rolled back so no partial writes survive.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("a transaction is already open")]
    TransactionAlreadyOpen,

    #[error("no transaction is open")]
    NoTransaction,

    #[error("course section {0} does not exist")]
    UnknownSection(SectionId),

    /// Conditional insert refused: seats for the section are exhausted.
    #[error("course section {section} is full (capacity {capacity})")]
    SectionFull { section: SectionId, capacity: u32 },

    /// Conditional insert refused: the `(student, section)` pair exists.
    #[error("student {student} is already enrolled in course section {section}")]
    DuplicateEnrollment {
        student: StudentId,
        section: SectionId,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

// ── Ports ─────────────────────────────────────────────────────────────────────

/// Read-only catalogue lookups.
///
/// Collection lookups return records in ascending id order.
pub trait CatalogStore {
    fn semester(&self, id: SemesterId) -> Result<Option<Semester>, StoreError>;
    fn student(&self, id: StudentId) -> Result<Option<Student>, StoreError>;
    fn course(&self, id: CourseId) -> Result<Option<Course>, StoreError>;
    fn teacher(&self, id: TeacherId) -> Result<Option<Teacher>, StoreError>;
    fn classroom(&self, id: ClassroomId) -> Result<Option<Classroom>, StoreError>;
    fn specialization(&self, id: SpecializationId) -> Result<Option<Specialization>, StoreError>;

    fn courses_by_semester_order(&self, order: u32) -> Result<Vec<Course>, StoreError>;
    fn teachers_by_specialization(
        &self,
        specialization: SpecializationId,
    ) -> Result<Vec<Teacher>, StoreError>;
    fn classrooms_by_room_type(&self, room_type: RoomTypeId) -> Result<Vec<Classroom>, StoreError>;
}

/// Generated sections and their meetings.
pub trait ScheduleStore {
    /// Remove every section (and its meetings) of `semester`.  Returns how
    /// many sections were removed.
    fn delete_sections_by_semester(&mut self, semester: SemesterId) -> Result<usize, StoreError>;

    /// Persist a section with its meetings, assigning a fresh id.
    fn create_section(&mut self, section: NewSection) -> Result<CourseSection, StoreError>;

    fn sections_by_semester(&self, semester: SemesterId) -> Result<Vec<CourseSection>, StoreError>;

    /// Sections for the given ids that exist; missing ids are skipped.
    fn sections_by_ids(&self, ids: &[SectionId]) -> Result<Vec<CourseSection>, StoreError>;

    fn meetings_by_section(&self, section: SectionId) -> Result<Vec<Meeting>, StoreError>;
}

/// Enrollments and course history.
pub trait EnrollmentStore {
    fn enrollments_by_student_and_semester(
        &self,
        student: StudentId,
        semester: SemesterId,
    ) -> Result<Vec<Enrollment>, StoreError>;

    fn count_by_section(&self, section: SectionId) -> Result<u32, StoreError>;

    /// Insert the whole batch or nothing.
    ///
    /// Implementations must re-check section capacity and `(student,
    /// section)` uniqueness atomically with the insert and fail with
    /// [`StoreError::SectionFull`] / [`StoreError::DuplicateEnrollment`].
    fn create_enrollments(
        &mut self,
        batch: Vec<NewEnrollment>,
    ) -> Result<Vec<Enrollment>, StoreError>;

    fn passed_courses_by_student(
        &self,
        student: StudentId,
    ) -> Result<Vec<HistoryRecord>, StoreError>;
}

/// Explicit transaction boundary.
pub trait Transactional {
    fn begin(&mut self) -> Result<(), StoreError>;
    fn commit(&mut self) -> Result<(), StoreError>;
    fn rollback(&mut self) -> Result<(), StoreError>;
}

/// Everything the engine needs from persistence.
pub trait Store: CatalogStore + ScheduleStore + EnrollmentStore + Transactional {}

impl<T> Store for T where T: CatalogStore + ScheduleStore + EnrollmentStore + Transactional + ?Sized {}

// ── Transaction helper ────────────────────────────────────────────────────────

/// Run `f` between `begin` and `commit`; roll back if `f` fails.
///
/// A failed rollback is logged and the original error is returned.
pub fn in_transaction<S, T, E, F>(store: &mut S, f: F) -> Result<T, E>
where
    S: Transactional + ?Sized,
    E: From<StoreError>,
    F: FnOnce(&mut S) -> Result<T, E>,
{
    store.begin()?;
    match f(store) {
        Ok(value) => {
            store.commit()?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_err) = store.rollback() {
                warn!(error = %rollback_err, "rollback failed");
            }
            Err(e)
        }
    }
}
