/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! In-process implementation of the persistence ports.
//!
//! Tables are `BTreeMap`s keyed by id, so every collection lookup returns
//! records in ascending id order.  Transactions snapshot the tables on
//! `begin` and restore them on `rollback`.  Id sequences sit outside the
//! snapshot, like database sequences: an id handed out once is never
//! handed out again, even after a rollback or a bulk delete.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::{CatalogStore, EnrollmentStore, ScheduleStore, StoreError, Transactional};
use crate::model::{
    Classroom, ClassroomId, Course, CourseId, CourseSection, Enrollment, EnrollmentId,
    HistoryRecord, HistoryStatus, Meeting, NewEnrollment, NewSection, RoomTypeId, SectionId,
    Semester, SemesterId, Specialization, SpecializationId, Student, StudentId, Teacher,
    TeacherId,
};

#[derive(Debug, Clone, Default)]
struct Tables {
    specializations: BTreeMap<SpecializationId, Specialization>,
    classrooms: BTreeMap<ClassroomId, Classroom>,
    teachers: BTreeMap<TeacherId, Teacher>,
    courses: BTreeMap<CourseId, Course>,
    semesters: BTreeMap<SemesterId, Semester>,
    students: BTreeMap<StudentId, Student>,
    history: Vec<HistoryRecord>,
    sections: BTreeMap<SectionId, CourseSection>,
    enrollments: BTreeMap<EnrollmentId, Enrollment>,
}

/// `BTreeMap`-backed store with snapshot transactions.
#[derive(Debug)]
pub struct MemoryStore {
    tables: Tables,
    snapshot: Option<Tables>,
    next_section_id: SectionId,
    next_enrollment_id: EnrollmentId,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            tables: Tables::default(),
            snapshot: None,
            next_section_id: 1,
            next_enrollment_id: 1,
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Seeding ───────────────────────────────────────────────────────────────

    pub fn insert_specialization(&mut self, s: Specialization) {
        self.tables.specializations.insert(s.id, s);
    }

    pub fn insert_classroom(&mut self, c: Classroom) {
        self.tables.classrooms.insert(c.id, c);
    }

    pub fn insert_teacher(&mut self, t: Teacher) {
        self.tables.teachers.insert(t.id, t);
    }

    pub fn insert_course(&mut self, c: Course) {
        self.tables.courses.insert(c.id, c);
    }

    pub fn insert_semester(&mut self, s: Semester) {
        self.tables.semesters.insert(s.id, s);
    }

    pub fn insert_student(&mut self, s: Student) {
        self.tables.students.insert(s.id, s);
    }

    pub fn insert_history(&mut self, h: HistoryRecord) {
        self.tables.history.push(h);
    }

    // ── Introspection ─────────────────────────────────────────────────────────

    pub fn section_count(&self) -> usize {
        self.tables.sections.len()
    }

    pub fn enrollment_count(&self) -> usize {
        self.tables.enrollments.len()
    }

    pub fn has_open_transaction(&self) -> bool {
        self.snapshot.is_some()
    }

    fn enrolled_in(&self, section: SectionId) -> u32 {
        self.tables
            .enrollments
            .values()
            .filter(|e| e.section_id == section)
            .count() as u32
    }
}

// ── CatalogStore ──────────────────────────────────────────────────────────────

impl CatalogStore for MemoryStore {
    fn semester(&self, id: SemesterId) -> Result<Option<Semester>, StoreError> {
        Ok(self.tables.semesters.get(&id).cloned())
    }

    fn student(&self, id: StudentId) -> Result<Option<Student>, StoreError> {
        Ok(self.tables.students.get(&id).cloned())
    }

    fn course(&self, id: CourseId) -> Result<Option<Course>, StoreError> {
        Ok(self.tables.courses.get(&id).cloned())
    }

    fn teacher(&self, id: TeacherId) -> Result<Option<Teacher>, StoreError> {
        Ok(self.tables.teachers.get(&id).cloned())
    }

    fn classroom(&self, id: ClassroomId) -> Result<Option<Classroom>, StoreError> {
        Ok(self.tables.classrooms.get(&id).cloned())
    }

    fn specialization(&self, id: SpecializationId) -> Result<Option<Specialization>, StoreError> {
        Ok(self.tables.specializations.get(&id).cloned())
    }

    fn courses_by_semester_order(&self, order: u32) -> Result<Vec<Course>, StoreError> {
        Ok(self
            .tables
            .courses
            .values()
            .filter(|c| c.semester_order == order)
            .cloned()
            .collect())
    }

    fn teachers_by_specialization(
        &self,
        specialization: SpecializationId,
    ) -> Result<Vec<Teacher>, StoreError> {
        Ok(self
            .tables
            .teachers
            .values()
            .filter(|t| t.specialization_id == specialization)
            .cloned()
            .collect())
    }

    fn classrooms_by_room_type(&self, room_type: RoomTypeId) -> Result<Vec<Classroom>, StoreError> {
        Ok(self
            .tables
            .classrooms
            .values()
            .filter(|c| c.room_type_id == room_type)
            .cloned()
            .collect())
    }
}

// ── ScheduleStore ─────────────────────────────────────────────────────────────

impl ScheduleStore for MemoryStore {
    fn delete_sections_by_semester(&mut self, semester: SemesterId) -> Result<usize, StoreError> {
        let doomed: BTreeSet<SectionId> = self
            .tables
            .sections
            .values()
            .filter(|s| s.semester_id == semester)
            .map(|s| s.id)
            .collect();

        self.tables.sections.retain(|id, _| !doomed.contains(id));
        // Enrollments cannot outlive their section.
        self.tables
            .enrollments
            .retain(|_, e| !doomed.contains(&e.section_id));

        debug!(semester, removed = doomed.len(), "sections deleted");
        Ok(doomed.len())
    }

    fn create_section(&mut self, section: NewSection) -> Result<CourseSection, StoreError> {
        let id = self.next_section_id;
        self.next_section_id += 1;

        let created = CourseSection::from_new(id, section);
        self.tables.sections.insert(id, created.clone());
        Ok(created)
    }

    fn sections_by_semester(&self, semester: SemesterId) -> Result<Vec<CourseSection>, StoreError> {
        Ok(self
            .tables
            .sections
            .values()
            .filter(|s| s.semester_id == semester)
            .cloned()
            .collect())
    }

    fn sections_by_ids(&self, ids: &[SectionId]) -> Result<Vec<CourseSection>, StoreError> {
        let wanted: BTreeSet<SectionId> = ids.iter().copied().collect();
        Ok(wanted
            .into_iter()
            .filter_map(|id| self.tables.sections.get(&id).cloned())
            .collect())
    }

    fn meetings_by_section(&self, section: SectionId) -> Result<Vec<Meeting>, StoreError> {
        Ok(self
            .tables
            .sections
            .get(&section)
            .map(|s| s.meetings.clone())
            .unwrap_or_default())
    }
}

// ── EnrollmentStore ───────────────────────────────────────────────────────────

impl EnrollmentStore for MemoryStore {
    fn enrollments_by_student_and_semester(
        &self,
        student: StudentId,
        semester: SemesterId,
    ) -> Result<Vec<Enrollment>, StoreError> {
        Ok(self
            .tables
            .enrollments
            .values()
            .filter(|e| e.student_id == student)
            .filter(|e| {
                self.tables
                    .sections
                    .get(&e.section_id)
                    .is_some_and(|s| s.semester_id == semester)
            })
            .cloned()
            .collect())
    }

    fn count_by_section(&self, section: SectionId) -> Result<u32, StoreError> {
        Ok(self.enrolled_in(section))
    }

    fn create_enrollments(
        &mut self,
        batch: Vec<NewEnrollment>,
    ) -> Result<Vec<Enrollment>, StoreError> {
        // Check the whole batch first so a refusal leaves no rows behind.
        let mut seats_taken: BTreeMap<SectionId, u32> = BTreeMap::new();
        let mut pairs: BTreeSet<(StudentId, SectionId)> = self
            .tables
            .enrollments
            .values()
            .map(|e| (e.student_id, e.section_id))
            .collect();

        for new in &batch {
            let section = self
                .tables
                .sections
                .get(&new.section_id)
                .ok_or(StoreError::UnknownSection(new.section_id))?;

            if !pairs.insert((new.student_id, new.section_id)) {
                return Err(StoreError::DuplicateEnrollment {
                    student: new.student_id,
                    section: new.section_id,
                });
            }

            let taken = seats_taken
                .entry(new.section_id)
                .or_insert_with(|| self.enrolled_in(new.section_id));
            if *taken >= section.capacity {
                return Err(StoreError::SectionFull {
                    section: section.id,
                    capacity: section.capacity,
                });
            }
            *taken += 1;
        }

        let mut created = Vec::with_capacity(batch.len());
        for new in batch {
            let id = self.next_enrollment_id;
            self.next_enrollment_id += 1;
            let enrollment = Enrollment {
                id,
                student_id: new.student_id,
                section_id: new.section_id,
                enrolled_at: new.enrolled_at,
            };
            self.tables.enrollments.insert(id, enrollment.clone());
            created.push(enrollment);
        }
        Ok(created)
    }

    fn passed_courses_by_student(
        &self,
        student: StudentId,
    ) -> Result<Vec<HistoryRecord>, StoreError> {
        Ok(self
            .tables
            .history
            .iter()
            .filter(|h| h.student_id == student && h.status == HistoryStatus::Passed)
            .cloned()
            .collect())
    }
}

// ── Transactional ─────────────────────────────────────────────────────────────

impl Transactional for MemoryStore {
    fn begin(&mut self) -> Result<(), StoreError> {
        if self.snapshot.is_some() {
            return Err(StoreError::TransactionAlreadyOpen);
        }
        self.snapshot = Some(self.tables.clone());
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        self.snapshot.take().map(|_| ()).ok_or(StoreError::NoTransaction)
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        let snapshot = self.snapshot.take().ok_or(StoreError::NoTransaction)?;
        self.tables = snapshot;
        debug!("transaction rolled back");
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DayOfWeek;
    use chrono::Utc;

    fn seeded() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.insert_semester(Semester {
            id: 1,
            name: "Fall".into(),
            year: 2024,
            order_in_year: 1,
        });
        store.insert_student(Student {
            id: 10,
            name: "Ada".into(),
        });
        store.insert_student(Student {
            id: 11,
            name: "Grace".into(),
        });
        store
    }

    fn new_section(semester: SemesterId, capacity: u32) -> NewSection {
        NewSection {
            course_id: 1,
            teacher_id: 1,
            classroom_id: 1,
            semester_id: semester,
            capacity,
            meetings: vec![Meeting::new(DayOfWeek::Monday, 9, 11)],
        }
    }

    fn seat(student: StudentId, section: SectionId) -> NewEnrollment {
        NewEnrollment {
            student_id: student,
            section_id: section,
            enrolled_at: Utc::now(),
        }
    }

    #[test]
    fn section_ids_are_never_reused() {
        let mut store = seeded();
        let a = store.create_section(new_section(1, 30)).unwrap();
        let b = store.create_section(new_section(1, 30)).unwrap();
        assert_eq!(store.delete_sections_by_semester(1).unwrap(), 2);

        let c = store.create_section(new_section(1, 30)).unwrap();
        assert!(c.id > a.id && c.id > b.id);
        assert_eq!(store.section_count(), 1);
    }

    #[test]
    fn delete_only_touches_requested_semester() {
        let mut store = seeded();
        store.create_section(new_section(1, 30)).unwrap();
        let other = store.create_section(new_section(2, 30)).unwrap();

        store.delete_sections_by_semester(1).unwrap();
        let left = store.sections_by_semester(2).unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, other.id);
        assert!(store.sections_by_semester(1).unwrap().is_empty());
    }

    #[test]
    fn deleting_sections_drops_their_enrollments() {
        let mut store = seeded();
        let s = store.create_section(new_section(1, 30)).unwrap();
        store.create_enrollments(vec![seat(10, s.id)]).unwrap();
        assert_eq!(store.enrollment_count(), 1);

        store.delete_sections_by_semester(1).unwrap();
        assert_eq!(store.enrollment_count(), 0);
    }

    #[test]
    fn rollback_restores_tables() {
        let mut store = seeded();
        let kept = store.create_section(new_section(1, 30)).unwrap();

        store.begin().unwrap();
        assert!(store.has_open_transaction());
        store.delete_sections_by_semester(1).unwrap();
        store.create_section(new_section(1, 30)).unwrap();
        store.rollback().unwrap();

        let sections = store.sections_by_semester(1).unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].id, kept.id);
        assert!(!store.has_open_transaction());
    }

    #[test]
    fn nested_begin_and_stray_commit_are_errors() {
        let mut store = seeded();
        assert_eq!(store.commit(), Err(StoreError::NoTransaction));
        assert_eq!(store.rollback(), Err(StoreError::NoTransaction));
        store.begin().unwrap();
        assert_eq!(store.begin(), Err(StoreError::TransactionAlreadyOpen));
        store.commit().unwrap();
    }

    #[test]
    fn conditional_insert_refuses_over_capacity_batch() {
        let mut store = seeded();
        let s = store.create_section(new_section(1, 1)).unwrap();

        let err = store
            .create_enrollments(vec![seat(10, s.id), seat(11, s.id)])
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::SectionFull {
                section: s.id,
                capacity: 1
            }
        );
        assert_eq!(store.enrollment_count(), 0, "batch must be all-or-nothing");
    }

    #[test]
    fn conditional_insert_refuses_duplicates() {
        let mut store = seeded();
        let s = store.create_section(new_section(1, 30)).unwrap();
        store.create_enrollments(vec![seat(10, s.id)]).unwrap();

        let err = store.create_enrollments(vec![seat(10, s.id)]).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEnrollment { .. }));
        assert_eq!(store.count_by_section(s.id).unwrap(), 1);
    }

    #[test]
    fn enrollments_are_filtered_by_semester() {
        let mut store = seeded();
        let fall = store.create_section(new_section(1, 30)).unwrap();
        let spring = store.create_section(new_section(2, 30)).unwrap();
        store
            .create_enrollments(vec![seat(10, fall.id), seat(10, spring.id)])
            .unwrap();

        let fall_only = store.enrollments_by_student_and_semester(10, 1).unwrap();
        assert_eq!(fall_only.len(), 1);
        assert_eq!(fall_only[0].section_id, fall.id);
    }

    #[test]
    fn sections_by_ids_skips_missing() {
        let mut store = seeded();
        let s = store.create_section(new_section(1, 30)).unwrap();
        let found = store.sections_by_ids(&[s.id, 999]).unwrap();
        assert_eq!(found.len(), 1);
    }
}
