/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! All-or-nothing batch enrollment.
//!
//! [`EnrollmentValidator::validate_and_enroll`] checks a student's requested
//! sections against every rule, collecting all violations instead of
//! stopping at the first, and writes either every enrollment or none.
//!
//! | Rule | Message |
//! |---|---|
//! | course limit | `Cannot enroll in more than {max} courses per semester` |
//! | unknown id | `One or more course sections not found` |
//! | prerequisite not passed | `Missing prerequisite for course {code}` |
//! | no seats left | `Course section {id} is full` |
//! | clash with enrolled sections | `Time conflict with course section {id}` |
//! | clash inside the request | `Time conflict between selected course sections` |
//!
//! The seat check is repeated by the store's conditional batch insert, so a
//! seat taken between validation and insert still rejects the request.

pub mod error;
pub mod plan;

pub use error::{EnrollmentError, EnrollmentViolation, ViolationKind};
pub use plan::{student_plan, AvailableSection, StudentPlan};

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::SchoolConfig;
use crate::conflict::has_time_conflict;
use crate::model::{CourseId, Enrollment, Meeting, NewEnrollment, SectionId, SemesterId, StudentId};
use crate::store::{in_transaction, CatalogStore, EnrollmentStore, ScheduleStore, Store, StoreError};

// ── Outcome ───────────────────────────────────────────────────────────────────

/// Result of an enrollment request that reached validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EnrollOutcome {
    Enrolled {
        message: String,
        enrollments: Vec<Enrollment>,
    },
    Rejected {
        message: String,
        errors: Vec<EnrollmentViolation>,
    },
}

impl EnrollOutcome {
    fn enrolled(enrollments: Vec<Enrollment>) -> Self {
        EnrollOutcome::Enrolled {
            message: format!("Successfully enrolled in {} course(s)", enrollments.len()),
            enrollments,
        }
    }

    fn rejected(errors: Vec<EnrollmentViolation>) -> Self {
        EnrollOutcome::Rejected {
            message: "Enrollment validation failed".into(),
            errors,
        }
    }

    pub fn is_enrolled(&self) -> bool {
        matches!(self, EnrollOutcome::Enrolled { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            EnrollOutcome::Enrolled { message, .. } | EnrollOutcome::Rejected { message, .. } => {
                message
            }
        }
    }

    /// Violations of a rejected request; empty when enrolled.
    pub fn errors(&self) -> &[EnrollmentViolation] {
        match self {
            EnrollOutcome::Enrolled { .. } => &[],
            EnrollOutcome::Rejected { errors, .. } => errors,
        }
    }
}

// ── EnrollmentValidator ───────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct EnrollmentValidator {
    config: Arc<SchoolConfig>,
}

impl EnrollmentValidator {
    pub fn new(config: Arc<SchoolConfig>) -> Self {
        Self { config }
    }

    /// Check `section_ids` for `student_id` in `semester_id` without writing.
    ///
    /// Returns every violation found; an empty list means the request can be
    /// enrolled as is.
    ///
    /// # Errors
    /// Unknown student or semester, or a storage failure.
    pub fn validate<S>(
        &self,
        store: &S,
        student_id: StudentId,
        semester_id: SemesterId,
        section_ids: &[SectionId],
    ) -> Result<Vec<EnrollmentViolation>, EnrollmentError>
    where
        S: CatalogStore + ScheduleStore + EnrollmentStore + ?Sized,
    {
        if store.student(student_id)?.is_none() {
            return Err(EnrollmentError::StudentNotFound(student_id));
        }
        if store.semester(semester_id)?.is_none() {
            return Err(EnrollmentError::SemesterNotFound(semester_id));
        }

        let mut violations = Vec::new();

        if section_ids.is_empty() {
            violations.push(EnrollmentViolation::new(
                ViolationKind::EmptyRequest,
                "No course sections selected",
            ));
            return Ok(violations);
        }

        // ── Course limit ──────────────────────────────────────────────────────
        let current = store.enrollments_by_student_and_semester(student_id, semester_id)?;
        let max = self.config.max_courses_per_semester;
        if current.len() + section_ids.len() > max as usize {
            violations.push(EnrollmentViolation::new(
                ViolationKind::TooManyCourses,
                format!("Cannot enroll in more than {max} courses per semester"),
            ));
        }

        // ── Resolve sections ──────────────────────────────────────────────────
        let mut seen = BTreeSet::new();
        let mut requested = Vec::with_capacity(section_ids.len());
        for &id in section_ids {
            if seen.insert(id) {
                requested.push(id);
            } else {
                violations.push(EnrollmentViolation::for_section(
                    ViolationKind::DuplicateSection,
                    id,
                    format!("Course section {id} requested more than once"),
                ));
            }
        }

        let found: BTreeMap<SectionId, _> = store
            .sections_by_ids(&requested)?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();
        if found.len() != requested.len() {
            violations.push(EnrollmentViolation::new(
                ViolationKind::SectionNotFound,
                "One or more course sections not found",
            ));
        }

        // ── Student context ───────────────────────────────────────────────────
        let passed: BTreeSet<CourseId> = store
            .passed_courses_by_student(student_id)?
            .into_iter()
            .map(|h| h.course_id)
            .collect();
        let enrolled_sections: BTreeSet<SectionId> =
            current.iter().map(|e| e.section_id).collect();

        let mut enrolled_meetings: Vec<Meeting> = Vec::new();
        for section in &enrolled_sections {
            enrolled_meetings.extend(store.meetings_by_section(*section)?);
        }

        // ── Per-section rules, in request order ───────────────────────────────
        let mut batch_meetings: Vec<Meeting> = Vec::new();

        for section in requested.iter().filter_map(|id| found.get(id)) {
            if section.semester_id != semester_id {
                violations.push(EnrollmentViolation::for_section(
                    ViolationKind::SectionNotInSemester,
                    section.id,
                    format!(
                        "Course section {} is not offered in semester {}",
                        section.id, semester_id
                    ),
                ));
                continue;
            }

            if enrolled_sections.contains(&section.id) {
                violations.push(EnrollmentViolation::for_section(
                    ViolationKind::AlreadyEnrolled,
                    section.id,
                    format!("Already enrolled in course section {}", section.id),
                ));
                continue;
            }

            if let Some(course) = store.course(section.course_id)? {
                if let Some(prerequisite) = course.prerequisite_id {
                    if !passed.contains(&prerequisite) {
                        violations.push(EnrollmentViolation::for_section(
                            ViolationKind::MissingPrerequisite,
                            section.id,
                            format!("Missing prerequisite for course {}", course.code),
                        ));
                    }
                }
            }

            let enrolled = store.count_by_section(section.id)?;
            if enrolled >= section.capacity {
                violations.push(EnrollmentViolation::for_section(
                    ViolationKind::SectionFull,
                    section.id,
                    format!("Course section {} is full", section.id),
                ));
            }

            if has_time_conflict(&section.meetings, &enrolled_meetings) {
                violations.push(EnrollmentViolation::for_section(
                    ViolationKind::ConflictWithEnrolled,
                    section.id,
                    format!("Time conflict with course section {}", section.id),
                ));
            }

            if has_time_conflict(&section.meetings, &batch_meetings) {
                violations.push(EnrollmentViolation::for_section(
                    ViolationKind::ConflictWithinRequest,
                    section.id,
                    "Time conflict between selected course sections",
                ));
            }

            batch_meetings.extend(section.meetings.iter().copied());
        }

        debug!(
            student = student_id,
            semester = semester_id,
            requested = section_ids.len(),
            violations = violations.len(),
            "enrollment request validated"
        );
        Ok(violations)
    }

    /// Validate and, if every rule holds, enroll the student in all
    /// requested sections in one batch.
    ///
    /// A rejected request writes nothing.
    pub fn validate_and_enroll<S>(
        &self,
        store: &mut S,
        student_id: StudentId,
        semester_id: SemesterId,
        section_ids: &[SectionId],
    ) -> Result<EnrollOutcome, EnrollmentError>
    where
        S: Store + ?Sized,
    {
        info!(
            student = student_id,
            semester = semester_id,
            sections = ?section_ids,
            "enrollment requested"
        );

        in_transaction(store, |store| {
            let violations = self.validate(&*store, student_id, semester_id, section_ids)?;
            if !violations.is_empty() {
                for v in &violations {
                    warn!(student = student_id, kind = ?v.kind, "{}", v.message);
                }
                return Ok(EnrollOutcome::rejected(violations));
            }

            let enrolled_at = Utc::now();
            let batch = section_ids
                .iter()
                .map(|&section_id| NewEnrollment {
                    student_id,
                    section_id,
                    enrolled_at,
                })
                .collect();

            match store.create_enrollments(batch) {
                Ok(enrollments) => {
                    info!(
                        student = student_id,
                        enrolled = enrollments.len(),
                        "✓ enrollment committed"
                    );
                    Ok(EnrollOutcome::enrolled(enrollments))
                }
                Err(e) => Ok(refused_insert(e)?),
            }
        })
    }

    /// Planning view of `semester_id` for `student_id`.
    pub fn student_plan<S>(
        &self,
        store: &S,
        student_id: StudentId,
        semester_id: SemesterId,
    ) -> Result<StudentPlan, EnrollmentError>
    where
        S: CatalogStore + ScheduleStore + EnrollmentStore + ?Sized,
    {
        plan::student_plan(store, student_id, semester_id)
    }
}

/// Turn a refused conditional insert into a rejection; pass other store
/// failures through.
fn refused_insert(err: StoreError) -> Result<EnrollOutcome, StoreError> {
    let violation = match err {
        StoreError::SectionFull { section, .. } => EnrollmentViolation::for_section(
            ViolationKind::SectionFull,
            section,
            format!("Course section {section} is full"),
        ),
        StoreError::DuplicateEnrollment { section, .. } => EnrollmentViolation::for_section(
            ViolationKind::AlreadyEnrolled,
            section,
            format!("Already enrolled in course section {section}"),
        ),
        other => return Err(other),
    };
    warn!(kind = ?violation.kind, "conditional insert refused: {}", violation.message);
    Ok(EnrollOutcome::rejected(vec![violation]))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Course, DayOfWeek, HistoryRecord, HistoryStatus, NewSection, Semester, Student,
    };
    use crate::store::MemoryStore;
    use DayOfWeek::*;

    // ── Test helpers ──────────────────────────────────────────────────────────

    /// Semesters 1 and 2; students 1 (passed course 1) and 2 (no history);
    /// course 2 requires course 1.
    fn store() -> MemoryStore {
        let mut store = MemoryStore::new();
        for (id, order) in [(1, 1), (2, 2)] {
            store.insert_semester(Semester {
                id,
                name: "Term".into(),
                year: 2024,
                order_in_year: order,
            });
        }
        for id in 1..=2 {
            store.insert_student(Student {
                id,
                name: format!("S{id}"),
            });
        }
        store.insert_course(Course {
            id: 1,
            code: "MAT101".into(),
            hours_per_week: 2,
            ..Default::default()
        });
        store.insert_course(Course {
            id: 2,
            code: "MAT201".into(),
            hours_per_week: 2,
            prerequisite_id: Some(1),
            ..Default::default()
        });
        store.insert_course(Course {
            id: 3,
            code: "ART101".into(),
            hours_per_week: 2,
            ..Default::default()
        });
        store.insert_history(HistoryRecord {
            student_id: 1,
            course_id: 1,
            semester_id: 1,
            status: HistoryStatus::Passed,
        });
        store
    }

    fn section(store: &mut MemoryStore, course: u32, capacity: u32, meeting: Meeting) -> SectionId {
        section_in(store, 1, course, capacity, meeting)
    }

    fn section_in(
        store: &mut MemoryStore,
        semester: u32,
        course: u32,
        capacity: u32,
        meeting: Meeting,
    ) -> SectionId {
        store
            .create_section(NewSection {
                course_id: course,
                teacher_id: 1,
                classroom_id: 1,
                semester_id: semester,
                capacity,
                meetings: vec![meeting],
            })
            .unwrap()
            .id
    }

    fn validator() -> EnrollmentValidator {
        EnrollmentValidator::new(Arc::new(SchoolConfig::default()))
    }

    fn messages(outcome: &EnrollOutcome) -> Vec<&str> {
        outcome.errors().iter().map(|v| v.message.as_str()).collect()
    }

    fn kinds(outcome: &EnrollOutcome) -> Vec<ViolationKind> {
        outcome.errors().iter().map(|v| v.kind).collect()
    }

    // ── Accepted ──────────────────────────────────────────────────────────────

    #[test]
    fn valid_batch_is_enrolled() {
        let mut s = store();
        let a = section(&mut s, 1, 30, Meeting::new(Monday, 9, 11));
        let b = section(&mut s, 2, 30, Meeting::new(Tuesday, 9, 11));

        let outcome = validator().validate_and_enroll(&mut s, 1, 1, &[a, b]).unwrap();

        assert!(outcome.is_enrolled());
        assert_eq!(outcome.message(), "Successfully enrolled in 2 course(s)");
        let EnrollOutcome::Enrolled { enrollments, .. } = &outcome else {
            panic!("expected Enrolled, got {outcome:?}");
        };
        assert_eq!(enrollments.len(), 2);
        assert_eq!(enrollments[0].enrolled_at, enrollments[1].enrolled_at);
        assert_eq!(s.enrollment_count(), 2);
        assert_eq!(s.count_by_section(a).unwrap(), 1);
        assert!(!s.has_open_transaction());
    }

    #[test]
    fn back_to_back_sections_do_not_conflict() {
        let mut s = store();
        let a = section(&mut s, 1, 30, Meeting::new(Monday, 9, 11));
        let b = section(&mut s, 3, 30, Meeting::new(Monday, 11, 12));

        let outcome = validator().validate_and_enroll(&mut s, 1, 1, &[a, b]).unwrap();
        assert!(outcome.is_enrolled(), "{outcome:?}");
    }

    // ── Rejected ──────────────────────────────────────────────────────────────

    #[test]
    fn sixth_course_is_rejected_and_nothing_written() {
        let mut s = store();
        let days = [Monday, Tuesday, Wednesday, Thursday, Friday];
        let taken: Vec<SectionId> = days
            .iter()
            .map(|&d| section(&mut s, 3, 30, Meeting::new(d, 9, 10)))
            .collect();
        let v = validator();
        assert!(v.validate_and_enroll(&mut s, 1, 1, &taken).unwrap().is_enrolled());

        let extra = section(&mut s, 3, 30, Meeting::new(Monday, 14, 15));
        let outcome = v.validate_and_enroll(&mut s, 1, 1, &[extra]).unwrap();

        assert!(!outcome.is_enrolled());
        assert_eq!(outcome.message(), "Enrollment validation failed");
        assert_eq!(
            messages(&outcome),
            vec!["Cannot enroll in more than 5 courses per semester"]
        );
        assert_eq!(s.enrollment_count(), 5);
    }

    #[test]
    fn unknown_section_is_reported() {
        let mut s = store();
        let a = section(&mut s, 1, 30, Meeting::new(Monday, 9, 11));

        let outcome = validator().validate_and_enroll(&mut s, 1, 1, &[a, 999]).unwrap();
        assert_eq!(messages(&outcome), vec!["One or more course sections not found"]);
        assert_eq!(s.enrollment_count(), 0, "valid section not enrolled either");
    }

    #[test]
    fn missing_prerequisite_is_reported() {
        let mut s = store();
        let adv = section(&mut s, 2, 30, Meeting::new(Monday, 9, 11));

        let outcome = validator().validate_and_enroll(&mut s, 2, 1, &[adv]).unwrap();
        assert_eq!(messages(&outcome), vec!["Missing prerequisite for course MAT201"]);
    }

    #[test]
    fn full_section_is_reported() {
        let mut s = store();
        let small = section(&mut s, 3, 1, Meeting::new(Monday, 9, 11));
        let v = validator();
        assert!(v.validate_and_enroll(&mut s, 2, 1, &[small]).unwrap().is_enrolled());

        let outcome = v.validate_and_enroll(&mut s, 1, 1, &[small]).unwrap();
        assert_eq!(messages(&outcome), vec![format!("Course section {small} is full")]);
        assert_eq!(s.count_by_section(small).unwrap(), 1);
    }

    #[test]
    fn conflict_with_enrolled_section() {
        let mut s = store();
        let a = section(&mut s, 1, 30, Meeting::new(Monday, 9, 11));
        let b = section(&mut s, 3, 30, Meeting::new(Monday, 10, 12));
        let v = validator();
        assert!(v.validate_and_enroll(&mut s, 1, 1, &[a]).unwrap().is_enrolled());

        let outcome = v.validate_and_enroll(&mut s, 1, 1, &[b]).unwrap();
        assert_eq!(
            messages(&outcome),
            vec![format!("Time conflict with course section {b}")]
        );
    }

    #[test]
    fn conflict_inside_request() {
        let mut s = store();
        let a = section(&mut s, 1, 30, Meeting::new(Monday, 9, 11));
        let b = section(&mut s, 3, 30, Meeting::new(Monday, 10, 12));

        let outcome = validator().validate_and_enroll(&mut s, 1, 1, &[a, b]).unwrap();
        assert_eq!(kinds(&outcome), vec![ViolationKind::ConflictWithinRequest]);
        assert_eq!(
            messages(&outcome),
            vec!["Time conflict between selected course sections"]
        );
        assert_eq!(outcome.errors()[0].section, Some(b));
        assert_eq!(s.enrollment_count(), 0);
    }

    #[test]
    fn every_violation_is_collected() {
        let mut s = store();
        let small = section(&mut s, 3, 1, Meeting::new(Tuesday, 9, 11));
        let adv = section(&mut s, 2, 30, Meeting::new(Monday, 9, 11));
        let v = validator();
        assert!(v.validate_and_enroll(&mut s, 1, 1, &[small]).unwrap().is_enrolled());

        let outcome = v.validate_and_enroll(&mut s, 2, 1, &[small, adv, 999]).unwrap();
        assert_eq!(
            kinds(&outcome),
            vec![
                ViolationKind::SectionNotFound,
                ViolationKind::SectionFull,
                ViolationKind::MissingPrerequisite,
            ]
        );
    }

    #[test]
    fn duplicate_and_already_enrolled_sections() {
        let mut s = store();
        let a = section(&mut s, 1, 30, Meeting::new(Monday, 9, 11));
        let b = section(&mut s, 3, 30, Meeting::new(Tuesday, 9, 11));
        let v = validator();
        assert!(v.validate_and_enroll(&mut s, 1, 1, &[a]).unwrap().is_enrolled());

        let outcome = v.validate_and_enroll(&mut s, 1, 1, &[a, b, b]).unwrap();
        assert_eq!(
            kinds(&outcome),
            vec![ViolationKind::DuplicateSection, ViolationKind::AlreadyEnrolled]
        );
        assert_eq!(s.enrollment_count(), 1);
    }

    #[test]
    fn section_of_another_semester_is_rejected() {
        let mut s = store();
        let spring = section_in(&mut s, 2, 1, 30, Meeting::new(Monday, 9, 11));

        let outcome = validator().validate_and_enroll(&mut s, 1, 1, &[spring]).unwrap();
        assert_eq!(
            messages(&outcome),
            vec![format!("Course section {spring} is not offered in semester 1")]
        );
    }

    #[test]
    fn empty_request_is_rejected() {
        let mut s = store();
        let outcome = validator().validate_and_enroll(&mut s, 1, 1, &[]).unwrap();
        assert_eq!(kinds(&outcome), vec![ViolationKind::EmptyRequest]);
    }

    // ── Errors ────────────────────────────────────────────────────────────────

    #[test]
    fn unknown_student_or_semester_is_an_error() {
        let mut s = store();
        let a = section(&mut s, 1, 30, Meeting::new(Monday, 9, 11));
        let v = validator();

        assert!(matches!(
            v.validate_and_enroll(&mut s, 42, 1, &[a]),
            Err(EnrollmentError::StudentNotFound(42))
        ));
        assert!(matches!(
            v.validate_and_enroll(&mut s, 1, 42, &[a]),
            Err(EnrollmentError::SemesterNotFound(42))
        ));
        assert_eq!(s.enrollment_count(), 0);
        assert!(!s.has_open_transaction());
    }

    #[test]
    fn refused_insert_becomes_rejection() {
        let full = refused_insert(StoreError::SectionFull {
            section: 7,
            capacity: 20,
        })
        .unwrap();
        assert_eq!(messages(&full), vec!["Course section 7 is full"]);

        let dup = refused_insert(StoreError::DuplicateEnrollment {
            student: 1,
            section: 7,
        })
        .unwrap();
        assert_eq!(kinds(&dup), vec![ViolationKind::AlreadyEnrolled]);

        assert_eq!(
            refused_insert(StoreError::NoTransaction).unwrap_err(),
            StoreError::NoTransaction
        );
    }

    #[test]
    fn validate_alone_writes_nothing() {
        let mut s = store();
        let a = section(&mut s, 1, 30, Meeting::new(Monday, 9, 11));

        let violations = validator().validate(&s, 1, 1, &[a]).unwrap();
        assert!(violations.is_empty());
        assert_eq!(s.enrollment_count(), 0);
    }
}
