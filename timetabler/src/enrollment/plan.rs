/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Student planning view: what is on offer and what would clash.

use std::collections::BTreeSet;

use serde::Serialize;

use super::error::EnrollmentError;
use crate::conflict::has_time_conflict;
use crate::model::{CourseId, Meeting, SemesterId, StudentId};
use crate::scheduler::summary::{project_section, SectionView};
use crate::store::{CatalogStore, EnrollmentStore, ScheduleStore};

/// A section the student is not enrolled in yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvailableSection {
    #[serde(flatten)]
    pub section: SectionView,
    pub prerequisites_met: bool,
    pub has_time_conflict: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentPlan {
    pub student_id: StudentId,
    pub student_name: String,
    pub semester_id: SemesterId,
    pub semester_name: String,
    pub available_sections: Vec<AvailableSection>,
    pub enrolled_sections: Vec<SectionView>,
}

/// Build the planning view of `semester_id` for `student_id`.
///
/// Flags are advisory: enrolling still goes through the full validation.
pub fn student_plan<S>(
    store: &S,
    student_id: StudentId,
    semester_id: SemesterId,
) -> Result<StudentPlan, EnrollmentError>
where
    S: CatalogStore + ScheduleStore + EnrollmentStore + ?Sized,
{
    let student = store
        .student(student_id)?
        .ok_or(EnrollmentError::StudentNotFound(student_id))?;
    let semester = store
        .semester(semester_id)?
        .ok_or(EnrollmentError::SemesterNotFound(semester_id))?;

    let enrolled_ids: BTreeSet<_> = store
        .enrollments_by_student_and_semester(student_id, semester_id)?
        .into_iter()
        .map(|e| e.section_id)
        .collect();
    let passed: BTreeSet<CourseId> = store
        .passed_courses_by_student(student_id)?
        .into_iter()
        .map(|h| h.course_id)
        .collect();

    let mut enrolled_meetings: Vec<Meeting> = Vec::new();
    for id in &enrolled_ids {
        enrolled_meetings.extend(store.meetings_by_section(*id)?);
    }

    let mut available_sections = Vec::new();
    let mut enrolled_sections = Vec::new();

    for section in store.sections_by_semester(semester_id)? {
        let view = project_section(store, &section)?;
        if enrolled_ids.contains(&section.id) {
            enrolled_sections.push(view);
            continue;
        }

        let prerequisites_met = match store.course(section.course_id)? {
            Some(course) => course
                .prerequisite_id
                .map_or(true, |pre| passed.contains(&pre)),
            None => true,
        };
        let conflict = has_time_conflict(&section.meetings, &enrolled_meetings);

        available_sections.push(AvailableSection {
            section: view,
            prerequisites_met,
            has_time_conflict: conflict,
            conflict_reason: conflict.then(|| "Time conflict with enrolled courses".to_string()),
        });
    }

    Ok(StudentPlan {
        student_id: student.id,
        student_name: student.name,
        semester_id: semester.id,
        semester_name: semester.display_name(),
        available_sections,
        enrolled_sections,
    })
}
