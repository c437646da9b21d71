/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured results of generation and schedule reads.

use std::collections::BTreeSet;

use serde::Serialize;

use super::error::InfeasibleReason;
use crate::model::{
    ClassroomId, CourseId, CourseSection, Meeting, SectionId, Semester, SemesterId, TeacherId,
};
use crate::store::{CatalogStore, EnrollmentStore, StoreError};

/// One persisted section, resolved for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionView {
    pub id: SectionId,
    pub course_id: CourseId,
    pub course_code: String,
    pub course_name: String,
    pub teacher_id: TeacherId,
    pub teacher_name: String,
    pub classroom_id: ClassroomId,
    pub classroom_name: String,
    pub capacity: u32,
    pub enrolled_count: u32,
    pub remaining_capacity: u32,
    pub meetings: Vec<Meeting>,
}

/// A course for which not a single section could be created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnassignedCourse {
    pub course_id: CourseId,
    pub course_code: String,
    pub sections_requested: u32,
    pub reason: InfeasibleReason,
}

/// Counts and a human-readable line; always present, even on partial
/// success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleSummary {
    pub total_sections: usize,
    pub total_courses: usize,
    pub unassigned_courses: usize,
    pub message: String,
}

impl ScheduleSummary {
    pub fn new(sections: &[CourseSection], unassigned: usize) -> Self {
        let total_courses = sections
            .iter()
            .map(|s| s.course_id)
            .collect::<BTreeSet<_>>()
            .len();
        Self {
            total_sections: sections.len(),
            total_courses,
            unassigned_courses: unassigned,
            message: format!(
                "Generated {} sections for {} courses. {} courses could not be assigned.",
                sections.len(),
                total_courses,
                unassigned
            ),
        }
    }
}

/// Result of [`ScheduleGenerator::generate`](super::ScheduleGenerator::generate)
/// and [`ScheduleGenerator::get_schedule`](super::ScheduleGenerator::get_schedule).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleResponse {
    pub semester_id: SemesterId,
    pub semester_name: String,
    pub summary: ScheduleSummary,
    pub sections: Vec<SectionView>,
    pub unassigned: Vec<UnassignedCourse>,
}

impl ScheduleResponse {
    /// Resolve `sections` against the catalogue and enrollment counts.
    pub fn build<S>(
        store: &S,
        semester: &Semester,
        sections: &[CourseSection],
        unassigned: Vec<UnassignedCourse>,
    ) -> Result<Self, StoreError>
    where
        S: CatalogStore + EnrollmentStore + ?Sized,
    {
        let views = sections
            .iter()
            .map(|s| project_section(store, s))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            semester_id: semester.id,
            semester_name: semester.display_name(),
            summary: ScheduleSummary::new(sections, unassigned.len()),
            sections: views,
            unassigned,
        })
    }
}

/// Look up names and enrollment counts for one section.
///
/// Dangling references render as empty names rather than failing the read.
pub fn project_section<S>(store: &S, section: &CourseSection) -> Result<SectionView, StoreError>
where
    S: CatalogStore + EnrollmentStore + ?Sized,
{
    let course = store.course(section.course_id)?;
    let teacher = store.teacher(section.teacher_id)?;
    let classroom = store.classroom(section.classroom_id)?;
    let enrolled = store.count_by_section(section.id)?;

    Ok(SectionView {
        id: section.id,
        course_id: section.course_id,
        course_code: course.as_ref().map(|c| c.code.clone()).unwrap_or_default(),
        course_name: course.map(|c| c.name).unwrap_or_default(),
        teacher_id: section.teacher_id,
        teacher_name: teacher.map(|t| t.name).unwrap_or_default(),
        classroom_id: section.classroom_id,
        classroom_name: classroom.map(|c| c.name).unwrap_or_default(),
        capacity: section.capacity,
        enrolled_count: enrolled,
        remaining_capacity: section.capacity.saturating_sub(enrolled),
        meetings: section.meetings.clone(),
    })
}
