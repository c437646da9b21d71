/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Read-only load reports over a persisted semester schedule.

use std::collections::btree_map::{BTreeMap, Entry};

use serde::Serialize;
use tracing::{debug, warn};

use super::error::SchedulerError;
use crate::config::SchoolConfig;
use crate::model::{ClassroomId, DayOfWeek, SemesterId, TeacherId};
use crate::store::{CatalogStore, ScheduleStore};

/// Weekly load of one teacher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeacherWorkload {
    pub teacher_id: TeacherId,
    pub teacher_name: String,
    pub total_hours_per_week: u32,
    /// Only days with at least one meeting appear.
    pub hours_per_day: BTreeMap<DayOfWeek, u32>,
    pub section_count: usize,
}

/// Weekly occupancy of one classroom.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomUsage {
    pub room_id: ClassroomId,
    pub room_name: String,
    pub total_sections: usize,
    pub total_hours_per_week: u32,
    /// Share of the teachable week, 0–100.
    pub utilization_percentage: f64,
}

/// One entry per teacher with at least one section, ordered by teacher id.
pub fn teacher_workload<S>(
    store: &S,
    semester_id: SemesterId,
) -> Result<Vec<TeacherWorkload>, SchedulerError>
where
    S: CatalogStore + ScheduleStore + ?Sized,
{
    if store.semester(semester_id)?.is_none() {
        return Err(SchedulerError::SemesterNotFound(semester_id));
    }

    let mut by_teacher: BTreeMap<TeacherId, TeacherWorkload> = BTreeMap::new();
    for section in store.sections_by_semester(semester_id)? {
        let entry = match by_teacher.entry(section.teacher_id) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => {
                let teacher_name = store
                    .teacher(section.teacher_id)?
                    .map(|t| t.name)
                    .unwrap_or_default();
                e.insert(TeacherWorkload {
                    teacher_id: section.teacher_id,
                    teacher_name,
                    total_hours_per_week: 0,
                    hours_per_day: BTreeMap::new(),
                    section_count: 0,
                })
            }
        };

        entry.section_count += 1;
        for meeting in &section.meetings {
            entry.total_hours_per_week += meeting.duration();
            *entry.hours_per_day.entry(meeting.day).or_default() += meeting.duration();
        }
    }

    debug!(semester = semester_id, teachers = by_teacher.len(), "teacher workload computed");
    Ok(by_teacher.into_values().collect())
}

/// One entry per classroom with at least one section, ordered by room id.
pub fn room_usage<S>(
    store: &S,
    config: &SchoolConfig,
    semester_id: SemesterId,
) -> Result<Vec<RoomUsage>, SchedulerError>
where
    S: CatalogStore + ScheduleStore + ?Sized,
{
    if store.semester(semester_id)?.is_none() {
        return Err(SchedulerError::SemesterNotFound(semester_id));
    }

    let mut by_room: BTreeMap<ClassroomId, (usize, u32)> = BTreeMap::new();
    for section in store.sections_by_semester(semester_id)? {
        let (sections, hours) = by_room.entry(section.classroom_id).or_default();
        *sections += 1;
        *hours += section.weekly_hours();
    }

    let weekly_capacity = config.teachable_hours_per_day() * DayOfWeek::ALL.len() as u32;
    if weekly_capacity == 0 {
        warn!("school config leaves no teachable hours; utilisation reported as 0");
    }

    let mut usage = Vec::with_capacity(by_room.len());
    for (room_id, (total_sections, total_hours_per_week)) in by_room {
        let room_name = store
            .classroom(room_id)?
            .map(|c| c.name)
            .unwrap_or_default();
        let utilization_percentage = if weekly_capacity == 0 {
            0.0
        } else {
            f64::from(total_hours_per_week) * 100.0 / f64::from(weekly_capacity)
        };
        usage.push(RoomUsage {
            room_id,
            room_name,
            total_sections,
            total_hours_per_week,
            utilization_percentage,
        });
    }
    Ok(usage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Classroom, Meeting, NewSection, Semester, Teacher};
    use crate::store::MemoryStore;
    use DayOfWeek::*;

    fn store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.insert_semester(Semester {
            id: 1,
            name: "Fall".into(),
            year: 2024,
            order_in_year: 1,
        });
        store.insert_semester(Semester {
            id: 2,
            name: "Spring".into(),
            year: 2025,
            order_in_year: 2,
        });
        for id in 1..=2 {
            store.insert_teacher(Teacher {
                id,
                name: format!("T{id}"),
                specialization_id: 1,
                max_daily_hours: None,
            });
            store.insert_classroom(Classroom {
                id,
                name: format!("R{id}"),
                room_type_id: 1,
                capacity: 30,
            });
        }
        store
    }

    fn add(store: &mut MemoryStore, semester: u32, teacher: u32, room: u32, meetings: Vec<Meeting>) {
        store
            .create_section(NewSection {
                course_id: 1,
                teacher_id: teacher,
                classroom_id: room,
                semester_id: semester,
                capacity: 30,
                meetings,
            })
            .unwrap();
    }

    #[test]
    fn workload_sums_hours_per_teacher_and_day() {
        let mut s = store();
        add(&mut s, 1, 2, 1, vec![Meeting::new(Monday, 9, 11), Meeting::new(Tuesday, 9, 11)]);
        add(&mut s, 1, 2, 2, vec![Meeting::new(Monday, 13, 14)]);
        add(&mut s, 1, 1, 1, vec![Meeting::new(Friday, 9, 10)]);
        add(&mut s, 2, 1, 1, vec![Meeting::new(Friday, 13, 15)]);

        let report = teacher_workload(&s, 1).unwrap();
        assert_eq!(report.len(), 2);
        assert_eq!(report[0].teacher_id, 1);
        assert_eq!(report[0].total_hours_per_week, 1, "other semester excluded");

        let t2 = &report[1];
        assert_eq!(t2.teacher_name, "T2");
        assert_eq!(t2.section_count, 2);
        assert_eq!(t2.total_hours_per_week, 5);
        assert_eq!(t2.hours_per_day[&Monday], 3);
        assert_eq!(t2.hours_per_day[&Tuesday], 2);
        assert!(!t2.hours_per_day.contains_key(&Wednesday));
    }

    #[test]
    fn room_usage_against_teachable_week() {
        let mut s = store();
        // 35 teachable hours per week with the default day.
        add(&mut s, 1, 1, 2, vec![Meeting::new(Monday, 9, 11), Meeting::new(Tuesday, 9, 11)]);
        add(&mut s, 1, 2, 2, vec![Meeting::new(Wednesday, 9, 12)]);

        let report = room_usage(&s, &SchoolConfig::default(), 1).unwrap();
        assert_eq!(report.len(), 1);
        let r2 = &report[0];
        assert_eq!(r2.room_id, 2);
        assert_eq!(r2.room_name, "R2");
        assert_eq!(r2.total_sections, 2);
        assert_eq!(r2.total_hours_per_week, 7);
        assert!((r2.utilization_percentage - 20.0).abs() < 1e-9);
    }

    #[test]
    fn empty_semester_gives_empty_reports() {
        let s = store();
        assert!(teacher_workload(&s, 1).unwrap().is_empty());
        assert!(room_usage(&s, &SchoolConfig::default(), 1).unwrap().is_empty());
    }

    #[test]
    fn unknown_semester_is_reported() {
        let s = store();
        assert!(matches!(
            teacher_workload(&s, 9),
            Err(SchedulerError::SemesterNotFound(9))
        ));
        assert!(matches!(
            room_usage(&s, &SchoolConfig::default(), 9),
            Err(SchedulerError::SemesterNotFound(9))
        ));
    }
}
