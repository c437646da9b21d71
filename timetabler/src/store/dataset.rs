/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! YAML school dataset used to seed a [`MemoryStore`].
//!
//! ```yaml
//! specializations:
//!   - { id: 1, name: Mathematics }
//!   - { id: 2, name: Chemistry, room_type_id: 2 }
//! classrooms:
//!   - { id: 1, name: Room 101, room_type_id: 1, capacity: 30 }
//! teachers:
//!   - { id: 1, name: Ms. Rivera, specialization_id: 1 }
//! courses:
//!   - { id: 1, code: MAT101, course_type: core, hours_per_week: 4,
//!       specialization_id: 1, semester_order: 1 }
//! semesters:
//!   - { id: 1, name: Fall, year: 2024, order_in_year: 1 }
//! students:
//!   - { id: 1, name: Sam }
//! history:
//!   - { student_id: 1, course_id: 1, semester_id: 1, status: passed }
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

use super::MemoryStore;
use crate::model::{
    Classroom, Course, HistoryRecord, Semester, Specialization, Student, Teacher,
};

/// Every catalogue table, as read from YAML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Dataset {
    pub specializations: Vec<Specialization>,
    pub classrooms: Vec<Classroom>,
    pub teachers: Vec<Teacher>,
    pub courses: Vec<Course>,
    pub semesters: Vec<Semester>,
    pub students: Vec<Student>,
    pub history: Vec<HistoryRecord>,
}

impl Dataset {
    /// Parse and check a dataset file.
    ///
    /// # Errors
    /// Fails if the file cannot be read, the YAML does not match the
    /// layout above, or [`check`](Self::check) rejects it.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading school dataset from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open dataset file: {}", path.display()))?;
        let dataset: Dataset = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML file: {}", path.display()))?;

        dataset
            .check()
            .with_context(|| format!("Inconsistent dataset: {}", path.display()))?;

        info!(
            specializations = dataset.specializations.len(),
            classrooms = dataset.classrooms.len(),
            teachers = dataset.teachers.len(),
            courses = dataset.courses.len(),
            semesters = dataset.semesters.len(),
            students = dataset.students.len(),
            history = dataset.history.len(),
            "dataset loaded"
        );
        Ok(dataset)
    }

    /// Reject duplicate ids and dangling references that would make the
    /// generator silently skip data.
    pub fn check(&self) -> Result<()> {
        fn unique<I: IntoIterator<Item = u32>>(table: &str, ids: I) -> Result<BTreeSet<u32>> {
            let mut seen = BTreeSet::new();
            for id in ids {
                if !seen.insert(id) {
                    bail!("duplicate {table} id {id}");
                }
            }
            Ok(seen)
        }

        let specs = unique("specialization", self.specializations.iter().map(|s| s.id))?;
        unique("classroom", self.classrooms.iter().map(|c| c.id))?;
        unique("teacher", self.teachers.iter().map(|t| t.id))?;
        let courses = unique("course", self.courses.iter().map(|c| c.id))?;
        let semesters = unique("semester", self.semesters.iter().map(|s| s.id))?;
        let students = unique("student", self.students.iter().map(|s| s.id))?;

        for t in &self.teachers {
            if !specs.contains(&t.specialization_id) {
                bail!(
                    "teacher {} references unknown specialization {}",
                    t.id,
                    t.specialization_id
                );
            }
        }
        for c in &self.courses {
            if !specs.contains(&c.specialization_id) {
                bail!(
                    "course {} references unknown specialization {}",
                    c.code,
                    c.specialization_id
                );
            }
            if let Some(pre) = c.prerequisite_id {
                if !courses.contains(&pre) {
                    bail!("course {} references unknown prerequisite {}", c.code, pre);
                }
            }
        }
        for h in &self.history {
            if !students.contains(&h.student_id)
                || !courses.contains(&h.course_id)
                || !semesters.contains(&h.semester_id)
            {
                warn!(
                    student = h.student_id,
                    course = h.course_id,
                    semester = h.semester_id,
                    "history record references unknown entity"
                );
            }
        }
        Ok(())
    }

    /// Seed a fresh [`MemoryStore`] with every table.
    pub fn into_store(self) -> MemoryStore {
        let mut store = MemoryStore::new();
        self.specializations
            .into_iter()
            .for_each(|s| store.insert_specialization(s));
        self.classrooms
            .into_iter()
            .for_each(|c| store.insert_classroom(c));
        self.teachers.into_iter().for_each(|t| store.insert_teacher(t));
        self.courses.into_iter().for_each(|c| store.insert_course(c));
        self.semesters
            .into_iter()
            .for_each(|s| store.insert_semester(s));
        self.students.into_iter().for_each(|s| store.insert_student(s));
        self.history.into_iter().for_each(|h| store.insert_history(h));
        store
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
