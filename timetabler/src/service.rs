/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Async facade owning the store.
//!
//! The engine itself is synchronous.  [`Timetabler`] wraps one store in an
//! `Arc<RwLock<_>>` so that generation and enrollment, the two writers, never
//! run concurrently against the same store, while read-only views share the
//! lock.  Cloning a `Timetabler` clones the handle, not the store.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::config::SchoolConfig;
use crate::enrollment::{EnrollOutcome, EnrollmentError, EnrollmentValidator, StudentPlan};
use crate::model::{SectionId, SemesterId, StudentId};
use crate::scheduler::{
    RoomUsage, ScheduleGenerator, ScheduleResponse, SchedulerError, TeacherWorkload,
};
use crate::store::Store;

pub struct Timetabler<S> {
    store: Arc<RwLock<S>>,
    generator: ScheduleGenerator,
    validator: EnrollmentValidator,
}

impl<S> Clone for Timetabler<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            generator: self.generator.clone(),
            validator: self.validator.clone(),
        }
    }
}

impl<S: Store> Timetabler<S> {
    pub fn new(store: S, config: Arc<SchoolConfig>) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            generator: ScheduleGenerator::new(Arc::clone(&config)),
            validator: EnrollmentValidator::new(config),
        }
    }

    pub fn config(&self) -> &SchoolConfig {
        self.generator.config()
    }

    // ── Writers ───────────────────────────────────────────────────────────────

    /// Regenerate the schedule of `semester_id`.
    pub async fn generate_schedule(
        &self,
        semester_id: SemesterId,
    ) -> Result<ScheduleResponse, SchedulerError> {
        let mut store = self.store.write().await;
        debug!(semester = semester_id, "store locked for generation");
        self.generator.generate(&mut *store, semester_id)
    }

    /// Validate and enroll `student_id` in `section_ids` as one batch.
    pub async fn validate_and_enroll(
        &self,
        student_id: StudentId,
        semester_id: SemesterId,
        section_ids: &[SectionId],
    ) -> Result<EnrollOutcome, EnrollmentError> {
        let mut store = self.store.write().await;
        debug!(student = student_id, "store locked for enrollment");
        self.validator
            .validate_and_enroll(&mut *store, student_id, semester_id, section_ids)
    }

    // ── Readers ───────────────────────────────────────────────────────────────

    pub async fn schedule(&self, semester_id: SemesterId) -> Result<ScheduleResponse, SchedulerError> {
        let store = self.store.read().await;
        self.generator.get_schedule(&*store, semester_id)
    }

    pub async fn student_plan(
        &self,
        student_id: StudentId,
        semester_id: SemesterId,
    ) -> Result<StudentPlan, EnrollmentError> {
        let store = self.store.read().await;
        self.validator.student_plan(&*store, student_id, semester_id)
    }

    pub async fn teacher_workload(
        &self,
        semester_id: SemesterId,
    ) -> Result<Vec<TeacherWorkload>, SchedulerError> {
        let store = self.store.read().await;
        self.generator.teacher_workload(&*store, semester_id)
    }

    pub async fn room_usage(&self, semester_id: SemesterId) -> Result<Vec<RoomUsage>, SchedulerError> {
        let store = self.store.read().await;
        self.generator.room_usage(&*store, semester_id)
    }

    /// Run `f` against the store under a read lock.
    pub async fn inspect<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        let store = self.store.read().await;
        f(&store)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
