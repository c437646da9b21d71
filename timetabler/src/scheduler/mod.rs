//! Semester timetable generation.
//!
//! [`ScheduleGenerator`] rebuilds the whole schedule of one semester:
//!
//! 1. every existing section of the semester is deleted,
//! 2. the semester's courses are ordered by priority,
//! 3. each course gets [`sections_needed`] calls to the
//!    [`SectionAllocator`], all sharing one pair of availability states,
//! 4. the created sections and the courses that got none are summarised.
//!
//! Steps 1–4 run inside a single store transaction, so a storage failure
//! leaves the previous schedule in place.
//!
//! # Design decisions
//!
//! | Topic | Choice |
//! |---|---|
//! | State | Stateless `generate()`; availability maps are local to the call |
//! | Course order | core first, then weekly hours descending, then course id ascending |
//! | Teacher / room order | ascending id |
//! | Infeasible course | reported in the summary, generation continues |
//! | Partial fulfilment | kept (a course with 1 of 2 sections is scheduled) |
//! | Atomicity | explicit `begin` / `commit` / `rollback` via [`in_transaction`] |
//!
//! # Example
//! ```rust,ignore
//! let generator = ScheduleGenerator::new(Arc::new(SchoolConfig::default()));
//! let response = generator.generate(&mut store, semester_id)?;
//! println!("{}", response.summary.message);
//! ```

pub mod allocator;
pub mod error;
pub mod summary;
pub mod workload;

pub use allocator::SectionAllocator;
pub use error::{AllocationError, InfeasibleReason, SchedulerError};
pub use summary::{ScheduleResponse, ScheduleSummary, SectionView, UnassignedCourse};
pub use workload::{RoomUsage, TeacherWorkload};

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::availability::AvailabilityState;
use crate::config::SchoolConfig;
use crate::model::{Course, Semester, SemesterId};
use crate::store::{in_transaction, CatalogStore, EnrollmentStore, ScheduleStore, Store};

// ── Course policy ─────────────────────────────────────────────────────────────

/// How many sections a course should get.
///
/// Core: `max(1, hours / 2)`.  Everything else: `max(1, hours / 3)`.
pub fn sections_needed(course: &Course) -> u32 {
    let divisor = if course.course_type.is_core() { 2 } else { 3 };
    (course.hours_per_week / divisor).max(1)
}

/// Sort courses into allocation order: core before elective, more weekly
/// hours first, then ascending id so the result never depends on the
/// store's native order.
pub fn order_courses(courses: &mut [Course]) {
    courses.sort_by(|a, b| {
        b.course_type
            .is_core()
            .cmp(&a.course_type.is_core())
            .then_with(|| b.hours_per_week.cmp(&a.hours_per_week))
            .then_with(|| a.id.cmp(&b.id))
    });
}

// ── ScheduleGenerator ─────────────────────────────────────────────────────────

/// Semester-level timetable generator.
///
/// Holds only the shared configuration; the store is passed into every call
/// and all per-run state is created and dropped inside [`generate`](Self::generate).
#[derive(Debug, Clone)]
pub struct ScheduleGenerator {
    config: Arc<SchoolConfig>,
}

impl ScheduleGenerator {
    pub fn new(config: Arc<SchoolConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SchoolConfig {
        &self.config
    }

    // ── Public entry points ───────────────────────────────────────────────────

    /// Replace the schedule of `semester_id` with a freshly generated one.
    ///
    /// # Errors
    /// [`SchedulerError::SemesterNotFound`] before anything is touched;
    /// [`SchedulerError::Store`] after rolling the transaction back.
    pub fn generate<S>(
        &self,
        store: &mut S,
        semester_id: SemesterId,
    ) -> Result<ScheduleResponse, SchedulerError>
    where
        S: Store + ?Sized,
    {
        let semester = store
            .semester(semester_id)?
            .ok_or(SchedulerError::SemesterNotFound(semester_id))?;

        info!(
            semester = semester.id,
            name = %semester.display_name(),
            "=== ScheduleGenerator::generate() ==="
        );

        let response = in_transaction(store, |store| self.run(store, &semester))?;

        info!(
            sections = response.summary.total_sections,
            courses = response.summary.total_courses,
            unassigned = response.summary.unassigned_courses,
            "=== Generation complete ==="
        );
        Ok(response)
    }

    /// Read the persisted schedule of `semester_id` without regenerating.
    pub fn get_schedule<S>(
        &self,
        store: &S,
        semester_id: SemesterId,
    ) -> Result<ScheduleResponse, SchedulerError>
    where
        S: CatalogStore + ScheduleStore + EnrollmentStore + ?Sized,
    {
        let semester = store
            .semester(semester_id)?
            .ok_or(SchedulerError::SemesterNotFound(semester_id))?;
        let sections = store.sections_by_semester(semester_id)?;
        Ok(ScheduleResponse::build(
            store,
            &semester,
            &sections,
            Vec::new(),
        )?)
    }

    /// Per-teacher hours for the persisted schedule of `semester_id`.
    pub fn teacher_workload<S>(
        &self,
        store: &S,
        semester_id: SemesterId,
    ) -> Result<Vec<TeacherWorkload>, SchedulerError>
    where
        S: CatalogStore + ScheduleStore + ?Sized,
    {
        workload::teacher_workload(store, semester_id)
    }

    /// Per-room usage for the persisted schedule of `semester_id`.
    pub fn room_usage<S>(
        &self,
        store: &S,
        semester_id: SemesterId,
    ) -> Result<Vec<RoomUsage>, SchedulerError>
    where
        S: CatalogStore + ScheduleStore + ?Sized,
    {
        workload::room_usage(store, &self.config, semester_id)
    }

    // ── Generation run ────────────────────────────────────────────────────────

    fn run<S>(&self, store: &mut S, semester: &Semester) -> Result<ScheduleResponse, SchedulerError>
    where
        S: Store + ?Sized,
    {
        let removed = store.delete_sections_by_semester(semester.id)?;
        if removed > 0 {
            info!(semester = semester.id, removed, "deleted existing sections");
        }

        let mut courses = store.courses_by_semester_order(semester.order_in_year)?;
        order_courses(&mut courses);
        info!(
            semester_order = semester.order_in_year,
            course_count = courses.len(),
            "courses loaded"
        );

        let allocator = SectionAllocator::new(&self.config);
        let mut teacher_avail = AvailabilityState::new();
        let mut room_avail = AvailabilityState::new();

        let mut created = Vec::new();
        let mut unassigned = Vec::new();

        for course in &courses {
            let needed = sections_needed(course);
            debug!(
                course = %course.code,
                course_type = ?course.course_type,
                hours_per_week = course.hours_per_week,
                sections_needed = needed,
                "processing course"
            );

            let mut made = 0u32;
            let mut failure = None;

            for attempt in 1..=needed {
                match allocator.allocate(
                    store,
                    course,
                    semester,
                    &mut teacher_avail,
                    &mut room_avail,
                ) {
                    Ok(section) => {
                        made += 1;
                        created.push(section);
                    }
                    Err(AllocationError::Infeasible { reason, .. }) => {
                        warn!(
                            course = %course.code,
                            attempt,
                            needed,
                            %reason,
                            "could not create section"
                        );
                        // Availability did not change, so later attempts
                        // would fail the same way.
                        failure = Some(reason);
                        break;
                    }
                    Err(AllocationError::Store(e)) => return Err(e.into()),
                }
            }

            match (made, failure) {
                (0, Some(reason)) => {
                    warn!(course = %course.code, "course unassigned");
                    unassigned.push(UnassignedCourse {
                        course_id: course.id,
                        course_code: course.code.clone(),
                        sections_requested: needed,
                        reason,
                    });
                }
                _ => info!(
                    course = %course.code,
                    created = made,
                    requested = needed,
                    "course scheduled"
                ),
            }
        }

        Ok(ScheduleResponse::build(
            &*store,
            semester,
            &created,
            unassigned,
        )?)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
