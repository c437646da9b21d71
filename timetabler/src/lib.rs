/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Timetabler – school timetable generation and enrollment validation
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── model          – catalogue records, meetings, sections, enrollments
//! ├── conflict       – meeting overlap predicates
//! ├── availability   – per-run teacher / room bookings
//! ├── config/        – YAML school-day policy
//! ├── store/         – persistence ports, in-memory store, YAML dataset
//! ├── scheduler/     – section allocator, semester generator, load reports
//! ├── enrollment/    – batch enrollment validation, student plan
//! └── service        – async facade serialising writers per store
//! ```

pub mod availability;
pub mod config;
pub mod conflict;
pub mod enrollment;
pub mod model;
pub mod scheduler;
pub mod service;
pub mod store;
