/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Enrollment error and violation types.
//!
//! A request that breaks a rule is not an error: it produces an
//! [`EnrollOutcome::Rejected`](super::EnrollOutcome::Rejected) listing every
//! [`EnrollmentViolation`].  [`EnrollmentError`] is reserved for unknown
//! entities and storage failures.

use serde::Serialize;
use thiserror::Error;

use crate::model::{SectionId, SemesterId, StudentId};
use crate::store::StoreError;

/// Rule a requested section broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    EmptyRequest,
    TooManyCourses,
    SectionNotFound,
    DuplicateSection,
    SectionNotInSemester,
    AlreadyEnrolled,
    MissingPrerequisite,
    SectionFull,
    ConflictWithEnrolled,
    ConflictWithinRequest,
}

/// One broken rule, with the message shown to the student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrollmentViolation {
    pub kind: ViolationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<SectionId>,
    pub message: String,
}

impl EnrollmentViolation {
    pub fn new(kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            section: None,
            message: message.into(),
        }
    }

    pub fn for_section(kind: ViolationKind, section: SectionId, message: impl Into<String>) -> Self {
        Self {
            kind,
            section: Some(section),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for EnrollmentViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Error returned by enrollment operations.
#[derive(Debug, Error)]
pub enum EnrollmentError {
    #[error("student {0} not found")]
    StudentNotFound(StudentId),

    #[error("semester {0} not found")]
    SemesterNotFound(SemesterId),

    #[error("storage failure during enrollment: {0}")]
    Store(#[from] StoreError),
}
