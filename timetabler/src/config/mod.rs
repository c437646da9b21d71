//! School-day policy loading.
//!
//! Every constant the allocator and the enrollment validator rely on lives
//! here rather than in code, including the fallback room type used when a
//! specialization names none.
//!
//! The expected YAML structure is (all keys optional):
//! ```yaml
//! school_day:
//!   start_hour: 9
//!   end_hour: 17
//!   lunch_start_hour: 12
//!   lunch_end_hour: 13
//! limits:
//!   max_daily_teacher_hours: 4
//!   max_session_hours: 2
//!   min_session_hours: 1
//!   max_courses_per_semester: 5
//! rooms:
//!   default_room_type_id: 1
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::model::RoomTypeId;

// ── Private YAML deserialization types ────────────────────────────────────────

/// Top-level wrapper that maps directly onto the YAML file layout.
///
/// Kept private – callers work with [`SchoolConfig`] instead.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SchoolConfigFile {
    school_day: SchoolDayEntry,
    limits: LimitsEntry,
    rooms: RoomsEntry,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SchoolDayEntry {
    start_hour: Option<u8>,
    end_hour: Option<u8>,
    lunch_start_hour: Option<u8>,
    lunch_end_hour: Option<u8>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LimitsEntry {
    max_daily_teacher_hours: Option<u32>,
    max_session_hours: Option<u8>,
    min_session_hours: Option<u8>,
    max_courses_per_semester: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RoomsEntry {
    default_room_type_id: Option<RoomTypeId>,
}

// ── Validation errors ─────────────────────────────────────────────────────────

/// Reasons a [`SchoolConfig`] is rejected by [`SchoolConfig::validate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("school day must end after it starts ({start}:00-{end}:00)")]
    EmptySchoolDay { start: u8, end: u8 },

    #[error("school day end hour {0} is past midnight")]
    EndPastMidnight(u8),

    #[error("lunch break {start}:00-{end}:00 must lie inside the school day")]
    LunchOutsideSchoolDay { start: u8, end: u8 },

    #[error("session bounds are invalid: min {min}h, max {max}h")]
    InvalidSessionBounds { min: u8, max: u8 },

    #[error("{0} must be greater than zero")]
    ZeroLimit(&'static str),
}

// ── Public data structure ─────────────────────────────────────────────────────

/// Hard constraints and limits applied by the scheduler and enrollment
/// validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchoolConfig {
    /// First teachable hour (inclusive).
    pub school_start_hour: u8,
    /// Last teachable hour (exclusive).
    pub school_end_hour: u8,
    /// Lunch blackout `[lunch_start_hour, lunch_end_hour)`.
    pub lunch_start_hour: u8,
    pub lunch_end_hour: u8,
    /// Cap on a teacher's meeting hours on a single day.
    pub max_daily_teacher_hours: u32,
    /// Longest single meeting.
    pub max_session_hours: u8,
    /// Shortest single meeting.
    pub min_session_hours: u8,
    /// Room type used when a specialization names none.
    pub default_room_type_id: RoomTypeId,
    /// Cap on a student's enrollments in one semester.
    pub max_courses_per_semester: u32,
}

impl Default for SchoolConfig {
    fn default() -> Self {
        Self {
            school_start_hour: 9,
            school_end_hour: 17,
            lunch_start_hour: 12,
            lunch_end_hour: 13,
            max_daily_teacher_hours: 4,
            max_session_hours: 2,
            min_session_hours: 1,
            default_room_type_id: 1,
            max_courses_per_semester: 5,
        }
    }
}

impl SchoolConfig {
    /// Parses `path`, fills missing keys from [`SchoolConfig::default`], and
    /// validates the result.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened, the YAML is
    /// structurally invalid, or the values fail [`validate`](Self::validate).
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading school configuration from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open configuration file: {}", path.display()))?;

        Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid configuration file: {}", path.display()))
    }

    /// Same as [`load_from_file`](Self::load_from_file) for in-memory YAML.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let file: SchoolConfigFile =
            serde_yaml::from_str(content).context("Failed to parse YAML")?;

        let d = Self::default();
        let config = Self {
            school_start_hour: file.school_day.start_hour.unwrap_or(d.school_start_hour),
            school_end_hour: file.school_day.end_hour.unwrap_or(d.school_end_hour),
            lunch_start_hour: file
                .school_day
                .lunch_start_hour
                .unwrap_or(d.lunch_start_hour),
            lunch_end_hour: file.school_day.lunch_end_hour.unwrap_or(d.lunch_end_hour),
            max_daily_teacher_hours: file
                .limits
                .max_daily_teacher_hours
                .unwrap_or(d.max_daily_teacher_hours),
            max_session_hours: file.limits.max_session_hours.unwrap_or(d.max_session_hours),
            min_session_hours: file.limits.min_session_hours.unwrap_or(d.min_session_hours),
            default_room_type_id: file
                .rooms
                .default_room_type_id
                .unwrap_or(d.default_room_type_id),
            max_courses_per_semester: file
                .limits
                .max_courses_per_semester
                .unwrap_or(d.max_courses_per_semester),
        };

        config.validate()?;

        debug!(
            school_day = %format!("{:02}:00-{:02}:00", config.school_start_hour, config.school_end_hour),
            lunch = %format!("{:02}:00-{:02}:00", config.lunch_start_hour, config.lunch_end_hour),
            max_daily_teacher_hours = config.max_daily_teacher_hours,
            session_hours = %format!("{}..={}", config.min_session_hours, config.max_session_hours),
            default_room_type_id = config.default_room_type_id,
            max_courses_per_semester = config.max_courses_per_semester,
            "school configuration loaded"
        );

        Ok(config)
    }

    /// Reject configurations the allocator cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.school_end_hour <= self.school_start_hour {
            return Err(ConfigError::EmptySchoolDay {
                start: self.school_start_hour,
                end: self.school_end_hour,
            });
        }
        if self.school_end_hour > 24 {
            return Err(ConfigError::EndPastMidnight(self.school_end_hour));
        }
        if self.lunch_end_hour < self.lunch_start_hour
            || self.lunch_start_hour < self.school_start_hour
            || self.lunch_end_hour > self.school_end_hour
        {
            return Err(ConfigError::LunchOutsideSchoolDay {
                start: self.lunch_start_hour,
                end: self.lunch_end_hour,
            });
        }
        if self.min_session_hours == 0 || self.min_session_hours > self.max_session_hours {
            return Err(ConfigError::InvalidSessionBounds {
                min: self.min_session_hours,
                max: self.max_session_hours,
            });
        }
        if self.max_daily_teacher_hours == 0 {
            return Err(ConfigError::ZeroLimit("max_daily_teacher_hours"));
        }
        if self.max_courses_per_semester == 0 {
            return Err(ConfigError::ZeroLimit("max_courses_per_semester"));
        }
        Ok(())
    }

    /// Does `[start, end)` intersect the lunch blackout?
    ///
    /// `lunch_start_hour == lunch_end_hour` means no lunch break.
    pub fn overlaps_lunch(&self, start: u8, end: u8) -> bool {
        self.lunch_start_hour < self.lunch_end_hour
            && start < self.lunch_end_hour
            && end > self.lunch_start_hour
    }

    /// Does `[start, end)` lie inside the school day?
    pub fn within_school_hours(&self, start: u8, end: u8) -> bool {
        start >= self.school_start_hour && end <= self.school_end_hour
    }

    /// Teachable hours per day (school day minus lunch).
    pub fn teachable_hours_per_day(&self) -> u32 {
        let day = u32::from(self.school_end_hour - self.school_start_hour);
        let lunch = u32::from(self.lunch_end_hour - self.lunch_start_hour);
        day - lunch
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper: write a YAML string to a temp file and return it.
    fn yaml_tempfile(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn default_config_has_expected_values() {
        let cfg = SchoolConfig::default();
        assert_eq!(cfg.school_start_hour, 9);
        assert_eq!(cfg.school_end_hour, 17);
        assert_eq!((cfg.lunch_start_hour, cfg.lunch_end_hour), (12, 13));
        assert_eq!(cfg.max_daily_teacher_hours, 4);
        assert_eq!((cfg.min_session_hours, cfg.max_session_hours), (1, 2));
        assert_eq!(cfg.default_room_type_id, 1);
        assert_eq!(cfg.max_courses_per_semester, 5);
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.teachable_hours_per_day(), 7);
    }

    #[test]
    fn load_full_yaml() {
        let yaml = r#"
school_day:
  start_hour: 8
  end_hour: 16
  lunch_start_hour: 11
  lunch_end_hour: 12
limits:
  max_daily_teacher_hours: 6
  max_session_hours: 3
  min_session_hours: 1
  max_courses_per_semester: 7
rooms:
  default_room_type_id: 4
"#;
        let f = yaml_tempfile(yaml);
        let cfg = SchoolConfig::load_from_file(f.path()).unwrap();

        assert_eq!(cfg.school_start_hour, 8);
        assert_eq!(cfg.school_end_hour, 16);
        assert_eq!(cfg.lunch_start_hour, 11);
        assert_eq!(cfg.max_daily_teacher_hours, 6);
        assert_eq!(cfg.max_session_hours, 3);
        assert_eq!(cfg.default_room_type_id, 4);
        assert_eq!(cfg.max_courses_per_semester, 7);
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let f = yaml_tempfile("rooms:\n  default_room_type_id: 3\n");
        let cfg = SchoolConfig::load_from_file(f.path()).unwrap();

        assert_eq!(cfg.default_room_type_id, 3);
        assert_eq!(cfg.school_start_hour, 9);
        assert_eq!(cfg.max_courses_per_semester, 5);
    }

    #[test]
    fn empty_document_is_all_defaults() {
        let cfg = SchoolConfig::from_yaml_str("{}").unwrap();
        assert_eq!(cfg, SchoolConfig::default());
    }

    #[test]
    fn missing_file_returns_error() {
        let result = SchoolConfig::load_from_file(Path::new("/nonexistent/path/school.yaml"));
        assert!(result.is_err());
    }

    #[test]
    fn malformed_yaml_returns_error() {
        let f = yaml_tempfile("this is: not: valid: yaml: content:::");
        assert!(SchoolConfig::load_from_file(f.path()).is_err());
    }

    #[test]
    fn inverted_school_day_is_rejected() {
        let cfg = SchoolConfig {
            school_start_hour: 17,
            school_end_hour: 9,
            ..Default::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::EmptySchoolDay { start: 17, end: 9 })
        );
    }

    #[test]
    fn lunch_outside_day_is_rejected() {
        let err = SchoolConfig::from_yaml_str("school_day:\n  lunch_start_hour: 7\n").unwrap_err();
        assert!(format!("{err:#}").contains("lunch break"));
    }

    #[test]
    fn bad_session_bounds_are_rejected() {
        let cfg = SchoolConfig {
            min_session_hours: 3,
            max_session_hours: 2,
            ..Default::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::InvalidSessionBounds { min: 3, max: 2 })
        );
    }

    #[test]
    fn lunch_and_hours_predicates() {
        let cfg = SchoolConfig::default();
        assert!(cfg.overlaps_lunch(11, 13));
        assert!(cfg.overlaps_lunch(12, 13));
        assert!(!cfg.overlaps_lunch(11, 12));
        assert!(!cfg.overlaps_lunch(13, 15));
        assert!(cfg.within_school_hours(9, 11));
        assert!(cfg.within_school_hours(16, 17));
        assert!(!cfg.within_school_hours(16, 18));
        assert!(!cfg.within_school_hours(8, 9));
    }

    #[test]
    fn empty_lunch_window_blocks_nothing() {
        let cfg = SchoolConfig::from_yaml_str(
            "school_day:\n  lunch_start_hour: 12\n  lunch_end_hour: 12\n",
        )
        .unwrap();
        assert!(!cfg.overlaps_lunch(11, 13));
        assert!(!cfg.overlaps_lunch(12, 13));
        assert_eq!(cfg.teachable_hours_per_day(), 8);
    }
}
