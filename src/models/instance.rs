use std::fmt;

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::models::{Course, Semester};

/// Delivery state of a course instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstanceStatus {
    #[default]
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

/// The one canonical address of an instance: the natural composite key.
/// The service's synthetic instance id is not used anywhere in this client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceKey {
    pub year: i32,
    pub semester: Semester,
    pub course_id: String,
}

impl fmt::Display for InstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.year, self.semester, self.course_id)
    }
}

/// One delivery of a course in a given term. `course_id` references the
/// parent course by natural key; `course_title`/`course_description` are
/// summaries the service echoes on reads and are never sent back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseInstance {
    #[serde(alias = "courseCode")]
    pub course_id: String,
    pub year: i32,
    pub semester: Semester,
    pub instructor: String,
    #[serde(default)]
    pub status: InstanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_capacity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_description: Option<String>,
}

impl CourseInstance {
    pub fn key(&self) -> InstanceKey {
        InstanceKey {
            year: self.year,
            semester: self.semester,
            course_id: self.course_id.clone(),
        }
    }

    /// Resolves the single course reference, same policy as prerequisite
    /// resolution: a dangling key is an error.
    pub fn resolve_course<'a>(&self, all: &'a [Course]) -> Result<&'a Course, CatalogError> {
        all.iter()
            .find(|course| course.course_id == self.course_id)
            .ok_or_else(|| CatalogError::ReferenceNotFound(self.course_id.clone()))
    }
}

/// Plausibility window for instance years: current year ± span.
#[derive(Debug, Clone, Copy)]
pub struct YearWindow {
    pub span: i32,
}

impl YearWindow {
    pub const DEFAULT_SPAN: i32 = 10;

    pub fn contains(&self, year: i32) -> bool {
        let now = Utc::now().year();
        (now - self.span..=now + self.span).contains(&year)
    }
}

impl Default for YearWindow {
    fn default() -> Self {
        Self {
            span: Self::DEFAULT_SPAN,
        }
    }
}

/// Wire form of an instance for create/update calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstancePayload {
    pub course_id: String,
    pub year: i32,
    pub semester: Semester,
    pub instructor: String,
    #[serde(default)]
    pub status: InstanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_capacity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl InstancePayload {
    pub fn key(&self) -> InstanceKey {
        InstanceKey {
            year: self.year,
            semester: self.semester,
            course_id: self.course_id.clone(),
        }
    }

    pub fn validate(&self, window: YearWindow) -> Result<(), CatalogError> {
        if self.course_id.trim().is_empty() {
            return Err(CatalogError::Validation("course id is required".to_string()));
        }
        if self.instructor.trim().is_empty() {
            return Err(CatalogError::Validation(
                "instructor is required".to_string(),
            ));
        }
        if !window.contains(self.year) {
            return Err(CatalogError::Validation(format!(
                "year {} is outside the plausible window (±{})",
                self.year, window.span
            )));
        }
        if self.max_capacity == Some(0) {
            return Err(CatalogError::Validation(
                "max capacity must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CourseRef;

    fn payload(year: i32) -> InstancePayload {
        InstancePayload {
            course_id: "CS101".to_string(),
            year,
            semester: Semester::Winter,
            instructor: "Prof. Moriarty".to_string(),
            status: InstanceStatus::default(),
            max_capacity: Some(60),
            description: None,
        }
    }

    #[test]
    fn status_defaults_to_scheduled() {
        let json = r#"{"courseId": "CS101", "year": 2024, "semester": 1, "instructor": "X"}"#;
        let parsed: CourseInstance = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.status, InstanceStatus::Scheduled);
    }

    #[test]
    fn status_uses_screaming_snake_wire_form() {
        assert_eq!(
            serde_json::to_string(&InstanceStatus::InProgress).unwrap(),
            "\"IN_PROGRESS\""
        );
    }

    #[test]
    fn key_displays_as_term_path() {
        let instance = CourseInstance {
            course_id: "CS101".to_string(),
            year: 2024,
            semester: Semester::Fall,
            instructor: "X".to_string(),
            status: InstanceStatus::Scheduled,
            max_capacity: None,
            description: None,
            course_title: None,
            course_description: None,
        };
        assert_eq!(instance.key().to_string(), "2024/Fall/CS101");
    }

    #[test]
    fn resolves_parent_course() {
        let cs101 = Course {
            id: Some(1),
            course_id: "CS101".to_string(),
            title: "Intro".to_string(),
            description: None,
            credits: None,
            prerequisites: vec![CourseRef::new("MA101")],
        };
        let instance = CourseInstance {
            course_id: "CS101".to_string(),
            year: 2024,
            semester: Semester::Winter,
            instructor: "X".to_string(),
            status: InstanceStatus::Scheduled,
            max_capacity: None,
            description: None,
            course_title: None,
            course_description: None,
        };

        let course = instance.resolve_course(std::slice::from_ref(&cs101)).unwrap();
        assert_eq!(course.title, "Intro");
        assert!(matches!(
            instance.resolve_course(&[]),
            Err(CatalogError::ReferenceNotFound(_))
        ));
    }

    #[test]
    fn year_window_rejects_implausible_years() {
        let window = YearWindow::default();
        let this_year = Utc::now().year();

        assert!(payload(this_year).validate(window).is_ok());
        assert!(matches!(
            payload(1900).validate(window),
            Err(CatalogError::Validation(_))
        ));
        assert!(matches!(
            payload(this_year + 50).validate(window),
            Err(CatalogError::Validation(_))
        ));
    }

    #[test]
    fn validate_requires_instructor() {
        let mut bad = payload(Utc::now().year());
        bad.instructor = "".to_string();
        assert!(matches!(
            bad.validate(YearWindow::default()),
            Err(CatalogError::Validation(_))
        ));
    }
}
