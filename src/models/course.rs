use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// A course as the catalog service returns it. `id` is server-assigned and
/// absent until the course has been created. `course_id` is the natural key
/// ("CS 209") used for display and for prerequisite references; the earlier
/// schema variant called it `courseCode` and `title` `name`, so both spellings
/// deserialize into the one model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(alias = "courseCode")]
    pub course_id: String,
    #[serde(alias = "name")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Only present in the later schema variant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits: Option<u32>,
    #[serde(default)]
    pub prerequisites: Vec<CourseRef>,
}

/// A prerequisite reference. The service echoes a resolved summary (key plus
/// title) on reads; only the natural key travels on writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRef {
    #[serde(alias = "courseCode")]
    pub course_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl CourseRef {
    pub fn new(course_id: impl Into<String>) -> Self {
        Self {
            course_id: course_id.into(),
            title: None,
        }
    }
}

impl Course {
    /// Resolves each stored prerequisite key against `all`. A key with no
    /// match fails with `ReferenceNotFound` naming the dangling key; dangling
    /// references are never dropped silently, since they mean the caller's
    /// course list is inconsistent.
    pub fn resolve_prerequisites<'a>(
        &self,
        all: &'a [Course],
    ) -> Result<Vec<&'a Course>, CatalogError> {
        self.prerequisites
            .iter()
            .map(|reference| {
                all.iter()
                    .find(|course| course.course_id == reference.course_id)
                    .ok_or_else(|| CatalogError::ReferenceNotFound(reference.course_id.clone()))
            })
            .collect()
    }
}

/// Wire form of a course for create/update calls: natural-key references
/// only, no server id, no resolved summaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePayload {
    pub course_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits: Option<u32>,
    #[serde(default)]
    pub prerequisites: Vec<CourseRef>,
}

impl CoursePayload {
    /// Collapses a course back to its wire form. Resolved summaries are
    /// stripped to bare keys, and self-references and duplicate keys are
    /// dropped, so a payload built from any course satisfies the
    /// prerequisite invariants regardless of what the form handed us.
    pub fn from_course(course: &Course) -> Self {
        let mut seen: Vec<&str> = Vec::new();
        let prerequisites = course
            .prerequisites
            .iter()
            .filter(|reference| reference.course_id != course.course_id)
            .filter(|reference| {
                if seen.contains(&reference.course_id.as_str()) {
                    false
                } else {
                    seen.push(&reference.course_id);
                    true
                }
            })
            .map(|reference| CourseRef::new(reference.course_id.clone()))
            .collect();

        Self {
            course_id: course.course_id.clone(),
            title: course.title.clone(),
            description: course.description.clone(),
            credits: course.credits,
            prerequisites,
        }
    }

    pub fn prerequisite_keys(&self) -> impl Iterator<Item = &str> {
        self.prerequisites
            .iter()
            .map(|reference| reference.course_id.as_str())
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.course_id.trim().is_empty() {
            return Err(CatalogError::Validation("course id is required".to_string()));
        }
        if self.title.trim().is_empty() {
            return Err(CatalogError::Validation("title is required".to_string()));
        }
        if self.credits == Some(0) {
            return Err(CatalogError::Validation(
                "credits must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
