use std::sync::Arc;

use tracing::info;

use crate::catalog::CatalogApi;
use crate::error::CatalogError;
use crate::models::{
    Course, CourseInstance, CoursePayload, InstanceKey, InstancePayload, Semester, YearWindow,
};

/// One admin screenful of state: the current course and instance lists plus
/// the operations the list/form views invoke. There is no finer-grained
/// client-side cache; the lists ARE the cache, and every mutation
/// invalidates them wholesale by re-fetching from the store before
/// returning. Concurrent edits from other clients may be observed stale
/// until the next refresh; the store is last-write-wins.
pub struct AdminSession {
    catalog: Arc<dyn CatalogApi>,
    year_window: YearWindow,
    courses: Vec<Course>,
    instances: Vec<CourseInstance>,
}

impl AdminSession {
    pub fn new(catalog: Arc<dyn CatalogApi>, year_window: YearWindow) -> Self {
        Self {
            catalog,
            year_window,
            courses: Vec::new(),
            instances: Vec::new(),
        }
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn instances(&self) -> &[CourseInstance] {
        &self.instances
    }

    pub fn instances_for_term(&self, year: i32, semester: Semester) -> Vec<&CourseInstance> {
        self.instances
            .iter()
            .filter(|instance| instance.year == year && instance.semester == semester)
            .collect()
    }

    /// Re-fetches both lists from the store.
    pub async fn refresh(&mut self) -> Result<(), CatalogError> {
        self.courses = self.catalog.list_courses().await?;
        self.instances = self.catalog.list_instances().await?;
        Ok(())
    }

    pub async fn create_course(&mut self, payload: CoursePayload) -> Result<Course, CatalogError> {
        payload.validate()?;
        let created = self.catalog.create_course(&payload).await?;
        info!("created course {}", created.course_id);
        self.refresh().await?;
        Ok(created)
    }

    pub async fn update_course(
        &mut self,
        id: i64,
        payload: CoursePayload,
    ) -> Result<Course, CatalogError> {
        payload.validate()?;
        let updated = self.catalog.update_course(id, &payload).await?;
        info!("updated course {}", updated.course_id);
        self.refresh().await?;
        Ok(updated)
    }

    /// Referential rules (prerequisite references, existing instances) are
    /// not pre-validated here; the store's conflict is surfaced as-is.
    pub async fn delete_course(&mut self, id: i64) -> Result<(), CatalogError> {
        self.catalog.delete_course(id).await?;
        info!("deleted course {}", id);
        self.refresh().await?;
        Ok(())
    }

    pub async fn create_instance(
        &mut self,
        payload: InstancePayload,
    ) -> Result<CourseInstance, CatalogError> {
        payload.validate(self.year_window)?;
        let created = self.catalog.create_instance(&payload).await?;
        info!("created instance {}", created.key());
        self.refresh().await?;
        Ok(created)
    }

    pub async fn update_instance(
        &mut self,
        key: &InstanceKey,
        payload: InstancePayload,
    ) -> Result<CourseInstance, CatalogError> {
        payload.validate(self.year_window)?;
        let updated = self.catalog.update_instance(key, &payload).await?;
        info!("updated instance {}", updated.key());
        self.refresh().await?;
        Ok(updated)
    }

    pub async fn delete_instance(&mut self, key: &InstanceKey) -> Result<(), CatalogError> {
        self.catalog.delete_instance(key).await?;
        info!("deleted instance {}", key);
        self.refresh().await?;
        Ok(())
    }

    /// Courses a prerequisite picker may offer for `course_id`: everything
    /// except the course itself.
    pub fn prerequisite_options(&self, course_id: &str) -> Vec<&Course> {
        self.courses
            .iter()
            .filter(|course| course.course_id != course_id)
            .collect()
    }

    /// Resolves the prerequisites of the course with the given natural key
    /// against the current snapshot.
    pub fn resolved_prerequisites(&self, course_id: &str) -> Result<Vec<&Course>, CatalogError> {
        let course = self
            .courses
            .iter()
            .find(|course| course.course_id == course_id)
            .ok_or_else(|| CatalogError::ReferenceNotFound(course_id.to_string()))?;
        course.resolve_prerequisites(&self.courses)
    }

    /// Resolves the parent course of the instance at `key` against the
    /// current snapshot.
    pub fn instance_course(&self, key: &InstanceKey) -> Result<&Course, CatalogError> {
        let instance = self
            .instances
            .iter()
            .find(|instance| instance.key() == *key)
            .ok_or(CatalogError::NotFound)?;
        instance.resolve_course(&self.courses)
    }
}
