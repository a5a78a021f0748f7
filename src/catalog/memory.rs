use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::catalog::CatalogApi;
use crate::error::CatalogError;
use crate::models::{
    Course, CourseInstance, CoursePayload, CourseRef, InstanceKey, InstancePayload, Semester,
    YearWindow,
};

#[derive(Default)]
struct Store {
    next_id: i64,
    courses: Vec<Course>,
    instances: Vec<CourseInstance>,
}

/// Catalog backend with the same observable semantics as the remote service:
/// server-assigned course ids, duplicate-key rejection, prerequisite
/// existence checks, and delete protection for referenced courses. Backs the
/// mock server in the integration tests and works as a seedable offline
/// store.
pub struct InMemoryCatalog {
    store: Mutex<Store>,
    window: YearWindow,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::with_year_window(YearWindow::default())
    }

    pub fn with_year_window(window: YearWindow) -> Self {
        Self {
            store: Mutex::new(Store {
                next_id: 1,
                ..Store::default()
            }),
            window,
        }
    }

    fn store(&self) -> MutexGuard<'_, Store> {
        // Poisoning means a panic mid-mutation; no recovery makes sense.
        self.store.lock().expect("catalog store lock poisoned")
    }

    fn check_prerequisites(
        store: &Store,
        payload: &CoursePayload,
        own_id: Option<i64>,
    ) -> Result<Vec<CourseRef>, CatalogError> {
        payload
            .prerequisite_keys()
            .map(|key| {
                if key == payload.course_id {
                    return Err(CatalogError::Validation(format!(
                        "course {} cannot be its own prerequisite",
                        key
                    )));
                }
                store
                    .courses
                    .iter()
                    .find(|course| course.course_id == key && course.id != own_id)
                    .map(|course| CourseRef {
                        course_id: course.course_id.clone(),
                        title: Some(course.title.clone()),
                    })
                    .ok_or_else(|| {
                        CatalogError::Validation(format!("prerequisite does not exist: {}", key))
                    })
            })
            .collect()
    }

    fn check_instance_course(
        store: &Store,
        payload: &InstancePayload,
    ) -> Result<(Option<String>, Option<String>), CatalogError> {
        store
            .courses
            .iter()
            .find(|course| course.course_id == payload.course_id)
            .map(|course| (Some(course.title.clone()), course.description.clone()))
            .ok_or_else(|| {
                CatalogError::Validation(format!("course not found: {}", payload.course_id))
            })
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogApi for InMemoryCatalog {
    async fn list_courses(&self) -> Result<Vec<Course>, CatalogError> {
        Ok(self.store().courses.clone())
    }

    async fn get_course(&self, id: i64) -> Result<Course, CatalogError> {
        self.store()
            .courses
            .iter()
            .find(|course| course.id == Some(id))
            .cloned()
            .ok_or(CatalogError::NotFound)
    }

    async fn create_course(&self, payload: &CoursePayload) -> Result<Course, CatalogError> {
        payload.validate()?;
        let mut store = self.store();

        if store
            .courses
            .iter()
            .any(|course| course.course_id == payload.course_id)
        {
            return Err(CatalogError::Conflict(format!(
                "course already exists: {}",
                payload.course_id
            )));
        }

        let prerequisites = Self::check_prerequisites(&store, payload, None)?;
        let id = store.next_id;
        store.next_id += 1;

        let course = Course {
            id: Some(id),
            course_id: payload.course_id.clone(),
            title: payload.title.clone(),
            description: payload.description.clone(),
            credits: payload.credits,
            prerequisites,
        };
        store.courses.push(course.clone());
        Ok(course)
    }

    async fn update_course(
        &self,
        id: i64,
        payload: &CoursePayload,
    ) -> Result<Course, CatalogError> {
        payload.validate()?;
        let mut store = self.store();

        if !store.courses.iter().any(|course| course.id == Some(id)) {
            return Err(CatalogError::NotFound);
        }
        if store
            .courses
            .iter()
            .any(|course| course.id != Some(id) && course.course_id == payload.course_id)
        {
            return Err(CatalogError::Conflict(format!(
                "course already exists: {}",
                payload.course_id
            )));
        }

        let prerequisites = Self::check_prerequisites(&store, payload, Some(id))?;
        let updated = Course {
            id: Some(id),
            course_id: payload.course_id.clone(),
            title: payload.title.clone(),
            description: payload.description.clone(),
            credits: payload.credits,
            prerequisites,
        };

        let slot = store
            .courses
            .iter_mut()
            .find(|course| course.id == Some(id))
            .ok_or(CatalogError::NotFound)?;
        *slot = updated.clone();
        Ok(updated)
    }

    async fn delete_course(&self, id: i64) -> Result<(), CatalogError> {
        let mut store = self.store();

        let key = store
            .courses
            .iter()
            .find(|course| course.id == Some(id))
            .map(|course| course.course_id.clone())
            .ok_or(CatalogError::NotFound)?;

        let dependents: Vec<&str> = store
            .courses
            .iter()
            .filter(|course| {
                course
                    .prerequisites
                    .iter()
                    .any(|reference| reference.course_id == key)
            })
            .map(|course| course.course_id.as_str())
            .collect();
        if !dependents.is_empty() {
            return Err(CatalogError::Conflict(format!(
                "cannot delete {}: prerequisite of {}",
                key,
                dependents.join(", ")
            )));
        }

        if store
            .instances
            .iter()
            .any(|instance| instance.course_id == key)
        {
            return Err(CatalogError::Conflict(format!(
                "cannot delete {}: instances exist",
                key
            )));
        }

        store.courses.retain(|course| course.id != Some(id));
        Ok(())
    }

    async fn list_instances(&self) -> Result<Vec<CourseInstance>, CatalogError> {
        Ok(self.store().instances.clone())
    }

    async fn list_instances_for_term(
        &self,
        year: i32,
        semester: Semester,
    ) -> Result<Vec<CourseInstance>, CatalogError> {
        Ok(self
            .store()
            .instances
            .iter()
            .filter(|instance| instance.year == year && instance.semester == semester)
            .cloned()
            .collect())
    }

    async fn get_instance(&self, key: &InstanceKey) -> Result<CourseInstance, CatalogError> {
        self.store()
            .instances
            .iter()
            .find(|instance| instance.key() == *key)
            .cloned()
            .ok_or(CatalogError::NotFound)
    }

    async fn create_instance(
        &self,
        payload: &InstancePayload,
    ) -> Result<CourseInstance, CatalogError> {
        payload.validate(self.window)?;
        let mut store = self.store();

        let (course_title, course_description) = Self::check_instance_course(&store, payload)?;

        let key = payload.key();
        if store.instances.iter().any(|instance| instance.key() == key) {
            return Err(CatalogError::Conflict(format!(
                "instance already exists: {}",
                key
            )));
        }

        let instance = CourseInstance {
            course_id: payload.course_id.clone(),
            year: payload.year,
            semester: payload.semester,
            instructor: payload.instructor.clone(),
            status: payload.status,
            max_capacity: payload.max_capacity,
            description: payload.description.clone(),
            course_title,
            course_description,
        };
        store.instances.push(instance.clone());
        Ok(instance)
    }

    async fn update_instance(
        &self,
        key: &InstanceKey,
        payload: &InstancePayload,
    ) -> Result<CourseInstance, CatalogError> {
        payload.validate(self.window)?;
        let mut store = self.store();

        if !store.instances.iter().any(|instance| instance.key() == *key) {
            return Err(CatalogError::NotFound);
        }

        let new_key = payload.key();
        if new_key != *key
            && store
                .instances
                .iter()
                .any(|instance| instance.key() == new_key)
        {
            return Err(CatalogError::Conflict(format!(
                "instance already exists: {}",
                new_key
            )));
        }

        let (course_title, course_description) = Self::check_instance_course(&store, payload)?;
        let updated = CourseInstance {
            course_id: payload.course_id.clone(),
            year: payload.year,
            semester: payload.semester,
            instructor: payload.instructor.clone(),
            status: payload.status,
            max_capacity: payload.max_capacity,
            description: payload.description.clone(),
            course_title,
            course_description,
        };

        let slot = store
            .instances
            .iter_mut()
            .find(|instance| instance.key() == *key)
            .ok_or(CatalogError::NotFound)?;
        *slot = updated.clone();
        Ok(updated)
    }

    async fn delete_instance(&self, key: &InstanceKey) -> Result<(), CatalogError> {
        let mut store = self.store();
        let before = store.instances.len();
        store.instances.retain(|instance| instance.key() != *key);
        if store.instances.len() == before {
            return Err(CatalogError::NotFound);
        }
        Ok(())
    }
}
