pub mod course;
pub mod instance;
pub mod semester;

pub use course::{Course, CoursePayload, CourseRef};
pub use instance::{CourseInstance, InstanceKey, InstancePayload, InstanceStatus, YearWindow};
pub use semester::Semester;
