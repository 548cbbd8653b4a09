pub mod assessments;
pub mod courses;
pub mod groups;
pub mod users;

pub use assessments::AssessmentService;
pub use courses::CourseService;
pub use groups::GroupService;
pub use users::UserService;
