pub mod assessments;

pub mod courses;

pub mod groups;

pub mod users;

pub use assessments::configure_assessments_routes;
pub use courses::configure_courses_routes;
pub use groups::configure_groups_routes;
pub use users::configure_user_routes;
