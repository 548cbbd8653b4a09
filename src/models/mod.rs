pub mod assessments;
pub mod common;
pub mod courses;
pub mod groups;
pub mod users;

pub use common::pagination::{PaginatedResponse, PaginationInfo, PaginationQuery};
pub use common::response::ApiResponse;

/// 应用启动时间，用于运行时长统计
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// API 业务错误码
///
/// 放在统一响应体的 code 字段里，0 表示成功。
/// 1xxx 为通用错误，2xxx 用户，3xxx 课程，4xxx 小组，5xxx 互评任务。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Success = 0,

    BadRequest = 1001,
    Unauthorized = 1002,
    Forbidden = 1003,
    NotFound = 1004,
    RateLimitExceeded = 1005,
    InternalServerError = 1006,

    UserNotFound = 2001,
    UserAlreadyExists = 2002,
    UserEmailInvalid = 2003,
    UserCreationFailed = 2004,

    CourseNotFound = 3001,
    CourseCodeConflict = 3002,
    CoursePermissionDenied = 3003,
    CourseCreationFailed = 3004,

    GroupNotFound = 4001,
    GroupPermissionDenied = 4002,
    GroupCreationFailed = 4003,

    AssessmentNotFound = 5001,
    AssessmentCreationFailed = 5002,
    ScoresInvalid = 5003,
    ResponseNotFound = 5004,
}
