use serde::Deserialize;
use ts_rs::TS;

/// 创建课程请求
///
/// 课程代码由服务端生成，创建者自动加入 course_teachers。
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct CreateCourseRequest {
    pub name: String,
    pub description: Option<String>,
}

/// 批量选课请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct EnrollStudentsRequest {
    pub student_ids: Vec<i64>,
}
