use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::courses::entities::Course;
use crate::models::groups::entities::Group;

/// 课程列表项
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct CourseListItem {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub students_count: i64,
    pub groups_count: i64,
}

/// 课程教师信息
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct CourseTeacherInfo {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// 课程详情响应
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct CourseDetailResponse {
    #[serde(flatten)]
    #[ts(flatten)]
    pub course: Course,
    pub teachers: Vec<CourseTeacherInfo>,
    pub groups: Vec<Group>,
    pub students_count: i64,
}
