use serde::Deserialize;
use ts_rs::TS;

/// 创建小组请求
///
/// 初始成员必须已选该课程。
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/group.ts")]
pub struct CreateGroupRequest {
    pub course_id: i64,
    pub name: String,
    #[serde(default)]
    pub student_ids: Vec<i64>,
}

/// 小组列表查询参数
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/group.ts")]
pub struct GroupListParams {
    pub course_id: i64,
}
