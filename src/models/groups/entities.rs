use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 小组：互评任务的目标单位，隶属于一门课程
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/group.ts")]
pub struct Group {
    pub id: i64,
    pub course_id: i64,
    pub name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
