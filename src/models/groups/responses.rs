use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::groups::entities::Group;

/// 小组成员信息
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/group.ts")]
pub struct GroupMember {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub q_number: Option<String>,
}

/// 小组详情响应
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/group.ts")]
pub struct GroupDetailResponse {
    #[serde(flatten)]
    #[ts(flatten)]
    pub group: Group,
    pub course_name: String,
    pub members: Vec<GroupMember>,
}
