use chrono::{DateTime, Utc};
use serde::Deserialize;
use ts_rs::TS;

/// 创建互评任务的评分维度输入
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct CriterionInput {
    pub name: String,
    pub description: Option<String>,
    pub min_score: f64,
    pub max_score: f64,
}

/// 创建互评任务请求
///
/// group_ids 里的每个小组都会得到一份独立的任务副本，共享标题与维度定义，
/// 此外不共享任何状态。
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct CreateAssessmentRequest {
    pub title: String,
    pub description: Option<String>,
    pub course_id: i64,
    pub group_ids: Vec<i64>,
    pub due_date: DateTime<Utc>, // ISO 8601 格式，如 "2026-01-24T12:00:00Z"
    pub criteria: Vec<CriterionInput>,
}

/// 单条评分输入：评价者给某位组员在某个维度上的分数
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct ScoreInput {
    pub criteria_id: i64,
    /// 被评学生
    pub student_id: i64,
    pub score: f64,
}

/// 提交互评回复请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct SubmitResponseRequest {
    pub feedback: Option<String>,
    pub scores: Vec<ScoreInput>,
}
