use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::assessments::entities::{Criterion, ScoreBand};
use crate::models::groups::responses::GroupMember;

/// 创建互评任务响应（每个目标小组一个 ID）
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct CreateAssessmentResponse {
    pub assessment_ids: Vec<i64>,
}

/// 学生视角的待完成任务
///
/// 学生投影：不含分数、他人提交状态等字段。
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct StudentPendingAssessment {
    pub id: i64,
    pub title: String,
    pub course_name: String,
    pub group_name: String,
    pub description: Option<String>,
    pub due_date: chrono::DateTime<chrono::Utc>,
    pub progress: i64,
}

/// 学生视角的已完成任务
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct StudentCompletedAssessment {
    pub id: i64,
    pub title: String,
    pub course_name: String,
    pub group_name: String,
    pub description: Option<String>,
    pub completed_date: chrono::DateTime<chrono::Utc>,
}

/// 教师视角的任务列表项（待完成与已完成共用）
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct TeacherAssessmentListItem {
    pub id: i64,
    pub title: String,
    pub course_name: String,
    pub group_name: String,
    pub description: Option<String>,
    pub due_date: chrono::DateTime<chrono::Utc>,
    pub completed_date: Option<chrono::DateTime<chrono::Utc>>,
    pub responses_count: i64,
    pub students_count: i64,
    pub feedback_count: i64,
    /// 完成百分比，0-100
    pub progress: i64,
}

/// 学生已给出的单条分数
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct GivenScore {
    pub criteria_id: i64,
    /// 被评学生
    pub student_id: i64,
    pub given_score: f64,
}

/// 学生视角的任务详情
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct StudentAssessmentDetail {
    pub id: i64,
    pub title: String,
    pub course_name: String,
    pub group_name: String,
    pub description: Option<String>,
    pub due_date: chrono::DateTime<chrono::Utc>,
    pub criteria: Vec<Criterion>,
    /// 待评价的组员（不含本人）
    pub students_to_evaluate: Vec<GroupMember>,
    pub response_id: Option<i64>,
    pub feedback: Option<String>,
    pub submitted: bool,
    pub given_scores: Vec<GivenScore>,
}

/// 名册条目：组员及其提交状态（仅教师/管理员可见）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct RosterEntry {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub q_number: Option<String>,
    pub has_submitted: bool,
    pub submitted_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// 教师/管理员视角的任务详情
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct TeacherAssessmentDetail {
    pub id: i64,
    pub title: String,
    pub course_name: String,
    pub group_name: String,
    pub description: Option<String>,
    pub due_date: chrono::DateTime<chrono::Utc>,
    pub criteria: Vec<Criterion>,
    pub students: Vec<RosterEntry>,
    pub responses_count: i64,
    pub students_count: i64,
    pub progress: i64,
}

/// 提交回显：被评学生的即时平均分
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct EvaluateeAverage {
    pub student_id: i64,
    pub average: f64,
}

/// 提交互评回复响应
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct SubmitResponseResponse {
    pub response_id: i64,
    pub average_scores: Vec<EvaluateeAverage>,
}

/// 单个维度上的聚合分数
///
/// average_score 为 None 表示没有任何评分（序列化为 null，与 0 分严格区分）。
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct CriterionScore {
    pub criteria_id: i64,
    pub criteria_name: String,
    pub max_score: f64,
    pub average_score: Option<f64>,
    pub number_of_ratings: i64,
    /// 形如 "8.2/10"，无评分时为 "N/A/10"
    pub score_display: String,
    pub score_color: ScoreBand,
}

/// 收到的一条反馈（含评价者身份）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct FeedbackReceivedEntry {
    pub feedback: String,
    pub first_name: String,
    pub last_name: String,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}

/// 给出的反馈及被评对象列表
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct FeedbackGivenEntry {
    pub feedback: Option<String>,
    pub evaluated_students: String,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}

/// 单个学生的聚合结果
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct StudentResultEntry {
    pub student: GroupMember,
    pub criteria_scores: Vec<CriterionScore>,
    pub overall_average: Option<f64>,
    pub overall_average_display: String,
    pub overall_score_color: ScoreBand,
    pub feedback_received: Vec<FeedbackReceivedEntry>,
    pub feedback_given: Option<FeedbackGivenEntry>,
}

/// 互评结果响应（仅教师/管理员）
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct AssessmentResultsResponse {
    pub id: i64,
    pub title: String,
    pub course_name: String,
    pub group_name: String,
    pub description: Option<String>,
    pub due_date: chrono::DateTime<chrono::Utc>,
    /// 各维度满分的平均值，用于前端绘制总分刻度
    pub max_score: f64,
    pub criteria: Vec<Criterion>,
    pub results: Vec<StudentResultEntry>,
}

/// 任务摘要
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct AssessmentBrief {
    pub id: i64,
    pub title: String,
}

/// 反馈列表条目
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct FeedbackListEntry {
    pub response_id: i64,
    pub feedback: String,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
    pub student: GroupMember,
    pub evaluated_students: String,
}

/// 反馈列表响应（仅教师/管理员）
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct AssessmentFeedbackResponse {
    pub assessment: AssessmentBrief,
    pub feedback: Vec<FeedbackListEntry>,
}
