use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 互评任务：面向一个小组发布，带截止时间与固定的评分维度集合
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct Assessment {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub course_id: i64,
    pub group_id: i64,
    // 创建者（任课教师）
    pub teacher_id: i64,
    pub due_date: chrono::DateTime<chrono::Utc>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

// 评分维度：一个带数值范围的打分项，创建后不可修改
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct Criterion {
    pub id: i64,
    pub assessment_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub min_score: f64,
    pub max_score: f64,
}

/// 带上下文名称的互评任务（课程名、小组名来自联表查询）
#[derive(Debug, Clone)]
pub struct AssessmentWithContext {
    pub assessment: Assessment,
    pub course_name: String,
    pub group_name: String,
}

/// 回复摘要（存储层内部使用）
#[derive(Debug, Clone)]
pub struct ResponseSummary {
    pub id: i64,
    pub student_id: i64,
    pub feedback: Option<String>,
    pub submitted_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl ResponseSummary {
    /// submitted_at 非空是回复已定稿的唯一判据
    pub fn is_submitted(&self) -> bool {
        self.submitted_at.is_some()
    }
}

/// 单条评分结果行（存储层内部使用）
#[derive(Debug, Clone)]
pub struct ResultRow {
    pub criteria_id: i64,
    /// 被评学生
    pub student_id: i64,
    pub given_score: f64,
}

/// 教师列表行：任务加上一次性算好的提交统计
#[derive(Debug, Clone)]
pub struct TeacherAssessmentRow {
    pub assessment: AssessmentWithContext,
    pub responses_count: i64,
    pub students_count: i64,
    pub feedback_count: i64,
    pub max_submitted_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// 学生列表行：任务加上本人的回复状态
#[derive(Debug, Clone)]
pub struct StudentAssessmentRow {
    pub assessment: AssessmentWithContext,
    pub response: Option<ResponseSummary>,
}

/// 已提交回复及其评价对象（存储层内部使用）
///
/// 结果页、反馈页共用这一份查询结果，再按角色投影。
#[derive(Debug, Clone)]
pub struct ResponseWithEvaluatees {
    pub response_id: i64,
    /// 评价者
    pub student_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub q_number: Option<String>,
    pub feedback: Option<String>,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
    pub evaluated_student_ids: Vec<i64>,
    /// 评价对象姓名，去重后按名册顺序
    pub evaluated_students: Vec<String>,
}

// 分数颜色档位，按百分比划分
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub enum ScoreBand {
    Excellent,    // >= 80%
    Good,         // >= 70%
    Average,      // >= 60%
    BelowAverage, // >= 50%
    Poor,         // < 50%
    Neutral,      // 无可用分数
}

impl std::fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ScoreBand::Excellent => "excellent",
            ScoreBand::Good => "good",
            ScoreBand::Average => "average",
            ScoreBand::BelowAverage => "below-average",
            ScoreBand::Poor => "poor",
            ScoreBand::Neutral => "neutral",
        };
        write!(f, "{s}")
    }
}
