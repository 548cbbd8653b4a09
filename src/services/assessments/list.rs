use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{AssessmentService, aggregate};
use crate::middlewares::RequireJWT;
use crate::models::assessments::entities::{StudentAssessmentRow, TeacherAssessmentRow};
use crate::models::assessments::responses::{
    StudentCompletedAssessment, StudentPendingAssessment, TeacherAssessmentListItem,
};
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};

/// 待完成任务列表
/// GET /assessments/pending
pub async fn list_pending(
    service: &AssessmentService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    list_assessments(service, request, ListKind::Pending).await
}

/// 已完成任务列表
/// GET /assessments/completed
pub async fn list_completed(
    service: &AssessmentService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    list_assessments(service, request, ListKind::Completed).await
}

#[derive(Clone, Copy, PartialEq)]
enum ListKind {
    Pending,
    Completed,
}

async fn list_assessments(
    service: &AssessmentService,
    request: &HttpRequest,
    kind: ListKind,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let current_user = match RequireJWT::extract_user_claims(request) {
        Some(user) => user,
        None => {
            return Ok(HttpResponse::Unauthorized()
                .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
        }
    };

    let now = chrono::Utc::now();

    // 完成状态永远从时间戳和计数派生，不落库
    match current_user.role {
        UserRole::Student => {
            let rows = match storage.list_student_assessments(current_user.id).await {
                Ok(rows) => rows,
                Err(e) => return Ok(internal_error(&format!("查询任务列表失败: {e}"))),
            };

            match kind {
                ListKind::Pending => {
                    let items = student_pending(rows, now);
                    Ok(HttpResponse::Ok().json(ApiResponse::success(items, "查询成功")))
                }
                ListKind::Completed => {
                    let items = student_completed(rows);
                    Ok(HttpResponse::Ok().json(ApiResponse::success(items, "查询成功")))
                }
            }
        }
        UserRole::Teacher | UserRole::Admin => {
            let rows = match storage.list_teacher_assessments(current_user.id).await {
                Ok(rows) => rows,
                Err(e) => return Ok(internal_error(&format!("查询任务列表失败: {e}"))),
            };

            let items = teacher_items(rows, now, kind);
            Ok(HttpResponse::Ok().json(ApiResponse::success(items, "查询成功")))
        }
    }
}

fn internal_error(message: &str) -> HttpResponse {
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        ErrorCode::InternalServerError,
        message,
    ))
}

/// 学生待完成：本人未提交且未过截止时间
fn student_pending(
    rows: Vec<StudentAssessmentRow>,
    now: chrono::DateTime<chrono::Utc>,
) -> Vec<StudentPendingAssessment> {
    rows.into_iter()
        .filter(|row| {
            let submitted = row.response.as_ref().is_some_and(|r| r.is_submitted());
            !submitted && row.assessment.assessment.due_date > now
        })
        .map(|row| {
            let progress = if row.response.is_some() { 100 } else { 0 };
            StudentPendingAssessment {
                id: row.assessment.assessment.id,
                title: row.assessment.assessment.title,
                course_name: row.assessment.course_name,
                group_name: row.assessment.group_name,
                description: row.assessment.assessment.description,
                due_date: row.assessment.assessment.due_date,
                progress,
            }
        })
        .collect()
}

/// 学生已完成：本人已提交，按提交时间倒序
fn student_completed(rows: Vec<StudentAssessmentRow>) -> Vec<StudentCompletedAssessment> {
    let mut items: Vec<StudentCompletedAssessment> = rows
        .into_iter()
        .filter_map(|row| {
            let submitted_at = row.response.as_ref().and_then(|r| r.submitted_at)?;
            Some(StudentCompletedAssessment {
                id: row.assessment.assessment.id,
                title: row.assessment.assessment.title,
                course_name: row.assessment.course_name,
                group_name: row.assessment.group_name,
                description: row.assessment.assessment.description,
                completed_date: submitted_at,
            })
        })
        .collect();

    items.sort_by(|a, b| b.completed_date.cmp(&a.completed_date));
    items
}

/// 教师列表：按完成态筛选并附带进度统计
fn teacher_items(
    rows: Vec<TeacherAssessmentRow>,
    now: chrono::DateTime<chrono::Utc>,
    kind: ListKind,
) -> Vec<TeacherAssessmentListItem> {
    let mut items: Vec<TeacherAssessmentListItem> = rows
        .into_iter()
        .filter(|row| {
            let completed = aggregate::is_teacher_completed(
                row.assessment.assessment.due_date,
                now,
                row.responses_count,
                row.students_count,
            );
            match kind {
                ListKind::Pending => !completed,
                ListKind::Completed => completed,
            }
        })
        .map(|row| {
            let completed_date = aggregate::completion_date(
                row.responses_count,
                row.students_count,
                row.max_submitted_at,
                row.assessment.assessment.due_date,
                now,
            );
            TeacherAssessmentListItem {
                id: row.assessment.assessment.id,
                title: row.assessment.assessment.title,
                course_name: row.assessment.course_name,
                group_name: row.assessment.group_name,
                description: row.assessment.assessment.description,
                due_date: row.assessment.assessment.due_date,
                completed_date,
                responses_count: row.responses_count,
                students_count: row.students_count,
                feedback_count: row.feedback_count,
                progress: aggregate::completion_percentage(
                    row.responses_count,
                    row.students_count,
                ),
            }
        })
        .collect();

    // 待完成按截止时间升序，已完成按截止时间倒序
    match kind {
        ListKind::Pending => items.sort_by(|a, b| a.due_date.cmp(&b.due_date)),
        ListKind::Completed => items.sort_by(|a, b| b.due_date.cmp(&a.due_date)),
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::assessments::entities::{
        Assessment, AssessmentWithContext, ResponseSummary,
    };
    use chrono::{TimeZone, Utc};

    fn at(secs: i64) -> chrono::DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn assessment_with_context(id: i64, due: i64) -> AssessmentWithContext {
        AssessmentWithContext {
            assessment: Assessment {
                id,
                title: format!("assessment-{id}"),
                description: None,
                course_id: 1,
                group_id: 1,
                teacher_id: 1,
                due_date: at(due),
                created_at: at(0),
            },
            course_name: "course".to_string(),
            group_name: "group".to_string(),
        }
    }

    fn student_row(id: i64, due: i64, submitted_at: Option<i64>) -> StudentAssessmentRow {
        StudentAssessmentRow {
            assessment: assessment_with_context(id, due),
            response: submitted_at.map(|ts| ResponseSummary {
                id: 100 + id,
                student_id: 7,
                feedback: None,
                submitted_at: Some(at(ts)),
            }),
        }
    }

    #[test]
    fn test_student_pending_excludes_submitted_and_overdue() {
        let now = at(1_000);
        let rows = vec![
            student_row(1, 2_000, None),      // 未提交未过期 -> pending
            student_row(2, 2_000, Some(500)), // 已提交 -> 不在 pending
            student_row(3, 500, None),        // 已过期 -> 不在 pending
        ];

        let items = student_pending(rows, now);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, 1);
        assert_eq!(items[0].progress, 0);
    }

    #[test]
    fn test_student_completed_sorted_desc() {
        let rows = vec![
            student_row(1, 2_000, Some(100)),
            student_row(2, 2_000, Some(300)),
            student_row(3, 2_000, None),
        ];

        let items = student_completed(rows);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, 2);
        assert_eq!(items[1].id, 1);
    }

    fn teacher_row(
        id: i64,
        due: i64,
        responses: i64,
        students: i64,
        max_submitted: Option<i64>,
    ) -> TeacherAssessmentRow {
        TeacherAssessmentRow {
            assessment: assessment_with_context(id, due),
            responses_count: responses,
            students_count: students,
            feedback_count: 0,
            max_submitted_at: max_submitted.map(at),
        }
    }

    #[test]
    fn test_teacher_pending_vs_completed_split() {
        let now = at(1_000);
        let rows = vec![
            teacher_row(1, 2_000, 1, 4, Some(500)), // 进行中
            teacher_row(2, 2_000, 4, 4, Some(800)), // 交齐 -> completed
            teacher_row(3, 500, 1, 4, Some(400)),   // 过期 -> completed
        ];

        let pending = teacher_items(rows.clone(), now, ListKind::Pending);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, 1);
        assert_eq!(pending[0].progress, 25);
        assert_eq!(pending[0].completed_date, None);

        let completed = teacher_items(rows, now, ListKind::Completed);
        assert_eq!(completed.len(), 2);
        // 已完成按截止时间倒序
        assert_eq!(completed[0].id, 2);
        assert_eq!(completed[0].completed_date, Some(at(800)));
        assert_eq!(completed[1].id, 3);
        assert_eq!(completed[1].completed_date, Some(at(500)));
    }
}
