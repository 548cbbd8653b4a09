use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{AssessmentService, aggregate};
use crate::middlewares::RequireJWT;
use crate::models::assessments::entities::{AssessmentWithContext, Criterion, ResponseSummary};
use crate::models::assessments::responses::{
    GivenScore, RosterEntry, StudentAssessmentDetail, TeacherAssessmentDetail,
};
use crate::models::groups::responses::GroupMember;
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};

/// 任务详情
/// GET /assessments/{id}
///
/// 同一份查询结果按角色投影成两种固定形状：学生投影不含他人提交状态与计数，
/// 教师/管理员投影带完整名册。
pub async fn get_assessment(
    service: &AssessmentService,
    request: &HttpRequest,
    assessment_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let current_user = match RequireJWT::extract_user_claims(request) {
        Some(user) => user,
        None => {
            return Ok(HttpResponse::Unauthorized()
                .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
        }
    };

    let context = match storage.get_assessment_with_context(assessment_id).await {
        Ok(Some(ctx)) => ctx,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::AssessmentNotFound,
                "互评任务不存在",
            )));
        }
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询互评任务失败: {e}"),
                )),
            );
        }
    };

    // 归属校验：学生看所在小组的任务，教师看所教课程的任务，管理员放行
    match current_user.role {
        UserRole::Student => {
            let is_member = match storage
                .is_group_member(context.assessment.group_id, current_user.id)
                .await
            {
                Ok(v) => v,
                Err(e) => {
                    return Ok(internal_error(&format!("查询成员关系失败: {e}")));
                }
            };
            if !is_member {
                return Ok(forbidden());
            }
        }
        UserRole::Teacher => {
            let teaches = match storage
                .is_course_teacher(context.assessment.course_id, current_user.id)
                .await
            {
                Ok(v) => v,
                Err(e) => {
                    return Ok(internal_error(&format!("查询任教关系失败: {e}")));
                }
            };
            if !teaches {
                return Ok(forbidden());
            }
        }
        UserRole::Admin => {}
    }

    let criteria = match storage.list_criteria(assessment_id).await {
        Ok(c) => c,
        Err(e) => return Ok(internal_error(&format!("查询评分维度失败: {e}"))),
    };

    let roster = match storage
        .list_group_roster(context.assessment.group_id, assessment_id)
        .await
    {
        Ok(r) => r,
        Err(e) => return Ok(internal_error(&format!("查询小组名册失败: {e}"))),
    };

    match current_user.role {
        UserRole::Student => {
            let response = match storage.get_response(assessment_id, current_user.id).await {
                Ok(r) => r,
                Err(e) => return Ok(internal_error(&format!("查询回复状态失败: {e}"))),
            };

            let given_scores = match &response {
                Some(r) if r.is_submitted() => {
                    match storage.list_given_scores(r.id).await {
                        Ok(scores) => scores,
                        Err(e) => {
                            return Ok(internal_error(&format!("查询已给分数失败: {e}")));
                        }
                    }
                }
                _ => vec![],
            };

            let detail = project_student_detail(
                context,
                criteria,
                roster,
                current_user.id,
                response,
                given_scores,
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(detail, "查询成功")))
        }
        UserRole::Teacher | UserRole::Admin => {
            let detail = project_teacher_detail(context, criteria, roster);
            Ok(HttpResponse::Ok().json(ApiResponse::success(detail, "查询成功")))
        }
    }
}

fn forbidden() -> HttpResponse {
    HttpResponse::Forbidden().json(ApiResponse::error_empty(
        ErrorCode::Forbidden,
        "没有查看该互评任务的权限",
    ))
}

fn internal_error(message: &str) -> HttpResponse {
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        ErrorCode::InternalServerError,
        message,
    ))
}

/// 学生投影：隐藏他人提交状态，只保留待评组员与本人回复
fn project_student_detail(
    context: AssessmentWithContext,
    criteria: Vec<Criterion>,
    roster: Vec<RosterEntry>,
    student_id: i64,
    response: Option<ResponseSummary>,
    given_scores: Vec<GivenScore>,
) -> StudentAssessmentDetail {
    let students_to_evaluate = roster
        .into_iter()
        .filter(|entry| entry.id != student_id)
        .map(|entry| GroupMember {
            id: entry.id,
            first_name: entry.first_name,
            last_name: entry.last_name,
            q_number: entry.q_number,
        })
        .collect();

    let submitted = response.as_ref().is_some_and(|r| r.is_submitted());

    StudentAssessmentDetail {
        id: context.assessment.id,
        title: context.assessment.title,
        course_name: context.course_name,
        group_name: context.group_name,
        description: context.assessment.description,
        due_date: context.assessment.due_date,
        criteria,
        students_to_evaluate,
        response_id: response.as_ref().map(|r| r.id),
        feedback: response.and_then(|r| r.feedback),
        submitted,
        given_scores,
    }
}

/// 教师/管理员投影：完整名册、提交状态与进度
fn project_teacher_detail(
    context: AssessmentWithContext,
    criteria: Vec<Criterion>,
    roster: Vec<RosterEntry>,
) -> TeacherAssessmentDetail {
    let students_count = roster.len() as i64;
    let responses_count = roster.iter().filter(|entry| entry.has_submitted).count() as i64;

    TeacherAssessmentDetail {
        id: context.assessment.id,
        title: context.assessment.title,
        course_name: context.course_name,
        group_name: context.group_name,
        description: context.assessment.description,
        due_date: context.assessment.due_date,
        criteria,
        students: roster,
        responses_count,
        students_count,
        progress: aggregate::completion_percentage(responses_count, students_count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::assessments::entities::Assessment;
    use chrono::{TimeZone, Utc};

    fn context() -> AssessmentWithContext {
        AssessmentWithContext {
            assessment: Assessment {
                id: 1,
                title: "互评".to_string(),
                description: None,
                course_id: 1,
                group_id: 1,
                teacher_id: 1,
                due_date: Utc.timestamp_opt(1_000, 0).unwrap(),
                created_at: Utc.timestamp_opt(0, 0).unwrap(),
            },
            course_name: "course".to_string(),
            group_name: "group".to_string(),
        }
    }

    fn roster_entry(id: i64, has_submitted: bool) -> RosterEntry {
        RosterEntry {
            id,
            first_name: format!("first-{id}"),
            last_name: format!("last-{id}"),
            q_number: None,
            has_submitted,
            submitted_at: has_submitted.then(|| Utc.timestamp_opt(500, 0).unwrap()),
        }
    }

    #[test]
    fn test_student_projection_excludes_self_and_status() {
        let roster = vec![roster_entry(7, true), roster_entry(8, false), roster_entry(9, true)];
        let detail = project_student_detail(context(), vec![], roster, 7, None, vec![]);

        // 不含本人
        assert_eq!(detail.students_to_evaluate.len(), 2);
        assert!(detail.students_to_evaluate.iter().all(|s| s.id != 7));
        assert!(!detail.submitted);
        assert_eq!(detail.response_id, None);
    }

    #[test]
    fn test_teacher_projection_counts() {
        let roster = vec![roster_entry(7, true), roster_entry(8, false)];
        let detail = project_teacher_detail(context(), vec![], roster);

        assert_eq!(detail.students_count, 2);
        assert_eq!(detail.responses_count, 1);
        assert_eq!(detail.progress, 50);
        assert_eq!(detail.students.len(), 2);
    }
}
