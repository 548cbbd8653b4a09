use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{AssessmentService, aggregate};
use crate::middlewares::RequireJWT;
use crate::models::assessments::entities::ResponseWithEvaluatees;
use crate::models::assessments::responses::{
    AssessmentResultsResponse, FeedbackGivenEntry, FeedbackReceivedEntry, StudentResultEntry,
};
use crate::models::groups::responses::GroupMember;
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};

/// 互评结果
/// GET /assessments/{id}/results
///
/// 学生在路由层就被拒掉；教师必须任教该课程，管理员放行。
/// 聚合输入用三次批量查询取回（名册、结果矩阵、已提交回复），
/// 汇总全部在内存完成。
pub async fn get_results(
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

    if current_user.role == UserRole::Student {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "学生无权查看互评结果",
        )));
    }

    let context = match storage.get_assessment_with_context(assessment_id).await {
        Ok(Some(ctx)) => ctx,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::AssessmentNotFound,
                "互评任务不存在",
            )));
        }
        Err(e) => return Ok(internal_error(&format!("查询互评任务失败: {e}"))),
    };

    // 教师必须任教该课程，管理员无条件放行
    if current_user.role == UserRole::Teacher {
        let teaches = match storage
            .is_course_teacher(context.assessment.course_id, current_user.id)
            .await
        {
            Ok(v) => v,
            Err(e) => return Ok(internal_error(&format!("查询任教关系失败: {e}"))),
        };
        if !teaches {
            return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
                ErrorCode::Forbidden,
                "没有查看该互评结果的权限",
            )));
        }
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

    let result_rows = match storage.list_assessment_results(assessment_id).await {
        Ok(rows) => rows,
        Err(e) => return Ok(internal_error(&format!("查询评分结果失败: {e}"))),
    };

    let responses = match storage.list_submitted_responses(assessment_id).await {
        Ok(r) => r,
        Err(e) => return Ok(internal_error(&format!("查询回复列表失败: {e}"))),
    };

    let results = roster
        .into_iter()
        .map(|entry| {
            let student = GroupMember {
                id: entry.id,
                first_name: entry.first_name,
                last_name: entry.last_name,
                q_number: entry.q_number,
            };

            let criteria_scores = aggregate::criterion_averages(&criteria, &result_rows, student.id);
            let (overall, max_average) =
                aggregate::overall_average(&criteria, &result_rows, student.id);

            StudentResultEntry {
                feedback_received: feedback_received(&responses, student.id),
                feedback_given: feedback_given(&responses, student.id),
                overall_average: overall,
                overall_average_display: aggregate::overall_display(overall, max_average),
                overall_score_color: aggregate::score_band(overall, max_average.unwrap_or(0.0)),
                criteria_scores,
                student,
            }
        })
        .collect();

    let response = AssessmentResultsResponse {
        id: context.assessment.id,
        title: context.assessment.title,
        course_name: context.course_name,
        group_name: context.group_name,
        description: context.assessment.description,
        due_date: context.assessment.due_date,
        max_score: aggregate::average_max_score(&criteria),
        criteria,
        results,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(response, "查询成功")))
}

fn internal_error(message: &str) -> HttpResponse {
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        ErrorCode::InternalServerError,
        message,
    ))
}

/// 某学生收到的反馈：评价对象里含该生、且带非空反馈的已提交回复
fn feedback_received(
    responses: &[ResponseWithEvaluatees],
    student_id: i64,
) -> Vec<FeedbackReceivedEntry> {
    responses
        .iter()
        .filter(|r| r.evaluated_student_ids.contains(&student_id))
        .filter_map(|r| {
            let feedback = r.feedback.as_deref().filter(|f| !f.is_empty())?;
            Some(FeedbackReceivedEntry {
                feedback: feedback.to_string(),
                first_name: r.first_name.clone(),
                last_name: r.last_name.clone(),
                submitted_at: r.submitted_at,
            })
        })
        .collect()
}

/// 某学生给出的反馈及其评价对象
fn feedback_given(
    responses: &[ResponseWithEvaluatees],
    student_id: i64,
) -> Option<FeedbackGivenEntry> {
    responses
        .iter()
        .find(|r| r.student_id == student_id)
        .map(|r| FeedbackGivenEntry {
            feedback: r.feedback.clone(),
            evaluated_students: r.evaluated_students.join(", "),
            submitted_at: r.submitted_at,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn response(
        response_id: i64,
        evaluator_id: i64,
        feedback: Option<&str>,
        evaluated: Vec<i64>,
    ) -> ResponseWithEvaluatees {
        ResponseWithEvaluatees {
            response_id,
            student_id: evaluator_id,
            first_name: format!("first-{evaluator_id}"),
            last_name: format!("last-{evaluator_id}"),
            q_number: None,
            feedback: feedback.map(str::to_string),
            submitted_at: Utc.timestamp_opt(500, 0).unwrap(),
            evaluated_student_ids: evaluated.clone(),
            evaluated_students: evaluated
                .iter()
                .map(|id| format!("first-{id} last-{id}"))
                .collect(),
        }
    }

    #[test]
    fn test_feedback_received_filters_empty_and_unrelated() {
        let responses = vec![
            response(1, 7, Some("good job"), vec![8, 9]),
            response(2, 8, Some(""), vec![7]),       // 空反馈不计
            response(3, 9, Some("well done"), vec![7]),
            response(4, 10, Some("nice"), vec![8]),  // 与 7 无关
        ];

        let received = feedback_received(&responses, 7);
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].feedback, "well done");
        assert_eq!(received[0].first_name, "first-9");
    }

    #[test]
    fn test_feedback_given_lists_evaluatees() {
        let responses = vec![response(1, 7, Some("my feedback"), vec![8, 9])];

        let given = feedback_given(&responses, 7).unwrap();
        assert_eq!(given.feedback.as_deref(), Some("my feedback"));
        assert_eq!(given.evaluated_students, "first-8 last-8, first-9 last-9");

        assert!(feedback_given(&responses, 8).is_none());
    }
}
