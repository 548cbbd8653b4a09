use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AssessmentService;
use crate::middlewares::RequireJWT;
use crate::models::assessments::responses::{
    AssessmentBrief, AssessmentFeedbackResponse, FeedbackListEntry,
};
use crate::models::groups::responses::GroupMember;
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};

/// 反馈列表
/// GET /assessments/{id}/feedback
pub async fn get_feedback(
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
            "学生无权查看反馈列表",
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
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询互评任务失败: {e}"),
                )),
            );
        }
    };

    if current_user.role == UserRole::Teacher {
        let teaches = match storage
            .is_course_teacher(context.assessment.course_id, current_user.id)
            .await
        {
            Ok(v) => v,
            Err(e) => {
                return Ok(
                    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                        ErrorCode::InternalServerError,
                        format!("查询任教关系失败: {e}"),
                    )),
                );
            }
        };
        if !teaches {
            return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
                ErrorCode::Forbidden,
                "没有查看该任务反馈的权限",
            )));
        }
    }

    let responses = match storage.list_submitted_responses(assessment_id).await {
        Ok(r) => r,
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询反馈列表失败: {e}"),
                )),
            );
        }
    };

    // 只保留带非空反馈的已提交回复，存储层已按提交时间倒序返回
    let feedback = responses
        .into_iter()
        .filter_map(|r| {
            let feedback = r.feedback.as_deref().filter(|f| !f.is_empty())?.to_string();
            Some(FeedbackListEntry {
                response_id: r.response_id,
                feedback,
                submitted_at: r.submitted_at,
                student: GroupMember {
                    id: r.student_id,
                    first_name: r.first_name,
                    last_name: r.last_name,
                    q_number: r.q_number,
                },
                evaluated_students: r.evaluated_students.join(", "),
            })
        })
        .collect();

    let response = AssessmentFeedbackResponse {
        assessment: AssessmentBrief {
            id: context.assessment.id,
            title: context.assessment.title,
        },
        feedback,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(response, "查询成功")))
}
