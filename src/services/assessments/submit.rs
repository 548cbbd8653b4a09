use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::AssessmentService;
use crate::middlewares::RequireJWT;
use crate::models::assessments::entities::Criterion;
use crate::models::assessments::requests::{ScoreInput, SubmitResponseRequest};
use crate::models::assessments::responses::SubmitResponseResponse;
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};

/// 提交互评回复
/// POST /assessments/{id}/submit
///
/// 校验全部通过后才进入写库事务；重交是整体替换，旧分数先删后插，
/// 事务失败时第一次提交的内容保持原样。
pub async fn submit_response(
    service: &AssessmentService,
    request: &HttpRequest,
    assessment_id: i64,
    req: SubmitResponseRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let current_user = match RequireJWT::extract_user_claims(request) {
        Some(user) => user,
        None => {
            return Ok(HttpResponse::Unauthorized()
                .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
        }
    };

    // 只有学生可以提交
    if current_user.role != UserRole::Student {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "只有学生可以提交互评",
        )));
    }

    // 空评分集在触碰任何已有数据之前拒绝
    if req.scores.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ScoresInvalid,
            "评分不能为空",
        )));
    }

    // 任务存在性与组员身份合并成一个判定，对外不区分两种失败，
    // 避免向非组员泄露任务是否存在
    let context = match storage.get_assessment_with_context(assessment_id).await {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Failed to load assessment {}: {}", assessment_id, e);
            return Ok(internal_error());
        }
    };

    let is_member = match &context {
        Some(ctx) => match storage
            .is_group_member(ctx.assessment.group_id, current_user.id)
            .await
        {
            Ok(v) => v,
            Err(e) => {
                error!("Failed to check membership: {}", e);
                return Ok(internal_error());
            }
        },
        None => false,
    };

    if context.is_none() || !is_member {
        return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::AssessmentNotFound,
            "互评任务不存在或你不在该小组",
        )));
    }

    let criteria = match storage.list_criteria(assessment_id).await {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load criteria: {}", e);
            return Ok(internal_error());
        }
    };

    if let Err(message) = validate_scores(&criteria, &req.scores) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::ScoresInvalid, message)));
    }

    match storage
        .submit_response(assessment_id, current_user.id, req.feedback, &req.scores)
        .await
    {
        Ok((response_id, average_scores)) => {
            info!(
                "Student {} submitted response {} for assessment {}",
                current_user.id, response_id, assessment_id
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                SubmitResponseResponse {
                    response_id,
                    average_scores,
                },
                "互评提交成功",
            )))
        }
        Err(e) => {
            error!("Failed to submit response: {}", e);
            Ok(internal_error())
        }
    }
}

fn internal_error() -> HttpResponse {
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        ErrorCode::InternalServerError,
        "提交互评失败",
    ))
}

/// 评分集校验
///
/// 每条评分必须指向本任务的维度，分数必须是落在该维度范围内的有效数字。
/// 任何一条不合法都拒绝整个提交。
fn validate_scores(criteria: &[Criterion], scores: &[ScoreInput]) -> Result<(), String> {
    for score in scores {
        let Some(criterion) = criteria.iter().find(|c| c.id == score.criteria_id) else {
            return Err(format!("评分维度 {} 不属于该任务", score.criteria_id));
        };

        if !score.score.is_finite() {
            return Err("分数必须是有效数字".to_string());
        }

        if score.score < criterion.min_score || score.score > criterion.max_score {
            return Err(format!(
                "分数 {} 超出维度 \"{}\" 的范围 [{}, {}]",
                score.score, criterion.name, criterion.min_score, criterion.max_score
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn criterion(id: i64, min: f64, max: f64) -> Criterion {
        Criterion {
            id,
            assessment_id: 1,
            name: format!("criterion-{id}"),
            description: None,
            min_score: min,
            max_score: max,
        }
    }

    fn score(criteria_id: i64, value: f64) -> ScoreInput {
        ScoreInput {
            criteria_id,
            student_id: 7,
            score: value,
        }
    }

    #[test]
    fn test_valid_scores_pass() {
        let criteria = vec![criterion(1, 0.0, 10.0), criterion(2, 1.0, 5.0)];
        let scores = vec![score(1, 8.0), score(2, 3.0)];
        assert!(validate_scores(&criteria, &scores).is_ok());
    }

    #[test]
    fn test_foreign_criterion_rejected() {
        let criteria = vec![criterion(1, 0.0, 10.0)];
        let scores = vec![score(99, 5.0)];
        assert!(validate_scores(&criteria, &scores).is_err());
    }

    #[test]
    fn test_out_of_range_rejected() {
        let criteria = vec![criterion(1, 0.0, 10.0)];
        assert!(validate_scores(&criteria, &[score(1, 11.0)]).is_err());
        assert!(validate_scores(&criteria, &[score(1, -1.0)]).is_err());
    }

    #[test]
    fn test_boundary_scores_accepted() {
        let criteria = vec![criterion(1, 0.0, 10.0)];
        assert!(validate_scores(&criteria, &[score(1, 0.0)]).is_ok());
        assert!(validate_scores(&criteria, &[score(1, 10.0)]).is_ok());
    }

    #[test]
    fn test_non_finite_rejected() {
        let criteria = vec![criterion(1, 0.0, 10.0)];
        assert!(validate_scores(&criteria, &[score(1, f64::NAN)]).is_err());
        assert!(validate_scores(&criteria, &[score(1, f64::INFINITY)]).is_err());
    }

    #[test]
    fn test_one_bad_entry_rejects_all() {
        let criteria = vec![criterion(1, 0.0, 10.0)];
        let scores = vec![score(1, 5.0), score(1, 12.0)];
        assert!(validate_scores(&criteria, &scores).is_err());
    }
}
