use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::AssessmentService;
use crate::middlewares::RequireJWT;
use crate::models::assessments::requests::CreateAssessmentRequest;
use crate::models::assessments::responses::CreateAssessmentResponse;
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};

/// 创建互评任务
/// POST /assessments
pub async fn create_assessment(
    service: &AssessmentService,
    request: &HttpRequest,
    req: CreateAssessmentRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    // 获取当前用户信息
    let current_user = match RequireJWT::extract_user_claims(request) {
        Some(user) => user,
        None => {
            return Ok(HttpResponse::Unauthorized()
                .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
        }
    };

    // 只有教师和管理员可以创建任务
    if current_user.role != UserRole::Teacher && current_user.role != UserRole::Admin {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "只有教师可以创建互评任务",
        )));
    }

    // 载荷校验全部在写库前完成
    if let Err(message) = validate_create_request(&req) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::BadRequest, message)));
    }

    match storage.create_assessments(current_user.id, &req).await {
        Ok(assessment_ids) => {
            info!(
                "Assessment '{}' created for {} group(s) by teacher {}",
                req.title,
                assessment_ids.len(),
                current_user.id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                CreateAssessmentResponse { assessment_ids },
                "互评任务创建成功",
            )))
        }
        Err(e) => {
            error!("Failed to create assessment: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::AssessmentCreationFailed,
                    "创建互评任务失败",
                )),
            )
        }
    }
}

/// 创建请求的载荷校验
fn validate_create_request(req: &CreateAssessmentRequest) -> Result<(), &'static str> {
    if req.title.trim().is_empty() {
        return Err("任务标题不能为空");
    }
    if req.group_ids.is_empty() {
        return Err("至少需要选择一个目标小组");
    }
    if req.criteria.is_empty() {
        return Err("至少需要一个评分维度");
    }
    for criterion in &req.criteria {
        if criterion.name.trim().is_empty() {
            return Err("评分维度名称不能为空");
        }
        if !criterion.min_score.is_finite() || !criterion.max_score.is_finite() {
            return Err("评分范围必须是有效数字");
        }
        if criterion.max_score < criterion.min_score {
            return Err("评分上限不能小于下限");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::assessments::requests::CriterionInput;
    use chrono::Utc;

    fn valid_request() -> CreateAssessmentRequest {
        CreateAssessmentRequest {
            title: "期中互评".to_string(),
            description: None,
            course_id: 1,
            group_ids: vec![10, 11],
            due_date: Utc::now(),
            criteria: vec![CriterionInput {
                name: "团队协作".to_string(),
                description: None,
                min_score: 0.0,
                max_score: 10.0,
            }],
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(validate_create_request(&valid_request()).is_ok());
    }

    #[test]
    fn test_empty_title_rejected() {
        let mut req = valid_request();
        req.title = "  ".to_string();
        assert!(validate_create_request(&req).is_err());
    }

    #[test]
    fn test_empty_groups_rejected() {
        let mut req = valid_request();
        req.group_ids.clear();
        assert!(validate_create_request(&req).is_err());
    }

    #[test]
    fn test_empty_criteria_rejected() {
        let mut req = valid_request();
        req.criteria.clear();
        assert!(validate_create_request(&req).is_err());
    }

    #[test]
    fn test_non_finite_score_rejected() {
        let mut req = valid_request();
        req.criteria[0].max_score = f64::NAN;
        assert!(validate_create_request(&req).is_err());
    }

    #[test]
    fn test_inverted_range_rejected() {
        let mut req = valid_request();
        req.criteria[0].min_score = 5.0;
        req.criteria[0].max_score = 1.0;
        assert!(validate_create_request(&req).is_err());
    }
}
