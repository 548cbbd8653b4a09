use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::GroupService;
use crate::middlewares::RequireJWT;
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};

/// 删除小组
/// DELETE /groups/{id}
pub async fn delete_group(
    service: &GroupService,
    request: &HttpRequest,
    group_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let current_user = match RequireJWT::extract_user_claims(request) {
        Some(user) => user,
        None => {
            return Ok(HttpResponse::Unauthorized()
                .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
        }
    };

    let group = match storage.get_group_by_id(group_id).await {
        Ok(Some(group)) => group,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::GroupNotFound,
                "小组不存在",
            )));
        }
        Err(e) => {
            error!("Failed to load group {}: {}", group_id, e);
            return Ok(internal_error());
        }
    };

    if current_user.role != UserRole::Admin {
        let teaches = match storage
            .is_course_teacher(group.course_id, current_user.id)
            .await
        {
            Ok(v) => v,
            Err(e) => {
                error!("Failed to check course teacher: {}", e);
                return Ok(internal_error());
            }
        };
        if !teaches {
            return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
                ErrorCode::GroupPermissionDenied,
                "没有删除该小组的权限",
            )));
        }
    }

    match storage.delete_group(group_id).await {
        Ok(true) => {
            info!("Group {} deleted by {}", group_id, current_user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("小组删除成功")))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::GroupNotFound,
            "小组不存在",
        ))),
        Err(e) => {
            error!("Failed to delete group: {}", e);
            Ok(internal_error())
        }
    }
}

fn internal_error() -> HttpResponse {
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        ErrorCode::InternalServerError,
        "操作失败",
    ))
}
