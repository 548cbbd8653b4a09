use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::CourseService;
use crate::middlewares::RequireJWT;
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};

/// 删除课程
/// DELETE /courses/{id}
pub async fn delete_course(
    service: &CourseService,
    request: &HttpRequest,
    course_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let current_user = match RequireJWT::extract_user_claims(request) {
        Some(user) => user,
        None => {
            return Ok(HttpResponse::Unauthorized()
                .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
        }
    };

    match storage.get_course_by_id(course_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::CourseNotFound,
                "课程不存在",
            )));
        }
        Err(e) => {
            error!("Failed to load course {}: {}", course_id, e);
            return Ok(internal_error());
        }
    }

    if current_user.role != UserRole::Admin {
        let teaches = match storage.is_course_teacher(course_id, current_user.id).await {
            Ok(v) => v,
            Err(e) => {
                error!("Failed to check course teacher: {}", e);
                return Ok(internal_error());
            }
        };
        if !teaches {
            return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
                ErrorCode::CoursePermissionDenied,
                "没有删除该课程的权限",
            )));
        }
    }

    match storage.delete_course(course_id).await {
        Ok(true) => {
            info!("Course {} deleted by {}", course_id, current_user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("课程删除成功")))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::CourseNotFound,
            "课程不存在",
        ))),
        Err(e) => {
            error!("Failed to delete course: {}", e);
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
