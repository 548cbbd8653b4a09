use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::CourseService;
use crate::middlewares::RequireJWT;
use crate::models::courses::requests::EnrollStudentsRequest;
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};

/// 批量选课
/// POST /courses/{id}/students
pub async fn enroll_students(
    service: &CourseService,
    request: &HttpRequest,
    course_id: i64,
    req: EnrollStudentsRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let current_user = match RequireJWT::extract_user_claims(request) {
        Some(user) => user,
        None => {
            return Ok(HttpResponse::Unauthorized()
                .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
        }
    };

    if req.student_ids.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "学生列表不能为空",
        )));
    }

    let course = match storage.get_course_by_id(course_id).await {
        Ok(Some(course)) => course,
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
    };

    // 任课教师或管理员才能加学生
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
                "没有管理该课程学生的权限",
            )));
        }
    }

    match storage
        .enroll_course_students(course_id, &req.student_ids)
        .await
    {
        Ok(added) => {
            info!(
                "{} student(s) enrolled into course '{}' by {}",
                added, course.name, current_user.id
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(format!(
                "成功添加 {added} 名学生"
            ))))
        }
        Err(e) => {
            error!("Failed to enroll students: {}", e);
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
