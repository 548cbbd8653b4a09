use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::CourseService;
use crate::middlewares::RequireJWT;
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};

/// 列出与当前用户相关的课程
/// GET /courses
///
/// 教师看任教课程，学生看选修课程，管理员看全部。
pub async fn list_courses(
    service: &CourseService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let current_user = match RequireJWT::extract_user_claims(request) {
        Some(user) => user,
        None => {
            return Ok(HttpResponse::Unauthorized()
                .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
        }
    };

    let result = match current_user.role {
        UserRole::Admin => storage.list_all_courses().await,
        UserRole::Teacher => storage.list_courses_for_teacher(current_user.id).await,
        UserRole::Student => storage.list_courses_for_student(current_user.id).await,
    };

    match result {
        Ok(courses) => Ok(HttpResponse::Ok().json(ApiResponse::success(courses, "查询成功"))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("查询课程列表失败: {e}"),
            )),
        ),
    }
}
