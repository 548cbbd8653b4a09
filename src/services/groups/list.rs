use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::GroupService;
use crate::middlewares::RequireJWT;
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};

/// 列出课程下的小组
/// GET /groups?course_id=
pub async fn list_groups(
    service: &GroupService,
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
        Err(e) => return Ok(internal_error(&format!("查询课程失败: {e}"))),
    }

    // 课程相关人员才能看：任课教师、选课学生、管理员
    let permitted = match current_user.role {
        UserRole::Admin => true,
        UserRole::Teacher => match storage.is_course_teacher(course_id, current_user.id).await {
            Ok(v) => v,
            Err(e) => return Ok(internal_error(&format!("查询任教关系失败: {e}"))),
        },
        UserRole::Student => match storage.is_course_student(course_id, current_user.id).await {
            Ok(v) => v,
            Err(e) => return Ok(internal_error(&format!("查询选课关系失败: {e}"))),
        },
    };

    if !permitted {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::CoursePermissionDenied,
            "没有查看该课程小组的权限",
        )));
    }

    match storage.list_groups_by_course(course_id).await {
        Ok(groups) => Ok(HttpResponse::Ok().json(ApiResponse::success(groups, "查询成功"))),
        Err(e) => Ok(internal_error(&format!("查询小组列表失败: {e}"))),
    }
}

fn internal_error(message: &str) -> HttpResponse {
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        ErrorCode::InternalServerError,
        message,
    ))
}
