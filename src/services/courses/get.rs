use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::CourseService;
use crate::middlewares::RequireJWT;
use crate::models::courses::responses::{CourseDetailResponse, CourseTeacherInfo};
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};

/// 课程详情
/// GET /courses/{id}
pub async fn get_course(
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

    let course = match storage.get_course_by_id(course_id).await {
        Ok(Some(course)) => course,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::CourseNotFound,
                "课程不存在",
            )));
        }
        Err(e) => return Ok(internal_error(&format!("查询课程失败: {e}"))),
    };

    // 成员校验：教师需任教，学生需选修，管理员放行
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
            "没有查看该课程的权限",
        )));
    }

    let teachers = match storage.list_course_teachers(course_id).await {
        Ok(users) => users
            .into_iter()
            .map(|u| CourseTeacherInfo {
                id: u.id,
                first_name: u.first_name,
                last_name: u.last_name,
                email: u.email,
            })
            .collect(),
        Err(e) => return Ok(internal_error(&format!("查询课程教师失败: {e}"))),
    };

    let groups = match storage.list_groups_by_course(course_id).await {
        Ok(groups) => groups,
        Err(e) => return Ok(internal_error(&format!("查询小组列表失败: {e}"))),
    };

    let students_count = match storage.count_course_students(course_id).await {
        Ok(count) => count as i64,
        Err(e) => return Ok(internal_error(&format!("统计选课人数失败: {e}"))),
    };

    let response = CourseDetailResponse {
        course,
        teachers,
        groups,
        students_count,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(response, "查询成功")))
}

fn internal_error(message: &str) -> HttpResponse {
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        ErrorCode::InternalServerError,
        message,
    ))
}
