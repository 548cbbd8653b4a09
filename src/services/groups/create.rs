use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::GroupService;
use crate::middlewares::RequireJWT;
use crate::models::groups::requests::CreateGroupRequest;
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};

/// 创建小组
/// POST /groups
pub async fn create_group(
    service: &GroupService,
    request: &HttpRequest,
    req: CreateGroupRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let current_user = match RequireJWT::extract_user_claims(request) {
        Some(user) => user,
        None => {
            return Ok(HttpResponse::Unauthorized()
                .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
        }
    };

    if req.name.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "小组名称不能为空",
        )));
    }

    match storage.get_course_by_id(req.course_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::CourseNotFound,
                "课程不存在",
            )));
        }
        Err(e) => {
            error!("Failed to load course {}: {}", req.course_id, e);
            return Ok(internal_error());
        }
    }

    // 任课教师或管理员才能建组
    if current_user.role != UserRole::Admin {
        let teaches = match storage
            .is_course_teacher(req.course_id, current_user.id)
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
                "没有在该课程下创建小组的权限",
            )));
        }
    }

    // 初始成员必须都已选该课程
    for student_id in &req.student_ids {
        match storage.is_course_student(req.course_id, *student_id).await {
            Ok(true) => {}
            Ok(false) => {
                return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::BadRequest,
                    format!("学生 {student_id} 未选修该课程"),
                )));
            }
            Err(e) => {
                error!("Failed to check course student: {}", e);
                return Ok(internal_error());
            }
        }
    }

    match storage.create_group(req).await {
        Ok(group) => {
            info!("Group '{}' created by {}", group.name, current_user.id);
            Ok(HttpResponse::Created().json(ApiResponse::success(group, "小组创建成功")))
        }
        Err(e) => {
            error!("Failed to create group: {}", e);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::GroupCreationFailed,
                "创建小组失败",
            )))
        }
    }
}

fn internal_error() -> HttpResponse {
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        ErrorCode::InternalServerError,
        "操作失败",
    ))
}
