use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::GroupService;
use crate::middlewares::RequireJWT;
use crate::models::groups::responses::{GroupDetailResponse, GroupMember};
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};

/// 小组详情
/// GET /groups/{id}
pub async fn get_group(
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
        Err(e) => return Ok(internal_error(&format!("查询小组失败: {e}"))),
    };

    // 管理员、任课教师或组员本人可以查看
    let permitted = match current_user.role {
        UserRole::Admin => true,
        UserRole::Teacher => {
            match storage
                .is_course_teacher(group.course_id, current_user.id)
                .await
            {
                Ok(v) => v,
                Err(e) => return Ok(internal_error(&format!("查询任教关系失败: {e}"))),
            }
        }
        UserRole::Student => match storage.is_group_member(group_id, current_user.id).await {
            Ok(v) => v,
            Err(e) => return Ok(internal_error(&format!("查询成员关系失败: {e}"))),
        },
    };

    if !permitted {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::GroupPermissionDenied,
            "没有查看该小组的权限",
        )));
    }

    let course_name = match storage.get_course_by_id(group.course_id).await {
        Ok(course) => course.map(|c| c.name).unwrap_or_default(),
        Err(e) => return Ok(internal_error(&format!("查询课程失败: {e}"))),
    };

    let members = match storage.list_group_students(group_id).await {
        Ok(users) => users
            .into_iter()
            .map(|u| GroupMember {
                id: u.id,
                first_name: u.first_name,
                last_name: u.last_name,
                q_number: u.q_number,
            })
            .collect(),
        Err(e) => return Ok(internal_error(&format!("查询小组成员失败: {e}"))),
    };

    let response = GroupDetailResponse {
        group,
        course_name,
        members,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(response, "查询成功")))
}

fn internal_error(message: &str) -> HttpResponse {
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        ErrorCode::InternalServerError,
        message,
    ))
}
