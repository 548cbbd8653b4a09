use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::UserService;
use crate::middlewares::RequireJWT;
use crate::models::users::entities::UserRole;
use crate::models::users::requests::CreateUserRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::utils::validate::{validate_email, validate_q_number};

/// 创建用户
/// POST /users
///
/// 学生必须预先建档（带学号）才能参与互评；教师与管理员账号也从这里建。
pub async fn create_user(
    service: &UserService,
    request: &HttpRequest,
    req: CreateUserRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let current_user = match RequireJWT::extract_user_claims(request) {
        Some(user) => user,
        None => {
            return Ok(HttpResponse::Unauthorized()
                .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
        }
    };

    if current_user.role != UserRole::Admin {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "只有管理员可以创建用户",
        )));
    }

    if let Err(message) = validate_create_request(&req) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserEmailInvalid, message)));
    }

    match storage.create_user(req).await {
        Ok(user) => {
            info!("User {} ({}) created by admin {}", user.id, user.email, current_user.id);
            Ok(HttpResponse::Created().json(ApiResponse::success(user, "用户创建成功")))
        }
        Err(e) if e.message().to_lowercase().contains("unique") => {
            Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::UserAlreadyExists,
                "该邮箱已被注册",
            )))
        }
        Err(e) => {
            error!("Failed to create user: {}", e);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::UserCreationFailed,
                "创建用户失败",
            )))
        }
    }
}

/// 创建用户请求校验：邮箱格式，学生角色必须带合法学号
fn validate_create_request(req: &CreateUserRequest) -> Result<(), &'static str> {
    validate_email(&req.email)?;

    if req.first_name.trim().is_empty() || req.last_name.trim().is_empty() {
        return Err("姓名不能为空");
    }

    match (&req.role, &req.q_number) {
        (UserRole::Student, Some(q_number)) => validate_q_number(q_number),
        (UserRole::Student, None) => Err("学生必须填写学号"),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(role: UserRole, q_number: Option<&str>) -> CreateUserRequest {
        CreateUserRequest {
            email: "alice@example.com".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Jones".to_string(),
            role,
            q_number: q_number.map(str::to_string),
        }
    }

    #[test]
    fn test_student_requires_q_number() {
        assert!(validate_create_request(&request(UserRole::Student, None)).is_err());
        assert!(validate_create_request(&request(UserRole::Student, Some("q1234567"))).is_ok());
    }

    #[test]
    fn test_teacher_without_q_number() {
        assert!(validate_create_request(&request(UserRole::Teacher, None)).is_ok());
    }

    #[test]
    fn test_invalid_email_rejected() {
        let mut req = request(UserRole::Teacher, None);
        req.email = "not-an-email".to_string();
        assert!(validate_create_request(&req).is_err());
    }

    #[test]
    fn test_invalid_q_number_rejected() {
        assert!(validate_create_request(&request(UserRole::Student, Some("xyz"))).is_err());
    }
}
