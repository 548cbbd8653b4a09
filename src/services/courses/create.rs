use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::CourseService;
use crate::middlewares::RequireJWT;
use crate::models::courses::requests::CreateCourseRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::utils::random_code::generate_course_code;

const COURSE_CODE_LENGTH: usize = 8;

/// 创建课程
/// POST /courses
pub async fn create_course(
    service: &CourseService,
    request: &HttpRequest,
    req: CreateCourseRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let uid = match RequireJWT::extract_user_id(request) {
        Some(id) => id,
        None => {
            return Ok(HttpResponse::Unauthorized()
                .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
        }
    };

    if req.name.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "课程名称不能为空",
        )));
    }

    // 课程代码随机生成，撞上唯一约束就换一个重试
    for _attempt in 0..3 {
        let code = generate_course_code(COURSE_CODE_LENGTH);
        let course = CreateCourseRequest {
            name: req.name.clone(),
            description: req.description.clone(),
        };

        match storage.create_course(course, uid, &code).await {
            Ok(created) => {
                info!("Course '{}' ({}) created by {}", created.name, created.code, uid);
                return Ok(HttpResponse::Created()
                    .json(ApiResponse::success(created, "课程创建成功")));
            }
            Err(e) if e.message().to_lowercase().contains("unique") => {
                continue;
            }
            Err(e) => {
                error!("Failed to create course: {}", e);
                return Ok(
                    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                        ErrorCode::CourseCreationFailed,
                        "创建课程失败",
                    )),
                );
            }
        }
    }

    Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
        ErrorCode::CourseCodeConflict,
        "课程代码生成冲突，请重试",
    )))
}
