use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::assessments::requests::{CreateAssessmentRequest, SubmitResponseRequest};
use crate::models::users::entities::UserRole;
use crate::services::AssessmentService;
use crate::utils::SafeAssessmentIdI64;

// 懒加载的全局 AssessmentService 实例
static ASSESSMENT_SERVICE: Lazy<AssessmentService> = Lazy::new(AssessmentService::new_lazy);

// 创建互评任务
pub async fn create_assessment(
    req: HttpRequest,
    body: web::Json<CreateAssessmentRequest>,
) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE
        .create_assessment(&req, body.into_inner())
        .await
}

// 待完成任务列表
pub async fn list_pending(req: HttpRequest) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE.list_pending(&req).await
}

// 已完成任务列表
pub async fn list_completed(req: HttpRequest) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE.list_completed(&req).await
}

// 任务详情
pub async fn get_assessment(
    req: HttpRequest,
    assessment_id: SafeAssessmentIdI64,
) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE.get_assessment(&req, assessment_id.0).await
}

// 提交互评回复
pub async fn submit_response(
    req: HttpRequest,
    assessment_id: SafeAssessmentIdI64,
    body: web::Json<SubmitResponseRequest>,
) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE
        .submit_response(&req, assessment_id.0, body.into_inner())
        .await
}

// 互评结果
pub async fn get_results(
    req: HttpRequest,
    assessment_id: SafeAssessmentIdI64,
) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE.get_results(&req, assessment_id.0).await
}

// 反馈列表
pub async fn get_feedback(
    req: HttpRequest,
    assessment_id: SafeAssessmentIdI64,
) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE.get_feedback(&req, assessment_id.0).await
}

// 配置路由
pub fn configure_assessments_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/assessments")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("").route(
                    web::post()
                        .to(create_assessment)
                        // 教师和管理员可以创建互评任务
                        .wrap(middlewares::RateLimit::creation())
                        .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                ),
            )
            // 字面路径要先于 {assessment_id} 注册
            .service(web::resource("/pending").route(web::get().to(list_pending)))
            .service(web::resource("/completed").route(web::get().to(list_completed)))
            .service(web::resource("/{assessment_id}").route(web::get().to(get_assessment)))
            .service(
                web::resource("/{assessment_id}/submit").route(
                    web::post()
                        .to(submit_response)
                        // 只有学生提交互评
                        .wrap(middlewares::RateLimit::submission())
                        .wrap(middlewares::RequireRole::new(&UserRole::Student)),
                ),
            )
            .service(
                web::resource("/{assessment_id}/results").route(
                    web::get()
                        .to(get_results)
                        // 结果只开放给教师和管理员
                        .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                ),
            )
            .service(
                web::resource("/{assessment_id}/feedback").route(
                    web::get()
                        .to(get_feedback)
                        .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                ),
            ),
    );
}
