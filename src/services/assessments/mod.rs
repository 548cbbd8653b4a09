pub mod aggregate;
pub mod create;
pub mod detail;
pub mod feedback;
pub mod list;
pub mod results;
pub mod submit;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::assessments::requests::{CreateAssessmentRequest, SubmitResponseRequest};
use crate::storage::Storage;

pub struct AssessmentService {
    storage: Option<Arc<dyn Storage>>,
}

impl AssessmentService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    /// 创建互评任务（每个目标小组一份）
    pub async fn create_assessment(
        &self,
        request: &HttpRequest,
        req: CreateAssessmentRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_assessment(self, request, req).await
    }

    /// 待完成任务列表
    pub async fn list_pending(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        list::list_pending(self, request).await
    }

    /// 已完成任务列表
    pub async fn list_completed(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        list::list_completed(self, request).await
    }

    /// 任务详情（按角色投影）
    pub async fn get_assessment(
        &self,
        request: &HttpRequest,
        assessment_id: i64,
    ) -> ActixResult<HttpResponse> {
        detail::get_assessment(self, request, assessment_id).await
    }

    /// 提交互评回复
    pub async fn submit_response(
        &self,
        request: &HttpRequest,
        assessment_id: i64,
        req: SubmitResponseRequest,
    ) -> ActixResult<HttpResponse> {
        submit::submit_response(self, request, assessment_id, req).await
    }

    /// 互评结果（教师/管理员）
    pub async fn get_results(
        &self,
        request: &HttpRequest,
        assessment_id: i64,
    ) -> ActixResult<HttpResponse> {
        results::get_results(self, request, assessment_id).await
    }

    /// 反馈列表（教师/管理员）
    pub async fn get_feedback(
        &self,
        request: &HttpRequest,
        assessment_id: i64,
    ) -> ActixResult<HttpResponse> {
        feedback::get_feedback(self, request, assessment_id).await
    }
}
