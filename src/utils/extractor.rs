//! 路径参数安全提取器
//!
//! 把路径中的 ID 参数解析为正整数，解析失败时直接返回统一格式的 400 响应，
//! 避免每个处理函数重复校验。

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest, HttpResponse};
use futures_util::future::{Ready, ready};

use crate::models::{ApiResponse, ErrorCode};

macro_rules! define_safe_i64_extractor {
    ($name:ident, $param:literal) => {
        pub struct $name(pub i64);

        impl FromRequest for $name {
            type Error = actix_web::Error;
            type Future = Ready<Result<Self, Self::Error>>;

            fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
                let parsed = req
                    .match_info()
                    .get($param)
                    .and_then(|raw| raw.parse::<i64>().ok())
                    .filter(|id| *id > 0);

                match parsed {
                    Some(id) => ready(Ok($name(id))),
                    None => {
                        let response = HttpResponse::BadRequest().json(ApiResponse::error_empty(
                            ErrorCode::BadRequest,
                            concat!("无效的路径参数: ", $param),
                        ));
                        ready(Err(actix_web::error::InternalError::from_response(
                            concat!("invalid path parameter: ", $param),
                            response,
                        )
                        .into()))
                    }
                }
            }
        }
    };
}

define_safe_i64_extractor!(SafeAssessmentIdI64, "assessment_id");
define_safe_i64_extractor!(SafeCourseIdI64, "course_id");
define_safe_i64_extractor!(SafeGroupIdI64, "group_id");
define_safe_i64_extractor!(SafeUserIdI64, "user_id");
