//! 请求体提取器

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::utils::AppError;
use crate::utils::validation::validation_error;

/// JSON body + `validator::Validate`
///
/// 反序列化失败和字段校验失败都返回 400 ValidationFailed，
/// 业务规则 (库存、状态机等) 仍由服务层检查。
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| AppError::validation(rejection.body_text()))?;
        value.validate().map_err(|e| validation_error(&e))?;
        Ok(ValidatedJson(value))
    }
}
