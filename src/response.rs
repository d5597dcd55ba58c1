use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct Meta {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
    pub total: Option<i64>,
}

impl Meta {
    pub fn new(offset: i64, limit: i64, total: i64) -> Self {
        Self {
            offset: Some(offset),
            limit: Some(limit),
            total: Some(total),
        }
    }

    pub fn empty() -> Self {
        Self {
            offset: None,
            limit: None,
            total: None,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: Option<T>,
    pub meta: Option<Meta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(message: impl Into<String>, data: Option<T>, meta: Option<Meta>) -> Self {
        Self {
            message: message.into(),
            data,
            meta,
        }
    }

    pub fn success(message: impl Into<String>, data: T, meta: Option<Meta>) -> Self {
        Self::new(message, Some(data), meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_keeps_data_and_meta_as_given() {
        let resp: ApiResponse<serde_json::Value> = ApiResponse::new("Not Found", None, None);
        assert_eq!(resp.message, "Not Found");
        assert!(resp.data.is_none());
        assert!(resp.meta.is_none());
    }

    #[test]
    fn success_wraps_the_payload() {
        let resp = ApiResponse::success("Ok", serde_json::json!({"a": 1}), Some(Meta::empty()));
        assert!(resp.data.is_some());
        assert!(resp.meta.is_some());
    }
}
