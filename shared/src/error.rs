//! API 错误载荷模块
//!
//! FastAPI 的错误响应统一包在 `{"detail": ...}` 里，但 `detail` 有两种形态：
//! - 普通字符串（业务错误，如 "Username already registered"）
//! - 字段校验错误数组（422，形如 `[{"loc": [...], "msg": "..."}]`）
//!
//! 两种形态都解码为 [`ErrorDetail`]，并提供拍平成单条可读消息的方法。

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// 错误响应体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: ErrorDetail,
}

/// `detail` 字段的两种形态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Message(String),
    Fields(Vec<FieldError>),
}

/// 单条字段校验错误
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    #[serde(default)]
    pub loc: Vec<LocSegment>,
    pub msg: String,
}

/// `loc` 路径段：字段名或数组下标
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocSegment {
    Key(String),
    Index(u64),
}

impl Display for LocSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocSegment::Key(k) => write!(f, "{}", k),
            LocSegment::Index(i) => write!(f, "{}", i),
        }
    }
}

impl FieldError {
    /// 取路径中最具体的一段作为字段名（`["body", "username"]` -> `username`）
    pub fn field_name(&self) -> Option<String> {
        self.loc.last().map(|seg| seg.to_string())
    }
}

impl ErrorDetail {
    /// 拍平为单条人类可读消息
    ///
    /// 字符串形态原样返回；校验数组形态拼成 `field: msg` 列表。
    pub fn flatten(&self) -> String {
        match self {
            ErrorDetail::Message(msg) => msg.clone(),
            ErrorDetail::Fields(fields) => fields
                .iter()
                .map(|f| match f.field_name() {
                    Some(name) => format!("{}: {}", name, f.msg),
                    None => f.msg.clone(),
                })
                .collect::<Vec<_>>()
                .join("; "),
        }
    }
}

impl ErrorBody {
    pub fn flatten(&self) -> String {
        self.detail.flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_string_detail() {
        let body: ErrorBody =
            serde_json::from_value(json!({ "detail": "Username already registered" })).unwrap();
        assert_eq!(body.flatten(), "Username already registered");
    }

    #[test]
    fn decodes_validation_detail_and_flattens() {
        let body: ErrorBody = serde_json::from_value(json!({
            "detail": [
                { "loc": ["body", "username"], "msg": "field required", "type": "value_error.missing" },
                { "loc": ["body", "password"], "msg": "ensure this value has at least 8 characters" }
            ]
        }))
        .unwrap();

        assert_eq!(
            body.flatten(),
            "username: field required; password: ensure this value has at least 8 characters"
        );
    }

    #[test]
    fn flattens_numeric_loc_segments() {
        let body: ErrorBody = serde_json::from_value(json!({
            "detail": [{ "loc": ["body", "parties", 0], "msg": "invalid" }]
        }))
        .unwrap();
        assert_eq!(body.flatten(), "0: invalid");
    }

    #[test]
    fn missing_loc_uses_bare_message() {
        let body: ErrorBody = serde_json::from_value(json!({
            "detail": [{ "msg": "something is off" }]
        }))
        .unwrap();
        assert_eq!(body.flatten(), "something is off");
    }
}
