//! 请求客户端模块
//!
//! 把异构的后端 API 收敛成一个统一的调用约定：
//! - 方法缺省：带 body 为 POST，否则 GET，显式指定可覆盖
//! - Content-Type：multipart 一律不写（边界串留给浏览器），其余默认 JSON，
//!   显式请求头可覆盖默认值
//! - 持久化存储里有 Token 就带 `Authorization: Bearer <token>`
//! - 401 统一处理：清会话并短路为 Unauthorized，路由守卫随后送回登录页
//! - 非 2xx 以解析后的 JSON 错误体拒绝；解析失败退化为 `{detail: 状态文本}`
//! - 传输层故障一律归一化，不向调用方泄漏原始异常

use crate::session::Session;
use crate::web::{
    FilePart, HttpMethod, HttpRequest, HttpTransport, MultipartForm, RequestBody,
};
use clauselens_shared::error::ErrorBody;
use clauselens_shared::{
    AskRequest, ContractDetail, ContractSummary, HEADER_AUTHORIZATION, QueryAnswer, SignupRequest,
    TokenResponse, UploadReceipt, UserAccount,
};
use leptos::prelude::use_context;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// 编译期配置的后端基地址，本版本不提供运行时覆盖
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

pub fn api_base_url() -> String {
    option_env!("CLAUSELENS_API_URL")
        .unwrap_or(DEFAULT_API_BASE)
        .trim_end_matches('/')
        .to_string()
}

// =========================================================
// 错误分类 (Error Taxonomy)
// =========================================================

/// 请求层错误
#[derive(Debug)]
pub enum ApiError {
    /// 传输层故障（断网 / DNS / CORS），已归一化
    Network,
    /// 401，已在请求层完成会话销毁
    Unauthorized,
    /// 其余非 2xx，携带解析后的错误体供调用方读取结构化信息
    Api { status: u16, body: serde_json::Value },
    /// 响应体不符合端点的类型契约
    Decode(String),
}

impl core::fmt::Display for ApiError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ApiError::Network => write!(f, "Network error or server is down."),
            ApiError::Unauthorized => write!(f, "Unauthorized"),
            ApiError::Api { status, .. } => write!(f, "request failed with status {}", status),
            ApiError::Decode(msg) => write!(f, "unexpected response shape: {}", msg),
        }
    }
}

impl ApiError {
    /// 视图层展示用消息
    ///
    /// 错误体里有 `detail` 就用（校验数组会被拍平），否则落到调用视图
    /// 自己的兜底文案。
    pub fn surface(&self, fallback: &str) -> String {
        match self {
            ApiError::Network => self.to_string(),
            ApiError::Unauthorized => "Unauthorized".to_string(),
            ApiError::Api { body, .. } => serde_json::from_value::<ErrorBody>(body.clone())
                .map(|b| b.flatten())
                .unwrap_or_else(|_| fallback.to_string()),
            ApiError::Decode(_) => fallback.to_string(),
        }
    }
}

// =========================================================
// 调用约定 (Calling Convention)
// =========================================================

/// 单次请求的可选参数包
#[derive(Default)]
pub struct RequestOptions {
    pub method: Option<HttpMethod>,
    pub body: Option<RequestBody>,
    pub headers: Vec<(String, String)>,
}

/// 请求客户端
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    session: Session,
    transport: Arc<dyn HttpTransport>,
}

impl ApiClient {
    pub fn new(base_url: String, session: Session, transport: Arc<dyn HttpTransport>) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            base_url,
            session,
            transport,
        }
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// **核心方法：统一调用约定**
    pub async fn request(
        &self,
        path: &str,
        opts: RequestOptions,
    ) -> Result<serde_json::Value, ApiError> {
        let method = opts.method.unwrap_or(if opts.body.is_some() {
            HttpMethod::Post
        } else {
            HttpMethod::Get
        });

        let mut headers: Vec<(String, String)> = Vec::new();
        if let Some(body) = &opts.body {
            // multipart 的 Content-Type 必须留给传输层写边界串
            if !body.is_multipart() {
                headers.push(("Content-Type".to_string(), "application/json".to_string()));
            }
        }
        if let Some(token) = self.session.token() {
            headers.push((HEADER_AUTHORIZATION.to_string(), format!("Bearer {}", token)));
        }
        // 显式请求头最后合并，覆盖同名默认值
        for (key, value) in opts.headers {
            headers.retain(|(k, _)| !k.eq_ignore_ascii_case(&key));
            headers.push((key, value));
        }

        let req = HttpRequest {
            url: self.url(path),
            method,
            headers,
            body: opts.body,
        };

        let resp = match self.transport.send(req).await {
            Ok(resp) => resp,
            Err(_) => return Err(ApiError::Network),
        };

        if resp.status == 401 {
            // 会话销毁后路由守卫会强制回到登录页
            self.session.clear();
            return Err(ApiError::Unauthorized);
        }

        let body = serde_json::from_str::<serde_json::Value>(&resp.body)
            .unwrap_or_else(|_| serde_json::json!({ "detail": resp.status_text.clone() }));

        if !resp.ok() {
            return Err(ApiError::Api {
                status: resp.status,
                body,
            });
        }
        Ok(body)
    }

    fn decode<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, ApiError> {
        serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
    }

    // =====================================================
    // 端点绑定 (Endpoint Bindings)
    // =====================================================

    /// `POST /signup`
    ///
    /// 注册本身不建立会话，成功后需要再调一次 [`ApiClient::login`]。
    pub async fn signup(&self, username: &str, password: &str) -> Result<UserAccount, ApiError> {
        let payload = SignupRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let body = serde_json::to_value(&payload).map_err(|e| ApiError::Decode(e.to_string()))?;
        let value = self
            .request(
                "/signup",
                RequestOptions {
                    body: Some(RequestBody::Json(body)),
                    ..Default::default()
                },
            )
            .await?;
        Self::decode(value)
    }

    /// `POST /login`：表单编码的凭据，成功后建立会话
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, ApiError> {
        let encoded = format!(
            "username={}&password={}",
            form_encode(username),
            form_encode(password)
        );
        let value = self
            .request(
                "/login",
                RequestOptions {
                    body: Some(RequestBody::UrlEncoded(encoded)),
                    headers: vec![(
                        "Content-Type".to_string(),
                        "application/x-www-form-urlencoded".to_string(),
                    )],
                    ..Default::default()
                },
            )
            .await?;
        let token: TokenResponse = Self::decode(value)?;
        self.session.establish(&token.access_token);
        Ok(token)
    }

    /// `GET /contracts`
    pub async fn list_contracts(&self) -> Result<Vec<ContractSummary>, ApiError> {
        let value = self.request("/contracts", RequestOptions::default()).await?;
        Self::decode(value)
    }

    /// `GET /contracts/{id}`
    pub async fn contract_detail(&self, id: &str) -> Result<ContractDetail, ApiError> {
        let value = self
            .request(&format!("/contracts/{}", id), RequestOptions::default())
            .await?;
        Self::decode(value)
    }

    /// `POST /upload`：multipart 表单 `file, parties, expiry_date`
    pub async fn upload_contract(
        &self,
        file: FilePart,
        parties: &str,
        expiry_date: &str,
    ) -> Result<UploadReceipt, ApiError> {
        let form = MultipartForm::new()
            .file("file", file)
            .text("parties", parties)
            .text("expiry_date", expiry_date);
        let value = self
            .request(
                "/upload",
                RequestOptions {
                    body: Some(RequestBody::Multipart(form)),
                    ..Default::default()
                },
            )
            .await?;
        Self::decode(value)
    }

    /// `POST /ask`
    pub async fn ask(&self, question: &str) -> Result<QueryAnswer, ApiError> {
        let payload = AskRequest {
            question: question.to_string(),
        };
        let body = serde_json::to_value(&payload).map_err(|e| ApiError::Decode(e.to_string()))?;
        let value = self
            .request(
                "/ask",
                RequestOptions {
                    body: Some(RequestBody::Json(body)),
                    ..Default::default()
                },
            )
            .await?;
        Self::decode(value)
    }
}

/// application/x-www-form-urlencoded 编码
fn form_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// 从 Context 获取请求客户端
pub fn use_api() -> ApiClient {
    use_context::<ApiClient>().expect("ApiClient should be provided")
}

// =========================================================
// 单元测试 (Unit Tests)
// =========================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::{FileContent, MemoryTokenStore, MockTransport, PartValue};
    use serde_json::json;

    const BASE: &str = "http://test";

    fn client_with_token(token: Option<&str>) -> (ApiClient, Arc<MockTransport>, Session) {
        let store = match token {
            Some(t) => MemoryTokenStore::with_token(t),
            None => MemoryTokenStore::new(),
        };
        let session = Session::new(Arc::new(store));
        let transport = Arc::new(MockTransport::new());
        let client = ApiClient::new(BASE.to_string(), session.clone(), transport.clone());
        (client, transport, session)
    }

    #[tokio::test]
    async fn json_body_defaults_to_post_with_json_content_type() {
        let (client, transport, _) = client_with_token(None);
        transport.mock_json(&format!("{}/ask", BASE), 200, json!({ "answer": "a" }));

        let _ = client.ask("what is the notice period?").await.unwrap();

        let req = transport.last_request().unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.header("content-type"), Some("application/json"));
        match req.body {
            Some(RequestBody::Json(value)) => {
                assert_eq!(value, json!({ "question": "what is the notice period?" }));
            }
            other => panic!("expected json body, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn bodyless_request_defaults_to_get() {
        let (client, transport, _) = client_with_token(None);
        transport.mock_json(&format!("{}/contracts", BASE), 200, json!([]));

        let contracts = client.list_contracts().await.unwrap();
        assert!(contracts.is_empty());

        let req = transport.last_request().unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert!(req.body.is_none());
    }

    #[tokio::test]
    async fn explicit_method_overrides_default() {
        let (client, transport, _) = client_with_token(None);
        transport.mock_json(&format!("{}/ping", BASE), 200, json!({}));

        client
            .request(
                "/ping",
                RequestOptions {
                    method: Some(HttpMethod::Post),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(transport.last_request().unwrap().method, HttpMethod::Post);
    }

    #[tokio::test]
    async fn multipart_body_sets_no_content_type() {
        let (client, transport, _) = client_with_token(Some("tok"));
        transport.mock_json(
            &format!("{}/upload", BASE),
            200,
            json!({ "filename": "msa.pdf", "doc_id": "d1", "status": "processed" }),
        );

        let receipt = client
            .upload_contract(
                FilePart::from_bytes("msa.pdf", b"%PDF-1.4".to_vec()),
                "Acme Corp, Beta LLC",
                "2026-03-31",
            )
            .await
            .unwrap();
        assert_eq!(receipt.filename, "msa.pdf");

        let req = transport.last_request().unwrap();
        assert_eq!(req.header("content-type"), None);
        match req.body {
            Some(RequestBody::Multipart(form)) => {
                let names: Vec<&str> = form.parts().iter().map(|(n, _)| n.as_str()).collect();
                assert_eq!(names, vec!["file", "parties", "expiry_date"]);
                match &form.parts()[0].1 {
                    PartValue::File(part) => {
                        assert_eq!(part.filename, "msa.pdf");
                        assert!(matches!(part.content, FileContent::Bytes(_)));
                    }
                    other => panic!("expected file part, got {:?}", other),
                }
            }
            other => panic!("expected multipart body, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn bearer_header_follows_stored_token() {
        let (client, transport, _) = client_with_token(Some("tok-42"));
        transport.mock_json(&format!("{}/contracts", BASE), 200, json!([]));
        client.list_contracts().await.unwrap();
        assert_eq!(
            transport.last_request().unwrap().header("authorization"),
            Some("Bearer tok-42")
        );

        let (client, transport, _) = client_with_token(None);
        transport.mock_json(&format!("{}/contracts", BASE), 200, json!([]));
        client.list_contracts().await.unwrap();
        assert_eq!(transport.last_request().unwrap().header("authorization"), None);
    }

    #[tokio::test]
    async fn unauthorized_clears_session_and_short_circuits() {
        let (client, transport, session) = client_with_token(Some("stale"));
        transport.mock_json(
            &format!("{}/contracts", BASE),
            401,
            json!({ "detail": "Could not validate credentials" }),
        );

        let err = client.list_contracts().await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
        assert_eq!(session.token(), None);
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn unauthorized_handling_is_method_independent() {
        let (client, transport, session) = client_with_token(Some("stale"));
        transport.mock_json(&format!("{}/ask", BASE), 401, json!({ "detail": "nope" }));

        let err = client.ask("q").await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn non_2xx_rejects_with_parsed_body() {
        let (client, transport, _) = client_with_token(None);
        let error_body = json!({ "detail": "Username already registered" });
        transport.mock_json(&format!("{}/signup", BASE), 400, error_body.clone());

        let err = client.signup("alice", "pw").await.unwrap_err();
        match err {
            ApiError::Api { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, error_body);
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn unparseable_error_body_degrades_to_status_text() {
        let (client, transport, _) = client_with_token(None);
        transport.mock_raw(
            &format!("{}/contracts", BASE),
            500,
            "Internal Server Error",
            "<html>boom</html>",
        );

        let err = client.list_contracts().await.unwrap_err();
        match err {
            ApiError::Api { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, json!({ "detail": "Internal Server Error" }));
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn transport_failure_is_normalized() {
        let (client, transport, _) = client_with_token(None);
        transport.mock_network_failure(&format!("{}/contracts", BASE));

        let err = client.list_contracts().await.unwrap_err();
        assert!(matches!(err, ApiError::Network));
        assert_eq!(
            err.surface("Failed to load contracts."),
            "Network error or server is down."
        );
    }

    #[tokio::test]
    async fn signup_does_not_establish_session_but_login_does() {
        let (client, transport, session) = client_with_token(None);
        transport.mock_json(
            &format!("{}/signup", BASE),
            200,
            json!({ "id": "u1", "username": "alice" }),
        );
        transport.mock_json(
            &format!("{}/login", BASE),
            200,
            json!({ "access_token": "fresh-token", "token_type": "bearer" }),
        );

        client.signup("alice", "pw").await.unwrap();
        assert!(!session.is_authenticated());

        client.login("alice", "pw").await.unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.token(), Some("fresh-token".to_string()));
    }

    #[tokio::test]
    async fn login_sends_form_encoded_credentials() {
        let (client, transport, _) = client_with_token(None);
        transport.mock_json(
            &format!("{}/login", BASE),
            200,
            json!({ "access_token": "t", "token_type": "bearer" }),
        );

        client.login("alice", "p@ss word").await.unwrap();

        let req = transport.last_request().unwrap();
        assert_eq!(
            req.header("content-type"),
            Some("application/x-www-form-urlencoded")
        );
        match req.body {
            Some(RequestBody::UrlEncoded(encoded)) => {
                assert_eq!(encoded, "username=alice&password=p%40ss+word");
            }
            other => panic!("expected url-encoded body, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn detail_fetch_issues_exactly_one_request_to_the_id_path() {
        let (client, transport, _) = client_with_token(Some("tok"));
        transport.mock_json(
            &format!("{}/contracts/abc123", BASE),
            200,
            json!({
                "id": "abc123",
                "filename": "msa.pdf",
                "parties": "Acme, Beta",
                "expiry_date": "2026-03-31",
                "uploaded_on": "2025-08-01",
                "status": "Active",
                "risk_score": "High",
                "clauses": [],
                "insights": []
            }),
        );

        let detail = client.contract_detail("abc123").await.unwrap();
        assert_eq!(detail.id, "abc123");
        assert_eq!(transport.request_count(), 1);

        let req = transport.last_request().unwrap();
        assert_eq!(req.url, format!("{}/contracts/abc123", BASE));
        assert_eq!(req.method, HttpMethod::Get);
    }

    #[tokio::test]
    async fn mismatched_response_shape_is_a_decode_error() {
        let (client, transport, _) = client_with_token(None);
        transport.mock_json(&format!("{}/contracts", BASE), 200, json!({ "not": "a list" }));

        let err = client.list_contracts().await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn validation_errors_surface_flattened() {
        let (client, transport, _) = client_with_token(None);
        transport.mock_json(
            &format!("{}/signup", BASE),
            422,
            json!({ "detail": [{ "loc": ["body", "password"], "msg": "field required" }] }),
        );

        let err = client.signup("alice", "").await.unwrap_err();
        assert_eq!(err.surface("Signup failed."), "password: field required");
    }

    #[test]
    fn client_and_session_are_context_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ApiClient>();
        assert_send_sync::<Session>();
    }

    #[test]
    fn form_encoding_matrix() {
        assert_eq!(form_encode("alice"), "alice");
        assert_eq!(form_encode("p@ss word"), "p%40ss+word");
        assert_eq!(form_encode("a&b=c"), "a%26b%3Dc");
        assert_eq!(form_encode("~-._"), "~-._");
    }
}
