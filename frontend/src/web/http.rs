//! HTTP 传输层模块
//!
//! 直接封装 `web_sys::fetch`，不引入 gloo-net。
//! 传输通过 [`HttpTransport`] 特性抽象：生产环境走浏览器 fetch，
//! 测试环境注入 [`MockTransport`]，请求客户端的全部策略都能在原生目标上验证。

use async_trait::async_trait;

/// HTTP 请求方法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// HTTP 错误类型
#[derive(Debug)]
pub enum HttpError {
    /// 请求构建失败
    RequestBuildFailed(String),
    /// 网络请求失败
    NetworkError(String),
    /// 响应解析失败
    ResponseParseFailed(String),
}

impl core::fmt::Display for HttpError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            HttpError::RequestBuildFailed(msg) => write!(f, "request build failed: {}", msg),
            HttpError::NetworkError(msg) => write!(f, "network error: {}", msg),
            HttpError::ResponseParseFailed(msg) => write!(f, "response parse failed: {}", msg),
        }
    }
}

// =========================================================
// 请求体 (Request Body)
// =========================================================

/// 上传文件的内容来源
///
/// 浏览器路径直接持有 `web_sys::File`；字节路径供原生测试使用，
/// 在 WASM 侧会被包成 Blob。
#[derive(Debug, Clone)]
pub enum FileContent {
    Browser(web_sys::File),
    Bytes(Vec<u8>),
}

/// multipart 表单中的文件部分
#[derive(Debug, Clone)]
pub struct FilePart {
    pub filename: String,
    pub content: FileContent,
}

impl FilePart {
    /// 从浏览器 File 对象构建，文件名取自对象本身
    pub fn from_browser(file: web_sys::File) -> Self {
        Self {
            filename: file.name(),
            content: FileContent::Browser(file),
        }
    }

    pub fn from_bytes(filename: &str, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.to_string(),
            content: FileContent::Bytes(bytes),
        }
    }
}

/// multipart 表单中的单个部分
#[derive(Debug, Clone)]
pub enum PartValue {
    Text(String),
    File(FilePart),
}

/// multipart 表单，保持插入顺序
#[derive(Debug, Clone, Default)]
pub struct MultipartForm {
    parts: Vec<(String, PartValue)>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.parts
            .push((name.to_string(), PartValue::Text(value.to_string())));
        self
    }

    pub fn file(mut self, name: &str, file: FilePart) -> Self {
        self.parts.push((name.to_string(), PartValue::File(file)));
        self
    }

    pub fn parts(&self) -> &[(String, PartValue)] {
        &self.parts
    }
}

/// 请求体的三种形态
///
/// Json 序列化为文本发送；UrlEncoded 原样透传；
/// Multipart 交给传输层组装 FormData，边界串由浏览器生成。
#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(serde_json::Value),
    UrlEncoded(String),
    Multipart(MultipartForm),
}

impl RequestBody {
    pub fn is_multipart(&self) -> bool {
        matches!(self, RequestBody::Multipart(_))
    }
}

// =========================================================
// 请求 / 响应结构
// =========================================================

/// 通用 HTTP 请求结构
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl HttpRequest {
    /// 按名字查请求头（大小写不敏感）
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// 通用 HTTP 响应结构
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl HttpResponse {
    /// 检查响应是否成功 (2xx)
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP 传输特性
///
/// (?Send) 是因为 WASM 环境下 `web_sys` 的 Future 不是 Send 的；
/// 特性对象本身要求 Send + Sync，请求客户端才能放进 Context 共享。
#[async_trait(?Send)]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, HttpError>;
}

// =========================================================
// 实现层: 浏览器 fetch (Production)
// =========================================================

pub struct FetchTransport;

#[async_trait(?Send)]
impl HttpTransport for FetchTransport {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        #[cfg(target_arch = "wasm32")]
        {
            fetch::send(req).await
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = req;
            Err(HttpError::NetworkError(
                "fetch transport only runs in the browser".to_string(),
            ))
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod fetch {
    use super::*;
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{Blob, FormData, Headers, Request, RequestInit, Response};

    fn build_form_data(form: &MultipartForm) -> Result<FormData, HttpError> {
        let fd = FormData::new()
            .map_err(|e| HttpError::RequestBuildFailed(format!("FormData: {:?}", e)))?;
        for (name, value) in form.parts() {
            match value {
                PartValue::Text(text) => fd
                    .append_with_str(name, text)
                    .map_err(|e| HttpError::RequestBuildFailed(format!("{:?}", e)))?,
                PartValue::File(part) => match &part.content {
                    FileContent::Browser(file) => fd
                        .append_with_blob_and_filename(name, file, &part.filename)
                        .map_err(|e| HttpError::RequestBuildFailed(format!("{:?}", e)))?,
                    FileContent::Bytes(bytes) => {
                        let array = js_sys::Uint8Array::from(bytes.as_slice());
                        let seq = js_sys::Array::of1(&array);
                        let blob = Blob::new_with_u8_array_sequence(&seq)
                            .map_err(|e| HttpError::RequestBuildFailed(format!("{:?}", e)))?;
                        fd.append_with_blob_and_filename(name, &blob, &part.filename)
                            .map_err(|e| HttpError::RequestBuildFailed(format!("{:?}", e)))?;
                    }
                },
            }
        }
        Ok(fd)
    }

    pub(super) async fn send(req: HttpRequest) -> Result<HttpResponse, HttpError> {
        let headers = Headers::new()
            .map_err(|e| HttpError::RequestBuildFailed(format!("Headers: {:?}", e)))?;
        for (key, value) in &req.headers {
            headers
                .set(key, value)
                .map_err(|e| HttpError::RequestBuildFailed(format!("{:?}", e)))?;
        }

        let opts = RequestInit::new();
        opts.set_method(req.method.as_str());
        opts.set_headers(&headers.into());

        if let Some(body) = &req.body {
            match body {
                RequestBody::Json(value) => opts.set_body(&JsValue::from_str(&value.to_string())),
                RequestBody::UrlEncoded(encoded) => opts.set_body(&JsValue::from_str(encoded)),
                RequestBody::Multipart(form) => {
                    let fd: JsValue = build_form_data(form)?.into();
                    opts.set_body(&fd);
                }
            }
        }

        let request = Request::new_with_str_and_init(&req.url, &opts)
            .map_err(|e| HttpError::RequestBuildFailed(format!("{:?}", e)))?;

        let window = web_sys::window()
            .ok_or_else(|| HttpError::NetworkError("no window object".to_string()))?;

        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| HttpError::NetworkError(format!("{:?}", e)))?;

        let response: Response = resp_value
            .dyn_into()
            .map_err(|e| HttpError::ResponseParseFailed(format!("{:?}", e)))?;

        let status = response.status();
        let status_text = response.status_text();

        let promise = response
            .text()
            .map_err(|e| HttpError::ResponseParseFailed(format!("{:?}", e)))?;
        let text = JsFuture::from(promise)
            .await
            .map_err(|e| HttpError::ResponseParseFailed(format!("{:?}", e)))?;

        Ok(HttpResponse {
            status,
            status_text,
            body: text.as_string().unwrap_or_default(),
        })
    }
}

// =========================================================
// 实现层: Mock 客户端 (Tests)
// =========================================================

#[cfg(test)]
enum MockReply {
    Response(HttpResponse),
    NetworkDown,
}

/// 测试用传输：记录每个发出的请求，按 URL 返回预置响应。
#[cfg(test)]
pub struct MockTransport {
    requests: std::sync::Mutex<Vec<HttpRequest>>,
    replies: std::sync::Mutex<std::collections::HashMap<String, MockReply>>,
}

#[cfg(test)]
impl MockTransport {
    pub fn new() -> Self {
        Self {
            requests: std::sync::Mutex::new(Vec::new()),
            replies: std::sync::Mutex::new(std::collections::HashMap::new()),
        }
    }

    pub fn mock_json(&self, url: &str, status: u16, body: serde_json::Value) {
        self.replies.lock().unwrap().insert(
            url.to_string(),
            MockReply::Response(HttpResponse {
                status,
                status_text: String::new(),
                body: body.to_string(),
            }),
        );
    }

    pub fn mock_raw(&self, url: &str, status: u16, status_text: &str, body: &str) {
        self.replies.lock().unwrap().insert(
            url.to_string(),
            MockReply::Response(HttpResponse {
                status,
                status_text: status_text.to_string(),
                body: body.to_string(),
            }),
        );
    }

    pub fn mock_network_failure(&self, url: &str) {
        self.replies
            .lock()
            .unwrap()
            .insert(url.to_string(), MockReply::NetworkDown);
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[cfg(test)]
#[async_trait(?Send)]
impl HttpTransport for MockTransport {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        let url = req.url.clone();
        self.requests.lock().unwrap().push(req);
        match self.replies.lock().unwrap().get(&url) {
            Some(MockReply::Response(resp)) => Ok(resp.clone()),
            Some(MockReply::NetworkDown) => {
                Err(HttpError::NetworkError("connection refused".to_string()))
            }
            None => panic!("no mock reply registered for {}", url),
        }
    }
}
