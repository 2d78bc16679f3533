use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub mod error;

// =========================================================
// 常量定义 (Constants)
// =========================================================

/// 承载 Bearer Token 的请求头
pub const HEADER_AUTHORIZATION: &str = "Authorization";
/// LocalStorage 中保存 Token 的唯一键名
pub const STORAGE_TOKEN_KEY: &str = "clauselens_token";

// =========================================================
// 领域模型 (Domain Models)
// =========================================================

/// 合同状态
///
/// 后端目前只写入 `Active`，但字段是自由字符串，
/// 未知取值统一落入 `Other`，解码不因此失败。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractStatus {
    Active,
    #[serde(other)]
    Other,
}

/// 风险评分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskScore {
    Low,
    Medium,
    High,
}

impl RiskScore {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskScore::Low => "Low",
            RiskScore::Medium => "Medium",
            RiskScore::High => "High",
        }
    }
}

/// 合同列表项，对应 `GET /contracts` 的数组元素
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractSummary {
    pub id: String,
    pub filename: String,
    pub parties: String,
    pub expiry_date: NaiveDate,
    pub uploaded_on: NaiveDate,
    pub status: ContractStatus,
    pub risk_score: RiskScore,
}

/// 条款片段的定位元数据
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    #[serde(default)]
    pub clause_title: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub contract_name: Option<String>,
}

/// 后端抽取出的合同条款片段
///
/// `/ask` 返回的检索块是同一数据库行的原始序列化，
/// 会多出 embedding 等字段，反序列化时直接忽略。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clause {
    pub id: String,
    #[serde(default)]
    pub doc_id: Option<String>,
    pub text_chunk: String,
    #[serde(default)]
    pub chunk_metadata: Option<ChunkMetadata>,
}

/// 洞察类型：风险 / 建议
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Risk,
    Recommendation,
}

/// AI 生成的合同洞察
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub text: String,
}

/// 合同详情，对应 `GET /contracts/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractDetail {
    pub id: String,
    pub filename: String,
    pub parties: String,
    pub expiry_date: NaiveDate,
    pub uploaded_on: NaiveDate,
    pub status: ContractStatus,
    pub risk_score: RiskScore,
    #[serde(default)]
    pub clauses: Vec<Clause>,
    #[serde(default)]
    pub insights: Vec<Insight>,
}

// =========================================================
// 请求 / 响应载荷 (API Payloads)
// =========================================================

/// `POST /signup` 请求体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
}

/// `POST /signup` 确认响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: String,
    pub username: String,
}

/// `POST /login` 响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// `POST /upload` 确认响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub filename: String,
    pub doc_id: String,
    pub status: String,
}

/// `POST /ask` 请求体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

/// `POST /ask` 响应：答案 + 有序的支撑片段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryAnswer {
    pub answer: String,
    #[serde(default)]
    pub retrieved_chunks: Vec<Clause>,
}
