//! 路由定义模块 - 领域模型
//!
//! 这是纯粹的业务逻辑层，不依赖于 DOM 或 web_sys。
//! 页面与当前选中的合同 id 在同一个枚举值里，切换路由时两者原子更新。

use std::fmt::Display;

/// 应用路由枚举
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// 登录 / 注册页面
    Login,
    /// 合同列表 (默认路由，需要认证)
    #[default]
    Dashboard,
    /// 合同详情，携带选中的合同 id
    ContractDetail(String),
    /// 上传页面
    Upload,
    /// 自由提问页面
    Query,
    /// 洞察总览 (占位)
    Insights,
    /// 设置 (占位)
    Settings,
    /// 页面未找到
    NotFound,
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举
    pub fn from_path(path: &str) -> Self {
        if let Some(id) = path.strip_prefix("/contracts/") {
            if !id.is_empty() && !id.contains('/') {
                return Self::ContractDetail(id.to_string());
            }
            return Self::NotFound;
        }
        match path {
            "/" | "/dashboard" => Self::Dashboard,
            "/login" => Self::Login,
            "/upload" => Self::Upload,
            "/query" => Self::Query,
            "/insights" => Self::Insights,
            "/settings" => Self::Settings,
            _ => Self::NotFound,
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> String {
        match self {
            Self::Login => "/login".to_string(),
            Self::Dashboard => "/".to_string(),
            Self::ContractDetail(id) => format!("/contracts/{}", id),
            Self::Upload => "/upload".to_string(),
            Self::Query => "/query".to_string(),
            Self::Insights => "/insights".to_string(),
            Self::Settings => "/settings".to_string(),
            Self::NotFound => "/404".to_string(),
        }
    }

    /// **核心守卫逻辑：定义该路由是否需要认证**
    ///
    /// 未认证时除登录页外不可达。
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Self::Login | Self::NotFound)
    }

    /// 定义已认证用户是否应该离开此路由（如登录页）
    pub fn should_redirect_when_authenticated(&self) -> bool {
        matches!(self, Self::Login)
    }

    /// 当前路由选中的合同 id（仅详情页有）
    pub fn selected_contract(&self) -> Option<&str> {
        match self {
            Self::ContractDetail(id) => Some(id.as_str()),
            _ => None,
        }
    }

    /// 获取认证失败时的重定向目标
    pub fn auth_failure_redirect() -> Self {
        Self::Login
    }

    /// 获取认证成功时的重定向目标（从登录页）
    pub fn auth_success_redirect() -> Self {
        Self::Dashboard
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_paths() {
        assert_eq!(AppRoute::from_path("/"), AppRoute::Dashboard);
        assert_eq!(AppRoute::from_path("/dashboard"), AppRoute::Dashboard);
        assert_eq!(AppRoute::from_path("/login"), AppRoute::Login);
        assert_eq!(AppRoute::from_path("/upload"), AppRoute::Upload);
        assert_eq!(AppRoute::from_path("/query"), AppRoute::Query);
        assert_eq!(AppRoute::from_path("/insights"), AppRoute::Insights);
        assert_eq!(AppRoute::from_path("/settings"), AppRoute::Settings);
        assert_eq!(AppRoute::from_path("/nope"), AppRoute::NotFound);
    }

    #[test]
    fn parses_contract_detail_with_id() {
        assert_eq!(
            AppRoute::from_path("/contracts/abc123"),
            AppRoute::ContractDetail("abc123".to_string())
        );
        assert_eq!(AppRoute::from_path("/contracts/"), AppRoute::NotFound);
        assert_eq!(AppRoute::from_path("/contracts/a/b"), AppRoute::NotFound);
    }

    #[test]
    fn path_round_trips() {
        for route in [
            AppRoute::Login,
            AppRoute::Dashboard,
            AppRoute::ContractDetail("abc123".to_string()),
            AppRoute::Upload,
            AppRoute::Query,
            AppRoute::Insights,
            AppRoute::Settings,
        ] {
            assert_eq!(AppRoute::from_path(&route.to_path()), route);
        }
    }

    #[test]
    fn everything_but_login_requires_auth() {
        assert!(!AppRoute::Login.requires_auth());
        assert!(AppRoute::Dashboard.requires_auth());
        assert!(AppRoute::ContractDetail("x".into()).requires_auth());
        assert!(AppRoute::Upload.requires_auth());
        assert!(AppRoute::Query.requires_auth());
        assert!(AppRoute::Insights.requires_auth());
        assert!(AppRoute::Settings.requires_auth());
    }

    #[test]
    fn selection_travels_with_the_route() {
        let route = AppRoute::ContractDetail("abc123".to_string());
        assert_eq!(route.selected_contract(), Some("abc123"));
        assert_eq!(AppRoute::Dashboard.selected_contract(), None);
    }
}
