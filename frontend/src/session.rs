//! 会话模块
//!
//! 管理 Bearer Token 的生命周期，与路由系统解耦。
//! `Session` 是进程启动时显式构造的对象（不是隐式全局），
//! 内存状态走信号供界面订阅，持久化走注入的 [`TokenStore`]。
//! 不变式：Token 存在 <=> 视为已认证。

use crate::web::{LocalStorageTokenStore, TokenStore};
use leptos::prelude::*;
use std::sync::Arc;

/// 会话状态
#[derive(Clone, Default, PartialEq)]
pub struct SessionState {
    /// 当前 Bearer Token（仅登录后存在）
    pub token: Option<String>,
}

/// 会话存储
///
/// 登录/注销同时更新持久化存储与内存信号；
/// 刷新页面后由 [`Session::new`] 从持久化存储恢复。
#[derive(Clone)]
pub struct Session {
    state: ArcRwSignal<SessionState>,
    store: Arc<dyn TokenStore>,
}

impl Session {
    /// 创建会话并从持久化存储恢复上次的 Token
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        let state = ArcRwSignal::new(SessionState {
            token: store.load(),
        });
        Self { state, store }
    }

    /// 浏览器环境的默认会话（LocalStorage 持久化）
    pub fn browser() -> Self {
        Self::new(Arc::new(LocalStorageTokenStore))
    }

    /// 读取持久化存储中的 Token
    ///
    /// 请求客户端每次发请求都从这里取，而不是从内存快照。
    pub fn token(&self) -> Option<String> {
        self.store.load()
    }

    /// 当前是否已认证（非响应式读取）
    pub fn is_authenticated(&self) -> bool {
        self.state.get_untracked().token.is_some()
    }

    /// 认证状态信号（用于路由守卫注入）
    pub fn authenticated_signal(&self) -> Signal<bool> {
        let state = self.state.clone();
        Signal::derive(move || state.get().token.is_some())
    }

    /// 登录：写入持久化存储与内存状态
    pub fn establish(&self, token: &str) {
        self.store.save(token);
        self.state.set(SessionState {
            token: Some(token.to_string()),
        });
        // 导航由路由服务监听认证信号自动处理
    }

    /// 注销：清除持久化存储与内存状态
    ///
    /// 请求层收到 401 时也走这里，路由守卫随后会把用户送回登录页。
    pub fn clear(&self) {
        self.store.clear();
        self.state.set(SessionState::default());
    }
}

/// 从 Context 获取会话
pub fn use_session() -> Session {
    use_context::<Session>().expect("Session should be provided")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::MemoryTokenStore;

    #[test]
    fn starts_unauthenticated_with_empty_store() {
        let session = Session::new(Arc::new(MemoryTokenStore::new()));
        assert!(!session.is_authenticated());
        assert_eq!(session.token(), None);
    }

    #[test]
    fn restores_token_from_durable_storage() {
        let session = Session::new(Arc::new(MemoryTokenStore::with_token("tok-1")));
        assert!(session.is_authenticated());
        assert_eq!(session.token(), Some("tok-1".to_string()));
    }

    #[test]
    fn establish_writes_both_store_and_memory() {
        let session = Session::new(Arc::new(MemoryTokenStore::new()));
        session.establish("tok-2");
        assert!(session.is_authenticated());
        assert_eq!(session.token(), Some("tok-2".to_string()));
    }

    #[test]
    fn session_handle_is_context_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Session>();
    }

    #[test]
    fn clear_wipes_both_store_and_memory() {
        let session = Session::new(Arc::new(MemoryTokenStore::with_token("tok-3")));
        session.clear();
        assert!(!session.is_authenticated());
        assert_eq!(session.token(), None);
    }
}
