//! LocalStorage 封装模块
//!
//! 直接封装 `web_sys::Storage`，不引入 gloo-storage，保持 WASM 体积可控。
//! Token 的持久化通过 [`TokenStore`] 特性抽象，生产环境落在 LocalStorage，
//! 测试环境使用内存实现。

use clauselens_shared::STORAGE_TOKEN_KEY;

/// 本地存储操作封装
///
/// 提供静态方法访问浏览器 LocalStorage API。
pub struct LocalStorage;

impl LocalStorage {
    /// 获取 LocalStorage 实例
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }

    /// 获取存储的字符串值
    pub fn get(key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok()?
    }

    /// 设置存储值，返回操作是否成功
    pub fn set(key: &str, value: &str) -> bool {
        Self::storage()
            .and_then(|s| s.set_item(key, value).ok())
            .is_some()
    }

    /// 删除存储的键值对，返回操作是否成功
    pub fn delete(key: &str) -> bool {
        Self::storage()
            .and_then(|s| s.remove_item(key).ok())
            .is_some()
    }
}

// =========================================================
// Token 持久化抽象 (Token Store)
// =========================================================

/// Token 持久化特性
///
/// 会话存储只关心三个同步操作：读取、写入、清除。
/// 要求 Send + Sync，会话句柄才能放进 Context 共享。
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Option<String>;
    fn save(&self, token: &str);
    fn clear(&self);
}

/// 生产实现：Token 保存在 LocalStorage 的固定键名下
pub struct LocalStorageTokenStore;

impl TokenStore for LocalStorageTokenStore {
    fn load(&self) -> Option<String> {
        LocalStorage::get(STORAGE_TOKEN_KEY)
    }

    fn save(&self, token: &str) {
        LocalStorage::set(STORAGE_TOKEN_KEY, token);
    }

    fn clear(&self) {
        LocalStorage::delete(STORAGE_TOKEN_KEY);
    }
}

/// 测试实现：Token 保存在内存
#[cfg(test)]
pub struct MemoryTokenStore {
    token: std::sync::Mutex<Option<String>>,
}

#[cfg(test)]
impl MemoryTokenStore {
    pub fn new() -> Self {
        Self {
            token: std::sync::Mutex::new(None),
        }
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: std::sync::Mutex::new(Some(token.to_string())),
        }
    }
}

#[cfg(test)]
impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }

    fn save(&self, token: &str) {
        *self.token.lock().unwrap() = Some(token.to_string());
    }

    fn clear(&self) {
        *self.token.lock().unwrap() = None;
    }
}
