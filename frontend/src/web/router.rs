//! 路由服务模块 - 核心引擎
//!
//! 封装了 web_sys 的 History API，实现高内聚：
//! 所有对 window.history 的操作都集中在此模块。
//! 实现了"监听 -> 验证 -> 处理 -> 加载"的导航流程。
//! 守卫判定抽成纯函数 [`resolve_navigation`]，转移矩阵可独立测试。

use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use super::route::AppRoute;

/// 获取当前浏览器路径
fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

/// 推送 History 状态（内部工具函数）
fn push_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.push_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// 替换 History 状态（内部工具函数，用于重定向）
fn replace_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// **纯守卫判定**
///
/// 给定目标路由与认证状态，返回实际应落到的路由：
/// - 需要认证但未认证 -> 登录页
/// - 已认证却访问登录页 -> 面板
/// - 其余原样放行
pub fn resolve_navigation(target: AppRoute, is_authenticated: bool) -> AppRoute {
    if target.requires_auth() && !is_authenticated {
        return AppRoute::auth_failure_redirect();
    }
    if target.should_redirect_when_authenticated() && is_authenticated {
        return AppRoute::auth_success_redirect();
    }
    target
}

/// 路由器服务
///
/// 封装所有路由操作，通过 Signal 驱动界面更新。
/// 通过注入认证检查信号实现与会话系统的解耦。
#[derive(Clone, Copy)]
pub struct RouterService {
    /// 当前路由（只读信号）
    current_route: ReadSignal<AppRoute>,
    /// 设置当前路由（写入信号）
    set_route: WriteSignal<AppRoute>,
    /// 认证状态检查（注入的信号，实现解耦）
    is_authenticated: Signal<bool>,
}

impl RouterService {
    fn new(is_authenticated: Signal<bool>) -> Self {
        // 初始路由从 URL 解析
        let path = current_path();
        let initial_route = AppRoute::from_path(&path);
        let (current_route, set_route) = signal(initial_route);

        Self {
            current_route,
            set_route,
            is_authenticated,
        }
    }

    /// 获取当前路由信号
    pub fn current_route(&self) -> ReadSignal<AppRoute> {
        self.current_route
    }

    /// **核心方法：导航与守卫**
    ///
    /// 流程：请求 -> 验证(Guard) -> 处理 -> 加载
    pub fn navigate(&self, target: AppRoute) {
        self.apply(target, true);
    }

    /// 从 URL path 发起导航（popstate / 外部链接）
    pub fn navigate_path(&self, path: &str) {
        self.apply(AppRoute::from_path(path), true);
    }

    fn apply(&self, target: AppRoute, use_push: bool) {
        let is_auth = self.is_authenticated.get_untracked();
        let resolved = resolve_navigation(target.clone(), is_auth);
        if resolved != target {
            web_sys::console::log_1(
                &format!("[Router] Guard redirect: {} -> {}", target, resolved).into(),
            );
        }
        if use_push {
            push_history_state(&resolved.to_path());
        } else {
            replace_history_state(&resolved.to_path());
        }
        self.set_route.set(resolved);
    }

    /// 初始化浏览器后退/前进按钮监听
    fn init_popstate_listener(&self) {
        let set_route = self.set_route;
        let is_authenticated = self.is_authenticated;

        let closure = Closure::<dyn Fn()>::new(move || {
            let target = AppRoute::from_path(&current_path());
            let resolved = resolve_navigation(target.clone(), is_authenticated.get_untracked());
            if resolved != target {
                // popstate 时也执行守卫，重定向用 replace 以免污染历史栈
                replace_history_state(&resolved.to_path());
            }
            set_route.set(resolved);
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 泄漏闭包以保持监听器存活
        closure.forget();
    }

    /// 设置认证状态变化时的自动重定向
    ///
    /// 登录成功离开登录页；登出（含请求层收到 401 清会话）回到登录页。
    fn setup_auth_redirect(&self) {
        let current_route = self.current_route;
        let set_route = self.set_route;
        let is_authenticated = self.is_authenticated;

        Effect::new(move |_| {
            let is_auth = is_authenticated.get();
            let route = current_route.get_untracked();

            if is_auth {
                if route.should_redirect_when_authenticated() {
                    let redirect = AppRoute::auth_success_redirect();
                    push_history_state(&redirect.to_path());
                    set_route.set(redirect);
                    web_sys::console::log_1(
                        &"[Router] Auth state changed: logged in, redirecting to dashboard.".into(),
                    );
                }
            } else if route.requires_auth() {
                let redirect = AppRoute::auth_failure_redirect();
                push_history_state(&redirect.to_path());
                set_route.set(redirect);
                web_sys::console::log_1(
                    &"[Router] Auth state changed: logged out, redirecting to login.".into(),
                );
            }
        });
    }
}

/// 提供路由服务到 Context 并初始化
fn provide_router(is_authenticated: Signal<bool>) -> RouterService {
    let router = RouterService::new(is_authenticated);

    router.init_popstate_listener();
    router.setup_auth_redirect();

    provide_context(router);
    router
}

/// 从 Context 获取路由服务
pub fn use_router() -> RouterService {
    use_context::<RouterService>()
        .expect("RouterService not found in context. Ensure Router is provided.")
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由器根组件
///
/// 提供路由上下文，应在 App 根部使用。
#[component]
pub fn Router(
    /// 认证状态信号
    is_authenticated: Signal<bool>,
    /// 子组件
    children: Children,
) -> impl IntoView {
    provide_router(is_authenticated);

    children()
}

/// 路由出口组件
///
/// 根据当前路由状态渲染对应的组件。
#[component]
pub fn RouterOutlet(
    /// 路由匹配函数：接收当前路由，返回对应视图
    matcher: fn(AppRoute) -> AnyView,
) -> impl IntoView {
    let router = use_router();

    move || {
        let current = router.current_route().get();
        matcher(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthenticated_targets_redirect_to_login() {
        for target in [
            AppRoute::Dashboard,
            AppRoute::ContractDetail("abc123".into()),
            AppRoute::Upload,
            AppRoute::Query,
            AppRoute::Insights,
            AppRoute::Settings,
        ] {
            assert_eq!(resolve_navigation(target, false), AppRoute::Login);
        }
    }

    #[test]
    fn unauthenticated_login_is_reachable() {
        assert_eq!(resolve_navigation(AppRoute::Login, false), AppRoute::Login);
    }

    #[test]
    fn authenticated_navigation_proceeds() {
        let detail = AppRoute::ContractDetail("abc123".into());
        assert_eq!(resolve_navigation(detail.clone(), true), detail);
        assert_eq!(
            resolve_navigation(AppRoute::Upload, true),
            AppRoute::Upload
        );
    }

    #[test]
    fn authenticated_login_redirects_to_dashboard() {
        assert_eq!(
            resolve_navigation(AppRoute::Login, true),
            AppRoute::Dashboard
        );
    }

    #[test]
    fn detail_transition_updates_page_and_selection_atomically() {
        let resolved = resolve_navigation(AppRoute::ContractDetail("abc123".into()), true);
        assert_eq!(resolved.selected_contract(), Some("abc123"));
    }
}
