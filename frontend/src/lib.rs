//! ClauseLens 前端应用
//!
//! 合同管理产品的单页客户端：登录、合同列表、条款与 AI 洞察、
//! 上传、自由问答。所有数据行为都在后端，这里只渲染状态、发请求。
//!
//! 采用 Context-Driven 的高内聚低耦合架构：
//! - `web::route`: 路由定义（领域模型）
//! - `web::router`: 路由服务（核心引擎，含认证守卫）
//! - `session`: 会话（Bearer Token）状态管理
//! - `api`: 统一请求客户端
//! - `components`: UI 组件层

pub mod api;
pub mod session;

mod components {
    pub mod contract_detail;
    pub mod dashboard;
    mod icons;
    pub mod login;
    pub mod query;
    pub mod upload;
}

// 原生 Web API 封装模块
pub mod web;

use crate::api::{api_base_url, ApiClient};
use crate::components::contract_detail::ContractDetailPage;
use crate::components::dashboard::DashboardPage;
use crate::components::login::LoginPage;
use crate::components::query::QueryPage;
use crate::components::upload::UploadPage;
use crate::session::Session;
use crate::web::route::AppRoute;
use crate::web::router::{Router, RouterOutlet};
use crate::web::FetchTransport;

use leptos::prelude::*;
use std::sync::Arc;

/// 占位页面（Insights / Settings 尚未实现）
#[component]
fn PlaceholderPage(title: &'static str, blurb: &'static str) -> impl IntoView {
    let router = crate::web::router::use_router();
    view! {
        <div class="min-h-screen bg-base-200 flex items-center justify-center">
            <div class="text-center space-y-4">
                <h1 class="text-3xl font-bold">{title}</h1>
                <p class="text-base-content/60">{blurb}</p>
                <button
                    on:click=move |_| router.navigate(AppRoute::Dashboard)
                    class="btn btn-ghost"
                >
                    "Back to contracts"
                </button>
            </div>
        </div>
    }
}

/// 路由匹配函数
///
/// 根据 AppRoute 枚举返回对应的视图组件。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::Dashboard => view! { <DashboardPage /> }.into_any(),
        AppRoute::ContractDetail(id) => {
            view! { <ContractDetailPage contract_id=id /> }.into_any()
        }
        AppRoute::Upload => view! { <UploadPage /> }.into_any(),
        AppRoute::Query => view! { <QueryPage /> }.into_any(),
        AppRoute::Insights => view! {
            <PlaceholderPage
                title="Insights"
                blurb="A cross-contract insight overview is coming soon."
            />
        }
        .into_any(),
        AppRoute::Settings => view! {
            <PlaceholderPage title="Settings" blurb="Workspace settings are coming soon." />
        }
        .into_any(),
        AppRoute::NotFound => view! {
            <div class="flex items-center justify-center min-h-screen bg-base-200">
                <div class="text-center">
                    <h1 class="text-6xl font-bold text-error">"404"</h1>
                    <p class="text-xl mt-4">"Page not found"</p>
                </div>
            </div>
        }
        .into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 进程启动时显式构造会话（从 LocalStorage 恢复上次的 Token）
    let session = Session::browser();

    // 2. 请求客户端持有会话句柄：带 Token、401 时清会话
    let client = ApiClient::new(api_base_url(), session.clone(), Arc::new(FetchTransport));

    provide_context(session.clone());
    provide_context(client);

    // 3. 认证信号注入路由服务实现守卫（解耦）
    let is_authenticated = session.authenticated_signal();

    view! {
        <Router is_authenticated=is_authenticated>
            <RouterOutlet matcher=route_matcher />
        </Router>
    }
}
