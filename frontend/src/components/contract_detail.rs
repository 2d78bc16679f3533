use crate::api::use_api;
use crate::components::dashboard::risk_badge_class;
use crate::components::icons::*;
use crate::web::route::AppRoute;
use crate::web::router::use_router;
use clauselens_shared::{Clause, ContractDetail, InsightKind};
use leptos::prelude::*;
use leptos::task::spawn_local;

/// 合同详情页面
///
/// 按路由携带的 id 拉取详情；条款点击打开"证据抽屉"（纯本地状态，
/// 不发请求）。响应落地前会核对路由是否仍选中发起请求时的 id，
/// 导航走了就直接丢弃，避免把过期数据渲染到新选中的合同名下。
#[component]
pub fn ContractDetailPage(contract_id: String) -> impl IntoView {
    let client = use_api();
    let router = use_router();

    let contract_id = StoredValue::new(contract_id);

    let (detail, set_detail) = signal(Option::<ContractDetail>::None);
    let (loading, set_loading) = signal(true);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);
    // 证据抽屉：当前展开的条款
    let (drawer, set_drawer) = signal(Option::<Clause>::None);

    Effect::new({
        let client = client.clone();
        move |_| {
            let client = client.clone();
            let id = contract_id.get_value();
            set_loading.set(true);
            set_error_msg.set(None);
            spawn_local(async move {
                let result = client.contract_detail(&id).await;
                // 过期响应防护：用户可能已经导航去了别的合同
                if router.current_route().get_untracked().selected_contract() != Some(id.as_str()) {
                    return;
                }
                match result {
                    Ok(data) => set_detail.set(Some(data)),
                    Err(e) => set_error_msg.set(Some(e.surface("Failed to load contract details."))),
                }
                set_loading.set(false);
            });
        }
    });

    view! {
        <div class="min-h-screen bg-base-200 p-4 md:p-8 font-sans">
            <div class="max-w-5xl mx-auto space-y-6">
                <button
                    on:click=move |_| router.navigate(AppRoute::Dashboard)
                    class="btn btn-ghost gap-2"
                >
                    <ArrowLeft attr:class="h-4 w-4" /> "Back to contracts"
                </button>

                <Show when=move || error_msg.get().is_some()>
                    <div role="alert" class="alert alert-error">
                        <AlertTriangle attr:class="h-5 w-5" />
                        <span>{move || error_msg.get().unwrap_or_default()}</span>
                    </div>
                </Show>

                <Show when=move || loading.get()>
                    <div class="text-center py-12">
                        <span class="loading loading-spinner loading-lg text-primary"></span>
                    </div>
                </Show>

                {move || detail.get().map(|contract| {
                    let clauses = contract.clauses.clone();
                    let insights = contract.insights.clone();
                    view! {
                        <div class="card bg-base-100 shadow-xl">
                            <div class="card-body">
                                <div class="flex items-center justify-between flex-wrap gap-2">
                                    <div>
                                        <h2 class="card-title font-mono">{contract.filename.clone()}</h2>
                                        <p class="text-base-content/70 text-sm">{contract.parties.clone()}</p>
                                    </div>
                                    <div class="flex gap-2 items-center">
                                        <div class="badge badge-ghost">
                                            "Uploaded " {contract.uploaded_on.to_string()}
                                        </div>
                                        <div class="badge badge-neutral">
                                            "Expires " {contract.expiry_date.to_string()}
                                        </div>
                                        <div class=risk_badge_class(contract.risk_score)>
                                            {contract.risk_score.as_str()} " risk"
                                        </div>
                                    </div>
                                </div>
                            </div>
                        </div>

                        <div class="grid md:grid-cols-2 gap-6 mt-6">
                            <div class="card bg-base-100 shadow-xl">
                                <div class="card-body">
                                    <h3 class="card-title text-base">
                                        <FileText attr:class="h-5 w-5" /> "Extracted Clauses"
                                    </h3>
                                    <Show when={
                                        let empty = clauses.is_empty();
                                        move || empty
                                    }>
                                        <p class="text-base-content/50 text-sm py-4">
                                            "No clauses were extracted from this contract."
                                        </p>
                                    </Show>
                                    <ul class="space-y-2">
                                        <For
                                            each={
                                                let clauses = clauses.clone();
                                                move || clauses.clone()
                                            }
                                            key=|clause| clause.id.clone()
                                            children=move |clause| {
                                                let title = clause
                                                    .chunk_metadata
                                                    .as_ref()
                                                    .and_then(|m| m.clause_title.clone())
                                                    .unwrap_or_else(|| "Clause".to_string());
                                                let preview: String =
                                                    clause.text_chunk.chars().take(100).collect();
                                                let open = clause.clone();
                                                view! {
                                                    <li>
                                                        <button
                                                            class="w-full text-left p-3 rounded-lg bg-base-200 hover:bg-base-300 transition-colors"
                                                            on:click=move |_| set_drawer.set(Some(open.clone()))
                                                        >
                                                            <div class="font-semibold text-sm">{title}</div>
                                                            <div class="text-xs text-base-content/60 truncate">
                                                                {preview}
                                                            </div>
                                                        </button>
                                                    </li>
                                                }
                                            }
                                        />
                                    </ul>
                                </div>
                            </div>

                            <div class="card bg-base-100 shadow-xl">
                                <div class="card-body">
                                    <h3 class="card-title text-base">
                                        <Lightbulb attr:class="h-5 w-5" /> "AI Insights"
                                    </h3>
                                    <Show when={
                                        let empty = insights.is_empty();
                                        move || empty
                                    }>
                                        <p class="text-base-content/50 text-sm py-4">
                                            "No insights were generated for this contract."
                                        </p>
                                    </Show>
                                    <ul class="space-y-2">
                                        <For
                                            each={
                                                let insights = insights.clone();
                                                move || insights.clone()
                                            }
                                            key=|insight| insight.id
                                            children=move |insight| {
                                                let (badge, label) = match insight.kind {
                                                    InsightKind::Risk => ("badge badge-error badge-outline", "risk"),
                                                    InsightKind::Recommendation => {
                                                        ("badge badge-info badge-outline", "recommendation")
                                                    }
                                                };
                                                view! {
                                                    <li class="p-3 rounded-lg bg-base-200">
                                                        <div class=badge>{label}</div>
                                                        <p class="text-sm mt-1">{insight.text}</p>
                                                    </li>
                                                }
                                            }
                                        />
                                    </ul>
                                </div>
                            </div>
                        </div>
                    }.into_any()
                })}

                // 证据抽屉：展示条款原文与定位元数据
                <Show when=move || drawer.get().is_some()>
                    <div class="modal modal-open" data-testid="evidence-drawer">
                        <div class="modal-box max-w-2xl">
                            {move || drawer.get().map(|clause| {
                                let meta = clause.chunk_metadata.clone().unwrap_or_default();
                                view! {
                                    <h3 class="font-bold text-lg">
                                        {meta.clause_title.clone().unwrap_or_else(|| "Clause".to_string())}
                                    </h3>
                                    <div class="flex gap-2 mt-2 text-xs text-base-content/60">
                                        {meta.page.map(|p| view! {
                                            <span class="badge badge-ghost">"Page " {p}</span>
                                        })}
                                        {meta.contract_name.clone().map(|name| view! {
                                            <span class="badge badge-ghost font-mono">{name}</span>
                                        })}
                                    </div>
                                    <p class="py-4 whitespace-pre-wrap text-sm">{clause.text_chunk.clone()}</p>
                                }.into_any()
                            })}
                            <div class="modal-action">
                                <button class="btn" on:click=move |_| set_drawer.set(None)>
                                    "Close"
                                </button>
                            </div>
                        </div>
                        <div class="modal-backdrop" on:click=move |_| set_drawer.set(None)></div>
                    </div>
                </Show>
            </div>
        </div>
    }
}
