use crate::api::use_api;
use crate::components::icons::*;
use crate::session::use_session;
use crate::web::route::AppRoute;
use crate::web::router::use_router;
use clauselens_shared::{ContractStatus, ContractSummary, RiskScore};
use leptos::prelude::*;
use leptos::task::spawn_local;

/// 风险评分对应的徽章样式
pub(crate) fn risk_badge_class(score: RiskScore) -> &'static str {
    match score {
        RiskScore::Low => "badge badge-success badge-outline",
        RiskScore::Medium => "badge badge-warning badge-outline",
        RiskScore::High => "badge badge-error badge-outline",
    }
}

fn status_label(status: ContractStatus) -> &'static str {
    match status {
        ContractStatus::Active => "Active",
        ContractStatus::Other => "—",
    }
}

/// 空状态判定：加载完成、无错误、且列表为空
fn shows_empty_state(total: usize, loading: bool, has_error: bool) -> bool {
    total == 0 && !loading && !has_error
}

/// 表格判定：加载完成且有数据
fn shows_table(total: usize, loading: bool) -> bool {
    !loading && total > 0
}

/// 空状态 CTA 的导航目标
fn empty_state_cta() -> AppRoute {
    AppRoute::Upload
}

/// 合同列表页面
///
/// 挂载时拉取一次列表；加载 / 失败 / 空列表 / 表格四种状态互斥。
/// 点击行导航到详情（选中 id 随路由原子更新）。
#[component]
pub fn DashboardPage() -> impl IntoView {
    let client = use_api();
    let session = use_session();
    let router = use_router();

    let (contracts, set_contracts) = signal(Vec::<ContractSummary>::new());
    let (loading, set_loading) = signal(true);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let load_contracts = {
        let client = client.clone();
        move || {
            let client = client.clone();
            set_loading.set(true);
            set_error_msg.set(None);
            spawn_local(async move {
                match client.list_contracts().await {
                    Ok(data) => set_contracts.set(data),
                    Err(e) => set_error_msg.set(Some(e.surface("Failed to load contracts."))),
                }
                set_loading.set(false);
            });
        }
    };

    // 挂载时加载一次
    Effect::new({
        let load_contracts = load_contracts.clone();
        move |_| load_contracts()
    });

    let on_logout = {
        let session = session.clone();
        move |_| session.clear()
    };

    let total = move || contracts.with(|c| c.len());
    let is_empty =
        move || shows_empty_state(total(), loading.get(), error_msg.get().is_some());

    view! {
        <div class="min-h-screen bg-base-200 p-4 md:p-8 font-sans">
            <div class="max-w-7xl mx-auto space-y-8">
                <div class="navbar bg-base-100 rounded-box shadow-xl">
                    <div class="flex-1 gap-2">
                        <ShieldCheck attr:class="text-primary h-6 w-6" />
                        <a class="btn btn-ghost text-xl">"ClauseLens"</a>
                    </div>
                    <div class="flex-none gap-2">
                        <button
                            on:click=move |_| router.navigate(AppRoute::Upload)
                            class="btn btn-primary gap-2"
                        >
                            <UploadCloud attr:class="h-4 w-4" /> "Upload Contract"
                        </button>
                        <button
                            on:click=move |_| router.navigate(AppRoute::Query)
                            class="btn btn-ghost gap-2"
                        >
                            <MessageSquare attr:class="h-4 w-4" /> "Ask a Question"
                        </button>
                        <button on:click=on_logout class="btn btn-outline btn-error gap-2">
                            <LogOut attr:class="h-4 w-4" /> "Log out"
                        </button>
                    </div>
                </div>

                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body p-0">
                        <div class="flex items-center justify-between p-6 pb-2">
                            <div>
                                <h3 class="card-title">"Your Contracts"</h3>
                                <p class="text-base-content/70 text-sm">
                                    "Uploaded contracts with extracted clauses and AI insights."
                                </p>
                            </div>
                            <button
                                on:click={
                                    let load_contracts = load_contracts.clone();
                                    move |_| load_contracts()
                                }
                                disabled=move || loading.get()
                                class="btn btn-ghost btn-circle"
                            >
                                <RefreshCw attr:class=move || if loading.get() { "h-5 w-5 animate-spin" } else { "h-5 w-5" } />
                            </button>
                        </div>

                        <Show when=move || error_msg.get().is_some()>
                            <div role="alert" class="alert alert-error mx-6 mb-4">
                                <AlertTriangle attr:class="h-5 w-5" />
                                <span>{move || error_msg.get().unwrap_or_default()}</span>
                            </div>
                        </Show>

                        <Show when=move || loading.get()>
                            <div class="text-center py-12 text-base-content/50">
                                <span class="loading loading-spinner loading-lg"></span>
                            </div>
                        </Show>

                        <Show when=is_empty>
                            <div class="text-center py-12 space-y-4" data-testid="empty-state">
                                <FileText attr:class="h-12 w-12 mx-auto opacity-30" />
                                <p class="text-base-content/60">
                                    "No contracts yet. Upload your first contract to get started."
                                </p>
                                <button
                                    on:click=move |_| router.navigate(empty_state_cta())
                                    class="btn btn-primary"
                                >
                                    "Upload Contract"
                                </button>
                            </div>
                        </Show>

                        <Show when=move || shows_table(total(), loading.get())>
                            <div class="overflow-x-auto w-full">
                                <table class="table table-zebra w-full">
                                    <thead>
                                        <tr>
                                            <th>"Filename"</th>
                                            <th class="hidden md:table-cell">"Parties"</th>
                                            <th class="hidden md:table-cell">"Uploaded"</th>
                                            <th>"Expiry"</th>
                                            <th>"Status"</th>
                                            <th>"Risk"</th>
                                        </tr>
                                    </thead>
                                    <tbody>
                                        <For
                                            each=move || contracts.get()
                                            key=|c| c.id.clone()
                                            children=move |contract| {
                                                let id = contract.id.clone();
                                                view! {
                                                    <tr
                                                        class="hover cursor-pointer"
                                                        on:click=move |_| {
                                                            router.navigate(AppRoute::ContractDetail(id.clone()))
                                                        }
                                                    >
                                                        <td>
                                                            <div class="flex items-center gap-2 font-mono text-sm font-bold">
                                                                <FileText attr:class="h-4 w-4 opacity-50" />
                                                                {contract.filename}
                                                            </div>
                                                        </td>
                                                        <td class="hidden md:table-cell text-sm opacity-70">
                                                            {contract.parties}
                                                        </td>
                                                        <td class="hidden md:table-cell text-sm opacity-70">
                                                            {contract.uploaded_on.to_string()}
                                                        </td>
                                                        <td class="text-sm">{contract.expiry_date.to_string()}</td>
                                                        <td>
                                                            <div class="badge badge-neutral">
                                                                {status_label(contract.status)}
                                                            </div>
                                                        </td>
                                                        <td>
                                                            <div class=risk_badge_class(contract.risk_score)>
                                                                {contract.risk_score.as_str()}
                                                            </div>
                                                        </td>
                                                    </tr>
                                                }
                                            }
                                        />
                                    </tbody>
                                </table>
                            </div>
                        </Show>
                    </div>
                </div>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_badges_escalate_with_score() {
        assert!(risk_badge_class(RiskScore::Low).contains("success"));
        assert!(risk_badge_class(RiskScore::Medium).contains("warning"));
        assert!(risk_badge_class(RiskScore::High).contains("error"));
    }

    #[test]
    fn unknown_status_renders_a_placeholder() {
        assert_eq!(status_label(ContractStatus::Active), "Active");
        assert_eq!(status_label(ContractStatus::Other), "—");
    }

    #[test]
    fn empty_state_shows_only_after_a_clean_empty_load() {
        assert!(shows_empty_state(0, false, false));
        // 加载中 / 出错 / 有数据时都不展示空状态
        assert!(!shows_empty_state(0, true, false));
        assert!(!shows_empty_state(0, false, true));
        assert!(!shows_empty_state(3, false, false));
    }

    #[test]
    fn empty_state_cta_navigates_to_upload() {
        assert_eq!(empty_state_cta(), AppRoute::Upload);
    }

    #[test]
    fn table_renders_only_with_loaded_rows() {
        assert!(shows_table(2, false));
        assert!(!shows_table(0, false));
        assert!(!shows_table(2, true));
    }
}
