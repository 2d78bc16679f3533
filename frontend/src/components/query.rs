use crate::api::use_api;
use crate::components::icons::*;
use crate::web::route::AppRoute;
use crate::web::router::use_router;
use clauselens_shared::QueryAnswer;
use leptos::prelude::*;
use leptos::task::spawn_local;

/// 自由提问页面
///
/// 提交后先清掉上一次的结果再发请求；答案下面按返回顺序
/// 列出支撑片段。
#[component]
pub fn QueryPage() -> impl IntoView {
    let client = use_api();
    let router = use_router();

    let (question, set_question) = signal(String::new());
    let (result, set_result) = signal(Option::<QueryAnswer>::None);
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let text = question.get_untracked();
        if text.trim().is_empty() {
            return;
        }

        set_is_submitting.set(true);
        // 新提问先清空旧结果与旧错误
        set_result.set(None);
        set_error_msg.set(None);

        let client = client.clone();
        spawn_local(async move {
            match client.ask(&text).await {
                Ok(answer) => set_result.set(Some(answer)),
                Err(e) => set_error_msg.set(Some(e.surface("Failed to get an answer."))),
            }
            set_is_submitting.set(false);
        });
    };

    view! {
        <div class="min-h-screen bg-base-200 p-4 md:p-8 font-sans">
            <div class="max-w-3xl mx-auto space-y-6">
                <button
                    on:click=move |_| router.navigate(AppRoute::Dashboard)
                    class="btn btn-ghost gap-2"
                >
                    <ArrowLeft attr:class="h-4 w-4" /> "Back to contracts"
                </button>

                <div class="card bg-base-100 shadow-xl">
                    <form class="card-body" on:submit=on_submit>
                        <h2 class="card-title">
                            <MessageSquare attr:class="h-6 w-6" /> "Ask your contracts"
                        </h2>
                        <p class="text-base-content/70 text-sm">
                            "Answers are generated from clauses retrieved across your uploaded contracts."
                        </p>

                        <div class="join w-full mt-2">
                            <input
                                type="text"
                                placeholder="e.g. What is the termination notice period?"
                                on:input=move |ev| set_question.set(event_target_value(&ev))
                                prop:value=question
                                class="input input-bordered join-item w-full"
                            />
                            <button
                                class="btn btn-primary join-item"
                                disabled=move || is_submitting.get()
                            >
                                {move || if is_submitting.get() {
                                    view! { <span class="loading loading-spinner loading-sm"></span> }.into_any()
                                } else {
                                    "Ask".into_any()
                                }}
                            </button>
                        </div>

                        <Show when=move || error_msg.get().is_some()>
                            <div role="alert" class="alert alert-error mt-4">
                                <AlertTriangle attr:class="h-5 w-5" />
                                <span>{move || error_msg.get().unwrap_or_default()}</span>
                            </div>
                        </Show>
                    </form>
                </div>

                {move || result.get().map(|answer| view! {
                    <div class="card bg-base-100 shadow-xl">
                        <div class="card-body">
                            <h3 class="card-title text-base">"Answer"</h3>
                            <p class="text-sm whitespace-pre-wrap">{answer.answer.clone()}</p>

                            <Show when={
                                let has_chunks = !answer.retrieved_chunks.is_empty();
                                move || has_chunks
                            }>
                                <div class="divider text-xs text-base-content/50">
                                    "Supporting clauses"
                                </div>
                            </Show>
                            <ul class="space-y-2">
                                <For
                                    each={
                                        let chunks = answer.retrieved_chunks.clone();
                                        move || chunks.clone()
                                    }
                                    key=|chunk| chunk.id.clone()
                                    children=move |chunk| {
                                        let meta = chunk.chunk_metadata.clone().unwrap_or_default();
                                        view! {
                                            <li class="p-3 rounded-lg bg-base-200">
                                                <div class="flex gap-2 text-xs text-base-content/60 mb-1">
                                                    {meta.clause_title.clone().map(|t| view! {
                                                        <span class="badge badge-ghost">{t}</span>
                                                    })}
                                                    {meta.contract_name.clone().map(|name| view! {
                                                        <span class="badge badge-ghost font-mono">{name}</span>
                                                    })}
                                                    {meta.page.map(|p| view! {
                                                        <span class="badge badge-ghost">"Page " {p}</span>
                                                    })}
                                                </div>
                                                <p class="text-sm">{chunk.text_chunk}</p>
                                            </li>
                                        }
                                    }
                                />
                            </ul>
                        </div>
                    </div>
                }.into_any())}
            </div>
        </div>
    }
}
