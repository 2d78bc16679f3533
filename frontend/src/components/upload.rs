use crate::api::use_api;
use crate::components::icons::*;
use crate::web::route::AppRoute;
use crate::web::router::use_router;
use crate::web::FilePart;
use leptos::prelude::*;
use leptos::task::spawn_local;
use web_sys::HtmlInputElement;

/// 表单状态结构体
///
/// 文件选择有两条等价路径（拖拽 / 选择器），都落到同一个 `file` 信号。
/// 文件对象不是 Send 的，所以用本地存储的信号。
#[derive(Clone, Copy)]
struct UploadFormState {
    file: RwSignal<Option<web_sys::File>, LocalStorage>,
    parties: RwSignal<String>,
    expiry_date: RwSignal<String>,
}

impl UploadFormState {
    fn new() -> Self {
        Self {
            file: RwSignal::new_local(None),
            parties: RwSignal::new(String::new()),
            expiry_date: RwSignal::new(String::new()),
        }
    }

    /// 重置表单到初始状态
    fn reset(&self) {
        self.file.set(None);
        self.parties.set(String::new());
        self.expiry_date.set(String::new());
    }
}

/// 提交前的本地必填校验，失败时不发任何请求
fn validate(has_file: bool, parties: &str, expiry_date: &str) -> Result<(), &'static str> {
    if !has_file || parties.trim().is_empty() || expiry_date.trim().is_empty() {
        return Err("All fields are required.");
    }
    Ok(())
}

/// 上传页面
#[component]
pub fn UploadPage() -> impl IntoView {
    let client = use_api();
    let router = use_router();

    let form = UploadFormState::new();
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);
    let (uploaded_filename, set_uploaded_filename) = signal(Option::<String>::None);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();

        let has_file = form.file.with_untracked(|f| f.is_some());
        let parties = form.parties.get_untracked();
        let expiry = form.expiry_date.get_untracked();
        if let Err(msg) = validate(has_file, &parties, &expiry) {
            set_error_msg.set(Some(msg.to_string()));
            return;
        }
        let Some(file) = form.file.get_untracked() else {
            return;
        };

        set_is_submitting.set(true);
        set_error_msg.set(None);
        set_uploaded_filename.set(None);

        let client = client.clone();
        spawn_local(async move {
            match client
                .upload_contract(FilePart::from_browser(file), &parties, &expiry)
                .await
            {
                Ok(receipt) => {
                    // 成功横幅展示服务端确认的文件名，表单清空
                    set_uploaded_filename.set(Some(receipt.filename));
                    form.reset();
                }
                Err(e) => set_error_msg.set(Some(e.surface("Upload failed. Please try again."))),
            }
            set_is_submitting.set(false);
        });
    };

    let on_file_picked = move |ev: web_sys::Event| {
        let input: HtmlInputElement = event_target(&ev);
        form.file.set(input.files().and_then(|list| list.get(0)));
    };

    let on_dragover = move |ev: web_sys::DragEvent| ev.prevent_default();
    let on_drop = move |ev: web_sys::DragEvent| {
        ev.prevent_default();
        let dropped = ev
            .data_transfer()
            .and_then(|dt| dt.files())
            .and_then(|list| list.get(0));
        if dropped.is_some() {
            form.file.set(dropped);
        }
    };

    view! {
        <div class="min-h-screen bg-base-200 p-4 md:p-8 font-sans">
            <div class="max-w-2xl mx-auto space-y-6">
                <button
                    on:click=move |_| router.navigate(AppRoute::Dashboard)
                    class="btn btn-ghost gap-2"
                >
                    <ArrowLeft attr:class="h-4 w-4" /> "Back to contracts"
                </button>

                <div class="card bg-base-100 shadow-xl">
                    <form class="card-body" on:submit=on_submit>
                        <h2 class="card-title">
                            <UploadCloud attr:class="h-6 w-6" /> "Upload Contract"
                        </h2>
                        <p class="text-base-content/70 text-sm">
                            "The backend parses the document, extracts clauses and scores risk."
                        </p>

                        <Show when=move || uploaded_filename.get().is_some()>
                            <div role="alert" class="alert alert-success">
                                <span>
                                    {move || format!(
                                        "\"{}\" uploaded and queued for processing.",
                                        uploaded_filename.get().unwrap_or_default()
                                    )}
                                </span>
                            </div>
                        </Show>

                        <Show when=move || error_msg.get().is_some()>
                            <div role="alert" class="alert alert-error">
                                <AlertTriangle attr:class="h-5 w-5" />
                                <span>{move || error_msg.get().unwrap_or_default()}</span>
                            </div>
                        </Show>

                        // 拖拽与文件选择器等价，都写入同一个选择信号
                        <div
                            class="border-2 border-dashed border-base-300 rounded-xl p-8 text-center cursor-pointer hover:border-primary transition-colors"
                            on:dragover=on_dragover
                            on:drop=on_drop
                        >
                            <label class="cursor-pointer block">
                                <UploadCloud attr:class="h-10 w-10 mx-auto opacity-40" />
                                <div class="mt-2 text-sm">
                                    {move || match form.file.with(|f| f.as_ref().map(|f| f.name())) {
                                        Some(name) => view! {
                                            <span class="font-mono font-bold">{name}</span>
                                        }.into_any(),
                                        None => view! {
                                            <span class="text-base-content/60">
                                                "Drag a contract here, or click to browse"
                                            </span>
                                        }.into_any(),
                                    }}
                                </div>
                                <input
                                    type="file"
                                    class="hidden"
                                    accept=".pdf,.doc,.docx,.txt"
                                    on:change=on_file_picked
                                />
                            </label>
                        </div>

                        <div class="form-control">
                            <label class="label" for="parties">
                                <span class="label-text">"Parties"</span>
                            </label>
                            <input
                                id="parties"
                                type="text"
                                placeholder="Acme Corp, Beta LLC"
                                on:input=move |ev| form.parties.set(event_target_value(&ev))
                                prop:value=form.parties
                                class="input input-bordered"
                            />
                        </div>

                        <div class="form-control">
                            <label class="label" for="expiry">
                                <span class="label-text">"Expiry date"</span>
                            </label>
                            <input
                                id="expiry"
                                type="date"
                                on:input=move |ev| form.expiry_date.set(event_target_value(&ev))
                                prop:value=form.expiry_date
                                class="input input-bordered"
                            />
                        </div>

                        <div class="form-control mt-4">
                            <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                {move || if is_submitting.get() {
                                    view! { <span class="loading loading-spinner"></span> "Uploading..." }.into_any()
                                } else {
                                    "Upload".into_any()
                                }}
                            </button>
                        </div>
                    </form>
                </div>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_missing_fields_locally() {
        assert_eq!(
            validate(false, "Acme", "2026-01-01"),
            Err("All fields are required.")
        );
        assert_eq!(validate(true, "", "2026-01-01"), Err("All fields are required."));
        assert_eq!(validate(true, "   ", "2026-01-01"), Err("All fields are required."));
        assert_eq!(validate(true, "Acme", ""), Err("All fields are required."));
    }

    #[test]
    fn accepts_complete_form() {
        assert_eq!(validate(true, "Acme Corp, Beta LLC", "2026-01-01"), Ok(()));
    }
}
