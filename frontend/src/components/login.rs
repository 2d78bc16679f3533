use crate::api::{use_api, ApiError};
use crate::components::icons::ShieldCheck;
use leptos::prelude::*;
use leptos::task::spawn_local;

/// 认证表单的错误文案
///
/// 校验数组会被拍平，`detail` 字符串原样展示，其余落到通用兜底。
fn auth_error_message(err: &ApiError) -> String {
    match err {
        ApiError::Unauthorized => "Incorrect username or password.".to_string(),
        ApiError::Network => err.to_string(),
        ApiError::Api { .. } => err.surface("Something went wrong. Please try again."),
        ApiError::Decode(_) => "Something went wrong. Please try again.".to_string(),
    }
}

/// 登录 / 注册页面
///
/// 两种子模式共用同一张表单；注册成功后立即用同一凭据登录
/// （注册本身不建立会话）。成功后的跳转由路由服务监听认证信号完成。
#[component]
pub fn LoginPage() -> impl IntoView {
    let client = use_api();

    let (is_signup, set_is_signup) = signal(false);
    let (username, set_username) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if username.get().is_empty() || password.get().is_empty() {
            set_error_msg.set(Some("Please fill in all fields".to_string()));
            return;
        }

        set_is_submitting.set(true);
        set_error_msg.set(None);

        let client = client.clone();
        spawn_local(async move {
            let user = username.get_untracked();
            let pass = password.get_untracked();

            let result = if is_signup.get_untracked() {
                match client.signup(&user, &pass).await {
                    Ok(_) => client.login(&user, &pass).await.map(|_| ()),
                    Err(e) => Err(e),
                }
            } else {
                client.login(&user, &pass).await.map(|_| ())
            };

            if let Err(e) = result {
                set_error_msg.set(Some(auth_error_message(&e)));
            }
            set_is_submitting.set(false);
        });
    };

    let toggle_mode = move |_| {
        set_is_signup.update(|v| *v = !*v);
        set_error_msg.set(None);
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <div class="text-center mb-4">
                    <div class="flex flex-col items-center gap-2">
                        <div class="p-3 bg-primary/10 rounded-2xl text-primary">
                            <ShieldCheck attr:class="h-8 w-8" />
                        </div>
                        <h1 class="text-3xl font-bold">"ClauseLens"</h1>
                        <p class="text-base-content/70">
                            {move || if is_signup.get() {
                                "Create an account to manage your contracts"
                            } else {
                                "Sign in to your contract workspace"
                            }}
                        </p>
                    </div>
                </div>

                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit>
                        <Show when=move || error_msg.get().is_some()>
                            <div role="alert" class="alert alert-error text-sm py-2">
                                <span>{move || error_msg.get().unwrap_or_default()}</span>
                            </div>
                        </Show>

                        <div class="form-control">
                            <label class="label" for="username">
                                <span class="label-text">"Username"</span>
                            </label>
                            <input
                                id="username"
                                type="text"
                                placeholder="alice"
                                on:input=move |ev| set_username.set(event_target_value(&ev))
                                prop:value=username
                                class="input input-bordered"
                                required
                            />
                        </div>
                        <div class="form-control">
                            <label class="label" for="password">
                                <span class="label-text">"Password"</span>
                            </label>
                            <input
                                id="password"
                                type="password"
                                placeholder="••••••••"
                                on:input=move |ev| set_password.set(event_target_value(&ev))
                                prop:value=password
                                class="input input-bordered"
                                required
                            />
                        </div>
                        <div class="form-control mt-6">
                            <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                {move || if is_submitting.get() {
                                    view! { <span class="loading loading-spinner"></span> "Please wait..." }.into_any()
                                } else if is_signup.get() {
                                    "Create Account".into_any()
                                } else {
                                    "Sign In".into_any()
                                }}
                            </button>
                        </div>
                        <div class="text-center mt-2">
                            <button type="button" class="btn btn-link btn-sm" on:click=toggle_mode>
                                {move || if is_signup.get() {
                                    "Already have an account? Sign in"
                                } else {
                                    "No account yet? Create one"
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
    use serde_json::json;

    #[test]
    fn unauthorized_reads_as_bad_credentials() {
        let msg = auth_error_message(&ApiError::Unauthorized);
        assert_eq!(msg, "Incorrect username or password.");
    }

    #[test]
    fn validation_errors_are_flattened_into_one_line() {
        let err = ApiError::Api {
            status: 422,
            body: json!({ "detail": [
                { "loc": ["body", "username"], "msg": "field required" },
                { "loc": ["body", "password"], "msg": "field required" }
            ]}),
        };
        assert_eq!(
            auth_error_message(&err),
            "username: field required; password: field required"
        );
    }

    #[test]
    fn detail_strings_surface_verbatim() {
        let err = ApiError::Api {
            status: 400,
            body: json!({ "detail": "Username already registered" }),
        };
        assert_eq!(auth_error_message(&err), "Username already registered");
    }

    #[test]
    fn unknown_failures_fall_back_to_generic_message() {
        let err = ApiError::Api {
            status: 500,
            body: json!({ "something": "else" }),
        };
        assert_eq!(auth_error_message(&err), "Something went wrong. Please try again.");
        assert_eq!(
            auth_error_message(&ApiError::Decode("bad".into())),
            "Something went wrong. Please try again."
        );
    }

    #[test]
    fn network_failures_use_the_normalized_message() {
        assert_eq!(
            auth_error_message(&ApiError::Network),
            "Network error or server is down."
        );
    }
}
