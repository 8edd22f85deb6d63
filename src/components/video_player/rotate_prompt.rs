//! Mobile "rotate your device" overlay.
//!
//! Derived state only: mobile-ness comes from the user-agent string,
//! orientation from viewport proportions, both recomputed on mount and on
//! every resize/orientation change. Nothing persists across mounts.

use crate::components::Icon;
use dioxus::prelude::*;

#[cfg(target_arch = "wasm32")]
use dioxus::core::{Runtime, RuntimeGuard};
#[cfg(target_arch = "wasm32")]
use gloo_timers::future::TimeoutFuture;
#[cfg(target_arch = "wasm32")]
use std::cell::RefCell;
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::closure::Closure;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;
#[cfg(target_arch = "wasm32")]
use web_sys::window;

pub const MOBILE_UA_MARKERS: [&str; 8] = [
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

/// The prompt disappears on its own after this long.
const PROMPT_DISMISS_MS: u32 = 5_000;

pub fn is_mobile_user_agent(user_agent: &str) -> bool {
    let user_agent = user_agent.to_ascii_lowercase();
    MOBILE_UA_MARKERS
        .iter()
        .any(|marker| user_agent.contains(marker))
}

pub fn is_portrait_viewport(width: f64, height: f64) -> bool {
    height > width
}

#[component]
pub fn RotatePrompt(auto_play: ReadOnlySignal<bool>) -> Element {
    let mut visible = use_signal(|| false);
    let is_mobile = use_signal(|| false);
    let is_portrait = use_signal(|| false);
    let prompt_epoch = use_signal(|| 0u32);

    #[cfg(not(target_arch = "wasm32"))]
    let _ = (auto_play, prompt_epoch);

    #[cfg(target_arch = "wasm32")]
    {
        let listeners = use_hook(|| Rc::new(RefCell::new(Vec::<Closure<dyn FnMut()>>::new())));
        {
            let listeners = listeners.clone();
            use_effect(move || {
                let requested = auto_play();
                let Some(win) = window() else {
                    return;
                };

                detach_window_listeners(&listeners);
                refresh_prompt(visible, is_mobile, is_portrait, prompt_epoch, requested);

                let runtime = Runtime::current();
                let callback = Closure::wrap(Box::new(move || {
                    let _guard = RuntimeGuard::new(runtime.clone());
                    refresh_prompt(visible, is_mobile, is_portrait, prompt_epoch, requested);
                }) as Box<dyn FnMut()>);
                let _ = win
                    .add_event_listener_with_callback("resize", callback.as_ref().unchecked_ref());
                let _ = win.add_event_listener_with_callback(
                    "orientationchange",
                    callback.as_ref().unchecked_ref(),
                );
                listeners.borrow_mut().push(callback);
            });
        }
        use_drop(move || detach_window_listeners(&listeners));
    }

    rsx! {
        if visible() && is_mobile() && is_portrait() {
            div { class: "rotate-prompt absolute inset-0 z-50 flex items-center justify-center",
                div { class: "text-center space-y-4 px-6",
                    div { class: "flex justify-center",
                        Icon {
                            name: "rotate".to_string(),
                            class: "rotate-prompt-icon w-16 h-16".to_string(),
                        }
                    }
                    div { class: "space-y-2",
                        h3 { class: "text-white font-bold text-xl", "Rotate Your Device" }
                        p { class: "text-gray-300 text-sm",
                            "Turn your phone horizontally for the best viewing experience"
                        }
                    }
                    button {
                        class: "mt-4 px-6 py-2 bg-white/10 hover:bg-white/20 text-white rounded-full text-sm font-medium transition-colors",
                        onclick: move |_| visible.set(false),
                        "Got it"
                    }
                }
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn refresh_prompt(
    mut visible: Signal<bool>,
    mut is_mobile: Signal<bool>,
    mut is_portrait: Signal<bool>,
    mut prompt_epoch: Signal<u32>,
    auto_play: bool,
) {
    let Some(win) = window() else {
        return;
    };
    let user_agent = win.navigator().user_agent().unwrap_or_default();
    let width = win
        .inner_width()
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(0.0);
    let height = win
        .inner_height()
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(0.0);

    let mobile = is_mobile_user_agent(&user_agent);
    let portrait = is_portrait_viewport(width, height);
    is_mobile.set(mobile);
    is_portrait.set(portrait);

    if mobile && portrait && auto_play {
        visible.set(true);
        let shown_at = *prompt_epoch.peek() + 1;
        prompt_epoch.set(shown_at);
        spawn(async move {
            TimeoutFuture::new(PROMPT_DISMISS_MS).await;
            // A later re-show supersedes this dismissal.
            if *prompt_epoch.peek() == shown_at {
                visible.set(false);
            }
        });
    }
}

#[cfg(target_arch = "wasm32")]
fn detach_window_listeners(listeners: &Rc<RefCell<Vec<Closure<dyn FnMut()>>>>) {
    let Some(win) = window() else {
        return;
    };
    for callback in listeners.borrow_mut().drain(..) {
        let _ = win.remove_event_listener_with_callback("resize", callback.as_ref().unchecked_ref());
        let _ = win.remove_event_listener_with_callback(
            "orientationchange",
            callback.as_ref().unchecked_ref(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_mobile_platforms_match() {
        assert!(is_mobile_user_agent(
            "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15"
        ));
        assert!(is_mobile_user_agent(
            "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36"
        ));
        assert!(is_mobile_user_agent("Opera/9.80 (J2ME/MIDP; Opera Mini/9.80)"));
    }

    #[test]
    fn desktop_user_agents_do_not_match() {
        assert!(!is_mobile_user_agent(
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36"
        ));
        assert!(!is_mobile_user_agent(
            "Mozilla/5.0 (X11; Linux x86_64) Gecko/20100101 Firefox/126.0"
        ));
        assert!(!is_mobile_user_agent(""));
    }

    #[test]
    fn portrait_means_taller_than_wide() {
        assert!(is_portrait_viewport(390.0, 844.0));
        assert!(!is_portrait_viewport(844.0, 390.0));
        assert!(!is_portrait_viewport(800.0, 800.0));
    }
}
