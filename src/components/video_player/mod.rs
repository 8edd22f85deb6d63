//! HLS video player component: skin + engine + injected audio selector.

use dioxus::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};

pub mod audio_menu;
pub mod labels;
mod rotate_prompt;
#[cfg(target_arch = "wasm32")]
pub mod session;

pub use rotate_prompt::{is_mobile_user_agent, is_portrait_viewport, RotatePrompt};

#[cfg(target_arch = "wasm32")]
use session::{PlaybackSession, SessionConfig};
#[cfg(target_arch = "wasm32")]
use std::cell::RefCell;
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;

/// Ids scope every DOM query to this player instance, so several players can
/// coexist on one page.
fn next_wrapper_id() -> String {
    static NEXT_PLAYER: AtomicUsize = AtomicUsize::new(0);
    format!("rustyvid-player-{}", NEXT_PLAYER.fetch_add(1, Ordering::Relaxed))
}

/// Adaptive-bitrate video player.
///
/// `src` points at an HLS manifest; changing it (or `auto_play`) tears the
/// current playback session down and starts a fresh one. `duration` is
/// display-only and read when a session starts. `on_ended` is forwarded from
/// the media element untouched.
#[component]
pub fn VideoPlayer(
    src: ReadOnlySignal<String>,
    auto_play: ReadOnlySignal<bool>,
    #[props(default)] poster: Option<String>,
    #[props(default)] duration: Option<f64>,
    #[props(default)] on_ended: Option<EventHandler<()>>,
) -> Element {
    let wrapper_id = use_hook(next_wrapper_id);

    #[cfg(not(target_arch = "wasm32"))]
    let _ = (src, duration, on_ended);

    #[cfg(target_arch = "wasm32")]
    {
        let sessions = use_hook(|| Rc::new(RefCell::new(None::<PlaybackSession>)));
        {
            let sessions = sessions.clone();
            let wrapper_id = wrapper_id.clone();
            use_effect(move || {
                let source = src();
                let requested = auto_play();
                if let Some(previous) = sessions.borrow_mut().take() {
                    previous.dispose();
                }
                let session = PlaybackSession::start(SessionConfig {
                    wrapper_id: wrapper_id.clone(),
                    source,
                    auto_play: requested,
                    duration,
                    on_ended,
                });
                *sessions.borrow_mut() = Some(session);
            });
        }
        use_drop(move || {
            if let Some(previous) = sessions.borrow_mut().take() {
                previous.dispose();
            }
        });
    }

    rsx! {
        div {
            id: "{wrapper_id}",
            class: "rustyvid-player relative w-full aspect-video bg-black rounded-xl overflow-hidden shadow-2xl",
            video {
                id: "{wrapper_id}-video",
                class: "w-full h-full",
                playsinline: true,
                controls: true,
                poster,
            }
            RotatePrompt { auto_play }
        }
    }
}
