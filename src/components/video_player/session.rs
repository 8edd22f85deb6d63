//! Playback session: binds the streaming engine and the UI skin to one
//! rendered `<video>` element for one `(source, auto_play)` configuration.
//!
//! A session walks `Idle -> Attached -> Ready` and ends in `TornDown`. The
//! attach step fires on the skin's `ready` signal or, if the skin never
//! reports in, on a one-second fallback timer; whichever comes first, and at
//! most once. Every prop change or unmount disposes the whole session before
//! a new one starts, so no two engines ever share the media element.

use crate::components::video_player::audio_menu::AudioMenuHandle;
use crate::hls::{self, Hls};
use crate::plyr::{self, Plyr};
use dioxus::core::{Runtime, RuntimeGuard};
use dioxus::logger::tracing::{debug, info, warn};
use dioxus::prelude::*;
use gloo_timers::callback::Timeout;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{window, HtmlMediaElement};

/// Grace period for the skin to finish its own DOM setup when its `ready`
/// event never arrives.
const ATTACH_DELAY_MS: u32 = 1_000;

const NATIVE_HLS_MIME: &str = "application/vnd.apple.mpegurl";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Attached,
    Ready,
    TornDown,
}

pub struct SessionConfig {
    pub wrapper_id: String,
    pub source: String,
    pub auto_play: bool,
    pub duration: Option<f64>,
    pub on_ended: Option<EventHandler<()>>,
}

struct SessionInner {
    config: SessionConfig,
    runtime: Rc<Runtime>,
    phase: Phase,
    skin: Option<Plyr>,
    skin_ready: Option<Closure<dyn FnMut()>>,
    attach_timer: Option<Timeout>,
    media: Option<HtmlMediaElement>,
    engine: Option<Hls>,
    engine_callbacks: Vec<Closure<dyn FnMut(JsValue, JsValue)>>,
    request_hook: Option<Closure<dyn FnMut(JsValue, JsValue)>>,
    ended_callback: Option<Closure<dyn FnMut()>>,
    menu: Option<AudioMenuHandle>,
}

pub struct PlaybackSession {
    inner: Rc<RefCell<SessionInner>>,
}

impl PlaybackSession {
    pub fn start(config: SessionConfig) -> Self {
        info!(source = %config.source, "starting playback session");
        let inner = Rc::new(RefCell::new(SessionInner {
            runtime: Runtime::current(),
            config,
            phase: Phase::Idle,
            skin: None,
            skin_ready: None,
            attach_timer: None,
            media: None,
            engine: None,
            engine_callbacks: Vec::new(),
            request_hook: None,
            ended_callback: None,
            menu: None,
        }));
        mount_skin(&inner);
        arm_attach_fallback(&inner);
        PlaybackSession { inner }
    }

    /// Tear the session down: pending attach triggers cancelled, media
    /// detached before the engine is destroyed, injected menu disposed,
    /// skin destroyed last. Idempotent.
    pub fn dispose(&self) {
        let (timer, skin_ready, engine, callbacks, hook, menu, media, ended, skin) = {
            let mut borrow = self.inner.borrow_mut();
            if borrow.phase == Phase::TornDown {
                return;
            }
            borrow.phase = Phase::TornDown;
            (
                borrow.attach_timer.take(),
                borrow.skin_ready.take(),
                borrow.engine.take(),
                std::mem::take(&mut borrow.engine_callbacks),
                borrow.request_hook.take(),
                borrow.menu.take(),
                borrow.media.take(),
                borrow.ended_callback.take(),
                borrow.skin.take(),
            )
        };

        // Dropping an unfired timeout cancels it.
        drop(timer);

        if let Some(engine) = engine {
            let _ = engine.detach_media();
            let _ = engine.destroy();
            hls::clear_debug_engine();
        }
        drop(callbacks);
        drop(hook);

        if let Some(menu) = menu {
            menu.dispose();
        }

        if let (Some(media), Some(ended)) = (media, ended.as_ref()) {
            let _ = media
                .remove_event_listener_with_callback("ended", ended.as_ref().unchecked_ref());
        }

        if let Some(skin) = skin {
            let _ = skin.destroy();
        }
        drop(skin_ready);
        info!("playback session torn down");
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn media_element(wrapper_id: &str) -> Option<HtmlMediaElement> {
    let document = window()?.document()?;
    let wrapper = document.get_element_by_id(wrapper_id)?;
    wrapper
        .query_selector("video")
        .ok()
        .flatten()?
        .dyn_into()
        .ok()
}

fn mount_skin(inner: &Rc<RefCell<SessionInner>>) {
    if !plyr::skin_available() {
        warn!("player skin unavailable; continuing with the bare video element");
        return;
    }
    let (wrapper_id, auto_play, duration) = {
        let borrow = inner.borrow();
        (
            borrow.config.wrapper_id.clone(),
            borrow.config.auto_play,
            borrow.config.duration,
        )
    };
    let Some(media) = media_element(&wrapper_id) else {
        warn!("video element missing; skin not constructed");
        return;
    };

    let options = plyr::skin_options(auto_play, duration);
    let skin = match Plyr::new(&media, &options) {
        Ok(skin) => skin,
        Err(err) => {
            warn!("failed to construct player skin: {err:?}");
            return;
        }
    };

    let ready = {
        let weak = Rc::downgrade(inner);
        Closure::wrap(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                debug!("skin reported ready");
                try_attach(&inner);
            }
        }) as Box<dyn FnMut()>)
    };
    skin.once("ready", ready.as_ref().unchecked_ref());

    let mut borrow = inner.borrow_mut();
    borrow.skin = Some(skin);
    borrow.skin_ready = Some(ready);
}

fn arm_attach_fallback(inner: &Rc<RefCell<SessionInner>>) {
    let weak = Rc::downgrade(inner);
    let timer = Timeout::new(ATTACH_DELAY_MS, move || {
        if let Some(inner) = weak.upgrade() {
            try_attach(&inner);
        }
    });
    inner.borrow_mut().attach_timer = Some(timer);
}

/// Attach at most once per session; stray triggers (the loser of the
/// ready-vs-timer race, late timer fires after teardown) fall through the
/// phase guard.
fn try_attach(inner: &Rc<RefCell<SessionInner>>) {
    let (wrapper_id, source, auto_play) = {
        let mut borrow = inner.borrow_mut();
        if borrow.phase != Phase::Idle {
            return;
        }
        borrow.phase = Phase::Attached;
        (
            borrow.config.wrapper_id.clone(),
            borrow.config.source.clone(),
            borrow.config.auto_play,
        )
    };

    let Some(media) = media_element(&wrapper_id) else {
        warn!("media element missing at attach time; playback not initialized");
        return;
    };
    bind_ended_callback(inner, &media);
    inner.borrow_mut().media = Some(media.clone());

    let engine_supported = hls::engine_available() && Hls::is_supported().unwrap_or(false);
    if engine_supported {
        attach_engine(inner, &media, &source);
    } else if !media.can_play_type(NATIVE_HLS_MIME).is_empty() {
        info!("adaptive engine unsupported; falling back to native playback");
        media.set_src(&source);
        if auto_play {
            try_play(&media);
        }
    } else {
        warn!("neither the adaptive engine nor native playback is available");
    }
}

fn bind_ended_callback(inner: &Rc<RefCell<SessionInner>>, media: &HtmlMediaElement) {
    let (handler, runtime) = {
        let borrow = inner.borrow();
        (borrow.config.on_ended, borrow.runtime.clone())
    };
    let Some(handler) = handler else { return };
    let callback = Closure::wrap(Box::new(move || {
        let _guard = RuntimeGuard::new(runtime.clone());
        handler.call(());
    }) as Box<dyn FnMut()>);
    let _ = media.add_event_listener_with_callback("ended", callback.as_ref().unchecked_ref());
    inner.borrow_mut().ended_callback = Some(callback);
}

fn attach_engine(inner: &Rc<RefCell<SessionInner>>, media: &HtmlMediaElement, source: &str) {
    let (config, request_hook) = hls::engine_config();
    let engine = match Hls::new(&config) {
        Ok(engine) => engine,
        Err(err) => {
            warn!("failed to construct streaming engine: {err:?}");
            return;
        }
    };

    let manifest_callback = {
        let weak = Rc::downgrade(inner);
        Closure::wrap(Box::new(move |_event: JsValue, data: JsValue| {
            if let Some(inner) = weak.upgrade() {
                on_manifest_parsed(&inner, &data);
            }
        }) as Box<dyn FnMut(JsValue, JsValue)>)
    };
    engine.on(hls::MANIFEST_PARSED, manifest_callback.as_ref().unchecked_ref());

    let error_callback = {
        let weak = Rc::downgrade(inner);
        Closure::wrap(Box::new(move |_event: JsValue, data: JsValue| {
            if let Some(inner) = weak.upgrade() {
                on_engine_error(&inner, &data);
            }
        }) as Box<dyn FnMut(JsValue, JsValue)>)
    };
    engine.on(hls::ERROR, error_callback.as_ref().unchecked_ref());

    if let Err(err) = engine.load_source(source) {
        warn!("engine rejected the source: {err:?}");
    }
    if let Err(err) = engine.attach_media(media) {
        warn!("engine failed to attach media: {err:?}");
    }
    hls::publish_debug_engine(&engine);

    let mut borrow = inner.borrow_mut();
    borrow.engine = Some(engine);
    borrow.request_hook = Some(request_hook);
    borrow.engine_callbacks.push(manifest_callback);
    borrow.engine_callbacks.push(error_callback);
}

fn on_manifest_parsed(inner: &Rc<RefCell<SessionInner>>, data: &JsValue) {
    let (engine, media, auto_play, wrapper_id, previous_menu) = {
        let mut borrow = inner.borrow_mut();
        let Some(engine) = borrow.engine.clone() else {
            return;
        };
        borrow.phase = Phase::Ready;
        (
            engine,
            borrow.media.clone(),
            borrow.config.auto_play,
            borrow.config.wrapper_id.clone(),
            borrow.menu.take(),
        )
    };

    if auto_play {
        if let Some(media) = media.as_ref() {
            try_play(media);
        }
    }

    let mut tracks = hls::tracks_from_manifest_event(data);
    if tracks.is_empty() {
        tracks = hls::tracks_from_js(&engine.audio_tracks());
    }
    info!(tracks = tracks.len(), "manifest parsed");

    if let Some(previous) = previous_menu {
        previous.dispose();
    }
    if tracks.is_empty() {
        return;
    }

    let root = window()
        .and_then(|win| win.document())
        .and_then(|doc| doc.get_element_by_id(&wrapper_id));
    let menu = AudioMenuHandle::activate(&engine, tracks, root);
    inner.borrow_mut().menu = Some(menu);
}

fn on_engine_error(inner: &Rc<RefCell<SessionInner>>, data: &JsValue) {
    let (fatal, kind, details) = hls::error_event_details(data);
    if !fatal {
        debug!(?kind, %details, "non-fatal engine error");
        return;
    }

    let engine = inner.borrow().engine.clone();
    let Some(engine) = engine else { return };

    match kind.recovery() {
        hls::Recovery::RestartLoad => {
            warn!(%details, "fatal network error; restarting load");
            let _ = engine.start_load();
        }
        hls::Recovery::RecoverMedia => {
            warn!(%details, "fatal media error; attempting recovery");
            let _ = engine.recover_media_error();
        }
        hls::Recovery::Destroy => {
            warn!(%details, "unrecoverable engine error; destroying engine");
            teardown_engine(inner);
        }
    }
}

/// Fatal-path teardown of the engine (and the selector that delegates to
/// it). The session stays alive but inert until a prop change recreates it.
fn teardown_engine(inner: &Rc<RefCell<SessionInner>>) {
    let (engine, menu) = {
        let mut borrow = inner.borrow_mut();
        (borrow.engine.take(), borrow.menu.take())
    };
    if let Some(engine) = engine {
        let _ = engine.detach_media();
        let _ = engine.destroy();
        hls::clear_debug_engine();
    }
    if let Some(menu) = menu {
        menu.dispose();
    }
}

/// Best-effort playback start; rejection (autoplay policy) is not an error.
fn try_play(media: &HtmlMediaElement) {
    if let Ok(promise) = media.play() {
        wasm_bindgen_futures::spawn_local(async move {
            let _ = wasm_bindgen_futures::JsFuture::from(promise).await;
        });
    }
}
