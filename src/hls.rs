//! Bindings and typed helpers for the hls.js adaptive-streaming engine.
//!
//! The engine is an opaque collaborator provided by a CDN `<script>` tag; it
//! owns segment fetching, ABR, and buffer management. This module binds the
//! surface the player needs (load/attach/destroy, the three events it reacts
//! to, and the active audio-track index) and keeps the error taxonomy and
//! track model in plain Rust so recovery policy stays testable off-browser.

use serde::Deserialize;

/// Engine event names, as emitted by hls.js.
pub const MANIFEST_PARSED: &str = "hlsManifestParsed";
pub const AUDIO_TRACK_SWITCHED: &str = "hlsAudioTrackSwitched";
pub const ERROR: &str = "hlsError";

const NETWORK_ERROR_TYPE: &str = "networkError";
const MEDIA_ERROR_TYPE: &str = "mediaError";

/// Request headers injected into every outbound segment/playlist request so
/// tunnel proxies (ngrok, localtunnel) serve media instead of an HTML
/// interstitial page.
pub const TUNNEL_BYPASS_HEADERS: [(&str, &str); 2] = [
    ("ngrok-skip-browser-warning", "true"),
    ("Bypass-Tunnel-Reminder", "true"),
];

/// One audio rendition as reported by the engine on manifest parse.
///
/// The engine reports many more fields per track; only the ones the selector
/// needs are modeled, the rest are ignored on deserialization.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AudioTrack {
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Parse the engine's JSON-serialized audio-track list. Malformed payloads
/// yield an empty list rather than an error; a player without a track menu
/// still plays.
pub fn tracks_from_json(raw: &str) -> Vec<AudioTrack> {
    serde_json::from_str(raw).unwrap_or_default()
}

/// Error classes the engine attaches to fatal `hlsError` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Media,
    Other,
}

impl ErrorKind {
    pub fn from_event_type(event_type: &str) -> Self {
        match event_type {
            NETWORK_ERROR_TYPE => ErrorKind::Network,
            MEDIA_ERROR_TYPE => ErrorKind::Media,
            _ => ErrorKind::Other,
        }
    }

    /// Recovery policy for a fatal error of this class. Network and media
    /// errors are retried in place; everything else tears the engine down.
    pub fn recovery(self) -> Recovery {
        match self {
            ErrorKind::Network => Recovery::RestartLoad,
            ErrorKind::Media => Recovery::RecoverMedia,
            ErrorKind::Other => Recovery::Destroy,
        }
    }
}

/// What to do with the engine after a fatal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    RestartLoad,
    RecoverMedia,
    Destroy,
}

/// Plain-data part of the engine configuration. The `xhrSetup` hook is a JS
/// function and gets attached separately on the wasm side.
pub fn engine_config_json() -> serde_json::Value {
    serde_json::json!({
        "enableWorker": true,
        "lowLatencyMode": true,
    })
}

#[cfg(target_arch = "wasm32")]
mod bindings {
    use super::{tracks_from_json, AudioTrack, ErrorKind, TUNNEL_BYPASS_HEADERS};
    use std::cell::RefCell;
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;
    use web_sys::HtmlMediaElement;

    #[wasm_bindgen]
    extern "C" {
        /// Handle to one hls.js engine instance (the global `Hls` class).
        pub type Hls;

        #[wasm_bindgen(constructor, catch)]
        pub fn new(config: &JsValue) -> Result<Hls, JsValue>;

        #[wasm_bindgen(static_method_of = Hls, catch, js_name = isSupported)]
        pub fn is_supported() -> Result<bool, JsValue>;

        #[wasm_bindgen(method, catch, js_name = loadSource)]
        pub fn load_source(this: &Hls, url: &str) -> Result<(), JsValue>;

        #[wasm_bindgen(method, catch, js_name = attachMedia)]
        pub fn attach_media(this: &Hls, media: &HtmlMediaElement) -> Result<(), JsValue>;

        #[wasm_bindgen(method, catch, js_name = detachMedia)]
        pub fn detach_media(this: &Hls) -> Result<(), JsValue>;

        #[wasm_bindgen(method, catch)]
        pub fn destroy(this: &Hls) -> Result<(), JsValue>;

        #[wasm_bindgen(method, catch, js_name = startLoad)]
        pub fn start_load(this: &Hls) -> Result<(), JsValue>;

        #[wasm_bindgen(method, catch, js_name = recoverMediaError)]
        pub fn recover_media_error(this: &Hls) -> Result<(), JsValue>;

        #[wasm_bindgen(method)]
        pub fn on(this: &Hls, event: &str, callback: &js_sys::Function);

        #[wasm_bindgen(method)]
        pub fn off(this: &Hls, event: &str, callback: &js_sys::Function);

        #[wasm_bindgen(method, getter, js_name = audioTrack)]
        pub fn audio_track(this: &Hls) -> i32;

        #[wasm_bindgen(method, setter, js_name = audioTrack)]
        pub fn set_audio_track(this: &Hls, index: i32);

        #[wasm_bindgen(method, getter, js_name = audioTracks)]
        pub fn audio_tracks(this: &Hls) -> JsValue;
    }

    /// Whether the `Hls` global exists at all. The CDN script can be blocked
    /// or still in flight; calling into a missing global must not throw.
    pub fn engine_available() -> bool {
        js_sys::Reflect::get(&js_sys::global(), &JsValue::from_str("Hls"))
            .map(|value| value.is_function())
            .unwrap_or(false)
    }

    /// Build the engine configuration object. The returned closure backs the
    /// `xhrSetup` hook and must be kept alive for the engine's lifetime.
    pub fn engine_config() -> (JsValue, Closure<dyn FnMut(JsValue, JsValue)>) {
        let config = js_sys::JSON::parse(&super::engine_config_json().to_string())
            .unwrap_or_else(|_| js_sys::Object::new().into());

        let hook = Closure::wrap(Box::new(move |xhr: JsValue, _url: JsValue| {
            for (header, value) in TUNNEL_BYPASS_HEADERS {
                let _ = set_request_header(&xhr, header, value);
            }
        }) as Box<dyn FnMut(JsValue, JsValue)>);
        let _ = js_sys::Reflect::set(&config, &JsValue::from_str("xhrSetup"), hook.as_ref());

        (config, hook)
    }

    fn set_request_header(xhr: &JsValue, name: &str, value: &str) -> Result<(), JsValue> {
        let method: js_sys::Function =
            js_sys::Reflect::get(xhr, &JsValue::from_str("setRequestHeader"))?.dyn_into()?;
        method.call2(xhr, &JsValue::from_str(name), &JsValue::from_str(value))?;
        Ok(())
    }

    /// Deserialize a JS audio-track array by round-tripping through JSON.
    pub fn tracks_from_js(value: &JsValue) -> Vec<AudioTrack> {
        if value.is_null() || value.is_undefined() {
            return Vec::new();
        }
        js_sys::JSON::stringify(value)
            .ok()
            .and_then(|serialized| serialized.as_string())
            .map(|serialized| tracks_from_json(&serialized))
            .unwrap_or_default()
    }

    /// Pull the audio-track list out of a manifest-parsed event payload.
    pub fn tracks_from_manifest_event(data: &JsValue) -> Vec<AudioTrack> {
        js_sys::Reflect::get(data, &JsValue::from_str("audioTracks"))
            .map(|tracks| tracks_from_js(&tracks))
            .unwrap_or_default()
    }

    /// Extract `(fatal, kind, details)` from an `hlsError` event payload.
    pub fn error_event_details(data: &JsValue) -> (bool, ErrorKind, String) {
        let fatal = js_sys::Reflect::get(data, &JsValue::from_str("fatal"))
            .ok()
            .and_then(|value| value.as_bool())
            .unwrap_or(false);
        let kind = js_sys::Reflect::get(data, &JsValue::from_str("type"))
            .ok()
            .and_then(|value| value.as_string())
            .map(|raw| ErrorKind::from_event_type(&raw))
            .unwrap_or(ErrorKind::Other);
        let details = js_sys::Reflect::get(data, &JsValue::from_str("details"))
            .ok()
            .and_then(|value| value.as_string())
            .unwrap_or_default();
        (fatal, kind, details)
    }

    /// Index carried by an `hlsAudioTrackSwitched` event payload.
    pub fn switched_track_index(data: &JsValue) -> Option<i32> {
        js_sys::Reflect::get(data, &JsValue::from_str("id"))
            .ok()
            .and_then(|value| value.as_f64())
            .map(|id| id as i32)
    }

    thread_local! {
        // Session-scoped inspection handle; overwritten on attach, cleared
        // on teardown so nothing can reach a destroyed engine through it.
        static CURRENT_ENGINE: RefCell<Option<Hls>> = RefCell::new(None);
    }

    pub fn publish_debug_engine(engine: &Hls) {
        CURRENT_ENGINE.with(|slot| {
            *slot.borrow_mut() = Some(engine.clone());
        });
    }

    pub fn clear_debug_engine() {
        CURRENT_ENGINE.with(|slot| {
            slot.borrow_mut().take();
        });
    }

    /// The most recently attached engine, if one is live. Inspection only.
    pub fn debug_engine() -> Option<Hls> {
        CURRENT_ENGINE.with(|slot| slot.borrow().clone())
    }
}

#[cfg(target_arch = "wasm32")]
pub use bindings::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kinds_map_to_engine_event_types() {
        assert_eq!(ErrorKind::from_event_type("networkError"), ErrorKind::Network);
        assert_eq!(ErrorKind::from_event_type("mediaError"), ErrorKind::Media);
        assert_eq!(ErrorKind::from_event_type("otherError"), ErrorKind::Other);
        assert_eq!(ErrorKind::from_event_type("muxError"), ErrorKind::Other);
        assert_eq!(ErrorKind::from_event_type(""), ErrorKind::Other);
    }

    #[test]
    fn network_and_media_errors_recover_in_place() {
        assert_eq!(ErrorKind::Network.recovery(), Recovery::RestartLoad);
        assert_eq!(ErrorKind::Media.recovery(), Recovery::RecoverMedia);
        assert_eq!(ErrorKind::Other.recovery(), Recovery::Destroy);
    }

    #[test]
    fn tracks_parse_from_engine_payload() {
        let raw = r#"[
            {"id": 0, "lang": "hin", "name": "audio_1", "groupId": "aud", "default": true},
            {"id": 1, "name": "Commentary"},
            {"id": 2, "lang": "und"}
        ]"#;
        let tracks = tracks_from_json(raw);
        assert_eq!(tracks.len(), 3);
        assert_eq!(tracks[0].lang.as_deref(), Some("hin"));
        assert_eq!(tracks[1].lang, None);
        assert_eq!(tracks[1].name.as_deref(), Some("Commentary"));
        assert_eq!(tracks[2].id, 2);
    }

    #[test]
    fn malformed_track_payload_yields_no_tracks() {
        assert!(tracks_from_json("not json").is_empty());
        assert!(tracks_from_json("{}").is_empty());
        assert!(tracks_from_json("[]").is_empty());
    }

    #[test]
    fn engine_config_enables_worker_and_low_latency() {
        let config = engine_config_json();
        assert_eq!(config["enableWorker"], true);
        assert_eq!(config["lowLatencyMode"], true);
    }
}
