//! Bindings and option builders for the Plyr UI skin.
//!
//! Plyr owns control rendering, layout, and styling; the player only
//! constructs it over the rendered `<video>`, listens for its `ready`
//! signal, and destroys it on teardown. The settings-menu DOM it renders is
//! reconciled elsewhere (`components::video_player::audio_menu`).

/// Control bar layout, outermost to innermost.
pub const SKIN_CONTROLS: [&str; 12] = [
    "play-large",
    "play",
    "progress",
    "current-time",
    "duration",
    "mute",
    "volume",
    "captions",
    "settings",
    "pip",
    "airplay",
    "fullscreen",
];

/// Plain-data skin options. `duration` is display-only; the skin shows it
/// before the manifest is parsed.
pub fn skin_options_json(auto_play: bool, duration: Option<f64>) -> serde_json::Value {
    let mut options = serde_json::json!({
        "controls": SKIN_CONTROLS,
        "autoplay": auto_play,
        "invertTime": false,
        "displayDuration": true,
    });
    if let Some(duration) = duration {
        options["duration"] = serde_json::json!(duration);
    }
    options
}

#[cfg(target_arch = "wasm32")]
mod bindings {
    use wasm_bindgen::prelude::*;

    #[wasm_bindgen]
    extern "C" {
        /// Handle to one Plyr skin instance (the global `Plyr` class).
        pub type Plyr;

        #[wasm_bindgen(constructor, catch)]
        pub fn new(target: &web_sys::Element, options: &JsValue) -> Result<Plyr, JsValue>;

        #[wasm_bindgen(method, catch)]
        pub fn destroy(this: &Plyr) -> Result<(), JsValue>;

        #[wasm_bindgen(method)]
        pub fn once(this: &Plyr, event: &str, callback: &js_sys::Function);
    }

    /// Whether the `Plyr` global exists. Absent skin is absorbed — the video
    /// element still plays with native controls.
    pub fn skin_available() -> bool {
        js_sys::Reflect::get(&js_sys::global(), &JsValue::from_str("Plyr"))
            .map(|value| value.is_function())
            .unwrap_or(false)
    }

    /// Skin options as a JS object.
    pub fn skin_options(auto_play: bool, duration: Option<f64>) -> JsValue {
        js_sys::JSON::parse(&super::skin_options_json(auto_play, duration).to_string())
            .unwrap_or_else(|_| js_sys::Object::new().into())
    }
}

#[cfg(target_arch = "wasm32")]
pub use bindings::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skin_options_carry_the_control_bar_and_autoplay() {
        let options = skin_options_json(true, None);
        assert_eq!(options["autoplay"], true);
        assert_eq!(options["invertTime"], false);
        assert_eq!(options["displayDuration"], true);
        assert_eq!(options["controls"][0], "play-large");
        assert_eq!(options["controls"][8], "settings");
        assert!(options.get("duration").is_none());
    }

    #[test]
    fn explicit_duration_is_passed_through() {
        let options = skin_options_json(false, Some(1432.0));
        assert_eq!(options["autoplay"], false);
        assert_eq!(options["duration"], 1432.0);
    }
}
