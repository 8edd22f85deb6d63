//! Display-label resolution for audio tracks.

use crate::hls::AudioTrack;
use once_cell::sync::Lazy;
use std::collections::HashMap;

// Language-code mapping
static LANGUAGE_NAMES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("hin", "Hindi"),
        ("eng", "English"),
        ("kan", "Kannada"),
        ("tel", "Telugu"),
        ("tam", "Tamil"),
        ("mal", "Malayalam"),
        ("spa", "Spanish"),
        ("fre", "French"),
        ("ger", "German"),
        ("ita", "Italian"),
        ("jpn", "Japanese"),
        ("kor", "Korean"),
        ("chi", "Chinese"),
        ("rus", "Russian"),
    ])
});

pub fn language_display_name(code: &str) -> Option<&'static str> {
    LANGUAGE_NAMES.get(code).copied()
}

/// Names like `audio_3` are manifest-generated placeholders, not something
/// worth showing to a viewer.
pub fn is_synthetic_track_name(name: &str) -> bool {
    name.strip_prefix("audio_")
        .map(|suffix| suffix.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}

/// Resolve the label for one track: mapped language name first, then the
/// engine-provided name if it isn't a synthetic placeholder, then a 1-based
/// "Audio N" fallback.
pub fn track_label(track: &AudioTrack, index: usize) -> String {
    if let Some(name) = track
        .lang
        .as_deref()
        .and_then(language_display_name)
    {
        return name.to_string();
    }
    if let Some(name) = track.name.as_deref() {
        if !name.is_empty() && !is_synthetic_track_name(name) {
            return name.to_string();
        }
    }
    format!("Audio {}", index + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(lang: Option<&str>, name: Option<&str>) -> AudioTrack {
        AudioTrack {
            id: 0,
            lang: lang.map(str::to_string),
            name: name.map(str::to_string),
        }
    }

    #[test]
    fn mapped_language_codes_win() {
        assert_eq!(track_label(&track(Some("hin"), None), 0), "Hindi");
        assert_eq!(track_label(&track(Some("eng"), Some("audio_1")), 0), "English");
        assert_eq!(track_label(&track(Some("jpn"), Some("Commentary")), 0), "Japanese");
    }

    #[test]
    fn synthetic_names_fall_back_to_the_track_number() {
        assert_eq!(track_label(&track(Some("und"), Some("audio_3")), 2), "Audio 3");
        assert_eq!(track_label(&track(None, Some("audio_12")), 0), "Audio 1");
        assert_eq!(track_label(&track(None, None), 4), "Audio 5");
    }

    #[test]
    fn unmapped_codes_use_the_engine_name() {
        assert_eq!(track_label(&track(Some("xx"), Some("Commentary")), 0), "Commentary");
        assert_eq!(track_label(&track(Some("xx"), None), 1), "Audio 2");
    }

    #[test]
    fn audio_prefixed_real_names_are_kept() {
        // Only digit-suffixed audio_N names are placeholders.
        assert_eq!(
            track_label(&track(None, Some("audio_description")), 0),
            "audio_description"
        );
    }

    #[test]
    fn unknown_code_is_not_a_display_name() {
        assert_eq!(language_display_name("und"), None);
        assert_eq!(language_display_name("hin"), Some("Hindi"));
    }
}
