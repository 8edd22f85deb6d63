use crate::components::{Icon, VideoPlayer};
use dioxus::prelude::*;

struct DemoStream {
    label: &'static str,
    url: &'static str,
    blurb: &'static str,
}

const DEMO_STREAMS: [DemoStream; 2] = [
    DemoStream {
        label: "Big Buck Bunny",
        url: "https://test-streams.mux.dev/x36xhzz/x36xhzz.m3u8",
        blurb: "Single audio rendition",
    },
    DemoStream {
        label: "BipBop 16:9",
        url: "https://devstreaming-cdn.apple.com/videos/streaming/examples/bipbop_16x9/bipbop_16x9_variant.m3u8",
        blurb: "Multiple audio renditions",
    },
];

#[component]
pub fn AppShell() -> Element {
    let mut selected = use_signal(|| 0usize);
    let mut auto_play = use_signal(|| false);
    let mut finished_plays = use_signal(|| 0u32);

    let stream = &DEMO_STREAMS[selected().min(DEMO_STREAMS.len() - 1)];

    rsx! {
        div { class: "min-h-screen bg-zinc-950 text-zinc-100",
            header { class: "border-b border-zinc-800/60 bg-zinc-950/90 backdrop-blur-xl",
                div { class: "max-w-5xl mx-auto px-4 py-4 flex items-center gap-3",
                    Icon { name: "film".to_string(), class: "w-6 h-6 text-red-500".to_string() }
                    h1 { class: "text-lg font-semibold", "RustyVid" }
                    span { class: "text-xs text-zinc-500", "{stream.blurb}" }
                }
            }
            main { class: "max-w-5xl mx-auto px-4 py-8 space-y-6",
                VideoPlayer {
                    src: stream.url.to_string(),
                    auto_play: auto_play(),
                    on_ended: move |_| finished_plays += 1,
                }
                div { class: "flex flex-wrap items-center gap-2",
                    for (index , demo) in DEMO_STREAMS.iter().enumerate() {
                        button {
                            key: "{demo.label}",
                            class: if index == selected() { "px-4 py-2 rounded-lg text-sm font-medium bg-red-600 text-white" } else { "px-4 py-2 rounded-lg text-sm font-medium bg-zinc-800 text-zinc-300 hover:bg-zinc-700 transition-colors" },
                            onclick: move |_| selected.set(index),
                            "{demo.label}"
                        }
                    }
                    label { class: "ml-auto flex items-center gap-2 text-sm text-zinc-400 cursor-pointer",
                        input {
                            r#type: "checkbox",
                            checked: auto_play(),
                            onchange: move |event| auto_play.set(event.checked()),
                        }
                        "Autoplay"
                    }
                }
                if finished_plays() > 0 {
                    p { class: "text-xs text-zinc-500", "Completed plays this visit: {finished_plays}" }
                }
            }
        }
    }
}
