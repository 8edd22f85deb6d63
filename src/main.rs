use dioxus::prelude::*;

use rustyvid::components::AppShell;

const FAVICON_SVG: Asset = asset!("/assets/favicon.svg");
const APP_CSS: Asset = asset!("/assets/styling/app.css");
const TAILWIND_CSS: Asset = asset!("/assets/tailwind.css");

// The engine and skin are plain globals; both are probed before use so a
// blocked CDN degrades to bare-video playback instead of breaking the app.
const HLS_SCRIPT_URL: &str = "https://cdn.jsdelivr.net/npm/hls.js@1.5/dist/hls.min.js";
const PLYR_SCRIPT_URL: &str = "https://cdn.jsdelivr.net/npm/plyr@3.7.8/dist/plyr.min.js";
const PLYR_STYLESHEET_URL: &str = "https://cdn.jsdelivr.net/npm/plyr@3.7.8/dist/plyr.css";

fn main() {
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    rsx! {
        document::Link { rel: "icon", r#type: "image/svg+xml", href: FAVICON_SVG }

        // Theme color for mobile browsers
        document::Meta { name: "theme-color", content: "#e50914" }
        document::Meta { name: "mobile-web-app-capable", content: "yes" }
        document::Meta { name: "apple-mobile-web-app-title", content: "RustyVid" }

        document::Stylesheet { href: PLYR_STYLESHEET_URL }
        document::Stylesheet { href: TAILWIND_CSS }
        document::Stylesheet { href: APP_CSS }

        document::Script { src: HLS_SCRIPT_URL }
        document::Script { src: PLYR_SCRIPT_URL }

        AppShell {}
    }
}
