use dioxus::prelude::*;

#[component]
pub fn Icon(name: String, class: String) -> Element {
    let svg_content = match name.as_str() {
        "rotate" => rsx! {
            svg {
                class: "{class}",
                view_box: "0 0 24 24",
                fill: "none",
                stroke: "currentColor",
                stroke_width: "2",
                path {
                    stroke_linecap: "round",
                    stroke_linejoin: "round",
                    d: "M4 4v5h.582m15.356 2A8.001 8.001 0 004.582 9m0 0H9m11 11v-5h-.581m0 0a8.003 8.003 0 01-15.357-2m15.357 2H15",
                }
            }
        },
        "film" => rsx! {
            svg {
                class: "{class}",
                view_box: "0 0 24 24",
                fill: "none",
                stroke: "currentColor",
                stroke_width: "2",
                rect {
                    x: "2",
                    y: "2",
                    width: "20",
                    height: "20",
                    rx: "2.18",
                    ry: "2.18",
                }
                line { x1: "7", y1: "2", x2: "7", y2: "22" }
                line { x1: "17", y1: "2", x2: "17", y2: "22" }
                line { x1: "2", y1: "12", x2: "22", y2: "12" }
                line { x1: "2", y1: "7", x2: "7", y2: "7" }
                line { x1: "2", y1: "17", x2: "7", y2: "17" }
                line { x1: "17", y1: "17", x2: "22", y2: "17" }
                line { x1: "17", y1: "7", x2: "22", y2: "7" }
            }
        },
        "audio" => rsx! {
            svg {
                class: "{class}",
                view_box: "0 0 24 24",
                fill: "none",
                stroke: "currentColor",
                stroke_width: "2",
                path { d: "M11 5L6 9H2v6h4l5 4V5z" }
                path { d: "M15.54 8.46a5 5 0 0 1 0 7.07" }
                path { d: "M19.07 4.93a10 10 0 0 1 0 14.14" }
            }
        },
        _ => rsx! {
            svg { class: "{class}", view_box: "0 0 24 24" }
        },
    };

    svg_content
}
