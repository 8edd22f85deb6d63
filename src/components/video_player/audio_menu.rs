//! Audio-track selector injected into the skin's settings menu.
//!
//! The skin renders (and silently re-renders) its settings menu without any
//! notification, so the selector cannot be installed once and forgotten.
//! Instead an idempotent reconciliation pass runs on activation and again on
//! every structural mutation under the player root, restoring the injected
//! control whenever a re-render wipes it. All knowledge of the skin's DOM
//! (class names, pane layout, button text) is confined to the marker
//! constants and the `find_menu_container`/`find_home_pane` adapters below.

/// Marker ids for the injected elements. Both must be present for a pass to
/// treat the menu as already injected.
pub const AUDIO_CONTROL_ID: &str = "plyr-audio-control";
pub const AUDIO_MENU_ID: &str = "plyr-audio-menu";

/// Button labels that identify the skin's home pane. The skin exposes no
/// stable id for it, so the pane is recognized by the controls it contains.
pub const HOME_PANE_MARKERS: [&str; 3] = ["Speed", "Quality", "Captions"];

pub fn home_pane_marker_match(button_text: &str) -> bool {
    HOME_PANE_MARKERS
        .iter()
        .any(|marker| button_text.contains(marker))
}

#[cfg(target_arch = "wasm32")]
mod dom {
    use super::{home_pane_marker_match, AUDIO_CONTROL_ID, AUDIO_MENU_ID};
    use crate::components::video_player::labels;
    use crate::hls::{self, AudioTrack, Hls};
    use dioxus::logger::tracing::debug;
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::{JsCast, JsValue};
    use web_sys::{Document, Element, Event, HtmlElement, MutationObserver, MutationObserverInit};

    const MENU_SELECTOR: &str = ".plyr__menu";
    const CONTAINER_SELECTOR: &str = ".plyr__menu__container";
    const FORWARD_SELECTOR: &str = ".plyr__control--forward";
    const BACK_SELECTOR: &str = ".plyr__control--back";
    const CONTENT_SELECTOR: &str = ".plyr__menu__content";
    const VALUE_SELECTOR: &str = ".plyr__menu__value";
    const PRESSED_CLASS: &str = "plyr__control--pressed";

    /// Everything the injected menu needs from the outside world. Keeping the
    /// engine behind these closures lets the reconciliation pass run against
    /// anything that can report and switch an active track.
    #[derive(Clone)]
    pub struct AudioMenuHost {
        pub tracks: Vec<AudioTrack>,
        pub active_track: Rc<dyn Fn() -> i32>,
        pub select_track: Rc<dyn Fn(i32)>,
    }

    struct ActiveMenu {
        root: Element,
        host: AudioMenuHost,
        observer: MutationObserver,
        _observer_callback: Closure<dyn FnMut(js_sys::Array, MutationObserver)>,
        entry_callbacks: Vec<Closure<dyn FnMut(Event)>>,
        engine_subscription: Option<(Hls, Closure<dyn FnMut(JsValue, JsValue)>)>,
    }

    /// Cleanup capability for one injected selector. Disposal is idempotent
    /// and safe after the root has left the document.
    pub struct AudioMenuHandle {
        inner: Rc<RefCell<Option<ActiveMenu>>>,
    }

    impl AudioMenuHandle {
        /// Activate against a live engine: track switching delegates to the
        /// engine and engine-initiated switches update the injected UI.
        pub fn activate(engine: &Hls, tracks: Vec<AudioTrack>, root: Option<Element>) -> Self {
            let host = AudioMenuHost {
                tracks,
                active_track: Rc::new({
                    let engine = engine.clone();
                    move || engine.audio_track()
                }),
                select_track: Rc::new({
                    let engine = engine.clone();
                    move |index| engine.set_audio_track(index)
                }),
            };
            let handle = Self::activate_with_host(host, root);
            handle.bind_engine_sync(engine);
            handle
        }

        /// Activate with an explicit host. Returns an inert handle when there
        /// is nothing to inject into (no root, detached root, no tracks).
        pub fn activate_with_host(host: AudioMenuHost, root: Option<Element>) -> Self {
            let handle = AudioMenuHandle {
                inner: Rc::new(RefCell::new(None)),
            };
            let Some(root) = root else {
                debug!("no player root; audio selector not installed");
                return handle;
            };
            if host.tracks.is_empty() || !root.is_connected() {
                debug!("no tracks or detached root; audio selector not installed");
                return handle;
            }

            let observer_callback = {
                let inner = Rc::downgrade(&handle.inner);
                Closure::wrap(Box::new(
                    move |_mutations: js_sys::Array, _observer: MutationObserver| {
                        if let Some(inner) = inner.upgrade() {
                            reconcile(&inner);
                        }
                    },
                ) as Box<dyn FnMut(js_sys::Array, MutationObserver)>)
            };
            let Ok(observer) = MutationObserver::new(observer_callback.as_ref().unchecked_ref())
            else {
                return handle;
            };
            let options = MutationObserverInit::new();
            options.set_child_list(true);
            options.set_subtree(true);
            let _ = observer.observe_with_options(&root, &options);

            *handle.inner.borrow_mut() = Some(ActiveMenu {
                root,
                host,
                observer,
                _observer_callback: observer_callback,
                entry_callbacks: Vec::new(),
                engine_subscription: None,
            });
            reconcile(&handle.inner);
            handle
        }

        /// Run one reconciliation pass now, outside the observer.
        pub fn reconcile(&self) {
            reconcile(&self.inner);
        }

        fn bind_engine_sync(&self, engine: &Hls) {
            if self.inner.borrow().is_none() {
                return;
            }
            let callback = {
                let inner = Rc::downgrade(&self.inner);
                Closure::wrap(Box::new(move |_event: JsValue, data: JsValue| {
                    let Some(inner) = inner.upgrade() else { return };
                    let Some(index) = hls::switched_track_index(&data) else {
                        return;
                    };
                    let snapshot = {
                        let borrow = inner.borrow();
                        borrow
                            .as_ref()
                            .map(|active| (active.root.clone(), active.host.tracks.clone()))
                    };
                    if let Some((root, tracks)) = snapshot {
                        refresh_selection(&root, &tracks, index);
                    }
                }) as Box<dyn FnMut(JsValue, JsValue)>)
            };
            engine.on(hls::AUDIO_TRACK_SWITCHED, callback.as_ref().unchecked_ref());
            if let Some(active) = self.inner.borrow_mut().as_mut() {
                active.engine_subscription = Some((engine.clone(), callback));
            }
        }

        /// Stop observing, unsubscribe from the engine, and remove the
        /// injected elements if they are still present.
        pub fn dispose(&self) {
            let Some(active) = self.inner.borrow_mut().take() else {
                return;
            };
            active.observer.disconnect();
            if let Some((engine, callback)) = &active.engine_subscription {
                engine.off(hls::AUDIO_TRACK_SWITCHED, callback.as_ref().unchecked_ref());
            }
            remove_marker(&active.root, AUDIO_CONTROL_ID);
            remove_marker(&active.root, AUDIO_MENU_ID);
            debug!("audio selector disposed");
        }
    }

    impl Drop for AudioMenuHandle {
        fn drop(&mut self) {
            self.dispose();
        }
    }

    fn reconcile(inner: &Rc<RefCell<Option<ActiveMenu>>>) {
        let snapshot = {
            let borrow = inner.borrow();
            borrow
                .as_ref()
                .map(|active| (active.root.clone(), active.host.clone()))
        };
        let Some((root, host)) = snapshot else { return };
        if let Some(callbacks) = run_injection_pass(&root, &host) {
            if let Some(active) = inner.borrow_mut().as_mut() {
                active.entry_callbacks = callbacks;
            }
        }
    }

    fn find_menu_container(root: &Element) -> Option<Element> {
        let menu = root.query_selector(MENU_SELECTOR).ok().flatten()?;
        menu.query_selector(CONTAINER_SELECTOR).ok().flatten()
    }

    /// The container's direct child panes have no distinguishing ids: the
    /// home pane is whichever one carries the skin's built-in forward
    /// controls, with the first pane as a fallback.
    fn find_home_pane(container: &Element) -> Option<Element> {
        let children = container.children();
        let mut panes = Vec::new();
        for index in 0..children.length() {
            if let Some(child) = children.item(index) {
                if child.tag_name().eq_ignore_ascii_case("div") {
                    panes.push(child);
                }
            }
        }
        panes
            .iter()
            .find(|pane| pane_has_home_marker(pane))
            .or_else(|| panes.first())
            .cloned()
    }

    fn pane_has_home_marker(pane: &Element) -> bool {
        let Ok(buttons) = pane.query_selector_all("button") else {
            return false;
        };
        (0..buttons.length()).any(|index| {
            buttons
                .item(index)
                .and_then(|button| button.text_content())
                .map(|text| home_pane_marker_match(text.trim()))
                .unwrap_or(false)
        })
    }

    fn marker_present(container: &Element) -> bool {
        let button = container
            .query_selector(&format!("#{AUDIO_CONTROL_ID}"))
            .ok()
            .flatten();
        let pane = container
            .query_selector(&format!("#{AUDIO_MENU_ID}"))
            .ok()
            .flatten();
        button.is_some() && pane.is_some()
    }

    fn remove_marker(scope: &Element, id: &str) {
        if let Some(element) = scope.query_selector(&format!("#{id}")).ok().flatten() {
            element.remove();
        }
    }

    /// One idempotent injection pass. Returns the freshly wired click
    /// closures when something was injected, `None` on a no-op or when the
    /// menu structure is not (yet) present.
    fn run_injection_pass(
        root: &Element,
        host: &AudioMenuHost,
    ) -> Option<Vec<Closure<dyn FnMut(Event)>>> {
        if !root.is_connected() {
            return None;
        }
        let container = find_menu_container(root)?;
        if marker_present(&container) {
            return None;
        }
        let home = find_home_pane(&container)?;
        let document = root.owner_document()?;

        // A skin re-render can leave one marker behind without the other.
        remove_marker(&container, AUDIO_CONTROL_ID);
        remove_marker(&container, AUDIO_MENU_ID);

        debug!(tracks = host.tracks.len(), "injecting audio selector");

        let button = create_forward_button(&document)?;
        place_button(&home, &button);

        let pane = create_submenu_pane(&document)?;
        container.append_child(&pane).ok()?;
        let content = pane.query_selector(CONTENT_SELECTOR).ok().flatten()?;
        let back = pane.query_selector(BACK_SELECTOR).ok().flatten()?;

        let mut callbacks = Vec::new();

        for (index, track) in host.tracks.iter().enumerate() {
            let entry = document.create_element("button").ok()?;
            entry.set_attribute("type", "button").ok()?;
            entry.set_class_name("plyr__control");
            entry.set_attribute("role", "menuitemradio").ok()?;
            entry.set_attribute("aria-checked", "false").ok()?;
            let label = document.create_element("span").ok()?;
            label.set_text_content(Some(&labels::track_label(track, index)));
            entry.append_child(&label).ok()?;

            let callback = {
                let select = host.select_track.clone();
                let tracks = host.tracks.clone();
                let content = content.clone();
                let button = button.clone();
                let pane = pane.clone();
                let home = home.clone();
                let index = index as i32;
                Closure::wrap(Box::new(move |_event: Event| {
                    select(index);
                    update_selection(&content, &button, &tracks, index);
                    show_home(&pane, &home);
                }) as Box<dyn FnMut(Event)>)
            };
            entry
                .add_event_listener_with_callback("click", callback.as_ref().unchecked_ref())
                .ok()?;
            callbacks.push(callback);
            content.append_child(&entry).ok()?;
        }

        let open_callback = {
            let container = container.clone();
            let pane = pane.clone();
            Closure::wrap(Box::new(move |event: Event| {
                event.stop_propagation();
                show_submenu(&container, &pane);
            }) as Box<dyn FnMut(Event)>)
        };
        button
            .add_event_listener_with_callback("click", open_callback.as_ref().unchecked_ref())
            .ok()?;
        callbacks.push(open_callback);

        let back_callback = {
            let pane = pane.clone();
            let home = home.clone();
            Closure::wrap(Box::new(move |_event: Event| {
                show_home(&pane, &home);
            }) as Box<dyn FnMut(Event)>)
        };
        back.add_event_listener_with_callback("click", back_callback.as_ref().unchecked_ref())
            .ok()?;
        callbacks.push(back_callback);

        update_selection(&content, &button, &host.tracks, (host.active_track)());

        Some(callbacks)
    }

    fn create_forward_button(document: &Document) -> Option<Element> {
        let button = document.create_element("button").ok()?;
        button.set_id(AUDIO_CONTROL_ID);
        button.set_class_name("plyr__control plyr__control--forward");
        button.set_attribute("type", "button").ok()?;
        button.set_attribute("role", "menuitem").ok()?;
        button.set_attribute("aria-haspopup", "true").ok()?;
        button.set_inner_html(
            "<span>Audio</span><span class=\"plyr__menu__value\">Default</span>",
        );
        Some(button)
    }

    /// Keep the new control grouped with the skin's own forward controls:
    /// directly after the last one, or appended when the pane has none.
    fn place_button(home: &Element, button: &Element) {
        let last_forward = home
            .query_selector_all(FORWARD_SELECTOR)
            .ok()
            .filter(|list| list.length() > 0)
            .and_then(|list| list.item(list.length() - 1));
        match last_forward {
            Some(last) => {
                let _ = home.insert_before(button, last.next_sibling().as_ref());
            }
            None => {
                let _ = home.append_child(button);
            }
        }
    }

    fn create_submenu_pane(document: &Document) -> Option<Element> {
        let pane = document.create_element("div").ok()?;
        pane.set_id(AUDIO_MENU_ID);
        // A plain pane, not a nested menu container; the container class
        // doubles the skin's padding and background.
        pane.set_attribute(
            "style",
            "width: 100%; min-width: 200px; display: flex; flex-direction: column;",
        )
        .ok()?;
        pane.set_inner_html(
            "<div style=\"margin-bottom: 8px;\">\
               <button type=\"button\" class=\"plyr__control plyr__control--back\">\
                 <span class=\"plyr__sr-only\">Go back to previous menu</span>\
                 <span class=\"plyr__menu__label\">Audio</span>\
               </button>\
             </div>\
             <div class=\"plyr__menu__content\" style=\"display: flex; flex-direction: column; width: 100%;\"></div>",
        );
        if let Some(html) = pane.dyn_ref::<HtmlElement>() {
            html.set_hidden(true);
        }
        Some(pane)
    }

    /// Reveal the injected pane the way the skin reveals its own submenus:
    /// hide every sibling pane, then unhide ours.
    fn show_submenu(container: &Element, pane: &Element) {
        let children = container.children();
        for index in 0..children.length() {
            let Some(child) = children.item(index) else {
                continue;
            };
            if !child.tag_name().eq_ignore_ascii_case("div") {
                continue;
            }
            if let Some(html) = child.dyn_ref::<HtmlElement>() {
                html.set_hidden(true);
            }
        }
        if let Some(html) = pane.dyn_ref::<HtmlElement>() {
            html.set_hidden(false);
        }
    }

    fn show_home(pane: &Element, home: &Element) {
        if let Some(html) = pane.dyn_ref::<HtmlElement>() {
            html.set_hidden(true);
        }
        if let Some(html) = home.dyn_ref::<HtmlElement>() {
            html.set_hidden(false);
        }
    }

    /// Mirror the active index into the radio entries and the button's value
    /// label.
    fn update_selection(content: &Element, button: &Element, tracks: &[AudioTrack], active: i32) {
        let entries = content.children();
        for index in 0..entries.length() {
            let Some(entry) = entries.item(index) else {
                continue;
            };
            let selected = index as i32 == active;
            let _ = entry.set_attribute("aria-checked", if selected { "true" } else { "false" });
            let class_list = entry.class_list();
            let _ = if selected {
                class_list.add_1(PRESSED_CLASS)
            } else {
                class_list.remove_1(PRESSED_CLASS)
            };
        }

        let Some(track) = usize::try_from(active).ok().and_then(|i| tracks.get(i)) else {
            return;
        };
        if let Some(value) = button.query_selector(VALUE_SELECTOR).ok().flatten() {
            value.set_text_content(Some(&labels::track_label(track, active as usize)));
        }
    }

    /// Engine-initiated switch: relocate the injected elements (they may have
    /// been re-created since the subscription) and refresh their state.
    fn refresh_selection(root: &Element, tracks: &[AudioTrack], index: i32) {
        let content = root
            .query_selector(&format!("#{AUDIO_MENU_ID} {CONTENT_SELECTOR}"))
            .ok()
            .flatten();
        let button = root
            .query_selector(&format!("#{AUDIO_CONTROL_ID}"))
            .ok()
            .flatten();
        if let (Some(content), Some(button)) = (content, button) {
            update_selection(&content, &button, tracks, index);
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use dom::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_pane_is_recognized_by_its_control_labels() {
        assert!(home_pane_marker_match("Speed"));
        assert!(home_pane_marker_match("Speed 1×"));
        assert!(home_pane_marker_match("Quality 1080p"));
        assert!(home_pane_marker_match("Captions Off"));
        assert!(!home_pane_marker_match("Loop"));
        assert!(!home_pane_marker_match(""));
    }
}
