//! Browser-side behavior of the injected audio selector: idempotent
//! injection, self-healing after a skin re-render, and clean disposal.

#![cfg(target_arch = "wasm32")]

use std::cell::Cell;
use std::rc::Rc;

use rustyvid::components::video_player::audio_menu::{
    AudioMenuHandle, AudioMenuHost, AUDIO_CONTROL_ID, AUDIO_MENU_ID,
};
use rustyvid::hls::AudioTrack;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{Element, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> web_sys::Document {
    web_sys::window().unwrap().document().unwrap()
}

/// Minimal copy of the skin's rendered settings menu: one home pane holding
/// two forward controls.
fn skin_shell() -> Element {
    let doc = document();
    let root = doc.create_element("div").unwrap();
    root.set_inner_html(
        "<div class=\"plyr__menu\">\
           <div class=\"plyr__menu__container\">\
             <div>\
               <button type=\"button\" class=\"plyr__control plyr__control--forward\"><span>Speed</span></button>\
               <button type=\"button\" class=\"plyr__control plyr__control--forward\"><span>Quality</span></button>\
             </div>\
           </div>\
         </div>",
    );
    doc.body().unwrap().append_child(&root).unwrap();
    root
}

fn demo_tracks() -> Vec<AudioTrack> {
    vec![
        AudioTrack {
            id: 0,
            lang: Some("hin".into()),
            name: None,
        },
        AudioTrack {
            id: 1,
            lang: Some("eng".into()),
            name: Some("audio_2".into()),
        },
    ]
}

fn recording_host(tracks: Vec<AudioTrack>, active: &Rc<Cell<i32>>) -> AudioMenuHost {
    AudioMenuHost {
        tracks,
        active_track: Rc::new({
            let active = active.clone();
            move || active.get()
        }),
        select_track: Rc::new({
            let active = active.clone();
            move |index| active.set(index)
        }),
    }
}

fn marker_count(root: &Element, id: &str) -> u32 {
    root.query_selector_all(&format!("#{id}")).unwrap().length()
}

fn injected_button(root: &Element) -> HtmlElement {
    root.query_selector(&format!("#{AUDIO_CONTROL_ID}"))
        .unwrap()
        .unwrap()
        .dyn_into()
        .unwrap()
}

fn injected_pane(root: &Element) -> HtmlElement {
    root.query_selector(&format!("#{AUDIO_MENU_ID}"))
        .unwrap()
        .unwrap()
        .dyn_into()
        .unwrap()
}

fn entry(root: &Element, index: u32) -> HtmlElement {
    root.query_selector_all(&format!("#{AUDIO_MENU_ID} .plyr__menu__content button"))
        .unwrap()
        .item(index)
        .unwrap()
        .dyn_into()
        .unwrap()
}

#[wasm_bindgen_test]
fn injection_pass_is_idempotent() {
    let root = skin_shell();
    let active = Rc::new(Cell::new(0));
    let handle =
        AudioMenuHandle::activate_with_host(recording_host(demo_tracks(), &active), Some(root.clone()));

    handle.reconcile();
    handle.reconcile();

    assert_eq!(marker_count(&root, AUDIO_CONTROL_ID), 1);
    assert_eq!(marker_count(&root, AUDIO_MENU_ID), 1);
    root.remove();
}

#[wasm_bindgen_test]
fn button_is_grouped_after_the_forward_controls() {
    let root = skin_shell();
    let active = Rc::new(Cell::new(0));
    let _handle =
        AudioMenuHandle::activate_with_host(recording_host(demo_tracks(), &active), Some(root.clone()));

    let button = injected_button(&root);
    let previous = button.previous_element_sibling().unwrap();
    assert!(previous.text_content().unwrap().contains("Quality"));

    // Labels resolve through the language table; the synthetic name on the
    // second track is ignored in favor of its language code.
    assert_eq!(entry(&root, 0).text_content().unwrap(), "Hindi");
    assert_eq!(entry(&root, 1).text_content().unwrap(), "English");
    assert_eq!(entry(&root, 0).get_attribute("aria-checked").unwrap(), "true");
    assert_eq!(entry(&root, 1).get_attribute("aria-checked").unwrap(), "false");
    root.remove();
}

#[wasm_bindgen_test]
fn selecting_an_entry_delegates_and_navigates_home() {
    let root = skin_shell();
    let active = Rc::new(Cell::new(0));
    let _handle =
        AudioMenuHandle::activate_with_host(recording_host(demo_tracks(), &active), Some(root.clone()));

    injected_button(&root).click();
    assert!(!injected_pane(&root).hidden());

    entry(&root, 1).click();

    assert_eq!(active.get(), 1);
    assert_eq!(entry(&root, 1).get_attribute("aria-checked").unwrap(), "true");
    assert_eq!(entry(&root, 0).get_attribute("aria-checked").unwrap(), "false");
    assert!(injected_pane(&root).hidden());
    let value = injected_button(&root)
        .query_selector(".plyr__menu__value")
        .unwrap()
        .unwrap();
    assert_eq!(value.text_content().unwrap(), "English");
    root.remove();
}

#[wasm_bindgen_test]
async fn selector_reinjects_after_a_skin_rerender() {
    let root = skin_shell();
    let active = Rc::new(Cell::new(0));
    let _handle =
        AudioMenuHandle::activate_with_host(recording_host(demo_tracks(), &active), Some(root.clone()));

    // A skin re-render wipes the injected elements without notice.
    injected_button(&root).remove();
    injected_pane(&root).remove();
    assert_eq!(marker_count(&root, AUDIO_CONTROL_ID), 0);

    gloo_timers::future::TimeoutFuture::new(50).await;

    assert_eq!(marker_count(&root, AUDIO_CONTROL_ID), 1);
    assert_eq!(marker_count(&root, AUDIO_MENU_ID), 1);
    root.remove();
}

#[wasm_bindgen_test]
fn dispose_removes_the_injected_elements_and_is_reentrant() {
    let root = skin_shell();
    let active = Rc::new(Cell::new(0));
    let handle =
        AudioMenuHandle::activate_with_host(recording_host(demo_tracks(), &active), Some(root.clone()));
    assert_eq!(marker_count(&root, AUDIO_CONTROL_ID), 1);

    handle.dispose();
    assert_eq!(marker_count(&root, AUDIO_CONTROL_ID), 0);
    assert_eq!(marker_count(&root, AUDIO_MENU_ID), 0);

    // Second disposal is a no-op, as is disposing after the root is gone.
    handle.dispose();
    root.remove();
    handle.dispose();
}

#[wasm_bindgen_test]
fn missing_root_or_empty_tracks_yield_inert_handles() {
    let active = Rc::new(Cell::new(0));
    let handle = AudioMenuHandle::activate_with_host(recording_host(demo_tracks(), &active), None);
    handle.reconcile();
    handle.dispose();

    let root = skin_shell();
    let handle =
        AudioMenuHandle::activate_with_host(recording_host(Vec::new(), &active), Some(root.clone()));
    handle.reconcile();
    assert_eq!(marker_count(&root, AUDIO_CONTROL_ID), 0);
    handle.dispose();
    root.remove();
}

#[wasm_bindgen_test]
fn menuless_root_is_skipped_until_the_menu_appears() {
    let doc = document();
    let root = doc.create_element("div").unwrap();
    doc.body().unwrap().append_child(&root).unwrap();

    let active = Rc::new(Cell::new(0));
    let handle =
        AudioMenuHandle::activate_with_host(recording_host(demo_tracks(), &active), Some(root.clone()));
    assert_eq!(marker_count(&root, AUDIO_CONTROL_ID), 0);

    root.set_inner_html(
        "<div class=\"plyr__menu\"><div class=\"plyr__menu__container\">\
           <div><button type=\"button\" class=\"plyr__control plyr__control--forward\"><span>Speed</span></button></div>\
         </div></div>",
    );
    handle.reconcile();

    assert_eq!(marker_count(&root, AUDIO_CONTROL_ID), 1);
    assert_eq!(marker_count(&root, AUDIO_MENU_ID), 1);
    root.remove();
}
