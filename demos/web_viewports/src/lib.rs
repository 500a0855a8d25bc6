// Copyright 2026 the Viewports Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web demo: scroll-driven classes and callbacks.
//!
//! Builds a tall page of sections. The first group is tracked by one
//! [`ViewportController`] each; the last section reads its options from
//! `data-*` attributes and stops tracking halfway up the screen. A second
//! group is tracked by a single [`ViewportManager`], with a button on each
//! section that smooth-scrolls to the next one.
//!
//! Build with: `wasm-pack build --target web demos/web_viewports`
//!
//! Then serve `demos/web_viewports/` and open a page that loads the package.
//!
//! [`ViewportController`]: viewports_backend_web::ViewportController
//! [`ViewportManager`]: viewports_backend_web::ViewportManager

// This crate only runs in the browser; suppress dead-code warnings when
// cargo-checking on a native host target.
#![no_std]
#![cfg_attr(
    not(target_arch = "wasm32"),
    allow(dead_code, reason = "this crate only runs in the browser")
)]

extern crate alloc;

use alloc::boxed::Box;
use alloc::format;
use alloc::rc::Rc;

use wasm_bindgen::JsCast as _;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement};

use viewports_backend_web::{ConsoleSink, EventListener, ViewportController, ViewportManager};
use viewports_core::callback::{AnimationCallback, CallbackError};
use viewports_core::options::TrackerOptions;

const CONTROLLED_SECTIONS: usize = 5;
const MANAGED_SECTIONS: usize = 4;

const STYLES: &str = "
body { margin: 0; font-family: sans-serif; background: #111; color: #eee; }
section { height: 70vh; margin: 30vh 10vw; border-radius: 12px;
  background: hsl(210 40% calc(10% + var(--vp-middle, 0) * 30%));
  display: flex; align-items: center; justify-content: center; font-size: 2rem;
  transition: background 0.2s; }
section.vp--onscreen { outline: 2px solid #4caf50; }
section.vp--on-50 { color: #ffc208; }
section.vp--thresholdReached { outline-color: #f24336; }
section button { margin-left: 1rem; font-size: 1rem; }
";

/// Entry point, called automatically by `wasm_bindgen(start)`.
#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let body = document.body().ok_or_else(|| JsValue::from_str("no body"))?;

    let style = document.create_element("style")?;
    style.set_text_content(Some(STYLES));
    body.append_child(&style)?;

    for i in 0..CONTROLLED_SECTIONS {
        let section = create_section(&document, &format!("controlled-{i}"))?;
        body.append_child(&section)?;

        let callback = Some(css_variable_callback(&section)?);
        let controller = if i == 0 {
            // Log the first element's whole lifecycle.
            ViewportController::create_traced(
                section,
                TrackerOptions::default(),
                callback,
                Box::new(ConsoleSink::verbose()),
            )?
        } else if i == CONTROLLED_SECTIONS - 1 {
            section.set_attribute("data-stop-top-threshold", "0.5")?;
            ViewportController::from_data_attributes(section, callback)?
        } else {
            ViewportController::create(section, TrackerOptions::default(), callback)?
        };
        // Keep the controller alive; there is no graceful shutdown on the web.
        core::mem::forget(controller);
    }

    let manager = Rc::new(ViewportManager::new()?);
    for i in 0..MANAGED_SECTIONS {
        let section = create_section(&document, &format!("managed-{i}"))?;
        body.append_child(&section)?;
        let id = manager.register(
            section.clone(),
            &TrackerOptions::default(),
            Some(css_variable_callback(&section)?),
        )?;

        let button = document.create_element("button")?;
        button.set_text_content(Some("next"));
        section.append_child(&button)?;
        let manager = Rc::clone(&manager);
        let click = EventListener::new(&button, "click", move |_| {
            manager.navigate_to_next(id);
        })?;
        core::mem::forget(click);
    }
    core::mem::forget(manager);

    Ok(())
}

fn create_section(document: &Document, id: &str) -> Result<Element, JsValue> {
    let section = document.create_element("section")?;
    section.set_id(id);
    section.set_text_content(Some(id));
    Ok(section)
}

/// A callback mirroring the percentages into CSS custom properties.
fn css_variable_callback(section: &Element) -> Result<AnimationCallback, JsValue> {
    let element: HtmlElement = section.clone().dyn_into()?;
    Ok(Box::new(move |top: f64, middle: f64, bottom: f64| {
        let style = element.style();
        for (name, value) in [("--vp-top", top), ("--vp-middle", middle), ("--vp-bottom", bottom)] {
            style
                .set_property(name, &format!("{value:.3}"))
                .map_err(|err| CallbackError::new(format!("{name}: {err:?}")))?;
        }
        Ok(())
    }))
}
