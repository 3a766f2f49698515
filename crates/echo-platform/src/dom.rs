//! Page-level fallbacks for when the egui canvas cannot start.

use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

/// Replace the page body with a plain error notice.
pub fn show_fatal_error(message: &str) {
    let document = gloo_utils::document();
    let Some(body) = document.body() else {
        web_sys::console::error_1(&message.into());
        return;
    };
    let notice = document
        .create_element("pre")
        .ok()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok());
    match notice {
        Some(notice) => {
            notice.set_inner_text(message);
            body.set_inner_text("");
            let _ = body.append_child(&notice);
        }
        None => body.set_inner_text(message),
    }
}
