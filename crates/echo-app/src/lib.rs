//! EchoPrompt client: WASM entry point.
//!
//! This crate is the composition root. It validates the build-time
//! configuration, assembles the browser adapters and hands them to the
//! egui application.

mod app;
pub mod env;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use echo_platform::dom;
use echo_types::config::AppConfig;

pub const CANVAS_ID: &str = "echo_canvas";

/// WASM entry point, called from index.html
#[wasm_bindgen(start)]
pub async fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("EchoPrompt client starting...");

    let config = match AppConfig::from_lookup(env::build_time) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            dom::show_fatal_error(&format!("EchoPrompt cannot start.\n\n{}", e));
            return;
        }
    };
    log::info!(
        "Backend {} (frontend {})",
        config.api_base(),
        config.frontend_origin()
    );

    let Some(canvas) = find_canvas(CANVAS_ID) else {
        log::error!("No canvas element with id '{}'", CANVAS_ID);
        dom::show_fatal_error(&format!("Missing <canvas id=\"{}\"> in the page.", CANVAS_ID));
        return;
    };

    let web_options = eframe::WebOptions::default();
    wasm_bindgen_futures::spawn_local(async move {
        let started = eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(move |cc| Ok(Box::new(app::EchoApp::new(cc, config)))),
            )
            .await;
        if let Err(e) = started {
            log::error!("Failed to start eframe: {:?}", e);
        }
    });
}

fn find_canvas(id: &str) -> Option<web_sys::HtmlCanvasElement> {
    web_sys::window()?
        .document()?
        .get_element_by_id(id)?
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .ok()
}
