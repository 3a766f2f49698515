//! Main egui application: lays out the panels and dispatches their actions.

use std::rc::Rc;

use egui::{self, CentralPanel, RichText, SidePanel, TopBottomPanel};
use wasm_bindgen_futures::spawn_local;

use echo_core::event_bus::EventBus;
use echo_core::orchestrator::ChatOrchestrator;
use echo_core::ports::{ApiPort, TimerPort};
use echo_core::search::SearchPanel;
use echo_core::session_store::SessionStore;
use echo_platform::{BrowserTimer, HttpApiClient, PollTimer};
use echo_types::config::AppConfig;
use echo_types::event::AppEvent;
use echo_types::session::SessionId;
use echo_ui::panels::chat::{self, ChatAction};
use echo_ui::panels::search::{self, SearchAction};
use echo_ui::panels::sessions::{self, SessionAction};
use echo_ui::state::{BackendHealth, UiState};
use echo_ui::theme;

pub struct EchoApp {
    config: AppConfig,
    ui_state: UiState,
    event_bus: EventBus,
    api: Rc<dyn ApiPort>,
    store: SessionStore,
    chat: ChatOrchestrator,
    search: SearchPanel,
    session_poll: Option<PollTimer>,
    /// Replaced on every selection change; dropping it clears the interval
    message_poll: Option<PollTimer>,
    first_frame: bool,
}

impl EchoApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let event_bus = EventBus::new();
        let ctx = cc.egui_ctx.clone();
        event_bus.set_waker(move || ctx.request_repaint());

        let api: Rc<dyn ApiPort> = Rc::new(HttpApiClient::from_config(&config));
        let timer: Rc<dyn TimerPort> = Rc::new(BrowserTimer::new());

        let store = SessionStore::new(api.clone(), timer.clone(), config.retry.clone());
        let chat = ChatOrchestrator::new(api.clone(), timer);
        let search = SearchPanel::new(api.clone(), config.search_limit);
        let session_poll = PollTimer::start(
            config.polling.sessions_ms,
            &event_bus,
            AppEvent::SessionPollTick,
        );

        let app = Self {
            ui_state: UiState::new(config.highlight_ms),
            config,
            event_bus,
            api,
            store,
            chat,
            search,
            session_poll: Some(session_poll),
            message_poll: None,
            first_frame: true,
        };
        app.fetch_sessions();
        app.check_health();
        app
    }

    fn fetch_sessions(&self) {
        let store = self.store.clone();
        let bus = self.event_bus.clone();
        spawn_local(async move {
            store.refetch().await;
            bus.emit(AppEvent::Repaint);
        });
    }

    fn check_health(&self) {
        let api = self.api.clone();
        let bus = self.event_bus.clone();
        spawn_local(async move {
            let ok = match api.health().await {
                Ok(()) => true,
                Err(e) => {
                    log::warn!("Backend health check failed: {}", e);
                    false
                }
            };
            bus.emit(AppEvent::HealthChecked { ok });
        });
    }

    fn open_session(&self, id: SessionId) {
        self.search.clear();
        let chat = self.chat.clone();
        let bus = self.event_bus.clone();
        spawn_local(async move {
            // a failed history load is already recorded in the chat error
            let _ = chat.select_session(id).await;
            bus.emit(AppEvent::SessionOpened { session_id: id });
        });
    }

    fn restart_message_poll(&mut self, id: SessionId) {
        self.message_poll = Some(PollTimer::start(
            self.config.polling.messages_ms,
            &self.event_bus,
            AppEvent::MessagePollTick { session_id: id },
        ));
    }

    fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::SessionPollTick => {
                let store = self.store.clone();
                let bus = self.event_bus.clone();
                spawn_local(async move {
                    if store.poll().await {
                        bus.emit(AppEvent::Repaint);
                    }
                });
            }
            AppEvent::MessagePollTick { session_id } => {
                if self.chat.selected_session_id() != Some(session_id) {
                    self.message_poll = None;
                    return;
                }
                let chat = self.chat.clone();
                let bus = self.event_bus.clone();
                spawn_local(async move {
                    if chat.poll_messages().await > 0 {
                        bus.emit(AppEvent::Repaint);
                    }
                });
            }
            AppEvent::SessionOpened { session_id } => {
                self.ui_state.apply(&event);
                if self.chat.selected_session_id() == Some(session_id) {
                    self.restart_message_poll(session_id);
                }
            }
            AppEvent::HealthChecked { .. } => self.ui_state.apply(&event),
            AppEvent::Repaint => {}
        }
    }

    fn dispatch_session_action(&mut self, action: SessionAction) {
        match action {
            SessionAction::Select(id) => self.open_session(id),
            SessionAction::Create(name) => {
                let store = self.store.clone();
                let chat = self.chat.clone();
                let bus = self.event_bus.clone();
                spawn_local(async move {
                    if let Ok(session) = store.create(&name).await {
                        let _ = chat.select_session(session.id).await;
                        bus.emit(AppEvent::SessionOpened { session_id: session.id });
                    } else {
                        bus.emit(AppEvent::Repaint);
                    }
                });
            }
            SessionAction::Delete(id) => {
                let store = self.store.clone();
                let chat = self.chat.clone();
                let bus = self.event_bus.clone();
                spawn_local(async move {
                    if store.delete(id).await.is_ok() {
                        chat.session_deleted(id);
                    }
                    bus.emit(AppEvent::Repaint);
                });
                if self.chat.selected_session_id() == Some(id) {
                    self.search.clear();
                }
            }
            SessionAction::Retry => self.fetch_sessions(),
        }
    }

    fn dispatch_chat_action(&mut self, action: ChatAction) {
        match action {
            ChatAction::Send(text) => {
                let chat = self.chat.clone();
                let bus = self.event_bus.clone();
                spawn_local(async move {
                    chat.send_message(&text).await;
                    bus.emit(AppEvent::Repaint);
                });
            }
            ChatAction::CreateAndSend(text) => {
                let chat = self.chat.clone();
                let store = self.store.clone();
                let bus = self.event_bus.clone();
                spawn_local(async move {
                    let opened = bus.clone();
                    chat.create_session_then_send(&store, &text, move |session_id| {
                        opened.emit(AppEvent::SessionOpened { session_id })
                    })
                    .await;
                    bus.emit(AppEvent::Repaint);
                });
            }
            ChatAction::DismissError => self.chat.clear_error(),
        }
    }

    fn dispatch_search_action(&mut self, action: SearchAction, now_ms: f64) {
        match action {
            SearchAction::Search(query) => {
                let search = self.search.clone();
                let session_id = self.chat.selected_session_id();
                let bus = self.event_bus.clone();
                spawn_local(async move {
                    search.search(&query, session_id).await;
                    bus.emit(AppEvent::Repaint);
                });
            }
            SearchAction::Focus(id) => self.ui_state.highlighter.focus(&id, now_ms),
            SearchAction::Clear => {
                self.search.clear();
                self.ui_state.search_query.clear();
            }
        }
    }

    fn session_title(&self) -> String {
        let Some(id) = self.chat.selected_session_id() else {
            return "New conversation".to_string();
        };
        self.store
            .state()
            .sessions
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| format!("Session {}", id))
    }
}

impl eframe::App for EchoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.first_frame {
            theme::apply_theme(ctx);
            self.first_frame = false;
        }

        for event in self.event_bus.drain() {
            self.handle_event(event);
        }

        let now_ms = ctx.input(|i| i.time) * 1000.0;
        if self.ui_state.highlighter.is_animating(now_ms) {
            ctx.request_repaint();
        }

        // ── Top bar ──────────────────────────────────────────
        TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(
                    RichText::new("EchoPrompt")
                        .strong()
                        .color(theme::ACCENT)
                        .size(16.0),
                );
                ui.separator();
                let health = self.ui_state.health;
                let color = match health {
                    BackendHealth::Online => theme::SUCCESS,
                    BackendHealth::Offline => theme::ERROR,
                    BackendHealth::Unknown => theme::TEXT_SECONDARY,
                };
                ui.label(RichText::new(health.label()).color(color).small());
                ui.label(
                    RichText::new(self.config.api_base())
                        .color(theme::TEXT_SECONDARY)
                        .small(),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui
                        .selectable_label(self.ui_state.show_search, "Search")
                        .clicked()
                    {
                        self.ui_state.show_search = !self.ui_state.show_search;
                    }
                });
            });
        });

        let selected = self.chat.selected_session_id();

        // ── Session list ─────────────────────────────────────
        let mut session_action = None;
        SidePanel::left("sessions_panel")
            .min_width(220.0)
            .max_width(300.0)
            .show(ctx, |ui| {
                let list = self.store.state();
                session_action = sessions::sessions_panel(ui, &list, selected, &mut self.ui_state);
            });

        // ── Search ───────────────────────────────────────────
        let mut search_action = None;
        if self.ui_state.show_search {
            SidePanel::right("search_panel")
                .min_width(260.0)
                .max_width(360.0)
                .show(ctx, |ui| {
                    let state = self.search.state();
                    search_action = search::search_panel(
                        ui,
                        &state,
                        &mut self.ui_state.search_query,
                        selected.is_some(),
                    );
                });
        }

        // ── Chat ─────────────────────────────────────────────
        let title = self.session_title();
        let busy = self.chat.is_busy();
        let mut chat_action = None;
        CentralPanel::default().show(ctx, |ui| {
            let state = self.chat.state();
            chat_action = chat::chat_panel(ui, &state, &title, busy, &mut self.ui_state, now_ms);
        });

        if let Some(action) = session_action {
            self.dispatch_session_action(action);
        }
        if let Some(action) = search_action {
            self.dispatch_search_action(action, now_ms);
        }
        if let Some(action) = chat_action {
            self.dispatch_chat_action(action);
        }
    }
}

impl Drop for EchoApp {
    fn drop(&mut self) {
        self.session_poll = None;
        self.message_poll = None;
        self.store.teardown();
        self.chat.reset();
        log::info!("EchoPrompt client stopped");
    }
}
