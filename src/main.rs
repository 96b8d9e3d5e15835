//! Dodgefall entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, HtmlElement, HtmlInputElement, KeyboardEvent};

    use dodgefall::leaderboard::Leaderboard;
    use dodgefall::persistence::{KeyValueStore, LocalStore, MemoryStore};
    use dodgefall::platform::{Intent, intent_for_key};
    use dodgefall::renderer::RenderState;
    use dodgefall::{Session, Tuning};

    const INSTRUCTIONS: &str =
        "Move with the arrow keys or A/D (or drag on touch screens). Dodge the falling blocks for as long as you can!";

    /// Everything the page callbacks share
    struct App {
        session: Session,
        render_state: Option<RenderState>,
        canvas: HtmlCanvasElement,
        /// Canvas size (CSS pixels) the element is currently laid out for
        canvas_size: Vec2,
        last_time: f64,
        name_prompt_open: bool,
    }

    impl App {
        fn start(&mut self, autopilot: bool) {
            self.session.set_autopilot(autopilot);
            self.session.set_viewport(viewport());
            if self.session.start() {
                show("menu", false);
                show("leaderboard-view", false);
                show("canvas", true);
                show("hud", true);
                show("exit-to-menu", true);
            }
        }

        fn exit_to_menu(&mut self) {
            self.session.exit();
            self.close_name_prompt();
            show_menu();
            show_best(self.session.leaderboard());
        }

        /// Resize the canvas element to match the session layout
        fn sync_canvas(&mut self) {
            let Some(snapshot) = self.session.snapshot() else {
                return;
            };
            if snapshot.canvas == self.canvas_size {
                return;
            }
            let size = snapshot.canvas;
            self.canvas_size = size;

            let dpr = web_sys::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0);
            let width = ((size.x as f64) * dpr).round().max(1.0) as u32;
            let height = ((size.y as f64) * dpr).round().max(1.0) as u32;
            self.canvas.set_width(width);
            self.canvas.set_height(height);
            let style = self.canvas.style();
            let _ = style.set_property("width", &format!("{}px", size.x));
            let _ = style.set_property("height", &format!("{}px", size.y));

            if let Some(render_state) = self.render_state.as_mut() {
                render_state.resize(width, height);
            }
            log::info!("Canvas {}x{} ({}x{} physical)", size.x, size.y, width, height);
        }

        fn render(&mut self) {
            let Some(render_state) = self.render_state.as_mut() else {
                return;
            };
            let snapshot = self.session.snapshot();
            match render_state.render(snapshot.as_ref()) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost) => {
                    render_state.resize(render_state.size.0, render_state.size.1);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }

        fn update_hud(&self) {
            if let Some(snapshot) = self.session.snapshot() {
                set_text("hud-score", &snapshot.display_score.to_string());
            }
        }

        fn open_name_prompt(&mut self, score: u32) {
            self.name_prompt_open = true;
            set_text("name-score", &score.to_string());
            if let Some(input) = element::<HtmlInputElement>("name-input") {
                input.set_value("");
                let _ = input.focus();
            }
            show("name-dialog", true);
        }

        fn close_name_prompt(&mut self) {
            self.name_prompt_open = false;
            show("name-dialog", false);
        }

        /// Answer the pending name request (None = dismissed)
        fn answer_name_prompt(&mut self, submit: bool) {
            if !self.name_prompt_open {
                return;
            }
            let name = element::<HtmlInputElement>("name-input").map(|input| input.value());
            let name = if submit { name.as_deref() } else { None };
            if let Some(rank) = self.session.submit_name(name) {
                log::info!("New leaderboard rank #{}", rank);
            }
            self.close_name_prompt();
            show_menu();
            show_best(self.session.leaderboard());
        }
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn element<T: JsCast>(id: &str) -> Option<T> {
        document()?.get_element_by_id(id)?.dyn_into::<T>().ok()
    }

    fn show(id: &str, visible: bool) {
        if let Some(el) = element::<HtmlElement>(id) {
            let _ = el
                .style()
                .set_property("display", if visible { "block" } else { "none" });
        }
    }

    fn set_text(id: &str, text: &str) {
        if let Some(el) = document().and_then(|d| d.get_element_by_id(id)) {
            el.set_text_content(Some(text));
        }
    }

    fn show_menu() {
        show("canvas", false);
        show("hud", false);
        show("exit-to-menu", false);
        show("menu", true);
    }

    fn show_best(board: &Leaderboard) {
        match board.top_score() {
            Some(best) => set_text("menu-best", &format!("Best: {}", best)),
            None => set_text("menu-best", ""),
        }
    }

    fn viewport() -> Vec2 {
        let Some(window) = web_sys::window() else {
            return Vec2::ZERO;
        };
        let w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        Vec2::new(w as f32, h as f32)
    }

    /// Fill the leaderboard table body with rank / name / score rows
    fn render_leaderboard(board: &Leaderboard) -> Result<(), JsValue> {
        let document = document().ok_or("no document")?;
        let body = document
            .get_element_by_id("leaderboard-rows")
            .ok_or("no leaderboard table")?;
        body.set_text_content(None);
        for (i, entry) in board.entries().iter().enumerate() {
            let row = document.create_element("tr")?;
            for text in [(i + 1).to_string(), entry.name.clone(), entry.score.to_string()] {
                let cell = document.create_element("td")?;
                cell.set_text_content(Some(&text));
                row.append_child(&cell)?;
            }
            body.append_child(&row)?;
        }
        Ok(())
    }

    fn open_store() -> Box<dyn KeyValueStore> {
        match LocalStore::open() {
            Ok(store) => Box::new(store),
            Err(e) => {
                log::warn!("{}; scores will not survive a reload", e);
                Box::new(MemoryStore::new())
            }
        }
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Dodgefall starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        let mut store = open_store();
        match Leaderboard::seed_if_missing(store.as_mut()) {
            Ok(true) => log::info!("Seeded demo leaderboard"),
            Ok(false) => {}
            Err(e) => log::warn!("Could not seed leaderboard: {}", e),
        }
        let tuning = Tuning::load(store.as_ref());
        if !store.contains(Tuning::STORAGE_KEY) {
            // Expose the defaults for tweaking from devtools
            if let Err(e) = tuning.save(store.as_mut()) {
                log::warn!("Could not save tuning: {}", e);
            }
        }
        log::info!("Variant: {}", tuning.variant.as_str());

        let seed = js_sys::Date::now() as u64;
        let session = Session::new(tuning, store, viewport(), seed);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });
        let render_state = match init_renderer(&instance, &canvas).await {
            Ok(state) => Some(state),
            Err(e) => {
                log::error!("Rendering unavailable: {}", e);
                None
            }
        };

        let app = Rc::new(RefCell::new(App {
            session,
            render_state,
            canvas,
            canvas_size: Vec2::ZERO,
            last_time: 0.0,
            name_prompt_open: false,
        }));

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }
        show_menu();
        show_best(app.borrow().session.leaderboard());

        setup_menu(app.clone());
        setup_name_dialog(app.clone());
        setup_input_handlers(app.clone());
        setup_resize(app.clone());

        request_animation_frame(app);

        log::info!("Dodgefall running!");
        Ok(())
    }

    async fn init_renderer(instance: &wgpu::Instance, canvas: &HtmlCanvasElement) -> Result<RenderState, String> {
        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| e.to_string())?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| e.to_string())?;
        log::info!("Using adapter: {:?}", adapter.get_info().name);
        RenderState::new(surface, &adapter, canvas.width(), canvas.height())
            .await
            .map_err(|e| e.to_string())
    }

    fn on_click(id: &str, mut handler: impl FnMut() + 'static) {
        let Some(btn) = document().and_then(|d| d.get_element_by_id(id)) else {
            log::warn!("Missing #{}", id);
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| handler());
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_menu(app: Rc<RefCell<App>>) {
        {
            let app = app.clone();
            on_click("start-game", move || app.borrow_mut().start(false));
        }
        {
            let app = app.clone();
            on_click("demo-game", move || app.borrow_mut().start(true));
        }
        {
            let app = app.clone();
            on_click("exit-to-menu", move || app.borrow_mut().exit_to_menu());
        }
        {
            let app = app.clone();
            on_click("leaderboard", move || {
                if let Err(e) = render_leaderboard(app.borrow().session.leaderboard()) {
                    log::warn!("Leaderboard view failed: {:?}", e);
                }
                show("menu", false);
                show("leaderboard-view", true);
            });
        }
        on_click("leaderboard-back", || {
            show("leaderboard-view", false);
            show("menu", true);
        });
        on_click("instructions", || {
            if let Some(window) = web_sys::window() {
                let _ = window.alert_with_message(INSTRUCTIONS);
            }
        });
    }

    fn setup_name_dialog(app: Rc<RefCell<App>>) {
        {
            let app = app.clone();
            on_click("name-submit", move || app.borrow_mut().answer_name_prompt(true));
        }
        on_click("name-cancel", move || app.borrow_mut().answer_name_prompt(false));
    }

    fn setup_input_handlers(app: Rc<RefCell<App>>) {
        let Some(document) = document() else {
            return;
        };

        // Keyboard
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut app = app.borrow_mut();
                let key = event.key();
                if app.name_prompt_open {
                    match key.as_str() {
                        "Enter" => app.answer_name_prompt(true),
                        "Escape" => app.answer_name_prompt(false),
                        _ => {}
                    }
                    return;
                }
                if !app.session.is_running() {
                    return;
                }
                if key == "Escape" {
                    app.exit_to_menu();
                } else if let Some(intent) = intent_for_key(&key) {
                    event.prevent_default();
                    app.session.push_intent(intent);
                }
            });
            let _ = document.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch drag. Registered non-passive so the page does not scroll
        // while a run is being steered.
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::TouchEvent| {
                let mut app = app.borrow_mut();
                if !app.session.is_running() {
                    return;
                }
                event.prevent_default();
                let Some(touch) = event.touches().get(0) else {
                    return;
                };
                let rect = app.canvas.get_bounding_client_rect();
                let x = touch.client_x() as f64 - rect.left();
                app.session.push_intent(Intent::MoveTo(x as f32));
            });
            let options = web_sys::AddEventListenerOptions::new();
            options.set_passive(false);
            let _ = document.add_event_listener_with_callback_and_add_event_listener_options(
                "touchmove",
                closure.as_ref().unchecked_ref(),
                &options,
            );
            closure.forget();
        }

        // Mouse drag on the canvas
        {
            let canvas = app.borrow().canvas.clone();
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::PointerEvent| {
                if event.pointer_type() != "mouse" || event.buttons() == 0 {
                    return;
                }
                let mut app = app.borrow_mut();
                let rect = app.canvas.get_bounding_client_rect();
                let x = event.client_x() as f64 - rect.left();
                app.session.push_intent(Intent::MoveTo(x as f32));
            });
            let _ = canvas.add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            app.borrow_mut().session.resize(viewport());
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        {
            let mut app = app.borrow_mut();

            let dt = if app.last_time > 0.0 {
                (time - app.last_time) / 1000.0
            } else {
                0.0
            };
            app.last_time = time;

            app.session.advance(dt);
            for event in app.session.drain_events() {
                log::debug!("{:?}", event);
            }
            app.sync_canvas();
            app.render();
            app.update_hud();

            if let Some(score) = app.session.pending_name_request() {
                if !app.name_prompt_open {
                    app.open_name_prompt(score);
                }
            }
        }

        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    if let Err(e) = wasm_game::run().await {
        log::error!("Dodgefall failed to start: {:?}", e);
        web_sys::console::error_1(&e);
    }
}

/// Seconds of simulated play the headless demo allows before giving up
#[cfg(not(target_arch = "wasm32"))]
const DEMO_LIMIT_SECS: u32 = 600;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use dodgefall::leaderboard::Leaderboard;
    use dodgefall::persistence::MemoryStore;
    use dodgefall::{Session, SessionPhase, Tuning, Variant};
    use glam::Vec2;

    env_logger::init();
    log::info!("Dodgefall (native) starting...");
    log::info!("Native mode runs a headless autopilot demo - build for wasm32 to play");

    let mut args = std::env::args().skip(1);
    let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(1);
    let variant = args
        .next()
        .and_then(|s| Variant::from_str(&s))
        .unwrap_or_default();

    let mut store = MemoryStore::new();
    if let Err(e) = Leaderboard::seed_if_missing(&mut store) {
        log::warn!("Could not seed leaderboard: {}", e);
    }

    let mut session = Session::new(
        Tuning::from_variant(variant),
        Box::new(store),
        Vec2::new(1280.0, 720.0),
        seed,
    );
    session.set_autopilot(true);
    session.start();

    let frame = 1.0 / 60.0;
    let frames = DEMO_LIMIT_SECS as u64 * 60;
    for _ in 0..frames {
        session.advance(frame);
        session.drain_events();
        if session.phase() != SessionPhase::Running {
            break;
        }
    }

    let score = match session.phase() {
        SessionPhase::GameOver { final_score } => final_score,
        _ => {
            let score = session.snapshot().map(|s| s.display_score).unwrap_or(0);
            println!("Autopilot survived the full {} s demo", DEMO_LIMIT_SECS);
            session.exit();
            score
        }
    };
    println!("Seed {} ({}) scored {}", seed, variant.as_str(), score);

    if session.pending_name_request().is_some() {
        session.submit_name(Some("Autopilot"));
    }
    for (i, entry) in session.leaderboard().entries().iter().enumerate() {
        println!("{:>2}. {:<12} {}", i + 1, entry.name, entry.score);
    }
    if let Some(best) = session.leaderboard().top_score() {
        println!("Best: {}", best);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
