//! Dancing Line entry point
//!
//! Handles platform-specific initialization and runs the game loop. On the
//! web the page supplies the renderer (`window.dancingLineHost`); natively a
//! headless autopilot plays the built-in levels.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::{JsFuture, spawn_local};

    use dancing_line::assets::LoadJob;
    use dancing_line::audio::{AudioManager, SoundEffect};
    use dancing_line::consts::*;
    use dancing_line::sim::{
        GameEvent, GameState, Handle, Level, Piece, RunState, Scene, Spawn, TickInput, Visual,
        next_level, tick,
    };
    use dancing_line::{AssetLoadFailure, Settings};

    // Bridge to the page's renderer
    #[wasm_bindgen(inline_js = "
        function host() {
            return window.dancingLineHost;
        }

        export function scene_place(code, x, y, z) {
            const h = host();
            return h ? h.place(code, x, y, z) : 0;
        }

        export function scene_remove(handle) {
            const h = host();
            if (h) h.remove(handle);
        }

        export function scene_set_scale(handle, scale) {
            const h = host();
            if (h && h.setScale) h.setScale(handle, scale);
        }

        export function scene_follow(x, y, z) {
            const h = host();
            if (h && h.follow) h.follow(x, y, z);
        }

        export function load_model(name, x, y, z) {
            const h = host();
            if (!h || !h.loadModel) {
                return Promise.reject(new Error('host cannot load models'));
            }
            return h.loadModel(name, x, y, z);
        }
    ")]
    extern "C" {
        fn scene_place(code: u32, x: f32, y: f32, z: f32) -> u32;
        fn scene_remove(handle: u32);
        fn scene_set_scale(handle: u32, scale: f32);
        fn scene_follow(x: f32, y: f32, z: f32);
        fn load_model(name: &str, x: f32, y: f32, z: f32) -> js_sys::Promise;
    }

    /// Scene living in the host page
    struct JsScene;

    impl Scene for JsScene {
        fn place(&mut self, piece: Piece, pos: glam::Vec3) -> Handle {
            Handle(scene_place(piece.code(), pos.x, pos.y, pos.z))
        }

        fn remove(&mut self, handle: Handle) {
            scene_remove(handle.0);
        }
    }

    /// Game instance holding all state
    struct Game {
        state: GameState,
        scene: JsScene,
        audio: AudioManager,
        settings: Settings,
        accumulator: f32,
        last_time: f64,
        input: TickInput,
        next_level_requested: bool,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn new(level: Level, settings: Settings, seed: u64) -> Self {
            let mut scene = JsScene;
            let state = GameState::new(level, settings.tuning(), seed, &mut scene);
            let mut audio = AudioManager::new();
            audio.set_master_volume(settings.master_volume);
            audio.set_sfx_volume(settings.sfx_volume);
            Self {
                state,
                scene,
                audio,
                settings,
                accumulator: 0.0,
                last_time: 0.0,
                input: TickInput::default(),
                next_level_requested: false,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32, time: f64) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                tick(&mut self.state, &self.input, SIM_DT, &mut self.scene);
                self.accumulator -= SIM_DT;
                substeps += 1;

                // Every input is one-shot
                self.input = TickInput::default();
            }

            if std::mem::take(&mut self.next_level_requested) {
                next_level(&mut self.state, &mut self.scene);
            }

            for event in self.state.drain_events() {
                if let Some(effect) = SoundEffect::for_event(&event) {
                    self.audio.play(effect);
                }
                if let GameEvent::RunFailed { reason, score } = event {
                    log::info!("Run over ({}), score {}", reason.as_str(), score);
                }
            }

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;

            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }
        }

        /// Push per-frame presentation state to the host
        fn present(&self) {
            let pos = self.state.cursor.pos;
            scene_follow(pos.x, pos.y, pos.z);
            for obstacle in &self.state.obstacles {
                if let Some(Visual::Model(handle)) = obstacle.visual {
                    scene_set_scale(handle.0, obstacle.scale());
                }
            }
        }

        fn status_text(&self) -> String {
            if self.state.paused {
                return "Paused".to_string();
            }
            match self.state.run {
                RunState::Advancing => String::new(),
                RunState::AwaitingTurn => "Turn!".to_string(),
                RunState::Failed(reason) => format!("{} Press W to retry", reason.as_str()),
                RunState::Completed => "Level complete! N for the next level, W to replay".to_string(),
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            if let Some(el) = document.query_selector("#hud-score .hud-value").ok().flatten() {
                el.set_text_content(Some(&self.state.score.to_string()));
            }

            if let Some(el) = document.query_selector("#hud-level .hud-value").ok().flatten() {
                el.set_text_content(Some(&self.state.level_number.to_string()));
            }

            if let Some(el) = document.get_element_by_id("hud-fps") {
                if self.settings.show_fps {
                    let _ = el.set_attribute("class", "hud-item");
                    if let Some(val) = document.query_selector("#hud-fps .hud-value").ok().flatten() {
                        val.set_text_content(Some(&self.fps.to_string()));
                    }
                } else {
                    let _ = el.set_attribute("class", "hud-item hidden");
                }
            }

            if let Some(el) = document.get_element_by_id("status") {
                el.set_text_content(Some(&self.status_text()));
            }
        }

        /// Whether an automatic pause makes sense right now
        fn can_auto_pause(&self) -> bool {
            !self.state.paused && !self.state.run.is_terminal()
        }
    }

    /// Start a model load; the outcome goes back through the asset queue
    fn start_load(game: Rc<RefCell<Game>>, job: LoadJob<Spawn>) {
        spawn_local(async move {
            let pos = job.payload.pos();
            let promise = load_model(&job.model, pos.x, pos.y, pos.z);
            let result = match JsFuture::from(promise).await {
                Ok(value) => value.as_f64().map(|h| Handle(h as u32)).ok_or_else(|| {
                    AssetLoadFailure {
                        model: job.model.clone(),
                        reason: "host returned no handle".to_string(),
                    }
                }),
                Err(err) => Err(AssetLoadFailure {
                    model: job.model.clone(),
                    reason: format!("{err:?}"),
                }),
            };

            let mut g = game.borrow_mut();
            let accepted = g.state.assets.resolve(job.ticket, result.clone());
            // Loads dropped by a reset still put a model in the host scene
            if let (false, Ok(handle)) = (accepted, result) {
                g.scene.remove(handle);
            }
        });
    }

    fn level_from_location(seed: u64) -> Level {
        let hash = web_sys::window()
            .and_then(|w| w.location().hash().ok())
            .unwrap_or_default();
        if hash == "#terrain" {
            log::info!("Using generated terrain");
            Level::demo_terrain(seed, TURN_MIN_ANGLE_DEG)
        } else {
            Level::default_road(TURN_MIN_ANGLE_DEG)
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Failed to init logger: {e}").into());
        }

        log::info!("Dancing Line starting...");

        let Some(window) = web_sys::window() else {
            log::error!("No window");
            return;
        };
        let Some(document) = window.document() else {
            log::error!("No document");
            return;
        };

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let settings = Settings::load();
        let seed = js_sys::Date::now() as u64;
        let level = level_from_location(seed);
        let game = Rc::new(RefCell::new(Game::new(level, settings, seed)));

        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(game.clone());
        setup_auto_pause(game.clone());

        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        // Start game loop
        request_animation_frame(game);

        log::info!("Dancing Line running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
            let mut g = game.borrow_mut();
            g.audio.resume();
            match event.key().as_str() {
                " " | "Enter" => {
                    event.prevent_default();
                    g.input.turn = true;
                }
                "a" | "A" | "d" | "D" | "ArrowLeft" | "ArrowRight" => g.input.steer = true,
                "w" | "W" | "r" | "R" => g.input.reset = true,
                "p" | "P" | "Escape" => g.input.pause = true,
                "n" | "N" => g.next_level_requested = true,
                _ => {}
            }
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        let jobs = {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt, time);
            g.present();
            g.update_hud();
            g.state.assets.take_unstarted()
        };

        for job in jobs {
            start_load(game.clone(), job);
        }

        request_animation_frame(game);
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
                    if g.can_auto_pause() {
                        g.input.pause = true;
                        log::info!("Auto-paused (tab hidden)");
                    }
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.can_auto_pause() {
                    g.input.pause = true;
                    log::info!("Auto-paused (window blur)");
                }
                if g.settings.mute_on_blur {
                    g.audio.set_muted(true);
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Unmute on focus
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().audio.set_muted(false);
            });
            let _ = window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use dancing_line::Settings;
    use dancing_line::consts::TURN_MIN_ANGLE_DEG;
    use dancing_line::sim::Level;

    env_logger::init();
    log::info!("Dancing Line (native) starting...");
    log::info!("Rendering requires the web build - running the headless autopilot");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);
    let tuning = Settings::load().tuning();

    for (name, level) in [
        ("road", Level::default_road(TURN_MIN_ANGLE_DEG)),
        ("terrain", Level::demo_terrain(seed, TURN_MIN_ANGLE_DEG)),
    ] {
        autopilot(name, level, tuning, seed);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Play a level with perfect timing; models load instantly
#[cfg(not(target_arch = "wasm32"))]
fn autopilot(name: &str, level: dancing_line::sim::Level, tuning: dancing_line::sim::Tuning, seed: u64) {
    use dancing_line::consts::SIM_DT;
    use dancing_line::sim::{GameState, HeadlessScene, RunState, TickInput, tick};

    const MAX_TICKS: u32 = 60 * 60 * 10;

    let mut scene = HeadlessScene::new();
    let mut state = GameState::new(level, tuning, seed, &mut scene);
    let mut ticks = 0;
    let mut turns = 0;

    while !state.run.is_terminal() && ticks < MAX_TICKS {
        state.assets.resolve_all_with(|_| Ok(scene.issue()));
        let input = TickInput {
            turn: state.run == RunState::AwaitingTurn,
            ..Default::default()
        };
        turns += input.turn as u32;
        tick(&mut state, &input, SIM_DT, &mut scene);
        for event in state.drain_events() {
            log::debug!("{event:?}");
        }
        ticks += 1;
    }

    println!(
        "{name}: {:?} after {:.1}s, {} turns, score {}, {} trail cubes, {} obstacles",
        state.run,
        ticks as f32 * SIM_DT,
        turns,
        state.score,
        state.trail.len(),
        state.obstacles.len()
    );
}
