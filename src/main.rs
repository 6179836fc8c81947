//! Turkey Sling entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::fmt;
    use std::rc::{Rc, Weak};

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, PageTransitionEvent, PointerEvent, WheelEvent};

    use turkey_sling::Tuning;
    use turkey_sling::consts::*;
    use turkey_sling::physics::RapierWorld;
    use turkey_sling::platform::{Listener, pagehide_ends_session, wheel_notch, window_viewport};
    use turkey_sling::renderer::{RenderState, game_vertices};
    use turkey_sling::sim::{Game, TickInput, Viewport, tick};

    /// Id of the element the canvas is mounted into
    const MOUNT_ID: &str = "game";

    // Owns the running app; callbacks only hold weak references
    thread_local! {
        static SESSION: RefCell<Option<Rc<RefCell<App>>>> = const { RefCell::new(None) };
    }

    #[derive(Debug)]
    pub enum SetupError {
        NoWindow,
        Dom(String),
        Surface(wgpu::CreateSurfaceError),
        Adapter(wgpu::RequestAdapterError),
        Device(wgpu::RequestDeviceError),
    }

    impl fmt::Display for SetupError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                SetupError::NoWindow => write!(f, "no browser window"),
                SetupError::Dom(msg) => write!(f, "DOM error: {msg}"),
                SetupError::Surface(e) => write!(f, "failed to create surface: {e}"),
                SetupError::Adapter(e) => write!(f, "no GPU adapter: {e}"),
                SetupError::Device(e) => write!(f, "failed to create device: {e}"),
            }
        }
    }

    impl From<JsValue> for SetupError {
        fn from(value: JsValue) -> Self {
            SetupError::Dom(format!("{value:?}"))
        }
    }

    /// One mounted game: simulation, GPU state and the DOM hooks feeding it
    struct App {
        game: Game<RapierWorld>,
        render_state: Option<RenderState>,
        accumulator: f32,
        last_time: f64,
        input: TickInput,
        window: web_sys::Window,
        canvas: HtmlCanvasElement,
        listeners: Vec<Listener>,
        raf_id: Option<i32>,
        closed: bool,
    }

    impl App {
        /// Run simulation ticks
        fn update(&mut self, dt: f32) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                tick(&mut self.game, &self.input, SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;

                // Clear one-shot inputs after processing
                self.input.consume();
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            if let Some(ref mut render_state) = self.render_state {
                let vertices = game_vertices(&self.game);
                match render_state.render(&vertices, &self.game.camera.bounds) {
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
        }

        fn resize(&mut self, viewport: Viewport) {
            let (width, height) = size_canvas(&self.window, &self.canvas, viewport);
            if let Some(ref mut render_state) = self.render_state {
                render_state.resize(width, height);
            }
            self.game.resize(viewport);
        }

        /// Stop the loop and release everything. Safe to call twice.
        fn shutdown(&mut self) {
            if self.closed {
                return;
            }
            self.closed = true;

            if let Some(id) = self.raf_id.take() {
                let _ = self.window.cancel_animation_frame(id);
            }
            // A listener may be the caller; let its callback return before dropping it
            let listeners = std::mem::take(&mut self.listeners);
            wasm_bindgen_futures::spawn_local(async move { drop(listeners) });

            self.game.teardown();
            self.render_state = None;
            self.canvas.remove();
            log::info!("Turkey Sling stopped");
        }
    }

    impl Drop for App {
        fn drop(&mut self) {
            self.shutdown();
        }
    }

    /// Size the canvas backing store for the device pixel ratio; returns the pixel size
    fn size_canvas(window: &web_sys::Window, canvas: &HtmlCanvasElement, viewport: Viewport) -> (u32, u32) {
        let dpr = window.device_pixel_ratio();
        let width = ((viewport.width as f64 * dpr) as u32).max(1);
        let height = ((viewport.height as f64 * dpr) as u32).max(1);
        canvas.set_width(width);
        canvas.set_height(height);

        let style = canvas.style();
        let _ = style.set_property("width", &format!("{}px", viewport.width));
        let _ = style.set_property("height", &format!("{}px", viewport.height));
        let _ = style.set_property("display", "block");
        (width, height)
    }

    fn pointer_pos(event: &web_sys::Event) -> Option<Vec2> {
        let event = event.dyn_ref::<PointerEvent>()?;
        Some(Vec2::new(event.offset_x() as f32, event.offset_y() as f32))
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Turkey Sling starting...");

        match start().await {
            Ok(Some(app)) => {
                SESSION.with(|s| *s.borrow_mut() = Some(app));
                log::info!("Turkey Sling running!");
            }
            Ok(None) => {}
            Err(e) => log::error!("Startup failed: {e}"),
        }
    }

    /// Mount the game. `Ok(None)` when the page has no mount point.
    async fn start() -> Result<Option<Rc<RefCell<App>>>, SetupError> {
        let window = web_sys::window().ok_or(SetupError::NoWindow)?;
        let document = window.document().ok_or(SetupError::NoWindow)?;

        let Some(mount) = document.get_element_by_id(MOUNT_ID) else {
            log::warn!("No #{MOUNT_ID} element on the page; not starting");
            return Ok(None);
        };

        let canvas: HtmlCanvasElement = document
            .create_element("canvas")?
            .dyn_into()
            .map_err(|_| SetupError::Dom("created element is not a canvas".into()))?;
        mount.append_child(&canvas)?;
        let viewport = window_viewport(&window);
        let (width, height) = size_canvas(&window, &canvas, viewport);

        // Initialize game
        let tuning = Tuning::default();
        let seed = js_sys::Date::now() as u64;
        let physics = RapierWorld::new(&tuning);
        let game = Game::new(physics, viewport, tuning, seed);
        log::info!("Game initialized with seed: {}", seed);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(SetupError::Surface)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(SetupError::Adapter)?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(surface, &adapter, width, height)
            .await
            .map_err(SetupError::Device)?;

        let app = Rc::new(RefCell::new(App {
            game,
            render_state: Some(render_state),
            accumulator: 0.0,
            last_time: 0.0,
            input: TickInput::default(),
            window: window.clone(),
            canvas: canvas.clone(),
            listeners: Vec::new(),
            raf_id: None,
            closed: false,
        }));

        let listeners = setup_listeners(&window, &canvas, Rc::downgrade(&app))?;
        app.borrow_mut().listeners = listeners;

        request_animation_frame(&app);
        Ok(Some(app))
    }

    /// Run `f` against the app if it is still alive and running
    fn with_app(app: &Weak<RefCell<App>>, f: impl FnOnce(&mut App)) {
        if let Some(app) = app.upgrade() {
            let mut app = app.borrow_mut();
            if !app.closed {
                f(&mut app);
            }
        }
    }

    fn setup_listeners(
        window: &web_sys::Window,
        canvas: &HtmlCanvasElement,
        app: Weak<RefCell<App>>,
    ) -> Result<Vec<Listener>, JsValue> {
        let mut listeners = Vec::new();

        {
            let app = app.clone();
            listeners.push(Listener::new(canvas, "pointerdown", move |event| {
                with_app(&app, |a| {
                    a.input.pointer = pointer_pos(&event).or(a.input.pointer);
                    a.input.press = true;
                });
            })?);
        }

        {
            let app = app.clone();
            listeners.push(Listener::new(canvas, "pointermove", move |event| {
                with_app(&app, |a| a.input.pointer = pointer_pos(&event).or(a.input.pointer));
            })?);
        }

        // Leaving the canvas lets go of whatever is held
        for name in ["pointerup", "pointerleave"] {
            let app = app.clone();
            listeners.push(Listener::new(canvas, name, move |event| {
                with_app(&app, |a| {
                    a.input.pointer = pointer_pos(&event).or(a.input.pointer);
                    a.input.release = true;
                });
            })?);
        }

        {
            let app = app.clone();
            listeners.push(Listener::new(canvas, "wheel", move |event| {
                let Some(wheel) = event.dyn_ref::<WheelEvent>() else {
                    return;
                };
                let notch = wheel_notch(wheel.delta_y());
                if notch != 0 {
                    event.prevent_default();
                    with_app(&app, |a| a.input.wheel_notches += notch);
                }
            })?);
        }

        {
            let app = app.clone();
            let win = window.clone();
            listeners.push(Listener::new(window, "resize", move |_event| {
                let viewport = window_viewport(&win);
                with_app(&app, |a| a.resize(viewport));
            })?);
        }

        listeners.push(Listener::new(window, "pagehide", move |event| {
            let persisted = event
                .dyn_ref::<PageTransitionEvent>()
                .is_some_and(PageTransitionEvent::persisted);
            if pagehide_ends_session(persisted) {
                with_app(&app, App::shutdown);
            } else {
                log::info!("Page cached for back/forward navigation, keeping session");
            }
        })?);

        Ok(listeners)
    }

    fn request_animation_frame(app: &Rc<RefCell<App>>) {
        let weak = Rc::downgrade(app);
        let callback = Closure::once_into_js(move |time: f64| {
            if let Some(app) = weak.upgrade() {
                game_loop(&app, time);
            }
        });

        let mut a = app.borrow_mut();
        match a.window.request_animation_frame(callback.unchecked_ref()) {
            Ok(id) => a.raf_id = Some(id),
            Err(e) => log::error!("requestAnimationFrame failed: {e:?}"),
        }
    }

    fn game_loop(app: &Rc<RefCell<App>>, time: f64) {
        {
            let mut a = app.borrow_mut();
            a.raf_id = None;
            if a.closed {
                return;
            }

            let dt = if a.last_time > 0.0 {
                ((time - a.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            a.last_time = time;

            a.update(dt);
            a.render();
        }

        request_animation_frame(app);
    }

}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Turkey Sling (native) starting...");
    log::info!("Native mode runs a headless shot - run with `trunk serve` for the web version");

    let tuning = match std::env::args().nth(1) {
        Some(path) => match std::fs::read_to_string(&path).map_err(|e| e.to_string()).and_then(|json| {
            turkey_sling::Tuning::from_json(&json).map_err(|e| e.to_string())
        }) {
            Ok(tuning) => {
                log::info!("Loaded tuning from {path}");
                tuning
            }
            Err(e) => {
                log::error!("Bad tuning file {path}: {e}");
                std::process::exit(1);
            }
        },
        None => turkey_sling::Tuning::default(),
    };

    headless::run(tuning);
}

#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use glam::Vec2;

    use turkey_sling::Tuning;
    use turkey_sling::consts::{SIM_DT, SIM_HZ};
    use turkey_sling::physics::RapierWorld;
    use turkey_sling::sim::{Game, SlingEvent, TickInput, Viewport, tick};

    /// Give up if the turkey has not come back after this long
    const MAX_SECONDS: u32 = 60;

    /// Pull the turkey back and to the left, let go, and simulate until it respawns
    pub fn run(tuning: Tuning) {
        let physics = RapierWorld::new(&tuning);
        let mut game = Game::new(physics, Viewport::new(1280.0, 716.0), tuning, 42);

        let spawn = game.level.spawn;
        let pull = spawn + Vec2::new(-120.0, 80.0);
        let mut input = TickInput {
            pointer: Some(spawn),
            press: true,
            ..Default::default()
        };

        for step in 0..30 {
            let t = (step + 1) as f32 / 30.0;
            input.pointer = Some(spawn.lerp(pull, t));
            tick(&mut game, &input, SIM_DT);
            input.consume();
        }
        input.release = true;

        for _ in 0..MAX_SECONDS * SIM_HZ {
            for event in tick(&mut game, &input, SIM_DT) {
                log::info!("t={:.2}s {:?}", game.time_ticks as f32 * SIM_DT, event);
                if let SlingEvent::Respawned { .. } = event {
                    log::info!("Camera back at {:?}", game.camera.bounds.min);
                    game.teardown();
                    return;
                }
            }
            input.consume();
        }
        log::warn!("Turkey did not come back within {MAX_SECONDS} s");
        game.teardown();
    }
}
