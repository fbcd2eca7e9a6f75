//! Spacewar! entry point
//!
//! In the browser this wires keyboard and pointer events into the simulation
//! and runs a fixed-rate loop on animation frames. Natively it runs a headless
//! duel between two simple autopilots and logs the results.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent};

    use glam::Vec2;
    use spacewar::Tuning;
    use spacewar::consts::{MAX_SUBSTEPS, WORLD_SIZE};
    use spacewar::renderer::{Canvas, RenderState, VertexCanvas, draw_frame};
    use spacewar::sim::{SimulationState, tick};

    /// Game instance holding all state
    struct Game {
        state: SimulationState,
        render_state: Option<RenderState>,
        canvas: VertexCanvas,
        /// Seconds of simulation owed
        accumulator: f32,
        last_time: f64,
        tick_seconds: f32,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            let constants = Tuning::default().derive();
            let tick_seconds = constants.tick_ms / 1000.0;
            Self {
                state: SimulationState::new(constants, seed),
                render_state: None,
                canvas: VertexCanvas::new(),
                accumulator: 0.0,
                last_time: 0.0,
                tick_seconds,
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32) {
            let dt = dt.min(0.25);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= self.tick_seconds && substeps < MAX_SUBSTEPS {
                tick(&mut self.state);
                self.accumulator -= self.tick_seconds;
                substeps += 1;
            }
            // Drop time we could not catch up on rather than spiral
            if substeps == MAX_SUBSTEPS {
                self.accumulator = self.accumulator.min(self.tick_seconds);
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            draw_frame(&self.state, &mut self.canvas);
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(self.canvas.vertices()) {
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
            self.canvas.clear();
        }
    }

    /// Map a client-space point to world units, matching the letterboxed square
    fn client_to_world(canvas: &HtmlCanvasElement, client_x: f64, client_y: f64) -> Vec2 {
        let rect = canvas.get_bounding_client_rect();
        let side = rect.width().min(rect.height()).max(1.0);
        let left = rect.left() + (rect.width() - side) / 2.0;
        let top = rect.top() + (rect.height() - side) / 2.0;
        Vec2::new(
            ((client_x - left) / side) as f32 * WORLD_SIZE,
            ((client_y - top) / side) as f32 * WORLD_SIZE,
        )
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Spacewar! starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));
        log::info!("Game initialized with seed: {}", seed);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(surface, &adapter, width, height)
            .await
            .expect("Failed to create device");
        game.borrow_mut().render_state = Some(render_state);

        setup_input_handlers(&canvas, game.clone());

        request_animation_frame(game);

        log::info!("Spacewar! running - wedge: w a s d, needle: i j k l, click for light pen");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");

        // Control keys are level-triggered; only the held state is recorded
        for (event_name, down) in [("keydown", true), ("keyup", false)] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                if g.state.controls.set_key(&event.key(), down) {
                    event.prevent_default();
                }
            });
            let _ = window
                .add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Releasing keys while unfocused would otherwise leave them stuck
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().state.controls.release_all();
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer position in world units
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let pos = client_to_world(
                    &canvas_clone,
                    event.client_x() as f64,
                    event.client_y() as f64,
                );
                game.borrow_mut().state.controls.pointer_moved(pos);
            });
            let _ = window
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Click toggles the light pen
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                g.state.controls.toggle_light_pen();
                let cursor = if g.state.controls.light_pen { "none" } else { "pointer" };
                let _ = canvas_clone.style().set_property("cursor", cursor);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
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
        {
            let mut g = game.borrow_mut();

            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                g.tick_seconds
            };
            g.last_time = time;

            g.update(dt);
            g.render();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use spacewar::consts::CENTER;
    use spacewar::sim::{Control, Maneuver, RoundOutcome, Side, SimulationState, tick};
    use spacewar::{heading, torus_delta};

    /// Distance from the sun below which the autopilot burns outward
    const SUN_ALERT: f32 = 150.0;
    /// Fire when the opponent is within this many radians of the nose
    const FIRING_CONE: f32 = 0.15;

    /// Hold the controls a crude pilot would: face the enemy, shoot, and
    /// thrust away from the sun when it gets close
    fn autopilot(state: &mut SimulationState, side: Side) {
        let me = state.craft(side).clone();
        let enemy = state.craft(side.opponent()).pos;

        let to_enemy = torus_delta(me.pos, enemy);
        let nose = heading(me.angle);
        let off = nose.perp_dot(to_enemy).atan2(nose.dot(to_enemy));

        let sun = torus_delta(me.pos, CENTER);
        let near_sun = SimulationState::distance_to_center(me.pos) < SUN_ALERT;

        let controls = &mut state.controls;
        let set = |controls: &mut spacewar::sim::ControlState, m, on: bool| {
            let c = Control::new(side, m);
            if on { controls.press(c) } else { controls.release(c) }
        };
        set(controls, Maneuver::TurnLeft, off < -FIRING_CONE / 2.0);
        set(controls, Maneuver::TurnRight, off > FIRING_CONE / 2.0);
        set(controls, Maneuver::Fire, off.abs() < FIRING_CONE);
        set(controls, Maneuver::Thrust, near_sun && nose.dot(sun) < 0.0);
    }

    pub fn run(tuning: spacewar::Tuning, ticks: u64, seed: u64) {
        let constants = tuning.derive();
        log::info!(
            "Headless duel: {} ticks at {} fps, seed {}, {} layout",
            ticks,
            constants.fps,
            seed,
            constants.start_layout.as_str()
        );
        log::info!(
            "Projectiles live {} ms ({} ticks), reload {} ms ({} ticks)",
            constants.projectile_lifetime_ms,
            constants.projectile_lifetime_ticks,
            constants.reload_delay_ms,
            constants.reload_delay_ticks
        );
        let mut state = SimulationState::new(constants, seed);

        let mut tally = [0u32; 3];
        let mut last = RoundOutcome::Undecided;
        for _ in 0..ticks {
            for side in Side::BOTH {
                autopilot(&mut state, side);
            }
            tick(&mut state);

            // Count a round when its outcome is reset away
            let now = state.round.outcome;
            if last.is_decided() && !now.is_decided() {
                match last {
                    RoundOutcome::WedgeWins => tally[0] += 1,
                    RoundOutcome::NeedleWins => tally[1] += 1,
                    _ => tally[2] += 1,
                }
            }
            last = now;
        }

        log::info!(
            "Finished after {} rounds: wedge {}, needle {}, ties {}",
            state.round.number,
            tally[0],
            tally[1],
            tally[2]
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Spacewar! (native) starting...");
    log::info!("Native mode runs a headless duel - build for wasm32 to play");

    // spacewar [tuning.json] [ticks] [seed] [layout]
    let mut args = std::env::args().skip(1);
    let mut tuning = match args.next() {
        Some(path) if path != "-" => spacewar::Tuning::load(path),
        _ => spacewar::Tuning::default(),
    };
    let ticks = args.next().and_then(|s| s.parse().ok()).unwrap_or(6000);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(1962);
    if let Some(name) = args.next() {
        match spacewar::StartLayout::parse(&name) {
            Some(layout) => tuning.start_layout = layout,
            None => log::warn!("Unknown start layout '{}', keeping {}", name, tuning.start_layout.as_str()),
        }
    }

    headless::run(tuning, ticks, seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
