//! Podium entry point
//!
//! On wasm32 this boots the engine on the page's `#canvas` element. Natively
//! it runs a scripted headless session against virtual time.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use podium::input::Subscription;
    use podium::platform::web::{
        BrowserScheduler, CanvasEventSource, CanvasSurface, canvas_by_id, pause_when_hidden,
        settings_from_canvas,
    };
    use podium::stage::stage_ref;
    use podium::timer::Scheduler;
    use podium::{GameLoop, GameMode, Opening, PodiumError};

    /// Everything that must outlive `run`
    struct Running {
        game: Rc<RefCell<GameLoop>>,
        _visibility: Subscription,
    }

    thread_local! {
        static RUNNING: RefCell<Option<Running>> = const { RefCell::new(None) };
    }

    fn launch() -> Result<Running, PodiumError> {
        let canvas = canvas_by_id("canvas")?;
        let settings = settings_from_canvas(&canvas)?;

        let level = match settings.mode {
            GameMode::Debug => log::Level::Debug,
            GameMode::Release => log::Level::Info,
        };
        if console_log::init_with_level(level).is_err() {
            log::warn!("Logger already initialized");
        }

        let seed = settings.seed.unwrap_or_else(|| js_sys::Date::now() as u64);
        log::info!("Podium starting with seed: {}", seed);

        let stages = vec![stage_ref(Opening::with_limit(seed, settings.max_drawables()))];
        let events = CanvasEventSource::new(canvas.clone())?;
        let surface = CanvasSurface::new(canvas)?;
        let scheduler: Rc<dyn Scheduler> = Rc::new(BrowserScheduler::new()?);

        let game = GameLoop::start(&settings, Box::new(surface), stages, scheduler, &events)?;
        let visibility = pause_when_hidden(&game)?;

        Ok(Running {
            game,
            _visibility: visibility,
        })
    }

    pub fn run() {
        console_error_panic_hook::set_once();

        match launch() {
            Ok(running) => {
                RUNNING.with(|r| *r.borrow_mut() = Some(running));
                log::info!("Podium running!");
            }
            Err(e) => {
                web_sys::console::error_1(&format!("Podium failed to start: {e}").into());
            }
        }
    }

    /// Tear the engine down: stops timers and removes every listener
    pub fn stop() {
        let running = RUNNING.with(|r| r.borrow_mut().take());
        if let Some(running) = running {
            running.game.borrow_mut().shutdown();
            log::info!("Podium stopped");
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn stop() {
    wasm_game::stop();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Podium (native) starting...");
    log::info!("Native mode runs headless - serve the wasm build for the canvas version");

    if let Err(e) = headless_session() {
        log::error!("Headless session failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Click, drag with the button held, release, and report what was drawn
#[cfg(not(target_arch = "wasm32"))]
fn headless_session() -> Result<(), podium::PodiumError> {
    use std::cell::RefCell;
    use std::rc::Rc;

    use podium::input::{HeadlessEvents, PointerInput};
    use podium::surface::RecordingSurface;
    use podium::timer::{ManualScheduler, Scheduler};
    use podium::{GameLoop, Opening, Point, Settings, StageRef};

    let settings = Settings {
        seed: Some(2012),
        ..Settings::default()
    };
    let scheduler = Rc::new(ManualScheduler::new());
    let surface = RecordingSurface::new();
    let opening = Rc::new(RefCell::new(Opening::with_limit(
        settings.seed.unwrap_or_default(),
        settings.max_drawables(),
    )));

    let game = GameLoop::start(
        &settings,
        Box::new(surface.clone()),
        vec![opening.clone() as StageRef],
        scheduler.clone() as Rc<dyn Scheduler>,
        &HeadlessEvents,
    )?;
    let dispatcher = Rc::clone(game.borrow().dispatcher());
    let offset = Point::new(8.0, 8.0);

    dispatcher.pointer_down(PointerInput::new(Point::new(120.0, 90.0), offset));
    scheduler.advance(250.0);
    for step in 0..10 {
        let x = 120.0 + f64::from(step) * 15.0;
        dispatcher.pointer_move(PointerInput::new(Point::new(x, 90.0), offset));
        scheduler.advance(100.0);
    }
    dispatcher.pointer_up(PointerInput::new(Point::new(270.0, 90.0), offset));
    scheduler.advance(1000.0);

    {
        let g = game.borrow();
        log::info!(
            "{} frames rendered, last fps {:?}, {} drawables on stage",
            g.frames(),
            g.fps(),
            opening.borrow().drawable_count()
        );
    }
    log::info!("Last frame issued {} draw calls", surface.current_frame().len());

    game.borrow_mut().shutdown();
    Ok(())
}
