//! Main game loop
//!
//! Owns the surface, renderer, input dispatcher, and stage list. A fixed
//! interval on the scheduler drives each tick; the active stage is both the
//! stage being rendered and the dispatcher's observer.

pub mod fps;

pub use fps::{FpsCounter, calculate_fps, sample_seconds};

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};

use crate::error::PodiumError;
use crate::input::{EventSource, InputDispatcher, Subscription};
use crate::renderer::Renderer;
use crate::settings::Settings;
use crate::stage::StageRef;
use crate::surface::Surface;
use crate::timer::{IntervalHandle, Scheduler};

/// Loop lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    /// Constructed, first stage not yet active
    Load,
    /// Ticking and rendering
    Play,
    /// Ticks are skipped
    Pause,
}

/// Build mode; debug adds the FPS overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Release,
    #[default]
    Debug,
}

pub struct GameLoop {
    state: GameState,
    mode: GameMode,
    surface: Box<dyn Surface>,
    renderer: Renderer,
    dispatcher: Rc<InputDispatcher>,
    subscription: Subscription,
    stages: Vec<StageRef>,
    stage_index: usize,
    fps: FpsCounter,
    frames: u64,
    tick_interval_ms: u32,
    interval: Option<IntervalHandle>,
    scheduler: Rc<dyn Scheduler>,
}

impl GameLoop {
    /// Build the loop, attach input, start ticking, and enter stage 0.
    ///
    /// The returned handle is the only strong reference; the tick callback
    /// holds a weak one, so dropping the handle stops the loop.
    pub fn start(
        settings: &Settings,
        surface: Box<dyn Surface>,
        stages: Vec<StageRef>,
        scheduler: Rc<dyn Scheduler>,
        events: &dyn EventSource,
    ) -> Result<Rc<RefCell<Self>>, PodiumError> {
        settings.validate()?;
        let first = stages.first().cloned().ok_or(PodiumError::NoStages)?;

        let dispatcher = InputDispatcher::new(
            Some(first),
            Rc::clone(&scheduler),
            settings.held_down_interval_ms,
        );
        let subscription = events.attach(&dispatcher)?;

        let game = Rc::new(RefCell::new(Self {
            state: GameState::Load,
            mode: settings.mode,
            surface,
            renderer: Renderer::new(),
            dispatcher,
            subscription,
            stages,
            stage_index: 0,
            fps: FpsCounter::new(),
            frames: 0,
            tick_interval_ms: settings.tick_interval_ms,
            interval: None,
            scheduler,
        }));

        Self::start_loop(&game)?;

        {
            let mut g = game.borrow_mut();
            g.go_to_stage(0)?;
            g.state = GameState::Play;
        }

        Ok(game)
    }

    fn start_loop(game: &Rc<RefCell<Self>>) -> Result<(), PodiumError> {
        let (scheduler, period) = {
            let g = game.borrow();
            (Rc::clone(&g.scheduler), g.tick_interval_ms)
        };
        log::info!("Initiating the main game loop ({}ms ticks)", period);

        let weak: Weak<RefCell<Self>> = Rc::downgrade(game);
        let handle = scheduler.set_interval(
            period,
            Box::new(move || {
                if let Some(game) = weak.upgrade() {
                    game.borrow_mut().tick();
                }
            }),
        )?;
        game.borrow_mut().interval = Some(handle);
        Ok(())
    }

    /// One pass of the loop
    pub fn tick(&mut self) {
        if self.state == GameState::Pause {
            return;
        }

        if self.mode == GameMode::Debug {
            let now = sample_seconds(self.scheduler.now_ms());
            if !self.fps.sample(now) {
                return;
            }
        }

        let stage = Rc::clone(&self.stages[self.stage_index]);
        self.renderer.render_frame(
            self.mode,
            self.surface.as_mut(),
            &mut *stage.borrow_mut(),
            self.fps.fps(),
        );
        self.frames += 1;
    }

    /// Activate a stage: it becomes both the rendered stage and the input observer
    pub fn go_to_stage(&mut self, index: usize) -> Result<(), PodiumError> {
        let stage = self
            .stages
            .get(index)
            .cloned()
            .ok_or(PodiumError::InvalidStageIndex {
                index,
                count: self.stages.len(),
            })?;

        self.stage_index = index;
        self.dispatcher.set_observer(stage);
        log::info!("Entered stage {} ({})", index, self.stages[index].borrow().name());
        Ok(())
    }

    pub fn next_stage(&mut self) -> Result<(), PodiumError> {
        self.go_to_stage(self.stage_index + 1)
    }

    /// Replace the stage list and enter its first stage
    pub fn set_stages(&mut self, stages: Vec<StageRef>) -> Result<(), PodiumError> {
        if stages.is_empty() {
            return Err(PodiumError::NoStages);
        }
        self.stages = stages;
        self.go_to_stage(0)
    }

    pub fn pause(&mut self) {
        if self.state == GameState::Play {
            self.state = GameState::Pause;
            log::info!("Game paused");
        }
    }

    pub fn resume(&mut self) {
        if self.state == GameState::Pause && self.interval.is_some() {
            // The pause gap would otherwise show up as one very long frame
            self.fps.reset();
            self.state = GameState::Play;
            log::info!("Game resumed");
        }
    }

    /// Stop ticking, stop any held-down repeat, and detach input listeners.
    /// Safe to call more than once.
    pub fn shutdown(&mut self) {
        if let Some(handle) = self.interval.take() {
            self.scheduler.clear_interval(handle);
            log::info!("Main game loop stopped after {} frames", self.frames);
        }
        self.dispatcher.release();
        self.dispatcher.clear_observer();
        self.subscription.cancel();
        self.state = GameState::Pause;
    }

    pub fn is_running(&self) -> bool {
        self.interval.is_some()
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn fps(&self) -> Option<u32> {
        self.fps.fps()
    }

    /// Frames rendered so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn stage_index(&self) -> usize {
        self.stage_index
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn dispatcher(&self) -> &Rc<InputDispatcher> {
        &self.dispatcher
    }
}

impl Drop for GameLoop {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{PARTICLES_PER_CLICK, PARTICLES_PER_HOLD};
    use crate::input::{HeadlessEvents, PointerInput};
    use crate::point::Point;
    use crate::stage::{BasicStage, Opening, stage_ref};
    use crate::surface::{DrawCommand, RecordingSurface};
    use crate::timer::ManualScheduler;

    struct Harness {
        scheduler: Rc<ManualScheduler>,
        surface: RecordingSurface,
        game: Rc<RefCell<GameLoop>>,
    }

    fn start(settings: Settings, stages: Vec<StageRef>) -> Harness {
        let scheduler = Rc::new(ManualScheduler::new());
        let surface = RecordingSurface::new();
        let game = GameLoop::start(
            &settings,
            Box::new(surface.clone()),
            stages,
            scheduler.clone() as Rc<dyn Scheduler>,
            &HeadlessEvents,
        )
        .unwrap();
        Harness { scheduler, surface, game }
    }

    fn release_settings() -> Settings {
        Settings {
            mode: GameMode::Release,
            ..Settings::default()
        }
    }

    fn click(game: &Rc<RefCell<GameLoop>>, x: f64, y: f64) {
        let dispatcher = Rc::clone(game.borrow().dispatcher());
        dispatcher.pointer_down(PointerInput::new(Point::new(x, y), Point::ORIGIN));
        dispatcher.pointer_up(PointerInput::new(Point::new(x, y), Point::ORIGIN));
    }

    #[test]
    fn test_start_enters_first_stage() {
        let h = start(Settings::default(), vec![stage_ref(BasicStage::new())]);
        let g = h.game.borrow();
        assert_eq!(g.state(), GameState::Play);
        assert_eq!(g.stage_index(), 0);
        assert!(g.is_running());
        assert!(g.dispatcher().has_observer());
    }

    #[test]
    fn test_start_requires_stages() {
        let scheduler = Rc::new(ManualScheduler::new());
        let result = GameLoop::start(
            &Settings::default(),
            Box::new(RecordingSurface::new()),
            Vec::new(),
            scheduler.clone() as Rc<dyn Scheduler>,
            &HeadlessEvents,
        );
        assert!(matches!(result, Err(PodiumError::NoStages)));
        assert_eq!(scheduler.active_intervals(), 0);
    }

    #[test]
    fn test_release_mode_renders_every_tick_without_overlay() {
        let h = start(release_settings(), vec![stage_ref(BasicStage::new())]);
        h.scheduler.advance(100.0);
        assert_eq!(h.game.borrow().frames(), 4);
        assert_eq!(h.surface.clear_count(), 4);
        assert!(h.game.borrow().fps().is_none());
        assert!(h.surface.current_frame().is_empty());
    }

    #[test]
    fn test_debug_mode_skips_first_tick_then_shows_fps() {
        let h = start(Settings::default(), vec![stage_ref(BasicStage::new())]);

        h.scheduler.advance(25.0);
        assert_eq!(h.game.borrow().frames(), 0);
        assert_eq!(h.surface.clear_count(), 0);

        h.scheduler.advance(25.0);
        assert_eq!(h.game.borrow().fps(), Some(40));
        assert_eq!(
            h.surface.current_frame(),
            [DrawCommand::FillText {
                text: "FPS:40".to_string(),
                x: 10.0,
                y: 15.0
            }]
        );
    }

    #[test]
    fn test_clicks_render_particles() {
        let opening = Rc::new(RefCell::new(Opening::new(11)));
        let h = start(release_settings(), vec![opening.clone() as StageRef]);

        click(&h.game, 100.0, 100.0);
        click(&h.game, 300.0, 200.0);
        h.scheduler.advance(25.0);

        assert_eq!(opening.borrow().drawable_count(), 2 * PARTICLES_PER_CLICK);
        assert_eq!(h.surface.current_frame().len(), 2 * PARTICLES_PER_CLICK);
    }

    #[test]
    fn test_hold_spawns_while_down_only() {
        let opening = Rc::new(RefCell::new(Opening::new(12)));
        let h = start(release_settings(), vec![opening.clone() as StageRef]);
        let dispatcher = Rc::clone(h.game.borrow().dispatcher());
        let at = PointerInput::new(Point::new(50.0, 50.0), Point::ORIGIN);

        dispatcher.pointer_down(at);
        h.scheduler.advance(1200.0);
        assert_eq!(
            opening.borrow().drawable_count(),
            PARTICLES_PER_CLICK + 2 * PARTICLES_PER_HOLD
        );

        dispatcher.pointer_up(at);
        h.scheduler.advance(3000.0);
        assert_eq!(
            opening.borrow().drawable_count(),
            PARTICLES_PER_CLICK + 2 * PARTICLES_PER_HOLD
        );
    }

    #[test]
    fn test_stage_navigation() {
        let first = Rc::new(RefCell::new(Opening::new(1)));
        let second = Rc::new(RefCell::new(Opening::new(2)));
        let h = start(release_settings(), vec![first.clone() as StageRef, second.clone() as StageRef]);

        h.game.borrow_mut().next_stage().unwrap();
        assert_eq!(h.game.borrow().stage_index(), 1);
        click(&h.game, 5.0, 5.0);
        assert_eq!(first.borrow().drawable_count(), 0);
        assert_eq!(second.borrow().drawable_count(), PARTICLES_PER_CLICK);

        let err = h.game.borrow_mut().next_stage().unwrap_err();
        assert!(matches!(err, PodiumError::InvalidStageIndex { index: 2, count: 2 }));
        assert_eq!(h.game.borrow().stage_index(), 1);

        let err = h.game.borrow_mut().go_to_stage(7).unwrap_err();
        assert!(matches!(err, PodiumError::InvalidStageIndex { index: 7, count: 2 }));

        h.game.borrow_mut().go_to_stage(0).unwrap();
        click(&h.game, 5.0, 5.0);
        assert_eq!(first.borrow().drawable_count(), PARTICLES_PER_CLICK);
    }

    #[test]
    fn test_set_stages_resets_to_first() {
        let h = start(
            release_settings(),
            vec![stage_ref(BasicStage::new()), stage_ref(BasicStage::new())],
        );
        h.game.borrow_mut().go_to_stage(1).unwrap();

        let replacement = Rc::new(RefCell::new(Opening::new(3)));
        h.game.borrow_mut().set_stages(vec![replacement.clone() as StageRef]).unwrap();
        assert_eq!(h.game.borrow().stage_index(), 0);
        assert_eq!(h.game.borrow().stage_count(), 1);

        click(&h.game, 1.0, 1.0);
        assert_eq!(replacement.borrow().drawable_count(), PARTICLES_PER_CLICK);

        let err = h.game.borrow_mut().set_stages(Vec::new()).unwrap_err();
        assert!(matches!(err, PodiumError::NoStages));
    }

    #[test]
    fn test_pause_skips_ticks_and_resume_resets_fps_baseline() {
        let h = start(Settings::default(), vec![stage_ref(BasicStage::new())]);
        h.scheduler.advance(50.0);
        assert_eq!(h.game.borrow().frames(), 1);

        h.game.borrow_mut().pause();
        h.scheduler.advance(1000.0);
        assert_eq!(h.game.borrow().frames(), 1);
        assert_eq!(h.game.borrow().state(), GameState::Pause);

        h.game.borrow_mut().resume();
        h.scheduler.advance(25.0);
        // First tick after resume only re-establishes the baseline
        assert_eq!(h.game.borrow().frames(), 1);
        assert_eq!(h.game.borrow().fps(), None);
        h.scheduler.advance(25.0);
        assert_eq!(h.game.borrow().frames(), 2);
        assert_eq!(h.game.borrow().fps(), Some(40));
    }

    #[test]
    fn test_shutdown_cancels_everything() {
        let opening = Rc::new(RefCell::new(Opening::new(4)));
        let h = start(release_settings(), vec![opening.clone() as StageRef]);
        let dispatcher = Rc::clone(h.game.borrow().dispatcher());
        dispatcher.pointer_down(PointerInput::new(Point::ORIGIN, Point::ORIGIN));
        assert_eq!(h.scheduler.active_intervals(), 2);

        h.game.borrow_mut().shutdown();
        h.game.borrow_mut().shutdown();
        assert_eq!(h.scheduler.active_intervals(), 0);
        assert!(!h.game.borrow().is_running());

        // Late input goes nowhere
        dispatcher.pointer_down(PointerInput::new(Point::ORIGIN, Point::ORIGIN));
        assert_eq!(opening.borrow().drawable_count(), PARTICLES_PER_CLICK);

        h.game.borrow_mut().resume();
        assert_eq!(h.game.borrow().state(), GameState::Pause);
    }

    #[test]
    fn test_dropping_loop_stops_ticks() {
        let h = start(release_settings(), vec![stage_ref(BasicStage::new())]);
        let Harness { scheduler, game, .. } = h;
        drop(game);
        assert_eq!(scheduler.active_intervals(), 0);
        scheduler.advance(100.0);
    }
}
