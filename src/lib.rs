//! Podium - a small 2D canvas game engine
//!
//! Core modules:
//! - `game`: Fixed-interval loop, stage switching, FPS sampling
//! - `stage`: Stages (input observers) and their drawable lists
//! - `input`: Event normalization and forwarding, held-down repeat
//! - `renderer`: Per-tick frame drawing
//! - `surface`: 2D drawing surface abstraction
//! - `timer`: Interval scheduling (browser or virtual time)
//! - `platform`: Browser canvas bindings (wasm32 only)

pub mod error;
pub mod game;
pub mod input;
pub mod particle;
pub mod platform;
pub mod point;
pub mod renderer;
pub mod settings;
pub mod stage;
pub mod surface;
pub mod timer;

pub use error::PodiumError;
pub use game::{GameLoop, GameMode, GameState};
pub use input::{InputDispatcher, MouseStatus};
pub use point::Point;
pub use settings::{QualityPreset, Settings};
pub use stage::{Opening, Stage, StageRef};

/// Engine configuration constants
pub mod consts {
    /// Render loop period (ms)
    pub const TICK_INTERVAL_MS: u32 = 25;
    /// Held-down repeat period (ms)
    pub const HELD_DOWN_INTERVAL_MS: u32 = 500;

    /// Particles spawned at the click point
    pub const PARTICLES_PER_CLICK: usize = 5;
    /// Particles spawned per held-down firing
    pub const PARTICLES_PER_HOLD: usize = 100;

    /// Debug overlay text position
    pub const FPS_OVERLAY_X: f64 = 10.0;
    pub const FPS_OVERLAY_Y: f64 = 15.0;
}
