//! Input dispatch
//!
//! Raw pointer, key, and resize events come in from an [`EventSource`],
//! pointer coordinates are converted from page space to surface space, and
//! everything is forwarded to the current observer stage. While a button is
//! held, a repeating timer fires the observer's held-down handler.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};

use crate::error::PodiumError;
use crate::point::Point;
use crate::stage::StageRef;
use crate::timer::{IntervalHandle, Scheduler};

/// Mouse button state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MouseStatus {
    #[default]
    Up,
    Down,
}

/// A pointer event in page space, with the surface's page offset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    pub page: Point,
    pub surface_offset: Point,
}

impl PointerInput {
    pub fn new(page: Point, surface_offset: Point) -> Self {
        Self { page, surface_offset }
    }

    /// Position relative to the surface's top-left corner
    pub fn surface_point(&self) -> Point {
        self.page - self.surface_offset
    }
}

/// A key-down event, forwarded unchanged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInput {
    pub key: String,
    pub code: u32,
}

/// A window resize event, forwarded unchanged
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeInput {
    pub width: f64,
    pub height: f64,
}

/// Detaches listeners when cancelled or dropped.
pub struct Subscription {
    detach: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(detach: impl FnOnce() + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    /// A subscription with nothing to detach
    pub fn empty() -> Self {
        Self { detach: None }
    }

    pub fn is_active(&self) -> bool {
        self.detach.is_some()
    }

    pub fn cancel(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Where raw input comes from. Attaching wires the source's listeners to the
/// dispatcher until the returned subscription is cancelled.
pub trait EventSource {
    fn attach(&self, dispatcher: &Rc<InputDispatcher>) -> Result<Subscription, PodiumError>;
}

/// Event source with no listeners; the caller feeds the dispatcher directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessEvents;

impl EventSource for HeadlessEvents {
    fn attach(&self, _dispatcher: &Rc<InputDispatcher>) -> Result<Subscription, PodiumError> {
        Ok(Subscription::empty())
    }
}

/// Normalizes raw input and forwards it to a single observer stage.
///
/// The observer can be swapped at any time. Nothing in flight is handed over:
/// a running held-down repeat simply reaches whichever observer is current
/// when it fires.
pub struct InputDispatcher {
    observer: RefCell<Option<StageRef>>,
    status: Cell<MouseStatus>,
    last_point: Cell<Point>,
    pressed_at: Cell<Option<f64>>,
    held_timer: Cell<Option<IntervalHandle>>,
    held_interval_ms: u32,
    scheduler: Rc<dyn Scheduler>,
}

impl InputDispatcher {
    pub fn new(
        observer: Option<StageRef>,
        scheduler: Rc<dyn Scheduler>,
        held_interval_ms: u32,
    ) -> Rc<Self> {
        Rc::new(Self {
            observer: RefCell::new(observer),
            status: Cell::new(MouseStatus::Up),
            last_point: Cell::new(Point::ORIGIN),
            pressed_at: Cell::new(None),
            held_timer: Cell::new(None),
            held_interval_ms,
            scheduler,
        })
    }

    pub fn set_observer(&self, observer: StageRef) {
        *self.observer.borrow_mut() = Some(observer);
    }

    pub fn clear_observer(&self) {
        *self.observer.borrow_mut() = None;
    }

    pub fn has_observer(&self) -> bool {
        self.observer.borrow().is_some()
    }

    pub fn status(&self) -> MouseStatus {
        self.status.get()
    }

    /// Last normalized pointer position seen
    pub fn last_point(&self) -> Point {
        self.last_point.get()
    }

    /// Timestamp (ms) of the current press, if the button is down
    pub fn pressed_at(&self) -> Option<f64> {
        self.pressed_at.get()
    }

    pub fn is_repeating(&self) -> bool {
        self.held_timer.get().is_some()
    }

    fn observer(&self) -> Option<StageRef> {
        let observer = self.observer.borrow().clone();
        if observer.is_none() {
            log::debug!("No observer bound, dropping event");
        }
        observer
    }

    pub fn pointer_down(self: &Rc<Self>, event: PointerInput) {
        let point = event.surface_point();
        log::debug!("Pointer down at ({}, {})", point.x, point.y);

        self.status.set(MouseStatus::Down);
        self.pressed_at.set(Some(self.scheduler.now_ms()));
        self.last_point.set(point);

        // A press without a matching release must not leave a second repeat running
        self.cancel_held_timer();
        let weak: Weak<Self> = Rc::downgrade(self);
        let repeat = self.scheduler.set_interval(
            self.held_interval_ms,
            Box::new(move || {
                if let Some(dispatcher) = weak.upgrade() {
                    dispatcher.held_down();
                }
            }),
        );
        match repeat {
            Ok(handle) => self.held_timer.set(Some(handle)),
            Err(e) => log::warn!("Could not start held-down repeat: {}", e),
        }

        if let Some(observer) = self.observer() {
            observer.borrow_mut().on_mouse_down(point);
        }
    }

    /// One firing of the held-down repeat
    pub fn held_down(&self) {
        if self.status.get() != MouseStatus::Down {
            return;
        }
        if let Some(observer) = self.observer() {
            observer.borrow_mut().on_mouse_held_down();
        }
    }

    pub fn pointer_up(&self, event: PointerInput) {
        let point = event.surface_point();
        log::debug!("Pointer up at ({}, {})", point.x, point.y);

        self.status.set(MouseStatus::Up);
        self.pressed_at.set(None);
        self.last_point.set(point);
        self.cancel_held_timer();

        if let Some(observer) = self.observer() {
            observer.borrow_mut().on_mouse_up(point);
        }
    }

    pub fn pointer_move(&self, event: PointerInput) {
        let point = event.surface_point();
        log::debug!("Pointer move to ({}, {})", point.x, point.y);

        self.last_point.set(point);
        if let Some(observer) = self.observer() {
            observer.borrow_mut().on_mouse_move(point);
        }
    }

    pub fn key_down(&self, event: &KeyInput) {
        log::debug!("Key down: {} ({})", event.key, event.code);
        if let Some(observer) = self.observer() {
            observer.borrow_mut().on_key_press(event);
        }
    }

    pub fn window_resize(&self, event: &ResizeInput) {
        log::debug!("Window resized to {}x{}", event.width, event.height);
        if let Some(observer) = self.observer() {
            observer.borrow_mut().on_window_resize(event);
        }
    }

    /// Stop any held-down repeat and forget the press. Used on teardown.
    pub fn release(&self) {
        self.status.set(MouseStatus::Up);
        self.pressed_at.set(None);
        self.cancel_held_timer();
    }

    fn cancel_held_timer(&self) {
        if let Some(handle) = self.held_timer.take() {
            self.scheduler.clear_interval(handle);
        }
    }
}

impl Drop for InputDispatcher {
    fn drop(&mut self) {
        self.cancel_held_timer();
    }
}
