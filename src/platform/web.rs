//! Browser bindings: canvas surface, interval scheduler, DOM listeners

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasGradient, CanvasRenderingContext2d, Document, Event, EventTarget, HtmlCanvasElement,
    KeyboardEvent, MouseEvent, Performance, VisibilityState, Window,
};

use crate::error::PodiumError;
use crate::game::GameLoop;
use crate::input::{EventSource, InputDispatcher, KeyInput, PointerInput, ResizeInput, Subscription};
use crate::point::Point;
use crate::settings::Settings;
use crate::surface::{Fill, RadialGradient, Rect, Surface};
use crate::timer::{IntervalHandle, Scheduler};

fn js_err(e: JsValue) -> PodiumError {
    PodiumError::Platform(format!("{:?}", e))
}

fn window() -> Result<Window, PodiumError> {
    web_sys::window().ok_or_else(|| PodiumError::Platform("no window".into()))
}

fn document() -> Result<Document, PodiumError> {
    window()?
        .document()
        .ok_or_else(|| PodiumError::Platform("no document".into()))
}

/// Look up a canvas element by id
pub fn canvas_by_id(id: &str) -> Result<HtmlCanvasElement, PodiumError> {
    document()?
        .get_element_by_id(id)
        .ok_or_else(|| PodiumError::SurfaceUnavailable(format!("no element #{id}")))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| PodiumError::SurfaceUnavailable(format!("#{id} is not a canvas")))
}

/// Settings from the canvas's `data-settings` JSON attribute, defaults if absent
pub fn settings_from_canvas(canvas: &HtmlCanvasElement) -> Result<Settings, PodiumError> {
    match canvas.get_attribute("data-settings") {
        Some(json) => Settings::from_json(&json),
        None => Ok(Settings::default()),
    }
}

/// Canvas 2D context as a [`Surface`]. Failed canvas calls are logged and dropped.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, PodiumError> {
        let ctx = canvas
            .get_context("2d")
            .map_err(js_err)?
            .ok_or_else(|| PodiumError::SurfaceUnavailable("canvas has no 2d context".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| PodiumError::SurfaceUnavailable("context is not 2d".into()))?;
        Ok(Self { canvas, ctx })
    }

    fn radial(&self, g: &RadialGradient) -> Result<CanvasGradient, JsValue> {
        let (x, y) = (g.center.x, g.center.y);
        let gradient = self.ctx.create_radial_gradient(x, y, 0.0, x, y, g.radius)?;
        gradient.add_color_stop(0.0, &g.inner.to_string())?;
        gradient.add_color_stop(1.0, &g.outer.to_string())?;
        Ok(gradient)
    }
}

impl Surface for CanvasSurface {
    fn clear(&mut self) {
        // Reassigning the width resets the backing store
        self.canvas.set_width(self.canvas.width());
    }

    fn fill_rect(&mut self, rect: Rect, fill: &Fill) {
        match fill {
            Fill::Solid(color) => self.ctx.set_fill_style_str(&color.to_string()),
            Fill::Radial(g) => match self.radial(g) {
                Ok(gradient) => self.ctx.set_fill_style_canvas_gradient(&gradient),
                Err(e) => {
                    log::warn!("Radial gradient failed: {:?}", e);
                    return;
                }
            },
        }
        self.ctx.fill_rect(rect.x, rect.y, rect.width, rect.height);
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        if let Err(e) = self.ctx.fill_text(text, x, y) {
            log::warn!("fill_text failed: {:?}", e);
        }
    }
}

/// `setInterval` scheduler with a `performance.now()` clock.
///
/// Closures live in the table until cleared, so nothing is leaked with
/// `forget`. An interval must not be cleared from inside its own callback.
pub struct BrowserScheduler {
    window: Window,
    performance: Option<Performance>,
    next_id: Cell<u64>,
    intervals: RefCell<HashMap<IntervalHandle, (i32, Closure<dyn FnMut()>)>>,
}

impl BrowserScheduler {
    pub fn new() -> Result<Self, PodiumError> {
        let window = window()?;
        let performance = window.performance();
        if performance.is_none() {
            log::warn!("performance.now() unavailable, falling back to Date.now()");
        }
        Ok(Self {
            window,
            performance,
            next_id: Cell::new(0),
            intervals: RefCell::new(HashMap::new()),
        })
    }
}

impl Scheduler for BrowserScheduler {
    fn now_ms(&self) -> f64 {
        match &self.performance {
            Some(performance) => performance.now(),
            None => js_sys::Date::now(),
        }
    }

    fn set_interval(
        &self,
        period_ms: u32,
        mut callback: Box<dyn FnMut()>,
    ) -> Result<IntervalHandle, PodiumError> {
        let closure = Closure::<dyn FnMut()>::new(move || callback());
        let timeout = i32::try_from(period_ms).unwrap_or(i32::MAX);
        let id = self
            .window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                timeout,
            )
            .map_err(js_err)?;

        let handle = IntervalHandle(self.next_id.get());
        self.next_id.set(handle.0 + 1);
        self.intervals.borrow_mut().insert(handle, (id, closure));
        Ok(handle)
    }

    fn clear_interval(&self, handle: IntervalHandle) {
        let removed = self.intervals.borrow_mut().remove(&handle);
        if let Some((id, _closure)) = removed {
            self.window.clear_interval_with_handle(id);
        }
    }
}

impl Drop for BrowserScheduler {
    fn drop(&mut self) {
        for (_, (id, _closure)) in self.intervals.get_mut().drain() {
            self.window.clear_interval_with_handle(id);
        }
    }
}

struct Listener {
    target: EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

/// Registered DOM listeners, removable as a group
#[derive(Default)]
struct Listeners(Vec<Listener>);

impl Listeners {
    fn add(
        &mut self,
        target: &EventTarget,
        kind: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<(), PodiumError> {
        let closure = Closure::<dyn FnMut(Event)>::new(handler);
        target
            .add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
            .map_err(js_err)?;
        self.0.push(Listener {
            target: target.clone(),
            kind,
            closure,
        });
        Ok(())
    }

    fn detach(self) {
        let count = self.0.len();
        for listener in self.0 {
            if let Err(e) = listener.target.remove_event_listener_with_callback(
                listener.kind,
                listener.closure.as_ref().unchecked_ref(),
            ) {
                log::warn!("Removing {} listener failed: {:?}", listener.kind, e);
            }
        }
        log::debug!("Detached {} listeners", count);
    }

    fn into_subscription(self) -> Subscription {
        Subscription::new(move || self.detach())
    }
}

/// Mouse position in page space plus the canvas's page offset
fn pointer_input(event: &Event, canvas: &HtmlCanvasElement) -> Option<PointerInput> {
    let mouse = event.dyn_ref::<MouseEvent>()?;
    let page = Point::new(f64::from(mouse.page_x()), f64::from(mouse.page_y()));
    let offset = Point::new(f64::from(canvas.offset_left()), f64::from(canvas.offset_top()));
    Some(PointerInput::new(page, offset))
}

/// Mouse events on the canvas; key-down and resize on the window
pub struct CanvasEventSource {
    canvas: HtmlCanvasElement,
    window: Window,
}

impl CanvasEventSource {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, PodiumError> {
        Ok(Self {
            canvas,
            window: window()?,
        })
    }

    fn register(
        &self,
        listeners: &mut Listeners,
        dispatcher: &Rc<InputDispatcher>,
    ) -> Result<(), PodiumError> {
        let canvas_target: &EventTarget = self.canvas.as_ref();
        let window_target: &EventTarget = self.window.as_ref();

        {
            let d = Rc::clone(dispatcher);
            let canvas = self.canvas.clone();
            listeners.add(canvas_target, "mousedown", move |event| {
                if let Some(input) = pointer_input(&event, &canvas) {
                    d.pointer_down(input);
                }
            })?;
        }

        {
            let d = Rc::clone(dispatcher);
            let canvas = self.canvas.clone();
            listeners.add(canvas_target, "mouseup", move |event| {
                if let Some(input) = pointer_input(&event, &canvas) {
                    d.pointer_up(input);
                }
            })?;
        }

        {
            let d = Rc::clone(dispatcher);
            let canvas = self.canvas.clone();
            listeners.add(canvas_target, "mousemove", move |event| {
                if let Some(input) = pointer_input(&event, &canvas) {
                    d.pointer_move(input);
                }
            })?;
        }

        {
            let d = Rc::clone(dispatcher);
            listeners.add(window_target, "keydown", move |event| {
                if let Some(key) = event.dyn_ref::<KeyboardEvent>() {
                    d.key_down(&KeyInput {
                        key: key.key(),
                        code: key.key_code(),
                    });
                }
            })?;
        }

        {
            let d = Rc::clone(dispatcher);
            let window = self.window.clone();
            listeners.add(window_target, "resize", move |_event| {
                let dimension =
                    |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
                d.window_resize(&ResizeInput {
                    width: dimension(window.inner_width()),
                    height: dimension(window.inner_height()),
                });
            })?;
        }

        Ok(())
    }
}

impl EventSource for CanvasEventSource {
    fn attach(&self, dispatcher: &Rc<InputDispatcher>) -> Result<Subscription, PodiumError> {
        let mut listeners = Listeners::default();
        if let Err(e) = self.register(&mut listeners, dispatcher) {
            listeners.detach();
            return Err(e);
        }
        log::debug!("Attached {} input listeners", listeners.0.len());
        Ok(listeners.into_subscription())
    }
}

/// Pause the loop while the page is hidden, resume when it is shown again
pub fn pause_when_hidden(game: &Rc<RefCell<GameLoop>>) -> Result<Subscription, PodiumError> {
    let document = document()?;
    let target: EventTarget = document.clone().into();
    let weak = Rc::downgrade(game);

    let mut listeners = Listeners::default();
    listeners.add(&target, "visibilitychange", move |_event| {
        let Some(game) = weak.upgrade() else { return };
        let Ok(mut g) = game.try_borrow_mut() else {
            log::warn!("Game busy, ignoring visibility change");
            return;
        };
        if document.visibility_state() == VisibilityState::Hidden {
            g.pause();
        } else {
            g.resume();
        }
    })?;
    Ok(listeners.into_subscription())
}
