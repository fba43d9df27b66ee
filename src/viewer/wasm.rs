//! Browser binding: `GridView`, exported to JavaScript.
//!
//! ```javascript
//! import init, { GridView } from 'powergrid';
//! await init();
//! const view = new GridView(JSON.stringify(viewModel), (kind, payload) => {
//!     // kind: "begin" (frame params), "cell" (one cell record), "end"
//! });
//! view.on_scroll((x, y) => { scroller.scrollLeft = x; scroller.scrollTop = y; });
//! scroller.addEventListener('wheel', e => view.wheel(e.deltaX, e.deltaY));
//! // ...
//! view.destroy();
//! ```
//!
//! Callbacks run while the view is borrowed; they must not call back into
//! the same `GridView` synchronously.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Function;
use serde::Serialize;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use super::{FrameHandle, PowerGrid};
use crate::error::{GridError, Result};
use crate::render::{CellRenderData, CellRenderer, FrameParams};
use crate::types::{GridViewModel, Position};

type Content = serde_json::Value;
type FrameClosure = Closure<dyn FnMut(f64)>;

pub(crate) fn now_ms() -> f64 {
    if let Some(window) = web_sys::window() {
        if let Some(perf) = window.performance() {
            return perf.now();
        }
    }
    js_sys::Date::now()
}

fn request_frame(callback: &FrameClosure) -> Option<FrameHandle> {
    web_sys::window()?
        .request_animation_frame(callback.as_ref().unchecked_ref())
        .ok()
}

fn to_js<S: Serialize>(value: &S) -> Result<JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| GridError::Renderer(e.to_string()))
}

/// Forwards every frame to a JS function `(kind, payload)`.
struct JsRenderer {
    callback: Function,
}

impl JsRenderer {
    fn call(&self, kind: &str, payload: &JsValue) -> Result<()> {
        self.callback
            .call2(&JsValue::NULL, &JsValue::from_str(kind), payload)
            .map(|_| ())
            .map_err(|e| GridError::Renderer(format!("{e:?}")))
    }
}

impl CellRenderer<Content> for JsRenderer {
    fn begin_frame(&mut self, params: &FrameParams) -> Result<()> {
        self.call("begin", &to_js(params)?)
    }

    fn render_cell(&mut self, cell: &CellRenderData<'_, Content>) -> Result<()> {
        self.call("cell", &to_js(cell)?)
    }

    fn end_frame(&mut self) -> Result<()> {
        self.call("end", &JsValue::UNDEFINED)
    }
}

struct SharedState {
    grid: PowerGrid<Content>,
    renderer: JsRenderer,
}

/// A grid driven by `requestAnimationFrame`, drawing through a JS function
#[wasm_bindgen]
pub struct GridView {
    state: Rc<RefCell<SharedState>>,
    frame_closure: Rc<RefCell<Option<FrameClosure>>>,
}

#[wasm_bindgen]
impl GridView {
    /// Create a view from a JSON view model and start its frame loop
    #[wasm_bindgen(constructor)]
    pub fn new(view_model_json: &str, renderer: Function) -> std::result::Result<GridView, JsValue> {
        console_error_panic_hook::set_once();

        let model = GridViewModel::<Content>::from_json(view_model_json)?;
        let mut grid = PowerGrid::new(model)?;
        grid.attach();

        let view = GridView {
            state: Rc::new(RefCell::new(SharedState {
                grid,
                renderer: JsRenderer { callback: renderer },
            })),
            frame_closure: Rc::new(RefCell::new(None)),
        };
        view.start_loop();
        Ok(view)
    }

    fn start_loop(&self) {
        let state = Rc::clone(&self.state);
        let slot = Rc::clone(&self.frame_closure);
        let closure = Closure::wrap(Box::new(move |timestamp: f64| {
            let Ok(mut guard) = state.try_borrow_mut() else {
                return;
            };
            let SharedState { grid, renderer } = &mut *guard;
            if !grid.is_attached() {
                return;
            }
            grid.tick(timestamp, renderer);
            if let Some(handle) = slot.borrow().as_ref().and_then(request_frame) {
                grid.cadence_mut().schedule(handle);
            }
        }) as Box<dyn FnMut(f64)>);

        if let Some(handle) = request_frame(&closure) {
            self.state.borrow_mut().grid.cadence_mut().schedule(handle);
        }
        *self.frame_closure.borrow_mut() = Some(closure);
    }

    /// Stop the frame loop and release its closure
    pub fn destroy(&mut self) {
        let pending = self.state.borrow_mut().grid.detach();
        if let (Some(handle), Some(window)) = (pending, web_sys::window()) {
            let _ = window.cancel_animation_frame(handle);
        }
        self.frame_closure.borrow_mut().take();
    }

    /// Apply a wheel delta. Returns true if the offset moved, so the host
    /// can suppress the browser's default scroll.
    pub fn wheel(&self, delta_x: f32, delta_y: f32) -> bool {
        self.state
            .borrow_mut()
            .grid
            .wheel(delta_x, delta_y, now_ms())
            .is_some()
    }

    /// Scroll to an absolute offset (e.g. from a native scroll surface)
    pub fn scroll_to(&self, x: f32, y: f32) -> bool {
        self.state
            .borrow_mut()
            .grid
            .scroll_to(Position::new(x, y), now_ms())
            .is_some()
    }

    pub fn click(&self, row: u32, col: u32) -> bool {
        self.state.borrow_mut().grid.click(row, col)
    }

    /// Register `(x, y) => void`, called with every committed offset
    pub fn on_scroll(&self, callback: Function) {
        self.state.borrow_mut().grid.on_scroll(move |p| {
            let _ = callback.call2(&JsValue::NULL, &p.x.into(), &p.y.into());
        });
    }

    /// Register `(row, col) => void` for cell clicks
    pub fn on_cell_click(&self, callback: Function) {
        self.state.borrow_mut().grid.on_cell_click(move |coord| {
            let _ = callback.call2(&JsValue::NULL, &coord.row.into(), &coord.col.into());
        });
    }

    pub fn set_view_model(&self, view_model_json: &str) -> std::result::Result<(), JsValue> {
        let model = GridViewModel::<Content>::from_json(view_model_json)?;
        self.state.borrow_mut().grid.set_view_model(model)?;
        Ok(())
    }

    pub fn remove_row(&self, row: u32) -> std::result::Result<(), JsValue> {
        self.state.borrow_mut().grid.remove_row(row)?;
        Ok(())
    }

    pub fn scroll_x(&self) -> f32 {
        self.state.borrow().grid.scroll_offset().x
    }

    pub fn scroll_y(&self) -> f32 {
        self.state.borrow().grid.scroll_offset().y
    }

    /// Content width the host's scroll spacer should span
    pub fn inner_width(&self) -> f32 {
        self.state.borrow().grid.metrics().inner_width()
    }

    pub fn inner_height(&self) -> f32 {
        self.state.borrow().grid.metrics().inner_height()
    }
}
