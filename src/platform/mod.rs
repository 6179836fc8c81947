//! Platform abstraction layer
//!
//! Browser glue kept out of the simulation:
//! - Canvas sizing from the window
//! - Event listeners that unregister themselves when dropped

use crate::consts::CANVAS_HEIGHT_INSET;
use crate::sim::Viewport;

/// Canvas size for a window's inner size, trimmed so no scrollbar appears
pub fn canvas_viewport(inner_width: f64, inner_height: f64) -> Viewport {
    Viewport::new(
        inner_width.max(1.0) as f32,
        (inner_height as f32 - CANVAS_HEIGHT_INSET).max(1.0),
    )
}

/// Zoom steps for one wheel event: -1 in, +1 out, 0 when the wheel did not move vertically
pub fn wheel_notch(delta_y: f64) -> i32 {
    if delta_y > 0.0 {
        1
    } else if delta_y < 0.0 {
        -1
    } else {
        0
    }
}

/// A page going into the back/forward cache may come back, so it keeps its session
pub fn pagehide_ends_session(persisted: bool) -> bool {
    !persisted
}

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{Event, EventTarget};

    use crate::sim::Viewport;

    /// A registered DOM event listener. Dropping it removes the listener.
    pub struct Listener {
        target: EventTarget,
        event: &'static str,
        callback: Closure<dyn FnMut(Event)>,
    }

    impl Listener {
        pub fn new<F>(target: &EventTarget, event: &'static str, handler: F) -> Result<Self, JsValue>
        where
            F: FnMut(Event) + 'static,
        {
            let callback = Closure::<dyn FnMut(Event)>::new(handler);
            target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
            Ok(Self {
                target: target.clone(),
                event,
                callback,
            })
        }
    }

    impl Drop for Listener {
        fn drop(&mut self) {
            let _ = self
                .target
                .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
        }
    }

    /// Current canvas size for the browser window
    pub fn window_viewport(window: &web_sys::Window) -> Viewport {
        let width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(1.0);
        let height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(1.0);
        super::canvas_viewport(width, height)
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::{Listener, window_viewport};
