use riftbound_core::{PlaySurfaceRect, PointerPosition};
use wasm_bindgen::JsCast;
use web_sys::{DomRect, Element, Event, MouseEvent, Touch, TouchEvent};

const TILE: &str = ".player-tile";
const DRAG_HANDLE: &str = ".tile-centre";
/// Controls inside the handle that keep their own press behaviour.
const HANDLE_CONTROLS: &str = "input, button";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TouchPhase {
    /// touchstart and touchmove: read the fingers still down.
    Active,
    /// touchend and touchcancel: the lifted finger only shows up in
    /// `changedTouches`.
    Lifted,
}

pub(crate) fn mouse_pointer(event: &MouseEvent) -> PointerPosition {
    PointerPosition::new(event.client_x() as f64, event.client_y() as f64)
}

pub(crate) fn touch_pointer(event: &TouchEvent, phase: TouchPhase) -> Option<PointerPosition> {
    let touches = match phase {
        TouchPhase::Active => event.touches(),
        TouchPhase::Lifted => event.changed_touches(),
    };
    touches.get(0).map(|touch: Touch| {
        PointerPosition::new(touch.client_x() as f64, touch.client_y() as f64)
    })
}

pub(crate) fn surface_rect(rect: &DomRect) -> PlaySurfaceRect {
    PlaySurfaceRect::new(rect.left(), rect.top(), rect.width(), rect.height())
}

pub(crate) fn element_surface(element: &Element) -> PlaySurfaceRect {
    surface_rect(&element.get_bounding_client_rect())
}

/// Top-left corner of an element in viewport coordinates.
pub(crate) fn element_origin(element: &Element) -> (f64, f64) {
    let rect = element.get_bounding_client_rect();
    (rect.left(), rect.top())
}

fn event_element(event: &Event) -> Option<Element> {
    event.target().and_then(|target| target.dyn_into::<Element>().ok())
}

/// Tile the event landed in. Yew delegates listeners to its root, so
/// `current_target` is not the element the handler sits on.
pub(crate) fn tile_of(event: &Event) -> Option<Element> {
    event_element(event).and_then(|element| element.closest(TILE).ok().flatten())
}

pub(crate) fn starts_drag(target: &Element) -> bool {
    let on_handle = matches!(target.closest(DRAG_HANDLE), Ok(Some(_)));
    let on_control = matches!(target.closest(HANDLE_CONTROLS), Ok(Some(_)));
    on_handle && !on_control
}

/// Needs a non-passive listener; otherwise the browser follows the touch
/// with compatibility mouse events and a second drag starts.
pub(crate) fn guard_touch_start(event: &Event) {
    if event_element(event).is_some_and(|target| starts_drag(&target)) {
        event.prevent_default();
    }
}
