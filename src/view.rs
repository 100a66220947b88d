//! Loaded views and their optional capability tables.
//!
//! A view implements any subset of a fixed set of operations. Every call
//! site goes through the safe wrappers here, which substitute a documented
//! neutral result when a capability is absent; a missing slot is never an
//! error.

use std::any::Any;

use egui::{Key, Modifiers};

use crate::accel::{AccelBinding, Hotkey};
use crate::overlay::Surface;

/// The view never appears in switchers or accelerator listings.
pub const VIEW_FLAG_HIDDEN: u32 = 1;

/// One scroll axis: position, lower bound, extent and viewport size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollAxis {
    pub pos: f32,
    pub lower: f32,
    pub size: f32,
    pub viewport_size: f32,
}

impl Default for ScrollAxis {
    fn default() -> Self {
        Self {
            pos: 0.0,
            lower: 0.0,
            size: 1.0,
            viewport_size: 1.0,
        }
    }
}

/// Mutable per-view state owned by the manager and handed to every
/// capability invocation as its first argument.
pub struct ViewState {
    /// Stable short name, derived from the library file name.
    pub module_name: String,
    pub width: i32,
    pub height: i32,
    pub hscroll: ScrollAxis,
    pub vscroll: ScrollAxis,
    /// Private slot owned exclusively by the view implementation.
    pub data: Option<Box<dyn Any>>,
}

impl ViewState {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            // non-insane defaults before the first configure
            width: 100,
            height: 100,
            hscroll: ScrollAxis::default(),
            vscroll: ScrollAxis::default(),
            data: None,
        }
    }
}

/// A pointer gesture a view responds to, for the accelerator listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseGesture {
    Left,
    Right,
    Middle,
    Scroll,
    DoubleLeft,
    DoubleRight,
    DragDrop,
    LeftDrag,
    RightDrag,
}

impl std::fmt::Display for MouseGesture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            MouseGesture::Left => "left click",
            MouseGesture::Right => "right click",
            MouseGesture::Middle => "middle click",
            MouseGesture::Scroll => "scroll",
            MouseGesture::DoubleLeft => "left double-click",
            MouseGesture::DoubleRight => "right double-click",
            MouseGesture::DragDrop => "drag and drop",
            MouseGesture::LeftDrag => "left click+drag",
            MouseGesture::RightDrag => "right click+drag",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone)]
pub struct MouseAction {
    pub gesture: MouseGesture,
    pub hotkey: Option<Hotkey>,
    pub name: String,
}

impl MouseAction {
    /// Human-readable "Ctrl+left click" style label.
    pub fn label(&self) -> String {
        match &self.hotkey {
            Some(hk) => format!("{hk}+{}", self.gesture),
            None => self.gesture.to_string(),
        }
    }
}

pub type NameFn = Box<dyn Fn(&ViewState) -> String>;
pub type FlagsFn = Box<dyn Fn(&ViewState) -> u32>;
pub type LifecycleFn = Box<dyn Fn(&mut ViewState)>;
pub type TryEnterFn = Box<dyn Fn(&mut ViewState) -> i32>;
pub type ExposeFn = Box<dyn Fn(&mut ViewState, &mut Surface, i32, i32, f32, f32)>;
pub type MouseMovedFn = Box<dyn Fn(&mut ViewState, f64, f64, f64, i32) -> bool>;
pub type ButtonPressedFn = Box<dyn Fn(&mut ViewState, f64, f64, f64, i32, i32, u32) -> bool>;
pub type ButtonReleasedFn = Box<dyn Fn(&mut ViewState, f64, f64, i32, u32) -> bool>;
pub type KeyFn = Box<dyn Fn(&mut ViewState, Key, Modifiers) -> bool>;
pub type ConfigureFn = Box<dyn Fn(&mut ViewState, i32, i32)>;
pub type ScrolledFn = Box<dyn Fn(&mut ViewState, f64, f64, i32, u32)>;
pub type ScrollbarChangedFn = Box<dyn Fn(&mut ViewState, f64, f64)>;
pub type ConnectAccelsFn = Box<dyn Fn(&mut ViewState) -> Vec<AccelBinding>>;
pub type MouseActionsFn = Box<dyn Fn(&ViewState) -> Vec<MouseAction>>;

/// Fixed enumeration of the optional operations a view may implement. Each
/// slot is independently present or absent.
#[derive(Default)]
pub struct CapabilityTable {
    pub name: Option<NameFn>,
    pub flags: Option<FlagsFn>,
    pub init: Option<LifecycleFn>,
    pub gui_init: Option<LifecycleFn>,
    pub cleanup: Option<LifecycleFn>,
    pub expose: Option<ExposeFn>,
    pub try_enter: Option<TryEnterFn>,
    pub enter: Option<LifecycleFn>,
    pub leave: Option<LifecycleFn>,
    pub reset: Option<LifecycleFn>,
    pub mouse_enter: Option<LifecycleFn>,
    pub mouse_leave: Option<LifecycleFn>,
    pub mouse_moved: Option<MouseMovedFn>,
    pub button_pressed: Option<ButtonPressedFn>,
    pub button_released: Option<ButtonReleasedFn>,
    pub key_pressed: Option<KeyFn>,
    pub key_released: Option<KeyFn>,
    pub configure: Option<ConfigureFn>,
    pub scrolled: Option<ScrolledFn>,
    pub scrollbar_changed: Option<ScrollbarChangedFn>,
    pub init_key_accels: Option<LifecycleFn>,
    pub connect_key_accels: Option<ConnectAccelsFn>,
    pub mouse_actions: Option<MouseActionsFn>,
}

/// A loaded view: state, capability table, its current accelerator bindings
/// and, for dynamically loaded views, the library handle keeping the
/// capability code alive.
pub struct View {
    pub state: ViewState,
    pub caps: CapabilityTable,
    pub accel_bindings: Vec<AccelBinding>,
    pub(crate) library: Option<libloading::Library>,
}

impl View {
    pub fn new(module_name: impl Into<String>, caps: CapabilityTable) -> Self {
        Self {
            state: ViewState::new(module_name),
            caps,
            accel_bindings: Vec::new(),
            library: None,
        }
    }

    pub fn module_name(&self) -> &str {
        &self.state.module_name
    }

    /// Human-readable (possibly localized) name; falls back to the module
    /// name when the capability is absent.
    pub fn name(&self) -> String {
        match &self.caps.name {
            Some(f) => f(&self.state),
            None => self.state.module_name.clone(),
        }
    }

    pub fn flags(&self) -> u32 {
        self.caps.flags.as_ref().map_or(0, |f| f(&self.state))
    }

    pub fn init(&mut self) {
        if let Some(f) = &self.caps.init {
            f(&mut self.state);
        }
    }

    pub fn gui_init(&mut self) {
        if let Some(f) = &self.caps.gui_init {
            f(&mut self.state);
        }
    }

    /// Entry guard: non-zero vetoes the switch. Absent guard admits.
    pub fn try_enter(&mut self) -> i32 {
        match &self.caps.try_enter {
            Some(f) => f(&mut self.state),
            None => 0,
        }
    }

    pub fn enter(&mut self) {
        if let Some(f) = &self.caps.enter {
            f(&mut self.state);
        }
    }

    pub fn leave(&mut self) {
        if let Some(f) = &self.caps.leave {
            f(&mut self.state);
        }
    }

    pub fn reset(&mut self) {
        if let Some(f) = &self.caps.reset {
            f(&mut self.state);
        }
    }

    pub fn expose(&mut self, surface: &mut Surface, width: i32, height: i32, px: f32, py: f32) {
        if let Some(f) = &self.caps.expose {
            f(&mut self.state, surface, width, height, px, py);
        }
    }

    pub fn has_expose(&self) -> bool {
        self.caps.expose.is_some()
    }

    pub fn mouse_enter(&mut self) {
        if let Some(f) = &self.caps.mouse_enter {
            f(&mut self.state);
        }
    }

    pub fn mouse_leave(&mut self) {
        if let Some(f) = &self.caps.mouse_leave {
            f(&mut self.state);
        }
    }

    pub fn mouse_moved(&mut self, x: f64, y: f64, pressure: f64, which: i32) -> bool {
        match &self.caps.mouse_moved {
            Some(f) => f(&mut self.state, x, y, pressure, which),
            None => false,
        }
    }

    pub fn button_pressed(
        &mut self,
        x: f64,
        y: f64,
        pressure: f64,
        which: i32,
        kind: i32,
        state: u32,
    ) -> bool {
        match &self.caps.button_pressed {
            Some(f) => f(&mut self.state, x, y, pressure, which, kind, state),
            None => false,
        }
    }

    pub fn button_released(&mut self, x: f64, y: f64, which: i32, state: u32) -> bool {
        match &self.caps.button_released {
            Some(f) => f(&mut self.state, x, y, which, state),
            None => false,
        }
    }

    pub fn key_pressed(&mut self, key: Key, modifiers: Modifiers) -> bool {
        match &self.caps.key_pressed {
            Some(f) => f(&mut self.state, key, modifiers),
            None => false,
        }
    }

    pub fn key_released(&mut self, key: Key, modifiers: Modifiers) -> bool {
        match &self.caps.key_released {
            Some(f) => f(&mut self.state, key, modifiers),
            None => false,
        }
    }

    /// Geometry broadcast; inactive views track it too so they can activate
    /// instantly.
    pub fn configure(&mut self, width: i32, height: i32) {
        self.state.width = width;
        self.state.height = height;
        if let Some(f) = &self.caps.configure {
            f(&mut self.state, width, height);
        }
    }

    pub fn scrolled(&mut self, x: f64, y: f64, up: i32, state: u32) {
        if let Some(f) = &self.caps.scrolled {
            f(&mut self.state, x, y, up, state);
        }
    }

    pub fn scrollbar_changed(&mut self, x: f64, y: f64) {
        if let Some(f) = &self.caps.scrollbar_changed {
            f(&mut self.state, x, y);
        }
    }

    pub fn init_key_accels(&mut self) {
        if let Some(f) = &self.caps.init_key_accels {
            f(&mut self.state);
        }
    }

    /// Rebuilds this view's accelerator bindings from scratch.
    pub fn connect_key_accels(&mut self) {
        self.accel_bindings = match &self.caps.connect_key_accels {
            Some(f) => f(&mut self.state),
            None => Vec::new(),
        };
    }

    pub fn disconnect_accels(&mut self) {
        self.accel_bindings.clear();
    }

    pub fn mouse_actions(&self) -> Vec<MouseAction> {
        self.caps
            .mouse_actions
            .as_ref()
            .map_or_else(Vec::new, |f| f(&self.state))
    }

    /// Update the scroll state; returns true when anything changed so the
    /// caller can redraw the scrollbars. Eight floats, matching the external
    /// scrollbar widget's model.
    #[allow(clippy::too_many_arguments)]
    pub fn set_scrollbar(
        &mut self,
        hpos: f32,
        hlower: f32,
        hsize: f32,
        hwinsize: f32,
        vpos: f32,
        vlower: f32,
        vsize: f32,
        vwinsize: f32,
    ) -> bool {
        let h = ScrollAxis {
            pos: hpos,
            lower: hlower,
            size: hsize,
            viewport_size: hwinsize,
        };
        let v = ScrollAxis {
            pos: vpos,
            lower: vlower,
            size: vsize,
            viewport_size: vwinsize,
        };
        if self.state.hscroll == h && self.state.vscroll == v {
            return false;
        }
        self.state.hscroll = h;
        self.state.vscroll = v;
        true
    }
}

impl Drop for View {
    fn drop(&mut self) {
        // Unload must be safe even if init never ran to completion: the
        // cleanup hook goes first, then the bindings, then the binary.
        if let Some(f) = self.caps.cleanup.take() {
            f(&mut self.state);
        }
        self.accel_bindings.clear();
        if let Some(lib) = self.library.take() {
            drop(lib);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn absent_capabilities_are_neutral() {
        let mut view = View::new("browser", CapabilityTable::default());
        assert_eq!(view.name(), "browser");
        assert_eq!(view.flags(), 0);
        assert_eq!(view.try_enter(), 0);
        assert!(!view.mouse_moved(1.0, 1.0, 0.0, 1));
        assert!(!view.button_pressed(1.0, 1.0, 0.0, 1, 0, 0));
        assert!(!view.key_pressed(Key::A, Modifiers::NONE));
        view.enter();
        view.leave();
        view.reset();
    }

    #[test]
    fn name_capability_overrides_module_name() {
        let caps = CapabilityTable {
            name: Some(Box::new(|_| "Grid browser".to_string())),
            ..Default::default()
        };
        let view = View::new("browser", caps);
        assert_eq!(view.name(), "Grid browser");
        assert_eq!(view.module_name(), "browser");
    }

    #[test]
    fn set_scrollbar_detects_changes() {
        let mut view = View::new("browser", CapabilityTable::default());
        assert!(view.set_scrollbar(0.0, 0.0, 2.0, 1.0, 0.0, 0.0, 2.0, 1.0));
        // identical values: no change, no redraw
        assert!(!view.set_scrollbar(0.0, 0.0, 2.0, 1.0, 0.0, 0.0, 2.0, 1.0));
        assert!(view.set_scrollbar(0.5, 0.0, 2.0, 1.0, 0.0, 0.0, 2.0, 1.0));
    }

    #[test]
    fn drop_runs_cleanup_once() {
        let cleaned = Arc::new(AtomicUsize::new(0));
        let c = cleaned.clone();
        let caps = CapabilityTable {
            cleanup: Some(Box::new(move |_| {
                c.fetch_add(1, Ordering::SeqCst);
            })),
            ..Default::default()
        };
        drop(View::new("browser", caps));
        assert_eq!(cleaned.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn connect_key_accels_rebuilds_the_list() {
        let caps = CapabilityTable {
            connect_key_accels: Some(Box::new(|state| {
                vec![crate::accel::AccelBinding::new(
                    format!("views/{}/zoom in", state.module_name),
                    None,
                    || {},
                )]
            })),
            ..Default::default()
        };
        let mut view = View::new("canvas", caps);
        view.connect_key_accels();
        assert_eq!(view.accel_bindings.len(), 1);
        view.connect_key_accels();
        assert_eq!(view.accel_bindings.len(), 1);
        view.disconnect_accels();
        assert!(view.accel_bindings.is_empty());
    }
}
