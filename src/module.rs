//! Overlay modules: panel plugins layered over whichever view is current.
//!
//! Unlike views, modules are compiled in and registered through a trait.
//! Every method except `name` has a neutral default, so a minimal module is
//! a name and the one or two hooks it actually cares about.

use crate::accel::AccelBinding;
use crate::overlay::Surface;

/// Where a module's panel is docked inside the window chrome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerSlot {
    LeftTop,
    LeftCenter,
    LeftBottom,
    RightTop,
    RightCenter,
    RightBottom,
    Top,
    Bottom,
}

/// A panel plugin. Modules declare which views they appear in and receive
/// the same pointer events as the current view, ahead of it.
pub trait OverlayModule {
    /// Stable short name, also the settings key for panel state.
    fn name(&self) -> &str;

    fn container(&self) -> ContainerSlot {
        ContainerSlot::RightCenter
    }

    /// Whether the module shows up while `view` is current.
    fn visible_in(&self, view: &str) -> bool {
        let _ = view;
        true
    }

    /// Expandable panels get their expanded state persisted per view.
    fn expandable(&self) -> bool {
        false
    }

    /// Called while attaching to a view, after the widget is placed in its
    /// container. `old` is `None` on the very first switch.
    fn view_enter(&mut self, old: Option<&str>, new: &str) {
        let _ = (old, new);
    }

    /// Called while detaching. `new` is `None` when shutting down.
    fn view_leave(&mut self, old: &str, new: Option<&str>) {
        let _ = (old, new);
    }

    fn gui_cleanup(&mut self) {}

    fn connect_key_accels(&mut self) -> Vec<AccelBinding> {
        Vec::new()
    }

    fn set_expanded(&mut self, expanded: bool) {
        let _ = expanded;
    }

    /// Return true to claim the event and stop it from reaching the view.
    fn mouse_moved(&mut self, x: f64, y: f64, pressure: f64, which: i32) -> bool {
        let _ = (x, y, pressure, which);
        false
    }

    fn mouse_leave(&mut self) -> bool {
        false
    }

    fn button_pressed(
        &mut self,
        x: f64,
        y: f64,
        pressure: f64,
        which: i32,
        kind: i32,
        state: u32,
    ) -> bool {
        let _ = (x, y, pressure, which, kind, state);
        false
    }

    fn button_released(&mut self, x: f64, y: f64, which: i32, state: u32) -> bool {
        let _ = (x, y, which, state);
        false
    }

    /// Draw on top of the view's own output. Runs after the view's expose.
    fn post_expose(&mut self, surface: &mut Surface, width: i32, height: i32, px: f32, py: f32) {
        let _ = (surface, width, height, px, py);
    }
}

/// A registered module plus the manager-side bookkeeping for it.
pub struct ModuleHost {
    pub module: Box<dyn OverlayModule>,
    pub accel_bindings: Vec<AccelBinding>,
    /// Whether the module is currently placed in a container.
    pub attached: bool,
}

impl ModuleHost {
    pub fn new(module: Box<dyn OverlayModule>) -> Self {
        Self {
            module,
            accel_bindings: Vec::new(),
            attached: false,
        }
    }

    pub fn connect_key_accels(&mut self) {
        self.accel_bindings = self.module.connect_key_accels();
    }

    pub fn disconnect_accels(&mut self) {
        self.accel_bindings.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bare;

    impl OverlayModule for Bare {
        fn name(&self) -> &str {
            "bare"
        }
    }

    #[test]
    fn defaults_are_neutral() {
        let mut m = Bare;
        assert_eq!(m.container(), ContainerSlot::RightCenter);
        assert!(m.visible_in("browser"));
        assert!(!m.expandable());
        assert!(!m.mouse_moved(0.0, 0.0, 0.0, 1));
        assert!(!m.button_pressed(0.0, 0.0, 0.0, 1, 0, 0));
        assert!(m.connect_key_accels().is_empty());
    }

    #[test]
    fn host_tracks_bindings() {
        struct WithAccels;
        impl OverlayModule for WithAccels {
            fn name(&self) -> &str {
                "with-accels"
            }
            fn connect_key_accels(&mut self) -> Vec<AccelBinding> {
                vec![AccelBinding::new("modules/with-accels/toggle", None, || {})]
            }
        }

        let mut host = ModuleHost::new(Box::new(WithAccels));
        assert!(!host.attached);
        host.connect_key_accels();
        assert_eq!(host.accel_bindings.len(), 1);
        host.disconnect_accels();
        assert!(host.accel_bindings.is_empty());
    }
}
