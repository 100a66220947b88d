//! The view manager: switch state machine, input dispatch and the
//! act-on-image resolution rules.
//!
//! One manager owns every loaded view and every registered overlay module.
//! All operations run on the UI thread; a hook that blocks stalls the whole
//! switch, which is a contract violation the manager does not try to recover
//! from.

use std::path::Path;
use std::process::{Child, Command};

use egui::{Key, Modifiers};

use crate::error::SwitchError;
use crate::image::ImageId;
use crate::loader::sort_views;
use crate::module::{ModuleHost, OverlayModule};
use crate::overlay::Surface;
use crate::settings::Settings;
use crate::view::View;

/// Window-chrome side effects of a switch. The application shell implements
/// this; the manager only says what must happen, never how.
pub trait UiShell {
    fn reset_cursor(&mut self) {}
    fn enable_key_accelerators(&mut self) {}
    fn cancel_pending_scroll(&mut self) {}
    fn clear_undo_history(&mut self) {}
    /// Re-apply the persisted panel layout for `view`.
    fn restore_panels(&mut self, view: &str) {
        let _ = view;
    }
    fn update_scrollbars(
        &mut self,
        hscroll: crate::view::ScrollAxis,
        vscroll: crate::view::ScrollAxis,
    ) {
        let _ = (hscroll, vscroll);
    }
    fn container_add(&mut self, slot: crate::module::ContainerSlot, module: &str) {
        let _ = (slot, module);
    }
    fn container_remove(&mut self, module: &str) {
        let _ = module;
    }
    fn container_clear_all(&mut self) {}
}

/// Shell that does nothing. Headless operation and tests.
pub struct NullShell;

impl UiShell for NullShell {}

/// Read access to the persisted selection and image grouping.
pub trait SelectionStore {
    fn is_selected(&self, image: ImageId) -> bool;
    /// Selected images in stored order.
    fn selected(&self) -> Vec<ImageId>;
    /// All members of the image's group, the image itself included.
    fn group_members(&self, image: ImageId) -> Vec<ImageId>;
}

/// Store with nothing selected and no groups.
pub struct EmptySelection;

impl SelectionStore for EmptySelection {
    fn is_selected(&self, _image: ImageId) -> bool {
        false
    }
    fn selected(&self) -> Vec<ImageId> {
        Vec::new()
    }
    fn group_members(&self, image: ImageId) -> Vec<ImageId> {
        vec![image]
    }
}

pub type ViewObserver = Box<dyn Fn(Option<&str>, Option<&str>)>;
pub type ImageObserver = Box<dyn Fn(&[ImageId])>;

struct AudioHandle {
    child: Child,
    image: ImageId,
}

pub struct ViewManager {
    views: Vec<View>,
    modules: Vec<ModuleHost>,
    current: Option<usize>,
    ui: Box<dyn UiShell>,
    selection: Box<dyn SelectionStore>,
    settings: Settings,
    view_observers: Vec<ViewObserver>,
    image_observers: Vec<ImageObserver>,
    active_images: Vec<ImageId>,
    mouse_over: Option<ImageId>,
    mouse_inside_table: bool,
    audio: Option<AudioHandle>,
}

impl ViewManager {
    pub fn new(ui: Box<dyn UiShell>, selection: Box<dyn SelectionStore>, settings: Settings) -> Self {
        Self {
            views: Vec::new(),
            modules: Vec::new(),
            current: None,
            ui,
            selection,
            settings,
            view_observers: Vec::new(),
            image_observers: Vec::new(),
            active_images: Vec::new(),
            mouse_over: None,
            mouse_inside_table: false,
            audio: None,
        }
    }

    pub fn register_view(&mut self, view: View) {
        // sorting moves entries, so track the current view by name
        let current_name = self.current.map(|i| self.views[i].module_name().to_string());
        self.views.push(view);
        sort_views(&mut self.views);
        if let Some(name) = current_name {
            self.current = self.views.iter().position(|v| v.module_name() == name);
        }
    }

    pub fn register_module(&mut self, module: Box<dyn OverlayModule>) {
        self.modules.push(ModuleHost::new(module));
    }

    pub fn views(&self) -> &[View] {
        &self.views
    }

    /// Views that belong in a user-facing switcher: everything not flagged
    /// hidden, in registry order.
    pub fn switchable_views(&self) -> impl Iterator<Item = &View> {
        self.views
            .iter()
            .filter(|v| v.flags() & crate::view::VIEW_FLAG_HIDDEN == 0)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn current_view_name(&self) -> Option<&str> {
        self.current.map(|i| self.views[i].module_name())
    }

    pub fn add_view_observer(&mut self, observer: ViewObserver) {
        self.view_observers.push(observer);
    }

    pub fn add_image_observer(&mut self, observer: ImageObserver) {
        self.image_observers.push(observer);
    }

    /// Run every view's GUI-side init. Once, after the shell exists.
    pub fn gui_init(&mut self) {
        for view in &mut self.views {
            view.gui_init();
        }
    }

    /// Shutdown: tear the current view down, then drop every view, which
    /// runs their cleanup hooks and closes the libraries.
    pub fn cleanup(&mut self) {
        self.audio_stop();
        self.switch_to_none();
        self.views.clear();
    }

    // ---- switch state machine ----

    /// Switch by name. The empty name switches to no view at all.
    pub fn switch(&mut self, name: &str) -> Result<(), SwitchError> {
        if name.is_empty() {
            self.switch_to_none();
            return Ok(());
        }
        let idx = self
            .views
            .iter()
            .position(|v| v.module_name() == name)
            .ok_or_else(|| SwitchError::NotFound(name.to_string()))?;
        self.switch_to_index(idx)
    }

    /// Programmatic switch to a view by registry position, bypassing the
    /// name lookup. Same protocol and failure semantics as [`switch`].
    ///
    /// [`switch`]: ViewManager::switch
    pub fn switch_to_view(&mut self, index: usize) -> Result<(), SwitchError> {
        if index >= self.views.len() {
            return Err(SwitchError::NotFound(index.to_string()));
        }
        self.switch_to_index(index)
    }

    /// Leave the current view without entering another. Never fails; a
    /// second call while already at none does nothing.
    pub fn switch_to_none(&mut self) {
        let Some(old_idx) = self.current else {
            return;
        };
        self.normalize_ui();
        let old_name = self.views[old_idx].module_name().to_string();
        tracing::info!(from = %old_name, "leaving view");

        self.views[old_idx].leave();
        self.views[old_idx].disconnect_accels();
        for host in self.modules.iter_mut() {
            if !host.module.visible_in(&old_name) {
                continue;
            }
            host.module.view_leave(&old_name, None);
            host.module.gui_cleanup();
            host.disconnect_accels();
            host.attached = false;
        }
        self.ui.container_clear_all();
        self.current = None;

        for obs in &self.view_observers {
            obs(Some(&old_name), None);
        }
    }

    fn switch_to_index(&mut self, new_idx: usize) -> Result<(), SwitchError> {
        self.normalize_ui();

        // The entry guard is the only abortable point. On refusal the old
        // view stays active and no hooks have fired on either side.
        let code = self.views[new_idx].try_enter();
        if code != 0 {
            tracing::warn!(
                view = self.views[new_idx].module_name(),
                code,
                "view refused entry"
            );
            return Err(SwitchError::Refused(code));
        }

        let old_idx = self.current;
        if old_idx == Some(new_idx) {
            // re-entering the current view is a cheap no-op past the guard
            return Ok(());
        }
        let old_name = old_idx.map(|i| self.views[i].module_name().to_string());
        let new_name = self.views[new_idx].module_name().to_string();
        tracing::info!(from = ?old_name, to = %new_name, "switching view");

        if let Some(old_idx) = old_idx {
            let old = old_name.as_deref().unwrap_or_default();
            self.views[old_idx].leave();
            self.views[old_idx].disconnect_accels();
            for host in self.modules.iter_mut() {
                if !host.module.visible_in(old) {
                    continue;
                }
                host.module.view_leave(old, Some(&new_name));
                host.disconnect_accels();
                if host.attached {
                    self.ui.container_remove(host.module.name());
                    host.attached = false;
                }
            }
        }

        self.current = Some(new_idx);

        // Attach pass, reverse declared order: container insertion is
        // append-only, so walking backwards leaves the declared order in
        // the final layout.
        for host in self.modules.iter_mut().rev() {
            if !host.module.visible_in(&new_name) {
                continue;
            }
            host.connect_key_accels();
            self.ui.container_add(host.module.container(), host.module.name());
            host.attached = true;
        }

        // Activate pass, forward order: persisted panel state first, then
        // the enter hook.
        for host in self.modules.iter_mut() {
            if !host.module.visible_in(&new_name) {
                continue;
            }
            if host.module.expandable() {
                if let Some(expanded) =
                    self.settings.panel_expanded(&new_name, host.module.name())
                {
                    host.module.set_expanded(expanded);
                }
            }
            host.module.view_enter(old_name.as_deref(), &new_name);
        }

        self.ui.restore_panels(&new_name);
        self.views[new_idx].enter();
        self.views[new_idx].connect_key_accels();

        for obs in &self.view_observers {
            obs(old_name.as_deref(), Some(&new_name));
        }
        Ok(())
    }

    /// Cursor, accelerator and scroll state carry over from the previous
    /// view otherwise; the undo context is cleared no matter how the switch
    /// ends.
    fn normalize_ui(&mut self) {
        self.ui.reset_cursor();
        self.ui.enable_key_accelerators();
        self.ui.cancel_pending_scroll();
        self.ui.clear_undo_history();
    }

    // ---- rendering ----

    /// Draw the current view plus the overlay modules on top of it. With no
    /// current view only the background is filled.
    pub fn expose(&mut self, surface: &mut Surface, width: i32, height: i32, px: f32, py: f32) {
        let Some(idx) = self.current else {
            surface.fill_background(width as f32, height as f32);
            return;
        };
        if !self.views[idx].has_expose() {
            return;
        }
        self.views[idx].state.width = width;
        self.views[idx].state.height = height;
        // a pointer below the drawable area is parked far off-canvas so
        // nothing hit-tests against it
        let (px, py) = if py > height as f32 {
            (10000.0, -1.0)
        } else {
            (px, py)
        };
        self.views[idx].expose(surface, width, height, px, py);

        let view_name = self.views[idx].module_name().to_string();
        for host in self.modules.iter_mut().rev() {
            if host.module.visible_in(&view_name) {
                host.module.post_expose(surface, width, height, px, py);
            }
        }
    }

    pub fn reset(&mut self) {
        if let Some(idx) = self.current {
            self.views[idx].reset();
        }
    }

    /// Geometry broadcast to every loaded view, active or not, so an
    /// inactive view can come up at the right size.
    pub fn configure(&mut self, width: i32, height: i32) {
        for view in &mut self.views {
            view.configure(width, height);
        }
    }

    /// Forward new scroll metrics to the current view; pushes them to the
    /// shell's scrollbar widgets only when something actually changed.
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
    ) {
        let Some(idx) = self.current else {
            return;
        };
        let changed = self.views[idx]
            .set_scrollbar(hpos, hlower, hsize, hwinsize, vpos, vlower, vsize, vwinsize);
        if changed {
            let state = &self.views[idx].state;
            self.ui.update_scrollbars(state.hscroll, state.vscroll);
        }
    }

    // ---- input dispatch ----

    /// Broadcast-OR over the visible modules, topmost-declared first; the
    /// view only sees the motion if no module claimed it.
    pub fn mouse_moved(&mut self, x: f64, y: f64, pressure: f64, which: i32) -> bool {
        let Some(idx) = self.current else {
            return false;
        };
        let view_name = self.views[idx].module_name().to_string();
        let mut handled = false;
        for host in self.modules.iter_mut().rev() {
            if host.module.visible_in(&view_name) && host.module.mouse_moved(x, y, pressure, which)
            {
                handled = true;
            }
        }
        if !handled {
            handled = self.views[idx].mouse_moved(x, y, pressure, which);
        }
        handled
    }

    pub fn mouse_leave(&mut self) -> bool {
        let Some(idx) = self.current else {
            return false;
        };
        let view_name = self.views[idx].module_name().to_string();
        let mut handled = false;
        for host in self.modules.iter_mut().rev() {
            if host.module.visible_in(&view_name) && host.module.mouse_leave() {
                handled = true;
            }
        }
        if !handled {
            self.views[idx].mouse_leave();
        }
        handled
    }

    pub fn mouse_enter(&mut self) {
        if let Some(idx) = self.current {
            self.views[idx].mouse_enter();
        }
    }

    /// First responder: the first module that claims the press swallows it.
    pub fn button_pressed(
        &mut self,
        x: f64,
        y: f64,
        pressure: f64,
        which: i32,
        kind: i32,
        state: u32,
    ) -> bool {
        let Some(idx) = self.current else {
            return false;
        };
        let view_name = self.views[idx].module_name().to_string();
        for host in self.modules.iter_mut().rev() {
            if host.module.visible_in(&view_name)
                && host.module.button_pressed(x, y, pressure, which, kind, state)
            {
                return true;
            }
        }
        self.views[idx].button_pressed(x, y, pressure, which, kind, state)
    }

    pub fn button_released(&mut self, x: f64, y: f64, which: i32, state: u32) -> bool {
        let Some(idx) = self.current else {
            return false;
        };
        let view_name = self.views[idx].module_name().to_string();
        for host in self.modules.iter_mut().rev() {
            if host.module.visible_in(&view_name)
                && host.module.button_released(x, y, which, state)
            {
                return true;
            }
        }
        self.views[idx].button_released(x, y, which, state)
    }

    /// Keyboard goes straight to the view; overlay modules never see raw
    /// key events.
    pub fn key_pressed(&mut self, key: Key, modifiers: Modifiers) -> bool {
        match self.current {
            Some(idx) => self.views[idx].key_pressed(key, modifiers),
            None => false,
        }
    }

    pub fn key_released(&mut self, key: Key, modifiers: Modifiers) -> bool {
        match self.current {
            Some(idx) => self.views[idx].key_released(key, modifiers),
            None => false,
        }
    }

    pub fn scrolled(&mut self, x: f64, y: f64, up: i32, state: u32) {
        if let Some(idx) = self.current {
            self.views[idx].scrolled(x, y, up, state);
        }
    }

    pub fn scrollbar_changed(&mut self, x: f64, y: f64) {
        if let Some(idx) = self.current {
            self.views[idx].scrollbar_changed(x, y);
        }
    }

    /// Fire every accelerator bound to this key combination in the current
    /// view or an attached module. True when at least one action ran.
    pub fn accel_pressed(&mut self, key: Key, modifiers: Modifiers) -> bool {
        let Some(idx) = self.current else {
            return false;
        };
        let matches =
            |b: &crate::accel::AccelBinding| b.hotkey.is_some_and(|hk| hk.key == key && hk.modifiers == modifiers);
        let mut fired = false;
        for binding in self.views[idx].accel_bindings.iter().filter(|b| matches(b)) {
            (binding.action)();
            fired = true;
        }
        for host in self.modules.iter().filter(|h| h.attached) {
            for binding in host.accel_bindings.iter().filter(|b| matches(b)) {
                (binding.action)();
                fired = true;
            }
        }
        fired
    }

    /// Pointer gestures the current view advertises, for help overlays.
    pub fn current_mouse_actions(&self) -> Vec<crate::view::MouseAction> {
        self.current
            .map_or_else(Vec::new, |idx| self.views[idx].mouse_actions())
    }

    // ---- act-on-image resolution ----

    pub fn set_mouse_over(&mut self, image: Option<ImageId>) {
        self.mouse_over = image;
    }

    pub fn mouse_over(&self) -> Option<ImageId> {
        self.mouse_over
    }

    /// Whether the pointer is over the thumbnail table itself, as opposed
    /// to a panel or filmstrip showing the same images.
    pub fn set_mouse_inside_table(&mut self, inside: bool) {
        self.mouse_inside_table = inside;
    }

    pub fn active_images(&self) -> &[ImageId] {
        &self.active_images
    }

    pub fn active_images_add(&mut self, image: ImageId) {
        if !self.active_images.contains(&image) {
            self.active_images.push(image);
            self.notify_image_observers();
        }
    }

    pub fn active_images_reset(&mut self) {
        if self.active_images.is_empty() {
            return;
        }
        self.active_images.clear();
        self.notify_image_observers();
    }

    fn notify_image_observers(&self) {
        for obs in &self.image_observers {
            obs(&self.active_images);
        }
    }

    /// The single image a keyboard-driven action applies to. The active set
    /// outranks the pointer: a hover never overrides an explicit working
    /// set, and the persisted selection is the last resort.
    pub fn image_to_act_on(&self) -> Option<ImageId> {
        if let Some(first) = self.active_images.first() {
            return Some(*first);
        }
        if let Some(over) = self.mouse_over {
            return Some(over);
        }
        self.selection.selected().into_iter().next()
    }

    /// The full set an action applies to. A hovered image inside the table
    /// that is part of the selection means "act on the whole selection";
    /// a hovered image anywhere else means just that image; with no hover
    /// the active set wins over the persisted selection.
    pub fn images_to_act_on(&self, only_visible: bool) -> Vec<ImageId> {
        let mut out = Vec::new();
        match self.mouse_over {
            Some(over) => {
                if self.mouse_inside_table && self.selection.is_selected(over) {
                    for id in self.selection.selected() {
                        self.collect_image(id, only_visible, &mut out);
                    }
                } else {
                    self.collect_image(over, only_visible, &mut out);
                }
            }
            None => {
                if !self.active_images.is_empty() {
                    for id in self.active_images.iter().copied() {
                        self.collect_image(id, only_visible, &mut out);
                    }
                } else {
                    for id in self.selection.selected() {
                        self.collect_image(id, only_visible, &mut out);
                    }
                }
            }
        }
        out
    }

    /// Append `image`, expanded to its group when grouping is on and hidden
    /// group members are wanted too. Encounter order, no duplicates.
    fn collect_image(&self, image: ImageId, only_visible: bool, out: &mut Vec<ImageId>) {
        if only_visible || !self.settings.grouping {
            if !out.contains(&image) {
                out.push(image);
            }
            return;
        }
        for member in self.selection.group_members(image) {
            if !out.contains(&member) {
                out.push(member);
            }
        }
    }

    // ---- audio sidecar playback ----

    /// Play an image's audio sidecar with the configured external player.
    /// Starting playback for another image stops the current one first;
    /// asking for the image already playing is a no-op.
    pub fn audio_start(&mut self, image: ImageId, sidecar: &Path) {
        if let Some(handle) = &mut self.audio {
            if handle.image == image && handle.child.try_wait().ok().flatten().is_none() {
                return;
            }
        }
        self.audio_stop();
        let Some(player) = self.settings.audio_player.clone() else {
            tracing::debug!("no audio player configured");
            return;
        };
        match Command::new(&player).arg(sidecar).spawn() {
            Ok(child) => {
                tracing::debug!(image, player = %player, "audio playback started");
                self.audio = Some(AudioHandle { child, image });
            }
            Err(err) => tracing::error!(player = %player, "failed to start audio player: {err}"),
        }
    }

    pub fn audio_stop(&mut self) {
        if let Some(mut handle) = self.audio.take() {
            if let Err(err) = handle.child.kill() {
                tracing::debug!("audio player already gone: {err}");
            }
            let _ = handle.child.wait();
        }
    }

    /// Image whose sidecar is currently audible, if the player is still
    /// running.
    pub fn playing_image(&mut self) -> Option<ImageId> {
        let handle = self.audio.as_mut()?;
        match handle.child.try_wait() {
            Ok(None) => Some(handle.image),
            _ => {
                self.audio = None;
                None
            }
        }
    }
}
