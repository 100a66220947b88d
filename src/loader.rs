//! Dynamic loading of view libraries.
//!
//! A view library exports an `extern "C"` API version symbol plus any subset
//! of the capability entry points. The version gate is checked first and is
//! the only hard failure: capability symbols are Rust-ABI function pointers
//! shared through this crate's types, so a library built against another
//! host version must never have anything else resolved from it.

use std::path::{Path, PathBuf};

use libloading::Library;
use walkdir::WalkDir;

use crate::error::LoadError;
use crate::view::{CapabilityTable, View, ViewState};

/// Host API version. Bumped on any change to [`ViewState`] or the capability
/// signatures; loaded libraries must match exactly.
pub const API_VERSION: u32 = 1;

/// Symbol every view library must export.
pub const API_VERSION_SYMBOL: &[u8] = b"lightdesk_api_version";

/// Views named here sort first, in this order; anything else sorts after,
/// alphabetically by display name. Keeps switchers and accelerator listings
/// in a predictable, human-tunable sequence regardless of load order.
pub const VIEW_ORDER: [&str; 2] = ["browser", "canvas"];

type VersionFn = unsafe extern "C" fn() -> u32;

/// Copy a plain function pointer out of the library, if the symbol exists.
///
/// # Safety
/// The caller must guarantee `T` matches the symbol's real signature and
/// that the returned pointer is not used after the library is closed.
unsafe fn resolve<T: Copy + 'static>(lib: &Library, symbol: &[u8]) -> Option<T> {
    lib.get::<T>(symbol).ok().map(|s| *s)
}

/// Load one view library and bind its capability table. Missing capability
/// symbols bind to nothing; callers see the neutral defaults. After a
/// successful load the `init` hook runs, then `init_key_accels` when a GUI
/// context is available.
pub fn load_view(path: &Path, module_name: &str, gui: bool) -> Result<View, LoadError> {
    tracing::debug!(view = module_name, path = %path.display(), "loading view library");

    // SAFETY: loading a view library runs its initialisers; this is the
    // plugin contract, gated below by the exact version check.
    let lib = unsafe { Library::new(path) }.map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    // SAFETY: the version symbol is extern "C" with a fixed signature; it is
    // resolved before anything else and gates all Rust-ABI symbols.
    let version = unsafe { resolve::<VersionFn>(&lib, API_VERSION_SYMBOL) }.ok_or_else(|| {
        LoadError::VersionSymbolMissing {
            path: path.to_path_buf(),
        }
    })?;
    let found = unsafe { version() };
    if found != API_VERSION {
        return Err(LoadError::VersionMismatch {
            path: path.to_path_buf(),
            found,
            expected: API_VERSION,
        });
    }

    let mut caps = CapabilityTable::default();
    // SAFETY: version equality established above; every symbol below is
    // declared with the signature this host version defines for it.
    unsafe {
        if let Some(f) = resolve::<fn(&ViewState) -> String>(&lib, b"name") {
            caps.name = Some(Box::new(f));
        }
        if let Some(f) = resolve::<fn(&ViewState) -> u32>(&lib, b"flags") {
            caps.flags = Some(Box::new(f));
        }
        if let Some(f) = resolve::<fn(&mut ViewState)>(&lib, b"init") {
            caps.init = Some(Box::new(f));
        }
        if let Some(f) = resolve::<fn(&mut ViewState)>(&lib, b"gui_init") {
            caps.gui_init = Some(Box::new(f));
        }
        if let Some(f) = resolve::<fn(&mut ViewState)>(&lib, b"cleanup") {
            caps.cleanup = Some(Box::new(f));
        }
        if let Some(f) = resolve::<fn(&mut ViewState, &mut crate::overlay::Surface, i32, i32, f32, f32)>(
            &lib, b"expose",
        ) {
            caps.expose = Some(Box::new(f));
        }
        if let Some(f) = resolve::<fn(&mut ViewState) -> i32>(&lib, b"try_enter") {
            caps.try_enter = Some(Box::new(f));
        }
        if let Some(f) = resolve::<fn(&mut ViewState)>(&lib, b"enter") {
            caps.enter = Some(Box::new(f));
        }
        if let Some(f) = resolve::<fn(&mut ViewState)>(&lib, b"leave") {
            caps.leave = Some(Box::new(f));
        }
        if let Some(f) = resolve::<fn(&mut ViewState)>(&lib, b"reset") {
            caps.reset = Some(Box::new(f));
        }
        if let Some(f) = resolve::<fn(&mut ViewState)>(&lib, b"mouse_enter") {
            caps.mouse_enter = Some(Box::new(f));
        }
        if let Some(f) = resolve::<fn(&mut ViewState)>(&lib, b"mouse_leave") {
            caps.mouse_leave = Some(Box::new(f));
        }
        if let Some(f) = resolve::<fn(&mut ViewState, f64, f64, f64, i32) -> bool>(&lib, b"mouse_moved")
        {
            caps.mouse_moved = Some(Box::new(f));
        }
        if let Some(f) = resolve::<fn(&mut ViewState, f64, f64, f64, i32, i32, u32) -> bool>(
            &lib,
            b"button_pressed",
        ) {
            caps.button_pressed = Some(Box::new(f));
        }
        if let Some(f) =
            resolve::<fn(&mut ViewState, f64, f64, i32, u32) -> bool>(&lib, b"button_released")
        {
            caps.button_released = Some(Box::new(f));
        }
        if let Some(f) =
            resolve::<fn(&mut ViewState, egui::Key, egui::Modifiers) -> bool>(&lib, b"key_pressed")
        {
            caps.key_pressed = Some(Box::new(f));
        }
        if let Some(f) =
            resolve::<fn(&mut ViewState, egui::Key, egui::Modifiers) -> bool>(&lib, b"key_released")
        {
            caps.key_released = Some(Box::new(f));
        }
        if let Some(f) = resolve::<fn(&mut ViewState, i32, i32)>(&lib, b"configure") {
            caps.configure = Some(Box::new(f));
        }
        if let Some(f) = resolve::<fn(&mut ViewState, f64, f64, i32, u32)>(&lib, b"scrolled") {
            caps.scrolled = Some(Box::new(f));
        }
        if let Some(f) = resolve::<fn(&mut ViewState, f64, f64)>(&lib, b"scrollbar_changed") {
            caps.scrollbar_changed = Some(Box::new(f));
        }
        if let Some(f) = resolve::<fn(&mut ViewState)>(&lib, b"init_key_accels") {
            caps.init_key_accels = Some(Box::new(f));
        }
        if let Some(f) = resolve::<fn(&mut ViewState) -> Vec<crate::accel::AccelBinding>>(
            &lib,
            b"connect_key_accels",
        ) {
            caps.connect_key_accels = Some(Box::new(f));
        }
        if let Some(f) =
            resolve::<fn(&ViewState) -> Vec<crate::view::MouseAction>>(&lib, b"mouse_actions")
        {
            caps.mouse_actions = Some(Box::new(f));
        }
    }

    let mut view = View::new(module_name, caps);
    view.library = Some(lib);

    // Failures inside these hooks are the module's own responsibility; they
    // are not caught here.
    view.init();
    if gui {
        view.init_key_accels();
    }

    Ok(view)
}

/// Module name for a library file: the stem, minus any `lib` prefix.
fn module_name_for(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    Some(stem.strip_prefix("lib").unwrap_or(stem).to_string())
}

/// Load every view library in `dir` (non-recursive). Libraries that fail to
/// load are skipped with a diagnostic; the result is sorted with
/// [`sort_views`] and does not depend on filesystem enumeration order.
pub fn load_all(dir: &Path, gui: bool) -> Vec<View> {
    let mut views = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path: PathBuf = entry.into_path();
        if path.extension().and_then(|e| e.to_str()) != Some(std::env::consts::DLL_EXTENSION) {
            continue;
        }
        let Some(name) = module_name_for(&path) else {
            continue;
        };
        match load_view(&path, &name, gui) {
            Ok(view) => views.push(view),
            Err(err) => tracing::error!(view = %name, "skipping view library: {err}"),
        }
    }
    sort_views(&mut views);
    views
}

/// Stable registry order: [`VIEW_ORDER`] entries first in declared order,
/// then everything else by case-sensitive display name.
pub fn sort_views(views: &mut [View]) {
    views.sort_by(|a, b| {
        let pos = |v: &View| {
            VIEW_ORDER
                .iter()
                .position(|n| *n == v.module_name())
                .unwrap_or(VIEW_ORDER.len())
        };
        pos(a).cmp(&pos(b)).then_with(|| a.name().cmp(&b.name()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::CapabilityTable;

    fn named(module: &str) -> View {
        View::new(module, CapabilityTable::default())
    }

    #[test]
    fn listed_views_precede_everything_else() {
        let mut views = vec![named("slideshow"), named("canvas"), named("atlas"), named("browser")];
        sort_views(&mut views);
        let order: Vec<_> = views.iter().map(|v| v.module_name().to_string()).collect();
        assert_eq!(order, ["browser", "canvas", "atlas", "slideshow"]);
    }

    #[test]
    fn unlisted_ties_break_on_display_name_case_sensitively() {
        let caps = CapabilityTable {
            name: Some(Box::new(|_| "Zoned".to_string())),
            ..Default::default()
        };
        let mut zoned = named("zoned");
        zoned.caps = caps;
        // "Zoned" < "atlas" in a case-sensitive comparison
        let mut views = vec![named("atlas"), zoned];
        sort_views(&mut views);
        let order: Vec<_> = views.iter().map(|v| v.module_name().to_string()).collect();
        assert_eq!(order, ["zoned", "atlas"]);
    }

    #[test]
    fn order_is_independent_of_load_order() {
        let mut a = vec![named("canvas"), named("map"), named("browser")];
        let mut b = vec![named("map"), named("browser"), named("canvas")];
        sort_views(&mut a);
        sort_views(&mut b);
        let names = |v: &[View]| v.iter().map(|x| x.module_name().to_string()).collect::<Vec<_>>();
        assert_eq!(names(&a), names(&b));
    }

    #[test]
    fn module_name_strips_lib_prefix() {
        assert_eq!(
            module_name_for(Path::new("/views/libbrowser.so")).as_deref(),
            Some("browser")
        );
        assert_eq!(
            module_name_for(Path::new("canvas.dll")).as_deref(),
            Some("canvas")
        );
    }

    #[test]
    fn load_all_skips_non_libraries() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("readme.txt"), "not a view").unwrap();
        let views = load_all(dir.path(), false);
        assert!(views.is_empty());
    }

    #[test]
    fn broken_library_is_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir
            .path()
            .join(format!("libbogus.{}", std::env::consts::DLL_EXTENSION));
        std::fs::write(&bogus, b"\x7fELF not really").unwrap();
        let views = load_all(dir.path(), false);
        assert!(views.is_empty());
    }
}
