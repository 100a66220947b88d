//! View-management core for an image application: dynamically loaded view
//! plugins, the switch state machine, input dispatch over overlay modules
//! and the thumbnail overlay hit-test engine.

pub mod accel;
pub mod error;
pub mod image;
pub mod loader;
pub mod logging;
pub mod manager;
pub mod module;
pub mod overlay;
pub mod settings;
pub mod view;
