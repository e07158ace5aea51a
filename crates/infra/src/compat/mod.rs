//! Browser compatibility layer
//!
//! Hosts differ in how the extension panel is shown and which storage
//! scopes exist. The probe inspects the raw host APIs once at startup and
//! every adapter is built from its result.

pub mod links;
pub mod panel;
pub mod probe;

pub use links::WebAppLinks;
pub use panel::PanelAdapter;
pub use probe::HostApis;
