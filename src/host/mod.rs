//! Host process: document windows, menus, dialogs and persistence.

pub mod app;
pub mod dialogs;
pub mod window;

pub use app::{HostApp, OpenedSurface, SurfaceEvent};
pub use dialogs::Dialogs;
pub use window::{DocumentWindow, MenuCommand, MenuOutcome, MenuState, PageData, PageKind};
