//! Per-window host state: page data, menu state and attached pages.

use std::path::PathBuf;

use crate::document::VerboseDocument;
use crate::ipc::SurfaceId;
use crate::paper_color::ColorName;

/// Pages a window can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    /// The typewriter page
    Main,
    /// How-to-use page, opened as a child of the main page
    Help,
}

impl PageKind {
    /// Identifier used on `CLOSE_MODEL`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Help => "help",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "main" => Some(Self::Main),
            "help" => Some(Self::Help),
            _ => None,
        }
    }
}

/// What the host knows about a window's document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageData {
    /// Where the document was last opened from or saved to
    pub filepath: Option<PathBuf>,
    /// The next `FILE_CONTENT` was requested by Save rather than Save As
    pub save_without_dialog: bool,
    /// Show the help page alongside the first window
    pub first_launch: bool,
}

impl PageData {
    pub fn for_file(path: impl Into<PathBuf>) -> Self {
        Self {
            filepath: Some(path.into()),
            ..Default::default()
        }
    }
}

/// Checked state of the window menu.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MenuState {
    pub erase_mode: bool,
    pub disappearing_mode: bool,
    pub color: Option<ColorName>,
}

/// Menu items with host-side behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    New,
    Reset,
    Open,
    Save,
    SaveAs,
    SetColor(ColorName),
    ToggleEraseMode,
    ToggleDisappearingMode,
    ToggleHelp,
    Close,
}

/// What a menu command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOutcome {
    /// A new surface was opened and is waiting in the opened queue
    Opened(SurfaceId),
    /// A surface was closed
    Closed(SurfaceId),
    /// A message was sent to the window
    Sent,
    /// The user backed out, or the command failed and was reported
    Nothing,
}

/// A document window and the pages attached to it.
#[derive(Debug)]
pub struct DocumentWindow {
    pub main: SurfaceId,
    pub help: Option<SurfaceId>,
    pub page: PageData,
    pub menu: MenuState,
    /// Document to deliver once the main page is ready
    pub pending: Option<VerboseDocument>,
}

impl DocumentWindow {
    pub fn new(main: SurfaceId, page: PageData) -> Self {
        Self {
            main,
            help: None,
            page,
            menu: MenuState::default(),
            pending: None,
        }
    }

    /// Surface showing `kind`, if open.
    pub fn surface_for(&self, kind: PageKind) -> Option<SurfaceId> {
        match kind {
            PageKind::Main => Some(self.main),
            PageKind::Help => self.help,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_kind_names() {
        for kind in [PageKind::Main, PageKind::Help] {
            assert_eq!(PageKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(PageKind::parse("settings"), None);
    }

    #[test]
    fn test_surface_for() {
        let mut window = DocumentWindow::new(SurfaceId(1), PageData::default());
        assert_eq!(window.surface_for(PageKind::Main), Some(SurfaceId(1)));
        assert_eq!(window.surface_for(PageKind::Help), None);
        window.help = Some(SurfaceId(2));
        assert_eq!(window.surface_for(PageKind::Help), Some(SurfaceId(2)));
    }
}
