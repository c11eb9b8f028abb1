//! Page-side session: what a typewriter page holds and how it reacts to
//! the host.

pub mod page;

pub use page::Page;

use crate::document::VerboseDocument;
use crate::environment::Runtime;
use crate::paper_color::ColorName;

/// Mutable state of one page.
#[derive(Debug, Clone)]
pub struct PageState {
    pub document: VerboseDocument,
    pub erase_mode: bool,
    pub disappearing_mode: bool,
    /// Color the page is showing, chosen or resolved
    pub paper_color: ColorName,
    pub runtime: Runtime,
}

impl PageState {
    pub fn new(paper_color: ColorName, runtime: Runtime) -> Self {
        Self {
            document: VerboseDocument::new(),
            erase_mode: false,
            disappearing_mode: false,
            paper_color,
            runtime,
        }
    }
}
