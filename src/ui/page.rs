//! A typewriter page: the surface-side state the host talks to.

use std::sync::{Arc, Mutex, MutexGuard};

use super::PageState;
use crate::document::{Character, Point, VerboseDocument};
use crate::environment::Runtime;
use crate::error::Result;
use crate::host::PageKind;
use crate::ipc::{Channels, SurfaceEndpoint, SurfaceId, SurfaceSender};
use crate::paper_color::{ColorName, random_color};
use crate::preferences::{PreferencesPatch, SettingsStore, UserPreferences};

/// One page and its end of every channel.
pub struct Page {
    surface: SurfaceEndpoint,
    channels: Arc<Channels>,
    state: Arc<Mutex<PageState>>,
    settings: SettingsStore,
}

impl Page {
    /// Attach a page to `surface` and start listening to the host.
    ///
    /// Without a host the page runs on default preferences straight away.
    pub fn new(surface: SurfaceEndpoint, channels: Arc<Channels>) -> Self {
        let state = Arc::new(Mutex::new(PageState::new(
            random_color(),
            Runtime::initial(surface.host_attached()),
        )));
        let settings = SettingsStore::default();
        if !surface.host_attached() {
            settings.initialize(&PreferencesPatch::default());
        }

        let mut page = Self {
            surface,
            channels,
            state,
            settings,
        };
        page.listen();
        page
    }

    fn listen(&mut self) {
        let channels = Arc::clone(&self.channels);

        let (settings, state, sender) = self.handles();
        let ch = Arc::clone(&channels);
        self.surface.on_update(&channels.initial_settings, move |patch| {
            if !settings.initialize(&patch) {
                return;
            }
            let color = resolve_color(&state, &settings.current());
            report_color(&sender, &ch, color);
        });

        let (settings, _, _) = self.handles();
        self.surface.on_update(&channels.settings, move |patch| {
            settings.update(&patch);
        });

        let (_, state, _) = self.handles();
        self.surface.on_update(&channels.operating_system, move |os| {
            lock(&state).runtime = Runtime::from_os(os);
        });

        let (settings, state, sender) = self.handles();
        let ch = Arc::clone(&channels);
        self.surface.on_update(&channels.file_content, move |doc| {
            log::info!("{} loaded document ({} characters)", sender.id(), doc.content.len());
            lock(&state).document = doc;
            let color = resolve_color(&state, &settings.current());
            report_color(&sender, &ch, color);
        });

        let (_, state, sender) = self.handles();
        let ch = Arc::clone(&channels);
        self.surface.on_update(&channels.save_request, move |_| {
            let doc = lock(&state).document.clone();
            if let Err(e) = sender.send(&ch.file_content, &doc) {
                log::error!("{} could not hand over its document: {}", sender.id(), e);
            }
        });

        let (_, state, _) = self.handles();
        self.surface.on_update(&channels.set_color, move |color| {
            if let Some(color) = color {
                let mut state = lock(&state);
                state.document.paper_color = Some(color);
                state.paper_color = color;
            }
        });

        let (_, state, _) = self.handles();
        self.surface.on_update(&channels.erase_mode, move |on| {
            lock(&state).erase_mode = on;
        });

        let (_, state, _) = self.handles();
        self.surface.on_update(&channels.disappearing_mode, move |on| {
            lock(&state).disappearing_mode = on;
        });
    }

    fn handles(&self) -> (SettingsStore, Arc<Mutex<PageState>>, SurfaceSender) {
        (self.settings.clone(), Arc::clone(&self.state), self.surface.sender())
    }

    pub fn id(&self) -> SurfaceId {
        self.surface.id()
    }

    pub fn host_attached(&self) -> bool {
        self.surface.host_attached()
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn preferences(&self) -> UserPreferences {
        self.settings.current()
    }

    pub fn document(&self) -> VerboseDocument {
        lock(&self.state).document.clone()
    }

    pub fn erase_mode(&self) -> bool {
        lock(&self.state).erase_mode
    }

    pub fn disappearing_mode(&self) -> bool {
        lock(&self.state).disappearing_mode
    }

    pub fn paper_color(&self) -> ColorName {
        lock(&self.state).paper_color
    }

    pub fn runtime(&self) -> Runtime {
        lock(&self.state).runtime
    }

    /// Print a glyph at a page position, in the current erase mode.
    /// Empty input prints nothing.
    pub fn type_char(&self, value: &str, pos_x: f64, pos_y: f64) -> Option<Character> {
        if value.is_empty() {
            return None;
        }
        let mut state = lock(&self.state);
        let character = Character::new(value, pos_x, pos_y, state.erase_mode);
        state.document.content.push(character.clone());
        Some(character)
    }

    /// Add a pen sample to the current stroke.
    pub fn draw(&self, point: Point) {
        lock(&self.state).document.pen_markings.push(Some(point));
    }

    /// End the current stroke. A no-op when no stroke is in progress.
    pub fn lift_pen(&self) {
        let mut state = lock(&self.state);
        if matches!(state.document.pen_markings.last(), Some(Some(_))) {
            state.document.pen_markings.push(None);
        }
    }

    /// Flip erase mode.
    ///
    /// With a host the request goes through the menu, which owns the state
    /// and echoes it back; otherwise the page flips it directly.
    pub fn toggle_erase_mode(&self) -> Result<()> {
        if self.host_attached() {
            let requested = !self.erase_mode();
            self.surface.send(&self.channels.erase_mode, &requested)
        } else {
            let mut state = lock(&self.state);
            state.erase_mode = !state.erase_mode;
            Ok(())
        }
    }

    /// Pick a paper color for this document.
    pub fn choose_color(&self, color: ColorName) -> Result<()> {
        {
            let mut state = lock(&self.state);
            state.document.paper_color = Some(color);
            state.paper_color = color;
        }
        self.surface.send(&self.channels.set_color, &Some(color))
    }

    /// Change preferences locally and send the full set for storage.
    pub fn update_preferences(&self, patch: &PreferencesPatch) -> Result<UserPreferences> {
        let prefs = self.settings.update(patch);
        self.surface.send(&self.channels.settings, &prefs.to_patch())?;
        Ok(prefs)
    }

    /// Ask the host to close a child page.
    pub fn close_model(&self, page: PageKind) -> Result<()> {
        self.surface.send(&self.channels.close_model, &page.as_str().to_string())
    }

    /// Handle every message already received.
    pub fn dispatch_pending(&mut self) -> usize {
        self.surface.dispatch_pending()
    }

    /// Wait for one message and handle it.
    pub async fn dispatch_next(&mut self) -> bool {
        self.surface.dispatch_next().await
    }
}

fn lock(state: &Mutex<PageState>) -> MutexGuard<'_, PageState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// Document color first, then the preferred default, then whatever the page
// already shows.
fn resolve_color(state: &Mutex<PageState>, prefs: &UserPreferences) -> ColorName {
    let mut state = lock(state);
    let color = state
        .document
        .paper_color
        .or(prefs.default_paper_color)
        .unwrap_or(state.paper_color);
    state.paper_color = color;
    color
}

fn report_color(sender: &SurfaceSender, channels: &Channels, color: ColorName) {
    if let Err(e) = sender.send(&channels.set_color, &Some(color)) {
        log::warn!("{} could not report paper color: {}", sender.id(), e);
    }
}
