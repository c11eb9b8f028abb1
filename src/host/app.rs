//! The host application: windows, menus, preferences and file I/O.
//!
//! Listeners registered on the channel endpoint only queue a [`HostAction`];
//! the actions run afterwards in [`HostApp::pump`] with full access to the
//! application state, so no callback ever needs to borrow the app itself.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;

use super::dialogs::{
    Dialogs, READ_FAILED_DETAIL, SAVE_FAILED_DETAIL, UNABLE_TO_OPEN, UNABLE_TO_SAVE, UNREADABLE_FILE_DETAIL,
};
use super::window::{DocumentWindow, MenuCommand, MenuOutcome, MenuState, PageData, PageKind};
use crate::config::Config;
use crate::document::{VerboseDocument, read_document, with_file_extension, write_document};
use crate::environment::OperatingSystem;
use crate::error::{OliveError, Result};
use crate::ipc::{ChannelRegistry, Channels, HostEndpoint, SurfaceEndpoint, SurfaceId};
use crate::paper_color::ColorName;
use crate::preferences::{PreferenceFile, PreferencesPatch};

/// Lifecycle notifications from the platform layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// The page finished loading and can receive messages
    Ready,
    Focused,
    /// The page was closed by the platform
    Destroyed,
}

/// A surface opened by the host, to be attached to a page.
pub struct OpenedSurface {
    /// Main surface of the window it belongs to
    pub window: SurfaceId,
    pub kind: PageKind,
    pub endpoint: SurfaceEndpoint,
}

/// Work queued by channel listeners.
#[derive(Debug)]
enum HostAction {
    StoreSettings(PreferencesPatch),
    ColorChosen { window: SurfaceId, color: Option<ColorName> },
    EraseModeToggled { window: SurfaceId },
    CloseChild { window: SurfaceId, page: String },
    Save { window: SurfaceId, doc: VerboseDocument },
}

/// Owns every window and the host end of every channel.
pub struct HostApp<G: Dialogs> {
    config: Config,
    channels: Arc<Channels>,
    endpoint: HostEndpoint,
    preferences: Arc<PreferenceFile>,
    dialogs: G,
    os: OperatingSystem,
    windows: HashMap<SurfaceId, DocumentWindow>,
    /// Surfaces that already received the environment and initial settings
    initialized: HashSet<SurfaceId>,
    opened: Vec<OpenedSurface>,
    focused: Option<SurfaceId>,
    actions_tx: mpsc::UnboundedSender<HostAction>,
    actions_rx: mpsc::UnboundedReceiver<HostAction>,
}

impl<G: Dialogs> HostApp<G> {
    pub fn new(config: Config, dialogs: G) -> Result<Self> {
        let registry = Arc::new(ChannelRegistry::new());
        let channels = Arc::new(Channels::declare(&registry)?);
        let preferences = Arc::new(PreferenceFile::new(&config.preferences.path));
        let (actions_tx, actions_rx) = mpsc::unbounded_channel();

        Ok(Self {
            config,
            channels,
            endpoint: HostEndpoint::new(registry),
            preferences,
            dialogs,
            os: OperatingSystem::current(),
            windows: HashMap::new(),
            initialized: HashSet::new(),
            opened: Vec::new(),
            focused: None,
            actions_tx,
            actions_rx,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn channels(&self) -> &Arc<Channels> {
        &self.channels
    }

    pub fn registry(&self) -> &Arc<ChannelRegistry> {
        self.endpoint.registry()
    }

    pub fn dialogs(&self) -> &G {
        &self.dialogs
    }

    pub fn preferences(&self) -> &Arc<PreferenceFile> {
        &self.preferences
    }

    /// Window whose main surface is `id`.
    pub fn window(&self, id: SurfaceId) -> Option<&DocumentWindow> {
        self.windows.get(&id)
    }

    /// Main surfaces of every open window.
    pub fn window_ids(&self) -> Vec<SurfaceId> {
        let mut ids: Vec<SurfaceId> = self.windows.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn focused_window(&self) -> Option<SurfaceId> {
        self.focused
    }

    /// Surfaces that are not torn down, across all windows.
    pub fn open_surface_count(&self) -> usize {
        self.endpoint.sender().open_count()
    }

    /// Surfaces opened since the last call (by menu commands or first
    /// launch), for the platform layer to attach pages to.
    pub fn take_opened_surfaces(&mut self) -> Vec<OpenedSurface> {
        std::mem::take(&mut self.opened)
    }

    /// Open a document window.
    pub fn create_window(&mut self, page: PageData) -> Result<SurfaceEndpoint> {
        self.open_window(page, None)
    }

    /// Read a document and open a window that shows it once ready.
    pub async fn open_window_with_file(&mut self, path: &Path) -> Result<SurfaceEndpoint> {
        let path = with_file_extension(path);
        let doc = read_document(&path).await?;
        self.open_window(PageData::for_file(path), Some(doc))
    }

    fn open_window(&mut self, page: PageData, pending: Option<VerboseDocument>) -> Result<SurfaceEndpoint> {
        let first_launch = page.first_launch;
        let endpoint = self.endpoint.open_surface(None)?;
        let id = endpoint.id();
        self.register_window_listeners(id);

        let mut window = DocumentWindow::new(id, page);
        window.pending = pending;
        self.windows.insert(id, window);
        log::info!(
            "Opened window {} ({}x{})",
            id,
            self.config.window.width,
            self.config.window.height
        );

        if first_launch {
            self.open_help(id)?;
        }
        Ok(endpoint)
    }

    fn open_help(&mut self, window: SurfaceId) -> Result<SurfaceId> {
        let endpoint = self.endpoint.open_surface(Some(window))?;
        let id = endpoint.id();
        let tx = self.actions_tx.clone();
        self.endpoint.on_update(id, &self.channels.settings, move |patch| {
            queue(&tx, HostAction::StoreSettings(patch))
        });

        if let Some(w) = self.windows.get_mut(&window) {
            w.help = Some(id);
        }
        self.opened.push(OpenedSurface {
            window,
            kind: PageKind::Help,
            endpoint,
        });
        Ok(id)
    }

    fn register_window_listeners(&mut self, id: SurfaceId) {
        let channels = Arc::clone(&self.channels);

        let tx = self.actions_tx.clone();
        self.endpoint.on_update(id, &channels.settings, move |patch| {
            queue(&tx, HostAction::StoreSettings(patch))
        });

        let tx = self.actions_tx.clone();
        self.endpoint.on_update(id, &channels.set_color, move |color| {
            queue(&tx, HostAction::ColorChosen { window: id, color })
        });

        let tx = self.actions_tx.clone();
        self.endpoint.on_update(id, &channels.erase_mode, move |_| {
            queue(&tx, HostAction::EraseModeToggled { window: id })
        });

        let tx = self.actions_tx.clone();
        self.endpoint.on_update_from_child(id, &channels.close_model, move |page| {
            queue(&tx, HostAction::CloseChild { window: id, page })
        });

        let tx = self.actions_tx.clone();
        self.endpoint.on_update(id, &channels.file_content, move |doc| {
            queue(&tx, HostAction::Save { window: id, doc })
        });
    }

    /// React to a platform lifecycle event.
    pub fn surface_event(&mut self, id: SurfaceId, event: SurfaceEvent) -> Result<()> {
        match event {
            SurfaceEvent::Ready => self.surface_ready(id),
            SurfaceEvent::Focused => {
                let window = self.endpoint.sender().parent_of(id).unwrap_or(id);
                if self.windows.contains_key(&window) {
                    self.focused = Some(window);
                }
                Ok(())
            }
            SurfaceEvent::Destroyed => self.close_surface(id),
        }
    }

    fn surface_ready(&mut self, id: SurfaceId) -> Result<()> {
        let sender = self.endpoint.sender();
        if !sender.is_alive(id) {
            return Err(OliveError::WindowNotFound(id.to_string()));
        }

        let stored = PreferencesPatch::from_value(&self.preferences.get());
        if self.initialized.insert(id) {
            sender.send(id, &self.channels.operating_system, &self.os)?;
            sender.send(id, &self.channels.initial_settings, &stored)?;
        }
        sender.send(id, &self.channels.settings, &stored)?;

        if let Some(doc) = self.windows.get_mut(&id).and_then(|w| w.pending.take()) {
            sender.send(id, &self.channels.file_content, &doc)?;
        }
        log::debug!("{} ready", id);
        Ok(())
    }

    /// Tear down a surface. Closing a main surface closes its whole window.
    fn close_surface(&mut self, id: SurfaceId) -> Result<()> {
        let sender = self.endpoint.sender();
        if let Some(window) = self.windows.remove(&id) {
            if let Some(help) = window.help.filter(|h| sender.is_alive(*h)) {
                self.initialized.remove(&help);
                self.endpoint.destroy_surface(help)?;
            }
        } else {
            for window in self.windows.values_mut() {
                if window.help == Some(id) {
                    window.help = None;
                }
            }
        }
        if self.focused == Some(id) {
            self.focused = None;
        }
        self.initialized.remove(&id);

        if sender.is_alive(id) {
            self.endpoint.destroy_surface(id)?;
        } else {
            log::debug!("{} already closed", id);
        }
        Ok(())
    }

    /// Run a menu command for the window whose main surface is `window`.
    pub async fn handle_menu(&mut self, window: SurfaceId, command: MenuCommand) -> Result<MenuOutcome> {
        if !self.windows.contains_key(&window) {
            return Err(OliveError::WindowNotFound(window.to_string()));
        }
        let sender = self.endpoint.sender();
        log::debug!("Menu {:?} on {}", command, window);

        match command {
            MenuCommand::New => {
                let endpoint = self.open_window(PageData::default(), None)?;
                Ok(self.queue_opened(endpoint))
            }
            MenuCommand::Reset => {
                let path = self.windows.get(&window).and_then(|w| w.page.filepath.clone());
                let doc = match path {
                    Some(path) => match read_document(&path).await {
                        Ok(doc) => doc,
                        Err(e) => {
                            self.report_open_error(&path, &e);
                            return Ok(MenuOutcome::Nothing);
                        }
                    },
                    None => VerboseDocument::new(),
                };
                sender.send(window, &self.channels.file_content, &doc)?;
                Ok(MenuOutcome::Sent)
            }
            MenuCommand::Open => {
                let Some(path) = self.dialogs.choose_open_path(window) else {
                    return Ok(MenuOutcome::Nothing);
                };
                match self.open_window_with_file(&path).await {
                    Ok(endpoint) => {
                        let outcome = self.queue_opened(endpoint);
                        self.close_surface(window)?;
                        Ok(outcome)
                    }
                    Err(e) => {
                        self.report_open_error(&path, &e);
                        Ok(MenuOutcome::Nothing)
                    }
                }
            }
            MenuCommand::Save => {
                if let Some(w) = self.windows.get_mut(&window) {
                    w.page.save_without_dialog = true;
                }
                sender.send(window, &self.channels.save_request, &true)?;
                Ok(MenuOutcome::Sent)
            }
            MenuCommand::SaveAs => {
                sender.send(window, &self.channels.save_request, &true)?;
                Ok(MenuOutcome::Sent)
            }
            MenuCommand::SetColor(color) => {
                if let Some(w) = self.windows.get_mut(&window) {
                    w.menu.color = Some(color);
                }
                sender.send(window, &self.channels.set_color, &Some(color))?;
                Ok(MenuOutcome::Sent)
            }
            MenuCommand::ToggleEraseMode => {
                let on = self.toggle_menu(window, |menu| &mut menu.erase_mode);
                sender.send(window, &self.channels.erase_mode, &on)?;
                Ok(MenuOutcome::Sent)
            }
            MenuCommand::ToggleDisappearingMode => {
                let on = self.toggle_menu(window, |menu| &mut menu.disappearing_mode);
                sender.send(window, &self.channels.disappearing_mode, &on)?;
                Ok(MenuOutcome::Sent)
            }
            MenuCommand::ToggleHelp => {
                let help = self
                    .windows
                    .get(&window)
                    .and_then(|w| w.help)
                    .filter(|h| sender.is_alive(*h));
                match help {
                    Some(help) => {
                        self.close_surface(help)?;
                        Ok(MenuOutcome::Closed(help))
                    }
                    None => Ok(MenuOutcome::Opened(self.open_help(window)?)),
                }
            }
            MenuCommand::Close => {
                self.close_surface(window)?;
                Ok(MenuOutcome::Closed(window))
            }
        }
    }

    fn queue_opened(&mut self, endpoint: SurfaceEndpoint) -> MenuOutcome {
        let id = endpoint.id();
        self.opened.push(OpenedSurface {
            window: id,
            kind: PageKind::Main,
            endpoint,
        });
        MenuOutcome::Opened(id)
    }

    fn toggle_menu(&mut self, window: SurfaceId, field: impl Fn(&mut MenuState) -> &mut bool) -> bool {
        match self.windows.get_mut(&window) {
            Some(w) => {
                let flag = field(&mut w.menu);
                *flag = !*flag;
                *flag
            }
            None => false,
        }
    }

    fn report_open_error(&self, path: &Path, e: &OliveError) {
        log::error!("Failed to open {}: {}", path.display(), e);
        let detail = if e.is_unreadable_file() {
            UNREADABLE_FILE_DETAIL
        } else {
            READ_FAILED_DETAIL
        };
        self.dialogs.show_error(UNABLE_TO_OPEN, detail);
    }

    /// Deliver queued messages and carry out what they asked for.
    ///
    /// Returns the number of messages taken. Failures are logged and
    /// reported to the user, never returned.
    pub async fn pump(&mut self) -> usize {
        let handled = self.endpoint.dispatch_pending();
        self.run_actions().await;
        handled
    }

    /// Wait for one message, then carry out everything it queued.
    pub async fn pump_next(&mut self) -> bool {
        let received = self.endpoint.dispatch_next().await;
        self.run_actions().await;
        received
    }

    async fn run_actions(&mut self) {
        while let Ok(action) = self.actions_rx.try_recv() {
            if let Err(e) = self.run_action(action).await {
                log::error!("Host action failed: {}", e);
            }
        }
    }

    async fn run_action(&mut self, action: HostAction) -> Result<()> {
        match action {
            HostAction::StoreSettings(patch) => {
                self.preferences.set(&patch.to_value()?)?;
                let stored = PreferencesPatch::from_value(&self.preferences.get());
                self.endpoint
                    .sender()
                    .send_to_all_windows(&self.channels.settings, &stored)?;
            }
            HostAction::ColorChosen { window, color } => {
                if let (Some(w), Some(color)) = (self.windows.get_mut(&window), color) {
                    w.menu.color = Some(color);
                }
            }
            HostAction::EraseModeToggled { window } => {
                let on = self.toggle_menu(window, |menu| &mut menu.erase_mode);
                self.endpoint.sender().send(window, &self.channels.erase_mode, &on)?;
            }
            HostAction::CloseChild { window, page } => {
                let child = PageKind::parse(&page)
                    .filter(|kind| *kind != PageKind::Main)
                    .and_then(|kind| self.windows.get(&window).and_then(|w| w.surface_for(kind)));
                match child {
                    Some(child) => self.close_surface(child)?,
                    None => log::warn!("{} asked to close unknown page '{}'", window, page),
                }
            }
            HostAction::Save { window, doc } => self.save(window, doc).await?,
        }
        Ok(())
    }

    async fn save(&mut self, window: SurfaceId, doc: VerboseDocument) -> Result<()> {
        let encoding = self.config.documents.encoding();
        let pretty = self.config.documents.pretty;

        let w = self
            .windows
            .get_mut(&window)
            .ok_or_else(|| OliveError::WindowNotFound(window.to_string()))?;
        let silent_path = if w.page.save_without_dialog {
            w.page.filepath.clone()
        } else {
            None
        };
        w.page.save_without_dialog = false;
        let current = w.page.filepath.clone();

        let target = match silent_path {
            Some(path) => path,
            None => match self.dialogs.choose_save_path(window, current.as_deref()) {
                Some(path) => path,
                None => {
                    log::debug!("Save cancelled for {}", window);
                    return Ok(());
                }
            },
        };

        match write_document(&target, &doc, encoding, pretty).await {
            Ok(written) => {
                if let Some(w) = self.windows.get_mut(&window) {
                    w.page.filepath = Some(written);
                }
            }
            Err(e) => {
                log::error!("Failed to save {}: {}", target.display(), e);
                self.dialogs.show_error(UNABLE_TO_SAVE, SAVE_FAILED_DETAIL);
            }
        }
        Ok(())
    }
}

fn queue(tx: &mpsc::UnboundedSender<HostAction>, action: HostAction) {
    if tx.send(action).is_err() {
        log::debug!("Host gone, dropped action");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Character, Encoding, OliFile};
    use crate::ipc::{Channel, HostSends, Payload};
    use std::collections::VecDeque;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct ScriptedDialogs {
        open: Mutex<VecDeque<Option<PathBuf>>>,
        save: Mutex<VecDeque<Option<PathBuf>>>,
        save_prompts: Mutex<usize>,
        errors: Mutex<Vec<String>>,
    }

    impl Dialogs for ScriptedDialogs {
        fn choose_open_path(&self, _window: SurfaceId) -> Option<PathBuf> {
            self.open.lock().unwrap().pop_front().flatten()
        }

        fn choose_save_path(&self, _window: SurfaceId, _default: Option<&Path>) -> Option<PathBuf> {
            *self.save_prompts.lock().unwrap() += 1;
            self.save.lock().unwrap().pop_front().flatten()
        }

        fn show_error(&self, title: &str, _message: &str) {
            self.errors.lock().unwrap().push(title.to_string());
        }
    }

    fn app(temp: &TempDir) -> HostApp<ScriptedDialogs> {
        let mut config = Config::default();
        config.preferences.path = temp.path().join("preferences.json");
        HostApp::new(config, ScriptedDialogs::default()).unwrap()
    }

    fn record<T: Payload, D: HostSends>(
        surface: &mut SurfaceEndpoint,
        channel: &Channel<T, D>,
        seen: &Arc<Mutex<Vec<String>>>,
    ) {
        let log = Arc::clone(seen);
        let name = channel.name().to_string();
        surface.on_update(channel, move |_| log.lock().unwrap().push(name.clone()));
    }

    fn letter() -> VerboseDocument {
        VerboseDocument {
            content: vec![Character::new("H", 10.0, 20.0, false)],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_ready_sends_environment_then_settings_then_document() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("letter.oli");
        write_document(&path, &letter(), Encoding::Compact, false).await.unwrap();

        let mut host = app(&temp);
        let channels = Arc::clone(host.channels());
        let mut surface = host.open_window_with_file(&path).await.unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        record(&mut surface, &channels.operating_system, &seen);
        record(&mut surface, &channels.initial_settings, &seen);
        record(&mut surface, &channels.settings, &seen);
        record(&mut surface, &channels.file_content, &seen);

        host.surface_event(surface.id(), SurfaceEvent::Ready).unwrap();
        surface.dispatch_pending();
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["OPERATING_SYSTEM", "INITIAL_SETTINGS", "SETTINGS", "FILE_CONTENT"]
        );

        // Environment, initial settings and the document go out once per surface.
        seen.lock().unwrap().clear();
        host.surface_event(surface.id(), SurfaceEvent::Ready).unwrap();
        surface.dispatch_pending();
        assert_eq!(*seen.lock().unwrap(), vec!["SETTINGS"]);
    }

    #[tokio::test]
    async fn test_initial_settings_sent_once_per_surface() {
        let temp = TempDir::new().unwrap();
        let mut host = app(&temp);
        let channels = Arc::clone(host.channels());
        let mut surface = host.create_window(PageData::default()).unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        record(&mut surface, &channels.initial_settings, &seen);
        record(&mut surface, &channels.operating_system, &seen);

        for _ in 0..3 {
            host.surface_event(surface.id(), SurfaceEvent::Ready).unwrap();
        }
        surface.dispatch_pending();
        assert_eq!(*seen.lock().unwrap(), vec!["OPERATING_SYSTEM", "INITIAL_SETTINGS"]);
    }

    #[tokio::test]
    async fn test_settings_persisted_and_broadcast() {
        let temp = TempDir::new().unwrap();
        let mut host = app(&temp);
        let channels = Arc::clone(host.channels());
        let a = host.create_window(PageData::default()).unwrap();
        let mut b = host.create_window(PageData::default()).unwrap();

        let received = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&received);
        b.on_update(&channels.settings, move |patch| *slot.lock().unwrap() = Some(patch));

        let patch = PreferencesPatch {
            ink_bleed: Some(true),
            ..Default::default()
        };
        a.send(&channels.settings, &patch).unwrap();
        host.pump().await;
        b.dispatch_pending();

        assert_eq!(*received.lock().unwrap(), Some(patch));
        assert_eq!(host.preferences().get(), serde_json::json!({"inkBleed": true}));
    }

    #[tokio::test]
    async fn test_erase_mode_toggles_menu_and_echoes() {
        let temp = TempDir::new().unwrap();
        let mut host = app(&temp);
        let channels = Arc::clone(host.channels());
        let mut surface = host.create_window(PageData::default()).unwrap();
        let echoed = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&echoed);
        surface.on_update(&channels.erase_mode, move |on| log.lock().unwrap().push(on));

        surface.send(&channels.erase_mode, &true).unwrap();
        host.pump().await;
        surface.send(&channels.erase_mode, &true).unwrap();
        host.pump().await;
        surface.dispatch_pending();

        assert_eq!(*echoed.lock().unwrap(), vec![true, false]);
        assert!(!host.window(surface.id()).unwrap().menu.erase_mode);
    }

    #[tokio::test]
    async fn test_set_color_updates_menu() {
        let temp = TempDir::new().unwrap();
        let mut host = app(&temp);
        let channels = Arc::clone(host.channels());
        let surface = host.create_window(PageData::default()).unwrap();

        surface.send(&channels.set_color, &Some(ColorName::Green)).unwrap();
        host.pump().await;
        assert_eq!(host.window(surface.id()).unwrap().menu.color, Some(ColorName::Green));

        surface.send(&channels.set_color, &None).unwrap();
        host.pump().await;
        assert_eq!(host.window(surface.id()).unwrap().menu.color, Some(ColorName::Green));
    }

    #[tokio::test]
    async fn test_help_toggles_and_closes_from_child() {
        let temp = TempDir::new().unwrap();
        let mut host = app(&temp);
        let channels = Arc::clone(host.channels());
        let main = host.create_window(PageData::default()).unwrap();

        let outcome = host.handle_menu(main.id(), MenuCommand::ToggleHelp).await.unwrap();
        let MenuOutcome::Opened(help_id) = outcome else {
            panic!("expected help page to open, got {:?}", outcome);
        };
        let opened = host.take_opened_surfaces();
        assert_eq!(opened.len(), 1);
        assert_eq!(opened[0].kind, PageKind::Help);
        assert_eq!(opened[0].window, main.id());

        // A main page cannot close itself through CLOSE_MODEL.
        main.send(&channels.close_model, &"help".to_string()).unwrap();
        host.pump().await;
        assert_eq!(host.window(main.id()).unwrap().help, Some(help_id));

        opened[0].endpoint.send(&channels.close_model, &"help".to_string()).unwrap();
        host.pump().await;
        assert_eq!(host.window(main.id()).unwrap().help, None);
        assert_eq!(host.open_surface_count(), 1);

        let outcome = host.handle_menu(main.id(), MenuCommand::ToggleHelp).await.unwrap();
        assert!(matches!(outcome, MenuOutcome::Opened(_)));
        let outcome = host.handle_menu(main.id(), MenuCommand::ToggleHelp).await.unwrap();
        assert!(matches!(outcome, MenuOutcome::Closed(_)));
    }

    #[tokio::test]
    async fn test_first_launch_opens_help() {
        let temp = TempDir::new().unwrap();
        let mut host = app(&temp);
        let main = host
            .create_window(PageData {
                first_launch: true,
                ..Default::default()
            })
            .unwrap();
        assert!(host.window(main.id()).unwrap().help.is_some());
        assert_eq!(host.take_opened_surfaces().len(), 1);
    }

    #[tokio::test]
    async fn test_destroying_main_closes_window_and_help() {
        let temp = TempDir::new().unwrap();
        let mut host = app(&temp);
        let main = host.create_window(PageData::default()).unwrap();
        host.handle_menu(main.id(), MenuCommand::ToggleHelp).await.unwrap();
        assert_eq!(host.open_surface_count(), 2);
        let mut help = host.take_opened_surfaces().pop().unwrap().endpoint;

        host.surface_event(main.id(), SurfaceEvent::Destroyed).unwrap();
        assert_eq!(host.open_surface_count(), 0);
        assert!(host.window_ids().is_empty());
        assert!(!help.dispatch_next().await);
        // Already gone
        host.surface_event(main.id(), SurfaceEvent::Destroyed).unwrap();
    }

    #[tokio::test]
    async fn test_save_uses_dialog_then_remembers_path() {
        let temp = TempDir::new().unwrap();
        let mut host = app(&temp);
        let channels = Arc::clone(host.channels());
        let surface = host.create_window(PageData::default()).unwrap();

        host.dialogs().save.lock().unwrap().push_back(Some(temp.path().join("draft")));
        host.handle_menu(surface.id(), MenuCommand::Save).await.unwrap();
        surface.send(&channels.file_content, &letter()).unwrap();
        host.pump().await;

        let written = temp.path().join("draft.oli");
        assert_eq!(*host.dialogs().save_prompts.lock().unwrap(), 1);
        assert_eq!(host.window(surface.id()).unwrap().page.filepath, Some(written.clone()));
        let bytes = std::fs::read(&written).unwrap();
        assert!(matches!(OliFile::decode(&bytes).unwrap(), OliFile::V2(_)));

        // Second Save writes silently to the remembered path.
        host.handle_menu(surface.id(), MenuCommand::Save).await.unwrap();
        surface.send(&channels.file_content, &VerboseDocument::new()).unwrap();
        host.pump().await;
        assert_eq!(*host.dialogs().save_prompts.lock().unwrap(), 1);
        assert!(read_document(&written).await.unwrap().is_blank());
        assert!(!host.window(surface.id()).unwrap().page.save_without_dialog);
    }

    #[tokio::test]
    async fn test_save_as_always_asks() {
        let temp = TempDir::new().unwrap();
        let mut host = app(&temp);
        let channels = Arc::clone(host.channels());
        let existing = temp.path().join("letter.oli");
        let surface = host.create_window(PageData::for_file(&existing)).unwrap();

        host.handle_menu(surface.id(), MenuCommand::SaveAs).await.unwrap();
        surface.send(&channels.file_content, &letter()).unwrap();
        host.pump().await;

        // Cancelled: nothing written, path unchanged.
        assert_eq!(*host.dialogs().save_prompts.lock().unwrap(), 1);
        assert!(!existing.exists());
        assert_eq!(host.window(surface.id()).unwrap().page.filepath, Some(existing));
    }

    #[tokio::test]
    async fn test_failed_write_reports_and_keeps_path() {
        let temp = TempDir::new().unwrap();
        let mut host = app(&temp);
        let channels = Arc::clone(host.channels());
        let surface = host.create_window(PageData::default()).unwrap();

        host.dialogs()
            .save
            .lock()
            .unwrap()
            .push_back(Some(temp.path().join("missing").join("dir").join("doc")));
        surface.send(&channels.file_content, &letter()).unwrap();
        host.pump().await;

        assert_eq!(*host.dialogs().errors.lock().unwrap(), vec![UNABLE_TO_SAVE]);
        assert_eq!(host.window(surface.id()).unwrap().page.filepath, None);
    }

    #[tokio::test]
    async fn test_open_replaces_window() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("letter.oli");
        write_document(&path, &letter(), Encoding::Verbose, false).await.unwrap();

        let mut host = app(&temp);
        let old = host.create_window(PageData::default()).unwrap();
        host.dialogs().open.lock().unwrap().push_back(Some(temp.path().join("letter")));

        let outcome = host.handle_menu(old.id(), MenuCommand::Open).await.unwrap();
        let MenuOutcome::Opened(new_id) = outcome else {
            panic!("expected a new window, got {:?}", outcome);
        };
        assert_eq!(host.window_ids(), vec![new_id]);
        assert_eq!(host.window(new_id).unwrap().page.filepath, Some(path));
        assert!(host.window(new_id).unwrap().pending.is_some());
        assert_eq!(host.take_opened_surfaces().len(), 1);
    }

    #[tokio::test]
    async fn test_open_unreadable_file_reports() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("future.oli");
        std::fs::write(&path, br#"{"version": 3.0}"#).unwrap();

        let mut host = app(&temp);
        let window = host.create_window(PageData::default()).unwrap();
        host.dialogs().open.lock().unwrap().push_back(Some(path));

        let outcome = host.handle_menu(window.id(), MenuCommand::Open).await.unwrap();
        assert_eq!(outcome, MenuOutcome::Nothing);
        assert_eq!(*host.dialogs().errors.lock().unwrap(), vec![UNABLE_TO_OPEN]);
        assert_eq!(host.window_ids(), vec![window.id()]);
    }

    #[tokio::test]
    async fn test_reset_without_path_sends_blank_document() {
        let temp = TempDir::new().unwrap();
        let mut host = app(&temp);
        let channels = Arc::clone(host.channels());
        let mut surface = host.create_window(PageData::default()).unwrap();
        let received = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&received);
        surface.on_update(&channels.file_content, move |doc| *slot.lock().unwrap() = Some(doc));

        host.handle_menu(surface.id(), MenuCommand::Reset).await.unwrap();
        surface.dispatch_pending();
        assert!(received.lock().unwrap().as_ref().unwrap().is_blank());
    }

    #[tokio::test]
    async fn test_menu_on_unknown_window() {
        let temp = TempDir::new().unwrap();
        let mut host = app(&temp);
        let err = host.handle_menu(SurfaceId(42), MenuCommand::Save).await.unwrap_err();
        assert!(matches!(err, OliveError::WindowNotFound(_)));
    }
}
