//! Main application state and control flow for the play-and-record screen.
//!
//! This module wires the session controller to the terminal: it owns the
//! event loop, routes keys either to the screen or to the file picker overlay,
//! and turns picker results into local copies before handing them to the
//! controller.

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::info;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{
    error::Error,
    io,
    path::{Path, PathBuf},
    time::Duration,
};

use super::audio::DeviceBackend;
use super::picker::{Picker, PickerFocus};
use super::ui;
use tapeloop::config::Config;
use tapeloop::session::{AudioBackend, Controller, PickOutcome};
use tapeloop::storage::{ensure_dir, import_copy};

pub struct App<B: AudioBackend = DeviceBackend> {
    pub should_quit: bool,
    pub controller: Controller<B>,
    pub picker: Option<Picker>,
    browse_dir: PathBuf,
    inbox_dir: PathBuf,
}

impl<B: AudioBackend> App<B> {
    pub fn new(backend: B, config: &Config) -> Self {
        Self {
            should_quit: false,
            controller: Controller::new(backend, config.documents_path()),
            picker: None,
            browse_dir: config.browse_path(),
            inbox_dir: config.inbox_path(),
        }
    }

    pub fn open_picker(&mut self) {
        if self.picker.is_none() {
            self.picker = Some(Picker::new(&self.browse_dir));
        }
    }

    pub fn cancel_picker(&mut self) {
        if self.picker.take().is_some() {
            self.controller.handle_pick(PickOutcome::Cancelled);
        }
    }

    /// Copy `path` into app storage and select the copy.
    pub fn pick_file(&mut self, path: &Path) {
        if let Some(picker) = self.picker.take() {
            // Reopen where the user left off
            self.browse_dir = picker.current_path;
        }

        match import_copy(path, &self.inbox_dir) {
            Ok(copy) => self.controller.handle_pick(PickOutcome::Picked(copy)),
            Err(e) => {
                log::error!("Could not copy {} into app storage: {e}", path.display());
                self.controller.handle_pick(PickOutcome::Cancelled);
            }
        }
    }

    /// The action control was pressed. Ignored while the control is disabled.
    pub fn press_action(&mut self) {
        if self.controller.action_enabled() {
            self.controller.toggle();
        }
    }

    pub fn quit(&mut self) {
        if self.controller.is_playing() {
            self.controller.stop_playback_and_recording();
        }
        self.should_quit = true;
    }
}

pub fn run_with_file(file_path: Option<&str>) -> Result<(), Box<dyn Error>> {
    let config = Config::load()?;

    init_logging(&config)?;
    info!("Starting tapeloop");

    ensure_dir(&config.documents_path())?;

    let mut app = App::new(DeviceBackend::new(), &config);
    app.controller.setup_audio_session();

    if let Some(path) = file_path {
        let path = Path::new(path);
        if !path.is_file() {
            return Err(format!("No such file: {}", path.display()).into());
        }
        app.pick_file(path);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = res {
        eprintln!("Error: {e}");
        return Err(e);
    }

    if app.controller.recording_path().exists() {
        println!(
            "Last recording: {}",
            app.controller.recording_path().display()
        );
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend, A: AudioBackend>(
    terminal: &mut Terminal<B>,
    app: &mut App<A>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        // Poll for events with a short timeout to keep the clocks moving
        if event::poll(Duration::from_millis(50))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            handle_key_event(app, key);
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key_event<B: AudioBackend>(app: &mut App<B>, key: event::KeyEvent) {
    if app.picker.is_some() {
        handle_picker_keys(app, key);
    } else {
        handle_screen_keys(app, key);
    }
}

fn handle_screen_keys<B: AudioBackend>(app: &mut App<B>, key: event::KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(event::KeyModifiers::CONTROL) => app.quit(),
        KeyCode::Char('o') | KeyCode::Char('/') => app.open_picker(),
        KeyCode::Char(' ') | KeyCode::Enter => app.press_action(),
        _ => {}
    }
}

fn handle_picker_keys<B: AudioBackend>(app: &mut App<B>, key: event::KeyEvent) {
    let Some(picker) = app.picker.as_mut() else {
        return;
    };

    if key.code == KeyCode::Esc {
        if picker.focus == PickerFocus::Search {
            picker.hide_search();
        } else {
            app.cancel_picker();
        }
        return;
    }

    let focus = picker.focus;
    match focus {
        PickerFocus::Search => match key.code {
            KeyCode::Enter => picker.hide_search(),
            KeyCode::Backspace => picker.pop_char(),
            KeyCode::Char('c' | 'k') if key.modifiers.contains(event::KeyModifiers::CONTROL) => {
                picker.clear_search();
            }
            KeyCode::Char(c) => picker.push_char(c),
            _ => {}
        },
        PickerFocus::List => match key.code {
            KeyCode::Up | KeyCode::Char('k') => picker.select_previous(),
            KeyCode::Down | KeyCode::Char('j') => picker.select_next(),
            KeyCode::Backspace | KeyCode::Left | KeyCode::Char('h') => picker.go_to_parent(),
            KeyCode::Char('/') => picker.show_search(),
            KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
                if let Some(path) = picker.activate() {
                    app.pick_file(&path);
                }
            }
            KeyCode::Char('q') => app.cancel_picker(),
            _ => {}
        },
    }
}

fn init_logging(config: &Config) -> Result<(), Box<dyn Error>> {
    use simplelog::{CombinedLogger, WriteLogger};
    use std::fs::File;

    CombinedLogger::init(vec![WriteLogger::new(
        config.log_level_filter()?,
        simplelog::Config::default(),
        File::create(&config.log_file)?,
    )])?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent, KeyModifiers};
    use std::fs;
    use tapeloop::session::{PlaybackHandle, RecordingHandle, RecordingSettings};
    use tempfile::TempDir;

    struct SilentBackend;

    struct SilentPlayer {
        playing: bool,
        position: Duration,
    }

    impl PlaybackHandle for SilentPlayer {
        fn prepare_to_play(&mut self) {}
        fn set_number_of_loops(&mut self, _loops: i32) {}
        fn play(&mut self) {
            self.playing = true;
            self.position = Duration::from_secs(1);
        }
        fn stop(&mut self) {
            self.playing = false;
        }
        fn is_playing(&self) -> bool {
            self.playing
        }
        fn current_time(&self) -> Duration {
            self.position
        }
        fn set_current_time(&mut self, time: Duration) {
            self.position = time;
        }
        fn duration(&self) -> Duration {
            Duration::from_secs(3)
        }
    }

    struct SilentRecorder {
        recording: bool,
    }

    impl RecordingHandle for SilentRecorder {
        fn record(&mut self) -> Result<(), Box<dyn Error>> {
            self.recording = true;
            Ok(())
        }
        fn stop(&mut self) {
            self.recording = false;
        }
        fn is_recording(&self) -> bool {
            self.recording
        }
        fn current_time(&self) -> Duration {
            Duration::ZERO
        }
    }

    impl AudioBackend for SilentBackend {
        fn activate_session(&mut self) -> Result<(), Box<dyn Error>> {
            Ok(())
        }

        fn create_player(
            &mut self,
            _path: &Path,
        ) -> Result<Box<dyn PlaybackHandle>, Box<dyn Error>> {
            Ok(Box::new(SilentPlayer {
                playing: false,
                position: Duration::ZERO,
            }))
        }

        fn create_recorder(
            &mut self,
            _path: &Path,
            _settings: &RecordingSettings,
        ) -> Result<Box<dyn RecordingHandle>, Box<dyn Error>> {
            Ok(Box::new(SilentRecorder { recording: false }))
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn test_app(temp_dir: &TempDir) -> App<SilentBackend> {
        let mut config = Config::new();
        config.documents_dir = temp_dir.path().join("docs").to_string_lossy().to_string();
        config.browse_dir = temp_dir.path().join("music").to_string_lossy().to_string();
        fs::create_dir_all(temp_dir.path().join("music")).unwrap();
        fs::write(temp_dir.path().join("music").join("groove.wav"), b"RIFF").unwrap();
        App::new(SilentBackend, &config)
    }

    #[test]
    fn test_action_ignored_until_file_picked() {
        let temp_dir = TempDir::new().unwrap();
        let mut app = test_app(&temp_dir);

        handle_key_event(&mut app, key(KeyCode::Char(' ')));

        assert!(!app.controller.is_playing());
    }

    #[test]
    fn test_pick_copies_into_inbox() {
        let temp_dir = TempDir::new().unwrap();
        let mut app = test_app(&temp_dir);

        app.open_picker();
        assert!(app.picker.is_some());

        // ".." then groove.wav
        handle_key_event(&mut app, key(KeyCode::Down));
        handle_key_event(&mut app, key(KeyCode::Enter));

        assert!(app.picker.is_none());
        assert_eq!(app.controller.file_label(), Some("groove"));
        assert!(app.controller.action_enabled());

        let selected = app.controller.selected().unwrap();
        assert!(selected.starts_with(temp_dir.path().join("docs").join("Inbox")));
        assert!(selected.exists());
    }

    #[test]
    fn test_escape_cancels_picker_without_changes() {
        let temp_dir = TempDir::new().unwrap();
        let mut app = test_app(&temp_dir);

        handle_key_event(&mut app, key(KeyCode::Char('o')));
        handle_key_event(&mut app, key(KeyCode::Esc));

        assert!(app.picker.is_none());
        assert!(!app.should_quit);
        assert!(app.controller.file_label().is_none());
        assert!(!app.controller.action_enabled());
    }

    #[test]
    fn test_escape_leaves_search_first() {
        let temp_dir = TempDir::new().unwrap();
        let mut app = test_app(&temp_dir);

        app.open_picker();
        handle_key_event(&mut app, key(KeyCode::Char('/')));
        handle_key_event(&mut app, key(KeyCode::Char('g')));
        handle_key_event(&mut app, key(KeyCode::Esc));

        let picker = app.picker.as_ref().unwrap();
        assert_eq!(picker.focus, PickerFocus::List);
        assert_eq!(picker.query, "g");
    }

    #[test]
    fn test_toggle_through_keys() {
        let temp_dir = TempDir::new().unwrap();
        let mut app = test_app(&temp_dir);
        app.pick_file(&temp_dir.path().join("music").join("groove.wav"));

        handle_key_event(&mut app, key(KeyCode::Char(' ')));
        assert!(app.controller.is_playing());
        assert!(app.controller.is_recording());

        handle_key_event(&mut app, key(KeyCode::Enter));
        assert!(!app.controller.is_playing());
        assert!(!app.controller.is_recording());
        assert_eq!(app.controller.playback_position(), Duration::ZERO);
    }

    #[test]
    fn test_quit_stops_session() {
        let temp_dir = TempDir::new().unwrap();
        let mut app = test_app(&temp_dir);
        app.pick_file(&temp_dir.path().join("music").join("groove.wav"));
        app.press_action();

        handle_key_event(&mut app, key(KeyCode::Char('q')));

        assert!(app.should_quit);
        assert!(!app.controller.is_playing());
    }

    #[test]
    fn test_pick_during_session_stops_it() {
        let temp_dir = TempDir::new().unwrap();
        let mut app = test_app(&temp_dir);
        app.pick_file(&temp_dir.path().join("music").join("groove.wav"));
        app.press_action();
        assert!(app.controller.is_recording());

        handle_key_event(&mut app, key(KeyCode::Char('o')));
        handle_key_event(&mut app, key(KeyCode::Down));
        handle_key_event(&mut app, key(KeyCode::Enter));

        assert!(app.picker.is_none());
        assert!(!app.controller.is_playing());
        assert!(!app.controller.is_recording());
        assert!(app.controller.has_player());
    }

    #[test]
    fn test_failed_copy_is_treated_as_cancel() {
        let temp_dir = TempDir::new().unwrap();
        let mut app = test_app(&temp_dir);

        app.pick_file(&temp_dir.path().join("music").join("missing.wav"));

        assert!(app.controller.file_label().is_none());
        assert!(!app.controller.action_enabled());
    }
}
