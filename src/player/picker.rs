//! Modal file picker restricted to audio content.
//!
//! The picker walks the filesystem one directory at a time and only offers
//! subdirectories and audio files the player can decode. Typing after `/`
//! narrows the listing with fuzzy matching on names. Choosing a file hands
//! its path back to the caller; the caller owns the decision to copy it.

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use std::fs;
use std::path::{Path, PathBuf};

use tapeloop::media::is_supported_audio_file;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerEntry {
    Parent,
    Directory(String),
    Audio(String),
}

impl PickerEntry {
    pub fn name(&self) -> &str {
        match self {
            PickerEntry::Parent => "..",
            PickerEntry::Directory(name) | PickerEntry::Audio(name) => name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PickerFocus {
    List,
    Search,
}

pub struct Picker {
    pub current_path: PathBuf,
    pub entries: Vec<PickerEntry>,
    pub filtered: Vec<usize>,
    pub selected: usize,
    pub query: String,
    pub focus: PickerFocus,
    matcher: SkimMatcherV2,
}

impl Picker {
    pub fn new(start: &Path) -> Self {
        let current_path = start
            .canonicalize()
            .unwrap_or_else(|_| start.to_path_buf());

        let mut picker = Self {
            current_path,
            entries: Vec::new(),
            filtered: Vec::new(),
            selected: 0,
            query: String::new(),
            focus: PickerFocus::List,
            matcher: SkimMatcherV2::default(),
        };
        picker.refresh();
        picker
    }

    pub fn refresh(&mut self) {
        self.entries.clear();

        let mut directories = Vec::new();
        let mut files = Vec::new();

        match fs::read_dir(&self.current_path) {
            Ok(read_dir) => {
                for entry in read_dir.flatten() {
                    let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                        continue;
                    };
                    // Skip hidden entries
                    if name.starts_with('.') {
                        continue;
                    }

                    let path = entry.path();
                    if path.is_dir() {
                        directories.push(name);
                    } else if path.is_file() && is_supported_audio_file(&path) {
                        files.push(name);
                    }
                }
            }
            Err(e) => log::warn!("Could not read {}: {e}", self.current_path.display()),
        }

        directories.sort_by_key(|name| name.to_lowercase());
        files.sort_by_key(|name| name.to_lowercase());

        if self.current_path.parent().is_some() {
            self.entries.push(PickerEntry::Parent);
        }
        self.entries
            .extend(directories.into_iter().map(PickerEntry::Directory));
        self.entries.extend(files.into_iter().map(PickerEntry::Audio));

        self.apply_filter();
    }

    fn apply_filter(&mut self) {
        if self.query.is_empty() {
            self.filtered = (0..self.entries.len()).collect();
        } else {
            let mut scored: Vec<(usize, i64)> = self
                .entries
                .iter()
                .enumerate()
                .filter(|(_, entry)| **entry != PickerEntry::Parent)
                .filter_map(|(idx, entry)| {
                    self.matcher
                        .fuzzy_match(entry.name(), &self.query)
                        .map(|score| (idx, score))
                })
                .collect();

            // Highest score first, stable for ties
            scored.sort_by(|a, b| b.1.cmp(&a.1));
            self.filtered = scored.into_iter().map(|(idx, _)| idx).collect();
        }

        if self.selected >= self.filtered.len() {
            self.selected = 0;
        }
    }

    pub fn visible_entries(&self) -> Vec<&PickerEntry> {
        self.filtered
            .iter()
            .filter_map(|&idx| self.entries.get(idx))
            .collect()
    }

    pub fn selected_entry(&self) -> Option<&PickerEntry> {
        self.filtered
            .get(self.selected)
            .and_then(|&idx| self.entries.get(idx))
    }

    pub fn select_next(&mut self) {
        if !self.filtered.is_empty() {
            self.selected = (self.selected + 1) % self.filtered.len();
        }
    }

    pub fn select_previous(&mut self) {
        if !self.filtered.is_empty() {
            if self.selected == 0 {
                self.selected = self.filtered.len() - 1;
            } else {
                self.selected -= 1;
            }
        }
    }

    pub fn go_to_parent(&mut self) {
        if let Some(parent) = self.current_path.parent() {
            self.current_path = parent.to_path_buf();
            self.reset_view();
        }
    }

    fn enter_directory(&mut self, name: &str) {
        self.current_path = self.current_path.join(name);
        self.reset_view();
    }

    fn reset_view(&mut self) {
        self.query.clear();
        self.focus = PickerFocus::List;
        self.selected = 0;
        self.refresh();
    }

    /// Act on the highlighted entry. Directories are entered in place; an
    /// audio file is returned as the pick.
    pub fn activate(&mut self) -> Option<PathBuf> {
        match self.selected_entry().cloned()? {
            PickerEntry::Parent => {
                self.go_to_parent();
                None
            }
            PickerEntry::Directory(name) => {
                self.enter_directory(&name);
                None
            }
            PickerEntry::Audio(name) => Some(self.current_path.join(name)),
        }
    }

    pub fn show_search(&mut self) {
        self.focus = PickerFocus::Search;
    }

    pub fn hide_search(&mut self) {
        self.focus = PickerFocus::List;
    }

    pub fn push_char(&mut self, c: char) {
        self.query.push(c);
        self.apply_filter();
    }

    pub fn pop_char(&mut self) {
        self.query.pop();
        self.apply_filter();
    }

    pub fn clear_search(&mut self) {
        self.query.clear();
        self.apply_filter();
    }
}
