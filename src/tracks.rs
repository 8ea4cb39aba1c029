//! Selectable audio tracks.

use std::path::PathBuf;

use serde::Deserialize;

/// A named audio file
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Track {
    pub name: String,
    pub path: PathBuf,
}

impl Track {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Track named after its file stem
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { name, path }
    }
}

/// Ordered track list with a current selection
#[derive(Debug, Clone)]
pub struct TrackList {
    tracks: Vec<Track>,
    selected: usize,
}

impl Default for TrackList {
    fn default() -> Self {
        Self::new(vec![
            Track::new("TakeOnMe", "./a_ha_Take_On_Me.mp3"),
            Track::new("HarlemRiver", "./Monolink_Harlem_River.mp3"),
        ])
    }
}

impl TrackList {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self {
            tracks,
            selected: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn current(&self) -> Option<&Track> {
        self.tracks.get(self.selected)
    }

    /// Select track `index`; out-of-range indices leave the selection alone
    pub fn select(&mut self, index: usize) -> Option<&Track> {
        if index >= self.tracks.len() {
            return None;
        }
        self.selected = index;
        self.tracks.get(index)
    }

    /// Advance to the next track, wrapping around
    pub fn select_next(&mut self) -> Option<&Track> {
        if self.tracks.is_empty() {
            return None;
        }
        self.select((self.selected + 1) % self.tracks.len())
    }
}
