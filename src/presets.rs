/*
 *  presets.rs
 *
 *  PixelDeck - every pixel counts
 *  (c) 2020-26 Stuart Hunter
 *
 *  Named task presets and playlists stored as JSON
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use thiserror::Error;

use crate::display::task::TaskSpec;
use crate::playlist::Playlist;

#[derive(Debug, Error)]
pub enum PresetError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no preset named '{0}'")]
    NotFound(String),
    #[error("no playlist named '{0}'")]
    PlaylistNotFound(String),
    #[error("duplicate name '{0}'")]
    Duplicate(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub task: TaskSpec,
}

/// Everything in a presets file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresetBook {
    #[serde(default)]
    pub presets: Vec<Preset>,
    #[serde(default)]
    pub playlists: Vec<Playlist>,
}

impl PresetBook {
    pub fn from_json(s: &str) -> Result<Self, PresetError> {
        let book: PresetBook = serde_json::from_str(s)?;
        book.check_names()?;
        Ok(book)
    }

    pub fn load(path: &Path) -> Result<Self, PresetError> {
        let s = fs::read_to_string(path)?;
        let book = Self::from_json(&s)?;
        info!(
            "Loaded {} presets and {} playlists from {}",
            book.presets.len(),
            book.playlists.len(),
            path.display()
        );
        Ok(book)
    }

    /// A missing file reads as an empty book
    pub fn load_or_empty(path: &Path) -> Result<Self, PresetError> {
        if !path.exists() {
            warn!("Presets file {} not found", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn save(&self, path: &Path) -> Result<(), PresetError> {
        let s = serde_json::to_string_pretty(self)?;
        fs::write(path, s)?;
        Ok(())
    }

    pub fn find(&self, name: &str) -> Result<&Preset, PresetError> {
        self.presets
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| PresetError::NotFound(name.to_string()))
    }

    pub fn playlist(&self, name: &str) -> Result<&Playlist, PresetError> {
        self.playlists
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| PresetError::PlaylistNotFound(name.to_string()))
    }

    /// Insert or replace by name
    pub fn upsert(&mut self, preset: Preset) {
        match self.presets.iter_mut().find(|p| p.name == preset.name) {
            Some(slot) => *slot = preset,
            None => self.presets.push(preset),
        }
    }

    fn check_names(&self) -> Result<(), PresetError> {
        let mut seen = std::collections::HashSet::new();
        for name in self.presets.iter().map(|p| &p.name) {
            if !seen.insert(name) {
                return Err(PresetError::Duplicate(name.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::task::{TaskKind, TextTask};

    const BOOK: &str = r#"{
        "presets": [
            {"name": "hello", "task": {"type": "text", "text": "Hello"}},
            {"name": "fire", "task": {"type": "animation", "kind": "fire", "params": {"fps": 20}}},
            {"name": "aapl", "description": "Apple", "task": {"type": "stock", "ticker": "AAPL"}}
        ],
        "playlists": [
            {"name": "lobby", "looped": true, "items": [
                {"preset_name": "hello", "duration_secs": 5},
                {"preset_name": "fire", "duration_secs": 10}
            ]}
        ]
    }"#;

    #[test]
    fn test_parse_book() {
        let book = PresetBook::from_json(BOOK).unwrap();
        assert_eq!(book.presets.len(), 3);
        assert_eq!(book.find("aapl").unwrap().task.kind(), TaskKind::Stock);
        assert!(matches!(book.find("nope"), Err(PresetError::NotFound(_))));
        assert_eq!(book.playlist("lobby").unwrap().items.len(), 2);
    }

    #[test]
    fn test_duplicates_rejected() {
        let dup = r#"{"presets": [
            {"name": "a", "task": {"type": "text"}},
            {"name": "a", "task": {"type": "text"}}
        ]}"#;
        assert!(matches!(PresetBook::from_json(dup), Err(PresetError::Duplicate(_))));
    }

    #[test]
    fn test_upsert_replaces() {
        let mut book = PresetBook::default();
        let text = |t: &str| TaskSpec::Text(TextTask { text: t.into(), ..Default::default() });
        book.upsert(Preset { name: "x".into(), description: None, task: text("one") });
        book.upsert(Preset { name: "x".into(), description: None, task: text("two") });
        assert_eq!(book.presets.len(), 1);
        assert_eq!(book.find("x").unwrap().task, text("two"));
    }

    #[test]
    fn test_save_and_reload() {
        let book = PresetBook::from_json(BOOK).unwrap();
        let path = std::env::temp_dir().join(format!("pixeldeck-presets-{}.json", std::process::id()));
        book.save(&path).unwrap();
        let again = PresetBook::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(again, book);
    }
}
