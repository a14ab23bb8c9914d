// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/girarm-rs

//! Alarm persistence - all alarms as one JSON blob on disk

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::info;
use uuid::Uuid;

use super::Alarm;
use crate::config::Config;

/// Stores the full alarm list as a single JSON document, loaded whole and
/// saved whole. Alarm counts are tiny; nothing fancier is warranted.
pub struct AlarmStore {
    path: PathBuf,
    alarms: Vec<Alarm>,
}

impl AlarmStore {
    /// Default store path under the platform config directory
    pub fn default_path() -> PathBuf {
        Config::config_dir().join("alarms.json")
    }

    /// Load the store, or start empty when the file does not exist yet
    pub fn load_or_default(path: &Path) -> Result<Self> {
        let alarms = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content)?
        } else {
            Vec::new()
        };
        info!("Loaded {} alarms from {:?}", alarms.len(), path);
        Ok(Self {
            path: path.to_path_buf(),
            alarms,
        })
    }

    /// Write the full alarm list back to disk
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.alarms)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    pub fn alarms(&self) -> &[Alarm] {
        &self.alarms
    }

    pub fn get(&self, id: Uuid) -> Option<&Alarm> {
        self.alarms.iter().find(|a| a.id == id)
    }

    pub fn add(&mut self, alarm: Alarm) {
        self.alarms.push(alarm);
    }

    pub fn remove(&mut self, id: Uuid) -> Option<Alarm> {
        let index = self.alarms.iter().position(|a| a.id == id)?;
        Some(self.alarms.remove(index))
    }

    pub fn set_enabled(&mut self, id: Uuid, enabled: bool) -> bool {
        match self.alarms.iter_mut().find(|a| a.id == id) {
            Some(alarm) => {
                alarm.enabled = enabled;
                true
            }
            None => false,
        }
    }
}
