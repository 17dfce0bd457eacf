use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::{proctoring::ProctoringConfig, session::SessionSettings};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub proctoring: ProctoringConfig,
    pub session: SessionSettings,
}

/// JSON-backed settings shared by every session of the app.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<AppSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data: AppSettings = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!("settings at {} are unreadable, using defaults: {err}", path.display());
                AppSettings::default()
            })
        } else {
            AppSettings::default()
        };
        data.proctoring
            .validate()
            .with_context(|| format!("Invalid proctoring settings in {}", path.display()))?;

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    /// Stored settings with environment overrides applied.
    pub fn current(&self) -> AppSettings {
        let mut settings = self.read().clone();
        settings.session = settings.session.with_env_overrides();
        settings
    }

    pub fn proctoring(&self) -> ProctoringConfig {
        self.read().proctoring.clone()
    }

    pub fn session(&self) -> SessionSettings {
        self.read().session.clone().with_env_overrides()
    }

    pub fn update_proctoring(&self, config: ProctoringConfig) -> Result<()> {
        config.validate()?;
        let mut guard = self.write();
        guard.proctoring = config;
        self.persist(&guard)
    }

    pub fn update_session(&self, settings: SessionSettings) -> Result<()> {
        let mut guard = self.write();
        guard.session = settings;
        self.persist(&guard)
    }

    pub fn reload(&self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings from {}", self.path.display()))?;
        let data: AppSettings = serde_json::from_str(&contents)
            .with_context(|| format!("Invalid settings in {}", self.path.display()))?;
        data.proctoring.validate()?;
        *self.write() = data;
        Ok(())
    }

    fn persist(&self, data: &AppSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }

    fn read(&self) -> RwLockReadGuard<'_, AppSettings> {
        match self.data.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, AppSettings> {
        match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
