//! Configuration management for Harness GW
//!
//! Handles loading, parsing and validation of the YAML configuration file.
//! Every section has defaults, so an empty (or missing) file is a valid setup.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::Path;
use tokio::fs;

/// Largest bank / scene / parameter count accepted by validation
pub const MAX_VIEW_SIZE: usize = 64;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub clients: ClientsConfig,
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub midi: Option<MidiConfig>,
    #[serde(default)]
    pub session: SessionConfig,
}

/// Inbound OSC listener
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
}

/// Pre-allocated client endpoint pool
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientsConfig {
    /// Address every pooled endpoint sends to
    #[serde(default = "default_clients_host")]
    pub host: String,
    #[serde(default = "default_port_start")]
    pub port_start: u16,
    #[serde(default = "default_port_end")]
    pub port_end: u16,
}

impl ClientsConfig {
    /// Reserved slot range (inclusive)
    pub fn slot_range(&self) -> RangeInclusive<u16> {
        self.port_start..=self.port_end
    }
}

/// Fixed view window sizes used by the mirrors
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub struct ViewConfig {
    #[serde(default = "default_bank_size")]
    pub bank_size: usize,
    #[serde(default = "default_scene_count")]
    pub scene_count: usize,
    #[serde(default = "default_remote_control_count")]
    pub remote_control_count: usize,
}

/// MIDI proxy ports (substring match, case-insensitive)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MidiConfig {
    pub input_port: String,
    pub output_port: String,
}

/// Seed for the in-process session model
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    #[serde(default = "default_project_name")]
    pub project_name: String,
    #[serde(default = "default_tracks")]
    pub tracks: Vec<TrackSeed>,
}

/// One track of the seeded session
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackSeed {
    pub name: String,
    #[serde(default = "default_track_kind")]
    pub kind: String,
    #[serde(default)]
    pub devices: Vec<String>,
    /// Scene indices that start out holding a clip
    #[serde(default)]
    pub clips: Vec<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

impl Default for ClientsConfig {
    fn default() -> Self {
        Self {
            host: default_clients_host(),
            port_start: default_port_start(),
            port_end: default_port_end(),
        }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            bank_size: default_bank_size(),
            scene_count: default_scene_count(),
            remote_control_count: default_remote_control_count(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            project_name: default_project_name(),
            tracks: default_tracks(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file with validation
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_yaml(&contents)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Load the file if it exists, otherwise fall back to defaults
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if fs::try_exists(path).await.unwrap_or(false) {
            Self::load(path).await
        } else {
            let config = Self::default();
            config.validate()?;
            Ok(config)
        }
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(contents: &str) -> Result<Self> {
        // serde_yaml maps an empty document to unit, not to an empty mapping
        let config: AppConfig = if contents.trim().is_empty() {
            AppConfig::default()
        } else {
            serde_yaml::from_str(contents).context("Failed to parse YAML config")?
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for correctness and consistency
    pub fn validate(&self) -> Result<()> {
        let clients = &self.clients;
        if clients.port_start > clients.port_end {
            anyhow::bail!(
                "clients.port_start ({}) must not exceed clients.port_end ({})",
                clients.port_start,
                clients.port_end
            );
        }
        if clients.host.is_empty() {
            anyhow::bail!("clients.host cannot be empty");
        }
        if clients.slot_range().contains(&self.server.port) {
            anyhow::bail!(
                "server.port {} lies inside the client range {}-{}",
                self.server.port,
                clients.port_start,
                clients.port_end
            );
        }

        let view = &self.view;
        for (name, value) in [
            ("bank_size", view.bank_size),
            ("scene_count", view.scene_count),
            ("remote_control_count", view.remote_control_count),
        ] {
            if value == 0 || value > MAX_VIEW_SIZE {
                anyhow::bail!("view.{} must be 1-{} (got {})", name, MAX_VIEW_SIZE, value);
            }
        }

        if let Some(midi) = &self.midi {
            if midi.input_port.is_empty() {
                anyhow::bail!("midi.input_port cannot be empty");
            }
            if midi.output_port.is_empty() {
                anyhow::bail!("midi.output_port cannot be empty");
            }
        }

        for (idx, track) in self.session.tracks.iter().enumerate() {
            if track.name.is_empty() {
                anyhow::bail!("session.tracks[{}] name cannot be empty", idx);
            }
        }

        Ok(())
    }
}

// Default value functions
fn default_server_host() -> String { "0.0.0.0".to_string() }
fn default_server_port() -> u16 { 9000 }
fn default_clients_host() -> String { "127.0.0.1".to_string() }
fn default_port_start() -> u16 { 9001 }
fn default_port_end() -> u16 { 9016 }
fn default_bank_size() -> usize { 8 }
fn default_scene_count() -> usize { 8 }
fn default_remote_control_count() -> usize { 8 }
fn default_project_name() -> String { "Untitled".to_string() }
fn default_track_kind() -> String { "Instrument".to_string() }
fn default_tracks() -> Vec<TrackSeed> {
    (1..=4)
        .map(|n| TrackSeed {
            name: format!("Track {}", n),
            kind: default_track_kind(),
            devices: vec![format!("Device {}", n)],
            clips: Vec::new(),
        })
        .collect()
}
