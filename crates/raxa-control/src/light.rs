//! Light adapter
//!
//! Exposes a configured Nexa receiver as something a home-automation
//! frontend can switch. The RF link has no feedback, so the state reported
//! here is the state last commanded.

use parking_lot::Mutex;
use std::sync::Arc;

use raxa_core::LightConfig;

use crate::bridge::TellstickNet;
use crate::Result;

#[derive(Debug, Default, Clone, Copy)]
struct AssumedState {
    is_on: Option<bool>,
    brightness: Option<u8>,
}

/// A self-learning light reachable through the bridges
pub struct NexaLight {
    config: LightConfig,
    bridge: Arc<TellstickNet>,
    state: Mutex<AssumedState>,
}

impl NexaLight {
    /// Wrap a configured light
    pub fn new(config: LightConfig, bridge: Arc<TellstickNet>) -> Self {
        Self {
            config,
            bridge,
            state: Mutex::new(AssumedState::default()),
        }
    }

    /// Build one adapter per configured light
    pub fn from_configs(configs: &[LightConfig], bridge: &Arc<TellstickNet>) -> Vec<Self> {
        configs
            .iter()
            .map(|c| Self::new(c.clone(), Arc::clone(bridge)))
            .collect()
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// `"<device_code>::<group_code>"`
    pub fn unique_id(&self) -> String {
        self.config.unique_id()
    }

    /// Whether brightness can be set
    pub fn supports_brightness(&self) -> bool {
        self.config.dimmable
    }

    /// Last commanded on/off state, `None` before the first command
    pub fn is_on(&self) -> Option<bool> {
        self.state.lock().is_on
    }

    /// Last commanded brightness
    pub fn brightness(&self) -> Option<u8> {
        self.state.lock().brightness
    }

    /// Switch on, optionally at a brightness (0-255).
    ///
    /// Returns the number of bridges the command went to.
    pub fn turn_on(&self, brightness: Option<u8>) -> Result<usize> {
        let command = self.config.turn_on_command(brightness)?;
        let sent = self.bridge.send_command(&command);

        let mut state = self.state.lock();
        state.is_on = Some(true);
        if self.config.dimmable {
            state.brightness = brightness;
        }
        Ok(sent)
    }

    /// Switch off
    pub fn turn_off(&self) -> Result<usize> {
        let command = self.config.turn_off_command()?;
        let sent = self.bridge.send_command(&command);
        self.state.lock().is_on = Some(false);
        Ok(sent)
    }
}
