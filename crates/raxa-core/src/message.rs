//! Datagrams received from a TellStick Net
//!
//! The bridge speaks plain text on the command port:
//! - `TellStickNet:<mac>:<activation code>:<version>` in reply to a discovery probe
//! - `TSNETRC<body>\r\n` for asynchronous status reports; the body
//!   `data:;` is a keep-alive carrying nothing

use serde::{Deserialize, Serialize};

/// Prefix of a discovery announcement
pub const ANNOUNCEMENT_PREFIX: &str = "TellStickNet:";
/// Prefix of a status report
pub const STATUS_PREFIX: &str = "TSNETRC";
/// Line terminator of a status report
pub const STATUS_SUFFIX: &str = "\r\n";
/// Body of a status report that carries no data
pub const NO_DATA_BODY: &str = "data:;";

/// Parsed form of one received datagram
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InboundMessage {
    /// A bridge answered a discovery probe
    BridgeAnnouncement {
        /// Hardware address as reported by the bridge
        mac: String,
        /// Activation code used to pair the bridge with a cloud account
        activation_code: String,
        /// Firmware version
        version: String,
    },
    /// Status report with a non-empty body
    StatusUpdate {
        /// Body with prefix and line terminator removed
        raw_payload: String,
    },
    /// Status report with the empty-data body
    NoData,
    /// Anything else
    Unrecognized,
}

impl InboundMessage {
    /// Parse a datagram. Never fails: unknown input is [`InboundMessage::Unrecognized`].
    pub fn parse(data: &[u8]) -> Self {
        let Ok(text) = std::str::from_utf8(data) else {
            return InboundMessage::Unrecognized;
        };

        if let Some(rest) = text.strip_prefix(ANNOUNCEMENT_PREFIX) {
            return Self::parse_announcement(rest);
        }

        if let Some(rest) = text.strip_prefix(STATUS_PREFIX) {
            let body = rest.strip_suffix(STATUS_SUFFIX).unwrap_or(rest);
            if body.trim() == NO_DATA_BODY {
                return InboundMessage::NoData;
            }
            return InboundMessage::StatusUpdate {
                raw_payload: body.to_string(),
            };
        }

        InboundMessage::Unrecognized
    }

    fn parse_announcement(rest: &str) -> Self {
        let fields: Vec<&str> = rest.split(':').collect();
        match fields.as_slice() {
            [mac, activation_code, version] => InboundMessage::BridgeAnnouncement {
                mac: mac.to_string(),
                activation_code: activation_code.to_string(),
                version: version.trim_end().to_string(),
            },
            _ => InboundMessage::Unrecognized,
        }
    }

    /// Whether the message should be forwarded as a notification
    pub fn is_notification(&self) -> bool {
        matches!(
            self,
            InboundMessage::BridgeAnnouncement { .. } | InboundMessage::StatusUpdate { .. }
        )
    }
}
