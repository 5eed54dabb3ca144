//! Notifications raised by the listener

use raxa_core::InboundMessage;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Events held for a consumer that is not keeping up; newer ones are dropped
pub const EVENT_QUEUE_CAPACITY: usize = 256;

/// Event emitted for every meaningful datagram received from a bridge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BridgeEvent {
    /// A bridge answered a discovery probe
    TellstickDetected {
        /// Hardware address
        mac: String,
        /// Activation code
        activation_code: String,
        /// Firmware version
        version: String,
        /// Address the announcement came from
        source: IpAddr,
    },
    /// A bridge reported status data
    MessageReceived {
        /// Status body
        data: String,
        /// Address the report came from
        source: IpAddr,
    },
}

impl BridgeEvent {
    /// Turn a parsed datagram into an event, if it warrants one
    pub fn from_message(message: InboundMessage, source: IpAddr) -> Option<Self> {
        match message {
            InboundMessage::BridgeAnnouncement {
                mac,
                activation_code,
                version,
            } => Some(BridgeEvent::TellstickDetected {
                mac,
                activation_code,
                version,
                source,
            }),
            InboundMessage::StatusUpdate { raw_payload } => Some(BridgeEvent::MessageReceived {
                data: raw_payload,
                source,
            }),
            InboundMessage::NoData | InboundMessage::Unrecognized => None,
        }
    }

    /// Bridge the event originated from
    pub fn source(&self) -> IpAddr {
        match self {
            BridgeEvent::TellstickDetected { source, .. } => *source,
            BridgeEvent::MessageReceived { source, .. } => *source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    const SOURCE: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 168, 0, 20));

    #[test]
    fn test_event_names() {
        let event = BridgeEvent::MessageReceived {
            data: "foo".to_string(),
            source: SOURCE,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "message_received");
        assert_eq!(json["data"], "foo");
        assert_eq!(json["source"], "192.168.0.20");

        let event = BridgeEvent::from_message(
            InboundMessage::parse(b"TellStickNet:AA:BB:1.0"),
            SOURCE,
        )
        .unwrap();
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "tellstick_detected");
        assert_eq!(json["mac"], "AA");
    }

    #[test]
    fn test_silent_messages() {
        assert_eq!(BridgeEvent::from_message(InboundMessage::NoData, SOURCE), None);
        assert_eq!(
            BridgeEvent::from_message(InboundMessage::Unrecognized, SOURCE),
            None
        );
    }
}
