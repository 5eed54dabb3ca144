//! TellStick Net "send" envelope
//!
//! The appliance parses a small tagged, length-prefixed format. A send
//! command looks like:
//!
//! ```text
//! 4:send h 1:S <HEX len> : <pulses> 1:P i <HEX pause> s 1:R i <HEX repeats> s s
//! ```
//!
//! (spaces added for readability). Lengths and integers are uppercase hex
//! without padding.

use crate::PulseTrain;

/// Default number of times the bridge repeats the train over RF
pub const DEFAULT_REPEATS: u8 = 8;
/// Default pause between repeats
pub const DEFAULT_PAUSE: u8 = 15;

const SEND_TAG: &[u8] = b"4:sendh";
const PULSE_FIELD: &[u8] = b"1:S";
const PAUSE_FIELD: &[u8] = b"1:Pi";
const REPEATS_FIELD: &[u8] = b"1:Ri";
const INT_END: u8 = b's';
const DICT_END: u8 = b's';

/// Framed command, ready to be written to a UDP socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandEnvelope(Vec<u8>);

impl CommandEnvelope {
    /// Wire bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Wire length
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the envelope is empty (never true for framed output)
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CommandEnvelope {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Wrap a pulse train into a send envelope
pub fn frame(pulses: &PulseTrain, repeats: u8, pause: u8) -> CommandEnvelope {
    let payload = pulses.as_bytes();
    let mut buf = Vec::with_capacity(payload.len() + 32);

    buf.extend_from_slice(SEND_TAG);
    buf.extend_from_slice(PULSE_FIELD);
    buf.extend_from_slice(hex(payload.len()).as_bytes());
    buf.push(b':');
    buf.extend_from_slice(payload);

    buf.extend_from_slice(PAUSE_FIELD);
    buf.extend_from_slice(hex(usize::from(pause)).as_bytes());
    buf.push(INT_END);

    buf.extend_from_slice(REPEATS_FIELD);
    buf.extend_from_slice(hex(usize::from(repeats)).as_bytes());
    buf.push(INT_END);

    buf.push(DICT_END);

    tracing::trace!(
        "Framed {} pulse bytes (repeats={}, pause={}) into {} byte envelope",
        payload.len(),
        repeats,
        pause,
        buf.len()
    );

    CommandEnvelope(buf)
}

/// Wrap a pulse train using the default repeat and pause values
pub fn frame_default(pulses: &PulseTrain) -> CommandEnvelope {
    frame(pulses, DEFAULT_REPEATS, DEFAULT_PAUSE)
}

fn hex(value: usize) -> String {
    format!("{:X}", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{encode, Action};

    #[test]
    fn test_envelope_layout() {
        let train = encode(12_345, false, 3, Action::On, None).unwrap();
        let envelope = frame(&train, 8, 15);
        let bytes = envelope.as_bytes();

        // 132 == 0x84
        let header = b"4:sendh1:S84:";
        assert_eq!(&bytes[..header.len()], header);
        assert_eq!(&bytes[header.len()..header.len() + train.len()], train.as_bytes());
        assert_eq!(&bytes[header.len() + train.len()..], b"1:PiFs1:Ri8ss");
    }

    #[test]
    fn test_dim_length_field() {
        let train = encode(1, false, 0, Action::Dim, Some(2)).unwrap();
        let envelope = frame_default(&train);
        // 148 == 0x94
        assert!(envelope.as_bytes().starts_with(b"4:sendh1:S94:"));
    }

    #[test]
    fn test_hex_without_padding() {
        let train = encode(0, false, 0, Action::Off, None).unwrap();
        let envelope = frame(&train, 0, 255);
        assert!(envelope.as_bytes().ends_with(b"1:PiFFs1:Ri0ss"));
        assert_eq!(hex(10), "A");
        assert_eq!(hex(0), "0");
    }

    #[test]
    fn test_envelope_size() {
        let train = encode(0, false, 0, Action::On, None).unwrap();
        let envelope = frame_default(&train);
        // tag(7) + "1:S"(3) + "84:"(3) + 132 + "1:PiFs"(6) + "1:Ri8s"(6) + "s"(1)
        assert_eq!(envelope.len(), 7 + 3 + 3 + 132 + 6 + 6 + 1);
        assert!(!envelope.is_empty());
    }
}
