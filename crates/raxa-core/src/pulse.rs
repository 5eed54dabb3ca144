//! Nexa self-learning pulse encoder
//!
//! The TellStick Net does not accept logical commands; it replays a list of
//! pulse widths. Each logical bit becomes a 4-byte symbol of alternating
//! high/low durations in units of roughly 10µs:
//!
//! | symbol | bytes                |
//! |--------|----------------------|
//! | `0`    | `T, T, T, 5T`        |
//! | `1`    | `T, 5T, T, T`        |
//! | dim    | `T, T, T, T`         |
//!
//! A train is `preamble, device code (26), group mode (1), action,
//! group code (4), [dim level (4)], trailer`, every field MSB first.

use crate::command::{Action, DeviceCommand, DEVICE_CODE_BITS, NIBBLE_BITS};
use crate::{CommandError, Result};

/// Base pulse width
pub const T: u8 = 26;
/// Long pulse width (5T)
pub const T5: u8 = T * 5;

const SYMBOL_ZERO: [u8; 4] = [T, T, T, T5];
const SYMBOL_ONE: [u8; 4] = [T, T5, T, T];
const SYMBOL_DIM: [u8; 4] = [T, T, T, T];

const PREAMBLE: [u8; 2] = [T, 254];
const TRAILER: [u8; 2] = [T, 255];

const SYMBOL_LEN: usize = 4;

/// Length of an on/off train
pub const ON_OFF_TRAIN_LEN: usize = PREAMBLE.len()
    + (DEVICE_CODE_BITS as usize + 1 + 1 + NIBBLE_BITS as usize) * SYMBOL_LEN
    + TRAILER.len();
/// Length of a dim train (four extra level bits)
pub const DIM_TRAIN_LEN: usize = ON_OFF_TRAIN_LEN + NIBBLE_BITS as usize * SYMBOL_LEN;

/// Encoded pulse-width sequence for one command
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PulseTrain(Vec<u8>);

impl PulseTrain {
    /// Raw pulse widths
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Number of pulse bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the train holds no pulses at all
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Recover the command that produced this train.
    ///
    /// Used for verification and diagnostics; the bridge never sends trains
    /// back.
    pub fn decode(&self) -> Result<DeviceCommand> {
        let bytes = self.0.as_slice();
        let body = bytes
            .strip_prefix(&PREAMBLE[..])
            .and_then(|rest| rest.strip_suffix(&TRAILER[..]))
            .ok_or_else(|| malformed("missing preamble or trailer"))?;

        if body.len() % SYMBOL_LEN != 0 {
            return Err(malformed("body is not a whole number of symbols"));
        }
        let mut symbols = body.chunks_exact(SYMBOL_LEN);

        let device_code = read_bits(&mut symbols, DEVICE_CODE_BITS)?;
        let group_mode = read_bits(&mut symbols, 1)? == 1;
        let action = match symbols.next() {
            Some(s) if s == SYMBOL_ONE => Action::On,
            Some(s) if s == SYMBOL_ZERO => Action::Off,
            Some(s) if s == SYMBOL_DIM => Action::Dim,
            Some(s) => return Err(malformed(&format!("unknown action symbol {:?}", s))),
            None => return Err(malformed("truncated before action")),
        };
        let group_code = read_bits(&mut symbols, NIBBLE_BITS)? as u8;
        let dim_level = match action {
            Action::Dim => Some(read_bits(&mut symbols, NIBBLE_BITS)? as u8),
            _ => None,
        };

        if symbols.next().is_some() {
            return Err(malformed("trailing symbols after command"));
        }

        DeviceCommand::new(device_code, group_mode, group_code, action, dim_level)
    }
}

impl AsRef<[u8]> for PulseTrain {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Bit writer appending fixed-width timing symbols to a growable buffer
#[derive(Debug)]
pub struct PulseWriter {
    buf: Vec<u8>,
}

impl Default for PulseWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PulseWriter {
    /// Start a new train with the preamble already written
    pub fn new() -> Self {
        let mut buf = Vec::with_capacity(DIM_TRAIN_LEN);
        buf.extend_from_slice(&PREAMBLE);
        Self { buf }
    }

    /// Append a single logical bit
    pub fn push_bit(&mut self, bit: bool) {
        let symbol = if bit { SYMBOL_ONE } else { SYMBOL_ZERO };
        self.buf.extend_from_slice(&symbol);
    }

    /// Append the low `width` bits of `value`, most significant first
    pub fn push_bits(&mut self, value: u32, width: u32) {
        debug_assert!(width <= 32);
        for i in (0..width).rev() {
            self.push_bit(value & (1 << i) != 0);
        }
    }

    /// Append the dim marker symbol
    pub fn push_dim_marker(&mut self) {
        self.buf.extend_from_slice(&SYMBOL_DIM);
    }

    /// Write the trailer and return the finished train
    pub fn finish(mut self) -> PulseTrain {
        self.buf.extend_from_slice(&TRAILER);
        PulseTrain(self.buf)
    }
}

/// Validate the fields and encode them into a pulse train
pub fn encode(
    device_code: u32,
    group_mode: bool,
    group_code: u8,
    action: Action,
    dim_level: Option<u8>,
) -> Result<PulseTrain> {
    let command = DeviceCommand::new(device_code, group_mode, group_code, action, dim_level)?;
    Ok(encode_command(&command))
}

/// Encode an already validated command
pub fn encode_command(command: &DeviceCommand) -> PulseTrain {
    let mut writer = PulseWriter::new();

    writer.push_bits(command.device_code(), DEVICE_CODE_BITS);
    writer.push_bit(command.group_mode());

    match command.action() {
        Action::On => writer.push_bit(true),
        Action::Off => writer.push_bit(false),
        Action::Dim => writer.push_dim_marker(),
    }

    writer.push_bits(u32::from(command.group_code()), NIBBLE_BITS);

    if let Some(level) = command.dim_level() {
        writer.push_bits(u32::from(level), NIBBLE_BITS);
    }

    writer.finish()
}

fn read_bits<'a>(symbols: &mut impl Iterator<Item = &'a [u8]>, width: u32) -> Result<u32> {
    let mut value = 0u32;
    for _ in 0..width {
        let bit = match symbols.next() {
            Some(s) if s == SYMBOL_ONE => 1,
            Some(s) if s == SYMBOL_ZERO => 0,
            Some(s) => return Err(malformed(&format!("expected data bit, got {:?}", s))),
            None => return Err(malformed("train ended mid-field")),
        };
        value = (value << 1) | bit;
    }
    Ok(value)
}

fn malformed(reason: &str) -> CommandError {
    CommandError::MalformedPulseTrain(reason.to_string())
}
