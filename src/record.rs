//! Replay records
//!
//! A record is everything needed to re-run a session tick for tick: the seed
//! of the spawn stream, the first direction and every gameplay input tagged
//! with the tick it was consumed on.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::sim::Direction;

/// Gameplay input kinds captured in a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputKind {
    Turn,
    JumpOn,
    JumpOff,
    KillSelf,
}

impl InputKind {
    pub const ALL: [InputKind; 4] = [
        InputKind::Turn,
        InputKind::JumpOn,
        InputKind::JumpOff,
        InputKind::KillSelf,
    ];

    pub fn ordinal(self) -> u8 {
        match self {
            InputKind::Turn => 0,
            InputKind::JumpOn => 1,
            InputKind::JumpOff => 2,
            InputKind::KillSelf => 3,
        }
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Self::ALL.get(ordinal as usize).copied()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Malformed input entry: {0:?}")]
    MalformedEntry(String),
    #[error("Unknown input kind ordinal: {0}")]
    UnknownInput(u8),
    #[error("Unknown direction ordinal: {0}")]
    UnknownDirection(u8),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One recorded input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputEntry {
    pub tick: u32,
    pub kind: InputKind,
}

impl fmt::Display for InputEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.tick, self.kind.ordinal())
    }
}

impl FromStr for InputEntry {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || RecordError::MalformedEntry(s.to_string());
        let (tick, kind) = s.split_once(':').ok_or_else(malformed)?;
        let tick = tick.trim().parse::<u32>().map_err(|_| malformed())?;
        let ordinal = kind.trim().parse::<u8>().map_err(|_| malformed())?;
        let kind = InputKind::from_ordinal(ordinal).ok_or(RecordError::UnknownInput(ordinal))?;
        Ok(Self { tick, kind })
    }
}

/// Encode an input log as `tick:kind-tick:kind`
pub fn encode_inputs(inputs: &[InputEntry]) -> String {
    inputs
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("-")
}

/// Decode the `tick:kind-tick:kind` form. The empty string is an empty log.
pub fn decode_inputs(s: &str) -> Result<Vec<InputEntry>, RecordError> {
    if s.trim().is_empty() {
        return Ok(Vec::new());
    }
    s.split('-').map(str::parse).collect()
}

/// A finished or in-progress session record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Seed of the spawn stream
    pub seed: i64,
    pub first_direction: Direction,
    /// Inputs in the order they were consumed
    pub inputs: Vec<InputEntry>,
    pub score: u32,
    /// Unix time (ms) the record was stored; 0 until then
    #[serde(default)]
    pub recorded_at: i64,
}

impl Record {
    pub fn new(seed: i64, first_direction: Direction) -> Self {
        Self {
            seed,
            first_direction,
            inputs: Vec::new(),
            score: 0,
            recorded_at: 0,
        }
    }

    /// Append an input consumed on `tick`
    pub fn push_input(&mut self, tick: u32, kind: InputKind) {
        self.inputs.push(InputEntry { tick, kind });
    }

    /// True when tick indices never decrease
    pub fn is_ordered(&self) -> bool {
        self.inputs.windows(2).all(|w| w[0].tick <= w[1].tick)
    }

    pub fn to_json(&self) -> Result<String, RecordError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, RecordError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Single-line form: `seed|direction|score|recorded_at|inputs`
    pub fn to_compact(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}",
            self.seed,
            self.first_direction.ordinal(),
            self.score,
            self.recorded_at,
            encode_inputs(&self.inputs)
        )
    }

    pub fn from_compact(s: &str) -> Result<Self, RecordError> {
        let malformed = || RecordError::MalformedEntry(s.to_string());
        let mut parts = s.trim().splitn(5, '|');
        let mut next = || parts.next().ok_or_else(malformed);

        let seed = next()?.parse::<i64>().map_err(|_| malformed())?;
        let ordinal = next()?.parse::<u8>().map_err(|_| malformed())?;
        let first_direction =
            Direction::from_ordinal(ordinal).ok_or(RecordError::UnknownDirection(ordinal))?;
        let score = next()?.parse::<u32>().map_err(|_| malformed())?;
        let recorded_at = next()?.parse::<i64>().map_err(|_| malformed())?;
        let inputs = decode_inputs(next()?)?;

        Ok(Self {
            seed,
            first_direction,
            inputs,
            score,
            recorded_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_inputs() {
        let mut record = Record::new(7, Direction::Clockwise);
        record.push_input(40, InputKind::Turn);
        record.push_input(41, InputKind::JumpOn);
        record.push_input(70, InputKind::JumpOff);
        assert_eq!(encode_inputs(&record.inputs), "40:0-41:1-70:2");
        assert_eq!(encode_inputs(&[]), "");
    }

    #[test]
    fn test_decode_inputs() {
        let inputs = decode_inputs("3:3-0:0").unwrap();
        assert_eq!(
            inputs,
            vec![
                InputEntry { tick: 3, kind: InputKind::KillSelf },
                InputEntry { tick: 0, kind: InputKind::Turn },
            ]
        );
        assert!(decode_inputs("").unwrap().is_empty());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(decode_inputs("12"), Err(RecordError::MalformedEntry(_))));
        assert!(matches!(decode_inputs("x:1"), Err(RecordError::MalformedEntry(_))));
        assert!(matches!(decode_inputs("4:9"), Err(RecordError::UnknownInput(9))));
        assert!(matches!(decode_inputs("1:0--2:1"), Err(RecordError::MalformedEntry(_))));
    }

    #[test]
    fn test_is_ordered() {
        let mut record = Record::new(1, Direction::CounterClockwise);
        assert!(record.is_ordered());
        record.push_input(5, InputKind::Turn);
        record.push_input(5, InputKind::JumpOn);
        assert!(record.is_ordered());
        record.push_input(4, InputKind::JumpOff);
        assert!(!record.is_ordered());
    }

    #[test]
    fn test_compact_form() {
        let mut record = Record::new(-12345, Direction::CounterClockwise);
        record.push_input(10, InputKind::KillSelf);
        record.score = 11;
        record.recorded_at = 1_700_000_000_000;

        let line = record.to_compact();
        assert_eq!(line, "-12345|1|11|1700000000000|10:3");
        assert_eq!(Record::from_compact(&line).unwrap(), record);

        assert!(matches!(
            Record::from_compact("1|7|0|0|"),
            Err(RecordError::UnknownDirection(7))
        ));
        assert!(Record::from_compact("1|1|0").is_err());
    }

    #[test]
    fn test_json_keeps_fields() {
        let mut record = Record::new(99, Direction::Clockwise);
        record.push_input(1, InputKind::Turn);
        let json = record.to_json().unwrap();
        assert!(json.contains("\"first_direction\": \"Clockwise\""));
        assert_eq!(Record::from_json(&json).unwrap(), record);
    }
}
