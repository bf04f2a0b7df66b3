use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Dense index assigned to an airport in first-seen order. Never reused.
pub type AirportIndex = u32;

/// A validated three-letter uppercase airport code, stored without
/// allocation so it is cheap to copy through the ranking engine's inner
/// loops.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AirportCode([u8; 3]);

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("airport code must be exactly three uppercase ASCII letters")]
pub struct InvalidAirportCode;

impl AirportCode {
    pub fn new(code: &str) -> Option<Self> {
        let bytes = code.as_bytes();
        if bytes.len() == 3 && bytes.iter().all(u8::is_ascii_uppercase) {
            Some(Self([bytes[0], bytes[1], bytes[2]]))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        // Construction guarantees the bytes are valid ASCII uppercase letters.
        std::str::from_utf8(&self.0).expect("AirportCode bytes are always valid ASCII")
    }
}

impl FromStr for AirportCode {
    type Err = InvalidAirportCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or(InvalidAirportCode)
    }
}

impl fmt::Display for AirportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for AirportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AirportCode({})", self.as_str())
    }
}

/// Assigns and looks up dense indices for airport codes. Indices are
/// contiguous from zero and assigned monotonically in first-seen order;
/// no code is ever removed or renumbered.
#[derive(Default)]
pub struct AirportRegistry {
    index_of: HashMap<AirportCode, AirportIndex>,
    codes: Vec<AirportCode>,
}

impl AirportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `code`, returning its index and whether it was newly added.
    pub fn register(&mut self, code: AirportCode) -> (AirportIndex, bool) {
        if let Some(&index) = self.index_of.get(&code) {
            return (index, false);
        }
        let index = self.codes.len() as AirportIndex;
        self.codes.push(code);
        self.index_of.insert(code, index);
        log::trace!("registered new airport {code} at index {index}");
        (index, true)
    }

    pub fn index_of(&self, code: AirportCode) -> Option<AirportIndex> {
        self.index_of.get(&code).copied()
    }

    pub fn code_of(&self, index: AirportIndex) -> AirportCode {
        self.codes[index as usize]
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}
