//! Delivery option set

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionId {
    LeaveAtDoor,
    CallOnDelivery,
    Contactless,
    DontRing,
}

impl OptionId {
    pub const ALL: [OptionId; 4] = [Self::LeaveAtDoor, Self::CallOnDelivery, Self::Contactless, Self::DontRing];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LeaveAtDoor => "leave_at_door",
            Self::CallOnDelivery => "call_on_delivery",
            Self::Contactless => "contactless",
            Self::DontRing => "dont_ring",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::LeaveAtDoor => "Leave at the door",
            Self::CallOnDelivery => "Call on delivery",
            Self::Contactless => "Contactless delivery",
            Self::DontRing => "Do not ring the doorbell",
        }
    }
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for OptionId {
    type Err = UnknownOption;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|id| id.as_str() == s).ok_or_else(|| UnknownOption(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub struct UnknownOption(pub String);
impl std::error::Error for UnknownOption {}
impl fmt::Display for UnknownOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "Unknown order option: {}", self.0) }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderOption {
    pub id: OptionId,
    pub name: String,
    pub selected: bool,
}

/// The fixed set of delivery preferences. Options are never added or removed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSet {
    options: Vec<OrderOption>,
}

impl Default for OptionSet {
    fn default() -> Self {
        Self {
            options: OptionId::ALL
                .into_iter()
                .map(|id| OrderOption { id, name: id.display_name().to_string(), selected: false })
                .collect(),
        }
    }
}

impl OptionSet {
    pub fn new() -> Self { Self::default() }

    pub fn all(&self) -> &[OrderOption] { &self.options }

    pub fn selected(&self) -> Vec<OrderOption> { self.options.iter().filter(|o| o.selected).cloned().collect() }

    /// Flips the option and returns its new state.
    pub fn toggle(&mut self, id: OptionId) -> bool {
        match self.options.iter_mut().find(|o| o.id == id) {
            Some(option) => { option.selected = !option.selected; option.selected }
            None => false,
        }
    }

    pub fn reset(&mut self) { self.options.iter_mut().for_each(|o| o.selected = false); }
}
