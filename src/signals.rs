//! Signal names, weights and the default weight table.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A named suspicion pattern derived from session behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Signal {
    /// The decoy field was filled in
    HoneypotTrap,
    /// The form was submitted implausibly soon after it rendered
    FastSubmit,
    /// Content was pasted more than once
    HighPasteCount,
    /// Keystroke cadence is too uniform for a human
    RoboticTyping,
    /// Almost no pointer activity
    LowMouseMovement,
    /// The consent checkbox was clicked right after render
    FastCheckbox,
    /// Fields were entered faster than anyone can read them
    FastFieldEntry,
    /// The page went hidden at least once during the fill
    TabSwitching,
}

impl Signal {
    /// Every signal, in report order.
    pub const ALL: [Signal; 8] = [
        Signal::HoneypotTrap,
        Signal::FastSubmit,
        Signal::HighPasteCount,
        Signal::RoboticTyping,
        Signal::LowMouseMovement,
        Signal::FastCheckbox,
        Signal::FastFieldEntry,
        Signal::TabSwitching,
    ];

    /// Returns the signal name as used in reports and config files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::HoneypotTrap => "honeypotTrap",
            Signal::FastSubmit => "fastSubmit",
            Signal::HighPasteCount => "highPasteCount",
            Signal::RoboticTyping => "roboticTyping",
            Signal::LowMouseMovement => "lowMouseMovement",
            Signal::FastCheckbox => "fastCheckbox",
            Signal::FastFieldEntry => "fastFieldEntry",
            Signal::TabSwitching => "tabSwitching",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The default point value for each signal.
pub fn default_weight_table() -> BTreeMap<Signal, u32> {
    BTreeMap::from([
        (Signal::HoneypotTrap, 50),
        (Signal::FastSubmit, 30),
        (Signal::HighPasteCount, 15),
        (Signal::RoboticTyping, 25),
        (Signal::LowMouseMovement, 15),
        (Signal::FastCheckbox, 20),
        (Signal::FastFieldEntry, 20),
        (Signal::TabSwitching, 10),
    ])
}

/// Validated weight table covering every [`Signal`].
///
/// Can only be built from a table that has an entry for each signal, so
/// lookups never fall back to a default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalWeights {
    weights: [u32; Signal::ALL.len()],
}

impl SignalWeights {
    /// Build from a name-to-points table.
    ///
    /// Every signal needs an entry, and all weights together must fit in a
    /// `u32` so that no score can overflow.
    pub fn from_table(table: &BTreeMap<Signal, u32>) -> Result<Self, ConfigError> {
        let mut weights = [0u32; Signal::ALL.len()];
        let mut total = 0u32;
        for (slot, signal) in weights.iter_mut().zip(Signal::ALL) {
            *slot = *table
                .get(&signal)
                .ok_or(ConfigError::MissingWeight(signal))?;
            total = total.checked_add(*slot).ok_or(ConfigError::WeightOverflow)?;
        }
        Ok(Self { weights })
    }

    /// Points contributed by `signal` when it fires.
    pub fn weight(&self, signal: Signal) -> u32 {
        self.weights[signal as usize]
    }

    /// Sum of every weight; the highest score a session can reach.
    ///
    /// Cannot overflow: [`Self::from_table`] rejects such tables.
    pub fn max_score(&self) -> u32 {
        self.weights.iter().sum()
    }
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            weights: Signal::ALL.map(|signal| default_weight_table()[&signal]),
        }
    }
}
