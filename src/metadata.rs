use serde::Serialize;

use crate::models::{PhaseName, PhaseSlot};

/// Display attributes for a phase. The conception weight is a comparative
/// 0-100 score for charts, not a calibrated probability.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PhaseMetadata {
    pub name: &'static str,
    pub short_name: &'static str,
    pub description: &'static str,
    pub conception_weight: u8,
    pub color_token: &'static str,
}

/// Indexed by `PhaseName` declaration order.
static PHASE_TABLE: [PhaseMetadata; 5] = [
    PhaseMetadata {
        name: "Menstruation",
        short_name: "Menstruation",
        description: "Days 1-7: Menstruation",
        conception_weight: 1,
        color_token: "--chart-1",
    },
    PhaseMetadata {
        name: "Fertile Window",
        short_name: "Fertile",
        description: "Days 8-10: Possible to conceive",
        conception_weight: 30,
        color_token: "--chart-2",
    },
    PhaseMetadata {
        name: "Ovulation",
        short_name: "Ovulation",
        description: "Days 11-14: Ovulation, peak fertility",
        conception_weight: 90,
        color_token: "--chart-3",
    },
    PhaseMetadata {
        name: "Fertile Window",
        short_name: "Fertile",
        description: "Days 15-17: Possible to conceive",
        conception_weight: 25,
        color_token: "--chart-2",
    },
    PhaseMetadata {
        name: "Luteal Phase",
        short_name: "Luteal",
        description: "Day 18 to cycle end: Unlikely to conceive",
        conception_weight: 1,
        color_token: "--chart-4",
    },
];

static COMBINED_REMAINDER: PhaseMetadata = PhaseMetadata {
    name: "Fertile / Luteal",
    short_name: "Remainder",
    description: "Day 8 to cycle end: cycle too short to separate fertile and luteal days",
    conception_weight: 25,
    color_token: "--chart-2",
};

pub fn lookup(phase: PhaseName) -> &'static PhaseMetadata {
    &PHASE_TABLE[phase as usize]
}

impl PhaseName {
    pub fn metadata(self) -> &'static PhaseMetadata {
        lookup(self)
    }
}

impl PhaseSlot {
    pub fn metadata(self) -> &'static PhaseMetadata {
        match self {
            PhaseSlot::Phase(name) => lookup(name),
            PhaseSlot::CombinedRemainder => &COMBINED_REMAINDER,
        }
    }
}
