use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The five named phases of one cycle, declared in cycle order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum PhaseName {
    Menstruation,
    FertileStart,
    Ovulation,
    FertileEnd,
    Luteal,
}

impl PhaseName {
    pub const ALL: [PhaseName; 5] = [
        PhaseName::Menstruation,
        PhaseName::FertileStart,
        PhaseName::Ovulation,
        PhaseName::FertileEnd,
        PhaseName::Luteal,
    ];

    /// Wire name, identical to the serde representation.
    pub fn key(self) -> &'static str {
        match self {
            PhaseName::Menstruation => "menstruation",
            PhaseName::FertileStart => "fertileStart",
            PhaseName::Ovulation => "ovulation",
            PhaseName::FertileEnd => "fertileEnd",
            PhaseName::Luteal => "luteal",
        }
    }
}

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PhaseInterval {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PhaseInterval {
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn overlaps(&self, other: &PhaseInterval) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

/// All five phases of a cycle. Every key is always serialized; phases that do
/// not fit the cycle are `null`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Phases {
    pub menstruation: Option<PhaseInterval>,
    pub fertile_start: Option<PhaseInterval>,
    pub ovulation: Option<PhaseInterval>,
    pub fertile_end: Option<PhaseInterval>,
    pub luteal: Option<PhaseInterval>,
}

impl Phases {
    pub fn get(&self, phase: PhaseName) -> Option<PhaseInterval> {
        match phase {
            PhaseName::Menstruation => self.menstruation,
            PhaseName::FertileStart => self.fertile_start,
            PhaseName::Ovulation => self.ovulation,
            PhaseName::FertileEnd => self.fertile_end,
            PhaseName::Luteal => self.luteal,
        }
    }

    pub(crate) fn set(&mut self, phase: PhaseName, interval: Option<PhaseInterval>) {
        let slot = match phase {
            PhaseName::Menstruation => &mut self.menstruation,
            PhaseName::FertileStart => &mut self.fertile_start,
            PhaseName::Ovulation => &mut self.ovulation,
            PhaseName::FertileEnd => &mut self.fertile_end,
            PhaseName::Luteal => &mut self.luteal,
        };
        *slot = interval;
    }

    /// Every phase in cycle order, populated or not.
    pub fn iter(&self) -> impl Iterator<Item = (PhaseName, Option<PhaseInterval>)> + '_ {
        PhaseName::ALL.into_iter().map(move |name| (name, self.get(name)))
    }
}

/// Raw form input: last period start and typical cycle length.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CycleInput {
    pub start_date: NaiveDate,
    pub cycle_length: u32,
}

/// Phase boundaries for one cycle plus the forecast of the next period.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CyclePrediction {
    pub cycle_length: u32,
    pub start_date: NaiveDate,
    pub phases: Phases,
    /// Fertile and luteal days folded together, only set for cycles too short
    /// for the five-phase model.
    pub combined_remainder: Option<PhaseInterval>,
    pub next_menstruation_window: PhaseInterval,
}

impl CyclePrediction {
    /// Last day of this cycle.
    pub fn cycle_end(&self) -> NaiveDate {
        self.next_menstruation_window.start - chrono::Duration::days(1)
    }

    /// Populated intervals in cycle order.
    pub fn segments(&self) -> Vec<(PhaseSlot, PhaseInterval)> {
        let mut segments: Vec<(PhaseSlot, PhaseInterval)> = self
            .phases
            .iter()
            .filter_map(|(name, interval)| interval.map(|i| (PhaseSlot::Phase(name), i)))
            .collect();

        if let Some(remainder) = self.combined_remainder {
            segments.push((PhaseSlot::CombinedRemainder, remainder));
            segments.sort_by_key(|(_, interval)| interval.start);
        }

        segments
    }

    /// The slot covering `date`, if the date falls inside this cycle.
    pub fn slot_on(&self, date: NaiveDate) -> Option<PhaseSlot> {
        self.segments()
            .into_iter()
            .find(|(_, interval)| interval.contains(date))
            .map(|(slot, _)| slot)
    }
}

/// A position in the cycle that can carry metadata: one of the named phases
/// or the short-cycle remainder.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(into = "String", try_from = "String")]
pub enum PhaseSlot {
    Phase(PhaseName),
    CombinedRemainder,
}

impl PhaseSlot {
    pub const COMBINED_REMAINDER_KEY: &'static str = "combinedRemainder";

    pub fn key(self) -> &'static str {
        match self {
            PhaseSlot::Phase(name) => name.key(),
            PhaseSlot::CombinedRemainder => Self::COMBINED_REMAINDER_KEY,
        }
    }
}

impl From<PhaseSlot> for String {
    fn from(slot: PhaseSlot) -> Self {
        slot.key().to_owned()
    }
}

impl TryFrom<String> for PhaseSlot {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value == Self::COMBINED_REMAINDER_KEY {
            return Ok(PhaseSlot::CombinedRemainder);
        }
        PhaseName::ALL
            .into_iter()
            .find(|name| name.key() == value)
            .map(PhaseSlot::Phase)
            .ok_or_else(|| format!("unknown phase: {value}"))
    }
}

/// Pie chart slice: days spent in one displayed category.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PieSlice {
    pub name: &'static str,
    pub days: i64,
    pub color_token: &'static str,
}

/// Bar chart entry: relative conception weight for one displayed category.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChanceBar {
    pub name: &'static str,
    pub chance: u8,
    pub color_token: &'static str,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SummaryItem {
    pub label: &'static str,
    pub interval: PhaseInterval,
    pub range_label: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CycleSummary {
    pub items: Vec<SummaryItem>,
    pub next_period_start: NaiveDate,
    pub next_period_label: String,
}

/// Where a single date sits inside the cycle.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DayStatus {
    pub date: NaiveDate,
    /// 1-based, day 1 is the first day of menstruation.
    pub cycle_day: u32,
    pub slot: PhaseSlot,
    pub phase_name: &'static str,
    pub conception_weight: u8,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub slot: Option<PhaseSlot>,
    pub color_token: Option<&'static str>,
    pub next_period: bool,
}

/// Data handed to the calendar for a month view
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MonthView {
    pub year: i32,
    pub month: u32,
    pub days: Vec<CalendarDay>,
    pub next_menstruation_window: PhaseInterval,
}
