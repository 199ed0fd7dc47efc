use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{CycleInput, CyclePrediction, PhaseInterval, PhaseName, Phases};

pub const MIN_CYCLE_LENGTH: u32 = 15;
pub const MAX_CYCLE_LENGTH: u32 = 60;
/// Shortest cycle that fits every fixed window ahead of the luteal phase.
pub const FULL_MODEL_MIN_LENGTH: u32 = 17;
pub const MENSTRUATION_DAYS: u32 = 7;

/// Inclusive day offsets from cycle start. The luteal phase takes whatever is left.
const FIXED_WINDOWS: [(PhaseName, u32, u32); 4] = [
    (PhaseName::Menstruation, 0, 6),
    (PhaseName::FertileStart, 7, 9),
    (PhaseName::Ovulation, 10, 13),
    (PhaseName::FertileEnd, 14, 16),
];
const LUTEAL_FIRST_DAY: u32 = 17;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CycleError {
    #[error("cycle length must be between {min} and {max} days, got {length}")]
    InvalidCycleLength { length: u32, min: u32, max: u32 },
    #[error("invalid start date: {0}")]
    InvalidStartDate(String),
}

/// What to do with a cycle length outside the supported range.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LengthPolicy {
    #[default]
    Reject,
    Clamp,
}

impl LengthPolicy {
    pub fn apply(self, cycle_length: u32) -> Result<u32, CycleError> {
        match self {
            LengthPolicy::Reject => validate_length(cycle_length).map(|()| cycle_length),
            LengthPolicy::Clamp => Ok(cycle_length.clamp(MIN_CYCLE_LENGTH, MAX_CYCLE_LENGTH)),
        }
    }
}

/// Partition one cycle into its phases using the fixed-offset model.
///
/// Cycles of 15 or 16 days get `menstruation` plus a combined remainder; the
/// other four phases are `None`. A 17-day cycle has no luteal days.
pub fn calculate(start_date: NaiveDate, cycle_length: u32) -> Result<CyclePrediction, CycleError> {
    validate_length(cycle_length)?;

    let mut phases = Phases::default();
    let combined_remainder = if cycle_length >= FULL_MODEL_MIN_LENGTH {
        for (name, first, last) in FIXED_WINDOWS {
            phases.set(name, Some(window(start_date, first, last)?));
        }
        let luteal = if cycle_length > LUTEAL_FIRST_DAY {
            Some(window(start_date, LUTEAL_FIRST_DAY, cycle_length - 1)?)
        } else {
            None
        };
        phases.set(PhaseName::Luteal, luteal);
        None
    } else {
        phases.set(
            PhaseName::Menstruation,
            Some(window(start_date, 0, MENSTRUATION_DAYS - 1)?),
        );
        Some(window(start_date, MENSTRUATION_DAYS, cycle_length - 1)?)
    };

    let next_menstruation_window = window(
        start_date,
        cycle_length,
        cycle_length + MENSTRUATION_DAYS - 1,
    )?;

    Ok(CyclePrediction {
        cycle_length,
        start_date,
        phases,
        combined_remainder,
        next_menstruation_window,
    })
}

/// Like [`calculate`], but refuses cycles too short for all five phases.
pub fn calculate_full_model(
    start_date: NaiveDate,
    cycle_length: u32,
) -> Result<CyclePrediction, CycleError> {
    if cycle_length < FULL_MODEL_MIN_LENGTH {
        return Err(CycleError::InvalidCycleLength {
            length: cycle_length,
            min: FULL_MODEL_MIN_LENGTH,
            max: MAX_CYCLE_LENGTH,
        });
    }
    calculate(start_date, cycle_length)
}

/// Parse a calendar date written as `YYYY-MM-DD` with nothing before or after it.
pub fn parse_calendar_date(raw: &str) -> Result<NaiveDate, String> {
    let date = NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| format!("{raw:?}: {e}"))?;

    // Reject unpadded or otherwise non-canonical spellings.
    if date.format(DATE_FORMAT).to_string() != raw {
        return Err(format!("{raw:?}: expected YYYY-MM-DD"));
    }

    Ok(date)
}

pub fn parse_start_date(raw: &str) -> Result<NaiveDate, CycleError> {
    parse_calendar_date(raw).map_err(CycleError::InvalidStartDate)
}

/// Parse and calculate in one step.
pub fn calculate_from_str(
    start_date: &str,
    cycle_length: u32,
    policy: LengthPolicy,
) -> Result<CyclePrediction, CycleError> {
    CycleInput::parse(start_date, cycle_length)?.predict(policy)
}

impl CycleInput {
    pub fn parse(start_date: &str, cycle_length: u32) -> Result<Self, CycleError> {
        Ok(Self {
            start_date: parse_start_date(start_date)?,
            cycle_length,
        })
    }

    pub fn predict(&self, policy: LengthPolicy) -> Result<CyclePrediction, CycleError> {
        calculate(self.start_date, policy.apply(self.cycle_length)?)
    }
}

fn validate_length(cycle_length: u32) -> Result<(), CycleError> {
    if (MIN_CYCLE_LENGTH..=MAX_CYCLE_LENGTH).contains(&cycle_length) {
        Ok(())
    } else {
        Err(CycleError::InvalidCycleLength {
            length: cycle_length,
            min: MIN_CYCLE_LENGTH,
            max: MAX_CYCLE_LENGTH,
        })
    }
}

fn window(start_date: NaiveDate, first: u32, last: u32) -> Result<PhaseInterval, CycleError> {
    Ok(PhaseInterval {
        start: offset_date(start_date, first)?,
        end: offset_date(start_date, last)?,
    })
}

fn offset_date(start_date: NaiveDate, offset: u32) -> Result<NaiveDate, CycleError> {
    start_date
        .checked_add_days(Days::new(u64::from(offset)))
        .ok_or_else(|| {
            CycleError::InvalidStartDate(format!("{start_date} is too close to the end of the calendar"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn interval(start: &str, end: &str) -> PhaseInterval {
        PhaseInterval {
            start: date(start),
            end: date(end),
        }
    }

    #[test]
    fn twenty_eight_day_cycle() {
        let pred = calculate(date("2024-03-01"), 28).unwrap();

        assert_eq!(pred.phases.menstruation, Some(interval("2024-03-01", "2024-03-07")));
        assert_eq!(pred.phases.fertile_start, Some(interval("2024-03-08", "2024-03-10")));
        assert_eq!(pred.phases.ovulation, Some(interval("2024-03-11", "2024-03-14")));
        assert_eq!(pred.phases.fertile_end, Some(interval("2024-03-15", "2024-03-17")));
        assert_eq!(pred.phases.luteal, Some(interval("2024-03-18", "2024-03-28")));
        assert_eq!(pred.phases.luteal.unwrap().days(), 11);
        assert_eq!(pred.next_menstruation_window, interval("2024-03-29", "2024-04-04"));
        assert_eq!(pred.combined_remainder, None);
        assert_eq!(pred.cycle_end(), date("2024-03-28"));
    }

    #[test]
    fn twenty_one_day_cycle_only_shortens_luteal() {
        let long = calculate(date("2024-03-01"), 28).unwrap();
        let short = calculate(date("2024-03-01"), 21).unwrap();

        assert_eq!(short.phases.luteal, Some(interval("2024-03-18", "2024-03-21")));
        assert_eq!(short.phases.luteal.unwrap().days(), 4);
        for phase in [
            PhaseName::Menstruation,
            PhaseName::FertileStart,
            PhaseName::Ovulation,
            PhaseName::FertileEnd,
        ] {
            assert_eq!(short.phases.get(phase), long.phases.get(phase));
        }
        assert_eq!(short.next_menstruation_window, interval("2024-03-22", "2024-03-28"));
    }

    #[test]
    fn boundary_lengths() {
        let start = date("2024-01-10");
        for length in [14, 61, 0, 1000] {
            assert!(matches!(
                calculate(start, length),
                Err(CycleError::InvalidCycleLength { length: l, min: 15, max: 60 }) if l == length
            ));
        }
        assert!(calculate(start, 15).is_ok());
        assert!(calculate(start, 60).is_ok());
    }

    #[test]
    fn seventeen_day_cycle_has_no_luteal() {
        let pred = calculate(date("2024-03-01"), 17).unwrap();
        assert_eq!(pred.phases.luteal, None);
        assert_eq!(pred.phases.fertile_end, Some(interval("2024-03-15", "2024-03-17")));
        assert_eq!(pred.combined_remainder, None);
    }

    #[test]
    fn short_cycle_falls_back_to_combined_remainder() {
        let pred = calculate(date("2024-03-01"), 16).unwrap();

        assert_eq!(pred.phases.menstruation, Some(interval("2024-03-01", "2024-03-07")));
        assert_eq!(pred.phases.fertile_start, None);
        assert_eq!(pred.phases.ovulation, None);
        assert_eq!(pred.phases.fertile_end, None);
        assert_eq!(pred.phases.luteal, None);
        assert_eq!(pred.combined_remainder, Some(interval("2024-03-08", "2024-03-16")));
        assert_eq!(pred.next_menstruation_window, interval("2024-03-17", "2024-03-23"));
    }

    #[test]
    fn full_model_rejects_short_cycles() {
        let start = date("2024-03-01");
        assert_eq!(
            calculate_full_model(start, 16),
            Err(CycleError::InvalidCycleLength { length: 16, min: 17, max: 60 })
        );
        assert!(calculate_full_model(start, 17).is_ok());
        assert!(calculate_full_model(start, 61).is_err());
    }

    #[test]
    fn clamp_policy_is_opt_in() {
        assert!(LengthPolicy::Reject.apply(70).is_err());
        assert_eq!(LengthPolicy::Clamp.apply(70), Ok(60));
        assert_eq!(LengthPolicy::Clamp.apply(3), Ok(15));
        assert_eq!(LengthPolicy::default(), LengthPolicy::Reject);

        let pred = calculate_from_str("2024-03-01", 90, LengthPolicy::Clamp).unwrap();
        assert_eq!(pred.cycle_length, 60);
    }

    #[test]
    fn start_date_must_be_canonical() {
        assert_eq!(parse_start_date("2024-03-01"), Ok(date("2024-03-01")));
        for raw in [
            "2024-3-1",
            "2024-03-01T00:00:00",
            "2024-03-01Z",
            " 2024-03-01",
            "2024-02-30",
            "03/01/2024",
            "",
        ] {
            assert!(
                matches!(parse_start_date(raw), Err(CycleError::InvalidStartDate(_))),
                "accepted {raw:?}"
            );
        }
    }

    #[test]
    fn end_of_calendar_is_an_invalid_start() {
        let result = calculate(NaiveDate::MAX, 28);
        assert!(matches!(result, Err(CycleError::InvalidStartDate(_))));
    }

    #[test]
    fn leap_day_is_counted() {
        let pred = calculate(date("2024-02-20"), 28).unwrap();
        assert_eq!(pred.phases.fertile_start, Some(interval("2024-02-27", "2024-02-29")));
        assert_eq!(pred.next_menstruation_window.start, date("2024-03-19"));
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn phases_tile_the_cycle(
            day_offset in 0i64..20_000,
            cycle_length in MIN_CYCLE_LENGTH..=MAX_CYCLE_LENGTH
        ) {
            let start = date("1990-01-01") + chrono::Duration::days(day_offset);
            let pred = calculate(start, cycle_length).unwrap();
            let segments = pred.segments();

            // Contiguous, ordered, non-empty, and exactly covering the cycle.
            prop_assert_eq!(segments[0].1.start, start);
            for pair in segments.windows(2) {
                prop_assert!(pair[0].1.end < pair[1].1.start);
                prop_assert_eq!(pair[0].1.end + chrono::Duration::days(1), pair[1].1.start);
                prop_assert!(!pair[0].1.overlaps(&pair[1].1));
            }
            for (_, interval) in &segments {
                prop_assert!(interval.start <= interval.end);
            }
            let total: i64 = segments.iter().map(|(_, i)| i.days()).sum();
            prop_assert_eq!(total, i64::from(cycle_length));
            prop_assert_eq!(segments.last().unwrap().1.end, pred.cycle_end());

            prop_assert_eq!(
                pred.next_menstruation_window.start,
                start + chrono::Duration::days(i64::from(cycle_length))
            );
            prop_assert_eq!(pred.next_menstruation_window.days(), 7);
        }

        #[test]
        fn luteal_absorbs_length_changes(
            a in FULL_MODEL_MIN_LENGTH..=MAX_CYCLE_LENGTH,
            b in FULL_MODEL_MIN_LENGTH..=MAX_CYCLE_LENGTH
        ) {
            let start = date("2024-03-01");
            let first = calculate(start, a).unwrap();
            let second = calculate(start, b).unwrap();

            for phase in PhaseName::ALL.into_iter().filter(|p| *p != PhaseName::Luteal) {
                prop_assert_eq!(first.phases.get(phase), second.phases.get(phase));
            }
            let luteal_days = first.phases.luteal.map_or(0, |i| i.days());
            prop_assert_eq!(luteal_days, i64::from(a) - 17);
        }
    }
}
