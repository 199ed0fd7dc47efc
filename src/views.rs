//! Presentation-ready data derived from a [`CyclePrediction`]: chart series,
//! the cycle summary, per-day status and calendar month views.

use chrono::{Datelike, NaiveDate};

use crate::models::{
    CalendarDay, ChanceBar, CyclePrediction, CycleSummary, DayStatus, MonthView, PhaseInterval,
    PieSlice, SummaryItem,
};

/// Days per displayed category. Both fertile sub-windows share a display
/// name, so they land in a single slice.
pub fn pie_slices(prediction: &CyclePrediction) -> Vec<PieSlice> {
    let mut slices: Vec<PieSlice> = Vec::new();

    for (slot, interval) in prediction.segments() {
        let meta = slot.metadata();
        if let Some(existing) = slices.iter_mut().find(|s| s.name == meta.name) {
            existing.days += interval.days();
        } else {
            slices.push(PieSlice {
                name: meta.name,
                days: interval.days(),
                color_token: meta.color_token,
            });
        }
    }

    slices.retain(|s| s.days > 0);
    slices
}

/// Conception weight per short name. Where two phases share a short name the
/// higher weight is shown.
pub fn chance_bars(prediction: &CyclePrediction) -> Vec<ChanceBar> {
    let mut bars: Vec<ChanceBar> = Vec::new();

    for (slot, _) in prediction.segments() {
        let meta = slot.metadata();
        match bars.iter_mut().find(|b| b.name == meta.short_name) {
            Some(existing) if existing.chance < meta.conception_weight => {
                existing.chance = meta.conception_weight;
                existing.color_token = meta.color_token;
            }
            Some(_) => {}
            None => bars.push(ChanceBar {
                name: meta.short_name,
                chance: meta.conception_weight,
                color_token: meta.color_token,
            }),
        }
    }

    bars
}

/// Fertile days on both sides of ovulation, ovulation included.
pub fn fertile_window(prediction: &CyclePrediction) -> Option<PhaseInterval> {
    match (prediction.phases.fertile_start, prediction.phases.fertile_end) {
        (Some(before), Some(after)) => Some(PhaseInterval {
            start: before.start,
            end: after.end,
        }),
        _ => None,
    }
}

/// Headline dates for the cycle. "Fertile Window" here is the whole span from
/// the first pre-ovulation fertile day to the last post-ovulation one
/// (days 8-17), not only the days before ovulation.
pub fn summary(prediction: &CyclePrediction) -> CycleSummary {
    let candidates = [
        ("Menstruation", prediction.phases.menstruation),
        ("Fertile Window", fertile_window(prediction)),
        ("Ovulation", prediction.phases.ovulation),
        ("Fertile / Luteal", prediction.combined_remainder),
    ];

    let items = candidates
        .into_iter()
        .filter_map(|(label, interval)| {
            interval.map(|interval| SummaryItem {
                label,
                interval,
                range_label: format_range(&interval),
            })
        })
        .collect();

    let next_period_start = prediction.next_menstruation_window.start;
    CycleSummary {
        items,
        next_period_start,
        next_period_label: next_period_start.format("%B %-d, %Y").to_string(),
    }
}

/// Human label for a date range: "March 1 - 7, 2024" within one month,
/// "Mar 29 - Apr 4, 2024" across months.
pub fn format_range(interval: &PhaseInterval) -> String {
    let (start, end) = (interval.start, interval.end);

    if start.year() != end.year() {
        format!("{} - {}", start.format("%b %-d, %Y"), end.format("%b %-d, %Y"))
    } else if start.month() != end.month() {
        format!("{} - {}", start.format("%b %-d"), end.format("%b %-d, %Y"))
    } else {
        format!("{} - {}", start.format("%B %-d"), end.format("%-d, %Y"))
    }
}

/// Cycle day and phase for a date inside the cycle, `None` outside it.
pub fn status_on(prediction: &CyclePrediction, date: NaiveDate) -> Option<DayStatus> {
    let slot = prediction.slot_on(date)?;
    let cycle_day = u32::try_from((date - prediction.start_date).num_days() + 1).ok()?;
    let meta = slot.metadata();

    Some(DayStatus {
        date,
        cycle_day,
        slot,
        phase_name: meta.name,
        conception_weight: meta.conception_weight,
    })
}

/// Every day of a calendar month tagged with its phase.
pub fn month_view(prediction: &CyclePrediction, year: i32, month: u32) -> Option<MonthView> {
    let first_day = NaiveDate::from_ymd_opt(year, month, 1)?;
    let last_day = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }?
    .pred_opt()?;

    let segments = prediction.segments();
    let next_window = prediction.next_menstruation_window;

    let days = first_day
        .iter_days()
        .take_while(|d| *d <= last_day)
        .map(|date| {
            let slot = segments
                .iter()
                .find(|(_, interval)| interval.contains(date))
                .map(|(slot, _)| *slot);
            CalendarDay {
                date,
                slot,
                color_token: slot.map(|s| s.metadata().color_token),
                next_period: next_window.contains(date),
            }
        })
        .collect();

    Some(MonthView {
        year,
        month,
        days,
        next_menstruation_window: next_window,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PhaseName, PhaseSlot};
    use crate::prediction::calculate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn march_28() -> CyclePrediction {
        calculate(date("2024-03-01"), 28).unwrap()
    }

    #[test]
    fn pie_merges_fertile_windows() {
        let slices = pie_slices(&march_28());
        let names: Vec<&str> = slices.iter().map(|s| s.name).collect();
        assert_eq!(names, ["Menstruation", "Fertile Window", "Ovulation", "Luteal Phase"]);

        let days: Vec<i64> = slices.iter().map(|s| s.days).collect();
        assert_eq!(days, [7, 6, 4, 11]);
        assert_eq!(days.iter().sum::<i64>(), 28);
    }

    #[test]
    fn pie_drops_missing_luteal() {
        let slices = pie_slices(&calculate(date("2024-03-01"), 17).unwrap());
        assert_eq!(slices.len(), 3);
        assert_eq!(slices.iter().map(|s| s.days).sum::<i64>(), 17);
    }

    #[test]
    fn pie_for_short_cycle() {
        let slices = pie_slices(&calculate(date("2024-03-01"), 15).unwrap());
        let pairs: Vec<(&str, i64)> = slices.iter().map(|s| (s.name, s.days)).collect();
        assert_eq!(pairs, [("Menstruation", 7), ("Fertile / Luteal", 8)]);
    }

    #[test]
    fn bars_keep_highest_fertile_weight() {
        let bars = chance_bars(&march_28());
        let pairs: Vec<(&str, u8)> = bars.iter().map(|b| (b.name, b.chance)).collect();
        assert_eq!(
            pairs,
            [("Menstruation", 1), ("Fertile", 30), ("Ovulation", 90), ("Luteal", 1)]
        );
    }

    #[test]
    fn summary_labels() {
        let result = summary(&march_28());
        let labels: Vec<(&str, &str)> = result
            .items
            .iter()
            .map(|i| (i.label, i.range_label.as_str()))
            .collect();
        assert_eq!(
            labels,
            [
                ("Menstruation", "March 1 - 7, 2024"),
                ("Fertile Window", "March 8 - 17, 2024"),
                ("Ovulation", "March 11 - 14, 2024"),
            ]
        );
        assert_eq!(result.next_period_start, date("2024-03-29"));
        assert_eq!(result.next_period_label, "March 29, 2024");
    }

    #[test]
    fn range_labels_across_months_and_years() {
        let cross_month = PhaseInterval {
            start: date("2024-03-29"),
            end: date("2024-04-04"),
        };
        assert_eq!(format_range(&cross_month), "Mar 29 - Apr 4, 2024");

        let cross_year = PhaseInterval {
            start: date("2024-12-29"),
            end: date("2025-01-04"),
        };
        assert_eq!(format_range(&cross_year), "Dec 29, 2024 - Jan 4, 2025");
    }

    #[test]
    fn status_inside_and_outside_cycle() {
        let pred = march_28();

        let status = status_on(&pred, date("2024-03-12")).unwrap();
        assert_eq!(status.cycle_day, 12);
        assert_eq!(status.slot, PhaseSlot::Phase(PhaseName::Ovulation));
        assert_eq!(status.conception_weight, 90);

        assert_eq!(status_on(&pred, date("2024-03-01")).unwrap().cycle_day, 1);
        assert_eq!(status_on(&pred, date("2024-03-28")).unwrap().cycle_day, 28);
        assert!(status_on(&pred, date("2024-02-29")).is_none());
        assert!(status_on(&pred, date("2024-03-29")).is_none());
    }

    #[test]
    fn month_view_marks_phases_and_next_period() {
        let pred = march_28();

        let march = month_view(&pred, 2024, 3).unwrap();
        assert_eq!(march.days.len(), 31);
        assert_eq!(march.days[0].slot, Some(PhaseSlot::Phase(PhaseName::Menstruation)));
        assert_eq!(march.days[0].color_token, Some("--chart-1"));
        assert_eq!(march.days[27].slot, Some(PhaseSlot::Phase(PhaseName::Luteal)));
        assert_eq!(march.days[28].slot, None);
        assert!(march.days[28].next_period);
        assert!(!march.days[27].next_period);

        let april = month_view(&pred, 2024, 4).unwrap();
        assert_eq!(april.days.len(), 30);
        assert_eq!(april.days.iter().filter(|d| d.next_period).count(), 4);

        let december = month_view(&pred, 2024, 12).unwrap();
        assert_eq!(december.days.len(), 31);
        assert!(december.days.iter().all(|d| d.slot.is_none()));

        assert!(month_view(&pred, 2024, 13).is_none());
    }
}
