use std::sync::Mutex;

use crate::models::*;
use crate::prediction::{self, LengthPolicy};
use crate::views;

/// Form-facing state holding the prediction for the most recent input.
///
/// Every submit builds a fresh prediction and drops the previous one. Errors
/// are plain strings ready to show next to the form.
pub struct CycleState {
    policy: LengthPolicy,
    prediction: Mutex<Option<CyclePrediction>>,
}

impl Default for CycleState {
    fn default() -> Self {
        Self::new(LengthPolicy::default())
    }
}

impl CycleState {
    pub fn new(policy: LengthPolicy) -> Self {
        Self {
            policy,
            prediction: Mutex::new(None),
        }
    }

    /// Forget the current prediction.
    pub fn clear(&self) {
        if let Ok(mut prediction) = self.prediction.lock() {
            *prediction = None;
        }
    }

    fn with_prediction<T>(&self, f: impl FnOnce(&CyclePrediction) -> T) -> Result<T, String> {
        let prediction_lock = self.prediction.lock().map_err(|e| e.to_string())?;
        let prediction = prediction_lock.as_ref().ok_or("no cycle entered")?;
        Ok(f(prediction))
    }

    pub fn submit(&self, start_date: &str, cycle_length: u32) -> Result<CyclePrediction, String> {
        let input = CycleInput::parse(start_date, cycle_length).map_err(|e| e.to_string())?;
        let prediction = input.predict(self.policy).map_err(|e| {
            tracing::debug!(cycle_length, error = %e, "rejected cycle input");
            e.to_string()
        })?;

        if prediction.cycle_length != cycle_length {
            tracing::info!(
                requested = cycle_length,
                applied = prediction.cycle_length,
                "cycle length clamped"
            );
        }

        *self.prediction.lock().map_err(|e| e.to_string())? = Some(prediction.clone());

        tracing::debug!(
            start = %prediction.start_date,
            cycle_length = prediction.cycle_length,
            short_cycle = prediction.combined_remainder.is_some(),
            "prediction replaced"
        );

        Ok(prediction)
    }

    pub fn current(&self) -> Result<CyclePrediction, String> {
        self.with_prediction(Clone::clone)
    }

    pub fn get_month(&self, year: i32, month: u32) -> Result<MonthView, String> {
        self.with_prediction(|p| views::month_view(p, year, month))?
            .ok_or_else(|| "invalid date".into())
    }

    pub fn get_pie(&self) -> Result<Vec<PieSlice>, String> {
        self.with_prediction(views::pie_slices)
    }

    pub fn get_bars(&self) -> Result<Vec<ChanceBar>, String> {
        self.with_prediction(views::chance_bars)
    }

    pub fn get_summary(&self) -> Result<CycleSummary, String> {
        self.with_prediction(views::summary)
    }

    pub fn get_status(&self, date: &str) -> Result<Option<DayStatus>, String> {
        let date = prediction::parse_calendar_date(date).map_err(|e| format!("invalid date: {e}"))?;
        self.with_prediction(|p| views::status_on(p, date))
    }

    pub fn export_json(&self) -> Result<String, String> {
        self.with_prediction(serde_json::to_string_pretty)?
            .map_err(|e| e.to_string())
    }
}

/// Calculate without keeping any state, for one-shot callers.
pub fn predict_once(
    start_date: &str,
    cycle_length: u32,
    policy: LengthPolicy,
) -> Result<CyclePrediction, String> {
    prediction::calculate_from_str(start_date, cycle_length, policy).map_err(|e| e.to_string())
}
