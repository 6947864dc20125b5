//! Room cooling-capacity calculator.
//!
//! Pure arithmetic over a validated [`BtuRequest`]; no I/O and no dependency
//! on scraped data.

use serde::{Deserialize, Serialize};
use thiserror::Error;

const SQ_FT_TO_SQ_M: f64 = 0.092_903;
const FT_TO_M: f64 = 0.3048;
const KW_TO_BTU: f64 = 3412.0;
const MAX_BTU: i64 = 300_000;
const EXTRA_FACTOR: f64 = 1.15;
/// Glazing area included in the base load; only the excess adds heat.
const WINDOW_BASELINE_M2: f64 = 2.0;

#[derive(Debug, Error, PartialEq)]
pub enum CalcError {
    #[error("{field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> CalcError {
    CalcError::Invalid {
        field,
        reason: reason.into(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SizeUnit {
    #[serde(rename = "square meters")]
    SquareMeters,
    #[serde(rename = "square feet")]
    SquareFeet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeightUnit {
    Meters,
    Feet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SunExposure {
    Low,
    Medium,
    High,
}

impl SunExposure {
    /// Heat gain per cubic meter of room volume, in watts.
    fn volume_coefficient(self) -> f64 {
        match self {
            SunExposure::Low => 30.0,
            SunExposure::Medium => 35.0,
            SunExposure::High => 40.0,
        }
    }

    /// Extra kW per square meter of glazing above the baseline.
    fn window_load(self) -> f64 {
        match self {
            SunExposure::Low => 0.05,
            SunExposure::Medium => 0.1,
            SunExposure::High => 0.2,
        }
    }
}

/// Room description submitted to the calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BtuRequest {
    pub room_size: f64,
    pub size_unit: SizeUnit,
    pub ceiling_height: f64,
    pub height_unit: HeightUnit,
    pub sun_exposure: SunExposure,
    pub people_count: u32,
    pub number_of_computers: u32,
    pub number_of_tvs: u32,
    /// Combined rating of other heat-emitting appliances, in kW.
    pub other_appliances_kwattage: f64,
    pub has_ventilation: bool,
    /// Air changes per hour; required when `has_ventilation` is set.
    #[serde(default)]
    pub air_exchange_rate: Option<f64>,
    pub guaranteed_20_degrees: bool,
    pub is_top_floor: bool,
    pub has_large_window: bool,
    /// Glazing area in square meters; required when `has_large_window` is set.
    #[serde(default)]
    pub window_area: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KwRange {
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BtuRange {
    pub lower: i64,
    pub upper: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BtuResult {
    pub calculated_power_kw: f64,
    pub calculated_power_btu: i64,
    pub recommended_range_kw: KwRange,
    pub recommended_range_btu: BtuRange,
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), CalcError> {
    if !value.is_finite() || value < min || value > max {
        return Err(invalid(field, format!("must be between {min} and {max}")));
    }
    Ok(())
}

fn check_count(field: &'static str, value: u32, min: u32, max: u32) -> Result<(), CalcError> {
    if value < min || value > max {
        return Err(invalid(field, format!("must be between {min} and {max}")));
    }
    Ok(())
}

impl BtuRequest {
    /// Checks every field bound and the conditional requirements.
    ///
    /// # Errors
    ///
    /// Returns [`CalcError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), CalcError> {
        if !self.room_size.is_finite() || self.room_size <= 0.0 || self.room_size > 500.0 {
            return Err(invalid(
                "room_size",
                "must be greater than 0 and at most 500",
            ));
        }
        check_range("ceiling_height", self.ceiling_height, 2.0, 10.0)?;
        check_count("people_count", self.people_count, 1, 100)?;
        check_count("number_of_computers", self.number_of_computers, 0, 50)?;
        check_count("number_of_tvs", self.number_of_tvs, 0, 50)?;
        check_range(
            "other_appliances_kwattage",
            self.other_appliances_kwattage,
            0.0,
            20.0,
        )?;

        if self.has_ventilation {
            let rate = self.air_exchange_rate.ok_or_else(|| {
                invalid(
                    "air_exchange_rate",
                    "required when ventilation is enabled (0.5-3)",
                )
            })?;
            check_range("air_exchange_rate", rate, 0.5, 3.0)?;
        }

        match (self.has_large_window, self.window_area) {
            (true, None) => {
                return Err(invalid(
                    "window_area",
                    "required when the room has a large window (0-100)",
                ))
            }
            (_, Some(area)) => check_range("window_area", area, 0.0, 100.0)?,
            (false, None) => {}
        }

        Ok(())
    }

    fn effective_air_exchange_rate(&self) -> f64 {
        if self.has_ventilation {
            self.air_exchange_rate.unwrap_or(0.0)
        } else {
            0.0
        }
    }
}

/// Ventilation surcharge on the volume load, defined only for whole
/// half-steps between 0.5 and 3 air changes per hour.
#[allow(clippy::cast_possible_truncation)]
fn ventilation_increase(rate: f64) -> f64 {
    let doubled = rate * 2.0;
    if doubled.fract() != 0.0 {
        return 0.0;
    }
    match doubled as i64 {
        1 => 0.11,
        2 => 0.22,
        3 => 0.33,
        4 => 0.44,
        5 => 0.55,
        6 => 0.66,
        _ => 0.0,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

#[allow(clippy::cast_possible_truncation)]
fn kw_to_btu(kw: f64) -> i64 {
    let thousands = (kw * KW_TO_BTU / 1000.0).round_ties_even() as i64;
    (thousands * 1000).min(MAX_BTU)
}

/// Computes the recommended cooling capacity for a room.
///
/// # Errors
///
/// Returns [`CalcError::Invalid`] when the request fails [`BtuRequest::validate`].
pub fn calculate_btu(request: &BtuRequest) -> Result<BtuResult, CalcError> {
    request.validate()?;

    let area_m2 = match request.size_unit {
        SizeUnit::SquareMeters => request.room_size,
        SizeUnit::SquareFeet => request.room_size * SQ_FT_TO_SQ_M,
    };
    let height_m = match request.height_unit {
        HeightUnit::Meters => request.ceiling_height,
        HeightUnit::Feet => request.ceiling_height * FT_TO_M,
    };

    let mut volume_load = area_m2 * height_m * request.sun_exposure.volume_coefficient() / 1000.0;
    let people_load = f64::from(request.people_count) * 0.1;
    let appliance_load = f64::from(request.number_of_computers) * 0.3
        + f64::from(request.number_of_tvs) * 0.2
        + request.other_appliances_kwattage * 0.3;

    let rate = request.effective_air_exchange_rate();
    if request.has_ventilation && (0.5..=3.0).contains(&rate) {
        volume_load *= 1.0 + ventilation_increase(rate);
    }

    let mut total = volume_load + people_load + appliance_load;

    if request.guaranteed_20_degrees {
        total *= EXTRA_FACTOR;
    }
    if request.is_top_floor {
        total *= EXTRA_FACTOR;
    }
    if request.has_large_window {
        let window_area = request.window_area.unwrap_or(0.0);
        if window_area > WINDOW_BASELINE_M2 {
            total += (window_area - WINDOW_BASELINE_M2) * request.sun_exposure.window_load();
        }
    }

    let lower = total * 0.95;
    let upper = total * 1.15;

    Ok(BtuResult {
        calculated_power_kw: round2(total),
        calculated_power_btu: kw_to_btu(total),
        recommended_range_kw: KwRange {
            lower: round2(lower),
            upper: round2(upper),
        },
        recommended_range_btu: BtuRange {
            lower: kw_to_btu(lower),
            upper: kw_to_btu(upper),
        },
    })
}
