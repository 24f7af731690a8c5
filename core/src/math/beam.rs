use crate::prelude::{SurveyError, SurveyResult};

/// Pointing spacing in degrees for a dish of `diameter_m` observing at
/// `wavelength_m`, keeping `overlap_pct` percent of the beam between
/// neighbouring cells: `1.22 * (λ / D) * (180 / π) * (1 - overlap)`.
pub fn grid_spacing(wavelength_m: f64, diameter_m: f64, overlap_pct: f64) -> SurveyResult<f64> {
    if !wavelength_m.is_finite() || wavelength_m <= 0.0 {
        return Err(SurveyError::InvalidConfig(
            "wavelength must be positive".into(),
        ));
    }
    if !diameter_m.is_finite() || diameter_m <= 0.0 {
        return Err(SurveyError::InvalidConfig(
            "dish diameter must be positive".into(),
        ));
    }
    if !(0.0..=100.0).contains(&overlap_pct) {
        return Err(SurveyError::InvalidConfig(
            "overlap percentage must be between 0 and 100".into(),
        ));
    }
    let beam_width = 1.22 * (wavelength_m / diameter_m) * 180.0 / std::f64::consts::PI;
    Ok(beam_width * (1.0 - overlap_pct / 100.0))
}
