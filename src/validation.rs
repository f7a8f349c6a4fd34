//! Submission checks shared by every presentation surface

use crate::config::PresentationConfig;
use crate::error::{PredictError, PredictResult};
use crate::types::student::StudentInput;

/// Reject a submission before it reaches the model.
pub fn validate_input(input: &StudentInput, config: &PresentationConfig) -> PredictResult<()> {
    if config.require_identity && !input.has_identity() {
        return Err(PredictError::InvalidInput(
            "Nama dan Kelas wajib diisi.".to_string(),
        ));
    }

    if input.absences > config.max_absences {
        return Err(PredictError::InvalidInput(format!(
            "Jumlah ketidakhadiran harus antara 0 dan {}.",
            config.max_absences
        )));
    }

    Ok(())
}

/// Parse the absences field as typed into the form.
pub fn parse_absences(raw: &str, max: u32) -> PredictResult<u32> {
    let out_of_range =
        || PredictError::InvalidInput(format!("Jumlah ketidakhadiran harus antara 0 dan {}.", max));

    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| PredictError::InvalidInput("Jumlah ketidakhadiran harus berupa angka.".to_string()))?;

    u32::try_from(value)
        .ok()
        .filter(|v| *v <= max)
        .ok_or_else(out_of_range)
}
