//! inference::errors — failures of OLS fits and HAC bandwidth selection.
//!
//! Regression failures (`ShapeMismatch`, `InsufficientObservations`,
//! `SingularDesign`) surface to callers; the bandwidth variants are caught
//! inside [`KernelType::optimal_bandwidth`] and trigger its fallback rule.
//!
//! [`KernelType::optimal_bandwidth`]: crate::inference::kernel::KernelType::optimal_bandwidth

pub type InferenceResult<T> = Result<T, InferenceError>;

#[derive(Debug, Clone, PartialEq)]
pub enum InferenceError {
    // ---- Regression ----
    ShapeMismatch { design_rows: usize, response_rows: usize },
    /// `n ≤ k`: no residual degree of freedom.
    InsufficientObservations { observations: usize, regressors: usize },
    /// `XᵀX` has a numerically zero Cholesky pivot.
    SingularDesign,

    // ---- Plug-in bandwidth ----
    NearUnitRoot { phi: f64 },
    DegenerateBandwidthScale { denominator: f64 },
    UnsupportedKernelOrder { order: u8 },
    /// `arima` could not fit the AR(1) of a score column.
    Ar1Fit(String),
}

impl From<anyhow::Error> for InferenceError {
    fn from(err: anyhow::Error) -> Self {
        InferenceError::Ar1Fit(err.to_string())
    }
}

impl std::error::Error for InferenceError {}

impl std::fmt::Display for InferenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InferenceError::ShapeMismatch { design_rows, response_rows } => {
                write!(f, "OLS: design has {design_rows} rows, response has {response_rows}.")
            }
            InferenceError::InsufficientObservations { observations, regressors } => {
                write!(f, "OLS: {observations} observations leave no degrees of freedom for {regressors} regressors.")
            }
            InferenceError::SingularDesign => write!(f, "OLS: regressors are collinear (XᵀX is singular)."),
            InferenceError::NearUnitRoot { phi } => {
                write!(f, "HAC bandwidth: AR(1) coefficient {phi} is too close to a unit root.")
            }
            InferenceError::DegenerateBandwidthScale { denominator } => {
                write!(f, "HAC bandwidth: plug-in scale denominator {denominator} is numerically zero.")
            }
            InferenceError::UnsupportedKernelOrder { order } => {
                write!(f, "HAC bandwidth: no plug-in rule for characteristic exponent {order}.")
            }
            InferenceError::Ar1Fit(msg) => write!(f, "HAC bandwidth: AR(1) fit failed ({msg})."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Messages name the failing stage and carry the payload.
    fn inference_error_messages_name_stage_and_payload() {
        let short = InferenceError::InsufficientObservations { observations: 2, regressors: 3 }.to_string();
        let root = InferenceError::NearUnitRoot { phi: 0.999 }.to_string();
        assert!(short.starts_with("OLS") && short.contains('2') && short.contains('3'), "{short}");
        assert!(root.starts_with("HAC bandwidth") && root.contains("0.999"), "{root}");
    }

    #[test]
    // Purpose
    // -------
    // `arima` failures arrive through `anyhow` and keep their message.
    fn anyhow_errors_become_ar1_fit_failures() {
        let err: InferenceError = anyhow::anyhow!("optimizer diverged").into();
        assert_eq!(err, InferenceError::Ar1Fit("optimizer diverged".to_string()));
        assert!(err.to_string().contains("optimizer diverged"));
    }
}
