use thiserror::Error;

use super::config::SiteSpecifier;
use super::state::StateVectorError;
use crate::core::models::model::EnergyError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("occupancy probabilities have not been computed; run a probability calculation first")]
    ProbabilitiesNotComputed,

    #[error("site not found in model: {spec}")]
    SiteNotFound { spec: SiteSpecifier },

    #[error("state vector access failed: {source}")]
    StateVector {
        #[from]
        source: StateVectorError,
    },

    #[error("microstate energy evaluation failed at pH {ph}: {source}")]
    EnergyEvaluation { ph: f64, source: EnergyError },

    #[error("Internal logic error: {0}")]
    Internal(String),
}
