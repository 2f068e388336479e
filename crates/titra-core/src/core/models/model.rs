use super::site::Site;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum EnergyError {
    #[error("state vector has {actual} entries but the model has {expected} sites")]
    StateLengthMismatch { expected: usize, actual: usize },

    #[error("instance index {instance} out of range for site {site} ({count} instances)")]
    InstanceOutOfRange {
        site: usize,
        instance: usize,
        count: usize,
    },

    #[error("energy evaluation failed: {0}")]
    Evaluation(String),
}

/// The contract the enumeration engine requires from the physical model.
///
/// The model owns the ordered site list and knows how to score a full
/// microstate (one instance index per site) at a given pH. The energy
/// function must be pure with respect to the state contents: evaluating
/// the same state twice yields the same energy.
pub trait ProtonationModel {
    /// Ordered, stable list of titratable sites.
    fn sites(&self) -> &[Site];

    /// Whether occupancy probabilities have been computed for this model.
    fn probabilities_available(&self) -> bool;

    /// Energy of the microstate described by `state` (one instance index
    /// per site, in site order) at the given pH.
    fn microstate_energy(&self, state: &[usize], ph: f64) -> Result<f64, EnergyError>;
}
