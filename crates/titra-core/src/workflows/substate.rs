use crate::core::models::model::ProtonationModel;
use crate::engine::config::SubstateConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::substate::{Substate, SubstateEnergies};
use tracing::{info, instrument};

/// The outcome of a substate analysis: which model sites were selected
/// (in selection order) and the ranked combination energies.
#[derive(Debug, Clone)]
pub struct SubstateResult {
    pub site_indices: Vec<usize>,
    pub energies: SubstateEnergies,
}

/// Runs a complete substate analysis: resolves the selection, seeds the
/// state vector from previously computed occupancy probabilities,
/// enumerates every combination of the selected sites at the configured
/// pH and returns the ranked results.
#[instrument(skip_all, name = "substate_workflow")]
pub fn run<M: ProtonationModel>(
    model: &M,
    config: &SubstateConfig,
    reporter: &ProgressReporter,
) -> Result<SubstateResult, EngineError> {
    reporter.report(Progress::PhaseStart {
        name: "Substate Enumeration",
    });
    info!(
        selections = config.selections.len(),
        ph = config.ph,
        "Starting substate analysis."
    );

    let mut substate = Substate::new(model, config.clone())?;
    substate.calculate_with_reporter(reporter)?;

    let site_indices = substate.indices_of_sites().to_vec();
    let energies = substate
        .energies()
        .cloned()
        .ok_or_else(|| EngineError::Internal("substate calculation left no results".to_string()))?;

    reporter.report(Progress::PhaseFinish);
    info!(
        states = energies.entries.len(),
        ground_energy = energies.zero_energy,
        "Substate analysis complete."
    );

    Ok(SubstateResult {
        site_indices,
        energies,
    })
}
