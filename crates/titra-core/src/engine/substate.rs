use super::config::SubstateConfig;
use super::error::EngineError;
use super::progress::{Progress, ProgressReporter};
use super::state::StateVector;
use crate::core::models::model::ProtonationModel;
use serde::Serialize;
use std::cmp::Ordering;
use tracing::{debug, info};

/// One enumerated combination: its microstate energy and the instance
/// index chosen for each selected site, in selection order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubstateEntry {
    pub energy: f64,
    pub instances: Vec<usize>,
}

/// The ranked outcome of a substate enumeration. Entries are sorted
/// ascending by energy, ties broken lexicographically on the instance
/// tuple; `zero_energy` is the energy of the first (ground) entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubstateEnergies {
    pub entries: Vec<SubstateEntry>,
    pub zero_energy: f64,
}

#[derive(Debug, Clone)]
enum CalculationState {
    Pending,
    Calculated(SubstateEnergies),
}

/// Enumerates and ranks every instance combination of a selected subset
/// of sites, with all remaining sites frozen at their most probable
/// instance.
///
/// Construction resolves the selection against the model and seeds the
/// working vector from occupancy probabilities; the enumeration itself
/// runs at most once per `Substate` and its results are immutable
/// afterwards.
#[derive(Debug)]
pub struct Substate<'a, M: ProtonationModel> {
    model: &'a M,
    indices_of_sites: Vec<usize>,
    vector: StateVector,
    ph: f64,
    state: CalculationState,
}

/// Builds a state vector pointing every site at its most probable
/// instance. Among instances of equal maximal probability the one with
/// the larger index wins.
pub fn seed_from_probabilities<M: ProtonationModel>(
    model: &M,
) -> Result<StateVector, EngineError> {
    if !model.probabilities_available() {
        return Err(EngineError::ProbabilitiesNotComputed);
    }

    let sites = model.sites();
    let mut vector = StateVector::new(sites.iter().map(|s| s.instance_count()).collect());

    for (site_index, site) in sites.iter().enumerate() {
        let mut best_probability = f64::NEG_INFINITY;
        let mut best_instance = None;
        for (instance_index, instance) in site.instances().iter().enumerate() {
            let probability = instance
                .probability()
                .ok_or(EngineError::ProbabilitiesNotComputed)?;
            if probability >= best_probability {
                best_probability = probability;
                best_instance = Some(instance_index);
            }
        }
        let best_instance = best_instance.ok_or_else(|| {
            EngineError::Internal(format!(
                "site {} {} {} has no instances",
                site.segment(),
                site.residue_name(),
                site.residue_serial()
            ))
        })?;
        vector.set(site_index, best_instance)?;
    }

    Ok(vector)
}

impl<'a, M: ProtonationModel> Substate<'a, M> {
    /// Resolves the configured site selection against the model, seeds
    /// the working vector from occupancy probabilities and restricts it
    /// to the selected sites.
    ///
    /// Every specifier must match a site (on segment and residue serial);
    /// an unmatched one fails with [`EngineError::SiteNotFound`]. Repeated
    /// specifiers are kept, in selection order.
    pub fn new(model: &'a M, config: SubstateConfig) -> Result<Self, EngineError> {
        let sites = model.sites();
        let mut indices_of_sites = Vec::with_capacity(config.selections.len());

        for spec in &config.selections {
            let index = sites
                .iter()
                .position(|site| {
                    site.segment() == spec.segment
                        && site.residue_serial() == spec.residue_serial
                })
                .ok_or_else(|| EngineError::SiteNotFound { spec: spec.clone() })?;
            indices_of_sites.push(index);
        }

        let mut vector = seed_from_probabilities(model)?;
        vector.define_substate(&indices_of_sites)?;

        info!(
            sites = indices_of_sites.len(),
            ph = config.ph,
            "Substate initialized."
        );

        Ok(Self {
            model,
            indices_of_sites,
            vector,
            ph: config.ph,
            state: CalculationState::Pending,
        })
    }

    pub fn ph(&self) -> f64 {
        self.ph
    }

    /// The model this substate was constructed against.
    pub fn model(&self) -> &M {
        self.model
    }

    /// Indices of the selected sites in the model, in selection order.
    pub fn indices_of_sites(&self) -> &[usize] {
        &self.indices_of_sites
    }

    pub fn is_calculated(&self) -> bool {
        matches!(self.state, CalculationState::Calculated(_))
    }

    /// The ranked results, once [`calculate_substate_energies`] has
    /// completed.
    ///
    /// [`calculate_substate_energies`]: Substate::calculate_substate_energies
    pub fn energies(&self) -> Option<&SubstateEnergies> {
        match &self.state {
            CalculationState::Calculated(energies) => Some(energies),
            CalculationState::Pending => None,
        }
    }

    pub fn zero_energy(&self) -> Option<f64> {
        self.energies().map(|e| e.zero_energy)
    }

    /// Enumerates every combination of the selected sites, scoring each
    /// full microstate at the configured pH, and ranks the results.
    ///
    /// Runs at most once: further calls are no-ops. An energy-function
    /// failure aborts the sweep with no partial results, leaving the
    /// substate pending so a later call retries the full enumeration.
    pub fn calculate_substate_energies(&mut self) -> Result<(), EngineError> {
        self.calculate_with_reporter(&ProgressReporter::new())
    }

    /// [`calculate_substate_energies`] with enumeration progress events.
    ///
    /// [`calculate_substate_energies`]: Substate::calculate_substate_energies
    pub fn calculate_with_reporter(
        &mut self,
        reporter: &ProgressReporter,
    ) -> Result<(), EngineError> {
        if self.is_calculated() {
            debug!("Substate energies already calculated; skipping.");
            return Ok(());
        }

        self.vector.reset_substate();
        let total_states = self.vector.substate_space_size();
        reporter.report(Progress::EnumerationStart { total_states });

        let mut entries = Vec::with_capacity(total_states as usize);
        loop {
            let energy = self
                .model
                .microstate_energy(self.vector.as_slice(), self.ph)
                .map_err(|source| EngineError::EnergyEvaluation {
                    ph: self.ph,
                    source,
                })?;

            let instances = self
                .indices_of_sites
                .iter()
                .map(|&site| self.vector.as_slice()[site])
                .collect();
            entries.push(SubstateEntry { energy, instances });
            reporter.report(Progress::StateEvaluated);

            if !self.vector.increment_substate() {
                break;
            }
        }
        reporter.report(Progress::EnumerationFinish);

        entries.sort_by(|a, b| {
            a.energy
                .partial_cmp(&b.energy)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.instances.cmp(&b.instances))
        });

        let zero_energy = entries
            .first()
            .map(|entry| entry.energy)
            .ok_or_else(|| {
                EngineError::Internal("substate enumeration produced no states".to_string())
            })?;

        info!(
            states = entries.len(),
            ground_energy = zero_energy,
            "Substate energy calculation complete."
        );

        self.state = CalculationState::Calculated(SubstateEnergies {
            entries,
            zero_energy,
        });
        Ok(())
    }
}
