use crate::core::energetics::microstate::{MOLAR_GAS_KCAL_MOL, MicrostateEnergyModel};
use crate::core::models::model::ProtonationModel;
use crate::engine::error::EngineError;
use crate::engine::state::StateVector;
use tracing::{info, warn};

/// Site counts beyond which the full enumeration is flagged as expensive.
const LARGE_MODEL_SITES: usize = 20;

/// Computes per-instance occupancy probabilities at the given pH as an
/// exact Boltzmann average over every microstate of the model, writes
/// them back into the model and returns them in global instance order.
///
/// The sweep visits the complete state space, so the cost grows with the
/// product of all instance counts. Intended for small models; larger ones
/// need a sampling-based estimate instead.
pub fn run(model: &mut MicrostateEnergyModel, ph: f64) -> Result<Vec<f64>, EngineError> {
    let counts: Vec<usize> = model
        .sites()
        .iter()
        .map(|site| site.instance_count())
        .collect();
    if counts.len() > LARGE_MODEL_SITES {
        warn!(
            sites = counts.len(),
            "Analytic probability calculation over a large model; the state space is exponential in the site count."
        );
    }

    let mut vector = StateVector::new(counts);
    let total_states = vector.state_space_size();
    info!(states = total_states, ph, "Enumerating microstates for analytic probabilities.");

    // First pass: energies of every microstate and the global minimum,
    // used to shift the exponentials into a numerically safe range.
    let mut energies = Vec::with_capacity(total_states as usize);
    let mut zero_energy = f64::INFINITY;
    vector.reset();
    loop {
        let energy = model
            .microstate_energy(vector.as_slice(), ph)
            .map_err(|source| EngineError::EnergyEvaluation { ph, source })?;
        if energy < zero_energy {
            zero_energy = energy;
        }
        energies.push(energy);
        if !vector.increment() {
            break;
        }
    }

    let beta = 1.0 / (MOLAR_GAS_KCAL_MOL * model.temperature());
    let weights: Vec<f64> = energies
        .iter()
        .map(|&energy| (-(energy - zero_energy) * beta).exp())
        .collect();
    let partition: f64 = weights.iter().sum();

    // Second pass: accumulate each state's weight onto the instances it
    // selects, then normalize by the partition sum.
    let mut occupancies = vec![0.0; model.instance_total()];
    vector.reset();
    for weight in &weights {
        for (site, &instance) in vector.as_slice().iter().enumerate() {
            let global = model
                .global_index(site, instance)
                .map_err(|err| EngineError::Internal(err.to_string()))?;
            occupancies[global] += weight;
        }
        vector.increment();
    }
    for occupancy in &mut occupancies {
        *occupancy /= partition;
    }

    model
        .apply_probabilities(&occupancies)
        .map_err(|err| EngineError::Internal(err.to_string()))?;

    Ok(occupancies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::energetics::microstate::{InstanceDefinition, SiteDefinition};
    use approx::assert_relative_eq;

    fn single_site_model(gap: f64) -> MicrostateEnergyModel {
        MicrostateEnergyModel::new(vec![SiteDefinition::new(
            "PRTA",
            "GLU",
            35,
            vec![
                InstanceDefinition::new("low", 0, 0.0),
                InstanceDefinition::new("high", 0, gap),
            ],
        )])
        .unwrap()
    }

    #[test]
    fn two_state_site_follows_boltzmann_ratio() {
        let mut model = single_site_model(1.0);
        let occupancies = run(&mut model, 7.0).unwrap();

        let beta = 1.0 / (MOLAR_GAS_KCAL_MOL * model.temperature());
        let x = (-1.0 * beta).exp();
        assert_relative_eq!(occupancies[0], 1.0 / (1.0 + x), epsilon = 1e-12);
        assert_relative_eq!(occupancies[1], x / (1.0 + x), epsilon = 1e-12);
    }

    #[test]
    fn occupancies_sum_to_one_per_site() {
        let mut model = MicrostateEnergyModel::new(vec![
            SiteDefinition::new(
                "PRTA",
                "ASP",
                1,
                vec![
                    InstanceDefinition::new("p", 1, 0.4),
                    InstanceDefinition::new("d", 0, -0.3),
                ],
            ),
            SiteDefinition::new(
                "PRTA",
                "HIS",
                2,
                vec![
                    InstanceDefinition::new("HSP", 2, 1.0),
                    InstanceDefinition::new("HSE", 1, 0.2),
                    InstanceDefinition::new("HSD", 1, 0.7),
                ],
            ),
        ])
        .unwrap();
        model.set_interaction(0, 0, 1, 0, 0.8).unwrap();

        let occupancies = run(&mut model, 6.5).unwrap();

        assert_relative_eq!(occupancies[0] + occupancies[1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(
            occupancies[2] + occupancies[3] + occupancies[4],
            1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn run_marks_probabilities_available_on_the_model() {
        let mut model = single_site_model(0.5);
        assert!(!model.probabilities_available());

        run(&mut model, 7.0).unwrap();

        assert!(model.probabilities_available());
        let site = &model.sites()[0];
        assert!(site.instances()[0].probability().unwrap() > 0.5);
    }

    #[test]
    fn degenerate_instances_split_evenly() {
        let mut model = single_site_model(0.0);
        let occupancies = run(&mut model, 7.0).unwrap();
        assert_relative_eq!(occupancies[0], 0.5, epsilon = 1e-12);
        assert_relative_eq!(occupancies[1], 0.5, epsilon = 1e-12);
    }
}
