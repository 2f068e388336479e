use crate::core::models::model::{EnergyError, ProtonationModel};
use crate::core::models::site::{Instance, Site};
use std::collections::HashSet;
use std::f64::consts::LN_10;
use thiserror::Error;

/// Molar gas constant in kcal/(mol K).
pub const MOLAR_GAS_KCAL_MOL: f64 = 1.987165392e-3;

/// Temperature used when none is given, in Kelvin.
pub const DEFAULT_TEMPERATURE: f64 = 300.0;

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("a titration model requires at least one site")]
    NoSites,

    #[error("site {segment}/{residue_name} {residue_serial} has no instances")]
    EmptyInstanceList {
        segment: String,
        residue_name: String,
        residue_serial: i32,
    },

    #[error("duplicate site {segment} {residue_serial}: site keys must be unique")]
    DuplicateSite {
        segment: String,
        residue_serial: i32,
    },

    #[error("temperature must be positive, got {0} K")]
    InvalidTemperature(f64),

    #[error("site index {index} out of range ({len} sites)")]
    SiteIndexOutOfRange { index: usize, len: usize },

    #[error("instance index {instance} out of range for site {site} ({count} instances)")]
    InstanceOutOfRange {
        site: usize,
        instance: usize,
        count: usize,
    },

    #[error("an instance cannot interact with another instance of its own site {site}")]
    SelfInteraction { site: usize },

    #[error("expected {expected} occupancy probabilities, got {actual}")]
    ProbabilityLengthMismatch { expected: usize, actual: usize },
}

/// One protonation form of a site, with the physical data the energy
/// function needs: its proton count and its intrinsic (pH-independent)
/// energy in kcal/mol.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceDefinition {
    pub label: String,
    pub protons: i32,
    pub intrinsic_energy: f64,
}

impl InstanceDefinition {
    pub fn new(label: &str, protons: i32, intrinsic_energy: f64) -> Self {
        Self {
            label: label.to_string(),
            protons,
            intrinsic_energy,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SiteDefinition {
    pub segment: String,
    pub residue_name: String,
    pub residue_serial: i32,
    pub instances: Vec<InstanceDefinition>,
}

impl SiteDefinition {
    pub fn new(
        segment: &str,
        residue_name: &str,
        residue_serial: i32,
        instances: Vec<InstanceDefinition>,
    ) -> Self {
        Self {
            segment: segment.to_string(),
            residue_name: residue_name.to_string(),
            residue_serial,
            instances,
        }
    }
}

/// A titration model with an explicit microstate energy function.
///
/// Every instance of every site is assigned a global index into flat
/// per-instance arrays (proton counts, intrinsic energies) and into a
/// symmetric instance-instance interaction matrix in kcal/mol. The energy
/// of a microstate is
///
/// ```text
/// E = sum(Gintr) - nprotons * (-R * T * ln10 * pH) + sum(W over site pairs)
/// ```
///
/// which is the standard continuum-electrostatics decomposition into
/// intrinsic, proton-chemical-potential and pairwise interaction terms.
#[derive(Debug, Clone)]
pub struct MicrostateEnergyModel {
    sites: Vec<Site>,
    offsets: Vec<usize>,
    protons: Vec<i32>,
    intrinsic: Vec<f64>,
    interactions: Vec<Vec<f64>>,
    temperature: f64,
    probabilities_available: bool,
}

impl MicrostateEnergyModel {
    /// Builds a model at [`DEFAULT_TEMPERATURE`] with all pairwise
    /// interactions zero; fill them in with [`set_interaction`].
    ///
    /// [`set_interaction`]: MicrostateEnergyModel::set_interaction
    pub fn new(definitions: Vec<SiteDefinition>) -> Result<Self, ModelError> {
        Self::with_temperature(definitions, DEFAULT_TEMPERATURE)
    }

    pub fn with_temperature(
        definitions: Vec<SiteDefinition>,
        temperature: f64,
    ) -> Result<Self, ModelError> {
        if definitions.is_empty() {
            return Err(ModelError::NoSites);
        }
        if !(temperature > 0.0) {
            return Err(ModelError::InvalidTemperature(temperature));
        }

        let mut seen = HashSet::new();
        let mut sites = Vec::with_capacity(definitions.len());
        let mut offsets = Vec::with_capacity(definitions.len());
        let mut protons = Vec::new();
        let mut intrinsic = Vec::new();

        for definition in definitions {
            if definition.instances.is_empty() {
                return Err(ModelError::EmptyInstanceList {
                    segment: definition.segment,
                    residue_name: definition.residue_name,
                    residue_serial: definition.residue_serial,
                });
            }
            if !seen.insert((definition.segment.clone(), definition.residue_serial)) {
                return Err(ModelError::DuplicateSite {
                    segment: definition.segment,
                    residue_serial: definition.residue_serial,
                });
            }

            let mut site = Site::new(
                &definition.segment,
                &definition.residue_name,
                definition.residue_serial,
            );
            offsets.push(protons.len());
            for instance in definition.instances {
                site.add_instance(Instance::new(&instance.label));
                protons.push(instance.protons);
                intrinsic.push(instance.intrinsic_energy);
            }
            sites.push(site);
        }

        let total = protons.len();
        Ok(Self {
            sites,
            offsets,
            protons,
            intrinsic,
            interactions: vec![vec![0.0; total]; total],
            temperature,
            probabilities_available: false,
        })
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Total number of instances across all sites.
    pub fn instance_total(&self) -> usize {
        self.protons.len()
    }

    /// Global index of instance `instance` of site `site` in the flat
    /// per-instance arrays.
    pub fn global_index(&self, site: usize, instance: usize) -> Result<usize, ModelError> {
        let count = self
            .sites
            .get(site)
            .map(Site::instance_count)
            .ok_or(ModelError::SiteIndexOutOfRange {
                index: site,
                len: self.sites.len(),
            })?;
        if instance >= count {
            return Err(ModelError::InstanceOutOfRange {
                site,
                instance,
                count,
            });
        }
        Ok(self.offsets[site] + instance)
    }

    /// Stores the interaction energy between two instances of two distinct
    /// sites, symmetrically.
    pub fn set_interaction(
        &mut self,
        site_a: usize,
        instance_a: usize,
        site_b: usize,
        instance_b: usize,
        energy: f64,
    ) -> Result<(), ModelError> {
        if site_a == site_b {
            return Err(ModelError::SelfInteraction { site: site_a });
        }
        let a = self.global_index(site_a, instance_a)?;
        let b = self.global_index(site_b, instance_b)?;
        self.interactions[a][b] = energy;
        self.interactions[b][a] = energy;
        Ok(())
    }

    pub fn interaction(
        &self,
        site_a: usize,
        instance_a: usize,
        site_b: usize,
        instance_b: usize,
    ) -> Result<f64, ModelError> {
        let a = self.global_index(site_a, instance_a)?;
        let b = self.global_index(site_b, instance_b)?;
        Ok(self.interactions[a][b])
    }

    /// Writes computed occupancy probabilities back into the site
    /// instances, one value per global instance index, and flips the
    /// availability flag.
    pub fn apply_probabilities(&mut self, probabilities: &[f64]) -> Result<(), ModelError> {
        if probabilities.len() != self.protons.len() {
            return Err(ModelError::ProbabilityLengthMismatch {
                expected: self.protons.len(),
                actual: probabilities.len(),
            });
        }
        for (site_index, offset) in self.offsets.iter().copied().enumerate() {
            let count = self.sites[site_index].instance_count();
            for instance_index in 0..count {
                if let Some(instance) = self.sites[site_index].instance_mut(instance_index) {
                    instance.set_probability(probabilities[offset + instance_index]);
                }
            }
        }
        self.probabilities_available = true;
        Ok(())
    }
}

impl ProtonationModel for MicrostateEnergyModel {
    fn sites(&self) -> &[Site] {
        &self.sites
    }

    fn probabilities_available(&self) -> bool {
        self.probabilities_available
    }

    fn microstate_energy(&self, state: &[usize], ph: f64) -> Result<f64, EnergyError> {
        if state.len() != self.sites.len() {
            return Err(EnergyError::StateLengthMismatch {
                expected: self.sites.len(),
                actual: state.len(),
            });
        }

        let mut intrinsic_sum = 0.0;
        let mut interaction_sum = 0.0;
        let mut proton_count = 0i64;

        for (site_index, &instance_index) in state.iter().enumerate() {
            let outer = self.checked_global(site_index, instance_index)?;
            proton_count += i64::from(self.protons[outer]);
            intrinsic_sum += self.intrinsic[outer];

            for (inner_site, &inner_instance) in state[..site_index].iter().enumerate() {
                let inner = self.checked_global(inner_site, inner_instance)?;
                interaction_sum += self.interactions[outer][inner];
            }
        }

        let proton_potential = -MOLAR_GAS_KCAL_MOL * self.temperature * LN_10 * ph;
        Ok(intrinsic_sum - proton_count as f64 * proton_potential + interaction_sum)
    }
}

impl MicrostateEnergyModel {
    fn checked_global(&self, site: usize, instance: usize) -> Result<usize, EnergyError> {
        let count = self.sites[site].instance_count();
        if instance >= count {
            return Err(EnergyError::InstanceOutOfRange {
                site,
                instance,
                count,
            });
        }
        Ok(self.offsets[site] + instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn two_site_model() -> MicrostateEnergyModel {
        MicrostateEnergyModel::new(vec![
            SiteDefinition::new(
                "PRTA",
                "GLU",
                35,
                vec![
                    InstanceDefinition::new("p", 1, 1.5),
                    InstanceDefinition::new("d", 0, -0.5),
                ],
            ),
            SiteDefinition::new(
                "PRTA",
                "HIS",
                18,
                vec![
                    InstanceDefinition::new("HSP", 2, 3.0),
                    InstanceDefinition::new("HSE", 1, 0.0),
                    InstanceDefinition::new("HSD", 1, 0.25),
                ],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn construction_rejects_empty_site_list() {
        assert_eq!(
            MicrostateEnergyModel::new(vec![]).unwrap_err(),
            ModelError::NoSites
        );
    }

    #[test]
    fn construction_rejects_site_without_instances() {
        let result = MicrostateEnergyModel::new(vec![SiteDefinition::new("PRTA", "ASP", 3, vec![])]);
        assert!(matches!(
            result.unwrap_err(),
            ModelError::EmptyInstanceList { residue_serial: 3, .. }
        ));
    }

    #[test]
    fn construction_rejects_duplicate_site_keys() {
        let instances = vec![InstanceDefinition::new("p", 1, 0.0)];
        let result = MicrostateEnergyModel::new(vec![
            SiteDefinition::new("PRTA", "GLU", 35, instances.clone()),
            SiteDefinition::new("PRTA", "ASP", 35, instances),
        ]);
        assert!(matches!(result.unwrap_err(), ModelError::DuplicateSite { .. }));
    }

    #[test]
    fn construction_rejects_non_positive_temperature() {
        let definitions = vec![SiteDefinition::new(
            "PRTA",
            "GLU",
            35,
            vec![InstanceDefinition::new("p", 1, 0.0)],
        )];
        let result = MicrostateEnergyModel::with_temperature(definitions, 0.0);
        assert_eq!(result.unwrap_err(), ModelError::InvalidTemperature(0.0));
    }

    #[test]
    fn global_index_follows_site_offsets() {
        let model = two_site_model();
        assert_eq!(model.global_index(0, 0).unwrap(), 0);
        assert_eq!(model.global_index(0, 1).unwrap(), 1);
        assert_eq!(model.global_index(1, 0).unwrap(), 2);
        assert_eq!(model.global_index(1, 2).unwrap(), 4);
        assert_eq!(model.instance_total(), 5);
    }

    #[test]
    fn global_index_rejects_out_of_range_indices() {
        let model = two_site_model();
        assert!(matches!(
            model.global_index(5, 0).unwrap_err(),
            ModelError::SiteIndexOutOfRange { index: 5, len: 2 }
        ));
        assert!(matches!(
            model.global_index(0, 2).unwrap_err(),
            ModelError::InstanceOutOfRange { site: 0, instance: 2, count: 2 }
        ));
    }

    #[test]
    fn energy_sums_intrinsic_terms_at_ph_zero() {
        let model = two_site_model();
        // At pH 0 the proton chemical potential vanishes and no
        // interactions are set, so the energy is the intrinsic sum.
        let energy = model.microstate_energy(&[0, 1], 0.0).unwrap();
        assert_relative_eq!(energy, 1.5 + 0.0);
    }

    #[test]
    fn energy_includes_proton_ph_term() {
        let model = two_site_model();
        let ph = 7.0;
        let potential = -MOLAR_GAS_KCAL_MOL * DEFAULT_TEMPERATURE * LN_10 * ph;
        // State (p, HSP) carries 1 + 2 protons.
        let energy = model.microstate_energy(&[0, 0], ph).unwrap();
        assert_relative_eq!(energy, 1.5 + 3.0 - 3.0 * potential, epsilon = 1e-12);
    }

    #[test]
    fn energy_includes_symmetric_interactions() {
        let mut model = two_site_model();
        model.set_interaction(0, 1, 1, 2, 2.5).unwrap();

        let energy = model.microstate_energy(&[1, 2], 0.0).unwrap();
        assert_relative_eq!(energy, -0.5 + 0.25 + 2.5, epsilon = 1e-12);
        assert_relative_eq!(model.interaction(1, 2, 0, 1).unwrap(), 2.5);
    }

    #[test]
    fn set_interaction_rejects_self_interaction() {
        let mut model = two_site_model();
        assert_eq!(
            model.set_interaction(1, 0, 1, 1, 1.0).unwrap_err(),
            ModelError::SelfInteraction { site: 1 }
        );
    }

    #[test]
    fn energy_rejects_state_length_mismatch() {
        let model = two_site_model();
        assert_eq!(
            model.microstate_energy(&[0], 7.0).unwrap_err(),
            EnergyError::StateLengthMismatch { expected: 2, actual: 1 }
        );
    }

    #[test]
    fn energy_rejects_out_of_range_instance() {
        let model = two_site_model();
        assert_eq!(
            model.microstate_energy(&[0, 3], 7.0).unwrap_err(),
            EnergyError::InstanceOutOfRange { site: 1, instance: 3, count: 3 }
        );
    }

    #[test]
    fn apply_probabilities_fills_instances_and_sets_flag() {
        let mut model = two_site_model();
        assert!(!model.probabilities_available());

        model
            .apply_probabilities(&[0.7, 0.3, 0.1, 0.6, 0.3])
            .unwrap();

        assert!(model.probabilities_available());
        assert_eq!(model.sites()[0].instances()[0].probability(), Some(0.7));
        assert_eq!(model.sites()[1].instances()[1].probability(), Some(0.6));
    }

    #[test]
    fn apply_probabilities_rejects_wrong_length() {
        let mut model = two_site_model();
        assert_eq!(
            model.apply_probabilities(&[1.0]).unwrap_err(),
            ModelError::ProbabilityLengthMismatch { expected: 5, actual: 1 }
        );
        assert!(!model.probabilities_available());
    }
}
