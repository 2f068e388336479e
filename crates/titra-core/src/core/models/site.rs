use serde::{Deserialize, Serialize};

/// One protonation or tautomer form of a titratable site.
///
/// The occupancy probability is only meaningful after a probability
/// calculation has been run against the owning model; until then it is
/// `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    label: String,
    probability: Option<f64>,
}

impl Instance {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            probability: None,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn probability(&self) -> Option<f64> {
        self.probability
    }

    pub(crate) fn set_probability(&mut self, probability: f64) {
        self.probability = Some(probability);
    }
}

/// A titratable position in the macromolecule, identified by its segment,
/// residue name and residue serial number, owning an ordered list of
/// protonation instances.
///
/// Sites are immutable once the model is built; the enumeration engine
/// references them by their position in the model's ordered site list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    segment: String,
    residue_name: String,
    residue_serial: i32,
    instances: Vec<Instance>,
}

impl Site {
    pub fn new(segment: &str, residue_name: &str, residue_serial: i32) -> Self {
        Self {
            segment: segment.to_string(),
            residue_name: residue_name.to_string(),
            residue_serial,
            instances: Vec::new(),
        }
    }

    pub fn segment(&self) -> &str {
        &self.segment
    }

    pub fn residue_name(&self) -> &str {
        &self.residue_name
    }

    pub fn residue_serial(&self) -> i32 {
        self.residue_serial
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub(crate) fn add_instance(&mut self, instance: Instance) {
        self.instances.push(instance);
    }

    pub(crate) fn instance_mut(&mut self, index: usize) -> Option<&mut Instance> {
        self.instances.get_mut(index)
    }
}
