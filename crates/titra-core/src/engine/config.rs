use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// pH applied when a configuration does not set one.
pub const DEFAULT_PH: f64 = 7.0;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
}

/// Identifies one titratable site by its (segment, residue name, residue
/// serial) triple. Resolution against a model matches on segment and
/// serial; the residue name is carried for display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SiteSpecifier {
    pub segment: String,
    pub residue_name: String,
    pub residue_serial: i32,
}

impl SiteSpecifier {
    pub fn new(segment: &str, residue_name: &str, residue_serial: i32) -> Self {
        Self {
            segment: segment.to_string(),
            residue_name: residue_name.to_string(),
            residue_serial,
        }
    }
}

impl fmt::Display for SiteSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.segment, self.residue_name, self.residue_serial
        )
    }
}

/// Parameters of one substate analysis: which sites to enumerate and at
/// which pH the energy function is evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct SubstateConfig {
    pub selections: Vec<SiteSpecifier>,
    pub ph: f64,
}

#[derive(Default)]
pub struct SubstateConfigBuilder {
    selections: Option<Vec<SiteSpecifier>>,
    ph: Option<f64>,
}

impl SubstateConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selections(mut self, selections: Vec<SiteSpecifier>) -> Self {
        self.selections = Some(selections);
        self
    }

    /// Appends one site to the selection, in order.
    pub fn select(mut self, specifier: SiteSpecifier) -> Self {
        self.selections.get_or_insert_with(Vec::new).push(specifier);
        self
    }

    pub fn ph(mut self, ph: f64) -> Self {
        self.ph = Some(ph);
        self
    }

    pub fn build(self) -> Result<SubstateConfig, ConfigError> {
        Ok(SubstateConfig {
            selections: self
                .selections
                .ok_or(ConfigError::MissingParameter("selections"))?,
            ph: self.ph.unwrap_or(DEFAULT_PH),
        })
    }
}
