use super::substate::Substate;
use crate::core::models::model::ProtonationModel;
use itertools::Itertools;
use std::fmt;
use tracing::debug;

/// How substate results are rendered.
#[derive(Debug, Clone)]
pub struct SummaryOptions {
    /// Report energies relative to the ground state instead of absolute.
    pub relative_energies: bool,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            relative_energies: true,
        }
    }
}

/// Renders the ranked combinations of a calculated substate as a table of
/// rank, energy and per-site instance labels. Writes nothing when the
/// substate has not been calculated yet.
pub fn write_summary<M: ProtonationModel, W: fmt::Write>(
    substate: &Substate<M>,
    options: &SummaryOptions,
    out: &mut W,
) -> fmt::Result {
    let Some(energies) = substate.energies() else {
        debug!("Summary requested before calculation; nothing to report.");
        return Ok(());
    };

    let model = substate.model();
    let sites = model.sites();
    let indices = substate.indices_of_sites();

    let site_headers = indices
        .iter()
        .map(|&site| {
            sites
                .get(site)
                .map(|s| format!("{} {} {}", s.segment(), s.residue_name(), s.residue_serial()))
                .unwrap_or_else(|| "?".to_string())
        })
        .map(|header| format!("{:^14}", header))
        .join(" ");
    writeln!(out, "{:>6} {:>9} {}", "State", "Gmicro", site_headers)?;

    for (rank, entry) in energies.entries.iter().enumerate() {
        let energy = if options.relative_energies {
            entry.energy - energies.zero_energy
        } else {
            entry.energy
        };

        let labels = indices
            .iter()
            .zip(&entry.instances)
            .map(|(&site, &instance)| {
                sites
                    .get(site)
                    .and_then(|s| s.instances().get(instance))
                    .map(|i| i.label())
                    .unwrap_or("?")
            })
            .map(|label| format!("{:^14}", label))
            .join(" ");
        writeln!(out, "{:>6} {:>9.2} {}", rank + 1, energy, labels)?;
    }

    Ok(())
}

/// [`write_summary`] into a fresh string; `None` when the substate has
/// not been calculated.
pub fn summary_string<M: ProtonationModel>(
    substate: &Substate<M>,
    options: &SummaryOptions,
) -> Option<String> {
    if !substate.is_calculated() {
        return None;
    }
    let mut rendered = String::new();
    write_summary(substate, options, &mut rendered).ok()?;
    Some(rendered)
}
