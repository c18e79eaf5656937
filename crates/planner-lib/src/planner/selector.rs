//! Machine-class selection
//!
//! "Smallest sufficient" selection: candidates are ordered by
//! (vCPU, memory, name) and the first one covering both minimums wins.
//! When nothing fits, the largest candidate is returned instead of failing.

use tracing::debug;

use crate::error::PlanError;
use crate::models::{MachineCategory, MachineClass};

/// Outcome of a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection<'a> {
    pub class: &'a MachineClass,
    /// False when the class is a best-effort oversize fallback
    pub fits: bool,
}

fn sort_key(class: &MachineClass) -> (u32, u32, &str) {
    (class.vcpus, class.memory_gb, class.name.as_str())
}

/// Pick the smallest class with `vcpus >= min_cpu` and `memory_gb >= min_memory_gb`
pub fn select_machine_class(
    candidates: &[MachineClass],
    category: MachineCategory,
    min_cpu: u32,
    min_memory_gb: u32,
) -> Result<Selection<'_>, PlanError> {
    let mut ordered: Vec<&MachineClass> = candidates.iter().collect();
    ordered.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));

    if let Some(class) = ordered
        .iter()
        .copied()
        .find(|c| c.satisfies(min_cpu, min_memory_gb))
    {
        return Ok(Selection { class, fits: true });
    }

    let largest = ordered
        .last()
        .copied()
        .ok_or(PlanError::CatalogEmpty { category })?;

    debug!(
        category = %category,
        min_cpu,
        min_memory_gb,
        fallback = %largest.name,
        "No machine class fits, falling back to largest"
    );
    Ok(Selection {
        class: largest,
        fits: false,
    })
}

/// First class in catalog order, ignoring requirements
pub fn first_listed(
    candidates: &[MachineClass],
    category: MachineCategory,
) -> Result<&MachineClass, PlanError> {
    candidates.first().ok_or(PlanError::CatalogEmpty { category })
}
