//! Rack topology metadata
//!
//! One descriptor per rack with a zone label and a zone spread constraint.
//! Descriptors are not bound to pools or nodes; binding pools to racks is
//! left to the scheduler consuming the labels.

use std::collections::BTreeMap;

use crate::models::{RackTopology, SpreadConstraint, UnsatisfiablePolicy};

/// Generate `rack-1..rack-N` descriptors keyed on `zone_key`
pub fn generate_rack_topology(rack_count: u32, zone_key: &str) -> Vec<RackTopology> {
    (1..=rack_count)
        .map(|i| {
            let rack_id = format!("rack-{}", i);
            let fault_domain = format!("fd-{}", i);

            let mut node_labels = BTreeMap::new();
            node_labels.insert(zone_key.to_string(), fault_domain.clone());
            node_labels.insert("rack".to_string(), rack_id.clone());

            RackTopology {
                rack_id,
                fault_domain,
                node_labels,
                spread_constraints: vec![SpreadConstraint {
                    max_skew: 1,
                    topology_key: zone_key.to_string(),
                    when_unsatisfiable: UnsatisfiablePolicy::DoNotSchedule,
                }],
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::config::ZONE_TOPOLOGY_KEY;
    use std::collections::HashSet;

    #[test]
    fn test_generates_one_entry_per_rack() {
        let racks = generate_rack_topology(4, ZONE_TOPOLOGY_KEY);
        assert_eq!(racks.len(), 4);
        assert_eq!(racks[0].rack_id, "rack-1");
        assert_eq!(racks[0].fault_domain, "fd-1");
        assert_eq!(racks[3].rack_id, "rack-4");

        let ids: HashSet<_> = racks.iter().map(|r| r.rack_id.as_str()).collect();
        let domains: HashSet<_> = racks.iter().map(|r| r.fault_domain.as_str()).collect();
        assert_eq!(ids.len(), 4);
        assert_eq!(domains.len(), 4);
    }

    #[test]
    fn test_no_zero_padding() {
        let racks = generate_rack_topology(12, ZONE_TOPOLOGY_KEY);
        assert_eq!(racks[9].rack_id, "rack-10");
        assert_eq!(racks[8].fault_domain, "fd-9");
    }

    #[test]
    fn test_labels_and_spread_constraint() {
        let racks = generate_rack_topology(2, ZONE_TOPOLOGY_KEY);
        let rack = &racks[1];
        assert_eq!(rack.node_labels.get(ZONE_TOPOLOGY_KEY).map(String::as_str), Some("fd-2"));
        assert_eq!(rack.node_labels.get("rack").map(String::as_str), Some("rack-2"));

        assert_eq!(rack.spread_constraints.len(), 1);
        let constraint = &rack.spread_constraints[0];
        assert_eq!(constraint.max_skew, 1);
        assert_eq!(constraint.topology_key, ZONE_TOPOLOGY_KEY);
        assert_eq!(constraint.when_unsatisfiable, UnsatisfiablePolicy::DoNotSchedule);
    }

    #[test]
    fn test_zero_racks_is_empty() {
        assert!(generate_rack_topology(0, ZONE_TOPOLOGY_KEY).is_empty());
    }
}
