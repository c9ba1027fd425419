//! Machine Registry service module (C2)
//!
//! Holds the machine set and answers capability-flow compatibility
//! queries. The substitution chains (spec §4.2) are encoded as a
//! declarative graph, the same way `DependencyAnalyzer` encodes job
//! dependencies as a `petgraph::DiGraph` rather than hand-written
//! branching (Design Notes §9: "the table is the specification and must
//! be testable in isolation").

use std::collections::HashMap;

use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::domain::entities::{Capability, Machine, MachineId, MachineType};

/// Declarative upward-only substitution table: an edge `a -> b` means a
/// machine capable of `b` may also satisfy a requirement for `a` (spec
/// §4.2: "upward-only substitution").
pub struct CapabilityFlowTable {
    graph: DiGraph<Capability, ()>,
    nodes: HashMap<Capability, NodeIndex>,
}

impl CapabilityFlowTable {
    /// Builds the fixed lathe and mill substitution chains from spec §4.2.
    pub fn standard() -> Self {
        let mut graph = DiGraph::new();
        let mut nodes = HashMap::new();
        let mut node_for = |graph: &mut DiGraph<Capability, ()>, cap: Capability| {
            *nodes
                .entry(cap)
                .or_insert_with(|| graph.add_node(cap))
        };

        let single = node_for(&mut graph, Capability::SingleSpindleTurning);
        let live = node_for(&mut graph, Capability::LiveToolingTurning);
        let dual = node_for(&mut graph, Capability::DualSpindleTurning);
        graph.add_edge(single, live, ());
        graph.add_edge(live, dual, ());

        let vmc = node_for(&mut graph, Capability::VmcMilling);
        let pseudo4 = node_for(&mut graph, Capability::Pseudo4thAxisMilling);
        let true4 = node_for(&mut graph, Capability::True4thAxisMilling);
        let five_axis = node_for(&mut graph, Capability::FiveAxisMilling);
        graph.add_edge(vmc, pseudo4, ());
        graph.add_edge(pseudo4, true4, ());
        graph.add_edge(true4, five_axis, ());

        node_for(&mut graph, Capability::BarFedTurning);
        node_for(&mut graph, Capability::Sawing);
        node_for(&mut graph, Capability::Waterjet);
        node_for(&mut graph, Capability::Inspection);

        Self { graph, nodes }
    }

    /// True if a machine whose best capability is `actual` satisfies a
    /// requirement for `required` — either an exact match or a reachable
    /// upward substitution.
    pub fn satisfies(&self, required: Capability, actual: Capability) -> bool {
        if required == actual {
            return true;
        }
        let (Some(&from), Some(&to)) = (self.nodes.get(&required), self.nodes.get(&actual))
        else {
            return false;
        };
        has_path_connecting(&self.graph, from, to, None)
    }
}

impl Default for CapabilityFlowTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// In-memory machine catalog queried by C8's placement loop. Constructed
/// explicitly from a snapshot (Design Notes §9: "no singleton, no global
/// mutable state") rather than hard-coding a default fleet (Design Notes
/// §9, resolved: "reimplementations should seed from external
/// configuration, not hard-code either").
pub struct MachineRegistry {
    machines: Vec<Machine>,
    flow: CapabilityFlowTable,
}

impl MachineRegistry {
    pub fn new(machines: Vec<Machine>) -> Self {
        Self {
            machines,
            flow: CapabilityFlowTable::standard(),
        }
    }

    pub fn by_id(&self, id: MachineId) -> Option<&Machine> {
        self.machines.iter().find(|m| m.id == id)
    }

    pub fn machines_of_type(&self, machine_type: MachineType) -> Vec<&Machine> {
        self.machines
            .iter()
            .filter(|m| m.machine_type == machine_type)
            .collect()
    }

    pub fn machines_in_group(&self, group: &str) -> Vec<&Machine> {
        self.machines
            .iter()
            .filter(|m| m.substitution_group.as_deref() == Some(group))
            .collect()
    }

    /// Capability-flow compatible machines, ordered per spec §4.2: exact
    /// category matches first, then other compatibles, tied by descending
    /// efficiency factor then ascending utilization.
    pub fn compatible_machines(
        &self,
        required: Capability,
        preferred_category: Option<&str>,
        tier_filter: Option<crate::domain::entities::MachineTier>,
    ) -> Vec<&Machine> {
        let mut candidates: Vec<&Machine> = self
            .machines
            .iter()
            .filter(|m| m.is_available_for_scheduling())
            .filter(|m| tier_filter.map(|t| t == m.tier).unwrap_or(true))
            .filter(|m| {
                m.capabilities
                    .iter()
                    .any(|&actual| self.flow.satisfies(required, actual))
            })
            .collect();

        candidates.sort_by(|a, b| {
            let a_exact = preferred_category.map(|c| a.category == c).unwrap_or(false);
            let b_exact = preferred_category.map(|c| b.category == c).unwrap_or(false);
            b_exact
                .cmp(&a_exact)
                .then(
                    b.efficiency_factor
                        .partial_cmp(&a.efficiency_factor)
                        .unwrap_or(std::cmp::Ordering::Equal),
                )
                .then(
                    a.utilization_pct
                        .partial_cmp(&b.utilization_pct)
                        .unwrap_or(std::cmp::Ordering::Equal),
                )
        });
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_tooling_satisfies_single_spindle_requirement() {
        let flow = CapabilityFlowTable::standard();
        assert!(flow.satisfies(
            Capability::SingleSpindleTurning,
            Capability::LiveToolingTurning
        ));
    }

    #[test]
    fn pseudo_4th_axis_does_not_satisfy_true_4th_axis_requirement() {
        let flow = CapabilityFlowTable::standard();
        assert!(!flow.satisfies(
            Capability::True4thAxisMilling,
            Capability::Pseudo4thAxisMilling
        ));
    }

    #[test]
    fn vmc_only_machine_does_not_satisfy_pseudo_4th_axis() {
        let flow = CapabilityFlowTable::standard();
        assert!(!flow.satisfies(Capability::Pseudo4thAxisMilling, Capability::VmcMilling));
    }

    #[test]
    fn unrelated_capabilities_never_substitute() {
        let flow = CapabilityFlowTable::standard();
        assert!(!flow.satisfies(Capability::Sawing, Capability::VmcMilling));
    }
}
