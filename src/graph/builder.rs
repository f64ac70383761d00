//! Element building - analysis snapshot to renderable graph
//!
//! Pure transformation: accounts become nodes (tier + ring flag), transactions
//! become edges with positional ids. Integrity problems never abort the build;
//! they come back as [`BuildWarning`]s next to a usable graph.

use std::collections::HashSet;

use super::rings::RingMembershipIndex;
use super::risk::{classify, RiskTier};
use super::types::*;
use crate::error::BuildWarning;

/// Result of one build: the element graph plus anything worth logging.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildOutput {
    pub graph: ElementGraph,
    pub warnings: Vec<BuildWarning>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GraphElementBuilder;

impl GraphElementBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build nodes and edges, preserving input order.
    ///
    /// Accounts referenced by a transaction but missing from `accounts` get a
    /// placeholder node (tier [`RiskTier::Unknown`]) appended after the real
    /// nodes, in order of first reference, with one warning each.
    pub fn build(
        &self,
        accounts: &[Account],
        transactions: &[Transaction],
        ring_index: &RingMembershipIndex,
    ) -> BuildOutput {
        let mut warnings = Vec::new();
        let mut seen: HashSet<&str> = HashSet::with_capacity(accounts.len());
        let mut nodes = Vec::with_capacity(accounts.len());

        for (index, account) in accounts.iter().enumerate() {
            if !seen.insert(account.id.as_str()) {
                warnings.push(BuildWarning::MalformedInput {
                    collection: "nodes",
                    index,
                    reason: format!("duplicate account id {}", account.id),
                });
                continue;
            }
            nodes.push(VisualNode {
                id: account.id.clone(),
                label: account.id.clone(),
                tier: classify(account.suspicion_score),
                in_ring: ring_index.contains(&account.id),
                suspicion_score: account.suspicion_score,
                flags: account.flags.clone(),
                placeholder: false,
            });
        }

        let mut edges = Vec::with_capacity(transactions.len());
        let mut placeholders: Vec<VisualNode> = Vec::new();

        for (index, tx) in transactions.iter().enumerate() {
            let edge_id = edge_id(index);
            for endpoint in [&tx.source, &tx.target] {
                if seen.insert(endpoint.as_str()) {
                    warnings.push(BuildWarning::DanglingReference {
                        edge_id: edge_id.clone(),
                        account_id: endpoint.clone(),
                    });
                    placeholders.push(placeholder_node(endpoint, ring_index));
                }
            }
            edges.push(VisualEdge {
                id: edge_id,
                source: tx.source.clone(),
                target: tx.target.clone(),
                amount: tx.amount,
                label: format_amount(tx.amount),
            });
        }

        nodes.extend(placeholders);

        BuildOutput {
            graph: ElementGraph::new(nodes, edges),
            warnings,
        }
    }

    /// Build straight from a snapshot, deriving the ring index on the way.
    pub fn build_from_result(&self, result: &AnalysisResult) -> (BuildOutput, RingMembershipIndex) {
        let ring_index = RingMembershipIndex::build(&result.fraud_rings);
        let output = self.build(&result.accounts, &result.transactions, &ring_index);
        (output, ring_index)
    }
}

/// Stable synthetic edge id: `e{position}`
pub fn edge_id(index: usize) -> String {
    format!("e{}", index)
}

fn placeholder_node(id: &str, ring_index: &RingMembershipIndex) -> VisualNode {
    VisualNode {
        id: id.to_string(),
        label: id.to_string(),
        tier: RiskTier::Unknown,
        in_ring: ring_index.contains(id),
        suspicion_score: 0.0,
        flags: Vec::new(),
        placeholder: true,
    }
}

/// Currency label for an edge: `$1,250.50`
pub fn format_amount(amount: f64) -> String {
    // Beyond u64 cents the cast saturates; print the raw value instead
    if !amount.is_finite() || amount.abs() * 100.0 >= u64::MAX as f64 {
        return format!("${}", amount);
    }

    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, frac)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::PatternType;

    fn sample() -> (Vec<Account>, Vec<Transaction>, Vec<FraudRing>) {
        let accounts = vec![
            Account::new("A", 85.0).with_flags(["cycle_length_3"]),
            Account::new("B", 55.0),
            Account::new("C", 12.0),
        ];
        let transactions = vec![
            Transaction::new("A", "B", 1500.0),
            Transaction::new("B", "C", 20.25),
            Transaction::new("A", "B", 1500.0),
        ];
        let rings = vec![FraudRing::new("R1", PatternType::Cycle, ["A", "B"])];
        (accounts, transactions, rings)
    }

    #[test]
    fn nodes_carry_tier_and_ring_flag() {
        let (accounts, transactions, rings) = sample();
        let index = RingMembershipIndex::build(&rings);
        let out = GraphElementBuilder::new().build(&accounts, &transactions, &index);

        assert!(out.warnings.is_empty());
        let ids: Vec<_> = out.graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["A", "B", "C"]);

        let a = out.graph.get_node("A").unwrap();
        assert_eq!(a.tier, RiskTier::High);
        assert!(a.in_ring);
        assert_eq!(a.flags, vec!["cycle_length_3"]);

        assert_eq!(out.graph.get_node("B").unwrap().tier, RiskTier::Medium);
        let c = out.graph.get_node("C").unwrap();
        assert_eq!(c.tier, RiskTier::Low);
        assert!(!c.in_ring);
    }

    #[test]
    fn parallel_transactions_stay_distinct() {
        let (accounts, transactions, _) = sample();
        let out = GraphElementBuilder::new().build(
            &accounts,
            &transactions,
            &RingMembershipIndex::new(),
        );
        let ids: Vec<_> = out.graph.edges.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["e0", "e1", "e2"]);
        assert_eq!(out.graph.edges[0].label, "$1,500.00");
        assert_eq!(out.graph.edges[1].label, "$20.25");
    }

    #[test]
    fn build_is_idempotent() {
        let (accounts, transactions, rings) = sample();
        let index = RingMembershipIndex::build(&rings);
        let builder = GraphElementBuilder::new();
        let first = builder.build(&accounts, &transactions, &index);
        let second = builder.build(&accounts, &transactions, &index);
        assert_eq!(first, second);
    }

    #[test]
    fn dangling_reference_creates_placeholder() {
        let accounts = vec![Account::new("A", 10.0)];
        let transactions = vec![Transaction::new("A", "B", 5.0)];
        let out = GraphElementBuilder::new().build(
            &accounts,
            &transactions,
            &RingMembershipIndex::new(),
        );

        assert_eq!(out.graph.node_count(), 2);
        let b = out.graph.get_node("B").unwrap();
        assert!(b.placeholder);
        assert_eq!(b.tier, RiskTier::Unknown);
        assert_eq!(
            out.warnings,
            vec![BuildWarning::DanglingReference {
                edge_id: "e0".into(),
                account_id: "B".into(),
            }]
        );
        assert_eq!(out.graph.edge_endpoints(), vec![(0, 1)]);
    }

    #[test]
    fn missing_account_warned_once_across_edges() {
        let accounts = vec![Account::new("A", 10.0)];
        let transactions = vec![
            Transaction::new("X", "A", 1.0),
            Transaction::new("A", "X", 2.0),
            Transaction::new("Y", "X", 3.0),
        ];
        let rings = vec![FraudRing::new("R1", PatternType::FanIn, ["Y"])];
        let out = GraphElementBuilder::new().build(
            &accounts,
            &transactions,
            &RingMembershipIndex::build(&rings),
        );

        let ids: Vec<_> = out.graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["A", "X", "Y"]);
        assert_eq!(out.warnings.len(), 2);
        assert!(out.graph.get_node("Y").unwrap().in_ring);
    }

    #[test]
    fn duplicate_account_keeps_first() {
        let accounts = vec![Account::new("A", 90.0), Account::new("A", 5.0)];
        let out = GraphElementBuilder::new().build(&accounts, &[], &RingMembershipIndex::new());
        assert_eq!(out.graph.node_count(), 1);
        assert_eq!(out.graph.nodes[0].tier, RiskTier::High);
        assert!(matches!(
            out.warnings[0],
            BuildWarning::MalformedInput { index: 1, .. }
        ));
    }

    #[test]
    fn build_from_result_derives_ring_index() {
        let (accounts, transactions, rings) = sample();
        let result = AnalysisResult::new(accounts, transactions, rings);
        let (out, index) = GraphElementBuilder::new().build_from_result(&result);
        assert!(index.contains("A"));
        assert!(out.graph.get_node("B").unwrap().in_ring);
    }

    #[test]
    fn amount_formatting() {
        assert_eq!(format_amount(0.0), "$0.00");
        assert_eq!(format_amount(999.999), "$1,000.00");
        assert_eq!(format_amount(1234567.5), "$1,234,567.50");
        assert_eq!(format_amount(-42.1), "-$42.10");
        assert_eq!(format_amount(100.0), "$100.00");
    }

    #[test]
    fn huge_amounts_do_not_saturate() {
        assert_eq!(format_amount(1e17), "$100,000,000,000,000,000.00");
        assert_eq!(format_amount(1e18), "$1000000000000000000");
        assert_eq!(format_amount(-1e30), format!("${}", -1e30));
    }
}
