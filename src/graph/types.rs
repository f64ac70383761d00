//! Core data types: the analysis snapshot as received, and the element graph
//! derived from it for rendering.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::risk::RiskTier;
use crate::error::{BuildWarning, GraphError};

// =============================================================================
// ANALYSIS SNAPSHOT (from the analysis service, never modified locally)
// =============================================================================

/// A transacting party with its suspicion score and detected pattern flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub suspicion_score: f64,
    #[serde(default)]
    pub flags: Vec<String>,
}

impl Account {
    pub fn new(id: impl Into<String>, suspicion_score: f64) -> Self {
        Self {
            id: id.into(),
            suspicion_score,
            flags: Vec::new(),
        }
    }

    /// Builder: set flags
    pub fn with_flags<I, S>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.flags = flags.into_iter().map(Into::into).collect();
        self
    }
}

/// A directed, amount-bearing relation between two accounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub source: String,
    pub target: String,
    pub amount: f64,
}

impl Transaction {
    pub fn new(source: impl Into<String>, target: impl Into<String>, amount: f64) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            amount,
        }
    }
}

/// Named suspicious pattern a fraud ring exhibits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    Cycle,
    Smurfing,
    FanOut,
    FanIn,
    ShellChain,
    #[default]
    #[serde(other)]
    Other,
}

impl PatternType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternType::Cycle => "cycle",
            PatternType::Smurfing => "smurfing",
            PatternType::FanOut => "fan_out",
            PatternType::FanIn => "fan_in",
            PatternType::ShellChain => "shell_chain",
            PatternType::Other => "other",
        }
    }
}

impl std::str::FromStr for PatternType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().replace('-', "_").as_str() {
            "cycle" => Self::Cycle,
            "smurfing" => Self::Smurfing,
            "fan_out" | "fanout" => Self::FanOut,
            "fan_in" | "fanin" => Self::FanIn,
            "shell_chain" | "shell" => Self::ShellChain,
            _ => Self::Other,
        })
    }
}

impl std::fmt::Display for PatternType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detected set of accounts exhibiting one suspicious pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudRing {
    pub ring_id: String,
    #[serde(default)]
    pub pattern_type: PatternType,
    pub member_accounts: Vec<String>,
    #[serde(default)]
    pub risk_score: f64,
}

impl FraudRing {
    pub fn new<I, S>(ring_id: impl Into<String>, pattern_type: PatternType, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ring_id: ring_id.into(),
            pattern_type,
            member_accounts: members.into_iter().map(Into::into).collect(),
            risk_score: 0.0,
        }
    }

    /// Builder: set risk score
    pub fn with_risk_score(mut self, risk_score: f64) -> Self {
        self.risk_score = risk_score;
        self
    }
}

/// One immutable analysis snapshot.
///
/// Serializes back to the service's wire shape (`nodes`, `edges`,
/// `fraud_rings`, `summary`). Deserialization goes through
/// [`AnalysisResult::from_value`] so a single bad record never sinks the
/// whole snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisResult {
    #[serde(rename = "nodes")]
    pub accounts: Vec<Account>,
    #[serde(rename = "edges")]
    pub transactions: Vec<Transaction>,
    pub fraud_rings: Vec<FraudRing>,
    /// Opaque to this crate, carried through unread.
    pub summary: Value,
}

/// Envelope parsed before each record is decoded on its own.
#[derive(Debug, Default, Deserialize)]
struct RawAnalysisResult {
    #[serde(default)]
    nodes: Option<Vec<Value>>,
    #[serde(default)]
    edges: Option<Vec<Value>>,
    #[serde(default)]
    fraud_rings: Option<Vec<Value>>,
    #[serde(default)]
    summary: Value,
}

/// Parsed snapshot plus the records that had to be skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedAnalysis {
    pub result: AnalysisResult,
    pub warnings: Vec<BuildWarning>,
}

impl AnalysisResult {
    pub fn new(
        accounts: Vec<Account>,
        transactions: Vec<Transaction>,
        fraud_rings: Vec<FraudRing>,
    ) -> Self {
        Self {
            accounts,
            transactions,
            fraud_rings,
            summary: Value::Null,
        }
    }

    /// Parse from a JSON string (lenient per record).
    pub fn from_json_str(json: &str) -> Result<ParsedAnalysis, GraphError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Parse from a JSON value (lenient per record).
    ///
    /// Fails only when the envelope itself has the wrong shape (e.g. `nodes`
    /// is not an array). Missing or `null` collections are empty.
    pub fn from_value(value: Value) -> Result<ParsedAnalysis, GraphError> {
        let raw: RawAnalysisResult = serde_json::from_value(value)?;
        let mut warnings = Vec::new();

        let accounts = decode_records(raw.nodes.unwrap_or_default(), "nodes", &mut warnings);
        let transactions = decode_records(raw.edges.unwrap_or_default(), "edges", &mut warnings);
        let fraud_rings = decode_records(
            raw.fraud_rings.unwrap_or_default(),
            "fraud_rings",
            &mut warnings,
        );

        Ok(ParsedAnalysis {
            result: AnalysisResult {
                accounts,
                transactions,
                fraud_rings,
                summary: raw.summary,
            },
            warnings,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty() && self.transactions.is_empty()
    }
}

fn decode_records<T: serde::de::DeserializeOwned>(
    records: Vec<Value>,
    collection: &'static str,
    warnings: &mut Vec<BuildWarning>,
) -> Vec<T> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value::<T>(record) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                warnings.push(BuildWarning::MalformedInput {
                    collection,
                    index,
                    reason: e.to_string(),
                });
                None
            }
        })
        .collect()
}

// =============================================================================
// ELEMENT GRAPH (derived, rebuilt wholesale per snapshot)
// =============================================================================

/// Renderable account node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualNode {
    pub id: String,
    pub label: String,
    pub tier: RiskTier,
    pub in_ring: bool,
    pub suspicion_score: f64,
    pub flags: Vec<String>,
    /// Stand-in for an account referenced by an edge but absent from the
    /// account list.
    pub placeholder: bool,
}

/// Renderable transaction edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub amount: f64,
    pub label: String,
}

/// Nodes and edges ready for layout and rendering, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementGraph {
    pub nodes: Vec<VisualNode>,
    pub edges: Vec<VisualEdge>,
    node_index: HashMap<String, usize>,
    edge_index: HashMap<String, usize>,
}

impl ElementGraph {
    pub fn new(nodes: Vec<VisualNode>, edges: Vec<VisualEdge>) -> Self {
        let node_index = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();
        let edge_index = edges
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id.clone(), i))
            .collect();
        Self {
            nodes,
            edges,
            node_index,
            edge_index,
        }
    }

    pub fn get_node(&self, id: &str) -> Option<&VisualNode> {
        self.node_index.get(id).map(|&idx| &self.nodes[idx])
    }

    pub fn get_edge(&self, id: &str) -> Option<&VisualEdge> {
        self.edge_index.get(id).map(|&idx| &self.edges[idx])
    }

    /// Position of a node in `nodes` (and in any layout output).
    pub fn node_position_index(&self, id: &str) -> Option<usize> {
        self.node_index.get(id).copied()
    }

    /// Edges as (source index, target index) pairs; unknown endpoints skipped.
    pub fn edge_endpoints(&self) -> Vec<(usize, usize)> {
        self.edges
            .iter()
            .filter_map(|e| {
                Some((
                    self.node_position_index(&e.source)?,
                    self.node_position_index(&e.target)?,
                ))
            })
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
