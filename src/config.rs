//! Process-wide configuration.
//!
//! Everything here is optional: a node started with an empty config joins no
//! one, advertises no metadata, accepts every locally resolvable function at
//! the default cost, and runs its periodic tasks at the default latencies.
//! Values can come from a JSON config file (`--config`), CLI flags, or the
//! `MESH_REFERRALS` environment variable.

use crate::membership::types::{Metadata, NodeName};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Default caller-side receive window for `make_it_so`.
pub const DEFAULT_CALL_TIMEOUT_MS: u64 = 5000;

/// Default step for base-busyness bumps.
pub const DEFAULT_BUSYNESS_STEP: i64 = 100;

/// Per-request busyness contribution when no weight is configured.
pub const DEFAULT_BUSYNESS_WEIGHT: i64 = 100;

const DEFAULT_PING_LATENCY_MS: u64 = 1500;
const DEFAULT_SYNC_LATENCY_MS: u64 = 3000;
const DEFAULT_ASSIGN_LATENCY_MS: u64 = 20;
const DEFAULT_HANDLE_LATENCY_MS: u64 = 10;

const DEFAULT_PERSIST_PATH: &str = "priv/request_mesh/persisted_nodes.dat";

/// A per-function scheduling cost: either a plain integer or the string
/// `"reject"`, which makes the node ineligible for that function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostRule {
    Reject,
    Cost(i64),
}

impl Serialize for CostRule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CostRule::Reject => serializer.serialize_str("reject"),
            CostRule::Cost(n) => serializer.serialize_i64(*n),
        }
    }
}

impl<'de> Deserialize<'de> for CostRule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CostRuleVisitor;

        impl<'de> Visitor<'de> for CostRuleVisitor {
            type Value = CostRule;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an integer cost or the string \"reject\"")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<CostRule, E> {
                Ok(CostRule::Cost(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<CostRule, E> {
                i64::try_from(v)
                    .map(CostRule::Cost)
                    .map_err(|_| E::custom("cost out of range"))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<CostRule, E> {
                if v == "reject" {
                    Ok(CostRule::Reject)
                } else {
                    Err(E::custom(format!("unknown cost rule {:?}", v)))
                }
            }
        }

        deserializer.deserialize_any(CostRuleVisitor)
    }
}

/// `module -> function -> rule` tables used for both busyness weights and
/// acceptance offsets.
pub type CostTable = HashMap<String, HashMap<String, CostRule>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshConfig {
    /// Address the HTTP server binds to. The actual bound address (relevant
    /// with port 0) becomes the node's name.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,

    /// Peer names probed on every ping cycle in addition to whatever the
    /// registry and the persisted list already know.
    #[serde(default)]
    pub referrals: Vec<NodeName>,

    /// Metadata advertised to peers once per ping cycle.
    #[serde(default)]
    pub metadata: Metadata,

    /// Per-request busyness contributions.
    #[serde(default)]
    pub busyness_weights: CostTable,

    /// Per-function acceptance offsets.
    #[serde(default)]
    pub busyness_offsets: CostTable,

    #[serde(default = "default_ping_latency")]
    pub ping_latency_ms: u64,
    #[serde(default = "default_sync_latency")]
    pub sync_latency_ms: u64,
    #[serde(default = "default_assign_latency")]
    pub assign_latency_ms: u64,
    #[serde(default = "default_handle_latency")]
    pub handle_latency_ms: u64,

    /// Where the sorted reachable node list is persisted across restarts.
    #[serde(default = "default_persist_path")]
    pub persist_path: PathBuf,
}

fn default_bind_addr() -> SocketAddr {
    "127.0.0.1:0".parse().expect("static default address")
}

fn default_ping_latency() -> u64 {
    DEFAULT_PING_LATENCY_MS
}

fn default_sync_latency() -> u64 {
    DEFAULT_SYNC_LATENCY_MS
}

fn default_assign_latency() -> u64 {
    DEFAULT_ASSIGN_LATENCY_MS
}

fn default_handle_latency() -> u64 {
    DEFAULT_HANDLE_LATENCY_MS
}

fn default_persist_path() -> PathBuf {
    PathBuf::from(DEFAULT_PERSIST_PATH)
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            referrals: Vec::new(),
            metadata: Metadata::new(),
            busyness_weights: CostTable::new(),
            busyness_offsets: CostTable::new(),
            ping_latency_ms: DEFAULT_PING_LATENCY_MS,
            sync_latency_ms: DEFAULT_SYNC_LATENCY_MS,
            assign_latency_ms: DEFAULT_ASSIGN_LATENCY_MS,
            handle_latency_ms: DEFAULT_HANDLE_LATENCY_MS,
            persist_path: default_persist_path(),
        }
    }
}

impl MeshConfig {
    /// Loads a config from a JSON file. Missing keys fall back to defaults.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Parses a comma-separated referral list ("host:port,host:port").
    /// Empty segments are ignored; an empty input yields no referrals.
    pub fn parse_referrals(raw: &str) -> Vec<NodeName> {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| NodeName(s.to_string()))
            .collect()
    }

    pub fn lookup_rule<'a>(
        table: &'a CostTable,
        module: &str,
        function: &str,
    ) -> Option<&'a CostRule> {
        table.get(module).and_then(|funcs| funcs.get(function))
    }
}
