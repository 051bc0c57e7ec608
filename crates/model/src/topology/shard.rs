use crate::topology::rule::PartitionRule;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One physical shard of a logical table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShardTarget {
    /// Stable identifier of the physical node / group.
    pub shard_id: String,
    /// Connection descriptor handed to the connection source.
    pub url: String,
    /// Name of the physical table on that shard.
    pub physical_table: String,
}

impl fmt::Display for ShardTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.shard_id, self.physical_table)
    }
}

/// How a row's partition key is located and mapped to a shard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionSpec {
    /// Zero-based field position of the partition key inside a record.
    pub column_index: usize,
    pub rule: PartitionRule,
}

/// Logical table → ordered shard list plus the routing rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableTopology {
    pub logical_table: String,
    pub shards: Vec<ShardTarget>,
    #[serde(default)]
    pub partition: Option<PartitionSpec>,
}

impl TableTopology {
    pub fn is_partitioned(&self) -> bool {
        self.partition.is_some() && !self.shards.is_empty()
    }
}
