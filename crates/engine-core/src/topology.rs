use crate::error::ResolutionError;
use model::topology::shard::{ShardTarget, TableTopology};
use std::collections::HashMap;

/// Read-only routing table built before any worker starts.
///
/// Table names are matched case-insensitively. Tables without a registered
/// topology, or with one that has no partition rule, are unsharded and go to
/// the default connection.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    tables: HashMap<String, TableTopology>,
}

impl Topology {
    pub fn new(tables: impl IntoIterator<Item = TableTopology>) -> Self {
        Self {
            tables: tables
                .into_iter()
                .map(|t| (t.logical_table.to_lowercase(), t))
                .collect(),
        }
    }

    pub fn table(&self, table: &str) -> Option<&TableTopology> {
        self.tables.get(&table.to_lowercase())
    }

    pub fn is_sharded(&self, table: &str) -> bool {
        self.table(table).is_some_and(TableTopology::is_partitioned)
    }

    pub fn shards(&self, table: &str) -> Result<&[ShardTarget], ResolutionError> {
        self.table(table)
            .map(|t| t.shards.as_slice())
            .ok_or_else(|| ResolutionError::UnknownTable(table.to_string()))
    }

    /// Field position holding the partition key of `table`.
    pub fn partition_column(&self, table: &str) -> Result<usize, ResolutionError> {
        let topology = self
            .table(table)
            .ok_or_else(|| ResolutionError::UnknownTable(table.to_string()))?;
        topology
            .partition
            .as_ref()
            .map(|p| p.column_index)
            .ok_or_else(|| ResolutionError::NotPartitioned(table.to_string()))
    }

    /// Maps a partition key to exactly one shard of `table`, returning the
    /// shard's position and target.
    pub fn resolve_shard(
        &self,
        table: &str,
        key: &[u8],
    ) -> Result<(usize, &ShardTarget), ResolutionError> {
        let topology = self
            .table(table)
            .ok_or_else(|| ResolutionError::UnknownTable(table.to_string()))?;
        let partition = topology
            .partition
            .as_ref()
            .ok_or_else(|| ResolutionError::NotPartitioned(table.to_string()))?;

        let index = partition
            .rule
            .shard_index(key, topology.shards.len())
            .map_err(|source| ResolutionError::Rule {
                table: table.to_string(),
                source,
            })?;

        Ok((index, &topology.shards[index]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::topology::{
        rule::{PartitionRule, RuleError},
        shard::PartitionSpec,
    };

    fn shard(id: &str) -> ShardTarget {
        ShardTarget {
            shard_id: id.to_string(),
            url: format!("mysql://{id}/db"),
            physical_table: format!("orders_{id}"),
        }
    }

    fn parity_topology() -> Topology {
        Topology::new([TableTopology {
            logical_table: "Orders".to_string(),
            shards: vec![shard("a"), shard("b")],
            partition: Some(PartitionSpec {
                column_index: 0,
                rule: PartitionRule::Modulo,
            }),
        }])
    }

    #[test]
    fn parity_keys_split_across_two_shards() {
        let topology = parity_topology();
        for key in 0..10 {
            let (index, target) = topology
                .resolve_shard("orders", key.to_string().as_bytes())
                .unwrap();
            assert_eq!(index, key % 2);
            assert_eq!(target.shard_id, if key % 2 == 0 { "a" } else { "b" });
        }
        assert!(topology.is_sharded("ORDERS"));
        assert_eq!(topology.partition_column("orders").unwrap(), 0);
    }

    #[test]
    fn bad_keys_are_resolution_errors() {
        let topology = parity_topology();
        let err = topology.resolve_shard("orders", b"abc").unwrap_err();
        assert!(matches!(
            err,
            ResolutionError::Rule {
                source: RuleError::NotAnInteger(_),
                ..
            }
        ));
    }

    #[test]
    fn unknown_tables_are_not_sharded() {
        let topology = parity_topology();
        assert!(!topology.is_sharded("customers"));
        assert!(matches!(
            topology.resolve_shard("customers", b"1"),
            Err(ResolutionError::UnknownTable(_))
        ));
    }

    #[test]
    fn table_without_rule_is_not_partitioned() {
        let topology = Topology::new([TableTopology {
            logical_table: "t".into(),
            shards: vec![shard("a")],
            partition: None,
        }]);
        assert!(!topology.is_sharded("t"));
        assert_eq!(topology.shards("t").unwrap().len(), 1);
        assert!(matches!(
            topology.partition_column("t"),
            Err(ResolutionError::NotPartitioned(_))
        ));
    }
}
