use serde::{Deserialize, Serialize};
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleError {
    #[error("Partition key '{0}' is not an integer")]
    NotAnInteger(String),

    #[error("Partition key {key} falls outside every range bound")]
    OutOfRange { key: i64 },

    #[error("Rule selected shard {index} but only {shard_count} shards exist")]
    NoSuchShard { index: usize, shard_count: usize },

    #[error("Table has no shards")]
    NoShards,
}

/// Maps a raw partition key to a shard position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PartitionRule {
    /// Integer key modulo the shard count.
    Modulo,
    /// xxh3 hash of the key bytes modulo the shard count.
    Hash,
    /// Shard `i` owns keys below `bounds[i]` and at or above `bounds[i - 1]`.
    Range { bounds: Vec<i64> },
}

impl PartitionRule {
    pub fn shard_index(&self, key: &[u8], shard_count: usize) -> Result<usize, RuleError> {
        if shard_count == 0 {
            return Err(RuleError::NoShards);
        }

        let index = match self {
            PartitionRule::Modulo => {
                let key = parse_integer(key)?;
                key.rem_euclid(shard_count as i64) as usize
            }
            PartitionRule::Hash => (xxh3_64(key) % shard_count as u64) as usize,
            PartitionRule::Range { bounds } => {
                let key = parse_integer(key)?;
                bounds
                    .iter()
                    .position(|upper| key < *upper)
                    .ok_or(RuleError::OutOfRange { key })?
            }
        };

        if index >= shard_count {
            return Err(RuleError::NoSuchShard { index, shard_count });
        }
        Ok(index)
    }
}

fn parse_integer(key: &[u8]) -> Result<i64, RuleError> {
    let text = String::from_utf8_lossy(key);
    text.trim()
        .parse::<i64>()
        .map_err(|_| RuleError::NotAnInteger(text.into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modulo_routes_by_parity() {
        let rule = PartitionRule::Modulo;
        assert_eq!(rule.shard_index(b"4", 2), Ok(0));
        assert_eq!(rule.shard_index(b"7", 2), Ok(1));
        assert_eq!(rule.shard_index(b"-3", 2), Ok(1));
    }

    #[test]
    fn modulo_rejects_non_integer_keys() {
        let err = PartitionRule::Modulo.shard_index(b"abc", 2).unwrap_err();
        assert_eq!(err, RuleError::NotAnInteger("abc".into()));
    }

    #[test]
    fn range_outside_bounds_is_an_error() {
        let rule = PartitionRule::Range {
            bounds: vec![100, 200],
        };
        assert_eq!(rule.shard_index(b"99", 2), Ok(0));
        assert_eq!(rule.shard_index(b"100", 2), Ok(1));
        assert_eq!(
            rule.shard_index(b"200", 2),
            Err(RuleError::OutOfRange { key: 200 })
        );
    }

    #[test]
    fn range_with_more_bounds_than_shards_is_rejected() {
        let rule = PartitionRule::Range {
            bounds: vec![10, 20, 30],
        };
        assert_eq!(
            rule.shard_index(b"25", 2),
            Err(RuleError::NoSuchShard {
                index: 2,
                shard_count: 2
            })
        );
    }

    #[test]
    fn hash_is_stable_and_in_range() {
        let a = PartitionRule::Hash.shard_index(b"user-42", 8).unwrap();
        let b = PartitionRule::Hash.shard_index(b"user-42", 8).unwrap();
        assert_eq!(a, b);
        assert!(a < 8);
    }

    #[test]
    fn rules_deserialize_from_tagged_json() {
        let rule: PartitionRule =
            serde_json::from_str(r#"{"kind":"range","bounds":[1,2]}"#).unwrap();
        assert_eq!(rule, PartitionRule::Range { bounds: vec![1, 2] });
    }
}
