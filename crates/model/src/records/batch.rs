use std::fmt;

/// Provenance of a batch: which source produced it and its position in that
/// source's publish order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BatchTag {
    pub source_index: usize,
    pub block_index: u64,
}

impl fmt::Display for BatchTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "src-{}/blk-{}", self.source_index, self.block_index)
    }
}

/// A fixed-capacity group of raw records moved through the batch buffer as one
/// unit.
///
/// A batch is filled with [`RowBatch::push`] and then [`RowBatch::seal`]ed,
/// which stamps its [`BatchTag`] and, if fewer than `capacity` records were
/// pushed, places the end marker at the first unused slot. Readers only ever
/// see records before the end marker.
#[derive(Debug, Clone)]
pub struct RowBatch {
    lines: Vec<String>,
    capacity: usize,
    end_marker: Option<usize>,
    tag: BatchTag,
}

impl RowBatch {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        RowBatch {
            lines: Vec::with_capacity(capacity),
            capacity,
            end_marker: None,
            tag: BatchTag {
                source_index: 0,
                block_index: 0,
            },
        }
    }

    /// Appends a record. Returns `true` once the batch is full.
    pub fn push(&mut self, line: String) -> bool {
        debug_assert!(!self.is_full(), "push into a full batch");
        self.lines.push(line);
        self.is_full()
    }

    /// Tags the batch and marks the end of real data when partially filled.
    pub fn seal(&mut self, source_index: usize, block_index: u64) {
        self.tag = BatchTag {
            source_index,
            block_index,
        };
        self.end_marker = (self.lines.len() < self.capacity).then_some(self.lines.len());
    }

    pub fn is_full(&self) -> bool {
        self.lines.len() >= self.capacity
    }

    pub fn len(&self) -> usize {
        self.end_marker.unwrap_or(self.lines.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn tag(&self) -> BatchTag {
        self.tag
    }

    /// Slot index of the end marker, present only for partially filled batches.
    pub fn end_marker(&self) -> Option<usize> {
        self.end_marker
    }

    pub fn is_end_marked(&self) -> bool {
        self.end_marker.is_some()
    }

    /// Records up to the end marker.
    pub fn rows(&self) -> impl Iterator<Item = &str> {
        self.lines[..self.len()].iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::RowBatch;

    #[test]
    fn full_batch_has_no_end_marker() {
        let mut batch = RowBatch::with_capacity(2);
        assert!(!batch.push("a".into()));
        assert!(batch.push("b".into()));
        batch.seal(0, 7);

        assert_eq!(batch.len(), 2);
        assert!(!batch.is_end_marked());
        assert_eq!(batch.tag().block_index, 7);
    }

    #[test]
    fn partial_batch_is_end_marked_at_first_unused_slot() {
        let mut batch = RowBatch::with_capacity(3);
        batch.push("only".into());
        batch.seal(2, 0);

        assert_eq!(batch.end_marker(), Some(1));
        assert_eq!(batch.rows().collect::<Vec<_>>(), vec!["only"]);
        assert_eq!(batch.tag().to_string(), "src-2/blk-0");
    }
}
