use crate::{context::run::RunState, topology::Topology};
use connectors::sql::connection::ConnectionSource;
use model::execution::modes::RecordFormat;
use std::sync::Arc;

/// Immutable writer configuration of one table run.
#[derive(Debug, Clone)]
pub struct ConsumerSettings {
    pub table: String,
    pub format: RecordFormat,
    pub separator: String,
    pub insert_ignore: bool,
    pub insert_batch_rows: usize,
    pub max_statement_bytes: usize,
}

#[derive(Clone)]
pub struct ConsumerContext {
    settings: Arc<ConsumerSettings>,
    source: Arc<dyn ConnectionSource>,
    topology: Arc<Topology>,
    run: Arc<RunState>,
}

impl ConsumerContext {
    pub fn new(
        settings: ConsumerSettings,
        source: Arc<dyn ConnectionSource>,
        topology: Arc<Topology>,
        run: Arc<RunState>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            source,
            topology,
            run,
        }
    }

    pub fn settings(&self) -> &ConsumerSettings {
        &self.settings
    }

    pub fn source(&self) -> &Arc<dyn ConnectionSource> {
        &self.source
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn run(&self) -> &Arc<RunState> {
        &self.run
    }

    pub fn is_sharded(&self) -> bool {
        self.topology.is_sharded(&self.settings.table)
    }
}
