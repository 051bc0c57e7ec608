use crate::context::run::RunState;
use model::execution::modes::{Charset, RecordFormat};
use std::sync::Arc;

/// Immutable reader configuration of one table run.
#[derive(Debug, Clone)]
pub struct ProducerSettings {
    pub table: String,
    pub format: RecordFormat,
    pub separator: String,
    pub charset: Charset,
    pub with_header: bool,
    pub batch_size: usize,
    pub max_multiline: usize,
}

#[derive(Debug, Clone)]
pub struct ProducerContext {
    settings: Arc<ProducerSettings>,
    run: Arc<RunState>,
}

impl ProducerContext {
    pub fn new(settings: ProducerSettings, run: Arc<RunState>) -> Self {
        Self {
            settings: Arc::new(settings),
            run,
        }
    }

    pub fn settings(&self) -> &ProducerSettings {
        &self.settings
    }

    pub fn run(&self) -> &Arc<RunState> {
        &self.run
    }
}
