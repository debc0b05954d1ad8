use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::config::Config;
use crate::embedding::BedrockEmbedder;
use crate::error::{ReelError, Result};
use crate::search::SearchOrchestrator;
use crate::store::OpenSearchClient;

/// Shared handles for one CLI invocation: configuration, the runtime and
/// the orchestrator wired to the live clients. Built once and passed to
/// commands; dropped (or shut down) when the command finishes.
pub struct AppContext {
    pub config: Config,
    pub orchestrator: SearchOrchestrator,
    pub robot_mode: bool,
    runtime: tokio::runtime::Runtime,
}

impl AppContext {
    pub fn from_cli(cli: &crate::cli::Cli) -> Result<Self> {
        let config = Config::load(cli.config.as_deref())?;
        Self::open(config, cli.robot)
    }

    pub fn open(config: Config, robot_mode: bool) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;

        let store = OpenSearchClient::from_config(&config.search)?;
        let embedder = BedrockEmbedder::from_config(&config.embedding)?;
        debug!(
            store = %config.search.base_url()?,
            index = %config.search.index,
            model = %config.embedding.model_id,
            "clients opened"
        );

        let orchestrator =
            SearchOrchestrator::new(Arc::new(embedder), Arc::new(store), &config.search.index)
                .with_passage_index(&config.query.passage_index);

        Ok(Self {
            config,
            orchestrator,
            robot_mode,
            runtime,
        })
    }

    /// Drive `future` to completion on the context runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Like [`Self::block_on`], but Ctrl-C abandons `future` with
    /// [`ReelError::Cancelled`].
    pub fn block_on_interruptible<F, T>(&self, future: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.runtime.block_on(async {
            tokio::select! {
                result = future => result,
                () = interrupted() => Err(ReelError::Cancelled),
            }
        })
    }

    /// Stop the runtime without waiting on abandoned requests.
    pub fn shutdown(self) {
        self.runtime.shutdown_timeout(Duration::from_millis(250));
    }
}

/// Resolves on Ctrl-C. Never resolves when the handler cannot be installed.
pub async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
