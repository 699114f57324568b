//! Everything `wait` and `status` need before they can query runs

use crate::error::{CliResult, IntoCliResult};
use crate::exit_codes::EXIT_ERROR;
use std::path::Path;
use workflow_gate::{
    ActionContext, ConfigOverrides, GateConfig, GitHubClient, TriggerIdentity, WorkflowResolver,
};

/// Loaded configuration, run context and API client
pub struct Gate {
    pub config: GateConfig,
    pub context: ActionContext,
    pub client: GitHubClient,
}

impl Gate {
    /// Load configuration and the Actions context, then build the client
    pub fn load(cli: ConfigOverrides, config_file: Option<&Path>) -> CliResult<Self> {
        let config = GateConfig::load(cli, config_file).cli_error(EXIT_ERROR)?;
        tracing::debug!("Configuration: {:?}", config);

        let context = ActionContext::from_env()?;
        let client = GitHubClient::new(
            &config.api_url,
            &config.repo_token,
            context.repository.clone(),
            config.request_timeout(),
        )?;

        Ok(Self {
            config,
            context,
            client,
        })
    }

    /// Identify the trigger of the calling run
    pub async fn trigger(&self) -> CliResult<TriggerIdentity> {
        Ok(TriggerIdentity::resolve(&self.context, &self.client).await?)
    }

    /// A resolver for `trigger` filtered to the calling run's branch
    pub fn resolver<'a>(&'a self, trigger: &'a TriggerIdentity) -> WorkflowResolver<'a> {
        WorkflowResolver::new(
            &self.client,
            trigger,
            self.context.branch(),
            self.config.page_size,
        )
    }
}
