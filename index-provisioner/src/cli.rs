//! Command-line surface and process exit status.

use clap::Parser;
use tracing::{error, info};

use index_provisioner_repository::movies_mapping;
use index_provisioner_repository::opensearch::DOCUMENT_TYPE;

use crate::config::{Dependencies, ProvisionerSettings};
use crate::provisioner::ProvisionReport;
use crate::ProvisionError;

/// Exit status for a provisioned and verified index.
pub const EXIT_SUCCESS: u8 = 0;

/// Exit status for any configuration, service or verification failure.
pub const EXIT_FAILURE: u8 = 1;

#[derive(Debug, Parser)]
#[command(name = "index-provisioner")]
#[command(about = "Recreate a search index and apply its field mapping", long_about = None)]
pub struct Cli {
    /// Index name (overrides INDEX_NAME)
    #[arg(long)]
    pub index: Option<String>,

    /// Legacy document type label for the mapping (overrides DOCUMENT_TYPE).
    /// Given without a value, the movies type label is used.
    #[arg(long, num_args = 0..=1, default_missing_value = DOCUMENT_TYPE)]
    pub document_type: Option<String>,

    /// Skip reading index statistics after provisioning
    #[arg(long)]
    pub skip_stats: bool,
}

impl Cli {
    /// Apply flag overrides on top of settings loaded from the environment.
    pub fn apply(&self, mut settings: ProvisionerSettings) -> ProvisionerSettings {
        if let Some(index) = &self.index {
            settings = settings.with_index_name(index.clone());
        }
        if let Some(document_type) = &self.document_type {
            settings = settings.with_document_type(document_type.clone());
        }
        settings
    }
}

/// Build the provisioner for `settings` and run it with the movies mapping.
pub async fn run(
    settings: &ProvisionerSettings,
    skip_stats: bool,
) -> Result<ProvisionReport, ProvisionError> {
    let Dependencies { mut provisioner } = Dependencies::new(settings.connection.clone()).await?;
    if skip_stats {
        provisioner = provisioner.without_stats();
    }

    provisioner.provision(&settings.index, &movies_mapping()).await
}

/// Log the outcome of a run and map it to the process exit status.
pub fn exit_status(result: &Result<ProvisionReport, ProvisionError>) -> u8 {
    match result {
        Ok(report) => {
            info!(
                index = %report.index,
                replaced_existing = report.replaced_existing,
                documents = report.stats.as_ref().map(|s| s.document_count),
                "Provisioning complete"
            );
            EXIT_SUCCESS
        }
        Err(ProvisionError::ConfigError(e)) => {
            error!(error = %e, "Invalid configuration");
            EXIT_FAILURE
        }
        Err(e) => {
            error!(error = %e, "Provisioning failed");
            EXIT_FAILURE
        }
    }
}

/// Load settings through `lookup`, apply the flags, provision, and return
/// the exit status.
pub async fn execute<F>(cli: &Cli, lookup: F) -> u8
where
    F: Fn(&str) -> Option<String>,
{
    let result = match ProvisionerSettings::from_lookup(lookup) {
        Ok(settings) => run(&cli.apply(settings), cli.skip_stats).await,
        Err(e) => Err(e),
    };
    exit_status(&result)
}
