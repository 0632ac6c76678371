//! Concurrent retrieval of raw records from registered sources.

pub mod util;

use std::collections::BTreeMap;

use macropanel_core::{PanelError, RawRecord};

use crate::core::{MacroPanel, tag_err};
use crate::pipeline::PipelineOutput;
use util::{collapse_errors, join_with_deadline};

impl MacroPanel {
    /// Fetch the raw records of every dataset registered with a source.
    ///
    /// Fetches run concurrently. Each is bounded by the source timeout and
    /// the whole batch by the request timeout, when one is set. Datasets
    /// registered without a source are skipped.
    ///
    /// # Errors
    /// - `SourceTimeout` / `Source` when exactly one fetch fails.
    /// - `SourcesFailed` when several fetches fail.
    /// - `RequestTimeout` when the batch deadline expires.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "macropanel::fetch::fetch_all",
            skip(self),
            fields(datasets = self.datasets.len()),
        )
    )]
    pub async fn fetch_all(&self) -> Result<BTreeMap<String, Vec<RawRecord>>, PanelError> {
        let timeout = self.cfg.source_timeout;
        let tasks = self.datasets.iter().filter_map(|entry| {
            let (source, source_dataset) = entry.source.as_ref()?;
            let name = entry.cfg.name.clone();
            let req = self.fetch_request(source_dataset);
            let source = std::sync::Arc::clone(source);
            Some(async move {
                let src_name = source.name();
                let out =
                    Self::source_call_with_timeout(src_name, timeout, source.fetch(&req)).await;
                (name, out.map_err(|e| tag_err(src_name, e)))
            })
        });
        let results = join_with_deadline(tasks, self.cfg.request_timeout).await?;

        let mut raw = BTreeMap::new();
        let mut errors = Vec::new();
        for (name, res) in results {
            match res {
                Ok(records) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(dataset = %name, records = records.len(), "fetched");
                    raw.insert(name, records);
                }
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(dataset = %name, error = %e, "fetch failed");
                    errors.push(e);
                }
            }
        }
        if errors.is_empty() {
            Ok(raw)
        } else {
            Err(collapse_errors(errors))
        }
    }

    /// Fetch every dataset from its source, then run the pipeline.
    ///
    /// Every registered dataset must have been registered with
    /// [`dataset_from`](crate::MacroPanelBuilder::dataset_from).
    ///
    /// # Errors
    /// - `MissingConfig` if a dataset has no source.
    /// - Any error from [`fetch_all`](Self::fetch_all) or [`run`](Self::run).
    pub async fn fetch_and_run(&self) -> Result<PipelineOutput, PanelError> {
        if let Some(entry) = self.datasets.iter().find(|d| d.source.is_none()) {
            return Err(PanelError::missing_config(
                entry.cfg.name.clone(),
                "a record source",
            ));
        }
        let raw = self.fetch_all().await?;
        self.run(&raw)
    }
}
