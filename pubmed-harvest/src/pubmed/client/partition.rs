//! Id resolution past the per-search cap
//!
//! Every search asks for `retmax = min(max_results, search_cap)` ids. When a
//! window matches more than `retmax`, it is split along its coarsest
//! differing date component into `total / retmax + 1` sub-windows, each
//! resolved the same way. Leaf lists are appended in window order, then cut
//! to `max_results`. A single day that still matches more than `retmax`
//! cannot be split further; it contributes no ids and a warning.

use futures_util::future::{BoxFuture, FutureExt};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::pubmed::models::{ResolvedIds, RetrievalWarning};
use crate::pubmed::window::DateWindow;

use super::PubMedClient;

/// Accumulator threaded through the recursion
#[derive(Debug, Default)]
struct Partition {
    ids: Vec<String>,
    search_requests: usize,
    warnings: Vec<RetrievalWarning>,
}

impl PubMedClient {
    pub(super) async fn partition(
        &self,
        query: &str,
        max_results: usize,
        window: DateWindow,
    ) -> Result<ResolvedIds> {
        let retmax = max_results.min(self.config.search_cap);
        let mut partition = Partition::default();

        let total_count = self
            .resolve_window(query, retmax, window, 0, &mut partition)
            .await?;

        let Partition {
            mut ids,
            search_requests,
            mut warnings,
        } = partition;

        if ids.len() > max_results {
            warn!(available = ids.len(), limit = max_results, "Truncating id list");
            warnings.push(RetrievalWarning::Truncated {
                available: ids.len(),
                limit: max_results,
            });
            ids.truncate(max_results);
        }

        let mut resolved = ResolvedIds {
            ids,
            total_count,
            search_requests,
            warnings,
        };

        let duplicates = resolved.duplicate_count();
        if duplicates > 0 {
            warn!(duplicates, "Adjacent windows returned the same ids");
            resolved
                .warnings
                .push(RetrievalWarning::DuplicateIds { count: duplicates });
        }

        Ok(resolved)
    }

    /// Resolve one window into `partition.ids`, returning its match count
    fn resolve_window<'a>(
        &'a self,
        query: &'a str,
        retmax: usize,
        window: DateWindow,
        depth: usize,
        partition: &'a mut Partition,
    ) -> BoxFuture<'a, Result<usize>> {
        async move {
            let mut data = self.esearch(query, retmax, Some(&window)).await?;
            partition.search_requests += 1;

            let total = data.total_count()?;

            if total <= retmax {
                let ids = data.take_ids()?;
                debug!(window = %window, depth, total, returned = ids.len(), "Window resolved");
                partition.ids.extend(ids);
                return Ok(total);
            }

            let Some(granularity) = window.split_granularity() else {
                warn!(window = %window, count = total, retmax, "Single-day window exceeds the per-search limit, skipping");
                partition.warnings.push(RetrievalWarning::UnrecoverableWindow {
                    window,
                    count: total,
                    cap: retmax,
                });
                return Ok(total);
            };

            let batch_count = total / retmax + 1;
            let split = window.split(granularity, batch_count);

            info!(
                window = %window,
                depth,
                total,
                batch_count,
                granularity = %granularity,
                sub_windows = split.windows.len(),
                "Splitting window"
            );

            for (from, to) in split.uncovered {
                warn!(window = %window, granularity = %granularity, from, to, "Split leaves a range unsearched");
                partition.warnings.push(RetrievalWarning::UncoveredRange {
                    window,
                    granularity,
                    from,
                    to,
                });
            }

            for sub_window in split.windows {
                self.resolve_window(query, retmax, sub_window, depth + 1, partition)
                    .await?;
            }

            Ok(total)
        }
        .boxed()
    }
}
