//! Batch executor: the shared partial-failure pattern behind every
//! multi-file command.
//!
//! Items run strictly sequentially in input order; a failing item never
//! short-circuits its siblings, and the aggregate status is `error` iff at
//! least one item errored.

use std::future::Future;

use crate::server::protocol::{ItemResult, Status};

/// Aggregate outcome of a batch command.
#[derive(Debug)]
pub struct BatchReport {
    pub results: Vec<ItemResult>,
    pub failed: bool,
}

impl BatchReport {
    pub fn status(&self) -> Status {
        if self.failed {
            Status::Error
        } else {
            Status::Success
        }
    }
}

/// Run `op` for every item in order, collecting one result per item.
/// No retries, no parallelism.
pub async fn run_batch<T, F, Fut>(items: Vec<T>, mut op: F) -> BatchReport
where
    F: FnMut(T) -> Fut,
    Fut: Future<Output = ItemResult>,
{
    let mut results = Vec::with_capacity(items.len());
    for item in items {
        results.push(op(item).await);
    }

    let failed = results.iter().any(|r| r.status == Status::Error);
    BatchReport { results, failed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::protocol::ItemTarget;

    #[tokio::test]
    async fn test_ordering_preserved_and_no_short_circuit() {
        let items = vec!["a", "b", "c", "d"];
        let report = run_batch(items, |name| async move {
            if name == "b" {
                ItemResult::err(ItemTarget::path(name), "failed")
            } else {
                ItemResult::ok(ItemTarget::path(name), "done")
            }
        })
        .await;

        assert!(report.failed);
        assert_eq!(report.status(), Status::Error);
        assert_eq!(report.results.len(), 4);

        let paths: Vec<String> = report
            .results
            .iter()
            .map(|r| match &r.target {
                ItemTarget::Path { path } => path.clone(),
                other => panic!("Unexpected target: {:?}", other),
            })
            .collect();
        assert_eq!(paths, vec!["a", "b", "c", "d"]);
        assert_eq!(report.results[1].status, Status::Error);
        assert_eq!(report.results[3].status, Status::Success);
    }

    #[tokio::test]
    async fn test_all_success_aggregate() {
        let report = run_batch(vec![1, 2, 3], |n| async move {
            ItemResult::ok(ItemTarget::path(n.to_string()), "ok")
        })
        .await;
        assert!(!report.failed);
        assert_eq!(report.status(), Status::Success);
    }

    #[tokio::test]
    async fn test_empty_batch_is_success() {
        let report = run_batch(Vec::<String>::new(), |p| async move {
            ItemResult::ok(ItemTarget::path(p), "ok")
        })
        .await;
        assert!(!report.failed);
        assert!(report.results.is_empty());
    }
}
