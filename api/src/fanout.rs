//! Concurrent per-class test discovery.
//!
//! One timeline fetch per enrolled class, launched concurrently. A class
//! whose fetch fails, times out, or returns garbage contributes zero
//! entities and nothing else: the aggregate must survive any single
//! class. The only ordering guarantee is on the output (newest first,
//! ties in class discovery order), never on fetch completion.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use sagepilot_core::content::{self, TestLink, TimelineSection};
use sagepilot_core::identity::ClassRef;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::error::UpstreamError;
use crate::wise::WiseClient;

/// Upper bound on in-flight timeline fetches per request.
const MAX_IN_FLIGHT: usize = 8;
/// Budget for one class's fetch; a stalled upstream must not stall the
/// aggregate response.
const PER_CLASS_TIMEOUT: Duration = Duration::from_secs(10);

/// Fan out over a student's classes and merge every currently-active test,
/// newest first.
pub async fn discover_active_tests(wise: &WiseClient, classes: &[ClassRef]) -> Vec<TestLink> {
    let wise = wise.clone();
    let link_base = wise.test_link_base().to_string();
    discover_with(classes, &link_base, move |class: ClassRef| {
        let wise = wise.clone();
        async move { wise.content_timeline(&class.id).await }
    })
    .await
}

/// Fan-out core with an injected fetch, so the failure policy is testable
/// without a live platform.
async fn discover_with<F, Fut>(classes: &[ClassRef], link_base: &str, fetch: F) -> Vec<TestLink>
where
    F: Fn(ClassRef) -> Fut,
    Fut: Future<Output = Result<Vec<TimelineSection>, UpstreamError>> + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(MAX_IN_FLIGHT));
    let mut set: JoinSet<(usize, Vec<TestLink>)> = JoinSet::new();

    for (idx, class) in classes.iter().enumerate() {
        let class = class.clone();
        let semaphore = Arc::clone(&semaphore);
        let link_base = link_base.to_string();
        // The future is built here but does no work until polled inside
        // the task, after a permit is held.
        let pending_fetch = fetch(class.clone());

        set.spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return (idx, Vec::new());
            };

            match tokio::time::timeout(PER_CLASS_TIMEOUT, pending_fetch).await {
                Ok(Ok(timeline)) => {
                    (idx, content::extract_active_tests(&link_base, &class, &timeline))
                }
                Ok(Err(err)) => {
                    tracing::warn!(
                        class_id = %class.id,
                        error = %err,
                        "skipping class: timeline fetch failed"
                    );
                    (idx, Vec::new())
                }
                Err(_) => {
                    tracing::warn!(
                        class_id = %class.id,
                        timeout_secs = PER_CLASS_TIMEOUT.as_secs(),
                        "skipping class: timeline fetch timed out"
                    );
                    (idx, Vec::new())
                }
            }
        });
    }

    // Index results by input position so the merge sees classes in
    // discovery order regardless of completion order.
    let mut per_class: Vec<Vec<TestLink>> = vec![Vec::new(); classes.len()];
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((idx, tests)) => per_class[idx] = tests,
            Err(err) => tracing::warn!(error = %err, "timeline fetch task failed"),
        }
    }

    content::merge_newest_first(per_class)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use sagepilot_core::content::{TimelineEntity, TimelineSection};
    use sagepilot_core::identity::ClassRef;

    use super::discover_with;
    use crate::error::UpstreamError;

    const LINK_BASE: &str = "https://supersheldon.wise.live/tests/";

    fn class(id: &str) -> ClassRef {
        ClassRef {
            id: id.to_string(),
            name: Some(format!("class {id}")),
            subject: Some("Maths".to_string()),
        }
    }

    fn active_test(id: &str, hour: u32) -> TimelineEntity {
        TimelineEntity {
            id: id.to_string(),
            entity_type: "test".to_string(),
            status: "ACTIVE".to_string(),
            name: Some(format!("test {id}")),
            duration: Some(30),
            max_marks: Some(20),
            created_at: Some(Utc.with_ymd_and_hms(2026, 3, 1, hour, 0, 0).unwrap()),
        }
    }

    fn section(entities: Vec<TimelineEntity>) -> Vec<TimelineSection> {
        vec![TimelineSection {
            name: None,
            entities,
        }]
    }

    fn decode_error() -> UpstreamError {
        UpstreamError::Decode {
            service: "wise",
            source: serde_json::from_str::<serde_json::Value>("not json").unwrap_err(),
        }
    }

    #[tokio::test]
    async fn one_failing_class_contributes_nothing_and_poisons_nothing() {
        let classes = vec![
            class("class-aaaa0001"),
            class("class-bbbb0002"),
            class("class-cccc0003"),
        ];

        let fetch = |class: ClassRef| async move {
            match class.id.as_str() {
                "class-aaaa0001" => Ok(section(vec![active_test("T1", 9)])),
                "class-cccc0003" => Ok(section(vec![active_test("T3", 11)])),
                _ => Err(decode_error()),
            }
        };

        let merged = discover_with(&classes, LINK_BASE, fetch).await;
        let ids: Vec<&str> = merged.iter().map(|t| t.test_id.as_str()).collect();
        assert_eq!(ids, ["T3", "T1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn a_hanging_class_times_out_instead_of_stalling_the_aggregate() {
        let classes = vec![class("class-hang0001"), class("class-fast0002")];

        let fetch = |class: ClassRef| async move {
            if class.id == "class-hang0001" {
                std::future::pending::<()>().await;
            }
            Ok(section(vec![active_test("T9", 10)]))
        };

        let merged = discover_with(&classes, LINK_BASE, fetch).await;
        let ids: Vec<&str> = merged.iter().map(|t| t.test_id.as_str()).collect();
        assert_eq!(ids, ["T9"]);
    }

    #[tokio::test]
    async fn empty_class_list_yields_empty_result() {
        let fetch =
            |_class: ClassRef| async move { Ok(section(vec![active_test("T1", 9)])) };
        let merged = discover_with(&[], LINK_BASE, fetch).await;
        assert!(merged.is_empty());
    }
}
