use macropanel_core::PanelError;

/// Join a collection of tasks and apply an optional request-level deadline.
///
/// This wraps `futures::future::join_all(tasks)` with
/// `crate::core::with_request_deadline`; on expiry the whole batch fails with
/// `PanelError::RequestTimeout`.
pub async fn join_with_deadline<I, F, T>(
    tasks: I,
    deadline: Option<std::time::Duration>,
) -> Result<Vec<T>, PanelError>
where
    I: IntoIterator<Item = F>,
    F: core::future::Future<Output = T>,
{
    crate::core::with_request_deadline(deadline, futures::future::join_all(tasks)).await
}

/// Collapse the failures of a fetch fan-out into one `PanelError`.
///
/// Rules:
/// - A single failure is returned as-is.
/// - Anything else → `SourcesFailed(errors)`.
pub fn collapse_errors(mut errors: Vec<PanelError>) -> PanelError {
    if errors.len() == 1 {
        if let Some(e) = errors.pop() {
            return e;
        }
    }
    PanelError::SourcesFailed(errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapse_errors_single_passes_through() {
        let e = collapse_errors(vec![PanelError::source_timeout("bok")]);
        assert_eq!(e, PanelError::source_timeout("bok"));
    }

    #[test]
    fn collapse_errors_many_maps_to_sources_failed() {
        let errors = vec![
            PanelError::source_timeout("bok"),
            PanelError::source_failed("fred", "HTTP 500"),
        ];
        match collapse_errors(errors.clone()) {
            PanelError::SourcesFailed(es) => assert_eq!(es, errors),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn join_with_deadline_keeps_task_order() {
        use std::time::Duration;
        let tasks = (0..3u64).map(|i| async move {
            tokio::time::sleep(Duration::from_millis(3 - i)).await;
            i
        });
        let res = join_with_deadline(tasks, Some(Duration::from_secs(1)))
            .await
            .unwrap();
        assert_eq!(res, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn join_with_deadline_times_out() {
        use std::time::Duration;
        let tasks = vec![async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            1
        }];
        let res = join_with_deadline(tasks, Some(Duration::from_millis(1))).await;
        assert!(matches!(res, Err(PanelError::RequestTimeout)));
    }
}
