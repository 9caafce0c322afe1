// src/pipeline/postings.rs

//! New-posting notification pipeline.
//!
//! fetch → extract → diff against snapshot → notify → persist. Nothing is
//! persisted when fetching or extraction fails, so the next run compares
//! against the same baseline.

use crate::error::Result;
use crate::models::{Config, NotificationCandidate};
use crate::pipeline::diff::DiffCalculator;
use crate::services::{ContentProvider, Notifier, PostingExtractor, format};
use crate::storage::SnapshotStore;
use crate::utils::log::{header, sub_item, summary};

/// What one postings run found and did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostingsReport {
    /// Marked postings on the page
    pub found: usize,
    pub cold_start: bool,
    pub novel: usize,
    pub delivered: usize,
    pub failed: usize,
}

/// Run the postings path.
pub async fn run_postings(
    config: &Config,
    provider: &dyn ContentProvider,
    store: &dyn SnapshotStore,
    notifier: &dyn Notifier,
) -> Result<PostingsReport> {
    header("Notice board");

    let html = provider.fetch(&config.notices.endpoint).await?;
    let postings = PostingExtractor::new(&config.notices)?.extract(&html)?;

    let previous = store.load().await?;
    let diff = DiffCalculator::new().calculate(previous.as_ref(), &postings);

    let mut report = PostingsReport {
        found: postings.len(),
        cold_start: diff.cold_start,
        novel: diff.novel.len(),
        ..PostingsReport::default()
    };

    if diff.cold_start {
        log::info!(
            "First run: recording {} postings as the baseline, nothing sent",
            diff.next.len()
        );
    } else if !diff.has_changes() {
        log::info!("No new postings");
    }

    // A run-fatal notifier error stops delivery but the snapshot is still saved
    let mut fatal = None;
    for posting in &diff.novel {
        let candidate = NotificationCandidate::from_posting(
            posting,
            &config.notices.categories,
            &config.notices.default_icon,
        );
        sub_item(&format!("{} {}", candidate.category, candidate.title));

        let text = format::posting_message(&candidate, &config.notices.link_label);
        match notifier.send(&text).await {
            Ok(()) => report.delivered += 1,
            Err(e) if e.is_run_fatal() => {
                report.failed += 1;
                fatal = Some(e);
                break;
            }
            Err(e) => {
                report.failed += 1;
                log::error!("Delivery of {:?} via {} failed: {e}", candidate.title, notifier.name());
            }
        }
    }

    store.save(&diff.next).await?;
    if let Some(e) = fatal {
        return Err(e);
    }

    summary(
        "Notice board",
        &[
            ("Marked postings", report.found.to_string()),
            ("New", report.novel.to_string()),
            ("Delivered", report.delivered.to_string()),
            ("Failed", report.failed.to_string()),
            ("Forgotten", diff.forgotten.to_string()),
            ("Snapshot", store.location()),
        ],
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::services::DryRunNotifier;
    use crate::storage::LocalStorage;
    use async_trait::async_trait;
    use tempfile::TempDir;

    struct StaticPage(Option<String>);

    #[async_trait]
    impl ContentProvider for StaticPage {
        fn name(&self) -> &str {
            "static"
        }

        async fn fetch(&self, url: &str) -> Result<String> {
            self.0
                .clone()
                .ok_or_else(|| AppError::fetch(url, "timed out"))
        }
    }

    struct Unreachable;

    #[async_trait]
    impl Notifier for Unreachable {
        fn name(&self) -> &str {
            "unreachable"
        }

        async fn send(&self, _text: &str) -> Result<()> {
            Err(AppError::notify("status 502"))
        }
    }

    /// Notifier whose failure is not specific to one message.
    struct Misconfigured;

    #[async_trait]
    impl Notifier for Misconfigured {
        fn name(&self) -> &str {
            "misconfigured"
        }

        async fn send(&self, _text: &str) -> Result<()> {
            Err(AppError::config("chat_id is not numeric"))
        }
    }

    fn page(titles: &[&str]) -> StaticPage {
        let rows: String = titles
            .iter()
            .enumerate()
            .map(|(i, title)| {
                format!(
                    r#"<li><div class="board-text"><a href="/notice?id={i}">{title} 신규게시글</a></div>
                       <p class="info"><span>2026-02-0{i}</span><span>학사팀</span></p></li>"#
                )
            })
            .collect();
        // A pinned row without the marker keeps the list non-empty
        StaticPage(Some(format!(
            r#"<div class="board-list-box"><ul>
                 <li><div class="board-text"><a href="/notice?id=pinned">이용 안내</a></div></li>
                 {rows}
               </ul></div>"#
        )))
    }

    fn store(tmp: &TempDir) -> LocalStorage {
        LocalStorage::new(tmp.path().join("seen_postings.txt"))
    }

    #[tokio::test]
    async fn test_cold_start_records_baseline() {
        let tmp = TempDir::new().unwrap();
        let notifier = DryRunNotifier::new();

        let report = run_postings(
            &Config::default(),
            &page(&["장학금 신청", "수업 변경"]),
            &store(&tmp),
            &notifier,
        )
        .await
        .unwrap();

        assert!(report.cold_start);
        assert_eq!(report.found, 2);
        assert!(notifier.messages().is_empty());
        assert_eq!(store(&tmp).load().await.unwrap().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unchanged_rerun_is_silent() {
        let tmp = TempDir::new().unwrap();
        let notifier = DryRunNotifier::new();
        let config = Config::default();
        let board = page(&["장학금 신청", "수업 변경"]);

        run_postings(&config, &board, &store(&tmp), &notifier).await.unwrap();
        let report = run_postings(&config, &board, &store(&tmp), &notifier).await.unwrap();

        assert!(!report.cold_start);
        assert_eq!(report.novel, 0);
        assert!(notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn test_new_posting_notified_once() {
        let tmp = TempDir::new().unwrap();
        let notifier = DryRunNotifier::new();
        let config = Config::default();

        run_postings(&config, &page(&["수업 변경"]), &store(&tmp), &notifier)
            .await
            .unwrap();
        let board = page(&["수업 변경", "축제 안내"]);
        let report = run_postings(&config, &board, &store(&tmp), &notifier).await.unwrap();
        run_postings(&config, &board, &store(&tmp), &notifier).await.unwrap();

        assert_eq!(report.novel, 1);
        assert_eq!(report.delivered, 1);
        let messages = notifier.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("🎉 *축제 안내*"));
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_snapshot() {
        let tmp = TempDir::new().unwrap();
        let notifier = DryRunNotifier::new();
        let config = Config::default();

        run_postings(&config, &page(&["수업 변경"]), &store(&tmp), &notifier)
            .await
            .unwrap();
        let before = store(&tmp).load().await.unwrap();

        let result = run_postings(&config, &StaticPage(None), &store(&tmp), &notifier).await;
        assert!(matches!(result, Err(AppError::Fetch { .. })));
        assert_eq!(store(&tmp).load().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_structural_failure_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let notifier = DryRunNotifier::new();
        let broken = StaticPage(Some("<html><body>점검 중</body></html>".into()));

        let result = run_postings(&Config::default(), &broken, &store(&tmp), &notifier).await;
        assert!(matches!(result, Err(AppError::StructuralParse(_))));
        assert!(store(&tmp).load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delivery_failures_do_not_block_persist() {
        let tmp = TempDir::new().unwrap();
        let config = Config::default();

        run_postings(&config, &page(&["수업 변경"]), &store(&tmp), &DryRunNotifier::new())
            .await
            .unwrap();
        let board = page(&["수업 변경", "장학금 신청", "축제 안내"]);
        let report = run_postings(&config, &board, &store(&tmp), &Unreachable)
            .await
            .unwrap();

        assert_eq!(report.novel, 2);
        assert_eq!(report.failed, 2);
        assert_eq!(store(&tmp).load().await.unwrap().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_empty_snapshot_file_is_cold_start() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("seen_postings.txt"), "").unwrap();
        let notifier = DryRunNotifier::new();

        let report = run_postings(
            &Config::default(),
            &page(&["장학금 신청", "수업 변경", "축제 안내"]),
            &store(&tmp),
            &notifier,
        )
        .await
        .unwrap();

        assert!(report.cold_start);
        assert_eq!(report.novel, 0);
        assert!(notifier.messages().is_empty());
        assert_eq!(store(&tmp).load().await.unwrap().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_fatal_notifier_error_stops_delivery_after_persist() {
        let tmp = TempDir::new().unwrap();
        let config = Config::default();

        run_postings(&config, &page(&["수업 변경"]), &store(&tmp), &DryRunNotifier::new())
            .await
            .unwrap();
        let board = page(&["수업 변경", "장학금 신청", "축제 안내"]);
        let result = run_postings(&config, &board, &store(&tmp), &Misconfigured).await;

        assert!(matches!(result, Err(AppError::Config(_))));
        assert_eq!(store(&tmp).load().await.unwrap().unwrap().len(), 3);
    }
}
