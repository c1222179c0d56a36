//! Report memo migration.

use tracing::info;

use super::flag_or_false;
use crate::error::Result;
use crate::source::SourceReader;
use crate::target::{NewReportMemo, TargetWriter};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoOutcome {
    pub memos: usize,
}

pub async fn migrate_report_memos<S, T>(source: &S, target: &mut T) -> Result<MemoOutcome>
where
    S: SourceReader + ?Sized,
    T: TargetWriter + ?Sized,
{
    let memos = source.report_memos().await?;
    let mut outcome = MemoOutcome::default();
    for memo in memos {
        target
            .insert_report_memo(&NewReportMemo {
                memo_name: memo.name,
                memo_content: memo.content,
                is_default: flag_or_false(memo.is_default),
            })
            .await?;
        outcome.memos += 1;
    }
    info!("Report memos: {} migrated", outcome.memos);
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use sqlx::Row;

    use super::*;
    use crate::source::{MemorySource, ReportMemoRecord};
    use crate::transform::test_support::target;

    #[tokio::test]
    async fn test_memos_keep_text_and_coalesce_flag() {
        let source = MemorySource::new().with_report_memos(vec![
            ReportMemoRecord {
                report_memo_id: 1,
                content: Some("冷蔵".into()),
                name: Some("クール便".into()),
                is_default: None,
            },
            ReportMemoRecord {
                report_memo_id: 2,
                content: None,
                name: Some("通常".into()),
                is_default: Some(true),
            },
        ]);
        let mut target = target().await;

        let outcome = migrate_report_memos(&source, &mut target).await.unwrap();
        assert_eq!(outcome.memos, 2);

        let rows = target
            .fetch_rows("SELECT MemoName, MemoContent, IsDefault FROM ReportMemo ORDER BY ReportMemoId")
            .await;
        assert_eq!(rows[0].get::<String, _>(0), "クール便");
        assert_eq!(rows[0].get::<String, _>(1), "冷蔵");
        assert_eq!(rows[0].get::<i64, _>(2), 0);
        assert_eq!(rows[1].get::<Option<String>, _>(1), None);
        assert_eq!(rows[1].get::<i64, _>(2), 1);
    }
}
