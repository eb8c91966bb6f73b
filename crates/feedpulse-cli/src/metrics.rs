//! Metric report command handler.

use feedpulse_db::PgFeedbackStore;

use crate::board::ensure_board;

pub(crate) async fn run_metrics(pool: &sqlx::PgPool, board_id: i64) -> anyhow::Result<()> {
    ensure_board(pool, board_id).await?;

    let feedbacks = feedpulse_db::list_feedbacks_by_board(pool, board_id).await?;
    let store = PgFeedbackStore::new(pool.clone());
    let report = feedpulse_pipeline::compute_metrics(&store, &feedbacks).await?;
    tracing::info!(board_id, items = feedbacks.len(), "metrics computed");

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
