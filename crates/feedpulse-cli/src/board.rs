//! Board management command handlers.

use clap::Subcommand;

/// Sub-commands available under `board`.
#[derive(Debug, Subcommand)]
pub enum BoardCommands {
    /// Create a board and print its id
    Create {
        /// Display name of the board
        #[arg(long)]
        name: String,
    },
}

pub(crate) async fn run_board(pool: &sqlx::PgPool, command: BoardCommands) -> anyhow::Result<()> {
    match command {
        BoardCommands::Create { name } => {
            let board = feedpulse_db::create_board(pool, &name).await?;
            tracing::info!(board_id = board.id, name = %board.name, "board created");
            println!("created board {} ({})", board.id, board.name);
        }
    }
    Ok(())
}

/// Fails with the same message the pipeline uses for unknown boards.
///
/// # Errors
///
/// Returns an error if the board does not exist or the lookup fails.
pub(crate) async fn ensure_board(pool: &sqlx::PgPool, board_id: i64) -> anyhow::Result<()> {
    match feedpulse_db::get_board(pool, board_id).await {
        Ok(_) => Ok(()),
        Err(feedpulse_db::DbError::NotFound) => {
            anyhow::bail!("board with ID {board_id} does not exist")
        }
        Err(e) => Err(e.into()),
    }
}
