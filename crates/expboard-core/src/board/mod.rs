//! Board domain logic: the fixed four-column view over all experiments.

pub mod model;

pub use model::{Board, Column, COLUMNS};

use crate::error::ExpResult;
use crate::experiment;
use expboard_db::DbPool;

/// Fetch every experiment and partition it into the board columns.
pub fn get_board(pool: &DbPool) -> ExpResult<Board> {
    let experiments = experiment::list_experiments(pool)?;
    Ok(Board::from_experiments(experiments))
}
