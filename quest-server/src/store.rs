use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, FromQueryResult, QueryFilter, QuerySelect,
    SqlErr, TransactionError,
};

use quest_persistence::entities::{level_records, prelude::*};
use quest_types::EngineError;

/// Flatten a sea-orm transaction error back into the engine taxonomy.
/// Connection-level failures are the only thing that may surface as
/// `Internal`; typed failures pass through untouched.
pub(crate) fn unwrap_txn_err(err: TransactionError<EngineError>) -> EngineError {
    match err {
        TransactionError::Connection(db_err) => EngineError::internal(db_err),
        TransactionError::Transaction(engine_err) => engine_err,
    }
}

pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

#[derive(FromQueryResult)]
struct StarsSum {
    total: Option<i64>,
}

/// Sum of the user's stars across all their level records; feeds the
/// unlock-threshold check.
pub(crate) async fn user_total_stars<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> Result<i64, DbErr> {
    let sum = LevelRecords::find()
        .select_only()
        .column_as(Expr::col(level_records::Column::Stars).sum(), "total")
        .filter(level_records::Column::UserId.eq(user_id))
        .into_model::<StarsSum>()
        .one(db)
        .await?;

    Ok(sum.and_then(|row| row.total).unwrap_or(0))
}
