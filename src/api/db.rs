use sea_orm::{DatabaseConnection, DbErr, EntityTrait, PrimaryKeyTrait, SqlErr};
use tracing::{debug, info};

use super::ApiErrors;

/// Loads a record by id, answering 404 when it does not exist.
pub(crate) async fn find_or_not_found<E>(
    db: &DatabaseConnection,
    id: i64,
    what: &str,
) -> Result<E::Model, ApiErrors>
where
    E: EntityTrait,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<i64>,
{
    let record = E::find_by_id(id).one(db).await?;
    match record {
        Some(record) => {
            debug!("{} {} found", what, id);
            Ok(record)
        }
        None => {
            info!("{} not found: {}", what, id);
            Err(ApiErrors::NotFound(format!("{what} {id} not found")))
        }
    }
}

/// Deletes a record by id, answering 404 when nothing was deleted.
pub(crate) async fn delete_or_not_found<E>(
    db: &DatabaseConnection,
    id: i64,
    what: &str,
) -> Result<(), ApiErrors>
where
    E: EntityTrait,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<i64>,
{
    let res = E::delete_by_id(id).exec(db).await.map_err(|err| {
        write_error(
            err,
            &format!("Duplicate {what}"),
            &format!("{what} {id} is still in use"),
        )
    })?;
    if res.rows_affected == 0 {
        return Err(ApiErrors::NotFound(format!("{what} {id} not found")));
    }
    info!("Deleted {} {}", what, id);
    Ok(())
}

/// Maps constraint violations of inserts, updates and deletes to client errors.
///
/// Uniqueness of names and titles is a table constraint, so a violation is the
/// regular way to learn about a duplicate.
pub(crate) fn write_error(err: DbErr, duplicate: &str, referenced: &str) -> ApiErrors {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            debug!("{}: {}", duplicate, detail);
            ApiErrors::BadRequest(duplicate.to_string())
        }
        Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
            debug!("{}: {}", referenced, detail);
            ApiErrors::BadRequest(referenced.to_string())
        }
        _ => err.into(),
    }
}
