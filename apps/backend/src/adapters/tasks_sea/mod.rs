//! SeaORM adapter for the task repository.

use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QueryOrder,
    Set,
};

use crate::entities::tasks;

pub mod dto;

pub use dto::{TaskFields, TaskQuery};

const LIKE_ESCAPE: char = '|';

// Adapter functions return DbErr; the repos layer maps to DomainError.

pub async fn find_all<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    query: &TaskQuery,
) -> Result<Vec<tasks::Model>, sea_orm::DbErr> {
    let mut select = tasks::Entity::find();

    if let Some(title) = query.title.as_deref() {
        // LOWER on both sides: SQLite LIKE ignores ASCII case, Postgres LIKE does not
        let pattern = LikeExpr::new(format!("%{}%", escape_like(&title.to_lowercase())))
            .escape(LIKE_ESCAPE);
        let title_lower = Expr::expr(Func::lower(Expr::col(tasks::Column::Title)));
        select = select.filter(title_lower.like(pattern));
    }
    if let Some(status) = query.status {
        select = select.filter(tasks::Column::Status.eq(status));
    }
    if let Some(from) = query.date_from {
        select = select.filter(tasks::Column::Date.gte(from));
    }
    if let Some(until) = query.date_until {
        select = select.filter(tasks::Column::Date.lt(until));
    }

    select.order_by_asc(tasks::Column::Id).all(conn).await
}

/// Escape LIKE wildcards so user input matches literally.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
) -> Result<Option<tasks::Model>, sea_orm::DbErr> {
    tasks::Entity::find_by_id(id).one(conn).await
}

pub async fn create<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    fields: TaskFields,
) -> Result<tasks::Model, sea_orm::DbErr> {
    let active = tasks::ActiveModel {
        id: NotSet,
        title: Set(fields.title),
        description: Set(fields.description),
        date: Set(fields.date),
        status: Set(fields.status),
    };

    active.insert(conn).await
}

/// Replace every column of an existing task. `Ok(None)` when the id is unknown.
pub async fn update<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
    fields: TaskFields,
) -> Result<Option<tasks::Model>, sea_orm::DbErr> {
    let Some(existing) = find_by_id(conn, id).await? else {
        return Ok(None);
    };

    let mut active: tasks::ActiveModel = existing.into();
    active.title = Set(fields.title);
    active.description = Set(fields.description);
    active.date = Set(fields.date);
    active.status = Set(fields.status);

    active.update(conn).await.map(Some)
}

/// Returns whether a row was deleted.
pub async fn delete<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
) -> Result<bool, sea_orm::DbErr> {
    let result = tasks::Entity::delete_by_id(id).exec(conn).await?;
    Ok(result.rows_affected > 0)
}
