//! Stock primitives for checkout.
//!
//! Generic over [`ConnectionTrait`] so the caller decides the transaction:
//! checkout passes its open `DatabaseTransaction` and every read and write
//! below commits or rolls back with it.

use sea_orm::sea_query::{Expr, ExprTrait};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect};
use std::collections::HashMap;

use crate::entity::product;
use crate::models::ProductSnapshot;

/// One query for all `ids`; unknown ids are simply absent from the map.
pub async fn find_products_by_ids<C: ConnectionTrait>(
    conn: &C,
    ids: &[i32],
) -> Result<HashMap<i32, ProductSnapshot>, DbErr> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let models = product::Entity::find()
        .filter(product::Column::Id.is_in(ids.iter().copied()))
        .all(conn)
        .await?;

    Ok(models
        .into_iter()
        .map(|m| (m.id, ProductSnapshot::from(m)))
        .collect())
}

/// `UPDATE products SET stock = stock - quantity WHERE id = ? AND stock >= quantity`.
///
/// Returns `false` when the row is missing or holds less than `quantity`;
/// stock is then left untouched. The row lock taken by the update is held
/// until the surrounding transaction ends.
pub async fn decrement_stock<C: ConnectionTrait>(
    conn: &C,
    product_id: i32,
    quantity: i32,
) -> Result<bool, DbErr> {
    let result = product::Entity::update_many()
        .col_expr(
            product::Column::Stock,
            Expr::col(product::Column::Stock).sub(quantity),
        )
        .filter(product::Column::Id.eq(product_id))
        .filter(product::Column::Stock.gte(quantity))
        .exec(conn)
        .await?;

    Ok(result.rows_affected == 1)
}

/// Current stock of one product, `None` if it does not exist.
pub async fn current_stock<C: ConnectionTrait>(conn: &C, product_id: i32) -> Result<Option<i32>, DbErr> {
    product::Entity::find_by_id(product_id)
        .select_only()
        .column(product::Column::Stock)
        .into_tuple::<i32>()
        .one(conn)
        .await
}
