//! SeaORM entities for `transactions` and `transaction_details`.

pub mod transaction {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "transactions")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub total_amount: i64,
        pub created_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod transaction_detail {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "transaction_details")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub transaction_id: i32,
        pub product_id: i32,
        pub product_name: String,
        pub quantity: i32,
        pub subtotal: i64,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

use crate::models::{Transaction, TransactionDetail};

impl From<transaction_detail::Model> for TransactionDetail {
    fn from(model: transaction_detail::Model) -> Self {
        Self {
            id: model.id,
            transaction_id: model.transaction_id,
            product_id: model.product_id,
            product_name: model.product_name,
            quantity: model.quantity,
            subtotal: model.subtotal,
        }
    }
}

impl Transaction {
    pub(crate) fn from_models(header: transaction::Model, details: Vec<transaction_detail::Model>) -> Self {
        Self {
            id: header.id,
            total_amount: header.total_amount,
            created_at: header.created_at,
            details: details.into_iter().map(Into::into).collect(),
        }
    }
}
