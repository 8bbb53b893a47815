use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(pk_auto(Transactions::Id))
                    .col(big_integer(Transactions::TotalAmount))
                    .col(
                        timestamp_with_time_zone(Transactions::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_transactions_created_at")
                    .table(Transactions::Table)
                    .col(Transactions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // No foreign key on product_id: details outlive the products they snapshot.
        manager
            .create_table(
                Table::create()
                    .table(TransactionDetails::Table)
                    .if_not_exists()
                    .col(pk_auto(TransactionDetails::Id))
                    .col(integer(TransactionDetails::TransactionId))
                    .col(integer(TransactionDetails::ProductId))
                    .col(string(TransactionDetails::ProductName))
                    .col(integer(TransactionDetails::Quantity))
                    .col(big_integer(TransactionDetails::Subtotal))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transaction_details_transaction_id")
                            .from(TransactionDetails::Table, TransactionDetails::TransactionId)
                            .to(Transactions::Table, Transactions::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_transaction_details_transaction_id")
                    .table(TransactionDetails::Table)
                    .col(TransactionDetails::TransactionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_transaction_details_product_id")
                    .table(TransactionDetails::Table)
                    .col(TransactionDetails::ProductId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TransactionDetails::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Transactions {
    Table,
    Id,
    TotalAmount,
    CreatedAt,
}

#[derive(DeriveIden)]
enum TransactionDetails {
    Table,
    Id,
    TransactionId,
    ProductId,
    ProductName,
    Quantity,
    Subtotal,
}
