use sea_orm_migration::prelude::*;

/// 合约交易抓取游标（每个合约地址一行）
#[derive(DeriveIden)]
enum ChainCursors {
    Table,
    Account,
    LastLt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ChainCursors::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ChainCursors::Account)
                            .string_len(128)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ChainCursors::LastLt)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ChainCursors::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(ChainCursors::Table).to_owned())
            .await
    }
}
