use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum UserWheelTickets {
    Table,
    AvailableAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 奖励券在事务内写入，到 available_at 之后才可使用
        if !manager
            .has_column("user_wheel_tickets", "available_at")
            .await?
        {
            manager
                .alter_table(
                    Table::alter()
                        .table(UserWheelTickets::Table)
                        .add_column(
                            ColumnDef::new(UserWheelTickets::AvailableAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::cust("NOW()")),
                        )
                        .to_owned(),
                )
                .await?;
        }

        let stmt = sea_orm_migration::sea_orm::Statement::from_string(
            manager.get_database_backend(),
            "CREATE INDEX IF NOT EXISTS idx_user_wheel_tickets_user_status_available \
             ON user_wheel_tickets(user_id, status, available_at)"
                .to_owned(),
        );
        manager.get_connection().execute(stmt).await?;
        Ok(())
    }

    async fn down(&self, _manager: &SchemaManager) -> Result<(), DbErr> {
        Ok(())
    }
}
