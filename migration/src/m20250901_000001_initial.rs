use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Roles {
    Table,
    Id,
    Name,
    RoleType,
    Permissions,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    PasswordHash,
    RoleId,
    Status,
    Balance,
    TonBalance,
    ReferralCode,
    ReferrerId,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum UserTransactions {
    Table,
    Id,
    UserId,
    TxType,
    Currency,
    Amount,
    BalanceBefore,
    BalanceAfter,
    Action,
    RefSource,
    RefId,
    AppId,
    Origin,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Wheels {
    Table,
    Id,
    Fee,
    DailyLimit,
    CoolDownValue,
    CoolDownTime,
    CreatedBy,
    UpdatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum WheelPrizes {
    Table,
    Id,
    WheelId,
    Position,
    Name,
    Description,
    PrizeType,
    Category,
    Prize,
    RateBp,
    Image,
}

#[derive(DeriveIden)]
enum UserWheelTickets {
    Table,
    Id,
    UserId,
    Status,
    TicketType,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum UserWheels {
    Table,
    Id,
    UserId,
    WheelId,
    TicketId,
    PrizeId,
    PrizeType,
    Category,
    Prize,
    CreatedAt,
}

#[derive(DeriveIden)]
enum UserSwaps {
    Table,
    Id,
    UserId,
    Status,
    SwapType,
    Amount,
    Point,
    Signature,
    SignatureId,
    WalletAddress,
    Boc,
    Expire,
    CountCheck,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum JettonTransactions {
    Table,
    Id,
    Signature,
    IsSuccess,
    Lt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Metadata {
    Table,
    Id,
    MetadataType,
    Key,
    Value,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Notifications {
    Table,
    Id,
    UserId,
    Name,
    ShortDescription,
    Status,
    RefSource,
    RefId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum UserReferrals {
    Table,
    Id,
    ReferrerId,
    ReferredId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Apps {
    Table,
    Id,
    Name,
    ShortDescription,
    Slug,
    Url,
    Image,
    Status,
    Reward,
    CreatedBy,
    UpdatedBy,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum Tags {
    Table,
    Id,
    Name,
    ShortDescription,
    Slug,
    CreatedBy,
    UpdatedBy,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum AppTags {
    Table,
    AppId,
    TagId,
}

fn id_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .big_integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

fn now_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::cust("NOW()"))
        .to_owned()
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 角色
        manager
            .create_table(
                Table::create()
                    .table(Roles::Table)
                    .if_not_exists()
                    .col(&mut id_col(Roles::Id))
                    .col(ColumnDef::new(Roles::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Roles::RoleType).string_len(20).not_null())
                    .col(
                        ColumnDef::new(Roles::Permissions)
                            .json()
                            .not_null()
                            .default(Expr::cust("'[]'::json")),
                    )
                    .col(&mut now_col(Roles::CreatedAt))
                    .col(&mut now_col(Roles::UpdatedAt))
                    .col(ColumnDef::new(Roles::DeletedAt).timestamp_with_time_zone().null())
                    .to_owned(),
            )
            .await?;

        // 用户
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(&mut id_col(Users::Id))
                    .col(
                        ColumnDef::new(Users::Name)
                            .string_len(255)
                            .not_null()
                            .default("No Name"),
                    )
                    .col(ColumnDef::new(Users::Email).string_len(255).not_null())
                    .col(ColumnDef::new(Users::PasswordHash).string_len(255).not_null())
                    .col(ColumnDef::new(Users::RoleId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Users::Status)
                            .string_len(20)
                            .not_null()
                            .default("ACTIVE"),
                    )
                    .col(
                        ColumnDef::new(Users::Balance)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Users::TonBalance)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Users::ReferralCode).string_len(16).not_null())
                    .col(ColumnDef::new(Users::ReferrerId).big_integer().null())
                    .col(&mut now_col(Users::CreatedAt))
                    .col(&mut now_col(Users::UpdatedAt))
                    .col(ColumnDef::new(Users::DeletedAt).timestamp_with_time_zone().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_role")
                            .from(Users::Table, Users::RoleId)
                            .to(Roles::Table, Roles::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_users_email_unique")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_users_referral_code_unique")
                    .table(Users::Table)
                    .col(Users::ReferralCode)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 账本流水
        manager
            .create_table(
                Table::create()
                    .table(UserTransactions::Table)
                    .if_not_exists()
                    .col(&mut id_col(UserTransactions::Id))
                    .col(ColumnDef::new(UserTransactions::UserId).big_integer().not_null())
                    .col(ColumnDef::new(UserTransactions::TxType).string_len(10).not_null())
                    .col(ColumnDef::new(UserTransactions::Currency).string_len(10).not_null())
                    .col(ColumnDef::new(UserTransactions::Amount).big_integer().not_null())
                    .col(
                        ColumnDef::new(UserTransactions::BalanceBefore)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserTransactions::BalanceAfter)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(UserTransactions::Action).string_len(50).not_null())
                    .col(ColumnDef::new(UserTransactions::RefSource).string_len(50).null())
                    .col(ColumnDef::new(UserTransactions::RefId).big_integer().null())
                    .col(ColumnDef::new(UserTransactions::AppId).big_integer().null())
                    .col(ColumnDef::new(UserTransactions::Origin).string_len(255).null())
                    .col(&mut now_col(UserTransactions::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_transactions_user")
                            .from(UserTransactions::Table, UserTransactions::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_user_transactions_user_action")
                    .table(UserTransactions::Table)
                    .col(UserTransactions::UserId)
                    .col(UserTransactions::Action)
                    .to_owned(),
            )
            .await?;

        // 转盘
        manager
            .create_table(
                Table::create()
                    .table(Wheels::Table)
                    .if_not_exists()
                    .col(&mut id_col(Wheels::Id))
                    .col(ColumnDef::new(Wheels::Fee).big_integer().not_null())
                    .col(ColumnDef::new(Wheels::DailyLimit).integer().not_null())
                    .col(
                        ColumnDef::new(Wheels::CoolDownValue)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Wheels::CoolDownTime).big_integer().null())
                    .col(ColumnDef::new(Wheels::CreatedBy).big_integer().null())
                    .col(ColumnDef::new(Wheels::UpdatedBy).big_integer().null())
                    .col(&mut now_col(Wheels::CreatedAt))
                    .col(&mut now_col(Wheels::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(WheelPrizes::Table)
                    .if_not_exists()
                    .col(&mut id_col(WheelPrizes::Id))
                    .col(ColumnDef::new(WheelPrizes::WheelId).big_integer().not_null())
                    .col(ColumnDef::new(WheelPrizes::Position).integer().not_null())
                    .col(ColumnDef::new(WheelPrizes::Name).json().not_null())
                    .col(ColumnDef::new(WheelPrizes::Description).json().not_null())
                    .col(ColumnDef::new(WheelPrizes::PrizeType).string_len(20).not_null())
                    .col(ColumnDef::new(WheelPrizes::Category).string_len(20).not_null())
                    .col(
                        ColumnDef::new(WheelPrizes::Prize)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(WheelPrizes::RateBp).integer().not_null())
                    .col(ColumnDef::new(WheelPrizes::Image).string_len(512).null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_wheel_prizes_wheel")
                            .from(WheelPrizes::Table, WheelPrizes::WheelId)
                            .to(Wheels::Table, Wheels::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 抽奖券
        manager
            .create_table(
                Table::create()
                    .table(UserWheelTickets::Table)
                    .if_not_exists()
                    .col(&mut id_col(UserWheelTickets::Id))
                    .col(ColumnDef::new(UserWheelTickets::UserId).big_integer().not_null())
                    .col(
                        ColumnDef::new(UserWheelTickets::Status)
                            .string_len(20)
                            .not_null()
                            .default("NEW"),
                    )
                    .col(
                        ColumnDef::new(UserWheelTickets::TicketType)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(&mut now_col(UserWheelTickets::CreatedAt))
                    .col(&mut now_col(UserWheelTickets::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_user_wheel_tickets_user_status")
                    .table(UserWheelTickets::Table)
                    .col(UserWheelTickets::UserId)
                    .col(UserWheelTickets::Status)
                    .to_owned(),
            )
            .await?;

        // 抽奖记录
        manager
            .create_table(
                Table::create()
                    .table(UserWheels::Table)
                    .if_not_exists()
                    .col(&mut id_col(UserWheels::Id))
                    .col(ColumnDef::new(UserWheels::UserId).big_integer().not_null())
                    .col(ColumnDef::new(UserWheels::WheelId).big_integer().not_null())
                    .col(ColumnDef::new(UserWheels::TicketId).big_integer().not_null())
                    .col(ColumnDef::new(UserWheels::PrizeId).big_integer().not_null())
                    .col(ColumnDef::new(UserWheels::PrizeType).string_len(20).not_null())
                    .col(ColumnDef::new(UserWheels::Category).string_len(20).not_null())
                    .col(ColumnDef::new(UserWheels::Prize).big_integer().not_null())
                    .col(&mut now_col(UserWheels::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_user_wheels_user")
                    .table(UserWheels::Table)
                    .col(UserWheels::UserId)
                    .to_owned(),
            )
            .await?;

        // 兑换
        manager
            .create_table(
                Table::create()
                    .table(UserSwaps::Table)
                    .if_not_exists()
                    .col(&mut id_col(UserSwaps::Id))
                    .col(ColumnDef::new(UserSwaps::UserId).big_integer().not_null())
                    .col(
                        ColumnDef::new(UserSwaps::Status)
                            .string_len(20)
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(ColumnDef::new(UserSwaps::SwapType).string_len(20).not_null())
                    .col(ColumnDef::new(UserSwaps::Amount).big_integer().not_null())
                    .col(ColumnDef::new(UserSwaps::Point).big_integer().not_null())
                    .col(ColumnDef::new(UserSwaps::Signature).string_len(128).not_null())
                    .col(ColumnDef::new(UserSwaps::SignatureId).big_integer().not_null())
                    .col(ColumnDef::new(UserSwaps::WalletAddress).string_len(128).not_null())
                    .col(ColumnDef::new(UserSwaps::Boc).text().null())
                    .col(ColumnDef::new(UserSwaps::Expire).big_integer().not_null())
                    .col(
                        ColumnDef::new(UserSwaps::CountCheck)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(&mut now_col(UserSwaps::CreatedAt))
                    .col(&mut now_col(UserSwaps::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_user_swaps_signature_id_unique")
                    .table(UserSwaps::Table)
                    .col(UserSwaps::SignatureId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_user_swaps_status_expire")
                    .table(UserSwaps::Table)
                    .col(UserSwaps::Status)
                    .col(UserSwaps::Expire)
                    .to_owned(),
            )
            .await?;

        // 链上交易快照
        manager
            .create_table(
                Table::create()
                    .table(JettonTransactions::Table)
                    .if_not_exists()
                    .col(&mut id_col(JettonTransactions::Id))
                    .col(
                        ColumnDef::new(JettonTransactions::Signature)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(ColumnDef::new(JettonTransactions::IsSuccess).boolean().not_null())
                    .col(ColumnDef::new(JettonTransactions::Lt).big_integer().not_null())
                    .col(&mut now_col(JettonTransactions::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_jetton_transactions_signature_unique")
                    .table(JettonTransactions::Table)
                    .col(JettonTransactions::Signature)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 配置项
        manager
            .create_table(
                Table::create()
                    .table(Metadata::Table)
                    .if_not_exists()
                    .col(&mut id_col(Metadata::Id))
                    .col(ColumnDef::new(Metadata::MetadataType).string_len(20).not_null())
                    .col(ColumnDef::new(Metadata::Key).string_len(50).not_null())
                    .col(ColumnDef::new(Metadata::Value).string_len(255).not_null())
                    .col(ColumnDef::new(Metadata::Description).string_len(255).null())
                    .col(&mut now_col(Metadata::CreatedAt))
                    .col(&mut now_col(Metadata::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_metadata_type_key_unique")
                    .table(Metadata::Table)
                    .col(Metadata::MetadataType)
                    .col(Metadata::Key)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 通知
        manager
            .create_table(
                Table::create()
                    .table(Notifications::Table)
                    .if_not_exists()
                    .col(&mut id_col(Notifications::Id))
                    .col(ColumnDef::new(Notifications::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Notifications::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Notifications::ShortDescription).text().not_null())
                    .col(
                        ColumnDef::new(Notifications::Status)
                            .string_len(20)
                            .not_null()
                            .default("UNREAD"),
                    )
                    .col(ColumnDef::new(Notifications::RefSource).string_len(50).null())
                    .col(ColumnDef::new(Notifications::RefId).big_integer().null())
                    .col(&mut now_col(Notifications::CreatedAt))
                    .col(&mut now_col(Notifications::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_notifications_user_status")
                    .table(Notifications::Table)
                    .col(Notifications::UserId)
                    .col(Notifications::Status)
                    .to_owned(),
            )
            .await?;

        // 推荐关系（被推荐人唯一）
        manager
            .create_table(
                Table::create()
                    .table(UserReferrals::Table)
                    .if_not_exists()
                    .col(&mut id_col(UserReferrals::Id))
                    .col(ColumnDef::new(UserReferrals::ReferrerId).big_integer().not_null())
                    .col(ColumnDef::new(UserReferrals::ReferredId).big_integer().not_null())
                    .col(&mut now_col(UserReferrals::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_user_referrals_referred_unique")
                    .table(UserReferrals::Table)
                    .col(UserReferrals::ReferredId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 应用
        manager
            .create_table(
                Table::create()
                    .table(Apps::Table)
                    .if_not_exists()
                    .col(&mut id_col(Apps::Id))
                    .col(ColumnDef::new(Apps::Name).json().not_null())
                    .col(ColumnDef::new(Apps::ShortDescription).json().not_null())
                    .col(ColumnDef::new(Apps::Slug).string_len(255).not_null())
                    .col(ColumnDef::new(Apps::Url).string_len(512).not_null())
                    .col(ColumnDef::new(Apps::Image).string_len(512).null())
                    .col(
                        ColumnDef::new(Apps::Status)
                            .string_len(20)
                            .not_null()
                            .default("DRAFT"),
                    )
                    .col(
                        ColumnDef::new(Apps::Reward)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Apps::CreatedBy).big_integer().null())
                    .col(ColumnDef::new(Apps::UpdatedBy).big_integer().null())
                    .col(&mut now_col(Apps::CreatedAt))
                    .col(&mut now_col(Apps::UpdatedAt))
                    .col(ColumnDef::new(Apps::DeletedAt).timestamp_with_time_zone().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_apps_slug_unique")
                    .table(Apps::Table)
                    .col(Apps::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 标签
        manager
            .create_table(
                Table::create()
                    .table(Tags::Table)
                    .if_not_exists()
                    .col(&mut id_col(Tags::Id))
                    .col(ColumnDef::new(Tags::Name).json().not_null())
                    .col(ColumnDef::new(Tags::ShortDescription).json().not_null())
                    .col(ColumnDef::new(Tags::Slug).string_len(255).not_null())
                    .col(ColumnDef::new(Tags::CreatedBy).big_integer().null())
                    .col(ColumnDef::new(Tags::UpdatedBy).big_integer().null())
                    .col(&mut now_col(Tags::CreatedAt))
                    .col(&mut now_col(Tags::UpdatedAt))
                    .col(ColumnDef::new(Tags::DeletedAt).timestamp_with_time_zone().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tags_slug_unique")
                    .table(Tags::Table)
                    .col(Tags::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AppTags::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AppTags::AppId).big_integer().not_null())
                    .col(ColumnDef::new(AppTags::TagId).big_integer().not_null())
                    .primary_key(Index::create().col(AppTags::AppId).col(AppTags::TagId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_app_tags_app")
                            .from(AppTags::Table, AppTags::AppId)
                            .to(Apps::Table, Apps::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_app_tags_tag")
                            .from(AppTags::Table, AppTags::TagId)
                            .to(Tags::Table, Tags::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 逆序删除，先删依赖表
        let tables: Vec<DynIden> = vec![
            AppTags::Table.into_iden(),
            Tags::Table.into_iden(),
            Apps::Table.into_iden(),
            UserReferrals::Table.into_iden(),
            Notifications::Table.into_iden(),
            Metadata::Table.into_iden(),
            JettonTransactions::Table.into_iden(),
            UserSwaps::Table.into_iden(),
            UserWheels::Table.into_iden(),
            UserWheelTickets::Table.into_iden(),
            WheelPrizes::Table.into_iden(),
            Wheels::Table.into_iden(),
            UserTransactions::Table.into_iden(),
            Users::Table.into_iden(),
            Roles::Table.into_iden(),
        ];
        for table in tables {
            manager
                .drop_table(Table::drop().if_exists().table(table).to_owned())
                .await?;
        }
        Ok(())
    }
}
