use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;

// 管理员默认拥有除角色管理外的全部权限
const ADMIN_RESOURCES: &[&str] = &[
    "apps",
    "tags",
    "wheels",
    "user-wheel-tickets",
    "swaps",
    "users",
    "notifications",
    "metadata",
    "user-transactions",
];

const ACTIONS: &[&str] = &["GET", "POST", "PUT", "DELETE"];

fn admin_permissions_json() -> String {
    let perms: Vec<String> = ADMIN_RESOURCES
        .iter()
        .flat_map(|r| ACTIONS.iter().map(move |a| format!("\"{r}:{a}\"")))
        .collect();
    format!("[{}]", perms.join(","))
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        // 系统角色：id 1/2/3 固定
        let roles_sql = format!(
            r#"
INSERT INTO roles (id, name, role_type, permissions)
VALUES
 (1, 'Super Admin', 'SUPER_ADMIN', '[]'::json),
 (2, 'Admin', 'ADMIN', '{}'::json),
 (3, 'User', 'USER', '[]'::json)
ON CONFLICT (id) DO NOTHING;
SELECT setval(pg_get_serial_sequence('roles', 'id'), GREATEST((SELECT MAX(id) FROM roles), 3));
"#,
            admin_permissions_json()
        );
        conn.execute_unprepared(&roles_sql).await?;

        // 默认转盘，比例合计 10000bp
        let wheel_sql = r#"
INSERT INTO wheels (id, fee, daily_limit, cool_down_value, cool_down_time)
VALUES (1, 100, 20, 8, NULL)
ON CONFLICT (id) DO NOTHING;
SELECT setval(pg_get_serial_sequence('wheels', 'id'), GREATEST((SELECT MAX(id) FROM wheels), 1));
INSERT INTO wheel_prizes (wheel_id, position, name, description, prize_type, category, prize, rate_bp)
SELECT 1, v.position, v.name::json, v.description::json, v.prize_type, v.category, v.prize, v.rate_bp
FROM (VALUES
 (0, '{"en":"100 Gold"}', '{"en":"100 points"}', 'GOLD', 'COMMON', 100, 4000),
 (1, '{"en":"500 Gold"}', '{"en":"500 points"}', 'GOLD', 'MEDIUM', 500, 2000),
 (2, '{"en":"Extra Ticket"}', '{"en":"One more spin"}', 'TICKET', 'COMMON', 1, 1500),
 (3, '{"en":"0.1 TON"}', '{"en":"0.1 TON draft balance"}', 'TON', 'JACKPOT', 100000000, 400),
 (4, '{"en":"1 TON"}', '{"en":"1 TON draft balance"}', 'TON', 'SUPER_JACKPOT', 1000000000, 100),
 (5, '{"en":"Good Luck"}', '{"en":"Better luck next time"}', 'OTHER', 'COMMON', 0, 2000)
) AS v(position, name, description, prize_type, category, prize, rate_bp)
WHERE NOT EXISTS (SELECT 1 FROM wheel_prizes WHERE wheel_id = 1);
"#;
        conn.execute_unprepared(wheel_sql).await?;

        let metadata_sql = r#"
INSERT INTO metadata (metadata_type, key, value, description)
VALUES
 ('SWAP', 'rate', '0.001', 'TON per point'),
 ('SWAP', 'fee', '5', 'Swap fee percent'),
 ('SWAP', 'min-amount', '1000', 'Minimum points per swap'),
 ('SWAP', 'max-amount', '1000000', 'Maximum points per swap'),
 ('SWAP', 'expire', '10', 'Signature lifetime in minutes'),
 ('REWARD', 'open-app', '50', 'Default reward for opening an app')
ON CONFLICT (metadata_type, key) DO NOTHING;
"#;
        conn.execute_unprepared(metadata_sql).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();
        conn.execute_unprepared(
            "DELETE FROM metadata; DELETE FROM wheel_prizes WHERE wheel_id = 1; DELETE FROM wheels WHERE id = 1;",
        )
        .await?;
        Ok(())
    }
}
