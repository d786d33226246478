pub mod app_tags;
pub mod apps;
pub mod chain_cursors;
pub mod jetton_transactions;
pub mod metadata;
pub mod notifications;
pub mod roles;
pub mod tags;
pub mod user_referrals;
pub mod user_swaps;
pub mod user_transactions;
pub mod user_wheel_tickets;
pub mod user_wheels;
pub mod users;
pub mod wheel_prizes;
pub mod wheels;

pub use app_tags as app_tag_entity;
pub use apps as app_entity;
pub use chain_cursors as chain_cursor_entity;
pub use jetton_transactions as jetton_transaction_entity;
pub use metadata as metadata_entity;
pub use notifications as notification_entity;
pub use roles as role_entity;
pub use tags as tag_entity;
pub use user_referrals as user_referral_entity;
pub use user_swaps as user_swap_entity;
pub use user_transactions as user_transaction_entity;
pub use user_wheel_tickets as ticket_entity;
pub use user_wheels as user_wheel_entity;
pub use users as user_entity;
pub use wheel_prizes as wheel_prize_entity;
pub use wheels as wheel_entity;
