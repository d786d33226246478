use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

pub use crate::entities::notifications::NotificationStatus;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateNotificationRequest {
    pub user_ids: Vec<i64>,
    pub name: String,
    pub short_description: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UnreadCountResponse {
    pub count: u64,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NotificationFilter {
    pub status: Option<NotificationStatus>,
}

pub type Notification = crate::entities::notifications::Model;
