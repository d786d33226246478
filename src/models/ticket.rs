use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

pub use crate::entities::user_wheel_tickets::{TicketStatus, TicketType};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GrantTicketsRequest {
    pub user_id: i64,
    #[schema(example = 3)]
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateTicketStatusRequest {
    pub status: TicketStatus,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TicketFilter {
    pub user_id: Option<i64>,
    pub ticket_type: Option<TicketType>,
}

pub type UserWheelTicket = crate::entities::user_wheel_tickets::Model;
