use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

pub use crate::entities::metadata::MetadataType;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateMetadataRequest {
    /// 默认 SWAP
    pub metadata_type: Option<MetadataType>,
    #[schema(example = "0.001")]
    pub value: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MetadataFilter {
    pub metadata_type: Option<MetadataType>,
}

pub type Metadata = crate::entities::metadata::Model;
