use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Site-wide contact details shown on the contact page. A single row,
/// managed out of band; `seed::ensure_contact_info` inserts a placeholder
/// when the table is empty.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contact_info")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub address: String,
    pub phone: String,
    pub email: String,
    pub facebook: String,
    pub twitter: String,
    pub instagram: String,
    pub youtube: String,
    pub map_embed: Option<String>,
}

impl ActiveModelBehavior for ActiveModel {}
