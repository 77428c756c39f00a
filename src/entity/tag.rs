use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tag")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub name: String,
    /// URL-safe form of the name, used in /tags/{slug} links.
    #[sea_orm(unique)]
    pub slug: String,

    #[sea_orm(has_many, via = "blog_tag")]
    pub blogs: HasMany<super::blog::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
