use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tag")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::news_tag::Entity")]
    NewsTag,
}

impl Related<super::news_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::NewsTag.def()
    }
}

impl Related<super::news::Entity> for Entity {
    fn to() -> RelationDef {
        super::news_tag::Relation::News.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::news_tag::Relation::Tag.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
