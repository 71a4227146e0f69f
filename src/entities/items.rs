use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub name: String,

    #[sea_orm(column_name = "type", indexed)]
    pub item_type: String,

    #[sea_orm(indexed)]
    pub serial_number: String,

    pub condition: String,

    /// One of `Available`, `Checked Out`, `Under Repair`, `Retired`
    #[sea_orm(indexed)]
    pub status: String,

    pub location: String,

    pub photo_url: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::requests::Entity")]
    Requests,
}

impl Related<super::requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Requests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
