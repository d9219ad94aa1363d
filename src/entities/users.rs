use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique, column_type = "String(StringLen::N(150))")]
    pub username: String,

    /// Argon2id password hash
    #[sea_orm(column_type = "String(StringLen::N(255))")]
    pub password: String,

    #[sea_orm(column_type = "String(StringLen::N(100))")]
    pub name: String,

    #[sea_orm(column_type = "String(StringLen::N(100))")]
    pub surname: String,

    #[sea_orm(column_type = "Text")]
    pub bio: String,

    #[sea_orm(column_type = "String(StringLen::N(255))")]
    pub location: String,

    #[sea_orm(unique, column_type = "String(StringLen::N(254))")]
    pub email: String,

    #[sea_orm(column_type = "String(StringLen::N(20))")]
    pub phone: String,

    pub role_id: i32,

    /// Avatar; cleared when the image row is removed.
    pub image_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::roles::Entity",
        from = "Column::RoleId",
        to = "super::roles::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Role,

    #[sea_orm(
        belongs_to = "super::images::Entity",
        from = "Column::ImageId",
        to = "super::images::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Image,

    #[sea_orm(has_many = "super::user_data::Entity")]
    UserData,
}

impl Related<super::roles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Role.def()
    }
}

impl Related<super::images::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Image.def()
    }
}

impl Related<super::user_data::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserData.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
