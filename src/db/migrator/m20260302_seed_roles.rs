use crate::constants::roles::{ADMIN_ROLE_ID, ADMIN_ROLE_NAME, DEFAULT_ROLE_ID, DEFAULT_ROLE_NAME};
use crate::entities::{prelude::*, roles};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let insert = Query::insert()
            .into_table(Roles)
            .columns([roles::Column::Id, roles::Column::Name])
            .values_panic([ADMIN_ROLE_ID.into(), ADMIN_ROLE_NAME.into()])
            .values_panic([DEFAULT_ROLE_ID.into(), DEFAULT_ROLE_NAME.into()])
            .on_conflict(OnConflict::column(roles::Column::Id).do_nothing().to_owned())
            .to_owned();

        manager.exec_stmt(insert).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let delete = Query::delete()
            .from_table(Roles)
            .and_where(Expr::col(roles::Column::Id).is_in([ADMIN_ROLE_ID, DEFAULT_ROLE_ID]))
            .to_owned();

        manager.exec_stmt(delete).await?;

        Ok(())
    }
}
