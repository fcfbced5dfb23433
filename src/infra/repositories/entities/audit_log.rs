//! SeaORM entity for the `audit_logs` table.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "audit_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub actor_email: String,
    pub action: String,
    pub entity: String,
    pub entity_id: Option<String>,
    pub details: Option<Json>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::domain::AuditEntry {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            actor_email: model.actor_email,
            action: model.action,
            entity: model.entity,
            entity_id: model.entity_id,
            details: model.details,
            created_at: model.created_at,
        }
    }
}
