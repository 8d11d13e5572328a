use db_infra::ModelSchema;
use sea_orm::sea_query::TableCreateStatement;
use sea_orm::Schema;

use crate::entities::tasks;

/// Tables derived from the entity model, used when no migrations are registered.
pub struct EntitySchema;

impl ModelSchema for EntitySchema {
    fn create_tables(schema: &Schema) -> Vec<TableCreateStatement> {
        vec![schema.create_table_from_entity(tasks::Entity)]
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::DatabaseBackend;

    use super::*;

    #[test]
    fn task_table_has_every_column() {
        let backend = DatabaseBackend::Sqlite;
        let tables = EntitySchema::create_tables(&Schema::new(backend));
        assert_eq!(tables.len(), 1);

        let sql = backend.build(&tables[0]).sql;
        assert!(sql.contains("\"tasks\""), "{sql}");
        for column in ["id", "title", "description", "date", "status"] {
            assert!(sql.contains(&format!("\"{column}\"")), "missing {column}: {sql}");
        }
    }
}
