use graphicone_models::db::open_db_in_memory;
use graphicone_models::schema::catalog::{self, ALL_TABLES};
use graphicone_models::schema::TableDef;
use rusqlite::Connection;

struct ColumnInfo {
    name: String,
    declared_type: String,
    not_null: bool,
    has_default: bool,
    pk_position: usize,
}

struct ForeignKeyInfo {
    parent_table: String,
    from: String,
    to: String,
    on_update: String,
    on_delete: String,
}

#[test]
fn catalog_columns_match_created_tables() {
    let conn = open_db_in_memory().unwrap();

    for table in ALL_TABLES {
        let columns = table_info(&conn, table.name);
        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, table.column_names(), "column order of {}", table.name);

        for (info, def) in columns.iter().zip(table.columns) {
            let context = format!("{}.{}", table.name, def.name);
            assert_eq!(
                info.declared_type,
                def.column_type.declared_type(),
                "{context} type"
            );
            assert_eq!(info.not_null, !def.nullable, "{context} nullability");
            assert_eq!(
                info.has_default,
                def.default.is_some_and(|d| d.is_declared_in_sql()),
                "{context} default"
            );
            let expected_pk = table
                .primary_key
                .iter()
                .position(|name| *name == def.name)
                .map_or(0, |index| index + 1);
            assert_eq!(info.pk_position, expected_pk, "{context} primary key");
        }
    }
}

#[test]
fn catalog_foreign_keys_match_created_tables() {
    let conn = open_db_in_memory().unwrap();

    for table in ALL_TABLES {
        let mut actual: Vec<(String, String, String, String, String)> =
            foreign_key_list(&conn, table.name)
                .into_iter()
                .map(|fk| (fk.from, fk.parent_table, fk.to, fk.on_delete, fk.on_update))
                .collect();
        let mut expected: Vec<(String, String, String, String, String)> = table
            .foreign_keys
            .iter()
            .map(|fk| {
                (
                    fk.column.to_string(),
                    fk.parent_table.to_string(),
                    fk.parent_column.to_string(),
                    fk.on_delete.as_sql().to_string(),
                    fk.on_update.as_sql().to_string(),
                )
            })
            .collect();
        actual.sort();
        expected.sort();
        assert_eq!(actual, expected, "foreign keys of {}", table.name);
    }
}

#[test]
fn json_defaults_initialize_empty_containers() {
    let conn = open_db_in_memory().unwrap();
    let defaults = [
        (&catalog::ACCOUNT, "interests", "'{}'"),
        (&catalog::BOARD, "members", "'[]'"),
        (&catalog::GRAPH, "shifts", "'[]'"),
        (&catalog::EXPOSED_EQUITY_FIELDS, "fields", "'{}'"),
        (&catalog::PUSH_NOTIFICATION_TYPES, "allowed_days", "'[]'"),
    ];

    for (table, column, literal) in defaults {
        assert_eq!(declared_default(&conn, table, column), Some(literal.to_string()));
    }
}

#[test]
fn pc_arguments_reference_a_unique_discussion_name() {
    let conn = open_db_in_memory().unwrap();
    let unique_on_name: i64 = conn
        .query_row(
            "SELECT COUNT(*)
             FROM pragma_index_list('pros_and_cons') AS idx
             JOIN pragma_index_info(idx.name) AS info
             WHERE idx.\"unique\" = 1 AND info.name = 'name';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(unique_on_name, 1);
}

fn table_info(conn: &Connection, table: &str) -> Vec<ColumnInfo> {
    let mut stmt = conn
        .prepare("SELECT name, type, \"notnull\", dflt_value, pk FROM pragma_table_info(?1);")
        .unwrap();
    stmt.query_map([table], |row| {
        Ok(ColumnInfo {
            name: row.get(0)?,
            declared_type: row.get(1)?,
            not_null: row.get::<_, i64>(2)? == 1,
            has_default: row.get::<_, Option<String>>(3)?.is_some(),
            pk_position: row.get::<_, i64>(4)? as usize,
        })
    })
    .unwrap()
    .collect::<Result<_, _>>()
    .unwrap()
}

fn foreign_key_list(conn: &Connection, table: &str) -> Vec<ForeignKeyInfo> {
    let mut stmt = conn
        .prepare(
            "SELECT \"table\", \"from\", \"to\", on_update, on_delete
             FROM pragma_foreign_key_list(?1);",
        )
        .unwrap();
    stmt.query_map([table], |row| {
        Ok(ForeignKeyInfo {
            parent_table: row.get(0)?,
            from: row.get(1)?,
            to: row.get(2)?,
            on_update: row.get(3)?,
            on_delete: row.get(4)?,
        })
    })
    .unwrap()
    .collect::<Result<_, _>>()
    .unwrap()
}

fn declared_default(conn: &Connection, table: &TableDef, column: &str) -> Option<String> {
    conn.query_row(
        "SELECT dflt_value FROM pragma_table_info(?1) WHERE name = ?2;",
        [table.name, column],
        |row| row.get(0),
    )
    .unwrap()
}
