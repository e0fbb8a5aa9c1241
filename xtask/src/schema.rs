// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend-neutral view of a migrated schema, used to check that the
//! `SQLite` and `MySQL` migration sets describe the same ledger tables.
//!
//! Column types are reduced to a few families (`integer`, `text`, `real`,
//! `blob`). Amounts and dates are text on both backends, so a family
//! mismatch always points at a migration bug.

use std::collections::{BTreeMap, BTreeSet};

use color_eyre::{Result, eyre::Context};
use diesel::sql_types::{Integer, Text};
use diesel::{MysqlConnection, QueryableByName, RunQueryDsl, SqliteConnection};

/// Table name diesel uses for its own bookkeeping.
const MIGRATIONS_TABLE: &str = "__diesel_schema_migrations";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    tables: BTreeMap<String, Table>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Table {
    /// Column name to (type family, nullable).
    columns: BTreeMap<String, (String, bool)>,
    primary_key: BTreeSet<String>,
    foreign_keys: BTreeSet<ForeignKey>,
    unique: BTreeSet<Vec<String>>,
    /// Non-unique indexes by column list; names differ between backends.
    indexes: BTreeSet<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ForeignKey {
    column: String,
    references: String,
}

impl ForeignKey {
    fn new(column: String, table: &str, target: &str) -> Self {
        Self {
            column,
            references: format!("{table}({target})"),
        }
    }
}

impl std::fmt::Display for ForeignKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.column, self.references)
    }
}

impl Schema {
    /// Reads the schema of a migrated `SQLite` database.
    ///
    /// # Errors
    ///
    /// Returns an error if a catalog query fails.
    pub fn from_sqlite(conn: &mut SqliteConnection) -> Result<Self> {
        #[derive(QueryableByName)]
        struct TableRow {
            #[diesel(sql_type = Text)]
            name: String,
        }

        #[derive(QueryableByName)]
        struct ColumnRow {
            #[diesel(sql_type = Text)]
            name: String,
            #[diesel(sql_type = Text)]
            r#type: String,
            #[diesel(sql_type = Integer)]
            notnull: i32,
            #[diesel(sql_type = Integer)]
            pk: i32,
        }

        #[derive(QueryableByName)]
        struct ForeignKeyRow {
            #[diesel(sql_type = Text)]
            table: String,
            #[diesel(sql_type = Text)]
            from: String,
            #[diesel(sql_type = Text)]
            to: String,
        }

        #[derive(QueryableByName)]
        struct IndexRow {
            #[diesel(sql_type = Text)]
            name: String,
            #[diesel(sql_type = Integer)]
            unique: i32,
            #[diesel(sql_type = Text)]
            origin: String,
        }

        #[derive(QueryableByName)]
        struct IndexColumnRow {
            #[diesel(sql_type = Text)]
            name: String,
        }

        let names: Vec<TableRow> = diesel::sql_query(format!(
            "SELECT name FROM sqlite_master WHERE type = 'table' \
             AND name NOT LIKE 'sqlite_%' AND name != '{MIGRATIONS_TABLE}' ORDER BY name"
        ))
        .load(conn)
        .wrap_err("Failed to list SQLite tables")?;

        let mut schema: Self = Self::default();
        for TableRow { name } in names {
            let mut table: Table = Table::default();

            let columns: Vec<ColumnRow> = diesel::sql_query(format!("PRAGMA table_info({name})"))
                .load(conn)
                .wrap_err_with(|| format!("Failed to read columns of {name}"))?;
            for column in columns {
                if column.pk > 0 {
                    table.primary_key.insert(column.name.clone());
                }
                // SQLite reports INTEGER PRIMARY KEY columns as nullable.
                let nullable: bool = column.notnull == 0 && column.pk == 0;
                table
                    .columns
                    .insert(column.name, (sqlite_family(&column.r#type), nullable));
            }

            let foreign_keys: Vec<ForeignKeyRow> =
                diesel::sql_query(format!("PRAGMA foreign_key_list({name})"))
                    .load(conn)
                    .wrap_err_with(|| format!("Failed to read foreign keys of {name}"))?;
            table.foreign_keys = foreign_keys
                .into_iter()
                .map(|fk| ForeignKey::new(fk.from, &fk.table, &fk.to))
                .collect();

            let indexes: Vec<IndexRow> = diesel::sql_query(format!("PRAGMA index_list({name})"))
                .load(conn)
                .wrap_err_with(|| format!("Failed to read indexes of {name}"))?;
            for index in indexes {
                // Primary keys are compared separately.
                if index.origin == "pk" {
                    continue;
                }
                let columns: Vec<IndexColumnRow> =
                    diesel::sql_query(format!("PRAGMA index_info({})", index.name))
                        .load(conn)
                        .wrap_err_with(|| format!("Failed to read columns of index {}", index.name))?;
                let columns: Vec<String> = columns.into_iter().map(|c| c.name).collect();
                if index.unique == 1 {
                    table.unique.insert(columns);
                } else {
                    table.indexes.insert(columns);
                }
            }

            schema.tables.insert(name, table);
        }
        Ok(schema)
    }

    /// Reads the schema of a migrated `MySQL` database.
    ///
    /// # Errors
    ///
    /// Returns an error if a catalog query fails.
    pub fn from_mysql(conn: &mut MysqlConnection, database: &str) -> Result<Self> {
        #[derive(QueryableByName)]
        struct TableRow {
            #[diesel(sql_type = Text)]
            table_name: String,
        }

        #[derive(QueryableByName)]
        struct ColumnRow {
            #[diesel(sql_type = Text)]
            column_name: String,
            #[diesel(sql_type = Text)]
            data_type: String,
            #[diesel(sql_type = Text)]
            is_nullable: String,
            #[diesel(sql_type = Text)]
            column_key: String,
        }

        #[derive(QueryableByName)]
        #[allow(clippy::struct_field_names)]
        struct ForeignKeyRow {
            #[diesel(sql_type = Text)]
            column_name: String,
            #[diesel(sql_type = Text)]
            referenced_table_name: String,
            #[diesel(sql_type = Text)]
            referenced_column_name: String,
        }

        #[derive(QueryableByName)]
        struct IndexRow {
            #[diesel(sql_type = Text)]
            index_name: String,
            #[diesel(sql_type = Text)]
            column_name: String,
            #[diesel(sql_type = Integer)]
            non_unique: i32,
        }

        let names: Vec<TableRow> = diesel::sql_query(
            "SELECT table_name FROM information_schema.tables \
             WHERE table_schema = ? AND table_name != ? ORDER BY table_name",
        )
        .bind::<Text, _>(database)
        .bind::<Text, _>(MIGRATIONS_TABLE)
        .load(conn)
        .wrap_err("Failed to list MySQL tables")?;

        let mut schema: Self = Self::default();
        for TableRow { table_name: name } in names {
            let mut table: Table = Table::default();

            let columns: Vec<ColumnRow> = diesel::sql_query(
                "SELECT column_name, data_type, is_nullable, column_key \
                 FROM information_schema.columns \
                 WHERE table_schema = ? AND table_name = ? ORDER BY ordinal_position",
            )
            .bind::<Text, _>(database)
            .bind::<Text, _>(&name)
            .load(conn)
            .wrap_err_with(|| format!("Failed to read columns of {name}"))?;
            for column in columns {
                if column.column_key == "PRI" {
                    table.primary_key.insert(column.column_name.clone());
                }
                table.columns.insert(
                    column.column_name,
                    (mysql_family(&column.data_type), column.is_nullable == "YES"),
                );
            }

            let foreign_keys: Vec<ForeignKeyRow> = diesel::sql_query(
                "SELECT column_name, referenced_table_name, referenced_column_name \
                 FROM information_schema.key_column_usage \
                 WHERE table_schema = ? AND table_name = ? AND referenced_table_name IS NOT NULL",
            )
            .bind::<Text, _>(database)
            .bind::<Text, _>(&name)
            .load(conn)
            .wrap_err_with(|| format!("Failed to read foreign keys of {name}"))?;
            table.foreign_keys = foreign_keys
                .into_iter()
                .map(|fk| {
                    ForeignKey::new(
                        fk.column_name,
                        &fk.referenced_table_name,
                        &fk.referenced_column_name,
                    )
                })
                .collect();

            let rows: Vec<IndexRow> = diesel::sql_query(
                "SELECT index_name, column_name, non_unique FROM information_schema.statistics \
                 WHERE table_schema = ? AND table_name = ? AND index_name != 'PRIMARY' \
                 ORDER BY index_name, seq_in_index",
            )
            .bind::<Text, _>(database)
            .bind::<Text, _>(&name)
            .load(conn)
            .wrap_err_with(|| format!("Failed to read indexes of {name}"))?;
            let mut grouped: BTreeMap<String, (bool, Vec<String>)> = BTreeMap::new();
            for row in rows {
                grouped
                    .entry(row.index_name)
                    .or_insert_with(|| (row.non_unique == 0, Vec::new()))
                    .1
                    .push(row.column_name);
            }
            for (unique, columns) in grouped.into_values() {
                if unique {
                    table.unique.insert(columns);
                } else {
                    table.indexes.insert(columns);
                }
            }

            schema.tables.insert(name, table);
        }
        Ok(schema)
    }

    /// Describes every way `mysql` departs from `self`, read as the `SQLite`
    /// schema. An empty list means the schemas match.
    ///
    /// `InnoDB` indexes every foreign key column, so extra single-column
    /// indexes on foreign keys are accepted on the `MySQL` side.
    pub fn differences(&self, mysql: &Self) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();

        for name in self.tables.keys().filter(|n| !mysql.tables.contains_key(*n)) {
            found.push(format!("table '{name}' exists in SQLite but not in MySQL"));
        }
        for name in mysql.tables.keys().filter(|n| !self.tables.contains_key(*n)) {
            found.push(format!("table '{name}' exists in MySQL but not in SQLite"));
        }

        for (name, sqlite) in &self.tables {
            if let Some(other) = mysql.tables.get(name) {
                sqlite.compare(name, other, &mut found);
            }
        }
        found
    }
}

impl Table {
    fn compare(&self, name: &str, mysql: &Self, found: &mut Vec<String>) {
        for (column, sqlite_shape) in &self.columns {
            match mysql.columns.get(column) {
                None => found.push(format!("{name}.{column} is missing in MySQL")),
                Some(mysql_shape) if mysql_shape != sqlite_shape => found.push(format!(
                    "{name}.{column}: SQLite {} (nullable {}) vs MySQL {} (nullable {})",
                    sqlite_shape.0, sqlite_shape.1, mysql_shape.0, mysql_shape.1
                )),
                Some(_) => {}
            }
        }
        for column in mysql.columns.keys().filter(|c| !self.columns.contains_key(*c)) {
            found.push(format!("{name}.{column} is missing in SQLite"));
        }

        if self.primary_key != mysql.primary_key {
            found.push(format!(
                "{name}: primary key {:?} vs {:?}",
                self.primary_key, mysql.primary_key
            ));
        }
        for fk in self.foreign_keys.symmetric_difference(&mysql.foreign_keys) {
            let side: &str = if self.foreign_keys.contains(fk) {
                "SQLite"
            } else {
                "MySQL"
            };
            found.push(format!("{name}: foreign key {fk} only in {side}"));
        }
        for columns in self.unique.symmetric_difference(&mysql.unique) {
            let side: &str = if self.unique.contains(columns) {
                "SQLite"
            } else {
                "MySQL"
            };
            found.push(format!("{name}: unique {columns:?} only in {side}"));
        }

        for columns in self.indexes.difference(&mysql.indexes) {
            found.push(format!("{name}: index {columns:?} missing in MySQL"));
        }
        for columns in mysql.indexes.difference(&self.indexes) {
            let foreign_key_index: bool = matches!(columns.as_slice(), [column]
                if mysql.foreign_keys.iter().any(|fk| &fk.column == column));
            if !foreign_key_index {
                found.push(format!("{name}: index {columns:?} only in MySQL"));
            }
        }
    }
}

/// Type family of a declared `SQLite` column type, by affinity rules.
fn sqlite_family(declared: &str) -> String {
    let upper: String = declared.to_uppercase();
    let family: &str = if upper.contains("INT") {
        "integer"
    } else if upper.contains("REAL") || upper.contains("FLOA") || upper.contains("DOUB") {
        "real"
    } else if upper.contains("BLOB") {
        "blob"
    } else {
        "text"
    };
    family.to_string()
}

/// Type family of a `MySQL` `data_type`.
fn mysql_family(data_type: &str) -> String {
    let family: &str = match data_type.to_uppercase().as_str() {
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => "integer",
        "DECIMAL" | "NUMERIC" | "FLOAT" | "DOUBLE" | "REAL" => "real",
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => "blob",
        _ => "text",
    };
    family.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn journals() -> Table {
        let mut table: Table = Table::default();
        table
            .columns
            .insert(String::from("journal_id"), (String::from("integer"), false));
        table
            .columns
            .insert(String::from("collector_id"), (String::from("integer"), false));
        table
            .columns
            .insert(String::from("journal_date"), (String::from("text"), false));
        table.primary_key.insert(String::from("journal_id"));
        table.foreign_keys.insert(ForeignKey::new(
            String::from("collector_id"),
            "collectors",
            "collector_id",
        ));
        table
            .unique
            .insert(vec![String::from("collector_id"), String::from("journal_date")]);
        table
    }

    fn schema_of(table: Table) -> Schema {
        let mut schema: Schema = Schema::default();
        schema.tables.insert(String::from("journals"), table);
        schema
    }

    #[test]
    fn test_type_families_agree_across_backends() {
        assert_eq!(sqlite_family("INTEGER"), mysql_family("bigint"));
        assert_eq!(sqlite_family("TEXT"), mysql_family("varchar"));
        assert_eq!(sqlite_family("TEXT"), mysql_family("longtext"));
        assert_ne!(sqlite_family("TEXT"), mysql_family("decimal"));
    }

    #[test]
    fn test_identical_schemas_have_no_differences() {
        assert!(schema_of(journals()).differences(&schema_of(journals())).is_empty());
    }

    #[test]
    fn test_foreign_key_index_is_tolerated_in_mysql() {
        let mut mysql: Table = journals();
        mysql.indexes.insert(vec![String::from("collector_id")]);

        assert!(schema_of(journals()).differences(&schema_of(mysql)).is_empty());
    }

    #[test]
    fn test_every_difference_is_reported() {
        let mut mysql: Table = journals();
        mysql
            .columns
            .insert(String::from("journal_date"), (String::from("text"), true));
        mysql.unique.clear();
        mysql.indexes.insert(vec![String::from("journal_date")]);

        let found: Vec<String> = schema_of(journals()).differences(&schema_of(mysql));

        assert_eq!(found.len(), 3, "{found:?}");
    }

    #[test]
    fn test_missing_table_is_reported() {
        let found: Vec<String> = schema_of(journals()).differences(&Schema::default());
        assert_eq!(
            found,
            vec![String::from("table 'journals' exists in SQLite but not in MySQL")]
        );
    }
}
