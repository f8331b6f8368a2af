use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Structural content of one MySQL schema (database).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Schema {
    pub name: String,
    pub charset: String,
    pub collation: String,
    pub tables: BTreeMap<String, Table>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Table {
    pub name: String,
    /// Columns in ordinal position order.
    pub columns: Vec<Column>,
    pub primary_key: Option<Index>,
    /// Secondary indexes, sorted by name.
    pub indexes: Vec<Index>,
    /// Sorted by name.
    pub foreign_keys: Vec<ForeignKey>,
    pub engine: String,
    pub charset: String,
    pub collation: String,
    /// Next AUTO_INCREMENT value, if the table has an auto-increment column.
    pub auto_increment: Option<u64>,
    /// Raw `CREATE_OPTIONS` such as `row_format=COMPRESSED`.
    pub create_options: String,
    pub comment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    /// Full column type as reported by the server, e.g. `bigint(20) unsigned`.
    pub column_type: String,
    pub nullable: bool,
    /// Default already rendered as SQL (`'0'`, `CURRENT_TIMESTAMP`, ...).
    pub default: Option<String>,
    pub auto_increment: bool,
    pub on_update: Option<String>,
    /// Only set when it differs from the table default.
    pub charset: Option<String>,
    /// Only set when it differs from the table default.
    pub collation: Option<String>,
    pub comment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct Index {
    pub name: String,
    pub columns: Vec<IndexColumn>,
    pub primary: bool,
    pub unique: bool,
    pub comment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct IndexColumn {
    pub name: String,
    /// Prefix length for partial indexes on string columns.
    pub sub_part: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct ForeignKey {
    pub name: String,
    pub columns: Vec<String>,
    /// Set only when the referenced table lives in another schema.
    pub referenced_schema: Option<String>,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
    pub update_rule: String,
    pub delete_rule: String,
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Schema {
            name: name.into(),
            charset: String::new(),
            collation: String::new(),
            tables: BTreeMap::new(),
        }
    }
}

impl Table {
    /// An empty InnoDB table, handy for building snapshots by hand.
    pub fn new(name: impl Into<String>) -> Self {
        Table {
            name: name.into(),
            columns: Vec::new(),
            primary_key: None,
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
            engine: "InnoDB".to_string(),
            charset: "latin1".to_string(),
            collation: "latin1_swedish_ci".to_string(),
            auto_increment: None,
            create_options: String::new(),
            comment: String::new(),
        }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn index(&self, name: &str) -> Option<&Index> {
        self.indexes.iter().find(|i| i.name == name)
    }
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: impl Into<String>) -> Self {
        Column {
            name: name.into(),
            column_type: column_type.into(),
            nullable: true,
            default: None,
            auto_increment: false,
            on_update: None,
            charset: None,
            collation: None,
            comment: String::new(),
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    pub fn default_value(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// BLOB, TEXT, JSON and spatial columns cannot carry a literal default.
    pub fn allows_default(&self) -> bool {
        let base = self
            .column_type
            .split(['(', ' '])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        !(base.ends_with("blob")
            || base.ends_with("text")
            || base == "json"
            || base == "geometry"
            || base == "point"
            || base == "linestring"
            || base == "polygon")
    }
}

impl Index {
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Index {
            name: name.into(),
            columns: columns
                .into_iter()
                .map(|c| IndexColumn {
                    name: c.into(),
                    sub_part: None,
                })
                .collect(),
            primary: false,
            unique: false,
            comment: String::new(),
        }
    }

    pub fn primary<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Index {
            primary: true,
            unique: true,
            ..Index::new("PRIMARY", columns)
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Whether this index can back a foreign key on `columns`, i.e. the
    /// constraint columns form a leftmost prefix of the index.
    pub fn covers(&self, columns: &[String]) -> bool {
        !columns.is_empty()
            && self.columns.len() >= columns.len()
            && self
                .columns
                .iter()
                .zip(columns)
                .all(|(ic, c)| ic.name == *c && ic.sub_part.is_none())
    }
}

impl ForeignKey {
    pub fn new(
        name: impl Into<String>,
        columns: &[&str],
        referenced_table: impl Into<String>,
        referenced_columns: &[&str],
    ) -> Self {
        ForeignKey {
            name: name.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            referenced_schema: None,
            referenced_table: referenced_table.into(),
            referenced_columns: referenced_columns.iter().map(|c| c.to_string()).collect(),
            update_rule: "RESTRICT".to_string(),
            delete_rule: "RESTRICT".to_string(),
        }
    }
}
