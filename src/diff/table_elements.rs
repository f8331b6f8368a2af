use super::{AlterClause, ColumnPosition};
use crate::model::{ForeignKey, Index, Table};

/// Ordered alter clauses turning `from` into `to`.
///
/// Every foreign-key clause whose supporting index changes as well is
/// emitted right after that index clause.
pub(super) fn diff_table(from: &Table, to: &Table) -> Vec<AlterClause> {
    let mut clauses = diff_columns(from, to);

    let (index_drops, index_adds) = diff_indexes(from, to);
    let (fk_drops, fk_adds) = diff_foreign_keys(from, to);
    clauses.extend(pair_foreign_keys(index_drops, index_adds, fk_drops, fk_adds));

    clauses.extend(diff_options(from, to));
    clauses
}

fn diff_columns(from: &Table, to: &Table) -> Vec<AlterClause> {
    let mut clauses = Vec::new();

    for column in &from.columns {
        if to.column(&column.name).is_none() {
            clauses.push(AlterClause::DropColumn {
                column: column.clone(),
            });
        }
    }

    for (position, column) in to.columns.iter().enumerate() {
        match from.column(&column.name) {
            Some(old) if old != column => clauses.push(AlterClause::ModifyColumn {
                old: old.clone(),
                new: column.clone(),
            }),
            Some(_) => {}
            None => clauses.push(AlterClause::AddColumn {
                column: column.clone(),
                position: column_position(to, position),
            }),
        }
    }

    clauses
}

fn column_position(table: &Table, position: usize) -> ColumnPosition {
    if position + 1 == table.columns.len() {
        ColumnPosition::Last
    } else if position == 0 {
        ColumnPosition::First
    } else {
        ColumnPosition::After(table.columns[position - 1].name.clone())
    }
}

/// Returns `(drops, adds)`. A redefined index shows up in both.
fn diff_indexes(from: &Table, to: &Table) -> (Vec<Index>, Vec<Index>) {
    let mut drops = Vec::new();
    let mut adds = Vec::new();

    match (&from.primary_key, &to.primary_key) {
        (None, Some(pk)) => adds.push(pk.clone()),
        (Some(pk), None) => drops.push(pk.clone()),
        (Some(from_pk), Some(to_pk)) if from_pk != to_pk => {
            drops.push(from_pk.clone());
            adds.push(to_pk.clone());
        }
        _ => {}
    }

    for index in &from.indexes {
        match to.index(&index.name) {
            Some(other) if other == index => {}
            _ => drops.push(index.clone()),
        }
    }

    for index in &to.indexes {
        match from.index(&index.name) {
            Some(other) if other == index => {}
            _ => adds.push(index.clone()),
        }
    }

    (drops, adds)
}

fn diff_foreign_keys(from: &Table, to: &Table) -> (Vec<ForeignKey>, Vec<ForeignKey>) {
    let find = |table: &Table, name: &str| {
        table
            .foreign_keys
            .iter()
            .find(|fk| fk.name == name)
            .cloned()
    };

    let drops = from
        .foreign_keys
        .iter()
        .filter(|fk| find(to, &fk.name).as_ref() != Some(*fk))
        .cloned()
        .collect();

    let adds = to
        .foreign_keys
        .iter()
        .filter(|fk| find(from, &fk.name).as_ref() != Some(*fk))
        .cloned()
        .collect();

    (drops, adds)
}

fn supports(index: &Index, foreign_key: &ForeignKey) -> bool {
    !index.primary && (index.name == foreign_key.name || index.covers(&foreign_key.columns))
}

fn pair_foreign_keys(
    mut index_drops: Vec<Index>,
    mut index_adds: Vec<Index>,
    fk_drops: Vec<ForeignKey>,
    fk_adds: Vec<ForeignKey>,
) -> Vec<AlterClause> {
    let mut fk_clauses = Vec::new();

    for foreign_key in fk_drops {
        if let Some(pos) = index_drops.iter().position(|i| supports(i, &foreign_key)) {
            fk_clauses.push(AlterClause::DropIndex {
                index: index_drops.remove(pos),
            });
        }
        fk_clauses.push(AlterClause::DropForeignKey { foreign_key });
    }

    for foreign_key in fk_adds {
        if let Some(pos) = index_adds.iter().position(|i| supports(i, &foreign_key)) {
            fk_clauses.push(AlterClause::AddIndex {
                index: index_adds.remove(pos),
            });
        }
        fk_clauses.push(AlterClause::AddForeignKey { foreign_key });
    }

    index_drops
        .into_iter()
        .map(|index| AlterClause::DropIndex { index })
        .chain(index_adds.into_iter().map(|index| AlterClause::AddIndex { index }))
        .chain(fk_clauses)
        .collect()
}

fn diff_options(from: &Table, to: &Table) -> Vec<AlterClause> {
    let mut clauses = Vec::new();

    if from.auto_increment != to.auto_increment {
        clauses.push(AlterClause::ChangeAutoIncrement {
            old: from.auto_increment,
            new: to.auto_increment,
        });
    }

    if from.charset != to.charset || from.collation != to.collation {
        clauses.push(AlterClause::ChangeCharset {
            charset: to.charset.clone(),
            collation: to.collation.clone(),
        });
    }

    if !from.create_options.eq_ignore_ascii_case(&to.create_options) {
        clauses.push(AlterClause::ChangeCreateOptions {
            old: from.create_options.clone(),
            new: to.create_options.clone(),
        });
    }

    if from.comment != to.comment {
        clauses.push(AlterClause::ChangeComment {
            comment: to.comment.clone(),
        });
    }

    if !from.engine.eq_ignore_ascii_case(&to.engine) {
        clauses.push(AlterClause::ChangeStorageEngine {
            engine: to.engine.clone(),
        });
    }

    clauses
}
