use crate::diff::SchemaDiff;
use crate::format::Rendered;

/// Result of a diff operation.
#[derive(Debug, Clone)]
pub struct DiffResult {
    /// Differences in comparison order, migrations last
    pub diff: SchemaDiff,
    /// Output of the selected formatter
    pub output: Rendered,
}

impl DiffResult {
    /// Whether the two schemas are equivalent.
    pub fn is_empty(&self) -> bool {
        self.diff.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::{ObjectDiff, Side};
    use crate::model::Table;

    fn result(objects: Vec<ObjectDiff>) -> DiffResult {
        DiffResult {
            diff: SchemaDiff {
                from: Side::new("a", "127.0.0.1:3306"),
                to: Side::new("b", "127.0.0.1:3307"),
                objects,
            },
            output: Rendered::Text(String::new()),
        }
    }

    #[test]
    fn is_empty_follows_the_diff() {
        assert!(result(Vec::new()).is_empty());
        assert!(!result(vec![ObjectDiff::CreateTable(Table::new("tasks"))]).is_empty());
    }
}
