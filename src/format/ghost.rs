use super::{Formatter, Rendered};
use crate::diff::SchemaDiff;

/// Instructions for an online schema change tool. Not implemented yet:
/// always renders an empty instruction list.
pub struct GhostFormatter;

impl Formatter for GhostFormatter {
    fn format(&self, _diff: &SchemaDiff) -> Rendered {
        Rendered::Instructions(Vec::new())
    }
}
