use serde::{Deserialize, Serialize};

/// A URI pointing at a produced or consumed asset (image, video).
pub type OutputUri = String;

/// Address of one record in the external record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRef {
    /// Base (workspace) identifier.
    pub base_id: String,
    /// Table id or display name.
    pub table: String,
    /// Record identifier within the table.
    pub record_id: String,
}

impl RecordRef {
    pub fn new(
        base_id: impl Into<String>,
        table: impl Into<String>,
        record_id: impl Into<String>,
    ) -> Self {
        Self {
            base_id: base_id.into(),
            table: table.into(),
            record_id: record_id.into(),
        }
    }
}

impl std::fmt::Display for RecordRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.base_id, self.table, self.record_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_components() {
        let r = RecordRef::new("appX", "Generations", "recY");
        assert_eq!(r.to_string(), "appX/Generations/recY");
    }
}
