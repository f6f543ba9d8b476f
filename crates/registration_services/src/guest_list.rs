use std::collections::HashSet;
use std::path::Path;

use checkin_core::Identifier;

use crate::types::StoreError;

/// Allow-list restricting which identifiers may ever be accepted.
#[derive(Debug, Clone, Default)]
pub struct GuestList {
    allowed: HashSet<Identifier>,
}

impl GuestList {
    /// Builds a guest list from already-validated identifiers.
    pub fn new(allowed: impl IntoIterator<Item = Identifier>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
        }
    }

    /// Parses one identifier per line. Blank lines and `#` comments are
    /// ignored; malformed entries are skipped with a warning.
    pub fn parse(text: &str) -> Self {
        let mut allowed = HashSet::new();
        for (line_no, line) in text.lines().enumerate() {
            let entry = line.trim();
            if entry.is_empty() || entry.starts_with('#') {
                continue;
            }
            match Identifier::parse(entry) {
                Ok(id) => {
                    allowed.insert(id);
                }
                Err(e) => log::warn!("Skipping guest list line {}: {}", line_no + 1, e),
            }
        }
        Self { allowed }
    }

    /// Reads a guest list file.
    pub async fn load(path: &Path) -> Result<Self, StoreError> {
        let text = tokio::fs::read_to_string(path).await?;
        let list = Self::parse(&text);
        log::info!(
            "📋 Loaded guest list {} with {} entries",
            path.display(),
            list.len()
        );
        Ok(list)
    }

    /// Whether `identifier` is on the list.
    pub fn contains(&self, identifier: &Identifier) -> bool {
        self.allowed.contains(identifier)
    }

    /// Number of allowed identifiers.
    pub fn len(&self) -> usize {
        self.allowed.len()
    }

    /// Whether the list allows nobody.
    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }
}
