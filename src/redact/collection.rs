use std::collections::HashSet;
use std::sync::Arc;

use super::Redactor;

/// Several redactors applied one after another as a single redactor.
///
/// Construction flattens nested collections and keeps only the first member
/// seen for each identity. Membership is fixed afterwards; member stores can
/// still grow.
#[derive(Clone, Default)]
pub struct RedactorCollection {
    members: Vec<Arc<dyn Redactor>>,
}

impl RedactorCollection {
    /// Collect `members` in order, splicing nested collections and skipping
    /// repeated identities.
    pub fn new<I>(members: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Redactor>>,
    {
        let mut collection = Self::default();
        let mut seen = HashSet::new();
        for member in members {
            collection.push_flattened(member, &mut seen);
        }
        collection
    }

    fn push_flattened(&mut self, member: Arc<dyn Redactor>, seen: &mut HashSet<String>) {
        if let Some(nested) = member.members() {
            for inner in nested {
                self.push_flattened(inner, seen);
            }
            return;
        }
        if seen.insert(member.id()) {
            self.members.push(member);
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl std::fmt::Debug for RedactorCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedactorCollection")
            .field("members", &self.len())
            .finish()
    }
}

impl Redactor for RedactorCollection {
    /// Feeds the output of each member into the next.
    fn redact_string(&self, input: &str) -> String {
        let mut result = input.to_string();
        for member in &self.members {
            result = member.redact_string(&result);
        }
        result
    }

    fn values(&self) -> Vec<String> {
        self.members.iter().flat_map(|m| m.values()).collect()
    }

    fn id(&self) -> String {
        self.members.iter().map(|m| m.id()).collect()
    }

    fn members(&self) -> Option<Vec<Arc<dyn Redactor>>> {
        Some(self.members.clone())
    }
}
