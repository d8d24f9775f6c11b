//! Child-set diffing by value equality
//!
//! Existing children come from the server, desired ones from a form; they
//! never share identity, so matching is done on natural-key fields through a
//! caller-supplied predicate.

/// Children to add and to delete
#[derive(Debug, Clone, PartialEq)]
pub struct ChildDiff<E, D> {
    /// Desired children with no matching existing child
    pub to_add: Vec<D>,

    /// Existing children with no matching desired child
    pub to_delete: Vec<E>,
}

impl<E, D> ChildDiff<E, D> {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_delete.is_empty()
    }
}

/// Compute the add-set and delete-set between `existing` and `desired`
///
/// Order of each input is preserved in its output set.
pub fn diff_children<E, D, F>(existing: &[E], desired: &[D], matches: F) -> ChildDiff<E, D>
where
    E: Clone,
    D: Clone,
    F: Fn(&E, &D) -> bool,
{
    let to_add = desired
        .iter()
        .filter(|d| !existing.iter().any(|e| matches(e, d)))
        .cloned()
        .collect();
    let to_delete = existing
        .iter()
        .filter(|e| !desired.iter().any(|d| matches(e, d)))
        .cloned()
        .collect();

    ChildDiff { to_add, to_delete }
}
