/// The answer values captured by one answer format.
///
/// An empty state means "unanswered". Select formats hold one entry per
/// selected option, text formats hold the single entered string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerState {
    values: Vec<String>,
}

impl AnswerState {
    /// Create an empty (unanswered) state.
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Create a state holding exactly one value.
    pub fn single(value: impl Into<String>) -> Self {
        Self {
            values: vec![value.into()],
        }
    }

    /// Get the values in order.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Check if nothing has been answered yet.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get the number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the state contains the given value.
    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    /// Replace the whole state with a single value.
    pub fn set_single(&mut self, value: impl Into<String>) {
        self.values.clear();
        self.values.push(value.into());
    }

    /// Insert `value` if absent, remove it if present.
    ///
    /// `order` is the canonical ordering of all possible values; inserted
    /// values keep their position relative to it, so the state never depends
    /// on the order of the clicks that produced it. Values not found in
    /// `order` are appended. Returns `true` if the value is now selected.
    pub fn toggle(&mut self, value: &str, order: &[String]) -> bool {
        if let Some(pos) = self.values.iter().position(|v| v == value) {
            self.values.remove(pos);
            return false;
        }

        let rank = |v: &str| order.iter().position(|o| o == v).unwrap_or(usize::MAX);
        let new_rank = rank(value);
        let insert_at = self
            .values
            .iter()
            .position(|existing| rank(existing) > new_rank)
            .unwrap_or(self.values.len());
        self.values.insert(insert_at, value.to_string());
        true
    }

    /// Join the values with a separator.
    pub fn join(&self, separator: &str) -> String {
        self.values.join(separator)
    }
}

impl From<Vec<String>> for AnswerState {
    fn from(values: Vec<String>) -> Self {
        Self { values }
    }
}

impl<'a> IntoIterator for &'a AnswerState {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
