use std::collections::VecDeque;

/// Most recently used candidate indices for one rule, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecentPicks {
    indices: VecDeque<usize>,
}

impl RecentPicks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }

    /// Append a pick, then drop the oldest entries until at most `bound`
    /// remain.
    pub fn record(&mut self, index: usize, bound: usize) {
        self.indices.push_back(index);
        while self.indices.len() > bound {
            self.indices.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.indices.clear();
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn to_vec(&self) -> Vec<usize> {
        self.indices.iter().copied().collect()
    }
}

impl FromIterator<usize> for RecentPicks {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self {
            indices: iter.into_iter().collect(),
        }
    }
}
