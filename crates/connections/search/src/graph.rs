//! Conflict graph over candidate groups.

/// A candidate group as the search sees it: board indices plus a score.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchCandidate {
    pub members: Vec<usize>,
    pub score: f64,
}

impl SearchCandidate {
    pub fn new(members: Vec<usize>, score: f64) -> Self {
        Self { members, score }
    }

    /// Word set as a bit mask, or `None` when a member is out of range or
    /// repeated.
    pub fn mask(&self, words: usize) -> Option<u128> {
        let mut mask = 0u128;
        for &index in &self.members {
            if index >= words || index >= 128 {
                return None;
            }
            let bit = 1u128 << index;
            if mask & bit != 0 {
                return None;
            }
            mask |= bit;
        }
        Some(mask)
    }
}

/// Two candidates conflict when their word sets intersect.
///
/// Every candidate conflicts with itself, so selecting one blocks it along
/// with its neighbours.
#[derive(Clone, Debug)]
pub struct ConflictGraph {
    masks: Vec<u128>,
    neighbours: Vec<Vec<usize>>,
}

impl ConflictGraph {
    pub fn build(masks: Vec<u128>) -> Self {
        let neighbours: Vec<Vec<usize>> = masks
            .iter()
            .map(|&a| (0..masks.len()).filter(|&j| a & masks[j] != 0).collect())
            .collect();
        Self { masks, neighbours }
    }

    pub fn len(&self) -> usize {
        self.masks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }

    pub fn mask(&self, candidate: usize) -> u128 {
        self.masks[candidate]
    }

    /// Candidates sharing at least one word with `candidate`, itself included.
    pub fn neighbours(&self, candidate: usize) -> &[usize] {
        &self.neighbours[candidate]
    }

    pub fn conflicts(&self, a: usize, b: usize) -> bool {
        self.masks[a] & self.masks[b] != 0
    }

    /// Number of conflict edges, self-loops excluded.
    pub fn edge_count(&self) -> usize {
        let loops = self.masks.iter().filter(|&&m| m != 0).count();
        (self.neighbours.iter().map(Vec::len).sum::<usize>() - loops) / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_reject_bad_members() {
        assert_eq!(SearchCandidate::new(vec![0, 3], 0.0).mask(4), Some(0b1001));
        assert_eq!(SearchCandidate::new(vec![0, 4], 0.0).mask(4), None);
        assert_eq!(SearchCandidate::new(vec![1, 1], 0.0).mask(4), None);
    }

    #[test]
    fn conflicts_are_symmetric_with_self_loops() {
        let graph = ConflictGraph::build(vec![0b0011, 0b0110, 0b1100]);
        assert!(graph.conflicts(0, 1));
        assert!(graph.conflicts(1, 0));
        assert!(!graph.conflicts(0, 2));
        assert_eq!(graph.neighbours(0), &[0, 1]);
        assert_eq!(graph.neighbours(1), &[0, 1, 2]);
        assert_eq!(graph.edge_count(), 2);
    }
}
