use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum StateVectorError {
    #[error("site index {index} out of range ({len} sites)")]
    SiteIndexOutOfRange { index: usize, len: usize },

    #[error("instance index {instance} out of range for site {site} ({count} instances)")]
    InstanceOutOfRange {
        site: usize,
        instance: usize,
        count: usize,
    },
}

/// A mixed-radix counter over an ordered sequence of sites.
///
/// Each element selects one instance of its site, so element `i` is
/// always in `[0, counts[i])`. The vector supports two exhaustive
/// traversals: the full space ([`reset`]/[`increment`]) and a restricted
/// subspace ([`define_substate`] followed by [`reset_substate`]/
/// [`increment_substate`]) in which only the declared "free" sites move
/// and every other site keeps its current value.
///
/// Increment is an odometer step: the last free digit (in declaration
/// order) is the least significant; a digit that overflows its site's
/// instance count resets to zero and carries into the previously declared
/// digit. The final `false` from an increment leaves the free digits back
/// at all zeros, so callers must consume each state before incrementing.
///
/// [`reset`]: StateVector::reset
/// [`increment`]: StateVector::increment
/// [`define_substate`]: StateVector::define_substate
/// [`reset_substate`]: StateVector::reset_substate
/// [`increment_substate`]: StateVector::increment_substate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateVector {
    values: Vec<usize>,
    counts: Vec<usize>,
    free: Vec<usize>,
}

impl StateVector {
    /// Creates a vector with the given instance count per site, with
    /// every site at its first instance and no substate defined.
    ///
    /// Counts must be at least 1; a site with no instances cannot be
    /// represented.
    pub fn new(counts: Vec<usize>) -> Self {
        debug_assert!(counts.iter().all(|&c| c >= 1));
        Self {
            values: vec![0; counts.len()],
            counts,
            free: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The current instance index of every site, in site order.
    pub fn as_slice(&self) -> &[usize] {
        &self.values
    }

    /// Instance count (radix) of one site.
    pub fn site_count(&self, site: usize) -> Result<usize, StateVectorError> {
        self.counts
            .get(site)
            .copied()
            .ok_or(StateVectorError::SiteIndexOutOfRange {
                index: site,
                len: self.counts.len(),
            })
    }

    pub fn get(&self, site: usize) -> Result<usize, StateVectorError> {
        self.values
            .get(site)
            .copied()
            .ok_or(StateVectorError::SiteIndexOutOfRange {
                index: site,
                len: self.values.len(),
            })
    }

    pub fn set(&mut self, site: usize, instance: usize) -> Result<(), StateVectorError> {
        let count = self.site_count(site)?;
        if instance >= count {
            return Err(StateVectorError::InstanceOutOfRange {
                site,
                instance,
                count,
            });
        }
        self.values[site] = instance;
        Ok(())
    }

    /// Declares exactly the given site indices as free for restricted
    /// enumeration, replacing any previous declaration. Declaration order
    /// is significant: it fixes digit significance and therefore the
    /// lexicographic order of downstream instance tuples.
    ///
    /// Duplicates are kept as given; they make the counter revisit
    /// combinations, which is almost never what a caller wants.
    pub fn define_substate(&mut self, sites: &[usize]) -> Result<(), StateVectorError> {
        for &site in sites {
            if site >= self.values.len() {
                return Err(StateVectorError::SiteIndexOutOfRange {
                    index: site,
                    len: self.values.len(),
                });
            }
        }
        let mut seen = std::collections::HashSet::new();
        if !sites.iter().all(|site| seen.insert(site)) {
            warn!(
                "substate declaration contains duplicate site indices: {:?}",
                sites
            );
        }
        self.free = sites.to_vec();
        Ok(())
    }

    /// Removes the restriction; subsequent substate operations act on an
    /// empty free set until a new one is declared.
    pub fn clear_substate(&mut self) {
        self.free.clear();
    }

    /// The declared free site indices, in declaration order.
    pub fn substate_sites(&self) -> &[usize] {
        &self.free
    }

    /// Sets every free site to its first instance; frozen sites keep
    /// their values. Must run before the first increment of a pass.
    pub fn reset_substate(&mut self) {
        for &site in &self.free {
            self.values[site] = 0;
        }
    }

    /// Advances the restricted counter by one step. Returns `false` once
    /// the free subspace has wrapped back to all zeros.
    pub fn increment_substate(&mut self) -> bool {
        for &site in self.free.iter().rev() {
            if self.values[site] + 1 < self.counts[site] {
                self.values[site] += 1;
                return true;
            }
            self.values[site] = 0;
        }
        false
    }

    /// Sets every site to its first instance.
    pub fn reset(&mut self) {
        self.values.iter_mut().for_each(|v| *v = 0);
    }

    /// Advances the full-space counter by one step, treating every site
    /// as free with the last site least significant.
    pub fn increment(&mut self) -> bool {
        for site in (0..self.values.len()).rev() {
            if self.values[site] + 1 < self.counts[site] {
                self.values[site] += 1;
                return true;
            }
            self.values[site] = 0;
        }
        false
    }

    /// Number of distinct full-space states (saturating).
    pub fn state_space_size(&self) -> u64 {
        self.counts
            .iter()
            .fold(1u64, |acc, &c| acc.saturating_mul(c as u64))
    }

    /// Number of distinct restricted states: the product of instance
    /// counts over the free sites (saturating). One, when no site is free.
    pub fn substate_space_size(&self) -> u64 {
        self.free
            .iter()
            .fold(1u64, |acc, &site| acc.saturating_mul(self.counts[site] as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_vector_starts_at_all_zeros() {
        let vector = StateVector::new(vec![2, 3, 2]);
        assert_eq!(vector.as_slice(), &[0, 0, 0]);
        assert_eq!(vector.len(), 3);
        assert_eq!(vector.state_space_size(), 12);
    }

    #[test]
    fn set_and_get_are_bounds_checked() {
        let mut vector = StateVector::new(vec![2, 3]);

        vector.set(1, 2).unwrap();
        assert_eq!(vector.get(1).unwrap(), 2);

        assert_eq!(
            vector.set(1, 3).unwrap_err(),
            StateVectorError::InstanceOutOfRange {
                site: 1,
                instance: 3,
                count: 3
            }
        );
        assert_eq!(
            vector.set(2, 0).unwrap_err(),
            StateVectorError::SiteIndexOutOfRange { index: 2, len: 2 }
        );
        assert_eq!(
            vector.get(9).unwrap_err(),
            StateVectorError::SiteIndexOutOfRange { index: 9, len: 2 }
        );
    }

    #[test]
    fn full_increment_visits_every_state_once() {
        let mut vector = StateVector::new(vec![2, 3]);
        vector.reset();

        let mut states = vec![vector.as_slice().to_vec()];
        while vector.increment() {
            states.push(vector.as_slice().to_vec());
        }

        assert_eq!(states.len(), 6);
        let unique: std::collections::HashSet<_> = states.iter().cloned().collect();
        assert_eq!(unique.len(), 6);
        // Last site is least significant.
        assert_eq!(states[0], vec![0, 0]);
        assert_eq!(states[1], vec![0, 1]);
        assert_eq!(states[3], vec![1, 0]);
        // Exhaustion wraps back to all zeros.
        assert_eq!(vector.as_slice(), &[0, 0]);
    }

    #[test]
    fn define_substate_rejects_bad_site_index() {
        let mut vector = StateVector::new(vec![2, 2]);
        assert_eq!(
            vector.define_substate(&[0, 7]).unwrap_err(),
            StateVectorError::SiteIndexOutOfRange { index: 7, len: 2 }
        );
    }

    #[test]
    fn restricted_increment_never_touches_frozen_sites() {
        let mut vector = StateVector::new(vec![2, 4, 3, 5]);
        vector.set(1, 3).unwrap();
        vector.set(3, 4).unwrap();

        vector.define_substate(&[0, 2]).unwrap();
        vector.reset_substate();

        let mut count = 0;
        loop {
            assert_eq!(vector.get(1).unwrap(), 3);
            assert_eq!(vector.get(3).unwrap(), 4);
            count += 1;
            if !vector.increment_substate() {
                break;
            }
        }
        assert_eq!(count, 6);
    }

    #[test]
    fn restricted_increment_carries_in_declaration_order() {
        let mut vector = StateVector::new(vec![3, 2, 2]);
        // Declare site 2 first, so site 0 is the least significant digit.
        vector.define_substate(&[2, 0]).unwrap();
        vector.reset_substate();

        let mut tuples = Vec::new();
        loop {
            tuples.push((vector.get(2).unwrap(), vector.get(0).unwrap()));
            if !vector.increment_substate() {
                break;
            }
        }

        assert_eq!(
            tuples,
            vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]
        );
    }

    #[test]
    fn reset_substate_leaves_frozen_sites_alone() {
        let mut vector = StateVector::new(vec![2, 3, 2]);
        vector.set(0, 1).unwrap();
        vector.set(1, 2).unwrap();
        vector.set(2, 1).unwrap();

        vector.define_substate(&[2]).unwrap();
        vector.reset_substate();

        assert_eq!(vector.as_slice(), &[1, 2, 0]);
    }

    #[test]
    fn substate_space_size_is_product_of_free_radices() {
        let mut vector = StateVector::new(vec![2, 3, 5]);
        assert_eq!(vector.substate_space_size(), 1);

        vector.define_substate(&[0, 2]).unwrap();
        assert_eq!(vector.substate_space_size(), 10);

        vector.clear_substate();
        assert_eq!(vector.substate_space_size(), 1);
    }

    #[test]
    fn empty_free_set_exhausts_immediately() {
        let mut vector = StateVector::new(vec![2, 2]);
        vector.define_substate(&[]).unwrap();
        vector.reset_substate();
        assert!(!vector.increment_substate());
        assert_eq!(vector.as_slice(), &[0, 0]);
    }

    #[test]
    fn redefining_substate_replaces_previous_declaration() {
        let mut vector = StateVector::new(vec![2, 2, 2]);
        vector.define_substate(&[0, 1]).unwrap();
        vector.define_substate(&[2]).unwrap();
        assert_eq!(vector.substate_sites(), &[2]);
        assert_eq!(vector.substate_space_size(), 2);
    }

    #[test]
    fn single_instance_sites_do_not_stall_the_counter() {
        let mut vector = StateVector::new(vec![1, 3, 1]);
        vector.define_substate(&[0, 1, 2]).unwrap();
        vector.reset_substate();

        let mut count = 1;
        while vector.increment_substate() {
            count += 1;
        }
        assert_eq!(count, 3);
    }
}
