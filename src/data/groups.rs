//! Sample groups and pairwise group comparisons.

use crate::error::{MetaboError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Stable identifier of a sample group.
///
/// Identifiers are assigned at insertion and never change when the display
/// order of the groups is rearranged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(u32);

impl GroupId {
    /// Raw numeric value.
    pub fn value(&self) -> u32 {
        self.0
    }
}

/// A named group of sample columns.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleGroup {
    id: GroupId,
    name: String,
    samples: Vec<String>,
}

impl SampleGroup {
    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn samples(&self) -> &[String] {
        &self.samples
    }
}

/// Serialized form of one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSpec {
    pub name: String,
    pub samples: Vec<String>,
}

/// Ordered mapping from group name to sample columns.
///
/// The order of groups is the display order; a sample belongs to at most
/// one group. Serializes as an ordered list of `{name, samples}` entries.
/// Equality compares names and samples in display order, not group ids.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<GroupSpec>", into = "Vec<GroupSpec>")]
pub struct SampleGroups {
    groups: Vec<SampleGroup>,
    next_id: u32,
}

impl SampleGroups {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mapping from `(name, samples)` pairs, in order.
    pub fn from_pairs<N, S, I>(pairs: I) -> Result<Self>
    where
        N: Into<String>,
        S: Into<String>,
        I: IntoIterator<Item = (N, Vec<S>)>,
    {
        let mut groups = Self::new();
        for (name, samples) in pairs {
            groups.insert(name, samples.into_iter().map(Into::into).collect())?;
        }
        Ok(groups)
    }

    /// Append a group at the end of the display order.
    ///
    /// Groups with an empty name or no samples are skipped and `Ok(None)` is
    /// returned, matching how unfilled group slots are ignored.
    ///
    /// # Errors
    /// `InvalidParameter` if the name is already used or a sample already
    /// belongs to another group.
    pub fn insert<N: Into<String>>(
        &mut self,
        name: N,
        samples: Vec<String>,
    ) -> Result<Option<GroupId>> {
        let name = name.into();
        if name.trim().is_empty() || samples.is_empty() {
            log::debug!("skipping empty sample group '{}'", name);
            return Ok(None);
        }
        if self.by_name(&name).is_some() {
            return Err(MetaboError::InvalidParameter(format!(
                "Duplicate group name '{}'",
                name
            )));
        }
        let taken: HashSet<&str> = self.all_samples().into_iter().collect();
        let mut own = HashSet::new();
        for sample in &samples {
            if taken.contains(sample.as_str()) || !own.insert(sample.as_str()) {
                return Err(MetaboError::InvalidParameter(format!(
                    "Sample '{}' is assigned to more than one group",
                    sample
                )));
            }
        }
        let id = GroupId(self.next_id);
        self.next_id += 1;
        self.groups.push(SampleGroup { id, name, samples });
        Ok(Some(id))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Groups in display order.
    pub fn iter(&self) -> impl Iterator<Item = &SampleGroup> {
        self.groups.iter()
    }

    /// Group names in display order.
    pub fn names(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.name.as_str()).collect()
    }

    /// Look up a group by identifier.
    pub fn get(&self, id: GroupId) -> Option<&SampleGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    /// Look up a group by name.
    pub fn by_name(&self, name: &str) -> Option<&SampleGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Samples of the named group.
    pub fn samples_of(&self, name: &str) -> Result<&[String]> {
        self.by_name(name)
            .map(|g| g.samples())
            .ok_or_else(|| MetaboError::UnknownGroup(name.to_string()))
    }

    /// Display position of a group.
    pub fn index_of(&self, id: GroupId) -> Option<usize> {
        self.groups.iter().position(|g| g.id == id)
    }

    /// Identifier of the group at a display position.
    pub fn id_at(&self, index: usize) -> Option<GroupId> {
        self.groups.get(index).map(|g| g.id)
    }

    /// All grouped samples, group by group, in display order.
    pub fn all_samples(&self) -> Vec<&str> {
        self.groups
            .iter()
            .flat_map(|g| g.samples.iter().map(String::as_str))
            .collect()
    }

    /// Rearrange the display order; `order` must name every group exactly once.
    pub fn reorder(&mut self, order: &[GroupId]) -> Result<()> {
        let unique: HashSet<&GroupId> = order.iter().collect();
        if order.len() != self.groups.len() || unique.len() != order.len() {
            return Err(MetaboError::InvalidParameter(
                "Reordering must list every group exactly once".to_string(),
            ));
        }
        let mut reordered = Vec::with_capacity(order.len());
        for id in order {
            let group = self
                .get(*id)
                .cloned()
                .ok_or_else(|| MetaboError::UnknownGroup(format!("id {}", id.0)))?;
            reordered.push(group);
        }
        self.groups = reordered;
        Ok(())
    }

    /// Every unordered pair of groups, in display order.
    pub fn unique_pairs(&self) -> Vec<Comparison> {
        let mut pairs = Vec::new();
        for i in 0..self.groups.len() {
            for j in (i + 1)..self.groups.len() {
                pairs.push(Comparison::ordered(self.groups[i].id, self.groups[j].id));
            }
        }
        pairs
    }
}

impl PartialEq for SampleGroups {
    fn eq(&self, other: &Self) -> bool {
        self.groups.len() == other.groups.len()
            && self
                .groups
                .iter()
                .zip(&other.groups)
                .all(|(a, b)| a.name == b.name && a.samples == b.samples)
    }
}

impl TryFrom<Vec<GroupSpec>> for SampleGroups {
    type Error = MetaboError;

    fn try_from(specs: Vec<GroupSpec>) -> Result<Self> {
        Self::from_pairs(specs.into_iter().map(|s| (s.name, s.samples)))
    }
}

impl From<SampleGroups> for Vec<GroupSpec> {
    fn from(groups: SampleGroups) -> Self {
        groups
            .groups
            .into_iter()
            .map(|g| GroupSpec {
                name: g.name,
                samples: g.samples,
            })
            .collect()
    }
}

/// Which sample columns an operation should consider.
#[derive(Debug, Clone, Copy)]
pub enum SampleSelection<'a> {
    /// Every sample column of the table.
    All,
    /// Only the samples of these groups.
    Groups(&'a SampleGroups),
}

/// An unordered pair of distinct groups.
///
/// Stored with the smaller identifier first so that A-vs-B and B-vs-A are
/// the same comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Comparison {
    first: GroupId,
    second: GroupId,
}

impl Comparison {
    /// Create a comparison between two distinct groups.
    pub fn new(a: GroupId, b: GroupId) -> Result<Self> {
        if a == b {
            return Err(MetaboError::InvalidParameter(
                "A group cannot be compared with itself".to_string(),
            ));
        }
        Ok(Self::ordered(a, b))
    }

    fn ordered(a: GroupId, b: GroupId) -> Self {
        Self {
            first: a.min(b),
            second: a.max(b),
        }
    }

    /// Resolve a stored `[index_a, index_b]` pair against the display order.
    pub fn from_indices(groups: &SampleGroups, pair: [usize; 2]) -> Result<Self> {
        let resolve = |i: usize| {
            groups
                .id_at(i)
                .ok_or_else(|| MetaboError::UnknownGroup(format!("index {}", i)))
        };
        Self::new(resolve(pair[0])?, resolve(pair[1])?)
    }

    /// Resolve a comparison from two group names.
    pub fn from_names(groups: &SampleGroups, a: &str, b: &str) -> Result<Self> {
        let resolve = |name: &str| {
            groups
                .by_name(name)
                .map(|g| g.id())
                .ok_or_else(|| MetaboError::UnknownGroup(name.to_string()))
        };
        Self::new(resolve(a)?, resolve(b)?)
    }

    pub fn first(&self) -> GroupId {
        self.first
    }

    pub fn second(&self) -> GroupId {
        self.second
    }

    /// The two groups in current display order.
    pub fn resolve<'g>(
        &self,
        groups: &'g SampleGroups,
    ) -> Result<(&'g SampleGroup, &'g SampleGroup)> {
        let [i, j] = self.to_indices(groups)?;
        Ok((&groups.groups[i], &groups.groups[j]))
    }

    /// Sorted `[index_a, index_b]` pair in the current display order.
    pub fn to_indices(&self, groups: &SampleGroups) -> Result<[usize; 2]> {
        let index = |id: GroupId| {
            groups
                .index_of(id)
                .ok_or_else(|| MetaboError::UnknownGroup(format!("id {}", id.0)))
        };
        let (a, b) = (index(self.first)?, index(self.second)?);
        Ok([a.min(b), a.max(b)])
    }

    /// Label such as `"ctrl vs treated"`, in display order.
    pub fn label(&self, groups: &SampleGroups) -> Result<String> {
        let (a, b) = self.resolve(groups)?;
        Ok(format!("{} vs {}", a.name(), b.name()))
    }
}

/// Remove mirror and repeated comparisons, keeping first occurrences.
pub fn dedup_comparisons(comparisons: &[Comparison]) -> Vec<Comparison> {
    let mut seen = HashSet::new();
    let unique: Vec<Comparison> = comparisons
        .iter()
        .copied()
        .filter(|c| seen.insert(*c))
        .collect();
    if unique.len() < comparisons.len() {
        log::info!(
            "collapsed {} duplicate comparisons",
            comparisons.len() - unique.len()
        );
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_groups() -> SampleGroups {
        SampleGroups::from_pairs(vec![
            ("ctrl", vec!["S1", "S2"]),
            ("drug", vec!["S3", "S4"]),
            ("combo", vec!["S5", "S6"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_insert_and_lookup() {
        let groups = create_groups();
        assert_eq!(groups.len(), 3);
        assert_eq!(groups.names(), vec!["ctrl", "drug", "combo"]);
        assert_eq!(groups.samples_of("drug").unwrap(), &["S3", "S4"]);
        assert!(matches!(
            groups.samples_of("none"),
            Err(MetaboError::UnknownGroup(_))
        ));
    }

    #[test]
    fn test_sample_in_two_groups_rejected() {
        let result = SampleGroups::from_pairs(vec![("a", vec!["S1"]), ("b", vec!["S1"])]);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_group_skipped() {
        let mut groups = SampleGroups::new();
        assert!(groups.insert("", vec!["S1".to_string()]).unwrap().is_none());
        assert!(groups.insert("a", vec![]).unwrap().is_none());
        assert!(groups.is_empty());
    }

    #[test]
    fn test_mirror_comparisons_are_equal() {
        let groups = create_groups();
        let ab = Comparison::from_indices(&groups, [2, 0]).unwrap();
        let ba = Comparison::from_indices(&groups, [0, 2]).unwrap();
        assert_eq!(ab, ba);
        assert_eq!(ab.to_indices(&groups).unwrap(), [0, 2]);

        let unique = dedup_comparisons(&[ab, ba]);
        assert_eq!(unique.len(), 1);
    }

    #[test]
    fn test_self_comparison_rejected() {
        let groups = create_groups();
        assert!(Comparison::from_indices(&groups, [1, 1]).is_err());
        assert!(Comparison::from_indices(&groups, [0, 7]).is_err());
    }

    #[test]
    fn test_reorder_keeps_comparison_identity() {
        let mut groups = create_groups();
        let cmp = Comparison::from_names(&groups, "ctrl", "combo").unwrap();
        assert_eq!(cmp.label(&groups).unwrap(), "ctrl vs combo");

        let ids: Vec<GroupId> = groups.iter().map(|g| g.id()).collect();
        groups.reorder(&[ids[2], ids[1], ids[0]]).unwrap();

        assert_eq!(groups.names(), vec!["combo", "drug", "ctrl"]);
        assert_eq!(cmp.to_indices(&groups).unwrap(), [0, 2]);
        assert_eq!(cmp.label(&groups).unwrap(), "combo vs ctrl");
    }

    #[test]
    fn test_unique_pairs() {
        let groups = create_groups();
        let pairs = groups.unique_pairs();
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[0].label(&groups).unwrap(), "ctrl vs drug");
        assert_eq!(pairs[2].label(&groups).unwrap(), "drug vs combo");
    }

    #[test]
    fn test_yaml_roundtrip_preserves_order() {
        let groups = create_groups();
        let yaml = serde_yaml::to_string(&groups).unwrap();
        let loaded: SampleGroups = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(loaded.names(), groups.names());
        assert_eq!(loaded.all_samples(), groups.all_samples());
    }

    #[test]
    fn test_equality_ignores_group_ids() {
        let mut reordered = create_groups();
        let ids: Vec<GroupId> = reordered.iter().map(|g| g.id()).collect();
        reordered.reorder(&[ids[2], ids[0], ids[1]]).unwrap();

        let yaml = serde_yaml::to_string(&reordered).unwrap();
        let loaded: SampleGroups = serde_yaml::from_str(&yaml).unwrap();
        assert_ne!(loaded.iter().next().unwrap().id(), reordered.iter().next().unwrap().id());
        assert_eq!(loaded, reordered);
        assert_ne!(loaded, create_groups());
    }
}
