use std::collections::BTreeMap;

use crate::Error;

/// Assignment of species to groups. Cutoff radii and hyper-parameters can be
/// defined per pair (or triplet) of groups instead of per pair of species.
///
/// Species not listed in `groups` belong to group 0.
#[derive(Debug, Clone, PartialEq)]
#[derive(serde::Deserialize, serde::Serialize, schemars::JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SpeciesGroups {
    /// Total number of groups
    pub n_groups: usize,
    /// Group of each species
    #[serde(default)]
    pub groups: BTreeMap<i32, usize>,
}

impl Default for SpeciesGroups {
    fn default() -> SpeciesGroups {
        SpeciesGroups {
            n_groups: 1,
            groups: BTreeMap::new(),
        }
    }
}

impl SpeciesGroups {
    pub fn validate(&self) -> Result<(), Error> {
        if self.n_groups == 0 {
            return Err(Error::InvalidParameter(
                "there must be at least one species group".into()
            ));
        }

        for (species, &group) in &self.groups {
            if group >= self.n_groups {
                return Err(Error::InvalidParameter(format!(
                    "species {} is assigned to group {}, but there are only {} groups",
                    species, group, self.n_groups
                )));
            }
        }

        return Ok(());
    }

    /// Get the group of the given species
    #[inline]
    pub fn group(&self, species: i32) -> usize {
        self.groups.get(&species).copied().unwrap_or(0)
    }

    /// Get the index of the pair of groups of `first` and `second` in a
    /// `n_groups x n_groups` table
    #[inline]
    pub fn pair(&self, first: i32, second: i32) -> usize {
        self.group(first) * self.n_groups + self.group(second)
    }

    /// Get the index of the triplet of groups of `first`, `second` and
    /// `third` in a `n_groups x n_groups x n_groups` table
    #[inline]
    pub fn triplet(&self, first: i32, second: i32, third: i32) -> usize {
        let n = self.n_groups;
        (self.group(first) * n + self.group(second)) * n + self.group(third)
    }
}
