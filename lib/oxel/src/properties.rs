//! Saturation of the property hierarchy: reflexivity, sub-property closure and compositions.

use crate::indexing::{ChainId, ClassId, IndexedClassExpression, IndexedObjectCache, IndexedPropertyChain};
use rustc_hash::{FxHashMap, FxHashSet};

/// The derived property hierarchy, recomputed from the index before each saturation
/// that follows an index change.
#[derive(Debug, Default)]
pub struct PropertyHierarchy {
    reflexive: FxHashSet<ChainId>,
    /// Object properties (not chains) below each chain, itself included.
    sub_properties: FxHashMap<ChainId, Vec<ChainId>>,
    /// Every chain above each chain, itself included.
    super_chains: FxHashMap<ChainId, Vec<ChainId>>,
    /// left property -> right chain -> composed chains
    compositions: FxHashMap<ChainId, FxHashMap<ChainId, Vec<ChainId>>>,
    /// right chain -> chains composed with some reflexive left property
    reflexive_compositions: FxHashMap<ChainId, Vec<ChainId>>,
    right_components: FxHashSet<ChainId>,
    /// property -> negative existentials over a super property
    negative_existentials: FxHashMap<ChainId, Vec<ClassId>>,
}

impl PropertyHierarchy {
    pub fn new(cache: &IndexedObjectCache) -> Self {
        let mut told_supers = FxHashMap::<ChainId, Vec<ChainId>>::default();
        let mut left_chains = FxHashMap::<ChainId, Vec<ChainId>>::default();
        let mut right_chains = FxHashMap::<ChainId, Vec<ChainId>>::default();
        let mut binary_chains = Vec::new();
        let mut to_do = Vec::new();
        for (id, chain) in cache.chains() {
            if let Some(node) = cache.chain_node(id) {
                let mut supers = node.told_supers.clone();
                supers.dedup();
                told_supers.insert(id, supers);
                if node.told_reflexive > 0 {
                    to_do.push(id);
                }
            }
            if let IndexedPropertyChain::BinaryPropertyChain { first, suffix } = chain {
                left_chains.entry(*first).or_default().push(id);
                right_chains.entry(*suffix).or_default().push(id);
                binary_chains.push((id, *first, *suffix));
            }
        }

        // Reflexivity goes up told edges and into chains whose both components are reflexive
        let mut reflexive = FxHashSet::default();
        while let Some(chain) = to_do.pop() {
            if !reflexive.insert(chain) {
                continue;
            }
            to_do.extend(told_supers.get(&chain).into_iter().flatten().copied());
            for &(id, first, suffix) in &binary_chains {
                if (first == chain && reflexive.contains(&suffix))
                    || (suffix == chain && reflexive.contains(&first))
                {
                    to_do.push(id);
                }
            }
        }

        // A chain with a reflexive suffix is implied by its first property
        let mut derived_supers = told_supers;
        for &(id, first, suffix) in &binary_chains {
            if reflexive.contains(&suffix) {
                derived_supers.entry(first).or_default().push(id);
            }
        }

        let mut super_chains = FxHashMap::<ChainId, Vec<ChainId>>::default();
        let mut sub_chains = FxHashMap::<ChainId, Vec<ChainId>>::default();
        for (id, _) in cache.chains() {
            let mut closure = FxHashSet::default();
            let mut stack = vec![id];
            while let Some(current) = stack.pop() {
                if closure.insert(current) {
                    stack.extend(derived_supers.get(&current).into_iter().flatten().copied());
                }
            }
            let mut closure = closure.into_iter().collect::<Vec<_>>();
            closure.sort_unstable();
            for sup in &closure {
                sub_chains.entry(*sup).or_default().push(id);
            }
            super_chains.insert(id, closure);
        }
        let is_property = |id: &ChainId| {
            matches!(
                cache.property_chain(*id),
                Some(IndexedPropertyChain::ObjectProperty(_))
            )
        };
        let sub_properties = sub_chains
            .iter()
            .map(|(chain, subs)| {
                let mut subs = subs.iter().copied().filter(is_property).collect::<Vec<_>>();
                subs.sort_unstable();
                (*chain, subs)
            })
            .collect::<FxHashMap<_, _>>();

        let mut compositions = FxHashMap::<ChainId, FxHashMap<ChainId, Vec<ChainId>>>::default();
        let mut right_components = FxHashSet::default();
        for &(id, first, suffix) in &binary_chains {
            let results = super_chains.get(&id).map_or(&[][..], Vec::as_slice);
            for left in sub_properties.get(&first).into_iter().flatten() {
                for right in sub_chains.get(&suffix).into_iter().flatten() {
                    right_components.insert(*right);
                    compositions
                        .entry(*left)
                        .or_default()
                        .entry(*right)
                        .or_default()
                        .extend_from_slice(results);
                }
            }
        }
        // Composed chains are only needed as forward links
        for by_right in compositions.values_mut() {
            for results in by_right.values_mut() {
                results.retain(|c| is_property(c) || right_components.contains(c));
                results.sort_unstable();
                results.dedup();
            }
        }
        let mut reflexive_compositions = FxHashMap::<ChainId, Vec<ChainId>>::default();
        for (left, by_right) in &compositions {
            if reflexive.contains(left) {
                for (right, results) in by_right {
                    reflexive_compositions
                        .entry(*right)
                        .or_default()
                        .extend_from_slice(results);
                }
            }
        }
        for results in reflexive_compositions.values_mut() {
            results.sort_unstable();
            results.dedup();
        }

        let mut negative_existentials = FxHashMap::<ChainId, Vec<ClassId>>::default();
        for (id, expression) in cache.classes() {
            let IndexedClassExpression::ObjectSomeValuesFrom { property, .. } = expression else {
                continue;
            };
            if cache.occurrences(id).is_none_or(|o| o.negative == 0) {
                continue;
            }
            for sub in sub_properties.get(property).into_iter().flatten() {
                negative_existentials.entry(*sub).or_default().push(id);
            }
        }

        Self {
            reflexive,
            sub_properties,
            super_chains,
            compositions,
            reflexive_compositions,
            right_components,
            negative_existentials,
        }
    }

    pub fn is_reflexive(&self, chain: ChainId) -> bool {
        self.reflexive.contains(&chain)
    }

    /// Object properties implying `chain`, itself included if it is a property.
    pub fn sub_properties(&self, chain: ChainId) -> &[ChainId] {
        self.sub_properties.get(&chain).map_or(&[], Vec::as_slice)
    }

    /// Chains implied by `chain`, itself included.
    pub fn super_chains(&self, chain: ChainId) -> &[ChainId] {
        self.super_chains.get(&chain).map_or(&[], Vec::as_slice)
    }

    /// Chains implied by `left ∘ right`.
    pub fn compositions(&self, left: ChainId, right: ChainId) -> &[ChainId] {
        self.compositions
            .get(&left)
            .and_then(|by_right| by_right.get(&right))
            .map_or(&[], Vec::as_slice)
    }

    pub(crate) fn has_compositions_by_left(&self, left: ChainId) -> bool {
        self.compositions.contains_key(&left)
    }

    /// Chains implied by `r ∘ right` for some reflexive property `r`.
    pub fn reflexive_compositions(&self, right: ChainId) -> &[ChainId] {
        self.reflexive_compositions
            .get(&right)
            .map_or(&[], Vec::as_slice)
    }

    /// Whether links over `chain` must also be stored in their source context.
    pub fn needs_forward_links(&self, chain: ChainId) -> bool {
        self.right_components.contains(&chain)
    }

    /// Negative existential restrictions whose property is implied by `property`.
    pub fn negative_existentials(&self, property: ChainId) -> &[ClassId] {
        self.negative_existentials
            .get(&property)
            .map_or(&[], Vec::as_slice)
    }
}
