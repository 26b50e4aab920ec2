use crate::indexing::ClassId;
use crate::indexing::rules::{ContextInitRule, RuleChain, SubsumerRule};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::hash_map::Entry;

/// Rule and node changes made to the index since the last saturation.
///
/// A link added then removed (or the opposite) before being committed cancels out.
#[derive(Debug, Default)]
pub struct IndexChanges {
    pub(crate) added_rules: FxHashMap<ClassId, RuleChain<SubsumerRule>>,
    pub(crate) removed_rules: FxHashMap<ClassId, RuleChain<SubsumerRule>>,
    pub(crate) added_init_rules: RuleChain<ContextInitRule>,
    pub(crate) removed_init_rules: RuleChain<ContextInitRule>,
    pub(crate) removed_classes: FxHashSet<ClassId>,
    pub(crate) property_changed: bool,
}

impl IndexChanges {
    pub(crate) fn rule_added(&mut self, key: ClassId, rule: SubsumerRule) {
        if !unlink(&mut self.removed_rules, key, &rule) {
            self.added_rules.entry(key).or_default().add(rule);
        }
    }

    pub(crate) fn rule_removed(&mut self, key: ClassId, rule: SubsumerRule) {
        if !unlink(&mut self.added_rules, key, &rule) {
            self.removed_rules.entry(key).or_default().add(rule);
        }
    }

    pub(crate) fn init_rule_added(&mut self, rule: ContextInitRule) {
        if !self.removed_init_rules.remove(&rule) {
            self.added_init_rules.add(rule);
        }
    }

    pub(crate) fn init_rule_removed(&mut self, rule: ContextInitRule) {
        if !self.added_init_rules.remove(&rule) {
            self.removed_init_rules.add(rule);
        }
    }

    pub(crate) fn class_removed(&mut self, id: ClassId) {
        self.removed_classes.insert(id);
    }

    pub fn is_empty(&self) -> bool {
        self.added_rules.is_empty()
            && self.removed_rules.is_empty()
            && self.added_init_rules.is_empty()
            && self.removed_init_rules.is_empty()
            && self.removed_classes.is_empty()
            && !self.property_changed
    }

    /// Whether some change may invalidate already derived conclusions.
    pub fn has_removals(&self) -> bool {
        !self.removed_rules.is_empty()
            || !self.removed_init_rules.is_empty()
            || !self.removed_classes.is_empty()
    }

    /// Whether the whole saturation must be recomputed.
    pub fn requires_reset(&self) -> bool {
        self.property_changed || !self.removed_init_rules.is_empty()
    }
}

fn unlink(
    chains: &mut FxHashMap<ClassId, RuleChain<SubsumerRule>>,
    key: ClassId,
    rule: &SubsumerRule,
) -> bool {
    let Entry::Occupied(mut entry) = chains.entry(key) else {
        return false;
    };
    let removed = entry.get_mut().remove(rule);
    if entry.get().is_empty() {
        entry.remove();
    }
    removed
}
