//! Polarity-aware conversion of normalized axioms into index updates.
//!
//! Insertion converts sub-expressions before their parent; removal updates the parent
//! first so that rules referencing a sub-expression are unlinked before it can disappear.

use crate::error::ReasonerError;
use crate::indexing::axioms::{ElAxiom, object_property};
use crate::indexing::cache::{IndexedObjectCache, Polarity};
use crate::indexing::{
    ChainId, ClassId, ContextInitRule, DisjointnessId, IndexedClassExpression,
    IndexedPropertyChain, OntologyIndex, SubsumerRule,
};
use crate::model::{ClassExpression, ObjectProperty};
use tracing::debug;

#[derive(Clone, Copy)]
enum Junction {
    Intersection,
    Union,
}

impl OntologyIndex {
    pub(super) fn index_el_axiom(
        &mut self,
        axiom: &ElAxiom,
        increment: bool,
    ) -> Result<(), ReasonerError> {
        match axiom {
            ElAxiom::SubClassOf(sub, sup) => {
                if increment {
                    let sub = self.convert_class(sub, Polarity::Negative, true)?;
                    let sup = self.convert_class(sup, Polarity::Positive, true)?;
                    self.link(sub, SubsumerRule::ToldSuperClass(sup), true)
                } else {
                    let sub_id = self.resolve_class(sub)?;
                    let sup_id = self.resolve_class(sup)?;
                    self.link(sub_id, SubsumerRule::ToldSuperClass(sup_id), false)?;
                    self.convert_class(sup, Polarity::Positive, false)?;
                    self.convert_class(sub, Polarity::Negative, false)?;
                    Ok(())
                }
            }
            ElAxiom::DisjointClasses(members) => {
                let ids = if increment {
                    members
                        .iter()
                        .map(|m| self.convert_class(m, Polarity::Negative, true))
                        .collect::<Result<Vec<_>, _>>()?
                } else {
                    members
                        .iter()
                        .map(|m| self.resolve_class(m))
                        .collect::<Result<Vec<_>, _>>()?
                };
                self.update_disjointness(ids, increment)?;
                if !increment {
                    for member in members {
                        self.convert_class(member, Polarity::Negative, false)?;
                    }
                }
                Ok(())
            }
            ElAxiom::SubPropertyChainOf(chain, sup) => {
                let (chain_id, sup_id) = if increment {
                    let chain_id = self.convert_chain(chain, true)?;
                    let sup_id = self.update_chain(property_key(sup), true)?;
                    (chain_id, sup_id)
                } else {
                    (self.resolve_chain(chain)?, self.resolve_property(sup)?)
                };
                let told_supers = &mut self.cache.chain_node_mut(chain_id)?.told_supers;
                if increment {
                    let position = told_supers.partition_point(|s| *s <= sup_id);
                    told_supers.insert(position, sup_id);
                } else {
                    let position = told_supers.binary_search(&sup_id).map_err(|_| {
                        ReasonerError::invariant(format!(
                            "{sup_id:?} is not a told super property of {chain_id:?}"
                        ))
                    })?;
                    told_supers.remove(position);
                    self.update_chain(property_key(sup), false)?;
                    self.convert_chain(chain, false)?;
                }
                self.changes.property_changed = true;
                Ok(())
            }
            ElAxiom::ReflexiveObjectProperty(property) => {
                let id = if increment {
                    self.update_chain(property_key(property), true)?
                } else {
                    self.resolve_property(property)?
                };
                let node = self.cache.chain_node_mut(id)?;
                if increment {
                    node.told_reflexive += 1;
                } else {
                    node.told_reflexive = node.told_reflexive.checked_sub(1).ok_or_else(|| {
                        ReasonerError::invariant(format!("{id:?} is not told reflexive"))
                    })?;
                    self.update_chain(property_key(property), false)?;
                }
                self.changes.property_changed = true;
                Ok(())
            }
            ElAxiom::ClassDeclaration(class) => {
                self.convert_class(class, Polarity::Neutral, increment)?;
                Ok(())
            }
            ElAxiom::PropertyDeclaration(property) => {
                self.update_chain(property_key(property), increment)?;
                Ok(())
            }
        }
    }

    fn convert_class(
        &mut self,
        expression: &ClassExpression,
        polarity: Polarity,
        increment: bool,
    ) -> Result<ClassId, ReasonerError> {
        match expression {
            ClassExpression::Class(class) => self.update_class(
                IndexedClassExpression::Class(class.clone()),
                polarity,
                increment,
            ),
            ClassExpression::ObjectOneOf(individuals) => {
                let [individual] = individuals.as_slice() else {
                    return Err(ReasonerError::invariant("non singleton nominal"));
                };
                self.update_class(
                    IndexedClassExpression::Individual(individual.clone()),
                    polarity,
                    increment,
                )
            }
            ClassExpression::DataHasValue { property, value } => {
                if increment {
                    debug!(
                        "{expression} is indexed as an atom, data values are not reasoned about"
                    );
                }
                self.update_class(
                    IndexedClassExpression::DataHasValue {
                        property: property.clone(),
                        value: value.clone(),
                    },
                    polarity,
                    increment,
                )
            }
            ClassExpression::ObjectIntersectionOf(operands) => {
                self.convert_junction(operands, Junction::Intersection, polarity, increment)
            }
            ClassExpression::ObjectUnionOf(operands) => {
                self.convert_junction(operands, Junction::Union, polarity, increment)
            }
            ClassExpression::ObjectComplementOf(operand) => {
                if increment {
                    let operand = self.convert_class(operand, polarity.complement(), true)?;
                    self.update_class(
                        IndexedClassExpression::ObjectComplementOf(operand),
                        polarity,
                        true,
                    )
                } else {
                    let operand_id = self.resolve_class(operand)?;
                    let id = self.update_class(
                        IndexedClassExpression::ObjectComplementOf(operand_id),
                        polarity,
                        false,
                    )?;
                    self.convert_class(operand, polarity.complement(), false)?;
                    Ok(id)
                }
            }
            ClassExpression::ObjectSomeValuesFrom { property, filler } => {
                self.convert_existential(object_property(property)?, filler, polarity, increment)
            }
            ClassExpression::ObjectHasValue {
                property,
                individual,
            } => self.convert_existential(
                object_property(property)?,
                &ClassExpression::nominal(individual.clone()),
                polarity,
                increment,
            ),
            ClassExpression::ObjectAllValuesFrom { .. }
            | ClassExpression::ObjectHasSelf(_)
            | ClassExpression::ObjectMinCardinality { .. }
            | ClassExpression::DataSomeValuesFrom { .. } => Err(ReasonerError::invariant(
                format!("{expression} reached the converter"),
            )),
        }
    }

    fn convert_existential(
        &mut self,
        property: &ObjectProperty,
        filler: &ClassExpression,
        polarity: Polarity,
        increment: bool,
    ) -> Result<ClassId, ReasonerError> {
        if increment {
            let property = self.update_chain(property_key(property), true)?;
            let filler = self.convert_class(filler, polarity, true)?;
            self.update_class(
                IndexedClassExpression::ObjectSomeValuesFrom { property, filler },
                polarity,
                true,
            )
        } else {
            let key = IndexedClassExpression::ObjectSomeValuesFrom {
                property: self.resolve_property(property)?,
                filler: self.resolve_class(filler)?,
            };
            let id = self.update_class(key, polarity, false)?;
            self.convert_class(filler, polarity, false)?;
            self.update_chain(property_key(property), false)?;
            Ok(id)
        }
    }

    /// Binarizes the n-ary junction into left-nested binary nodes.
    fn convert_junction(
        &mut self,
        operands: &[ClassExpression],
        junction: Junction,
        polarity: Polarity,
        increment: bool,
    ) -> Result<ClassId, ReasonerError> {
        match operands {
            [] => {
                let neutral = match junction {
                    Junction::Intersection => ClassId::THING,
                    Junction::Union => ClassId::NOTHING,
                };
                let key = self
                    .class_expression(neutral)
                    .cloned()
                    .ok_or_else(|| ReasonerError::invariant("owl:Thing or owl:Nothing is missing"))?;
                self.update_class(key, polarity, increment)
            }
            [operand] => self.convert_class(operand, polarity, increment),
            [first, others @ ..] => {
                if increment {
                    let mut result = self.convert_class(first, polarity, true)?;
                    for operand in others {
                        let operand = self.convert_class(operand, polarity, true)?;
                        result = self.update_class(junction_key(junction, result, operand), polarity, true)?;
                    }
                    Ok(result)
                } else {
                    let mut keys = Vec::with_capacity(others.len());
                    let mut result = self.resolve_class(first)?;
                    for operand in others {
                        let key = junction_key(junction, result, self.resolve_class(operand)?);
                        result = self.cache.class_id(&key).ok_or_else(not_indexed)?;
                        keys.push(key);
                    }
                    for key in keys.into_iter().rev() {
                        self.update_class(key, polarity, false)?;
                    }
                    for operand in operands {
                        self.convert_class(operand, polarity, false)?;
                    }
                    Ok(result)
                }
            }
        }
    }

    /// Finds the node of an already indexed expression without changing anything.
    pub(super) fn resolve_class(
        &self,
        expression: &ClassExpression,
    ) -> Result<ClassId, ReasonerError> {
        let key = match expression {
            ClassExpression::Class(class) => IndexedClassExpression::Class(class.clone()),
            ClassExpression::ObjectOneOf(individuals) => match individuals.as_slice() {
                [individual] => IndexedClassExpression::Individual(individual.clone()),
                _ => return Err(not_indexed()),
            },
            ClassExpression::DataHasValue { property, value } => {
                IndexedClassExpression::DataHasValue {
                    property: property.clone(),
                    value: value.clone(),
                }
            }
            ClassExpression::ObjectIntersectionOf(operands)
            | ClassExpression::ObjectUnionOf(operands) => {
                let junction = if matches!(expression, ClassExpression::ObjectUnionOf(_)) {
                    Junction::Union
                } else {
                    Junction::Intersection
                };
                let Some((first, others)) = operands.split_first() else {
                    return Ok(match junction {
                        Junction::Intersection => ClassId::THING,
                        Junction::Union => ClassId::NOTHING,
                    });
                };
                let mut result = self.resolve_class(first)?;
                for operand in others {
                    let key = junction_key(junction, result, self.resolve_class(operand)?);
                    result = self.cache.class_id(&key).ok_or_else(not_indexed)?;
                }
                return Ok(result);
            }
            ClassExpression::ObjectComplementOf(operand) => {
                IndexedClassExpression::ObjectComplementOf(self.resolve_class(operand)?)
            }
            ClassExpression::ObjectSomeValuesFrom { property, filler } => {
                IndexedClassExpression::ObjectSomeValuesFrom {
                    property: self.resolve_property(object_property(property)?)?,
                    filler: self.resolve_class(filler)?,
                }
            }
            ClassExpression::ObjectHasValue {
                property,
                individual,
            } => IndexedClassExpression::ObjectSomeValuesFrom {
                property: self.resolve_property(object_property(property)?)?,
                filler: self
                    .cache
                    .class_id(&IndexedClassExpression::Individual(individual.clone()))
                    .ok_or_else(not_indexed)?,
            },
            ClassExpression::ObjectAllValuesFrom { .. }
            | ClassExpression::ObjectHasSelf(_)
            | ClassExpression::ObjectMinCardinality { .. }
            | ClassExpression::DataSomeValuesFrom { .. } => return Err(not_indexed()),
        };
        self.cache.class_id(&key).ok_or_else(not_indexed)
    }

    pub(super) fn resolve_property(
        &self,
        property: &ObjectProperty,
    ) -> Result<ChainId, ReasonerError> {
        self.cache
            .chain_id(&property_key(property))
            .ok_or_else(not_indexed)
    }

    fn resolve_chain(&self, chain: &[ObjectProperty]) -> Result<ChainId, ReasonerError> {
        match chain {
            [] => Err(not_indexed()),
            [property] => self.resolve_property(property),
            [first, suffix @ ..] => self
                .cache
                .chain_id(&IndexedPropertyChain::BinaryPropertyChain {
                    first: self.resolve_property(first)?,
                    suffix: self.resolve_chain(suffix)?,
                })
                .ok_or_else(not_indexed),
        }
    }

    /// Right-nests the chain: `p1 ∘ (p2 ∘ (... ∘ pn))`.
    fn convert_chain(
        &mut self,
        chain: &[ObjectProperty],
        increment: bool,
    ) -> Result<ChainId, ReasonerError> {
        match chain {
            [] => Err(ReasonerError::invariant("empty property chain")),
            [property] => self.update_chain(property_key(property), increment),
            [first, suffix @ ..] => {
                if increment {
                    let first = self.update_chain(property_key(first), true)?;
                    let suffix = self.convert_chain(suffix, true)?;
                    self.update_chain(
                        IndexedPropertyChain::BinaryPropertyChain { first, suffix },
                        true,
                    )
                } else {
                    let key = IndexedPropertyChain::BinaryPropertyChain {
                        first: self.resolve_property(first)?,
                        suffix: self.resolve_chain(suffix)?,
                    };
                    let id = self.update_chain(key, false)?;
                    self.update_chain(property_key(first), false)?;
                    self.convert_chain(suffix, false)?;
                    Ok(id)
                }
            }
        }
    }

    fn update_class(
        &mut self,
        key: IndexedClassExpression,
        polarity: Polarity,
        increment: bool,
    ) -> Result<ClassId, ReasonerError> {
        let id = if increment {
            ClassId::new(self.cache.classes.get_or_insert(key.clone())?.0)
        } else {
            self.cache.class_id(&key).ok_or_else(not_indexed)?
        };
        let transitions = self
            .cache
            .class_node_mut(id)?
            .occurrences
            .update(polarity, increment)?;
        if let Some(added) = transitions.negative {
            self.negative_occurrence_changed(id, &key, added)?;
        }
        if let Some(added) = transitions.positive {
            self.positive_occurrence_changed(id, &key, added)?;
        }
        if transitions.removed && !IndexedObjectCache::is_builtin(id) {
            let (_, node) = self
                .cache
                .classes
                .remove(id.raw())
                .ok_or_else(not_indexed)?;
            if !node.rules.is_empty() {
                return Err(ReasonerError::invariant(format!(
                    "{key:?} is removed while rules are still attached to it"
                )));
            }
            self.changes.class_removed(id);
        }
        Ok(id)
    }

    fn negative_occurrence_changed(
        &mut self,
        id: ClassId,
        key: &IndexedClassExpression,
        added: bool,
    ) -> Result<(), ReasonerError> {
        match key {
            IndexedClassExpression::ObjectIntersectionOf(first, second) => {
                self.link(
                    *first,
                    SubsumerRule::ConjunctionComposition {
                        other: *second,
                        conjunction: id,
                    },
                    added,
                )?;
                self.link(
                    *second,
                    SubsumerRule::ConjunctionComposition {
                        other: *first,
                        conjunction: id,
                    },
                    added,
                )
            }
            IndexedClassExpression::ObjectUnionOf(first, second) => {
                self.link(*first, SubsumerRule::DisjunctionComposition(id), added)?;
                self.link(*second, SubsumerRule::DisjunctionComposition(id), added)
            }
            IndexedClassExpression::ObjectSomeValuesFrom { filler, .. } => {
                self.link(*filler, SubsumerRule::PropagationFromFiller(id), added)
            }
            IndexedClassExpression::Class(_) if id == ClassId::THING => {
                if added {
                    self.init_rules.add(ContextInitRule::OwlThing);
                    self.changes.init_rule_added(ContextInitRule::OwlThing);
                } else {
                    if !self.init_rules.remove(&ContextInitRule::OwlThing) {
                        return Err(ReasonerError::invariant(
                            "the owl:Thing initialization rule is not linked",
                        ));
                    }
                    self.changes.init_rule_removed(ContextInitRule::OwlThing);
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn positive_occurrence_changed(
        &mut self,
        id: ClassId,
        key: &IndexedClassExpression,
        added: bool,
    ) -> Result<(), ReasonerError> {
        match key {
            IndexedClassExpression::ObjectComplementOf(negated) => {
                self.link(*negated, SubsumerRule::ContradictionFromNegation(id), added)
            }
            IndexedClassExpression::Class(_) if id == ClassId::NOTHING => {
                self.link(id, SubsumerRule::ContradictionFromOwlNothing, added)
            }
            _ => Ok(()),
        }
    }

    fn update_disjointness(
        &mut self,
        mut members: Vec<ClassId>,
        increment: bool,
    ) -> Result<(), ReasonerError> {
        members.sort_unstable();
        let id = if increment {
            self.cache.disjointness.get_or_insert(members.clone())?.0
        } else {
            self.cache
                .disjointness
                .get(&members)
                .ok_or_else(not_indexed)?
        };
        let node = self
            .cache
            .disjointness
            .node_mut(id)
            .ok_or_else(not_indexed)?;
        let transition = if increment {
            node.occurrences += 1;
            node.occurrences == 1
        } else {
            node.occurrences = node.occurrences.checked_sub(1).ok_or_else(not_indexed)?;
            node.occurrences == 0
        };
        if transition {
            let mut distinct = members;
            distinct.dedup();
            for member in distinct {
                self.link(
                    member,
                    SubsumerRule::DisjointnessMembership(DisjointnessId::new(id)),
                    increment,
                )?;
            }
            if !increment {
                self.cache.disjointness.remove(id);
            }
        }
        Ok(())
    }

    fn update_chain(
        &mut self,
        key: IndexedPropertyChain,
        increment: bool,
    ) -> Result<ChainId, ReasonerError> {
        let id = if increment {
            ChainId::new(self.cache.chains.get_or_insert(key)?.0)
        } else {
            self.cache.chain_id(&key).ok_or_else(not_indexed)?
        };
        let node = self.cache.chain_node_mut(id)?;
        if increment {
            node.occurrences += 1;
        } else {
            node.occurrences = node.occurrences.checked_sub(1).ok_or_else(not_indexed)?;
            if node.occurrences == 0 {
                if !node.told_supers.is_empty() || node.told_reflexive > 0 {
                    return Err(ReasonerError::invariant(format!(
                        "{id:?} is removed while it still has told properties"
                    )));
                }
                self.cache.chains.remove(id.raw());
            }
        }
        Ok(id)
    }

    /// Links or unlinks a rule, recording the change.
    fn link(&mut self, key: ClassId, rule: SubsumerRule, added: bool) -> Result<(), ReasonerError> {
        let rules = &mut self.cache.class_node_mut(key)?.rules;
        if added {
            rules.add(rule);
            self.changes.rule_added(key, rule);
        } else {
            if !rules.remove(&rule) {
                return Err(ReasonerError::invariant(format!(
                    "{rule:?} is not linked to {key:?}"
                )));
            }
            self.changes.rule_removed(key, rule);
        }
        Ok(())
    }
}

fn property_key(property: &ObjectProperty) -> IndexedPropertyChain {
    IndexedPropertyChain::ObjectProperty(property.clone())
}

fn junction_key(junction: Junction, first: ClassId, second: ClassId) -> IndexedClassExpression {
    let (first, second) = if first <= second {
        (first, second)
    } else {
        (second, first)
    };
    match junction {
        Junction::Intersection => IndexedClassExpression::ObjectIntersectionOf(first, second),
        Junction::Union => IndexedClassExpression::ObjectUnionOf(first, second),
    }
}

fn not_indexed() -> ReasonerError {
    ReasonerError::invariant("unindexing an expression that is not indexed")
}
