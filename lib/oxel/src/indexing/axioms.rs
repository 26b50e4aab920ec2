//! Normalization of OWL axioms into the EL axioms understood by the index.

use crate::error::{Position, UnsupportedConstructError};
use crate::indexing::cache::Polarity;
use crate::model::{Axiom, ClassExpression, ObjectProperty, ObjectPropertyExpression};

/// An axiom in the normal form handled by the [`OntologyIndex`](super::OntologyIndex).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ElAxiom {
    SubClassOf(ClassExpression, ClassExpression),
    DisjointClasses(Vec<ClassExpression>),
    /// Non-empty chain
    SubPropertyChainOf(Vec<ObjectProperty>, ObjectProperty),
    ReflexiveObjectProperty(ObjectProperty),
    ClassDeclaration(ClassExpression),
    PropertyDeclaration(ObjectProperty),
}

/// Normalizes an axiom, failing before anything is indexed if some construct is not supported.
pub(crate) fn normalize(axiom: &Axiom) -> Result<Vec<ElAxiom>, UnsupportedConstructError> {
    let axioms = match axiom {
        Axiom::SubClassOf {
            sub_class,
            super_class,
        } => vec![ElAxiom::SubClassOf(sub_class.clone(), super_class.clone())],
        Axiom::EquivalentClasses(classes) => equivalent_classes(classes),
        Axiom::DisjointClasses(classes) => disjoint_classes(classes),
        Axiom::SubObjectPropertyOf {
            sub_property,
            super_property,
        } => vec![ElAxiom::SubPropertyChainOf(
            vec![object_property(sub_property)?.clone()],
            object_property(super_property)?.clone(),
        )],
        Axiom::SubPropertyChainOf {
            property_chain,
            super_property,
        } => {
            if property_chain.is_empty() {
                return Err(UnsupportedConstructError::new(
                    "empty ObjectPropertyChain",
                    Position::Anywhere,
                ));
            }
            vec![ElAxiom::SubPropertyChainOf(
                property_chain
                    .iter()
                    .map(|p| object_property(p).cloned())
                    .collect::<Result<_, _>>()?,
                object_property(super_property)?.clone(),
            )]
        }
        Axiom::EquivalentObjectProperties(properties) => {
            let properties = properties
                .iter()
                .map(object_property)
                .collect::<Result<Vec<_>, _>>()?;
            match properties.split_first() {
                Some((first, others)) if !others.is_empty() => others
                    .iter()
                    .flat_map(|other| {
                        [
                            ElAxiom::SubPropertyChainOf(vec![(*first).clone()], (*other).clone()),
                            ElAxiom::SubPropertyChainOf(vec![(*other).clone()], (*first).clone()),
                        ]
                    })
                    .collect(),
                Some((first, _)) => vec![ElAxiom::PropertyDeclaration((*first).clone())],
                None => Vec::new(),
            }
        }
        Axiom::TransitiveObjectProperty(property) => {
            let property = object_property(property)?;
            vec![ElAxiom::SubPropertyChainOf(
                vec![property.clone(), property.clone()],
                property.clone(),
            )]
        }
        Axiom::ReflexiveObjectProperty(property) => vec![ElAxiom::ReflexiveObjectProperty(
            object_property(property)?.clone(),
        )],
        Axiom::ObjectPropertyDomain { property, domain } => vec![ElAxiom::SubClassOf(
            ClassExpression::some_values_from(
                object_property(property)?.clone(),
                ClassExpression::thing(),
            ),
            domain.clone(),
        )],
        Axiom::ObjectPropertyRange { .. } => {
            return Err(UnsupportedConstructError::new(
                "ObjectPropertyRange",
                Position::Anywhere,
            ));
        }
        Axiom::InverseObjectProperties(_, _) => {
            return Err(UnsupportedConstructError::new(
                "InverseObjectProperties",
                Position::Anywhere,
            ));
        }
        Axiom::FunctionalObjectProperty(_) => {
            return Err(UnsupportedConstructError::new(
                "FunctionalObjectProperty",
                Position::Anywhere,
            ));
        }
        Axiom::SymmetricObjectProperty(_) => {
            return Err(UnsupportedConstructError::new(
                "SymmetricObjectProperty",
                Position::Anywhere,
            ));
        }
        Axiom::ClassAssertion { class, individual } => vec![ElAxiom::SubClassOf(
            ClassExpression::nominal(individual.clone()),
            class.clone(),
        )],
        Axiom::ObjectPropertyAssertion {
            property,
            source,
            target,
        } => vec![ElAxiom::SubClassOf(
            ClassExpression::nominal(source.clone()),
            ClassExpression::has_value(object_property(property)?.clone(), target.clone()),
        )],
        Axiom::DataPropertyAssertion {
            property,
            source,
            target,
        } => vec![ElAxiom::SubClassOf(
            ClassExpression::nominal(source.clone()),
            ClassExpression::DataHasValue {
                property: property.clone(),
                value: target.clone(),
            },
        )],
        Axiom::SameIndividual(individuals) => equivalent_classes(
            &individuals
                .iter()
                .cloned()
                .map(ClassExpression::nominal)
                .collect::<Vec<_>>(),
        ),
        Axiom::DifferentIndividuals(individuals) => disjoint_classes(
            &individuals
                .iter()
                .cloned()
                .map(ClassExpression::nominal)
                .collect::<Vec<_>>(),
        ),
        Axiom::DeclareClass(class) => vec![ElAxiom::ClassDeclaration(ClassExpression::Class(
            class.clone(),
        ))],
        Axiom::DeclareObjectProperty(property) => {
            vec![ElAxiom::PropertyDeclaration(property.clone())]
        }
        Axiom::DeclareNamedIndividual(individual) => vec![ElAxiom::ClassDeclaration(
            ClassExpression::nominal(individual.clone()),
        )],
    };
    for axiom in &axioms {
        match axiom {
            ElAxiom::SubClassOf(sub, sup) => {
                check(sub, Polarity::Negative)?;
                check(sup, Polarity::Positive)?;
            }
            ElAxiom::DisjointClasses(members) => {
                for member in members {
                    check(member, Polarity::Negative)?;
                }
            }
            ElAxiom::ClassDeclaration(class) => check(class, Polarity::Neutral)?,
            ElAxiom::SubPropertyChainOf(_, _)
            | ElAxiom::ReflexiveObjectProperty(_)
            | ElAxiom::PropertyDeclaration(_) => (),
        }
    }
    Ok(axioms)
}

fn equivalent_classes(classes: &[ClassExpression]) -> Vec<ElAxiom> {
    match classes.split_first() {
        Some((first, others)) if !others.is_empty() => others
            .iter()
            .flat_map(|other| {
                [
                    ElAxiom::SubClassOf(first.clone(), other.clone()),
                    ElAxiom::SubClassOf(other.clone(), first.clone()),
                ]
            })
            .collect(),
        Some((first, _)) => vec![ElAxiom::ClassDeclaration(first.clone())],
        None => Vec::new(),
    }
}

fn disjoint_classes(classes: &[ClassExpression]) -> Vec<ElAxiom> {
    if classes.len() < 2 {
        return classes
            .iter()
            .map(|c| ElAxiom::ClassDeclaration(c.clone()))
            .collect();
    }
    vec![ElAxiom::DisjointClasses(classes.to_vec())]
}

pub(crate) fn object_property(
    expression: &ObjectPropertyExpression,
) -> Result<&ObjectProperty, UnsupportedConstructError> {
    match expression {
        ObjectPropertyExpression::ObjectProperty(p) => Ok(p),
        ObjectPropertyExpression::InverseOf(_) => Err(UnsupportedConstructError::new(
            "ObjectInverseOf",
            Position::Anywhere,
        )),
    }
}

fn check(expression: &ClassExpression, polarity: Polarity) -> Result<(), UnsupportedConstructError> {
    match expression {
        ClassExpression::Class(_) | ClassExpression::DataHasValue { .. } => Ok(()),
        ClassExpression::ObjectOneOf(individuals) => {
            if individuals.len() == 1 {
                Ok(())
            } else {
                Err(UnsupportedConstructError::new(
                    "ObjectOneOf with several individuals",
                    Position::Anywhere,
                ))
            }
        }
        ClassExpression::ObjectIntersectionOf(operands) => operands
            .iter()
            .try_for_each(|operand| check(operand, polarity)),
        ClassExpression::ObjectUnionOf(operands) => {
            if polarity != Polarity::Negative && operands.len() > 1 {
                return Err(UnsupportedConstructError::new(
                    "ObjectUnionOf",
                    Position::Positive,
                ));
            }
            operands
                .iter()
                .try_for_each(|operand| check(operand, polarity))
        }
        ClassExpression::ObjectComplementOf(operand) => {
            if polarity != Polarity::Positive {
                return Err(UnsupportedConstructError::new(
                    "ObjectComplementOf",
                    Position::Negative,
                ));
            }
            check(operand, polarity.complement())
        }
        ClassExpression::ObjectSomeValuesFrom { property, filler } => {
            object_property(property)?;
            check(filler, polarity)
        }
        ClassExpression::ObjectHasValue { property, .. } => {
            object_property(property)?;
            Ok(())
        }
        ClassExpression::ObjectAllValuesFrom { .. }
        | ClassExpression::ObjectHasSelf(_)
        | ClassExpression::ObjectMinCardinality { .. }
        | ClassExpression::DataSomeValuesFrom { .. } => Err(UnsupportedConstructError::new(
            expression.constructor_name(),
            Position::Anywhere,
        )),
    }
}
