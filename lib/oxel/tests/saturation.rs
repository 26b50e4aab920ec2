#![cfg(test)]
#![allow(clippy::panic_in_result_fn)]

use oxel::{
    Axiom, ClassExpression, Conclusion, DataProperty, Individual, ObjectProperty, OwlClass,
    Reasoner, ReasonerConfig, ReasonerError, RuleApplicationMode,
};
use oxrdf::{Literal, NamedNode};

fn class(name: &str) -> OwlClass {
    OwlClass::new(NamedNode::new_unchecked(format!("http://example.com/{name}")))
}

fn named(name: &str) -> ClassExpression {
    class(name).into()
}

fn property(name: &str) -> ObjectProperty {
    ObjectProperty::new(NamedNode::new_unchecked(format!("http://example.com/{name}")))
}

fn individual(name: &str) -> Individual {
    Individual::new(NamedNode::new_unchecked(format!("http://example.com/{name}")))
}

fn some(property_name: &str, filler: ClassExpression) -> ClassExpression {
    ClassExpression::some_values_from(property(property_name), filler)
}

fn sub(sub_class: ClassExpression, super_class: ClassExpression) -> Axiom {
    Axiom::sub_class_of(sub_class, super_class)
}

fn reasoner(axioms: impl IntoIterator<Item = Axiom>) -> Result<Reasoner, ReasonerError> {
    let mut reasoner = Reasoner::with_config(ReasonerConfig::default().sequential());
    for axiom in axioms {
        reasoner.add_axiom(axiom)?;
    }
    Ok(reasoner)
}

#[test]
fn test_told_subsumers() -> Result<(), ReasonerError> {
    let mut reasoner = reasoner([sub(named("A"), named("B")), sub(named("B"), named("C"))])?;
    assert_eq!(
        reasoner.super_classes(&class("A"), false)?,
        [class("B"), class("C"), OwlClass::thing()]
    );
    assert_eq!(reasoner.super_classes(&class("A"), true)?, [class("B")]);

    let a = reasoner.index().class_id(&class("A")).unwrap();
    let b = reasoner.index().class_id(&class("B")).unwrap();
    let c = reasoner.index().class_id(&class("C")).unwrap();
    let subsumers = reasoner.subsumers(a)?;
    assert!(subsumers.contains(&a));
    assert!(subsumers.contains(&b));
    assert!(subsumers.contains(&c));
    let context = reasoner.context_state(a)?.unwrap();
    assert!(context.is_saturated());
    assert!(!context.has_contradiction());
    assert!(reasoner.is_consistent()?);
    Ok(())
}

#[test]
fn test_unsatisfiable_class() -> Result<(), ReasonerError> {
    let mut reasoner = reasoner([
        sub(named("A"), named("B")),
        sub(named("A"), ClassExpression::complement(named("B"))),
    ])?;
    let a = reasoner.index().class_id(&class("A")).unwrap();
    assert!(reasoner.context_state(a)?.unwrap().has_contradiction());
    assert!(!reasoner.is_satisfiable(&class("A"))?);
    assert!(reasoner.is_satisfiable(&class("B"))?);
    assert!(
        reasoner
            .equivalent_classes(&class("A"))?
            .contains(&OwlClass::nothing())
    );
    // No individual: the ontology itself has models
    assert!(reasoner.is_consistent()?);

    reasoner.add_axiom(Axiom::class_assertion(named("A"), individual("a")))?;
    assert!(!reasoner.is_consistent()?);
    // Top and bottom coincide
    assert!(
        reasoner
            .equivalent_classes(&OwlClass::thing())?
            .contains(&OwlClass::nothing())
    );
    Ok(())
}

#[test]
fn test_existential_over_super_property() -> Result<(), ReasonerError> {
    let mut reasoner = reasoner([
        sub(named("A"), some("r", named("B"))),
        sub(named("B"), named("C")),
        Axiom::sub_object_property_of(property("r"), property("s")),
        sub(some("s", named("C")), named("D")),
    ])?;
    assert!(reasoner.super_classes(&class("A"), false)?.contains(&class("D")));
    assert!(!reasoner.super_classes(&class("B"), false)?.contains(&class("D")));

    // A is linked over r to B whose subsumers include C
    let a = reasoner.index().class_id(&class("A")).unwrap();
    let b = reasoner.index().class_id(&class("B")).unwrap();
    let c = reasoner.index().class_id(&class("C")).unwrap();
    let r = reasoner.index().property_id(&property("r")).unwrap();
    let context = reasoner.context_state(b)?.unwrap();
    assert!(context.premises().backward_links().any(|link| link == (r, a)));
    assert!(context.subsumers().contains(&c));
    Ok(())
}

#[test]
fn test_transitive_property() -> Result<(), ReasonerError> {
    let mut reasoner = reasoner([
        Axiom::TransitiveObjectProperty(property("r").into()),
        sub(named("A"), some("r", named("B"))),
        sub(named("B"), some("r", named("C"))),
        sub(named("C"), some("r", named("E"))),
        sub(some("r", named("E")), named("D")),
        sub(some("r", named("C")), named("F")),
    ])?;
    let supers = reasoner.super_classes(&class("A"), false)?;
    assert!(supers.contains(&class("D")));
    assert!(supers.contains(&class("F")));
    assert!(reasoner.super_classes(&class("B"), false)?.contains(&class("D")));
    assert!(!reasoner.super_classes(&class("C"), false)?.contains(&class("F")));
    Ok(())
}

#[test]
fn test_property_chain() -> Result<(), ReasonerError> {
    let mut reasoner = reasoner([
        Axiom::SubPropertyChainOf {
            property_chain: vec![property("r").into(), property("s").into()],
            super_property: property("t").into(),
        },
        sub(named("A"), some("r", named("B"))),
        sub(named("B"), some("s", named("C"))),
        sub(some("t", named("C")), named("D")),
    ])?;
    assert!(reasoner.super_classes(&class("A"), false)?.contains(&class("D")));
    assert!(!reasoner.super_classes(&class("B"), false)?.contains(&class("D")));
    Ok(())
}

#[test]
fn test_reflexive_property() -> Result<(), ReasonerError> {
    let mut reasoner = reasoner([
        Axiom::ReflexiveObjectProperty(property("r").into()),
        sub(named("A"), named("B")),
        sub(some("r", named("B")), named("C")),
    ])?;
    assert!(reasoner.super_classes(&class("A"), false)?.contains(&class("C")));
    assert!(reasoner.super_classes(&class("B"), false)?.contains(&class("C")));
    Ok(())
}

#[test]
fn test_reflexive_chain_suffix() -> Result<(), ReasonerError> {
    let mut reasoner = reasoner([
        Axiom::ReflexiveObjectProperty(property("s").into()),
        Axiom::SubPropertyChainOf {
            property_chain: vec![property("r").into(), property("s").into()],
            super_property: property("t").into(),
        },
        sub(named("A"), some("r", named("B"))),
        sub(some("t", named("B")), named("C")),
    ])?;
    assert!(reasoner.super_classes(&class("A"), false)?.contains(&class("C")));
    Ok(())
}

#[test]
fn test_conjunction_and_disjunction() -> Result<(), ReasonerError> {
    let mut reasoner = reasoner([
        sub(named("A"), named("B")),
        sub(named("A"), named("C")),
        sub(
            ClassExpression::intersection([named("B"), named("C")]),
            named("D"),
        ),
        sub(ClassExpression::union([named("D"), named("E")]), named("F")),
        sub(named("G"), ClassExpression::intersection([named("E"), named("H")])),
    ])?;
    let supers = reasoner.super_classes(&class("A"), false)?;
    assert!(supers.contains(&class("D")));
    assert!(supers.contains(&class("F")));
    let supers = reasoner.super_classes(&class("G"), false)?;
    assert!(supers.contains(&class("E")));
    assert!(supers.contains(&class("F")));
    assert!(!supers.contains(&class("D")));
    Ok(())
}

#[test]
fn test_owl_thing_super_class() -> Result<(), ReasonerError> {
    let mut reasoner = reasoner([
        sub(named("A"), named("B")),
        sub(ClassExpression::thing(), named("E")),
    ])?;
    assert!(reasoner.super_classes(&class("A"), false)?.contains(&class("E")));
    assert!(
        reasoner
            .equivalent_classes(&class("E"))?
            .contains(&OwlClass::thing())
    );
    Ok(())
}

#[test]
fn test_disjoint_classes() -> Result<(), ReasonerError> {
    let mut reasoner = reasoner([
        Axiom::DisjointClasses(vec![named("B"), named("C")]),
        sub(named("A"), named("B")),
        sub(named("A"), named("C")),
        sub(named("D"), named("B")),
        Axiom::DisjointClasses(vec![named("E"), named("E")]),
    ])?;
    assert!(!reasoner.is_satisfiable(&class("A"))?);
    assert!(reasoner.is_satisfiable(&class("B"))?);
    assert!(reasoner.is_satisfiable(&class("D"))?);
    assert!(!reasoner.is_satisfiable(&class("E"))?);
    assert!(reasoner.is_consistent()?);
    Ok(())
}

#[test]
fn test_contradiction_propagation_over_links() -> Result<(), ReasonerError> {
    let mut reasoner = reasoner([
        sub(named("A"), some("r", named("B"))),
        sub(named("X"), some("s", named("A"))),
        sub(named("B"), ClassExpression::nothing()),
    ])?;
    assert!(!reasoner.is_satisfiable(&class("B"))?);
    assert!(!reasoner.is_satisfiable(&class("A"))?);
    assert!(!reasoner.is_satisfiable(&class("X"))?);
    assert!(reasoner.is_consistent()?);
    Ok(())
}

#[test]
fn test_individuals() -> Result<(), ReasonerError> {
    let mut reasoner = reasoner([
        Axiom::class_assertion(named("A"), individual("a")),
        sub(named("A"), named("B")),
        Axiom::ObjectPropertyAssertion {
            property: property("r").into(),
            source: individual("a"),
            target: individual("b"),
        },
        Axiom::class_assertion(named("C"), individual("b")),
        sub(some("r", named("C")), named("D")),
        sub(
            ClassExpression::has_value(property("r"), individual("b")),
            named("E"),
        ),
    ])?;
    assert_eq!(
        reasoner.types(&individual("a"), false)?,
        [
            class("A"),
            class("B"),
            class("D"),
            class("E"),
            OwlClass::thing()
        ]
    );
    assert_eq!(
        reasoner.types(&individual("a"), true)?,
        [class("A"), class("D"), class("E")]
    );
    assert_eq!(reasoner.types(&individual("unknown"), false)?, [OwlClass::thing()]);
    assert!(reasoner.is_consistent()?);
    Ok(())
}

#[test]
fn test_different_individuals() -> Result<(), ReasonerError> {
    let mut reasoner = reasoner([
        Axiom::DifferentIndividuals(vec![individual("a"), individual("b")]),
        Axiom::SameIndividual(vec![individual("a"), individual("b")]),
    ])?;
    assert!(!reasoner.is_consistent()?);
    Ok(())
}

#[test]
fn test_data_has_value_is_atomic() -> Result<(), ReasonerError> {
    let property = DataProperty::new(NamedNode::new_unchecked("http://example.com/age"));
    let value = Literal::from(42);
    let mut reasoner = reasoner([
        Axiom::DataPropertyAssertion {
            property: property.clone(),
            source: individual("a"),
            target: value.clone(),
        },
        sub(
            ClassExpression::DataHasValue { property, value },
            named("Adult"),
        ),
    ])?;
    assert!(reasoner.types(&individual("a"), false)?.contains(&class("Adult")));
    Ok(())
}

#[test]
fn test_unsupported_axiom_is_skipped() -> Result<(), ReasonerError> {
    let mut reasoner = reasoner([sub(named("A"), named("B"))])?;
    let before = reasoner.index().snapshot();
    let result = reasoner.add_axiom(sub(
        named("A"),
        ClassExpression::ObjectAllValuesFrom {
            property: property("r").into(),
            filler: Box::new(named("C")),
        },
    ));
    assert!(matches!(result, Err(ReasonerError::Unsupported(_))));
    assert_eq!(reasoner.index().snapshot(), before);
    assert!(!reasoner.is_complete());
    assert_eq!(reasoner.super_classes(&class("A"), true)?, [class("B")]);
    Ok(())
}

#[test]
fn test_saturation_is_idempotent() -> Result<(), ReasonerError> {
    let mut reasoner = reasoner([
        sub(named("A"), some("r", named("B"))),
        sub(named("B"), named("C")),
    ])?;
    reasoner.classify()?;
    assert!(reasoner.saturation_state().poll_for_active_context().is_none());
    let processed = reasoner.statistics().snapshot().conclusions_processed;
    assert!(processed > 0);
    reasoner.classify()?;
    assert_eq!(
        reasoner.statistics().snapshot().conclusions_processed,
        processed
    );
    assert!(
        reasoner
            .saturation_state()
            .contexts()
            .iter()
            .all(|context| context.is_saturated())
    );
    Ok(())
}

#[test]
fn test_rule_application_modes_agree() -> Result<(), ReasonerError> {
    let axioms = [
        Axiom::TransitiveObjectProperty(property("part").into()),
        Axiom::sub_object_property_of(property("direct"), property("part")),
        sub(named("A"), some("direct", ClassExpression::intersection([named("B"), named("C")]))),
        sub(named("B"), some("part", named("D"))),
        sub(
            some("part", ClassExpression::intersection([named("D"), named("E")])),
            named("F"),
        ),
        sub(named("C"), named("E")),
        sub(named("D"), named("E")),
        sub(some("part", named("E")), named("G")),
        sub(
            ClassExpression::intersection([named("G"), some("part", named("D"))]),
            named("H"),
        ),
        sub(ClassExpression::union([named("H"), named("F")]), named("I")),
    ];
    let classes = ["A", "B", "C", "D", "E", "F", "G", "H", "I"];
    let mut taxonomies = Vec::new();
    for mode in [RuleApplicationMode::NonRedundant, RuleApplicationMode::All] {
        let mut reasoner = Reasoner::with_config(
            ReasonerConfig::default()
                .sequential()
                .with_rule_application(mode),
        );
        for axiom in axioms.clone() {
            reasoner.add_axiom(axiom)?;
        }
        let mut taxonomy = Vec::new();
        for name in classes {
            taxonomy.push(reasoner.super_classes(&class(name), false)?);
        }
        taxonomies.push(taxonomy);
    }
    assert_eq!(taxonomies[0], taxonomies[1]);
    assert!(taxonomies[0][0].contains(&class("H")));
    assert!(taxonomies[0][0].contains(&class("I")));
    Ok(())
}

#[test]
fn test_stored_conclusions() -> Result<(), ReasonerError> {
    let mut reasoner = reasoner([sub(named("A"), named("B"))])?;
    let a = reasoner.index().class_id(&class("A")).unwrap();
    let b = reasoner.index().class_id(&class("B")).unwrap();
    let context = reasoner.context_state(a)?.unwrap();
    let premises = context.premises();
    assert!(premises.is_initialized());
    assert!(premises.contains(&Conclusion::ContextInitialization));
    assert!(premises.contains(&Conclusion::DecomposedSubsumer(b)));
    assert!(!premises.contains(&Conclusion::Contradiction));
    Ok(())
}
