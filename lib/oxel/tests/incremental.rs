#![cfg(test)]
#![allow(clippy::panic_in_result_fn)]

use oxel::{
    Axiom, ClassExpression, Individual, ObjectProperty, OwlClass, Reasoner, ReasonerConfig,
    ReasonerError,
};
use oxrdf::NamedNode;

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

const CLASSES: [&str; 10] = ["A", "B", "C", "D", "E", "F", "G", "H", "X", "Y"];
const INDIVIDUALS: [&str; 2] = ["a", "b"];

/// Everything the reasoner can answer about the fixed vocabulary.
#[derive(Debug, PartialEq, Eq)]
struct Classification {
    consistent: bool,
    classes: Vec<(OwlClass, bool, Vec<OwlClass>)>,
    individuals: Vec<(Individual, Vec<OwlClass>)>,
}

fn classification(reasoner: &mut Reasoner) -> Result<Classification, ReasonerError> {
    // Every incremental step must leave no dangling handle behind
    reasoner.validate_saturation_graph()?;
    let mut classes = Vec::new();
    for name in CLASSES {
        let class = class(name);
        let satisfiable = reasoner.is_satisfiable(&class)?;
        let supers = reasoner.super_classes(&class, false)?;
        classes.push((class, satisfiable, supers));
    }
    let mut individuals = Vec::new();
    for name in INDIVIDUALS {
        let individual = individual(name);
        let types = reasoner.types(&individual, false)?;
        individuals.push((individual, types));
    }
    Ok(Classification {
        consistent: reasoner.is_consistent()?,
        classes,
        individuals,
    })
}

fn from_scratch(axioms: &[Axiom], workers: usize) -> Result<Classification, ReasonerError> {
    let mut reasoner = Reasoner::with_config(ReasonerConfig::default().with_workers(workers));
    for axiom in axioms {
        reasoner.add_axiom(axiom.clone())?;
    }
    classification(&mut reasoner)
}

fn class_axioms() -> Vec<Axiom> {
    vec![
        sub(named("A"), some("r", named("B"))),
        sub(some("s", named("B")), named("C")),
        sub(named("B"), named("D")),
        sub(some("r", named("D")), named("E")),
        sub(ClassExpression::intersection([named("C"), named("E")]), named("F")),
        sub(named("G"), some("r", named("A"))),
        sub(some("r", named("F")), named("H")),
        sub(ClassExpression::union([named("H"), named("X")]), named("Y")),
        Axiom::class_assertion(named("G"), individual("a")),
        Axiom::ObjectPropertyAssertion {
            property: property("r").into(),
            source: individual("b"),
            target: individual("a"),
        },
    ]
}

fn property_axioms() -> Vec<Axiom> {
    vec![
        Axiom::sub_object_property_of(property("r"), property("s")),
        Axiom::TransitiveObjectProperty(property("r").into()),
    ]
}

#[test]
fn test_additions_match_scratch() -> Result<(), ReasonerError> {
    let axioms = [class_axioms(), property_axioms()].concat();
    let expected = from_scratch(&axioms, 1)?;
    for workers in [1, 4] {
        let mut reasoner = Reasoner::with_config(ReasonerConfig::default().with_workers(workers));
        for axiom in &property_axioms() {
            reasoner.add_axiom(axiom.clone())?;
        }
        reasoner.classify()?;
        for axiom in class_axioms() {
            reasoner.add_axiom(axiom)?;
            reasoner.validate_saturation_graph()?;
        }
        assert_eq!(classification(&mut reasoner)?, expected);
    }
    Ok(())
}

#[test]
fn test_removals_match_scratch() -> Result<(), ReasonerError> {
    let all = [property_axioms(), class_axioms()].concat();
    for removed in 0..all.len() {
        let kept = all
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != removed)
            .map(|(_, axiom)| axiom.clone())
            .collect::<Vec<_>>();
        let expected = from_scratch(&kept, 1)?;

        let mut reasoner = Reasoner::with_config(ReasonerConfig::default().sequential());
        reasoner.add_axioms(all.iter().cloned())?;
        reasoner.classify()?;
        assert!(reasoner.remove_axiom(&all[removed])?);
        assert_eq!(
            classification(&mut reasoner)?,
            expected,
            "removing {:?}",
            all[removed]
        );
    }
    Ok(())
}

#[test]
fn test_mixed_changes_match_scratch() -> Result<(), ReasonerError> {
    let mut reasoner = Reasoner::with_config(ReasonerConfig::default().with_workers(2));
    reasoner.add_axioms(class_axioms())?;
    reasoner.classify()?;

    let added = [
        sub(named("D"), named("X")),
        sub(named("Y"), some("r", named("C"))),
    ];
    reasoner.add_axioms(added.iter().cloned())?;
    reasoner.remove_axiom(&sub(named("B"), named("D")))?;
    reasoner.remove_axiom(&Axiom::class_assertion(named("G"), individual("a")))?;

    let mut expected = class_axioms();
    expected.retain(|axiom| {
        axiom != &sub(named("B"), named("D"))
            && axiom != &Axiom::class_assertion(named("G"), individual("a"))
    });
    expected.extend(added);
    assert_eq!(classification(&mut reasoner)?, from_scratch(&expected, 1)?);
    Ok(())
}

#[test]
fn test_contradiction_is_retracted() -> Result<(), ReasonerError> {
    let disjoint = Axiom::DisjointClasses(vec![named("B"), named("D")]);
    let mut reasoner = Reasoner::with_config(ReasonerConfig::default().sequential());
    reasoner.add_axioms(class_axioms())?;
    reasoner.add_axiom(disjoint.clone())?;
    assert!(!reasoner.is_satisfiable(&class("B"))?);
    assert!(!reasoner.is_satisfiable(&class("A"))?);
    assert!(!reasoner.is_consistent()?);

    assert!(reasoner.remove_axiom(&disjoint)?);
    assert!(reasoner.is_satisfiable(&class("B"))?);
    assert!(reasoner.is_satisfiable(&class("A"))?);
    assert!(reasoner.is_consistent()?);
    assert_eq!(classification(&mut reasoner)?, from_scratch(&class_axioms(), 1)?);
    Ok(())
}

#[test]
fn test_additions_are_monotone() -> Result<(), ReasonerError> {
    let mut reasoner = Reasoner::with_config(ReasonerConfig::default().sequential());
    let mut previous = classification(&mut reasoner)?;
    for axiom in class_axioms() {
        reasoner.add_axiom(axiom)?;
        let current = classification(&mut reasoner)?;
        for ((class, _, before), (_, _, after)) in previous.classes.iter().zip(&current.classes) {
            for sup in before {
                assert!(after.contains(sup), "{class} lost the super class {sup}");
            }
        }
        previous = current;
    }
    Ok(())
}

#[test]
fn test_add_then_remove_restores_results() -> Result<(), ReasonerError> {
    let mut reasoner = Reasoner::with_config(ReasonerConfig::default().sequential());
    reasoner.add_axioms(class_axioms())?;
    let before = classification(&mut reasoner)?;
    let snapshot = reasoner.index().snapshot();

    let extra = [
        sub(named("Y"), named("A")),
        Axiom::sub_object_property_of(property("r"), property("s")),
    ];
    reasoner.add_axioms(extra.iter().cloned())?;
    assert_ne!(classification(&mut reasoner)?, before);
    for axiom in &extra {
        assert!(reasoner.remove_axiom(axiom)?);
    }
    assert_eq!(classification(&mut reasoner)?, before);
    assert_eq!(reasoner.index().snapshot(), snapshot);
    Ok(())
}

#[test]
fn test_remove_unknown_axiom() -> Result<(), ReasonerError> {
    let mut reasoner = Reasoner::with_config(ReasonerConfig::default().sequential());
    reasoner.add_axioms(class_axioms())?;
    let snapshot = reasoner.index().snapshot();
    assert!(!reasoner.remove_axiom(&sub(named("A"), named("Y")))?);
    assert_eq!(reasoner.index().snapshot(), snapshot);
    Ok(())
}

#[test]
fn test_duplicate_axioms_are_counted() -> Result<(), ReasonerError> {
    let axiom = sub(named("A"), named("B"));
    let mut reasoner = Reasoner::with_config(ReasonerConfig::default().sequential());
    reasoner.add_axiom(axiom.clone())?;
    reasoner.add_axiom(axiom.clone())?;
    assert_eq!(reasoner.axiom_count(), 1);
    assert!(reasoner.remove_axiom(&axiom)?);
    assert!(reasoner.super_classes(&class("A"), false)?.contains(&class("B")));
    assert!(reasoner.remove_axiom(&axiom)?);
    assert!(!reasoner.remove_axiom(&axiom)?);
    assert_eq!(reasoner.super_classes(&class("A"), false)?, [OwlClass::thing()]);
    Ok(())
}

#[test]
fn test_addition_only_creates_new_contexts() -> Result<(), ReasonerError> {
    let mut reasoner = Reasoner::with_config(ReasonerConfig::default().sequential());
    reasoner.add_axioms(class_axioms())?;
    reasoner.classify()?;
    let created = reasoner.statistics().snapshot().contexts_created;
    reasoner.add_axiom(sub(named("Z1"), named("Z2")))?;
    reasoner.classify()?;
    assert_eq!(reasoner.statistics().snapshot().contexts_created, created + 2);
    assert!(reasoner.super_classes(&class("Z1"), true)?.contains(&class("Z2")));
    Ok(())
}

#[test]
fn test_removed_classes_leave_no_dangling_handles() -> Result<(), ReasonerError> {
    let mut reasoner = Reasoner::with_config(ReasonerConfig::default().with_workers(2));
    let mut loaded = Vec::new();
    for axiom in [class_axioms(), property_axioms()].concat() {
        reasoner.add_axiom(axiom.clone())?;
        reasoner.validate_saturation_graph()?;
        loaded.push(axiom);
    }
    let extra = [
        sub(named("Z"), some("r", named("W"))),
        sub(some("s", named("W")), named("A")),
        Axiom::DisjointClasses(vec![named("Z"), named("H")]),
    ];
    for axiom in &extra {
        reasoner.add_axiom(axiom.clone())?;
        reasoner.validate_saturation_graph()?;
    }
    for axiom in extra.iter().chain(&loaded) {
        assert!(reasoner.remove_axiom(axiom)?);
        reasoner.validate_saturation_graph()?;
    }
    assert_eq!(reasoner.axiom_count(), 0);
    Ok(())
}
