//! Classifies a small anatomy ontology and prints the inferred hierarchy.
//!
//! Run with: RUST_LOG=oxel=debug cargo run -p oxel --example classify

#![allow(clippy::print_stdout)]

use anyhow::Result;
use oxel::{
    Axiom, ClassExpression, Conclusion, Individual, ObjectProperty, OwlClass, Reasoner,
    ReasonerConfig,
};
use oxrdf::NamedNode;
use tracing_subscriber::EnvFilter;

const PREFIX: &str = "http://example.org/anatomy#";

fn class(name: &str) -> Result<OwlClass> {
    Ok(OwlClass::new(NamedNode::new(format!("{PREFIX}{name}"))?))
}

fn property(name: &str) -> Result<ObjectProperty> {
    Ok(ObjectProperty::new(NamedNode::new(format!("{PREFIX}{name}"))?))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let part_of = property("partOf")?;
    let has_location = property("hasLocation")?;
    let heart = class("Heart")?;
    let organ = class("Organ")?;
    let heart_valve = class("HeartValve")?;
    let heart_part = class("HeartPart")?;
    let cardiac_structure = class("CardiacStructure")?;
    let heart_disease = class("HeartDisease")?;
    let endocarditis = class("Endocarditis")?;
    let inflammation = class("Inflammation")?;

    let axioms = vec![
        Axiom::TransitiveObjectProperty(part_of.clone().into()),
        Axiom::SubPropertyChainOf {
            property_chain: vec![has_location.clone().into(), part_of.clone().into()],
            super_property: has_location.clone().into(),
        },
        Axiom::sub_class_of(heart.clone().into(), organ.clone().into()),
        Axiom::sub_class_of(
            heart_valve.clone().into(),
            ClassExpression::some_values_from(part_of.clone(), heart.clone().into()),
        ),
        Axiom::EquivalentClasses(vec![
            heart_part.clone().into(),
            ClassExpression::some_values_from(part_of.clone(), heart.clone().into()),
        ]),
        Axiom::sub_class_of(
            ClassExpression::union([heart.clone().into(), heart_part.clone().into()]),
            cardiac_structure.clone().into(),
        ),
        Axiom::EquivalentClasses(vec![
            heart_disease.clone().into(),
            ClassExpression::some_values_from(has_location.clone(), heart.clone().into()),
        ]),
        Axiom::EquivalentClasses(vec![
            endocarditis.clone().into(),
            ClassExpression::intersection([
                inflammation.clone().into(),
                ClassExpression::some_values_from(has_location, heart_valve.clone().into()),
            ]),
        ]),
        Axiom::class_assertion(
            endocarditis.clone().into(),
            Individual::new(NamedNode::new(format!("{PREFIX}patientCase"))?),
        ),
    ];

    let mut reasoner = Reasoner::with_config(ReasonerConfig::default().with_workers(2));
    let loaded = reasoner.add_axioms(axioms)?;
    println!("Loaded {loaded} axioms");
    reasoner.classify()?;
    println!("Consistent: {}", reasoner.is_consistent()?);

    for class in [
        &heart,
        &heart_valve,
        &heart_part,
        &cardiac_structure,
        &heart_disease,
        &endocarditis,
    ] {
        let supers = reasoner.super_classes(class, true)?;
        let supers = supers
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        println!("{class} direct super classes: {supers}");
    }

    let case = Individual::new(NamedNode::new(format!("{PREFIX}patientCase"))?);
    for class in reasoner.types(&case, true)? {
        println!("patientCase is a {class}");
    }

    if let (Some(endocarditis), Some(heart_disease)) = (
        reasoner.index().class_id(&endocarditis),
        reasoner.index().class_id(&heart_disease),
    ) {
        for inference in
            reasoner.inferences(endocarditis, &Conclusion::ComposedSubsumer(heart_disease))?
        {
            println!("HeartDisease derived for Endocarditis by {inference:?}");
        }
    }

    let statistics = reasoner.statistics().snapshot();
    println!(
        "{} contexts created, {} conclusions processed",
        statistics.contexts_created, statistics.conclusions_processed
    );
    Ok(())
}
