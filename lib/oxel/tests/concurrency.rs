#![cfg(test)]
#![allow(clippy::panic_in_result_fn)]

use oxel::{
    Axiom, CancellationToken, ClassExpression, ClassId, Individual, ObjectProperty,
    OntologyIndex, OwlClass, Reasoner, ReasonerConfig, ReasonerError, SaturationObserver,
};
use oxrdf::NamedNode;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

const CLASS_COUNT: usize = 120;
const PROPERTY_COUNT: usize = 4;
const INDIVIDUAL_COUNT: usize = 10;

fn class(i: usize) -> OwlClass {
    OwlClass::new(NamedNode::new_unchecked(format!("http://example.com/C{i}")))
}

fn property(i: usize) -> ObjectProperty {
    ObjectProperty::new(NamedNode::new_unchecked(format!("http://example.com/r{i}")))
}

fn individual(i: usize) -> Individual {
    Individual::new(NamedNode::new_unchecked(format!("http://example.com/i{i}")))
}

/// Linear congruential generator, enough to get a reproducible ontology.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: usize) -> usize {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        usize::try_from(self.0 >> 33).unwrap() % bound
    }

    fn class(&mut self) -> ClassExpression {
        class(self.next(CLASS_COUNT)).into()
    }

    fn some(&mut self) -> ClassExpression {
        ClassExpression::some_values_from(property(self.next(PROPERTY_COUNT)), self.class())
    }
}

fn generate(seed: u64) -> Vec<Axiom> {
    let mut random = Lcg(seed);
    let mut axioms = vec![
        Axiom::sub_object_property_of(property(0), property(1)),
        Axiom::TransitiveObjectProperty(property(1).into()),
        Axiom::SubPropertyChainOf {
            property_chain: vec![property(2).into(), property(0).into()],
            super_property: property(3).into(),
        },
    ];
    for i in 0..CLASS_COUNT {
        let sub = ClassExpression::from(class(i));
        match random.next(6) {
            0 | 1 => axioms.push(Axiom::sub_class_of(sub, random.class())),
            2 => axioms.push(Axiom::sub_class_of(sub, random.some())),
            3 => axioms.push(Axiom::sub_class_of(random.some(), sub)),
            4 => axioms.push(Axiom::sub_class_of(
                ClassExpression::intersection([random.class(), random.class()]),
                sub,
            )),
            _ => axioms.push(Axiom::EquivalentClasses(vec![
                sub,
                ClassExpression::intersection([random.class(), random.some()]),
            ])),
        }
    }
    // Fillers only reached during the saturation
    for i in 0..10 {
        axioms.push(Axiom::sub_class_of(
            class(i).into(),
            ClassExpression::some_values_from(
                property(3),
                ClassExpression::intersection([class(i + 1).into(), class(i + 2).into()]),
            ),
        ));
    }
    for i in 0..INDIVIDUAL_COUNT {
        axioms.push(Axiom::class_assertion(random.class(), individual(i)));
        axioms.push(Axiom::ObjectPropertyAssertion {
            property: property(random.next(PROPERTY_COUNT)).into(),
            source: individual(i),
            target: individual(random.next(INDIVIDUAL_COUNT)),
        });
    }
    axioms
}

fn classification(reasoner: &mut Reasoner) -> Result<Vec<Vec<OwlClass>>, ReasonerError> {
    let mut result = Vec::new();
    for i in 0..CLASS_COUNT {
        result.push(reasoner.super_classes(&class(i), false)?);
    }
    for i in 0..INDIVIDUAL_COUNT {
        result.push(reasoner.types(&individual(i), false)?);
    }
    Ok(result)
}

fn reasoner(axioms: &[Axiom], config: ReasonerConfig) -> Result<Reasoner, ReasonerError> {
    let mut reasoner = Reasoner::with_config(config);
    for axiom in axioms {
        reasoner.add_axiom(axiom.clone())?;
    }
    Ok(reasoner)
}

#[test]
fn test_worker_count_does_not_change_results() -> Result<(), ReasonerError> {
    for seed in [1, 7, 42] {
        let axioms = generate(seed);
        let expected = classification(&mut reasoner(
            &axioms,
            ReasonerConfig::default().sequential(),
        )?)?;
        for workers in [2, 4, 8] {
            let mut parallel = reasoner(&axioms, ReasonerConfig::default().with_workers(workers))?;
            assert_eq!(
                classification(&mut parallel)?,
                expected,
                "seed {seed} with {workers} workers"
            );
        }
    }
    Ok(())
}

#[test]
fn test_parallel_saturation_is_repeatable() -> Result<(), ReasonerError> {
    let axioms = generate(3);
    let mut first = reasoner(&axioms, ReasonerConfig::default().with_workers(4))?;
    let mut second = reasoner(&axioms, ReasonerConfig::default().with_workers(4))?;
    first.classify()?;
    second.classify()?;
    let count = |reasoner: &Reasoner| {
        reasoner
            .saturation_state()
            .contexts()
            .iter()
            .map(|context| context.subsumers().len())
            .sum::<usize>()
    };
    assert_eq!(count(&first), count(&second));
    assert_eq!(first.saturation_state().len(), second.saturation_state().len());
    assert!(
        first
            .saturation_state()
            .contexts()
            .iter()
            .all(|context| context.is_saturated())
    );
    Ok(())
}

/// Cancels the token once a given number of contexts have been created.
struct CancelAfter {
    token: CancellationToken,
    limit: usize,
    created: AtomicUsize,
}

impl SaturationObserver for CancelAfter {
    fn context_created(&self, _root: ClassId) {
        if self.created.fetch_add(1, Ordering::Relaxed) + 1 == self.limit {
            self.token.cancel();
        }
    }
}

fn cancelled_then_resumed(workers: usize) -> Result<(), ReasonerError> {
    let axioms = generate(11);
    let expected = classification(&mut reasoner(
        &axioms,
        ReasonerConfig::default().sequential(),
    )?)?;
    let mut index = OntologyIndex::new();
    for axiom in &axioms {
        index.index_axiom(axiom)?;
    }
    let submitted = index.named_classes().count() + index.individuals().count();

    // Interrupted while the roots are submitted, then during the saturation itself
    for limit in [20, submitted + 5] {
        let token = CancellationToken::new();
        let observer = Arc::new(CancelAfter {
            token: token.clone(),
            limit,
            created: AtomicUsize::new(0),
        });
        let mut reasoner = reasoner(
            &axioms,
            ReasonerConfig::default()
                .with_workers(workers)
                .with_observer(observer),
        )?
        .with_cancellation_token(token.clone());
        assert!(matches!(
            reasoner.classify(),
            Err(ReasonerError::Interrupted)
        ));
        assert!(token.is_cancelled());
        // The token is not cleared by the reasoner
        assert!(matches!(
            reasoner.is_consistent(),
            Err(ReasonerError::Interrupted)
        ));

        token.reset();
        assert_eq!(classification(&mut reasoner)?, expected, "cancelled after {limit}");
    }
    Ok(())
}

#[test]
fn test_cancelled_classification_resumes() -> Result<(), ReasonerError> {
    cancelled_then_resumed(1)
}

#[test]
fn test_cancelled_parallel_classification_resumes() -> Result<(), ReasonerError> {
    cancelled_then_resumed(4)
}

#[test]
fn test_changes_after_cancellation() -> Result<(), ReasonerError> {
    let axioms = generate(5);
    let (first, second) = axioms.split_at(axioms.len() / 2);

    let token = CancellationToken::new();
    let mut reasoner = reasoner(first, ReasonerConfig::default().with_workers(2))?
        .with_cancellation_token(token.clone());
    token.cancel();
    assert!(matches!(
        reasoner.classify(),
        Err(ReasonerError::Interrupted)
    ));
    token.reset();
    for axiom in second {
        reasoner.add_axiom(axiom.clone())?;
    }
    reasoner.remove_axiom(&first[first.len() - 1])?;

    let mut remaining = axioms.clone();
    remaining.remove(first.len() - 1);
    let expected = classification(&mut self::reasoner(
        &remaining,
        ReasonerConfig::default().sequential(),
    )?)?;
    assert_eq!(classification(&mut reasoner)?, expected);
    Ok(())
}

#[test]
fn test_class_removed_after_cancellation() -> Result<(), ReasonerError> {
    let removed = Axiom::sub_class_of(class(0).into(), class(1).into());
    let kept = Axiom::sub_class_of(class(2).into(), class(3).into());
    for workers in [1, 4] {
        let token = CancellationToken::new();
        let mut reasoner = reasoner(
            &[removed.clone(), kept.clone()],
            ReasonerConfig::default().with_workers(workers),
        )?
        .with_cancellation_token(token.clone());
        token.cancel();
        assert!(matches!(
            reasoner.classify(),
            Err(ReasonerError::Interrupted)
        ));
        token.reset();
        // C0 and C1 leave the index while their contexts still have pending conclusions
        assert!(reasoner.remove_axiom(&removed)?);
        assert!(reasoner.index().class_id(&class(0)).is_none());
        reasoner.classify()?;
        reasoner.validate_saturation_graph()?;

        let mut fresh = self::reasoner(
            std::slice::from_ref(&kept),
            ReasonerConfig::default().sequential(),
        )?;
        for i in 0..4 {
            assert_eq!(
                reasoner.super_classes(&class(i), false)?,
                fresh.super_classes(&class(i), false)?,
                "C{i} with {workers} workers"
            );
        }
        assert!(reasoner.is_consistent()?);
    }
    Ok(())
}

#[test]
fn test_class_removed_during_interrupted_saturation() -> Result<(), ReasonerError> {
    let axioms = generate(13);
    let extra = Axiom::sub_class_of(
        OwlClass::new(NamedNode::new_unchecked("http://example.com/Orphan")).into(),
        ClassExpression::some_values_from(property(0), class(5).into()),
    );
    let mut all = axioms.clone();
    all.push(extra.clone());
    let expected = classification(&mut self::reasoner(
        &axioms,
        ReasonerConfig::default().sequential(),
    )?)?;

    let token = CancellationToken::new();
    let observer = Arc::new(CancelAfter {
        token: token.clone(),
        limit: CLASS_COUNT + INDIVIDUAL_COUNT + 5,
        created: AtomicUsize::new(0),
    });
    let mut reasoner = reasoner(
        &all,
        ReasonerConfig::default()
            .with_workers(4)
            .with_observer(observer),
    )?
    .with_cancellation_token(token.clone());
    assert!(matches!(
        reasoner.classify(),
        Err(ReasonerError::Interrupted)
    ));
    token.reset();
    assert!(reasoner.remove_axiom(&extra)?);
    reasoner.validate_saturation_graph()?;
    assert_eq!(classification(&mut reasoner)?, expected);
    Ok(())
}
