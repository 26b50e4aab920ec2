use crate::model::entity::{DataProperty, Individual, ObjectProperty, OwlClass};
use crate::model::expression::{ClassExpression, ObjectPropertyExpression};
use oxrdf::Literal;

/// An OWL 2 axiom, as fed to the reasoner.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Axiom {
    /// SubClassOf(sub, super)
    SubClassOf {
        sub_class: ClassExpression,
        super_class: ClassExpression,
    },
    /// EquivalentClasses(C1, C2, ...)
    EquivalentClasses(Vec<ClassExpression>),
    /// DisjointClasses(C1, C2, ...)
    DisjointClasses(Vec<ClassExpression>),
    /// SubObjectPropertyOf(sub, super)
    SubObjectPropertyOf {
        sub_property: ObjectPropertyExpression,
        super_property: ObjectPropertyExpression,
    },
    /// SubObjectPropertyOf(ObjectPropertyChain(P1 ... Pn), P)
    SubPropertyChainOf {
        property_chain: Vec<ObjectPropertyExpression>,
        super_property: ObjectPropertyExpression,
    },
    /// EquivalentObjectProperties(P1, P2, ...)
    EquivalentObjectProperties(Vec<ObjectPropertyExpression>),
    /// TransitiveObjectProperty(P)
    TransitiveObjectProperty(ObjectPropertyExpression),
    /// ReflexiveObjectProperty(P)
    ReflexiveObjectProperty(ObjectPropertyExpression),
    /// ObjectPropertyDomain(P, C)
    ObjectPropertyDomain {
        property: ObjectPropertyExpression,
        domain: ClassExpression,
    },
    /// ObjectPropertyRange(P, C)
    ObjectPropertyRange {
        property: ObjectPropertyExpression,
        range: ClassExpression,
    },
    /// InverseObjectProperties(P1, P2)
    InverseObjectProperties(ObjectProperty, ObjectProperty),
    /// FunctionalObjectProperty(P)
    FunctionalObjectProperty(ObjectPropertyExpression),
    /// SymmetricObjectProperty(P)
    SymmetricObjectProperty(ObjectPropertyExpression),
    /// ClassAssertion(C, a)
    ClassAssertion {
        class: ClassExpression,
        individual: Individual,
    },
    /// ObjectPropertyAssertion(P, a, b)
    ObjectPropertyAssertion {
        property: ObjectPropertyExpression,
        source: Individual,
        target: Individual,
    },
    /// DataPropertyAssertion(P, a, v)
    DataPropertyAssertion {
        property: DataProperty,
        source: Individual,
        target: Literal,
    },
    /// SameIndividual(a1, a2, ...)
    SameIndividual(Vec<Individual>),
    /// DifferentIndividuals(a1, a2, ...)
    DifferentIndividuals(Vec<Individual>),
    /// Declaration(Class(C))
    DeclareClass(OwlClass),
    /// Declaration(ObjectProperty(P))
    DeclareObjectProperty(ObjectProperty),
    /// Declaration(NamedIndividual(a))
    DeclareNamedIndividual(Individual),
}

impl Axiom {
    pub fn sub_class_of(sub_class: ClassExpression, super_class: ClassExpression) -> Self {
        Self::SubClassOf {
            sub_class,
            super_class,
        }
    }

    pub fn sub_object_property_of(sub: ObjectProperty, sup: ObjectProperty) -> Self {
        Self::SubObjectPropertyOf {
            sub_property: sub.into(),
            super_property: sup.into(),
        }
    }

    pub fn class_assertion(class: ClassExpression, individual: impl Into<Individual>) -> Self {
        Self::ClassAssertion {
            class,
            individual: individual.into(),
        }
    }

    /// The OWL functional syntax name of the axiom type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::SubClassOf { .. } => "SubClassOf",
            Self::EquivalentClasses(_) => "EquivalentClasses",
            Self::DisjointClasses(_) => "DisjointClasses",
            Self::SubObjectPropertyOf { .. } | Self::SubPropertyChainOf { .. } => {
                "SubObjectPropertyOf"
            }
            Self::EquivalentObjectProperties(_) => "EquivalentObjectProperties",
            Self::TransitiveObjectProperty(_) => "TransitiveObjectProperty",
            Self::ReflexiveObjectProperty(_) => "ReflexiveObjectProperty",
            Self::ObjectPropertyDomain { .. } => "ObjectPropertyDomain",
            Self::ObjectPropertyRange { .. } => "ObjectPropertyRange",
            Self::InverseObjectProperties(_, _) => "InverseObjectProperties",
            Self::FunctionalObjectProperty(_) => "FunctionalObjectProperty",
            Self::SymmetricObjectProperty(_) => "SymmetricObjectProperty",
            Self::ClassAssertion { .. } => "ClassAssertion",
            Self::ObjectPropertyAssertion { .. } => "ObjectPropertyAssertion",
            Self::DataPropertyAssertion { .. } => "DataPropertyAssertion",
            Self::SameIndividual(_) => "SameIndividual",
            Self::DifferentIndividuals(_) => "DifferentIndividuals",
            Self::DeclareClass(_) | Self::DeclareObjectProperty(_) | Self::DeclareNamedIndividual(_) => {
                "Declaration"
            }
        }
    }
}
