use crate::model::entity::{DataProperty, Individual, ObjectProperty, OwlClass};
use oxrdf::Literal;
use std::fmt;

/// An OWL 2 class expression.
///
/// The full constructor set is representable so that parsers don't have to filter their
/// output. Only the EL subset is accepted by the [`OntologyIndex`](crate::OntologyIndex).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClassExpression {
    /// A named class
    Class(OwlClass),
    /// ObjectIntersectionOf(C1, ..., Cn)
    ObjectIntersectionOf(Vec<ClassExpression>),
    /// ObjectUnionOf(C1, ..., Cn)
    ObjectUnionOf(Vec<ClassExpression>),
    /// ObjectComplementOf(C)
    ObjectComplementOf(Box<ClassExpression>),
    /// ObjectOneOf(a1, ..., an)
    ObjectOneOf(Vec<Individual>),
    /// ObjectSomeValuesFrom(P, C)
    ObjectSomeValuesFrom {
        property: ObjectPropertyExpression,
        filler: Box<ClassExpression>,
    },
    /// ObjectAllValuesFrom(P, C)
    ObjectAllValuesFrom {
        property: ObjectPropertyExpression,
        filler: Box<ClassExpression>,
    },
    /// ObjectHasValue(P, a)
    ObjectHasValue {
        property: ObjectPropertyExpression,
        individual: Individual,
    },
    /// ObjectHasSelf(P)
    ObjectHasSelf(ObjectPropertyExpression),
    /// ObjectMinCardinality(n, P, C)
    ObjectMinCardinality {
        cardinality: u32,
        property: ObjectPropertyExpression,
        filler: Option<Box<ClassExpression>>,
    },
    /// DataHasValue(P, v)
    DataHasValue { property: DataProperty, value: Literal },
    /// DataSomeValuesFrom(P, D), the data range is kept as its datatype IRI
    DataSomeValuesFrom {
        property: DataProperty,
        datatype: oxrdf::NamedNode,
    },
}

impl ClassExpression {
    pub fn class(class: impl Into<OwlClass>) -> Self {
        Self::Class(class.into())
    }

    pub fn thing() -> Self {
        Self::Class(OwlClass::thing())
    }

    pub fn nothing() -> Self {
        Self::Class(OwlClass::nothing())
    }

    pub fn intersection(operands: impl IntoIterator<Item = ClassExpression>) -> Self {
        Self::ObjectIntersectionOf(operands.into_iter().collect())
    }

    pub fn union(operands: impl IntoIterator<Item = ClassExpression>) -> Self {
        Self::ObjectUnionOf(operands.into_iter().collect())
    }

    pub fn complement(operand: ClassExpression) -> Self {
        Self::ObjectComplementOf(Box::new(operand))
    }

    /// `{a}`
    pub fn nominal(individual: impl Into<Individual>) -> Self {
        Self::ObjectOneOf(vec![individual.into()])
    }

    pub fn some_values_from(
        property: impl Into<ObjectPropertyExpression>,
        filler: ClassExpression,
    ) -> Self {
        Self::ObjectSomeValuesFrom {
            property: property.into(),
            filler: Box::new(filler),
        }
    }

    pub fn has_value(
        property: impl Into<ObjectPropertyExpression>,
        individual: impl Into<Individual>,
    ) -> Self {
        Self::ObjectHasValue {
            property: property.into(),
            individual: individual.into(),
        }
    }

    /// Returns the OWL functional syntax name of the constructor.
    pub fn constructor_name(&self) -> &'static str {
        match self {
            Self::Class(_) => "Class",
            Self::ObjectIntersectionOf(_) => "ObjectIntersectionOf",
            Self::ObjectUnionOf(_) => "ObjectUnionOf",
            Self::ObjectComplementOf(_) => "ObjectComplementOf",
            Self::ObjectOneOf(_) => "ObjectOneOf",
            Self::ObjectSomeValuesFrom { .. } => "ObjectSomeValuesFrom",
            Self::ObjectAllValuesFrom { .. } => "ObjectAllValuesFrom",
            Self::ObjectHasValue { .. } => "ObjectHasValue",
            Self::ObjectHasSelf(_) => "ObjectHasSelf",
            Self::ObjectMinCardinality { .. } => "ObjectMinCardinality",
            Self::DataHasValue { .. } => "DataHasValue",
            Self::DataSomeValuesFrom { .. } => "DataSomeValuesFrom",
        }
    }
}

impl From<OwlClass> for ClassExpression {
    fn from(class: OwlClass) -> Self {
        Self::Class(class)
    }
}

impl fmt::Display for ClassExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{item}")?;
            }
            Ok(())
        }
        match self {
            Self::Class(c) => write!(f, "{c}"),
            Self::ObjectIntersectionOf(operands) | Self::ObjectUnionOf(operands) => {
                write!(f, "{}(", self.constructor_name())?;
                list(f, operands)?;
                f.write_str(")")
            }
            Self::ObjectComplementOf(c) => write!(f, "ObjectComplementOf({c})"),
            Self::ObjectOneOf(individuals) => {
                f.write_str("ObjectOneOf(")?;
                list(f, individuals)?;
                f.write_str(")")
            }
            Self::ObjectSomeValuesFrom { property, filler }
            | Self::ObjectAllValuesFrom { property, filler } => {
                write!(f, "{}({property} {filler})", self.constructor_name())
            }
            Self::ObjectHasValue {
                property,
                individual,
            } => write!(f, "ObjectHasValue({property} {individual})"),
            Self::ObjectHasSelf(property) => write!(f, "ObjectHasSelf({property})"),
            Self::ObjectMinCardinality {
                cardinality,
                property,
                filler,
            } => {
                write!(f, "ObjectMinCardinality({cardinality} {property}")?;
                if let Some(filler) = filler {
                    write!(f, " {filler}")?;
                }
                f.write_str(")")
            }
            Self::DataHasValue { property, value } => {
                write!(f, "DataHasValue({property} {value})")
            }
            Self::DataSomeValuesFrom { property, datatype } => {
                write!(f, "DataSomeValuesFrom({property} {datatype})")
            }
        }
    }
}

/// An object property expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ObjectPropertyExpression {
    ObjectProperty(ObjectProperty),
    /// ObjectInverseOf(P), not supported by EL reasoning
    InverseOf(ObjectProperty),
}

impl From<ObjectProperty> for ObjectPropertyExpression {
    fn from(property: ObjectProperty) -> Self {
        Self::ObjectProperty(property)
    }
}

impl fmt::Display for ObjectPropertyExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ObjectProperty(p) => write!(f, "{p}"),
            Self::InverseOf(p) => write!(f, "ObjectInverseOf({p})"),
        }
    }
}
