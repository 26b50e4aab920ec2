use oxrdf::{NamedNode, NamedNodeRef};
use std::fmt;

const OWL_THING: NamedNodeRef<'static> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#Thing");
const OWL_NOTHING: NamedNodeRef<'static> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#Nothing");

/// An OWL class (owl:Class).
///
/// Every class is a subclass of owl:Thing and a superclass of owl:Nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwlClass(NamedNode);

impl OwlClass {
    #[inline]
    pub fn new(iri: impl Into<NamedNode>) -> Self {
        Self(iri.into())
    }

    /// `owl:Thing`, the class of every individual.
    #[inline]
    pub fn thing() -> Self {
        Self(OWL_THING.into_owned())
    }

    /// `owl:Nothing`, the empty class.
    #[inline]
    pub fn nothing() -> Self {
        Self(OWL_NOTHING.into_owned())
    }

    #[inline]
    pub fn is_thing(&self) -> bool {
        self.0.as_ref() == OWL_THING
    }

    #[inline]
    pub fn is_nothing(&self) -> bool {
        self.0.as_ref() == OWL_NOTHING
    }

    #[inline]
    pub fn iri(&self) -> &NamedNode {
        &self.0
    }

    #[inline]
    pub fn into_inner(self) -> NamedNode {
        self.0
    }
}

impl fmt::Display for OwlClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<NamedNode> for OwlClass {
    fn from(node: NamedNode) -> Self {
        Self(node)
    }
}

impl From<OwlClass> for NamedNode {
    fn from(class: OwlClass) -> Self {
        class.0
    }
}

/// An OWL object property (owl:ObjectProperty).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectProperty(NamedNode);

impl ObjectProperty {
    #[inline]
    pub fn new(iri: impl Into<NamedNode>) -> Self {
        Self(iri.into())
    }

    #[inline]
    pub fn iri(&self) -> &NamedNode {
        &self.0
    }
}

impl fmt::Display for ObjectProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<NamedNode> for ObjectProperty {
    fn from(node: NamedNode) -> Self {
        Self(node)
    }
}

/// An OWL data property (owl:DatatypeProperty).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DataProperty(NamedNode);

impl DataProperty {
    #[inline]
    pub fn new(iri: impl Into<NamedNode>) -> Self {
        Self(iri.into())
    }

    #[inline]
    pub fn iri(&self) -> &NamedNode {
        &self.0
    }
}

impl fmt::Display for DataProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<NamedNode> for DataProperty {
    fn from(node: NamedNode) -> Self {
        Self(node)
    }
}

/// A named OWL individual.
///
/// Anonymous individuals are not part of the EL profile.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Individual(NamedNode);

impl Individual {
    #[inline]
    pub fn new(iri: impl Into<NamedNode>) -> Self {
        Self(iri.into())
    }

    #[inline]
    pub fn iri(&self) -> &NamedNode {
        &self.0
    }
}

impl fmt::Display for Individual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<NamedNode> for Individual {
    fn from(node: NamedNode) -> Self {
        Self(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_classes() {
        assert!(OwlClass::thing().is_thing());
        assert!(OwlClass::nothing().is_nothing());
        assert!(!OwlClass::thing().is_nothing());
        assert_eq!(
            OwlClass::thing().iri().as_str(),
            "http://www.w3.org/2002/07/owl#Thing"
        );
    }
}
