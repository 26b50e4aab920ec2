//! OWL-shaped input of the reasoner.
//!
//! This is the boundary with OWL parsers: they build [`Axiom`]s that the
//! [`OntologyIndex`](crate::OntologyIndex) normalizes.

mod axiom;
mod entity;
mod expression;

pub use axiom::Axiom;
pub use entity::{DataProperty, Individual, ObjectProperty, OwlClass};
pub use expression::{ClassExpression, ObjectPropertyExpression};
