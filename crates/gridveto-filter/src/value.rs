//! Value constraints: the host attribute must (or must not) carry one of a
//! set of values.

use gridveto_state::{Attribute, ValueConstraint};

/// Whether `attribute` satisfies `constraint`.
///
/// A host that lacks the attribute satisfies only negated constraints:
/// "must not be one of these" holds trivially, "must be one of these"
/// cannot. Otherwise the constraint holds when the value sets overlap,
/// inverted for negated constraints.
pub fn matches(attribute: Option<&Attribute>, constraint: &ValueConstraint) -> bool {
    match attribute {
        None => constraint.negated,
        Some(attribute) => attribute.overlaps(&constraint.values) != constraint.negated,
    }
}
