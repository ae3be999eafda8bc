use std::fmt::Debug;

/// Topological and positional predicates shared by every collection type:
/// spans, span sets, timestamp sets and boxes.
///
/// The positional vocabulary follows the one-dimensional reading: `left`
/// means strictly before on the collection's axis, `over_or_left` means
/// ending before (or exactly when) the other ends.
pub trait Collection: PartialEq + Debug + Clone {
    /// The element type of the collection.
    type Type;

    /// Returns whether `self` is contained in `container`.
    fn is_contained_in(&self, container: &Self) -> bool;

    /// Returns whether the collection contains `content`.
    fn contains(&self, content: &Self::Type) -> bool;

    /// Returns whether `self` and `other` share at least one element.
    fn overlaps(&self, other: &Self) -> bool;

    /// Returns whether `self` and `other` touch without sharing elements:
    /// the bounds meet and exactly one of the meeting bounds is inclusive.
    fn is_adjacent(&self, other: &Self) -> bool;

    /// Returns whether `self` is strictly before `other`.
    fn is_left(&self, other: &Self) -> bool;

    /// Returns whether `self` ends before `other` ends (overlap allowed).
    fn is_over_or_left(&self, other: &Self) -> bool;

    /// Returns whether `self` starts after `other` starts (overlap allowed).
    fn is_over_or_right(&self, other: &Self) -> bool;

    /// Returns whether `self` is strictly after `other`.
    fn is_right(&self, other: &Self) -> bool;
}
