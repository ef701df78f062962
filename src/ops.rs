//! Operators: values that turn one [`Observable`] into another.
//!
//! Operators are applied with [`Observable::pipe`]. A tuple of operators is
//! itself an operator that applies its members from left to right, so
//! `source.pipe((a, b, c))` is `c.apply(b.apply(a.apply(source)))`.

use crate::observable::Observable;

pub mod map;
pub mod map_to;
pub mod share;
pub mod tap;

pub use map::{map, MapOp};
pub use map_to::{map_to, MapToOp};
pub use share::{share, share_with, ShareConfig, ShareOp};
pub use tap::{tap, TapOp};

/// A transformation from `Observable<Item, Err>` to another observable.
///
/// Applying an operator never subscribes; the result subscribes to its source
/// when it is subscribed itself.
pub trait Operator<Item, Err> {
  type OutItem;
  type OutErr;

  fn apply(self, source: Observable<Item, Err>) -> Observable<Self::OutItem, Self::OutErr>;
}

impl<Item, Err, A> Operator<Item, Err> for (A,)
where
  A: Operator<Item, Err>,
{
  type OutItem = A::OutItem;
  type OutErr = A::OutErr;

  fn apply(self, source: Observable<Item, Err>) -> Observable<Self::OutItem, Self::OutErr> {
    self.0.apply(source)
  }
}

// `(A, B, .., Z)` applies `(A, B, ..)` and then `Z`.
macro_rules! impl_operator_tuple {
  ($($init:ident),+ ; $last:ident) => {
    impl<Item, Err, $($init,)+ $last> Operator<Item, Err> for ($($init,)+ $last,)
    where
      ($($init,)+): Operator<Item, Err>,
      $last: Operator<
        <($($init,)+) as Operator<Item, Err>>::OutItem,
        <($($init,)+) as Operator<Item, Err>>::OutErr,
      >,
    {
      type OutItem = $last::OutItem;
      type OutErr = $last::OutErr;

      #[allow(non_snake_case)]
      fn apply(self, source: Observable<Item, Err>) -> Observable<Self::OutItem, Self::OutErr> {
        let ($($init,)+ $last,) = self;
        $last.apply(($($init,)+).apply(source))
      }
    }
  };
}

impl_operator_tuple!(A; B);
impl_operator_tuple!(A, B; C);
impl_operator_tuple!(A, B, C; D);
impl_operator_tuple!(A, B, C, D; E);
impl_operator_tuple!(A, B, C, D, E; F);
