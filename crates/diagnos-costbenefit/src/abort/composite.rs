//! Composite abort strategy.
//!
//! Uses macro-generated tuple implementations for zero type erasure.

use diagnos_blackboard::Session;

use super::AbortStrategy;
use crate::model::{Path, SearchModel};

/// Aborts when ANY member aborts.
///
/// Every member sees every step, so counting members stay accurate.
///
/// # Examples
///
/// ```
/// use diagnos_costbenefit::{AnyAbort, StepCountAbort, TimeAbort};
///
/// // Abort after 2 seconds OR 10 000 steps
/// let abort = AnyAbort::new((TimeAbort::seconds(2), StepCountAbort::new(10_000)));
/// ```
#[derive(Debug, Clone)]
pub struct AnyAbort<T>(pub T);

impl<T> AnyAbort<T> {
    pub fn new(strategies: T) -> Self {
        Self(strategies)
    }
}

macro_rules! impl_any_abort {
    ($($idx:tt: $T:ident),+) => {
        impl<$($T),+> AbortStrategy for AnyAbort<($($T,)+)>
        where
            $($T: AbortStrategy,)+
        {
            fn init(&mut self, model: &SearchModel) {
                $((self.0).$idx.init(model);)+
            }

            fn next_step(&mut self, path: &Path, session: &Session) -> bool {
                let mut abort = false;
                $(abort |= (self.0).$idx.next_step(path, session);)+
                abort
            }
        }
    };
}

impl_any_abort!(0: T0, 1: T1);
impl_any_abort!(0: T0, 1: T1, 2: T2);
impl_any_abort!(0: T0, 1: T1, 2: T2, 3: T3);
