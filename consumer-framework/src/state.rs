use crate::error::StepError;
use signal_framework::Signal;
use std::fmt;
use std::rc::Rc;

/// The suspended half of a consumer: what to do with the next signal.
///
/// The closure is shared behind an `Rc` and only ever called through `&self`,
/// so it can capture nothing but immutable bindings. Cloning a continuation
/// and resuming both copies is therefore safe, and a state may be advanced
/// along several independent paths.
pub struct Continuation<E, A>(Rc<dyn Fn(Signal<E>) -> ConsumerState<E, A>>);

impl<E, A> Continuation<E, A> {
    /// Wraps `resume` as a continuation.
    pub fn new<F>(resume: F) -> Self
    where
        F: Fn(Signal<E>) -> ConsumerState<E, A> + 'static,
    {
        Self(Rc::new(resume))
    }

    /// Feeds one signal and returns the next state.
    pub fn resume(&self, signal: Signal<E>) -> ConsumerState<E, A> {
        (self.0)(signal)
    }
}

impl<E, A> Clone for Continuation<E, A> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<E, A> fmt::Debug for Continuation<E, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Continuation(..)")
    }
}

/// A resumable computation over a stream of `E` producing an `A`.
///
/// A state is either finished, holding its result and the signal it did not
/// consume, or waiting for the next signal. The `leftover` of a finished
/// state is what must be delivered to whatever runs after it.
#[derive(Debug, Clone)]
pub enum ConsumerState<E, A> {
    /// The computation finished.
    Done {
        /// The produced value.
        result: A,
        /// `Empty` if everything delivered was consumed, the unconsumed
        /// element otherwise, or `Eof` if the stream ended.
        leftover: Signal<E>,
    },
    /// The computation awaits the next signal.
    Cont(Continuation<E, A>),
}

impl<E, A> ConsumerState<E, A> {
    /// Creates a finished state.
    pub fn done(result: A, leftover: Signal<E>) -> Self {
        ConsumerState::Done { result, leftover }
    }

    /// Creates a state waiting for the next signal.
    pub fn cont<F>(resume: F) -> Self
    where
        F: Fn(Signal<E>) -> ConsumerState<E, A> + 'static,
    {
        ConsumerState::Cont(Continuation::new(resume))
    }

    /// Dispatches on the two variants, consuming the state.
    ///
    /// Every other operation on a state goes through this method or
    /// [`fold_ref`](Self::fold_ref).
    pub fn fold<R, D, C>(self, when_done: D, when_cont: C) -> R
    where
        D: FnOnce(A, Signal<E>) -> R,
        C: FnOnce(Continuation<E, A>) -> R,
    {
        match self {
            ConsumerState::Done { result, leftover } => when_done(result, leftover),
            ConsumerState::Cont(k) => when_cont(k),
        }
    }

    /// Borrowing counterpart of [`fold`](Self::fold).
    pub fn fold_ref<'a, R, D, C>(&'a self, when_done: D, when_cont: C) -> R
    where
        D: FnOnce(&'a A, &'a Signal<E>) -> R,
        C: FnOnce(&'a Continuation<E, A>) -> R,
    {
        match self {
            ConsumerState::Done { result, leftover } => when_done(result, leftover),
            ConsumerState::Cont(k) => when_cont(k),
        }
    }

    pub fn is_done(&self) -> bool {
        self.fold_ref(|_, _| true, |_| false)
    }

    pub fn is_cont(&self) -> bool {
        !self.is_done()
    }

    /// Returns the result and leftover of a finished state.
    pub fn done_pair(&self) -> Option<(&A, &Signal<E>)> {
        self.fold_ref(|a, leftover| Some((a, leftover)), |_| None)
    }

    /// Returns the result of a finished state.
    pub fn result(&self) -> Option<&A> {
        self.done_pair().map(|(a, _)| a)
    }

    /// Returns the leftover of a finished state.
    pub fn leftover(&self) -> Option<&Signal<E>> {
        self.done_pair().map(|(_, leftover)| leftover)
    }

    /// True when finished with nothing left over.
    pub fn is_done_empty(&self) -> bool {
        self.leftover().map_or(false, Signal::is_empty)
    }

    /// True when finished because the stream ended.
    pub fn is_done_eof(&self) -> bool {
        self.leftover().map_or(false, Signal::is_eof)
    }

    /// True when finished with an unconsumed element.
    pub fn is_done_element(&self) -> bool {
        self.leftover().map_or(false, Signal::is_element)
    }

    /// The unconsumed element of a finished state, if there is one.
    pub fn leftover_element(&self) -> Option<&E> {
        self.leftover().and_then(Signal::as_element)
    }

    /// The continuation of a waiting state.
    pub fn continuation(&self) -> Option<&Continuation<E, A>> {
        self.fold_ref(|_, _| None, Some)
    }

    /// Resumes a waiting state; `None` if the state is finished.
    pub fn apply_cont(&self, signal: Signal<E>) -> Option<Self> {
        self.continuation().map(|k| k.resume(signal))
    }

    /// Splits a finished state into its parts, or hands back the continuation.
    pub fn into_done(self) -> Result<(A, Signal<E>), Continuation<E, A>> {
        self.fold(|a, leftover| Ok((a, leftover)), Err)
    }

    /// Advances a waiting state by one signal.
    ///
    /// Fails with [`StepError::AlreadyDone`] when the state is finished.
    pub fn try_apply_step(self, signal: Signal<E>) -> Result<Self, StepError> {
        self.fold(|_, _| Err(StepError::AlreadyDone), |k| Ok(k.resume(signal)))
    }

    /// Advances a waiting state by one signal.
    ///
    /// # Panics
    ///
    /// Panics if the state is already finished. A finished consumer must not
    /// be advanced again; use [`try_apply_step`](Self::try_apply_step) to get
    /// the fault as a value instead.
    #[track_caller]
    pub fn apply_step(self, signal: Signal<E>) -> Self {
        match self.try_apply_step(signal) {
            Ok(next) => next,
            Err(err) => panic!("{}", err),
        }
    }

    /// Applies signals in order until the state finishes.
    ///
    /// Signals left in the iterator once the state is finished are not
    /// delivered.
    pub fn step_all<I>(self, signals: I) -> Self
    where
        I: IntoIterator<Item = Signal<E>>,
    {
        let mut state = self;
        for signal in signals {
            state = match state.into_done() {
                Ok((a, leftover)) => return ConsumerState::done(a, leftover),
                Err(k) => k.resume(signal),
            };
        }
        state
    }
}

impl<E: 'static, A: 'static> ConsumerState<E, A> {
    /// Sequences `f` after this consumer.
    ///
    /// `f` is not called until this consumer finishes. If it finished with a
    /// leftover signal, that signal is replayed into the consumer `f` returns;
    /// if that consumer finishes without needing it, the original leftover is
    /// kept.
    pub fn flat_map<B, F>(self, f: F) -> ConsumerState<E, B>
    where
        B: 'static,
        F: Fn(A) -> ConsumerState<E, B> + 'static,
    {
        self.bind(Rc::new(f))
    }

    fn bind<B, F>(self, f: Rc<F>) -> ConsumerState<E, B>
    where
        B: 'static,
        F: Fn(A) -> ConsumerState<E, B> + 'static,
    {
        let on_cont = Rc::clone(&f);
        self.fold(
            move |a, leftover| {
                if leftover.is_empty() {
                    return (*f)(a);
                }
                match (*f)(a).into_done() {
                    Ok((b, _)) => ConsumerState::done(b, leftover),
                    Err(k) => k.resume(leftover),
                }
            },
            move |k| ConsumerState::cont(move |signal| k.resume(signal).bind(Rc::clone(&on_cont))),
        )
    }

    /// Transforms the eventual result.
    pub fn map<B, F>(self, f: F) -> ConsumerState<E, B>
    where
        B: 'static,
        F: Fn(A) -> B + 'static,
    {
        self.flat_map(move |a| ConsumerState::done(f(a), Signal::Empty))
    }

    /// Sequences `next` after this consumer, discarding this result.
    pub fn then<B>(self, next: ConsumerState<E, B>) -> ConsumerState<E, B>
    where
        E: Clone,
        B: Clone + 'static,
    {
        self.flat_map(move |_| next.clone())
    }

    /// Turns a consumer of `E` into a consumer of `D`.
    ///
    /// Only elements are mapped through `g`; `Empty` and `Eof` pass through.
    /// When the adapted consumer finishes with an unconsumed element, the
    /// `D` element that produced it is reported as the leftover.
    pub fn contramap<D, G>(self, g: G) -> ConsumerState<D, A>
    where
        D: Clone + 'static,
        G: Fn(D) -> E + 'static,
    {
        adapt(self, Rc::new(g), None)
    }
}

fn adapt<D, E, A, G>(state: ConsumerState<E, A>, g: Rc<G>, last: Option<D>) -> ConsumerState<D, A>
where
    D: Clone + 'static,
    E: 'static,
    A: 'static,
    G: Fn(D) -> E + 'static,
{
    let prev = last.clone();
    state.fold(
        move |a, leftover| {
            let leftover = match leftover {
                Signal::Empty => Signal::Empty,
                Signal::Eof => Signal::Eof,
                // Leftovers the adapted stream never delivered have no `D` form.
                Signal::Element(_) => last.map_or(Signal::Empty, Signal::Element),
            };
            ConsumerState::done(a, leftover)
        },
        move |k| {
            ConsumerState::cont(move |signal: Signal<D>| {
                let seen = signal.as_element().cloned().or_else(|| prev.clone());
                let mapped = signal.map(|d| (*g)(d));
                adapt(k.resume(mapped), Rc::clone(&g), seen)
            })
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one() -> ConsumerState<i32, i32> {
        ConsumerState::cont(|s: Signal<i32>| match s {
            Signal::Element(e) => ConsumerState::done(e, Signal::Empty),
            other => ConsumerState::done(-1, other),
        })
    }

    #[test]
    fn test_done_inspectors() {
        let state: ConsumerState<char, u8> = ConsumerState::done(3, Signal::Element('x'));
        assert!(state.is_done());
        assert!(!state.is_cont());
        assert_eq!(state.result(), Some(&3));
        assert!(state.is_done_element());
        assert!(!state.is_done_eof());
        assert!(!state.is_done_empty());
        assert_eq!(state.leftover_element(), Some(&'x'));
        assert!(state.continuation().is_none());
        assert!(state.apply_cont(Signal::Eof).is_none());
    }

    #[test]
    fn test_cont_inspectors() {
        let state = one();
        assert!(state.is_cont());
        assert!(state.done_pair().is_none());
        assert!(state.leftover().is_none());
        let next = state.apply_cont(Signal::Element(4)).map(ConsumerState::into_done);
        assert!(matches!(next, Some(Ok((4, Signal::Empty)))));
    }

    #[test]
    fn test_try_apply_step_on_done() {
        let state: ConsumerState<i32, ()> = ConsumerState::done((), Signal::Empty);
        assert_eq!(
            state.try_apply_step(Signal::Element(1)).err(),
            Some(StepError::AlreadyDone)
        );
    }

    #[test]
    #[should_panic(expected = "finished consumer")]
    fn test_apply_step_on_done_panics() {
        let state: ConsumerState<i32, ()> = ConsumerState::done((), Signal::Eof);
        let _ = state.apply_step(Signal::Eof);
    }

    #[test]
    fn test_continuation_can_be_resumed_twice() {
        let state = one();
        let k = state.continuation().cloned().unwrap();
        let first = k.resume(Signal::Element(1)).into_done().ok();
        let second = k.resume(Signal::Element(2)).into_done().ok();
        assert_eq!(first.map(|(a, _)| a), Some(1));
        assert_eq!(second.map(|(a, _)| a), Some(2));
    }

    #[test]
    fn test_clones_advance_independently() {
        let state = one();
        let copy = state.clone();
        let a = state.apply_step(Signal::Element(10));
        let b = copy.apply_step(Signal::Eof);
        assert_eq!(a.result(), Some(&10));
        assert_eq!(b.result(), Some(&-1));
        assert!(b.is_done_eof());
    }

    #[test]
    fn test_flat_map_done_empty_calls_f_directly() {
        let state = ConsumerState::<i32, i32>::done(2, Signal::Empty).flat_map(|a| {
            ConsumerState::cont(move |s: Signal<i32>| {
                ConsumerState::done(a + s.element_or_else(0), Signal::Empty)
            })
        });
        assert!(state.is_cont());
        assert_eq!(state.apply_step(Signal::Element(5)).result(), Some(&7));
    }

    #[test]
    fn test_flat_map_original_leftover_wins() {
        let state = ConsumerState::<i32, i32>::done(1, Signal::Element(9))
            .flat_map(|a| ConsumerState::done(a + 1, Signal::Eof));
        assert_eq!(state.result(), Some(&2));
        assert_eq!(state.leftover(), Some(&Signal::Element(9)));
    }

    #[test]
    fn test_flat_map_replays_leftover_into_cont() {
        let state = ConsumerState::<i32, i32>::done(1, Signal::Element(9))
            .flat_map(|a| one().map(move |b| a + b));
        assert_eq!(state.result(), Some(&10));
        assert!(state.is_done_empty());
    }

    #[test]
    fn test_flat_map_does_not_build_right_side_early() {
        use std::cell::Cell;
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let state = one().flat_map(move |a| {
            counter.set(counter.get() + 1);
            ConsumerState::done(a, Signal::Empty)
        });
        assert_eq!(calls.get(), 0);
        let state = state.apply_step(Signal::Element(3));
        assert_eq!(calls.get(), 1);
        assert_eq!(state.result(), Some(&3));
    }

    #[test]
    fn test_map_keeps_leftover() {
        let state = ConsumerState::<i32, i32>::done(4, Signal::Eof).map(|a| a * 2);
        assert_eq!(state.result(), Some(&8));
        assert!(state.is_done_eof());
    }

    #[test]
    fn test_step_all_stops_at_done() {
        let state = one().step_all(vec![Signal::Element(1), Signal::Element(2)]);
        assert_eq!(state.done_pair(), Some((&1, &Signal::Empty)));
    }

    #[test]
    fn test_contramap_maps_elements_and_restores_leftover() {
        let peek_even: ConsumerState<i32, bool> = ConsumerState::cont(|s: Signal<i32>| match s {
            Signal::Element(e) => ConsumerState::done(e % 2 == 0, Signal::Element(e)),
            other => ConsumerState::done(false, other),
        });
        let adapted = peek_even.contramap(|s: String| s.len() as i32);
        let state = adapted.apply_step(Signal::Element("ab".to_string()));
        assert_eq!(state.result(), Some(&true));
        assert_eq!(state.leftover(), Some(&Signal::Element("ab".to_string())));
    }

    #[test]
    fn test_contramap_passes_eof_through() {
        let adapted = one().contramap(|c: char| c as i32);
        let state = adapted.apply_step(Signal::Eof);
        assert_eq!(state.result(), Some(&-1));
        assert!(state.is_done_eof());
    }

    #[test]
    fn test_contramap_leftover_never_received_is_empty() {
        let finished = ConsumerState::<i32, i32>::done(1, Signal::Element(5));
        let adapted = finished.contramap(|c: char| c as i32);
        assert_eq!(adapted.done_pair(), Some((&1, &Signal::Empty)));
    }

    #[test]
    fn test_contramap_tick_keeps_last_element() {
        // Finishes on the signal after its first element, leaving that element over.
        let echo: ConsumerState<u32, u32> = ConsumerState::cont(|s: Signal<u32>| match s {
            Signal::Element(e) => ConsumerState::cont(move |_: Signal<u32>| {
                ConsumerState::done(e, Signal::Element(e))
            }),
            other => ConsumerState::done(0, other),
        });
        let adapted = echo.contramap(|c: char| c as u32);
        let state = adapted.step_all(vec![Signal::Element('a'), Signal::Empty]);
        assert_eq!(state.done_pair(), Some((&97, &Signal::Element('a'))));
    }

    #[test]
    fn test_then_discards_first_result() {
        let state = crate::primitives::peek::<char>()
            .then(crate::primitives::head())
            .apply_step(Signal::Element('x'));
        assert_eq!(state.done_pair(), Some((&Some('x'), &Signal::Empty)));
    }

    #[test]
    fn test_then_keeps_unconsumed_leftover() {
        let state = ConsumerState::<i32, i32>::done(1, Signal::Element(3))
            .then(ConsumerState::done("next", Signal::Empty));
        assert_eq!(state.done_pair(), Some((&"next", &Signal::Element(3))));
    }
}
