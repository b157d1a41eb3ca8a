//! Reusable consumers that larger consumers are assembled from.
//!
//! Every consumer here looks at one signal at a time and never needs more
//! than one element of lookahead. `Empty` signals are always ignored: the
//! consumer stays waiting and the next signal decides.

use crate::persistent::Stack;
use crate::state::ConsumerState;
use signal_framework::Signal;
use std::rc::Rc;

/// A consumer that finishes immediately with `a`, consuming nothing.
pub fn pure<E, A>(a: A) -> ConsumerState<E, A> {
    ConsumerState::done(a, Signal::Empty)
}

/// Consumes one element, or reports the end of the stream with `None`.
pub fn head<E: 'static>() -> ConsumerState<E, Option<E>> {
    ConsumerState::cont(|signal| match signal {
        Signal::Element(e) => ConsumerState::done(Some(e), Signal::Empty),
        Signal::Eof => ConsumerState::done(None, Signal::Eof),
        Signal::Empty => head(),
    })
}

/// Like [`head`], but the element is left over for the next consumer.
pub fn peek<E: Clone + 'static>() -> ConsumerState<E, Option<E>> {
    ConsumerState::cont(|signal: Signal<E>| match signal {
        Signal::Element(e) => ConsumerState::done(Some(e.clone()), Signal::Element(e)),
        Signal::Eof => ConsumerState::done(None, Signal::Eof),
        Signal::Empty => peek(),
    })
}

/// Discards up to `n` elements.
///
/// Finishes with an `Eof` leftover if the stream ends first. `drop(0)`
/// finishes without looking at any input.
pub fn drop<E: 'static>(n: usize) -> ConsumerState<E, ()> {
    if n == 0 {
        return ConsumerState::done((), Signal::Empty);
    }
    ConsumerState::cont(move |signal| match signal {
        Signal::Element(_) => drop(n - 1),
        Signal::Eof => ConsumerState::done((), Signal::Eof),
        Signal::Empty => drop(n),
    })
}

/// Discards elements while `predicate` holds.
///
/// The first rejected element is left over.
pub fn drop_while<E, P>(predicate: P) -> ConsumerState<E, ()>
where
    E: 'static,
    P: Fn(&E) -> bool + 'static,
{
    drop_while_with(Rc::new(predicate))
}

fn drop_while_with<E, P>(predicate: Rc<P>) -> ConsumerState<E, ()>
where
    E: 'static,
    P: Fn(&E) -> bool + 'static,
{
    ConsumerState::cont(move |signal| match signal {
        Signal::Element(e) if (*predicate)(&e) => drop_while_with(Rc::clone(&predicate)),
        Signal::Element(e) => ConsumerState::done((), Signal::Element(e)),
        Signal::Eof => ConsumerState::done((), Signal::Eof),
        Signal::Empty => drop_while_with(Rc::clone(&predicate)),
    })
}

/// Folds every element into an accumulator until the stream ends.
///
/// This is the building block for streaming aggregates: it finishes only on
/// `Eof`, with the final accumulator and an `Eof` leftover.
pub fn fold<E, A, F>(combine: F, seed: A) -> ConsumerState<E, A>
where
    E: 'static,
    A: Clone + 'static,
    F: Fn(A, E) -> A + 'static,
{
    fold_with(Rc::new(combine), seed)
}

fn fold_with<E, A, F>(combine: Rc<F>, acc: A) -> ConsumerState<E, A>
where
    E: 'static,
    A: Clone + 'static,
    F: Fn(A, E) -> A + 'static,
{
    ConsumerState::cont(move |signal| match signal {
        Signal::Element(e) => fold_with(Rc::clone(&combine), (*combine)(acc.clone(), e)),
        Signal::Eof => ConsumerState::done(acc.clone(), Signal::Eof),
        Signal::Empty => fold_with(Rc::clone(&combine), acc.clone()),
    })
}

/// Counts the elements until the stream ends.
pub fn count<E: 'static>() -> ConsumerState<E, usize> {
    fold(|n: usize, _| n + 1, 0)
}

/// Collects every element until the stream ends.
pub fn collect<E: Clone + 'static>() -> ConsumerState<E, Vec<E>> {
    fold(|acc: Stack<E>, e| acc.push(e), Stack::new()).map(|acc| acc.to_vec())
}

/// Collects at most `n` elements, leaving the rest of the stream untouched.
pub fn take<E: Clone + 'static>(n: usize) -> ConsumerState<E, Vec<E>> {
    take_with(n, Stack::new())
}

fn take_with<E: Clone + 'static>(n: usize, acc: Stack<E>) -> ConsumerState<E, Vec<E>> {
    if n == 0 {
        return ConsumerState::done(acc.to_vec(), Signal::Empty);
    }
    ConsumerState::cont(move |signal| match signal {
        Signal::Element(e) => take_with(n - 1, acc.push(e)),
        Signal::Eof => ConsumerState::done(acc.to_vec(), Signal::Eof),
        Signal::Empty => take_with(n, acc.clone()),
    })
}

/// Collects elements while `predicate` holds; the first rejected element is
/// left over.
pub fn take_while<E, P>(predicate: P) -> ConsumerState<E, Vec<E>>
where
    E: Clone + 'static,
    P: Fn(&E) -> bool + 'static,
{
    take_while_with(Rc::new(predicate), Stack::new())
}

fn take_while_with<E, P>(predicate: Rc<P>, acc: Stack<E>) -> ConsumerState<E, Vec<E>>
where
    E: Clone + 'static,
    P: Fn(&E) -> bool + 'static,
{
    ConsumerState::cont(move |signal| match signal {
        Signal::Element(e) if (*predicate)(&e) => {
            take_while_with(Rc::clone(&predicate), acc.push(e))
        }
        Signal::Element(e) => ConsumerState::done(acc.to_vec(), Signal::Element(e)),
        Signal::Eof => ConsumerState::done(acc.to_vec(), Signal::Eof),
        Signal::Empty => take_while_with(Rc::clone(&predicate), acc.clone()),
    })
}

/// Reports whether the stream is at its end without consuming anything.
pub fn expect_eof<E: 'static>() -> ConsumerState<E, bool> {
    ConsumerState::cont(|signal| match signal {
        Signal::Eof => ConsumerState::done(true, Signal::Eof),
        Signal::Element(e) => ConsumerState::done(false, Signal::Element(e)),
        Signal::Empty => expect_eof(),
    })
}

/// Runs `consumers` one after another over the same stream, collecting their
/// results in order.
///
/// Each consumer is bound only once the previous one has finished, so the
/// stack depth of a step does not grow with the number of consumers.
pub fn sequence<E, A, I>(consumers: I) -> ConsumerState<E, Vec<A>>
where
    E: Clone + 'static,
    A: Clone + 'static,
    I: IntoIterator<Item = ConsumerState<E, A>>,
{
    sequence_from(consumers.into_iter().collect(), 0, Stack::new())
}

fn sequence_from<E, A>(
    consumers: Rc<[ConsumerState<E, A>]>,
    mut index: usize,
    mut results: Stack<A>,
) -> ConsumerState<E, Vec<A>>
where
    E: Clone + 'static,
    A: Clone + 'static,
{
    while let Some(next) = consumers.get(index) {
        // Finished consumers that owe nothing are collected without binding.
        if let Some((a, Signal::Empty)) = next.done_pair() {
            results = results.push(a.clone());
            index += 1;
            continue;
        }
        let rest = Rc::clone(&consumers);
        return next.clone().flat_map(move |a| {
            sequence_from(Rc::clone(&rest), index + 1, results.push(a))
        });
    }
    ConsumerState::done(results.to_vec(), Signal::Empty)
}
