use signal_framework::Signal;

/// The pull side of a driver: something that hands out signals one at a time.
///
/// A source returns `Signal::Empty` when nothing is available yet and
/// `Signal::Eof` once it is exhausted. After the first `Eof` it keeps
/// returning `Eof`.
pub trait SignalSource<E> {
    /// Produces the next signal.
    fn next_signal(&mut self) -> Signal<E>;
}

impl<E, S> SignalSource<E> for &mut S
where
    S: SignalSource<E> + ?Sized,
{
    fn next_signal(&mut self) -> Signal<E> {
        (**self).next_signal()
    }
}

/// A source backed by any iterator: each item becomes an element, and the end
/// of the iterator becomes `Eof`.
#[derive(Debug, Clone)]
pub struct IterSource<I> {
    iter: I,
    exhausted: bool,
}

impl<I> IterSource<I>
where
    I: Iterator,
{
    /// Creates a source from anything iterable.
    pub fn new<T>(items: T) -> Self
    where
        T: IntoIterator<IntoIter = I>,
    {
        Self {
            iter: items.into_iter(),
            exhausted: false,
        }
    }

    /// Returns true once `Eof` has been handed out.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Returns the underlying iterator with whatever was not pulled yet.
    pub fn into_inner(self) -> I {
        self.iter
    }
}

impl<I> SignalSource<I::Item> for IterSource<I>
where
    I: Iterator,
{
    fn next_signal(&mut self) -> Signal<I::Item> {
        if self.exhausted {
            return Signal::Eof;
        }
        match self.iter.next() {
            Some(item) => Signal::Element(item),
            None => {
                self.exhausted = true;
                Signal::Eof
            }
        }
    }
}
