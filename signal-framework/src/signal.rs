use std::fmt;

/// One discrete delivery to a consumer.
///
/// A signal either carries nothing new (`Empty`), announces that the stream
/// has ended (`Eof`), or carries exactly one element. Signals are plain
/// immutable values; every operation below is total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal<E> {
    /// No information delivered this step.
    Empty,
    /// The stream has ended; no further elements will arrive.
    Eof,
    /// Exactly one element was delivered.
    Element(E),
}

impl<E> Signal<E> {
    /// Creates the signal that carries nothing.
    pub fn empty() -> Self {
        Signal::Empty
    }

    /// Creates the end-of-stream signal.
    pub fn eof() -> Self {
        Signal::Eof
    }

    /// Creates a signal carrying `e`.
    pub fn element(e: E) -> Self {
        Signal::Element(e)
    }

    /// Returns true for `Empty`.
    pub fn is_empty(&self) -> bool {
        matches!(self, Signal::Empty)
    }

    /// Returns true for `Eof`.
    pub fn is_eof(&self) -> bool {
        matches!(self, Signal::Eof)
    }

    /// Returns true when an element is carried.
    pub fn is_element(&self) -> bool {
        matches!(self, Signal::Element(_))
    }

    /// Returns a reference to the carried element, if any.
    pub fn as_element(&self) -> Option<&E> {
        match self {
            Signal::Element(e) => Some(e),
            Signal::Empty | Signal::Eof => None,
        }
    }

    /// Consumes the signal and returns the carried element, if any.
    pub fn into_element(self) -> Option<E> {
        match self {
            Signal::Element(e) => Some(e),
            Signal::Empty | Signal::Eof => None,
        }
    }

    /// Returns the carried element or `default`.
    pub fn element_or_else(self, default: E) -> E {
        match self {
            Signal::Element(e) => e,
            Signal::Empty | Signal::Eof => default,
        }
    }

    /// Returns the carried element or computes one from `default`.
    pub fn element_or_else_with<F>(self, default: F) -> E
    where
        F: FnOnce() -> E,
    {
        match self {
            Signal::Element(e) => e,
            Signal::Empty | Signal::Eof => default(),
        }
    }

    /// Returns `self` if it carries an element, otherwise evaluates `other`.
    pub fn or_else<F>(self, other: F) -> Self
    where
        F: FnOnce() -> Self,
    {
        match self {
            Signal::Element(_) => self,
            Signal::Empty | Signal::Eof => other(),
        }
    }

    /// Merges two signals.
    ///
    /// `Empty` is the identity on both sides. Between the remaining variants
    /// `Eof` behaves as the identity and two elements are merged with
    /// `combine`, so `append` is associative whenever `combine` is.
    pub fn append<F>(self, other: Self, combine: F) -> Self
    where
        F: FnOnce(E, E) -> E,
    {
        match (self, other) {
            (Signal::Empty, other) => other,
            (this, Signal::Empty) => this,
            (Signal::Eof, Signal::Eof) => Signal::Eof,
            (Signal::Eof, Signal::Element(b)) => Signal::Element(b),
            (Signal::Element(a), Signal::Eof) => Signal::Element(a),
            (Signal::Element(a), Signal::Element(b)) => Signal::Element(combine(a, b)),
        }
    }

    /// Appends every signal of `signals` in order, starting from `Empty`.
    pub fn concat<I, F>(signals: I, mut combine: F) -> Self
    where
        I: IntoIterator<Item = Self>,
        F: FnMut(E, E) -> E,
    {
        signals
            .into_iter()
            .fold(Signal::Empty, |acc, s| acc.append(s, &mut combine))
    }

    /// Transforms the carried element. `Eof` and `Empty` pass through.
    pub fn map<B, F>(self, f: F) -> Signal<B>
    where
        F: FnOnce(E) -> B,
    {
        match self {
            Signal::Empty => Signal::Empty,
            Signal::Eof => Signal::Eof,
            Signal::Element(e) => Signal::Element(f(e)),
        }
    }

    /// Replaces the carried element with the signal `f` returns for it.
    pub fn flat_map<B, F>(self, f: F) -> Signal<B>
    where
        F: FnOnce(E) -> Signal<B>,
    {
        match self {
            Signal::Empty => Signal::Empty,
            Signal::Eof => Signal::Eof,
            Signal::Element(e) => f(e),
        }
    }

    /// Pairs the elements of two signals with `f`.
    ///
    /// If either side carries no element, the first such side (`self` before
    /// `other`) is returned with its variant unchanged.
    pub fn zip_with<B, C, F>(self, other: Signal<B>, f: F) -> Signal<C>
    where
        F: FnOnce(E, B) -> C,
    {
        self.flat_map(|a| other.map(|b| f(a, b)))
    }

    /// Maps every item to a signal and collects the carried elements.
    ///
    /// The first item that maps to `Empty` or `Eof` short-circuits the
    /// traversal and that variant is returned.
    pub fn traverse<I, F>(items: I, mut f: F) -> Signal<Vec<E>>
    where
        I: IntoIterator,
        F: FnMut(I::Item) -> Signal<E>,
    {
        let iter = items.into_iter();
        let mut collected = Vec::with_capacity(iter.size_hint().0);
        for item in iter {
            match f(item) {
                Signal::Element(e) => collected.push(e),
                Signal::Empty => return Signal::Empty,
                Signal::Eof => return Signal::Eof,
            }
        }
        Signal::Element(collected)
    }
}

/// `Empty` is the identity of [`Signal::append`].
impl<E> Default for Signal<E> {
    fn default() -> Self {
        Signal::Empty
    }
}

impl<E> From<Option<E>> for Signal<E> {
    /// `Some(e)` is an element, `None` is the end of the stream.
    fn from(value: Option<E>) -> Self {
        match value {
            Some(e) => Signal::Element(e),
            None => Signal::Eof,
        }
    }
}

impl<E: fmt::Display> fmt::Display for Signal<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Empty => write!(f, "<empty>"),
            Signal::Eof => write!(f, "<eof>"),
            Signal::Element(e) => write!(f, "{}", e),
        }
    }
}
