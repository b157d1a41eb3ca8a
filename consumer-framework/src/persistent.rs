use std::rc::Rc;

/// Structurally shared stack used as an accumulator inside continuations.
///
/// Pushing never touches the existing nodes, so a continuation that captured
/// an older stack still sees exactly what it captured.
pub(crate) struct Stack<T> {
    head: Option<Rc<Node<T>>>,
    len: usize,
}

struct Node<T> {
    value: T,
    next: Option<Rc<Node<T>>>,
}

impl<T> Stack<T> {
    pub(crate) fn new() -> Self {
        Self { head: None, len: 0 }
    }

    pub(crate) fn push(&self, value: T) -> Self {
        Self {
            head: Some(Rc::new(Node {
                value,
                next: self.head.clone(),
            })),
            len: self.len + 1,
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Values in push order.
    pub(crate) fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        let mut out = Vec::with_capacity(self.len);
        let mut cursor = self.head.as_deref();
        while let Some(node) = cursor {
            out.push(node.value.clone());
            cursor = node.next.as_deref();
        }
        out.reverse();
        out
    }
}

impl<T> Clone for Stack<T> {
    fn clone(&self) -> Self {
        Self {
            head: self.head.clone(),
            len: self.len,
        }
    }
}

// Unlink iteratively; the default recursive drop overflows on long stacks.
impl<T> Drop for Stack<T> {
    fn drop(&mut self) {
        let mut cursor = self.head.take();
        while let Some(node) = cursor {
            match Rc::try_unwrap(node) {
                Ok(mut node) => cursor = node.next.take(),
                Err(_) => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_older_versions() {
        let empty = Stack::new();
        let one = empty.push(1);
        let two = one.push(2);
        let other = one.push(20);
        assert_eq!(empty.to_vec(), Vec::<i32>::new());
        assert_eq!(one.to_vec(), vec![1]);
        assert_eq!(two.to_vec(), vec![1, 2]);
        assert_eq!(other.to_vec(), vec![1, 20]);
        assert_eq!(two.len(), 2);
    }

    #[test]
    fn test_long_stack_drops_without_overflow() {
        let mut stack = Stack::new();
        for i in 0..1_000_000u32 {
            stack = stack.push(i);
        }
        assert_eq!(stack.len(), 1_000_000);
        drop(stack);
    }
}
