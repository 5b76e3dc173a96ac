use core::fmt;

use crate::vm::ResourceExceededError;

/// The interpreter's operand stack, with a maximum size.
///
/// The limit comes from
/// [`ExecutionOptions::max_stack_size`](crate::api::ExecutionOptions) and is
/// enforced on every push: runaway recursion surfaces as a
/// [`ResourceExceededError::StackOverflow`] instead of exhausting memory.
///
/// # Examples
///
/// ```ignore
/// use quill_core::vm::Stack;
///
/// let mut stack = Stack::new(100);
/// stack.push(42)?;
/// stack.push(17)?;
/// assert_eq!(stack.pop(), Some(17));
/// assert_eq!(stack.len(), 1);
/// ```
pub struct Stack<T> {
    items: Vec<T>,
    max_size: usize,
}

impl<T> Stack<T> {
    /// Creates an empty stack holding at most `max_size` elements.
    pub fn new(max_size: usize) -> Self {
        // Pre-allocate a reasonable amount; deep recursion grows on demand.
        let initial_capacity = max_size.min(256);

        Self {
            items: Vec::with_capacity(initial_capacity),
            max_size,
        }
    }

    /// Pushes a value, failing when the stack is already full.
    #[inline]
    pub fn push(&mut self, value: T) -> Result<(), ResourceExceededError> {
        if self.items.len() >= self.max_size {
            return Err(ResourceExceededError::StackOverflow {
                depth: self.items.len() + 1,
                max_depth: self.max_size,
            });
        }
        self.items.push(value);
        Ok(())
    }

    /// Removes and returns the top value, or `None` if the stack is empty.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

impl<T: fmt::Debug> fmt::Debug for Stack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stack")
            .field("items", &self.items)
            .field("len", &self.items.len())
            .field("capacity", &self.max_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_stack() {
        let stack: Stack<i32> = Stack::new(100);
        assert_eq!(stack.len(), 0);
    }

    #[test]
    fn test_push_pop() {
        let mut stack = Stack::new(100);
        stack.push(1).unwrap();
        stack.push(2).unwrap();
        stack.push(3).unwrap();

        assert_eq!(stack.len(), 3);
        assert_eq!(stack.pop(), Some(3));
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.pop(), Some(2));
        assert_eq!(stack.pop(), Some(1));
        assert_eq!(stack.pop(), None);
    }

    #[test]
    fn test_overflow_is_an_error() {
        let mut stack = Stack::new(2);
        stack.push(1).unwrap();
        stack.push(2).unwrap();
        assert!(matches!(
            stack.push(3),
            Err(ResourceExceededError::StackOverflow {
                depth: 3,
                max_depth: 2
            })
        ));
        assert_eq!(stack.len(), 2);
    }
}
