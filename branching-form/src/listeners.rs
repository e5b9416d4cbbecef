use std::fmt;

type Callback<T> = Box<dyn FnMut(&T)>;

/// An ordered list of callbacks.
///
/// Callbacks are invoked in registration order every time `notify` is called.
pub struct Listeners<T> {
    callbacks: Vec<Callback<T>>,
}

impl<T> Listeners<T> {
    /// Create an empty listener list.
    pub fn new() -> Self {
        Self {
            callbacks: Vec::new(),
        }
    }

    /// Register a callback.
    pub fn add(&mut self, callback: impl FnMut(&T) + 'static) {
        self.callbacks.push(Box::new(callback));
    }

    /// Invoke every callback with `value`.
    pub fn notify(&mut self, value: &T) {
        for callback in &mut self.callbacks {
            callback(value);
        }
    }

    /// Get the number of registered callbacks.
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Check if no callback is registered.
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Listeners<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.callbacks.len())
            .finish()
    }
}
