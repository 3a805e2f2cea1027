//! Operator-entered parameter values for the selected operation.

use std::collections::HashMap;

/// Raw text values keyed by parameter name.
///
/// Values are never coerced or validated; an unset name reads as `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterBinder {
    values: HashMap<String, String>,
}

impl ParameterBinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> &str {
        self.values.get(name).map(String::as_str).unwrap_or("")
    }

    /// Drop every stored value. Call whenever the active operation changes.
    pub fn reset(&mut self) {
        self.values.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}

impl<K, V> FromIterator<(K, V)> for ParameterBinder
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut binder = Self::new();
        for (name, value) in iter {
            binder.set(name, value);
        }
        binder
    }
}
