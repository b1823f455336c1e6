//! Form-control state touched by account-setting callbacks.
//!
//! # Design
//! Completion callbacks run on the request's thread, so each control lives
//! behind an `Arc<Mutex<_>>` and is only mutated from inside a callback (or
//! by the user action that started the request). Concurrent requests race;
//! whichever callback runs last decides the final state.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub const FORM_CONTROL_SUCCESS: &str = "form-control-success";
pub const FORM_CONTROL_ERROR: &str = "form-control-error";
pub const HAS_SUCCESS: &str = "has-success";
pub const HAS_ERROR: &str = "has-error";

/// Ordered set of CSS class names on one element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassList {
    classes: Vec<String>,
}

impl ClassList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, class: &str) -> &mut Self {
        if !self.contains(class) {
            self.classes.push(class.to_string());
        }
        self
    }

    pub fn remove(&mut self, class: &str) -> &mut Self {
        self.classes.retain(|c| c != class);
        self
    }

    pub fn contains(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }
}

/// The display-name input and its surrounding form group.
#[derive(Debug, Clone, Default)]
pub struct DisplayNameField {
    pub value: String,
    pub input: ClassList,
    pub group: ClassList,
}

impl DisplayNameField {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    pub fn mark_success(&mut self) {
        self.input.add(FORM_CONTROL_SUCCESS).remove(FORM_CONTROL_ERROR);
        self.group.add(HAS_SUCCESS).remove(HAS_ERROR);
    }

    pub fn mark_error(&mut self) {
        self.input.add(FORM_CONTROL_ERROR).remove(FORM_CONTROL_SUCCESS);
        self.group.add(HAS_ERROR).remove(HAS_SUCCESS);
    }
}

/// The summary-email opt-in checkbox.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummaryEmailCheckbox {
    pub checked: bool,
}

impl SummaryEmailCheckbox {
    pub fn new(checked: bool) -> Self {
        Self { checked }
    }

    /// Optimistic flip on user input; returns the new value.
    pub fn toggle(&mut self) -> bool {
        self.checked = !self.checked;
        self.checked
    }

    /// Undo a rejected optimistic flip.
    pub fn revert(&mut self) {
        self.checked = !self.checked;
    }
}

/// Shared handle to a control, cloneable into completion callbacks.
#[derive(Debug, Default)]
pub struct Shared<T> {
    inner: Arc<Mutex<T>>,
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Shared<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(value)),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Clone> Shared<T> {
    pub fn snapshot(&self) -> T {
        self.lock().clone()
    }
}
