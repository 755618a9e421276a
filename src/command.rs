//! Undo/redo command stack.
//!
//! A [`CommandStack`] pairs a forward action with its inverse and tracks how
//! far the caller has moved through the resulting linear history. The actions
//! are fixed when the stack is built; the histories only record *that* a step
//! happened, so every undo runs the same `undo` action and every redo the same
//! `redo` action.

use std::collections::VecDeque;
use std::fmt;
use std::num::NonZeroUsize;

use crate::error::{Error, Result};

/// A zero-argument action owned by a [`CommandStack`].
pub type Action<'a> = Box<dyn FnMut() + 'a>;

const DEFAULT_LABEL: &str = "command-stack";

/// What [`CommandStack::execute`] does with pending redo steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RedoPolicy {
    /// Executing after one or more undos discards the redo history.
    #[default]
    ClearOnExecute,
    /// Executing leaves the redo history untouched.
    Preserve,
}

/// Builder for a [`CommandStack`].
///
/// `execute` and `undo` are required; [`build`](Self::build) rejects a builder
/// missing either one.
///
/// # Examples
///
/// ```
/// use std::cell::Cell;
/// use nlib::{CommandStack, RedoPolicy};
///
/// let counter = Cell::new(0);
/// let mut stack = CommandStack::builder()
///     .execute(|| counter.set(counter.get() + 1))
///     .undo(|| counter.set(counter.get() - 1))
///     .redo_policy(RedoPolicy::Preserve)
///     .label("counter")
///     .build()
///     .expect("execute and undo were supplied");
///
/// stack.execute();
/// assert_eq!(counter.get(), 1);
/// ```
pub struct CommandStackBuilder<'a> {
    execute: Option<Action<'a>>,
    undo: Option<Action<'a>>,
    redo: Option<Action<'a>>,
    redo_policy: RedoPolicy,
    history_limit: Option<usize>,
    label: String,
}

impl<'a> CommandStackBuilder<'a> {
    fn new() -> Self {
        Self {
            execute: None,
            undo: None,
            redo: None,
            redo_policy: RedoPolicy::default(),
            history_limit: None,
            label: DEFAULT_LABEL.to_string(),
        }
    }

    /// Sets the forward action.
    pub fn execute(mut self, action: impl FnMut() + 'a) -> Self {
        self.execute = Some(Box::new(action));
        self
    }

    /// Sets the inverse action.
    pub fn undo(mut self, action: impl FnMut() + 'a) -> Self {
        self.undo = Some(Box::new(action));
        self
    }

    /// Sets the action run by [`CommandStack::redo`].
    ///
    /// When omitted, the execute action is reused.
    pub fn redo(mut self, action: impl FnMut() + 'a) -> Self {
        self.redo = Some(Box::new(action));
        self
    }

    /// Accepts an action that may be absent, such as one looked up at runtime.
    pub fn execute_opt(mut self, action: Option<Action<'a>>) -> Self {
        self.execute = action;
        self
    }

    /// Optional counterpart of [`undo`](Self::undo).
    pub fn undo_opt(mut self, action: Option<Action<'a>>) -> Self {
        self.undo = action;
        self
    }

    /// Optional counterpart of [`redo`](Self::redo).
    pub fn redo_opt(mut self, action: Option<Action<'a>>) -> Self {
        self.redo = action;
        self
    }

    /// Chooses how `execute` treats pending redo steps.
    pub fn redo_policy(mut self, policy: RedoPolicy) -> Self {
        self.redo_policy = policy;
        self
    }

    /// Caps the undo history; the oldest step is dropped once the cap is hit.
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.history_limit = Some(limit);
        self
    }

    /// Names the stack in log events.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Validates the configuration and builds the stack.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::ErrorKind::InvalidArgument)
    /// if the execute or undo action is missing, or if the history limit is 0.
    pub fn build(self) -> Result<CommandStack<'a>> {
        let execute = self
            .execute
            .ok_or_else(|| Error::invalid_argument("execute action is required"))?;
        let undo = self
            .undo
            .ok_or_else(|| Error::invalid_argument("undo action is required"))?;

        let history_limit = match self.history_limit {
            Some(limit) => Some(NonZeroUsize::new(limit).ok_or_else(|| {
                Error::invalid_argument("history limit must be greater than 0")
            })?),
            None => None,
        };

        Ok(CommandStack {
            execute,
            undo,
            redo: self.redo,
            undo_history: VecDeque::new(),
            redo_history: Vec::new(),
            next_step: 0,
            redo_policy: self.redo_policy,
            history_limit,
            label: self.label,
        })
    }
}

impl fmt::Debug for CommandStackBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandStackBuilder")
            .field("has_execute", &self.execute.is_some())
            .field("has_undo", &self.undo.is_some())
            .field("has_redo", &self.redo.is_some())
            .field("redo_policy", &self.redo_policy)
            .field("history_limit", &self.history_limit)
            .field("label", &self.label)
            .finish()
    }
}

/// A linear undo/redo history over a fixed set of actions.
///
/// # Examples
///
/// ```
/// use std::cell::Cell;
/// use nlib::CommandStack;
///
/// let i = Cell::new(1);
/// let mut stack = CommandStack::new(|| i.set(i.get() + 1), || i.set(i.get() - 1));
///
/// stack.execute();
/// stack.execute();
/// assert_eq!(i.get(), 3);
///
/// stack.undo().unwrap();
/// stack.undo().unwrap();
/// assert_eq!(i.get(), 1);
/// assert!(!stack.can_undo());
///
/// stack.redo().unwrap();
/// assert_eq!(i.get(), 2);
/// ```
pub struct CommandStack<'a> {
    execute: Action<'a>,
    undo: Action<'a>,
    // None reuses `execute`
    redo: Option<Action<'a>>,
    undo_history: VecDeque<u64>,
    redo_history: Vec<u64>,
    next_step: u64,
    redo_policy: RedoPolicy,
    history_limit: Option<NonZeroUsize>,
    label: String,
}

impl<'a> CommandStack<'a> {
    /// Starts building a stack.
    pub fn builder() -> CommandStackBuilder<'a> {
        CommandStackBuilder::new()
    }

    /// Creates a stack whose redo action is the execute action.
    pub fn new(execute: impl FnMut() + 'a, undo: impl FnMut() + 'a) -> Self {
        Self::from_parts(Box::new(execute), Box::new(undo), None)
    }

    /// Creates a stack with a dedicated redo action.
    pub fn with_redo(
        execute: impl FnMut() + 'a,
        undo: impl FnMut() + 'a,
        redo: impl FnMut() + 'a,
    ) -> Self {
        Self::from_parts(Box::new(execute), Box::new(undo), Some(Box::new(redo)))
    }

    fn from_parts(execute: Action<'a>, undo: Action<'a>, redo: Option<Action<'a>>) -> Self {
        Self {
            execute,
            undo,
            redo,
            undo_history: VecDeque::new(),
            redo_history: Vec::new(),
            next_step: 0,
            redo_policy: RedoPolicy::default(),
            history_limit: None,
            label: DEFAULT_LABEL.to_string(),
        }
    }

    /// Records a new step and runs the execute action.
    pub fn execute(&mut self) {
        if self.redo_policy == RedoPolicy::ClearOnExecute && !self.redo_history.is_empty() {
            tracing::trace!(
                stack = %self.label,
                discarded = self.redo_history.len(),
                "discarding redo history"
            );
            self.redo_history.clear();
        }

        let step = self.next_step;
        self.next_step += 1;
        self.push_undo(step);

        tracing::debug!(
            stack = %self.label,
            step,
            undo_depth = self.undo_history.len(),
            redo_depth = self.redo_history.len(),
            "execute"
        );
        (self.execute)();
    }

    /// Steps back once, running the undo action.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidOperation`](crate::ErrorKind::InvalidOperation)
    /// if there is nothing to undo.
    pub fn undo(&mut self) -> Result<()> {
        let Some(step) = self.undo_history.pop_back() else {
            tracing::warn!(stack = %self.label, "undo refused: undo history is empty");
            return Err(Error::invalid_operation("undo history is empty"));
        };
        self.redo_history.push(step);

        tracing::debug!(
            stack = %self.label,
            step,
            undo_depth = self.undo_history.len(),
            redo_depth = self.redo_history.len(),
            "undo"
        );
        (self.undo)();
        Ok(())
    }

    /// Steps forward once, running the redo action.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidOperation`](crate::ErrorKind::InvalidOperation)
    /// if there is nothing to redo.
    pub fn redo(&mut self) -> Result<()> {
        let Some(step) = self.redo_history.pop() else {
            tracing::warn!(stack = %self.label, "redo refused: redo history is empty");
            return Err(Error::invalid_operation("redo history is empty"));
        };
        self.push_undo(step);

        tracing::debug!(
            stack = %self.label,
            step,
            undo_depth = self.undo_history.len(),
            redo_depth = self.redo_history.len(),
            "redo"
        );
        match self.redo.as_mut() {
            Some(redo) => redo(),
            None => (self.execute)(),
        }
        Ok(())
    }

    /// Empties both histories. The actions are kept.
    pub fn clear(&mut self) {
        self.undo_history.clear();
        self.redo_history.clear();
        tracing::debug!(stack = %self.label, "cleared history");
    }

    /// Returns true if [`undo`](Self::undo) would succeed.
    pub fn can_undo(&self) -> bool {
        !self.undo_history.is_empty()
    }

    /// Returns true if [`redo`](Self::redo) would succeed.
    pub fn can_redo(&self) -> bool {
        !self.redo_history.is_empty()
    }

    /// Number of steps that can be undone.
    pub fn undo_depth(&self) -> usize {
        self.undo_history.len()
    }

    /// Number of steps that can be redone.
    pub fn redo_depth(&self) -> usize {
        self.redo_history.len()
    }

    /// Returns the configured redo policy.
    pub fn redo_policy(&self) -> RedoPolicy {
        self.redo_policy
    }

    /// Returns the label used in log events.
    pub fn label(&self) -> &str {
        &self.label
    }

    fn push_undo(&mut self, step: u64) {
        self.undo_history.push_back(step);
        if let Some(limit) = self.history_limit {
            while self.undo_history.len() > limit.get() {
                if let Some(dropped) = self.undo_history.pop_front() {
                    tracing::trace!(stack = %self.label, step = dropped, "history limit reached");
                }
            }
        }
    }
}

impl fmt::Debug for CommandStack<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandStack")
            .field("label", &self.label)
            .field("undo_depth", &self.undo_history.len())
            .field("redo_depth", &self.redo_history.len())
            .field("redo_policy", &self.redo_policy)
            .field("history_limit", &self.history_limit)
            .finish_non_exhaustive()
    }
}
