//! Validators that compare two fields of the same model.
//!
//! Each rule names both fields, reads them through accessor closures and
//! checks them with a [`Comparison`]. Failures are reported on the left
//! field.

use std::cmp::Ordering;
use std::fmt;

use crate::validation::{ValidationError, ValidationErrorKind, Validator};

/// How the left value must relate to the right value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    /// `left == right`
    Equal,
    /// `left != right`
    NotEqual,
    /// `left > right`
    Greater,
    /// `left >= right`
    GreaterOrEqual,
    /// `left < right`
    Less,
    /// `left <= right`
    LessOrEqual,
}

impl Comparison {
    /// Returns true if `ordering` (of left relative to right) satisfies this comparison.
    pub fn holds(self, ordering: Ordering) -> bool {
        match self {
            Self::Equal => ordering == Ordering::Equal,
            Self::NotEqual => ordering != Ordering::Equal,
            Self::Greater => ordering == Ordering::Greater,
            Self::GreaterOrEqual => ordering != Ordering::Less,
            Self::Less => ordering == Ordering::Less,
            Self::LessOrEqual => ordering != Ordering::Greater,
        }
    }

    /// Compares two values, returning `None` if they have no ordering.
    pub fn evaluate<T: PartialOrd + ?Sized>(self, left: &T, right: &T) -> Option<bool> {
        left.partial_cmp(right).map(|ordering| self.holds(ordering))
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equal => write!(f, "equal to"),
            Self::NotEqual => write!(f, "not equal to"),
            Self::Greater => write!(f, "greater than"),
            Self::GreaterOrEqual => write!(f, "greater than or equal to"),
            Self::Less => write!(f, "less than"),
            Self::LessOrEqual => write!(f, "less than or equal to"),
        }
    }
}

/// A value paired with the name of the field it came from.
#[derive(Debug, Clone, Copy)]
pub struct FieldValue<'a, T: ?Sized> {
    name: &'a str,
    value: &'a T,
}

impl<'a, T: ?Sized> FieldValue<'a, T> {
    /// Pairs `value` with the field `name`.
    pub fn new(name: &'a str, value: &'a T) -> Self {
        Self { name, value }
    }

    /// Returns the field name.
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Returns the value.
    pub fn value(&self) -> &'a T {
        self.value
    }
}

/// Checks that `left` relates to `right` as `mode` requires.
///
/// Values without an ordering (for example NaN) fail with
/// [`ValidationErrorKind::Incomparable`] for every mode.
///
/// # Errors
///
/// Returns a [`ValidationError`] reported on the left field if the
/// comparison does not hold.
///
/// # Examples
///
/// ```
/// use nlib::{compare_values, Comparison, FieldValue, ValidationErrorKind};
///
/// let min = FieldValue::new("min", &1);
/// let ok = compare_values(FieldValue::new("max", &10), Comparison::Greater, min);
/// assert!(ok.is_ok());
///
/// let min = FieldValue::new("min", &10);
/// let err = compare_values(FieldValue::new("max", &1), Comparison::Greater, min).unwrap_err();
/// assert_eq!(err.field(), "max");
/// assert_eq!(err.message(), "max must be greater than min");
/// assert_eq!(err.kind(), ValidationErrorKind::ComparisonFailed);
/// ```
pub fn compare_values<T: PartialOrd + ?Sized>(
    left: FieldValue<'_, T>,
    mode: Comparison,
    right: FieldValue<'_, T>,
) -> Result<(), ValidationError> {
    match mode.evaluate(left.value, right.value) {
        Some(true) => Ok(()),
        Some(false) => {
            tracing::debug!(
                rule = %mode,
                left = left.name,
                right = right.name,
                "comparison failed"
            );
            Err(ValidationError::new(
                ValidationErrorKind::ComparisonFailed,
                left.name,
                format!("{} must be {} {}", left.name, mode, right.name),
            ))
        }
        None => {
            tracing::debug!(
                rule = %mode,
                left = left.name,
                right = right.name,
                "values are incomparable"
            );
            Err(ValidationError::new(
                ValidationErrorKind::Incomparable,
                left.name,
                format!("{} cannot be compared with {}", left.name, right.name),
            ))
        }
    }
}

type Accessor<M, T> = Box<dyn Fn(&M) -> Option<T> + Send + Sync>;

/// A validator comparing two named fields of a model `M`.
///
/// # Examples
///
/// ```
/// use nlib::{CompareFields, Comparison, Validator};
///
/// struct Signup {
///     password: String,
///     confirm: String,
/// }
///
/// let rule = CompareFields::new(
///     "confirm",
///     |s: &Signup| s.confirm.clone(),
///     Comparison::Equal,
///     "password",
///     |s: &Signup| s.password.clone(),
/// );
///
/// let good = Signup { password: "hunter2".into(), confirm: "hunter2".into() };
/// let bad = Signup { password: "hunter2".into(), confirm: "hunter3".into() };
///
/// assert!(rule.validate(&good).is_ok());
/// assert_eq!(rule.validate(&bad).unwrap_err().field(), "confirm");
/// ```
pub struct CompareFields<M, T> {
    left: String,
    left_value: Accessor<M, T>,
    mode: Comparison,
    right: String,
    right_value: Accessor<M, T>,
    require_both: bool,
    message: Option<String>,
}

impl<M: 'static, T: PartialOrd + 'static> CompareFields<M, T> {
    /// Creates a rule over two fields that are always present.
    pub fn new<L, R>(
        left: impl Into<String>,
        left_value: L,
        mode: Comparison,
        right: impl Into<String>,
        right_value: R,
    ) -> Self
    where
        L: Fn(&M) -> T + Send + Sync + 'static,
        R: Fn(&M) -> T + Send + Sync + 'static,
    {
        Self::optional(
            left,
            move |model: &M| Some(left_value(model)),
            mode,
            right,
            move |model: &M| Some(right_value(model)),
        )
    }

    /// Creates a rule over two fields that may be absent.
    ///
    /// The rule passes when either side is `None` unless
    /// [`require_both`](Self::require_both) is set.
    pub fn optional<L, R>(
        left: impl Into<String>,
        left_value: L,
        mode: Comparison,
        right: impl Into<String>,
        right_value: R,
    ) -> Self
    where
        L: Fn(&M) -> Option<T> + Send + Sync + 'static,
        R: Fn(&M) -> Option<T> + Send + Sync + 'static,
    {
        Self {
            left: left.into(),
            left_value: Box::new(left_value),
            mode,
            right: right.into(),
            right_value: Box::new(right_value),
            require_both: false,
            message: None,
        }
    }
}

impl<M, T> CompareFields<M, T> {
    /// Reports a missing value instead of skipping the comparison.
    pub fn require_both(mut self) -> Self {
        self.require_both = true;
        self
    }

    /// Replaces the default message of a failed comparison.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Returns the comparison mode.
    pub fn mode(&self) -> Comparison {
        self.mode
    }

    /// Returns the names of the left and right fields.
    pub fn fields(&self) -> (&str, &str) {
        (&self.left, &self.right)
    }

    fn missing(&self, field: &str) -> ValidationError {
        ValidationError::new(
            ValidationErrorKind::Missing,
            field,
            format!("{} is required to compare {} with {}", field, self.left, self.right),
        )
    }
}

impl<M, T: PartialOrd> Validator<M> for CompareFields<M, T> {
    fn validate(&self, model: &M) -> Result<(), ValidationError> {
        let left = (self.left_value)(model);
        let right = (self.right_value)(model);

        let (left, right) = match (left, right) {
            (Some(left), Some(right)) => (left, right),
            (None, _) if self.require_both => return Err(self.missing(&self.left)),
            (_, None) if self.require_both => return Err(self.missing(&self.right)),
            _ => return Ok(()),
        };

        compare_values(
            FieldValue::new(&self.left, &left),
            self.mode,
            FieldValue::new(&self.right, &right),
        )
        .map_err(|error| match (&self.message, error.kind()) {
            (Some(message), ValidationErrorKind::ComparisonFailed) => {
                ValidationError::new(error.kind(), error.field(), message.clone())
            }
            _ => error,
        })
    }
}

impl<M, T> fmt::Debug for CompareFields<M, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompareFields")
            .field("left", &self.left)
            .field("mode", &self.mode)
            .field("right", &self.right)
            .field("require_both", &self.require_both)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}
