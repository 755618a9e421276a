use std::fmt;

/// Error describing why a model failed a validation rule.
///
/// The error names the offending field but never includes field values, so
/// it is safe to log or return to a caller.
///
/// # Examples
///
/// ```
/// use nlib::{ValidationError, ValidationErrorKind};
///
/// let error = ValidationError::new(
///     ValidationErrorKind::ComparisonFailed,
///     "confirm",
///     "confirm must be equal to password",
/// );
/// assert_eq!(error.field(), "confirm");
/// assert_eq!(error.kind(), ValidationErrorKind::ComparisonFailed);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    kind: ValidationErrorKind,
    field: String,
    message: String,
}

impl ValidationError {
    /// Creates a new validation error for `field`.
    pub fn new(
        kind: ValidationErrorKind,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ValidationErrorKind {
        self.kind
    }

    /// Returns the name of the field the error is reported on.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "validation failed for `{}` ({}): {}",
            self.field, self.kind, self.message
        )
    }
}

impl std::error::Error for ValidationError {}

/// Kind of validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// The two values did not satisfy the comparison.
    ComparisonFailed,
    /// A value that had to be present was absent.
    Missing,
    /// The two values have no ordering relative to each other.
    Incomparable,
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ComparisonFailed => write!(f, "comparison failed"),
            Self::Missing => write!(f, "missing value"),
            Self::Incomparable => write!(f, "incomparable values"),
        }
    }
}

/// A rule that checks a model of type `M`.
///
/// # Examples
///
/// ```
/// use nlib::{ValidationError, ValidationErrorKind, Validator};
///
/// struct NonEmptyName;
///
/// struct User {
///     name: String,
/// }
///
/// impl Validator<User> for NonEmptyName {
///     fn validate(&self, model: &User) -> Result<(), ValidationError> {
///         if model.name.is_empty() {
///             return Err(ValidationError::new(
///                 ValidationErrorKind::Missing,
///                 "name",
///                 "name is required",
///             ));
///         }
///         Ok(())
///     }
/// }
///
/// assert!(NonEmptyName.validate(&User { name: "Ada".into() }).is_ok());
/// ```
pub trait Validator<M: ?Sized> {
    /// Checks `model`, returning the first problem found.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the model violates the rule.
    fn validate(&self, model: &M) -> Result<(), ValidationError>;
}

impl<M: ?Sized, V: Validator<M> + ?Sized> Validator<M> for &V {
    fn validate(&self, model: &M) -> Result<(), ValidationError> {
        (**self).validate(model)
    }
}

impl<M: ?Sized, V: Validator<M> + ?Sized> Validator<M> for Box<V> {
    fn validate(&self, model: &M) -> Result<(), ValidationError> {
        (**self).validate(model)
    }
}

/// The collected outcome of running several rules against one model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    errors: Vec<ValidationError>,
}

impl ValidationReport {
    /// Creates an empty (valid) report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs every validator against `model` and collects the failures.
    pub fn run<M: ?Sized>(model: &M, validators: &[&dyn Validator<M>]) -> Self {
        let mut report = Self::new();
        for validator in validators {
            report.check(model, *validator);
        }
        report
    }

    /// Runs one validator and records its failure, if any.
    pub fn check<M, V>(&mut self, model: &M, validator: &V) -> &mut Self
    where
        M: ?Sized,
        V: Validator<M> + ?Sized,
    {
        if let Err(error) = validator.validate(model) {
            self.errors.push(error);
        }
        self
    }

    /// Records an error produced elsewhere.
    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Returns true if no rule failed.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns every recorded error in the order the rules ran.
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Returns the errors reported on `field`.
    pub fn errors_for<'a>(
        &'a self,
        field: &'a str,
    ) -> impl Iterator<Item = &'a ValidationError> + 'a {
        self.errors.iter().filter(move |error| error.field == field)
    }

    /// Converts the report into a `Result`, failing with all recorded errors.
    ///
    /// # Errors
    ///
    /// Returns the recorded errors if any rule failed.
    pub fn into_result(self) -> Result<(), Vec<ValidationError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}
