use garde::Validate;

use crate::error::{AppError, AppResult, FieldViolation};

/// Every rule the input breaks, keyed by its GraphQL (camelCase) field name.
pub fn violations_of<T>(input: &T) -> Vec<FieldViolation>
where
    T: Validate<Context = ()>,
{
    match input.validate(&()) {
        Ok(()) => Vec::new(),
        Err(report) => report
            .iter()
            .map(|(path, error)| FieldViolation::new(camel_case(&path.to_string()), error.to_string()))
            .collect(),
    }
}

pub fn ensure_valid(violations: Vec<FieldViolation>) -> AppResult<()> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(AppError::from_violations(violations))
    }
}

pub fn validate<T>(input: &T) -> AppResult<()>
where
    T: Validate<Context = ()>,
{
    ensure_valid(violations_of(input))
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for ch in field.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.push(ch.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}
