use tracing::{info, warn};

use crate::error::{ExpressionSyntaxError, RefreshError};
use crate::math::expression::Expression;

/// Holds the formula currently being plotted.
#[derive(Debug, Clone, Default)]
pub struct ScalarField {
    expression: Option<Expression>,
}

impl ScalarField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_expression(text: &str) -> Result<Self, ExpressionSyntaxError> {
        let mut field = Self::new();
        field.set_expression(text)?;
        Ok(field)
    }

    /// Compiles `text` and swaps it in. On a syntax error the previous
    /// expression stays active.
    pub fn set_expression(&mut self, text: &str) -> Result<(), ExpressionSyntaxError> {
        match Expression::compile(text) {
            Ok(expression) => {
                info!(expression = %expression, "expression compiled");
                self.expression = Some(expression);
                Ok(())
            }
            Err(err) => {
                warn!(%err, text, "expression rejected");
                Err(err)
            }
        }
    }

    pub fn expression(&self) -> Option<&Expression> {
        self.expression.as_ref()
    }

    pub fn height_at(&self, x: f64, z: f64) -> Result<f64, RefreshError> {
        let expression = self.expression.as_ref().ok_or(RefreshError::NoExpression)?;
        Ok(expression.evaluate(x, z)?)
    }
}

impl TryFrom<&str> for ScalarField {
    type Error = ExpressionSyntaxError;

    fn try_from(text: &str) -> Result<Self, Self::Error> {
        Self::with_expression(text)
    }
}

impl From<Expression> for ScalarField {
    fn from(expression: Expression) -> Self {
        Self {
            expression: Some(expression),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EvaluationError;

    #[test]
    fn rejected_expression_keeps_previous() {
        let mut field = ScalarField::with_expression("x * z").unwrap();
        assert!(field.set_expression("x +").is_err());
        assert_eq!(field.expression().map(|e| e.source()), Some("x * z"));
        assert_eq!(field.height_at(2.0, 3.0), Ok(6.0));
    }

    #[test]
    fn empty_field_cannot_be_sampled() {
        let field = ScalarField::new();
        assert_eq!(field.height_at(0.0, 0.0), Err(RefreshError::NoExpression));
    }

    #[test]
    fn evaluation_errors_pass_through() {
        let field = ScalarField::try_from("log(x)").unwrap();
        assert!(matches!(
            field.height_at(-1.0, 0.0),
            Err(RefreshError::Evaluation(EvaluationError::NonReal { .. }))
        ));
    }
}
