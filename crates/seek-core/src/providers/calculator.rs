use super::CALCULATOR_SIGIL;
use crate::calc::{format_number, ExpressionEvaluator};
use crate::icon::IconResolver;
use crate::result::{SearchResult, CALCULATOR_ICON};
use std::sync::Arc;
use tracing::debug;

/// Evaluates `=expression` queries.
pub struct CalculatorProvider {
    evaluator: Arc<dyn ExpressionEvaluator>,
    icons: Arc<dyn IconResolver>,
}

impl CalculatorProvider {
    pub fn new(evaluator: Arc<dyn ExpressionEvaluator>, icons: Arc<dyn IconResolver>) -> Self {
        CalculatorProvider { evaluator, icons }
    }

    pub fn query<F>(&self, text: &str, on_complete: F)
    where
        F: FnOnce(Vec<SearchResult>),
    {
        let Some(expression) = text.strip_prefix(CALCULATOR_SIGIL) else {
            on_complete(Vec::new());
            return;
        };

        let value = match self.evaluator.evaluate(expression) {
            Ok(value) => value,
            Err(err) => {
                debug!(expression, error = %err, "Expression did not evaluate");
                on_complete(Vec::new());
                return;
            }
        };

        let display = value
            .as_number()
            .map(format_number)
            .unwrap_or_else(|| "0".to_string());

        on_complete(vec![SearchResult::calculator(
            self.icons.default_icon(CALCULATOR_ICON),
            display,
        )]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc::ArithmeticEvaluator;
    use crate::icon::{Icon, IconRegistry};
    use crate::result::{CALCULATOR_SCORE, CALCULATOR_SUBTITLE};

    fn run(text: &str) -> Vec<SearchResult> {
        let provider =
            CalculatorProvider::new(Arc::new(ArithmeticEvaluator), Arc::new(IconRegistry::new()));
        let mut out = None;
        provider.query(text, |results| out = Some(results));
        out.unwrap()
    }

    #[test]
    fn test_evaluates_expression() {
        let results = run("=2+2");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title(), "4");
        assert_eq!(results[0].subtitle(), CALCULATOR_SUBTITLE);
        assert_eq!(results[0].score(), CALCULATOR_SCORE);
        assert_eq!(**results[0].icon(), Icon::Named(CALCULATOR_ICON.to_string()));
    }

    #[test]
    fn test_fractional_result() {
        assert_eq!(run("=1/4")[0].title(), "0.25");
    }

    #[test]
    fn test_parse_error_yields_nothing() {
        assert!(run("=bogus((").is_empty());
    }

    #[test]
    fn test_runtime_error_yields_nothing() {
        assert!(run("=nosuchfn(1)").is_empty());
    }

    #[test]
    fn test_non_numeric_value_displays_zero() {
        assert_eq!(run("=\"str\"")[0].title(), "0");
        assert_eq!(run("=")[0].title(), "0");
    }

    #[test]
    fn test_requires_sigil() {
        assert!(run("2+2").is_empty());
    }
}
