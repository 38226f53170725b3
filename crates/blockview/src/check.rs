//! Bulk condition checks.
//!
//! [`ConditionEvaluator::check_elements`] never fails on an individual check:
//! each outcome is recorded on its [`ConditionCheck`], so callers can report
//! every offending element at once as "k of n".

use crate::condition::Condition;
use crate::config::VerifyConfig;
use crate::document::ElementHandle;
use crate::report::{Attachment, AttachmentSink, AttachmentStatus};
use crate::result::{ViewError, ViewResult};
use crate::wait::WaitOptions;
use std::fmt;
use std::sync::Arc;

/// One condition against one element, with its outcome
#[derive(Debug, Clone)]
pub struct ConditionCheck {
    /// Element name, as declared
    pub name: String,
    /// Element the condition runs against
    pub target: ElementHandle,
    /// Condition to hold
    pub condition: Condition,
    /// Human-readable expectation
    pub message: String,
    /// Outcome; false until checked
    pub passed: bool,
}

impl ConditionCheck {
    /// New, unchecked
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        target: ElementHandle,
        condition: Condition,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            target,
            condition,
            message: message.into(),
            passed: false,
        }
    }
}

impl fmt::Display for ConditionCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Element: {}\nLocator: {}\nCheck: {}\nResult: {}",
            self.name,
            self.target,
            self.message,
            if self.passed { "passed" } else { "failed" }
        )
    }
}

/// Checks that failed
#[must_use]
pub fn failed_checks(checks: &[ConditionCheck]) -> Vec<&ConditionCheck> {
    checks.iter().filter(|c| !c.passed).collect()
}

/// Checks that passed
#[must_use]
pub fn passed_checks(checks: &[ConditionCheck]) -> Vec<&ConditionCheck> {
    checks.iter().filter(|c| c.passed).collect()
}

/// Checks separated by blank lines
#[must_use]
pub fn to_diagnostic_string(checks: &[&ConditionCheck]) -> String {
    checks
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Runs checks under the configured polling window and reports results
#[derive(Debug, Clone)]
pub struct ConditionEvaluator {
    config: Arc<VerifyConfig>,
    sink: Arc<dyn AttachmentSink>,
}

impl ConditionEvaluator {
    /// Evaluator reading `config` and reporting to `sink`
    #[must_use]
    pub fn new(config: Arc<VerifyConfig>, sink: Arc<dyn AttachmentSink>) -> Self {
        Self { config, sink }
    }

    /// Shared configuration
    #[must_use]
    pub fn config(&self) -> &VerifyConfig {
        &self.config
    }

    /// Attachment sink
    #[must_use]
    pub fn sink(&self) -> &Arc<dyn AttachmentSink> {
        &self.sink
    }

    /// Wait options for the configured window
    #[must_use]
    pub fn wait_options(&self) -> WaitOptions {
        self.config.wait_options()
    }

    /// Poll every check in turn, each for up to `timeout_ms`, recording the
    /// outcome. Returns the checks in their original order.
    #[must_use]
    pub fn check_elements(&self, mut checks: Vec<ConditionCheck>, timeout_ms: u64) -> Vec<ConditionCheck> {
        let options = self.config.wait_options_with_timeout(timeout_ms);
        for check in &mut checks {
            check.passed = check.target.wait_until(&check.condition, &options);
            tracing::debug!(
                element = %check.name,
                locator = %check.target,
                condition = %check.condition,
                passed = check.passed,
                "condition check"
            );
        }
        checks
    }

    /// [`check_elements`](Self::check_elements) with the configured timeout
    #[must_use]
    pub fn check_all(&self, checks: Vec<ConditionCheck>) -> Vec<ConditionCheck> {
        self.check_elements(checks, self.config.timeout_ms)
    }

    /// Attach the passed (or failed) subset as `"{label}: k of n"`.
    /// Nothing is attached when the subset is empty.
    pub fn attach_check_list_results(&self, label: &str, checks: &[ConditionCheck], want_passed: bool) {
        let subset = if want_passed {
            passed_checks(checks)
        } else {
            failed_checks(checks)
        };
        if subset.is_empty() {
            return;
        }
        self.sink.attach(Attachment::new(
            format!("{label}: {} of {}", subset.len(), checks.len()),
            AttachmentStatus::from_passed(want_passed),
            to_diagnostic_string(&subset),
        ));
    }

    /// Attach a free-form diagnostic
    pub fn attach(&self, label: impl Into<String>, status: AttachmentStatus, payload: impl Into<String>) {
        self.sink.attach(Attachment::new(label, status, payload));
    }

    /// Fail with `"{headline}: k of n"` and every failed check when any check failed
    pub fn ensure_passed(&self, headline: &str, checks: &[ConditionCheck]) -> ViewResult<()> {
        let failed = failed_checks(checks);
        if failed.is_empty() {
            tracing::info!(checks = checks.len(), "{headline}: all passed");
            return Ok(());
        }
        let message = format!(
            "{headline}: {} of {}\n{}",
            failed.len(),
            checks.len(),
            to_diagnostic_string(&failed)
        );
        tracing::warn!(failed = failed.len(), total = checks.len(), "{headline}");
        self.attach(headline, AttachmentStatus::Failed, message.clone());
        Err(ViewError::verification(message))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::locator::Selector;
    use crate::mock::{MockDocument, MockNode};
    use crate::report::MemorySink;

    fn evaluator(sink: Arc<MemorySink>) -> ConditionEvaluator {
        let config = VerifyConfig::new()
            .with_timeout_ms(60)
            .with_polling_interval_ms(5);
        ConditionEvaluator::new(Arc::new(config), sink)
    }

    fn three_checks() -> Vec<ConditionCheck> {
        let doc = MockDocument::new();
        let _ = doc.append(doc.root(), MockNode::new("h1").class("one").text("Title"));
        let _ = doc.append(doc.root(), MockNode::new("p").class("three").text("Body"));
        let root = ElementHandle::document_root(doc);
        ["one", "two", "three"]
            .into_iter()
            .map(|class| {
                ConditionCheck::new(
                    class,
                    root.find(Selector::css(format!(".{class}"))),
                    Condition::Visible,
                    format!("Element '{class}' is displayed"),
                )
            })
            .collect()
    }

    mod check_elements_tests {
        use super::*;

        #[test]
        fn test_only_second_fails() {
            let sink = Arc::new(MemorySink::new());
            let evaluator = evaluator(Arc::clone(&sink));
            let checks = evaluator.check_elements(three_checks(), 30);
            assert_eq!(checks.len(), 3);
            assert!(checks[0].passed);
            assert!(!checks[1].passed);
            assert!(checks[2].passed);

            evaluator.attach_check_list_results("Failed", &checks, false);
            let attachments = sink.attachments();
            assert_eq!(attachments.len(), 1);
            assert_eq!(attachments[0].label, "Failed: 1 of 3");
            assert!(attachments[0].payload.contains("Element: two"));
            assert!(!attachments[0].payload.contains("Element: one"));
            assert!(!attachments[0].payload.contains("Element: three"));
        }

        #[test]
        fn test_empty_subset_not_attached() {
            let sink = Arc::new(MemorySink::new());
            let evaluator = evaluator(Arc::clone(&sink));
            let checks = evaluator.check_elements(three_checks(), 0);
            evaluator.attach_check_list_results("Failed", &checks[..1], false);
            assert!(sink.is_empty());
        }
    }

    mod ensure_passed_tests {
        use super::*;

        #[test]
        fn test_failure_message_counts() {
            let sink = Arc::new(MemorySink::new());
            let evaluator = evaluator(Arc::clone(&sink));
            let checks = evaluator.check_elements(three_checks(), 0);
            let err = evaluator.ensure_passed("Elements did not appear", &checks).unwrap_err();
            assert!(err.is_verification());
            let text = err.to_string();
            assert!(text.contains("Elements did not appear: 1 of 3"));
            assert!(text.contains("Element: two"));
            assert!(text.contains("Result: failed"));
        }

        #[test]
        fn test_all_passed() {
            let sink = Arc::new(MemorySink::new());
            let evaluator = evaluator(sink);
            let checks = evaluator.check_elements(three_checks(), 0);
            assert!(evaluator.ensure_passed("x", &[checks[0].clone()]).is_ok());
        }
    }

    #[test]
    fn test_display_format() {
        let mut check = three_checks().remove(0);
        check.passed = true;
        assert_eq!(
            check.to_string(),
            "Element: one\nLocator: By.css: .one\nCheck: Element 'one' is displayed\nResult: passed"
        );
    }
}
