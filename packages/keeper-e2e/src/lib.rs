use std::time::Duration;

pub mod config;
pub mod device;

pub use config::E2eConfig;
pub use device::Device;
pub use tests::run_all_tests;

/// Represents the outcome of a single scenario
#[derive(Debug, Clone)]
pub enum TestResult {
    Pass {
        name: String,
        duration: Duration,
    },
    Fail {
        name: String,
        error: String,
        duration: Duration,
    },
    Skip {
        name: String,
        reason: String,
    },
}

impl TestResult {
    pub fn pass(name: impl Into<String>, duration: Duration) -> Self {
        Self::Pass {
            name: name.into(),
            duration,
        }
    }

    pub fn fail(name: impl Into<String>, error: impl Into<String>, duration: Duration) -> Self {
        Self::Fail {
            name: name.into(),
            error: error.into(),
            duration,
        }
    }

    pub fn skip(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Skip {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Pass { name, .. } | Self::Fail { name, .. } | Self::Skip { name, .. } => name,
        }
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, Self::Fail { .. })
    }
}

/// Print a one-line report per result and return whether the suite is
/// green.
pub fn report(results: &[TestResult]) -> bool {
    let mut passed = 0usize;
    let mut failed = 0usize;
    let mut skipped = 0usize;
    for result in results {
        match result {
            TestResult::Pass { name, duration } => {
                passed += 1;
                println!("PASS {name} ({duration:.1?})");
            }
            TestResult::Fail {
                name,
                error,
                duration,
            } => {
                failed += 1;
                println!("FAIL {name} ({duration:.1?}): {error}");
            }
            TestResult::Skip { name, reason } => {
                skipped += 1;
                println!("SKIP {name}: {reason}");
            }
        }
    }
    println!("{passed} passed, {failed} failed, {skipped} skipped");
    failed == 0
}
