use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Advisory stop flag shared with whoever wants to halt a run.
///
/// The engine only looks at it on loop back-edges and before function calls.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Execution budget for one engine invocation.
#[derive(Debug, Clone)]
pub(crate) struct Budget {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Budget {
    pub(crate) fn start(token: &CancellationToken, time_budget: Option<Duration>) -> Self {
        Self {
            token: token.clone(),
            deadline: time_budget.map(|budget| Instant::now() + budget),
        }
    }

    pub(crate) fn is_exhausted(&self) -> bool {
        self.token.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_clones_share_flag() {
        let token = CancellationToken::new();
        let other = token.clone();
        assert!(!other.is_cancelled());
        token.cancel();
        assert!(other.is_cancelled());
    }

    #[test]
    fn test_budget_without_limit_never_exhausts() {
        let budget = Budget::start(&CancellationToken::new(), None);
        assert!(!budget.is_exhausted());
    }

    #[test]
    fn test_zero_budget_is_exhausted() {
        let budget = Budget::start(&CancellationToken::new(), Some(Duration::ZERO));
        assert!(budget.is_exhausted());
    }
}
