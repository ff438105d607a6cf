use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("portfolio_chat.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter =
    Counter::new("portfolio_chat.client.request_errors");
pub(crate) static CLIENT_RATE_LIMITED: Counter = Counter::new("portfolio_chat.client.rate_limited");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("portfolio_chat.client.request_duration_seconds");

pub(crate) static SESSION_SUBMITS: Counter = Counter::new("portfolio_chat.session.submits");
pub(crate) static SESSION_SUBMITS_IGNORED: Counter =
    Counter::new("portfolio_chat.session.submits_ignored");
pub(crate) static SESSION_REPLIES: Counter = Counter::new("portfolio_chat.session.replies");
pub(crate) static SESSION_FAILURES: Counter = Counter::new("portfolio_chat.session.failures");
pub(crate) static SESSION_DISCARDED: Counter = Counter::new("portfolio_chat.session.discarded");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_counter(&CLIENT_RATE_LIMITED);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&SESSION_SUBMITS);
    collector.register_counter(&SESSION_SUBMITS_IGNORED);
    collector.register_counter(&SESSION_REPLIES);
    collector.register_counter(&SESSION_FAILURES);
    collector.register_counter(&SESSION_DISCARDED);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_without_panicking() {
        register_biometrics(Collector::new());
    }
}
