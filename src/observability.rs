use biometrics::{Collector, Counter, Moments};

pub(crate) static SHELL_LINES: Counter = Counter::new("simplechat.shell.lines");
pub(crate) static SHELL_COMMANDS: Counter = Counter::new("simplechat.shell.commands");
pub(crate) static SHELL_ERRORS: Counter = Counter::new("simplechat.shell.errors");

pub(crate) static CHAT_REQUESTS: Counter = Counter::new("simplechat.chat.requests");
pub(crate) static CHAT_ERRORS: Counter = Counter::new("simplechat.chat.errors");
pub(crate) static CHAT_DURATION: Moments = Moments::new("simplechat.chat.duration_seconds");

pub(crate) static CLIPBOARD_OPERATIONS: Counter =
    Counter::new("simplechat.clipboard.operations");

pub(crate) static STORE_MIGRATIONS: Counter = Counter::new("simplechat.store.migrations");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&SHELL_LINES);
    collector.register_counter(&SHELL_COMMANDS);
    collector.register_counter(&SHELL_ERRORS);

    collector.register_counter(&CHAT_REQUESTS);
    collector.register_counter(&CHAT_ERRORS);
    collector.register_moments(&CHAT_DURATION);

    collector.register_counter(&CLIPBOARD_OPERATIONS);

    collector.register_counter(&STORE_MIGRATIONS);
}
