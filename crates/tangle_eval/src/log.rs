//! Leveled log sink shared by the evaluator and the resolver.

use std::rc::Rc;

/// Warnings are always interesting (redeclared exports, parse trouble).
pub const LOG_WARN: u8 = 0;
/// Per-file progress.
pub const LOG_INFO: u8 = 1;
/// Evaluation noise: skipped member accesses, deferred calls.
pub const LOG_DEBUG: u8 = 2;

/// A verbosity-gated message sink. The default logger drops everything; hosts
/// install a callback to capture or print messages.
#[derive(Clone, Default)]
pub struct Logger {
    sink: Option<Rc<dyn Fn(u8, &str)>>,
    verbosity: u8,
}

impl Logger {
    pub fn new(sink: Rc<dyn Fn(u8, &str)>, verbosity: u8) -> Logger {
        Logger {
            sink: Some(sink),
            verbosity,
        }
    }

    /// A logger that writes to stderr with a level tag.
    pub fn stderr(verbosity: u8) -> Logger {
        Logger::new(
            Rc::new(|level, msg| {
                let tag = match level {
                    LOG_WARN => "warning",
                    LOG_INFO => "info",
                    _ => "debug",
                };
                eprintln!("{tag}: {msg}");
            }),
            verbosity,
        )
    }

    pub fn verbosity(&self) -> u8 {
        self.verbosity
    }

    pub fn log(&self, level: u8, msg: &str) {
        if level <= self.verbosity {
            if let Some(sink) = &self.sink {
                sink(level, msg);
            }
        }
    }

    pub fn warn(&self, msg: &str) {
        self.log(LOG_WARN, msg);
    }

    pub fn info(&self, msg: &str) {
        self.log(LOG_INFO, msg);
    }

    pub fn debug(&self, msg: &str) {
        self.log(LOG_DEBUG, msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn verbosity_gates_messages() {
        let seen: Rc<RefCell<Vec<(u8, String)>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let log = Logger::new(Rc::new(move |lvl, msg| sink.borrow_mut().push((lvl, msg.to_string()))), LOG_INFO);
        log.warn("a");
        log.info("b");
        log.debug("c");
        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], (LOG_WARN, "a".to_string()));
        assert_eq!(seen[1], (LOG_INFO, "b".to_string()));
    }

    #[test]
    fn default_logger_is_silent() {
        Logger::default().warn("dropped");
    }
}
