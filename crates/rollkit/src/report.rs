//! Reporter trait for user-facing orchestration output.
//!
//! Procedures and drivers never print directly. They describe what happened
//! to a [`Reporter`], which the CLI renders on the console and tests record.

use crate::types::Service;
use std::sync::Mutex;
use std::time::Duration;

/// Receives orchestration events as they happen.
pub trait Reporter: Send + Sync {
    /// A command finished; `lines` is everything it printed.
    fn on_output(&self, title: &str, host: &str, lines: &[String]);

    /// A service was confirmed stopped on a host.
    fn on_stopped(&self, service: Service, host: &str);

    /// A progress line arrived from a long-running command.
    fn on_progress(&self, host: &str, line: &str);

    /// A multi-step procedure moved on.
    fn on_step(&self, message: &str);

    /// A procedure had not finished when a best-effort deadline elapsed.
    fn on_undone(&self, description: &str);

    /// A rolling task is starting.
    fn on_task(&self, description: &str);

    /// The sequencer is pausing before the next task.
    fn on_pacing(&self, delay: Duration, next: &str);
}

/// Reporter that discards everything.
pub struct NoReporter;

impl Reporter for NoReporter {
    fn on_output(&self, _title: &str, _host: &str, _lines: &[String]) {}
    fn on_stopped(&self, _service: Service, _host: &str) {}
    fn on_progress(&self, _host: &str, _line: &str) {}
    fn on_step(&self, _message: &str) {}
    fn on_undone(&self, _description: &str) {}
    fn on_task(&self, _description: &str) {}
    fn on_pacing(&self, _delay: Duration, _next: &str) {}
}

/// A recorded reporter event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Output {
        title: String,
        host: String,
        lines: Vec<String>,
    },
    Stopped {
        service: Service,
        host: String,
    },
    Progress {
        host: String,
        line: String,
    },
    Step(String),
    Undone(String),
    Task(String),
    Pacing {
        delay: Duration,
        next: String,
    },
}

/// Reporter that keeps every event, for assertions in tests.
#[derive(Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<Event>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events so far, in order.
    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Descriptions reported as undone.
    pub fn undone(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Undone(description) => Some(description),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: Event) {
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(event);
    }
}

impl Reporter for RecordingReporter {
    fn on_output(&self, title: &str, host: &str, lines: &[String]) {
        self.push(Event::Output {
            title: title.to_string(),
            host: host.to_string(),
            lines: lines.to_vec(),
        });
    }

    fn on_stopped(&self, service: Service, host: &str) {
        self.push(Event::Stopped {
            service,
            host: host.to_string(),
        });
    }

    fn on_progress(&self, host: &str, line: &str) {
        self.push(Event::Progress {
            host: host.to_string(),
            line: line.to_string(),
        });
    }

    fn on_step(&self, message: &str) {
        self.push(Event::Step(message.to_string()));
    }

    fn on_undone(&self, description: &str) {
        self.push(Event::Undone(description.to_string()));
    }

    fn on_task(&self, description: &str) {
        self.push(Event::Task(description.to_string()));
    }

    fn on_pacing(&self, delay: Duration, next: &str) {
        self.push(Event::Pacing {
            delay,
            next: next.to_string(),
        });
    }
}
