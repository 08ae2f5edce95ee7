use serde_json::Value;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

use crate::fields::Fields;
use crate::global;
use crate::kverrors::KvError;
use crate::logger::Logger;

/// `tracing_subscriber` layer that turns `tracing` events into records on
/// a [`Logger`].
///
/// ERROR, WARN and INFO map to verbosity 0, DEBUG to 1 and TRACE to 2. An
/// ERROR event with an `error` field is logged through the error path.
pub struct SinkLayer {
    target: Target,
    max_level: Level,
    include_target: bool,
}

enum Target {
    Fixed(Logger),
    /// Resolve the process-wide logger at every event.
    Global,
}

impl SinkLayer {
    /// Forward events to `logger`.
    pub fn new(logger: Logger) -> Self {
        SinkLayer {
            target: Target::Fixed(logger),
            max_level: Level::TRACE,
            include_target: true,
        }
    }

    /// Forward events to whatever logger [`global`] holds when the event
    /// fires, so later [`global::init`] calls take effect.
    pub fn global() -> Self {
        SinkLayer {
            target: Target::Global,
            max_level: Level::TRACE,
            include_target: true,
        }
    }

    /// Drop events more verbose than `level`.
    pub fn with_max_level(mut self, level: Level) -> Self {
        self.max_level = level;
        self
    }

    /// Whether to attach the event target as a `target` field.
    pub fn with_target(mut self, include: bool) -> Self {
        self.include_target = include;
        self
    }
}

/// Verbosity used for events at `level`.
pub fn verbosity_for(level: &Level) -> u32 {
    match *level {
        Level::ERROR | Level::WARN | Level::INFO => 0,
        Level::DEBUG => 1,
        _ => 2,
    }
}

impl<S> Layer<S> for SinkLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if *meta.level() > self.max_level {
            return;
        }

        let mut fields = Fields::new();
        let mut message: Option<String> = None;
        let mut error: Option<String> = None;
        let mut visitor = FieldVisitor {
            fields: &mut fields,
            message: &mut message,
            error: &mut error,
        };
        event.record(&mut visitor);

        if self.include_target {
            fields.push("target", meta.target());
        }
        let message = message.unwrap_or_default();

        let global_logger;
        let logger = match &self.target {
            Target::Fixed(logger) => logger,
            Target::Global => {
                global_logger = global::logger();
                &global_logger
            }
        };

        match error {
            Some(err) if *meta.level() == Level::ERROR => {
                logger.error(&KvError::new(err), &message, fields);
            }
            err => {
                if let Some(err) = err {
                    fields.push("error", err);
                }
                logger.v(verbosity_for(meta.level())).info(&message, fields);
            }
        }
    }
}

/// Collects event fields in the order `tracing` reports them.
pub struct FieldVisitor<'a> {
    pub fields: &'a mut Fields,
    pub message: &'a mut Option<String>,
    pub error: &'a mut Option<String>,
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => *self.message = Some(value.to_string()),
            "error" => *self.error = Some(value.to_string()),
            name => self.fields.push(name, value),
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.push(field.name(), value);
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.push(field.name(), value);
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.fields.push(field.name(), value);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.push(field.name(), value);
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        if field.name() == "error" {
            *self.error = Some(value.to_string());
        } else {
            self.fields.push(field.name(), value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let rendered = format!("{:?}", value);
        match field.name() {
            "message" => *self.message = Some(rendered),
            "error" => *self.error = Some(rendered),
            name => self.fields.push(name, Value::String(rendered)),
        }
    }
}
