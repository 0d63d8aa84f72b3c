use std::fmt;
use std::io::IsTerminal;
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::{format::Writer, FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// ANSI color codes for console output
const COLOR_RESET: &str = "\x1b[0m";
const COLOR_CYAN: &str = "\x1b[36m";
const COLOR_GREEN: &str = "\x1b[32m";
const COLOR_BRIGHT_YELLOW: &str = "\x1b[93m";
const COLOR_BRIGHT_RED: &str = "\x1b[91m";
const COLOR_BRIGHT_GRAY: &str = "\x1b[90m";

/// Column widths for alignment
const COMPONENT_WIDTH: usize = 22;
const LOG_LEVEL_WIDTH: usize = 7;

/// Timestamped, colored, component-tagged log lines:
///
/// `[2024-05-01 12:00:00.000] [synchrobike-node      ] [ℹ INFO   ] message`
pub struct SynchroLogFormatter {
    service_name: String,
    color_enabled: bool,
}

/// Log with an explicit `component` field at info level
#[macro_export]
macro_rules! component_info {
    ($component:expr, $($arg:tt)*) => {
        tracing::info!(component = $component, $($arg)*)
    };
}

/// Log with an explicit `component` field at warn level
#[macro_export]
macro_rules! component_warn {
    ($component:expr, $($arg:tt)*) => {
        tracing::warn!(component = $component, $($arg)*)
    };
}

/// Log with an explicit `component` field at debug level
#[macro_export]
macro_rules! component_debug {
    ($component:expr, $($arg:tt)*) => {
        tracing::debug!(component = $component, $($arg)*)
    };
}

/// Log with an explicit `component` field at error level
#[macro_export]
macro_rules! component_error {
    ($component:expr, $($arg:tt)*) => {
        tracing::error!(component = $component, $($arg)*)
    };
}

impl SynchroLogFormatter {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            color_enabled: std::io::stderr().is_terminal(),
        }
    }

    /// Component label: the explicit `component` field, else the crate the
    /// event came from (`synchro_node::policy` becomes `node`)
    fn format_component(&self, component: Option<&str>, target: &str) -> String {
        let name = match component {
            Some(comp) => format!("{}-{}", self.service_name, comp),
            None => match target
                .split("::")
                .next()
                .and_then(|krate| krate.strip_prefix("synchro_"))
            {
                Some(krate) => format!("{}-{}", self.service_name, krate),
                None => self.service_name.clone(),
            },
        };

        if name.chars().count() > COMPONENT_WIDTH {
            let truncated: String = name.chars().take(COMPONENT_WIDTH - 1).collect();
            format!("{}…", truncated)
        } else {
            format!("{:<width$}", name, width = COMPONENT_WIDTH)
        }
    }

    fn format_log_level(&self, level: &tracing::Level) -> String {
        let level_str = match *level {
            tracing::Level::ERROR => "✗ ERROR",
            tracing::Level::WARN => "⚠ WARN",
            tracing::Level::INFO => "ℹ INFO",
            tracing::Level::DEBUG => "◦ DEBUG",
            tracing::Level::TRACE => "◦ TRACE",
        };

        format!("{:<width$}", level_str, width = LOG_LEVEL_WIDTH + 2)
    }

    fn get_color_for_level(&self, level: &tracing::Level) -> &'static str {
        if !self.color_enabled {
            return "";
        }

        match *level {
            tracing::Level::ERROR => COLOR_BRIGHT_RED,
            tracing::Level::WARN => COLOR_BRIGHT_YELLOW,
            tracing::Level::INFO => COLOR_GREEN,
            tracing::Level::DEBUG => COLOR_BRIGHT_GRAY,
            tracing::Level::TRACE => COLOR_BRIGHT_GRAY,
        }
    }
}

impl<S, N> FormatEvent<S, N> for SynchroLogFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let metadata = event.metadata();
        let level = metadata.level();

        let mut visitor = FieldVisitor::new();
        event.record(&mut visitor);

        let component = self.format_component(visitor.component.as_deref(), metadata.target());
        let formatted_level = self.format_log_level(level);

        let color = self.get_color_for_level(level);
        let reset_color = if self.color_enabled { COLOR_RESET } else { "" };
        let cyan_color = if self.color_enabled { COLOR_CYAN } else { "" };

        write!(
            writer,
            "{}[{}] [{}] [{}{}{}] ",
            cyan_color, timestamp, component, color, formatted_level, reset_color
        )?;

        writeln!(writer, "{}{}", visitor.message, reset_color)
    }
}

/// Visitor to extract the message and component fields from an event
struct FieldVisitor {
    message: String,
    component: Option<String>,
}

impl FieldVisitor {
    fn new() -> Self {
        Self {
            message: String::new(),
            component: None,
        }
    }
}

fn unquote(value: String) -> String {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        value[1..value.len() - 1].to_string()
    } else {
        value
    }
}

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        match field.name() {
            "message" => self.message = unquote(format!("{:?}", value)),
            "component" => self.component = Some(unquote(format!("{:?}", value))),
            _ => {}
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        match field.name() {
            "message" => self.message = value.to_string(),
            "component" => self.component = Some(value.to_string()),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> SynchroLogFormatter {
        SynchroLogFormatter {
            service_name: "synchrobike".to_string(),
            color_enabled: false,
        }
    }

    #[test]
    fn test_component_from_field_or_target() {
        let formatter = plain();
        assert_eq!(
            formatter.format_component(Some("mesh"), "synchrobike").trim_end(),
            "synchrobike-mesh"
        );
        assert_eq!(
            formatter.format_component(None, "synchro_node::policy").trim_end(),
            "synchrobike-node"
        );
        assert_eq!(
            formatter.format_component(None, "tokio::net").trim_end(),
            "synchrobike"
        );
    }

    #[test]
    fn test_component_width() {
        let formatter = plain();
        assert_eq!(formatter.format_component(None, "x").chars().count(), COMPONENT_WIDTH);
        let long = formatter.format_component(Some("transport-adapter"), "x");
        assert_eq!(long.chars().count(), COMPONENT_WIDTH);
        assert!(long.ends_with('…'));
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("\"hello\"".to_string()), "hello");
        assert_eq!(unquote("42".to_string()), "42");
    }

    #[test]
    fn test_no_color_when_disabled() {
        assert_eq!(plain().get_color_for_level(&tracing::Level::WARN), "");
    }
}
