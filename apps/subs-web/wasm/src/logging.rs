//! Forward `tracing` events to the browser console
//!
//! A single `ConsoleLayer` is installed on a registry the first time
//! `init` runs. The maximum level lives in an atomic so a later
//! configuration can raise or lower it without reinstalling anything.

use std::fmt::{self, Write};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Once;

use tracing::field::{Field, Visit};
use tracing::subscriber::Interest;
use tracing::{Event, Level, Metadata, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::registry::Registry;

static INSTALL: Once = Once::new();
static MAX_LEVEL: AtomicU8 = AtomicU8::new(3);

fn level_rank(level: &Level) -> u8 {
    if *level == Level::ERROR {
        1
    } else if *level == Level::WARN {
        2
    } else if *level == Level::INFO {
        3
    } else if *level == Level::DEBUG {
        4
    } else {
        5
    }
}

/// Install the console subscriber (once) and set the maximum level
pub fn init(level: Level) {
    MAX_LEVEL.store(level_rank(&level), Ordering::Relaxed);
    INSTALL.call_once(|| {
        let subscriber = Registry::default().with(ConsoleLayer);
        // an already installed subscriber is left in place
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

pub struct ConsoleLayer;

impl<S: Subscriber> Layer<S> for ConsoleLayer {
    fn register_callsite(&self, _metadata: &'static Metadata<'static>) -> Interest {
        // level changes at runtime
        Interest::sometimes()
    }

    fn enabled(&self, metadata: &Metadata<'_>, _ctx: Context<'_, S>) -> bool {
        level_rank(metadata.level()) <= MAX_LEVEL.load(Ordering::Relaxed)
    }

    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = ConsoleVisitor::default();
        event.record(&mut visitor);
        let line = format_line(
            event.metadata().level(),
            event.metadata().target(),
            &visitor.message,
            &visitor.fields,
        );
        emit(event.metadata().level(), &line);
    }
}

#[derive(Default)]
struct ConsoleVisitor {
    message: String,
    fields: String,
}

impl Visit for ConsoleVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

fn format_line(level: &Level, target: &str, message: &str, fields: &str) -> String {
    format!("[{}] {}: {}{}", level, target, message, fields)
}

#[cfg(target_arch = "wasm32")]
fn emit(level: &Level, line: &str) {
    let value = wasm_bindgen::JsValue::from_str(line);
    match level_rank(level) {
        1 => web_sys::console::error_1(&value),
        2 => web_sys::console::warn_1(&value),
        3 => web_sys::console::info_1(&value),
        4 => web_sys::console::log_1(&value),
        _ => web_sys::console::debug_1(&value),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn emit(_level: &Level, line: &str) {
    eprintln!("{}", line);
}
