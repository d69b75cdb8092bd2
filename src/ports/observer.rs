// SPDX-License-Identifier: MIT OR Apache-2.0

//! Change observation.
//!
//! A registry accepts a single [`ChangeCallback`], invoked after every committed
//! write. For callers that would rather drain events than react inline,
//! [`channel`] builds a callback that forwards each change as a [`ChangeEvent`].

use crate::domain::Value;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};

/// Type alias for change notification callbacks.
///
/// The callback receives the full path of the group, the canonical option name
/// and the new value. It runs synchronously on the writing thread, after the
/// group lock is released, so it may read from the registry. It must not block
/// or panic.
pub type ChangeCallback = Arc<dyn Fn(&str, &str, &Value) + Send + Sync>;

/// A committed write, as delivered by [`channel`].
#[derive(Clone, Debug, PartialEq)]
pub struct ChangeEvent {
    /// The full path of the group
    pub group: String,
    /// The option name
    pub option: String,
    /// The value that was written
    pub value: Value,
}

/// Creates a callback that sends every change to the returned receiver.
///
/// Events are dropped once the receiver is gone.
///
/// # Examples
///
/// ```rust
/// use optreg::domain::{OptionSpec, Value};
/// use optreg::ports::observer;
/// use optreg::service::Registry;
///
/// let registry = Registry::new();
/// registry
///     .register_option("net", OptionSpec::of::<u16>("port").build().unwrap(), false)
///     .unwrap();
///
/// let (callback, events) = observer::channel();
/// registry.observe(callback).unwrap();
/// registry.set_option_value(1, "net", "port", "8080").unwrap();
///
/// let event = events.try_recv().unwrap();
/// assert_eq!(event.group, "net");
/// assert_eq!(event.value, Value::U16(8080));
/// ```
pub fn channel() -> (ChangeCallback, Receiver<ChangeEvent>) {
    let (tx, rx): (Sender<ChangeEvent>, Receiver<ChangeEvent>) = mpsc::channel();
    let tx = Mutex::new(tx);
    let callback: ChangeCallback = Arc::new(move |group: &str, option: &str, value: &Value| {
        let event = ChangeEvent {
            group: group.to_string(),
            option: option.to_string(),
            value: value.clone(),
        };
        let _ = tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .send(event);
    });
    (callback, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_forwards_events() {
        let (callback, rx) = channel();
        callback("db", "host", &Value::from("localhost"));
        callback("db", "port", &Value::I64(5432));

        let events: Vec<ChangeEvent> = rx.try_iter().collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].option, "host");
        assert_eq!(events[1].value, Value::I64(5432));
    }

    #[test]
    fn test_channel_survives_dropped_receiver() {
        let (callback, rx) = channel();
        drop(rx);
        callback("db", "host", &Value::from("x"));
    }
}
