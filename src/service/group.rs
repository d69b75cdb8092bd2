// SPDX-License-Identifier: MIT OR Apache-2.0

//! Option groups.
//!
//! A [`Group`] owns the options registered under one path of the namespace
//! together with their runtime state: the current value and the priority of the
//! write that set it. Every group guards its options with its own lock, so
//! writers touching different groups never contend.

use crate::domain::{FromValue, OptionSpec, RegistryError, Result, Value};
use crate::ports::ChangeCallback;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError, RwLock};
use std::time::Duration;

// Orders observer notifications for one option.
#[derive(Debug, Default)]
struct Delivery {
    // sequence number of the latest committed write
    committed: AtomicU64,
    lock: Mutex<()>,
}

#[derive(Debug)]
struct OptionSlot {
    spec: OptionSpec,
    cli: bool,
    current: Option<Value>,
    priority: i32,
    delivery: Arc<Delivery>,
}

impl OptionSlot {
    fn resolved(&self) -> Option<&Value> {
        self.current.as_ref().or(self.spec.default())
    }
}

#[derive(Debug, Default)]
struct GroupState {
    slots: Vec<OptionSlot>,
    // name and short alias -> slot position
    index: HashMap<String, usize>,
}

impl GroupState {
    fn slot(&self, name: &str) -> Option<&OptionSlot> {
        self.index.get(name).map(|&i| &self.slots[i])
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (i, slot) in self.slots.iter().enumerate() {
            self.index.insert(slot.spec.name().to_string(), i);
            if let Some(short) = slot.spec.short() {
                self.index.insert(short.to_string(), i);
            }
        }
    }
}

/// A namespace of options located at a separator-joined path.
///
/// Groups are created through [`Registry::register_group`](crate::service::Registry::register_group)
/// or implicitly by registering an option. Values are written with
/// [`Group::set_option_value`] and read with the typed accessors.
///
/// # Examples
///
/// ```rust
/// use optreg::domain::OptionSpec;
/// use optreg::service::Registry;
///
/// let registry = Registry::new();
/// let group = registry.register_group("server.http").unwrap();
/// registry
///     .register_option("server.http", OptionSpec::of::<u16>("port").default_value(80u16).build().unwrap(), true)
///     .unwrap();
///
/// assert_eq!(group.name(), "http");
/// assert_eq!(group.full_path(), "server.http");
/// assert_eq!(group.get_u16("port").unwrap(), 80);
///
/// group.set_option_value(10, "port", "8080").unwrap();
/// assert_eq!(group.get::<u16>("port").unwrap(), 8080);
/// ```
pub struct Group {
    name: String,
    full_path: String,
    state: RwLock<GroupState>,
    observer: Arc<OnceLock<ChangeCallback>>,
}

impl Group {
    pub(crate) fn new(
        name: impl Into<String>,
        full_path: impl Into<String>,
        observer: Arc<OnceLock<ChangeCallback>>,
    ) -> Self {
        Self {
            name: name.into(),
            full_path: full_path.into(),
            state: RwLock::new(GroupState::default()),
            observer,
        }
    }

    /// Returns the last segment of the group's path.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the full separator-joined path of the group.
    pub fn full_path(&self) -> &str {
        &self.full_path
    }

    /// Adds an option to the group.
    ///
    /// An option whose name or short alias is already taken fails with
    /// `DuplicateOption`, unless `replace` is set, in which case every
    /// conflicting option is dropped and the new one takes the place of the first.
    /// Returns whether an existing option was replaced.
    pub(crate) fn register_option(&self, spec: OptionSpec, cli: bool, replace: bool) -> Result<bool> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        let mut conflicts: Vec<usize> = std::iter::once(spec.name())
            .chain(spec.short())
            .filter_map(|key| state.index.get(key).copied())
            .collect();
        conflicts.sort_unstable();
        conflicts.dedup();

        let slot = OptionSlot {
            spec,
            cli,
            current: None,
            priority: 0,
            delivery: Arc::default(),
        };

        let Some(&first) = conflicts.first() else {
            state.slots.push(slot);
            state.reindex();
            return Ok(false);
        };

        if !replace {
            return Err(RegistryError::DuplicateOption {
                group: self.full_path.clone(),
                option: slot.spec.name().to_string(),
            });
        }

        for &i in conflicts.iter().skip(1).rev() {
            state.slots.remove(i);
        }
        state.slots[first] = slot;
        state.reindex();
        Ok(true)
    }

    /// Writes a value, subject to the priority rule.
    ///
    /// The write is applied when `priority` is `0` or at least the priority of
    /// the write that last set the option; otherwise it is silently ignored. Text
    /// is converted with the option's declared type and other values are coerced
    /// losslessly, so a rejected value fails regardless of priority. The change
    /// observer, if any, is notified once the group lock is released.
    ///
    /// Notifications for the same option are serialized: when writers race, the
    /// write that won last is notified last, and a write already overtaken by a
    /// newer one when its turn comes is not notified at all. An observer must
    /// therefore not write to the option it is being notified about.
    ///
    /// # Errors
    ///
    /// - `NegativePriority` if `priority` is negative
    /// - `OptionNotFound` if no option has this name or short alias
    /// - `InvalidValue` if the value does not fit the option's type
    pub fn set_option_value(&self, priority: i32, name: &str, value: impl Into<Value>) -> Result<()> {
        if priority < 0 {
            return Err(RegistryError::NegativePriority { priority });
        }

        let (option, value, seq, delivery) = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            let i = *state
                .index
                .get(name)
                .ok_or_else(|| RegistryError::OptionNotFound {
                    group: self.full_path.clone(),
                    option: name.to_string(),
                })?;
            let slot = &mut state.slots[i];
            let value = slot
                .spec
                .coerce(value.into())
                .map_err(|e| e.for_option(&self.full_path, slot.spec.name()))?;

            if priority != 0 && priority < slot.priority {
                tracing::trace!(
                    group = %self.full_path,
                    option = slot.spec.name(),
                    priority,
                    current_priority = slot.priority,
                    "Ignoring lower-priority write"
                );
                return Ok(());
            }

            slot.current = Some(value.clone());
            slot.priority = priority;
            let seq = slot.delivery.committed.fetch_add(1, Ordering::SeqCst) + 1;
            (
                slot.spec.name().to_string(),
                value,
                seq,
                Arc::clone(&slot.delivery),
            )
        };

        tracing::trace!(group = %self.full_path, option = %option, priority, value = %value, "Option set");

        if let Some(observer) = self.observer.get() {
            let _turn = delivery.lock.lock().unwrap_or_else(PoisonError::into_inner);
            if delivery.committed.load(Ordering::SeqCst) != seq {
                tracing::trace!(group = %self.full_path, option = %option, "Skipping overtaken notification");
                return Ok(());
            }
            observer(&self.full_path, &option, &value);
        }
        Ok(())
    }

    /// Verifies that every required option has a value or a default.
    ///
    /// With `strict`, every option is treated as required.
    pub fn check_required(&self, strict: bool) -> Result<()> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        match state
            .slots
            .iter()
            .find(|slot| (strict || slot.spec.is_required()) && slot.resolved().is_none())
        {
            Some(slot) => Err(RegistryError::MissingRequiredOption {
                group: self.full_path.clone(),
                option: slot.spec.name().to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Gives every optional option without value or default its zero value.
    ///
    /// The slot keeps priority 0, so any later write replaces it. A zero value
    /// counts as a value for the required check. Returns the number of options
    /// filled.
    pub(crate) fn fill_zero_values(&self) -> usize {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let mut filled = 0;
        for slot in state
            .slots
            .iter_mut()
            .filter(|slot| !slot.spec.is_required() && slot.resolved().is_none())
        {
            slot.current = Some(slot.spec.value_type().zero_value());
            slot.priority = 0;
            filled += 1;
        }
        filled
    }

    /// Returns the definitions of all options, in registration order.
    pub fn options(&self) -> Vec<OptionSpec> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.slots.iter().map(|slot| slot.spec.clone()).collect()
    }

    /// Returns the definitions of the options exposed to command-line parsers.
    pub fn cli_options(&self) -> Vec<OptionSpec> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state
            .slots
            .iter()
            .filter(|slot| slot.cli)
            .map(|slot| slot.spec.clone())
            .collect()
    }

    /// Reports whether the group has any option.
    pub fn is_empty(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .slots
            .is_empty()
    }

    /// Reports whether an option with this name or short alias exists.
    pub fn has_option(&self, name: &str) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .index
            .contains_key(name)
    }

    /// Returns the definition of an option by name or short alias.
    pub fn option(&self, name: &str) -> Option<OptionSpec> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.slot(name).map(|slot| slot.spec.clone())
    }

    /// Returns the current value of an option, falling back to its default.
    pub fn value(&self, name: &str) -> Option<Value> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.slot(name).and_then(OptionSlot::resolved).cloned()
    }

    /// Reports whether an option has been written.
    ///
    /// A default alone does not count.
    pub fn is_set(&self, name: &str) -> bool {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.slot(name).is_some_and(|slot| slot.current.is_some())
    }

    /// Returns every option that has a value or a default, in registration order.
    pub fn values(&self) -> Vec<(String, Value)> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state
            .slots
            .iter()
            .filter_map(|slot| {
                slot.resolved()
                    .map(|value| (slot.spec.name().to_string(), value.clone()))
            })
            .collect()
    }

    /// Reads an option as `T`.
    ///
    /// The stored value (or the default) is coerced losslessly to `T`.
    ///
    /// # Errors
    ///
    /// - `OptionNotFound` if no option has this name or short alias
    /// - `OptionUnset` if the option has neither value nor default
    /// - `InvalidValue` if the value cannot be represented as `T`
    pub fn get<T: FromValue>(&self, name: &str) -> Result<T> {
        let (option, value) = {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            let slot = state
                .slot(name)
                .ok_or_else(|| RegistryError::OptionNotFound {
                    group: self.full_path.clone(),
                    option: name.to_string(),
                })?;
            let value = slot
                .resolved()
                .cloned()
                .ok_or_else(|| RegistryError::OptionUnset {
                    group: self.full_path.clone(),
                    option: slot.spec.name().to_string(),
                })?;
            (slot.spec.name().to_string(), value)
        };
        T::from_value(&value).map_err(|e| e.for_option(&self.full_path, &option))
    }

    /// Reads an option as `T`, returning `default` if it cannot be read.
    pub fn get_or<T: FromValue>(&self, name: &str, default: T) -> T {
        self.get(name).unwrap_or(default)
    }

    /// Reads an option as `T`.
    ///
    /// # Panics
    ///
    /// Panics if [`Group::get`] fails.
    pub fn must_get<T: FromValue>(&self, name: &str) -> T {
        match self.get(name) {
            Ok(value) => value,
            Err(e) => panic!("{}", e),
        }
    }
}

impl std::fmt::Debug for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("Group")
            .field("full_path", &self.full_path)
            .field("options", &state.slots)
            .finish()
    }
}

macro_rules! typed_accessors {
    ($($ty:ty => $get:ident, $get_or:ident, $must:ident;)*) => {
        impl Group {
            $(
                #[doc = concat!("Reads an option as `", stringify!($ty), "`. See [`Group::get`].")]
                pub fn $get(&self, name: &str) -> Result<$ty> {
                    self.get(name)
                }

                #[doc = concat!("Reads an option as `", stringify!($ty), "`, or returns `default`.")]
                pub fn $get_or(&self, name: &str, default: $ty) -> $ty {
                    self.get_or(name, default)
                }

                #[doc = concat!("Reads an option as `", stringify!($ty), "`, panicking on failure.")]
                pub fn $must(&self, name: &str) -> $ty {
                    self.must_get(name)
                }
            )*
        }
    };
}

typed_accessors! {
    bool => get_bool, get_bool_or, must_bool;
    String => get_string, get_string_or, must_string;
    i8 => get_i8, get_i8_or, must_i8;
    i16 => get_i16, get_i16_or, must_i16;
    i32 => get_i32, get_i32_or, must_i32;
    i64 => get_i64, get_i64_or, must_i64;
    u8 => get_u8, get_u8_or, must_u8;
    u16 => get_u16, get_u16_or, must_u16;
    u32 => get_u32, get_u32_or, must_u32;
    u64 => get_u64, get_u64_or, must_u64;
    f32 => get_f32, get_f32_or, must_f32;
    f64 => get_f64, get_f64_or, must_f64;
    Duration => get_duration, get_duration_or, must_duration;
    DateTime<Utc> => get_timestamp, get_timestamp_or, must_timestamp;
    Vec<bool> => get_bools, get_bools_or, must_bools;
    Vec<String> => get_strings, get_strings_or, must_strings;
    Vec<i8> => get_i8s, get_i8s_or, must_i8s;
    Vec<i16> => get_i16s, get_i16s_or, must_i16s;
    Vec<i32> => get_i32s, get_i32s_or, must_i32s;
    Vec<i64> => get_i64s, get_i64s_or, must_i64s;
    Vec<u8> => get_u8s, get_u8s_or, must_u8s;
    Vec<u16> => get_u16s, get_u16s_or, must_u16s;
    Vec<u32> => get_u32s, get_u32s_or, must_u32s;
    Vec<u64> => get_u64s, get_u64s_or, must_u64s;
    Vec<f32> => get_f32s, get_f32s_or, must_f32s;
    Vec<f64> => get_f64s, get_f64s_or, must_f64s;
    Vec<Duration> => get_durations, get_durations_or, must_durations;
    Vec<DateTime<Utc>> => get_timestamps, get_timestamps_or, must_timestamps;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn group() -> Group {
        Group::new("db", "app.db", Arc::new(OnceLock::new()))
    }

    fn port() -> OptionSpec {
        OptionSpec::of::<i64>("port")
            .short("p")
            .default_value(8080)
            .build()
            .unwrap()
    }

    #[test]
    fn test_register_and_lookup() {
        let group = group();
        assert!(group.is_empty());
        assert!(!group.register_option(port(), true, false).unwrap());

        assert!(group.has_option("port"));
        assert!(group.has_option("p"));
        assert_eq!(group.option("p").unwrap().name(), "port");
        assert_eq!(group.options().len(), 1);
        assert_eq!(group.cli_options().len(), 1);
        assert_eq!(group.value("port"), Some(Value::I64(8080)));
        assert!(!group.is_set("port"));
    }

    #[test]
    fn test_duplicate_name_and_short() {
        let group = group();
        group.register_option(port(), false, false).unwrap();

        let err = group.register_option(port(), false, false).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateOption { .. }));

        let same_short = OptionSpec::of::<bool>("pretty").short("p").build().unwrap();
        assert!(group.register_option(same_short, false, false).is_err());
    }

    #[test]
    fn test_replace_drops_old_alias() {
        let group = group();
        group.register_option(port(), false, false).unwrap();

        let replacement = OptionSpec::of::<String>("port").build().unwrap();
        assert!(group.register_option(replacement, true, true).unwrap());

        assert!(!group.has_option("p"));
        assert_eq!(group.options().len(), 1);
        assert_eq!(group.value("port"), None);
        assert_eq!(group.cli_options().len(), 1);
    }

    #[test]
    fn test_replace_merges_conflicting_options() {
        let group = group();
        group.register_option(port(), false, false).unwrap();
        let host = OptionSpec::of::<String>("host").short("H").build().unwrap();
        group.register_option(host, false, false).unwrap();

        let merged = OptionSpec::of::<String>("port").short("H").build().unwrap();
        group.register_option(merged, false, true).unwrap();

        assert_eq!(group.options().len(), 1);
        assert!(!group.has_option("host"));
        assert_eq!(group.option("H").unwrap().name(), "port");
    }

    #[test]
    fn test_priority_rule() {
        let group = group();
        group.register_option(port(), false, false).unwrap();

        group.set_option_value(10, "port", 9090i64).unwrap();
        group.set_option_value(5, "port", 9000i64).unwrap();
        assert_eq!(group.get_i64("port").unwrap(), 9090);

        group.set_option_value(10, "port", 9091i64).unwrap();
        assert_eq!(group.get_i64("port").unwrap(), 9091);

        group.set_option_value(0, "port", 9999i64).unwrap();
        assert_eq!(group.get_i64("port").unwrap(), 9999);
        assert!(group.is_set("port"));
    }

    #[test]
    fn test_write_through_short_alias() {
        let group = group();
        group.register_option(port(), false, false).unwrap();
        group.set_option_value(1, "p", "7000").unwrap();
        assert_eq!(group.get::<i64>("port").unwrap(), 7000);
    }

    #[test]
    fn test_rejected_writes() {
        let group = group();
        group.register_option(port(), false, false).unwrap();

        let err = group.set_option_value(-1, "port", 1i64).unwrap_err();
        assert!(matches!(err, RegistryError::NegativePriority { priority: -1 }));

        let err = group.set_option_value(1, "missing", 1i64).unwrap_err();
        assert!(matches!(err, RegistryError::OptionNotFound { .. }));

        let err = group.set_option_value(1, "port", "eighty").unwrap_err();
        assert!(matches!(err, RegistryError::InvalidValue { .. }));

        // a bad value fails even when its priority would lose
        group.set_option_value(50, "port", 1i64).unwrap();
        assert!(group.set_option_value(1, "port", true).is_err());
    }

    #[test]
    fn test_observer_receives_canonical_name() {
        let observer: Arc<OnceLock<ChangeCallback>> = Arc::new(OnceLock::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callback: ChangeCallback = Arc::new(move |group: &str, option: &str, value: &Value| {
            sink.lock()
                .unwrap()
                .push(format!("{}/{}={}", group, option, value));
        });
        assert!(observer.set(callback).is_ok());

        let group = Group::new("db", "app.db", observer);
        group.register_option(port(), false, false).unwrap();
        group.set_option_value(3, "p", 1234i64).unwrap();
        group.set_option_value(2, "port", 1i64).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["app.db/port=1234".to_string()]);
    }

    #[test]
    fn test_zero_values_satisfy_strict_check() {
        let group = group();
        let name = OptionSpec::of::<String>("name").build().unwrap();
        group.register_option(name, false, false).unwrap();

        assert!(group.check_required(true).is_err());
        assert_eq!(group.fill_zero_values(), 1);
        assert!(group.check_required(true).is_ok());
    }

    #[test]
    fn test_check_required() {
        let group = group();
        let token = OptionSpec::of::<String>("token").required(true).build().unwrap();
        group.register_option(token, false, false).unwrap();
        group.register_option(port(), false, false).unwrap();

        let err = group.check_required(false).unwrap_err();
        assert!(err.to_string().contains("token"));

        group.set_option_value(0, "token", "secret").unwrap();
        assert!(group.check_required(false).is_ok());
    }

    #[test]
    fn test_check_required_strict() {
        let group = group();
        let name = OptionSpec::of::<String>("name").build().unwrap();
        group.register_option(name, false, false).unwrap();
        group.register_option(port(), false, false).unwrap();

        assert!(group.check_required(false).is_ok());
        let err = group.check_required(true).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::MissingRequiredOption { ref option, .. } if option == "name"
        ));
    }

    #[test]
    fn test_fill_zero_values() {
        let group = group();
        let name = OptionSpec::of::<String>("name").build().unwrap();
        let hosts = OptionSpec::of::<Vec<String>>("hosts").build().unwrap();
        let token = OptionSpec::of::<String>("token").required(true).build().unwrap();
        for spec in [name, hosts, token, port()] {
            group.register_option(spec, false, false).unwrap();
        }

        assert_eq!(group.fill_zero_values(), 2);
        assert_eq!(group.get_string("name").unwrap(), "");
        assert!(group.get_strings("hosts").unwrap().is_empty());
        assert_eq!(group.get_i64("port").unwrap(), 8080);
        assert!(group.value("token").is_none());

        // zero values lose against any later write
        group.set_option_value(1, "name", "svc").unwrap();
        assert_eq!(group.get_string("name").unwrap(), "svc");
    }

    #[test]
    fn test_typed_reads() {
        let group = group();
        group.register_option(port(), false, false).unwrap();
        let small = OptionSpec::of::<u8>("level").build().unwrap();
        group.register_option(small, false, false).unwrap();

        assert_eq!(group.get::<u32>("port").unwrap(), 8080);
        assert!(group.get::<u8>("port").is_err());
        assert!(group.get::<bool>("port").is_err());
        assert_eq!(group.get_string("port").unwrap(), "8080");

        assert!(matches!(
            group.get::<u8>("level"),
            Err(RegistryError::OptionUnset { .. })
        ));
        assert_eq!(group.get_u8_or("level", 3), 3);
        assert_eq!(group.get_or("missing", 5i32), 5);
    }

    #[test]
    #[should_panic(expected = "no option 'missing'")]
    fn test_must_get_panics() {
        let group = group();
        let _: i64 = group.must_get("missing");
    }

    #[test]
    fn test_values_snapshot() {
        let group = group();
        group.register_option(port(), false, false).unwrap();
        let name = OptionSpec::of::<String>("name").build().unwrap();
        group.register_option(name, false, false).unwrap();

        assert_eq!(
            group.values(),
            vec![("port".to_string(), Value::I64(8080))]
        );
    }
}
