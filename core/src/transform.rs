//! Value transforms applied to supplied option values.
//!
//! A [`Transform`] is the single function-value form every transform
//! collapses to. Named transforms (for manifests) live in a
//! [`TransformRegistry`], where a registered function may also receive extra
//! arguments fixed at declaration time.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::Value;

type TransformFn = Arc<dyn Fn(Value) -> Result<Value, String> + Send + Sync>;
type NamedTransformFn = Arc<dyn Fn(Value, &[Value]) -> Result<Value, String> + Send + Sync>;

/// Fallible conversion from a coerced command-line value to an application value.
///
/// Transforms are cheap to clone and compare by identity only, so two
/// descriptors built from the same closure are not considered equal.
///
/// # Examples
///
/// ```
/// use command_tree_core::{Transform, Value};
///
/// let upper = Transform::new(|value| match value {
///     Value::String(s) => Ok(Value::String(s.to_uppercase())),
///     other => Err(format!("cannot upcase {other}")),
/// });
/// assert_eq!(upper.apply(Value::from("ada")), Ok(Value::from("ADA")));
/// assert!(upper.apply(Value::Integer(1)).is_err());
/// ```
#[derive(Clone)]
pub struct Transform {
    label: Option<String>,
    func: TransformFn,
}

impl Transform {
    /// Wraps a closure.
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self {
            label: None,
            func: Arc::new(func),
        }
    }

    /// Wraps a function taking extra arguments, binding those arguments now.
    ///
    /// ```
    /// use command_tree_core::{Transform, Value};
    ///
    /// let clamp = Transform::with_args(
    ///     |value, args| {
    ///         let (lo, hi) = (args[0].as_i64().unwrap_or(0), args[1].as_i64().unwrap_or(0));
    ///         let n = value.as_i64().ok_or("not an integer")?;
    ///         Ok(Value::Integer(n.clamp(lo, hi)))
    ///     },
    ///     vec![Value::Integer(0), Value::Integer(10)],
    /// );
    /// assert_eq!(clamp.apply(Value::Integer(99)), Ok(Value::Integer(10)));
    /// ```
    pub fn with_args<F>(func: F, args: Vec<Value>) -> Self
    where
        F: Fn(Value, &[Value]) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self::new(move |value| func(value, &args))
    }

    /// Parses the string form of a value through [`FromStr`].
    pub fn parse<T>() -> Self
    where
        T: FromStr + Into<Value>,
        T::Err: fmt::Display,
    {
        Self::new(|value| {
            let raw = value.to_string();
            raw.parse::<T>()
                .map(Into::into)
                .map_err(|err| err.to_string())
        })
    }

    /// Attaches a label shown in `Debug` output.
    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Runs the transform.
    pub fn apply(&self, value: Value) -> Result<Value, String> {
        (self.func)(value)
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "Transform({label})"),
            None => f.write_str("Transform(<fn>)"),
        }
    }
}

/// Named transforms available to declarative tree manifests.
///
/// # Examples
///
/// ```
/// use command_tree_core::{TransformRegistry, Value};
///
/// let registry = TransformRegistry::with_builtins();
/// let split = registry.resolve("split", vec![Value::from(",")]).unwrap();
/// assert_eq!(
///     split.apply(Value::from("a,b")),
///     Ok(Value::List(vec![Value::from("a"), Value::from("b")])),
/// );
/// assert!(registry.resolve("missing", Vec::new()).is_none());
/// ```
#[derive(Clone, Default)]
pub struct TransformRegistry {
    entries: BTreeMap<String, NamedTransformFn>,
}

impl TransformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with `upcase`, `downcase`, `trim` and `split`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("upcase", |value, _| map_string(value, |s| s.to_uppercase()));
        registry.register("downcase", |value, _| map_string(value, |s| s.to_lowercase()));
        registry.register("trim", |value, _| map_string(value, |s| s.trim().to_string()));
        registry.register("split", |value, args| {
            let sep = args.first().and_then(Value::as_str).unwrap_or(",");
            match value {
                Value::String(s) => Ok(Value::List(
                    s.split(sep)
                        .filter(|part| !part.is_empty())
                        .map(Value::from)
                        .collect(),
                )),
                other => Err(format!("cannot split non-string value {other}")),
            }
        });
        registry
    }

    /// Registers (or replaces) a named transform.
    pub fn register<F>(&mut self, name: impl Into<String>, func: F)
    where
        F: Fn(Value, &[Value]) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.entries.insert(name.into(), Arc::new(func));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Binds `args` to the named transform, if registered.
    pub fn resolve(&self, name: &str, args: Vec<Value>) -> Option<Transform> {
        let func = Arc::clone(self.entries.get(name)?);
        Some(Transform::new(move |value| func(value, &args)).labeled(name))
    }
}

impl fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

fn map_string(value: Value, f: impl Fn(&str) -> String) -> Result<Value, String> {
    match value {
        Value::String(s) => Ok(Value::String(f(&s))),
        other => Err(format!("expected a string, got {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_transform_reports_parse_error() {
        let port = Transform::parse::<i64>();
        assert_eq!(port.apply(Value::from("8080")), Ok(Value::Integer(8080)));
        assert!(port.apply(Value::from("http")).is_err());
    }

    #[test]
    fn test_registry_binds_extra_args_per_resolution() {
        let registry = TransformRegistry::with_builtins();
        let colon = registry.resolve("split", vec![Value::from(":")]).unwrap();
        let comma = registry.resolve("split", Vec::new()).unwrap();

        assert_eq!(
            colon.apply(Value::from("a:b,c")),
            Ok(Value::List(vec![Value::from("a"), Value::from("b,c")]))
        );
        assert_eq!(
            comma.apply(Value::from("a:b,c")),
            Ok(Value::List(vec![Value::from("a:b"), Value::from("c")]))
        );
    }

    #[test]
    fn test_debug_uses_label() {
        let registry = TransformRegistry::with_builtins();
        let upcase = registry.resolve("upcase", Vec::new()).unwrap();
        assert_eq!(format!("{upcase:?}"), "Transform(upcase)");
    }
}
