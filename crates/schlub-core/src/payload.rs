//! Registered payloads, produced instances and factory arguments.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use crate::error::RegistryError;

/// A produced or stored service instance.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Error type factories may return.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Type-erased factory closure.
pub type FactoryFn = dyn Fn(Arguments) -> Result<Instance, BoxError> + Send + Sync;

/// What a reference holds: something to call, or something already built.
#[derive(Clone)]
pub enum Payload {
    Factory(Arc<FactoryFn>),
    Value(Instance),
}

impl Payload {
    /// Wrap a typed factory.
    ///
    /// The closure receives resolved dependencies first, then any extra
    /// arguments passed to [`Registry::get_with`](crate::Registry::get_with).
    /// The result is boxed into a fresh [`Instance`]; a closure that already
    /// produces an `Instance` belongs in [`shared_factory`](Self::shared_factory).
    pub fn factory<T, F>(factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(Arguments) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        Self::Factory(Arc::new(move |args| {
            factory(args).map(|value| Arc::new(value) as Instance)
        }))
    }

    /// Wrap a factory that hands out existing instances unchanged.
    pub fn shared_factory<F>(factory: F) -> Self
    where
        F: Fn(Arguments) -> Result<Instance, BoxError> + Send + Sync + 'static,
    {
        Self::Factory(Arc::new(factory))
    }

    /// Store an already constructed value.
    pub fn value<T: Any + Send + Sync>(value: T) -> Self {
        Self::Value(Arc::new(value))
    }

    /// Store an instance that is shared with the caller.
    pub fn shared(instance: Instance) -> Self {
        Self::Value(instance)
    }

    pub fn is_factory(&self) -> bool {
        matches!(self, Self::Factory(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Factory(_) => "factory",
            Self::Value(_) => "value",
        }
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Payload::{}", self.kind())
    }
}

/// Result of a lookup. The variant is fixed by the descriptor flags.
#[derive(Clone)]
pub enum Resolved {
    /// Nothing matched and `allow_none` was set.
    None,
    /// Exactly one match.
    One(Instance),
    /// Every match, in trie order (`allow_multiple`).
    Many(Vec<Instance>),
}

impl Resolved {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn len(&self) -> usize {
        match self {
            Self::None => 0,
            Self::One(_) => 1,
            Self::Many(instances) => instances.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn shape(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::One(_) => "one",
            Self::Many(_) => "many",
        }
    }

    /// The single instance, type-erased.
    pub fn instance(&self) -> Result<&Instance, RegistryError> {
        match self {
            Self::One(instance) => Ok(instance),
            other => Err(RegistryError::UnexpectedShape {
                expected: "one",
                actual: other.shape(),
            }),
        }
    }

    /// Every instance, flattened; `None` yields an empty list.
    pub fn instances(&self) -> Vec<Instance> {
        match self {
            Self::None => Vec::new(),
            Self::One(instance) => vec![instance.clone()],
            Self::Many(instances) => instances.clone(),
        }
    }

    pub fn downcast<T: Any + Send + Sync>(&self) -> Result<Arc<T>, RegistryError> {
        downcast_instance(self.instance()?, "resolved instance")
    }

    pub fn downcast_optional<T: Any + Send + Sync>(&self) -> Result<Option<Arc<T>>, RegistryError> {
        match self {
            Self::None => Ok(None),
            Self::One(instance) => downcast_instance(instance, "resolved instance").map(Some),
            other => Err(RegistryError::UnexpectedShape {
                expected: "none or one",
                actual: other.shape(),
            }),
        }
    }

    pub fn downcast_all<T: Any + Send + Sync>(&self) -> Result<Vec<Arc<T>>, RegistryError> {
        self.instances()
            .iter()
            .enumerate()
            .map(|(index, instance)| downcast_instance(instance, &format!("resolved instance {index}")))
            .collect()
    }
}

impl fmt::Debug for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Resolved::{}({})", self.shape(), self.len())
    }
}

fn downcast_instance<T: Any + Send + Sync>(
    instance: &Instance,
    context: &str,
) -> Result<Arc<T>, RegistryError> {
    instance
        .clone()
        .downcast::<T>()
        .map_err(|_| RegistryError::TypeMismatch {
            expected: type_name::<T>().to_string(),
            context: context.to_string(),
        })
}

/// Positional arguments handed to a factory: resolved dependencies, then
/// caller-supplied extra arguments.
#[derive(Clone, Default)]
pub struct Arguments {
    values: Vec<Resolved>,
}

impl Arguments {
    pub fn new(values: Vec<Resolved>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn resolved(&self, index: usize) -> Result<&Resolved, RegistryError> {
        self.values
            .get(index)
            .ok_or(RegistryError::MissingArgument(index))
    }

    /// A single-instance argument of type `T`.
    pub fn get<T: Any + Send + Sync>(&self, index: usize) -> Result<Arc<T>, RegistryError> {
        let instance = self.resolved(index)?.instance()?;
        downcast_instance(instance, &format!("argument {index}"))
    }

    /// An argument whose dependency was declared with `allow_none`.
    pub fn optional<T: Any + Send + Sync>(
        &self,
        index: usize,
    ) -> Result<Option<Arc<T>>, RegistryError> {
        self.resolved(index)?.downcast_optional()
    }

    /// An argument whose dependency was declared with `allow_multiple`.
    pub fn all<T: Any + Send + Sync>(&self, index: usize) -> Result<Vec<Arc<T>>, RegistryError> {
        self.resolved(index)?.downcast_all()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Resolved> {
        self.values.iter()
    }
}

impl fmt::Debug for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.values.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_kind() {
        let factory = Payload::factory(|_| Ok(1u32));
        let value = Payload::value("ready");
        assert!(factory.is_factory());
        assert!(!value.is_factory());
        assert_eq!(factory.kind(), "factory");
        assert_eq!(value.kind(), "value");
        assert_eq!(format!("{:?}", value), "Payload::value");
    }

    #[test]
    fn test_factory_wraps_result() {
        let Payload::Factory(factory) = Payload::factory(|args: Arguments| Ok(args.len())) else {
            panic!("expected factory payload");
        };
        let instance = factory(Arguments::new(vec![Resolved::None, Resolved::None])).unwrap();
        assert_eq!(*instance.downcast::<usize>().unwrap(), 2);
    }

    #[test]
    fn test_resolved_downcast() {
        let resolved = Resolved::One(Arc::new(7u8));
        assert_eq!(*resolved.downcast::<u8>().unwrap(), 7);
        assert!(matches!(
            resolved.downcast::<String>(),
            Err(RegistryError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_resolved_shapes() {
        assert!(Resolved::None.is_none());
        assert!(Resolved::None.is_empty());
        assert!(matches!(
            Resolved::None.downcast::<u8>(),
            Err(RegistryError::UnexpectedShape { expected: "one", actual: "none" })
        ));
        assert!(Resolved::None.downcast_optional::<u8>().unwrap().is_none());

        let many = Resolved::Many(vec![Arc::new(1u8), Arc::new(2u8)]);
        assert_eq!(many.len(), 2);
        assert!(many.downcast_optional::<u8>().is_err());
        let all: Vec<u8> = many.downcast_all::<u8>().unwrap().iter().map(|v| **v).collect();
        assert_eq!(all, vec![1, 2]);
    }

    #[test]
    fn test_arguments_access() {
        let args = Arguments::new(vec![
            Resolved::One(Arc::new("dep".to_string())),
            Resolved::None,
            Resolved::Many(vec![Arc::new(1i32), Arc::new(2i32)]),
        ]);

        assert_eq!(args.len(), 3);
        assert_eq!(args.get::<String>(0).unwrap().as_str(), "dep");
        assert!(args.optional::<String>(1).unwrap().is_none());
        assert_eq!(args.all::<i32>(2).unwrap().len(), 2);
        assert!(matches!(
            args.get::<String>(5),
            Err(RegistryError::MissingArgument(5))
        ));
        assert!(matches!(
            args.get::<u64>(0),
            Err(RegistryError::TypeMismatch { .. })
        ));
    }
}
