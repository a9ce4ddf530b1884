use crate::{
    all_tuples,
    ecs::{
        component::{Component, Id, Info, Registry},
        error::Result,
    },
};

/// Receives the component values of a [`Set`] one at a time.
pub trait Target {
    fn apply<C: Component>(&mut self, id: Id, value: C) -> Result<()>;
}

/// A group of component types, and when used as a value, one value per type.
///
/// Sets are a single component, a tuple of sets, or nested tuples of sets. They let callers add,
/// remove or test several components of one entity in a single call.
pub trait Set: Sized + 'static {
    /// Register every component type in the set and append its info, in declaration order.
    fn describe(registry: &Registry, out: &mut Vec<Info>);

    /// Hand each value of the set to `target`, in declaration order. Stops at the first error.
    fn apply<T: Target>(self, registry: &Registry, target: &mut T) -> Result<()>;

    /// Collect the info of every type in the set.
    fn infos(registry: &Registry) -> Vec<Info> {
        let mut out = Vec::new();
        Self::describe(registry, &mut out);
        out
    }
}

impl<C: Component> Set for C {
    fn describe(registry: &Registry, out: &mut Vec<Info>) {
        let id = registry.register::<C>();
        out.push(Info::new::<C>(id));
    }

    fn apply<T: Target>(self, registry: &Registry, target: &mut T) -> Result<()> {
        target.apply::<C>(registry.register::<C>(), self)
    }
}

impl Set for () {
    fn describe(_registry: &Registry, _out: &mut Vec<Info>) {}

    fn apply<T: Target>(self, _registry: &Registry, _target: &mut T) -> Result<()> {
        Ok(())
    }
}

macro_rules! tuple_set {
    ($($name: ident),*) => {
        impl<$($name: Set),*> Set for ($($name,)*) {
            fn describe(registry: &Registry, out: &mut Vec<Info>) {
                $(<$name as Set>::describe(registry, out);)*
            }

            fn apply<CT: Target>(self, registry: &Registry, target: &mut CT) -> Result<()> {
                #[allow(non_snake_case)]
                let ( $($name,)* ) = self;
                $(<$name as Set>::apply($name, registry, target)?;)*
                Ok(())
            }
        }
    }
}

all_tuples!(tuple_set);

#[cfg(test)]
mod tests {
    use std::any::Any;

    use super::*;
    use crate::ecs::{Component, Error};

    #[derive(Default)]
    struct MockTarget {
        ids: Vec<Id>,
        vals: Vec<Box<dyn Any>>,
        fail_after: Option<usize>,
    }

    impl Target for MockTarget {
        fn apply<C: Component>(&mut self, id: Id, value: C) -> Result<()> {
            if self.fail_after == Some(self.ids.len()) {
                return Err(Error::CapacityExhausted { capacity: 0 });
            }
            self.ids.push(id);
            self.vals.push(Box::new(value));
            Ok(())
        }
    }

    #[derive(Component, Debug, PartialEq)]
    struct Position(u32);

    #[derive(Component, Debug, PartialEq)]
    struct Velocity(u32);

    #[derive(Component, Debug, PartialEq)]
    struct Health(u32);

    #[test]
    fn single_component_set() {
        // Given
        let registry = Registry::new();
        let mut target = MockTarget::default();

        // When
        Position(42).apply(&registry, &mut target).unwrap();

        // Then
        let infos = <Position as Set>::infos(&registry);
        assert_eq!(infos.len(), 1);
        assert_eq!(target.ids, vec![infos[0].id()]);
        assert_eq!(
            target.vals[0].downcast_ref::<Position>(),
            Some(&Position(42))
        );
    }

    #[test]
    fn nested_tuple_set_flattens_in_order() {
        // Given
        let registry = Registry::new();
        let mut target = MockTarget::default();

        // When
        (Position(1), (Velocity(2), Health(3)))
            .apply(&registry, &mut target)
            .unwrap();

        // Then
        let ids: Vec<Id> = <(Position, (Velocity, Health))>::infos(&registry)
            .iter()
            .map(Info::id)
            .collect();
        assert_eq!(
            ids,
            vec![
                registry.get::<Position>().unwrap(),
                registry.get::<Velocity>().unwrap(),
                registry.get::<Health>().unwrap(),
            ]
        );
        assert_eq!(target.ids, ids);
        assert_eq!(target.vals[2].downcast_ref::<Health>(), Some(&Health(3)));
    }

    #[test]
    fn apply_stops_at_first_error() {
        // Given
        let registry = Registry::new();
        let mut target = MockTarget {
            fail_after: Some(1),
            ..MockTarget::default()
        };

        // When
        let result = (Position(1), Velocity(2), Health(3)).apply(&registry, &mut target);

        // Then
        assert!(matches!(result, Err(Error::CapacityExhausted { .. })));
        assert_eq!(target.vals.len(), 1);
    }

    #[test]
    fn empty_set_describes_nothing() {
        let registry = Registry::new();
        assert!(<() as Set>::infos(&registry).is_empty());
        assert!(registry.is_empty());
    }
}
