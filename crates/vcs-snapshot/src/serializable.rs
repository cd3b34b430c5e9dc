use crate::error::{Result, StateError};
use crate::store::StateStore;

/// Save/restore contract for every stateful component.
///
/// A component writes a contiguous region with no length prefix, so `load` must read exactly
/// the fields `save` wrote, in the same order. Composites visit their children in a fixed order
/// (see [`save_all`] / [`load_all`]) and stop at the first failure.
pub trait Serializable {
    /// Stable component name, used in error paths and as the region tag for tagged components.
    fn name(&self) -> &'static str;

    fn save(&self, out: &mut StateStore) -> Result<()>;

    fn load(&mut self, input: &mut StateStore) -> Result<()>;
}

/// Root of a component tree: serializable, plus the identity tag of the loaded program.
pub trait StateRoot: Serializable {
    fn identity(&self) -> String;
}

impl<T: Serializable + ?Sized> Serializable for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn save(&self, out: &mut StateStore) -> Result<()> {
        (**self).save(out)
    }

    fn load(&mut self, input: &mut StateStore) -> Result<()> {
        (**self).load(input)
    }
}

/// Saves `children` in order. The first failure is returned wrapped with that child's name;
/// later children are not visited and bytes already written stay in the store.
pub fn save_all(out: &mut StateStore, children: &[&dyn Serializable]) -> Result<()> {
    for child in children {
        child.save(out).map_err(|e| e.in_component(child.name()))?;
    }
    Ok(())
}

/// Loads `children` in order with the same short-circuit rule as [`save_all`].
pub fn load_all(input: &mut StateStore, children: &mut [&mut dyn Serializable]) -> Result<()> {
    for child in children.iter_mut() {
        let name = child.name();
        child.load(input).map_err(|e| e.in_component(name))?;
    }
    Ok(())
}

pub fn write_tag(out: &mut StateStore, tag: &str) -> Result<()> {
    out.write_string(tag)
}

/// Reads a region tag and fails with [`StateError::TagMismatch`] unless it equals `expected`.
pub fn expect_tag(input: &mut StateStore, expected: &str) -> Result<()> {
    let found = input.read_string()?;
    if found != expected {
        return Err(StateError::TagMismatch {
            expected: expected.to_string(),
            found,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Child<'a> {
        name: &'static str,
        value: u8,
        fail: bool,
        calls: &'a Cell<u32>,
    }

    impl Serializable for Child<'_> {
        fn name(&self) -> &'static str {
            self.name
        }

        fn save(&self, out: &mut StateStore) -> Result<()> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(StateError::Corrupt("forced"));
            }
            out.write_byte(self.value)
        }

        fn load(&mut self, input: &mut StateStore) -> Result<()> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(StateError::Corrupt("forced"));
            }
            self.value = input.read_byte()?;
            Ok(())
        }
    }

    fn child<'a>(name: &'static str, value: u8, fail: bool, calls: &'a Cell<u32>) -> Child<'a> {
        Child {
            name,
            value,
            fail,
            calls,
        }
    }

    #[test]
    fn save_all_stops_at_first_failure() {
        let (a, b, c) = (Cell::new(0), Cell::new(0), Cell::new(0));
        let first = child("first", 7, false, &a);
        let second = child("second", 8, true, &b);
        let third = child("third", 9, false, &c);

        let mut store = StateStore::open_memory();
        let err = save_all(&mut store, &[&first, &second, &third]).unwrap_err();

        assert_eq!(err.component_path(), vec!["second"]);
        assert_eq!((a.get(), b.get(), c.get()), (1, 1, 0));
        // Not transactional: the first child's byte is already in the store.
        assert_eq!(store.position().unwrap(), 1);
    }

    #[test]
    fn load_all_visits_children_in_order() {
        let calls = Cell::new(0);
        let mut store = StateStore::open_memory();
        store.write_bytes(&[1, 2]).unwrap();
        store.reset();

        let mut x = child("x", 0, false, &calls);
        let mut y = child("y", 0, false, &calls);
        load_all(&mut store, &mut [&mut x, &mut y]).unwrap();
        assert_eq!((x.value, y.value), (1, 2));
    }

    #[test]
    fn expect_tag_rejects_other_names() {
        let mut store = StateStore::open_memory();
        write_tag(&mut store, "M6532").unwrap();
        store.reset();
        match expect_tag(&mut store, "M6502").unwrap_err() {
            StateError::TagMismatch { expected, found } => {
                assert_eq!(expected, "M6502");
                assert_eq!(found, "M6532");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
