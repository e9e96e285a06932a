use std::{collections::HashMap, fmt, hash::Hash, marker::PhantomData, num::NonZeroU32, rc::Rc};

/// A handle to some interned value of type `T`. To retrieve a `&T`, use
/// [`Interner::get`].
pub struct Interned<T: ?Sized> {
    // NonZeroU32 keeps `Option<Interned<T>>` the size of a handle.
    handle: NonZeroU32,
    _ty: PhantomData<T>,
}

impl<T: ?Sized> Interned<T> {
    const fn new(handle: NonZeroU32) -> Self {
        Interned {
            handle,
            _ty: PhantomData,
        }
    }
}

impl<T: ?Sized> Copy for Interned<T> {}

impl<T: ?Sized> Clone for Interned<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Hash for Interned<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.handle.hash(state);
    }
}

impl<T: ?Sized> PartialEq for Interned<T> {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl<T: ?Sized> Eq for Interned<T> {}

impl<T: ?Sized> fmt::Debug for Interned<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Interned({})", self.handle)
    }
}

impl<T: ?Sized> From<&Interned<T>> for Interned<T> {
    fn from(value: &Interned<T>) -> Self {
        *value
    }
}

/// Deduplicates values (identifier names, in practice), handing out cheap
/// copyable handles.
pub struct Interner<T: ?Sized> {
    map: HashMap<Rc<T>, NonZeroU32>,
    vec: Vec<Rc<T>>,
}

impl fmt::Debug for Interner<str> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (i, interned) in self.vec.iter().enumerate() {
            map.entry(&(i + 1), &interned);
        }
        map.finish()
    }
}

impl<T: ?Sized> Interner<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Interner {
            map: HashMap::with_capacity(capacity),
            vec: Vec::with_capacity(capacity),
        }
    }

    /// Number of distinct values interned so far.
    pub(crate) fn len(&self) -> usize {
        self.vec.len()
    }

    /// Interns the provided value, returning a handle which can be used to
    /// retrieve it later.
    pub fn intern(&mut self, value: &T) -> Interned<T>
    where
        T: Eq + Hash + ToOwned,
        T::Owned: Into<Rc<T>>,
    {
        if let Some(handle) = self.lookup(value) {
            return handle;
        }
        let key: Rc<T> = value.to_owned().into();
        let handle = u32::try_from(self.vec.len() + 1)
            .ok()
            .and_then(NonZeroU32::new)
            .expect("interner out of capacity");
        self.vec.push(Rc::clone(&key));
        self.map.insert(key, handle);
        Interned::new(handle)
    }

    /// Returns the handle of an already interned value, without interning it.
    pub fn lookup(&self, value: &T) -> Option<Interned<T>>
    where
        T: Eq + Hash,
    {
        self.map.get(value).copied().map(Interned::new)
    }

    /// Returns the corresponding value for the provided [`Interned`] handle.
    /// Panics if the handle belongs to another interner.
    pub fn get(&self, handle: impl Into<Interned<T>>) -> &T {
        let handle: Interned<T> = handle.into();
        &self.vec[handle.handle.get() as usize - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interner() {
        let mut i = Interner::<str>::with_capacity(3);

        let main1 = i.intern("main");
        let x1 = i.intern("x");
        let y1 = i.intern("y");

        let main2 = i.intern("main");
        let x2 = i.intern("x");

        assert_eq!(main1, main2);
        assert_eq!(x1, x2);
        assert_ne!(x1, y1);
        assert_eq!(i.get(main1), "main");
        assert_eq!(i.get(y1), "y");
        assert_eq!(i.len(), 3);
    }

    #[test]
    fn lookup_does_not_intern() {
        let mut i = Interner::<str>::with_capacity(2);
        let a = i.intern("a");

        assert_eq!(i.lookup("a"), Some(a));
        assert_eq!(i.lookup("b"), None);
        assert_eq!(i.len(), 1);
    }
}
