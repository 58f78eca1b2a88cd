//! Ownership qualifier shared by every container.
//!
//! A container is generic over its storage: `Vec<T>` owns the buffer,
//! `&'a [T]` aliases a buffer owned elsewhere. Ownership is therefore part of
//! the type. Mutating and destroying methods exist only for the owning
//! storage, and the borrow checker keeps a view from outliving its owner or
//! observing a concurrent mutation.

use core::fmt;

use crate::Element;

mod sealed {
    pub trait Sealed {}

    impl<T> Sealed for Vec<T> {}
    impl<T> Sealed for &[T] {}
}

/// Backing buffer of a container.
pub trait Storage: sealed::Sealed {
    type Elem: Element;

    /// Index buffer with the same ownership, used by the sparse operator.
    type Indices: Storage<Elem = usize> + fmt::Debug + Clone + PartialEq;

    /// `true` for the owning flavour.
    const OWNING: bool;

    fn as_slice(&self) -> &[Self::Elem];
}

/// Storage that can be written through. Only the owning flavour.
pub trait StorageMut: Storage {
    fn as_mut_slice(&mut self) -> &mut [Self::Elem];
}

impl<T: Element> Storage for Vec<T> {
    type Elem = T;
    type Indices = Vec<usize>;

    const OWNING: bool = true;

    #[inline]
    fn as_slice(&self) -> &[T] {
        self
    }
}

impl<T: Element> StorageMut for Vec<T> {
    #[inline]
    fn as_mut_slice(&mut self) -> &mut [T] {
        self
    }
}

impl<'a, T: Element> Storage for &'a [T] {
    type Elem = T;
    type Indices = &'a [usize];

    const OWNING: bool = false;

    #[inline]
    fn as_slice(&self) -> &[T] {
        self
    }
}
