//! Multiarrays whose entries are variable-length vectors.
//!
//! A [`VectorArray`] is the container for ragged integer data such as the
//! node lists of mesh faces: every entry of an order-N index space holds its
//! own [`Vector`]. Entries are stored column-major like [`Multiarray`](super::Multiarray).

use core::cmp::Ordering;

use crate::Element;
use crate::container::{Extents, Vector, checked_len};
use crate::error::{CoreError, Result};

/// An order-N array of owning vectors of differing lengths.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorArray<T: Element> {
    pub(crate) data: Vec<Vector<T>>,
    extents: Extents,
}

impl<T: Element> VectorArray<T> {
    /// An array of empty vectors.
    pub fn new(extents: &[usize]) -> Result<Self> {
        let ext = Extents::new(extents)?;
        let len = checked_len("VectorArray", extents)?;
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|e| CoreError::Allocation {
                container: "VectorArray",
                extents: extents.to_vec(),
                reason: e.to_string(),
            })?;
        data.resize_with(len, || Vector::from_vec(Vec::new()));
        tracing::trace!(container = "VectorArray", ?extents, "constructed");
        Ok(Self { data, extents: ext })
    }

    /// Fill from a flat buffer: entry `k` takes the next `lens[k]` values of
    /// `values`.
    pub fn from_flat(extents: &[usize], values: &[T], lens: &[usize]) -> Result<Self> {
        let mut out = Self::new(extents)?;
        if lens.len() != out.data.len() {
            return Err(CoreError::DimensionMismatch {
                op: "VectorArray::from_flat",
                expected: vec![out.data.len()],
                got: vec![lens.len()],
            });
        }
        let total: usize = lens.iter().sum();
        if total != values.len() {
            return Err(CoreError::DimensionMismatch {
                op: "VectorArray::from_flat",
                expected: vec![total],
                got: vec![values.len()],
            });
        }
        let mut rest = values;
        for (v, &n) in out.data.iter_mut().zip(lens) {
            let (head, tail) = rest.split_at(n);
            *v = Vector::copy_from_slice(head)?;
            rest = tail;
        }
        Ok(out)
    }

    #[inline]
    pub fn extents(&self) -> &[usize] {
        self.extents.as_slice()
    }

    #[inline]
    pub fn order(&self) -> usize {
        self.extents.order()
    }

    /// Number of vector entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// All entries in storage order.
    #[inline]
    pub fn entries(&self) -> &[Vector<T>] {
        &self.data
    }

    fn flat_index(&self, index: &[usize]) -> Result<usize> {
        let dims = self.extents();
        if index.len() != dims.len() || index.iter().zip(dims).any(|(&i, &e)| i >= e) {
            return Err(CoreError::Index {
                container: "VectorArray",
                index: index.to_vec(),
                extents: dims.to_vec(),
            });
        }
        Ok(index
            .iter()
            .zip(dims)
            .rev()
            .fold(0, |off, (&i, &e)| off * e + i))
    }

    /// The vector at `index`.
    pub fn get(&self, index: &[usize]) -> Result<&Vector<T>> {
        let k = self.flat_index(index)?;
        Ok(&self.data[k])
    }

    /// Replace the vector at `index`.
    pub fn set(&mut self, index: &[usize], v: Vector<T>) -> Result<()> {
        let k = self.flat_index(index)?;
        self.data[k] = v;
        Ok(())
    }

    /// Total number of values over all entries.
    pub fn total_len(&self) -> usize {
        self.data.iter().map(|v| v.len()).sum()
    }

    /// Concatenate every entry, in storage order, into one vector.
    pub fn collapse(&self) -> Result<Vector<T>> {
        let total = self.total_len();
        let mut out = Vec::new();
        out.try_reserve_exact(total)
            .map_err(|e| CoreError::Allocation {
                container: "VectorArray",
                extents: vec![total],
                reason: e.to_string(),
            })?;
        for v in &self.data {
            out.extend_from_slice(v.as_slice());
        }
        Ok(Vector::from_vec(out))
    }

    pub fn destroy(self) {
        tracing::trace!(container = "VectorArray", extents = ?self.extents, "destroyed");
    }
}

/// Shorter vectors first, equal lengths lexicographically.
fn cmp_entries<T: Element + Ord>(a: &Vector<T>, b: &Vector<T>) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.as_slice().cmp(b.as_slice()))
}

impl<T: Element + Ord> VectorArray<T> {
    /// Sort the values of every entry, then the entries themselves (shorter
    /// first, then lexicographically).
    pub fn sort(&mut self) {
        for v in &mut self.data {
            v.sort();
        }
        self.data.sort_by(cmp_entries);
    }

    /// [`sort`](Self::sort), returning the ordering: entry `i` of the result
    /// came from position `ordering[i]`. Equal entries keep their relative
    /// order.
    pub fn sort_indexed(&mut self) -> Result<Vector<usize>> {
        for v in &mut self.data {
            v.sort();
        }
        let mut ordering: Vec<usize> = (0..self.data.len()).collect();
        ordering.sort_by(|&i, &j| cmp_entries(&self.data[i], &self.data[j]));

        let mut old: Vec<Option<Vector<T>>> = self.data.drain(..).map(Some).collect();
        for &k in &ordering {
            let v = old[k].take().ok_or_else(|| {
                CoreError::invariant("VectorArray", format_args!("entry {k} reordered twice"))
            })?;
            self.data.push(v);
        }
        Ok(Vector::from_vec(ordering))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn faces() -> VectorArray<i32> {
        // Node lists of four faces.
        VectorArray::from_flat(&[4], &[7, 3, 9, 2, 1, 5, 4, 1, 0, 8], &[3, 2, 2, 3]).unwrap()
    }

    #[test]
    fn test_from_flat_splits_values() {
        let a = faces();
        assert_eq!(a.len(), 4);
        assert_eq!(a.total_len(), 10);
        assert_eq!(a.get(&[0]).unwrap().as_slice(), &[7, 3, 9]);
        assert_eq!(a.get(&[3]).unwrap().as_slice(), &[1, 0, 8]);
        assert!(a.get(&[4]).is_err());
    }

    #[test]
    fn test_from_flat_rejects_bad_lengths() {
        assert!(VectorArray::from_flat(&[2], &[1, 2, 3], &[1, 1]).is_err());
        assert!(VectorArray::from_flat(&[2], &[1, 2], &[2]).is_err());
    }

    #[test]
    fn test_sort_orders_by_length_then_values() {
        let mut a = faces();
        a.sort();
        let sorted: Vec<&[i32]> = a.entries().iter().map(|v| v.as_slice()).collect();
        assert_eq!(sorted, vec![&[1, 2][..], &[4, 5][..], &[0, 1, 8][..], &[3, 7, 9][..]]);
    }

    #[test]
    fn test_sort_indexed_returns_ordering() {
        let mut a = faces();
        let original = a.clone();
        let ordering = a.sort_indexed().unwrap();
        assert_eq!(ordering.as_slice(), &[1, 2, 3, 0]);
        for (i, &k) in ordering.iter().enumerate() {
            let mut expected = original.entries()[k].clone();
            expected.sort();
            assert_eq!(a.entries()[i], expected);
        }
    }

    #[test]
    fn test_collapse_concatenates_in_storage_order() {
        let a = faces();
        assert_eq!(a.collapse().unwrap().as_slice(), &[7, 3, 9, 2, 1, 5, 4, 1, 0, 8]);
        let empty = VectorArray::<i32>::new(&[2, 3]).unwrap();
        assert_eq!(empty.len(), 6);
        assert!(empty.collapse().unwrap().is_empty());
    }

    #[test]
    fn test_column_major_entry_access() {
        let mut a = VectorArray::<i32>::new(&[2, 2]).unwrap();
        a.set(&[1, 0], Vector::from_vec(vec![5])).unwrap();
        a.set(&[0, 1], Vector::from_vec(vec![6, 6])).unwrap();
        assert_eq!(a.entries()[1].as_slice(), &[5]);
        assert_eq!(a.entries()[2].as_slice(), &[6, 6]);
        assert!(a.set(&[2, 0], Vector::from_vec(vec![])).is_err());
    }
}
