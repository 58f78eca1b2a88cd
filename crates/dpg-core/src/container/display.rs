//! `Display` formatting and tolerance-aware printing.
//!
//! Plain [`fmt::Display`] renders any container exactly. For inspecting
//! numerical results, [`display_tol`](MatrixBase::display_tol) returns a
//! [`TolDisplay`] adapter that prints entries in scientific notation and
//! flushes every entry whose modulus is below the tolerance to an exact zero.

use core::fmt;

use crate::config::Config;
use crate::container::storage::Storage;
use crate::container::{
    MatrixBase, MatrixView, MultiarrayBase, MultiarrayView, VectorArray, VectorBase, VectorView,
};
use crate::linalg::sparse::{CsrBase, CsrView};
use crate::{Element, Scalar};

// ======================================================================
// Plain Display
// ======================================================================

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    write!(f, "[")?;
    for (i, v) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{v}")?;
    }
    write!(f, "]")
}

impl<D: Storage> fmt::Display for VectorBase<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vector(")?;
        write_list(f, self.as_slice())?;
        write!(f, ")")
    }
}

impl<D: Storage> fmt::Display for MatrixBase<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (rows, cols) = self.extents();
        if self.is_empty() {
            return write!(f, "matrix([], extents=({rows}, {cols}), layout={})", self.layout());
        }
        writeln!(f, "matrix([")?;
        for i in 0..rows {
            write!(f, "  [")?;
            for j in 0..cols {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", self[(i, j)])?;
            }
            if i + 1 < rows {
                writeln!(f, "],")?;
            } else {
                writeln!(f, "]")?;
            }
        }
        write!(f, "], layout={})", self.layout())
    }
}

impl<D: Storage> fmt::Display for MultiarrayBase<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.as_slice();
        match data.len() {
            0..=4 => {
                write!(f, "multiarray(extents={:?}, layout={}, data=", self.extents(), self.layout())?;
                write_list(f, data)?;
                write!(f, ")")
            }
            n => write!(
                f,
                "multiarray(extents={:?}, layout={}, data=[{}, {}, ..., {}])",
                self.extents(),
                self.layout(),
                data[0],
                data[1],
                data[n - 1]
            ),
        }
    }
}

impl<T: Element> fmt::Display for VectorArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "vector_array(extents={:?}, entries=[", self.extents())?;
        for v in self.entries() {
            write!(f, "  ")?;
            write_list(f, v.as_slice())?;
            writeln!(f)?;
        }
        write!(f, "])")
    }
}

impl<D: Storage> fmt::Display for CsrBase<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (rows, cols) = self.shape();
        write!(f, "csr(shape=({rows}, {cols}), nnz={}, values=", self.nnz())?;
        write_list(f, self.values())?;
        write!(f, ")")
    }
}

// ======================================================================
// Tolerance-aware printing
// ======================================================================

enum Target<'a, T: Element> {
    Vector(VectorView<'a, T>),
    Matrix(MatrixView<'a, T>),
    Multiarray(MultiarrayView<'a, T>),
    Csr(CsrView<'a, T>),
}

/// Display adapter that prints entries with modulus below `tol` as zero.
///
/// Obtained from `display_tol` on any container; see also `print`.
pub struct TolDisplay<'a, T: Scalar> {
    target: Target<'a, T>,
    tol: T::Real,
}

fn write_entry<T: Scalar>(f: &mut fmt::Formatter<'_>, x: T, tol: T::Real) -> fmt::Result {
    let x = if x.modulus() < tol { T::zero() } else { x };
    if T::IS_COMPLEX {
        write!(f, " {:>11.4e}{:+.4e}i", x.real_part(), x.imag_part())
    } else {
        write!(f, " {:>11.4e}", x.real_part())
    }
}

fn write_rows<T, F>(f: &mut fmt::Formatter<'_>, rows: usize, cols: usize, tol: T::Real, at: F) -> fmt::Result
where
    T: Scalar,
    F: Fn(usize, usize) -> T,
{
    for i in 0..rows {
        for j in 0..cols {
            write_entry(f, at(i, j), tol)?;
        }
        writeln!(f)?;
    }
    Ok(())
}

/// Advance a trailing-index counter, first entry fastest. Returns `false`
/// once every tuple has been visited.
fn increment(counter: &mut [usize], extents: &[usize]) -> bool {
    for (c, &e) in counter.iter_mut().zip(extents) {
        *c += 1;
        if *c < e {
            return true;
        }
        *c = 0;
    }
    false
}

impl<T: Scalar> fmt::Display for TolDisplay<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tol = self.tol;
        match &self.target {
            Target::Vector(v) => {
                for &x in v.iter() {
                    write_entry(f, x, tol)?;
                }
                writeln!(f)
            }
            Target::Matrix(m) => {
                let (rows, cols) = m.extents();
                write_rows(f, rows, cols, tol, |i, j| m[(i, j)])
            }
            Target::Multiarray(a) => {
                let extents = a.extents();
                write!(f, "Multi-array extents: {{")?;
                for e in extents {
                    write!(f, " {e},")?;
                }
                writeln!(f, " }}")?;
                writeln!(f)?;
                match *extents {
                    [n] => {
                        for k in 0..n {
                            write_entry(f, a.as_slice()[k], tol)?;
                        }
                        writeln!(f)?;
                    }
                    [rows, cols] => write_rows(f, rows, cols, tol, |i, j| a[[i, j]])?,
                    _ if a.is_empty() => {}
                    _ => {
                        let (rows, cols) = (extents[0], extents[1]);
                        let tail = &extents[2..];
                        let mut counter = vec![0; tail.len()];
                        let mut index = vec![0; extents.len()];
                        loop {
                            write!(f, "{{:,:")?;
                            for c in &counter {
                                write!(f, ",{c}")?;
                            }
                            writeln!(f, "}}")?;
                            index[2..].copy_from_slice(&counter);
                            for i in 0..rows {
                                for j in 0..cols {
                                    index[0] = i;
                                    index[1] = j;
                                    write_entry(f, a.as_slice()[a.offset(&index)], tol)?;
                                }
                                writeln!(f)?;
                            }
                            if !increment(&mut counter, tail) {
                                break;
                            }
                            writeln!(f)?;
                        }
                    }
                }
                writeln!(f)
            }
            Target::Csr(c) => {
                let (rows, cols) = c.shape();
                writeln!(f, "CSR operator: {rows} x {cols}, nnz = {}", c.nnz())?;
                for r in 0..rows {
                    let (columns, values) = c.row(r).map_err(|_| fmt::Error)?;
                    write!(f, "row {r}:")?;
                    for (&col, &x) in columns.iter().zip(values) {
                        write!(f, " ({col},")?;
                        write_entry(f, x, tol)?;
                        write!(f, ")")?;
                    }
                    writeln!(f)?;
                }
                Ok(())
            }
        }
    }
}

macro_rules! impl_print {
    ($base:ident, $variant:ident) => {
        impl<D> $base<D>
        where
            D: Storage,
            D::Elem: Scalar,
        {
            /// Display adapter flushing entries with modulus below `tol` to
            /// zero.
            pub fn display_tol(&self, tol: <D::Elem as Scalar>::Real) -> TolDisplay<'_, D::Elem> {
                TolDisplay {
                    target: Target::$variant(self.view()),
                    tol,
                }
            }

            /// Print to stdout with the given tolerance.
            pub fn print(&self, tol: <D::Elem as Scalar>::Real) {
                println!("{}", self.display_tol(tol));
            }

            /// [`display_tol`](Self::display_tol) with `cfg.print_tol`.
            pub fn display_cfg(&self, cfg: &Config) -> TolDisplay<'_, D::Elem> {
                self.display_tol(<D::Elem as Scalar>::Real::from_f64(cfg.print_tol))
            }

            /// Print to stdout with `cfg.print_tol`.
            pub fn print_cfg(&self, cfg: &Config) {
                println!("{}", self.display_cfg(cfg));
            }
        }
    };
}

impl_print!(VectorBase, Vector);
impl_print!(MatrixBase, Matrix);
impl_print!(MultiarrayBase, Multiarray);
impl_print!(CsrBase, Csr);

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::container::{Layout, Matrix, Multiarray, Vector, VectorArray};
    use num_complex::Complex64;

    #[test]
    fn test_display_vector() {
        let v = Vector::from_vec(vec![1, 2, 3]);
        assert_eq!(format!("{v}"), "vector([1, 2, 3])");
        assert_eq!(format!("{}", v.view()), "vector([1, 2, 3])");
    }

    #[test]
    fn test_display_matrix_is_layout_independent() {
        let r = Matrix::from_vec(2, 2, Layout::Row, vec![1, 2, 3, 4]).unwrap();
        let c = Matrix::from_vec(2, 2, Layout::Col, vec![1, 3, 2, 4]).unwrap();
        let sr = format!("{r}");
        let sc = format!("{c}");
        assert!(sr.contains("[1, 2]"));
        assert!(sr.contains("[3, 4]"));
        assert_eq!(sr.replace("layout=R", ""), sc.replace("layout=C", ""));
    }

    #[test]
    fn test_display_empty_matrix() {
        let m = Matrix::<f64>::zeros(0, 3, Layout::Col).unwrap();
        assert_eq!(format!("{m}"), "matrix([], extents=(0, 3), layout=C)");
    }

    #[test]
    fn test_display_multiarray_summary() {
        let a = Multiarray::from_vec(&[2, 3], Layout::Col, (0..6).collect()).unwrap();
        assert_eq!(
            format!("{a}"),
            "multiarray(extents=[2, 3], layout=C, data=[0, 1, ..., 5])"
        );
    }

    #[test]
    fn test_display_vector_array() {
        let a = VectorArray::from_flat(&[2], &[3, 1, 2], &[1, 2]).unwrap();
        assert_eq!(format!("{a}"), "vector_array(extents=[2], entries=[\n  [3]\n  [1, 2]\n])");
    }

    #[test]
    fn test_display_cfg_uses_print_tol() {
        let v = Vector::from_vec(vec![1.0, 1e-9]);
        let loose = Config::default().with_print_tol(1e-6);
        assert_eq!(format!("{}", v.display_cfg(&loose)), format!("{}", v.display_tol(1e-6)));
        assert!(format!("{}", v.display_cfg(&loose)).contains("0.0000e0"));
        let strict = Config::default();
        assert!(format!("{}", v.display_cfg(&strict)).contains("1.0000e-9"));
    }

    #[test]
    fn test_tolerance_flushes_small_entries() {
        let v = Vector::from_vec(vec![1.0, 1e-16, -2.5]);
        let s = format!("{}", v.display_tol(1e-12));
        assert!(s.contains("1.0000e0"));
        assert!(s.contains("0.0000e0"));
        assert!(s.contains("-2.5000e0"));
        assert!(!s.contains("e-16"));
    }

    #[test]
    fn test_tolerance_complex_entries() {
        let v = Vector::from_vec(vec![Complex64::new(1.0, -2.0)]);
        let s = format!("{}", v.display_tol(0.0));
        assert!(s.contains("1.0000e0-2.0000e0i"));
    }

    #[test]
    fn test_multiarray_counter_lines() {
        let a = Multiarray::<f64>::zeros(&[2, 2, 2, 2], Layout::Col).unwrap();
        let s = format!("{}", a.display_tol(1e-15));
        assert!(s.starts_with("Multi-array extents: { 2, 2, 2, 2, }"));
        assert!(s.contains("{:,:,0,0}"));
        assert!(s.contains("{:,:,1,0}"));
        assert!(s.contains("{:,:,0,1}"));
        assert!(s.contains("{:,:,1,1}"));
        assert_eq!(s.matches("{:,:").count(), 4);
    }

    #[test]
    fn test_multiarray_sub_matrices_use_logical_indexing() {
        let col = Multiarray::from_vec(&[1, 2, 2], Layout::Col, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let mut row = Multiarray::<f64>::zeros(&[1, 2, 2], Layout::Row).unwrap();
        for j in 0..2 {
            for k in 0..2 {
                row[[0, j, k]] = col[[0, j, k]];
            }
        }
        assert_eq!(
            format!("{}", col.display_tol(0.0)),
            format!("{}", row.display_tol(0.0))
        );
    }
}
