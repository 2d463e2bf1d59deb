//! Finite sets with stable enumeration order and explicit equality.
//!
//! A [`Fin`] is the object type of the category: an ordered,
//! duplicate-free enumeration of elements plus an equality predicate.
//! Objects are shared behind `Rc`, and categorical well-formedness
//! (composition only across the *same* object) is checked with pointer
//! identity via [`Fin::same_object`] — two structurally equal sets built
//! separately are still distinct objects.

use std::rc::Rc;

use crate::error::AlgebraError;

struct FinInner<T> {
    elems: Vec<T>,
    eq: Rc<dyn Fn(&T, &T) -> bool>,
    label: Option<String>,
}

/// A finite set: stable enumeration order, no duplicates, explicit
/// equality.
///
/// # Example
///
/// ```rust
/// use finstoch_algebra::Fin;
///
/// let coin = Fin::new(vec!["heads", "tails"]).unwrap().with_label("coin");
/// assert_eq!(coin.len(), 2);
/// assert_eq!(coin.index_of(&"tails"), Some(1));
/// assert!(coin.same_object(&coin.clone()));
/// ```
pub struct Fin<T> {
    inner: Rc<FinInner<T>>,
}

impl<T> Clone for Fin<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> std::fmt::Debug for Fin<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.inner.label {
            Some(l) => write!(f, "Fin({})", l),
            None => write!(f, "Fin({} elements)", self.inner.elems.len()),
        }
    }
}

impl<T: Clone + 'static> Fin<T> {
    /// Build a finite set using the element type's own equality.
    ///
    /// # Errors
    ///
    /// Fails if the enumeration contains a repeated element.
    pub fn new(elems: Vec<T>) -> Result<Self, AlgebraError>
    where
        T: PartialEq,
    {
        Self::with_eq(elems, |a, b| a == b)
    }

    /// Build a finite set with a caller-supplied equality predicate.
    ///
    /// The predicate must be reflexive, symmetric, and transitive over
    /// every element the system produces.
    pub fn with_eq(elems: Vec<T>, eq: impl Fn(&T, &T) -> bool + 'static) -> Result<Self, AlgebraError> {
        for i in 1..elems.len() {
            if elems[..i].iter().any(|e| eq(e, &elems[i])) {
                return Err(AlgebraError::DuplicateElement {
                    index: i,
                    fin: format!("Fin of {} elements", elems.len()),
                });
            }
        }
        Ok(Self {
            inner: Rc::new(FinInner {
                elems,
                eq: Rc::new(eq),
                label: None,
            }),
        })
    }

    /// Attach a diagnostic label. This builds a *new* object — label
    /// before wiring the set into morphisms, not after.
    pub fn with_label(&self, label: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(FinInner {
                elems: self.inner.elems.clone(),
                eq: Rc::clone(&self.inner.eq),
                label: Some(label.into()),
            }),
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.inner.elems.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.elems.is_empty()
    }

    /// The elements, in enumeration order.
    pub fn elems(&self) -> &[T] {
        &self.inner.elems
    }

    /// Element at a position, if in range.
    pub fn get(&self, i: usize) -> Option<&T> {
        self.inner.elems.get(i)
    }

    /// Position of an element under this set's equality.
    pub fn index_of(&self, x: &T) -> Option<usize> {
        self.inner.elems.iter().position(|e| (self.inner.eq)(e, x))
    }

    /// Whether the set contains an element.
    pub fn contains(&self, x: &T) -> bool {
        self.index_of(x).is_some()
    }

    /// This set's equality predicate applied to two values.
    pub fn eq_elems(&self, a: &T, b: &T) -> bool {
        (self.inner.eq)(a, b)
    }

    /// Pointer identity: whether two handles name the same object.
    pub fn same_object(&self, other: &Fin<T>) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Diagnostic name: the label if set, otherwise the cardinality.
    pub fn describe(&self) -> String {
        match &self.inner.label {
            Some(l) => l.clone(),
            None => format!("{} elements", self.len()),
        }
    }

    /// The tensor object `A ⊗ B`: ordered pairs, componentwise equality.
    ///
    /// Each call builds a fresh object; compose only against the object
    /// you actually wired.
    pub fn pair<U: Clone + 'static>(a: &Fin<T>, b: &Fin<U>) -> Fin<(T, U)> {
        let mut elems = Vec::with_capacity(a.len() * b.len());
        for x in a.elems() {
            for y in b.elems() {
                elems.push((x.clone(), y.clone()));
            }
        }
        let (fa, fb) = (a.clone(), b.clone());
        Fin {
            inner: Rc::new(FinInner {
                elems,
                eq: Rc::new(move |p: &(T, U), q: &(T, U)| {
                    fa.eq_elems(&p.0, &q.0) && fb.eq_elems(&p.1, &q.1)
                }),
                label: Some(format!("{} * {}", a.describe(), b.describe())),
            }),
        }
    }

    /// The product object over a list of components: elements are
    /// `Vec`s of one coordinate per component, componentwise equality.
    ///
    /// An empty component list yields the singleton of the empty
    /// configuration.
    pub fn product(components: &[Fin<T>]) -> Fin<Vec<T>> {
        let mut elems: Vec<Vec<T>> = vec![Vec::new()];
        for c in components {
            let mut next = Vec::with_capacity(elems.len() * c.len());
            for prefix in &elems {
                for x in c.elems() {
                    let mut row = prefix.clone();
                    row.push(x.clone());
                    next.push(row);
                }
            }
            elems = next;
        }
        let comps: Vec<Fin<T>> = components.to_vec();
        Fin {
            inner: Rc::new(FinInner {
                elems,
                eq: Rc::new(move |p: &Vec<T>, q: &Vec<T>| {
                    p.len() == q.len()
                        && p.len() == comps.len()
                        && comps
                            .iter()
                            .zip(p.iter().zip(q.iter()))
                            .all(|(c, (x, y))| c.eq_elems(x, y))
                }),
                label: Some(format!("product of {} components", components.len())),
            }),
        }
    }

    /// The n-fold power `X^n` of a single base set.
    pub fn power(base: &Fin<T>, n: usize) -> Fin<Vec<T>> {
        Self::product(&vec![base.clone(); n])
    }
}

impl Fin<()> {
    /// The terminal object: the one-element set.
    pub fn unit() -> Fin<()> {
        Fin {
            inner: Rc::new(FinInner {
                elems: vec![()],
                eq: Rc::new(|_: &(), _: &()| true),
                label: Some("unit".to_string()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicates() {
        let result = Fin::new(vec![1, 2, 2, 3]);
        assert!(matches!(
            result,
            Err(AlgebraError::DuplicateElement { index: 2, .. })
        ));
    }

    #[test]
    fn enumeration_order_is_stable() {
        let f = Fin::new(vec!["c", "a", "b"]).unwrap();
        assert_eq!(f.elems(), &["c", "a", "b"]);
        assert_eq!(f.index_of(&"a"), Some(1));
        assert_eq!(f.index_of(&"z"), None);
    }

    #[test]
    fn custom_equality() {
        // Case-insensitive strings.
        let f = Fin::with_eq(vec!["Ok", "Inspect"], |a: &&str, b: &&str| {
            a.eq_ignore_ascii_case(b)
        })
        .unwrap();
        assert_eq!(f.index_of(&"OK"), Some(0));
        assert!(Fin::with_eq(vec!["Ok", "ok"], |a: &&str, b: &&str| {
            a.eq_ignore_ascii_case(b)
        })
        .is_err());
    }

    #[test]
    fn same_object_is_identity_not_structure() {
        let a = Fin::new(vec![0, 1]).unwrap();
        let b = Fin::new(vec![0, 1]).unwrap();
        assert!(a.same_object(&a.clone()));
        assert!(!a.same_object(&b));
    }

    #[test]
    fn pair_enumerates_in_row_major_order() {
        let a = Fin::new(vec![0, 1]).unwrap();
        let b = Fin::new(vec!["x", "y"]).unwrap();
        let p = Fin::pair(&a, &b);
        assert_eq!(p.elems(), &[(0, "x"), (0, "y"), (1, "x"), (1, "y")]);
        assert_eq!(p.index_of(&(1, "x")), Some(2));
    }

    #[test]
    fn product_and_power() {
        let bit = Fin::new(vec![0u8, 1]).unwrap();
        let cube = Fin::power(&bit, 3);
        assert_eq!(cube.len(), 8);
        assert_eq!(cube.elems()[0], vec![0, 0, 0]);
        assert_eq!(cube.elems()[7], vec![1, 1, 1]);
        assert_eq!(cube.index_of(&vec![1, 0, 1]), Some(5));

        let empty: Fin<Vec<u8>> = Fin::product(&[]);
        assert_eq!(empty.len(), 1);
        assert_eq!(empty.elems()[0], Vec::<u8>::new());
    }

    #[test]
    fn debug_shows_label_or_cardinality() {
        let plain = Fin::new(vec![0, 1, 2]).unwrap();
        assert_eq!(format!("{:?}", plain), "Fin(3 elements)");
        let labelled = plain.with_label("die");
        assert_eq!(format!("{:?}", labelled), "Fin(die)");
    }

    #[test]
    fn unit_is_a_singleton() {
        let u = Fin::unit();
        assert_eq!(u.len(), 1);
        assert_eq!(u.index_of(&()), Some(0));
    }
}
