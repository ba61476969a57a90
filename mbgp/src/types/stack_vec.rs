/// A list of at most `N` copyable values stored inline, used for the species
/// shared by two environments inside kernel loops.
pub struct StackVec<T: Copy + Default, const N: usize> {
    len: usize,
    data: [T; N],
}

impl<T: Copy + Default, const N: usize> StackVec<T, N> {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        StackVec {
            len: 0,
            data: [T::default(); N],
        }
    }

    /// Add an element at the end of this `StackVec`
    ///
    /// # Panics
    ///
    /// If the `StackVec` already contains `N` elements
    pub fn push(&mut self, value: T) {
        assert!(self.len < N, "StackVec is full");
        self.data[self.len] = value;
        self.len += 1;
    }
}

impl<T: Copy + Default, const N: usize> std::ops::Deref for StackVec<T, N> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.data[..self.len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push() {
        let mut vec = StackVec::<(usize, usize), 4>::new();
        assert!(vec.is_empty());

        vec.push((0, 3));
        vec.push((2, 1));
        assert_eq!(&*vec, &[(0, 3), (2, 1)]);
    }

    #[test]
    #[should_panic(expected = "StackVec is full")]
    fn overflow() {
        let mut vec = StackVec::<i32, 2>::new();
        vec.push(1);
        vec.push(2);
        vec.push(3);
    }
}
