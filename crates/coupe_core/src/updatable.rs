/*
    Coupe

    Copyright 2022-2025 Daniel Balsom

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    --------------------------------------------------------------------------

    coupe_core::updatable.rs
*/
//! A value wrapper that remembers whether it has changed since a debug display last looked.

use std::ops::Deref;

#[derive(Clone, Debug, Default)]
pub struct Updatable<T> {
    val:   T,
    dirty: bool,
}

impl<T> Updatable<T> {
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
    #[inline]
    pub fn clean(&mut self) {
        self.dirty = false;
    }
    #[inline]
    pub fn get(&self) -> &T {
        &self.val
    }
}

impl<T: PartialEq> Updatable<T> {
    pub fn new(val: T) -> Self {
        Updatable { val, dirty: false }
    }
    /// Store a value, marking dirty only if it differs from the current one.
    #[inline]
    pub fn update(&mut self, newval: T) {
        if self.val != newval {
            self.val = newval;
            self.dirty = true;
        }
    }
    /// Store a value and always mark dirty. Repeated identical port accesses are still events.
    #[inline]
    pub fn set(&mut self, newval: T) {
        self.val = newval;
        self.dirty = true;
    }
}

impl<T: Copy> Updatable<T> {
    /// Return the value and whether it was dirty, clearing the flag.
    pub fn take(&mut self) -> (T, bool) {
        let dirty = self.dirty;
        self.dirty = false;
        (self.val, dirty)
    }
}

impl<T> Deref for Updatable<T> {
    type Target = T;
    #[inline]
    fn deref(&self) -> &T {
        &self.val
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_only_dirties_on_change() {
        let mut u = Updatable::new(5u8);
        u.update(5);
        assert!(!u.is_dirty());
        u.update(6);
        assert!(u.is_dirty());
        assert_eq!(u.take(), (6, true));
        assert!(!u.is_dirty());
        u.set(6);
        assert!(u.is_dirty());
    }
}
