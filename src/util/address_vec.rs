use std::fmt::{Debug, Error, Formatter};
use std::iter::{DoubleEndedIterator, Enumerate, FromIterator};
use std::ops::{Add, Sub};
use std::result::Result;
use std::slice::Iter;
use std::vec::IntoIter as VecIntoIter;

/// Elements with a width measured in 16-bit code units (eg. when used in an `AddressVec`)
pub trait Width {
    fn width(&self) -> usize;
}

/// Address of an instruction, in 16-bit code units from the start of the method body
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub struct CodeAddress(pub usize);

impl CodeAddress {
    /// Entry point of every method
    pub const ENTRY: CodeAddress = CodeAddress(0);

    /// Apply a signed branch offset (relative to this address)
    ///
    /// Returns `None` if the target would land before the start of the method.
    pub fn offset_by(self, offset: i32) -> Option<CodeAddress> {
        let target = self.0 as i64 + offset as i64;
        usize::try_from(target).ok().map(CodeAddress)
    }
}

impl Add<usize> for CodeAddress {
    type Output = CodeAddress;

    fn add(self, width: usize) -> CodeAddress {
        CodeAddress(self.0 + width)
    }
}

impl Sub for CodeAddress {
    type Output = isize;

    fn sub(self, other: CodeAddress) -> isize {
        (self.0 as isize) - (other.0 as isize)
    }
}

impl Debug for CodeAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "@{}", self.0)
    }
}

/// A vector of elements of different widths, where every element is keyed by the sum of the
/// widths of the elements before it.
///
/// This is the shape of a method body: instructions take one to five code units (payloads take
/// even more) and branches refer to their targets by code address rather than by index.
#[derive(Clone)]
pub struct AddressVec<T: Sized> {
    /// Entries, along with their address
    entries: Vec<(CodeAddress, T)>,

    /// Address of the next element to be added
    next_address: CodeAddress,
}

impl<T: Sized + Width> AddressVec<T> {
    /// New empty vector
    pub fn new() -> AddressVec<T> {
        AddressVec {
            entries: vec![],
            next_address: CodeAddress::ENTRY,
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Address at which the next element will be placed
    pub fn next_address(&self) -> CodeAddress {
        self.next_address
    }

    /// Add an entry to the back
    pub fn push(&mut self, elem: T) -> CodeAddress {
        let address = self.next_address;
        self.next_address.0 += elem.width();
        self.entries.push((address, elem));

        address
    }

    /// Add an entry at an explicit address
    ///
    /// The address must be exactly the one `push` would have chosen, otherwise the entry is
    /// handed back along with the expected address.
    pub fn push_at(&mut self, address: CodeAddress, elem: T) -> Result<(), (CodeAddress, T)> {
        if address == self.next_address {
            self.push(elem);
            Ok(())
        } else {
            Err((self.next_address, elem))
        }
    }

    /// Get an entry (and its index) by its address
    ///
    /// Note: this uses binary search to find the address
    pub fn get_address(&self, address: CodeAddress) -> AddressResult<T> {
        match self.entries.binary_search_by_key(&address, |(addr, _)| *addr) {
            Err(insert_at) if insert_at == self.entries.len() => AddressResult::TooLarge,
            Err(insert_at) => AddressResult::Misaligned(insert_at),
            Ok(found_idx) => AddressResult::Ok(found_idx, &self.entries[found_idx].1),
        }
    }

    /// Get an entry (and its address) by its position in the vector
    pub fn get_index(&self, index: usize) -> Option<(CodeAddress, &T)> {
        self.entries.get(index).map(|(address, t)| (*address, t))
    }

    pub fn iter(&self) -> AddressVecIter<'_, T> {
        self.into_iter()
    }
}

impl<A: PartialEq> PartialEq for AddressVec<A> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<A: Eq> Eq for AddressVec<A> {}

impl<A: Width> Default for AddressVec<A> {
    fn default() -> Self {
        AddressVec::new()
    }
}

/// Outcome of looking up an address
pub enum AddressResult<'a, T> {
    /// Element was found
    Ok(usize, &'a T),

    /// Address falls in the middle of the element before this index
    Misaligned(usize),

    /// Address is past the last element
    TooLarge,
}

impl<'a, T> AddressResult<'a, T> {
    /// Convert to an `Option` and keep only the value found
    pub fn ok(&self) -> Option<&'a T> {
        match self {
            AddressResult::Ok(_, found) => Some(found),
            AddressResult::Misaligned(_) | AddressResult::TooLarge => None,
        }
    }
}

/// Iterator for owned `AddressVec`
pub struct AddressVecIntoIter<T>(Enumerate<VecIntoIter<(CodeAddress, T)>>);

impl<T> Iterator for AddressVecIntoIter<T> {
    type Item = (CodeAddress, usize, T);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(idx, (addr, elem))| (addr, idx, elem))
    }
}

impl<T> DoubleEndedIterator for AddressVecIntoIter<T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0
            .next_back()
            .map(|(idx, (addr, elem))| (addr, idx, elem))
    }
}

impl<T> IntoIterator for AddressVec<T> {
    type Item = (CodeAddress, usize, T);
    type IntoIter = AddressVecIntoIter<T>;

    fn into_iter(self) -> AddressVecIntoIter<T> {
        AddressVecIntoIter(self.entries.into_iter().enumerate())
    }
}

/// Iterator for borrowed `AddressVec`
pub struct AddressVecIter<'a, T>(Enumerate<Iter<'a, (CodeAddress, T)>>);

impl<'a, T> Iterator for AddressVecIter<'a, T> {
    type Item = (CodeAddress, usize, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(idx, (addr, elem))| (*addr, idx, elem))
    }
}

impl<'a, T> DoubleEndedIterator for AddressVecIter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0
            .next_back()
            .map(|(idx, (addr, elem))| (*addr, idx, elem))
    }
}

impl<'a, T> IntoIterator for &'a AddressVec<T> {
    type Item = (CodeAddress, usize, &'a T);
    type IntoIter = AddressVecIter<'a, T>;

    fn into_iter(self) -> AddressVecIter<'a, T> {
        AddressVecIter(self.entries.iter().enumerate())
    }
}

impl<T: Width> FromIterator<T> for AddressVec<T> {
    fn from_iter<A: IntoIterator<Item = T>>(elems: A) -> Self {
        let mut address_vec = AddressVec::new();
        for elem in elems {
            address_vec.push(elem);
        }
        address_vec
    }
}

impl<T: Debug> Debug for AddressVec<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        let mut list = f.debug_list();
        for (addr, elem) in &self.entries {
            list.entry(&format_args!("@{} = {:?}", addr.0, elem));
        }
        list.finish()
    }
}
