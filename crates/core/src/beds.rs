//! Ward bed pool.
//!
//! Beds are numbered from 0. The pool only records occupancy; which patient holds a bed lives
//! on the [`Patient`](crate::patient::Patient) record, and the registry keeps the two in step.

use crate::patient::Patient;
use crate::{RegistryError, RegistryResult};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct BedNumber(usize);

impl BedNumber {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for BedNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BedNumber {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<usize>()
            .map(Self)
            .map_err(|_| RegistryError::InvalidInput(format!("invalid bed number '{s}'")))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BedPool {
    occupied: Vec<bool>,
}

impl BedPool {
    /// Creates a pool of `bed_count` free beds.
    pub fn new(bed_count: usize) -> Self {
        Self {
            occupied: vec![false; bed_count],
        }
    }

    /// Rebuilds occupancy from the beds held by admitted patients.
    ///
    /// # Errors
    ///
    /// Fails if a patient references a bed outside the pool or two patients reference the
    /// same bed.
    pub fn from_patients(bed_count: usize, patients: &[Patient]) -> RegistryResult<Self> {
        let mut pool = Self::new(bed_count);
        for bed in patients.iter().filter_map(Patient::bed_number) {
            pool.occupy(bed)?;
        }
        Ok(pool)
    }

    pub fn len(&self) -> usize {
        self.occupied.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occupied.is_empty()
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied.iter().filter(|taken| **taken).count()
    }

    /// Lowest-numbered free bed.
    pub fn find_available(&self) -> Option<BedNumber> {
        self.occupied
            .iter()
            .position(|taken| !taken)
            .map(BedNumber)
    }

    /// Whether `bed` exists and is free.
    pub fn is_available(&self, bed: BedNumber) -> bool {
        matches!(self.occupied.get(bed.0), Some(false))
    }

    pub fn occupy(&mut self, bed: BedNumber) -> RegistryResult<()> {
        let bed_count = self.len();
        let slot = self
            .occupied
            .get_mut(bed.0)
            .ok_or(RegistryError::BedOutOfRange { bed, bed_count })?;
        if *slot {
            return Err(RegistryError::BedOccupied(bed));
        }
        *slot = true;
        Ok(())
    }

    /// Frees `bed`. Releasing a bed that is already free is a no-op.
    pub fn release(&mut self, bed: BedNumber) -> RegistryResult<()> {
        let bed_count = self.len();
        let slot = self
            .occupied
            .get_mut(bed.0)
            .ok_or(RegistryError::BedOutOfRange { bed, bed_count })?;
        *slot = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patient::PatientId;

    #[test]
    fn finds_lowest_free_bed() {
        let mut pool = BedPool::new(3);
        assert_eq!(pool.find_available(), Some(BedNumber::new(0)));

        pool.occupy(BedNumber::new(0)).unwrap();
        pool.occupy(BedNumber::new(2)).unwrap();
        assert_eq!(pool.find_available(), Some(BedNumber::new(1)));

        pool.occupy(BedNumber::new(1)).unwrap();
        assert_eq!(pool.find_available(), None);
        assert_eq!(pool.occupied_count(), 3);
    }

    #[test]
    fn double_occupancy_is_rejected() {
        let mut pool = BedPool::new(2);
        pool.occupy(BedNumber::new(1)).unwrap();
        assert!(matches!(
            pool.occupy(BedNumber::new(1)),
            Err(RegistryError::BedOccupied(bed)) if bed == BedNumber::new(1)
        ));
    }

    #[test]
    fn out_of_range_bed_is_rejected() {
        let mut pool = BedPool::new(2);
        assert!(!pool.is_available(BedNumber::new(5)));
        assert!(matches!(
            pool.occupy(BedNumber::new(5)),
            Err(RegistryError::BedOutOfRange { bed_count: 2, .. })
        ));
        assert!(pool.release(BedNumber::new(5)).is_err());
    }

    #[test]
    fn release_frees_the_slot() {
        let mut pool = BedPool::new(2);
        pool.occupy(BedNumber::new(0)).unwrap();
        pool.release(BedNumber::new(0)).unwrap();
        assert!(pool.is_available(BedNumber::new(0)));
        assert_eq!(pool.occupied_count(), 0);
    }

    #[test]
    fn rebuilds_from_admitted_patients() {
        let mut a = Patient::new(PatientId::new(1), "A", 40, "M", "");
        let b = Patient::new(PatientId::new(2), "B", 41, "F", "");
        let mut c = Patient::new(PatientId::new(3), "C", 42, "F", "");
        a.admit(BedNumber::new(1)).unwrap();
        c.admit(BedNumber::new(3)).unwrap();

        let pool = BedPool::from_patients(4, &[a.clone(), b, c]).unwrap();
        assert_eq!(pool.occupied_count(), 2);
        assert_eq!(pool.find_available(), Some(BedNumber::new(0)));

        let mut clash = Patient::new(PatientId::new(4), "D", 43, "M", "");
        clash.admit(BedNumber::new(1)).unwrap();
        assert!(matches!(
            BedPool::from_patients(4, &[a, clash]),
            Err(RegistryError::BedOccupied(_))
        ));
    }
}
