//! Dense demand counters indexed by (day class, time bucket, zone).

use crate::calendar::DayClass;

/// Pickup and dropoff counts (or per-day averages) for one cell.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DemandCell {
    pub pickups: f64,
    pub dropoffs: f64,
}

impl DemandCell {
    /// Net demand: pickups minus half the dropoffs.
    pub fn net(&self) -> f64 {
        self.pickups - 0.5 * self.dropoffs
    }
}

/// A fully populated `(day class, bucket, zone)` table.
///
/// Buckets are time slots or hours depending on the table.
#[derive(Debug, Clone, PartialEq)]
pub struct DemandTable {
    buckets: usize,
    zones: usize,
    cells: Vec<DemandCell>,
}

impl DemandTable {
    pub fn new(buckets: usize, zones: usize) -> Self {
        Self {
            buckets,
            zones,
            cells: vec![DemandCell::default(); DayClass::ALL.len() * buckets * zones],
        }
    }

    pub fn buckets(&self) -> usize {
        self.buckets
    }

    pub fn zones(&self) -> usize {
        self.zones
    }

    fn offset(&self, day: DayClass, bucket: usize, zone: usize) -> usize {
        (day.index() * self.buckets + bucket) * self.zones + zone
    }

    /// Cell at the given coordinates; out-of-range buckets or zones read as zero.
    pub fn get(&self, day: DayClass, bucket: usize, zone: usize) -> DemandCell {
        if bucket >= self.buckets || zone >= self.zones {
            return DemandCell::default();
        }
        self.cells[self.offset(day, bucket, zone)]
    }

    pub fn add_pickup(&mut self, day: DayClass, bucket: usize, zone: usize) {
        if bucket < self.buckets && zone < self.zones {
            let offset = self.offset(day, bucket, zone);
            self.cells[offset].pickups += 1.0;
        }
    }

    pub fn add_dropoff(&mut self, day: DayClass, bucket: usize, zone: usize) {
        if bucket < self.buckets && zone < self.zones {
            let offset = self.offset(day, bucket, zone);
            self.cells[offset].dropoffs += 1.0;
        }
    }

    /// Divide every cell of a day class by `days`. Zero days leaves the cells untouched.
    pub fn average_over(&mut self, day: DayClass, days: usize) {
        if days == 0 {
            return;
        }
        let divisor = days as f64;
        let start = self.offset(day, 0, 0);
        let end = start + self.buckets * self.zones;
        for cell in &mut self.cells[start..end] {
            cell.pickups /= divisor;
            cell.dropoffs /= divisor;
        }
    }
}
