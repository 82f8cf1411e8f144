//! Proximity databases answering "which agents are within `radius` of this
//! point". Agents hold a [`ProximityToken`] and re-register each time they move.

use alloc::vec::Vec;

use crate::agent::AgentId;
use crate::error::{positive_finite, ConfigError};
use crate::vec3::{floor, Vec3};

const INVALID_INDEX: usize = usize::MAX;

/// Upper bound on the number of grid bins, outside bin excluded.
pub const MAX_GRID_BINS: usize = 1 << 20;

/// An agent's registration in a proximity database.
///
/// Deliberately not `Clone`: releasing consumes the token, so a released
/// slot can never be updated through a stale copy.
#[derive(Debug, PartialEq, Eq)]
pub struct ProximityToken(usize);

impl ProximityToken {
    pub fn new(slot: usize) -> Self {
        Self(slot)
    }

    pub fn slot(&self) -> usize {
        self.0
    }
}

pub trait ProximityDatabase {
    /// Registers `id` without a position. It is not found by queries until
    /// its first `update_for_new_position`.
    fn allocate_token(&mut self, id: AgentId) -> ProximityToken;

    fn release_token(&mut self, token: ProximityToken);

    fn update_for_new_position(&mut self, token: &ProximityToken, position: Vec3);

    /// Appends every registered agent strictly within `radius` of `center`
    /// to `out`, including an agent registered at `center` itself.
    fn find_neighbors(&self, center: Vec3, radius: f32, out: &mut Vec<AgentId>);

    /// Number of live tokens.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone)]
struct Slot {
    id: Option<AgentId>,
    position: Option<Vec3>,
}

/// Linear scan over every registered agent. Fine for tens of agents.
#[derive(Debug, Clone, Default)]
pub struct BruteForceDatabase {
    slots: Vec<Slot>,
    free: Vec<usize>,
}

impl BruteForceDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProximityDatabase for BruteForceDatabase {
    fn allocate_token(&mut self, id: AgentId) -> ProximityToken {
        let slot = Slot {
            id: Some(id),
            position: None,
        };
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = slot;
                ProximityToken(index)
            }
            None => {
                self.slots.push(slot);
                ProximityToken(self.slots.len() - 1)
            }
        }
    }

    fn release_token(&mut self, token: ProximityToken) {
        if let Some(slot) = self.slots.get_mut(token.0) {
            if slot.id.take().is_some() {
                slot.position = None;
                self.free.push(token.0);
            }
        }
    }

    fn update_for_new_position(&mut self, token: &ProximityToken, position: Vec3) {
        if let Some(slot) = self.slots.get_mut(token.0) {
            if slot.id.is_some() {
                slot.position = Some(position);
            }
        }
    }

    fn find_neighbors(&self, center: Vec3, radius: f32, out: &mut Vec<AgentId>) {
        let radius_sq = radius * radius;
        for slot in &self.slots {
            if let (Some(id), Some(position)) = (slot.id, slot.position) {
                if position.distance_squared(&center) < radius_sq {
                    out.push(id);
                }
            }
        }
    }

    fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }
}

#[derive(Debug, Clone)]
struct GridEntry {
    id: Option<AgentId>,
    position: Vec3,
    bin: usize,
    prev: usize,
    next: usize,
}

/// Locality grid: an axis-aligned box split into bins, each bin an intrusive
/// doubly linked list of entries. Positions outside the box go to one extra
/// "outside" bin, scanned whenever a query box leaves the grid.
#[derive(Debug, Clone)]
pub struct LocalityGrid {
    origin: Vec3,
    dimensions: Vec3,
    divisions: [usize; 3],
    /// One head per bin; the last one is the outside bin.
    head: Vec<usize>,
    entries: Vec<GridEntry>,
    free: Vec<usize>,
}

impl LocalityGrid {
    /// Grid centered on `center` spanning `dimensions`, split into
    /// `divisions` bins along x, y and z.
    pub fn new(center: Vec3, dimensions: Vec3, divisions: [usize; 3]) -> Result<Self, ConfigError> {
        if !(positive_finite(dimensions.x)
            && positive_finite(dimensions.y)
            && positive_finite(dimensions.z))
        {
            return Err(ConfigError::GridDimensions);
        }
        let bins = divisions
            .iter()
            .try_fold(1usize, |acc, &d| if d == 0 { None } else { acc.checked_mul(d) })
            .filter(|&bins| bins <= MAX_GRID_BINS)
            .map(|bins| bins + 1)
            .ok_or(ConfigError::GridDivisions)?;

        Ok(Self {
            origin: center - dimensions * 0.5,
            dimensions,
            divisions,
            head: alloc::vec![INVALID_INDEX; bins],
            entries: Vec::new(),
            free: Vec::new(),
        })
    }

    fn outside_bin(&self) -> usize {
        self.head.len() - 1
    }

    fn cell_coords(&self, position: Vec3) -> [isize; 3] {
        let p = [position.x, position.y, position.z];
        let o = [self.origin.x, self.origin.y, self.origin.z];
        let d = [self.dimensions.x, self.dimensions.y, self.dimensions.z];
        let mut cell = [0isize; 3];
        for axis in 0..3 {
            cell[axis] = floor((p[axis] - o[axis]) / d[axis] * self.divisions[axis] as f32) as isize;
        }
        cell
    }

    fn bin_index(&self, ix: usize, iy: usize, iz: usize) -> usize {
        (ix * self.divisions[1] + iy) * self.divisions[2] + iz
    }

    fn bin_for(&self, position: Vec3) -> usize {
        let cell = self.cell_coords(position);
        let inside = (0..3).all(|axis| cell[axis] >= 0 && (cell[axis] as usize) < self.divisions[axis]);
        if inside {
            self.bin_index(cell[0] as usize, cell[1] as usize, cell[2] as usize)
        } else {
            self.outside_bin()
        }
    }

    fn link(&mut self, slot: usize, bin: usize) {
        let old_head = self.head[bin];
        if old_head != INVALID_INDEX {
            self.entries[old_head].prev = slot;
        }
        let entry = &mut self.entries[slot];
        entry.bin = bin;
        entry.prev = INVALID_INDEX;
        entry.next = old_head;
        self.head[bin] = slot;
    }

    fn unlink(&mut self, slot: usize) {
        let (bin, prev, next) = {
            let entry = &self.entries[slot];
            (entry.bin, entry.prev, entry.next)
        };
        if bin == INVALID_INDEX {
            return;
        }
        if prev == INVALID_INDEX {
            self.head[bin] = next;
        } else {
            self.entries[prev].next = next;
        }
        if next != INVALID_INDEX {
            self.entries[next].prev = prev;
        }
        let entry = &mut self.entries[slot];
        entry.bin = INVALID_INDEX;
        entry.prev = INVALID_INDEX;
        entry.next = INVALID_INDEX;
    }

    fn scan_bin(&self, bin: usize, center: Vec3, radius_sq: f32, out: &mut Vec<AgentId>) {
        let mut candidate = self.head[bin];
        while candidate != INVALID_INDEX {
            let entry = &self.entries[candidate];
            if let Some(id) = entry.id {
                if entry.position.distance_squared(&center) < radius_sq {
                    out.push(id);
                }
            }
            candidate = entry.next;
        }
    }

    fn is_live(&self, slot: usize) -> bool {
        self.entries.get(slot).is_some_and(|entry| entry.id.is_some())
    }
}

impl ProximityDatabase for LocalityGrid {
    fn allocate_token(&mut self, id: AgentId) -> ProximityToken {
        let entry = GridEntry {
            id: Some(id),
            position: Vec3::ZERO,
            bin: INVALID_INDEX,
            prev: INVALID_INDEX,
            next: INVALID_INDEX,
        };
        match self.free.pop() {
            Some(slot) => {
                self.entries[slot] = entry;
                ProximityToken(slot)
            }
            None => {
                self.entries.push(entry);
                ProximityToken(self.entries.len() - 1)
            }
        }
    }

    fn release_token(&mut self, token: ProximityToken) {
        if !self.is_live(token.0) {
            return;
        }
        self.unlink(token.0);
        self.entries[token.0].id = None;
        self.free.push(token.0);
    }

    fn update_for_new_position(&mut self, token: &ProximityToken, position: Vec3) {
        if !self.is_live(token.0) {
            return;
        }
        let bin = self.bin_for(position);
        self.entries[token.0].position = position;
        if self.entries[token.0].bin != bin {
            self.unlink(token.0);
            self.link(token.0, bin);
        }
    }

    fn find_neighbors(&self, center: Vec3, radius: f32, out: &mut Vec<AgentId>) {
        let radius = radius.max(0.0);
        let radius_sq = radius * radius;
        let extent = Vec3::new(radius, radius, radius);
        let lo = self.cell_coords(center - extent);
        let hi = self.cell_coords(center + extent);

        let mut partly_out = false;
        let mut disjoint = false;
        let mut range = [(0usize, 0usize); 3];
        for axis in 0..3 {
            let max_cell = self.divisions[axis] as isize - 1;
            if lo[axis] < 0 || hi[axis] > max_cell {
                partly_out = true;
            }
            let first = lo[axis].max(0);
            let last = hi[axis].min(max_cell);
            if first > last {
                disjoint = true;
            } else {
                range[axis] = (first as usize, last as usize);
            }
        }

        if !disjoint {
            for ix in range[0].0..=range[0].1 {
                for iy in range[1].0..=range[1].1 {
                    for iz in range[2].0..=range[2].1 {
                        self.scan_bin(self.bin_index(ix, iy, iz), center, radius_sq, out);
                    }
                }
            }
        }
        if partly_out {
            self.scan_bin(self.outside_bin(), center, radius_sq, out);
        }
    }

    fn len(&self) -> usize {
        self.entries.len() - self.free.len()
    }
}
