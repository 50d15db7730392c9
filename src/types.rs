use serde::de::Error as _;
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CutError;

/// A required cut length and how many pieces of it are still owed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceType {
    pub length: u32,
    pub quantity: u32,
}

impl PieceType {
    pub fn new(length: u32, quantity: u32) -> Self {
        Self { length, quantity }
    }

    pub fn is_available(&self) -> bool {
        self.quantity > 0
    }

    pub fn fits_in(&self, bar_length: u32) -> bool {
        self.length <= bar_length
    }
}

impl std::fmt::Display for PieceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.length, self.quantity)
    }
}

impl Serialize for PieceType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.length, self.quantity).serialize(serializer)
    }
}

/// Piece types keyed by length, kept sorted longest first.
///
/// Entries whose quantity reached zero stay in place; selection code skips
/// them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    pieces: Vec<PieceType>,
}

impl Inventory {
    /// Builds an inventory, merging entries that share a length.
    pub fn new(pieces: impl IntoIterator<Item = PieceType>) -> Self {
        let mut merged: Vec<PieceType> = Vec::new();
        for piece in pieces {
            match merged.iter_mut().find(|p| p.length == piece.length) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(piece.quantity)
                }
                None => merged.push(piece),
            }
        }
        let mut inventory = Self { pieces: merged };
        inventory.sort_descending();
        inventory
    }

    /// Validates raw `(length, quantity)` pairs as received from a client.
    pub fn from_pairs(pairs: &[(i64, i64)]) -> Result<Self, CutError> {
        let pieces = pairs
            .iter()
            .map(|&(length, quantity)| {
                if length <= 0 {
                    return Err(CutError::invalid(format!(
                        "piece length must be positive, got {length}"
                    )));
                }
                if quantity < 0 {
                    return Err(CutError::invalid(format!(
                        "quantity must not be negative, got {quantity} for length {length}"
                    )));
                }
                let length = u32::try_from(length).map_err(|_| {
                    CutError::invalid(format!("piece length {length} is too large"))
                })?;
                let quantity = u32::try_from(quantity).map_err(|_| {
                    CutError::invalid(format!("quantity {quantity} is too large"))
                })?;
                Ok(PieceType::new(length, quantity))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut merged: Vec<PieceType> = Vec::with_capacity(pieces.len());
        for piece in pieces {
            match merged.iter_mut().find(|p| p.length == piece.length) {
                Some(existing) => {
                    existing.quantity =
                        existing.quantity.checked_add(piece.quantity).ok_or_else(|| {
                            CutError::invalid(format!(
                                "total quantity for length {} is too large",
                                piece.length
                            ))
                        })?
                }
                None => merged.push(piece),
            }
        }
        Ok(Self::new(merged))
    }

    pub fn pieces(&self) -> &[PieceType] {
        &self.pieces
    }

    pub fn sort_descending(&mut self) {
        self.pieces.sort_by(|a, b| b.length.cmp(&a.length));
    }

    pub fn total_quantity(&self) -> u64 {
        self.pieces.iter().map(|p| p.quantity as u64).sum()
    }

    pub fn is_exhausted(&self) -> bool {
        self.pieces.iter().all(|p| !p.is_available())
    }

    /// The longest piece type still owed that can be cut from a bar at all.
    ///
    /// Returns its index into [`Inventory::pieces`].
    pub fn largest_available(&self, bar_length: u32) -> Option<usize> {
        self.pieces
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_available() && p.fits_in(bar_length))
            .max_by_key(|(_, p)| p.length)
            .map(|(i, _)| i)
    }

    /// Returns a copy with `counts[i]` pieces removed from entry `i`.
    pub fn take(&self, counts: &[u32]) -> Self {
        debug_assert_eq!(counts.len(), self.pieces.len());
        let pieces = self
            .pieces
            .iter()
            .zip(counts)
            .map(|(p, &n)| {
                debug_assert!(n <= p.quantity, "took {n} of {p}");
                PieceType::new(p.length, p.quantity - n)
            })
            .collect();
        Self { pieces }
    }

    /// Entries with a positive quantity, in inventory order.
    pub fn remaining(&self) -> Self {
        Self {
            pieces: self
                .pieces
                .iter()
                .copied()
                .filter(PieceType::is_available)
                .collect(),
        }
    }
}

impl Serialize for Inventory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.pieces.len()))?;
        for piece in &self.pieces {
            seq.serialize_element(piece)?;
        }
        seq.end()
    }
}

pub fn validate_bar_length(bar_length: i64) -> Result<u32, CutError> {
    if bar_length <= 0 {
        return Err(CutError::invalid(format!(
            "bar_length must be positive, got {bar_length}"
        )));
    }
    u32::try_from(bar_length)
        .map_err(|_| CutError::invalid(format!("bar_length {bar_length} is too large")))
}

/// The pieces cut from one stock bar, longest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BarCut {
    pub pieces: Vec<u32>,
    pub waste: u32,
}

impl BarCut {
    pub fn used_length(&self) -> u64 {
        self.pieces.iter().map(|&l| l as u64).sum()
    }

    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlanMetrics {
    pub total_waste: u64,
    pub total_pieces_cut: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CuttingPlan {
    pub bar_length: u32,
    pub bars: Vec<BarCut>,
    pub metrics: PlanMetrics,
    /// Pieces still owed when no further bar could be cut.
    pub leftover: Inventory,
}

impl CuttingPlan {
    pub fn bar_count(&self) -> usize {
        self.bars.len()
    }
}

/// One `[length, quantity]` pair as sent by a client.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct RawPiece(
    #[serde(deserialize_with = "deserialize_i64_from_number")] pub i64,
    #[serde(deserialize_with = "deserialize_i64_from_number")] pub i64,
);

/// Accepts integers as well as integral floats such as `1200.0`.
pub fn deserialize_i64_from_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Int(i64),
        Float(f64),
    }

    match Number::deserialize(deserializer)? {
        Number::Int(n) => Ok(n),
        Number::Float(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 => {
            Ok(f as i64)
        }
        Number::Float(f) => Err(D::Error::custom(format!("expected an integer, got {f}"))),
    }
}
