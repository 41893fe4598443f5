//! Shared types - piece identifiers, piece kinds and feed constants
//!
//! This crate defines the plain data shared by the feed pipeline and its consumers.
//! It has no dependencies, so the game/render layer can depend on it without
//! pulling in the network stack.
//!
//! # Piece Identifiers
//!
//! The pipeline speaks in raw integers. One integer names one tetromino shape:
//!
//! | Id | Kind |
//! |----|------|
//! | 1 | I |
//! | 2 | J |
//! | 3 | L |
//! | 4 | O |
//! | 5 | S |
//! | 6 | T |
//! | 7 | Z |
//!
//! # Defaults
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `BAG_SIZE` | 7 | Size of the canonical bags |
//! | `MAX_BAG_LEN` | 32 | Capacity of a stack-allocated bag |
//! | `DEFAULT_MAX_DRAWS_PER_BAG` | 10000 | Raw draws before a policy is declared defective |
//! | `DEFAULT_CACHE_LEN` | 20 | Remote cache batch length |
//! | `DEFAULT_BLOCKING_TIMEOUT_SECS` | 3600 | Wait for the remote cache to become ready |
//! | `DEFAULT_HTTP_TIMEOUT_SECS` | 30 | Single HTTP request timeout |
//!
//! # Examples
//!
//! ```
//! use tetromino_feed_types::{PieceKind, PIECE_ID_MAX, PIECE_ID_MIN};
//!
//! let kind = PieceKind::from_id(6).unwrap();
//! assert_eq!(kind, PieceKind::T);
//! assert_eq!(kind.id(), 6);
//!
//! // Parse from string (case-insensitive)
//! assert_eq!(PieceKind::from_str("z"), Some(PieceKind::Z));
//!
//! assert_eq!((PIECE_ID_MIN, PIECE_ID_MAX), (1, 7));
//! ```

/// Raw piece identifier produced by the pipeline.
pub type PieceId = u8;

/// Smallest canonical piece id.
pub const PIECE_ID_MIN: PieceId = 1;

/// Largest canonical piece id.
pub const PIECE_ID_MAX: PieceId = 7;

/// Number of elements in a canonical bag (one per tetromino).
pub const BAG_SIZE: usize = 7;

/// Capacity of a bag. Packing a larger bag fails with `BagTooLarge`.
pub const MAX_BAG_LEN: usize = 32;

/// Raw draws a rejection policy may spend on one bag before failing.
pub const DEFAULT_MAX_DRAWS_PER_BAG: u32 = 10_000;

/// Seed used by the local generator when none is configured.
pub const DEFAULT_SEED: u32 = 9001;

/// Number of integers requested per remote batch.
pub const DEFAULT_CACHE_LEN: usize = 20;

/// How long to wait for the remote cache to produce data.
pub const DEFAULT_BLOCKING_TIMEOUT_SECS: u64 = 3600;

/// How long a single HTTP request may take.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// The seven tetromino piece kinds
///
/// Variants are declared in id order, so `ALL[id - 1]` is the kind for `id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

impl PieceKind {
    /// All kinds in id order.
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::J,
        PieceKind::L,
        PieceKind::O,
        PieceKind::S,
        PieceKind::T,
        PieceKind::Z,
    ];

    /// Map a raw piece id to its kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use tetromino_feed_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_id(1), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_id(4), Some(PieceKind::O));
    /// assert_eq!(PieceKind::from_id(0), None);
    /// assert_eq!(PieceKind::from_id(8), None);
    /// ```
    pub fn from_id(id: PieceId) -> Option<Self> {
        if (PIECE_ID_MIN..=PIECE_ID_MAX).contains(&id) {
            Some(Self::ALL[(id - PIECE_ID_MIN) as usize])
        } else {
            None
        }
    }

    /// Raw piece id of this kind.
    pub fn id(&self) -> PieceId {
        match self {
            PieceKind::I => 1,
            PieceKind::J => 2,
            PieceKind::L => 3,
            PieceKind::O => 4,
            PieceKind::S => 5,
            PieceKind::T => 6,
            PieceKind::Z => 7,
        }
    }

    /// Parse piece kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use tetromino_feed_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_str("i"), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_str("O"), Some(PieceKind::O));
    /// assert_eq!(PieceKind::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "i" => Some(PieceKind::I),
            "j" => Some(PieceKind::J),
            "l" => Some(PieceKind::L),
            "o" => Some(PieceKind::O),
            "s" => Some(PieceKind::S),
            "t" => Some(PieceKind::T),
            "z" => Some(PieceKind::Z),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "i",
            PieceKind::J => "j",
            PieceKind::L => "l",
            PieceKind::O => "o",
            PieceKind::S => "s",
            PieceKind::T => "t",
            PieceKind::Z => "z",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_through_kinds() {
        for id in PIECE_ID_MIN..=PIECE_ID_MAX {
            let kind = PieceKind::from_id(id).unwrap();
            assert_eq!(kind.id(), id);
        }
    }

    #[test]
    fn all_is_in_id_order() {
        for (i, kind) in PieceKind::ALL.iter().enumerate() {
            assert_eq!(kind.id() as usize, i + 1);
        }
    }

    #[test]
    fn defaults_are_consistent() {
        assert_eq!(BAG_SIZE, (PIECE_ID_MAX - PIECE_ID_MIN + 1) as usize);
        assert!(BAG_SIZE <= MAX_BAG_LEN);
        assert_eq!(DEFAULT_CACHE_LEN, 20);
        assert_eq!(DEFAULT_BLOCKING_TIMEOUT_SECS, 3600);
        assert_eq!(DEFAULT_HTTP_TIMEOUT_SECS, 30);
    }
}
