//! Base data types shared across the protocol and world layers.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use bytes::{Buf, BufMut};
use md5::{Digest, Md5};

use crate::codec::{ProtoDecode, ProtoEncode};
use crate::error::ProtoError;

// ---------------------------------------------------------------------------
// Uuid (two big-endian u64 halves)
// ---------------------------------------------------------------------------

/// 128-bit UUID as carried on the wire: sixteen big-endian bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Uuid {
    pub most_significant: u64,
    pub least_significant: u64,
}

impl Uuid {
    pub const ZERO: Self = Self {
        most_significant: 0,
        least_significant: 0,
    };

    pub fn new(most: u64, least: u64) -> Self {
        Self {
            most_significant: most,
            least_significant: least,
        }
    }

    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        let mut most = [0u8; 8];
        let mut least = [0u8; 8];
        most.copy_from_slice(&bytes[..8]);
        least.copy_from_slice(&bytes[8..]);
        Self {
            most_significant: u64::from_be_bytes(most),
            least_significant: u64::from_be_bytes(least),
        }
    }

    pub fn to_bytes(self) -> [u8; 16] {
        let mut b = [0u8; 16];
        b[..8].copy_from_slice(&self.most_significant.to_be_bytes());
        b[8..].copy_from_slice(&self.least_significant.to_be_bytes());
        b
    }

    /// Derive the offline-mode UUID for a username: a name-based (version 3)
    /// UUID over MD5 of `"OfflinePlayer:" + username`, with the IETF variant.
    pub fn offline(username: &str) -> Self {
        let mut hasher = Md5::new();
        hasher.update(b"OfflinePlayer:");
        hasher.update(username.as_bytes());
        let mut bytes: [u8; 16] = hasher.finalize().into();
        bytes[6] = (bytes[6] & 0x0F) | 0x30; // version 3
        bytes[8] = (bytes[8] & 0x3F) | 0x80; // IETF variant
        Self::from_bytes(bytes)
    }

    /// Parse a canonical hyphenated UUID string.
    pub fn parse(s: &str) -> Option<Self> {
        let hex: String = s.chars().filter(|c| *c != '-').collect();
        if hex.len() != 32 {
            return None;
        }
        let mut bytes = [0u8; 16];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let pair = std::str::from_utf8(chunk).ok()?;
            bytes[i] = u8::from_str_radix(pair, 16).ok()?;
        }
        Some(Self::from_bytes(bytes))
    }
}

impl ProtoEncode for Uuid {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_u64(self.most_significant);
        buf.put_u64(self.least_significant);
    }
}

impl ProtoDecode for Uuid {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        if buf.remaining() < 16 {
            return Err(ProtoError::BufferTooShort {
                needed: 16,
                remaining: buf.remaining(),
            });
        }
        Ok(Self {
            most_significant: buf.get_u64(),
            least_significant: buf.get_u64(),
        })
    }
}

impl fmt::Display for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.to_bytes();
        write!(
            f,
            "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
            bytes[0], bytes[1], bytes[2], bytes[3],
            bytes[4], bytes[5],
            bytes[6], bytes[7],
            bytes[8], bytes[9],
            bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15],
        )
    }
}

// ---------------------------------------------------------------------------
// Vec3 (f64 x, y, z)
// ---------------------------------------------------------------------------

/// World-space position. The protocol carries positions as f64.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn distance(&self, other: &Vec3) -> f64 {
        (*self - *other).length()
    }

    /// Horizontal (XZ-plane) distance.
    pub fn distance_xz(&self, other: &Vec3) -> f64 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        (dx * dx + dz * dz).sqrt()
    }
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

// ---------------------------------------------------------------------------
// BlockPos (i32 x, y, z)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Chunk column containing this block.
    pub fn chunk_pos(&self) -> ChunkPos {
        ChunkPos::new(self.x >> 4, self.z >> 4)
    }

    /// Floor a floating-point position to the cell containing it.
    pub fn from_vec3(v: &Vec3) -> Self {
        Self {
            x: v.x.floor() as i32,
            y: v.y.floor() as i32,
            z: v.z.floor() as i32,
        }
    }

    /// Center of this cell (feet level).
    pub fn center(&self) -> Vec3 {
        Vec3::new(self.x as f64 + 0.5, self.y as f64, self.z as f64 + 0.5)
    }

    pub fn offset(&self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    pub fn distance(&self, other: &BlockPos) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        let dz = (self.z - other.z) as f64;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

// ---------------------------------------------------------------------------
// ChunkPos (i32 x, z)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chebyshev distance in chunk coordinates.
    pub fn chebyshev(&self, other: &ChunkPos) -> i32 {
        (self.x - other.x).abs().max((self.z - other.z).abs())
    }
}

impl fmt::Display for ChunkPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn uuid_proto_roundtrip() {
        let u = Uuid::new(0x0123456789ABCDEF, 0xFEDCBA9876543210);
        let mut buf = BytesMut::new();
        u.proto_encode(&mut buf);
        assert_eq!(buf.len(), 16);
        let decoded = Uuid::proto_decode(&mut buf.freeze()).unwrap();
        assert_eq!(decoded, u);
    }

    #[test]
    fn uuid_display_is_hyphenated_lowercase() {
        let u = Uuid::new(0x0123456789ABCDEF, 0xFEDCBA9876543210);
        assert_eq!(u.to_string(), "01234567-89ab-cdef-fedc-ba9876543210");
    }

    #[test]
    fn uuid_parse_roundtrip() {
        let u = Uuid::new(0xDEADBEEF00112233, 0x4455667788990011);
        let parsed = Uuid::parse(&u.to_string()).unwrap();
        assert_eq!(parsed, u);
        assert!(Uuid::parse("not-a-uuid").is_none());
    }

    #[test]
    fn offline_uuid_is_version_3_ietf() {
        let u = Uuid::offline("wanderer");
        let bytes = u.to_bytes();
        assert_eq!(bytes[6] >> 4, 3, "version nibble must be 3");
        assert_eq!(bytes[8] >> 6, 0b10, "variant must be IETF");
        // Derivation is deterministic.
        assert_eq!(Uuid::offline("wanderer"), u);
        assert_ne!(Uuid::offline("other"), u);
    }

    #[test]
    fn offline_uuid_known_value() {
        // MD5("OfflinePlayer:Notch") with version/variant bits applied.
        let u = Uuid::offline("Notch");
        assert_eq!(u.to_string(), "b50ad385-829d-3141-a216-7e7d7539ba7f");
    }

    #[test]
    fn blockpos_chunk_pos() {
        assert_eq!(BlockPos::new(0, 64, 0).chunk_pos(), ChunkPos::new(0, 0));
        assert_eq!(BlockPos::new(15, 64, 15).chunk_pos(), ChunkPos::new(0, 0));
        assert_eq!(BlockPos::new(16, 64, 16).chunk_pos(), ChunkPos::new(1, 1));
        assert_eq!(BlockPos::new(-1, 64, -1).chunk_pos(), ChunkPos::new(-1, -1));
        assert_eq!(
            BlockPos::new(-17, 64, -17).chunk_pos(),
            ChunkPos::new(-2, -2)
        );
    }

    #[test]
    fn blockpos_from_vec3_floors() {
        let pos = BlockPos::from_vec3(&Vec3::new(1.9, 64.5, -0.1));
        assert_eq!(pos, BlockPos::new(1, 64, -1));
    }

    #[test]
    fn chunkpos_chebyshev() {
        let a = ChunkPos::new(0, 0);
        assert_eq!(a.chebyshev(&ChunkPos::new(3, -2)), 3);
        assert_eq!(a.chebyshev(&ChunkPos::new(-1, 5)), 5);
        assert_eq!(a.chebyshev(&a), 0);
    }

    #[test]
    fn vec3_distances() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(3.0, 12.0, 4.0);
        assert!((a.distance_xz(&b) - 5.0).abs() < f64::EPSILON);
        assert!((a.distance(&b) - 13.0).abs() < f64::EPSILON);
    }
}
