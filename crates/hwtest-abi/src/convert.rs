// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Signed/unsigned conversion at the driver boundary.
//!
//! The driver boundary carries fixed-width *signed* integers: addresses and
//! values travel as `i32` (`i16` for word writes) and raw read results come
//! back as a sign-extended native `long` (`i64`). Callers think in unsigned
//! register values, so every crossing goes through this module:
//!
//! ```text
//!   caller (u32/u16)  ──to_signed32/16──▶  boundary (i32/i16)
//!   caller (u8/16/32) ◀──mask8/16/32────  boundary (i64)
//! ```
//!
//! The conversions preserve the bit pattern exactly; only the interpretation
//! of the top bit changes.

/// Bit 31, the sign bit of the 32-bit boundary representation.
pub const SIGN_BIT_32: u32 = 0x8000_0000;

/// Bit 15, the sign bit of the 16-bit boundary representation.
pub const SIGN_BIT_16: u16 = 0x8000;

/// Mask for byte-wide results.
pub const MASK_8: i64 = 0xff;

/// Mask for word-wide results.
pub const MASK_16: i64 = 0xffff;

/// Mask for long-word-wide results.
pub const MASK_32: i64 = 0xffff_ffff;

/// Reinterpret an unsigned 32-bit value as the signed 32-bit integer with
/// the identical two's-complement bit pattern.
///
/// Values with bit 31 clear pass through unchanged.
#[inline]
#[must_use]
pub const fn to_signed32(value: u32) -> i32 {
    if value & SIGN_BIT_32 == 0 {
        return value as i32;
    }
    // (value ^ 0xffff_ffff) + 1 is at most 2^31, which fits i64 but not i32.
    let magnitude = ((value ^ 0xffff_ffff) as i64) + 1;
    (-magnitude) as i32
}

/// Reinterpret an unsigned 16-bit value as the signed 16-bit integer with
/// the identical two's-complement bit pattern.
#[inline]
#[must_use]
pub const fn to_signed16(value: u16) -> i16 {
    if value & SIGN_BIT_16 == 0 {
        return value as i16;
    }
    let magnitude = ((value ^ 0xffff) as i32) + 1;
    (-magnitude) as i16
}

/// Recover the unsigned bit pattern of a signed 32-bit boundary value.
#[inline]
#[must_use]
pub const fn from_signed32(value: i32) -> u32 {
    u32::from_ne_bytes(value.to_ne_bytes())
}

/// Recover the unsigned bit pattern of a signed 16-bit boundary value.
#[inline]
#[must_use]
pub const fn from_signed16(value: i16) -> u16 {
    u16::from_ne_bytes(value.to_ne_bytes())
}

/// Mask a raw boundary result to a byte.
#[inline]
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "value is masked to 8 bits first"
)]
pub const fn mask8(raw: i64) -> u8 {
    (raw & MASK_8) as u8
}

/// Mask a raw boundary result to a word.
#[inline]
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "value is masked to 16 bits first"
)]
pub const fn mask16(raw: i64) -> u16 {
    (raw & MASK_16) as u16
}

/// Mask a raw boundary result to a long word.
#[inline]
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "value is masked to 32 bits first"
)]
pub const fn mask32(raw: i64) -> u32 {
    (raw & MASK_32) as u32
}

/// Access width of a register operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    /// 8-bit access (`readb`, `inb`, ...).
    Byte,
    /// 16-bit access (`readw`, `inw`, ...).
    Word,
    /// 32-bit access (`readlw`, `inlw`, ...).
    Long,
}

impl Width {
    /// Width in bytes.
    #[inline]
    #[must_use]
    pub const fn bytes(self) -> usize {
        match self {
            Self::Byte => 1,
            Self::Word => 2,
            Self::Long => 4,
        }
    }

    /// Largest unsigned value representable at this width.
    #[inline]
    #[must_use]
    pub const fn max_value(self) -> u32 {
        match self {
            Self::Byte => 0xff,
            Self::Word => 0xffff,
            Self::Long => 0xffff_ffff,
        }
    }
}

impl core::fmt::Display for Width {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Byte => write!(f, "byte"),
            Self::Word => write!(f, "word"),
            Self::Long => write!(f, "long word"),
        }
    }
}

// Compile-time verification of the boundary examples
const _: () = {
    assert!(to_signed32(0xffff_ffff) == -1);
    assert!(to_signed32(0x7fff_ffff) == 0x7fff_ffff);
    assert!(to_signed32(0x8000_0000) == i32::MIN);
    assert!(to_signed16(0xffff) == -1);
    assert!(to_signed16(0x8000) == i16::MIN);
};
