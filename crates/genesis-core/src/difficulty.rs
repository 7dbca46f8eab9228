//! Compact difficulty decoding and target comparison.

/// Compact bits whose target defines difficulty 1 (Bitcoin's genesis bits).
pub const DIFFICULTY_ONE_BITS: u32 = 0x1d00ffff;

/// Convert compact "bits" representation to a 256-bit target.
///
/// The bits format is: [exponent (1 byte)][mantissa (3 bytes)]
/// Target = mantissa * 256^(exponent - 3)
///
/// The whole 24-bit mantissa is used; there is no sign flag. Exponents below
/// 3 shift the mantissa right, and a target that would not fit in 256 bits
/// saturates to all ones.
///
/// The result is a 32-byte big-endian representation of the target.
pub fn bits_to_target(bits: u32) -> [u8; 32] {
    let exponent = (bits >> 24) as i32;
    let mantissa = bits & 0x00FF_FFFF;

    let mut target = [0u8; 32];

    if exponent < 3 {
        let value = mantissa >> (8 * (3 - exponent));
        target[29..].copy_from_slice(&value.to_be_bytes()[1..]);
        return target;
    }

    // Most significant mantissa byte lands at index 32 - exponent
    for (offset, &byte) in mantissa.to_be_bytes()[1..].iter().enumerate() {
        let pos = 32 - exponent + offset as i32;
        if pos < 0 {
            if byte != 0 {
                return [0xFF; 32];
            }
            continue;
        }
        target[pos as usize] = byte;
    }

    target
}

/// Check if a digest meets the difficulty target.
///
/// `digest` is in natural hash order (little-endian number), `target` is
/// big-endian as returned by [`bits_to_target`]. Returns true if
/// digest < target.
#[inline]
pub fn hash_meets_target(digest: &[u8; 32], target: &[u8; 32]) -> bool {
    // Most significant digest byte is the last one
    for (hash_byte, target_byte) in digest.iter().rev().zip(target.iter()) {
        if hash_byte < target_byte {
            return true;
        }
        if hash_byte > target_byte {
            return false;
        }
    }
    // Equal - not below
    false
}

/// Calculate approximate difficulty from bits.
///
/// Difficulty = max_target / current_target
/// Where max_target is the target of [`DIFFICULTY_ONE_BITS`].
pub fn bits_to_difficulty(bits: u32) -> f64 {
    let current_f64 = target_to_f64(&bits_to_target(bits));
    let one_f64 = target_to_f64(&bits_to_target(DIFFICULTY_ONE_BITS));

    if current_f64 == 0.0 {
        return f64::INFINITY;
    }

    one_f64 / current_f64
}

/// Convert a 256-bit target to an approximate f64 value.
fn target_to_f64(target: &[u8; 32]) -> f64 {
    let Some(first_nonzero) = target.iter().position(|&b| b != 0) else {
        return 0.0;
    };

    // Take up to 8 bytes for precision
    let mut value: u64 = 0;
    for i in 0..8 {
        let byte = target.get(first_nonzero + i).copied().unwrap_or(0);
        value = (value << 8) | byte as u64;
    }

    let shift = (31 - first_nonzero) * 8;
    let exponent = (shift as i32) - 56;
    (value as f64) * 2f64.powi(exponent)
}

/// Format difficulty for display (e.g., "1.23T" for trillion).
pub fn format_difficulty(difficulty: f64) -> String {
    if difficulty >= 1e15 {
        format!("{:.2}P", difficulty / 1e15)
    } else if difficulty >= 1e12 {
        format!("{:.2}T", difficulty / 1e12)
    } else if difficulty >= 1e9 {
        format!("{:.2}G", difficulty / 1e9)
    } else if difficulty >= 1e6 {
        format!("{:.2}M", difficulty / 1e6)
    } else if difficulty >= 1e3 {
        format!("{:.2}K", difficulty / 1e3)
    } else {
        format!("{:.6}", difficulty)
    }
}
