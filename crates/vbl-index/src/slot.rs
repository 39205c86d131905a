//! Field arithmetic on one 256-bit slot.
//!
//! A slot packs eight 32-bit block numbers. Field `k` occupies bits
//! `k * 32 .. (k + 1) * 32`, lowest field first. These three functions are
//! the only place in the system that touches raw masks and shifts.

use primitive_types::U256;

/// Number of 32-bit fields per slot.
pub const FIELDS_PER_SLOT: u32 = 8;

/// Width of one field in bits.
pub const FIELD_BITS: u32 = 32;

/// Replace field `field` of `slot` with `value`, leaving the other seven
/// fields untouched.
pub fn set_field(slot: U256, field: u32, value: u32) -> U256 {
    debug_assert!(field < FIELDS_PER_SLOT);
    let shift = field * FIELD_BITS;
    let mask = U256::from(u32::MAX) << shift;
    (slot & !mask) | (U256::from(value) << shift)
}

/// Extract field `field` of `slot`.
pub fn get_field(slot: U256, field: u32) -> u32 {
    debug_assert!(field < FIELDS_PER_SLOT);
    let shift = field * FIELD_BITS;
    ((slot >> shift) & U256::from(u32::MAX)).as_u32()
}

/// Zero field `field` of `slot`.
pub fn clear_field(slot: U256, field: u32) -> U256 {
    set_field(slot, field, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn set_then_get_each_field() {
        let mut slot = U256::zero();
        for field in 0..FIELDS_PER_SLOT {
            slot = set_field(slot, field, 1000 + field);
        }
        for field in 0..FIELDS_PER_SLOT {
            assert_eq!(get_field(slot, field), 1000 + field);
        }
    }

    #[test]
    fn set_overwrites_in_place() {
        let slot = set_field(U256::zero(), 3, 7);
        let slot = set_field(slot, 3, u32::MAX);
        assert_eq!(get_field(slot, 3), u32::MAX);
    }

    #[test]
    fn neighbors_survive_overwrite() {
        let mut slot = U256::zero();
        for field in 0..FIELDS_PER_SLOT {
            slot = set_field(slot, field, field + 1);
        }
        let slot = set_field(slot, 4, 0xDEAD_BEEF);
        for field in 0..FIELDS_PER_SLOT {
            let expected = if field == 4 { 0xDEAD_BEEF } else { field + 1 };
            assert_eq!(get_field(slot, field), expected);
        }
    }

    #[test]
    fn clear_field_zeroes_only_its_field() {
        let mut slot = U256::zero();
        for field in 0..FIELDS_PER_SLOT {
            slot = set_field(slot, field, 0xFFFF_FFFF);
        }
        let slot = clear_field(slot, 0);
        let slot = clear_field(slot, 7);
        assert_eq!(get_field(slot, 0), 0);
        assert_eq!(get_field(slot, 7), 0);
        for field in 1..7 {
            assert_eq!(get_field(slot, field), 0xFFFF_FFFF);
        }
    }

    #[test]
    fn field_zero_occupies_low_bits() {
        let slot = set_field(U256::zero(), 0, 0xABCD);
        assert_eq!(slot, U256::from(0xABCDu64));
    }

    #[test]
    fn field_seven_occupies_high_bits() {
        let slot = set_field(U256::zero(), 7, 1);
        assert_eq!(slot, U256::from(1) << 224);
    }

    proptest! {
        #[test]
        fn writes_are_isolated(
            fields in proptest::collection::vec(0u32..8, 1..32),
            values in proptest::collection::vec(any::<u32>(), 1..32),
        ) {
            // Apply an arbitrary sequence of writes; every field must end up
            // holding the last value written to it (or zero).
            let mut slot = U256::zero();
            let mut expected = [0u32; 8];
            for (field, value) in fields.iter().zip(values.iter()) {
                slot = set_field(slot, *field, *value);
                expected[*field as usize] = *value;
            }
            for field in 0..FIELDS_PER_SLOT {
                prop_assert_eq!(get_field(slot, field), expected[field as usize]);
            }
        }
    }
}
