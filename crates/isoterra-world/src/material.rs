/// Stable material identifier: FNV-1a of the material's name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialKey(pub i32);

const FNV_OFFSET: u32 = 0x811C_9DC5;
const FNV_PRIME: u32 = 0x0100_0193;

impl MaterialKey {
    pub const fn from_name(name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut h = FNV_OFFSET;
        let mut i = 0;
        while i < bytes.len() {
            h ^= bytes[i] as u32;
            h = h.wrapping_mul(FNV_PRIME);
            i += 1;
        }
        MaterialKey(h as i32)
    }
}

impl From<&str> for MaterialKey {
    fn from(value: &str) -> Self {
        Self::from_name(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_fnv_vectors() {
        assert_eq!(MaterialKey::from_name("").0 as u32, 0x811C_9DC5);
        assert_eq!(MaterialKey::from_name("a").0 as u32, 0xE40C_292C);
    }

    #[test]
    fn names_are_distinguished() {
        assert_ne!(MaterialKey::from_name("stone"), MaterialKey::from_name("dirt"));
        assert_eq!(MaterialKey::from("grass"), MaterialKey::from_name("grass"));
    }
}
