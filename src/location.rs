use serde::*;

/// A box-grid cell coordinate, packed into a `u32` (16 bits per axis).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(transparent)]
pub struct Location {
    packed: u32,
}

impl Location {
    pub fn from_coords(x: u32, y: u32) -> Self {
        Location {
            packed: (x << 16) | (y & 0xFFFF),
        }
    }

    #[inline]
    pub fn x(self) -> u32 {
        (self.packed >> 16) & 0xFFFF
    }

    #[inline]
    pub fn y(self) -> u32 {
        self.packed & 0xFFFF
    }

    #[inline]
    pub fn packed_repr(self) -> u32 {
        self.packed
    }

    #[inline]
    pub fn from_packed(packed: u32) -> Self {
        Location { packed }
    }

    /// Dense row-major cell index for a grid of the given width.
    #[inline]
    pub fn to_index(self, width: u32) -> usize {
        (self.y() * width + self.x()) as usize
    }

    /// Inverse of [`Location::to_index`].
    #[inline]
    pub fn from_index(index: usize, width: u32) -> Self {
        let index = index as u32;
        Location::from_coords(index % width, index / width)
    }
}

impl Serialize for Location {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.packed_repr().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Location {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        u32::deserialize(deserializer).map(Location::from_packed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_and_unpacks() {
        let loc = Location::from_coords(1023, 512);
        assert_eq!(loc.x(), 1023);
        assert_eq!(loc.y(), 512);
        assert_eq!(Location::from_packed(loc.packed_repr()), loc);
    }

    #[test]
    fn index_round_trip() {
        let width = 37;
        let loc = Location::from_coords(12, 9);
        assert_eq!(Location::from_index(loc.to_index(width), width), loc);
    }
}
