/// Macro to create a strongly typed identifier wrapping an integer
///
/// The generated type is `Copy`, hashable, displays as the bare number and parses from a string.
#[macro_export]
macro_rules! generate_id_type {
  ($struct_name:ident, $inner:ty) => {
    #[derive(Hash, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
    #[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
    pub struct $struct_name($inner);
    impl $struct_name {
      pub const fn new(val: $inner) -> Self {
        $struct_name(val)
      }
      pub fn val(&self) -> $inner {
        self.0
      }
    }
    impl std::fmt::Display for $struct_name {
      fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
      }
    }
    impl std::str::FromStr for $struct_name {
      type Err = std::num::ParseIntError;

      fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<$inner>().map(Self::new)
      }
    }
    impl From<$inner> for $struct_name {
      fn from(val: $inner) -> Self {
        Self::new(val)
      }
    }
  };
}

// Chat platforms hand out signed 64-bit user ids
generate_id_type!(UserId, i64);
