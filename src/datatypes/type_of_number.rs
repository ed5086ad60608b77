use num_enum::FromPrimitive;

/// Type-of-number field of an address type octet (bits 6-4)
#[derive(FromPrimitive)]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeOfNumber {
    Unknown = 0b000,
    International = 0b001,
    National = 0b010,
    NetworkSpecific = 0b011,
    Subscriber = 0b100,
    Alphanumeric = 0b101,
    Abbreviated = 0b110,
    #[num_enum(default)]
    Reserved = 0b111,
}

impl TypeOfNumber {
    pub const MASK: u8 = 0b111_0000;

    /// Extracts the type of number from a raw address type octet
    pub fn from_type_byte(type_byte: u8) -> Self {
        Self::from((type_byte & Self::MASK) >> 4)
    }
}
