use num_enum::FromPrimitive;

/// Numbering-plan-identification field of an address type octet (bits 3-0)
///
/// Values 3GPP leaves unassigned decode to `Reserved`.
#[derive(FromPrimitive)]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NumberingPlan {
    Unknown = 0b0000,
    Isdn = 0b0001,
    Data = 0b0011,
    Telex = 0b0100,
    National = 0b1000,
    Private = 0b1001,
    Ermes = 0b1010,
    #[num_enum(default)]
    Reserved = 0b1111,
}

impl NumberingPlan {
    pub const MASK: u8 = 0b1111;

    /// Extracts the numbering plan from a raw address type octet
    pub fn from_type_byte(type_byte: u8) -> Self {
        Self::from(type_byte & Self::MASK)
    }
}
