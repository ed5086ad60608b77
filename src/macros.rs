// ABOUTME: This module provides macros to reduce boilerplate across the SMS PDU variants
// ABOUTME: Generates the shared header accessors, kind lookup and From conversions for `Sms`

/// Macro for implementing the accessors every SMS PDU variant shares
///
/// Each listed identifier must be both an `Sms` variant and the struct it
/// wraps, and every struct must carry a `header: SmsHeader` field.
///
/// # Generated code
/// - `Sms::header()` returning the shared `SmsHeader`
/// - `Sms::kind()` returning the matching `SmsKind`
/// - `header()` on each variant struct
/// - `From<Variant> for Sms`
macro_rules! impl_sms_pdu {
    ($($variant:ident),+ $(,)?) => {
        impl Sms {
            /// Metadata shared by all PDU variants
            pub fn header(&self) -> &SmsHeader {
                match self {
                    $(Sms::$variant(pdu) => &pdu.header,)+
                }
            }

            pub fn kind(&self) -> SmsKind {
                match self {
                    $(Sms::$variant(_) => SmsKind::$variant,)+
                }
            }
        }

        $(
            impl $variant {
                pub fn header(&self) -> &SmsHeader {
                    &self.header
                }
            }

            impl From<$variant> for Sms {
                fn from(pdu: $variant) -> Self {
                    Sms::$variant(pdu)
                }
            }
        )+
    };
}
