mod address;
mod data_coding;
pub mod encoding;
mod message;
mod numbering_plan;
mod parameter;
mod phonebook;
mod timestamp;
mod type_of_number;
mod user_data;

pub use address::AddressField;
pub use data_coding::{DataCodingScheme, MessageClass};
pub use encoding::UserDataEncoding;
pub use message::{BasicResponse, COMMAND_PREFIX, Message, MessageKind};
pub use numbering_plan::NumberingPlan;
pub use parameter::{Parameter, parse_parameters, stringify_parameters};
pub use phonebook::{NumberingScheme, PhoneBookEntry};
pub use timestamp::ServiceCentreTimestamp;
pub use type_of_number::TypeOfNumber;
pub use user_data::{Concatenation, InformationElement, UserData, UserDataHeader};
