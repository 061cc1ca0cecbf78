//! Raw data access: reservation and user records, the join that produces
//! reservation rows, label derivation, and the time zone lookup used by the
//! interactive path.

pub mod error;
pub mod lookup;
pub mod records;
pub mod source;

pub use error::{DataError, LookupError};
pub use lookup::{StaticTimeZones, TimeZoneLookup};
pub use records::{
    join_users, split_labels, IndividualReservation, Outcome, ReservationRecord, ReservationRow,
    UserId, UserRecord,
};
pub use source::{CsvSource, ReservationSource};
