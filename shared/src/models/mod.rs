//! Persistent domain models
//!
//! One file per entity, each with its create/update payloads where the API
//! accepts them.

mod measurement;
mod member;
mod reservation;
mod session;
mod tenant;

pub use measurement::{Measurement, MeasurementCreate};
pub use member::{CreditAdjust, Member, MemberCreate};
pub use reservation::{
    CancelRequestPayload, CancelStatus, MovePayload, Reservation, ReservationStatus,
    ReservationWithSession,
};
pub use session::{
    RepeatPattern, Session, SessionCreate, SessionCreated, SessionParticipant,
};
pub use tenant::{Tenant, TenantCreate};
