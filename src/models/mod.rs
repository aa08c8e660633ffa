pub mod service;
pub mod user;
pub mod visit;
pub mod work_hour;

pub use service::{NewService, Service, ServicePatch};
pub use user::{Credentials, User};
pub use visit::{NewVisit, Visit, VisitKind, VisitPatch};
pub use work_hour::{Weekday, WorkHour, WorkHourBlock};
