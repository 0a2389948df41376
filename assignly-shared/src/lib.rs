pub mod request;

pub use request::{
    DeliveryType, FieldError, UnknownWorkType, ValidationErrors, WorkRequest, WorkType,
};
