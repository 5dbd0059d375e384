// src/lib.rs
//! Guest-side booking lifecycle client for the hotel booking API
//!
//! Covers the path a guest takes after choosing a room: form validation and
//! submission, access to the booking through an emailed link or the
//! booking reference, bank-transfer proof upload, card checkout, and the
//! booking status with the actions it allows.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use api::{BookingApi, HttpBookingApi};
pub use auth::{AccessCredentials, AccessGrant, BookingAccessAuthenticator, Session};
pub use config::ClientConfig;
pub use error::{BookingError, ErrorKind};
pub use services::{
    BookingAction, BookingStatusViewer, BookingSubmissionService, PaymentProofUploader,
    PaymentService,
};

pub type BookingResult<T> = Result<T, BookingError>;
