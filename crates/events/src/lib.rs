//! User-visible notifications.
//!
//! Hooks publish a [`Notification`] on the [`NotificationBus`] whenever a
//! mutation fails or completes; views subscribe and render toasts. Error
//! notifications are built from a [`CoreError`] with a category title.
//!
//! [`CoreError`]: barbearia_core::CoreError

pub mod bus;
pub mod notification;

pub use bus::NotificationBus;
pub use notification::{Level, Notification};
