mod admin;
mod helpers;
mod mocks;
mod notifications;
mod orders;
#[cfg(feature = "razorpay")]
mod payments;
mod users;
