//! # coffee-api
//!
//! HTTP layer for coffee-cart.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - The server-rendered storefront page
//! - JSON endpoints for checkout and the donation list
//! - Webhook handler recording paid donations
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/` | Storefront page |
//! | POST | `/` | Form post (preset / donate) |
//! | GET | `/thank-you` | Return page after payment |
//! | GET | `/health` | Health check |
//! | POST | `/api/checkout` | Create checkout session |
//! | GET | `/api/donations` | List donations |
//! | POST | `/webhook/stripe` | Stripe webhook |

pub mod checkout;
pub mod handlers;
pub mod pages;
pub mod routes;
pub mod state;

pub use checkout::CheckoutService;
pub use routes::create_router;
pub use state::{AppConfig, AppState, StoreBackend};
