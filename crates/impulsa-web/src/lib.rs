//! impulsa-web - HTTP surface of the programme tracker
//! Provides:
//!   - CRUD endpoints for the generic programme schema and the
//!     empresa/formacion/evento/asesoramiento schema
//!   - 360º read-model and timeline endpoints
//!   - Programme KPI dashboard, history, breakdowns and Power BI feed
//!   - CSV/JSON export with an audit trail
//!   - API-key gate, fixed-window rate limiting, OpenAPI document
//!   - Static dashboard serving

pub mod auth;
pub mod handlers;
pub mod openapi;
pub mod router;
pub mod state;
