//! Request handlers, one module per resource family.

pub mod activities;
pub mod beneficiaries;
pub mod empresas;
pub mod eventos;
pub mod export;
pub mod formaciones;
pub mod kpi_stars;
pub mod kpis;
pub mod objectives;
pub mod projects;
pub mod results;
pub mod sesiones;
pub mod system;
pub mod vistas360;
