//! Impulsa Database Layer
//!
//! PostgreSQL access for the programme tracker: one repository per entity,
//! the denormalized 360º read models, programme KPI computation, and the
//! export queries. Repositories hold a `PgPool` clone and expose async
//! methods; dynamic list filters are assembled with `sqlx::QueryBuilder`
//! and partial updates go through SQL `COALESCE`.
//!
//! # Example
//!
//! ```rust,no_run
//! use impulsa_config::Config;
//! use impulsa_db::{Database, ProjectRepository};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let db = Database::connect(&config.database).await?;
//!     db.initialize().await?;
//!
//!     let projects = ProjectRepository::new(db.pool().clone());
//!     let all = projects.list(&Default::default()).await?;
//!     println!("{} projects", all.len());
//!     Ok(())
//! }
//! ```

pub mod database;
pub mod projects;
pub mod objectives;
pub mod activities;
pub mod beneficiaries;
pub mod results;
pub mod kpis;
pub mod empresas;
pub mod formaciones;
pub mod eventos;
pub mod sesiones;
pub mod vistas;
pub mod kpi_stars;
pub mod export;

pub use database::Database;
pub use projects::ProjectRepository;
pub use objectives::ObjectiveRepository;
pub use activities::ActivityRepository;
pub use beneficiaries::BeneficiaryRepository;
pub use results::ResultRepository;
pub use kpis::KpiRepository;
pub use empresas::EmpresaRepository;
pub use formaciones::FormacionRepository;
pub use eventos::EventoRepository;
pub use sesiones::SesionRepository;
pub use vistas::Vista360Repository;
pub use kpi_stars::KpiStarsRepository;
pub use export::ExportRepository;
