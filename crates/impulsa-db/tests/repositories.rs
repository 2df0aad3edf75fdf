//! Repository round trips against a live PostgreSQL instance.
//!
//! Run with: cargo test --package impulsa-db --test repositories -- --ignored --nocapture
//!
//! Needs DATABASE_URL (defaults to the local dev database). The schema is
//! applied on startup and is idempotent, so reruns are safe.

use impulsa_config::DatabaseConfig;
use impulsa_db::empresas::{EmpresaFilter, NewEmpresa};
use impulsa_db::projects::{NewProject, ProjectFilter, ProjectUpdate};
use impulsa_db::sesiones::NewSesion;
use impulsa_db::{Database, EmpresaRepository, KpiStarsRepository, ProjectRepository, SesionRepository, Vista360Repository};

async fn test_db() -> Database {
    let mut config = DatabaseConfig::default();
    if let Ok(url) = std::env::var("DATABASE_URL") {
        config.url = url;
    }
    config.max_connections = 2;

    let db = Database::connect(&config).await.expect("could not connect");
    db.initialize().await.expect("schema bootstrap failed");
    db
}

fn unique_code(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{prefix}-{nanos}")
}

#[tokio::test]
#[ignore]
async fn project_crud_round_trip() {
    let db = test_db().await;
    let repo = ProjectRepository::new(db.pool().clone());

    let created = repo
        .create(&NewProject {
            project_code: unique_code("PRJ"),
            name: "Integration project".into(),
            description: Some("created by the repository test".into()),
            start_date: None,
            end_date: None,
            status: None,
            budget: Some(12_500.0),
            program: None,
        })
        .await
        .expect("create failed");
    assert_eq!(created.status, "active");
    assert_eq!(created.program, "STARS 2025");

    let fetched = repo.get(created.id).await.expect("get failed");
    assert_eq!(fetched.map(|p| p.id), Some(created.id));

    let updated = repo
        .update(
            created.id,
            &ProjectUpdate {
                status: Some("completed".into()),
                ..Default::default()
            },
        )
        .await
        .expect("update failed")
        .expect("project vanished");
    assert_eq!(updated.status, "completed");
    // untouched columns keep their values
    assert_eq!(updated.budget, Some(12_500.0));

    let listed = repo
        .list(&ProjectFilter {
            status: Some("completed".into()),
            ..Default::default()
        })
        .await
        .expect("list failed");
    assert!(listed.iter().any(|p| p.id == created.id));

    let deleted = repo.delete(created.id).await.expect("delete failed");
    assert_eq!(deleted.map(|p| p.id), Some(created.id));
    assert!(repo.get(created.id).await.expect("get failed").is_none());
}

#[tokio::test]
#[ignore]
async fn empresa_unique_cif_is_enforced() {
    let db = test_db().await;
    let repo = EmpresaRepository::new(db.pool().clone());

    let cif = unique_code("CIF");
    let nueva = NewEmpresa {
        razon_social: "Talleres Integración SL".into(),
        nombre_comercial: None,
        cif: cif.clone(),
        sector: Some("Metal".into()),
        tamano: None,
        numero_empleados: Some(12),
        facturacion_anual: None,
        direccion: None,
        provincia: Some("Santa Cruz de Tenerife".into()),
        municipio: None,
        codigo_postal: None,
        telefono: None,
        email: None,
        web: None,
        descripcion: None,
        estado_id: None,
        fecha_alta: None,
    };

    let created = repo.create(&nueva).await.expect("create failed");
    let duplicate = repo.create(&nueva).await;
    match duplicate {
        Err(sqlx::Error::Database(db_err)) => {
            assert_eq!(db_err.code().as_deref(), Some("23505"));
        }
        other => panic!("expected unique violation, got {other:?}"),
    }

    let listed = repo
        .list(&EmpresaFilter {
            sector: Some("Metal".into()),
            ..Default::default()
        })
        .await
        .expect("list failed");
    assert!(listed.iter().any(|e| e.cif == cif));

    repo.delete(created.id).await.expect("cleanup failed");
}

#[tokio::test]
#[ignore]
async fn sesion_list_resolves_names() {
    let db = test_db().await;
    let empresas = EmpresaRepository::new(db.pool().clone());
    let sesiones = SesionRepository::new(db.pool().clone());

    let empresa = empresas
        .create(&NewEmpresa {
            razon_social: "Asesorada SL".into(),
            nombre_comercial: None,
            cif: unique_code("CIF"),
            sector: None,
            tamano: None,
            numero_empleados: None,
            facturacion_anual: None,
            direccion: None,
            provincia: None,
            municipio: None,
            codigo_postal: None,
            telefono: None,
            email: None,
            web: None,
            descripcion: None,
            estado_id: None,
            fecha_alta: None,
        })
        .await
        .expect("empresa create failed");

    let sesion = sesiones
        .create(&NewSesion {
            codigo: unique_code("SES"),
            empresa_id: empresa.id,
            persona_contacto_id: None,
            tipo_id: None,
            fecha_sesion: Some(chrono::Utc::now()),
            duracion_minutos: Some(60),
            modalidad: Some("Online".into()),
            lugar: None,
            asesor: Some("A. Pérez".into()),
            tematica: Some("Digitalización".into()),
            descripcion: None,
            objetivos: None,
            resultados: None,
            recomendaciones: None,
            seguimiento_requerido: None,
            fecha_seguimiento: None,
            estado_id: None,
            valoracion: None,
        })
        .await
        .expect("sesion create failed");
    assert!(!sesion.seguimiento_requerido);

    let detalle = sesiones
        .get(sesion.id)
        .await
        .expect("get failed")
        .expect("sesion vanished");
    assert_eq!(detalle.empresa_nombre, "Asesorada SL");

    // deleting the company cascades to its sessions
    empresas.delete(empresa.id).await.expect("cleanup failed");
    assert!(sesiones.get(sesion.id).await.expect("get failed").is_none());
}

#[tokio::test]
#[ignore]
async fn kpi_dashboard_reports_seeded_indicators() {
    let db = test_db().await;
    let repo = KpiStarsRepository::new(db.pool().clone());

    let dashboard = repo.dashboard().await.expect("dashboard failed");
    assert_eq!(dashboard.programa, "STARS 2025");
    // seven indicators are seeded with the schema
    assert!(dashboard.resumen.total_kpis >= 7);
    assert!(dashboard
        .kpis
        .iter()
        .any(|k| k.codigo == "KPI-EMP-001" && k.valor_objetivo == 50.0));

    let detalle = repo
        .detalle("KPI-EMP-001")
        .await
        .expect("detalle failed")
        .expect("seeded KPI missing");
    assert_eq!(detalle.kpi.codigo, "KPI-EMP-001");

    assert!(repo.detalle("KPI-XXX-999").await.expect("detalle failed").is_none());
}

#[tokio::test]
#[ignore]
async fn estadisticas_generales_counts_everything() {
    let db = test_db().await;
    let vistas = Vista360Repository::new(db.pool().clone());

    let stats = vistas.estadisticas().await.expect("estadisticas failed");
    assert!(stats.total_empresas >= 0);
    assert!(stats.interacciones_ultimo_mes <= stats.total_interacciones);
}
