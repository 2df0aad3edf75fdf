//! OpenAPI document for the whole API surface.
//!
//! Served as JSON at `/api/openapi.json`; `/api-docs` renders a small
//! human-readable page around it. Power Apps and Power BI both consume
//! the JSON document directly.

use utoipa::OpenApi;

use crate::handlers;

use impulsa_db::activities::{Activity, ActivityUpdate, NewActivity};
use impulsa_db::beneficiaries::{Beneficiary, BeneficiaryUpdate, NewBeneficiary};
use impulsa_db::empresas::{Empresa, EmpresaStats, EmpresaUpdate, NewEmpresa};
use impulsa_db::eventos::{AsistenteEvento, Evento, EventoDetalle, EventoResumen, EventoUpdate, NewEvento};
use impulsa_db::formaciones::{
    AsistenteFormacion, Formacion, FormacionDetalle, FormacionResumen, FormacionUpdate,
    NewFormacion,
};
use impulsa_db::kpi_stars::{DashboardKpis, KpiBreakdown, KpiDetalle, KpiHistoricoRow, PowerBiData};
use impulsa_db::kpis::{Kpi, KpiProgress, KpiUpdate, NewKpi};
use impulsa_db::objectives::{NewObjective, Objective, ObjectiveUpdate};
use impulsa_db::projects::{NewProject, Project, ProjectUpdate};
use impulsa_db::results::{NewResult, ProjectResult, ResultUpdate};
use impulsa_db::sesiones::{NewSesion, SesionAsesoramiento, SesionDetalle, SesionUpdate};
use impulsa_db::vistas::{
    TimelineActividad, VistaEmpresa360, VistaEstadisticas, VistaEvento360, VistaFormacion360,
    VistaPersona360,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "FEMETE IMPULSA API - STARS 2025",
        version = "1.0.0",
        description = "API completa para gestión del programa STARS 2025. \
                       Compatible con Power Apps y Power BI."
    ),
    paths(
        handlers::system::health,
        handlers::projects::list,
        handlers::projects::detail,
        handlers::projects::create,
        handlers::projects::update,
        handlers::projects::remove,
        handlers::objectives::list,
        handlers::objectives::detail,
        handlers::objectives::create,
        handlers::objectives::update,
        handlers::objectives::remove,
        handlers::activities::list,
        handlers::activities::detail,
        handlers::activities::create,
        handlers::activities::update,
        handlers::activities::remove,
        handlers::beneficiaries::list,
        handlers::beneficiaries::detail,
        handlers::beneficiaries::create,
        handlers::beneficiaries::update,
        handlers::beneficiaries::remove,
        handlers::results::list,
        handlers::results::detail,
        handlers::results::create,
        handlers::results::update,
        handlers::results::remove,
        handlers::kpis::list,
        handlers::kpis::dashboard,
        handlers::kpis::detail,
        handlers::kpis::create,
        handlers::kpis::update,
        handlers::kpis::remove,
        handlers::empresas::list,
        handlers::empresas::stats,
        handlers::empresas::detail,
        handlers::empresas::create,
        handlers::empresas::update,
        handlers::empresas::remove,
        handlers::formaciones::list,
        handlers::formaciones::detail,
        handlers::formaciones::asistentes,
        handlers::formaciones::create,
        handlers::formaciones::update,
        handlers::formaciones::remove,
        handlers::eventos::list,
        handlers::eventos::detail,
        handlers::eventos::asistentes,
        handlers::eventos::create,
        handlers::eventos::update,
        handlers::eventos::remove,
        handlers::sesiones::list,
        handlers::sesiones::detail,
        handlers::sesiones::create,
        handlers::sesiones::update,
        handlers::sesiones::remove,
        handlers::vistas360::personas,
        handlers::vistas360::persona,
        handlers::vistas360::persona_relaciones,
        handlers::vistas360::empresas,
        handlers::vistas360::empresa,
        handlers::vistas360::empresa_relaciones,
        handlers::vistas360::formaciones,
        handlers::vistas360::formacion,
        handlers::vistas360::eventos,
        handlers::vistas360::evento,
        handlers::vistas360::timeline,
        handlers::vistas360::estadisticas,
        handlers::kpi_stars::dashboard,
        handlers::kpi_stars::historico,
        handlers::kpi_stars::detalle,
        handlers::kpi_stars::breakdown,
        handlers::kpi_stars::snapshot,
        handlers::kpi_stars::powerbi,
        handlers::export::data,
        handlers::export::comprehensive,
    ),
    components(schemas(
        Project,
        NewProject,
        ProjectUpdate,
        Objective,
        NewObjective,
        ObjectiveUpdate,
        Activity,
        NewActivity,
        ActivityUpdate,
        Beneficiary,
        NewBeneficiary,
        BeneficiaryUpdate,
        ProjectResult,
        NewResult,
        ResultUpdate,
        Kpi,
        KpiProgress,
        NewKpi,
        KpiUpdate,
        Empresa,
        EmpresaStats,
        NewEmpresa,
        EmpresaUpdate,
        Formacion,
        FormacionResumen,
        FormacionDetalle,
        AsistenteFormacion,
        NewFormacion,
        FormacionUpdate,
        Evento,
        EventoResumen,
        EventoDetalle,
        AsistenteEvento,
        NewEvento,
        EventoUpdate,
        SesionAsesoramiento,
        SesionDetalle,
        NewSesion,
        SesionUpdate,
        VistaPersona360,
        VistaEmpresa360,
        VistaFormacion360,
        VistaEvento360,
        TimelineActividad,
        VistaEstadisticas,
        DashboardKpis,
        KpiHistoricoRow,
        KpiDetalle,
        KpiBreakdown,
        PowerBiData,
    )),
    tags(
        (name = "System", description = "Health and service metadata"),
        (name = "Projects", description = "Innovation projects"),
        (name = "Objectives", description = "Objectives per project"),
        (name = "Activities", description = "Activities per objective"),
        (name = "Beneficiaries", description = "Beneficiary companies per project"),
        (name = "Results", description = "Measured results per project"),
        (name = "Kpis", description = "Project level KPIs and dashboard"),
        (name = "Empresas", description = "Empresas del programa STARS"),
        (name = "Formaciones", description = "Formaciones y asistentes"),
        (name = "Eventos", description = "Eventos y asistentes"),
        (name = "Asesoramientos", description = "Sesiones de asesoramiento"),
        (name = "Vistas360", description = "Vistas 360 desnormalizadas para Power BI"),
        (name = "KpiStars", description = "KPIs del programa STARS 2025"),
        (name = "Export", description = "Exportación CSV/JSON con auditoría"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_covers_every_route_group() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for prefix in [
            "/health",
            "/api/projects",
            "/api/objectives",
            "/api/activities",
            "/api/beneficiaries",
            "/api/results",
            "/api/kpis",
            "/api/empresas",
            "/api/formaciones",
            "/api/eventos",
            "/api/asesoramientos",
            "/api/vistas360",
            "/api/kpi-stars",
            "/api/export",
        ] {
            assert!(
                paths.iter().any(|p| p.starts_with(prefix)),
                "missing paths under {prefix}"
            );
        }
    }

    #[test]
    fn info_matches_programme_branding() {
        let doc = ApiDoc::openapi();
        assert_eq!(doc.info.title, "FEMETE IMPULSA API - STARS 2025");
        assert_eq!(doc.info.version, "1.0.0");
    }
}
