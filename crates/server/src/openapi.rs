use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct TopicInputDoc { pub title: String, pub summary: Option<String> }

/// Omitted fields are unchanged; `null` clears `summary`.
#[derive(ToSchema)]
pub struct TopicPatchDoc { pub title: Option<String>, pub summary: Option<String> }

#[derive(ToSchema)]
pub struct GroupInputDoc { pub label: String, pub description: Option<String> }

#[derive(ToSchema)]
pub struct GroupPatchDoc { pub label: Option<String>, pub description: Option<String> }

#[derive(ToSchema)]
pub struct ConditionInputDoc {
    pub name: String,
    pub overview: Option<String>,
    pub topic_id: i32,
    pub group_id: Option<i32>,
    /// Exact set of linked indicators; omitted leaves links unchanged
    pub indicator_ids: Option<Vec<i32>>,
}

#[derive(ToSchema)]
pub struct ConditionPatchDoc {
    pub name: Option<String>,
    pub overview: Option<String>,
    pub topic_id: Option<i32>,
    pub group_id: Option<i32>,
    pub indicator_ids: Option<Vec<i32>>,
}

#[derive(ToSchema)]
pub struct PhaseInputDoc { pub position: i32, pub title: String, pub details: String, pub condition_id: Option<i32> }

#[derive(ToSchema)]
pub struct PhasePatchDoc {
    pub position: Option<i32>,
    pub title: Option<String>,
    pub details: Option<String>,
    pub condition_id: Option<i32>,
}

#[derive(ToSchema)]
pub struct IndicatorInputDoc { pub label: String, pub notes: Option<String> }

#[derive(ToSchema)]
pub struct IndicatorPatchDoc { pub label: Option<String>, pub notes: Option<String> }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::topics::list,
        crate::routes::topics::create,
        crate::routes::topics::get,
        crate::routes::topics::replace,
        crate::routes::topics::update,
        crate::routes::topics::delete,
        crate::routes::groups::list,
        crate::routes::groups::create,
        crate::routes::groups::get,
        crate::routes::groups::replace,
        crate::routes::groups::update,
        crate::routes::groups::delete,
        crate::routes::conditions::list,
        crate::routes::conditions::create,
        crate::routes::conditions::get,
        crate::routes::conditions::replace,
        crate::routes::conditions::update,
        crate::routes::conditions::delete,
        crate::routes::conditions::link_indicator,
        crate::routes::conditions::unlink_indicator,
        crate::routes::phases::list,
        crate::routes::phases::create,
        crate::routes::phases::get,
        crate::routes::phases::replace,
        crate::routes::phases::update,
        crate::routes::phases::delete,
        crate::routes::indicators::list,
        crate::routes::indicators::create,
        crate::routes::indicators::get,
        crate::routes::indicators::replace,
        crate::routes::indicators::update,
        crate::routes::indicators::delete,
    ),
    components(
        schemas(
            HealthResponse,
            TopicInputDoc,
            TopicPatchDoc,
            GroupInputDoc,
            GroupPatchDoc,
            ConditionInputDoc,
            ConditionPatchDoc,
            PhaseInputDoc,
            PhasePatchDoc,
            IndicatorInputDoc,
            IndicatorPatchDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "topics"),
        (name = "groups"),
        (name = "conditions"),
        (name = "phases"),
        (name = "indicators")
    )
)]
pub struct ApiDoc;
