//! List, detail, form and mutation pages shared by every managed resource.

use crate::api::{ApiEnvelope, ApiMethod, OutboundPayload};
use crate::context::Panel;
use crate::error::{PanelError, PanelResult};
use crate::forms::FormData;
use crate::models::{Notice, Page};
use crate::resources::{prefill, FormField, FormMode, Resource};
use crate::views::{self, Cell, Chrome};
use crate::AppState;
use askama::Template;
use axum::extract::{Path, Query};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use service_core::error::AppError;

const DEFAULT_PER_PAGE: u64 = 10;

/// Listing query. Values are kept as text and checked by hand so a bad
/// query string falls back to defaults instead of failing the page.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub per_page: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub sort_by: String,
    pub sort_order: &'static str,
    pub per_page: u64,
    pub page: u64,
}

impl Listing {
    pub fn resolve<R: Resource>(params: &ListParams) -> Self {
        let positive = |raw: &Option<String>| {
            raw.as_deref()
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|n| *n > 0)
        };
        Self {
            sort_by: params
                .sort_by
                .clone()
                .filter(|column| R::sortable(column))
                .unwrap_or_else(|| R::DEFAULT_SORT.to_string()),
            sort_order: match params.sort_order.as_deref() {
                Some(order) if order.eq_ignore_ascii_case("desc") => "desc",
                _ => "asc",
            },
            per_page: positive(&params.per_page).unwrap_or(DEFAULT_PER_PAGE),
            page: positive(&params.page).unwrap_or(1),
        }
    }

    pub fn query(&self) -> OutboundPayload {
        OutboundPayload::new()
            .with("sort_by", self.sort_by.clone())
            .with("sort_order", self.sort_order)
            .with("per_page", self.per_page)
            .with("page", self.page)
    }

    fn href(&self, base: &str, sort_by: &str, sort_order: &str, page: u64) -> String {
        format!(
            "{}?sort_by={}&sort_order={}&per_page={}&page={}",
            base, sort_by, sort_order, self.per_page, page
        )
    }
}

pub struct Header {
    pub label: &'static str,
    pub href: Option<String>,
    pub arrow: &'static str,
}

pub struct Row {
    pub id: String,
    pub cells: Vec<Cell>,
}

#[derive(Template)]
#[template(path = "resources/index.html")]
pub struct IndexTemplate {
    pub chrome: Chrome,
    pub slug: &'static str,
    pub singular: &'static str,
    pub plural: &'static str,
    pub headers: Vec<Header>,
    pub rows: Vec<Row>,
    pub error: Option<String>,
    pub total: u64,
    pub current_page: u64,
    pub last_page: u64,
    pub previous_href: Option<String>,
    pub next_href: Option<String>,
}

pub struct DetailRow {
    pub label: &'static str,
    pub cell: Cell,
}

#[derive(Template)]
#[template(path = "resources/show.html")]
pub struct ShowTemplate {
    pub chrome: Chrome,
    pub slug: &'static str,
    pub singular: &'static str,
    pub id: String,
    pub title: String,
    pub image: Option<String>,
    pub rows: Vec<DetailRow>,
}

#[derive(Template)]
#[template(path = "resources/form.html")]
pub struct FormTemplate {
    pub chrome: Chrome,
    pub slug: &'static str,
    pub heading: String,
    pub action: String,
    pub method_override: Option<&'static str>,
    pub multipart: bool,
    pub fields: Vec<FormField>,
}

pub fn resource_routes<R: Resource>() -> Router<AppState> {
    Router::new()
        .route(&R::index_path(), get(index::<R>).post(store::<R>))
        .route(&format!("/{}/create", R::SLUG), get(create::<R>))
        .route(
            &format!("/{}/:id", R::SLUG),
            get(show::<R>)
                .post(dispatch::<R>)
                .put(update::<R>)
                .delete(destroy::<R>),
        )
        .route(&format!("/{}/:id/edit", R::SLUG), get(edit::<R>))
}

pub async fn index<R: Resource>(
    mut panel: Panel,
    Query(params): Query<ListParams>,
) -> PanelResult<Response> {
    let listing = Listing::resolve::<R>(&params);
    let envelope = panel.get(&R::index_path(), listing.query()).await?;

    let (page, error) = match envelope.data() {
        Some(data) => (Page::from_data(Some(data), listing.per_page), None),
        None => (
            Page::empty(listing.per_page),
            Some(envelope.message_or("Failed to load data").to_string()),
        ),
    };

    let base = R::index_path();
    let headers = R::columns()
        .iter()
        .map(|column| Header {
            label: column.label,
            href: column.sortable.then(|| {
                let order = views::next_order(column.key, &listing.sort_by, listing.sort_order);
                listing.href(&base, column.key, order, 1)
            }),
            arrow: views::sort_arrow(column.key, &listing.sort_by, listing.sort_order),
        })
        .collect();

    let rows = page
        .items
        .iter()
        .map(|record| Row {
            id: views::raw(record.get(R::ID_FIELD)),
            cells: R::columns().iter().map(|c| c.render(record)).collect(),
        })
        .collect();

    let page_href = |n: u64| listing.href(&base, &listing.sort_by, listing.sort_order, n);

    Ok(IndexTemplate {
        chrome: panel.chrome(R::SLUG).await?,
        slug: R::SLUG,
        singular: R::SINGULAR,
        plural: R::PLURAL,
        headers,
        rows,
        error,
        total: page.total,
        current_page: page.current_page,
        last_page: page.last_page,
        previous_href: page.previous().map(page_href),
        next_href: page.next().map(page_href),
    }
    .into_response())
}

pub async fn show<R: Resource>(mut panel: Panel, Path(id): Path<String>) -> PanelResult<Response> {
    let record = load_record::<R>(&mut panel, &id).await?;

    let image = R::IMAGE_FIELD
        .map(|field| views::raw(record.get(field)))
        .filter(|path| !path.is_empty())
        .and_then(|path| panel.state.settings.api.storage_link(&path));

    Ok(ShowTemplate {
        chrome: panel.chrome(R::SLUG).await?,
        slug: R::SLUG,
        singular: R::SINGULAR,
        title: views::display(record.get(R::TITLE_FIELD)),
        id,
        image,
        rows: R::details()
            .iter()
            .map(|column| DetailRow {
                label: column.label,
                cell: column.render(&record),
            })
            .collect(),
    }
    .into_response())
}

pub async fn create<R: Resource>(mut panel: Panel) -> PanelResult<Response> {
    panel.require_super_admin(&R::index_path()).await?;
    let options = R::options(&mut panel, None).await?;
    let fields = prefill(R::fields(), None, &options, FormMode::Create);

    Ok(FormTemplate {
        chrome: panel.chrome(R::SLUG).await?,
        slug: R::SLUG,
        heading: format!("Create {}", R::SINGULAR),
        action: R::index_path(),
        method_override: None,
        multipart: fields.iter().any(|f| f.widget == "file"),
        fields,
    }
    .into_response())
}

pub async fn edit<R: Resource>(mut panel: Panel, Path(id): Path<String>) -> PanelResult<Response> {
    panel.require_super_admin(&R::index_path()).await?;
    let record = load_record::<R>(&mut panel, &id).await?;
    let options = R::options(&mut panel, Some(&record)).await?;
    let fields = prefill(R::fields(), Some(&record), &options, FormMode::Edit);

    Ok(FormTemplate {
        chrome: panel.chrome(R::SLUG).await?,
        slug: R::SLUG,
        heading: format!("Edit {}", R::SINGULAR),
        action: R::record_path(&id),
        method_override: Some("PUT"),
        multipart: fields.iter().any(|f| f.widget == "file"),
        fields,
    }
    .into_response())
}

pub async fn store<R: Resource>(mut panel: Panel, form: FormData) -> PanelResult<Response> {
    let back = format!("/{}/create", R::SLUG);
    submit::<R>(&mut panel, ApiMethod::Post, R::index_path(), form, FormMode::Create, back).await
}

pub async fn update<R: Resource>(
    mut panel: Panel,
    Path(id): Path<String>,
    form: FormData,
) -> PanelResult<Response> {
    update_record::<R>(&mut panel, &id, form).await
}

pub async fn destroy<R: Resource>(mut panel: Panel, Path(id): Path<String>) -> PanelResult<Response> {
    destroy_record::<R>(&mut panel, &id).await
}

/// `POST /R/{id}` from an HTML form, routed by its `_method` field.
pub async fn dispatch<R: Resource>(
    mut panel: Panel,
    Path(id): Path<String>,
    form: FormData,
) -> PanelResult<Response> {
    match form.method_override().as_deref() {
        Some("PUT") | Some("PATCH") => update_record::<R>(&mut panel, &id, form).await,
        Some("DELETE") => destroy_record::<R>(&mut panel, &id).await,
        other => Err(PanelError::App(AppError::BadRequest(anyhow::anyhow!(
            "unsupported form method {:?} for /{}/{}",
            other.unwrap_or("POST"),
            R::SLUG,
            id
        )))),
    }
}

async fn update_record<R: Resource>(panel: &mut Panel, id: &str, form: FormData) -> PanelResult<Response> {
    let back = format!("/{}/{}/edit", R::SLUG, id);
    submit::<R>(panel, ApiMethod::Put, R::record_path(id), form, FormMode::Edit, back).await
}

async fn destroy_record<R: Resource>(panel: &mut Panel, id: &str) -> PanelResult<Response> {
    let envelope = panel
        .mutate(ApiMethod::Delete, &R::record_path(id), OutboundPayload::new(), &R::index_path())
        .await?;
    report::<R>(panel, &envelope, "Deleted", "delete").await?;
    Ok(Redirect::to(&R::index_path()).into_response())
}

/// Shared create/update flow: gate, validate, forward, report.
async fn submit<R: Resource>(
    panel: &mut Panel,
    method: ApiMethod,
    endpoint: String,
    form: FormData,
    mode: FormMode,
    back: String,
) -> PanelResult<Response> {
    let index = R::index_path();
    panel.require_super_admin(&index).await?;

    let payload = match R::payload(form, mode) {
        Ok(payload) => payload,
        Err(err) => {
            tracing::info!(resource = R::SLUG, error = %err, "Form rejected");
            panel
                .flash(
                    Notice::error("Validation Failed", "Please check the form and try again.")
                        .with_errors(err.messages()),
                )
                .await?;
            return Ok(Redirect::to(&back).into_response());
        }
    };

    let envelope = panel.mutate(method, &endpoint, payload, &index).await?;
    let (done, verb) = match mode {
        FormMode::Create => ("Created", "create"),
        FormMode::Edit => ("Updated", "update"),
    };
    let target = if report::<R>(panel, &envelope, done, verb).await? {
        index
    } else {
        back
    };
    Ok(Redirect::to(&target).into_response())
}

/// Flashes the outcome of a mutation. Returns whether it succeeded.
async fn report<R: Resource>(
    panel: &mut Panel,
    envelope: &ApiEnvelope,
    done: &str,
    verb: &str,
) -> PanelResult<bool> {
    let notice = if envelope.success {
        Notice::success(
            format!("{} {}", R::SINGULAR, done),
            envelope.message_or(&format!("{} {} successfully.", R::SINGULAR, done.to_lowercase())),
        )
    } else {
        Notice::error(
            format!("Failed to {} {}", verb, R::SINGULAR.to_lowercase()),
            envelope.message_or("The server rejected the request."),
        )
        .with_errors(envelope.error_messages())
    };
    panel.flash(notice).await?;
    Ok(envelope.success)
}

async fn load_record<R: Resource>(panel: &mut Panel, id: &str) -> PanelResult<serde_json::Value> {
    let envelope = panel.get(&R::record_path(id), OutboundPayload::new()).await?;
    match envelope.data() {
        Some(record) => Ok(record.clone()),
        None => {
            panel
                .flash(Notice::error(
                    format!("{} Not Found", R::SINGULAR),
                    envelope.message_or(&format!("Failed to load {}.", R::SINGULAR.to_lowercase())),
                ))
                .await?;
            Err(PanelError::Redirect(R::index_path()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{Roles, Users};

    #[test]
    fn listing_defaults() {
        let listing = Listing::resolve::<Users>(&ListParams::default());
        assert_eq!(
            listing,
            Listing {
                sort_by: "u_id".into(),
                sort_order: "asc",
                per_page: 10,
                page: 1
            }
        );
    }

    #[test]
    fn listing_rejects_unknown_columns_and_bad_numbers() {
        let params = ListParams {
            sort_by: Some("u_password".into()),
            sort_order: Some("DESC".into()),
            per_page: Some("-5".into()),
            page: Some("3".into()),
        };
        let listing = Listing::resolve::<Users>(&params);
        assert_eq!(listing.sort_by, "u_id");
        assert_eq!(listing.sort_order, "desc");
        assert_eq!(listing.per_page, 10);
        assert_eq!(listing.page, 3);

        let params = ListParams {
            sort_by: Some("role_name".into()),
            ..ListParams::default()
        };
        assert_eq!(Listing::resolve::<Roles>(&params).sort_by, "role_name");
    }

    #[test]
    fn listing_query_forwards_all_parameters() {
        let query = Listing::resolve::<Roles>(&ListParams::default()).query().to_query();
        assert_eq!(
            query,
            vec![
                ("sort_by".to_string(), "role_id".to_string()),
                ("sort_order".to_string(), "asc".to_string()),
                ("per_page".to_string(), "10".to_string()),
                ("page".to_string(), "1".to_string()),
            ]
        );
    }
}
